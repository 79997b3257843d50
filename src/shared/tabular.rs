//! Tabular views over sample rows and model answers, plus CSV export.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Header used when an answer is not tabular
const PLAIN_ANSWER_HEADER: &str = "Response";

/// A header row plus data rows, every cell rendered as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResultTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Build a table from a model answer.
    ///
    /// Answers containing `|` are read as pipe tables: each line is split on `|`,
    /// cells are trimmed, empty cells and empty lines are dropped and the first
    /// remaining line becomes the header. Anything else becomes a single
    /// `Response` column holding the whole answer as its one row.
    pub fn from_answer(answer: &str) -> Self {
        if !answer.contains('|') {
            return Self {
                headers: vec![PLAIN_ANSWER_HEADER.to_string()],
                rows: vec![vec![answer.trim().to_string()]],
            };
        }

        let mut lines = answer
            .lines()
            .map(|line| {
                line.split('|')
                    .map(str::trim)
                    .filter(|cell| !cell.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty());

        let headers = lines.next().unwrap_or_default();
        Self {
            headers,
            rows: lines.collect(),
        }
    }

    /// Build a table from stored sample rows, aligned to `columns`.
    pub fn from_sample(columns: &[String], sample: &[Map<String, Value>]) -> Self {
        let rows = sample
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.get(column).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            headers: columns.to_vec(),
            rows,
        }
    }

    /// Serialize the table as CSV with a header line.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_answer_plain_text() {
        let table = ResultTable::from_answer("  The average age is 42.\n");
        assert_eq!(table.headers, vec!["Response"]);
        assert_eq!(table.rows, vec![vec!["The average age is 42.".to_string()]]);
    }

    #[test]
    fn test_from_answer_multiline_plain_text_is_one_row() {
        let table = ResultTable::from_answer("Ada is 36.\nAlan is 41.\tBoth are listed.");
        assert_eq!(table.headers, vec!["Response"]);
        assert_eq!(
            table.rows,
            vec![vec!["Ada is 36.\nAlan is 41.\tBoth are listed.".to_string()]]
        );
    }

    #[test]
    fn test_from_answer_pipe_table() {
        let answer = "| name | age |\n| Ada | 36 |\n\n| Alan | 41 |\n";
        let table = ResultTable::from_answer(answer);

        assert_eq!(table.headers, vec!["name", "age"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["Ada".to_string(), "36".to_string()],
                vec!["Alan".to_string(), "41".to_string()],
            ]
        );
    }

    #[test]
    fn test_from_answer_keeps_dash_rows() {
        let table = ResultTable::from_answer("| code | note |\n| --- | ---- |\n| A1 | ok |");
        assert_eq!(table.headers, vec!["code", "note"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["---".to_string(), "----".to_string()],
                vec!["A1".to_string(), "ok".to_string()],
            ]
        );
    }

    #[test]
    fn test_from_answer_drops_empty_cells() {
        let table = ResultTable::from_answer("a || b\n1 |  | 2");
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_from_sample_follows_column_order() {
        let columns = vec!["b".to_string(), "a".to_string()];
        let row = json!({ "a": "1", "b": "2" });
        let sample = vec![row.as_object().unwrap().clone()];

        let table = ResultTable::from_sample(&columns, &sample);
        assert_eq!(table.headers, vec!["b", "a"]);
        assert_eq!(table.rows, vec![vec!["2".to_string(), "1".to_string()]]);
    }

    #[test]
    fn test_from_sample_missing_cell_is_empty() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let row = json!({ "a": "1" });
        let sample = vec![row.as_object().unwrap().clone()];

        let table = ResultTable::from_sample(&columns, &sample);
        assert_eq!(table.rows, vec![vec!["1".to_string(), String::new()]]);
    }

    #[test]
    fn test_to_csv_quotes_when_needed() {
        let table = ResultTable {
            headers: vec!["city".to_string(), "note".to_string()],
            rows: vec![vec!["Paris".to_string(), "big, old".to_string()]],
        };
        assert_eq!(table.to_csv().unwrap(), "city,note\nParis,\"big, old\"\n");
    }
}
