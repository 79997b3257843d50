//! CSV decoding for uploads.
//!
//! The first record is the header. Rows are kept as string values keyed by
//! column name, in column order. Short rows are padded with empty strings and
//! surplus fields are collected under [`EXTRA_FIELDS_KEY`].

use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use crate::features::files::models::SampleRow;

/// Key holding fields beyond the header width
pub const EXTRA_FIELDS_KEY: &str = "__parsed_extra";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum CsvParseError {
    #[error("CSV has no header row")]
    MissingHeader,

    #[error("Malformed CSV: {0}")]
    Malformed(#[from] csv::Error),
}

#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub columns: Vec<String>,
    /// At most `sample_limit` rows
    pub sample: Vec<SampleRow>,
    /// Number of data records in the whole file
    pub row_count: usize,
}

/// Parse `data`, keeping the first `sample_limit` rows.
pub fn parse_csv(data: &[u8], sample_limit: usize) -> Result<ParsedCsv, CsvParseError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = reader.records();

    let header = loop {
        match records.next() {
            Some(record) => {
                let record = record?;
                if !is_blank(&record) {
                    break record;
                }
            }
            None => return Err(CsvParseError::MissingHeader),
        }
    };
    let columns = dedupe_headers(header.iter());

    let mut sample = Vec::new();
    let mut row_count = 0;

    for record in records {
        let record = record?;
        if is_blank(&record) {
            continue;
        }

        row_count += 1;
        if sample.len() < sample_limit {
            sample.push(to_row(&columns, &record));
        }
    }

    Ok(ParsedCsv {
        columns,
        sample,
        row_count,
    })
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(str::is_empty)
}

fn to_row(columns: &[String], record: &csv::StringRecord) -> SampleRow {
    let mut row = SampleRow::new();

    for (i, column) in columns.iter().enumerate() {
        let value = record.get(i).unwrap_or_default();
        row.insert(column.clone(), Value::String(value.to_string()));
    }

    if record.len() > columns.len() {
        let extra = record
            .iter()
            .skip(columns.len())
            .map(|field| Value::String(field.to_string()))
            .collect();
        row.insert(EXTRA_FIELDS_KEY.to_string(), Value::Array(extra));
    }

    row
}

/// Repeated names get `_1`, `_2`, ... appended, skipping names already taken
fn dedupe_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.to_string();
        let mut suffix = 0;
        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", name, suffix);
        }
        taken.insert(candidate.clone());
        columns.push(candidate);
    }

    columns
}
