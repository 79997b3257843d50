//! Prompt template management.
//!
//! Templates are stored in `templates/prompts/` and use Jinja2 syntax.

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::Value;
use std::collections::HashMap;

const CSV_ANALYSIS_TEMPLATE: &str = "query/csv_analysis.jinja";

/// Render the prompt sent to the model for a question about one CSV file.
///
/// Column names are comma-joined and the sample rows are embedded as compact JSON.
pub fn render_csv_analysis_prompt(
    column_names: &[String],
    sample_data: &serde_json::Value,
    query: &str,
) -> Result<String, TemplateError> {
    let sample_json = serde_json::to_string(sample_data)
        .map_err(|e| TemplateError::RenderError(e.to_string()))?;

    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("column_names", Value::from(column_names.join(", ")));
    ctx.insert("sample_data", Value::from(sample_json));
    ctx.insert("query", Value::from(query));

    render_template(CSV_ANALYSIS_TEMPLATE, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_csv_analysis_prompt_embeds_columns_sample_and_question() {
        let columns = vec!["name".to_string(), "age".to_string()];
        let sample = json!([{ "name": "Ada", "age": "36" }]);

        let prompt =
            render_csv_analysis_prompt(&columns, &sample, "Who is the oldest?").unwrap();

        assert!(prompt.contains("name, age"));
        assert!(prompt.contains(r#"[{"name":"Ada","age":"36"}]"#));
        assert!(prompt.contains("Who is the oldest?"));
        assert!(prompt.contains("Do not include any explanations or SQL queries"));
    }

    #[test]
    fn test_question_is_forwarded_verbatim() {
        let question = "What's the <total> of \"sales\" & {{ returns }}?";
        let prompt = render_csv_analysis_prompt(&[], &serde_json::Value::Null, question).unwrap();
        assert!(prompt.contains(question));
    }
}
