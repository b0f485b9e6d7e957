//! Data agent prompt
//!
//! The agent sees each table as delimited text and must answer with a single
//! JSON object so the reply can be classified into a result kind.

use crate::dataset::Dataset;

/// Builds the system prompt describing the dataset and the reply format
///
/// Each table contributes its header plus up to `max_rows` data rows.
///
/// # Examples
///
/// ```
/// use sheetchat::dataset::{Dataset, Table};
/// use sheetchat::prompts::build_agent_prompt;
///
/// let dataset = Dataset::new(vec![Table::new(
///     "orders",
///     vec!["id".to_string()],
///     vec![vec!["1".to_string()], vec!["2".to_string()]],
/// )]);
/// let prompt = build_agent_prompt(&dataset, 1);
/// assert!(prompt.contains("TABLE orders (2 rows)"));
/// assert!(!prompt.contains("\n2\n"));
/// ```
pub fn build_agent_prompt(dataset: &Dataset, max_rows: usize) -> String {
    let mut prompt = String::from(
        "You are a data analyst answering questions about the tables below.\n\n",
    );

    for table in dataset.tables() {
        prompt.push_str(&format!(
            "TABLE {} ({} rows)\n{}\n",
            table.name(),
            table.row_count(),
            table.to_delimited(max_rows)
        ));
        if table.row_count() > max_rows {
            prompt.push_str(&format!("... {} more rows\n", table.row_count() - max_rows));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        r#"REPLY FORMAT:
Answer with exactly one JSON object and nothing else, in one of these shapes:
{"type": "number", "value": 42}
{"type": "text", "value": "a short answer"}
{"type": "table", "value": {"columns": ["a", "b"], "rows": [["1", "2"]]}}
{"type": "plot", "value": "path/to/chart.png or base64-encoded PNG bytes"}
Use "table" when the answer is a list of records, "number" for a single numeric result,
"plot" when the question asks for a chart, and "text" otherwise."#,
    );

    prompt
}
