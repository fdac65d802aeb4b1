//! Markdown rendering of answers for the chat interface.

use serde_json::{Map, Value};

use super::assistant::QueryAnswer;

/// Text shown for a result without rows.
pub const NO_RESULTS: &str = "No results found for this query.";

/// Plain text for one cell. Strings are unquoted, nulls read `NULL`.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Render rows as a markdown table.
pub fn markdown_table(columns: &[String], rows: &[Map<String, Value>]) -> String {
    if rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    let header: Vec<String> = columns.iter().map(|c| escape_cell(c)).collect();
    let mut out = format!("| {} |\n", header.join(" | "));
    out.push_str(&format!(
        "| {} |\n",
        vec!["---"; columns.len()].join(" | ")
    ));

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| escape_cell(&row.get(c).map(cell_text).unwrap_or_else(|| "NULL".to_string())))
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    out
}

/// Full chat reply: the SQL, the table and a size summary.
pub fn answer_markdown(answer: &QueryAnswer) -> String {
    let results = if answer.rows.is_empty() {
        NO_RESULTS.to_string()
    } else {
        format!(
            "## Results\n\n{}",
            markdown_table(&answer.columns, &answer.rows)
        )
    };

    let mut out = format!(
        "### SQL query\n```sql\n{}\n```\n\n{}\n\nFound {} rows and {} columns.",
        answer.sql,
        results,
        answer.row_count,
        answer.columns.len()
    );
    if answer.truncated {
        out.push_str(&format!(
            " Only the first {} rows are shown.",
            answer.row_count
        ));
    }
    out
}

/// Greeting sent when a chat session opens.
pub fn welcome_message(tables: &[String]) -> String {
    let available = if tables.is_empty() {
        "No tables were found in the database.".to_string()
    } else {
        tables
            .iter()
            .map(|t| format!("`{}`", t))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "# 👋 Welcome to the SQL Assistant!\n\n\
         I can help you query the database using plain language.\n\n\
         ### Available tables:\n{}\n\n\
         ### Example questions:\n\
         - \"Which technologies are used most often in projects?\"\n\
         - \"Show all projects started after 2020\"\n\
         - \"How many projects are in development?\"\n",
        available
    )
}
