//! Cleanup and validation of model-generated SQL.
//!
//! Models wrap queries in markdown, prepend prose, add comments and
//! sometimes chain statements. [`clean_sql`] reduces that to a single
//! read-only statement or refuses it.

use regex::Regex;
use std::sync::LazyLock;

use super::lexer::{code_words, segments, split_statements, strip_comments, SegmentKind};
use crate::error::{AppError, AppResult};

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```[a-z]*").expect("fence regex"));

static SELECT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bselect\b").expect("select regex"));

/// Statement keywords a generated query may start with.
const READ_KEYWORDS: &[&str] = &["SELECT", "WITH"];

/// Keywords that make a statement data- or schema-modifying.
const WRITE_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "TRUNCATE", "CREATE", "GRANT", "REVOKE", "COPY",
    "MERGE",
];

/// Remove markdown code fences such as ```` ```sql ````.
pub fn strip_fences(raw: &str) -> String {
    FENCE.replace_all(raw, "").into_owned()
}

/// Reduce raw model output to one executable read-only statement.
///
/// The returned SQL has no comments, no trailing semicolon and starts with
/// `SELECT` or `WITH`.
pub fn clean_sql(raw: &str) -> AppResult<String> {
    let text = strip_comments(&strip_fences(raw));
    let text = text.trim();

    // Prose before the query can open a phantom literal ("Here's ..."),
    // which hides comments from the first pass, so the cut is cleaned again.
    let recleaned;
    let text = if starts_with_read_keyword(text) {
        text
    } else {
        let offset = find_select(text)?;
        reject_write_prefix(&text[..offset])?;
        recleaned = strip_comments(&text[offset..]);
        recleaned.trim()
    };

    let statement = split_statements(text)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::UnsafeQuery("Empty SQL query".to_string()))?;

    validate_read_only(&statement)?;

    Ok(statement)
}

fn starts_with_read_keyword(text: &str) -> bool {
    code_words(text)
        .first()
        .map(|w| READ_KEYWORDS.contains(&w.as_str()))
        .unwrap_or(false)
}

/// Byte offset of the first `SELECT` keyword.
///
/// Code positions are preferred. Prose such as "Here's the query:" opens
/// what looks like a literal, so a plain word search is the fallback.
fn find_select(text: &str) -> AppResult<usize> {
    let in_code = segments(text)
        .into_iter()
        .filter(|s| s.kind == SegmentKind::Code)
        .find_map(|s| SELECT_WORD.find(s.text).map(|m| s.start + m.start()));

    if let Some(offset) = in_code {
        return Ok(offset);
    }
    if let Some(m) = SELECT_WORD.find(text) {
        return Ok(m.start());
    }
    if text.to_uppercase().contains("SELECT") {
        return Err(AppError::UnsafeQuery(
            "No valid SELECT statement found in query".to_string(),
        ));
    }
    Err(AppError::UnsafeQuery(
        "Only SELECT queries are allowed".to_string(),
    ))
}

/// `INSERT INTO t SELECT ...` must not be shortened to its SELECT tail.
fn reject_write_prefix(prefix: &str) -> AppResult<()> {
    match code_words(prefix).first() {
        Some(word) if WRITE_KEYWORDS.contains(&word.as_str()) => Err(AppError::UnsafeQuery(
            format!("{} statements are not allowed", word),
        )),
        _ => Ok(()),
    }
}

fn validate_read_only(statement: &str) -> AppResult<()> {
    let words = code_words(statement);

    match words.first() {
        Some(first) if READ_KEYWORDS.contains(&first.as_str()) => {}
        _ => {
            return Err(AppError::UnsafeQuery(
                "Only SELECT queries are allowed".to_string(),
            ))
        }
    }

    if let Some(word) = words
        .iter()
        .find(|w| WRITE_KEYWORDS.contains(&w.as_str()))
    {
        return Err(AppError::UnsafeQuery(format!(
            "{} statements are not allowed",
            word
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsafe_message(raw: &str) -> String {
        match clean_sql(raw) {
            Err(AppError::UnsafeQuery(msg)) => msg,
            other => panic!("expected UnsafeQuery, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_select_passes_through() {
        assert_eq!(clean_sql("SELECT * FROM projects").unwrap(), "SELECT * FROM projects");
    }

    #[test]
    fn test_strips_markdown_fence_and_semicolon() {
        let raw = "```sql\nSELECT name FROM technologies;\n```";
        assert_eq!(clean_sql(raw).unwrap(), "SELECT name FROM technologies");
    }

    #[test]
    fn test_strips_comments_and_backticks() {
        let raw = "-- top projects\nSELECT `name` /* alias */ FROM projects -- trailing";
        assert_eq!(clean_sql(raw).unwrap(), "SELECT name   FROM projects");
    }

    #[test]
    fn test_extracts_select_after_prose() {
        let raw = "Here's the query you asked for:\nSELECT count(*) AS total FROM projects";
        assert_eq!(clean_sql(raw).unwrap(), "SELECT count(*) AS total FROM projects");
    }

    #[test]
    fn test_comments_after_apostrophe_prose_are_stripped() {
        let raw = "Here's the query:\nSELECT a -- pick a\nFROM t /* x */";
        assert_eq!(clean_sql(raw).unwrap(), "SELECT a  \nFROM t");
    }

    #[test]
    fn test_backticks_after_apostrophe_prose_are_stripped() {
        let raw = "Here's what you need: SELECT `name` FROM `projects` WHERE note = 'a;b';";
        assert_eq!(
            clean_sql(raw).unwrap(),
            "SELECT name FROM projects WHERE note = 'a;b'"
        );
    }

    #[test]
    fn test_keeps_only_first_statement() {
        let raw = "SELECT 1; DROP TABLE projects;";
        assert_eq!(clean_sql(raw).unwrap(), "SELECT 1");
    }

    #[test]
    fn test_semicolon_in_literal_is_not_a_boundary() {
        let raw = "SELECT * FROM notes WHERE body = 'a;b' ;";
        assert_eq!(clean_sql(raw).unwrap(), "SELECT * FROM notes WHERE body = 'a;b'");
    }

    #[test]
    fn test_comment_marker_in_literal_is_kept() {
        let raw = "SELECT '--not a comment' AS s";
        assert_eq!(clean_sql(raw).unwrap(), raw);
    }

    #[test]
    fn test_with_clause_is_accepted() {
        let raw = "WITH t AS (SELECT 1 AS x) SELECT x FROM t";
        assert_eq!(clean_sql(raw).unwrap(), raw);
    }

    #[test]
    fn test_rejects_non_select() {
        assert_eq!(
            unsafe_message("DELETE FROM projects"),
            "Only SELECT queries are allowed"
        );
    }

    #[test]
    fn test_rejects_select_only_inside_literal() {
        assert_eq!(
            unsafe_message("UPDATE t SET note = 'selected'"),
            "No valid SELECT statement found in query"
        );
    }

    #[test]
    fn test_rejects_writable_cte() {
        let raw = "WITH gone AS (DELETE FROM projects RETURNING *) SELECT * FROM gone";
        assert_eq!(unsafe_message(raw), "DELETE statements are not allowed");
    }

    #[test]
    fn test_write_keyword_inside_literal_is_fine() {
        let raw = "SELECT * FROM audit WHERE action = 'DELETE'";
        assert_eq!(clean_sql(raw).unwrap(), raw);
    }

    #[test]
    fn test_embedded_insert_after_select_prefix_is_rejected() {
        let raw = "INSERT INTO t SELECT * FROM s";
        assert_eq!(unsafe_message(raw), "INSERT statements are not allowed");
    }

    #[test]
    fn test_prose_mentioning_create_is_fine() {
        let raw = "To create the report use\nSELECT 1 AS x";
        assert_eq!(clean_sql(raw).unwrap(), "SELECT 1 AS x");
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(unsafe_message("```sql\n```"), "Only SELECT queries are allowed");
    }
}
