//! A small PostgreSQL-aware scanner.
//!
//! It only knows enough syntax to tell code apart from string literals,
//! quoted identifiers, dollar-quoted bodies and comments, which is what the
//! guard needs to strip comments and find statement boundaries safely.

/// What a slice of SQL text is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    /// `'...'`, `"..."` or `$tag$...$tag$`
    Literal,
    /// `-- ...` or `/* ... */` (nesting allowed)
    Comment,
}

/// A contiguous slice of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
    /// Byte offset of `text` in the scanned input
    pub start: usize,
}

/// Split `sql` into segments. Unterminated literals and comments run to the
/// end of the input.
pub fn segments(sql: &str) -> Vec<Segment<'_>> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut code_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let (kind, end) = match bytes[i] {
            b'\'' => (SegmentKind::Literal, quoted_end(bytes, i, b'\'')),
            b'"' => (SegmentKind::Literal, quoted_end(bytes, i, b'"')),
            b'-' if bytes.get(i + 1) == Some(&b'-') => (SegmentKind::Comment, line_end(bytes, i)),
            b'/' if bytes.get(i + 1) == Some(&b'*') => (SegmentKind::Comment, block_end(bytes, i)),
            b'$' => match dollar_tag(sql, i) {
                Some(tag) => (SegmentKind::Literal, dollar_end(sql, i, tag)),
                None => {
                    i += 1;
                    continue;
                }
            },
            _ => {
                i += 1;
                continue;
            }
        };

        if code_start < i {
            out.push(Segment {
                kind: SegmentKind::Code,
                text: &sql[code_start..i],
                start: code_start,
            });
        }
        out.push(Segment {
            kind,
            text: &sql[i..end],
            start: i,
        });
        i = end;
        code_start = end;
    }

    if code_start < bytes.len() {
        out.push(Segment {
            kind: SegmentKind::Code,
            text: &sql[code_start..],
            start: code_start,
        });
    }

    out
}

fn quoted_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        if bytes[j] == quote {
            // doubled quote is an escaped quote
            if bytes.get(j + 1) == Some(&quote) {
                j += 2;
                continue;
            }
            return j + 1;
        }
        j += 1;
    }
    bytes.len()
}

fn line_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| start + p)
        .unwrap_or(bytes.len())
}

fn block_end(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut j = start;
    while j + 1 < bytes.len() {
        if bytes[j] == b'/' && bytes[j + 1] == b'*' {
            depth += 1;
            j += 2;
        } else if bytes[j] == b'*' && bytes[j + 1] == b'/' {
            depth -= 1;
            j += 2;
            if depth == 0 {
                return j;
            }
        } else {
            j += 1;
        }
    }
    bytes.len()
}

/// Dollar-quote opener at `start` (`$$` or `$tag$`), if any.
fn dollar_tag(sql: &str, start: usize) -> Option<&str> {
    let bytes = sql.as_bytes();
    if start > 0 {
        let prev = bytes[start - 1];
        if prev.is_ascii_alphanumeric() || prev == b'_' {
            return None;
        }
    }
    let mut j = start + 1;
    if let Some(&first) = bytes.get(j) {
        if first.is_ascii_digit() {
            // positional parameter like $1
            return None;
        }
    }
    while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
        j += 1;
    }
    if bytes.get(j) == Some(&b'$') {
        Some(&sql[start..=j])
    } else {
        None
    }
}

fn dollar_end(sql: &str, start: usize, tag: &str) -> usize {
    let body_start = start + tag.len();
    sql[body_start..]
        .find(tag)
        .map(|p| body_start + p + tag.len())
        .unwrap_or(sql.len())
}

/// Remove comments and stray backticks, leaving literals untouched.
///
/// Each comment is replaced by a single space so tokens on either side do
/// not fuse together.
pub fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    for segment in segments(sql) {
        match segment.kind {
            SegmentKind::Code => out.extend(segment.text.chars().filter(|&c| c != '`')),
            SegmentKind::Literal => out.push_str(segment.text),
            SegmentKind::Comment => out.push(' '),
        }
    }
    out
}

/// Split on top-level semicolons. Empty statements are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for segment in segments(sql) {
        if segment.kind != SegmentKind::Code {
            current.push_str(segment.text);
            continue;
        }
        let mut parts = segment.text.split(';');
        if let Some(first) = parts.next() {
            current.push_str(first);
        }
        for part in parts {
            push_statement(&mut statements, &current);
            current.clear();
            current.push_str(part);
        }
    }
    push_statement(&mut statements, &current);

    statements
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

/// Upper-cased words that appear in code (outside literals and comments).
pub fn code_words(sql: &str) -> Vec<String> {
    segments(sql)
        .into_iter()
        .filter(|s| s.kind == SegmentKind::Code)
        .flat_map(|s| {
            s.text
                .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .filter(|w| !w.is_empty())
                .map(|w| w.to_uppercase())
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_cover_input() {
        let sql = "SELECT 'a;b', \"c\" -- note\nFROM t /* x */";
        let rebuilt: String = segments(sql).iter().map(|s| s.text).collect();
        assert_eq!(rebuilt, sql);
    }

    #[test]
    fn test_segment_kinds() {
        let kinds: Vec<SegmentKind> = segments("SELECT 'x' -- c\n")
            .iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::Code,
                SegmentKind::Literal,
                SegmentKind::Code,
                SegmentKind::Comment,
                SegmentKind::Code,
            ]
        );
    }

    #[test]
    fn test_escaped_quote_stays_in_literal() {
        let segs = segments("SELECT 'it''s -- fine'");
        assert_eq!(segs[1].kind, SegmentKind::Literal);
        assert_eq!(segs[1].text, "'it''s -- fine'");
    }

    #[test]
    fn test_nested_block_comment() {
        assert_eq!(strip_comments("SELECT /* a /* b */ c */ 1"), "SELECT   1");
    }

    #[test]
    fn test_dollar_quoted_body() {
        let segs = segments("SELECT $fn$ a; -- b $fn$ AS body");
        assert_eq!(segs[1].kind, SegmentKind::Literal);
        assert_eq!(segs[1].text, "$fn$ a; -- b $fn$");
    }

    #[test]
    fn test_positional_parameter_is_code() {
        let segs = segments("SELECT $1");
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].kind, SegmentKind::Code);
    }

    #[test]
    fn test_strip_comments_keeps_literals() {
        let stripped = strip_comments("SELECT '--keep' AS `x` -- drop\nFROM t");
        assert_eq!(stripped, "SELECT '--keep' AS x  \nFROM t");
    }

    #[test]
    fn test_split_statements() {
        let parts = split_statements("SELECT 1; SELECT ';' ;;  ");
        assert_eq!(parts, vec!["SELECT 1", "SELECT ';'"]);
    }

    #[test]
    fn test_code_words_skip_literals() {
        let words = code_words("select name from t where note = 'delete me'");
        assert!(words.contains(&"SELECT".to_string()));
        assert!(!words.contains(&"DELETE".to_string()));
    }

    #[test]
    fn test_unterminated_literal_runs_to_end() {
        let segs = segments("Here's the query: SELECT 1");
        assert_eq!(segs.last().map(|s| s.kind), Some(SegmentKind::Literal));
    }
}
