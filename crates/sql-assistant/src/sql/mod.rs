//! SQL handling for model-generated queries.
//!
//! - [`lexer`]: splits SQL text into code, literal and comment segments
//! - [`guard`]: turns raw model output into one read-only statement

pub mod guard;
pub mod lexer;

pub use guard::{clean_sql, strip_fences};
pub use lexer::{split_statements, strip_comments};
