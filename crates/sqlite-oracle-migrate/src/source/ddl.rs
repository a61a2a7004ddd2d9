//! Column type recovery from `CREATE TABLE` text.
//!
//! `PRAGMA table_info` reports the declared type, but some tools write
//! schemas whose declared types only survive intact in the stored
//! statement (precision and scale of `NUMBER(p,s)` in particular). This
//! module looks the column up in the statement text and returns the type
//! token that follows it.
//!
//! This is pattern matching, not a SQL parser. The first occurrence of
//! `<column> <TYPE>` wins, so a column name that reappears earlier in the
//! statement (inside a DEFAULT string or CHECK expression of a preceding
//! column) can yield the wrong token. Quoted column names containing
//! spaces are not recognized.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)--.*$").expect("valid regex"));

/// Return the type token declared for `column` in `ddl`, if one can be found.
///
/// The token is an identifier optionally followed by a parenthesized
/// parameter list, e.g. `INTEGER`, `NUMBER(9,2)`, `varchar (20)`.
pub fn extract_column_type(ddl: &str, column: &str) -> Option<String> {
    if ddl.is_empty() || column.is_empty() {
        return None;
    }

    let without_comments = LINE_COMMENT.replace_all(ddl, "");
    let collapsed = without_comments.split_whitespace().collect::<Vec<_>>().join(" ");

    let pattern = format!(
        r"\b{}\s+([A-Z][A-Z0-9_]*(?:\s*\([^)]+\))?)",
        regex::escape(column)
    );
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()?;

    re.captures(&collapsed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}
