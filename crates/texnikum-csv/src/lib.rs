//! CSV codec for Texnikum ERP exports.
//!
//! Pure synchronous string processing; no I/O. [`to_csv`] and [`parse_csv`]
//! are inverses for any grid whose rows are non-empty.
//!
//! # Quick start
//!
//! ```
//! use texnikum_csv::{parse_csv, to_csv};
//!
//! let rows = vec![vec!["a,b".to_string(), "c".to_string()]];
//! let csv = to_csv(&rows);
//! assert_eq!(csv, "\"a,b\",c");
//! assert_eq!(parse_csv(&csv), rows);
//! ```

pub mod export;
pub mod import;
mod parse;
mod serialize;

// ─── Public API ──────────────────────────────────────────────────────────────

/// Render `rows` as CSV: comma-separated fields, `\n`-separated rows, no
/// trailing newline. Fields containing `,`, `"`, or `\n` are quoted.
pub fn to_csv<R, F>(rows: R) -> String
where
  R: IntoIterator,
  R::Item: IntoIterator<Item = F>,
  F: AsRef<str>,
{
  serialize::write_rows(rows)
}

/// Parse CSV text into rows of fields.
///
/// Accepts `\n`, `\r\n`, and bare `\r` line endings and quoted fields that
/// span lines. Blank lines never produce rows.
pub fn parse_csv(input: &str) -> Vec<Vec<String>> { parse::read_rows(input) }
