//! CSV writer.

// ─── Field escaping ───────────────────────────────────────────────────────────

fn needs_quotes(field: &str) -> bool {
  field.contains([',', '"', '\n', '\r'])
}

/// Quote `field` if needed, doubling any embedded quotes.
pub(crate) fn escape_field(field: &str) -> String {
  if needs_quotes(field) {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_owned()
  }
}

// ─── Rows ─────────────────────────────────────────────────────────────────────

pub(crate) fn write_rows<R, F>(rows: R) -> String
where
  R: IntoIterator,
  R::Item: IntoIterator<Item = F>,
  F: AsRef<str>,
{
  rows
    .into_iter()
    .map(|row| {
      row
        .into_iter()
        .map(|field| escape_field(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
    })
    .collect::<Vec<_>>()
    .join("\n")
}
