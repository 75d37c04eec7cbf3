//! CSV reader.
//!
//! A single pass over the input with one bit of state: whether we are inside
//! a quoted field. Outside quotes, any run of `\r`/`\n` ends the current row.

/// Parse `input` into rows of fields.
pub(crate) fn read_rows(input: &str) -> Vec<Vec<String>> {
  let mut rows: Vec<Vec<String>> = Vec::new();
  let mut row: Vec<String> = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut chars = input.chars().peekable();

  while let Some(c) = chars.next() {
    if in_quotes {
      match c {
        '"' if chars.peek() == Some(&'"') => {
          chars.next();
          field.push('"');
        }
        '"' => in_quotes = false,
        _ => field.push(c),
      }
      continue;
    }

    match c {
      '"' => in_quotes = true,
      ',' => row.push(std::mem::take(&mut field)),
      '\n' | '\r' => {
        if !field.is_empty() || !row.is_empty() {
          row.push(std::mem::take(&mut field));
          rows.push(std::mem::take(&mut row));
        }
        while chars.next_if(|c| matches!(c, '\n' | '\r')).is_some() {}
      }
      _ => field.push(c),
    }
  }

  if !field.is_empty() || !row.is_empty() {
    row.push(field);
    rows.push(row);
  }
  rows
}
