use crate::error::{Error, Result};
use crate::table::{COST_COLUMN, SAVINGS_COLUMN, Table, Value};
use log::{info, warn};
use std::io::Cursor;
use std::path::Path;

/// Warning surfaced when a required column is missing from an upload.
pub const INCOMPLETE_DATA_WARNING: &str =
    "Data is incomplete! Please enter 'Cost $' and 'Annual Savings $ K' values.";

/// Result of ingesting an upload: the table plus an optional user-facing warning.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Ingested {
    pub table: Table,
    pub warning: Option<String>,
}

/// Load a table from a CSV file
///
/// The first line is the header. Cells that parse as numbers become
/// `Value::Number`, blank cells `Value::Empty`, everything else text.
///
/// # Examples
/// ```no_run
/// use creaming::loader::from_csv;
///
/// match from_csv("projects.csv") {
///     Ok(table) => println!("Loaded {} rows", table.len()),
///     Err(e) => eprintln!("Error loading CSV: {}", e),
/// }
/// ```
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<Table> {
    let bytes = std::fs::read(filepath)?;
    csv_from_bytes(&bytes)
}

/// Parse CSV content already held in memory.
pub fn csv_from_bytes(bytes: &[u8]) -> Result<Table> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::Malformed(format!("CSV is not UTF-8: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| Error::Malformed("CSV file is empty".to_string()))?;

    let columns = name_columns(parse_csv_row(header)?);
    let mut table = Table::new(columns);

    for line in lines {
        let row = parse_csv_row(line)?
            .into_iter()
            .map(|field| csv_value(&field))
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

fn csv_value(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Value::Empty
    } else if let Ok(n) = trimmed.parse::<f64>() {
        Value::Number(n)
    } else {
        Value::Text(field.to_string())
    }
}

/// Load a table from an Excel file
///
/// Reads the first worksheet; the first row is the header.
///
/// # Examples
/// ```no_run
/// use creaming::loader::from_excel;
///
/// match from_excel("projects.xlsx") {
///     Ok(table) => println!("Loaded {} rows", table.len()),
///     Err(e) => eprintln!("Error loading Excel: {}", e),
/// }
/// ```
pub fn from_excel(filepath: impl AsRef<Path>) -> Result<Table> {
    let bytes = std::fs::read(filepath)?;
    excel_from_bytes(&bytes)
}

/// Parse an XLSX workbook already held in memory.
pub fn excel_from_bytes(bytes: &[u8]) -> Result<Table> {
    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Malformed("No sheets found in Excel file".to_string()))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| Error::Malformed("Excel sheet is empty".to_string()))?;

    let columns = name_columns(
        header
            .iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string(),
            })
            .collect(),
    );
    let mut table = Table::new(columns);

    for row in rows {
        let values = row
            .iter()
            .map(|cell| match cell {
                Data::Int(i) => Value::Number(*i as f64),
                Data::Float(f) => Value::Number(*f),
                Data::String(s) if s.trim().is_empty() => Value::Empty,
                Data::String(s) => Value::Text(s.clone()),
                Data::Empty => Value::Empty,
                other => Value::Text(other.to_string()),
            })
            .collect();
        table.push_row(values);
    }

    Ok(table)
}

// Blank headers get pandas-style placeholder names so every column stays addressable.
fn name_columns(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim().to_string();
            if name.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name
            }
        })
        .collect()
}

// Parse a CSV row into a vector of strings
fn parse_csv_row(line: &str) -> Result<Vec<String>> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                result.push(std::mem::take(&mut current_field));
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    if in_quotes {
        return Err(Error::Malformed(format!("Unterminated quote in line: {}", line)));
    }

    result.push(current_field);
    Ok(result)
}

/// Detect file type and load appropriate format
///
/// # Examples
/// ```no_run
/// use creaming::loader::load_table;
///
/// match load_table("projects.xlsx") {
///     Ok(table) => println!("Loaded {} columns", table.columns.len()),
///     Err(e) => eprintln!("Error loading file: {}", e),
/// }
/// ```
pub fn load_table(filepath: impl AsRef<Path>) -> Result<Table> {
    let path = filepath.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    read_table(&bytes, name)
}

/// Parse uploaded bytes, choosing the reader from the file name's extension.
pub fn read_table(bytes: &[u8], filename: &str) -> Result<Table> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => csv_from_bytes(bytes),
        Some("xlsx") | Some("xlsm") => excel_from_bytes(bytes),
        Some(ext) => Err(Error::UnsupportedFile(format!(".{}", ext))),
        None => Err(Error::UnsupportedFile(format!("'{}' has no extension", filename))),
    }
}

/// Make sure the cost and savings columns exist.
///
/// If either is missing, both are overwritten with zeros and a warning is
/// returned alongside the patched table. The flow never stops here.
pub fn ensure_required_columns(mut table: Table) -> Ingested {
    if table.has_column(COST_COLUMN) && table.has_column(SAVINGS_COLUMN) {
        return Ingested {
            table,
            warning: None,
        };
    }

    warn!(
        "upload is missing a required column (have: {:?}); defaulting to zero",
        table.columns
    );
    table.fill_column(COST_COLUMN, Value::Number(0.0));
    table.fill_column(SAVINGS_COLUMN, Value::Number(0.0));

    Ingested {
        table,
        warning: Some(INCOMPLETE_DATA_WARNING.to_string()),
    }
}

/// Full ingestion step: parse the upload, then patch required columns.
pub fn ingest(bytes: &[u8], filename: &str) -> Result<Ingested> {
    let table = read_table(bytes, filename)?;
    info!(
        "ingested '{}': {} rows x {} columns",
        filename,
        table.len(),
        table.columns.len()
    );
    Ok(ensure_required_columns(table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_honour_quotes() {
        let row = parse_csv_row(r#"a,"b, c","say ""hi""",,"#).unwrap();
        assert_eq!(row, vec!["a", "b, c", r#"say "hi""#, "", ""]);
    }

    #[test]
    fn unterminated_quote_is_malformed() {
        assert!(matches!(parse_csv_row(r#"a,"b"#), Err(Error::Malformed(_))));
    }

    #[test]
    fn blank_headers_get_placeholders() {
        let names = name_columns(vec!["a".into(), " ".into(), "c".into()]);
        assert_eq!(names, vec!["a", "Unnamed: 1", "c"]);
    }
}
