use crate::budget::BudgetClass;
use crate::error::Result;
use crate::table::{Table, Value};
use log::info;
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook, Worksheet};

/// Download name of the spreadsheet export.
pub const XLSX_FILENAME: &str = "creaming_curve_data.xlsx";
/// MIME type of the spreadsheet export.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// Worksheet holding the table.
pub const SHEET_NAME: &str = "DataFrame";

const HEADER_FILL: u32 = 0x0000FF;
const WITHIN_FILL: u32 = 0x90EE90;
const OUTSIDE_FILL: u32 = 0xFF9999;

/// Convert a table to CSV format
///
/// The header row holds the column names. Fields containing commas, quotes
/// or newlines are quoted, with embedded quotes doubled.
///
/// # Examples
/// ```
/// use creaming::downloader::to_csv;
/// use creaming::table::{Table, Value};
///
/// let mut table = Table::new(vec!["name".into(), "cost".into()]);
/// table.push_row(vec![Value::Text("a, b".into()), Value::Number(5.0)]);
/// assert_eq!(to_csv(&table), "name,cost\n\"a, b\",5\n");
/// ```
pub fn to_csv(table: &Table) -> String {
    let mut csv_content = String::new();

    push_csv_line(&mut csv_content, table.columns.iter().map(String::as_str));
    for row in &table.rows {
        let fields: Vec<String> = row.iter().map(Value::label).collect();
        push_csv_line(&mut csv_content, fields.iter().map(String::as_str));
    }

    csv_content
}

fn push_csv_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, value) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            out.push_str(&format!("\"{}\"", value.replace('"', "\"\"")));
        } else {
            out.push_str(value);
        }
    }
    out.push('\n');
}

/// Convert a derived table to XLSX format
///
/// The header row is bold white on blue. Each body row is filled light green
/// or light red by its budget class; unpartitioned rows keep the default
/// style. `classes` is in row order and may be shorter than the table, in
/// which case the remaining rows are unstyled.
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an error
pub fn to_xlsx(table: &Table, classes: &[BudgetClass]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(SHEET_NAME)?;

    let header = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_pattern(FormatPattern::Solid);
    let within = solid_fill(WITHIN_FILL);
    let outside = solid_fill(OUTSIDE_FILL);

    for (c, name) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, name.as_str(), &header)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let format = match classes.get(r) {
            Some(BudgetClass::WithinBudget) => Some(&within),
            Some(BudgetClass::OutsideBudget) => Some(&outside),
            Some(BudgetClass::Unpartitioned) | None => None,
        };
        for (c, value) in row.iter().enumerate() {
            write_value(&mut worksheet, (r + 1) as u32, c as u16, value, format)?;
        }
    }

    worksheet.autofit();
    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;
    info!(
        "wrote spreadsheet: {} rows, {} bytes",
        table.len(),
        buffer.len()
    );
    Ok(buffer)
}

fn solid_fill(rgb: u32) -> Format {
    Format::new()
        .set_background_color(Color::RGB(rgb))
        .set_pattern(FormatPattern::Solid)
}

// Missing values (NaN) become blank cells. Infinities have no XLSX encoding
// and are written as text.
fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
    format: Option<&Format>,
) -> Result<()> {
    let missing = matches!(value, Value::Empty) || matches!(value, Value::Number(n) if n.is_nan());
    if missing {
        if let Some(f) = format {
            worksheet.write_blank(row, col, f)?;
        }
        return Ok(());
    }

    match (value, format) {
        (Value::Number(n), Some(f)) if n.is_finite() => {
            worksheet.write_number_with_format(row, col, *n, f)?;
        }
        (Value::Number(n), None) if n.is_finite() => {
            worksheet.write_number(row, col, *n)?;
        }
        (other, Some(f)) => {
            worksheet.write_string_with_format(row, col, other.label(), f)?;
        }
        (other, None) => {
            worksheet.write_string(row, col, other.label())?;
        }
    }
    Ok(())
}
