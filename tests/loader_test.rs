use creaming::loader::{
    INCOMPLETE_DATA_WARNING, excel_from_bytes, from_csv, ingest, load_table, read_table,
};
use creaming::table::{COST_COLUMN, NAME_COLUMN, SAVINGS_COLUMN};
use creaming::{Error, Value};
use std::io::Write;

const PROJECTS_CSV: &str = "\
Project Summary Name,Cost $,Annual Savings $ K,Owner
LED retrofit,100,50,facilities
\"Chiller, north\",200,150,
";

#[test]
fn csv_file_loads_with_types() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(PROJECTS_CSV.as_bytes()).unwrap();

    let table = from_csv(file.path()).unwrap();
    assert_eq!(
        table.columns,
        vec![NAME_COLUMN, COST_COLUMN, SAVINGS_COLUMN, "Owner"]
    );
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.rows[1],
        vec![
            Value::Text("Chiller, north".into()),
            Value::Number(200.0),
            Value::Number(150.0),
            Value::Empty,
        ]
    );

    // extension dispatch
    let same = load_table(file.path()).unwrap();
    assert_eq!(same, table);
    println!("✓ CSV loaded with {} rows", table.len());
}

#[test]
fn complete_upload_has_no_warning() {
    let ingested = ingest(PROJECTS_CSV.as_bytes(), "projects.csv").unwrap();
    assert!(ingested.warning.is_none());
    assert_eq!(ingested.table.get(0, COST_COLUMN), Some(&Value::Number(100.0)));
}

#[test]
fn missing_cost_zeroes_both_columns() {
    let csv = "Project Summary Name,Annual Savings $ K\nA,50\nB,150\n";
    let ingested = ingest(csv.as_bytes(), "partial.csv").unwrap();

    assert_eq!(ingested.warning.as_deref(), Some(INCOMPLETE_DATA_WARNING));
    let table = &ingested.table;
    assert!(table.has_column(COST_COLUMN));
    for row in 0..table.len() {
        assert_eq!(table.get(row, COST_COLUMN), Some(&Value::Number(0.0)));
        assert_eq!(table.get(row, SAVINGS_COLUMN), Some(&Value::Number(0.0)));
    }
    println!("✓ missing 'Cost $' patched to zero with a warning");
}

#[test]
fn missing_both_columns_appends_them() {
    let ingested = ingest(b"Project Summary Name\nA\n", "names.csv").unwrap();
    assert!(ingested.warning.is_some());
    assert_eq!(
        ingested.table.columns,
        vec![NAME_COLUMN, COST_COLUMN, SAVINGS_COLUMN]
    );
}

#[test]
fn unsupported_extensions_are_rejected() {
    assert!(matches!(
        read_table(b"whatever", "notes.txt"),
        Err(Error::UnsupportedFile(_))
    ));
    assert!(matches!(
        read_table(b"whatever", "noext"),
        Err(Error::UnsupportedFile(_))
    ));
}

#[test]
fn empty_csv_is_malformed() {
    assert!(matches!(
        read_table(b"\n\n", "empty.csv"),
        Err(Error::Malformed(_))
    ));
}

#[test]
fn garbage_xlsx_is_an_error() {
    assert!(excel_from_bytes(b"not a zip").is_err());
}

#[test]
fn xlsx_first_sheet_is_read() {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, NAME_COLUMN).unwrap();
    sheet.write_string(0, 1, COST_COLUMN).unwrap();
    sheet.write_string(0, 2, SAVINGS_COLUMN).unwrap();
    sheet.write_string(1, 0, "Pumps").unwrap();
    sheet.write_number(1, 1, 120.0).unwrap();
    sheet.write_number(1, 2, 30.5).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let ingested = ingest(&bytes, "upload.xlsx").unwrap();
    assert!(ingested.warning.is_none());
    assert_eq!(
        ingested.table.rows,
        vec![vec![
            Value::Text("Pumps".into()),
            Value::Number(120.0),
            Value::Number(30.5),
        ]]
    );
}
