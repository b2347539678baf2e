use creaming::downloader::to_xlsx;
use creaming::graph::{GraphOptions, render_png};
use creaming::loader::excel_from_bytes;
use creaming::slides::{SlideImage, to_pptx};
use creaming::table::{COST_COLUMN, NAME_COLUMN, SAVINGS_COLUMN};
use creaming::{Budget, BudgetClass, Table, Value, analyze};
use image::GenericImageView;
use std::io::{Cursor, Read};
use zip::ZipArchive;

fn sample_table() -> Table {
    let mut table = Table::new(vec![
        NAME_COLUMN.to_string(),
        COST_COLUMN.to_string(),
        SAVINGS_COLUMN.to_string(),
        "Site".to_string(),
    ]);
    for (name, cost, savings, site) in [
        ("A", 100.0, 50.0, "north"),
        ("B", 200.0, 150.0, "south"),
        ("C", 40.0, 10.0, "east"),
        ("D", 75.5, 60.25, "west"),
    ] {
        table.push_row(vec![
            Value::Text(name.into()),
            Value::Number(cost),
            Value::Number(savings),
            Value::Text(site.into()),
        ]);
    }
    table
}

fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut out = Vec::new();
    entry.read_to_end(&mut out).unwrap();
    out
}

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    use image::ImageEncoder;
    use image::codecs::png::PngEncoder;

    let pixels = vec![200u8; (width * height * 3) as usize];
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&pixels, width, height, image::ColorType::Rgb8)
        .unwrap();
    png
}

#[test]
fn spreadsheet_round_trips() {
    let analysis = analyze(&sample_table(), &[], Budget::new(250.0).unwrap()).unwrap();
    let xlsx = analysis.spreadsheet().unwrap();

    let reread = excel_from_bytes(&xlsx).unwrap();
    let original = analysis.table();
    assert_eq!(reread.columns, original.columns);
    assert_eq!(reread.len(), original.len());
    assert_eq!(reread.rows, original.rows);
    println!("✓ XLSX re-parsed into {} identical rows", reread.len());
}

#[test]
fn spreadsheet_carries_header_and_budget_fills() {
    let analysis = analyze(&sample_table(), &[], Budget::new(250.0).unwrap()).unwrap();
    assert!(analysis.classes.contains(&BudgetClass::WithinBudget));
    assert!(analysis.classes.contains(&BudgetClass::OutsideBudget));

    let xlsx = analysis.spreadsheet().unwrap();
    let styles = String::from_utf8(read_entry(&xlsx, "xl/styles.xml")).unwrap();
    assert!(styles.contains("FF0000FF"), "blue header fill");
    assert!(styles.contains("FF90EE90"), "green row fill");
    assert!(styles.contains("FFFF9999"), "red row fill");

    let workbook = String::from_utf8(read_entry(&xlsx, "xl/workbook.xml")).unwrap();
    assert!(workbook.contains("name=\"DataFrame\""));
}

#[test]
fn unpartitioned_rows_are_unfilled() {
    let analysis = analyze(&sample_table(), &[], Budget::default()).unwrap();
    let xlsx = to_xlsx(analysis.table(), &analysis.classes).unwrap();
    let styles = String::from_utf8(read_entry(&xlsx, "xl/styles.xml")).unwrap();
    assert!(styles.contains("FF0000FF"));
    assert!(!styles.contains("FF90EE90"));
    assert!(!styles.contains("FFFF9999"));
}

#[test]
fn non_finite_ratio_exported_as_text() {
    let mut table = sample_table();
    table.push_row(vec![
        Value::Text("free".into()),
        Value::Number(0.0),
        Value::Number(5.0),
        Value::Text("hq".into()),
    ]);
    let analysis = analyze(&table, &[], Budget::default()).unwrap();
    let reread = excel_from_bytes(&analysis.spreadsheet().unwrap()).unwrap();

    assert_eq!(reread.get(0, NAME_COLUMN), Some(&Value::Text("free".into())));
    assert_eq!(
        reread.get(0, "Savings ratio"),
        Some(&Value::Text("inf".into()))
    );
}

#[test]
fn missing_values_exported_as_blank_cells() {
    let mut table = sample_table();
    table.push_row(vec![
        Value::Text("unknown".into()),
        Value::Number(10.0),
        Value::Empty,
        Value::Text("hq".into()),
    ]);
    let analysis = analyze(&table, &[], Budget::new(250.0).unwrap()).unwrap();
    let reread = excel_from_bytes(&analysis.spreadsheet().unwrap()).unwrap();

    // NaN ratio sorts last
    let last = reread.len() - 1;
    assert_eq!(reread.get(last, NAME_COLUMN), Some(&Value::Text("unknown".into())));
    assert_eq!(reread.get(last, "Savings ratio"), Some(&Value::Empty));
    assert_eq!(reread.get(last, "Cumulative Savings"), Some(&Value::Empty));
    assert_eq!(
        reread.get(last, "Cumulative cost"),
        Some(&Value::Number(425.5))
    );
}

#[test]
fn presentation_has_one_slide_with_title_and_picture() {
    let png = tiny_png(4, 2);
    let pptx = to_pptx(
        "Creaming Curve with Budget $1,500",
        SlideImage {
            png: &png,
            width: 4,
            height: 2,
        },
    )
    .unwrap();

    let names = entry_names(&pptx);
    let slides: Vec<&String> = names
        .iter()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .collect();
    assert_eq!(slides.len(), 1);
    assert!(names.contains(&"[Content_Types].xml".to_string()));

    let slide = String::from_utf8(read_entry(&pptx, "ppt/slides/slide1.xml")).unwrap();
    assert!(slide.contains("Creaming Curve with Budget $1,500"));
    assert!(slide.contains("r:embed=\"rId2\""));
    // 8in wide at a 2:1 aspect ratio is 4in tall
    assert!(slide.contains("cx=\"7315200\" cy=\"3657600\""));
    assert!(slide.contains("<a:off x=\"914400\" y=\"914400\"/>"));

    let media = read_entry(&pptx, "ppt/media/image1.png");
    assert_eq!(media, png);
    println!("✓ PPTX holds one slide and the chart image");
}

#[test]
fn chart_renders_to_png() {
    let analysis = analyze(&sample_table(), &[], Budget::new(250.0).unwrap()).unwrap();
    let options = GraphOptions {
        width: 400,
        height: 300,
        ..GraphOptions::default()
    };
    let png = render_png(
        &analysis.curve.points,
        &analysis.classes,
        analysis.budget,
        &options,
    )
    .unwrap();
    assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));

    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (400, 300));
}

#[test]
fn chart_without_labels_renders() {
    let options = GraphOptions {
        width: 200,
        height: 100,
        labels: false,
        ..GraphOptions::default()
    };
    let png = render_png(&[], &[], Budget::default(), &options).unwrap();
    assert!(png.starts_with(b"\x89PNG"));
}
