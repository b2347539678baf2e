use creaming::downloader::{XLSX_FILENAME, to_csv};
use creaming::graph::GraphOptions;
use creaming::slides::PPTX_FILENAME;
use creaming::{Budget, analyze, loader};
use std::env;
use std::path::PathBuf;
use std::time::Instant;

const CHART_FILENAME: &str = "creaming_curve.png";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start = Instant::now();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 4 {
        eprintln!("Usage: {} <input.xlsx|input.csv> [budget] [out_dir]", args[0]);
        return Err("expected <input> [budget] [out_dir]".into());
    }

    let input = PathBuf::from(&args[1]);
    let budget = match args.get(2) {
        Some(raw) => Budget::new(raw.parse()?)?,
        None => Budget::default(),
    };
    let out_dir = args.get(3).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let bytes = std::fs::read(&input)?;
    let filename = input.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let ingested = loader::ingest(&bytes, filename)?;
    if let Some(warning) = &ingested.warning {
        eprintln!("warning: {}", warning);
    }

    let analysis = analyze(&ingested.table, &[], budget)?;
    let artifacts = analysis.artifacts(&GraphOptions::default())?;

    std::fs::create_dir_all(&out_dir)?;
    std::fs::write(out_dir.join(CHART_FILENAME), &artifacts.chart_png)?;
    std::fs::write(out_dir.join(XLSX_FILENAME), &artifacts.xlsx)?;
    std::fs::write(out_dir.join(PPTX_FILENAME), &artifacts.pptx)?;

    print!("{}", to_csv(analysis.table()));
    println!(
        "{} written to {} in {:.1}s",
        analysis.title(),
        out_dir.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
