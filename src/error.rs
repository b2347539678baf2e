//! Error type shared by every stage of the pipeline.

/// All errors that can occur while ingesting, deriving or exporting a table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The uploaded file could not be read as a table.
    #[error("Malformed upload: {0}")]
    Malformed(String),

    /// Upload with an extension we have no reader for.
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    /// A cost or savings cell holds text that is not a number.
    #[error("Row {row}: '{column}' value {value:?} is not a number")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },

    /// An edit pointed at a row or column that does not exist.
    #[error("Invalid edit: {0}")]
    Edit(String),

    /// Negative or non-finite budget.
    #[error("Invalid budget: {0}")]
    Budget(f64),

    /// Chart drawing failed.
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    /// Reading an XLSX workbook failed.
    #[error("XLSX read: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    /// Writing an XLSX workbook failed.
    #[error("XLSX write: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// PPTX packaging failed.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// PNG encoding failed.
    #[error("Image encoding: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
