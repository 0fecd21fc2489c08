use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool locates, ingests, or exports a questionnaire workbook.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when no workbook can be located in the data directory.
    #[error(
        "workbook '{expected}' not found in {}; place the questionnaire workbook in that directory",
        .directory.display()
    )]
    FileNotFound { directory: PathBuf, expected: String },

    /// Raised when the user provides a workbook path that does not exist.
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Raised when the mandatory questionnaire sheet is absent.
    #[error("sheet '{0}' does not exist in the workbook")]
    MissingSheet(String),

    /// Raised when the questionnaire sheet yields no recognisable question.
    #[error("no questions found in sheet '{0}'; check the questionnaire layout")]
    EmptyQuestionnaire(String),

    /// Raised when a sheet does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
