use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, RosterError>;

/// Error type covering the different failure cases that can occur while a
/// registration workbook is read, mapped through the event schema, and
/// aggregated into workshops.
///
/// Some variants are fatal for a whole parse (missing roster sheet, empty
/// input, invalid schema). Others are raised for a single row or cell and are
/// logged and skipped by the loaders.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the input stream contains no bytes at all.
    #[error("input workbook is empty")]
    EmptyInput,

    /// Raised when the workbook contains no worksheets.
    #[error("workbook contains no worksheets")]
    EmptyWorkbook,

    /// Raised when a sheet required by the schema is absent.
    #[error("missing sheet '{expected}' (available: {})", .available.join(", "))]
    MissingSheet {
        expected: String,
        available: Vec<String>,
    },

    /// Raised when a configured column cannot be found in a sheet header.
    #[error("sheet '{sheet}' has no column matching {column}")]
    MissingColumn { sheet: String, column: String },

    /// Raised when a row lacks every field that could identify an attendee.
    #[error("sheet '{sheet}' row {row}: missing required field '{field}'")]
    MissingField {
        sheet: String,
        row: usize,
        field: String,
    },

    /// Raised when a cell holds a value that cannot be read as text, such as
    /// an Excel error literal.
    #[error("sheet '{sheet}' row {row} column {column}: unreadable cell value {value}")]
    CellValue {
        sheet: String,
        row: usize,
        column: usize,
        value: String,
    },

    /// Raised when a workshop cell does not yield a workshop name.
    #[error("sheet '{sheet}' row {row}: invalid workshop cell '{value}'")]
    InvalidWorkshopFormat {
        sheet: String,
        row: usize,
        value: String,
    },

    /// Raised when the event schema is structurally invalid.
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    /// Catch-all for a worksheet that exists but could not be read.
    #[error("sheet '{sheet}' could not be parsed: {message}")]
    Parsing { sheet: String, message: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
