use polars::error::PolarsError;
use serde::Serialize;
use thiserror::Error;

/// A single data row that could not be turned into an observation.
///
/// Collected alongside the rows that did parse; it only becomes fatal when the
/// caller asks for a clean table via [`crate::Table::ensure_clean`].
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("Row {row}: column '{column}' has unusable value '{value}' ({reason})")]
pub struct CorruptRowError {
    /// 1-based index of the data row (the header is not counted).
    pub row: usize,
    pub column: String,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Input could not be parsed as CSV")]
    MalformedInput(#[source] PolarsError),

    #[error("Required column '{column}' not found in CSV header (found: {found:?})")]
    MissingColumn { column: String, found: Vec<String> },

    #[error("Failed reading column '{column}' from parsed CSV")]
    ColumnAccess {
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error(transparent)]
    CorruptRow(#[from] CorruptRowError),
}
