use thiserror::Error;

/// Errors produced while turning CTIS payloads into database rows.
///
/// Transport and driver-level failures stay `anyhow` at the call sites;
/// this enum covers the cases the ingest layer itself can detect.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid date '{value}' in {field}")]
    InvalidDate { field: &'static str, value: String },

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
