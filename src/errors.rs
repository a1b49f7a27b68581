use thiserror::Error;

/// Errors surfaced while extracting records from notification content.
///
/// Only structural problems end up here. Expected irregularities — an
/// unparsable transaction date, an unknown transaction-type string, a
/// missing optional field, a short export row — are handled inside the
/// strategies and never reach the caller.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Amount could not be coerced to a decimal after locale normalization
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    /// Export row carries a date the institution's format does not produce
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// A sentinel phrase needed to bound the scan window is absent
    #[error("sentinel {0:?} not found in message body")]
    MissingSentinel(&'static str),

    /// A message part declares a character set the decoder does not know
    #[error("unknown character set: {0:?}")]
    UnknownCharset(String),

    /// Transport-level base64 payload is broken
    #[error("broken transfer encoding: {0}")]
    TransferEncoding(#[from] base64::DecodeError),

    /// Row splitting failed before the strategy saw the row
    #[error("malformed export row: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading an export file from disk
    #[error("failed to read export content: {0}")]
    ReadContentFailed(#[from] std::io::Error),

    /// Export content matches none of the known institutions
    #[error("unsupported export format")]
    UnsupportedFormat,

    /// A strategy was asked for a record type it cannot produce
    #[error("strategy cannot produce {0} records")]
    UnsupportedPass(&'static str),

    /// The builder was called without content or a file path
    #[error("content or file path is required")]
    MissingContentAndPath,
}

/// Convenient alias for Result with our main error type
pub type ExtractResult<T> = Result<T, ExtractError>;
