use polars::prelude::PolarsError;
use std::{io, path::PathBuf};
use thiserror::Error;
use tokio::task::JoinError;

/**
Result type to simplify function signatures.

This is a custom result type that uses our custom `LoaderError` for the error type.

Functions can return `LoaderResult<T>` and then use `?` to automatically propagate errors.
*/
pub type LoaderResult<T> = Result<T, LoaderError>;

/**
Custom error type for Polars Load.

This enum defines all the possible errors that can occur while reading a file,
planning a load or talking to the database.

We use the `thiserror` crate to derive the `Error` trait and automatically
implement `Display` using the `#[error(...)]` attribute. The `Display` text is
what the user sees in the error window, so every variant keeps the underlying
failure text.
*/
#[derive(Error, Debug)]
pub enum LoaderError {
    // Wrapper for standard IO errors (temporary file, reading the upload).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Wrapper for Polars errors: CSV parsing, CSV writing, column lookups.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    // Wrapper for errors raised while opening or reading a workbook.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    // Wrapper for every failure reported by the MySQL driver or server:
    // connection, TRUNCATE, LOAD DATA, COMMIT and COUNT alike.
    #[error("Database error: {0}")]
    Database(#[from] mysql_async::Error),

    // Errors related to the file type (e.g., unsupported file extension).
    #[error("File type error: {0}")]
    FileType(String),

    // Wrapper for Tokio JoinErrors, occurring when asynchronous tasks fail.
    #[error("Tokio JoinError: {0}")]
    TokioJoin(#[from] JoinError),

    // Errors occurring when receiving data from asynchronous channels.
    #[error("Channel receive error: {0}")]
    ChannelReceive(String),

    // Indicates that a specified file could not be found, storing the attempted path.
    #[error("File not found: {0:#?}")]
    FileNotFound(PathBuf),

    /// A spreadsheet column label contains something other than `A`-`Z`.
    #[error("Invalid column label '{label}': {reason}")]
    InvalidLabel { label: String, reason: String },

    /// The header row cannot be mapped onto destination columns.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The requested column does not exist in the uploaded data.
    #[error("Column not found: '{0}'")]
    ColumnNotFound(String),

    /// A database setting was not supplied by the command line or the environment.
    #[error("Missing database setting '{name}' (use --{flag} or the {env} environment variable)")]
    MissingConfig {
        name: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("Invalid value for command-line argument '{arg_name}': {reason}")]
    InvalidArgument {
        arg_name: String, // Context about *which* argument failed
        reason: String,   // The specific error reason
    },

    // A catch-all for other, less specific errors not covered by specific variants.
    #[error("Other error: {0}")]
    Other(String),
}

// Implementation of the From trait to convert a String into a LoaderError.
impl From<String> for LoaderError {
    fn from(err: String) -> LoaderError {
        // Prefer using specific error variants when possible, fallback to Other.
        LoaderError::Other(err)
    }
}
