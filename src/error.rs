//! Error types for the ctfexport library.

use std::io;
use thiserror::Error;

/// Result type alias for ctfexport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching, formatting, or writing an export.
///
/// Rich-text rendering never fails; these errors come from the I/O
/// collaborators around it.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error writing the ZIP package of a workbook.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error writing XML content.
    #[error("XML error: {0}")]
    Xml(String),

    /// Transport-level failure talking to the CMS.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The CMS answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid or malformed data in a payload.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A worksheet name the spreadsheet format does not accept.
    #[error("Invalid sheet name: {0:?}")]
    InvalidSheetName(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("missing space id".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing space id");

        let err = Error::Api {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API error (401): Unauthorized");

        let err = Error::InvalidSheetName("a/b".to_string());
        assert_eq!(err.to_string(), "Invalid sheet name: \"a/b\"");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
