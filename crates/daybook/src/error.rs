//! Error types for daybook.
//!
//! This module defines all error types used throughout the daybook crate,
//! providing path context for filesystem failures and user-friendly messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for daybook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Note Errors ===
    /// A date key was not a valid `YYYY-MM-DD` calendar date.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// Failed to read a note file.
    #[error("failed to read note at {path}: {source}")]
    NoteRead {
        /// Path to the note file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a note file.
    #[error("failed to write note at {path}: {source}")]
    NoteWrite {
        /// Path to the note file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The front matter block could not be decoded.
    #[error("malformed front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    // === Image Errors ===
    /// An image filename was empty after sanitization.
    #[error("invalid image filename '{name}'")]
    InvalidFilename {
        /// The filename as supplied.
        name: String,
    },

    /// Failed to write an image file.
    #[error("failed to write image at {path}: {source}")]
    ImageWrite {
        /// Path to the image file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for daybook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid date error.
    #[must_use]
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// Create an invalid filename error.
    #[must_use]
    pub fn invalid_filename(name: impl Into<String>) -> Self {
        Self::InvalidFilename { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_date_display() {
        let err = Error::invalid_date("2024-13-01");
        assert_eq!(
            err.to_string(),
            "invalid date '2024-13-01': expected YYYY-MM-DD"
        );
    }

    #[test]
    fn test_invalid_filename_display() {
        let err = Error::invalid_filename("../");
        assert_eq!(err.to_string(), "invalid image filename '../'");
    }

    #[test]
    fn test_note_write_error_display() {
        let err = Error::NoteWrite {
            path: PathBuf::from("/posts/2024-01-01.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/posts/2024-01-01.md"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_note_read_error_display() {
        let err = Error::NoteRead {
            path: PathBuf::from("/posts/2024-01-02.md"),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "not utf-8"),
        };
        assert!(err.to_string().contains("not utf-8"));
    }

    #[test]
    fn test_image_write_error_display() {
        let err = Error::ImageWrite {
            path: PathBuf::from("/images/2024-01-01/cat.png"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cat.png"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_result: std::result::Result<Vec<String>, serde_yaml::Error> =
            serde_yaml::from_str("tags: [unclosed");
        if let Err(yaml_err) = yaml_result {
            let err: Error = yaml_err.into();
            assert!(matches!(err, Error::FrontMatter(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "allowed_extensions must not be empty".to_string(),
        };
        assert!(err.to_string().contains("allowed_extensions"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
