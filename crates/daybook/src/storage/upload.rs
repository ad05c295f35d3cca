//! Image upload policy.
//!
//! Decides which files may be attached to a note and turns the result of an
//! upload into the short messages shown to the user.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::config::Config;
use crate::note::DateKey;

/// Whether `store_image` wrote a new file or found one already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOutcome {
    /// The bytes were written to a new file.
    Written,
    /// A file with that name existed; nothing was written.
    Reused,
}

/// Why an upload was turned away before touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum Rejection {
    /// No filename was given.
    NoSelectedFile,
    /// The upload carried no bytes.
    NoFilePart,
    /// The extension is not on the allow list.
    UnsupportedType,
    /// Nothing usable was left of the name after sanitizing.
    InvalidName,
    /// The file is larger than the configured limit.
    TooLarge {
        /// Size of the upload.
        size: u64,
        /// Configured maximum.
        limit: u64,
    },
}

/// What happened to an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum UploadOutcome {
    /// The upload was refused.
    Rejected(Rejection),
    /// The image is on disk and referenced from the note.
    Accepted {
        /// Sanitized name the image is stored under.
        filename: String,
        /// Whether the file was new or already present.
        stored: StoreOutcome,
        /// Whether a reference line was appended to the note.
        reference_added: bool,
    },
}

/// Result of an upload, with the messages to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    /// Note the image was attached to.
    pub date: DateKey,
    /// What happened.
    pub outcome: UploadOutcome,
    /// User-facing messages, in order.
    pub messages: Vec<String>,
}

impl UploadReport {
    /// Whether the image ended up attached to the note.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, UploadOutcome::Accepted { .. })
    }
}

/// Rules an upload must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    allowed_extensions: Vec<String>,
    max_bytes: Option<u64>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: ["png", "jpg", "jpeg", "gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_bytes: None,
        }
    }
}

impl UploadPolicy {
    /// Policy with the given extensions and optional size limit.
    #[must_use]
    pub fn new(allowed_extensions: Vec<String>, max_bytes: Option<u64>) -> Self {
        Self {
            allowed_extensions,
            max_bytes,
        }
    }

    /// Policy from the `[uploads]` configuration section.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.uploads.allowed_extensions.clone(),
            config.max_image_bytes(),
        )
    }

    /// Check a filename's extension against the allow list.
    ///
    /// Only the suffix after the last `.` is considered, case-insensitively.
    #[must_use]
    pub fn is_allowed(&self, filename: &str) -> bool {
        filename.rsplit_once('.').is_some_and(|(_, ext)| {
            let ext = ext.to_lowercase();
            self.allowed_extensions.iter().any(|allowed| *allowed == ext)
        })
    }

    /// Screen an upload. Returns the sanitized filename when it may be stored.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] describing why the upload was refused.
    pub fn check(&self, original_name: &str, size: u64) -> Result<String, Rejection> {
        if original_name.is_empty() {
            return Err(Rejection::NoSelectedFile);
        }
        if size == 0 {
            return Err(Rejection::NoFilePart);
        }
        if !self.is_allowed(original_name) {
            return Err(Rejection::UnsupportedType);
        }
        if let Some(limit) = self.max_bytes {
            if size > limit {
                return Err(Rejection::TooLarge { size, limit });
            }
        }

        let filename = sanitize_filename(original_name);
        if filename.is_empty() {
            return Err(Rejection::InvalidName);
        }
        if !self.is_allowed(&filename) {
            return Err(Rejection::UnsupportedType);
        }
        Ok(filename)
    }

    /// User-facing message for a rejection.
    #[must_use]
    pub fn rejection_message(&self, rejection: &Rejection) -> String {
        match rejection {
            Rejection::NoSelectedFile => "No selected file".to_string(),
            Rejection::NoFilePart => "No image file part".to_string(),
            Rejection::UnsupportedType => format!(
                "Unsupported file type. Allowed: {}.",
                self.allowed_extensions.join(", ")
            ),
            Rejection::InvalidName => "Invalid file name.".to_string(),
            Rejection::TooLarge { size, limit } => {
                format!("Image is too large ({size} bytes, limit {limit} bytes).")
            }
        }
    }
}

/// Messages for an accepted upload.
pub(crate) fn accepted_messages(
    filename: &str,
    stored: StoreOutcome,
    reference_added: bool,
) -> Vec<String> {
    let mut messages = vec![match stored {
        StoreOutcome::Reused => format!("Image '{filename}' already exists, using existing file."),
        StoreOutcome::Written => format!("Image '{filename}' uploaded and added to your thoughts."),
    }];
    if !reference_added {
        messages.push(format!(
            "Image '{filename}' already referenced in your thoughts."
        ));
    }
    messages
}

/// Reduce an arbitrary client filename to a safe, flat name.
///
/// The name is NFKD-normalized and folded to ASCII, so accented letters keep
/// their base letter. `/` and runs of whitespace become `_`, every character
/// outside `[A-Za-z0-9_.-]` (including `\`) is dropped, and leading or
/// trailing `.` and `_` are stripped. The result may be empty.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars =
        UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("Invalid regex pattern"));

    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let spaced = ascii.replace('/', " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    unsafe_chars
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}
