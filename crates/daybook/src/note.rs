//! Core journal types for daybook.
//!
//! A journal is a set of notes keyed by calendar date. Each date may also own
//! a folder of images, which notes embed through markdown image references.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Format used for date keys in file names, URLs and front matter.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// URL prefix under which images are referenced from note bodies.
pub const IMAGE_URL_PREFIX: &str = "/images";

/// A calendar date identifying one note and one image folder.
///
/// Always renders as `YYYY-MM-DD`. Parsing is strict: the input must be the
/// exact zero-padded rendering of a real date, so a key can never contain
/// path separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wrap a calendar date.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's date on the local clock.
    #[must_use]
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Parse a `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDate`] if the string is not a zero-padded,
    /// existing calendar date.
    pub fn parse(value: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|_| Error::invalid_date(value))?;
        // chrono accepts unpadded fields; require the canonical form.
        if date.format(DATE_FORMAT).to_string() != value {
            return Err(Error::invalid_date(value));
        }
        Ok(Self(date))
    }

    /// The underlying calendar date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DateKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

/// Metadata block written at the top of every note file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Display title; the date key for generated notes.
    pub title: String,
    /// The note's date as written in the file.
    pub date: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FrontMatter {
    /// Front matter for a generated note: title and date are both the date key.
    #[must_use]
    pub fn for_date(date: DateKey, tags: &[String]) -> Self {
        Self {
            title: date.to_string(),
            date: date.to_string(),
            tags: tags.to_vec(),
        }
    }
}

/// A note as read back from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyNote {
    /// The date this note belongs to.
    pub date: DateKey,

    /// Parsed front matter, if the file had a decodable block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_matter: Option<FrontMatter>,

    /// Trimmed markdown body.
    pub body: String,
}

impl DailyNote {
    /// Check if the note has no body text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Whether the body already contains the given image reference.
    #[must_use]
    pub fn references(&self, filename: &str) -> bool {
        self.body.contains(&image_reference(self.date, filename))
    }
}

/// An image stored in a date folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// The date folder holding the image.
    pub date: DateKey,

    /// File name within the folder.
    pub filename: String,

    /// Size of the file in bytes.
    pub size_bytes: u64,

    /// BLAKE3 hash of the file contents.
    pub content_hash: String,
}

impl ImageAsset {
    /// Describe an image from its stored bytes.
    #[must_use]
    pub fn from_bytes(date: DateKey, filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            date,
            filename: filename.into(),
            size_bytes: bytes.len() as u64,
            content_hash: Self::compute_hash(bytes),
        }
    }

    /// Compute the BLAKE3 hash of the given bytes.
    #[must_use]
    pub fn compute_hash(bytes: &[u8]) -> String {
        blake3::hash(bytes).to_hex().to_string()
    }

    /// URL path the note body uses for this image.
    #[must_use]
    pub fn url(&self) -> String {
        image_url(self.date, &self.filename)
    }

    /// Markdown line embedding this image.
    #[must_use]
    pub fn reference(&self) -> String {
        image_reference(self.date, &self.filename)
    }
}

/// URL path of an image: `/images/<date>/<filename>`.
#[must_use]
pub fn image_url(date: DateKey, filename: &str) -> String {
    format!("{IMAGE_URL_PREFIX}/{date}/{filename}")
}

/// Canonical markdown reference: `![<filename>](/images/<date>/<filename>)`.
#[must_use]
pub fn image_reference(date: DateKey, filename: &str) -> String {
    format!("![{filename}]({})", image_url(date, filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    #[test]
    fn test_date_key_parse_and_display() {
        let date = key("2024-01-01");
        assert_eq!(date.to_string(), "2024-01-01");
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_date_key_rejects_invalid() {
        for bad in [
            "2024-13-01",
            "2024-02-30",
            "2024-1-1",
            "24-01-01",
            "",
            "../etc",
            "2024-01-01/../x",
            " 2024-01-01",
        ] {
            let err = DateKey::parse(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidDate { .. }), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_date_key_ordering() {
        assert!(key("2023-12-31") < key("2024-01-01"));
    }

    #[test]
    fn test_date_key_from_str() {
        let date: DateKey = "2024-02-29".parse().unwrap();
        assert_eq!(date, key("2024-02-29"));
    }

    #[test]
    fn test_date_key_serde_as_string() {
        let json = serde_json::to_string(&key("2024-03-04")).unwrap();
        assert_eq!(json, "\"2024-03-04\"");

        let back: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key("2024-03-04"));

        assert!(serde_json::from_str::<DateKey>("\"2024-3-4\"").is_err());
    }

    #[test]
    fn test_today_is_canonical() {
        let today = DateKey::today();
        assert_eq!(DateKey::parse(&today.to_string()).unwrap(), today);
    }

    #[test]
    fn test_image_reference() {
        assert_eq!(
            image_reference(key("2024-01-01"), "cat.png"),
            "![cat.png](/images/2024-01-01/cat.png)"
        );
    }

    #[test]
    fn test_front_matter_for_date() {
        let fm = FrontMatter::for_date(key("2024-05-06"), &["Blog".to_string()]);
        assert_eq!(fm.title, "2024-05-06");
        assert_eq!(fm.date, "2024-05-06");
        assert_eq!(fm.tags, vec!["Blog"]);
    }

    #[test]
    fn test_daily_note_references() {
        let note = DailyNote {
            date: key("2024-01-01"),
            front_matter: None,
            body: "Walk.\n\n![cat.png](/images/2024-01-01/cat.png)".to_string(),
        };
        assert!(note.references("cat.png"));
        assert!(!note.references("dog.png"));
        assert!(!note.is_empty());
    }

    #[test]
    fn test_image_asset_from_bytes() {
        let asset = ImageAsset::from_bytes(key("2024-01-01"), "cat.png", b"meow");
        assert_eq!(asset.size_bytes, 4);
        assert_eq!(asset.content_hash, ImageAsset::compute_hash(b"meow"));
        assert_ne!(asset.content_hash, ImageAsset::compute_hash(b"woof"));
        assert_eq!(asset.url(), "/images/2024-01-01/cat.png");
        assert_eq!(asset.reference(), "![cat.png](/images/2024-01-01/cat.png)");
    }
}
