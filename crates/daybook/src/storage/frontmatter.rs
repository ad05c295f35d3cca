//! Front matter encoding for note files.
//!
//! A note file looks like:
//!
//! ```text
//! ---
//! title: "2024-01-01"
//! date: 2024-01-01
//! tags: ["Blog"]
//! ---
//!
//! body text
//! ```
//!
//! Strings are written as JSON-escaped double-quoted scalars, which YAML reads
//! back unchanged. A block is only recognized when the file starts with the
//! delimiter line, and it ends at the next delimiter line, so body text may
//! contain `---` lines freely.

use crate::error::Result;
use crate::note::{DateKey, FrontMatter};

/// Line that opens and closes the front matter block.
pub const DELIMITER: &str = "---";

const BOM: char = '\u{feff}';

/// A note file split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    /// Decoded front matter, if a block was present and decodable.
    pub front_matter: Option<FrontMatter>,
    /// Whether a delimited block was present at all.
    pub has_block: bool,
    /// Trimmed body text.
    pub body: String,
}

/// Render a complete note file: front matter, a blank line, then the trimmed body.
///
/// # Errors
///
/// Returns an error if a string field cannot be quoted.
pub fn render(front_matter: &FrontMatter, body: &str) -> Result<String> {
    let mut out = String::with_capacity(body.len() + 64);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&format!("title: {}\n", serde_json::to_string(&front_matter.title)?));
    out.push_str(&format!("date: {}\n", quote_if_needed(&front_matter.date)?));
    out.push_str(&format!("tags: {}\n", serde_json::to_string(&front_matter.tags)?));
    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out.push_str(body.trim());
    Ok(out)
}

/// Split a file into the raw front matter block and the remainder.
///
/// A leading byte order mark is skipped. Returns `None` for the block when the
/// first line is not the delimiter or no closing delimiter follows it; the
/// remainder is then the whole input.
#[must_use]
pub fn split(content: &str) -> (Option<&str>, &str) {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (None, content);
    };
    if !is_delimiter(first) {
        return (None, content);
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if is_delimiter(line) {
            let block = &content[block_start..offset];
            let rest = &content[offset + line.len()..];
            return (Some(block), rest);
        }
        offset += line.len();
    }

    (None, content)
}

/// Parse a note file.
///
/// Never fails: a block that does not decode is dropped and the body after it
/// is still returned. Check `has_block` to tell the two cases apart.
#[must_use]
pub fn parse(content: &str) -> ParsedFile {
    let (block, rest) = split(content);
    let front_matter = block.and_then(|yaml| decode(yaml).ok());

    ParsedFile {
        front_matter,
        has_block: block.is_some(),
        body: rest.trim().to_string(),
    }
}

/// Decode the YAML between the delimiters.
///
/// # Errors
///
/// Returns an error if the block is not a mapping with `title` and `date`.
pub fn decode(yaml: &str) -> Result<FrontMatter> {
    Ok(serde_yaml::from_str(yaml)?)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}

/// Date keys are written as plain scalars; anything else gets quoted.
fn quote_if_needed(value: &str) -> Result<String> {
    if DateKey::parse(value).is_ok() {
        Ok(value.to_string())
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FrontMatter {
        FrontMatter {
            title: "2024-01-01".to_string(),
            date: "2024-01-01".to_string(),
            tags: vec!["Blog".to_string()],
        }
    }

    #[test]
    fn test_render_layout() {
        let file = render(&sample(), "  Hello\n").unwrap();
        assert_eq!(
            file,
            "---\ntitle: \"2024-01-01\"\ndate: 2024-01-01\ntags: [\"Blog\"]\n---\n\nHello"
        );
    }

    #[test]
    fn test_render_empty_body() {
        let file = render(&sample(), "   ").unwrap();
        assert!(file.ends_with("---\n\n"));
        assert_eq!(parse(&file).body, "");
    }

    #[test]
    fn test_parse_rendered_file() {
        let file = render(&sample(), "Hello").unwrap();
        let parsed = parse(&file);
        assert!(parsed.has_block);
        assert_eq!(parsed.front_matter, Some(sample()));
        assert_eq!(parsed.body, "Hello");
    }

    #[test]
    fn test_parse_without_front_matter() {
        let parsed = parse("\n  just some text \n");
        assert!(!parsed.has_block);
        assert!(parsed.front_matter.is_none());
        assert_eq!(parsed.body, "just some text");
    }

    #[test]
    fn test_body_delimiter_lines_survive() {
        let body = "before\n---\nmiddle\n---\nafter";
        let file = render(&sample(), body).unwrap();
        assert_eq!(parse(&file).body, body);
    }

    #[test]
    fn test_delimiters_later_in_file_are_not_front_matter() {
        let content = "intro\n---\nnot metadata\n---\noutro";
        let parsed = parse(content);
        assert!(!parsed.has_block);
        assert_eq!(parsed.body, content);
    }

    #[test]
    fn test_unclosed_block_is_body() {
        let content = "---\ntitle: x\nno closing line";
        let (block, rest) = split(content);
        assert!(block.is_none());
        assert_eq!(rest, content);
    }

    #[test]
    fn test_split_handles_crlf() {
        let content = "---\r\ntitle: \"a\"\r\ndate: b\r\n---\r\n\r\nbody\r\n";
        let (block, rest) = split(content);
        assert_eq!(block, Some("title: \"a\"\r\ndate: b\r\n"));
        assert_eq!(rest.trim(), "body");
    }

    #[test]
    fn test_split_skips_byte_order_mark() {
        let content = "\u{feff}---\ntitle: \"2024-01-01\"\ndate: 2024-01-01\n---\n\nHello";
        let parsed = parse(content);
        assert!(parsed.has_block);
        assert_eq!(parsed.front_matter.unwrap().date, "2024-01-01");
        assert_eq!(parsed.body, "Hello");

        let (block, rest) = split("\u{feff}plain text");
        assert!(block.is_none());
        assert_eq!(rest, "plain text");
    }

    #[test]
    fn test_split_empty_input() {
        assert_eq!(split(""), (None, ""));
    }

    #[test]
    fn test_undecodable_block_keeps_body() {
        let content = "---\ntags: [unclosed\n---\n\nstill here";
        let parsed = parse(content);
        assert!(parsed.has_block);
        assert!(parsed.front_matter.is_none());
        assert_eq!(parsed.body, "still here");
    }

    #[test]
    fn test_quotes_in_fields_round_trip() {
        let fm = FrontMatter {
            title: "a \"quoted\" title: yes".to_string(),
            date: "2024-01-01".to_string(),
            tags: vec!["x, y".to_string(), "[z]".to_string()],
        };
        let file = render(&fm, "body").unwrap();
        assert_eq!(parse(&file).front_matter, Some(fm));
    }

    #[test]
    fn test_non_date_values_are_quoted() {
        let fm = FrontMatter {
            title: "t".to_string(),
            date: "123".to_string(),
            tags: Vec::new(),
        };
        let file = render(&fm, "").unwrap();
        assert!(file.contains("date: \"123\"\n"));
        assert!(file.contains("tags: []\n"));
        assert_eq!(parse(&file).front_matter, Some(fm));
    }

    #[test]
    fn test_decode_hand_written_block() {
        let fm = decode("title: Trip\ndate: 2024-07-01\ntags: [travel, photos]\n").unwrap();
        assert_eq!(fm.title, "Trip");
        assert_eq!(fm.date, "2024-07-01");
        assert_eq!(fm.tags, vec!["travel", "photos"]);
    }

    #[test]
    fn test_decode_missing_tags_defaults_empty() {
        let fm = decode("title: \"x\"\ndate: 2024-07-01\n").unwrap();
        assert!(fm.tags.is_empty());
    }
}
