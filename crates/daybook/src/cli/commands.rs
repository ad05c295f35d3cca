//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::note::DateKey;

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Note date (YYYY-MM-DD); defaults to today
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<DateKey>,

    /// Output the note with its front matter as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Write command arguments.
#[derive(Debug, Args)]
pub struct WriteCommand {
    /// Note date (YYYY-MM-DD); defaults to today
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<DateKey>,

    /// New note body; read from stdin when neither this nor --file is given
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the new note body from a file
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Attach command arguments.
#[derive(Debug, Args)]
pub struct AttachCommand {
    /// Image file to attach
    pub path: PathBuf,

    /// Note date (YYYY-MM-DD); defaults to today
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<DateKey>,

    /// Store the image under this name instead of the file's own
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output the upload report as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Images command arguments.
#[derive(Debug, Args)]
pub struct ImagesCommand {
    /// Note date (YYYY-MM-DD); defaults to today
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<DateKey>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Resolve an optional `--date` to a concrete key.
#[must_use]
pub fn date_or_today(date: Option<DateKey>) -> DateKey {
    date.unwrap_or_else(DateKey::today)
}

fn parse_date(value: &str) -> Result<DateKey, String> {
    DateKey::parse(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_ok() {
        assert_eq!(
            parse_date("2024-01-01").unwrap(),
            DateKey::parse("2024-01-01").unwrap()
        );
    }

    #[test]
    fn test_parse_date_error_message() {
        let err = parse_date("yesterday").unwrap_err();
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_date_or_today() {
        let date = DateKey::parse("2020-02-02").unwrap();
        assert_eq!(date_or_today(Some(date)), date);
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        assert!(format!("{cmd:?}").contains("Show"));
    }
}
