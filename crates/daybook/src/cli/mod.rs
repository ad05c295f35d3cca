//! Command-line interface for daybook.
//!
//! This module provides the CLI structure for the `daybook` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    date_or_today, AttachCommand, ConfigCommand, ImagesCommand, ListCommand, ShowCommand,
    StatusCommand, WriteCommand,
};

use crate::logging::Verbosity;

/// daybook - One markdown note a day
///
/// Keeps a markdown note per calendar day with generated front matter, and a
/// folder of images per day that the note embeds by reference.
#[derive(Debug, Parser)]
#[command(name = "daybook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a day's note
    Show(ShowCommand),

    /// Replace a day's note
    Write(WriteCommand),

    /// Attach an image to a day's note
    Attach(AttachCommand),

    /// List a day's images
    Images(ImagesCommand),

    /// List the days that have notes
    List(ListCommand),

    /// Show journal statistics
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
