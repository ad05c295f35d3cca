//! `daybook` - CLI for the daybook journal
//!
//! This binary exposes the note store as subcommands: read and replace a
//! day's note, attach images to it, and inspect what is stored.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;

use daybook::cli::{
    date_or_today, AttachCommand, Cli, Command, ConfigCommand, ImagesCommand, ShowCommand,
    WriteCommand,
};
use daybook::storage::UploadOutcome;
use daybook::{init_logging, Config, DailyNoteStore, UploadPolicy};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    let store = DailyNoteStore::from_config(&config);

    match cli.command {
        Command::Show(cmd) => handle_show(&store, &cmd),
        Command::Write(cmd) => handle_write(&store, cmd),
        Command::Attach(cmd) => handle_attach(&store, &config, &cmd),
        Command::Images(cmd) => handle_images(&store, &cmd),
        Command::List(cmd) => handle_list(&store, cmd.json),
        Command::Status(cmd) => handle_status(&store, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_show(store: &DailyNoteStore, cmd: &ShowCommand) -> Result<()> {
    let date = date_or_today(cmd.date);
    if cmd.json {
        let note = store.load_note(date)?;
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        let body = store.load(date)?;
        if body.is_empty() {
            eprintln!("No thoughts for {date} yet.");
        } else {
            println!("{body}");
        }
    }
    Ok(())
}

fn handle_write(store: &DailyNoteStore, cmd: WriteCommand) -> Result<()> {
    let date = date_or_today(cmd.date);
    let body = match (cmd.text, cmd.file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading note from stdin")?;
            buf
        }
    };

    // An empty submission leaves the existing note alone.
    if body.trim().is_empty() {
        eprintln!("Nothing to save for {date}.");
        return Ok(());
    }

    store.save(date, &body)?;
    println!("Saved {}", store.note_path(date).display());
    Ok(())
}

fn handle_attach(store: &DailyNoteStore, config: &Config, cmd: &AttachCommand) -> Result<()> {
    let date = date_or_today(cmd.date);
    let bytes = std::fs::read(&cmd.path)
        .with_context(|| format!("reading {}", cmd.path.display()))?;

    let original_name = match &cmd.name {
        Some(name) => name.clone(),
        None => cmd
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let policy = UploadPolicy::from_config(config);
    let report = store.upload_image(&policy, date, &original_name, &bytes)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for message in &report.messages {
            println!("{message}");
        }
        if let UploadOutcome::Accepted { filename, .. } = &report.outcome {
            println!("{}", store.image_path(date, filename)?.display());
        }
    }
    Ok(())
}

fn handle_images(store: &DailyNoteStore, cmd: &ImagesCommand) -> Result<()> {
    let date = date_or_today(cmd.date);
    let images = store.list_images(date)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&images)?);
        return Ok(());
    }

    if images.is_empty() {
        eprintln!("No images for {date}.");
    }
    for image in &images {
        println!(
            "{:<32} {:>10}  {}",
            image.filename,
            image.size_bytes,
            &image.content_hash[..12]
        );
    }
    Ok(())
}

fn handle_list(store: &DailyNoteStore, json: bool) -> Result<()> {
    let dates = store.list_dates()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&dates)?);
    } else {
        for date in dates {
            println!("{date}");
        }
    }
    Ok(())
}

fn handle_status(store: &DailyNoteStore, json: bool) -> Result<()> {
    let stats = store.stats()?;
    if json {
        let status = serde_json::json!({
            "posts_dir": store.posts_dir(),
            "images_dir": store.images_dir(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let or_none = |d: Option<daybook::DateKey>| d.map_or("-".to_string(), |d| d.to_string());
        println!("daybook status");
        println!("--------------");
        println!("Notes:         {}", stats.total_notes);
        println!("Images:        {}", stats.total_images);
        println!("First note:    {}", or_none(stats.first_note));
        println!("Last note:     {}", or_none(stats.last_note));
        println!("Size on disk:  {} bytes", stats.bytes_on_disk);
        println!("Posts:         {}", store.posts_dir().display());
        println!("Images dir:    {}", store.images_dir().display());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data dir:           {}", config.data_dir().display());
                println!("  Posts dir:          {}", config.posts_dir().display());
                println!("  Images dir:         {}", config.images_dir().display());
                println!();
                println!("[Notes]");
                println!("  Tags:               {}", config.notes.tags.join(", "));
                println!();
                println!("[Uploads]");
                println!(
                    "  Allowed extensions: {}",
                    config.uploads.allowed_extensions.join(", ")
                );
                match config.max_image_bytes() {
                    Some(limit) => println!("  Max image bytes:    {limit}"),
                    None => println!("  Max image bytes:    unlimited"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("invalid configuration: {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validate_accepts_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[notes]\ntags = [\"Journal\"]\n").unwrap();

        let cmd = ConfigCommand::Validate { file: Some(path) };
        assert!(handle_config(&Config::default(), cmd).is_ok());
    }

    #[test]
    fn test_config_validate_fails_on_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[uploads]\nallowed_extensions = [\".PNG\"]\n").unwrap();

        let cmd = ConfigCommand::Validate {
            file: Some(path.clone()),
        };
        let err = handle_config(&Config::default(), cmd).unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }
}
