//! `daybook` - A date-keyed markdown journal
//!
//! This library keeps one markdown note per calendar day, with generated
//! front matter, and a folder of images per day that notes embed by reference.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod note;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use note::{DailyNote, DateKey, FrontMatter, ImageAsset};
pub use storage::{DailyNoteStore, StoreOutcome, StoreStats, UploadPolicy, UploadReport};
