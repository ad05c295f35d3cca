//! Storage layer for daybook.
//!
//! One markdown file per date under the posts directory, one image folder per
//! date under the images directory. Every operation is a stateless
//! read-modify-write keyed by date; directories are created on first write.
//!
//! There is no locking. Two saves for the same date race and the last writer
//! wins.

pub mod frontmatter;
pub mod upload;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::note::{image_reference, DailyNote, DateKey, FrontMatter, ImageAsset};

pub use upload::{
    sanitize_filename, Rejection, StoreOutcome, UploadOutcome, UploadPolicy, UploadReport,
};

/// Extension of note files.
const NOTE_EXTENSION: &str = "md";

/// Date-keyed note and image store.
#[derive(Debug, Clone)]
pub struct DailyNoteStore {
    /// Directory holding `<date>.md` files.
    posts_dir: PathBuf,
    /// Directory holding `<date>/<filename>` images.
    images_dir: PathBuf,
    /// Tags written into every note's front matter.
    tags: Vec<String>,
}

impl DailyNoteStore {
    /// Create a store over the given directories.
    ///
    /// Nothing is created on disk until the first write. Notes are tagged
    /// `Blog` unless [`with_tags`](Self::with_tags) says otherwise.
    #[must_use]
    pub fn new(posts_dir: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            posts_dir: posts_dir.into(),
            images_dir: images_dir.into(),
            tags: vec!["Blog".to_string()],
        }
    }

    /// Create a store rooted at `root` with the conventional layout:
    /// `content/posts` and `static/images`.
    #[must_use]
    pub fn at_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(root.join("content/posts"), root.join("static/images"))
    }

    /// Create a store from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.posts_dir(), config.images_dir()).with_tags(config.notes.tags.clone())
    }

    /// Replace the front matter tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Directory holding note files.
    #[must_use]
    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    /// Directory holding image folders.
    #[must_use]
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Path of the note file for a date.
    #[must_use]
    pub fn note_path(&self, date: DateKey) -> PathBuf {
        self.posts_dir.join(format!("{date}.{NOTE_EXTENSION}"))
    }

    /// Path of the image folder for a date.
    #[must_use]
    pub fn image_folder(&self, date: DateKey) -> PathBuf {
        self.images_dir.join(date.to_string())
    }

    /// Path of an image within a date folder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilename`] if `filename` is not a plain file name.
    pub fn image_path(&self, date: DateKey, filename: &str) -> Result<PathBuf> {
        Ok(self.image_folder(date).join(plain_file_name(filename)?))
    }

    /// Load the body of the note for `date`.
    ///
    /// Returns an empty string if no note exists. Front matter, when present,
    /// is dropped; the remaining text is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self, date: DateKey) -> Result<String> {
        Ok(self
            .load_note(date)?
            .map(|note| note.body)
            .unwrap_or_default())
    }

    /// Load the note for `date` with its front matter.
    ///
    /// Returns `None` if no note exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load_note(&self, date: DateKey) -> Result<Option<DailyNote>> {
        let path = self.note_path(date);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No note at {}", path.display());
                return Ok(None);
            }
            Err(source) => return Err(Error::NoteRead { path, source }),
        };

        let parsed = frontmatter::parse(&content);
        if parsed.has_block && parsed.front_matter.is_none() {
            warn!("Front matter in {} could not be decoded", path.display());
        }

        Ok(Some(DailyNote {
            date,
            front_matter: parsed.front_matter,
            body: parsed.body,
        }))
    }

    /// Save `body` as the note for `date`.
    ///
    /// Overwrites any existing note. Front matter is regenerated from the
    /// date and the store's tags; the body is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the posts directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, date: DateKey, body: &str) -> Result<()> {
        ensure_dir(&self.posts_dir)?;

        let front_matter = FrontMatter::for_date(date, &self.tags);
        let content = frontmatter::render(&front_matter, body)?;

        let path = self.note_path(date);
        fs::write(&path, content).map_err(|source| Error::NoteWrite {
            path: path.clone(),
            source,
        })?;

        info!("Saved note for {} ({} bytes)", date, body.trim().len());
        Ok(())
    }

    /// Create the image folder for `date` if needed and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be created.
    pub fn ensure_image_folder(&self, date: DateKey) -> Result<PathBuf> {
        let folder = self.image_folder(date);
        ensure_dir(&folder)?;
        Ok(folder)
    }

    /// Store image bytes under `filename` in the folder for `date`.
    ///
    /// An existing file is never overwritten: if the name is taken, nothing is
    /// written and [`StoreOutcome::Reused`] is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if `filename` is not a plain file name, or if the
    /// folder or file cannot be created.
    pub fn store_image(&self, date: DateKey, filename: &str, bytes: &[u8]) -> Result<StoreOutcome> {
        let filename = plain_file_name(filename)?;
        let path = self.ensure_image_folder(date)?.join(filename);

        // create_new makes the existence check and the create one step.
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("Image {} already exists, keeping it", path.display());
                return Ok(StoreOutcome::Reused);
            }
            Err(source) => return Err(Error::ImageWrite { path, source }),
        };

        if let Err(source) = file.write_all(bytes).and_then(|()| file.sync_all()) {
            // A partial file would be reused by the next upload of this name.
            let _ = fs::remove_file(&path);
            return Err(Error::ImageWrite { path, source });
        }

        info!("Stored image {} ({} bytes)", path.display(), bytes.len());
        Ok(StoreOutcome::Written)
    }

    /// Append a reference to `filename` to the note for `date`.
    ///
    /// Does nothing if the exact reference text already appears in the body.
    /// Returns whether a reference was added.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be read or written.
    pub fn append_image_reference(&self, date: DateKey, filename: &str) -> Result<bool> {
        let filename = plain_file_name(filename)?;
        let reference = image_reference(date, filename);
        let mut body = self.load(date)?;

        if body.contains(&reference) {
            debug!("Note for {} already references {}", date, filename);
            return Ok(false);
        }

        if body.is_empty() {
            body = reference;
        } else {
            body.push_str("\n\n");
            body.push_str(&reference);
            body.push('\n');
        }

        self.save(date, &body)?;
        Ok(true)
    }

    /// Store an uploaded image and reference it from the note for `date`.
    ///
    /// Rejected uploads are reported, not returned as errors. An accepted
    /// upload always ends with the image on disk and referenced exactly once.
    ///
    /// # Errors
    ///
    /// Returns an error only for filesystem failures.
    pub fn upload_image(
        &self,
        policy: &UploadPolicy,
        date: DateKey,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<UploadReport> {
        let filename = match policy.check(original_name, bytes.len() as u64) {
            Ok(filename) => filename,
            Err(rejection) => {
                info!("Rejected upload {:?}: {:?}", original_name, rejection);
                return Ok(UploadReport {
                    date,
                    messages: vec![policy.rejection_message(&rejection)],
                    outcome: UploadOutcome::Rejected(rejection),
                });
            }
        };

        let stored = self.store_image(date, &filename, bytes)?;
        let reference_added = self.append_image_reference(date, &filename)?;

        Ok(UploadReport {
            date,
            messages: upload::accepted_messages(&filename, stored, reference_added),
            outcome: UploadOutcome::Accepted {
                filename,
                stored,
                reference_added,
            },
        })
    }

    /// Read an image's bytes.
    ///
    /// The name is sanitized first, so path components in it cannot reach
    /// outside the date folder. Returns `None` if the image does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the name sanitizes to nothing or the file cannot
    /// be read.
    pub fn read_image(&self, date: DateKey, filename: &str) -> Result<Option<Vec<u8>>> {
        let safe = sanitize_filename(filename);
        let path = self.image_path(date, &safe)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Dates that have a note, oldest first.
    ///
    /// Files whose names are not `<date>.md` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the posts directory cannot be listed.
    pub fn list_dates(&self) -> Result<Vec<DateKey>> {
        let mut dates = Vec::new();
        for path in read_dir_or_empty(&self.posts_dir)? {
            if path.extension().and_then(|e| e.to_str()) != Some(NOTE_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()).map(DateKey::parse) {
                Some(Ok(date)) => dates.push(date),
                _ => debug!("Skipping non-note file {}", path.display()),
            }
        }
        dates.sort();
        Ok(dates)
    }

    /// Images stored for `date`, sorted by filename.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be listed or an image cannot be read.
    pub fn list_images(&self, date: DateKey) -> Result<Vec<ImageAsset>> {
        let mut images = Vec::new();
        for path in read_dir_or_empty(&self.image_folder(date))? {
            if !path.is_file() {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                warn!("Skipping image with non UTF-8 name {}", path.display());
                continue;
            };
            let bytes = fs::read(&path)?;
            images.push(ImageAsset::from_bytes(date, filename, &bytes));
        }
        images.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(images)
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be listed.
    pub fn stats(&self) -> Result<StoreStats> {
        let dates = self.list_dates()?;

        let mut note_bytes = 0;
        for date in &dates {
            note_bytes += fs::metadata(self.note_path(*date)).map_or(0, |m| m.len());
        }

        let mut total_images = 0;
        let mut image_bytes = 0;
        for folder in read_dir_or_empty(&self.images_dir)? {
            let is_date_folder = folder
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| DateKey::parse(n).is_ok());
            if !folder.is_dir() || !is_date_folder {
                continue;
            }
            for image in read_dir_or_empty(&folder)? {
                if let Ok(meta) = fs::metadata(&image) {
                    if meta.is_file() {
                        total_images += 1;
                        image_bytes += meta.len();
                    }
                }
            }
        }

        Ok(StoreStats {
            total_notes: dates.len(),
            total_images,
            first_note: dates.first().copied(),
            last_note: dates.last().copied(),
            bytes_on_disk: note_bytes + image_bytes,
        })
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Number of notes.
    pub total_notes: usize,
    /// Number of images across all date folders.
    pub total_images: usize,
    /// Date of the oldest note.
    pub first_note: Option<DateKey>,
    /// Date of the newest note.
    pub last_note: Option<DateKey>,
    /// Combined size of notes and images.
    pub bytes_on_disk: u64,
}

/// Create a directory and its parents if missing.
fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Created directory {}", path.display());
    Ok(())
}

/// Entries of a directory, or nothing if it does not exist.
fn read_dir_or_empty(dir: &Path) -> Result<Vec<PathBuf>> {
    match fs::read_dir(dir) {
        Ok(entries) => Ok(entries
            .collect::<io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Accept only names that stay inside their folder.
fn plain_file_name(name: &str) -> Result<&str> {
    let is_plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
    if is_plain {
        Ok(name)
    } else {
        Err(Error::invalid_filename(name))
    }
}
