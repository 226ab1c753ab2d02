//! Bookmark image side-files.
//!
//! # Responsibility
//! - Persist one PNG per bookmark id under the store directory.
//! - Load, replace and delete those files by id.
//!
//! # Invariants
//! - File names come only from `image_filename(id)`.
//! - Writes land in a uniquely named temporary file in the store directory
//!   and are persisted over the target, so concurrent saves never interleave.
//! - A missing file is reported as `None`, never as an error.

use super::{ImageResult, ImageStoreError};
use crate::model::bookmark::{image_filename, BookmarkId};
use image::{DynamicImage, ImageFormat};
use log::debug;
use std::fs;
use std::io::{Cursor, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Directory-backed bookmark image store.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Opens the store, creating `dir` when missing.
    pub fn open(dir: impl Into<PathBuf>) -> ImageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute location of the image for `id`, whether or not it exists.
    pub fn image_path(&self, id: BookmarkId) -> PathBuf {
        self.dir.join(image_filename(id))
    }

    pub fn exists(&self, id: BookmarkId) -> bool {
        self.image_path(id).is_file()
    }

    /// Encodes `image` as PNG and replaces any previous image for `id`.
    pub fn save(&self, id: BookmarkId, image: &DynamicImage) -> ImageResult<()> {
        let mut encoded = Vec::new();
        image.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;

        // Each writer gets its own staging file; the last persist wins.
        let mut staging = NamedTempFile::new_in(&self.dir)?;
        staging.write_all(&encoded)?;
        staging
            .persist(self.image_path(id))
            .map_err(|err| ImageStoreError::Io(err.error))?;

        debug!(
            "event=image_save module=media status=ok bookmark_id={} bytes={}",
            id,
            encoded.len()
        );
        Ok(())
    }

    /// Decodes camera/gallery bytes in any supported format and saves them.
    pub fn save_bytes(&self, id: BookmarkId, bytes: &[u8]) -> ImageResult<()> {
        let image = image::load_from_memory(bytes)?;
        self.save(id, &image)
    }

    /// Loads the image for `id`; `Ok(None)` when no file exists.
    pub fn load(&self, id: BookmarkId) -> ImageResult<Option<DynamicImage>> {
        let bytes = match fs::read(self.image_path(id)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ImageStoreError::Io(err)),
        };
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?;
        Ok(Some(image))
    }

    /// Removes the image for `id`. Returns whether a file was removed.
    pub fn delete(&self, id: BookmarkId) -> ImageResult<bool> {
        match fs::remove_file(self.image_path(id)) {
            Ok(()) => {
                debug!("event=image_delete module=media status=ok bookmark_id={id}");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ImageStoreError::Io(err)),
        }
    }
}
