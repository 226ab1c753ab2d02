//! Bookmark domain model.
//!
//! # Responsibility
//! - Define the canonical saved-place record.
//! - Own the deterministic image filename for a bookmark identity.
//!
//! # Invariants
//! - `id` is `None` only for transient bookmarks and never changes once set.
//! - `category` is one of the fixed category names.
//! - Coordinates are finite and inside WGS84 bounds; unknown is `0.0`.

use crate::model::category::{CategoryMap, OTHER_CATEGORY};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned bookmark identifier.
pub type BookmarkId = i64;

const IMAGE_FILE_PREFIX: &str = "bookmark";
const IMAGE_FILE_EXTENSION: &str = "png";

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Saved place with user-editable details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Assigned on first insert.
    pub id: Option<BookmarkId>,
    /// External place id; set only for bookmarks created from a place lookup.
    pub place_id: Option<String>,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: String,
    pub notes: String,
    pub category: String,
}

impl Default for Bookmark {
    fn default() -> Self {
        Self {
            id: None,
            place_id: None,
            name: String::new(),
            address: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            phone: String::new(),
            notes: String::new(),
            category: OTHER_CATEGORY.to_string(),
        }
    }
}

impl Bookmark {
    /// Creates a transient bookmark with default field values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }

    pub fn location(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Returns the image filename for this bookmark, if it has an identity.
    pub fn image_filename(&self) -> Option<String> {
        self.id.map(image_filename)
    }

    /// Validates invariants before persistence.
    pub fn validate(&self) -> Result<(), BookmarkValidationError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(BookmarkValidationError::NonFiniteCoordinate);
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(BookmarkValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(BookmarkValidationError::LongitudeOutOfRange(
                self.longitude,
            ));
        }
        if !CategoryMap::standard().is_category(&self.category) {
            return Err(BookmarkValidationError::UnknownCategory(
                self.category.clone(),
            ));
        }
        Ok(())
    }
}

/// Deterministic image filename for a bookmark id.
///
/// Distinct ids always map to distinct names.
pub fn image_filename(id: BookmarkId) -> String {
    format!("{IMAGE_FILE_PREFIX}{id}.{IMAGE_FILE_EXTENSION}")
}

/// Validation error for bookmark invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkValidationError {
    NonFiniteCoordinate,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    UnknownCategory(String),
}

impl Display for BookmarkValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteCoordinate => write!(f, "latitude/longitude must be finite"),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
            Self::UnknownCategory(value) => write!(f, "unknown category `{value}`"),
        }
    }
}

impl Error for BookmarkValidationError {}

#[cfg(test)]
mod tests {
    use super::{image_filename, Bookmark, BookmarkValidationError};

    #[test]
    fn image_filename_is_deterministic_per_id() {
        assert_eq!(image_filename(7), "bookmark7.png");
        assert_eq!(image_filename(7), image_filename(7));
        assert_ne!(image_filename(1), image_filename(11));
    }

    #[test]
    fn transient_bookmark_has_no_image_filename() {
        let mut bookmark = Bookmark::new();
        assert!(bookmark.image_filename().is_none());
        bookmark.id = Some(3);
        assert_eq!(bookmark.image_filename().as_deref(), Some("bookmark3.png"));
    }

    #[test]
    fn validate_rejects_out_of_range_and_unknown_category() {
        let mut bookmark = Bookmark::new();
        bookmark.latitude = 91.0;
        assert_eq!(
            bookmark.validate(),
            Err(BookmarkValidationError::LatitudeOutOfRange(91.0))
        );

        bookmark.latitude = 0.0;
        bookmark.longitude = f64::NAN;
        assert_eq!(
            bookmark.validate(),
            Err(BookmarkValidationError::NonFiniteCoordinate)
        );

        bookmark.longitude = 10.0;
        bookmark.category = "Museum".to_string();
        assert!(matches!(
            bookmark.validate(),
            Err(BookmarkValidationError::UnknownCategory(_))
        ));
    }
}
