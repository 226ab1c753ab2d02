//! Read-optimized bookmark projections for list, detail and map surfaces.
//!
//! # Responsibility
//! - Map a `Bookmark` into each UI-shaped view.
//! - Merge an edited detail view back into an authoritative record.
//!
//! # Invariants
//! - Mapping is pure and total; a category without an icon maps to
//!   `IconRef::None`.
//! - `apply_details` only writes the fields the detail view can edit.

use crate::media::{ImageResult, ImageStore};
use crate::model::bookmark::{Bookmark, BookmarkId, LatLng};
use crate::model::category::{CategoryMap, IconRef};
use image::DynamicImage;
use serde::Serialize;

/// Row in the bookmark list drawer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkListItemView {
    pub id: Option<BookmarkId>,
    pub name: String,
    pub category_icon: IconRef,
    pub location: LatLng,
}

/// Editable detail screen state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkDetailsView {
    pub id: Option<BookmarkId>,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub notes: String,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub place_id: Option<String>,
}

/// Map marker with info-window text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkMarkerView {
    pub id: Option<BookmarkId>,
    pub location: LatLng,
    pub name: String,
    pub phone: String,
    pub category_icon: IconRef,
}

pub fn to_list_item(bookmark: &Bookmark, categories: &CategoryMap) -> BookmarkListItemView {
    BookmarkListItemView {
        id: bookmark.id,
        name: bookmark.name.clone(),
        category_icon: categories.icon_ref(&bookmark.category),
        location: bookmark.location(),
    }
}

pub fn to_details(bookmark: &Bookmark) -> BookmarkDetailsView {
    BookmarkDetailsView {
        id: bookmark.id,
        name: bookmark.name.clone(),
        phone: bookmark.phone.clone(),
        address: bookmark.address.clone(),
        notes: bookmark.notes.clone(),
        category: bookmark.category.clone(),
        latitude: bookmark.latitude,
        longitude: bookmark.longitude,
        place_id: bookmark.place_id.clone(),
    }
}

pub fn to_marker(bookmark: &Bookmark, categories: &CategoryMap) -> BookmarkMarkerView {
    BookmarkMarkerView {
        id: bookmark.id,
        location: bookmark.location(),
        name: bookmark.name.clone(),
        phone: bookmark.phone.clone(),
        category_icon: categories.icon_ref(&bookmark.category),
    }
}

/// Overwrites the editable fields of `authoritative` with the view's values.
///
/// `authoritative` must be the freshly loaded record for `view.id`; place id
/// and coordinates are kept from it.
pub fn apply_details(view: &BookmarkDetailsView, mut authoritative: Bookmark) -> Bookmark {
    authoritative.name = view.name.clone();
    authoritative.phone = view.phone.clone();
    authoritative.address = view.address.clone();
    authoritative.notes = view.notes.clone();
    authoritative.category = view.category.clone();
    authoritative
}

impl BookmarkDetailsView {
    /// Loads the bookmark photo; `None` for transient views or missing files.
    pub fn image(&self, images: &ImageStore) -> ImageResult<Option<DynamicImage>> {
        match self.id {
            Some(id) => images.load(id),
            None => Ok(None),
        }
    }

    /// Replaces the bookmark photo. No-op for transient views.
    pub fn set_image(&self, images: &ImageStore, image: &DynamicImage) -> ImageResult<()> {
        match self.id {
            Some(id) => images.save(id, image),
            None => Ok(()),
        }
    }
}

impl BookmarkMarkerView {
    pub fn image(&self, images: &ImageStore) -> ImageResult<Option<DynamicImage>> {
        match self.id {
            Some(id) => images.load(id),
            None => Ok(None),
        }
    }
}
