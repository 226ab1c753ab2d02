//! Bookmark use-case service.
//!
//! # Responsibility
//! - Mediate between UI-facing callers and the bookmark repository.
//! - Own the category taxonomy lookups.
//! - Compose image side-file handling with record writes.
//!
//! # Invariants
//! - Deleting a bookmark removes its image first, best-effort, then the row.
//! - Detail save-back re-fetches the record and overwrites only the fields
//!   the detail view edits.
//! - Record writes and image writes are independent operations; a missing
//!   image is a normal state.
//! - Image failures are logged and reported as `false`/`None`, never as
//!   errors.
//! - Photos are only written for ids that have a stored record.

use crate::db::Subscription;
use crate::media::{ImageResult, ImageStore};
use crate::model::bookmark::{Bookmark, BookmarkId, LatLng};
use crate::model::category::CategoryMap;
use crate::model::place::{PlaceDetails, PlaceProvider};
use crate::repo::bookmark_repo::{BookmarkRepository, RepoResult};
use crate::view::projection::{
    apply_details, to_details, to_list_item, to_marker, BookmarkDetailsView, BookmarkListItemView,
    BookmarkMarkerView,
};
use image::DynamicImage;
use log::{error, info, warn};

/// Display name used for pin-drop bookmarks.
pub const UNTITLED_BOOKMARK_NAME: &str = "Untitled";

/// Bookmark service facade over a repository and the image store.
pub struct BookmarkService<R: BookmarkRepository> {
    repo: R,
    images: ImageStore,
    categories: &'static CategoryMap,
}

impl<R: BookmarkRepository> BookmarkService<R> {
    /// Creates a service using the standard category taxonomy.
    pub fn new(repo: R, images: ImageStore) -> Self {
        Self {
            repo,
            images,
            categories: CategoryMap::standard(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Returns a transient bookmark with default values.
    pub fn create_transient(&self) -> Bookmark {
        Bookmark::new()
    }

    /// Persists `bookmark` and writes the assigned id back into it.
    ///
    /// Returns `Ok(None)` when the insert was ignored because the bookmark
    /// already carried an id present in the store.
    pub fn add(&self, bookmark: &mut Bookmark) -> RepoResult<Option<BookmarkId>> {
        let inserted = self.repo.insert_bookmark(bookmark)?;
        if let Some(id) = inserted {
            bookmark.id = Some(id);
            info!("event=bookmark_add module=service status=ok bookmark_id={id}");
        }
        Ok(inserted)
    }

    /// Replaces the stored record in full. Returns whether a row changed.
    pub fn update(&self, bookmark: &Bookmark) -> RepoResult<bool> {
        self.repo.update_bookmark(bookmark)
    }

    pub fn get(&self, id: BookmarkId) -> RepoResult<Option<Bookmark>> {
        self.repo.load_bookmark(id)
    }

    pub fn list(&self) -> RepoResult<Vec<Bookmark>> {
        self.repo.load_all()
    }

    pub fn observe_all<F>(&self, callback: F) -> RepoResult<Subscription>
    where
        F: Fn(Vec<Bookmark>) + Send + Sync + 'static,
    {
        self.repo.observe_all(callback)
    }

    pub fn observe<F>(&self, id: BookmarkId, callback: F) -> RepoResult<Subscription>
    where
        F: Fn(Option<Bookmark>) + Send + Sync + 'static,
    {
        self.repo.observe_bookmark(id, callback)
    }

    /// Live list-drawer rows.
    pub fn observe_list_views<F>(&self, callback: F) -> RepoResult<Subscription>
    where
        F: Fn(Vec<BookmarkListItemView>) + Send + Sync + 'static,
    {
        let categories = self.categories;
        self.repo.observe_all(move |bookmarks| {
            callback(
                bookmarks
                    .iter()
                    .map(|bookmark| to_list_item(bookmark, categories))
                    .collect(),
            )
        })
    }

    /// Live map markers.
    pub fn observe_marker_views<F>(&self, callback: F) -> RepoResult<Subscription>
    where
        F: Fn(Vec<BookmarkMarkerView>) + Send + Sync + 'static,
    {
        let categories = self.categories;
        self.repo.observe_all(move |bookmarks| {
            callback(
                bookmarks
                    .iter()
                    .map(|bookmark| to_marker(bookmark, categories))
                    .collect(),
            )
        })
    }

    /// Live detail view for one bookmark; `None` once it is deleted.
    pub fn observe_details<F>(&self, id: BookmarkId, callback: F) -> RepoResult<Subscription>
    where
        F: Fn(Option<BookmarkDetailsView>) + Send + Sync + 'static,
    {
        self.repo
            .observe_bookmark(id, move |bookmark| callback(bookmark.as_ref().map(to_details)))
    }

    pub fn list_views(&self) -> RepoResult<Vec<BookmarkListItemView>> {
        Ok(self
            .repo
            .load_all()?
            .iter()
            .map(|bookmark| to_list_item(bookmark, self.categories))
            .collect())
    }

    pub fn marker_views(&self) -> RepoResult<Vec<BookmarkMarkerView>> {
        Ok(self
            .repo
            .load_all()?
            .iter()
            .map(|bookmark| to_marker(bookmark, self.categories))
            .collect())
    }

    pub fn details_view(&self, id: BookmarkId) -> RepoResult<Option<BookmarkDetailsView>> {
        Ok(self.repo.load_bookmark(id)?.as_ref().map(to_details))
    }

    /// Saves an edited detail view back into its record.
    ///
    /// Returns the stored bookmark, or `None` when the view is transient or
    /// the record no longer exists.
    pub fn save_details(&self, view: &BookmarkDetailsView) -> RepoResult<Option<Bookmark>> {
        let Some(id) = view.id else {
            return Ok(None);
        };
        let Some(current) = self.repo.load_bookmark(id)? else {
            warn!("event=bookmark_save_details module=service status=noop reason=not_found bookmark_id={id}");
            return Ok(None);
        };

        let merged = apply_details(view, current);
        if !self.repo.update_bookmark(&merged)? {
            warn!("event=bookmark_save_details module=service status=noop reason=deleted bookmark_id={id}");
            return Ok(None);
        }
        Ok(Some(merged))
    }

    /// Deletes the bookmark image (best-effort) and then the record.
    pub fn delete(&self, bookmark: &Bookmark) -> RepoResult<()> {
        let Some(id) = bookmark.id else {
            return Ok(());
        };

        if let Err(err) = self.images.delete(id) {
            warn!(
                "event=image_delete module=service status=error bookmark_id={} error={}",
                id, err
            );
        }
        if self.repo.delete_bookmark(id)? {
            info!("event=bookmark_delete module=service status=ok bookmark_id={id}");
        }
        Ok(())
    }

    /// Loads the record for `id` and deletes it. Returns whether it existed.
    pub fn delete_by_id(&self, id: BookmarkId) -> RepoResult<bool> {
        match self.repo.load_bookmark(id)? {
            Some(bookmark) => {
                self.delete(&bookmark)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn resolve_category(&self, place_type: &str) -> &'static str {
        self.categories.resolve_category(place_type)
    }

    pub fn category_icon(&self, category: &str) -> Option<&'static str> {
        self.categories.category_icon(category)
    }

    pub fn categories(&self) -> Vec<&'static str> {
        self.categories.categories()
    }

    /// Builds a transient bookmark from place details.
    pub fn bookmark_from_place(&self, place: &PlaceDetails) -> Bookmark {
        let location = place.lat_lng.unwrap_or_default();
        let mut bookmark = self.create_transient();
        bookmark.place_id = Some(place.id.clone());
        bookmark.name = place.name.clone();
        bookmark.address = place.address.clone();
        bookmark.latitude = location.latitude;
        bookmark.longitude = location.longitude;
        bookmark.phone = place.phone.clone();
        bookmark.category = self
            .categories
            .resolve_first(place.types.iter().map(String::as_str))
            .to_string();
        bookmark
    }

    /// Saves a place as a bookmark, then stores its photo when present.
    pub fn add_from_place(&self, place: &PlaceDetails) -> RepoResult<Option<BookmarkId>> {
        let mut bookmark = self.bookmark_from_place(place);
        let inserted = self.add(&mut bookmark)?;
        if let (Some(id), Some(photo)) = (inserted, place.photo.as_deref()) {
            self.set_image_bytes(id, photo);
        }
        Ok(inserted)
    }

    /// Looks up a place and saves it. Lookup failures are logged and leave
    /// the store unchanged.
    pub fn add_from_provider(
        &self,
        provider: &impl PlaceProvider,
        place_id: &str,
    ) -> RepoResult<Option<BookmarkId>> {
        match provider.fetch_place(place_id) {
            Ok(place) => self.add_from_place(&place),
            Err(err) => {
                error!(
                    "event=place_lookup module=service status=error status_code={} error={}",
                    err.status_code.map_or_else(|| "none".to_string(), |code| code.to_string()),
                    err.message
                );
                Ok(None)
            }
        }
    }

    /// Saves a pin-drop bookmark at `location`.
    pub fn add_from_location(&self, location: LatLng) -> RepoResult<Option<BookmarkId>> {
        let mut bookmark = self.create_transient();
        bookmark.name = UNTITLED_BOOKMARK_NAME.to_string();
        bookmark.latitude = location.latitude;
        bookmark.longitude = location.longitude;
        self.add(&mut bookmark)
    }

    /// Replaces the photo for `id`. Returns whether the image was written;
    /// `false` when no record with `id` is stored.
    pub fn set_image(&self, id: BookmarkId, image: &DynamicImage) -> bool {
        self.has_record(id) && self.report_image_save(id, self.images.save(id, image))
    }

    /// Replaces the photo for `id` from encoded camera/gallery bytes.
    pub fn set_image_bytes(&self, id: BookmarkId, bytes: &[u8]) -> bool {
        self.has_record(id) && self.report_image_save(id, self.images.save_bytes(id, bytes))
    }

    fn has_record(&self, id: BookmarkId) -> bool {
        match self.repo.load_bookmark(id) {
            Ok(Some(_)) => true,
            Ok(None) => {
                warn!("event=image_save module=service status=noop reason=not_found bookmark_id={id}");
                false
            }
            Err(err) => {
                warn!("event=image_save module=service status=error bookmark_id={id} error={err}");
                false
            }
        }
    }

    fn report_image_save(&self, id: BookmarkId, result: ImageResult<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=image_save module=service status=error bookmark_id={} error={}",
                    id, err
                );
                false
            }
        }
    }

    /// Loads the photo for `id`; unreadable files are logged and treated as
    /// absent.
    pub fn load_image(&self, id: BookmarkId) -> Option<DynamicImage> {
        match self.images.load(id) {
            Ok(image) => image,
            Err(err) => {
                warn!(
                    "event=image_load module=service status=error bookmark_id={} error={}",
                    id, err
                );
                None
            }
        }
    }
}
