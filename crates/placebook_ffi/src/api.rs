//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level bookmark functions to Dart via FRB.
//! - Flatten core views into plain envelopes the UI can render directly.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the store under `PLACEBOOK_DATA_DIR` (or the temp
//!   fallback) and releases it before returning.

use log::warn;
use placebook_core::config::DATA_DIR_ENV;
use placebook_core::db::Database;
use placebook_core::media::{load_downsampled, ImageSource};
use placebook_core::{
    core_version as core_version_inner, directions_url, init_logging as init_logging_inner,
    ping as ping_inner, share_text, BookmarkDetailsView, BookmarkService, CategoryMap,
    ImageStore, LatLng, PlaceBookConfig, PlaceDetails, RepoResult, SqliteBookmarkRepository,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const FALLBACK_DATA_DIR_NAME: &str = "placebook_ffi";
const PHOTO_MAX_WIDTH: u32 = 1024;
const PHOTO_MAX_HEIGHT: u32 = 1024;
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Category name with its drawable resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryItem {
    pub name: String,
    /// `None` when no icon is registered for the category.
    pub icon: Option<String>,
}

/// Bookmark row shared by the list drawer and the map markers.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkItem {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub category_icon: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkListResponse {
    pub ok: bool,
    pub items: Vec<BookmarkItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Editable detail screen state.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkDetailsItem {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub notes: String,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub place_id: Option<String>,
    /// Absolute photo path, when a photo is stored.
    pub photo_path: Option<String>,
}

/// Detail response envelope; `details` is `None` when the id is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkDetailsResponse {
    pub ok: bool,
    pub details: Option<BookmarkDetailsItem>,
    pub message: String,
}

/// Generic action response envelope for bookmark commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected bookmark id, when known.
    pub bookmark_id: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl BookmarkActionResponse {
    fn success(message: impl Into<String>, bookmark_id: Option<i64>) -> Self {
        Self {
            ok: true,
            bookmark_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            bookmark_id: None,
            message: message.into(),
        }
    }
}

/// Share payload for the platform share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkShareResponse {
    pub ok: bool,
    pub url: String,
    pub text: String,
    pub message: String,
}

/// Lists every category with its icon, sorted by name.
#[flutter_rust_bridge::frb(sync)]
pub fn categories() -> Vec<CategoryItem> {
    let map = CategoryMap::standard();
    map.categories()
        .into_iter()
        .map(|name| CategoryItem {
            name: name.to_string(),
            icon: map.category_icon(name).map(str::to_string),
        })
        .collect()
}

/// Maps an external place type tag to a category name.
#[flutter_rust_bridge::frb(sync)]
pub fn resolve_category(place_type: String) -> String {
    CategoryMap::standard()
        .resolve_category(&place_type)
        .to_string()
}

/// Lists all bookmarks in id order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_list() -> BookmarkListResponse {
    match with_service(|service| service.marker_views()) {
        Ok(markers) => {
            let items = markers
                .into_iter()
                .filter_map(|marker| {
                    Some(BookmarkItem {
                        id: marker.id?,
                        name: marker.name,
                        phone: marker.phone,
                        category_icon: marker.category_icon.resource().map(str::to_string),
                        latitude: marker.location.latitude,
                        longitude: marker.location.longitude,
                    })
                })
                .collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No bookmarks.".to_string()
            } else {
                format!("Found {} bookmark(s).", items.len())
            };
            BookmarkListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => BookmarkListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("bookmark_list failed: {err}"),
        },
    }
}

/// Saves an "Untitled" pin-drop bookmark at the given coordinates.
#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_add_from_location(latitude: f64, longitude: f64) -> BookmarkActionResponse {
    match with_service(|service| service.add_from_location(LatLng::new(latitude, longitude))) {
        Ok(Some(id)) => BookmarkActionResponse::success("Bookmark saved.", Some(id)),
        Ok(None) => BookmarkActionResponse::failure("bookmark_add_from_location ignored"),
        Err(err) => {
            BookmarkActionResponse::failure(format!("bookmark_add_from_location failed: {err}"))
        }
    }
}

/// Saves a looked-up place as a bookmark.
///
/// Input semantics:
/// - `types`: provider type tags; the first mapped tag picks the category.
/// - `photo`: encoded image bytes, stored when decodable.
#[allow(clippy::too_many_arguments)]
#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_add_from_place(
    place_id: String,
    name: String,
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    phone: String,
    types: Vec<String>,
    photo: Option<Vec<u8>>,
) -> BookmarkActionResponse {
    let lat_lng = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(LatLng::new(latitude, longitude)),
        _ => None,
    };
    let place = PlaceDetails {
        id: place_id,
        name,
        address,
        lat_lng,
        phone,
        types,
        photo,
    };
    match with_service(|service| service.add_from_place(&place)) {
        Ok(Some(id)) => BookmarkActionResponse::success("Bookmark saved.", Some(id)),
        Ok(None) => BookmarkActionResponse::failure("bookmark_add_from_place ignored"),
        Err(err) => BookmarkActionResponse::failure(format!("bookmark_add_from_place failed: {err}")),
    }
}

/// Loads the detail screen state for one bookmark.
#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_details(bookmark_id: i64) -> BookmarkDetailsResponse {
    let result = with_service(|service| {
        let details = service.details_view(bookmark_id)?;
        let photo_path = service
            .images()
            .exists(bookmark_id)
            .then(|| service.images().image_path(bookmark_id));
        Ok(details.map(|view| to_details_item(bookmark_id, view, photo_path)))
    });

    match result {
        Ok(Some(details)) => BookmarkDetailsResponse {
            ok: true,
            details: Some(details),
            message: String::new(),
        },
        Ok(None) => BookmarkDetailsResponse {
            ok: true,
            details: None,
            message: "Bookmark not found.".to_string(),
        },
        Err(err) => BookmarkDetailsResponse {
            ok: false,
            details: None,
            message: format!("bookmark_details failed: {err}"),
        },
    }
}

/// Saves edited detail fields. Place id and coordinates are never
/// overwritten from the UI.
#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_save_details(details: BookmarkDetailsItem) -> BookmarkActionResponse {
    let bookmark_id = details.id;
    let view = from_details_item(details);
    match with_service(|service| service.save_details(&view)) {
        Ok(Some(_)) => BookmarkActionResponse::success("Bookmark updated.", Some(bookmark_id)),
        Ok(None) => BookmarkActionResponse::failure("Bookmark not found."),
        Err(err) => BookmarkActionResponse::failure(format!("bookmark_save_details failed: {err}")),
    }
}

/// Deletes a bookmark and its photo.
#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_delete(bookmark_id: i64) -> BookmarkActionResponse {
    match with_service(|service| service.delete_by_id(bookmark_id)) {
        Ok(true) => BookmarkActionResponse::success("Bookmark deleted.", Some(bookmark_id)),
        Ok(false) => BookmarkActionResponse::failure("Bookmark not found."),
        Err(err) => BookmarkActionResponse::failure(format!("bookmark_delete failed: {err}")),
    }
}

/// Replaces the bookmark photo from camera or gallery bytes.
///
/// Large photos are reduced by a power-of-two factor before storing.
#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_set_photo(bookmark_id: i64, bytes: Vec<u8>) -> BookmarkActionResponse {
    let image = match load_downsampled(
        ImageSource::Bytes(&bytes),
        PHOTO_MAX_WIDTH,
        PHOTO_MAX_HEIGHT,
    ) {
        Ok(image) => image,
        Err(err) => {
            warn!(
                "event=ffi_set_photo module=ffi status=error bookmark_id={} error={}",
                bookmark_id, err
            );
            return BookmarkActionResponse::failure(format!("bookmark_set_photo failed: {err}"));
        }
    };

    match with_service(|service| Ok(service.set_image(bookmark_id, &image))) {
        Ok(true) => BookmarkActionResponse::success("Photo saved.", Some(bookmark_id)),
        Ok(false) => BookmarkActionResponse::failure("bookmark_set_photo failed to write image"),
        Err(err) => BookmarkActionResponse::failure(format!("bookmark_set_photo failed: {err}")),
    }
}

/// Builds the directions link and share text for one bookmark.
#[flutter_rust_bridge::frb(sync)]
pub fn bookmark_share(bookmark_id: i64) -> BookmarkShareResponse {
    match with_service(|service| service.details_view(bookmark_id)) {
        Ok(Some(view)) => BookmarkShareResponse {
            ok: true,
            url: directions_url(&view),
            text: share_text(&view),
            message: String::new(),
        },
        Ok(None) => BookmarkShareResponse {
            ok: false,
            url: String::new(),
            text: String::new(),
            message: "Bookmark not found.".to_string(),
        },
        Err(err) => BookmarkShareResponse {
            ok: false,
            url: String::new(),
            text: String::new(),
            message: format!("bookmark_share failed: {err}"),
        },
    }
}

fn resolve_data_dir() -> PathBuf {
    DATA_DIR
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DATA_DIR_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(FALLBACK_DATA_DIR_NAME)
        })
        .clone()
}

fn with_service<T>(
    f: impl FnOnce(&BookmarkService<SqliteBookmarkRepository>) -> RepoResult<T>,
) -> Result<T, String> {
    let config = PlaceBookConfig::with_data_dir(resolve_data_dir());
    std::fs::create_dir_all(&config.data_dir)
        .map_err(|err| format!("data dir setup failed: {err}"))?;
    let db = Database::open(config.db_path(), config.schema_policy)
        .map_err(|err| format!("bookmark DB open failed: {err}"))?;
    let images = ImageStore::open(config.image_dir())
        .map_err(|err| format!("image store open failed: {err}"))?;
    let service = BookmarkService::new(SqliteBookmarkRepository::new(db.clone()), images);

    let result = f(&service).map_err(|err| err.to_string());
    if let Err(err) = db.close() {
        warn!("event=ffi_db_close module=ffi status=error error={err}");
    }
    result
}

fn to_details_item(
    bookmark_id: i64,
    view: BookmarkDetailsView,
    photo_path: Option<PathBuf>,
) -> BookmarkDetailsItem {
    BookmarkDetailsItem {
        id: view.id.unwrap_or(bookmark_id),
        name: view.name,
        phone: view.phone,
        address: view.address,
        notes: view.notes,
        category: view.category,
        latitude: view.latitude,
        longitude: view.longitude,
        place_id: view.place_id,
        photo_path: photo_path.map(|path| path.to_string_lossy().into_owned()),
    }
}

fn from_details_item(item: BookmarkDetailsItem) -> BookmarkDetailsView {
    BookmarkDetailsView {
        id: Some(item.id),
        name: item.name,
        phone: item.phone,
        address: item.address,
        notes: item.notes,
        category: item.category,
        latitude: item.latitude,
        longitude: item.longitude,
        place_id: item.place_id,
    }
}
