//! Core domain logic for PlaceBook.
//! This crate owns bookmark persistence, the category taxonomy, photo
//! side-files and the read models the map/list/detail surfaces consume.

pub mod config;
pub mod db;
pub mod logging;
pub mod media;
pub mod model;
pub mod repo;
pub mod runtime;
pub mod service;
pub mod view;

pub use config::{ConfigError, PlaceBookConfig};
pub use db::{Database, DbError, SchemaPolicy, Subscription};
pub use logging::{default_log_level, init_logging, logging_status};
pub use media::{ImageStore, ImageStoreError};
pub use model::bookmark::{image_filename, Bookmark, BookmarkId, BookmarkValidationError, LatLng};
pub use model::category::{CategoryMap, IconRef};
pub use model::place::{PlaceDetails, PlaceLookupError, PlaceProvider};
pub use repo::bookmark_repo::{
    BookmarkRepository, RepoError, RepoResult, SqliteBookmarkRepository,
};
pub use runtime::{PlaceBookRuntime, RuntimeError};
pub use service::bookmark_service::BookmarkService;
pub use service::tasks::{BookmarkTasks, TaskError, TaskHandle};
pub use view::projection::{BookmarkDetailsView, BookmarkListItemView, BookmarkMarkerView};
pub use view::share::{directions_url, share_text};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
