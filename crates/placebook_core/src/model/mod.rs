//! Bookmark domain model.
//!
//! # Responsibility
//! - Define the canonical bookmark record and the fixed category taxonomy.
//! - Describe the external place boundary consumed when saving a place.
//!
//! # Invariants
//! - Bookmarks are identified by a store-assigned `BookmarkId`.
//! - Category names always come from `CategoryMap::standard()`.

pub mod bookmark;
pub mod category;
pub mod place;
