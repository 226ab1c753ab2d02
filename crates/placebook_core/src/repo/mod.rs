//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the bookmark data access contract, including reactive queries.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Bookmark::validate()` before persistence.
//! - Lookups by id return `Option`; absence is not an error.

pub mod bookmark_repo;
