//! UI-facing projections derived from bookmark records.
//!
//! # Responsibility
//! - Build list, detail and marker views from `Bookmark`.
//! - Build share/directions payloads from a detail view.
//!
//! # Invariants
//! - Views are never persisted; they are recomputed from each emission.

pub mod projection;
pub mod share;
