//! Flutter-facing bindings for PlaceBook core.

pub mod api;
