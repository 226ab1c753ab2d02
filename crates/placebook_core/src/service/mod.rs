//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and image-store calls into use-case level APIs.
//! - Offload blocking work to background tasks with completion handles.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod bookmark_service;
pub mod tasks;
