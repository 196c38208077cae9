//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the file storage backends for uploaded images.

pub mod storage;
