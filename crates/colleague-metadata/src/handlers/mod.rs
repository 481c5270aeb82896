//! Request handlers.
//!
//! Synthesis is synchronous and runs on the request task; the catalog is
//! read-only and shared.

pub mod manifest;
pub mod metadata;
pub mod resources;
