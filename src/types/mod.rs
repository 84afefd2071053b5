// linkshelf shared type definitions
// Each submodule defines types used across the crate.

pub mod bookmark;
pub mod errors;
pub mod metadata;
pub mod platform;
pub mod settings;
pub mod transfer;
