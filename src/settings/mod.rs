//! Validation Settings
//!
//! Configuration records passed explicitly to every engine entry point.

pub mod loader;
pub mod schema;

pub use schema::Settings;
