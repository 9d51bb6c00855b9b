//! Gallery Form Validation
//!
//! Client-side validation for the gallery's popup forms: live error messages
//! per field, a submit button that is only active while every field is valid,
//! and a reset used when a popup is reopened.
//!
//! This library provides:
//! - The validation engine and its field rules
//! - Host document traits, with an in-memory document and a browser binding
//! - Settings loading and form fixtures
//! - Configuration for the `gallery-validate` tool

pub mod config;
pub mod dom;
pub mod error;
pub mod report;
pub mod settings;
pub mod validation;

pub use config::Config;
pub use dom::{Document, FormElement, MemoryDocument, MemoryElement};
pub use error::{SettingsError, ValidationError};
pub use report::DocumentReport;
pub use settings::Settings;
pub use validation::{RuleSet, ValidationEngine, Verdict, clear_validation};
