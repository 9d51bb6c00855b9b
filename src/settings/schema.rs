//! Settings Schema
//!
//! The record naming which elements take part in validation and which CSS
//! classes reflect their state.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Selectors and state classes for one group of forms.
///
/// Every entry point takes the settings explicitly, so independently
/// configured form groups can share one engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(alias = "form_selector")]
    pub form_selector: String,
    #[serde(alias = "input_selector")]
    pub input_selector: String,
    #[serde(alias = "submit_button_selector")]
    pub submit_button_selector: String,
    #[serde(alias = "inactive_button_class")]
    pub inactive_button_class: String,
    #[serde(alias = "input_error_class")]
    pub input_error_class: String,
    #[serde(alias = "error_class")]
    pub error_class: String,
}

impl Settings {
    /// Check that every selector and class name is present
    pub fn validate(&self) -> Result<(), ValidationError> {
        let entries = [
            ("formSelector", &self.form_selector),
            ("inputSelector", &self.input_selector),
            ("submitButtonSelector", &self.submit_button_selector),
            ("inactiveButtonClass", &self.inactive_button_class),
            ("inputErrorClass", &self.input_error_class),
            ("errorClass", &self.error_class),
        ];

        for (key, value) in entries {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingSetting(key));
            }
        }

        Ok(())
    }

    /// Selector locating the error element of the field with `field_id`
    pub fn error_selector(field_id: &str) -> String {
        format!("#{}-error", field_id)
    }
}
