//! Settings Loader
//!
//! Reads settings from TOML or JSON files and provides the embedded gallery
//! defaults.

use std::fs;
use std::path::Path;

use super::schema::Settings;
use crate::error::SettingsError;

const GALLERY_SETTINGS: &str = include_str!("../../resources/settings/gallery.toml");

impl Settings {
    /// Settings used by the gallery's own dialogs
    pub fn gallery() -> Self {
        match Self::from_toml_str(GALLERY_SETTINGS) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Failed to parse embedded gallery settings: {}. Using built-in values.",
                    e
                );
                Self::gallery_fallback()
            }
        }
    }

    fn gallery_fallback() -> Self {
        Self {
            form_selector: ".popup__form".to_string(),
            input_selector: ".popup__input".to_string(),
            submit_button_selector: ".popup__button".to_string(),
            inactive_button_class: "popup__button_disabled".to_string(),
            input_error_class: "popup__input_type_error".to_string(),
            error_class: "popup__error_visible".to_string(),
        }
    }

    /// Parse and validate settings written as TOML
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse and validate settings written as JSON
    pub fn from_json_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file; `.json` files are read as JSON, everything
    /// else as TOML
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        log::debug!("Loading settings from {:?}", path);
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_embedded_gallery_settings() {
        let settings = Settings::gallery();
        assert_eq!(settings, Settings::gallery_fallback());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_toml_rejects_empty_value() {
        let content = r#"
            formSelector = ".popup__form"
            inputSelector = ""
            submitButtonSelector = ".popup__button"
            inactiveButtonClass = "popup__button_disabled"
            inputErrorClass = "popup__input_type_error"
            errorClass = "popup__error_visible"
        "#;

        let err = Settings::from_toml_str(content).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid(ValidationError::MissingSetting("inputSelector"))
        ));
    }

    #[test]
    fn test_from_json_syntax_error() {
        let err = Settings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
