//! Form Fixtures
//!
//! TOML descriptions of form markup, built into a [`MemoryDocument`]. Each
//! field gets an error element with id `<field id>-error` unless the fixture
//! says otherwise.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::Element;
use super::memory::{MemoryDocument, MemoryElement};

const GALLERY_FIXTURE: &str = include_str!("../../resources/fixtures/gallery.toml");

/// Root of a fixture file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DocumentFixture {
    #[serde(default)]
    pub forms: Vec<FormFixture>,
}

/// One `<form>` element
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FormFixture {
    pub name: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldFixture>,
    pub button: Option<ButtonFixture>,
}

/// One `<input>` and its error element
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FieldFixture {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type", default = "default_input_type")]
    pub input_type: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub required: bool,
    pub minlength: Option<usize>,
    pub maxlength: Option<usize>,
    pub pattern: Option<String>,
    pub placeholder: Option<String>,
    #[serde(default)]
    pub value: String,
    /// Becomes `data-error-message`
    pub error_message: Option<String>,
    #[serde(default = "default_true")]
    pub error_element: bool,
}

/// The submit `<button>`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ButtonFixture {
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub disabled: bool,
}

fn default_input_type() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl DocumentFixture {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse form fixture")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("In fixture {:?}", path))
    }

    /// The gallery's dialogs: edit-profile, new-place, edit-avatar and remove-card
    pub fn gallery() -> Result<Self> {
        Self::from_toml_str(GALLERY_FIXTURE)
    }

    /// Build the described markup into a fresh document
    pub fn build(&self) -> MemoryDocument {
        let document = MemoryDocument::new();
        let root = document.root();
        for form in &self.forms {
            root.append_child(&form.build(&document));
        }
        log::debug!("Built fixture document with {} forms", self.forms.len());
        document
    }
}

impl FormFixture {
    fn build(&self, document: &MemoryDocument) -> MemoryElement {
        let form = document.create_element("form");
        form.set_attribute("name", &self.name);
        if !self.classes.is_empty() {
            form.set_attribute("class", &self.classes.join(" "));
        }

        for field in &self.fields {
            let label = document.create_element("label");
            label.append_child(&field.build_input(document));
            if field.error_element {
                let error = document.create_element("span");
                error.set_attribute("id", &format!("{}-error", field.id));
                label.append_child(&error);
            }
            form.append_child(&label);
        }

        if let Some(button) = &self.button {
            let element = document.create_element("button");
            element.set_attribute("type", "submit");
            if !button.classes.is_empty() {
                element.set_attribute("class", &button.classes.join(" "));
            }
            if button.disabled {
                element.set_attribute("disabled", "");
            }
            element.set_text_content(&button.text);
            form.append_child(&element);
        }

        form
    }
}

impl FieldFixture {
    fn build_input(&self, document: &MemoryDocument) -> MemoryElement {
        let input = document.create_element("input");
        input.set_attribute("id", &self.id);
        input.set_attribute("type", &self.input_type);
        if let Some(name) = &self.name {
            input.set_attribute("name", name);
        }
        if !self.classes.is_empty() {
            input.set_attribute("class", &self.classes.join(" "));
        }
        if self.required {
            input.set_attribute("required", "");
        }
        if let Some(min) = self.minlength {
            input.set_attribute("minlength", &min.to_string());
        }
        if let Some(max) = self.maxlength {
            input.set_attribute("maxlength", &max.to_string());
        }
        if let Some(pattern) = &self.pattern {
            input.set_attribute("pattern", pattern);
        }
        if let Some(placeholder) = &self.placeholder {
            input.set_attribute("placeholder", placeholder);
        }
        if let Some(message) = &self.error_message {
            input.set_attribute("data-error-message", message);
        }
        input.set_value(&self.value);
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, FieldElement};

    #[test]
    fn test_gallery_fixture_parses() {
        let fixture = DocumentFixture::gallery().expect("embedded fixture");
        let names: Vec<&str> = fixture.forms.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["edit-profile", "new-place", "edit-avatar", "remove-card"]
        );
        let remove = &fixture.forms[3];
        assert!(remove.fields.is_empty());
        assert!(remove.button.is_some());
    }

    #[test]
    fn test_build_field_markup() {
        let fixture = DocumentFixture::from_toml_str(
            r#"
            [[forms]]
            name = "edit"
            classes = ["popup__form"]

            [[forms.fields]]
            id = "title"
            classes = ["popup__input"]
            required = true
            minlength = 2
            value = "Жак"
            error_message = "Only letters"

            [[forms.fields]]
            id = "bare"
            error_element = false

            [forms.button]
            classes = ["popup__button"]
            text = "Save"
            "#,
        )
        .unwrap();

        let document = fixture.build();
        let input = document.get_element_by_id("title").unwrap();
        assert_eq!(input.value(), "Жак");
        assert_eq!(input.attribute("minlength").as_deref(), Some("2"));
        assert_eq!(input.attribute("type").as_deref(), Some("text"));
        assert!(input.has_attribute("required"));
        assert_eq!(input.data_attribute("error-message").as_deref(), Some("Only letters"));
        assert!(document.get_element_by_id("title-error").is_some());
        assert!(document.get_element_by_id("bare-error").is_none());

        let button = document.query_selector("form[name=edit] .popup__button").unwrap().unwrap();
        assert_eq!(button.text_content(), "Save");
        assert!(!button.is_disabled());
        assert_eq!(button.id(), "");
    }

    #[test]
    fn test_build_disabled_button_keeps_label() {
        let fixture = DocumentFixture::from_toml_str(
            r#"
            [[forms]]
            name = "remove-card"

            [forms.button]
            classes = ["popup__button"]
            text = "Да"
            disabled = true
            "#,
        )
        .unwrap();

        let document = fixture.build();
        let button = document.query_selector("button").unwrap().unwrap();
        assert_eq!(button.text_content(), "Да");
        assert!(button.is_disabled());
        assert_eq!(button.attribute("type").as_deref(), Some("submit"));
    }

    #[test]
    fn test_wrong_value_type_fails() {
        assert!(DocumentFixture::from_toml_str("[[forms]]\nname = 3").is_err());
        assert!(DocumentFixture::from_toml_str("").unwrap().forms.is_empty());
    }
}
