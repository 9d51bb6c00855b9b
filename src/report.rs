//! Validation Report
//!
//! A serializable snapshot of what a user would currently see on each form of
//! an in-memory document.

use std::fmt;

use serde::Serialize;

use crate::dom::{Element, FieldElement, MemoryDocument, MemoryElement};
use crate::error::ValidationError;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub forms: Vec<FormReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormReport {
    /// The form's `name` attribute, empty when absent
    pub name: String,
    pub submit: Option<ButtonReport>,
    pub fields: Vec<FieldReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonReport {
    pub disabled: bool,
    pub inactive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    pub id: String,
    pub value: String,
    /// Whether the field carries the input error class
    pub marked_invalid: bool,
    /// Text of the error element, `None` when the element is missing
    pub error_text: Option<String>,
    pub error_visible: bool,
}

impl DocumentReport {
    /// Capture every form matching `settings.form_selector`
    pub fn capture(document: &MemoryDocument, settings: &Settings) -> Result<Self, ValidationError> {
        let forms = document
            .query_selector_all(&settings.form_selector)?
            .iter()
            .map(|form| FormReport::capture(form, settings))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { forms })
    }

    pub fn form(&self, name: &str) -> Option<&FormReport> {
        self.forms.iter().find(|form| form.name == name)
    }
}

impl FormReport {
    pub fn capture(form: &MemoryElement, settings: &Settings) -> Result<Self, ValidationError> {
        let submit = form
            .query_selector(&settings.submit_button_selector)?
            .map(|button| ButtonReport {
                disabled: button.is_disabled(),
                inactive: button.has_class(&settings.inactive_button_class),
            });

        let mut fields = Vec::new();
        for field in form.query_selector_all(&settings.input_selector)? {
            let id = field.id();
            let error = if id.is_empty() {
                None
            } else {
                form.query_selector(&Settings::error_selector(&id)).ok().flatten()
            };

            fields.push(FieldReport {
                value: field.value(),
                marked_invalid: field.has_class(&settings.input_error_class),
                error_text: error.as_ref().map(|e| e.text_content()),
                error_visible: error
                    .as_ref()
                    .is_some_and(|e| e.has_class(&settings.error_class)),
                id,
            });
        }

        Ok(Self {
            name: form.attribute("name").unwrap_or_default(),
            submit,
            fields,
        })
    }

    pub fn field(&self, id: &str) -> Option<&FieldReport> {
        self.fields.iter().find(|field| field.id == id)
    }
}

impl fmt::Display for DocumentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for form in &self.forms {
            write!(f, "{}", form)?;
        }
        Ok(())
    }
}

impl fmt::Display for FormReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() { "<unnamed>" } else { self.name.as_str() };
        let submit = match &self.submit {
            None => "no submit button",
            Some(button) if button.disabled => "submit disabled",
            Some(_) => "submit enabled",
        };
        writeln!(f, "form {} ({})", name, submit)?;

        for field in &self.fields {
            let status = if field.marked_invalid { "invalid" } else { "ok" };
            write!(f, "  {:<24} {:<8} {:?}", field.id, status, field.value)?;
            match &field.error_text {
                Some(text) if !text.is_empty() => writeln!(f, "  -> {}", text)?,
                Some(_) => writeln!(f)?,
                None => writeln!(f, "  (no error element)")?,
            }
        }
        Ok(())
    }
}
