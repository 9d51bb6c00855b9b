//! Native Constraint Validation
//!
//! Browser-style evaluation of the constraints declared on an input's markup,
//! used by hosts that have no engine of their own to ask.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Result of a host's native constraint check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeValidity {
    pub valid: bool,
    /// Host-supplied message, empty when valid
    pub message: String,
}

impl NativeValidity {
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Which constraints a value violates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidityState {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
}

impl ValidityState {
    pub fn valid(&self) -> bool {
        !self.value_missing
            && !self.type_mismatch
            && !self.pattern_mismatch
            && !self.too_long
            && !self.too_short
    }
}

/// Input types with their own syntax checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    #[default]
    Text,
    Url,
    Email,
}

impl InputType {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "url" => Self::Url,
            "email" => Self::Email,
            _ => Self::Text,
        }
    }
}

/// Constraints declared on an input
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub input_type: InputType,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// The `pattern` attribute anchored to the whole value; `None` when absent
    /// or uncompilable
    pub pattern: Option<Regex>,
    pub title: Option<String>,
}

static URL_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:[^\s]+$").expect("valid URL regex"));

static EMAIL_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)*$").expect("valid email regex"));

impl Constraints {
    /// Read constraints from element attributes
    pub fn from_attributes(attributes: &BTreeMap<String, String>) -> Self {
        let length = |name: &str| {
            attributes
                .get(name)
                .and_then(|value| value.trim().parse::<usize>().ok())
        };

        Self {
            input_type: attributes
                .get("type")
                .map(|t| InputType::parse(t))
                .unwrap_or_default(),
            required: attributes.contains_key("required"),
            min_length: length("minlength"),
            max_length: length("maxlength"),
            pattern: attributes.get("pattern").and_then(|pattern| compile_pattern(pattern)),
            title: attributes.get("title").cloned(),
        }
    }

    /// Evaluate `value` against every constraint
    pub fn check(&self, value: &str) -> ValidityState {
        let mut state = ValidityState::default();

        if value.is_empty() {
            state.value_missing = self.required;
            return state;
        }

        state.type_mismatch = match self.input_type {
            InputType::Text => false,
            InputType::Url => !URL_SYNTAX.is_match(value),
            InputType::Email => !EMAIL_SYNTAX.is_match(value),
        };

        if let Some(pattern) = &self.pattern {
            state.pattern_mismatch = !pattern.is_match(value);
        }

        let length = utf16_length(value);
        if let Some(max) = self.max_length {
            state.too_long = length > max;
        }
        if let Some(min) = self.min_length {
            state.too_short = length < min;
        }

        state
    }

    /// Browser wording for the first violated constraint
    pub fn validation_message(&self, state: &ValidityState, value: &str) -> String {
        if state.value_missing {
            return "Please fill out this field.".to_string();
        }

        if state.type_mismatch {
            return match self.input_type {
                InputType::Url => "Please enter a URL.".to_string(),
                InputType::Email => format!(
                    "Please enter an email address. '{}' is not a valid email address.",
                    value
                ),
                InputType::Text => "Please enter a valid value.".to_string(),
            };
        }

        if state.pattern_mismatch {
            return match &self.title {
                Some(title) if !title.is_empty() => {
                    format!("Please match the requested format: {}.", title)
                }
                _ => "Please match the requested format.".to_string(),
            };
        }

        let length = utf16_length(value);
        if state.too_long {
            return format!(
                "Please shorten this text to {} characters or less (you are currently using {} characters).",
                self.max_length.unwrap_or_default(),
                length
            );
        }

        if state.too_short {
            return format!(
                "Please lengthen this text to {} characters or more (you are currently using {} characters).",
                self.min_length.unwrap_or_default(),
                length
            );
        }

        String::new()
    }

    /// Check `value` and package the outcome the way a host reports it
    pub fn evaluate(&self, value: &str) -> NativeValidity {
        let state = self.check(value);
        if state.valid() {
            NativeValidity::valid()
        } else {
            NativeValidity::invalid(self.validation_message(&state, value))
        }
    }
}

/// An uncompilable pattern is ignored, as browsers do
fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(&format!("^(?:{})$", pattern)) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Ignoring invalid pattern attribute '{}': {}", pattern, e);
            None
        }
    }
}

/// Length in UTF-16 code units, the unit browsers measure text constraints in
fn utf16_length(value: &str) -> usize {
    value.encode_utf16().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_required_empty_value() {
        let constraints = Constraints::from_attributes(&attributes(&[("required", "")]));
        let result = constraints.evaluate("");
        assert!(!result.valid);
        assert_eq!(result.message, "Please fill out this field.");
        assert!(constraints.evaluate("x").valid);
    }

    #[test]
    fn test_optional_empty_value_skips_other_checks() {
        let constraints = Constraints::from_attributes(&attributes(&[
            ("type", "url"),
            ("minlength", "2"),
            ("pattern", "[0-9]+"),
        ]));
        assert!(constraints.evaluate("").valid);
    }

    #[test]
    fn test_length_limits_count_utf16_units() {
        let constraints = Constraints::from_attributes(&attributes(&[
            ("minlength", "2"),
            ("maxlength", "4"),
        ]));

        let short = constraints.check("Ж");
        assert!(short.too_short);
        assert_eq!(
            constraints.validation_message(&short, "Ж"),
            "Please lengthen this text to 2 characters or more (you are currently using 1 characters)."
        );

        assert!(constraints.check("Жанна").too_long);
        assert!(constraints.check("Жан").valid());
        // One astral character is two code units
        assert!(constraints.check("😀").valid());
    }

    #[test]
    fn test_url_type() {
        let constraints = Constraints::from_attributes(&attributes(&[("type", "URL")]));
        assert!(constraints.evaluate("https://example.com/a.jpg").valid);
        let result = constraints.evaluate("not a url");
        assert!(!result.valid);
        assert_eq!(result.message, "Please enter a URL.");
    }

    #[test]
    fn test_email_type() {
        let constraints = Constraints::from_attributes(&attributes(&[("type", "email")]));
        assert!(constraints.evaluate("user@example.com").valid);
        assert!(!constraints.evaluate("user@").valid);
    }

    #[test]
    fn test_pattern_is_anchored() {
        let constraints = Constraints::from_attributes(&attributes(&[
            ("pattern", "[a-z]+"),
            ("title", "lowercase letters"),
        ]));
        assert_eq!(
            constraints.pattern.as_ref().map(|re| re.as_str()),
            Some("^(?:[a-z]+)$")
        );
        assert!(constraints.evaluate("abc").valid);

        let result = constraints.evaluate("abc1");
        assert!(!result.valid);
        assert_eq!(
            result.message,
            "Please match the requested format: lowercase letters."
        );
    }

    #[test]
    fn test_invalid_pattern_is_ignored() {
        let constraints = Constraints::from_attributes(&attributes(&[("pattern", "([")]));
        assert!(constraints.pattern.is_none());
        assert!(constraints.evaluate("anything").valid);
    }
}
