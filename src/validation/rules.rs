//! Validation Rules
//!
//! Field rules evaluated in a fixed priority order. The first failing rule
//! decides the field's message; later rules are not consulted.

use regex::Regex;

use crate::dom::FieldElement;

/// Data attribute marking a field for the name allow-list
pub const ERROR_MESSAGE_ATTRIBUTE: &str = "error-message";

/// Latin and Cyrillic letters (with both forms of "ё"), hyphen and whitespace
pub const NAME_ALLOW_LIST: &str = r"^[A-Za-zА-Яа-яёЁ\s\-]*$";

pub const NAME_ALLOW_LIST_MESSAGE: &str =
    "Разрешены только латинские, кириллические буквы, знаки дефиса и пробелы";

/// Outcome of evaluating a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid { message: String },
}

impl Verdict {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Verdict::Invalid { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid { message } => Some(message),
        }
    }
}

/// What a single rule concluded about a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule does not concern this field
    NotApplicable,
    Pass,
    Fail(String),
}

/// Allow-list check applied to fields carrying a marker data attribute.
///
/// The attribute's value doubles as the failure message; an empty attribute
/// falls back to the rule's default message.
#[derive(Debug, Clone)]
pub struct AllowListRule {
    marker: String,
    pattern: Regex,
    default_message: String,
}

impl AllowListRule {
    pub fn new(
        marker: impl Into<String>,
        pattern: &str,
        default_message: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            marker: marker.into(),
            pattern: Regex::new(pattern)?,
            default_message: default_message.into(),
        })
    }

    /// Letters, hyphen and whitespace, opted into with `data-error-message`
    pub fn names() -> Self {
        Self {
            marker: ERROR_MESSAGE_ATTRIBUTE.to_string(),
            pattern: Regex::new(NAME_ALLOW_LIST).expect("name allow-list compiles"),
            default_message: NAME_ALLOW_LIST_MESSAGE.to_string(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn allows(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }

    pub fn check<F: FieldElement>(&self, field: &F) -> RuleOutcome {
        let Some(custom_message) = field.data_attribute(&self.marker) else {
            return RuleOutcome::NotApplicable;
        };

        if self.allows(&field.value()) {
            return RuleOutcome::Pass;
        }

        if custom_message.is_empty() {
            RuleOutcome::Fail(self.default_message.clone())
        } else {
            RuleOutcome::Fail(custom_message)
        }
    }
}

/// A single validation rule
#[derive(Debug, Clone)]
pub enum Rule {
    AllowList(AllowListRule),
    /// The host's own constraint validation (required, length, pattern, type)
    Native,
}

impl Rule {
    pub fn check<F: FieldElement>(&self, field: &F) -> RuleOutcome {
        match self {
            Rule::AllowList(rule) => rule.check(field),
            Rule::Native => {
                let validity = field.native_validity();
                if validity.valid {
                    RuleOutcome::Pass
                } else {
                    RuleOutcome::Fail(validity.message)
                }
            }
        }
    }
}

/// Rules in priority order
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The name allow-list followed by native constraints
    pub fn standard() -> Self {
        Self::new(vec![Rule::AllowList(AllowListRule::names()), Rule::Native])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate `field`, stopping at the first failing rule
    pub fn evaluate<F: FieldElement>(&self, field: &F) -> Verdict {
        for rule in &self.rules {
            if let RuleOutcome::Fail(message) = rule.check(field) {
                return Verdict::Invalid { message };
            }
        }
        Verdict::Valid
    }

    pub fn is_invalid<F: FieldElement>(&self, field: &F) -> bool {
        self.evaluate(field).is_invalid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;

    fn field(attrs: &[(&str, &str)], value: &str) -> crate::dom::MemoryElement {
        let doc = MemoryDocument::new();
        let input = doc.create_element("input");
        for (name, v) in attrs {
            input.set_attribute(name, v);
        }
        input.set_value(value);
        doc.root().append_child(&input);
        input
    }

    #[test]
    fn test_allow_list_pattern() {
        let rule = AllowListRule::names();
        assert!(rule.allows(""));
        assert!(rule.allows("Анна-Мария "));
        assert!(rule.allows("Jacques Cousteau"));
        assert!(rule.allows("Ёжик ёлка"));
        assert!(rule.allows("tab\tand\nnewline"));
        assert!(!rule.allows("John123"));
        assert!(!rule.allows("O'Brien"));
        assert!(!rule.allows("naïve"));
    }

    #[test]
    fn test_allow_list_requires_marker() {
        let rule = AllowListRule::names();
        assert_eq!(rule.check(&field(&[], "John123")), RuleOutcome::NotApplicable);
    }

    #[test]
    fn test_allow_list_messages() {
        let rule = AllowListRule::names();
        let custom = field(&[("data-error-message", "Letters only")], "John123");
        assert_eq!(rule.check(&custom), RuleOutcome::Fail("Letters only".to_string()));

        let empty_marker = field(&[("data-error-message", "")], "John123");
        assert_eq!(
            rule.check(&empty_marker),
            RuleOutcome::Fail(NAME_ALLOW_LIST_MESSAGE.to_string())
        );

        let passing = field(&[("data-error-message", "Letters only")], "John");
        assert_eq!(rule.check(&passing), RuleOutcome::Pass);
    }

    #[test]
    fn test_allow_list_preempts_native() {
        let rules = RuleSet::standard();
        let input = field(
            &[("data-error-message", "Letters only"), ("pattern", "[0-9]+")],
            "John123",
        );
        assert_eq!(
            rules.evaluate(&input),
            Verdict::Invalid {
                message: "Letters only".to_string()
            }
        );
    }

    #[test]
    fn test_native_applies_after_allow_list_passes() {
        let rules = RuleSet::standard();
        let input = field(
            &[("data-error-message", "Letters only"), ("required", "")],
            "",
        );
        assert_eq!(
            rules.evaluate(&input).message(),
            Some("Please fill out this field.")
        );
    }

    #[test]
    fn test_custom_rule_set() {
        let digits = AllowListRule::new("digits", r"^[0-9]*$", "Digits only").unwrap();
        assert_eq!(digits.marker(), "digits");
        let rules = RuleSet::new(vec![Rule::AllowList(digits)]);

        assert!(rules.is_invalid(&field(&[("data-digits", "")], "12a")));
        assert!(!rules.is_invalid(&field(&[("data-digits", "")], "123")));
        // No native rule in this set
        assert!(!rules.is_invalid(&field(&[("required", "")], "")));
        assert_eq!(rules.rules().len(), 1);
    }

    #[test]
    fn test_invalid_custom_pattern() {
        assert!(AllowListRule::new("x", "([", "bad").is_err());
    }
}
