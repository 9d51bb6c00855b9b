//! Validation Engine
//!
//! Form validation separated from the host document it runs against.

pub mod engine;
pub mod rules;

pub use engine::{
    EnableSummary, ValidationEngine, check_input_validity, clear_validation, has_invalid_input,
    toggle_button_state,
};
pub use rules::{AllowListRule, Rule, RuleOutcome, RuleSet, Verdict};
