//! Validation Engine
//!
//! Registers forms, keeps each field's error display and each form's submit
//! button in step with the field values, and resets forms on request.

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::rules::{RuleSet, Verdict};
use crate::dom::{ButtonElement, Document, Element, ElementKey, FieldElement, FormElement, Listener};
use crate::error::ValidationError;
use crate::settings::Settings;

/// What one `enable_validation` pass found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnableSummary {
    pub forms_found: usize,
    /// Forms that gained or lost fields in this pass, including new forms
    pub registered: usize,
    /// Forms without any matching field
    pub skipped: usize,
    /// Forms whose fields were all wired by an earlier pass
    pub already_registered: usize,
    /// Input listeners attached by this pass
    pub fields_attached: usize,
}

/// The fields and submit button of one form, with the settings they were found by
struct FormBinding<F: FormElement> {
    form: F,
    fields: Vec<F::Field>,
    button: Option<F::Button>,
    settings: Settings,
}

impl<F: FormElement> FormBinding<F> {
    fn discover(form: &F, settings: &Settings) -> Result<Self, ValidationError> {
        Ok(Self {
            form: form.clone(),
            fields: form.query_fields(&settings.input_selector)?,
            button: form.query_button(&settings.submit_button_selector)?,
            settings: settings.clone(),
        })
    }
}

/// Listeners the engine attached to one form.
///
/// Input listeners are keyed by field, so a later pass only wires fields it
/// has not seen. Every handler reads the shared binding, which each pass
/// replaces with the form's current fields and button.
struct FormRegistration<F: FormElement> {
    binding: Rc<RefCell<FormBinding<F>>>,
    submit: Listener,
    fields: HashMap<ElementKey, Listener>,
}

impl<F: FormElement> FormRegistration<F> {
    fn new(form: &F, settings: &Settings) -> Result<Self, ValidationError> {
        Ok(Self {
            binding: Rc::new(RefCell::new(FormBinding {
                form: form.clone(),
                fields: Vec::new(),
                button: None,
                settings: settings.clone(),
            })),
            submit: form.suppress_submit()?,
            fields: HashMap::new(),
        })
    }

    fn detach(self) {
        self.submit.detach();
        for (_, listener) in self.fields {
            listener.detach();
        }
    }
}

/// How one form changed in an `enable_validation` pass
enum FormSync {
    Wired { attached: usize },
    NoFields,
    Unchanged,
}

/// Form validation over a host document.
///
/// Attachment is idempotent per field: the engine remembers every field it
/// wired up, and a repeated [`enable_validation`](Self::enable_validation)
/// only wires fields that joined a form since.
/// [`disable_validation`](Self::disable_validation) undoes the wiring.
pub struct ValidationEngine<D: Document> {
    document: D,
    rules: Rc<RuleSet>,
    registrations: HashMap<ElementKey, FormRegistration<D::Form>>,
}

impl<D: Document> ValidationEngine<D> {
    pub fn new(document: D) -> Self {
        Self::with_rules(document, RuleSet::standard())
    }

    pub fn with_rules(document: D, rules: RuleSet) -> Self {
        Self {
            document,
            rules: Rc::new(rules),
            registrations: HashMap::new(),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn is_registered(&self, form: &D::Form) -> bool {
        self.registrations.contains_key(&form.key())
    }

    /// Number of forms currently wired up, including field-less ones
    pub fn registered_forms(&self) -> usize {
        self.registrations.len()
    }

    /// Wire up every form matching `settings.form_selector`.
    ///
    /// Each new form has its native submission suppressed. Fields not yet
    /// wired get an input listener, and a form whose field set changed has its
    /// button state recomputed from the current values.
    ///
    /// On error the pass stops: forms and fields wired before the failure stay
    /// wired, and calling again resumes from the first unwired field.
    pub fn enable_validation(&mut self, settings: &Settings) -> Result<EnableSummary, ValidationError> {
        settings.validate()?;

        let forms = self.document.query_forms(&settings.form_selector)?;
        let mut summary = EnableSummary {
            forms_found: forms.len(),
            ..EnableSummary::default()
        };

        for form in forms {
            match self.sync_form(&form, settings)? {
                FormSync::Wired { attached } => {
                    summary.registered += 1;
                    summary.fields_attached += attached;
                }
                FormSync::NoFields => summary.skipped += 1,
                FormSync::Unchanged => {
                    log::debug!("Form {:?} already has validation enabled", form.key());
                    summary.already_registered += 1;
                }
            }
        }

        log::info!(
            "Validation enabled: {} forms found, {} registered, {} without fields, {} unchanged, {} fields attached",
            summary.forms_found,
            summary.registered,
            summary.skipped,
            summary.already_registered,
            summary.fields_attached
        );
        Ok(summary)
    }

    fn sync_form(&mut self, form: &D::Form, settings: &Settings) -> Result<FormSync, ValidationError> {
        let discovered = FormBinding::discover(form, settings)?;
        let registration = match self.registrations.entry(form.key()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(FormRegistration::new(form, settings)?),
        };

        // Fields that left the form no longer take part
        let current: HashSet<ElementKey> = discovered.fields.iter().map(|field| field.key()).collect();
        let stale: Vec<ElementKey> = registration
            .fields
            .keys()
            .filter(|key| !current.contains(key))
            .copied()
            .collect();
        for key in &stale {
            if let Some(listener) = registration.fields.remove(key) {
                listener.detach();
            }
        }

        let fresh: Vec<<D::Form as FormElement>::Field> = discovered
            .fields
            .iter()
            .filter(|field| !registration.fields.contains_key(&field.key()))
            .cloned()
            .collect();
        *registration.binding.borrow_mut() = discovered;

        if current.is_empty() {
            log::debug!("Form {:?} has no fields matching '{}'", form.key(), settings.input_selector);
            return Ok(FormSync::NoFields);
        }
        if fresh.is_empty() && stale.is_empty() {
            return Ok(FormSync::Unchanged);
        }

        for field in &fresh {
            let handler_binding = Rc::clone(&registration.binding);
            let handler_rules = Rc::clone(&self.rules);
            let handler_field = field.clone();

            let listener = field.listen_input(Box::new(move || -> Result<(), ValidationError> {
                let binding = handler_binding.borrow();
                check_input_validity(&binding.form, &handler_field, &binding.settings, &handler_rules)?;
                toggle_button_state(
                    &binding.fields,
                    binding.button.as_ref(),
                    &binding.settings,
                    &handler_rules,
                );
                Ok(())
            }))?;
            registration.fields.insert(field.key(), listener);
        }

        let binding = registration.binding.borrow();
        toggle_button_state(&binding.fields, binding.button.as_ref(), settings, &self.rules);
        log::debug!(
            "Form {:?}: {} fields ({} new), submit button {}",
            form.key(),
            binding.fields.len(),
            fresh.len(),
            if binding.button.is_some() { "present" } else { "absent" }
        );
        Ok(FormSync::Wired { attached: fresh.len() })
    }

    /// Detach every listener this engine attached to `form`.
    ///
    /// Returns `false` when the form was not registered. Error displays and
    /// button state are left as they are.
    pub fn disable_validation(&mut self, form: &D::Form) -> bool {
        match self.registrations.remove(&form.key()) {
            Some(registration) => {
                registration.detach();
                true
            }
            None => false,
        }
    }

    /// Detach every listener this engine attached
    pub fn disable_all(&mut self) {
        for (_, registration) in self.registrations.drain() {
            registration.detach();
        }
    }
}

/// Reset `form` to a clean state: no error text, no error classes and an
/// inactive submit button. Field values are not re-validated.
pub fn clear_validation<F: FormElement>(form: &F, settings: &Settings) -> Result<(), ValidationError> {
    let binding = FormBinding::discover(form, settings)?;

    for field in &binding.fields {
        hide_input_error(form, field, settings)?;
    }

    disable_submit_button(binding.button.as_ref(), settings);
    Ok(())
}

/// Re-evaluate `field` and update its error display
pub fn check_input_validity<F: FormElement>(
    form: &F,
    field: &F::Field,
    settings: &Settings,
    rules: &RuleSet,
) -> Result<Verdict, ValidationError> {
    let verdict = rules.evaluate(field);
    match &verdict {
        Verdict::Invalid { message } => show_input_error(form, field, message, settings)?,
        Verdict::Valid => hide_input_error(form, field, settings)?,
    }
    Ok(verdict)
}

/// Whether any field in `fields` is currently invalid
pub fn has_invalid_input<T: FieldElement>(fields: &[T], rules: &RuleSet) -> bool {
    fields.iter().any(|field| rules.is_invalid(field))
}

/// Enable the button when every field is valid, disable it otherwise
pub fn toggle_button_state<T: FieldElement, B: ButtonElement>(
    fields: &[T],
    button: Option<&B>,
    settings: &Settings,
    rules: &RuleSet,
) {
    let Some(button) = button else {
        return;
    };

    if has_invalid_input(fields, rules) {
        disable_submit_button(Some(button), settings);
    } else {
        enable_submit_button(Some(button), settings);
    }
}

pub fn disable_submit_button<B: ButtonElement>(button: Option<&B>, settings: &Settings) {
    if let Some(button) = button {
        button.set_disabled(true);
        button.add_class(&settings.inactive_button_class);
    }
}

pub fn enable_submit_button<B: ButtonElement>(button: Option<&B>, settings: &Settings) {
    if let Some(button) = button {
        button.set_disabled(false);
        button.remove_class(&settings.inactive_button_class);
    }
}

/// Mark `field` invalid and show `message` in its error element
pub fn show_input_error<F: FormElement>(
    form: &F,
    field: &F::Field,
    message: &str,
    settings: &Settings,
) -> Result<(), ValidationError> {
    let error_element = error_element_for(form, field)?;
    field.add_class(&settings.input_error_class);
    error_element.set_text_content(message);
    error_element.add_class(&settings.error_class);
    Ok(())
}

/// Clear `field`'s invalid marking and its error element
pub fn hide_input_error<F: FormElement>(
    form: &F,
    field: &F::Field,
    settings: &Settings,
) -> Result<(), ValidationError> {
    let error_element = error_element_for(form, field)?;
    field.remove_class(&settings.input_error_class);
    error_element.remove_class(&settings.error_class);
    error_element.set_text_content("");
    Ok(())
}

fn error_element_for<F: FormElement>(form: &F, field: &F::Field) -> Result<F::Node, ValidationError> {
    let field_id = field.id();
    let missing = || ValidationError::MissingErrorElement {
        field_id: field_id.clone(),
    };

    if field_id.is_empty() {
        log::error!("Validated field has no id; its error element cannot be located");
        return Err(missing());
    }

    // An id that does not form a valid selector cannot name an error element either
    match form.query_node(&Settings::error_selector(&field_id)) {
        Ok(Some(node)) => Ok(node),
        Ok(None) | Err(ValidationError::InvalidSelector { .. }) => {
            log::error!("Missing error element '#{}-error'", field_id);
            Err(missing())
        }
        Err(e) => Err(e),
    }
}
