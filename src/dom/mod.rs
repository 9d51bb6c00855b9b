//! Host Document Capabilities
//!
//! The engine never touches a document directly. It works through the traits
//! below, which expose exactly the operations validation needs: selector
//! queries, native validity, class toggling and text updates. Element handles
//! are cheap clones sharing the underlying node, like browser references.
//!
//! Two hosts implement them: [`memory::MemoryDocument`] for tests and tooling,
//! and, with the `web` feature, the browser document in `web`.

pub mod fixture;
pub mod memory;
pub mod selector;
pub mod validity;
#[cfg(feature = "web")]
pub mod web;

use crate::error::ValidationError;

pub use memory::{MemoryDocument, MemoryElement};
pub use validity::NativeValidity;

/// Callback run on every input event of a field
pub type InputHandler = Box<dyn FnMut() -> Result<(), ValidationError>>;

/// Stable identity of an element within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(pub u64);

/// Handle to an attached event listener.
///
/// Dropping the handle leaves the listener attached; call [`Listener::detach`]
/// to remove it.
pub struct Listener {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Listener {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Remove the listener from its element
    pub fn detach(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// Operations common to every element the engine touches
pub trait Element: Clone + 'static {
    fn key(&self) -> ElementKey;
    fn id(&self) -> String;
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn set_text_content(&self, text: &str);
}

/// An input taking part in validation
pub trait FieldElement: Element {
    fn value(&self) -> String;

    /// Value of the `data-<name>` attribute, `None` when absent
    fn data_attribute(&self, name: &str) -> Option<String>;

    /// Outcome of the host's own constraint validation
    fn native_validity(&self) -> NativeValidity;

    fn listen_input(&self, handler: InputHandler) -> Result<Listener, ValidationError>;
}

/// The control submitting a form
pub trait ButtonElement: Element {
    fn set_disabled(&self, disabled: bool);
}

/// A form and the scope for its field, button and error element queries
pub trait FormElement: Element {
    type Field: FieldElement;
    type Button: ButtonElement;
    type Node: Element;

    fn query_fields(&self, selector: &str) -> Result<Vec<Self::Field>, ValidationError>;

    /// First button matching `selector`
    fn query_button(&self, selector: &str) -> Result<Option<Self::Button>, ValidationError>;

    /// First descendant matching `selector`
    fn query_node(&self, selector: &str) -> Result<Option<Self::Node>, ValidationError>;

    /// Cancel the default action of every submit event on this form
    fn suppress_submit(&self) -> Result<Listener, ValidationError>;
}

/// The document forms are discovered in
pub trait Document {
    type Form: FormElement;

    fn query_forms(&self, selector: &str) -> Result<Vec<Self::Form>, ValidationError>;
}
