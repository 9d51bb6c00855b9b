//! Browser Host
//!
//! The capability traits over `web_sys`, plus the `enableValidation`,
//! `clearValidation` and `disableValidation` exports for the page script.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Display;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement};

use super::{
    ButtonElement, Document, Element, ElementKey, FieldElement, FormElement, InputHandler, Listener,
    NativeValidity,
};
use crate::error::ValidationError;
use crate::settings::Settings;
use crate::validation::{ValidationEngine, clear_validation};

/// Attribute holding the key the engine identifies an element by
const KEY_ATTRIBUTE: &str = "data-validation-key";

type Callback = Closure<dyn FnMut(Event)>;

thread_local! {
    static NEXT_KEY: Cell<u64> = const { Cell::new(1) };
    static ENGINE: RefCell<Option<ValidationEngine<WebDocument>>> = const { RefCell::new(None) };
    /// Callbacks registered on the page, owned here until their listener is detached
    static CALLBACKS: RefCell<HashMap<u64, Callback>> = RefCell::new(HashMap::new());
    static NEXT_CALLBACK: Cell<u64> = const { Cell::new(1) };
}

/// The page's document
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The document of the current window
    pub fn current() -> Result<Self, ValidationError> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
            .ok_or_else(|| ValidationError::Host("no document available".to_string()))
    }
}

/// A DOM element playing whichever role the engine needs
#[derive(Debug, Clone, PartialEq)]
pub struct WebElement {
    element: web_sys::Element,
}

impl WebElement {
    pub fn new(element: web_sys::Element) -> Self {
        Self { element }
    }

    pub fn as_element(&self) -> &web_sys::Element {
        &self.element
    }
}

fn invalid_selector(selector: &str, error: JsValue) -> ValidationError {
    ValidationError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", error),
    }
}

fn host_error(context: &str, error: JsValue) -> ValidationError {
    ValidationError::Host(format!("{}: {:?}", context, error))
}

fn collect_elements(list: web_sys::NodeList) -> Vec<WebElement> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .map(WebElement::new)
        .collect()
}

/// Register `callback` for `event` on `target`. The callback stays alive until
/// the returned listener is detached, whether or not the handle is kept.
fn attach(target: &web_sys::Element, event: &'static str, callback: Callback) -> Result<Listener, ValidationError> {
    target
        .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        .map_err(|e| host_error(&format!("adding {} listener", event), e))?;

    let id = NEXT_CALLBACK.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    });
    CALLBACKS.with(|callbacks| callbacks.borrow_mut().insert(id, callback));

    let target = target.clone();
    Ok(Listener::new(move || {
        let Some(callback) = CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&id)) else {
            return;
        };
        report_dom_failure(
            "listener removal",
            target.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref()),
        );
    }))
}

fn report_dom_failure(operation: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("DOM {} failed: {:?}", operation, e);
    }
}

impl Element for WebElement {
    fn key(&self) -> ElementKey {
        if let Some(key) = self
            .element
            .get_attribute(KEY_ATTRIBUTE)
            .and_then(|raw| raw.parse().ok())
        {
            return ElementKey(key);
        }

        let key = NEXT_KEY.with(|next| {
            let key = next.get();
            next.set(key + 1);
            key
        });
        report_dom_failure(
            "set key",
            self.element.set_attribute(KEY_ATTRIBUTE, &key.to_string()),
        );
        ElementKey(key)
    }

    fn id(&self) -> String {
        self.element.id()
    }

    fn add_class(&self, class: &str) {
        report_dom_failure("class add", self.element.class_list().add_1(class));
    }

    fn remove_class(&self, class: &str) {
        report_dom_failure("class remove", self.element.class_list().remove_1(class));
    }

    fn set_text_content(&self, text: &str) {
        self.element.set_text_content(Some(text));
    }
}

impl FieldElement for WebElement {
    fn value(&self) -> String {
        if let Some(input) = self.element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = self.element.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    fn data_attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(&format!("data-{}", name))
    }

    fn native_validity(&self) -> NativeValidity {
        let (valid, message) = if let Some(input) = self.element.dyn_ref::<HtmlInputElement>() {
            (input.validity().valid(), input.validation_message())
        } else if let Some(area) = self.element.dyn_ref::<HtmlTextAreaElement>() {
            (area.validity().valid(), area.validation_message())
        } else {
            return NativeValidity::valid();
        };

        if valid {
            NativeValidity::valid()
        } else {
            NativeValidity::invalid(message.unwrap_or_default())
        }
    }

    fn listen_input(&self, mut handler: InputHandler) -> Result<Listener, ValidationError> {
        let field_id = self.element.id();
        let callback = Callback::new(move |_event: Event| {
            if let Err(e) = handler() {
                log::error!("Validation of '{}' failed: {}", field_id, e);
                web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
            }
        });
        attach(&self.element, "input", callback)
    }
}

impl ButtonElement for WebElement {
    fn set_disabled(&self, disabled: bool) {
        let result = if disabled {
            self.element.set_attribute("disabled", "")
        } else {
            self.element.remove_attribute("disabled")
        };
        report_dom_failure("disabled toggle", result);
    }
}

impl FormElement for WebElement {
    type Field = WebElement;
    type Button = WebElement;
    type Node = WebElement;

    fn query_fields(&self, selector: &str) -> Result<Vec<Self::Field>, ValidationError> {
        self.element
            .query_selector_all(selector)
            .map(collect_elements)
            .map_err(|e| invalid_selector(selector, e))
    }

    fn query_button(&self, selector: &str) -> Result<Option<Self::Button>, ValidationError> {
        self.query_node(selector)
    }

    fn query_node(&self, selector: &str) -> Result<Option<Self::Node>, ValidationError> {
        self.element
            .query_selector(selector)
            .map(|found| found.map(WebElement::new))
            .map_err(|e| invalid_selector(selector, e))
    }

    fn suppress_submit(&self) -> Result<Listener, ValidationError> {
        attach(&self.element, "submit", Callback::new(|event: Event| event.prevent_default()))
    }
}

impl Document for WebDocument {
    type Form = WebElement;

    fn query_forms(&self, selector: &str) -> Result<Vec<Self::Form>, ValidationError> {
        self.document
            .query_selector_all(selector)
            .map(collect_elements)
            .map_err(|e| invalid_selector(selector, e))
    }
}

fn to_js(error: impl Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn settings_from_js(settings: JsValue) -> Result<Settings, JsValue> {
    serde_wasm_bindgen::from_value(settings)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse settings: {}", e)))
}

/// Wire up every form on the page matching `settings.formSelector`
#[wasm_bindgen(js_name = enableValidation)]
pub fn enable_validation_js(settings: JsValue) -> Result<(), JsValue> {
    let settings = settings_from_js(settings)?;
    let document = WebDocument::current().map_err(to_js)?;

    ENGINE.with(|engine| {
        let mut engine = engine.borrow_mut();
        let engine = engine.get_or_insert_with(|| ValidationEngine::new(document));
        engine.enable_validation(&settings).map(|_| ()).map_err(to_js)
    })
}

/// Reset a form's error displays and deactivate its submit button
#[wasm_bindgen(js_name = clearValidation)]
pub fn clear_validation_js(form: HtmlFormElement, settings: JsValue) -> Result<(), JsValue> {
    let settings = settings_from_js(settings)?;
    let form = WebElement::new(form.unchecked_into());
    clear_validation(&form, &settings).map_err(to_js)
}

/// Detach every listener `enableValidation` attached
#[wasm_bindgen(js_name = disableValidation)]
pub fn disable_validation_js() {
    ENGINE.with(|engine| {
        if let Some(engine) = engine.borrow_mut().as_mut() {
            engine.disable_all();
        }
    });
}
