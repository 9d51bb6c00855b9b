//! In-Memory Document
//!
//! An arena-backed element tree implementing every host capability, so the
//! engine can be driven without a browser. Handles share the tree through
//! `Rc<RefCell<..>>`; listeners are stored on their nodes and invoked by
//! [`MemoryElement::dispatch_input`] and [`MemoryElement::dispatch_submit`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::selector::{Combinator, ComplexSelector, CompoundSelector, Matchable, SelectorList};
use super::validity::{Constraints, NativeValidity};
use super::{
    ButtonElement, Document, Element, ElementKey, FieldElement, FormElement, InputHandler,
    Listener,
};
use crate::error::ValidationError;

type NodeId = usize;
type SharedInputHandler = Rc<RefCell<InputHandler>>;

const ROOT: NodeId = 0;

#[derive(Debug, Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    value: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    input_listeners: Vec<u64>,
    submit_listeners: Vec<u64>,
    /// Parsed from `attributes` on first validity check, reset when they change
    constraints: Option<Constraints>,
}

#[derive(Default)]
struct Tree {
    nodes: Vec<Node>,
    handlers: BTreeMap<u64, SharedInputHandler>,
    next_listener: u64,
}

impl Tree {
    fn next_listener_id(&mut self) -> u64 {
        self.next_listener += 1;
        self.next_listener
    }

    /// Descendants of `scope` in document order
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[scope].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        out
    }

    fn matches(&self, id: NodeId, selector: &ComplexSelector) -> bool {
        if !selector.subject.matches(&NodeView(&self.nodes[id])) {
            return false;
        }
        self.matches_ancestors(id, &selector.ancestors)
    }

    fn matches_ancestors(&self, id: NodeId, ancestors: &[(Combinator, CompoundSelector)]) -> bool {
        let Some(((combinator, compound), rest)) = ancestors.split_first() else {
            return true;
        };

        let mut current = self.nodes[id].parent;
        while let Some(candidate) = current {
            if candidate == ROOT {
                return false;
            }
            if compound.matches(&NodeView(&self.nodes[candidate]))
                && self.matches_ancestors(candidate, rest)
            {
                return true;
            }
            if *combinator == Combinator::Child {
                return false;
            }
            current = self.nodes[candidate].parent;
        }
        false
    }
}

struct NodeView<'a>(&'a Node);

impl Matchable for NodeView<'_> {
    fn tag(&self) -> &str {
        &self.0.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.0.attributes.get(name).map(|v| v.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.classes.iter().any(|c| c == class)
    }
}

/// Outcome of dispatching a submit event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub default_prevented: bool,
}

/// A document held entirely in memory
#[derive(Clone)]
pub struct MemoryDocument {
    tree: Rc<RefCell<Tree>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("nodes", &self.tree.borrow().nodes.len())
            .finish()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        let tree = Tree {
            nodes: vec![Node {
                tag: "#document".to_string(),
                ..Node::default()
            }],
            ..Tree::default()
        };
        Self {
            tree: Rc::new(RefCell::new(tree)),
        }
    }

    /// The document node; append top-level elements to it
    pub fn root(&self) -> MemoryElement {
        MemoryElement {
            tree: Rc::clone(&self.tree),
            id: ROOT,
        }
    }

    /// Create a detached element
    pub fn create_element(&self, tag: &str) -> MemoryElement {
        let mut tree = self.tree.borrow_mut();
        tree.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        });
        MemoryElement {
            tree: Rc::clone(&self.tree),
            id: tree.nodes.len() - 1,
        }
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<MemoryElement>, ValidationError> {
        self.root().query_selector_all(selector)
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<MemoryElement>, ValidationError> {
        self.root().query_selector(selector)
    }

    /// First connected element whose `id` attribute equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<MemoryElement> {
        let found = {
            let tree = self.tree.borrow();
            tree.descendants(ROOT)
                .into_iter()
                .find(|&node| tree.nodes[node].attributes.get("id").map(|v| v.as_str()) == Some(id))
        };
        found.map(|node| MemoryElement {
            tree: Rc::clone(&self.tree),
            id: node,
        })
    }
}

/// Handle to one node of a [`MemoryDocument`]
#[derive(Clone)]
pub struct MemoryElement {
    tree: Rc<RefCell<Tree>>,
    id: NodeId,
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }
}

impl Eq for MemoryElement {}

impl std::fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.tree.borrow();
        let node = &tree.nodes[self.id];
        f.debug_struct("MemoryElement")
            .field("tag", &node.tag)
            .field("id", &node.attributes.get("id"))
            .field("classes", &node.classes)
            .finish()
    }
}

impl MemoryElement {
    fn with_node<R>(&self, f: impl FnOnce(&Node) -> R) -> R {
        f(&self.tree.borrow().nodes[self.id])
    }

    fn with_node_mut<R>(&self, f: impl FnOnce(&mut Node) -> R) -> R {
        f(&mut self.tree.borrow_mut().nodes[self.id])
    }

    fn handle(&self, id: NodeId) -> MemoryElement {
        MemoryElement {
            tree: Rc::clone(&self.tree),
            id,
        }
    }

    pub fn tag(&self) -> String {
        self.with_node(|node| node.tag.clone())
    }

    /// Append `child`, moving it out of any previous parent
    pub fn append_child(&self, child: &MemoryElement) {
        let mut tree = self.tree.borrow_mut();
        if let Some(old_parent) = tree.nodes[child.id].parent {
            tree.nodes[old_parent].children.retain(|&c| c != child.id);
        }
        tree.nodes[child.id].parent = Some(self.id);
        tree.nodes[self.id].children.push(child.id);
    }

    /// Detach this element from its parent
    pub fn remove(&self) {
        let mut tree = self.tree.borrow_mut();
        if let Some(parent) = tree.nodes[self.id].parent.take() {
            tree.nodes[parent].children.retain(|&c| c != self.id);
        }
    }

    pub fn parent(&self) -> Option<MemoryElement> {
        self.with_node(|node| node.parent).map(|id| self.handle(id))
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "class" {
            let classes = value.split_whitespace().map(str::to_string).collect();
            self.with_node_mut(|node| node.classes = classes);
        }
        self.with_node_mut(|node| {
            node.attributes.insert(name, value.to_string());
            node.constraints = None;
        });
    }

    pub fn remove_attribute(&self, name: &str) {
        self.with_node_mut(|node| {
            node.attributes.remove(&name.to_ascii_lowercase());
            node.constraints = None;
        });
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.with_node(|node| node.attributes.get(&name.to_ascii_lowercase()).cloned())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.with_node(|node| node.attributes.contains_key(&name.to_ascii_lowercase()))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.with_node(|node| node.classes.iter().any(|c| c == class))
    }

    pub fn classes(&self) -> Vec<String> {
        self.with_node(|node| node.classes.clone())
    }

    pub fn text_content(&self) -> String {
        self.with_node(|node| node.text.clone())
    }

    pub fn is_disabled(&self) -> bool {
        self.has_attribute("disabled")
    }

    /// Set the current value without firing an input event
    pub fn set_value(&self, value: &str) {
        self.with_node_mut(|node| node.value = value.to_string());
    }

    /// Set the value and fire an input event, as a user edit does
    pub fn type_text(&self, value: &str) -> Result<(), ValidationError> {
        self.set_value(value);
        self.dispatch_input()
    }

    /// Run every input listener in attachment order, stopping at the first error
    pub fn dispatch_input(&self) -> Result<(), ValidationError> {
        let handlers: Vec<SharedInputHandler> = {
            let tree = self.tree.borrow();
            tree.nodes[self.id]
                .input_listeners
                .iter()
                .filter_map(|listener| tree.handlers.get(listener).cloned())
                .collect()
        };

        for handler in handlers {
            let mut handler = handler.borrow_mut();
            (&mut **handler)()?;
        }
        Ok(())
    }

    /// Fire a submit event; every submit listener cancels the default action
    pub fn dispatch_submit(&self) -> SubmitOutcome {
        SubmitOutcome {
            default_prevented: self.submit_listener_count() > 0,
        }
    }

    pub fn input_listener_count(&self) -> usize {
        self.with_node(|node| node.input_listeners.len())
    }

    pub fn submit_listener_count(&self) -> usize {
        self.with_node(|node| node.submit_listeners.len())
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<MemoryElement>, ValidationError> {
        let list = SelectorList::parse(selector)?;
        let matches: Vec<NodeId> = {
            let tree = self.tree.borrow();
            tree.descendants(self.id)
                .into_iter()
                .filter(|&id| list.selectors.iter().any(|s| tree.matches(id, s)))
                .collect()
        };
        Ok(matches.into_iter().map(|id| self.handle(id)).collect())
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<MemoryElement>, ValidationError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }
}

impl Element for MemoryElement {
    fn key(&self) -> ElementKey {
        ElementKey(self.id as u64)
    }

    fn id(&self) -> String {
        self.attribute("id").unwrap_or_default()
    }

    fn add_class(&self, class: &str) {
        self.with_node_mut(|node| {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
            node.attributes
                .insert("class".to_string(), node.classes.join(" "));
        });
    }

    fn remove_class(&self, class: &str) {
        self.with_node_mut(|node| {
            node.classes.retain(|c| c != class);
            node.attributes
                .insert("class".to_string(), node.classes.join(" "));
        });
    }

    fn set_text_content(&self, text: &str) {
        self.with_node_mut(|node| node.text = text.to_string());
    }
}

impl FieldElement for MemoryElement {
    fn value(&self) -> String {
        self.with_node(|node| node.value.clone())
    }

    fn data_attribute(&self, name: &str) -> Option<String> {
        self.attribute(&format!("data-{}", name))
    }

    fn native_validity(&self) -> NativeValidity {
        self.with_node_mut(|node| {
            node.constraints
                .get_or_insert_with(|| Constraints::from_attributes(&node.attributes))
                .evaluate(&node.value)
        })
    }

    fn listen_input(&self, handler: InputHandler) -> Result<Listener, ValidationError> {
        let listener = {
            let mut tree = self.tree.borrow_mut();
            let listener = tree.next_listener_id();
            tree.handlers.insert(listener, Rc::new(RefCell::new(handler)));
            tree.nodes[self.id].input_listeners.push(listener);
            listener
        };

        let tree: Weak<RefCell<Tree>> = Rc::downgrade(&self.tree);
        let node = self.id;
        Ok(Listener::new(move || {
            if let Some(tree) = tree.upgrade() {
                let mut tree = tree.borrow_mut();
                tree.nodes[node].input_listeners.retain(|&l| l != listener);
                tree.handlers.remove(&listener);
            }
        }))
    }
}

impl ButtonElement for MemoryElement {
    fn set_disabled(&self, disabled: bool) {
        if disabled {
            self.set_attribute("disabled", "");
        } else {
            self.remove_attribute("disabled");
        }
    }
}

impl FormElement for MemoryElement {
    type Field = MemoryElement;
    type Button = MemoryElement;
    type Node = MemoryElement;

    fn query_fields(&self, selector: &str) -> Result<Vec<Self::Field>, ValidationError> {
        self.query_selector_all(selector)
    }

    fn query_button(&self, selector: &str) -> Result<Option<Self::Button>, ValidationError> {
        self.query_selector(selector)
    }

    fn query_node(&self, selector: &str) -> Result<Option<Self::Node>, ValidationError> {
        self.query_selector(selector)
    }

    fn suppress_submit(&self) -> Result<Listener, ValidationError> {
        let listener = {
            let mut tree = self.tree.borrow_mut();
            let listener = tree.next_listener_id();
            tree.nodes[self.id].submit_listeners.push(listener);
            listener
        };

        let tree: Weak<RefCell<Tree>> = Rc::downgrade(&self.tree);
        let node = self.id;
        Ok(Listener::new(move || {
            if let Some(tree) = tree.upgrade() {
                tree.borrow_mut().nodes[node]
                    .submit_listeners
                    .retain(|&l| l != listener);
            }
        }))
    }
}

impl Document for MemoryDocument {
    type Form = MemoryElement;

    fn query_forms(&self, selector: &str) -> Result<Vec<Self::Form>, ValidationError> {
        self.query_selector_all(selector)
    }
}
