// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The Document Object Tree node model.
//!
//! Parents own their children outright (`Rc` handles in a child vector);
//! parent, sibling and owner-document links are observers. Sibling links are
//! derived from the parent's child order rather than stored.

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

use tendril::StrTendril;

use crate::data::models::{attr_legal_on, is_valid_child};
use crate::data::tags::ElementType;
use crate::data::AttributeType;
use crate::dom::named_node_map::{AttrQuote, NamedNodeMap};
use crate::dom::namespace::{Namespace, NamespaceId, NamespaceMap};
use crate::error::{ComplianceLevel, DomErrorKind, DomException, DotConfig};

pub mod named_node_map;
pub mod namespace;
pub mod sink;
pub mod validator;

/// Reference to a DOM node.
pub type Handle = Rc<Node>;

/// Weak reference to a DOM node, used for parent and owner pointers.
pub type WeakHandle = Weak<Node>;

/// The specialised element kinds that carry extra parsing state.
#[derive(Debug)]
pub enum ElementKind {
    Normal,
    /// A script element and its "already started" flag.
    Script { already_started: Cell<bool> },
    /// A template element and its contents fragment.
    Template { contents: Handle },
    /// An annotation-xml element whose `encoding` attribute makes it an
    /// HTML integration point.
    AnnotationXml { text_integration_point: bool },
}

/// An element: namespace id, resolved type, name, and attributes.
#[derive(Debug)]
pub struct Element {
    pub ns: NamespaceId,
    pub id: ElementType,
    pub prefix: Option<StrTendril>,
    pub local: StrTendril,
    pub attrs: NamedNodeMap,
    pub kind: ElementKind,
}

impl Element {
    pub fn is_html_native(&self) -> bool {
        self.ns == NamespaceId::HTML
    }

    pub fn namespace(&self) -> Namespace {
        NamespaceMap::shared().namespace(self.ns)
    }

    /// The qualified name, `prefix:local` or just the local name.
    pub fn qualified_name(&self) -> String {
        match self.prefix {
            Some(ref p) => format!("{p}:{}", self.local),
            None => self.local.to_string(),
        }
    }

    pub fn template_contents(&self) -> Option<Handle> {
        match self.kind {
            ElementKind::Template { ref contents } => Some(contents.clone()),
            _ => None,
        }
    }
}

/// An attribute node. Owned by the `NamedNodeMap` of its element; never a
/// tree child.
pub struct Attr {
    pub prefix: Option<StrTendril>,
    pub ns: NamespaceId,
    pub local: StrTendril,
    value: RefCell<StrTendril>,
    has_value: Cell<bool>,
    quote: Cell<AttrQuote>,
    owner: Cell<Option<WeakHandle>>,
}

impl std::fmt::Debug for Attr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attr")
            .field("prefix", &self.prefix)
            .field("ns", &self.ns)
            .field("local", &self.local)
            .field("value", &self.value)
            .field("has_value", &self.has_value)
            .field("quote", &self.quote)
            .finish()
    }
}

impl Attr {
    pub fn new(
        prefix: Option<StrTendril>,
        ns: NamespaceId,
        local: StrTendril,
        value: StrTendril,
        has_value: bool,
        quote: AttrQuote,
    ) -> Attr {
        Attr {
            prefix,
            ns,
            local,
            value: RefCell::new(value),
            has_value: Cell::new(has_value),
            quote: Cell::new(quote),
            owner: Cell::new(None),
        }
    }

    pub fn qualified_name(&self) -> String {
        match self.prefix {
            Some(ref p) => format!("{p}:{}", self.local),
            None => self.local.to_string(),
        }
    }

    /// The value. Attributes written without a value hold the empty string
    /// with [`Attr::has_value`] false; equality distinguishes the two.
    pub fn value(&self) -> StrTendril {
        self.value.borrow().clone()
    }

    pub fn set_value(&self, value: StrTendril) {
        self.has_value.set(true);
        *self.value.borrow_mut() = value;
    }

    pub fn has_value(&self) -> bool {
        self.has_value.get()
    }

    pub fn quote(&self) -> AttrQuote {
        self.quote.get()
    }

    pub fn set_quote(&self, quote: AttrQuote) {
        self.quote.set(quote);
    }

    pub fn owner_element(&self) -> Option<Handle> {
        let w = self.owner.take();
        let up = w.as_ref().and_then(|w| w.upgrade());
        self.owner.set(w);
        up
    }

    pub(crate) fn set_owner(&self, elem: Option<&Handle>) {
        self.owner.set(elem.map(Rc::downgrade));
    }
}

/// The different kinds of nodes in the tree.
#[derive(Debug)]
pub enum NodeData {
    /// The `Document` itself, carrying the parser configuration that
    /// mutation checks consult.
    Document { config: Cell<DotConfig> },

    /// A detached subtree root, e.g. template contents.
    Fragment,

    /// A `DOCTYPE` with name, public id, and system id.
    Doctype {
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    },

    /// A text node.
    Text { contents: RefCell<StrTendril> },

    /// A CDATA section. Never produced by the HTML parser; available to
    /// DOM callers.
    Cdata { contents: RefCell<StrTendril> },

    /// A comment.
    Comment { contents: StrTendril },

    /// An element.
    Element(Element),

    /// An attribute node, owned by an element's map.
    Attr(Attr),
}

/// A DOM node.
pub struct Node {
    /// Represents this node's data.
    pub data: NodeData,
    /// Parent node (observer).
    parent: Cell<Option<WeakHandle>>,
    /// Child nodes of this node (owned).
    children: RefCell<Vec<Handle>>,
    /// Owner document (observer).
    owner_doc: Cell<Option<WeakHandle>>,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("data", &self.data)
            .field("children", &self.children)
            .finish()
    }
}

pub fn new_node(data: NodeData) -> Handle {
    let node = Rc::new(Node {
        data,
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        owner_doc: Cell::new(None),
    });
    if let NodeData::Element(ref el) = node.data {
        el.attrs.set_owner(&node);
    }
    node
}

/// Create a new document node with the given configuration.
pub fn new_document(config: DotConfig) -> Handle {
    new_node(NodeData::Document {
        config: Cell::new(config),
    })
}

pub(crate) fn owner_document_of(node: &Handle) -> Option<Handle> {
    if node.is_document() {
        return Some(node.clone());
    }
    let w = node.owner_doc.take();
    let up = w.as_ref().and_then(|w| w.upgrade());
    node.owner_doc.set(w);
    up
}

pub(crate) fn set_owner_document(node: &Handle, doc: Option<&Handle>) {
    node.owner_doc.set(doc.map(Rc::downgrade));
}

/// Restamp `owner_doc` across a subtree, attributes and template contents
/// included.
fn restamp_owner_document(node: &Handle, doc: Option<&Handle>) {
    if !node.is_document() {
        set_owner_document(node, doc);
    }
    if let NodeData::Element(ref el) = node.data {
        for attr in el.attrs.list().iter() {
            set_owner_document(attr, doc);
        }
        if let Some(contents) = el.template_contents() {
            restamp_owner_document(&contents, doc);
        }
    }
    for child in node.children.borrow().iter() {
        restamp_owner_document(child, doc);
    }
}

fn get_parent_and_index(target: &Handle) -> Option<(Handle, usize)> {
    let weak = target.parent.take()?;
    let parent = weak.upgrade().expect("dangling parent pointer");
    target.parent.set(Some(weak));
    let i = parent
        .children
        .borrow()
        .iter()
        .position(|child| Rc::ptr_eq(child, target))
        .expect("have parent but couldn't find in parent's children");
    Some((parent, i))
}

/// Detach a node from its parent, if any.
pub fn remove_from_parent(target: &Handle) {
    if let Some((parent, i)) = get_parent_and_index(target) {
        parent.children.borrow_mut().remove(i);
        target.parent.set(None);
    }
}

/// Append without hierarchy validation. The tree constructor inserts through
/// this path; it maintains the invariants itself.
pub(crate) fn append_unchecked(parent: &Handle, child: Handle) {
    remove_from_parent(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    restamp_owner_document(&child, owner_document_of(parent).as_ref());
    parent.children.borrow_mut().push(child);
}

/// Insert before the i-th child without hierarchy validation.
pub(crate) fn insert_at_unchecked(parent: &Handle, i: usize, child: Handle) {
    remove_from_parent(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    restamp_owner_document(&child, owner_document_of(parent).as_ref());
    parent.children.borrow_mut().insert(i, child);
}

impl Node {
    pub fn is_document(&self) -> bool {
        matches!(self.data, NodeData::Document { .. })
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self.data, NodeData::Fragment)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self.data {
            NodeData::Element(ref el) => Some(el),
            _ => None,
        }
    }

    pub fn as_attr(&self) -> Option<&Attr> {
        match self.data {
            NodeData::Attr(ref a) => Some(a),
            _ => None,
        }
    }

    /// The parser configuration, for documents; `None` otherwise.
    pub fn config(&self) -> Option<DotConfig> {
        match self.data {
            NodeData::Document { ref config } => Some(config.get()),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Handle> {
        let w = self.parent.take();
        let up = w.as_ref().and_then(|w| w.upgrade());
        self.parent.set(w);
        up
    }

    pub fn children(&self) -> Ref<'_, Vec<Handle>> {
        self.children.borrow()
    }

    pub fn first_child(&self) -> Option<Handle> {
        self.children.borrow().first().cloned()
    }

    pub fn last_child(&self) -> Option<Handle> {
        self.children.borrow().last().cloned()
    }
}

impl Node {
    /// The owner document, or the node itself for documents.
    pub fn owner_document(self: &Rc<Self>) -> Option<Handle> {
        owner_document_of(self)
    }

    fn effective_config(self: &Rc<Self>) -> DotConfig {
        self.config()
            .or_else(|| owner_document_of(self).and_then(|d| d.config()))
            .unwrap_or_default()
    }

    /// Previous sibling, derived from the parent's child list.
    pub fn prev_sibling(self: &Rc<Self>) -> Option<Handle> {
        let (parent, i) = get_parent_and_index(self)?;
        let prev = i.checked_sub(1).and_then(|p| parent.children.borrow().get(p).cloned());
        prev
    }

    /// Next sibling, derived from the parent's child list.
    pub fn next_sibling(self: &Rc<Self>) -> Option<Handle> {
        let (parent, i) = get_parent_and_index(self)?;
        let next = parent.children.borrow().get(i + 1).cloned();
        next
    }

    pub fn index_in_parent(self: &Rc<Self>) -> Option<usize> {
        get_parent_and_index(self).map(|(_, i)| i)
    }

    /// Concatenated data of descendant Text and CDATA nodes, in document
    /// order.
    pub fn text_content(self: &Rc<Self>) -> StrTendril {
        fn walk(node: &Handle, out: &mut StrTendril) {
            match node.data {
                NodeData::Text { ref contents } | NodeData::Cdata { ref contents } => {
                    out.push_tendril(&contents.borrow());
                },
                _ => {
                    for child in node.children.borrow().iter() {
                        walk(child, out);
                    }
                },
            }
        }
        let mut out = StrTendril::new();
        walk(self, &mut out);
        out
    }

    fn is_inclusive_ancestor_of(self: &Rc<Self>, other: &Handle) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(node) = cursor {
            if Rc::ptr_eq(self, &node) {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    fn ensure_pre_insertion_validity(
        self: &Rc<Self>,
        node: &Handle,
        reference: Option<&Handle>,
    ) -> Result<(), DomException> {
        if !matches!(
            self.data,
            NodeData::Document { .. } | NodeData::Fragment | NodeData::Element(_)
        ) {
            return Err(DomException::new(
                DomErrorKind::HierarchyRequestError,
                "parent cannot hold children",
            ));
        }
        if node.is_inclusive_ancestor_of(self) {
            return Err(DomException::new(
                DomErrorKind::HierarchyRequestError,
                "insertion would create a cycle",
            ));
        }
        if let Some(reference) = reference {
            let is_child = self
                .children
                .borrow()
                .iter()
                .any(|c| Rc::ptr_eq(c, reference));
            if !is_child {
                return Err(DomException::new(
                    DomErrorKind::NotFoundError,
                    "reference node is not a child of this node",
                ));
            }
        }
        match node.data {
            NodeData::Document { .. } => {
                return Err(DomException::new(
                    DomErrorKind::HierarchyRequestError,
                    "a document cannot be inserted",
                ));
            },
            NodeData::Attr(_) => {
                return Err(DomException::new(
                    DomErrorKind::HierarchyRequestError,
                    "attributes live in a NamedNodeMap, not the tree",
                ));
            },
            NodeData::Doctype { .. } if !self.is_document() => {
                return Err(DomException::new(
                    DomErrorKind::HierarchyRequestError,
                    "a doctype must be a child of the document",
                ));
            },
            NodeData::Text { .. } | NodeData::Cdata { .. } if self.is_document() => {
                return Err(DomException::new(
                    DomErrorKind::HierarchyRequestError,
                    "text cannot be a child of the document",
                ));
            },
            NodeData::Element(_) if self.is_document() => {
                let has_element_child =
                    self.children.borrow().iter().any(|c| c.is_element());
                if has_element_child {
                    return Err(DomException::new(
                        DomErrorKind::HierarchyRequestError,
                        "the document already has a document element",
                    ));
                }
            },
            NodeData::Doctype { .. } if self.is_document() => {
                let children = self.children.borrow();
                let has_doctype = children
                    .iter()
                    .any(|c| matches!(c.data, NodeData::Doctype { .. }));
                if has_doctype {
                    return Err(DomException::new(
                        DomErrorKind::HierarchyRequestError,
                        "the document already has a doctype",
                    ));
                }
            },
            _ => (),
        }

        // Cross-document moves are explicit adoptions.
        if let (Some(node_doc), Some(my_doc)) =
            (owner_document_of(node), owner_document_of(self))
        {
            if !node.is_document() && !Rc::ptr_eq(&node_doc, &my_doc) {
                return Err(DomException::new(
                    DomErrorKind::WrongDocumentError,
                    "node belongs to another document; adopt it first",
                ));
            }
        }

        // Content-model nesting becomes a hard failure only under strict
        // hierarchy compliance.
        if self.effective_config().hierarchy_compliance == ComplianceLevel::Strict {
            if let (NodeData::Element(ref p), NodeData::Element(ref c)) = (&self.data, &node.data)
            {
                if p.is_html_native() && c.is_html_native() && !is_valid_child(p.id, c.id) {
                    return Err(DomException::new(
                        DomErrorKind::HierarchyRequestError,
                        format!(
                            "<{}> is not a valid child of <{}>",
                            c.qualified_name(),
                            p.qualified_name()
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Append a child, transferring ownership. Rejects insertions that would
    /// create a cycle or violate hierarchy rules.
    pub fn append_child(self: &Rc<Self>, child: Handle) -> Result<Handle, DomException> {
        self.ensure_pre_insertion_validity(&child, None)?;
        append_unchecked(self, child.clone());
        Ok(child)
    }

    /// Insert `new` before `reference` (append when `reference` is `None`).
    pub fn insert_before(
        self: &Rc<Self>,
        new: Handle,
        reference: Option<&Handle>,
    ) -> Result<Handle, DomException> {
        self.ensure_pre_insertion_validity(&new, reference)?;
        match reference {
            None => append_unchecked(self, new.clone()),
            Some(reference) => {
                let i = self
                    .children
                    .borrow()
                    .iter()
                    .position(|c| Rc::ptr_eq(c, reference))
                    .expect("checked above");
                insert_at_unchecked(self, i, new.clone());
            },
        }
        Ok(new)
    }

    /// Replace `old` with `new`, returning `old`.
    pub fn replace_child(
        self: &Rc<Self>,
        new: Handle,
        old: &Handle,
    ) -> Result<Handle, DomException> {
        self.ensure_pre_insertion_validity(&new, Some(old))?;
        let i = self
            .children
            .borrow()
            .iter()
            .position(|c| Rc::ptr_eq(c, old))
            .expect("checked above");
        let removed = self.children.borrow_mut().remove(i);
        removed.parent.set(None);
        insert_at_unchecked(self, i, new);
        Ok(removed)
    }

    /// Remove a child, returning ownership of it to the caller.
    pub fn remove_child(self: &Rc<Self>, child: &Handle) -> Result<Handle, DomException> {
        let i = self
            .children
            .borrow()
            .iter()
            .position(|c| Rc::ptr_eq(c, child));
        match i {
            Some(i) => {
                let removed = self.children.borrow_mut().remove(i);
                removed.parent.set(None);
                Ok(removed)
            },
            None => Err(DomException::new(
                DomErrorKind::NotFoundError,
                "node is not a child of this node",
            )),
        }
    }

    /// Move a node (and its subtree) into this document, restamping the
    /// owner document throughout.
    pub fn adopt_node(self: &Rc<Self>, node: &Handle) -> Result<(), DomException> {
        if !self.is_document() {
            return Err(DomException::new(
                DomErrorKind::HierarchyRequestError,
                "adopt_node must be called on a document",
            ));
        }
        if node.is_document() {
            return Err(DomException::new(
                DomErrorKind::NotSupportedError,
                "documents cannot be adopted",
            ));
        }
        remove_from_parent(node);
        restamp_owner_document(node, Some(self));
        Ok(())
    }

    /// Clone this node; `deep` clones the subtree (and template contents).
    pub fn clone_node(self: &Rc<Self>, deep: bool) -> Handle {
        let data = match self.data {
            NodeData::Document { ref config } => NodeData::Document {
                config: Cell::new(config.get()),
            },
            NodeData::Fragment => NodeData::Fragment,
            NodeData::Doctype {
                ref name,
                ref public_id,
                ref system_id,
            } => NodeData::Doctype {
                name: name.clone(),
                public_id: public_id.clone(),
                system_id: system_id.clone(),
            },
            NodeData::Text { ref contents } => NodeData::Text {
                contents: RefCell::new(contents.borrow().clone()),
            },
            NodeData::Cdata { ref contents } => NodeData::Cdata {
                contents: RefCell::new(contents.borrow().clone()),
            },
            NodeData::Comment { ref contents } => NodeData::Comment {
                contents: contents.clone(),
            },
            NodeData::Attr(ref a) => NodeData::Attr(Attr::new(
                a.prefix.clone(),
                a.ns,
                a.local.clone(),
                a.value(),
                a.has_value(),
                a.quote(),
            )),
            NodeData::Element(ref el) => {
                let kind = match el.kind {
                    ElementKind::Normal => ElementKind::Normal,
                    // A cloned script has not started.
                    ElementKind::Script { .. } => ElementKind::Script {
                        already_started: Cell::new(false),
                    },
                    ElementKind::Template { ref contents } => ElementKind::Template {
                        contents: if deep {
                            contents.clone_node(true)
                        } else {
                            new_node(NodeData::Fragment)
                        },
                    },
                    ElementKind::AnnotationXml {
                        text_integration_point,
                    } => ElementKind::AnnotationXml {
                        text_integration_point,
                    },
                };
                NodeData::Element(Element {
                    ns: el.ns,
                    id: el.id,
                    prefix: el.prefix.clone(),
                    local: el.local.clone(),
                    attrs: NamedNodeMap::new(),
                    kind,
                })
            },
        };

        let clone = new_node(data);
        set_owner_document(&clone, owner_document_of(self).as_ref());

        if let (NodeData::Element(ref from), NodeData::Element(ref _to)) =
            (&self.data, &clone.data)
        {
            for attr in from.attrs.list().iter() {
                let attr_clone = attr.clone_node(false);
                if let NodeData::Element(ref to) = clone.data {
                    to.attrs.set(attr_clone).expect("fresh map accepts clones");
                }
            }
        }

        if deep {
            for child in self.children.borrow().iter() {
                let child_clone = child.clone_node(true);
                append_unchecked(&clone, child_clone);
            }
        }
        clone
    }

    /// In-order snapshot of descendant elements whose qualified name matches
    /// `name` (`"*"` matches every element). HTML-native elements match
    /// case-insensitively.
    pub fn get_elements_by_tag_name(self: &Rc<Self>, name: &str) -> Vec<Handle> {
        fn walk(node: &Handle, name: &str, out: &mut Vec<Handle>) {
            for child in node.children.borrow().iter() {
                if let NodeData::Element(ref el) = child.data {
                    let matches = name == "*"
                        || if el.is_html_native() {
                            el.qualified_name().eq_ignore_ascii_case(name)
                        } else {
                            el.qualified_name() == name
                        };
                    if matches {
                        out.push(child.clone());
                    }
                }
                walk(child, name, out);
            }
        }
        let mut out = Vec::new();
        walk(self, name, &mut out);
        out
    }

    /// Create a detached element in the HTML namespace.
    pub fn create_element(self: &Rc<Self>, name: &str) -> Result<Handle, DomException> {
        self.create_element_ns(Namespace::Html, name)
    }

    /// Create a detached element, validating the qualified name against the
    /// namespace.
    pub fn create_element_ns(
        self: &Rc<Self>,
        ns: Namespace,
        qualified_name: &str,
    ) -> Result<Handle, DomException> {
        self.require_document("create_element")?;
        let (prefix, local) = validator::validate_ns(ns, qualified_name)?;
        let ns_id = NamespaceMap::shared().intern(ns);
        let (id, local) = match ns {
            Namespace::Html => {
                let lower = local.to_ascii_lowercase();
                let id = ElementType::from_html_name(&lower).unwrap_or(ElementType::Other);
                (id, StrTendril::from_slice(&lower))
            },
            Namespace::Svg => (
                ElementType::from_svg_name(local).unwrap_or(ElementType::Other),
                StrTendril::from_slice(local),
            ),
            Namespace::MathML => (
                ElementType::from_mathml_name(local).unwrap_or(ElementType::Other),
                StrTendril::from_slice(local),
            ),
            _ => (ElementType::Other, StrTendril::from_slice(local)),
        };
        let kind = match (ns, id) {
            (Namespace::Html, ElementType::Script) => ElementKind::Script {
                already_started: Cell::new(false),
            },
            (Namespace::Html, ElementType::Template) => ElementKind::Template {
                contents: new_node(NodeData::Fragment),
            },
            _ => ElementKind::Normal,
        };
        let elem = new_node(NodeData::Element(Element {
            ns: ns_id,
            id,
            prefix: prefix.map(StrTendril::from_slice),
            local,
            attrs: NamedNodeMap::new(),
            kind,
        }));
        set_owner_document(&elem, Some(self));
        if let Some(contents) = elem.as_element().and_then(|el| el.template_contents()) {
            set_owner_document(&contents, Some(self));
        }
        Ok(elem)
    }

    /// Create a detached text node.
    pub fn create_text(self: &Rc<Self>, data: StrTendril) -> Handle {
        let node = new_node(NodeData::Text {
            contents: RefCell::new(data),
        });
        set_owner_document(&node, Some(self));
        node
    }

    /// Create a detached CDATA section.
    pub fn create_cdata(self: &Rc<Self>, data: StrTendril) -> Handle {
        let node = new_node(NodeData::Cdata {
            contents: RefCell::new(data),
        });
        set_owner_document(&node, Some(self));
        node
    }

    /// Create a detached comment.
    pub fn create_comment(self: &Rc<Self>, data: StrTendril) -> Handle {
        let node = new_node(NodeData::Comment { contents: data });
        set_owner_document(&node, Some(self));
        node
    }

    /// Create a detached attribute with no namespace.
    pub fn create_attribute(self: &Rc<Self>, name: &str) -> Result<Handle, DomException> {
        self.require_document("create_attribute")?;
        if !validator::is_name(name) {
            return Err(DomException::new(
                DomErrorKind::InvalidCharacterError,
                format!("'{name}' is not a valid attribute name"),
            ));
        }
        let attr = new_node(NodeData::Attr(Attr::new(
            None,
            NamespaceId::NONE,
            StrTendril::from_slice(name),
            StrTendril::new(),
            false,
            AttrQuote::None,
        )));
        set_owner_document(&attr, Some(self));
        Ok(attr)
    }

    /// Create a detached attribute, validating the qualified name against
    /// the namespace.
    pub fn create_attribute_ns(
        self: &Rc<Self>,
        ns: Namespace,
        qualified_name: &str,
    ) -> Result<Handle, DomException> {
        self.require_document("create_attribute_ns")?;
        let (prefix, local) = validator::validate_ns(ns, qualified_name)?;
        let attr = new_node(NodeData::Attr(Attr::new(
            prefix.map(StrTendril::from_slice),
            NamespaceMap::shared().intern(ns),
            StrTendril::from_slice(local),
            StrTendril::new(),
            false,
            AttrQuote::None,
        )));
        set_owner_document(&attr, Some(self));
        Ok(attr)
    }

    fn require_document(self: &Rc<Self>, what: &str) -> Result<(), DomException> {
        if self.is_document() {
            Ok(())
        } else {
            Err(DomException::new(
                DomErrorKind::HierarchyRequestError,
                format!("{what} must be called on a document"),
            ))
        }
    }

    /// Set an attribute on an element. The name is lowercased for
    /// HTML-native elements and validated as an XML name; under strict
    /// attribute compliance an attribute that is not legal on this element
    /// is rejected.
    pub fn set_attribute(
        self: &Rc<Self>,
        name: &str,
        value: &str,
    ) -> Result<(), DomException> {
        let el = self.as_element().ok_or_else(|| {
            DomException::new(
                DomErrorKind::HierarchyRequestError,
                "set_attribute must be called on an element",
            )
        })?;

        let name = if el.is_html_native() {
            name.to_ascii_lowercase()
        } else {
            name.to_owned()
        };
        if !validator::is_qname(&name) {
            return Err(DomException::new(
                DomErrorKind::InvalidCharacterError,
                format!("'{name}' is not a valid attribute name"),
            ));
        }

        if self.effective_config().attr_compliance == ComplianceLevel::Strict
            && el.is_html_native()
        {
            let attr_type = AttributeType::from_name(&name);
            if !attr_legal_on(attr_type, el.id) {
                return Err(DomException::new(
                    DomErrorKind::ValidationError,
                    format!("attribute '{name}' is not legal on <{}>", el.qualified_name()),
                ));
            }
        }

        if let Some(existing) = el.attrs.get(&name) {
            if let NodeData::Attr(ref a) = existing.data {
                a.set_value(StrTendril::from_slice(value));
            }
            return Ok(());
        }

        let (prefix, local) = validator::split_qname(&name);
        let attr = new_node(NodeData::Attr(Attr::new(
            prefix.map(StrTendril::from_slice),
            NamespaceId::NONE,
            StrTendril::from_slice(local),
            StrTendril::from_slice(value),
            true,
            AttrQuote::Double,
        )));
        set_owner_document(&attr, owner_document_of(self).as_ref());
        el.attrs.set(attr)?;
        Ok(())
    }

    /// The value of an attribute, if present.
    pub fn get_attribute(self: &Rc<Self>, name: &str) -> Option<StrTendril> {
        let el = self.as_element()?;
        let attr = el.attrs.get(name)?;
        attr.as_attr().map(|a| a.value())
    }
}

/// Structural equality: same kind and data, same children in order.
/// Attribute order and captured quote style are ignored; a valueless
/// attribute is distinct from a present-but-empty one.
pub fn node_eq(a: &Handle, b: &Handle) -> bool {
    fn attr_fields(h: &Handle) -> (String, StrTendril, bool) {
        match h.data {
            NodeData::Attr(ref a) => (a.qualified_name(), a.value(), a.has_value()),
            _ => unreachable!("attribute map holds only Attr nodes"),
        }
    }

    let data_eq = match (&a.data, &b.data) {
        (NodeData::Document { .. }, NodeData::Document { .. }) => true,
        (NodeData::Fragment, NodeData::Fragment) => true,
        (
            NodeData::Doctype {
                name: an,
                public_id: ap,
                system_id: asy,
            },
            NodeData::Doctype {
                name: bn,
                public_id: bp,
                system_id: bs,
            },
        ) => an == bn && ap == bp && asy == bs,
        (NodeData::Text { contents: ac }, NodeData::Text { contents: bc })
        | (NodeData::Cdata { contents: ac }, NodeData::Cdata { contents: bc }) => {
            *ac.borrow() == *bc.borrow()
        },
        (NodeData::Comment { contents: ac }, NodeData::Comment { contents: bc }) => ac == bc,
        (NodeData::Attr(aa), NodeData::Attr(ba)) => {
            aa.qualified_name() == ba.qualified_name()
                && aa.value() == ba.value()
                && aa.has_value() == ba.has_value()
        },
        (NodeData::Element(ae), NodeData::Element(be)) => {
            if ae.ns != be.ns
                || ae.id != be.id
                || ae.prefix != be.prefix
                || ae.local != be.local
                || ae.attrs.len() != be.attrs.len()
            {
                false
            } else {
                let mut a_attrs: Vec<_> = ae.attrs.list().iter().map(attr_fields).collect();
                let mut b_attrs: Vec<_> = be.attrs.list().iter().map(attr_fields).collect();
                a_attrs.sort();
                b_attrs.sort();
                a_attrs == b_attrs
            }
        },
        _ => false,
    };
    if !data_eq {
        return false;
    }

    let a_children = a.children.borrow();
    let b_children = b.children.borrow();
    a_children.len() == b_children.len()
        && a_children
            .iter()
            .zip(b_children.iter())
            .all(|(x, y)| node_eq(x, y))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::DomErrorKind;

    fn doc() -> Handle {
        new_document(DotConfig::default())
    }

    #[test]
    fn append_and_sibling_links() {
        let doc = doc();
        let html = doc.create_element("html").unwrap();
        doc.append_child(html.clone()).unwrap();
        let head = doc.create_element("head").unwrap();
        let body = doc.create_element("body").unwrap();
        html.append_child(head.clone()).unwrap();
        html.append_child(body.clone()).unwrap();

        assert!(Rc::ptr_eq(&head.next_sibling().unwrap(), &body));
        assert!(Rc::ptr_eq(&body.prev_sibling().unwrap(), &head));
        assert!(body.next_sibling().is_none());
        assert!(Rc::ptr_eq(&head.parent().unwrap(), &html));
        assert!(Rc::ptr_eq(&head.owner_document().unwrap(), &doc));
    }

    #[test]
    fn cycles_are_rejected() {
        let doc = doc();
        let a = doc.create_element("div").unwrap();
        let b = doc.create_element("div").unwrap();
        a.append_child(b.clone()).unwrap();
        let err = b.append_child(a).unwrap_err();
        assert_eq!(err.kind, DomErrorKind::HierarchyRequestError);
    }

    #[test]
    fn only_one_document_element() {
        let doc = doc();
        let first = doc.create_element("html").unwrap();
        doc.append_child(first).unwrap();
        let second = doc.create_element("html").unwrap();
        let err = doc.append_child(second).unwrap_err();
        assert_eq!(err.kind, DomErrorKind::HierarchyRequestError);
    }

    #[test]
    fn remove_returns_ownership_and_reinsertion_works() {
        let doc = doc();
        let root = doc.create_element("html").unwrap();
        doc.append_child(root.clone()).unwrap();
        let child = doc.create_element("div").unwrap();
        root.append_child(child.clone()).unwrap();

        let removed = root.remove_child(&child).unwrap();
        assert!(removed.parent().is_none());
        assert_eq!(root.children().len(), 0);

        root.append_child(removed).unwrap();
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn adopt_restamps_owner_document() {
        let doc_a = doc();
        let doc_b = doc();
        let el = doc_a.create_element("div").unwrap();
        el.append_child(doc_a.create_text(StrTendril::from_slice("x")))
            .unwrap();

        doc_b.adopt_node(&el).unwrap();
        assert!(Rc::ptr_eq(&el.owner_document().unwrap(), &doc_b));
        let text = el.first_child().unwrap();
        assert!(Rc::ptr_eq(&text.owner_document().unwrap(), &doc_b));
    }

    #[test]
    fn cross_document_insert_requires_adopt() {
        let doc_a = doc();
        let doc_b = doc();
        let root_b = doc_b.create_element("html").unwrap();
        doc_b.append_child(root_b.clone()).unwrap();
        let foreign = doc_a.create_element("div").unwrap();
        let err = root_b.append_child(foreign.clone()).unwrap_err();
        assert_eq!(err.kind, DomErrorKind::WrongDocumentError);

        doc_b.adopt_node(&foreign).unwrap();
        root_b.append_child(foreign).unwrap();
    }

    #[test]
    fn present_but_empty_differs_from_absent() {
        let doc = doc();
        let a = doc.create_element("div").unwrap();
        let b = doc.create_element("div").unwrap();
        a.set_attribute("hidden", "").unwrap();

        // `b` gets a valueless attribute through the map directly.
        let attr = doc.create_attribute("hidden").unwrap();
        b.as_element().unwrap().attrs.set(attr).unwrap();

        assert!(!node_eq(&a, &b));
    }

    #[test]
    fn clone_is_structurally_equal() {
        let doc = doc();
        let el = doc.create_element("p").unwrap();
        el.set_attribute("id", "x").unwrap();
        el.append_child(doc.create_text(StrTendril::from_slice("hello")))
            .unwrap();
        let copy = el.clone_node(true);
        assert!(node_eq(&el, &copy));
        assert!(copy.parent().is_none());
    }

    #[test]
    fn text_content_concatenates_in_order() {
        let doc = doc();
        let el = doc.create_element("p").unwrap();
        el.append_child(doc.create_text(StrTendril::from_slice("a")))
            .unwrap();
        let inner = doc.create_element("b").unwrap();
        inner
            .append_child(doc.create_cdata(StrTendril::from_slice("b")))
            .unwrap();
        el.append_child(inner).unwrap();
        el.append_child(doc.create_text(StrTendril::from_slice("c")))
            .unwrap();
        assert_eq!(&*el.text_content(), "abc");
    }

    #[test]
    fn strict_attr_compliance_rejects_illegal_attributes() {
        let config = DotConfig {
            attr_compliance: ComplianceLevel::Strict,
            ..DotConfig::default()
        };
        let doc = new_document(config);
        let el = doc.create_element("div").unwrap();
        doc.append_child(doc.create_element("html").unwrap()).unwrap();

        let err = el.set_attribute("colspan", "2").unwrap_err();
        assert_eq!(err.kind, DomErrorKind::ValidationError);
        el.set_attribute("class", "x").unwrap();
    }

    #[test]
    fn strict_hierarchy_compliance_rejects_bad_nesting() {
        let config = DotConfig {
            hierarchy_compliance: ComplianceLevel::Strict,
            ..DotConfig::default()
        };
        let doc = new_document(config);
        let tr = doc.create_element("tr").unwrap();
        let div = doc.create_element("div").unwrap();
        let err = tr.append_child(div).unwrap_err();
        assert_eq!(err.kind, DomErrorKind::HierarchyRequestError);

        let td = doc.create_element("td").unwrap();
        tr.append_child(td).unwrap();
    }
}
