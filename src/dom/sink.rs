// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `Dot`, the Document Object Tree: the concrete tree the parser produces,
//! wired to the tree builder through the `TreeSink` trait.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use tendril::StrTendril;

use crate::data::models::attr_legal_on;
use crate::data::tags::ElementType;
use crate::data::AttributeType;
use crate::dom::named_node_map::NamedNodeMap;
use crate::dom::namespace::{Namespace, NamespaceMap};
use crate::dom::{
    append_unchecked, get_parent_and_index, insert_at_unchecked, new_node, owner_document_of,
    remove_from_parent, set_owner_document, Attr, Element, ElementKind, Handle, NodeData,
};
use crate::error::{DotConfig, ErrorCode, ErrorLog, ParseError, Position};
use crate::tokenizer::Attribute;
use crate::tree_builder::{
    AppendNode, AppendText, ElemName, NodeOrText, QuirksMode, TreeSink,
};

/// The Document Object Tree; the result of parsing.
pub struct Dot {
    /// The `Document` itself.
    document: Handle,

    /// Errors that occurred during parsing.
    errors: ErrorLog,

    /// The document's quirks mode.
    quirks_mode: Cell<QuirksMode>,

    /// Parser configuration.
    config: DotConfig,

    /// Position the tree builder is currently processing, for error
    /// attribution.
    current_pos: Cell<Position>,
}

impl Default for Dot {
    fn default() -> Dot {
        Dot::new(DotConfig::default())
    }
}

impl Dot {
    pub fn new(config: DotConfig) -> Dot {
        let level = config.attr_compliance.max(config.hierarchy_compliance);
        Dot {
            document: crate::dom::new_document(config),
            errors: ErrorLog::new(level),
            quirks_mode: Cell::new(QuirksMode::NoQuirks),
            config,
            current_pos: Cell::new(Position::START),
        }
    }

    /// The document node.
    pub fn document(&self) -> &Handle {
        &self.document
    }

    pub fn config(&self) -> DotConfig {
        self.config
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode.get()
    }

    /// The recorded parse errors, in source order.
    pub fn errors(&self) -> Ref<'_, Vec<ParseError>> {
        self.errors.errors()
    }

    /// Take the recorded parse errors, leaving the log empty.
    pub fn take_errors(&self) -> Vec<ParseError> {
        self.errors.take()
    }

    fn report(&self, code: ErrorCode) {
        self.errors.report(code, self.current_pos.get());
    }

    /// Resolve a tag name per the insertion context and build the element
    /// node, with its attribute map.
    fn build_element(&self, ns: Namespace, name: StrTendril, attrs: Vec<Attribute>) -> Handle {
        let id = match ns {
            Namespace::Html => ElementType::from_html_name(&name),
            Namespace::Svg => ElementType::from_svg_name(&name),
            Namespace::MathML => ElementType::from_mathml_name(&name),
            _ => None,
        }
        .unwrap_or(ElementType::Other);

        if id == ElementType::Other {
            self.report(ErrorCode::UnknownElement);
        }

        let kind = match (ns, id) {
            (Namespace::Html, ElementType::Script) => ElementKind::Script {
                already_started: Cell::new(false),
            },
            (Namespace::Html, ElementType::Template) => {
                let contents = new_node(NodeData::Fragment);
                set_owner_document(&contents, Some(&self.document));
                ElementKind::Template { contents }
            },
            (Namespace::MathML, ElementType::AnnotationXml) => {
                let text_integration_point = attrs.iter().any(|attr| {
                    &*attr.name == "encoding"
                        && (attr.value.eq_ignore_ascii_case("text/html")
                            || attr.value.eq_ignore_ascii_case("application/xhtml+xml"))
                });
                ElementKind::AnnotationXml {
                    text_integration_point,
                }
            },
            _ => ElementKind::Normal,
        };

        let ns_id = NamespaceMap::shared().intern(ns);
        let elem = new_node(NodeData::Element(Element {
            ns: ns_id,
            id,
            prefix: None,
            local: name,
            attrs: NamedNodeMap::new(),
            kind,
        }));
        set_owner_document(&elem, Some(&self.document));

        let html_native = ns == Namespace::Html;
        for attr in attrs {
            self.add_attribute(&elem, attr, html_native, id);
        }

        elem
    }

    fn add_attribute(
        &self,
        elem: &Handle,
        attr: Attribute,
        html_native: bool,
        elem_id: ElementType,
    ) {
        let el = elem.as_element().expect("attribute on a non-element");

        // The tokenizer has already dropped duplicates; keep the first
        // occurrence if one sneaks through (add_attrs_if_missing).
        if el.attrs.contains(&attr.name) {
            return;
        }

        // Strict attribute compliance rejects only through the external
        // mutation API; during parsing the violations are recorded and the
        // tree is built the same at every level.
        if html_native && attr.ns == Namespace::None {
            let attr_type = AttributeType::from_name(&attr.name);
            if attr_type == AttributeType::Other {
                self.report(ErrorCode::UnknownAttribute);
            } else if !attr_legal_on(attr_type, elem_id) {
                self.report(ErrorCode::AttributeNotLegalOnElement);
            }
        }

        let node = new_node(NodeData::Attr(Attr::new(
            attr.prefix,
            NamespaceMap::shared().intern(attr.ns),
            attr.name,
            attr.value,
            attr.has_value,
            attr.quote,
        )));
        set_owner_document(&node, Some(&self.document));
        el.attrs.set(node).expect("fresh attribute node is owned");
    }

    fn append_to_existing_text(prev: &Handle, text: &str) -> bool {
        match prev.data {
            NodeData::Text { ref contents } => {
                contents.borrow_mut().push_slice(text);
                true
            },
            _ => false,
        }
    }

    fn new_text(&self, text: StrTendril) -> Handle {
        let node = new_node(NodeData::Text {
            contents: RefCell::new(text),
        });
        set_owner_document(&node, Some(&self.document));
        node
    }
}

impl TreeSink for Dot {
    type Handle = Handle;

    fn parse_error(&self, code: ErrorCode) {
        self.report(code);
    }

    fn set_current_position(&self, pos: Position) {
        self.current_pos.set(pos);
    }

    fn get_document(&self) -> Handle {
        self.document.clone()
    }

    fn get_template_contents(&self, target: &Handle) -> Handle {
        target
            .as_element()
            .and_then(|el| el.template_contents())
            .expect("not a template element")
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.quirks_mode.set(mode);
    }

    fn same_node(&self, x: &Handle, y: &Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn elem_name(&self, target: &Handle) -> ElemName {
        let el = target.as_element().expect("not an element");
        ElemName::new(el.namespace(), el.id)
    }

    fn elem_local_name(&self, target: &Handle) -> StrTendril {
        let el = target.as_element().expect("not an element");
        el.local.clone()
    }

    fn create_element(
        &self,
        ns: Namespace,
        name: StrTendril,
        attrs: Vec<Attribute>,
    ) -> Handle {
        self.build_element(ns, name, attrs)
    }

    fn create_comment(&self, text: StrTendril) -> Handle {
        let node = new_node(NodeData::Comment { contents: text });
        set_owner_document(&node, Some(&self.document));
        node
    }

    fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
        // Append to an existing Text node if we have one.
        if let AppendText(ref text) = child {
            if let Some(last) = parent.last_child() {
                if Self::append_to_existing_text(&last, text) {
                    return;
                }
            }
        }

        let node = match child {
            AppendText(text) => self.new_text(text),
            AppendNode(node) => node,
        };
        append_unchecked(parent, node);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Handle,
        prev_element: &Handle,
        child: NodeOrText<Handle>,
    ) {
        // Foster parenting: insert immediately before the table if it has a
        // parent, else append to the previous open element.
        match get_parent_and_index(element) {
            Some((parent, i)) => {
                if let AppendText(ref text) = child {
                    if i > 0 {
                        let prev = parent.children()[i - 1].clone();
                        if Self::append_to_existing_text(&prev, text) {
                            return;
                        }
                    }
                }
                let node = match child {
                    AppendText(text) => self.new_text(text),
                    AppendNode(node) => node,
                };
                insert_at_unchecked(&parent, i, node);
            },
            None => self.append(prev_element, child),
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let node = new_node(NodeData::Doctype {
            name,
            public_id,
            system_id,
        });
        append_unchecked(&self.document, node);
    }

    fn add_attrs_if_missing(&self, target: &Handle, attrs: Vec<Attribute>) {
        let el = target.as_element().expect("not an element");
        let html_native = el.is_html_native();
        let id = el.id;
        for attr in attrs {
            self.add_attribute(target, attr, html_native, id);
        }
    }

    fn remove_from_parent(&self, target: &Handle) {
        remove_from_parent(target);
    }

    fn reparent_children(&self, node: &Handle, new_parent: &Handle) {
        let mut children = node.children.borrow_mut();
        let mut new_children = new_parent.children.borrow_mut();
        let doc = owner_document_of(new_parent);
        for child in children.iter() {
            child.parent.set(Some(Rc::downgrade(new_parent)));
            set_owner_document(child, doc.as_ref());
        }
        new_children.extend(std::mem::take(&mut *children));
    }

    fn mark_script_already_started(&self, target: &Handle) {
        if let NodeData::Element(Element {
            kind:
                ElementKind::Script {
                    ref already_started,
                },
            ..
        }) = target.data
        {
            already_started.set(true);
        }
    }

    fn is_mathml_annotation_xml_integration_point(&self, handle: &Handle) -> bool {
        matches!(
            handle.data,
            NodeData::Element(Element {
                kind: ElementKind::AnnotationXml {
                    text_integration_point: true,
                },
                ..
            })
        )
    }
}
