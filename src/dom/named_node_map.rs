// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `NamedNodeMap`: the per-element attribute container, an ordered list of
//! Attr nodes with a name-keyed index.

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::dom::namespace::NamespaceId;
use crate::dom::{Handle, NodeData, WeakHandle};
use crate::error::{DomErrorKind, DomException};

/// How an attribute value was delimited in the source, captured at parse
/// time and reused when serializing.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AttrQuote {
    /// Unquoted, or never serialized.
    None,
    /// Single quotes (`'`).
    Single,
    /// Double quotes (`"`).
    #[default]
    Double,
}

/// Ordered, name-indexed storage for the Attr nodes of one element.
///
/// Iteration order is insertion order. Lookup keys are lowercased when the
/// owner element is HTML-native; foreign elements preserve case.
pub struct NamedNodeMap {
    owner: Cell<Option<WeakHandle>>,
    list: RefCell<Vec<Handle>>,
    index: RefCell<HashMap<String, usize>>,
}

impl std::fmt::Debug for NamedNodeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedNodeMap")
            .field("list", &self.list)
            .field("index", &self.index)
            .finish()
    }
}

impl NamedNodeMap {
    pub fn new() -> NamedNodeMap {
        NamedNodeMap {
            owner: Cell::new(None),
            list: RefCell::new(Vec::new()),
            index: RefCell::new(HashMap::new()),
        }
    }

    /// The element that owns this map.
    pub fn owner_element(&self) -> Option<Handle> {
        let w = self.owner.take();
        let up = w.as_ref().and_then(|w| w.upgrade());
        self.owner.set(w);
        up
    }

    pub(crate) fn set_owner(&self, elem: &Handle) {
        self.owner.set(Some(Rc::downgrade(elem)));
    }

    fn owner_is_html_native(&self) -> bool {
        self.owner_element()
            .and_then(|e| match e.data {
                NodeData::Element(ref el) => Some(el.ns == NamespaceId::HTML),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Normalize a lookup key for the owner element.
    fn key(&self, qualified_name: &str) -> String {
        if self.owner_is_html_native() {
            qualified_name.to_ascii_lowercase()
        } else {
            qualified_name.to_owned()
        }
    }

    fn attr_key(attr: &Handle) -> String {
        match attr.data {
            NodeData::Attr(ref a) => a.qualified_name(),
            _ => panic!("not an attribute node"),
        }
    }

    pub fn len(&self) -> usize {
        self.list.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.borrow().is_empty()
    }

    /// The attributes in insertion order.
    pub fn list(&self) -> Ref<'_, Vec<Handle>> {
        self.list.borrow()
    }

    pub fn item(&self, index: usize) -> Option<Handle> {
        self.list.borrow().get(index).cloned()
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.index.borrow().contains_key(&self.key(qualified_name))
    }

    /// O(1) average lookup by qualified name.
    pub fn get(&self, qualified_name: &str) -> Option<Handle> {
        let key = self.key(qualified_name);
        let index = self.index.borrow();
        index.get(&key).map(|&i| self.list.borrow()[i].clone())
    }

    /// The neighbours of an attribute in map order.
    pub fn neighbors(&self, attr: &Handle) -> (Option<Handle>, Option<Handle>) {
        let list = self.list.borrow();
        match list.iter().position(|a| Rc::ptr_eq(a, attr)) {
            Some(i) => {
                let prev = i.checked_sub(1).and_then(|p| list.get(p)).cloned();
                let next = list.get(i + 1).cloned();
                (prev, next)
            },
            None => (None, None),
        }
    }

    /// Insert or replace by qualified name. Replacement preserves the
    /// position of the replaced attribute; the replaced Attr is returned,
    /// detached.
    pub fn set(&self, attr: Handle) -> Result<Option<Handle>, DomException> {
        let (owner, key) = {
            let a = match attr.data {
                NodeData::Attr(ref a) => a,
                _ => {
                    return Err(DomException::new(
                        DomErrorKind::HierarchyRequestError,
                        "only Attr nodes can be stored in a NamedNodeMap",
                    ))
                },
            };
            (a.owner_element(), self.key(&a.qualified_name()))
        };

        if let Some(current_owner) = owner {
            match self.owner_element() {
                Some(me) if Rc::ptr_eq(&current_owner, &me) => (),
                _ => {
                    return Err(DomException::new(
                        DomErrorKind::InUseAttributeError,
                        "attribute is already in use by another element",
                    ))
                },
            }
        }

        if let Some(elem) = self.owner_element() {
            if let NodeData::Attr(ref a) = attr.data {
                a.set_owner(Some(&elem));
            }
        }

        let existing = self.index.borrow().get(&key).copied();
        match existing {
            Some(i) => {
                let old = std::mem::replace(&mut self.list.borrow_mut()[i], attr);
                if let NodeData::Attr(ref a) = old.data {
                    a.set_owner(None);
                }
                Ok(Some(old))
            },
            None => {
                let mut list = self.list.borrow_mut();
                list.push(attr);
                self.index.borrow_mut().insert(key, list.len() - 1);
                Ok(None)
            },
        }
    }

    fn detach_at(&self, i: usize) -> Handle {
        let removed = self.list.borrow_mut().remove(i);
        if let NodeData::Attr(ref a) = removed.data {
            a.set_owner(None);
        }
        self.rebuild_index();
        removed
    }

    /// Remove by qualified name, returning ownership of the Attr.
    pub fn remove_named(&self, qualified_name: &str) -> Result<Handle, DomException> {
        let key = self.key(qualified_name);
        let i = self.index.borrow().get(&key).copied();
        match i {
            Some(i) => Ok(self.detach_at(i)),
            None => Err(DomException::new(
                DomErrorKind::NotFoundError,
                format!("no attribute named '{qualified_name}'"),
            )),
        }
    }

    /// Remove by position, returning ownership of the Attr.
    pub fn remove_item(&self, index: usize) -> Result<Handle, DomException> {
        if index >= self.list.borrow().len() {
            return Err(DomException::new(
                DomErrorKind::IndexSizeError,
                format!("attribute index {index} out of range"),
            ));
        }
        Ok(self.detach_at(index))
    }

    /// Remove a specific Attr node, returning ownership of it.
    pub fn remove_node(&self, attr: &Handle) -> Result<Handle, DomException> {
        let i = self.list.borrow().iter().position(|a| Rc::ptr_eq(a, attr));
        match i {
            Some(i) => Ok(self.detach_at(i)),
            None => Err(DomException::new(
                DomErrorKind::NotFoundError,
                "attribute not in this map",
            )),
        }
    }

    fn rebuild_index(&self) {
        let mut index = self.index.borrow_mut();
        index.clear();
        for (i, attr) in self.list.borrow().iter().enumerate() {
            index.insert(self.key(&Self::attr_key(attr)), i);
        }
    }

    /// Swap the contents of the maps of two elements, re-parenting every
    /// Attr to its new owner and restamping owner documents.
    pub fn swap(a_elem: &Handle, b_elem: &Handle) {
        let (a_map, b_map) = match (&a_elem.data, &b_elem.data) {
            (NodeData::Element(a), NodeData::Element(b)) => (&a.attrs, &b.attrs),
            _ => panic!("swap requires two elements"),
        };

        a_map.list.swap(&b_map.list);
        a_map.index.swap(&b_map.index);

        for (map, elem) in [(a_map, a_elem), (b_map, b_elem)] {
            let doc = crate::dom::owner_document_of(elem);
            for attr in map.list.borrow().iter() {
                if let NodeData::Attr(ref a) = attr.data {
                    a.set_owner(Some(elem));
                }
                crate::dom::set_owner_document(attr, doc.as_ref());
            }
            map.rebuild_index();
        }
    }
}

impl Default for NamedNodeMap {
    fn default() -> Self {
        NamedNodeMap::new()
    }
}
