// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Namespace interning.
//!
//! Every element and attribute refers to its namespace by a compact
//! [`NamespaceId`] issued by a [`NamespaceMap`]. One process-wide map is
//! shared between documents so concurrent parsers intern into the same
//! table; an id never changes its URI once issued.

use std::fmt;
use std::sync::{LazyLock, Mutex};

/// The standard namespaces, plus `Other` for interned non-standard URIs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Namespace {
    None,
    Html,
    MathML,
    Svg,
    XLink,
    Xml,
    Xmlns,
    Other,
}

impl Namespace {
    /// The namespace URI, empty for [`Namespace::None`].
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::None | Namespace::Other => "",
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::MathML => "http://www.w3.org/1998/Math/MathML",
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::XLink => "http://www.w3.org/1999/xlink",
            Namespace::Xml => "http://www.w3.org/XML/1998/namespace",
            Namespace::Xmlns => "http://www.w3.org/2000/xmlns/",
        }
    }

    /// The conventional prefix, empty where none exists.
    pub fn default_prefix(self) -> &'static str {
        match self {
            Namespace::XLink => "xlink",
            Namespace::Xml => "xml",
            Namespace::Xmlns => "xmlns",
            _ => "",
        }
    }

    pub fn from_uri(uri: &str) -> Option<Namespace> {
        match uri {
            "" => Some(Namespace::None),
            "http://www.w3.org/1999/xhtml" => Some(Namespace::Html),
            "http://www.w3.org/1998/Math/MathML" => Some(Namespace::MathML),
            "http://www.w3.org/2000/svg" => Some(Namespace::Svg),
            "http://www.w3.org/1999/xlink" => Some(Namespace::XLink),
            "http://www.w3.org/XML/1998/namespace" => Some(Namespace::Xml),
            "http://www.w3.org/2000/xmlns/" => Some(Namespace::Xmlns),
            _ => None,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

/// Compact namespace id issued by a [`NamespaceMap`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NamespaceId(pub i32);

impl NamespaceId {
    pub const INVALID: NamespaceId = NamespaceId(-1);
    pub const NONE: NamespaceId = NamespaceId(0);
    pub const HTML: NamespaceId = NamespaceId(1);
    pub const MATHML: NamespaceId = NamespaceId(2);
    pub const SVG: NamespaceId = NamespaceId(3);
    pub const XLINK: NamespaceId = NamespaceId(4);
    pub const XML: NamespaceId = NamespaceId(5);
    pub const XMLNS: NamespaceId = NamespaceId(6);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

struct Entry {
    uri: String,
    prefix: String,
    ns: Namespace,
}

/// Thread-safe namespace URI intern table.
///
/// Reserved ids 0..=6 hold the standard namespaces in a fixed order; further
/// URIs are appended on first sight.
pub struct NamespaceMap {
    inner: Mutex<Vec<Entry>>,
}

static SHARED: LazyLock<NamespaceMap> = LazyLock::new(NamespaceMap::new);

impl NamespaceMap {
    pub fn new() -> NamespaceMap {
        const RESERVED: [Namespace; 7] = [
            Namespace::None,
            Namespace::Html,
            Namespace::MathML,
            Namespace::Svg,
            Namespace::XLink,
            Namespace::Xml,
            Namespace::Xmlns,
        ];
        let entries = RESERVED
            .iter()
            .map(|&ns| Entry {
                uri: ns.uri().to_owned(),
                prefix: ns.default_prefix().to_owned(),
                ns,
            })
            .collect();
        NamespaceMap {
            inner: Mutex::new(entries),
        }
    }

    /// The process-wide shared map.
    pub fn shared() -> &'static NamespaceMap {
        &SHARED
    }

    /// Intern a standard namespace; returns its reserved id.
    pub fn intern(&self, ns: Namespace) -> NamespaceId {
        match ns {
            Namespace::None => NamespaceId::NONE,
            Namespace::Html => NamespaceId::HTML,
            Namespace::MathML => NamespaceId::MATHML,
            Namespace::Svg => NamespaceId::SVG,
            Namespace::XLink => NamespaceId::XLINK,
            Namespace::Xml => NamespaceId::XML,
            Namespace::Xmlns => NamespaceId::XMLNS,
            Namespace::Other => NamespaceId::INVALID,
        }
    }

    /// Intern a URI with an optional prefix; re-uses any existing id for the
    /// same URI.
    pub fn intern_uri(&self, uri: &str, prefix: &str) -> NamespaceId {
        if let Some(ns) = Namespace::from_uri(uri) {
            return self.intern(ns);
        }
        let mut entries = self.inner.lock().unwrap();
        if let Some(i) = entries.iter().position(|e| e.uri == uri) {
            return NamespaceId(i as i32);
        }
        entries.push(Entry {
            uri: uri.to_owned(),
            prefix: prefix.to_owned(),
            ns: Namespace::Other,
        });
        NamespaceId((entries.len() - 1) as i32)
    }

    /// Id for a standard namespace, `INVALID` if it was never interned.
    pub fn id_of(&self, ns: Namespace) -> NamespaceId {
        self.intern(ns)
    }

    /// Id for a URI, `INVALID` if absent.
    pub fn id_of_uri(&self, uri: &str) -> NamespaceId {
        let entries = self.inner.lock().unwrap();
        match entries.iter().position(|e| e.uri == uri) {
            Some(i) => NamespaceId(i as i32),
            None => NamespaceId::INVALID,
        }
    }

    /// The namespace enum for an id; `Other` for interned non-standard URIs.
    pub fn namespace(&self, id: NamespaceId) -> Namespace {
        if !id.is_valid() {
            return Namespace::Other;
        }
        let entries = self.inner.lock().unwrap();
        entries
            .get(id.0 as usize)
            .map(|e| e.ns)
            .unwrap_or(Namespace::Other)
    }

    /// The URI for an id, empty if the id is invalid.
    pub fn uri(&self, id: NamespaceId) -> String {
        if !id.is_valid() {
            return String::new();
        }
        let entries = self.inner.lock().unwrap();
        entries
            .get(id.0 as usize)
            .map(|e| e.uri.clone())
            .unwrap_or_default()
    }

    /// The prefix recorded for an id, empty if none.
    pub fn prefix(&self, id: NamespaceId) -> String {
        if !id.is_valid() {
            return String::new();
        }
        let entries = self.inner.lock().unwrap();
        entries
            .get(id.0 as usize)
            .map(|e| e.prefix.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NamespaceMap {
    fn default() -> Self {
        NamespaceMap::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reserved_ids_are_stable() {
        let map = NamespaceMap::new();
        assert_eq!(map.intern(Namespace::None), NamespaceId::NONE);
        assert_eq!(map.intern(Namespace::Html), NamespaceId::HTML);
        assert_eq!(map.intern(Namespace::Svg), NamespaceId::SVG);
        assert_eq!(map.namespace(NamespaceId::MATHML), Namespace::MathML);
        assert_eq!(map.uri(NamespaceId::HTML), "http://www.w3.org/1999/xhtml");
    }

    #[test]
    fn interning_is_idempotent() {
        let map = NamespaceMap::new();
        let a = map.intern_uri("urn:example", "ex");
        let b = map.intern_uri("urn:example", "ex");
        assert_eq!(a, b);
        assert_eq!(map.namespace(a), Namespace::Other);
        assert_eq!(map.uri(a), "urn:example");
        assert_eq!(map.prefix(a), "ex");
    }

    #[test]
    fn absent_lookups_are_invalid() {
        let map = NamespaceMap::new();
        assert_eq!(map.id_of_uri("urn:missing"), NamespaceId::INVALID);
        assert!(!NamespaceId::INVALID.is_valid());
    }

    #[test]
    fn shared_map_is_usable_across_threads() {
        let id = std::thread::spawn(|| NamespaceMap::shared().intern_uri("urn:threaded", ""))
            .join()
            .unwrap();
        assert_eq!(NamespaceMap::shared().id_of_uri("urn:threaded"), id);
    }
}
