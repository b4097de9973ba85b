// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! XML name validation, per the XML 1.0 `Name` production, and the
//! namespace-triple validation used by `create_element_ns` and
//! `create_attribute_ns`.

use crate::dom::namespace::Namespace;
use crate::error::{DomErrorKind, DomException};

// https://www.w3.org/TR/xml/#NT-NameStartChar, without ':' which is handled
// at the QName level.
fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// Is `s` a valid XML `Name`? The colon is excluded here; use [`is_qname`]
/// for prefixed names.
pub fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_name_start_char(c) => chars.all(is_name_char),
        _ => false,
    }
}

/// Is `s` a valid QName: a `Name`, or `prefix:local` with both parts names
/// and no further colon?
pub fn is_qname(s: &str) -> bool {
    match s.split_once(':') {
        None => is_name(s),
        Some((prefix, local)) => {
            !local.contains(':') && is_name(prefix) && is_name(local)
        },
    }
}

/// Split a qualified name into `(prefix, local)`.
pub fn split_qname(s: &str) -> (Option<&str>, &str) {
    match s.split_once(':') {
        None => (None, s),
        Some((prefix, local)) => (Some(prefix), local),
    }
}

/// Validate a `(namespace, qualified-name)` pair, per the DOM
/// "validate and extract" algorithm. Returns the split name on success.
pub fn validate_ns<'a>(
    ns: Namespace,
    qualified_name: &'a str,
) -> Result<(Option<&'a str>, &'a str), DomException> {
    if !is_qname(qualified_name) {
        return Err(DomException::new(
            DomErrorKind::InvalidCharacterError,
            format!("'{qualified_name}' is not a valid qualified name"),
        ));
    }

    let (prefix, local) = split_qname(qualified_name);

    if prefix.is_some() && ns == Namespace::None {
        return Err(DomException::new(
            DomErrorKind::NamespaceError,
            "a prefix requires a non-empty namespace",
        ));
    }
    if prefix == Some("xml") && ns != Namespace::Xml {
        return Err(DomException::new(
            DomErrorKind::NamespaceError,
            "the 'xml' prefix requires the XML namespace",
        ));
    }
    let is_xmlns_name = prefix == Some("xmlns") || (prefix.is_none() && local == "xmlns");
    if is_xmlns_name && ns != Namespace::Xmlns {
        return Err(DomException::new(
            DomErrorKind::NamespaceError,
            "'xmlns' requires the XMLNS namespace",
        ));
    }
    if ns == Namespace::Xmlns && !is_xmlns_name {
        return Err(DomException::new(
            DomErrorKind::NamespaceError,
            "the XMLNS namespace requires an 'xmlns' name",
        ));
    }

    Ok((prefix, local))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names() {
        assert!(is_name("div"));
        assert!(is_name("_x"));
        assert!(is_name("a-b.c"));
        assert!(is_name("\u{E9}l\u{E9}ment"));
        assert!(!is_name(""));
        assert!(!is_name("1a"));
        assert!(!is_name("-a"));
        assert!(!is_name("a b"));
    }

    #[test]
    fn qnames() {
        assert!(is_qname("div"));
        assert!(is_qname("svg:rect"));
        assert!(!is_qname(":rect"));
        assert!(!is_qname("svg:"));
        assert!(!is_qname("a:b:c"));
    }

    #[test]
    fn ns_validation() {
        assert!(validate_ns(Namespace::Svg, "svg:rect").is_ok());
        assert!(validate_ns(Namespace::None, "div").is_ok());

        let err = validate_ns(Namespace::None, "svg:rect").unwrap_err();
        assert_eq!(err.kind, DomErrorKind::NamespaceError);

        let err = validate_ns(Namespace::Svg, "xml:lang").unwrap_err();
        assert_eq!(err.kind, DomErrorKind::NamespaceError);
        assert!(validate_ns(Namespace::Xml, "xml:lang").is_ok());

        let err = validate_ns(Namespace::Svg, "xmlns:xlink").unwrap_err();
        assert_eq!(err.kind, DomErrorKind::NamespaceError);
        assert!(validate_ns(Namespace::Xmlns, "xmlns:xlink").is_ok());
        assert!(validate_ns(Namespace::Xmlns, "xmlns").is_ok());
        let err = validate_ns(Namespace::Xmlns, "href").unwrap_err();
        assert_eq!(err.kind, DomErrorKind::NamespaceError);

        let err = validate_ns(Namespace::None, "1bad").unwrap_err();
        assert_eq!(err.kind, DomErrorKind::InvalidCharacterError);
    }
}
