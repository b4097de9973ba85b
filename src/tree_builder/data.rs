// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! DOCTYPE sniffing tables: which doctypes are conforming, and which put
//! the document into (limited) quirks mode.

use tendril::StrTendril;

use crate::tokenizer::Doctype;
use crate::tree_builder::QuirksMode;

// These should all be lowercase, for ASCII-case-insensitive matching.
static QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

static QUIRKY_PUBLIC_MATCHES: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

static QUIRKY_SYSTEM_MATCHES: &[&str] =
    &["http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"];

static LIMITED_QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

static HTML4_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

fn opt_string_eq(x: &Option<StrTendril>, y: &str) -> bool {
    match *x {
        Some(ref s) => s.eq_ignore_ascii_case(y),
        None => y.is_empty(),
    }
}

fn opt_tendril_as_slice(x: &Option<StrTendril>) -> Option<&str> {
    x.as_deref()
}

fn is_doctype_ok(doctype: &Doctype) -> bool {
    let name = &doctype.name;
    let public = &doctype.public_id;
    let system = &doctype.system_id;

    let has_system_id = system.is_some();

    if !opt_string_eq(name, "html") {
        false
    } else if public.is_none() {
        !has_system_id || opt_string_eq(system, "about:legacy-compat")
    } else if opt_string_eq(public, "-//W3C//DTD HTML 4.0//EN") {
        !has_system_id || opt_string_eq(system, "http://www.w3.org/TR/REC-html40/strict.dtd")
    } else if opt_string_eq(public, "-//W3C//DTD HTML 4.01//EN") {
        !has_system_id || opt_string_eq(system, "http://www.w3.org/TR/html4/strict.dtd")
    } else if opt_string_eq(public, "-//W3C//DTD XHTML 1.0 Strict//EN") {
        opt_string_eq(system, "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd")
    } else if opt_string_eq(public, "-//W3C//DTD XHTML 1.1//EN") {
        opt_string_eq(system, "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd")
    } else {
        false
    }
}

fn contains_match(haystack: &[&str], needle: &str) -> bool {
    haystack.iter().any(|&x| needle.eq_ignore_ascii_case(x))
}

fn contains_prefix(haystack: &[&str], needle: &str) -> bool {
    haystack.iter().any(|&x| {
        needle.len() >= x.len() && needle[..x.len()].eq_ignore_ascii_case(x)
    })
}

/// Decide whether the doctype is a parse error and which quirks mode it
/// selects.
pub(crate) fn doctype_error_and_quirks(
    doctype: &Doctype,
    iframe_srcdoc: bool,
) -> (bool, QuirksMode) {
    let err = !is_doctype_ok(doctype);

    let public = opt_tendril_as_slice(&doctype.public_id);
    let system = opt_tendril_as_slice(&doctype.system_id);

    let quirk = match (public, system) {
        _ if doctype.force_quirks => QuirksMode::Quirks,
        _ if !opt_string_eq(&doctype.name, "html") => QuirksMode::Quirks,

        _ if iframe_srcdoc => QuirksMode::NoQuirks,

        (Some(p), _) if contains_match(QUIRKY_PUBLIC_MATCHES, p) => QuirksMode::Quirks,
        (_, Some(s)) if contains_match(QUIRKY_SYSTEM_MATCHES, s) => QuirksMode::Quirks,

        (Some(p), _) if contains_prefix(QUIRKY_PUBLIC_PREFIXES, p) => QuirksMode::Quirks,
        (Some(p), _) if contains_prefix(LIMITED_QUIRKY_PUBLIC_PREFIXES, p) => {
            QuirksMode::LimitedQuirks
        },

        (Some(p), s) if contains_prefix(HTML4_PUBLIC_PREFIXES, p) => match s {
            None => QuirksMode::Quirks,
            Some(_) => QuirksMode::LimitedQuirks,
        },

        _ => QuirksMode::NoQuirks,
    };

    (err, quirk)
}

#[cfg(test)]
mod test {
    use super::*;

    fn dt(name: &str, public: Option<&str>, system: Option<&str>) -> Doctype {
        Doctype {
            name: Some(StrTendril::from_slice(name)),
            public_id: public.map(StrTendril::from_slice),
            system_id: system.map(StrTendril::from_slice),
            force_quirks: false,
        }
    }

    #[test]
    fn modern_doctype_is_ok() {
        let (err, quirks) = doctype_error_and_quirks(&dt("html", None, None), false);
        assert!(!err);
        assert_eq!(quirks, QuirksMode::NoQuirks);
    }

    #[test]
    fn html32_is_quirky() {
        let (err, quirks) = doctype_error_and_quirks(
            &dt("html", Some("-//W3C//DTD HTML 3.2 Final//EN"), None),
            false,
        );
        assert!(err);
        assert_eq!(quirks, QuirksMode::Quirks);
    }

    #[test]
    fn xhtml_transitional_is_limited_quirky() {
        let (_, quirks) = doctype_error_and_quirks(
            &dt(
                "html",
                Some("-//W3C//DTD XHTML 1.0 Transitional//EN"),
                Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd"),
            ),
            false,
        );
        assert_eq!(quirks, QuirksMode::LimitedQuirks);
    }
}
