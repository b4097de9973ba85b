// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Serialization and round-trip tests.

use pretty_assertions::assert_eq;

use dotml::dom::node_eq;
use dotml::serialize::serialize_to_string;
use dotml::{parse_document, ParseOpts, SerializeOpts};

fn parse(input: &str) -> dotml::Dot {
    parse_document(input, ParseOpts::default())
}

fn to_html(dot: &dotml::Dot) -> String {
    serialize_to_string(dot.document(), SerializeOpts::default())
}

#[test]
fn serializes_a_minimal_document() {
    let dot = parse("<!doctype html><html><head></head><body>hi</body></html>");
    assert_eq!(
        to_html(&dot),
        "<!DOCTYPE html><html><head></head><body>hi</body></html>"
    );
}

#[test]
fn round_trip_reaches_a_fixpoint() {
    let inputs = [
        "<!doctype html><html><head></head><body>hi</body></html>",
        "<!doctype html><html><head><title>t</title></head>\
         <body><p>1<b>2</b></p><!--c--></body></html>",
        "<!doctype html><html><head></head><body>\
         <table><tbody><tr><td>x</td></tr></tbody></table></body></html>",
    ];
    for input in inputs {
        let once = parse(input);
        let html_once = to_html(&once);
        let twice = parse(&html_once);
        let html_twice = to_html(&twice);
        assert_eq!(html_once, html_twice);
        assert!(
            node_eq(once.document(), twice.document()),
            "reparse of {input:?} changed the tree"
        );
    }
}

#[test]
fn quote_styles_are_preserved() {
    let dot = parse(r#"<!doctype html><body><div id=x class='a b' data-n="1" hidden></div>"#);
    let html = to_html(&dot);
    assert!(html.contains(r#"<div id=x class='a b' data-n="1" hidden>"#), "{html}");
}

#[test]
fn unsafe_unquoted_values_fall_back_to_double_quotes() {
    let dot = parse("<!doctype html><body><div title=ok></div>");
    let div = {
        let html = dot.document().children()[1].clone();
        let body = html.children()[1].clone();
        let div = body.children()[0].clone();
        div
    };
    // Mutate the attribute to something unquotable.
    div.set_attribute("title", "a b").unwrap();
    let html = to_html(&dot);
    assert!(html.contains(r#"title="a b""#), "{html}");
}

#[test]
fn script_text_is_not_escaped() {
    let dot = parse("<!doctype html><head><script>1 < 2 && x</script></head>");
    let html = to_html(&dot);
    assert!(html.contains("<script>1 < 2 && x</script>"), "{html}");
}

#[test]
fn body_text_is_escaped() {
    let dot = parse("<!doctype html><body>1 &lt; 2 &amp; 3");
    let html = to_html(&dot);
    assert!(html.contains("1 &lt; 2 &amp; 3"), "{html}");
}

#[test]
fn comments_and_doctype_forms() {
    let dot = parse("<!doctype html><body><!-- note -->x");
    let html = to_html(&dot);
    assert!(html.starts_with("<!DOCTYPE html>"), "{html}");
    assert!(html.contains("<!-- note -->"), "{html}");
}

#[test]
fn public_and_system_ids_survive() {
    let input = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"><html><head></head><body></body></html>"#;
    let dot = parse(input);
    let html = to_html(&dot);
    assert!(
        html.starts_with(
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#
        ),
        "{html}"
    );
    // And round-trips.
    let twice = parse(&html);
    assert!(node_eq(dot.document(), twice.document()));
}

#[test]
fn void_elements_round_trip() {
    let dot = parse("<!doctype html><body>a<br>b<hr><img src=x>");
    let html = to_html(&dot);
    assert!(html.contains("a<br>b<hr><img src=x>"), "{html}");
    let twice = parse(&html);
    assert!(node_eq(dot.document(), twice.document()));
}
