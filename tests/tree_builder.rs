// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end tree construction tests, asserted against a bracketed
//! structural rendering of the parsed tree.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use dotml::dom::named_node_map::AttrQuote;
use dotml::dom::namespace::Namespace;
use dotml::dom::{Handle, NodeData};
use dotml::{parse_document, ErrorCode, ParseOpts};

/// Render a tree as a bracketed structural form:
/// `Document[DocumentType(html), html[head[], body[Text("hi")]]]`.
fn render(node: &Handle) -> String {
    fn children(node: &Handle) -> String {
        node.children()
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join(", ")
    }
    match &node.data {
        NodeData::Document { .. } => format!("Document[{}]", children(node)),
        NodeData::Fragment => format!("Fragment[{}]", children(node)),
        NodeData::Doctype { name, .. } => format!("DocumentType({name})"),
        NodeData::Text { contents } => format!("Text({:?})", &**contents.borrow()),
        NodeData::Cdata { contents } => format!("Cdata({:?})", &**contents.borrow()),
        NodeData::Comment { contents } => format!("Comment({:?})", &**contents),
        NodeData::Element(el) => {
            let ns = match el.namespace() {
                Namespace::Html => "",
                Namespace::Svg => "svg ",
                Namespace::MathML => "math ",
                _ => "? ",
            };
            format!("{ns}{}[{}]", &*el.local, children(node))
        },
        NodeData::Attr(_) => unreachable!("attributes are not tree children"),
    }
}

fn parse(input: &str) -> dotml::Dot {
    parse_document(input, ParseOpts::default())
}

fn error_names(dot: &dotml::Dot) -> Vec<&'static str> {
    dot.errors().iter().map(|e| e.code.as_str()).collect()
}

/// Find the `<body>` element.
fn body(dot: &dotml::Dot) -> Handle {
    let html = dot
        .document()
        .children()
        .iter()
        .find(|n| n.is_element())
        .unwrap()
        .clone();
    let body = html
        .children()
        .iter()
        .find(|n| n.as_element().is_some_and(|el| &*el.local == "body"))
        .unwrap()
        .clone();
    body
}

#[test]
fn minimal_document() {
    let dot = parse("<!doctype html><html><head></head><body>hi</body></html>");
    assert_eq!(
        render(dot.document()),
        r#"Document[DocumentType(html), html[head[], body[Text("hi")]]]"#
    );
    assert_eq!(error_names(&dot), Vec::<&str>::new());
}

#[test]
fn implicit_html_head_body() {
    let dot = parse("<p>x</p>");
    assert_eq!(
        render(dot.document()),
        r#"Document[html[head[], body[p[Text("x")]]]]"#
    );
    assert_eq!(error_names(&dot), Vec::<&str>::new());
}

#[test]
fn misnested_formatting_adoption_agency() {
    let dot = parse("<!doctype html><p>1<b>2<i>3</b>4</i>5</p>");
    assert_eq!(
        render(&body(&dot)),
        r#"body[p[Text("1"), b[Text("2"), i[Text("3")]], i[Text("4")], Text("5")]]"#
    );
    assert_eq!(
        error_names(&dot),
        vec!["end-tag-does-not-match-current-open-element"]
    );
}

#[test]
fn attributes_in_a_start_tag() {
    let dot = parse(r#"<!doctype html><body><div id=x class='a b' hidden data-n="1"></div>"#);
    let body = body(&dot);
    let div = body.children()[0].clone();
    let el = div.as_element().unwrap();
    assert_eq!(&*el.local, "div");

    let attrs: Vec<_> = el
        .attrs
        .list()
        .iter()
        .map(|a| {
            let a = a.as_attr().unwrap();
            (
                a.qualified_name(),
                a.value().to_string(),
                a.has_value(),
                a.quote(),
            )
        })
        .collect();
    assert_eq!(
        attrs,
        vec![
            ("id".to_owned(), "x".to_owned(), true, AttrQuote::None),
            ("class".to_owned(), "a b".to_owned(), true, AttrQuote::Single),
            ("hidden".to_owned(), "".to_owned(), false, AttrQuote::None),
            ("data-n".to_owned(), "1".to_owned(), true, AttrQuote::Double),
        ]
    );
}

#[test]
fn foreign_content() {
    let dot = parse(
        "<!doctype html><body>\
         <svg><circle cx=\"1\"/><foreignObject><div>x</div></foreignObject></svg>",
    );
    assert_eq!(
        render(&body(&dot)),
        r#"body[svg svg[svg circle[], svg foreignObject[div[Text("x")]]]]"#
    );
}

#[test]
fn character_references_in_attributes() {
    let dot = parse(r#"<!doctype html><body><a t="a&amp;b&#65;c"></a>"#);
    let body = body(&dot);
    let a = body.children()[0].clone();
    assert_eq!(&*a.get_attribute("t").unwrap(), "a&bAc");
    assert_eq!(error_names(&dot), Vec::<&str>::new());
}

#[test]
fn empty_input_produces_empty_document() {
    let dot = parse("");
    assert_eq!(render(dot.document()), "Document[]");
    assert!(dot.errors().is_empty());
}

#[test]
fn unterminated_comment_lands_in_the_tree() {
    let dot = parse("<!-- dangling");
    assert_eq!(render(dot.document()), r#"Document[Comment(" dangling")]"#);
    assert_eq!(error_names(&dot), vec!["eof-in-comment"]);
}

#[test]
fn duplicate_attribute_keeps_first() {
    let dot = parse("<!doctype html><body><p id=a id=b>x</p>");
    let body = body(&dot);
    let p = body.children()[0].clone();
    assert_eq!(&*p.get_attribute("id").unwrap(), "a");
    assert_eq!(error_names(&dot), vec!["duplicate-attribute"]);
}

#[test]
fn null_character_reference() {
    let dot = parse("<!doctype html><body>a&#0;b");
    let body = body(&dot);
    assert_eq!(&*body.text_content(), "a\u{fffd}b");
    assert!(error_names(&dot).contains(&"null-character-reference"));
}

#[test]
fn implied_end_tags_for_list_items() {
    let dot = parse("<!doctype html><body><ul><li>one<li>two</ul>");
    assert_eq!(
        render(&body(&dot)),
        r#"body[ul[li[Text("one")], li[Text("two")]]]"#
    );
}

#[test]
fn tables_get_implied_sections() {
    let dot = parse("<!doctype html><body><table><tr><td>x</td></tr></table>");
    assert_eq!(
        render(&body(&dot)),
        r#"body[table[tbody[tr[td[Text("x")]]]]]"#
    );
}

#[test]
fn misplaced_table_text_is_fostered() {
    let dot = parse("<!doctype html><body><table>oops<tr></tr></table>");
    let rendered = render(&body(&dot));
    // The stray text is reparented before the table.
    assert_eq!(rendered, r#"body[Text("oops"), table[tbody[tr[]]]]"#);
    assert!(error_names(&dot).contains(&"non-space-characters-in-table"));
}

#[test]
fn template_contents_live_in_a_fragment() {
    let dot = parse("<!doctype html><body><template><p>t</p></template>");
    let body = body(&dot);
    let template = body.children()[0].clone();
    // The template element itself has no tree children.
    assert_eq!(template.children().len(), 0);
    let contents = template
        .as_element()
        .unwrap()
        .template_contents()
        .unwrap();
    assert_eq!(render(&contents), r#"Fragment[p[Text("t")]]"#);
}

#[test]
fn raw_text_elements_swallow_markup() {
    let dot = parse("<!doctype html><head><title>a<b>c</title></head>");
    let html = dot.document().children()[1].clone();
    let head = html.children()[0].clone();
    let title = head.children()[0].clone();
    assert_eq!(&*title.text_content(), "a<b>c");
}

#[test]
fn noscript_depends_on_scripting_flag() {
    let mut opts = ParseOpts::default();
    opts.tree_builder.scripting_enabled = false;
    let dot = parse_document("<!doctype html><body><noscript><p>n</p></noscript>", opts);
    assert_eq!(render(&body(&dot)), r#"body[noscript[p[Text("n")]]]"#);

    let dot = parse("<!doctype html><body><noscript><p>n</p></noscript>");
    let body = body(&dot);
    let noscript = body.children()[0].clone();
    // With scripting on, the contents are raw text.
    assert_eq!(&*noscript.text_content(), "<p>n</p>");
}

#[test]
fn quirks_mode_detection() {
    use dotml::tree_builder::QuirksMode;

    let dot = parse("<!doctype html><p>x</p>");
    assert_eq!(dot.quirks_mode(), QuirksMode::NoQuirks);

    let dot = parse("<p>x</p>");
    assert_eq!(dot.quirks_mode(), QuirksMode::Quirks);

    let dot = parse(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 3.2 Final//EN"><p>x</p>"#);
    assert_eq!(dot.quirks_mode(), QuirksMode::Quirks);
}

// Structural invariants, checked over a reasonably gnarly parse.

fn check_invariants(node: &Handle, doc: &Handle) {
    for (i, child) in node.children().iter().enumerate() {
        // Every child's parent link points back here, exactly once.
        let parent = child.parent().expect("child with no parent link");
        assert!(Rc::ptr_eq(&parent, node));
        assert_eq!(
            node.children()
                .iter()
                .filter(|c| Rc::ptr_eq(c, child))
                .count(),
            1
        );

        // Sibling links are consistent with the child list.
        match child.next_sibling() {
            Some(next) => {
                assert!(Rc::ptr_eq(&next, &node.children()[i + 1]));
                assert!(Rc::ptr_eq(&next.prev_sibling().unwrap(), child));
            },
            None => assert_eq!(i, node.children().len() - 1),
        }

        // Owner document stamping.
        assert!(Rc::ptr_eq(&child.owner_document().unwrap(), doc));

        // Attribute names are pairwise distinct.
        if let Some(el) = child.as_element() {
            let mut names: Vec<_> = el
                .attrs
                .list()
                .iter()
                .map(|a| a.as_attr().unwrap().qualified_name())
                .collect();
            let total = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), total);
        }

        check_invariants(child, doc);
    }
}

#[test]
fn tree_invariants_hold() {
    let dot = parse(
        "<!doctype html><body><p>1<b>2<i>3</b>4</i>5</p>\
         <table><tr><td a=1 b=2>x</td></tr></table>\
         <svg><circle/></svg><ul><li>a<li>b</ul>",
    );
    check_invariants(dot.document(), dot.document());
}

#[test]
fn byte_soup_always_yields_a_document() {
    let inputs = [
        "<",
        "</",
        "<!",
        "<!-",
        "<x <y <z>>",
        "&#xZZ;&bogus;&",
        "<table><table><td></b></p>",
        "\u{0}\u{fffd}<<<>>>",
        "<svg><desc><math><mi>",
        "<!doctype><!doctype html>",
    ];
    for input in inputs {
        let dot = parse(input);
        check_invariants(dot.document(), dot.document());
        // Appending a byte still parses.
        let mut extended = input.to_owned();
        extended.push('!');
        let dot = parse(&extended);
        check_invariants(dot.document(), dot.document());
    }
}

#[test]
fn error_positions_are_tracked() {
    let dot = parse("<!doctype html>\n<body>\n<p id=a id=b>x</p>");
    let err = dot
        .errors()
        .iter()
        .find(|e| e.code == ErrorCode::DuplicateAttribute)
        .copied()
        .expect("expected a duplicate-attribute error");
    assert_eq!(err.line, 3);
    assert!(err.col > 1);
}
