// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! HTML serialization: an in-order traversal that writes the tree back out
//! as UTF-8, reusing the attribute quote styles captured at parse time.

use std::io::{self, Write};

use crate::data::tags::{ElementType, TagStructure};
use crate::dom::named_node_map::AttrQuote;
use crate::dom::{Handle, NodeData};

//§ serializing-html-fragments

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum TraversalScope {
    IncludeNode,
    ChildrenOnly,
}

#[derive(Clone, Copy)]
pub struct SerializeOpts {
    /// Is scripting enabled? Affects whether `<noscript>` contents are
    /// escaped.
    pub scripting_enabled: bool,

    /// Serialize the node itself, or only its children.
    pub traversal_scope: TraversalScope,
}

impl Default for SerializeOpts {
    fn default() -> SerializeOpts {
        SerializeOpts {
            scripting_enabled: true,
            traversal_scope: TraversalScope::ChildrenOnly,
        }
    }
}

struct ElemInfo {
    html_name: Option<ElementType>,
    ignore_children: bool,
    processed_first_child: bool,
}

pub struct HtmlSerializer<'wr, Wr: 'wr> {
    writer: &'wr mut Wr,
    opts: SerializeOpts,
    stack: Vec<ElemInfo>,
}

/// Serialize a node (or its children) to the writer.
pub fn serialize<Wr: Write>(
    writer: &mut Wr,
    node: &Handle,
    opts: SerializeOpts,
) -> io::Result<()> {
    let traversal_scope = opts.traversal_scope;
    let mut ser = HtmlSerializer::new(writer, opts);
    ser.serialize_node(node, traversal_scope)
}

/// Convenience wrapper producing a `String`.
pub fn serialize_to_string(node: &Handle, opts: SerializeOpts) -> String {
    let mut buf = Vec::new();
    serialize(&mut buf, node, opts).expect("writing to a Vec cannot fail");
    String::from_utf8(buf).expect("serializer wrote invalid UTF-8")
}

impl<'wr, Wr: Write> HtmlSerializer<'wr, Wr> {
    fn new(writer: &'wr mut Wr, opts: SerializeOpts) -> HtmlSerializer<'wr, Wr> {
        HtmlSerializer {
            writer,
            opts,
            stack: vec![ElemInfo {
                html_name: None,
                ignore_children: false,
                processed_first_child: false,
            }],
        }
    }

    fn parent(&mut self) -> &mut ElemInfo {
        self.stack.last_mut().expect("no parent ElemInfo")
    }

    /// Escape text data for the five reserved characters. `&apos;` is not
    /// used in HTML output; the apostrophe becomes `&#39;`.
    fn write_text_escaped(&mut self, text: &str) -> io::Result<()> {
        for c in text.chars() {
            match c {
                '&' => self.writer.write_all(b"&amp;")?,
                '<' => self.writer.write_all(b"&lt;")?,
                '>' => self.writer.write_all(b"&gt;")?,
                '"' => self.writer.write_all(b"&quot;")?,
                '\'' => self.writer.write_all(b"&#39;")?,
                c => write!(self.writer, "{c}")?,
            }
        }
        Ok(())
    }

    fn write_attr_value(&mut self, value: &str, quote: AttrQuote) -> io::Result<()> {
        for c in value.chars() {
            match c {
                '&' => self.writer.write_all(b"&amp;")?,
                '"' if quote == AttrQuote::Double => self.writer.write_all(b"&quot;")?,
                '\'' if quote == AttrQuote::Single => self.writer.write_all(b"&#39;")?,
                c => write!(self.writer, "{c}")?,
            }
        }
        Ok(())
    }

    fn unquoted_ok(value: &str) -> bool {
        !value.is_empty()
            && !value.chars().any(|c| {
                matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ' | '"' | '\'' | '=' | '<' | '>' | '`')
            })
    }

    fn start_elem(&mut self, node: &Handle) -> io::Result<()> {
        let el = node.as_element().expect("start_elem on a non-element");
        let html_name = if el.is_html_native() {
            Some(el.id)
        } else {
            None
        };

        if self.parent().ignore_children {
            self.stack.push(ElemInfo {
                html_name,
                ignore_children: true,
                processed_first_child: false,
            });
            return Ok(());
        }

        write!(self.writer, "<{}", el.qualified_name())?;
        for attr in el.attrs.list().iter() {
            let attr = attr.as_attr().expect("attribute map holds Attr nodes");
            write!(self.writer, " {}", attr.qualified_name())?;

            if !attr.has_value() {
                continue;
            }
            let value = attr.value();
            let quote = match attr.quote() {
                AttrQuote::None if Self::unquoted_ok(&value) => AttrQuote::None,
                AttrQuote::Single => AttrQuote::Single,
                // Anything unsafe falls back to double quotes.
                _ => AttrQuote::Double,
            };
            match quote {
                AttrQuote::None => {
                    self.writer.write_all(b"=")?;
                    self.write_attr_value(&value, quote)?;
                },
                AttrQuote::Single => {
                    self.writer.write_all(b"='")?;
                    self.write_attr_value(&value, quote)?;
                    self.writer.write_all(b"'")?;
                },
                AttrQuote::Double => {
                    self.writer.write_all(b"=\"")?;
                    self.write_attr_value(&value, quote)?;
                    self.writer.write_all(b"\"")?;
                },
            }
        }
        self.writer.write_all(b">")?;

        let ignore_children =
            el.is_html_native() && el.id.structure() == TagStructure::Unpaired;

        self.parent().processed_first_child = true;

        self.stack.push(ElemInfo {
            html_name,
            ignore_children,
            processed_first_child: false,
        });

        Ok(())
    }

    fn end_elem(&mut self, node: &Handle) -> io::Result<()> {
        let el = node.as_element().expect("end_elem on a non-element");
        let info = self.stack.pop().expect("no ElemInfo");
        if info.ignore_children {
            return Ok(());
        }

        write!(self.writer, "</{}>", el.qualified_name())
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        let prepend_lf = text.starts_with('\n') && {
            let parent = self.parent();
            !parent.processed_first_child
                && matches!(
                    parent.html_name,
                    Some(ElementType::Pre)
                        | Some(ElementType::Textarea)
                        | Some(ElementType::Listing)
                )
        };

        if prepend_lf {
            self.writer.write_all(b"\n")?;
        }

        let escape = match self.parent().html_name {
            Some(
                ElementType::Style
                | ElementType::Script
                | ElementType::Xmp
                | ElementType::Iframe
                | ElementType::Noembed
                | ElementType::Noframes
                | ElementType::Plaintext,
            ) => false,

            Some(ElementType::Noscript) => !self.opts.scripting_enabled,

            _ => true,
        };

        if escape {
            self.write_text_escaped(text)
        } else {
            self.writer.write_all(text.as_bytes())
        }
    }

    fn write_comment(&mut self, text: &str) -> io::Result<()> {
        write!(self.writer, "<!--{text}-->")
    }

    fn write_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> io::Result<()> {
        write!(self.writer, "<!DOCTYPE {name}")?;
        if !public_id.is_empty() {
            write!(self.writer, " PUBLIC \"{public_id}\"")?;
            if !system_id.is_empty() {
                write!(self.writer, " \"{system_id}\"")?;
            }
        } else if !system_id.is_empty() {
            write!(self.writer, " SYSTEM \"{system_id}\"")?;
        }
        self.writer.write_all(b">")
    }

    fn serialize_children(&mut self, node: &Handle) -> io::Result<()> {
        // A template's markup lives in its contents fragment.
        if let Some(contents) = node.as_element().and_then(|el| el.template_contents()) {
            for child in contents.children().iter() {
                self.serialize_node(child, TraversalScope::IncludeNode)?;
            }
            return Ok(());
        }
        for child in node.children().iter() {
            self.serialize_node(child, TraversalScope::IncludeNode)?;
        }
        Ok(())
    }

    fn serialize_node(&mut self, node: &Handle, scope: TraversalScope) -> io::Result<()> {
        match (scope, &node.data) {
            (_, NodeData::Element(_)) => {
                if scope == TraversalScope::IncludeNode {
                    self.start_elem(node)?;
                }
                self.serialize_children(node)?;
                if scope == TraversalScope::IncludeNode {
                    self.end_elem(node)?;
                }
                Ok(())
            },

            (TraversalScope::ChildrenOnly, _) => self.serialize_children(node),

            (TraversalScope::IncludeNode, NodeData::Doctype {
                name,
                public_id,
                system_id,
            }) => self.write_doctype(name, public_id, system_id),

            (TraversalScope::IncludeNode, NodeData::Text { contents })
            | (TraversalScope::IncludeNode, NodeData::Cdata { contents }) => {
                let text = contents.borrow().clone();
                self.write_text(&text)
            },

            (TraversalScope::IncludeNode, NodeData::Comment { contents }) => {
                self.write_comment(contents)
            },

            (TraversalScope::IncludeNode, NodeData::Document { .. })
            | (TraversalScope::IncludeNode, NodeData::Fragment) => {
                self.serialize_children(node)
            },

            (TraversalScope::IncludeNode, NodeData::Attr(_)) => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::new_document;
    use crate::error::DotConfig;
    use tendril::StrTendril;

    #[test]
    fn text_escapes_the_five_reserved_characters() {
        let doc = new_document(DotConfig::default());
        let p = doc.create_element("p").unwrap();
        p.append_child(doc.create_text(StrTendril::from_slice(r#"a<b>&"c'd"#)))
            .unwrap();
        let out = serialize_to_string(
            &p,
            SerializeOpts {
                traversal_scope: TraversalScope::IncludeNode,
                ..SerializeOpts::default()
            },
        );
        assert_eq!(out, "<p>a&lt;b&gt;&amp;&quot;c&#39;d</p>");
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        let doc = new_document(DotConfig::default());
        let div = doc.create_element("div").unwrap();
        div.append_child(doc.create_element("br").unwrap()).unwrap();
        let out = serialize_to_string(
            &div,
            SerializeOpts {
                traversal_scope: TraversalScope::IncludeNode,
                ..SerializeOpts::default()
            },
        );
        assert_eq!(out, "<div><br></div>");
    }
}
