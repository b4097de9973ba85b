// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Various sets of element types used in the tree builder.

use crate::data::tags::ElementType;
use crate::dom::namespace::Namespace;
use crate::tree_builder::ElemName;

macro_rules! declare_tag_set_body (
    ($name:expr, $($tag:ident)+) => (
        matches!(
            ($name.ns, $name.id),
            $((Namespace::Html, ElementType::$tag))|+
        )
    );
);

macro_rules! declare_tag_set (
    (pub $name:ident = [$supr:ident] - $($tag:ident)+) => (
        pub(crate) fn $name(name: $crate::tree_builder::ElemName) -> bool {
            if declare_tag_set_body!(name, $($tag)+) {
                false
            } else {
                $supr(name)
            }
        }
    );
    (pub $name:ident = [$supr:ident] + $($tag:ident)+) => (
        pub(crate) fn $name(name: $crate::tree_builder::ElemName) -> bool {
            declare_tag_set_body!(name, $($tag)+) || $supr(name)
        }
    );
    (pub $name:ident = $($tag:ident)+) => (
        pub(crate) fn $name(name: $crate::tree_builder::ElemName) -> bool {
            declare_tag_set_body!(name, $($tag)+)
        }
    );
    ($name:ident = [$supr:ident] - $($tag:ident)+) => (
        fn $name(name: $crate::tree_builder::ElemName) -> bool {
            if declare_tag_set_body!(name, $($tag)+) {
                false
            } else {
                $supr(name)
            }
        }
    );
    ($name:ident = $($tag:ident)+) => (
        fn $name(name: $crate::tree_builder::ElemName) -> bool {
            declare_tag_set_body!(name, $($tag)+)
        }
    );
);

pub(crate) fn full_set(_: ElemName) -> bool {
    true
}

/// A MathML text integration point.
pub(crate) fn mathml_text_integration_point(name: ElemName) -> bool {
    matches!(
        (name.ns, name.id),
        (
            Namespace::MathML,
            ElementType::Mi
                | ElementType::Mo
                | ElementType::Mn
                | ElementType::Ms
                | ElementType::Mtext
        )
    )
}

/// An SVG HTML integration point.
///
/// `annotation-xml` can also be one; that depends on its `encoding`
/// attribute, which only the sink knows.
pub(crate) fn svg_html_integration_point(name: ElemName) -> bool {
    matches!(
        (name.ns, name.id),
        (
            Namespace::Svg,
            ElementType::ForeignObject | ElementType::Desc | ElementType::Title
        )
    )
}

declare_tag_set!(pub html_default_scope =
    Applet Caption Html Table Td Th Marquee Object Template);

pub(crate) fn default_scope(name: ElemName) -> bool {
    html_default_scope(name)
        || mathml_text_integration_point(name)
        || svg_html_integration_point(name)
}

declare_tag_set!(pub list_item_scope = [default_scope] + Ol Ul);
declare_tag_set!(pub button_scope = [default_scope] + Button);
declare_tag_set!(pub table_scope = Html Table Template);
declare_tag_set!(pub select_scope = [full_set] - Optgroup Option);

declare_tag_set!(pub table_body_context = Tbody Tfoot Thead Template Html);
declare_tag_set!(pub table_row_context = Tr Template Html);

declare_tag_set!(pub td_th = Td Th);

declare_tag_set!(pub cursory_implied_end = Dd Dt Li Option Optgroup P Rb Rp Rt Rtc);

declare_tag_set!(pub thorough_implied_end = [cursory_implied_end]
    + Caption Colgroup Tbody Td Tfoot Th Thead Tr);

declare_tag_set!(pub heading_tag = H1 H2 H3 H4 H5 H6);

declare_tag_set!(pub html_special_tag =
    Address Applet Area Article Aside Base Basefont Bgsound Blockquote Body
    Br Button Caption Center Col Colgroup Dd Details Dir Div Dl Dt Embed
    Fieldset Figcaption Figure Footer Form Frame Frameset H1 H2 H3 H4 H5 H6
    Head Header Hgroup Hr Html Iframe Img Input Keygen Li Link Listing Main
    Marquee Menu Menuitem Meta Nav Noembed Noframes Noscript Object Ol P
    Param Plaintext Pre Script Search Section Select Source Style Summary
    Table Tbody Td Template Textarea Tfoot Th Thead Title Tr Track Ul Wbr
    Xmp);

/// The "special" category, which bounds generic end-tag matching.
pub(crate) fn special_tag(name: ElemName) -> bool {
    if html_special_tag(name) {
        return true;
    }
    matches!(
        (name.ns, name.id),
        (
            Namespace::MathML,
            ElementType::Mi
                | ElementType::Mo
                | ElementType::Mn
                | ElementType::Ms
                | ElementType::Mtext
                | ElementType::AnnotationXml
        ) | (
            Namespace::Svg,
            ElementType::ForeignObject | ElementType::Desc | ElementType::Title
        )
    )
}

#[cfg(test)]
mod test {
    use super::*;

    fn html(id: ElementType) -> ElemName {
        ElemName {
            ns: Namespace::Html,
            id,
        }
    }

    #[test]
    fn scopes() {
        assert!(default_scope(html(ElementType::Table)));
        assert!(!default_scope(html(ElementType::Div)));
        assert!(button_scope(html(ElementType::Button)));
        assert!(list_item_scope(html(ElementType::Ul)));
        assert!(!table_scope(html(ElementType::Td)));
        assert!(select_scope(html(ElementType::Div)));
        assert!(!select_scope(html(ElementType::Option)));
    }

    #[test]
    fn integration_points() {
        let mi = ElemName {
            ns: Namespace::MathML,
            id: ElementType::Mi,
        };
        assert!(mathml_text_integration_point(mi));
        assert!(default_scope(mi));
        let fo = ElemName {
            ns: Namespace::Svg,
            id: ElementType::ForeignObject,
        };
        assert!(svg_html_integration_point(fo));
        assert!(special_tag(fo));
    }
}
