// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Content-model membership and attribute-element affiliation, as data over
//! the closed element and attribute enums.

use crate::data::attributes::AttributeType;
use crate::data::tags::{ElementType, TagStructure};

/// The HTML5 content categories.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContentModel {
    Nothing,
    Metadata,
    Flow,
    Sectioning,
    Heading,
    Phrasing,
    Embedded,
    Interactive,
    Palpable,
    ScriptSupport,
}

impl ContentModel {
    const fn bit(self) -> u16 {
        match self {
            ContentModel::Nothing => 0,
            ContentModel::Metadata => 1 << 0,
            ContentModel::Flow => 1 << 1,
            ContentModel::Sectioning => 1 << 2,
            ContentModel::Heading => 1 << 3,
            ContentModel::Phrasing => 1 << 4,
            ContentModel::Embedded => 1 << 5,
            ContentModel::Interactive => 1 << 6,
            ContentModel::Palpable => 1 << 7,
            ContentModel::ScriptSupport => 1 << 8,
        }
    }
}

const META: u16 = ContentModel::Metadata.bit();
const FLOW: u16 = ContentModel::Flow.bit();
const SECT: u16 = ContentModel::Sectioning.bit();
const HEAD: u16 = ContentModel::Heading.bit();
const PHRA: u16 = ContentModel::Phrasing.bit();
const EMBED: u16 = ContentModel::Embedded.bit();
const INTER: u16 = ContentModel::Interactive.bit();
const PALP: u16 = ContentModel::Palpable.bit();
const SCRIPT: u16 = ContentModel::ScriptSupport.bit();

/// The content categories an element belongs to, as a bitmask.
pub fn content_models(el: ElementType) -> u16 {
    use self::ElementType::*;
    match el {
        Base | Link | Meta | Title => META,
        Noscript => META | FLOW | PHRA,
        Script => META | FLOW | PHRA | SCRIPT,
        Template => META | FLOW | PHRA | SCRIPT,
        Style => META | FLOW,

        Article | Aside | Nav | Section => FLOW | SECT | PALP,
        H1 | H2 | H3 | H4 | H5 | H6 | Hgroup => FLOW | HEAD | PALP,

        Address | Blockquote | Details | Dialog | Div | Dl | Fieldset | Figure | Footer
        | Form | Header | Main | Menu | Ol | P | Pre | Search | Table | Ul => FLOW | PALP,
        Hr => FLOW,

        A | Abbr | B | Bdi | Bdo | Cite | Code | Data | Dfn | Em | I | Ins | Kbd | Label
        | Map | Mark | Meter | Output | Progress | Q | Ruby | S | Samp | Small | Span
        | Strong | Sub | Sup | Time | U | Var => FLOW | PHRA | PALP,
        Br | Wbr | Area => FLOW | PHRA,
        Datalist | Del | Slot => FLOW | PHRA,

        Audio | Video => FLOW | PHRA | EMBED | INTER | PALP,
        Canvas | Object => FLOW | PHRA | EMBED | PALP,
        Embed | Iframe | Img => FLOW | PHRA | EMBED | INTER | PALP,
        Picture => FLOW | PHRA | EMBED,
        Math | Svg => FLOW | PHRA | EMBED | PALP,

        Button | Select | Textarea => FLOW | PHRA | INTER | PALP,
        Input => FLOW | PHRA | INTER,

        Figcaption | Legend | Li | Summary | Dd | Dt | Caption | Colgroup | Col | Thead
        | Tbody | Tfoot | Tr | Td | Th | Optgroup | Option | Source | Track | Param
        | Head | Body | Html | Frameset | Frame | Noframes => ContentModel::Nothing.bit(),

        // Deprecated elements keep their historical flow/phrasing roles.
        Applet | Marquee => FLOW | PHRA | EMBED | PALP,
        Basefont | Bgsound | Menuitem | Keygen => META,
        Big | Nobr | Strike | Tt | Font => FLOW | PHRA | PALP,
        Center | Dir | Listing | Plaintext | Xmp => FLOW | PALP,
        Image => FLOW | PHRA,
        Noembed => FLOW,
        Rb | Rp | Rt | Rtc => ContentModel::Nothing.bit(),

        _ => ContentModel::Nothing.bit(),
    }
}

/// Does the element belong to the given content category?
pub fn has_model(el: ElementType, model: ContentModel) -> bool {
    content_models(el) & model.bit() != 0
}

/// Is the attribute legal on the element?
///
/// Global attributes (including `data-*` and `aria-*`) are legal everywhere;
/// unknown attributes are legal nowhere; on unknown elements there is
/// nothing to judge, so everything passes.
pub fn attr_legal_on(attr: AttributeType, el: ElementType) -> bool {
    use self::AttributeType as At;
    use self::ElementType::*;

    if el == Other {
        return true;
    }
    if attr.is_global() {
        return true;
    }

    match attr {
        At::Other => false,
        At::Xmlns | At::XmlnsX => true,

        At::Accept => matches!(el, Input | Form),
        At::AcceptCharset => matches!(el, Form),
        At::Action => matches!(el, Form),
        At::Allow => matches!(el, Iframe),
        At::Alt => matches!(el, Area | Img | Input),
        At::Async => matches!(el, Script),
        At::Autocomplete => matches!(el, Form | Input | Select | Textarea),
        At::Autoplay => matches!(el, Audio | Video),
        At::Charset => matches!(el, Meta | Script),
        At::Checked => matches!(el, Input | Menuitem),
        At::Cite => matches!(el, Blockquote | Del | Ins | Q),
        At::Cols => matches!(el, Textarea),
        At::Colspan => matches!(el, Td | Th),
        At::Content => matches!(el, Meta),
        At::Controls => matches!(el, Audio | Video),
        At::Coords => matches!(el, Area),
        At::Crossorigin => matches!(el, Audio | Img | Link | Script | Video),
        At::Data => matches!(el, Object),
        At::Datetime => matches!(el, Del | Ins | Time),
        At::Decoding => matches!(el, Img),
        At::Default => matches!(el, Track | Menuitem),
        At::Defer => matches!(el, Script),
        At::Dirname => matches!(el, Input | Textarea),
        At::Disabled => matches!(
            el,
            Button | Fieldset | Input | Optgroup | Option | Select | Textarea | Link
        ),
        At::Download => matches!(el, A | Area),
        At::Enctype => matches!(el, Form),
        At::For => matches!(el, Label | Output),
        At::Form => matches!(
            el,
            Button | Fieldset | Input | Label | Meter | Object | Output | Select | Textarea
        ),
        At::Formaction | At::Formenctype | At::Formmethod | At::Formnovalidate
        | At::Formtarget => matches!(el, Button | Input),
        At::Headers => matches!(el, Td | Th),
        At::Height => matches!(el, Canvas | Embed | Iframe | Img | Input | Object | Video),
        At::High => matches!(el, Meter),
        At::Href => matches!(el, A | Area | Base | Link),
        At::Hreflang => matches!(el, A | Area | Link),
        At::HttpEquiv => matches!(el, Meta),
        At::Integrity => matches!(el, Link | Script),
        At::Ismap => matches!(el, Img),
        At::Kind => matches!(el, Track),
        At::Label => matches!(el, Optgroup | Option | Track | Menuitem),
        At::List => matches!(el, Input),
        At::Loading => matches!(el, Iframe | Img),
        At::Loop => matches!(el, Audio | Video),
        At::Low => matches!(el, Meter),
        At::Max => matches!(el, Input | Meter | Progress),
        At::Maxlength => matches!(el, Input | Textarea),
        At::Media => matches!(el, Link | Source | Style),
        At::Method => matches!(el, Form),
        At::Min => matches!(el, Input | Meter),
        At::Minlength => matches!(el, Input | Textarea),
        At::Multiple => matches!(el, Input | Select),
        At::Muted => matches!(el, Audio | Video),
        At::Name => matches!(
            el,
            A | Button | Fieldset | Form | Frame | Iframe | Input | Map | Meta | Object
                | Output | Param | Select | Slot | Textarea
        ),
        At::Nomodule => matches!(el, Script),
        At::Novalidate => matches!(el, Form),
        At::Open => matches!(el, Details | Dialog),
        At::Optimum => matches!(el, Meter),
        At::Pattern => matches!(el, Input),
        At::Ping => matches!(el, A | Area),
        At::Placeholder => matches!(el, Input | Textarea),
        At::Playsinline => matches!(el, Video),
        At::Poster => matches!(el, Video),
        At::Preload => matches!(el, Audio | Video),
        At::Readonly => matches!(el, Input | Textarea),
        At::Referrerpolicy => matches!(el, A | Area | Iframe | Img | Link | Script),
        At::Rel => matches!(el, A | Area | Form | Link),
        At::Required => matches!(el, Input | Select | Textarea),
        At::Reversed => matches!(el, Ol),
        At::Rows => matches!(el, Textarea),
        At::Rowspan => matches!(el, Td | Th),
        At::Sandbox => matches!(el, Iframe),
        At::Scope => matches!(el, Td | Th),
        At::Selected => matches!(el, Option),
        At::Shape => matches!(el, Area),
        At::Size => matches!(el, Hr | Input | Select),
        At::Sizes => matches!(el, Img | Link | Source),
        At::Span => matches!(el, Col | Colgroup),
        At::Src => matches!(
            el,
            Audio | Embed | Frame | Iframe | Img | Input | Script | Source | Track | Video
        ),
        At::Srcdoc => matches!(el, Iframe),
        At::Srclang => matches!(el, Track),
        At::Srcset => matches!(el, Img | Source),
        At::Start => matches!(el, Ol),
        At::Step => matches!(el, Input),
        At::Target => matches!(el, A | Area | Base | Form),
        At::Type => matches!(
            el,
            A | Area | Button | Embed | Input | Link | Menu | Object | Ol | Script | Source
                | Style
        ),
        At::Usemap => matches!(el, Img | Object),
        At::Value => matches!(
            el,
            Button | Data | Input | Li | Meter | Option | Param | Progress
        ),
        At::Width => matches!(el, Canvas | Embed | Iframe | Img | Input | Object | Video),
        At::Wrap => matches!(el, Textarea),

        // Globals and sentinels were handled above.
        _ => false,
    }
}

/// A basic structural check for element nesting, used when hierarchy
/// compliance is strict. Permissive by default; only the unambiguous rules
/// are encoded.
pub fn is_valid_child(parent: ElementType, child: ElementType) -> bool {
    use self::ElementType::*;

    if parent.structure() == TagStructure::Unpaired {
        return false;
    }

    match parent {
        Html => matches!(child, Head | Body | Frameset | Other),
        Head => {
            matches!(child, Other) || has_model(child, ContentModel::Metadata)
        },
        Table => matches!(
            child,
            Caption | Colgroup | Thead | Tbody | Tfoot | Tr | Script | Template | Form | Other
        ),
        Thead | Tbody | Tfoot => matches!(child, Tr | Script | Template | Other),
        Tr => matches!(child, Td | Th | Script | Template | Other),
        Colgroup => matches!(child, Col | Template),
        Select => matches!(child, Option | Optgroup | Hr | Script | Template),
        Optgroup => matches!(child, Option | Script | Template),
        Ol | Ul | Menu | Dir => matches!(child, Li | Script | Template | Other),
        Dl => matches!(child, Dt | Dd | Div | Script | Template | Other),
        _ => true,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn content_model_membership() {
        assert!(has_model(ElementType::Div, ContentModel::Flow));
        assert!(has_model(ElementType::Span, ContentModel::Phrasing));
        assert!(has_model(ElementType::H2, ContentModel::Heading));
        assert!(has_model(ElementType::Script, ContentModel::ScriptSupport));
        assert!(!has_model(ElementType::Td, ContentModel::Flow));
    }

    #[test]
    fn global_attributes_are_legal_everywhere() {
        assert!(attr_legal_on(AttributeType::Class, ElementType::P));
        assert!(attr_legal_on(AttributeType::DataX, ElementType::Td));
        assert!(attr_legal_on(AttributeType::Onclick, ElementType::Svg));
    }

    #[test]
    fn specific_attributes_have_affiliations() {
        assert!(attr_legal_on(AttributeType::Href, ElementType::A));
        assert!(!attr_legal_on(AttributeType::Href, ElementType::Div));
        assert!(attr_legal_on(AttributeType::Colspan, ElementType::Td));
        assert!(!attr_legal_on(AttributeType::Colspan, ElementType::P));
    }

    #[test]
    fn hierarchy_basics() {
        assert!(is_valid_child(ElementType::Tr, ElementType::Td));
        assert!(!is_valid_child(ElementType::Tr, ElementType::Div));
        assert!(!is_valid_child(ElementType::Br, ElementType::Span));
        assert!(is_valid_child(ElementType::Div, ElementType::Div));
    }
}
