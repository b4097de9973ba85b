// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The closed set of known attribute names, with the wildcard sentinels for
//! `data-*`, `aria-*` and `xmlns:*`, and the foreign (SVG/MathML/XLink)
//! attribute-name adjustments.

use phf::phf_map;

use crate::dom::namespace::Namespace;

/// A known attribute name. `data-*`, `aria-*` and `xmlns:*` map to their
/// wildcard sentinels; anything else unknown maps to [`AttributeType::Other`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum AttributeType {
    Other,
    /// Any `data-*` custom data attribute.
    DataX,
    /// Any `aria-*` accessibility attribute.
    AriaX,
    /// Any `xmlns:*` namespace declaration.
    XmlnsX,

    Accept, AcceptCharset, Accesskey, Action, Allow, Alt, Async,
    Autocomplete, Autofocus, Autoplay,
    Charset, Checked, Cite, Class, Cols, Colspan, Content, Contenteditable,
    Controls, Coords, Crossorigin,
    Data, Datetime, Decoding, Default, Defer, Dir, Dirname, Disabled,
    Download, Draggable,
    Enctype, Enterkeyhint,
    For, Form, Formaction, Formenctype, Formmethod, Formnovalidate,
    Formtarget,
    Headers, Height, Hidden, High, Href, Hreflang, HttpEquiv,
    Id, Inert, Inputmode, Integrity, Is, Ismap,
    Kind,
    Label, Lang, List, Loading, Loop, Low,
    Max, Maxlength, Media, Method, Min, Minlength, Multiple, Muted,
    Name, Nomodule, Nonce, Novalidate,
    Open, Optimum,
    Part, Pattern, Ping, Placeholder, Playsinline, Popover, Poster, Preload,
    Readonly, Referrerpolicy, Rel, Required, Reversed, Role, Rows, Rowspan,
    Sandbox, Scope, Selected, Shape, Size, Sizes, Slot, Span, Spellcheck,
    Src, Srcdoc, Srclang, Srcset, Start, Step, Style,
    Tabindex, Target, Title, Translate, Type,
    Usemap,
    Value,
    Width, Wrap,
    Xmlns,

    // Event handler content attributes; all global.
    Onabort, Onafterprint, Onbeforeprint, Onbeforeunload, Onblur, Oncanplay,
    Oncanplaythrough, Onchange, Onclick, Oncontextmenu, Oncopy, Oncuechange,
    Oncut, Ondblclick, Ondrag, Ondragend, Ondragenter, Ondragleave,
    Ondragover, Ondragstart, Ondrop, Ondurationchange, Onemptied, Onended,
    Onerror, Onfocus, Onhashchange, Oninput, Oninvalid, Onkeydown,
    Onkeypress, Onkeyup, Onload, Onloadeddata, Onloadedmetadata, Onloadstart,
    Onmousedown, Onmousemove, Onmouseout, Onmouseover, Onmouseup,
    Onmousewheel, Onoffline, Ononline, Onpagehide, Onpageshow, Onpaste,
    Onpause, Onplay, Onplaying, Onpopstate, Onprogress, Onratechange,
    Onreset, Onresize, Onscroll, Onsearch, Onseeked, Onseeking, Onselect,
    Onstalled, Onstorage, Onsubmit, Onsuspend, Ontimeupdate, Ontoggle,
    Onunload, Onvolumechange, Onwaiting, Onwheel,
}

static ATTRIBUTES: phf::Map<&'static str, AttributeType> = phf_map! {
    "accept" => AttributeType::Accept,
    "accept-charset" => AttributeType::AcceptCharset,
    "accesskey" => AttributeType::Accesskey,
    "action" => AttributeType::Action,
    "allow" => AttributeType::Allow,
    "alt" => AttributeType::Alt,
    "async" => AttributeType::Async,
    "autocomplete" => AttributeType::Autocomplete,
    "autofocus" => AttributeType::Autofocus,
    "autoplay" => AttributeType::Autoplay,
    "charset" => AttributeType::Charset,
    "checked" => AttributeType::Checked,
    "cite" => AttributeType::Cite,
    "class" => AttributeType::Class,
    "cols" => AttributeType::Cols,
    "colspan" => AttributeType::Colspan,
    "content" => AttributeType::Content,
    "contenteditable" => AttributeType::Contenteditable,
    "controls" => AttributeType::Controls,
    "coords" => AttributeType::Coords,
    "crossorigin" => AttributeType::Crossorigin,
    "data" => AttributeType::Data,
    "datetime" => AttributeType::Datetime,
    "decoding" => AttributeType::Decoding,
    "default" => AttributeType::Default,
    "defer" => AttributeType::Defer,
    "dir" => AttributeType::Dir,
    "dirname" => AttributeType::Dirname,
    "disabled" => AttributeType::Disabled,
    "download" => AttributeType::Download,
    "draggable" => AttributeType::Draggable,
    "enctype" => AttributeType::Enctype,
    "enterkeyhint" => AttributeType::Enterkeyhint,
    "for" => AttributeType::For,
    "form" => AttributeType::Form,
    "formaction" => AttributeType::Formaction,
    "formenctype" => AttributeType::Formenctype,
    "formmethod" => AttributeType::Formmethod,
    "formnovalidate" => AttributeType::Formnovalidate,
    "formtarget" => AttributeType::Formtarget,
    "headers" => AttributeType::Headers,
    "height" => AttributeType::Height,
    "hidden" => AttributeType::Hidden,
    "high" => AttributeType::High,
    "href" => AttributeType::Href,
    "hreflang" => AttributeType::Hreflang,
    "http-equiv" => AttributeType::HttpEquiv,
    "id" => AttributeType::Id,
    "inert" => AttributeType::Inert,
    "inputmode" => AttributeType::Inputmode,
    "integrity" => AttributeType::Integrity,
    "is" => AttributeType::Is,
    "ismap" => AttributeType::Ismap,
    "kind" => AttributeType::Kind,
    "label" => AttributeType::Label,
    "lang" => AttributeType::Lang,
    "list" => AttributeType::List,
    "loading" => AttributeType::Loading,
    "loop" => AttributeType::Loop,
    "low" => AttributeType::Low,
    "max" => AttributeType::Max,
    "maxlength" => AttributeType::Maxlength,
    "media" => AttributeType::Media,
    "method" => AttributeType::Method,
    "min" => AttributeType::Min,
    "minlength" => AttributeType::Minlength,
    "multiple" => AttributeType::Multiple,
    "muted" => AttributeType::Muted,
    "name" => AttributeType::Name,
    "nomodule" => AttributeType::Nomodule,
    "nonce" => AttributeType::Nonce,
    "novalidate" => AttributeType::Novalidate,
    "open" => AttributeType::Open,
    "optimum" => AttributeType::Optimum,
    "part" => AttributeType::Part,
    "pattern" => AttributeType::Pattern,
    "ping" => AttributeType::Ping,
    "placeholder" => AttributeType::Placeholder,
    "playsinline" => AttributeType::Playsinline,
    "popover" => AttributeType::Popover,
    "poster" => AttributeType::Poster,
    "preload" => AttributeType::Preload,
    "readonly" => AttributeType::Readonly,
    "referrerpolicy" => AttributeType::Referrerpolicy,
    "rel" => AttributeType::Rel,
    "required" => AttributeType::Required,
    "reversed" => AttributeType::Reversed,
    "role" => AttributeType::Role,
    "rows" => AttributeType::Rows,
    "rowspan" => AttributeType::Rowspan,
    "sandbox" => AttributeType::Sandbox,
    "scope" => AttributeType::Scope,
    "selected" => AttributeType::Selected,
    "shape" => AttributeType::Shape,
    "size" => AttributeType::Size,
    "sizes" => AttributeType::Sizes,
    "slot" => AttributeType::Slot,
    "span" => AttributeType::Span,
    "spellcheck" => AttributeType::Spellcheck,
    "src" => AttributeType::Src,
    "srcdoc" => AttributeType::Srcdoc,
    "srclang" => AttributeType::Srclang,
    "srcset" => AttributeType::Srcset,
    "start" => AttributeType::Start,
    "step" => AttributeType::Step,
    "style" => AttributeType::Style,
    "tabindex" => AttributeType::Tabindex,
    "target" => AttributeType::Target,
    "title" => AttributeType::Title,
    "translate" => AttributeType::Translate,
    "type" => AttributeType::Type,
    "usemap" => AttributeType::Usemap,
    "value" => AttributeType::Value,
    "width" => AttributeType::Width,
    "wrap" => AttributeType::Wrap,
    "xmlns" => AttributeType::Xmlns,
    "onabort" => AttributeType::Onabort,
    "onafterprint" => AttributeType::Onafterprint,
    "onbeforeprint" => AttributeType::Onbeforeprint,
    "onbeforeunload" => AttributeType::Onbeforeunload,
    "onblur" => AttributeType::Onblur,
    "oncanplay" => AttributeType::Oncanplay,
    "oncanplaythrough" => AttributeType::Oncanplaythrough,
    "onchange" => AttributeType::Onchange,
    "onclick" => AttributeType::Onclick,
    "oncontextmenu" => AttributeType::Oncontextmenu,
    "oncopy" => AttributeType::Oncopy,
    "oncuechange" => AttributeType::Oncuechange,
    "oncut" => AttributeType::Oncut,
    "ondblclick" => AttributeType::Ondblclick,
    "ondrag" => AttributeType::Ondrag,
    "ondragend" => AttributeType::Ondragend,
    "ondragenter" => AttributeType::Ondragenter,
    "ondragleave" => AttributeType::Ondragleave,
    "ondragover" => AttributeType::Ondragover,
    "ondragstart" => AttributeType::Ondragstart,
    "ondrop" => AttributeType::Ondrop,
    "ondurationchange" => AttributeType::Ondurationchange,
    "onemptied" => AttributeType::Onemptied,
    "onended" => AttributeType::Onended,
    "onerror" => AttributeType::Onerror,
    "onfocus" => AttributeType::Onfocus,
    "onhashchange" => AttributeType::Onhashchange,
    "oninput" => AttributeType::Oninput,
    "oninvalid" => AttributeType::Oninvalid,
    "onkeydown" => AttributeType::Onkeydown,
    "onkeypress" => AttributeType::Onkeypress,
    "onkeyup" => AttributeType::Onkeyup,
    "onload" => AttributeType::Onload,
    "onloadeddata" => AttributeType::Onloadeddata,
    "onloadedmetadata" => AttributeType::Onloadedmetadata,
    "onloadstart" => AttributeType::Onloadstart,
    "onmousedown" => AttributeType::Onmousedown,
    "onmousemove" => AttributeType::Onmousemove,
    "onmouseout" => AttributeType::Onmouseout,
    "onmouseover" => AttributeType::Onmouseover,
    "onmouseup" => AttributeType::Onmouseup,
    "onmousewheel" => AttributeType::Onmousewheel,
    "onoffline" => AttributeType::Onoffline,
    "ononline" => AttributeType::Ononline,
    "onpagehide" => AttributeType::Onpagehide,
    "onpageshow" => AttributeType::Onpageshow,
    "onpaste" => AttributeType::Onpaste,
    "onpause" => AttributeType::Onpause,
    "onplay" => AttributeType::Onplay,
    "onplaying" => AttributeType::Onplaying,
    "onpopstate" => AttributeType::Onpopstate,
    "onprogress" => AttributeType::Onprogress,
    "onratechange" => AttributeType::Onratechange,
    "onreset" => AttributeType::Onreset,
    "onresize" => AttributeType::Onresize,
    "onscroll" => AttributeType::Onscroll,
    "onsearch" => AttributeType::Onsearch,
    "onseeked" => AttributeType::Onseeked,
    "onseeking" => AttributeType::Onseeking,
    "onselect" => AttributeType::Onselect,
    "onstalled" => AttributeType::Onstalled,
    "onstorage" => AttributeType::Onstorage,
    "onsubmit" => AttributeType::Onsubmit,
    "onsuspend" => AttributeType::Onsuspend,
    "ontimeupdate" => AttributeType::Ontimeupdate,
    "ontoggle" => AttributeType::Ontoggle,
    "onunload" => AttributeType::Onunload,
    "onvolumechange" => AttributeType::Onvolumechange,
    "onwaiting" => AttributeType::Onwaiting,
    "onwheel" => AttributeType::Onwheel,
};

impl AttributeType {
    /// Look up an attribute name. HTML matching is ASCII case-insensitive;
    /// `data-*`, `aria-*` and `xmlns:*` resolve to their sentinels.
    pub fn from_name(name: &str) -> AttributeType {
        if let Some(&a) = ATTRIBUTES.get(name) {
            return a;
        }
        let lower;
        let name = if name.bytes().any(|b| b.is_ascii_uppercase()) {
            lower = name.to_ascii_lowercase();
            if let Some(&a) = ATTRIBUTES.get(lower.as_str()) {
                return a;
            }
            lower.as_str()
        } else {
            name
        };
        if name.starts_with("data-") {
            AttributeType::DataX
        } else if name.starts_with("aria-") {
            AttributeType::AriaX
        } else if name.starts_with("xmlns:") {
            AttributeType::XmlnsX
        } else {
            AttributeType::Other
        }
    }

    /// Is this attribute global, i.e. legal on every element?
    pub fn is_global(self) -> bool {
        use self::AttributeType::*;
        match self {
            DataX | AriaX | Accesskey | Autofocus | Class | Contenteditable | Dir | Draggable
            | Enterkeyhint | Hidden | Id | Inert | Inputmode | Is | Lang | Nonce | Part
            | Popover | Role | Slot | Spellcheck | Style | Tabindex | Title | Translate => true,
            // All event handler content attributes are global.
            Onabort | Onafterprint | Onbeforeprint | Onbeforeunload | Onblur | Oncanplay
            | Oncanplaythrough | Onchange | Onclick | Oncontextmenu | Oncopy | Oncuechange
            | Oncut | Ondblclick | Ondrag | Ondragend | Ondragenter | Ondragleave | Ondragover
            | Ondragstart | Ondrop | Ondurationchange | Onemptied | Onended | Onerror
            | Onfocus | Onhashchange | Oninput | Oninvalid | Onkeydown | Onkeypress | Onkeyup
            | Onload | Onloadeddata | Onloadedmetadata | Onloadstart | Onmousedown
            | Onmousemove | Onmouseout | Onmouseover | Onmouseup | Onmousewheel | Onoffline
            | Ononline | Onpagehide | Onpageshow | Onpaste | Onpause | Onplay | Onplaying
            | Onpopstate | Onprogress | Onratechange | Onreset | Onresize | Onscroll
            | Onsearch | Onseeked | Onseeking | Onselect | Onstalled | Onstorage | Onsubmit
            | Onsuspend | Ontimeupdate | Ontoggle | Onunload | Onvolumechange | Onwaiting
            | Onwheel => true,
            _ => false,
        }
    }
}

/// A replacement qualified name produced by the foreign attribute-name
/// adjustments.
#[derive(Clone, Copy, Debug)]
pub struct AdjustedAttrName {
    pub prefix: Option<&'static str>,
    pub ns: Namespace,
    pub local: &'static str,
}

const fn plain(local: &'static str) -> AdjustedAttrName {
    AdjustedAttrName {
        prefix: None,
        ns: Namespace::None,
        local,
    }
}

/// SVG attribute case adjustments, applied inside SVG content.
static SVG_ATTR_ADJUSTMENTS: phf::Map<&'static str, AdjustedAttrName> = phf_map! {
    "attributename" => plain("attributeName"),
    "attributetype" => plain("attributeType"),
    "basefrequency" => plain("baseFrequency"),
    "baseprofile" => plain("baseProfile"),
    "calcmode" => plain("calcMode"),
    "clippathunits" => plain("clipPathUnits"),
    "diffuseconstant" => plain("diffuseConstant"),
    "edgemode" => plain("edgeMode"),
    "filterunits" => plain("filterUnits"),
    "glyphref" => plain("glyphRef"),
    "gradienttransform" => plain("gradientTransform"),
    "gradientunits" => plain("gradientUnits"),
    "kernelmatrix" => plain("kernelMatrix"),
    "kernelunitlength" => plain("kernelUnitLength"),
    "keypoints" => plain("keyPoints"),
    "keysplines" => plain("keySplines"),
    "keytimes" => plain("keyTimes"),
    "lengthadjust" => plain("lengthAdjust"),
    "limitingconeangle" => plain("limitingConeAngle"),
    "markerheight" => plain("markerHeight"),
    "markerunits" => plain("markerUnits"),
    "markerwidth" => plain("markerWidth"),
    "maskcontentunits" => plain("maskContentUnits"),
    "maskunits" => plain("maskUnits"),
    "numoctaves" => plain("numOctaves"),
    "pathlength" => plain("pathLength"),
    "patterncontentunits" => plain("patternContentUnits"),
    "patterntransform" => plain("patternTransform"),
    "patternunits" => plain("patternUnits"),
    "pointsatx" => plain("pointsAtX"),
    "pointsaty" => plain("pointsAtY"),
    "pointsatz" => plain("pointsAtZ"),
    "preservealpha" => plain("preserveAlpha"),
    "preserveaspectratio" => plain("preserveAspectRatio"),
    "primitiveunits" => plain("primitiveUnits"),
    "refx" => plain("refX"),
    "refy" => plain("refY"),
    "repeatcount" => plain("repeatCount"),
    "repeatdur" => plain("repeatDur"),
    "requiredextensions" => plain("requiredExtensions"),
    "requiredfeatures" => plain("requiredFeatures"),
    "specularconstant" => plain("specularConstant"),
    "specularexponent" => plain("specularExponent"),
    "spreadmethod" => plain("spreadMethod"),
    "startoffset" => plain("startOffset"),
    "stddeviation" => plain("stdDeviation"),
    "stitchtiles" => plain("stitchTiles"),
    "surfacescale" => plain("surfaceScale"),
    "systemlanguage" => plain("systemLanguage"),
    "tablevalues" => plain("tableValues"),
    "targetx" => plain("targetX"),
    "targety" => plain("targetY"),
    "textlength" => plain("textLength"),
    "viewbox" => plain("viewBox"),
    "viewtarget" => plain("viewTarget"),
    "xchannelselector" => plain("xChannelSelector"),
    "ychannelselector" => plain("yChannelSelector"),
    "zoomandpan" => plain("zoomAndPan"),
};

/// MathML attribute case adjustments, applied inside MathML content.
static MATHML_ATTR_ADJUSTMENTS: phf::Map<&'static str, AdjustedAttrName> = phf_map! {
    "definitionurl" => plain("definitionURL"),
};

/// The foreign-attribute adjustments, applied inside all foreign content,
/// which move the XLink/XML/XMLNS attributes into their namespaces.
static FOREIGN_ATTR_ADJUSTMENTS: phf::Map<&'static str, AdjustedAttrName> = phf_map! {
    "xlink:actuate" => AdjustedAttrName { prefix: Some("xlink"), ns: Namespace::XLink, local: "actuate" },
    "xlink:arcrole" => AdjustedAttrName { prefix: Some("xlink"), ns: Namespace::XLink, local: "arcrole" },
    "xlink:href" => AdjustedAttrName { prefix: Some("xlink"), ns: Namespace::XLink, local: "href" },
    "xlink:role" => AdjustedAttrName { prefix: Some("xlink"), ns: Namespace::XLink, local: "role" },
    "xlink:show" => AdjustedAttrName { prefix: Some("xlink"), ns: Namespace::XLink, local: "show" },
    "xlink:title" => AdjustedAttrName { prefix: Some("xlink"), ns: Namespace::XLink, local: "title" },
    "xlink:type" => AdjustedAttrName { prefix: Some("xlink"), ns: Namespace::XLink, local: "type" },
    "xml:lang" => AdjustedAttrName { prefix: Some("xml"), ns: Namespace::Xml, local: "lang" },
    "xml:space" => AdjustedAttrName { prefix: Some("xml"), ns: Namespace::Xml, local: "space" },
    "xmlns" => AdjustedAttrName { prefix: None, ns: Namespace::Xmlns, local: "xmlns" },
    "xmlns:xlink" => AdjustedAttrName { prefix: Some("xmlns"), ns: Namespace::Xmlns, local: "xlink" },
};

pub fn svg_adjust_attr_name(name: &str) -> Option<AdjustedAttrName> {
    SVG_ATTR_ADJUSTMENTS.get(name).copied()
}

pub fn mathml_adjust_attr_name(name: &str) -> Option<AdjustedAttrName> {
    MATHML_ATTR_ADJUSTMENTS.get(name).copied()
}

pub fn foreign_adjust_attr_name(name: &str) -> Option<AdjustedAttrName> {
    FOREIGN_ATTR_ADJUSTMENTS.get(name).copied()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wildcard_sentinels() {
        assert_eq!(AttributeType::from_name("data-n"), AttributeType::DataX);
        assert_eq!(
            AttributeType::from_name("aria-hidden"),
            AttributeType::AriaX
        );
        assert_eq!(
            AttributeType::from_name("xmlns:xlink"),
            AttributeType::XmlnsX
        );
        assert_eq!(AttributeType::from_name("xmlns"), AttributeType::Xmlns);
        assert_eq!(AttributeType::from_name("blorp"), AttributeType::Other);
    }

    #[test]
    fn html_lookup_is_case_insensitive() {
        assert_eq!(AttributeType::from_name("CLASS"), AttributeType::Class);
        assert_eq!(
            AttributeType::from_name("HTTP-EQUIV"),
            AttributeType::HttpEquiv
        );
    }

    #[test]
    fn foreign_adjustments() {
        let adj = foreign_adjust_attr_name("xlink:href").unwrap();
        assert_eq!(adj.prefix, Some("xlink"));
        assert_eq!(adj.ns, Namespace::XLink);
        assert_eq!(adj.local, "href");

        let adj = svg_adjust_attr_name("viewbox").unwrap();
        assert_eq!(adj.local, "viewBox");
        assert_eq!(adj.ns, Namespace::None);
    }
}
