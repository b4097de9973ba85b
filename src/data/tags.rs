// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The closed set of known element types across the HTML, MathML and SVG
//! namespaces, with the per-namespace name tables and the SVG tag-name case
//! adjustments.

use phf::phf_map;

/// Whether a tag takes an end tag or stands alone.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TagStructure {
    /// Open and closing tag pair.
    Paired,
    /// Single void tag; an end tag is forbidden.
    Unpaired,
}

/// A known element type. Elements whose tag name is not in any table are
/// given the [`ElementType::Other`] sentinel and keep their literal name.
///
/// The HTML section includes the deprecated elements the parsing rules must
/// still special-case (`applet`, `frameset`, `nobr`, ...). Elements that
/// exist with the same name in more than one namespace (`a`, `script`,
/// `style`, `title`, `image`) share one variant; the owning namespace lives
/// on the element, not here.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum ElementType {
    /// Not in the known set; the element keeps its literal tag name.
    Other,

    // HTML
    A, Abbr, Address, Applet, Area, Article, Aside, Audio,
    B, Base, Basefont, Bdi, Bdo, Bgsound, Big, Blockquote, Body, Br, Button,
    Canvas, Caption, Center, Cite, Code, Col, Colgroup,
    Data, Datalist, Dd, Del, Details, Dfn, Dialog, Dir, Div, Dl, Dt,
    Em, Embed,
    Fieldset, Figcaption, Figure, Font, Footer, Form, Frame, Frameset,
    H1, H2, H3, H4, H5, H6, Head, Header, Hgroup, Hr, Html,
    I, Iframe, Image, Img, Input, Ins,
    Kbd, Keygen,
    Label, Legend, Li, Link, Listing,
    Main, Map, Mark, Marquee, Menu, Menuitem, Meta, Meter,
    Nav, Nobr, Noembed, Noframes, Noscript,
    Object, Ol, Optgroup, Option, Output,
    P, Param, Picture, Plaintext, Pre, Progress,
    Q,
    Rb, Rp, Rt, Rtc, Ruby,
    S, Samp, Script, Search, Section, Select, Slot, Small, Source, Span,
    Strike, Strong, Style, Sub, Summary, Sup,
    Table, Tbody, Td, Template, Textarea, Tfoot, Th, Thead, Time, Title,
    Tr, Track, Tt,
    U, Ul,
    Var, Video,
    Wbr,
    Xmp,

    // MathML
    Math,
    Maction, Maligngroup, Malignmark, Menclose, Merror, Mfenced, Mfrac,
    Mglyph, Mi, Mlabeledtr, Mlongdiv, Mmultiscripts, Mn, Mo, Mover, Mpadded,
    Mphantom, Mroot, Mrow, Ms, Mscarries, Mscarry, Msgroup, Msline, Mspace,
    Msqrt, Msrow, Mstack, Mstyle, Msub, Msubsup, Msup, Mtable, Mtd, Mtext,
    Mtr, Munder, Munderover,
    Semantics, Annotation, AnnotationXml,

    // SVG
    Svg,
    AltGlyph, AltGlyphDef, AltGlyphItem, Animate, AnimateColor,
    AnimateMotion, AnimateTransform,
    Circle, ClipPath, ColorProfile,
    Defs, Desc, Discard,
    Ellipse,
    FeBlend, FeColorMatrix, FeComponentTransfer, FeComposite,
    FeConvolveMatrix, FeDiffuseLighting, FeDisplacementMap, FeDistantLight,
    FeDropShadow, FeFlood, FeFuncA, FeFuncB, FeFuncG, FeFuncR,
    FeGaussianBlur, FeImage, FeMerge, FeMergeNode, FeMorphology, FeOffset,
    FePointLight, FeSpecularLighting, FeSpotLight, FeTile, FeTurbulence,
    Filter, ForeignObject,
    G, GlyphRef,
    Line, LinearGradient,
    Marker, Mask, Metadata, Mpath,
    Path, Pattern, Polygon, Polyline,
    RadialGradient, Rect,
    Set, Stop, Switch, Symbol,
    Text, TextPath, Tspan,
    Use, View,
}

/// HTML tag names, lowercase, to element types.
static HTML_TAGS: phf::Map<&'static str, ElementType> = phf_map! {
    "a" => ElementType::A,
    "abbr" => ElementType::Abbr,
    "address" => ElementType::Address,
    "applet" => ElementType::Applet,
    "area" => ElementType::Area,
    "article" => ElementType::Article,
    "aside" => ElementType::Aside,
    "audio" => ElementType::Audio,
    "b" => ElementType::B,
    "base" => ElementType::Base,
    "basefont" => ElementType::Basefont,
    "bdi" => ElementType::Bdi,
    "bdo" => ElementType::Bdo,
    "bgsound" => ElementType::Bgsound,
    "big" => ElementType::Big,
    "blockquote" => ElementType::Blockquote,
    "body" => ElementType::Body,
    "br" => ElementType::Br,
    "button" => ElementType::Button,
    "canvas" => ElementType::Canvas,
    "caption" => ElementType::Caption,
    "center" => ElementType::Center,
    "cite" => ElementType::Cite,
    "code" => ElementType::Code,
    "col" => ElementType::Col,
    "colgroup" => ElementType::Colgroup,
    "data" => ElementType::Data,
    "datalist" => ElementType::Datalist,
    "dd" => ElementType::Dd,
    "del" => ElementType::Del,
    "details" => ElementType::Details,
    "dfn" => ElementType::Dfn,
    "dialog" => ElementType::Dialog,
    "dir" => ElementType::Dir,
    "div" => ElementType::Div,
    "dl" => ElementType::Dl,
    "dt" => ElementType::Dt,
    "em" => ElementType::Em,
    "embed" => ElementType::Embed,
    "fieldset" => ElementType::Fieldset,
    "figcaption" => ElementType::Figcaption,
    "figure" => ElementType::Figure,
    "font" => ElementType::Font,
    "footer" => ElementType::Footer,
    "form" => ElementType::Form,
    "frame" => ElementType::Frame,
    "frameset" => ElementType::Frameset,
    "h1" => ElementType::H1,
    "h2" => ElementType::H2,
    "h3" => ElementType::H3,
    "h4" => ElementType::H4,
    "h5" => ElementType::H5,
    "h6" => ElementType::H6,
    "head" => ElementType::Head,
    "header" => ElementType::Header,
    "hgroup" => ElementType::Hgroup,
    "hr" => ElementType::Hr,
    "html" => ElementType::Html,
    "i" => ElementType::I,
    "iframe" => ElementType::Iframe,
    "image" => ElementType::Image,
    "img" => ElementType::Img,
    "input" => ElementType::Input,
    "ins" => ElementType::Ins,
    "kbd" => ElementType::Kbd,
    "keygen" => ElementType::Keygen,
    "label" => ElementType::Label,
    "legend" => ElementType::Legend,
    "li" => ElementType::Li,
    "link" => ElementType::Link,
    "listing" => ElementType::Listing,
    "main" => ElementType::Main,
    "map" => ElementType::Map,
    "mark" => ElementType::Mark,
    "marquee" => ElementType::Marquee,
    "menu" => ElementType::Menu,
    "menuitem" => ElementType::Menuitem,
    "meta" => ElementType::Meta,
    "meter" => ElementType::Meter,
    "nav" => ElementType::Nav,
    "nobr" => ElementType::Nobr,
    "noembed" => ElementType::Noembed,
    "noframes" => ElementType::Noframes,
    "noscript" => ElementType::Noscript,
    "object" => ElementType::Object,
    "ol" => ElementType::Ol,
    "optgroup" => ElementType::Optgroup,
    "option" => ElementType::Option,
    "output" => ElementType::Output,
    "p" => ElementType::P,
    "param" => ElementType::Param,
    "picture" => ElementType::Picture,
    "plaintext" => ElementType::Plaintext,
    "pre" => ElementType::Pre,
    "progress" => ElementType::Progress,
    "q" => ElementType::Q,
    "rb" => ElementType::Rb,
    "rp" => ElementType::Rp,
    "rt" => ElementType::Rt,
    "rtc" => ElementType::Rtc,
    "ruby" => ElementType::Ruby,
    "s" => ElementType::S,
    "samp" => ElementType::Samp,
    "script" => ElementType::Script,
    "search" => ElementType::Search,
    "section" => ElementType::Section,
    "select" => ElementType::Select,
    "slot" => ElementType::Slot,
    "small" => ElementType::Small,
    "source" => ElementType::Source,
    "span" => ElementType::Span,
    "strike" => ElementType::Strike,
    "strong" => ElementType::Strong,
    "style" => ElementType::Style,
    "sub" => ElementType::Sub,
    "summary" => ElementType::Summary,
    "sup" => ElementType::Sup,
    "table" => ElementType::Table,
    "tbody" => ElementType::Tbody,
    "td" => ElementType::Td,
    "template" => ElementType::Template,
    "textarea" => ElementType::Textarea,
    "tfoot" => ElementType::Tfoot,
    "th" => ElementType::Th,
    "thead" => ElementType::Thead,
    "time" => ElementType::Time,
    "title" => ElementType::Title,
    "tr" => ElementType::Tr,
    "track" => ElementType::Track,
    "tt" => ElementType::Tt,
    "u" => ElementType::U,
    "ul" => ElementType::Ul,
    "var" => ElementType::Var,
    "video" => ElementType::Video,
    "wbr" => ElementType::Wbr,
    "xmp" => ElementType::Xmp,
};

/// MathML tag names (case-sensitive) to element types.
static MATHML_TAGS: phf::Map<&'static str, ElementType> = phf_map! {
    "math" => ElementType::Math,
    "maction" => ElementType::Maction,
    "maligngroup" => ElementType::Maligngroup,
    "malignmark" => ElementType::Malignmark,
    "menclose" => ElementType::Menclose,
    "merror" => ElementType::Merror,
    "mfenced" => ElementType::Mfenced,
    "mfrac" => ElementType::Mfrac,
    "mglyph" => ElementType::Mglyph,
    "mi" => ElementType::Mi,
    "mlabeledtr" => ElementType::Mlabeledtr,
    "mlongdiv" => ElementType::Mlongdiv,
    "mmultiscripts" => ElementType::Mmultiscripts,
    "mn" => ElementType::Mn,
    "mo" => ElementType::Mo,
    "mover" => ElementType::Mover,
    "mpadded" => ElementType::Mpadded,
    "mphantom" => ElementType::Mphantom,
    "mroot" => ElementType::Mroot,
    "mrow" => ElementType::Mrow,
    "ms" => ElementType::Ms,
    "mscarries" => ElementType::Mscarries,
    "mscarry" => ElementType::Mscarry,
    "msgroup" => ElementType::Msgroup,
    "msline" => ElementType::Msline,
    "mspace" => ElementType::Mspace,
    "msqrt" => ElementType::Msqrt,
    "msrow" => ElementType::Msrow,
    "mstack" => ElementType::Mstack,
    "mstyle" => ElementType::Mstyle,
    "msub" => ElementType::Msub,
    "msubsup" => ElementType::Msubsup,
    "msup" => ElementType::Msup,
    "mtable" => ElementType::Mtable,
    "mtd" => ElementType::Mtd,
    "mtext" => ElementType::Mtext,
    "mtr" => ElementType::Mtr,
    "munder" => ElementType::Munder,
    "munderover" => ElementType::Munderover,
    "semantics" => ElementType::Semantics,
    "annotation" => ElementType::Annotation,
    "annotation-xml" => ElementType::AnnotationXml,
};

/// SVG tag names in canonical (case-adjusted) spelling to element types.
static SVG_TAGS: phf::Map<&'static str, ElementType> = phf_map! {
    "svg" => ElementType::Svg,
    "a" => ElementType::A,
    "altGlyph" => ElementType::AltGlyph,
    "altGlyphDef" => ElementType::AltGlyphDef,
    "altGlyphItem" => ElementType::AltGlyphItem,
    "animate" => ElementType::Animate,
    "animateColor" => ElementType::AnimateColor,
    "animateMotion" => ElementType::AnimateMotion,
    "animateTransform" => ElementType::AnimateTransform,
    "circle" => ElementType::Circle,
    "clipPath" => ElementType::ClipPath,
    "color-profile" => ElementType::ColorProfile,
    "defs" => ElementType::Defs,
    "desc" => ElementType::Desc,
    "discard" => ElementType::Discard,
    "ellipse" => ElementType::Ellipse,
    "feBlend" => ElementType::FeBlend,
    "feColorMatrix" => ElementType::FeColorMatrix,
    "feComponentTransfer" => ElementType::FeComponentTransfer,
    "feComposite" => ElementType::FeComposite,
    "feConvolveMatrix" => ElementType::FeConvolveMatrix,
    "feDiffuseLighting" => ElementType::FeDiffuseLighting,
    "feDisplacementMap" => ElementType::FeDisplacementMap,
    "feDistantLight" => ElementType::FeDistantLight,
    "feDropShadow" => ElementType::FeDropShadow,
    "feFlood" => ElementType::FeFlood,
    "feFuncA" => ElementType::FeFuncA,
    "feFuncB" => ElementType::FeFuncB,
    "feFuncG" => ElementType::FeFuncG,
    "feFuncR" => ElementType::FeFuncR,
    "feGaussianBlur" => ElementType::FeGaussianBlur,
    "feImage" => ElementType::FeImage,
    "feMerge" => ElementType::FeMerge,
    "feMergeNode" => ElementType::FeMergeNode,
    "feMorphology" => ElementType::FeMorphology,
    "feOffset" => ElementType::FeOffset,
    "fePointLight" => ElementType::FePointLight,
    "feSpecularLighting" => ElementType::FeSpecularLighting,
    "feSpotLight" => ElementType::FeSpotLight,
    "feTile" => ElementType::FeTile,
    "feTurbulence" => ElementType::FeTurbulence,
    "filter" => ElementType::Filter,
    "foreignObject" => ElementType::ForeignObject,
    "g" => ElementType::G,
    "glyphRef" => ElementType::GlyphRef,
    "image" => ElementType::Image,
    "line" => ElementType::Line,
    "linearGradient" => ElementType::LinearGradient,
    "marker" => ElementType::Marker,
    "mask" => ElementType::Mask,
    "metadata" => ElementType::Metadata,
    "mpath" => ElementType::Mpath,
    "path" => ElementType::Path,
    "pattern" => ElementType::Pattern,
    "polygon" => ElementType::Polygon,
    "polyline" => ElementType::Polyline,
    "radialGradient" => ElementType::RadialGradient,
    "rect" => ElementType::Rect,
    "script" => ElementType::Script,
    "set" => ElementType::Set,
    "stop" => ElementType::Stop,
    "style" => ElementType::Style,
    "switch" => ElementType::Switch,
    "symbol" => ElementType::Symbol,
    "text" => ElementType::Text,
    "textPath" => ElementType::TextPath,
    "title" => ElementType::Title,
    "tspan" => ElementType::Tspan,
    "use" => ElementType::Use,
    "view" => ElementType::View,
};

/// The fixed SVG tag-name case adjustments: lowercased input spelling to
/// canonical camelCase spelling.
static SVG_TAG_ADJUSTMENTS: phf::Map<&'static str, &'static str> = phf_map! {
    "altglyph" => "altGlyph",
    "altglyphdef" => "altGlyphDef",
    "altglyphitem" => "altGlyphItem",
    "animatecolor" => "animateColor",
    "animatemotion" => "animateMotion",
    "animatetransform" => "animateTransform",
    "clippath" => "clipPath",
    "feblend" => "feBlend",
    "fecolormatrix" => "feColorMatrix",
    "fecomponenttransfer" => "feComponentTransfer",
    "fecomposite" => "feComposite",
    "feconvolvematrix" => "feConvolveMatrix",
    "fediffuselighting" => "feDiffuseLighting",
    "fedisplacementmap" => "feDisplacementMap",
    "fedistantlight" => "feDistantLight",
    "fedropshadow" => "feDropShadow",
    "feflood" => "feFlood",
    "fefunca" => "feFuncA",
    "fefuncb" => "feFuncB",
    "fefuncg" => "feFuncG",
    "fefuncr" => "feFuncR",
    "fegaussianblur" => "feGaussianBlur",
    "feimage" => "feImage",
    "femerge" => "feMerge",
    "femergenode" => "feMergeNode",
    "femorphology" => "feMorphology",
    "feoffset" => "feOffset",
    "fepointlight" => "fePointLight",
    "fespecularlighting" => "feSpecularLighting",
    "fespotlight" => "feSpotLight",
    "fetile" => "feTile",
    "feturbulence" => "feTurbulence",
    "foreignobject" => "foreignObject",
    "glyphref" => "glyphRef",
    "lineargradient" => "linearGradient",
    "radialgradient" => "radialGradient",
    "textpath" => "textPath",
};

/// Apply the SVG tag-name case adjustment. Idempotent: a name that is
/// already canonical is returned unchanged.
pub fn svg_adjust_tag_name(name: &str) -> Option<&'static str> {
    SVG_TAG_ADJUSTMENTS.get(name).copied()
}

impl ElementType {
    /// Look up an HTML tag name. Matching is ASCII case-insensitive; the
    /// tokenizer already lowercases, so the common path does no allocation.
    pub fn from_html_name(name: &str) -> Option<ElementType> {
        if let Some(&t) = HTML_TAGS.get(name) {
            return Some(t);
        }
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            HTML_TAGS.get(name.to_ascii_lowercase().as_str()).copied()
        } else {
            None
        }
    }

    /// Look up a MathML tag name (case-sensitive).
    pub fn from_mathml_name(name: &str) -> Option<ElementType> {
        MATHML_TAGS.get(name).copied()
    }

    /// Look up an SVG tag name in its canonical (already case-adjusted)
    /// spelling. Case-sensitive.
    pub fn from_svg_name(name: &str) -> Option<ElementType> {
        SVG_TAGS.get(name).copied()
    }

    /// The canonical spelling: lowercase for HTML and MathML (except
    /// `annotation-xml`), camelCase for the SVG names that have one.
    pub fn canonical_name(self) -> &'static str {
        use self::ElementType::*;
        match self {
            Other => "",
            A => "a",
            Abbr => "abbr",
            Address => "address",
            Applet => "applet",
            Area => "area",
            Article => "article",
            Aside => "aside",
            Audio => "audio",
            B => "b",
            Base => "base",
            Basefont => "basefont",
            Bdi => "bdi",
            Bdo => "bdo",
            Bgsound => "bgsound",
            Big => "big",
            Blockquote => "blockquote",
            Body => "body",
            Br => "br",
            Button => "button",
            Canvas => "canvas",
            Caption => "caption",
            Center => "center",
            Cite => "cite",
            Code => "code",
            Col => "col",
            Colgroup => "colgroup",
            Data => "data",
            Datalist => "datalist",
            Dd => "dd",
            Del => "del",
            Details => "details",
            Dfn => "dfn",
            Dialog => "dialog",
            Dir => "dir",
            Div => "div",
            Dl => "dl",
            Dt => "dt",
            Em => "em",
            Embed => "embed",
            Fieldset => "fieldset",
            Figcaption => "figcaption",
            Figure => "figure",
            Font => "font",
            Footer => "footer",
            Form => "form",
            Frame => "frame",
            Frameset => "frameset",
            H1 => "h1",
            H2 => "h2",
            H3 => "h3",
            H4 => "h4",
            H5 => "h5",
            H6 => "h6",
            Head => "head",
            Header => "header",
            Hgroup => "hgroup",
            Hr => "hr",
            Html => "html",
            I => "i",
            Iframe => "iframe",
            Image => "image",
            Img => "img",
            Input => "input",
            Ins => "ins",
            Kbd => "kbd",
            Keygen => "keygen",
            Label => "label",
            Legend => "legend",
            Li => "li",
            Link => "link",
            Listing => "listing",
            Main => "main",
            Map => "map",
            Mark => "mark",
            Marquee => "marquee",
            Menu => "menu",
            Menuitem => "menuitem",
            Meta => "meta",
            Meter => "meter",
            Nav => "nav",
            Nobr => "nobr",
            Noembed => "noembed",
            Noframes => "noframes",
            Noscript => "noscript",
            Object => "object",
            Ol => "ol",
            Optgroup => "optgroup",
            Option => "option",
            Output => "output",
            P => "p",
            Param => "param",
            Picture => "picture",
            Plaintext => "plaintext",
            Pre => "pre",
            Progress => "progress",
            Q => "q",
            Rb => "rb",
            Rp => "rp",
            Rt => "rt",
            Rtc => "rtc",
            Ruby => "ruby",
            S => "s",
            Samp => "samp",
            Script => "script",
            Search => "search",
            Section => "section",
            Select => "select",
            Slot => "slot",
            Small => "small",
            Source => "source",
            Span => "span",
            Strike => "strike",
            Strong => "strong",
            Style => "style",
            Sub => "sub",
            Summary => "summary",
            Sup => "sup",
            Table => "table",
            Tbody => "tbody",
            Td => "td",
            Template => "template",
            Textarea => "textarea",
            Tfoot => "tfoot",
            Th => "th",
            Thead => "thead",
            Time => "time",
            Title => "title",
            Tr => "tr",
            Track => "track",
            Tt => "tt",
            U => "u",
            Ul => "ul",
            Var => "var",
            Video => "video",
            Wbr => "wbr",
            Xmp => "xmp",

            Math => "math",
            Maction => "maction",
            Maligngroup => "maligngroup",
            Malignmark => "malignmark",
            Menclose => "menclose",
            Merror => "merror",
            Mfenced => "mfenced",
            Mfrac => "mfrac",
            Mglyph => "mglyph",
            Mi => "mi",
            Mlabeledtr => "mlabeledtr",
            Mlongdiv => "mlongdiv",
            Mmultiscripts => "mmultiscripts",
            Mn => "mn",
            Mo => "mo",
            Mover => "mover",
            Mpadded => "mpadded",
            Mphantom => "mphantom",
            Mroot => "mroot",
            Mrow => "mrow",
            Ms => "ms",
            Mscarries => "mscarries",
            Mscarry => "mscarry",
            Msgroup => "msgroup",
            Msline => "msline",
            Mspace => "mspace",
            Msqrt => "msqrt",
            Msrow => "msrow",
            Mstack => "mstack",
            Mstyle => "mstyle",
            Msub => "msub",
            Msubsup => "msubsup",
            Msup => "msup",
            Mtable => "mtable",
            Mtd => "mtd",
            Mtext => "mtext",
            Mtr => "mtr",
            Munder => "munder",
            Munderover => "munderover",
            Semantics => "semantics",
            Annotation => "annotation",
            AnnotationXml => "annotation-xml",

            Svg => "svg",
            AltGlyph => "altGlyph",
            AltGlyphDef => "altGlyphDef",
            AltGlyphItem => "altGlyphItem",
            Animate => "animate",
            AnimateColor => "animateColor",
            AnimateMotion => "animateMotion",
            AnimateTransform => "animateTransform",
            Circle => "circle",
            ClipPath => "clipPath",
            ColorProfile => "color-profile",
            Defs => "defs",
            Desc => "desc",
            Discard => "discard",
            Ellipse => "ellipse",
            FeBlend => "feBlend",
            FeColorMatrix => "feColorMatrix",
            FeComponentTransfer => "feComponentTransfer",
            FeComposite => "feComposite",
            FeConvolveMatrix => "feConvolveMatrix",
            FeDiffuseLighting => "feDiffuseLighting",
            FeDisplacementMap => "feDisplacementMap",
            FeDistantLight => "feDistantLight",
            FeDropShadow => "feDropShadow",
            FeFlood => "feFlood",
            FeFuncA => "feFuncA",
            FeFuncB => "feFuncB",
            FeFuncG => "feFuncG",
            FeFuncR => "feFuncR",
            FeGaussianBlur => "feGaussianBlur",
            FeImage => "feImage",
            FeMerge => "feMerge",
            FeMergeNode => "feMergeNode",
            FeMorphology => "feMorphology",
            FeOffset => "feOffset",
            FePointLight => "fePointLight",
            FeSpecularLighting => "feSpecularLighting",
            FeSpotLight => "feSpotLight",
            FeTile => "feTile",
            FeTurbulence => "feTurbulence",
            Filter => "filter",
            ForeignObject => "foreignObject",
            G => "g",
            GlyphRef => "glyphRef",
            Line => "line",
            LinearGradient => "linearGradient",
            Marker => "marker",
            Mask => "mask",
            Metadata => "metadata",
            Mpath => "mpath",
            Path => "path",
            Pattern => "pattern",
            Polygon => "polygon",
            Polyline => "polyline",
            RadialGradient => "radialGradient",
            Rect => "rect",
            Set => "set",
            Stop => "stop",
            Switch => "switch",
            Symbol => "symbol",
            Text => "text",
            TextPath => "textPath",
            Tspan => "tspan",
            Use => "use",
            View => "view",
        }
    }

    /// Paired or void. The HTML5 void-element list is authoritative here;
    /// `link` is void.
    pub fn structure(self) -> TagStructure {
        use self::ElementType::*;
        match self {
            Area | Base | Basefont | Bgsound | Br | Col | Embed | Frame | Hr | Img | Input
            | Keygen | Link | Menuitem | Meta | Param | Source | Track | Wbr => {
                TagStructure::Unpaired
            },
            _ => TagStructure::Paired,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn html_round_trip_is_canonical() {
        for name in ["div", "DIV", "Div"] {
            let t = ElementType::from_html_name(name).unwrap();
            assert_eq!(t.canonical_name(), "div");
        }
    }

    #[test]
    fn svg_adjustment_is_idempotent() {
        let once = svg_adjust_tag_name("foreignobject").unwrap();
        assert_eq!(once, "foreignObject");
        // Already-canonical names are not in the adjustment table.
        assert_eq!(svg_adjust_tag_name(once), None);
        assert_eq!(
            ElementType::from_svg_name(once),
            Some(ElementType::ForeignObject)
        );
    }

    #[test]
    fn mathml_names_are_case_sensitive() {
        assert_eq!(
            ElementType::from_mathml_name("annotation-xml"),
            Some(ElementType::AnnotationXml)
        );
        assert_eq!(ElementType::from_mathml_name("Annotation-Xml"), None);
    }

    #[test]
    fn void_classification() {
        assert_eq!(ElementType::Link.structure(), TagStructure::Unpaired);
        assert_eq!(ElementType::Br.structure(), TagStructure::Unpaired);
        assert_eq!(ElementType::Div.structure(), TagStructure::Paired);
        assert_eq!(ElementType::Script.structure(), TagStructure::Paired);
    }
}
