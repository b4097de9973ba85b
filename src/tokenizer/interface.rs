// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::borrow::Cow;

use tendril::StrTendril;

use crate::data::tags::ElementType;
use crate::dom::named_node_map::AttrQuote;
use crate::dom::namespace::Namespace;
use crate::error::{ErrorCode, Position};
use crate::tokenizer::states;

pub use self::TagKind::{EndTag, StartTag};
pub use self::Token::{CharacterTokens, CommentToken, DoctypeToken, TagToken};
pub use self::Token::{EOFToken, NullCharacterToken, ParseErrorToken};

/// A `DOCTYPE` token.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Doctype {
    pub name: Option<StrTendril>,
    pub public_id: Option<StrTendril>,
    pub system_id: Option<StrTendril>,
    pub force_quirks: bool,
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum TagKind {
    StartTag,
    EndTag,
}

/// A tag attribute as tokenized: raw qualified name, value, the
/// value-present flag, and the quote style it was written with.
///
/// The namespace and prefix are almost always empty; the tree builder fills
/// them in when it adjusts foreign-content attributes.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Attribute {
    pub prefix: Option<StrTendril>,
    pub ns: Namespace,
    pub name: StrTendril,
    pub value: StrTendril,
    pub has_value: bool,
    pub quote: AttrQuote,
}

impl Attribute {
    pub fn new(name: StrTendril) -> Attribute {
        Attribute {
            prefix: None,
            ns: Namespace::None,
            name,
            value: StrTendril::new(),
            has_value: false,
            quote: AttrQuote::None,
        }
    }
}

/// A tag token. `id` is the name resolved against the HTML table; foreign
/// contexts re-resolve at insertion time.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Tag {
    pub kind: TagKind,
    pub name: StrTendril,
    pub id: ElementType,
    pub self_closing: bool,
    pub attrs: Vec<Attribute>,
}

impl Tag {
    /// Are the tags equivalent when we don't care about attribute order?
    /// Also ignores the self-closing flag.
    pub fn equiv_modulo_attr_order(&self, other: &Tag) -> bool {
        if (self.kind != other.kind) || (self.name != other.name) {
            return false;
        }

        let mut self_attrs = self.attrs.clone();
        let mut other_attrs = other.attrs.clone();
        self_attrs.sort_by(|a, b| (&a.name, &a.value).cmp(&(&b.name, &b.value)));
        other_attrs.sort_by(|a, b| (&a.name, &a.value).cmp(&(&b.name, &b.value)));

        self_attrs == other_attrs
    }

    pub(crate) fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attrs
            .iter()
            .find(|attr| attr.ns == Namespace::None && &*attr.name == name)
    }
}

#[derive(PartialEq, Eq, Debug)]
pub enum Token {
    DoctypeToken(Doctype),
    TagToken(Tag),
    CommentToken(StrTendril),
    CharacterTokens(StrTendril),
    NullCharacterToken,
    EOFToken,
    ParseErrorToken(ErrorCode),
}

/// The result the sink returns after each token, letting it switch the
/// tokenizer into a raw-data state for the element just opened.
#[derive(Debug, PartialEq)]
#[must_use]
pub enum TokenSinkResult<Handle> {
    Continue,
    Script(Handle),
    Plaintext,
    RawData(states::RawKind),
}

/// Types which can receive tokens from the tokenizer.
pub trait TokenSink {
    type Handle;

    /// Process a token. `pos` is the source position of the first character
    /// of the construct that produced the token.
    fn process_token(&self, token: Token, pos: Position) -> TokenSinkResult<Self::Handle>;

    /// Signal that tokenization has reached the end of the input.
    fn end(&self) {}

    /// Used in the markup declaration open state to decide `<![CDATA[`
    /// eligibility. By default this returns false and CDATA sections are
    /// tokenized as bogus comments.
    fn adjusted_current_node_present_but_not_in_html_namespace(&self) -> bool {
        false
    }
}

/// Convenience sink wrapper used by tests and simple consumers: collects
/// tokens and errors into vectors.
#[derive(Default)]
pub struct TokenBuffer {
    pub tokens: std::cell::RefCell<Vec<(Token, Position)>>,
}

impl TokenSink for TokenBuffer {
    type Handle = ();

    fn process_token(&self, token: Token, pos: Position) -> TokenSinkResult<()> {
        self.tokens.borrow_mut().push((token, pos));
        TokenSinkResult::Continue
    }
}

/// Human-readable rendering of a token for debug logs.
pub fn describe_token(token: &Token) -> Cow<'static, str> {
    match token {
        DoctypeToken(_) => Cow::Borrowed("DOCTYPE"),
        TagToken(tag) => Cow::Owned(format!(
            "{}{}>",
            match tag.kind {
                StartTag => "<",
                EndTag => "</",
            },
            tag.name
        )),
        CommentToken(_) => Cow::Borrowed("comment"),
        CharacterTokens(t) => Cow::Owned(format!("{} characters", t.len())),
        NullCharacterToken => Cow::Borrowed("null character"),
        EOFToken => Cow::Borrowed("EOF"),
        ParseErrorToken(code) => Cow::Owned(format!("parse error: {code}")),
    }
}
