// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parse-error and DOM-error reporting.
//!
//! Parse errors are values recorded on a side channel; they never abort the
//! parse. DOM exceptions are typed failures returned from the external
//! mutation API.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;

use thiserror::Error;

/// A 1-based source position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub line: u64,
    pub col: u64,
}

impl Position {
    pub const START: Position = Position { line: 1, col: 1 };
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Stable names for every recoverable error the tokenizer and tree builder
/// can report. Tokenizer codes follow the WHATWG parse-error names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum ErrorCode {
    // Tokenizer: stream and tag errors.
    UnexpectedNullCharacter,
    ControlCharacterInInputStream,
    UnexpectedQuestionMarkInsteadOfTagName,
    InvalidFirstCharacterOfTagName,
    MissingEndTagName,
    EofBeforeTagName,
    EofInTag,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedCharacterInAttributeName,
    UnexpectedCharacterInUnquotedAttributeValue,
    MissingAttributeValue,
    MissingWhitespaceBetweenAttributes,
    UnexpectedSolidusInTag,
    DuplicateAttribute,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    // Tokenizer: comments and CDATA.
    AbruptClosingOfEmptyComment,
    EofInComment,
    NestedComment,
    IncorrectlyClosedComment,
    IncorrectlyOpenedComment,
    CdataInHtmlContent,
    EofInCdata,
    EofInScriptHtmlCommentLikeText,
    // Tokenizer: DOCTYPE.
    EofInDoctype,
    MissingDoctypeName,
    MissingWhitespaceBeforeDoctypeName,
    InvalidCharacterSequenceAfterDoctypeName,
    MissingWhitespaceAfterDoctypePublicKeyword,
    MissingWhitespaceAfterDoctypeSystemKeyword,
    MissingDoctypePublicIdentifier,
    MissingDoctypeSystemIdentifier,
    MissingQuoteBeforeDoctypePublicIdentifier,
    MissingQuoteBeforeDoctypeSystemIdentifier,
    AbruptDoctypePublicIdentifier,
    AbruptDoctypeSystemIdentifier,
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    // Tokenizer: character references.
    MissingSemicolonAfterCharacterReference,
    UnknownNamedCharacterReference,
    AbsenceOfDigitsInNumericCharacterReference,
    NullCharacterReference,
    CharacterReferenceOutsideUnicodeRange,
    SurrogateCharacterReference,
    NoncharacterCharacterReference,
    ControlCharacterReference,
    EofInCharacterReference,
    // Tree construction.
    UnexpectedDoctype,
    QuirkyDoctype,
    UnexpectedStartTag,
    UnexpectedEndTag,
    UnexpectedToken,
    EndTagDoesNotMatchCurrentOpenElement,
    FormattingElementNotInScope,
    FormattingElementNotOpen,
    UnexpectedOpenElementsAtEndOfBody,
    NonSpaceCharactersInTable,
    UnacknowledgedSelfClosingTag,
    NonVoidHtmlElementStartTagWithTrailingSolidus,
    // Knowledge-base resolution and validation.
    UnknownElement,
    UnknownAttribute,
    AttributeNotLegalOnElement,
}

impl ErrorCode {
    /// The stable, kebab-case name of this error.
    pub fn as_str(self) -> &'static str {
        use self::ErrorCode::*;
        match self {
            UnexpectedNullCharacter => "unexpected-null-character",
            ControlCharacterInInputStream => "control-character-in-input-stream",
            UnexpectedQuestionMarkInsteadOfTagName => {
                "unexpected-question-mark-instead-of-tag-name"
            },
            InvalidFirstCharacterOfTagName => "invalid-first-character-of-tag-name",
            MissingEndTagName => "missing-end-tag-name",
            EofBeforeTagName => "eof-before-tag-name",
            EofInTag => "eof-in-tag",
            UnexpectedEqualsSignBeforeAttributeName => {
                "unexpected-equals-sign-before-attribute-name"
            },
            UnexpectedCharacterInAttributeName => "unexpected-character-in-attribute-name",
            UnexpectedCharacterInUnquotedAttributeValue => {
                "unexpected-character-in-unquoted-attribute-value"
            },
            MissingAttributeValue => "missing-attribute-value",
            MissingWhitespaceBetweenAttributes => "missing-whitespace-between-attributes",
            UnexpectedSolidusInTag => "unexpected-solidus-in-tag",
            DuplicateAttribute => "duplicate-attribute",
            EndTagWithAttributes => "end-tag-with-attributes",
            EndTagWithTrailingSolidus => "end-tag-with-trailing-solidus",
            AbruptClosingOfEmptyComment => "abrupt-closing-of-empty-comment",
            EofInComment => "eof-in-comment",
            NestedComment => "nested-comment",
            IncorrectlyClosedComment => "incorrectly-closed-comment",
            IncorrectlyOpenedComment => "incorrectly-opened-comment",
            CdataInHtmlContent => "cdata-in-html-content",
            EofInCdata => "eof-in-cdata",
            EofInScriptHtmlCommentLikeText => "eof-in-script-html-comment-like-text",
            EofInDoctype => "eof-in-doctype",
            MissingDoctypeName => "missing-doctype-name",
            MissingWhitespaceBeforeDoctypeName => "missing-whitespace-before-doctype-name",
            InvalidCharacterSequenceAfterDoctypeName => {
                "invalid-character-sequence-after-doctype-name"
            },
            MissingWhitespaceAfterDoctypePublicKeyword => {
                "missing-whitespace-after-doctype-public-keyword"
            },
            MissingWhitespaceAfterDoctypeSystemKeyword => {
                "missing-whitespace-after-doctype-system-keyword"
            },
            MissingDoctypePublicIdentifier => "missing-doctype-public-identifier",
            MissingDoctypeSystemIdentifier => "missing-doctype-system-identifier",
            MissingQuoteBeforeDoctypePublicIdentifier => {
                "missing-quote-before-doctype-public-identifier"
            },
            MissingQuoteBeforeDoctypeSystemIdentifier => {
                "missing-quote-before-doctype-system-identifier"
            },
            AbruptDoctypePublicIdentifier => "abrupt-doctype-public-identifier",
            AbruptDoctypeSystemIdentifier => "abrupt-doctype-system-identifier",
            UnexpectedCharacterAfterDoctypeSystemIdentifier => {
                "unexpected-character-after-doctype-system-identifier"
            },
            MissingSemicolonAfterCharacterReference => {
                "missing-semicolon-after-character-reference"
            },
            UnknownNamedCharacterReference => "unknown-named-character-reference",
            AbsenceOfDigitsInNumericCharacterReference => {
                "absence-of-digits-in-numeric-character-reference"
            },
            NullCharacterReference => "null-character-reference",
            CharacterReferenceOutsideUnicodeRange => "character-reference-outside-unicode-range",
            SurrogateCharacterReference => "surrogate-character-reference",
            NoncharacterCharacterReference => "noncharacter-character-reference",
            ControlCharacterReference => "control-character-reference",
            EofInCharacterReference => "eof-in-character-reference",
            UnexpectedDoctype => "unexpected-doctype",
            QuirkyDoctype => "quirky-doctype",
            UnexpectedStartTag => "unexpected-start-tag",
            UnexpectedEndTag => "unexpected-end-tag",
            UnexpectedToken => "unexpected-token",
            EndTagDoesNotMatchCurrentOpenElement => {
                "end-tag-does-not-match-current-open-element"
            },
            FormattingElementNotInScope => "formatting-element-not-in-scope",
            FormattingElementNotOpen => "formatting-element-not-open",
            UnexpectedOpenElementsAtEndOfBody => "unexpected-open-elements-at-end-of-body",
            NonSpaceCharactersInTable => "non-space-characters-in-table",
            UnacknowledgedSelfClosingTag => "unacknowledged-self-closing-tag",
            NonVoidHtmlElementStartTagWithTrailingSolidus => {
                "non-void-html-element-start-tag-with-trailing-solidus"
            },
            UnknownElement => "unknown-element",
            UnknownAttribute => "unknown-attribute",
            AttributeNotLegalOnElement => "attribute-not-legal-on-element",
        }
    }

    /// Whether this error is mere noise about unrecognised constructs, which
    /// the `Partial` compliance level drops.
    pub fn is_unknown_construct_noise(self) -> bool {
        matches!(self, ErrorCode::UnknownElement | ErrorCode::UnknownAttribute)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable error recorded during parsing, with the source position of
/// the construct that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ParseError {
    pub code: ErrorCode,
    pub line: u64,
    pub col: u64,
}

impl ParseError {
    pub fn new(code: ErrorCode, pos: Position) -> ParseError {
        ParseError {
            code,
            line: pos.line,
            col: pos.col,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.code, self.line, self.col)
    }
}

/// The DOM exception names raised by the external mutation API.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum DomErrorKind {
    IndexSizeError,
    HierarchyRequestError,
    WrongDocumentError,
    InvalidCharacterError,
    NotFoundError,
    NotSupportedError,
    InUseAttributeError,
    SyntaxError,
    NamespaceError,
    ValidationError,
}

impl DomErrorKind {
    pub fn as_str(self) -> &'static str {
        use self::DomErrorKind::*;
        match self {
            IndexSizeError => "IndexSizeError",
            HierarchyRequestError => "HierarchyRequestError",
            WrongDocumentError => "WrongDocumentError",
            InvalidCharacterError => "InvalidCharacterError",
            NotFoundError => "NotFoundError",
            NotSupportedError => "NotSupportedError",
            InUseAttributeError => "InUseAttributeError",
            SyntaxError => "SyntaxError",
            NamespaceError => "NamespaceError",
            ValidationError => "ValidationError",
        }
    }
}

impl fmt::Display for DomErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed DOM failure, as raised by node mutation and attribute operations.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("{kind}: {message}")]
pub struct DomException {
    pub kind: DomErrorKind,
    pub message: String,
}

impl DomException {
    pub fn new(kind: DomErrorKind, message: impl Into<String>) -> DomException {
        DomException {
            kind,
            message: message.into(),
        }
    }
}

/// Levels of compliance to the standard, controlling which recorded errors
/// the host sees. The produced tree is identical at every level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub enum ComplianceLevel {
    /// Events are discarded.
    Off,
    /// Events about recognised constructs are surfaced; unknown-tag and
    /// unknown-attribute noise is dropped.
    #[default]
    Partial,
    /// All events are surfaced. Additionally, recoverable attribute-legality
    /// violations become hard rejections when an attribute is set through
    /// the external API.
    Strict,
}

/// Parser configuration record.
#[derive(Clone, Copy, Debug)]
pub struct DotConfig {
    /// Compliance applied to attribute-legality checks.
    pub attr_compliance: ComplianceLevel,
    /// Compliance applied to element-hierarchy checks.
    pub hierarchy_compliance: ComplianceLevel,
    /// Is scripting enabled? Affects `<noscript>` parsing.
    pub scripting_enabled: bool,
}

impl Default for DotConfig {
    fn default() -> DotConfig {
        DotConfig {
            attr_compliance: ComplianceLevel::Partial,
            hierarchy_compliance: ComplianceLevel::Partial,
            scripting_enabled: true,
        }
    }
}

/// The error side channel: an ordered log of parse errors, filtered by a
/// compliance level at record time.
#[derive(Debug, Default)]
pub struct ErrorLog {
    level: Cell<ComplianceLevel>,
    errors: RefCell<Vec<ParseError>>,
}

impl ErrorLog {
    pub fn new(level: ComplianceLevel) -> ErrorLog {
        ErrorLog {
            level: Cell::new(level),
            errors: RefCell::new(Vec::new()),
        }
    }

    pub fn level(&self) -> ComplianceLevel {
        self.level.get()
    }

    pub fn report(&self, code: ErrorCode, pos: Position) {
        match self.level.get() {
            ComplianceLevel::Off => (),
            ComplianceLevel::Partial if code.is_unknown_construct_noise() => (),
            _ => self.errors.borrow_mut().push(ParseError::new(code, pos)),
        }
    }

    pub fn errors(&self) -> Ref<'_, Vec<ParseError>> {
        self.errors.borrow()
    }

    pub fn take(&self) -> Vec<ParseError> {
        std::mem::take(&mut *self.errors.borrow_mut())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_names_are_stable() {
        assert_eq!(ErrorCode::DuplicateAttribute.as_str(), "duplicate-attribute");
        assert_eq!(ErrorCode::EofInComment.as_str(), "eof-in-comment");
        assert_eq!(
            ErrorCode::NullCharacterReference.as_str(),
            "null-character-reference"
        );
        assert_eq!(
            DomErrorKind::HierarchyRequestError.as_str(),
            "HierarchyRequestError"
        );
    }

    #[test]
    fn partial_level_drops_unknown_construct_noise() {
        let log = ErrorLog::new(ComplianceLevel::Partial);
        log.report(ErrorCode::UnknownElement, Position::START);
        log.report(ErrorCode::DuplicateAttribute, Position::START);
        let errors = log.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::DuplicateAttribute);
    }

    #[test]
    fn off_level_discards_everything() {
        let log = ErrorLog::new(ComplianceLevel::Off);
        log.report(ErrorCode::EofInComment, Position::START);
        assert!(log.errors().is_empty());
    }
}
