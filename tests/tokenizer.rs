// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Token-level tests driving the tokenizer with a collecting sink.

use pretty_assertions::assert_eq;

use dotml::error::{ErrorCode, Position};
use dotml::tendril::StrTendril;
use dotml::tokenizer::{
    Token, TokenBuffer, Tokenizer, TokenizerOpts,
};
use dotml::BufferQueue;

fn tokenize(input: &str) -> Vec<(Token, Position)> {
    let tok = Tokenizer::new(TokenBuffer::default(), TokenizerOpts::default());
    let buffer = BufferQueue::default();
    buffer.push_back(StrTendril::from_slice(input));
    let _ = tok.feed(&buffer);
    tok.end();
    tok.sink.tokens.take()
}

fn text_of(tokens: &[(Token, Position)]) -> String {
    tokens
        .iter()
        .filter_map(|(t, _)| match t {
            Token::CharacterTokens(b) => Some(b.to_string()),
            Token::NullCharacterToken => Some("\0".to_owned()),
            _ => None,
        })
        .collect()
}

fn errors_of(tokens: &[(Token, Position)]) -> Vec<ErrorCode> {
    tokens
        .iter()
        .filter_map(|(t, _)| match t {
            Token::ParseErrorToken(code) => Some(*code),
            _ => None,
        })
        .collect()
}

fn first_tag(tokens: &[(Token, Position)]) -> dotml::tokenizer::Tag {
    tokens
        .iter()
        .find_map(|(t, _)| match t {
            Token::TagToken(tag) => Some(tag.clone()),
            _ => None,
        })
        .expect("no tag token")
}

#[test]
fn named_reference_with_semicolon() {
    let tokens = tokenize("a&amp;b");
    assert_eq!(text_of(&tokens), "a&b");
    assert_eq!(errors_of(&tokens), vec![]);
}

#[test]
fn named_reference_without_semicolon_in_text() {
    let tokens = tokenize("a&amp b");
    assert_eq!(text_of(&tokens), "a& b");
    assert_eq!(
        errors_of(&tokens),
        vec![ErrorCode::MissingSemicolonAfterCharacterReference]
    );
}

#[test]
fn legacy_ampersand_in_attribute_before_equals_stays_literal() {
    // `&amp` directly followed by `=` keeps its literal spelling.
    let tokens = tokenize("<a href=\"x?q&amp=1\">");
    let tag = first_tag(&tokens);
    assert_eq!(&*tag.attrs[0].value, "x?q&amp=1");

    // Followed by anything else, it decodes to `&`.
    let tokens = tokenize("<a href=\"x?q&amp.1\">");
    let tag = first_tag(&tokens);
    assert_eq!(&*tag.attrs[0].value, "x?q&.1");
}

#[test]
fn numeric_references_clamp_and_remap() {
    // Out of range.
    let tokens = tokenize("&#x110000;");
    assert_eq!(text_of(&tokens), "\u{fffd}");
    assert_eq!(
        errors_of(&tokens),
        vec![ErrorCode::CharacterReferenceOutsideUnicodeRange]
    );

    // Surrogate.
    let tokens = tokenize("&#xD800;");
    assert_eq!(text_of(&tokens), "\u{fffd}");
    assert_eq!(errors_of(&tokens), vec![ErrorCode::SurrogateCharacterReference]);

    // C1 control remap: 0x80 is the euro sign in windows-1252.
    let tokens = tokenize("&#x80;");
    assert_eq!(text_of(&tokens), "\u{20ac}");
    assert_eq!(errors_of(&tokens), vec![ErrorCode::ControlCharacterReference]);

    // Null.
    let tokens = tokenize("&#0;");
    assert_eq!(text_of(&tokens), "\u{fffd}");
    assert_eq!(errors_of(&tokens), vec![ErrorCode::NullCharacterReference]);
}

#[test]
fn longest_match_wins() {
    // `&not` is terminal but `&notin;` is longer.
    let tokens = tokenize("&notin;");
    assert_eq!(text_of(&tokens), "\u{2209}");

    let tokens = tokenize("&notit;");
    assert_eq!(text_of(&tokens), "\u{00AC}it;");
}

#[test]
fn bogus_markup_becomes_comments() {
    let tokens = tokenize("<?pi data?>");
    let comment = tokens
        .iter()
        .find_map(|(t, _)| match t {
            Token::CommentToken(text) => Some(text.to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(comment, "?pi data?");
    assert_eq!(
        errors_of(&tokens),
        vec![ErrorCode::UnexpectedQuestionMarkInsteadOfTagName]
    );
}

#[test]
fn self_closing_flag_is_captured() {
    let tag = first_tag(&tokenize("<br/>"));
    assert!(tag.self_closing);
}

#[test]
fn end_tag_with_attributes_is_reported() {
    let tokens = tokenize("</p class=x>");
    let tag = first_tag(&tokens);
    assert!(tag.attrs.is_empty());
    assert_eq!(errors_of(&tokens), vec![ErrorCode::EndTagWithAttributes]);
}

#[test]
fn doctype_fields_are_split() {
    let tokens = tokenize(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">"#,
    );
    let dt = tokens
        .iter()
        .find_map(|(t, _)| match t {
            Token::DoctypeToken(dt) => Some(dt.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(dt.name.as_deref(), Some("html"));
    assert_eq!(dt.public_id.as_deref(), Some("-//W3C//DTD XHTML 1.1//EN"));
    assert_eq!(
        dt.system_id.as_deref(),
        Some("http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd")
    );
    assert!(!dt.force_quirks);
}

#[test]
fn token_positions_track_lines_and_columns() {
    let tokens = tokenize("ab\n<i>x");
    let tag_pos = tokens
        .iter()
        .find_map(|(t, pos)| match t {
            Token::TagToken(_) => Some(*pos),
            _ => None,
        })
        .unwrap();
    assert_eq!((tag_pos.line, tag_pos.col), (2, 1));

    let first_text_pos = tokens
        .iter()
        .find_map(|(t, pos)| match t {
            Token::CharacterTokens(_) => Some(*pos),
            _ => None,
        })
        .unwrap();
    assert_eq!((first_text_pos.line, first_text_pos.col), (1, 1));
}

#[test]
fn cdata_is_bogus_outside_foreign_content() {
    let tokens = tokenize("<![CDATA[x]]>");
    assert!(errors_of(&tokens).contains(&ErrorCode::CdataInHtmlContent));
    let comment = tokens
        .iter()
        .find_map(|(t, _)| match t {
            Token::CommentToken(text) => Some(text.to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(comment, "[CDATA[x]]");
}
