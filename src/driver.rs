// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! High-level interface to the parser: feed text in, get a [`Dot`] out.

use tendril::StrTendril;

use crate::dom::sink::Dot;
use crate::dom::namespace::Namespace;
use crate::error::DotConfig;
use crate::tokenizer::{Tokenizer, TokenizerOpts, TokenizerResult};
use crate::tree_builder::{TreeBuilder, TreeBuilderOpts, TreeSink};
use crate::util::buffer_queue::BufferQueue;

/// Parser options: one record per stage plus the document configuration.
#[derive(Clone, Default)]
pub struct ParseOpts {
    pub tokenizer: TokenizerOpts,
    pub tree_builder: TreeBuilderOpts,
    pub config: DotConfig,
}

fn drive(tokenizer: &Tokenizer<TreeBuilder<crate::dom::Handle, Dot>>, input: &str) {
    let buffer = BufferQueue::default();
    buffer.push_back(StrTendril::from_slice(input));
    // Script execution is out of scope; a `Script` result just resumes
    // the loop at the next token boundary.
    while let TokenizerResult::Script(_) = tokenizer.feed(&buffer) {}
    tokenizer.end();
}

/// Parse a complete document from a string.
///
/// Always produces a document; recoverable errors are recorded in the
/// returned [`Dot`].
pub fn parse_document(input: &str, opts: ParseOpts) -> Dot {
    let dot = Dot::new(opts.config);
    let tree_builder = TreeBuilder::new(dot, opts.tree_builder);
    let tokenizer = Tokenizer::new(tree_builder, opts.tokenizer);
    drive(&tokenizer, input);
    tokenizer.sink.sink
}

/// Parse a fragment in the context of an element with the given local name,
/// per the HTML fragment parsing algorithm. The parsed nodes end up as
/// children of the `<html>` root element of the returned tree.
pub fn parse_fragment(input: &str, context_local_name: &str, opts: ParseOpts) -> Dot {
    let dot = Dot::new(opts.config);
    let context_elem = dot.create_element(
        Namespace::Html,
        StrTendril::from_slice(&context_local_name.to_ascii_lowercase()),
        vec![],
    );
    let tree_builder =
        TreeBuilder::new_for_fragment(dot, context_elem, None, opts.tree_builder);

    let tokenizer_opts = TokenizerOpts {
        initial_state: Some(
            tree_builder.tokenizer_state_for_context_elem(opts.tree_builder.scripting_enabled),
        ),
        last_start_tag_name: Some(context_local_name.to_ascii_lowercase()),
        ..opts.tokenizer
    };

    let tokenizer = Tokenizer::new(tree_builder, tokenizer_opts);
    drive(&tokenizer, input);
    tokenizer.sink.sink
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_input_gives_empty_document() {
        let dot = parse_document("", ParseOpts::default());
        assert_eq!(dot.document().children().len(), 0);
        assert!(dot.errors().is_empty());
    }

    #[test]
    fn fragment_parses_into_root() {
        let dot = parse_fragment("<b>x</b>", "div", ParseOpts::default());
        let root = dot.document().first_child().unwrap();
        assert_eq!(root.children().len(), 1);
    }
}
