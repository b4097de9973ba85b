// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// The tree builder rules, as a single, enormous nested match expression.

use crate::data::tags::ElementType::{self, *};
use crate::dom::namespace::Namespace;
use crate::error::ErrorCode;
use crate::tokenizer::states::{Rawtext, Rcdata, ScriptData};
use crate::tokenizer::TagKind::{EndTag, StartTag};
use crate::tokenizer::Tag;
use crate::tree_builder::tag_sets::*;
use crate::tree_builder::types::*;
use crate::tree_builder::{html_elem, AppendNode, QuirksMode, TreeBuilder, TreeSink};

use tendril::{SliceExt, StrTendril};

fn any_not_whitespace(x: &StrTendril) -> bool {
    x.chars().any(|c| !c.is_ascii_whitespace())
}

fn current_node<Handle>(open_elems: &[Handle]) -> &Handle {
    open_elems.last().expect("no current element")
}

#[doc(hidden)]
impl<Handle, Sink> TreeBuilder<Handle, Sink>
where
    Handle: Clone,
    Sink: TreeSink<Handle = Handle>,
{
    pub(crate) fn step(&self, mode: InsertionMode, token: Token) -> ProcessResult<Handle> {
        self.debug_step(mode, &token);

        match mode {
            //§ the-initial-insertion-mode
            InsertionMode::Initial => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, _) => ProcessResult::Done,
                Token::Comment(text) => self.append_comment_to_doc(text),
                // Input with no markup at all yields an empty document
                // rather than the implied html/head/body skeleton.
                Token::Eof => self.stop_parsing(),
                token => {
                    // A missing doctype selects quirks mode but is not
                    // reported as an error.
                    if !self.opts.iframe_srcdoc {
                        self.set_quirks_mode(QuirksMode::Quirks);
                    }
                    ProcessResult::Reprocess(InsertionMode::BeforeHtml, token)
                },
            },

            //§ the-before-html-insertion-mode
            InsertionMode::BeforeHtml => {
                let anything_else = |token: Token| {
                    self.create_root(vec![]);
                    ProcessResult::Reprocess(InsertionMode::BeforeHead, token)
                };
                match token {
                    Token::Characters(SplitStatus::NotSplit, text) => {
                        ProcessResult::SplitWhitespace(text)
                    },
                    Token::Characters(SplitStatus::Whitespace, _) => ProcessResult::Done,
                    Token::Comment(text) => self.append_comment_to_doc(text),

                    Token::Tag(tag) => match (tag.kind, tag.id) {
                        (StartTag, Html) => {
                            self.create_root(tag.attrs);
                            self.mode.set(InsertionMode::BeforeHead);
                            ProcessResult::Done
                        },
                        (EndTag, Head | Body | Html | Br) => anything_else(Token::Tag(tag)),
                        (EndTag, _) => {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        },
                        (StartTag, _) => anything_else(Token::Tag(tag)),
                    },

                    token => anything_else(token),
                }
            },

            //§ the-before-head-insertion-mode
            InsertionMode::BeforeHead => {
                let anything_else = |token: Token| {
                    *self.head_elem.borrow_mut() = Some(self.insert_phantom("head"));
                    ProcessResult::Reprocess(InsertionMode::InHead, token)
                };
                match token {
                    Token::Characters(SplitStatus::NotSplit, text) => {
                        ProcessResult::SplitWhitespace(text)
                    },
                    Token::Characters(SplitStatus::Whitespace, _) => ProcessResult::Done,
                    Token::Comment(text) => self.append_comment(text),

                    Token::Tag(tag) => match (tag.kind, tag.id) {
                        (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),
                        (StartTag, Head) => {
                            *self.head_elem.borrow_mut() = Some(self.insert_element_for(tag));
                            self.mode.set(InsertionMode::InHead);
                            ProcessResult::Done
                        },
                        (EndTag, Head | Body | Html | Br) => anything_else(Token::Tag(tag)),
                        (EndTag, _) => {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        },
                        (StartTag, _) => anything_else(Token::Tag(tag)),
                    },

                    token => anything_else(token),
                }
            },

            //§ parsing-main-inhead
            InsertionMode::InHead => {
                let anything_else = |token: Token| {
                    self.pop();
                    ProcessResult::Reprocess(InsertionMode::AfterHead, token)
                };
                match token {
                    Token::Characters(SplitStatus::NotSplit, text) => {
                        ProcessResult::SplitWhitespace(text)
                    },
                    Token::Characters(SplitStatus::Whitespace, text) => self.append_text(text),
                    Token::Comment(text) => self.append_comment(text),

                    Token::Tag(tag) => match (tag.kind, tag.id) {
                        (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                        (StartTag, Base | Basefont | Bgsound | Link | Meta) => {
                            // FIXME: handle <meta charset=...> and
                            // <meta http-equiv="Content-Type">
                            self.insert_and_pop_element_for(tag);
                            ProcessResult::DoneAckSelfClosing
                        },

                        (StartTag, Title) => self.parse_raw_data(tag, Rcdata),

                        (StartTag, Noframes | Style | Noscript) => {
                            if (!self.opts.scripting_enabled) && (tag.id == Noscript) {
                                self.insert_element_for(tag);
                                self.mode.set(InsertionMode::InHeadNoscript);
                                ProcessResult::Done
                            } else {
                                self.parse_raw_data(tag, Rawtext)
                            }
                        },

                        (StartTag, Script) => {
                            let elem = self.sink.create_element(
                                Namespace::Html,
                                StrTendril::from_slice("script"),
                                tag.attrs,
                            );
                            if self.is_fragment() {
                                self.sink.mark_script_already_started(&elem);
                            }
                            self.insert_appropriately(AppendNode(elem.clone()), None);
                            self.open_elems.borrow_mut().push(elem);
                            self.to_raw_text_mode(ScriptData)
                        },

                        (EndTag, Head) => {
                            self.pop();
                            self.mode.set(InsertionMode::AfterHead);
                            ProcessResult::Done
                        },

                        (StartTag, Template) => {
                            self.active_formatting
                                .borrow_mut()
                                .push(FormatEntry::Marker);
                            self.frameset_ok.set(false);
                            self.mode.set(InsertionMode::InTemplate);
                            self.template_modes
                                .borrow_mut()
                                .push(InsertionMode::InTemplate);
                            self.insert_element_for(tag);
                            ProcessResult::Done
                        },

                        (EndTag, Template) => {
                            if !self.in_html_elem_named(Template) {
                                self.unexpected_tag(&tag);
                            } else {
                                self.generate_implied_end_tags(thorough_implied_end);
                                self.expect_to_close(Template);
                                self.clear_active_formatting_to_marker();
                                self.template_modes.borrow_mut().pop();
                                self.mode.set(self.reset_insertion_mode());
                            }
                            ProcessResult::Done
                        },

                        (StartTag, Head) => {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        },

                        (EndTag, Body | Html | Br) => anything_else(Token::Tag(tag)),

                        (EndTag, _) => {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        },

                        (StartTag, _) => anything_else(Token::Tag(tag)),
                    },

                    token => anything_else(token),
                }
            },

            //§ parsing-main-inheadnoscript
            InsertionMode::InHeadNoscript => {
                let anything_else = |token: Token| {
                    self.unexpected(&token);
                    self.pop();
                    ProcessResult::Reprocess(InsertionMode::InHead, token)
                };
                match token {
                    Token::Characters(SplitStatus::NotSplit, text) => {
                        ProcessResult::SplitWhitespace(text)
                    },
                    Token::Characters(SplitStatus::Whitespace, _) => {
                        self.step(InsertionMode::InHead, token)
                    },
                    Token::Comment(_) => self.step(InsertionMode::InHead, token),

                    Token::Tag(tag) => match (tag.kind, tag.id) {
                        (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                        (EndTag, Noscript) => {
                            self.pop();
                            self.mode.set(InsertionMode::InHead);
                            ProcessResult::Done
                        },

                        (StartTag, Basefont | Bgsound | Link | Meta | Noframes | Style) => {
                            self.step(InsertionMode::InHead, Token::Tag(tag))
                        },

                        (EndTag, Br) => anything_else(Token::Tag(tag)),

                        (StartTag, Head | Noscript) => {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        },
                        (EndTag, _) => {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        },

                        (StartTag, _) => anything_else(Token::Tag(tag)),
                    },

                    token => anything_else(token),
                }
            },

            //§ the-after-head-insertion-mode
            InsertionMode::AfterHead => {
                let anything_else = |token: Token| {
                    self.insert_phantom("body");
                    ProcessResult::Reprocess(InsertionMode::InBody, token)
                };
                match token {
                    Token::Characters(SplitStatus::NotSplit, text) => {
                        ProcessResult::SplitWhitespace(text)
                    },
                    Token::Characters(SplitStatus::Whitespace, text) => self.append_text(text),
                    Token::Comment(text) => self.append_comment(text),

                    Token::Tag(tag) => match (tag.kind, tag.id) {
                        (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                        (StartTag, Body) => {
                            self.insert_element_for(tag);
                            self.frameset_ok.set(false);
                            self.mode.set(InsertionMode::InBody);
                            ProcessResult::Done
                        },

                        (StartTag, Frameset) => {
                            self.insert_element_for(tag);
                            self.mode.set(InsertionMode::InFrameset);
                            ProcessResult::Done
                        },

                        (
                            StartTag,
                            Base | Basefont | Bgsound | Link | Meta | Noframes | Script | Style
                            | Template | Title,
                        ) => {
                            self.unexpected_tag(&tag);
                            let head = self
                                .head_elem
                                .borrow()
                                .as_ref()
                                .expect("no head element")
                                .clone();
                            self.push(&head);
                            let result = self.step(InsertionMode::InHead, Token::Tag(tag));
                            self.remove_from_stack(&head);
                            result
                        },

                        (EndTag, Template) => self.step(InsertionMode::InHead, Token::Tag(tag)),

                        (EndTag, Body | Html | Br) => anything_else(Token::Tag(tag)),

                        (StartTag, Head) => {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        },
                        (EndTag, _) => {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        },

                        (StartTag, _) => anything_else(Token::Tag(tag)),
                    },

                    token => anything_else(token),
                }
            },

            //§ parsing-main-inbody
            InsertionMode::InBody => match token {
                Token::NullCharacter => {
                    self.unexpected(&token);
                    ProcessResult::Done
                },

                Token::Characters(_, text) => {
                    self.reconstruct_active_formatting_elements();
                    if any_not_whitespace(&text) {
                        self.frameset_ok.set(false);
                    }
                    self.append_text(text)
                },

                Token::Comment(text) => self.append_comment(text),

                Token::Eof => {
                    if !self.template_modes.borrow().is_empty() {
                        self.step(InsertionMode::InTemplate, token)
                    } else {
                        self.check_body_end();
                        self.stop_parsing()
                    }
                },

                Token::Tag(tag) => self.step_in_body_tag(tag),
            },

            //§ parsing-main-incdata
            InsertionMode::Text => match token {
                Token::Characters(_, text) => self.append_text(text),

                Token::Eof => {
                    self.unexpected(&token);
                    if self.current_node_named(Script) {
                        let open_elems = self.open_elems.borrow();
                        let current = current_node(&open_elems);
                        self.sink.mark_script_already_started(current);
                    }
                    self.pop();
                    ProcessResult::Reprocess(self.orig_mode.take().unwrap(), token)
                },

                Token::Tag(tag) => {
                    debug_assert_eq!(tag.kind, EndTag);
                    let node = self.pop();
                    self.mode.set(self.orig_mode.take().unwrap());
                    if tag.id == Script {
                        return ProcessResult::Script(node);
                    }
                    ProcessResult::Done
                },

                // The spec doesn't say what to do here.
                // Other tokens are impossible?
                _ => panic!("impossible case in Text mode"),
            },

            //§ parsing-main-intable
            InsertionMode::InTable => match token {
                // FIXME: hack, should implement pat | pat for match_token
                // instead
                Token::NullCharacter => self.process_chars_in_table(token),

                Token::Characters(..) => self.process_chars_in_table(token),

                Token::Comment(text) => self.append_comment(text),

                Token::Eof => self.step(InsertionMode::InBody, token),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Caption) => {
                        self.pop_until_current(table_scope);
                        self.active_formatting
                            .borrow_mut()
                            .push(FormatEntry::Marker);
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InCaption);
                        ProcessResult::Done
                    },

                    (StartTag, Colgroup) => {
                        self.pop_until_current(table_scope);
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InColumnGroup);
                        ProcessResult::Done
                    },

                    (StartTag, Col) => {
                        self.pop_until_current(table_scope);
                        self.insert_phantom("colgroup");
                        ProcessResult::Reprocess(InsertionMode::InColumnGroup, Token::Tag(tag))
                    },

                    (StartTag, Tbody | Tfoot | Thead) => {
                        self.pop_until_current(table_scope);
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InTableBody);
                        ProcessResult::Done
                    },

                    (StartTag, Td | Th | Tr) => {
                        self.pop_until_current(table_scope);
                        self.insert_phantom("tbody");
                        ProcessResult::Reprocess(InsertionMode::InTableBody, Token::Tag(tag))
                    },

                    (StartTag, Table) => {
                        self.unexpected_tag(&tag);
                        if self.in_scope_named(table_scope, Table) {
                            self.pop_until_named(Table);
                            ProcessResult::Reprocess(self.reset_insertion_mode(), Token::Tag(tag))
                        } else {
                            ProcessResult::Done
                        }
                    },

                    (EndTag, Table) => {
                        if self.in_scope_named(table_scope, Table) {
                            self.pop_until_named(Table);
                            self.mode.set(self.reset_insertion_mode());
                        } else {
                            self.unexpected_tag(&tag);
                        }
                        ProcessResult::Done
                    },

                    (
                        EndTag,
                        Body | Caption | Col | Colgroup | Html | Tbody | Td | Tfoot | Th | Thead
                        | Tr,
                    ) => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Done
                    },

                    (StartTag, Style | Script | Template) | (EndTag, Template) => {
                        self.step(InsertionMode::InHead, Token::Tag(tag))
                    },

                    (StartTag, Input) => {
                        self.unexpected_tag(&tag);
                        if self.is_type_hidden(&tag) {
                            self.insert_and_pop_element_for(tag);
                            ProcessResult::DoneAckSelfClosing
                        } else {
                            self.foster_parent_in_body(Token::Tag(tag))
                        }
                    },

                    (StartTag, Form) => {
                        self.unexpected_tag(&tag);
                        if !self.in_html_elem_named(Template) && self.form_elem.borrow().is_none()
                        {
                            *self.form_elem.borrow_mut() =
                                Some(self.insert_and_pop_element_for(tag));
                        }
                        ProcessResult::Done
                    },

                    _ => {
                        self.unexpected_tag(&tag);
                        self.foster_parent_in_body(Token::Tag(tag))
                    },
                },
            },

            //§ parsing-main-intabletext
            InsertionMode::InTableText => match token {
                Token::NullCharacter => {
                    self.unexpected(&token);
                    ProcessResult::Done
                },

                Token::Characters(split, text) => {
                    self.pending_table_text.borrow_mut().push((split, text));
                    ProcessResult::Done
                },

                token => {
                    let pending = self.pending_table_text.take();
                    let contains_nonspace = pending.iter().any(|&(split, ref text)| match split {
                        SplitStatus::Whitespace => false,
                        SplitStatus::NotWhitespace => true,
                        SplitStatus::NotSplit => any_not_whitespace(text),
                    });

                    if contains_nonspace {
                        self.sink.parse_error(ErrorCode::NonSpaceCharactersInTable);
                        for (split, text) in pending.into_iter() {
                            match self.foster_parent_in_body(Token::Characters(split, text)) {
                                ProcessResult::Done => (),
                                _ => panic!("not prepared to handle this!"),
                            }
                        }
                    } else {
                        for (_, text) in pending.into_iter() {
                            self.append_text(text);
                        }
                    }

                    ProcessResult::Reprocess(self.orig_mode.take().unwrap(), token)
                },
            },

            //§ parsing-main-incaption
            InsertionMode::InCaption => match token {
                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Caption | Col | Colgroup | Tbody | Td | Tfoot | Th | Thead | Tr)
                    | (EndTag, Table | Caption) => {
                        if self.in_scope_named(table_scope, Caption) {
                            self.generate_implied_end_tags(cursory_implied_end);
                            self.expect_to_close(Caption);
                            self.clear_active_formatting_to_marker();
                            match tag {
                                Tag {
                                    kind: EndTag,
                                    id: Caption,
                                    ..
                                } => {
                                    self.mode.set(InsertionMode::InTable);
                                    ProcessResult::Done
                                },
                                _ => ProcessResult::Reprocess(
                                    InsertionMode::InTable,
                                    Token::Tag(tag),
                                ),
                            }
                        } else {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        }
                    },

                    (EndTag, Body | Col | Colgroup | Html | Tbody | Td | Tfoot | Th | Thead | Tr) => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Done
                    },

                    _ => self.step(InsertionMode::InBody, Token::Tag(tag)),
                },

                token => self.step(InsertionMode::InBody, token),
            },

            //§ parsing-main-incolgroup
            InsertionMode::InColumnGroup => {
                let anything_else = |token: Token| {
                    if self.current_node_named(Colgroup) {
                        self.pop();
                        ProcessResult::Reprocess(InsertionMode::InTable, token)
                    } else {
                        self.unexpected(&token);
                        ProcessResult::Done
                    }
                };
                match token {
                    Token::Characters(SplitStatus::NotSplit, text) => {
                        ProcessResult::SplitWhitespace(text)
                    },
                    Token::Characters(SplitStatus::Whitespace, text) => self.append_text(text),
                    Token::Comment(text) => self.append_comment(text),

                    Token::Eof => self.step(InsertionMode::InBody, token),

                    Token::Tag(tag) => match (tag.kind, tag.id) {
                        (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                        (StartTag, Col) => {
                            self.insert_and_pop_element_for(tag);
                            ProcessResult::DoneAckSelfClosing
                        },

                        (EndTag, Colgroup) => {
                            if self.current_node_named(Colgroup) {
                                self.pop();
                                self.mode.set(InsertionMode::InTable);
                            } else {
                                self.unexpected_tag(&tag);
                            }
                            ProcessResult::Done
                        },

                        (EndTag, Col) => {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        },

                        (StartTag, Template) | (EndTag, Template) => {
                            self.step(InsertionMode::InHead, Token::Tag(tag))
                        },

                        _ => anything_else(Token::Tag(tag)),
                    },

                    token => anything_else(token),
                }
            },

            //§ parsing-main-intbody
            InsertionMode::InTableBody => match token {
                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Tr) => {
                        self.pop_until_current(table_body_context);
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InRow);
                        ProcessResult::Done
                    },

                    (StartTag, Th | Td) => {
                        self.unexpected_tag(&tag);
                        self.pop_until_current(table_body_context);
                        self.insert_phantom("tr");
                        ProcessResult::Reprocess(InsertionMode::InRow, Token::Tag(tag))
                    },

                    (EndTag, Tbody | Tfoot | Thead) => {
                        if self.in_scope_named(table_scope, tag.id) {
                            self.pop_until_current(table_body_context);
                            self.pop();
                            self.mode.set(InsertionMode::InTable);
                        } else {
                            self.unexpected_tag(&tag);
                        }
                        ProcessResult::Done
                    },

                    (StartTag, Caption | Col | Colgroup | Tbody | Tfoot | Thead)
                    | (EndTag, Table) => {
                        declare_tag_set!(table_outer = Table Tbody Tfoot);
                        if self.in_scope(table_scope, |e| self.elem_in(&e, table_outer)) {
                            self.pop_until_current(table_body_context);
                            self.pop();
                            ProcessResult::Reprocess(InsertionMode::InTable, Token::Tag(tag))
                        } else {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        }
                    },

                    (EndTag, Body | Caption | Col | Colgroup | Html | Td | Th | Tr) => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Done
                    },

                    _ => self.step(InsertionMode::InTable, Token::Tag(tag)),
                },

                token => self.step(InsertionMode::InTable, token),
            },

            //§ parsing-main-intr
            InsertionMode::InRow => match token {
                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Th | Td) => {
                        self.pop_until_current(table_row_context);
                        self.insert_element_for(tag);
                        self.mode.set(InsertionMode::InCell);
                        self.active_formatting
                            .borrow_mut()
                            .push(FormatEntry::Marker);
                        ProcessResult::Done
                    },

                    (EndTag, Tr) => {
                        if self.in_scope_named(table_scope, Tr) {
                            self.pop_until_current(table_row_context);
                            let node = self.pop();
                            self.assert_named(&node, Tr);
                            self.mode.set(InsertionMode::InTableBody);
                        } else {
                            self.unexpected_tag(&tag);
                        }
                        ProcessResult::Done
                    },

                    (StartTag, Caption | Col | Colgroup | Tbody | Tfoot | Thead | Tr)
                    | (EndTag, Table) => {
                        if self.in_scope_named(table_scope, Tr) {
                            self.pop_until_current(table_row_context);
                            let node = self.pop();
                            self.assert_named(&node, Tr);
                            ProcessResult::Reprocess(InsertionMode::InTableBody, Token::Tag(tag))
                        } else {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        }
                    },

                    (EndTag, Tbody | Tfoot | Thead) => {
                        if self.in_scope_named(table_scope, tag.id) {
                            if self.in_scope_named(table_scope, Tr) {
                                self.pop_until_current(table_row_context);
                                let node = self.pop();
                                self.assert_named(&node, Tr);
                                ProcessResult::Reprocess(
                                    InsertionMode::InTableBody,
                                    Token::Tag(tag),
                                )
                            } else {
                                ProcessResult::Done
                            }
                        } else {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        }
                    },

                    (EndTag, Body | Caption | Col | Colgroup | Html | Td | Th) => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Done
                    },

                    _ => self.step(InsertionMode::InTable, Token::Tag(tag)),
                },

                token => self.step(InsertionMode::InTable, token),
            },

            //§ parsing-main-intd
            InsertionMode::InCell => match token {
                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (EndTag, Td | Th) => {
                        if self.in_scope_named(table_scope, tag.id) {
                            self.generate_implied_end_tags(cursory_implied_end);
                            self.expect_to_close(tag.id);
                            self.clear_active_formatting_to_marker();
                            self.mode.set(InsertionMode::InRow);
                        } else {
                            self.unexpected_tag(&tag);
                        }
                        ProcessResult::Done
                    },

                    (StartTag, Caption | Col | Colgroup | Tbody | Td | Tfoot | Th | Thead | Tr) => {
                        if self.in_scope(table_scope, |n| self.elem_in(&n, td_th)) {
                            self.close_the_cell();
                            ProcessResult::Reprocess(InsertionMode::InRow, Token::Tag(tag))
                        } else {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        }
                    },

                    (EndTag, Body | Caption | Col | Colgroup | Html) => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Done
                    },

                    (EndTag, Table | Tbody | Tfoot | Thead | Tr) => {
                        if self.in_scope_named(table_scope, tag.id) {
                            self.close_the_cell();
                            ProcessResult::Reprocess(InsertionMode::InRow, Token::Tag(tag))
                        } else {
                            self.unexpected_tag(&tag);
                            ProcessResult::Done
                        }
                    },

                    _ => self.step(InsertionMode::InBody, Token::Tag(tag)),
                },

                token => self.step(InsertionMode::InBody, token),
            },

            //§ parsing-main-inselect
            InsertionMode::InSelect => match token {
                Token::NullCharacter => {
                    self.unexpected(&token);
                    ProcessResult::Done
                },
                Token::Characters(_, text) => self.append_text(text),
                Token::Comment(text) => self.append_comment(text),

                Token::Eof => self.step(InsertionMode::InBody, token),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (StartTag, Option) => {
                        if self.current_node_named(Option) {
                            self.pop();
                        }
                        self.insert_element_for(tag);
                        ProcessResult::Done
                    },

                    (StartTag, Optgroup) => {
                        if self.current_node_named(Option) {
                            self.pop();
                        }
                        if self.current_node_named(Optgroup) {
                            self.pop();
                        }
                        self.insert_element_for(tag);
                        ProcessResult::Done
                    },

                    (StartTag, Hr) => {
                        if self.current_node_named(Option) {
                            self.pop();
                        }
                        if self.current_node_named(Optgroup) {
                            self.pop();
                        }
                        self.insert_element_for(tag);
                        self.pop();
                        ProcessResult::DoneAckSelfClosing
                    },

                    (EndTag, Optgroup) => {
                        if self.open_elems.borrow().len() >= 2
                            && self.current_node_named(Option)
                            && self.html_elem_named(
                                &self.open_elems.borrow()[self.open_elems.borrow().len() - 2],
                                Optgroup,
                            )
                        {
                            self.pop();
                        }
                        if self.current_node_named(Optgroup) {
                            self.pop();
                        } else {
                            self.unexpected_tag(&tag);
                        }
                        ProcessResult::Done
                    },

                    (EndTag, Option) => {
                        if self.current_node_named(Option) {
                            self.pop();
                        } else {
                            self.unexpected_tag(&tag);
                        }
                        ProcessResult::Done
                    },

                    (StartTag, Select) | (EndTag, Select) => {
                        let in_scope = self.in_scope_named(select_scope, Select);

                        if !in_scope || tag.kind == StartTag {
                            self.unexpected_tag(&tag);
                        }

                        if in_scope {
                            self.pop_until_named(Select);
                            self.mode.set(self.reset_insertion_mode());
                        }
                        ProcessResult::Done
                    },

                    (StartTag, Input | Keygen | Textarea) => {
                        self.unexpected_tag(&tag);
                        if self.in_scope_named(select_scope, Select) {
                            self.pop_until_named(Select);
                            ProcessResult::Reprocess(self.reset_insertion_mode(), Token::Tag(tag))
                        } else {
                            ProcessResult::Done
                        }
                    },

                    (StartTag, Script | Template) | (EndTag, Template) => {
                        self.step(InsertionMode::InHead, Token::Tag(tag))
                    },

                    _ => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Done
                    },
                },

                token => {
                    self.unexpected(&token);
                    ProcessResult::Done
                },
            },

            //§ parsing-main-inselectintable
            InsertionMode::InSelectInTable => match token {
                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Caption | Table | Tbody | Tfoot | Thead | Tr | Td | Th) => {
                        self.unexpected_tag(&tag);
                        self.pop_until_named(Select);
                        ProcessResult::Reprocess(self.reset_insertion_mode(), Token::Tag(tag))
                    },

                    (EndTag, Caption | Table | Tbody | Tfoot | Thead | Tr | Td | Th) => {
                        self.unexpected_tag(&tag);
                        if self.in_scope_named(table_scope, tag.id) {
                            self.pop_until_named(Select);
                            ProcessResult::Reprocess(self.reset_insertion_mode(), Token::Tag(tag))
                        } else {
                            ProcessResult::Done
                        }
                    },

                    _ => self.step(InsertionMode::InSelect, Token::Tag(tag)),
                },

                token => self.step(InsertionMode::InSelect, token),
            },

            //§ parsing-main-intemplate
            InsertionMode::InTemplate => match token {
                Token::Characters(_, _) => self.step(InsertionMode::InBody, token),
                Token::Comment(_) => self.step(InsertionMode::InBody, token),

                Token::Eof => {
                    if !self.in_html_elem_named(Template) {
                        self.stop_parsing()
                    } else {
                        self.unexpected(&token);
                        self.pop_until_named(Template);
                        self.clear_active_formatting_to_marker();
                        self.template_modes.borrow_mut().pop();
                        self.mode.set(self.reset_insertion_mode());
                        ProcessResult::Reprocess(self.reset_insertion_mode(), token)
                    }
                },

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (
                        StartTag,
                        Base | Basefont | Bgsound | Link | Meta | Noframes | Script | Style
                        | Template | Title,
                    )
                    | (EndTag, Template) => self.step(InsertionMode::InHead, Token::Tag(tag)),

                    (StartTag, Caption | Colgroup | Tbody | Tfoot | Thead) => {
                        self.template_modes.borrow_mut().pop();
                        self.template_modes
                            .borrow_mut()
                            .push(InsertionMode::InTable);
                        ProcessResult::Reprocess(InsertionMode::InTable, Token::Tag(tag))
                    },

                    (StartTag, Col) => {
                        self.template_modes.borrow_mut().pop();
                        self.template_modes
                            .borrow_mut()
                            .push(InsertionMode::InColumnGroup);
                        ProcessResult::Reprocess(InsertionMode::InColumnGroup, Token::Tag(tag))
                    },

                    (StartTag, Tr) => {
                        self.template_modes.borrow_mut().pop();
                        self.template_modes
                            .borrow_mut()
                            .push(InsertionMode::InTableBody);
                        ProcessResult::Reprocess(InsertionMode::InTableBody, Token::Tag(tag))
                    },

                    (StartTag, Td | Th) => {
                        self.template_modes.borrow_mut().pop();
                        self.template_modes.borrow_mut().push(InsertionMode::InRow);
                        ProcessResult::Reprocess(InsertionMode::InRow, Token::Tag(tag))
                    },

                    (StartTag, _) => {
                        self.template_modes.borrow_mut().pop();
                        self.template_modes
                            .borrow_mut()
                            .push(InsertionMode::InBody);
                        ProcessResult::Reprocess(InsertionMode::InBody, Token::Tag(tag))
                    },

                    (EndTag, _) => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Done
                    },
                },

                token => {
                    self.unexpected(&token);
                    ProcessResult::Done
                },
            },

            //§ parsing-main-afterbody
            InsertionMode::AfterBody => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, _) => {
                    self.step(InsertionMode::InBody, token)
                },
                Token::Comment(text) => self.append_comment_to_html(text),

                Token::Eof => self.stop_parsing(),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (EndTag, Html) => {
                        if self.is_fragment() {
                            self.unexpected_tag(&tag);
                        } else {
                            self.mode.set(InsertionMode::AfterAfterBody);
                        }
                        ProcessResult::Done
                    },

                    _ => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Reprocess(InsertionMode::InBody, Token::Tag(tag))
                    },
                },

                token => {
                    self.unexpected(&token);
                    ProcessResult::Reprocess(InsertionMode::InBody, token)
                },
            },

            //§ parsing-main-inframeset
            InsertionMode::InFrameset => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, text) => self.append_text(text),
                Token::Comment(text) => self.append_comment(text),

                Token::Eof => {
                    if self.open_elems.borrow().len() != 1 {
                        self.unexpected(&token);
                    }
                    self.stop_parsing()
                },

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (StartTag, Frameset) => {
                        self.insert_element_for(tag);
                        ProcessResult::Done
                    },

                    (EndTag, Frameset) => {
                        if self.open_elems.borrow().len() == 1 {
                            self.unexpected_tag(&tag);
                        } else {
                            self.pop();
                            if !self.is_fragment() && !self.current_node_named(Frameset) {
                                self.mode.set(InsertionMode::AfterFrameset);
                            }
                        }
                        ProcessResult::Done
                    },

                    (StartTag, Frame) => {
                        self.insert_and_pop_element_for(tag);
                        ProcessResult::DoneAckSelfClosing
                    },

                    (StartTag, Noframes) => self.step(InsertionMode::InHead, Token::Tag(tag)),

                    _ => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Done
                    },
                },

                token => {
                    self.unexpected(&token);
                    ProcessResult::Done
                },
            },

            //§ parsing-main-afterframeset
            InsertionMode::AfterFrameset => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, text) => self.append_text(text),
                Token::Comment(text) => self.append_comment(text),

                Token::Eof => self.stop_parsing(),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (EndTag, Html) => {
                        self.mode.set(InsertionMode::AfterAfterFrameset);
                        ProcessResult::Done
                    },

                    (StartTag, Noframes) => self.step(InsertionMode::InHead, Token::Tag(tag)),

                    _ => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Done
                    },
                },

                token => {
                    self.unexpected(&token);
                    ProcessResult::Done
                },
            },

            //§ the-after-after-body-insertion-mode
            InsertionMode::AfterAfterBody => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, _) => {
                    self.step(InsertionMode::InBody, token)
                },
                Token::Comment(text) => self.append_comment_to_doc(text),

                Token::Eof => self.stop_parsing(),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    _ => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Reprocess(InsertionMode::InBody, Token::Tag(tag))
                    },
                },

                token => {
                    self.unexpected(&token);
                    ProcessResult::Reprocess(InsertionMode::InBody, token)
                },
            },

            //§ the-after-after-frameset-insertion-mode
            InsertionMode::AfterAfterFrameset => match token {
                Token::Characters(SplitStatus::NotSplit, text) => {
                    ProcessResult::SplitWhitespace(text)
                },
                Token::Characters(SplitStatus::Whitespace, _) => {
                    self.step(InsertionMode::InBody, token)
                },
                Token::Comment(text) => self.append_comment_to_doc(text),

                Token::Eof => self.stop_parsing(),

                Token::Tag(tag) => match (tag.kind, tag.id) {
                    (StartTag, Html) => self.step(InsertionMode::InBody, Token::Tag(tag)),

                    (StartTag, Noframes) => self.step(InsertionMode::InHead, Token::Tag(tag)),

                    _ => {
                        self.unexpected_tag(&tag);
                        ProcessResult::Done
                    },
                },

                token => {
                    self.unexpected(&token);
                    ProcessResult::Done
                },
            },
            //§ END
        }
    }

    /// The InBody rules for tag tokens, split out because the mode is by far
    /// the largest.
    fn step_in_body_tag(&self, tag: Tag) -> ProcessResult<Handle> {
        match (tag.kind, tag.id) {
            (StartTag, Html) => {
                self.unexpected_tag(&tag);
                if !self.in_html_elem_named(Template) {
                    let open_elems = self.open_elems.borrow();
                    let top = html_elem(&open_elems);
                    self.sink.add_attrs_if_missing(top, tag.attrs);
                }
                ProcessResult::Done
            },

            (
                StartTag,
                Base | Basefont | Bgsound | Link | Meta | Noframes | Script | Style | Template
                | Title,
            )
            | (EndTag, Template) => self.step(InsertionMode::InHead, Token::Tag(tag)),

            (StartTag, Body) => {
                self.unexpected_tag(&tag);
                let body_elem = self.body_elem().as_deref().cloned();
                match body_elem {
                    Some(ref node)
                        if self.open_elems.borrow().len() != 1
                            && !self.in_html_elem_named(Template) =>
                    {
                        self.frameset_ok.set(false);
                        self.sink.add_attrs_if_missing(node, tag.attrs)
                    },
                    _ => {},
                }
                ProcessResult::Done
            },

            (StartTag, Frameset) => {
                self.unexpected_tag(&tag);
                if !self.frameset_ok.get() {
                    return ProcessResult::Done;
                }

                let Some(body) = self.body_elem().map(|b| b.clone()) else {
                    return ProcessResult::Done;
                };
                self.sink.remove_from_parent(&body);

                // FIXME: can we get here in the fragment case?
                // What to do with the first element then?
                self.open_elems.borrow_mut().truncate(1);
                self.insert_element_for(tag);
                self.mode.set(InsertionMode::InFrameset);
                ProcessResult::Done
            },

            (EndTag, Body) => {
                if self.in_scope_named(default_scope, Body) {
                    self.check_body_end();
                    self.mode.set(InsertionMode::AfterBody);
                } else {
                    self.sink.parse_error(ErrorCode::UnexpectedEndTag);
                }
                ProcessResult::Done
            },

            (EndTag, Html) => {
                if self.in_scope_named(default_scope, Body) {
                    self.check_body_end();
                    ProcessResult::Reprocess(InsertionMode::AfterBody, Token::Tag(tag))
                } else {
                    self.sink.parse_error(ErrorCode::UnexpectedEndTag);
                    ProcessResult::Done
                }
            },

            (
                StartTag,
                Address | Article | Aside | Blockquote | Center | Details | Dialog | Dir | Div
                | Dl | Fieldset | Figcaption | Figure | Footer | Header | Hgroup | Main | Menu
                | Nav | Ol | P | Search | Section | Summary | Ul,
            ) => {
                self.close_p_element_in_button_scope();
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, H1 | H2 | H3 | H4 | H5 | H6) => {
                self.close_p_element_in_button_scope();
                if self.current_node_in(heading_tag) {
                    self.sink.parse_error(ErrorCode::UnexpectedStartTag);
                    self.pop();
                }
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, Pre | Listing) => {
                self.close_p_element_in_button_scope();
                self.insert_element_for(tag);
                self.ignore_lf.set(true);
                self.frameset_ok.set(false);
                ProcessResult::Done
            },

            (StartTag, Form) => {
                if self.form_elem.borrow().is_some() && !self.in_html_elem_named(Template) {
                    self.sink.parse_error(ErrorCode::UnexpectedStartTag);
                } else {
                    self.close_p_element_in_button_scope();
                    let elem = self.insert_element_for(tag);
                    if !self.in_html_elem_named(Template) {
                        *self.form_elem.borrow_mut() = Some(elem);
                    }
                }
                ProcessResult::Done
            },

            (StartTag, Li | Dd | Dt) => {
                declare_tag_set!(close_list = Li);
                declare_tag_set!(close_defn = Dd Dt);
                declare_tag_set!(extra_special = [special_tag] - Address Div P);
                let list = match tag.id {
                    Li => true,
                    Dd | Dt => false,
                    _ => unreachable!(),
                };

                self.frameset_ok.set(false);

                let mut to_close = None;
                for node in self.open_elems.borrow().iter().rev() {
                    let name = self.sink.elem_name(node);
                    let can_close = if list {
                        close_list(name)
                    } else {
                        close_defn(name)
                    };
                    if can_close {
                        to_close = Some(name.id);
                        break;
                    }
                    if extra_special(name) {
                        break;
                    }
                }

                if let Some(id) = to_close {
                    self.generate_implied_end_except(id);
                    self.expect_to_close(id);
                }

                self.close_p_element_in_button_scope();
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, Plaintext) => {
                self.close_p_element_in_button_scope();
                self.insert_element_for(tag);
                ProcessResult::ToPlaintext
            },

            (StartTag, Button) => {
                if self.in_scope_named(default_scope, Button) {
                    self.sink.parse_error(ErrorCode::UnexpectedStartTag);
                    self.generate_implied_end_tags(cursory_implied_end);
                    self.pop_until_named(Button);
                }
                self.reconstruct_active_formatting_elements();
                self.insert_element_for(tag);
                self.frameset_ok.set(false);
                ProcessResult::Done
            },

            (
                EndTag,
                Address | Article | Aside | Blockquote | Button | Center | Details | Dialog
                | Dir | Div | Dl | Fieldset | Figcaption | Figure | Footer | Header | Hgroup
                | Listing | Main | Menu | Nav | Ol | Pre | Search | Section | Summary | Ul,
            ) => {
                if !self.in_scope_named(default_scope, tag.id) {
                    self.unexpected_tag(&tag);
                } else {
                    self.generate_implied_end_tags(cursory_implied_end);
                    self.expect_to_close(tag.id);
                }
                ProcessResult::Done
            },

            (EndTag, Form) => {
                if !self.in_html_elem_named(Template) {
                    let Some(node) = self.form_elem.take() else {
                        self.sink.parse_error(ErrorCode::UnexpectedEndTag);
                        return ProcessResult::Done;
                    };
                    if !self.in_scope(default_scope, |n| self.sink.same_node(&node, &n)) {
                        self.sink.parse_error(ErrorCode::UnexpectedEndTag);
                        return ProcessResult::Done;
                    }
                    self.generate_implied_end_tags(cursory_implied_end);
                    let current = self.current_node().clone();
                    self.remove_from_stack(&node);
                    if !self.sink.same_node(&current, &node) {
                        self.sink
                            .parse_error(ErrorCode::EndTagDoesNotMatchCurrentOpenElement);
                    }
                } else {
                    if !self.in_scope_named(default_scope, Form) {
                        self.sink.parse_error(ErrorCode::UnexpectedEndTag);
                        return ProcessResult::Done;
                    }
                    self.generate_implied_end_tags(cursory_implied_end);
                    if !self.current_node_named(Form) {
                        self.sink
                            .parse_error(ErrorCode::EndTagDoesNotMatchCurrentOpenElement);
                    }
                    self.pop_until_named(Form);
                }
                ProcessResult::Done
            },

            (EndTag, P) => {
                if !self.in_scope_named(button_scope, P) {
                    self.sink.parse_error(ErrorCode::UnexpectedEndTag);
                    self.insert_phantom("p");
                }
                self.close_p_element();
                ProcessResult::Done
            },

            (EndTag, Li | Dd | Dt) => {
                let in_scope = if tag.id == Li {
                    self.in_scope_named(list_item_scope, tag.id)
                } else {
                    self.in_scope_named(default_scope, tag.id)
                };
                if in_scope {
                    self.generate_implied_end_except(tag.id);
                    self.expect_to_close(tag.id);
                } else {
                    self.sink.parse_error(ErrorCode::UnexpectedEndTag);
                }
                ProcessResult::Done
            },

            (EndTag, H1 | H2 | H3 | H4 | H5 | H6) => {
                if self.in_scope(default_scope, |n| self.elem_in(&n, heading_tag)) {
                    self.generate_implied_end_tags(cursory_implied_end);
                    if !self.current_node_named(tag.id) {
                        self.sink
                            .parse_error(ErrorCode::EndTagDoesNotMatchCurrentOpenElement);
                    }
                    self.pop_until(heading_tag);
                } else {
                    self.sink.parse_error(ErrorCode::UnexpectedEndTag);
                }
                ProcessResult::Done
            },

            (StartTag, A) => {
                self.handle_misnested_a_tags(&tag);
                self.reconstruct_active_formatting_elements();
                self.create_formatting_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, B | Big | Code | Em | Font | I | S | Small | Strike | Strong | Tt | U) => {
                self.reconstruct_active_formatting_elements();
                self.create_formatting_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, Nobr) => {
                self.reconstruct_active_formatting_elements();
                if self.in_scope_named(default_scope, Nobr) {
                    self.sink.parse_error(ErrorCode::UnexpectedStartTag);
                    self.adoption_agency(Tag {
                        kind: EndTag,
                        self_closing: false,
                        attrs: vec![],
                        ..tag.clone()
                    });
                    self.reconstruct_active_formatting_elements();
                }
                self.create_formatting_element_for(tag);
                ProcessResult::Done
            },

            (
                EndTag,
                A | B | Big | Code | Em | Font | I | Nobr | S | Small | Strike | Strong | Tt | U,
            ) => {
                self.adoption_agency(tag);
                ProcessResult::Done
            },

            (StartTag, Applet | Marquee | Object) => {
                self.reconstruct_active_formatting_elements();
                self.insert_element_for(tag);
                self.active_formatting
                    .borrow_mut()
                    .push(FormatEntry::Marker);
                self.frameset_ok.set(false);
                ProcessResult::Done
            },

            (EndTag, Applet | Marquee | Object) => {
                if !self.in_scope_named(default_scope, tag.id) {
                    self.unexpected_tag(&tag);
                } else {
                    self.generate_implied_end_tags(cursory_implied_end);
                    self.expect_to_close(tag.id);
                    self.clear_active_formatting_to_marker();
                }
                ProcessResult::Done
            },

            (StartTag, Table) => {
                if self.quirks_mode.get() != QuirksMode::Quirks {
                    self.close_p_element_in_button_scope();
                }
                self.insert_element_for(tag);
                self.frameset_ok.set(false);
                self.mode.set(InsertionMode::InTable);
                ProcessResult::Done
            },

            (EndTag, Br) => {
                self.unexpected_tag(&tag);
                self.step_in_body_tag(Tag {
                    kind: StartTag,
                    attrs: vec![],
                    ..tag
                })
            },

            (StartTag, Area | Br | Embed | Img | Keygen | Wbr | Input) => {
                let keep_frameset_ok = match tag.id {
                    Input => self.is_type_hidden(&tag),
                    _ => false,
                };
                self.reconstruct_active_formatting_elements();
                self.insert_and_pop_element_for(tag);
                if !keep_frameset_ok {
                    self.frameset_ok.set(false);
                }
                ProcessResult::DoneAckSelfClosing
            },

            (StartTag, Param | Source | Track) => {
                self.insert_and_pop_element_for(tag);
                ProcessResult::DoneAckSelfClosing
            },

            (StartTag, Hr) => {
                self.close_p_element_in_button_scope();
                self.insert_and_pop_element_for(tag);
                self.frameset_ok.set(false);
                ProcessResult::DoneAckSelfClosing
            },

            (StartTag, Image) => {
                self.unexpected_tag(&tag);
                self.step_in_body_tag(Tag {
                    name: StrTendril::from_slice("img"),
                    id: Img,
                    ..tag
                })
            },

            (StartTag, Textarea) => {
                self.ignore_lf.set(true);
                self.frameset_ok.set(false);
                self.parse_raw_data(tag, Rcdata)
            },

            (StartTag, Xmp) => {
                self.close_p_element_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok.set(false);
                self.parse_raw_data(tag, Rawtext)
            },

            (StartTag, Iframe) => {
                self.frameset_ok.set(false);
                self.parse_raw_data(tag, Rawtext)
            },

            (StartTag, Noembed) => self.parse_raw_data(tag, Rawtext),

            // <noscript> handled in wildcard case below

            (StartTag, Select) => {
                self.reconstruct_active_formatting_elements();
                self.insert_element_for(tag);
                self.frameset_ok.set(false);
                // NB: mode == InBody but possibly self.mode != mode, if
                // we're processing "as in the rules for InBody".
                self.mode.set(match self.mode.get() {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                });
                ProcessResult::Done
            },

            (StartTag, Optgroup | Option) => {
                if self.current_node_named(Option) {
                    self.pop();
                }
                self.reconstruct_active_formatting_elements();
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, Rb | Rtc) => {
                if self.in_scope_named(default_scope, Ruby) {
                    self.generate_implied_end_tags(cursory_implied_end);
                }
                if !self.current_node_named(Ruby) {
                    self.unexpected_tag(&tag);
                }
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, Rp | Rt) => {
                if self.in_scope_named(default_scope, Ruby) {
                    self.generate_implied_end_except(Rtc);
                }
                if !self.current_node_named(Rtc) && !self.current_node_named(Ruby) {
                    self.unexpected_tag(&tag);
                }
                self.insert_element_for(tag);
                ProcessResult::Done
            },

            (StartTag, Math) => self.enter_foreign(tag, Namespace::MathML),

            (StartTag, Svg) => self.enter_foreign(tag, Namespace::Svg),

            (
                StartTag,
                Caption | Col | Colgroup | Frame | Head | Tbody | Td | Tfoot | Th | Thead | Tr,
            ) => {
                self.unexpected_tag(&tag);
                ProcessResult::Done
            },

            (StartTag, _) => {
                if self.opts.scripting_enabled && tag.id == Noscript {
                    self.parse_raw_data(tag, Rawtext)
                } else {
                    self.reconstruct_active_formatting_elements();
                    self.insert_element_for(tag);
                    ProcessResult::Done
                }
            },

            (EndTag, _) => {
                self.process_end_tag_in_body(tag);
                ProcessResult::Done
            },
        }
    }

    pub(crate) fn step_foreign(&self, token: Token) -> ProcessResult<Handle> {
        match token {
            Token::NullCharacter => {
                self.unexpected(&token);
                self.append_text("\u{fffd}".to_tendril())
            },

            Token::Characters(_, text) => {
                if any_not_whitespace(&text) {
                    self.frameset_ok.set(false);
                }
                self.append_text(text)
            },

            Token::Comment(text) => self.append_comment(text),

            Token::Tag(tag) => match (tag.kind, tag.id) {
                (
                    StartTag,
                    B | Big | Blockquote | Body | Br | Center | Code | Dd | Div | Dl | Dt | Em
                    | Embed | H1 | H2 | H3 | H4 | H5 | H6 | Head | Hr | I | Img | Li | Listing
                    | Menu | Meta | Nobr | Ol | P | Pre | Ruby | S | Small | Span | Strong
                    | Strike | Sub | Sup | Table | Tt | U | Ul | Var,
                )
                | (EndTag, Br | P) => self.unexpected_start_tag_in_foreign_content(tag),

                (StartTag, Font) => {
                    let unexpected = tag.attrs.iter().any(|attr| {
                        attr.ns == Namespace::None
                            && matches!(&*attr.name, "color" | "face" | "size")
                    });
                    if unexpected {
                        self.unexpected_start_tag_in_foreign_content(tag)
                    } else {
                        self.foreign_start_tag(tag)
                    }
                },

                (StartTag, _) => self.foreign_start_tag(tag),

                // FIXME: </script> in SVG

                (EndTag, _) => {
                    let mut first = true;
                    let mut stack_idx = self.open_elems.borrow().len() - 1;
                    loop {
                        if stack_idx == 0 {
                            return ProcessResult::Done;
                        }

                        let html;
                        let eq;
                        {
                            let open_elems = self.open_elems.borrow();
                            let node = &open_elems[stack_idx];
                            html = self.sink.elem_name(node).ns == Namespace::Html;
                            eq = self
                                .sink
                                .elem_local_name(node)
                                .eq_ignore_ascii_case(&tag.name);
                        }
                        if !first && html {
                            let mode = self.mode.get();
                            return self.step(mode, Token::Tag(tag));
                        }

                        if eq {
                            self.open_elems.borrow_mut().truncate(stack_idx);
                            return ProcessResult::Done;
                        }

                        if first {
                            self.unexpected_tag(&tag);
                            first = false;
                        }
                        stack_idx -= 1;
                    }
                },
            },

            Token::Eof => panic!("impossible case in foreign content"),
        }
    }
}
