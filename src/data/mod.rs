// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The static knowledge base: element and attribute name tables, content
//! models, paired/void classification, and the named character-reference
//! table. Everything here is immutable shared data, built at most once per
//! process.

pub mod attributes;
pub mod entities;
pub mod models;
pub mod tags;

pub use self::attributes::AttributeType;
pub use self::models::ContentModel;
pub use self::tags::{ElementType, TagStructure};
