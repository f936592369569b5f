//! Block-structure scanning.
//!
//! An MT message frames its content in five numbered blocks:
//! `{1:…}{2:…}{3:…}{4:…}{5:…}`. Blocks 3 and 5 hold nested
//! `{label:content}` sub-blocks; block 4 holds the body as `:tag:value`
//! fields terminated by `-}`. This module scans a byte stream into items
//! ([`lexer`]) and assembles the items into generic messages ([`parser`]),
//! one per occurrence of block 1.

/// The stream lexer: a suffix-delimiter state machine over a `BufRead`.
pub mod lexer;
/// The block parser: items in, generic messages out.
pub mod parser;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub(crate) const BLOCK_LABEL_BASIC_HEADER: &str = "1";
pub(crate) const BLOCK_LABEL_APP_HEADER: &str = "2";
pub(crate) const BLOCK_LABEL_USR_HEADER: &str = "3";
pub(crate) const BLOCK_LABEL_BODY: &str = "4";
pub(crate) const BLOCK_LABEL_TRAILERS: &str = "5";

/// A nested `{label:content}` group inside block 3 or 5.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubBlock {
    /// The sub-block label (e.g. `CHK`).
    pub label: String,
    /// The opaque sub-block content.
    pub content: String,
}

/// An outer `{label:content}` block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    /// The block label (`1` through `5` on the wire).
    pub label: String,
    /// The opaque content, for blocks without inner structure.
    pub content: String,
    /// Body fields by tag, each tag's values in wire order. Populated for
    /// block 4 only.
    pub fields: BTreeMap<String, Vec<String>>,
    /// Nested sub-blocks, in wire order. Populated for blocks 3 and 5.
    pub blocks: Vec<SubBlock>,
}

/// A generic message as produced by the block parser: headers still raw,
/// body as a tag-to-values mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawMessage {
    /// The 1-based input line the message's basic header block started on.
    pub line: usize,
    /// Reconstruction of the message in canonical block order 1-2-3-4-5,
    /// regardless of wire order.
    pub raw: String,
    /// Block 1.
    pub basic_header: Block,
    /// Block 2.
    pub app_header: Block,
    /// Block 3.
    pub usr_header: Block,
    /// Block 4's fields: tag to values, values in wire order.
    pub body: BTreeMap<String, Vec<String>>,
    /// Block 5.
    pub trailers: Block,
}

impl RawMessage {
    /// Assemble a message from the blocks collected between two basic
    /// headers. Later duplicates of a label overwrite earlier ones.
    pub(crate) fn from_blocks(blocks: Vec<Block>, line: usize) -> RawMessage {
        let mut message = RawMessage {
            line,
            ..RawMessage::default()
        };

        let mut raw_basic = String::new();
        let mut raw_app = String::new();
        let mut raw_usr = String::new();
        let mut raw_body = String::new();
        let mut raw_trailers = String::new();

        for block in blocks {
            let rendered = format!("{{{}:{}}}", block.label, block.content);
            match block.label.as_str() {
                BLOCK_LABEL_BASIC_HEADER => {
                    raw_basic = rendered;
                    message.basic_header = block;
                }
                BLOCK_LABEL_APP_HEADER => {
                    raw_app = rendered;
                    message.app_header = block;
                }
                BLOCK_LABEL_USR_HEADER => {
                    raw_usr = rendered;
                    message.usr_header = block;
                }
                BLOCK_LABEL_BODY => {
                    raw_body = rendered;
                    message.body = block.fields;
                }
                BLOCK_LABEL_TRAILERS => {
                    raw_trailers = rendered;
                    message.trailers = block;
                }
                _ => {}
            }
        }

        message.raw = raw_basic + &raw_app + &raw_usr + &raw_body + &raw_trailers;
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_labels_overwrite_earlier_blocks() {
        let blocks = vec![
            Block {
                label: "2".into(),
                content: "first".into(),
                ..Block::default()
            },
            Block {
                label: "2".into(),
                content: "second".into(),
                ..Block::default()
            },
        ];
        let message = RawMessage::from_blocks(blocks, 1);
        assert_eq!(message.app_header.content, "second");
        assert_eq!(message.raw, "{2:second}");
    }

    #[test]
    fn message_serde_round_trip() {
        let mut block = Block {
            label: "4".into(),
            ..Block::default()
        };
        block
            .fields
            .insert("20".into(), vec!["REFERENCE".into()]);
        let message = RawMessage::from_blocks(vec![block], 3);

        let json = serde_json::to_string(&message).expect("serializable");
        let back: RawMessage = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(message, back);
    }
}
