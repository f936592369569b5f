use super::lexer::{Item, ItemKind, Lexer};
use super::{Block, RawMessage, SubBlock};
use std::io::BufRead;
use swift_mt_diagnostics::{MtError, ParseError, ScanError};

/// Anything that can feed scanner items to the parser: the scanner itself,
/// or the receiving end of a queue a scanner task writes into.
pub trait ItemSource {
    /// Produce the next item. Must keep returning [`ItemKind::Eof`] once the
    /// input is exhausted.
    fn next_item(&mut self) -> Item;
}

impl<R: BufRead> ItemSource for Lexer<R> {
    fn next_item(&mut self) -> Item {
        Lexer::next_item(self)
    }
}

impl ItemSource for std::sync::mpsc::Receiver<Item> {
    fn next_item(&mut self) -> Item {
        self.recv().unwrap_or(Item {
            kind: ItemKind::Eof,
            text: String::new(),
            line: 0,
        })
    }
}

/// One parser outcome: a complete generic message, or an error tagged with
/// the line of the message being assembled when it occurred.
#[derive(Debug)]
pub enum Event {
    /// A complete generic message.
    Message(RawMessage),
    /// A scanner failure.
    Error(ParseError),
}

/// Assembles scanner items into generic messages.
///
/// Blocks accumulate until a new block labeled `1` arrives, which flushes
/// the accumulated blocks as one message; end of input flushes the last
/// message. With `stop_on_error` set, the first scanner error ends parsing
/// without a flush.
pub struct Parser<S> {
    items: S,
    stop_on_error: bool,
    done: bool,
    blocks: Vec<Block>,
    curr_line: usize,
    curr_block: Block,
    curr_sub_block: SubBlock,
    curr_tag: String,
}

impl<S: ItemSource> Parser<S> {
    /// Create a parser over an item source.
    pub fn new(items: S, stop_on_error: bool) -> Parser<S> {
        Parser {
            items,
            stop_on_error,
            done: false,
            blocks: Vec::new(),
            curr_line: 1,
            curr_block: Block::default(),
            curr_sub_block: SubBlock::default(),
            curr_tag: String::new(),
        }
    }

    /// Produce the next event, or `None` once the input is exhausted.
    pub fn next_event(&mut self) -> Option<Event> {
        if self.done {
            return None;
        }

        loop {
            let item = self.items.next_item();
            match item.kind {
                ItemKind::BlockLabel => {
                    // A new basic header starts a new message; whatever was
                    // accumulated before it is complete.
                    if item.text == super::BLOCK_LABEL_BASIC_HEADER {
                        let flushed = self.flush();
                        self.curr_line = item.line;
                        self.curr_block = Block {
                            label: item.text,
                            ..Block::default()
                        };
                        if let Some(message) = flushed {
                            return Some(Event::Message(message));
                        }
                    } else {
                        self.curr_block = Block {
                            label: item.text,
                            ..Block::default()
                        };
                    }
                }
                ItemKind::BlockContent => self.curr_block.content = item.text,
                ItemKind::SubBlockLeft => self.curr_sub_block = SubBlock::default(),
                ItemKind::SubBlockLabel => self.curr_sub_block.label = item.text,
                ItemKind::SubBlockContent => self.curr_sub_block.content = item.text,
                ItemKind::SubBlockRight => {
                    let sub = std::mem::take(&mut self.curr_sub_block);
                    self.curr_block.blocks.push(sub);
                }
                ItemKind::TagContent => self.curr_tag = item.text,
                ItemKind::FieldContent => {
                    let tag = std::mem::take(&mut self.curr_tag);
                    self.curr_block
                        .fields
                        .entry(tag)
                        .or_default()
                        .push(item.text.trim().to_string());
                }
                ItemKind::BlockRight => {
                    let block = std::mem::take(&mut self.curr_block);
                    self.blocks.push(block);
                }
                ItemKind::Error => {
                    if self.stop_on_error {
                        self.done = true;
                    }
                    let error = ParseError::new(
                        MtError::Scan(ScanError::ReadFailed(item.text)),
                        self.curr_line,
                    );
                    return Some(Event::Error(error));
                }
                ItemKind::Eof => {
                    self.done = true;
                    return self.flush().map(Event::Message);
                }
                ItemKind::Ignore
                | ItemKind::BlockLeft
                | ItemKind::BlockLabelMeta
                | ItemKind::TagLeft
                | ItemKind::TagRight
                | ItemKind::SubBlockLabelMeta => {}
            }
        }
    }

    fn flush(&mut self) -> Option<RawMessage> {
        if self.blocks.is_empty() {
            return None;
        }
        let blocks = std::mem::take(&mut self.blocks);
        Some(RawMessage::from_blocks(blocks, self.curr_line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> (Vec<RawMessage>, Vec<ParseError>) {
        let mut parser = Parser::new(Lexer::new(input.as_bytes()), false);
        let mut messages = Vec::new();
        let mut errors = Vec::new();
        while let Some(event) = parser.next_event() {
            match event {
                Event::Message(m) => messages.push(m),
                Event::Error(e) => errors.push(e),
            }
        }
        (messages, errors)
    }

    #[test]
    fn one_block_one_message() {
        let (messages, errors) = parse_all("{1:F01SCBLZAJJXXXX5712100002}");
        assert!(errors.is_empty());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].basic_header.label, "1");
        assert_eq!(messages[0].basic_header.content, "F01SCBLZAJJXXXX5712100002");
    }

    #[test]
    fn new_basic_header_flushes_previous_message() {
        let (messages, _) = parse_all("{1:aaa}{2:bbb}{1:ccc}{2:ddd}");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].basic_header.content, "aaa");
        assert_eq!(messages[0].app_header.content, "bbb");
        assert_eq!(messages[1].basic_header.content, "ccc");
        assert_eq!(messages[1].app_header.content, "ddd");
    }

    #[test]
    fn field_values_accumulate_in_wire_order() {
        let (messages, _) = parse_all("{1:h}{4:\n:21:first\n:21:second\n:20:only\n-}");
        let body = &messages[0].body;
        assert_eq!(body["21"], vec!["first", "second"]);
        assert_eq!(body["20"], vec!["only"]);
    }

    #[test]
    fn field_values_are_whitespace_trimmed() {
        let (messages, _) = parse_all("{1:h}{4:\n:20: padded \n-}");
        assert_eq!(messages[0].body["20"], vec!["padded"]);
    }

    #[test]
    fn raw_is_reconstructed_in_canonical_order() {
        // Blocks 5 and 2 arrive out of order; the reconstruction is 1-2-5.
        let (messages, _) = parse_all("{5:{CHK:x}}{1:aaa}{2:bbb}");
        assert_eq!(messages.len(), 2, "the leading 5 forms its own message");
        assert_eq!(messages[1].raw, "{1:aaa}{2:bbb}");
    }

    #[test]
    fn message_line_is_where_its_basic_header_started() {
        let (messages, _) = parse_all("{1:aaa}\n{1:bbb}\n{1:ccc}");
        let lines: Vec<usize> = messages.iter().map(|m| m.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }
}
