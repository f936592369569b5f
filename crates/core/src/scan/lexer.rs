use crate::stream::CancellationToken;
use std::io::BufRead;

/// Classification of a scanner item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A read failure; the item text carries the error, and the scanner
    /// terminates afterwards.
    Error,
    /// End of input. Emitted once all content has been delivered, and
    /// repeated on further calls.
    Eof,
    /// Content outside any block, skipped by the parser.
    Ignore,
    /// `{` opening a block.
    BlockLeft,
    /// The block label (e.g. `1`).
    BlockLabel,
    /// `:` after a block label.
    BlockLabelMeta,
    /// Opaque block content.
    BlockContent,
    /// `}` closing a block.
    BlockRight,
    /// `{` opening a sub-block inside a block.
    SubBlockLeft,
    /// The sub-block label (e.g. `CHK`).
    SubBlockLabel,
    /// `:` after a sub-block label.
    SubBlockLabelMeta,
    /// Opaque sub-block content.
    SubBlockContent,
    /// `}` closing a sub-block.
    SubBlockRight,
    /// `:` opening a body field tag.
    TagLeft,
    /// The tag text (e.g. `61`).
    TagContent,
    /// `:` closing a body field tag.
    TagRight,
    /// The value of a body field, up to the next tag or the `-}` terminator.
    FieldContent,
}

/// One item produced by the scanner: its kind, its text, and the 1-based
/// input line the scanner had reached when the item was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// The item's classification.
    pub kind: ItemKind,
    /// The item's text. Delimiter items carry the delimiter itself.
    pub text: String,
    /// The 1-based line counter at emission.
    pub line: usize,
}

#[derive(Debug, Clone, Copy)]
enum State {
    ToBlock,
    BlockLeft,
    BlockLabel,
    BlockLabelMeta,
    BlockContent,
    BlockRight,
    SubBlockLeft,
    SubBlockLabel,
    SubBlockLabelMeta,
    SubBlockContent,
    SubBlockRight,
    TagLeft,
    TagContent,
    TagRight,
    FieldContent,
    Done,
}

/// A pull-based scanner over the `{label:content}` block grammar.
///
/// The scanner recognizes delimiters by longest-suffix matching on an
/// accumulating buffer; when a delimiter appears, the text before it is
/// emitted and the delimiter seeds the next state's buffer. Reads are the
/// only suspension points, and the cancellation token is consulted before
/// each read: a cancelled scanner reports end of input at the next read
/// boundary.
pub struct Lexer<R> {
    input: R,
    cancel: CancellationToken,
    buf: String,
    line: usize,
    state: State,
}

impl<R: BufRead> Lexer<R> {
    /// Create a scanner over `input` that cannot be cancelled.
    pub fn new(input: R) -> Lexer<R> {
        Lexer::with_cancellation(input, CancellationToken::new())
    }

    /// Create a scanner that stops reading once `cancel` fires.
    pub fn with_cancellation(input: R, cancel: CancellationToken) -> Lexer<R> {
        Lexer {
            input,
            cancel,
            buf: String::new(),
            line: 1,
            state: State::ToBlock,
        }
    }

    /// Produce the next item. After [`ItemKind::Eof`] or [`ItemKind::Error`]
    /// every further call returns [`ItemKind::Eof`].
    pub fn next_item(&mut self) -> Item {
        use ItemKind as K;
        use State as S;
        loop {
            match self.state {
                S::Done => return self.item(K::Eof, String::new()),
                S::ToBlock => return self.text(K::Ignore, &[("{", S::BlockLeft)]),
                S::BlockLeft => return self.meta(K::BlockLeft, S::BlockLabel),
                S::BlockLabel => {
                    return self.text(K::BlockLabel, &[(":", S::BlockLabelMeta)]);
                }
                S::BlockLabelMeta => return self.meta(K::BlockLabelMeta, S::BlockContent),
                S::BlockContent => {
                    return self.text(
                        K::BlockContent,
                        &[
                            ("}", S::BlockRight),
                            ("{", S::SubBlockLeft),
                            (":", S::TagLeft),
                        ],
                    );
                }
                S::BlockRight => return self.meta(K::BlockRight, S::ToBlock),
                S::SubBlockLeft => return self.meta(K::SubBlockLeft, S::SubBlockLabel),
                S::SubBlockLabel => {
                    return self.text(K::SubBlockLabel, &[(":", S::SubBlockLabelMeta)]);
                }
                S::SubBlockLabelMeta => {
                    return self.meta(K::SubBlockLabelMeta, S::SubBlockContent);
                }
                S::SubBlockContent => {
                    return self.text(K::SubBlockContent, &[("}", S::SubBlockRight)]);
                }
                S::SubBlockRight => return self.meta(K::SubBlockRight, S::BlockContent),
                S::TagLeft => return self.meta(K::TagLeft, S::TagContent),
                S::TagContent => return self.text(K::TagContent, &[(":", S::TagRight)]),
                S::TagRight => return self.meta(K::TagRight, S::FieldContent),
                S::FieldContent => {
                    return self.text(
                        K::FieldContent,
                        &[(":", S::TagLeft), ("-}", S::BlockContent)],
                    );
                }
            }
        }
    }

    fn item(&self, kind: ItemKind, text: String) -> Item {
        Item {
            kind,
            text,
            line: self.line,
        }
    }

    /// Emit the buffered delimiter and move on.
    fn meta(&mut self, kind: ItemKind, next: State) -> Item {
        let text = std::mem::take(&mut self.buf);
        self.state = next;
        self.item(kind, text)
    }

    /// Accumulate text until one of the route delimiters ends the buffer.
    /// The content before the delimiter is emitted; the delimiter itself
    /// stays buffered for the next state.
    fn text(&mut self, kind: ItemKind, routes: &[(&str, State)]) -> Item {
        loop {
            for (suffix, next) in routes {
                if self.buf.ends_with(suffix) {
                    let content = self.buf[..self.buf.len() - suffix.len()].to_string();
                    self.buf = suffix.to_string();
                    self.state = *next;
                    return self.item(kind, content);
                }
            }

            match self.read_char() {
                Ok(Some(c)) => {
                    self.buf.push(c);
                    if c == '\n' {
                        self.line += 1;
                    }
                }
                Ok(None) => {
                    self.state = State::Done;
                    let content = std::mem::take(&mut self.buf);
                    return self.item(kind, content);
                }
                Err(err) => {
                    self.state = State::Done;
                    self.buf.clear();
                    return self.item(ItemKind::Error, err.to_string());
                }
            }
        }
    }

    /// Read one UTF-8 scalar from the input. Invalid sequences decode to
    /// U+FFFD rather than failing the scan.
    fn read_char(&mut self) -> Result<Option<char>, std::io::Error> {
        if self.cancel.is_cancelled() {
            return Ok(None);
        }

        let mut first = [0u8; 1];
        if self.input.read(&mut first)? == 0 {
            return Ok(None);
        }

        let width = utf8_width(first[0]);
        if width == 1 {
            return Ok(Some(char::from(first[0])));
        }

        let mut rest = [0u8; 3];
        let tail = &mut rest[..width - 1];
        if self.input.read_exact(tail).is_err() {
            return Ok(Some(char::REPLACEMENT_CHARACTER));
        }
        let mut seq = [0u8; 4];
        seq[0] = first[0];
        seq[1..width].copy_from_slice(tail);
        match std::str::from_utf8(&seq[..width]) {
            Ok(s) => Ok(s.chars().next()),
            Err(_) => Ok(Some(char::REPLACEMENT_CHARACTER)),
        }
    }
}

/// Expected sequence length for a UTF-8 leading byte. Stray continuation
/// bytes count as width 1 and decode to U+FFFD via the caller.
fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}
