//! The parsing pipeline: entry points, queues, and cancellation.
//!
//! The streaming entry runs the scanner and the parser/decoder as two
//! threads connected by bounded queues, so arbitrarily large inputs parse
//! in constant memory with back-pressure: a slow consumer blocks the
//! producers, nothing is dropped. The batch entry drives the same pipeline
//! as a single-threaded pull loop, which keeps it free of `Send` bounds.

use crate::config::ParseConfig;
use crate::headers::decode_message;
use crate::record::Mtx;
use crate::scan::lexer::{Item, ItemKind, Lexer};
use crate::scan::parser::{Event, Parser};
use std::io::{BufReader, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;
use std::thread;
use swift_mt_diagnostics::{ParseError, ParseErrors};

/// Capacity of the scanner-to-parser item queue.
const ITEM_QUEUE_BOUND: usize = 256;
/// Capacity of the message and error queues handed to the caller.
pub(crate) const QUEUE_BOUND: usize = 64;

/// A cloneable cancellation handle.
///
/// The scanner consults the token before every read; once cancelled it
/// reports end of input at the next read boundary, which drains and closes
/// the rest of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// `true` once [`CancellationToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Parse a stream of MT messages, yielding generic messages and errors on
/// separate bounded channels.
///
/// Messages whose headers fail to decode are reported on the error channel
/// and not yielded. Both channels close when the input is exhausted or the
/// token is cancelled. Items are emitted strictly in source order.
///
/// For inputs that comfortably fit in memory, [`parse_all_mtx`] is the
/// convenient form.
pub fn parse_mtx<R>(
    reader: R,
    config: ParseConfig,
    cancel: CancellationToken,
) -> (Receiver<Mtx>, Receiver<ParseError>)
where
    R: Read + Send + 'static,
{
    let (item_tx, item_rx) = sync_channel::<Item>(ITEM_QUEUE_BOUND);

    // Scanner task: read bytes, push items.
    thread::spawn(move || {
        let mut lexer = Lexer::with_cancellation(BufReader::new(reader), cancel);
        loop {
            let item = lexer.next_item();
            let terminal = matches!(item.kind, ItemKind::Eof | ItemKind::Error);
            if item_tx.send(item).is_err() || terminal {
                return;
            }
        }
    });

    let (message_tx, message_rx) = sync_channel(QUEUE_BOUND);
    let (error_tx, error_rx) = sync_channel(QUEUE_BOUND);

    // Parser/decoder task: assemble blocks, decode headers, forward.
    thread::spawn(move || {
        let mut parser = Parser::new(item_rx, config.stop_on_error);
        while let Some(event) = parser.next_event() {
            match event {
                Event::Message(raw) => {
                    let (mtx, errors) = decode_message(raw);
                    if !errors.is_empty() {
                        for error in errors {
                            if error_tx.send(error).is_err() {
                                return;
                            }
                        }
                        continue;
                    }
                    if message_tx.send(mtx).is_err() {
                        return;
                    }
                }
                Event::Error(error) => {
                    if error_tx.send(error).is_err() {
                        return;
                    }
                }
            }
        }
    });

    (message_rx, error_rx)
}

/// Parse an entire input, returning the messages and the aggregated
/// errors (`None` when the input parsed cleanly).
///
/// This drives the scanner and parser inline, without threads, so the
/// reader needs no `Send` bound. Use [`parse_mtx`] for inputs too large to
/// collect.
pub fn parse_all_mtx<R: Read>(
    reader: R,
    config: ParseConfig,
) -> (Vec<Mtx>, Option<ParseErrors>) {
    let lexer = Lexer::new(BufReader::new(reader));
    let mut parser = Parser::new(lexer, config.stop_on_error);

    let mut messages = Vec::new();
    let mut errors = ParseErrors::new();

    while let Some(event) = parser.next_event() {
        match event {
            Event::Message(raw) => {
                let (mtx, message_errors) = decode_message(raw);
                if !message_errors.is_empty() {
                    for error in message_errors {
                        errors.push(error);
                    }
                    continue;
                }
                messages.push(mtx);
            }
            Event::Error(error) => errors.push(error),
        }
    }

    (messages, errors.into_option())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_MESSAGES: &str = "{1:F01BPHKPLPKXXXX0000000000}{2:I940BOFAUS6BXBAMN}\
{1:F01SCBLZAJJXXXX5712100002}{2:I940BOFAUS6BXBAMN}";

    #[test]
    fn streaming_and_batch_agree() {
        let (message_rx, error_rx) =
            parse_mtx(TWO_MESSAGES.as_bytes(), ParseConfig::new(), CancellationToken::new());
        let streamed: Vec<Mtx> = message_rx.iter().collect();
        let stream_errors: Vec<ParseError> = error_rx.iter().collect();

        let (batch, batch_errors) = parse_all_mtx(TWO_MESSAGES.as_bytes(), ParseConfig::new());

        assert_eq!(streamed, batch);
        assert_eq!(streamed.len(), 2);
        assert!(stream_errors.is_empty());
        assert!(batch_errors.is_none());
    }

    #[test]
    fn messages_arrive_in_source_order() {
        let (messages, errors) = parse_all_mtx(TWO_MESSAGES.as_bytes(), ParseConfig::new());
        assert!(errors.is_none());
        assert_eq!(
            messages[0].base.basic_header.logical_terminal_address,
            "BPHKPLPKXXXX"
        );
        assert_eq!(
            messages[1].base.basic_header.logical_terminal_address,
            "SCBLZAJJXXXX"
        );
    }

    #[test]
    fn header_failures_suppress_the_message_but_not_the_stream() {
        let input = "{1:122}{2:I940BOFAUS6BXBAMN}\
{1:F01SCBLZAJJXXXX5712100002}{2:I940BOFAUS6BXBAMN}";
        let (messages, errors) = parse_all_mtx(input.as_bytes(), ParseConfig::new());
        assert_eq!(messages.len(), 1);
        let errors = errors.expect("first message has a header error");
        assert_eq!(errors.len(), 1);
        assert!(errors
            .iter()
            .next()
            .unwrap()
            .to_string()
            .contains("invalid basic header block content length"));
    }

    #[test]
    fn cancellation_stops_at_a_read_boundary() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (message_rx, error_rx) =
            parse_mtx(TWO_MESSAGES.as_bytes(), ParseConfig::new(), cancel);
        // A pre-cancelled token reads as immediate end of input.
        assert!(message_rx.iter().next().is_none());
        assert!(error_rx.iter().next().is_none());
    }
}
