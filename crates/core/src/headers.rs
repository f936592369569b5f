//! Positional decoders for the header blocks.
//!
//! Each decoder slices its block content at fixed offsets, accumulating
//! errors instead of aborting: a failed field leaves the rest of the block
//! (and its sibling blocks) decoded as far as possible.

use crate::record::{
    AppHeaderInput, AppHeaderOutput, ApplicationId, Base, BasicHeader, DeliveryMonitor,
    InputReference, Mtx, OutputReference, PossibleDuplicateEmission, PossibleDuplicateMessage,
    Priority, Reference, ServiceId, SystemOriginatedMessage, Trailers, UsrHeader,
};
use crate::scan::{Block, RawMessage};
use crate::temporal::{Date, DateOrDateTime, DateTime, DateTimeSecOptCent, Time};
use swift_mt_diagnostics::{HeaderError, MtError, ParseError};

/// Multiplier from the wire obsolescence factor to minutes.
const OBSOLESCENCE_MINUTES_PER_FACTOR: i64 = 5;

/// Panic-free positional slice; out-of-bounds or non-boundary ranges
/// come back empty and fail the downstream check instead.
fn sub(s: &str, start: usize, end: usize) -> &str {
    s.get(start..end).unwrap_or("")
}

fn sub_from(s: &str, start: usize) -> &str {
    s.get(start..).unwrap_or("")
}

// ── Block 1 ─────────────────────────────────────────────────────────────────

/// Decode the basic header from block 1 content shaped like
/// `F01SCBLZAJJXXXX5712100002`: application id, service id, logical
/// terminal address, session number, sequence number.
pub fn decode_basic_header(block: &Block) -> (BasicHeader, Option<HeaderError>) {
    let content = &block.content;
    let mut header = BasicHeader {
        raw: format!("{{1:{content}}}"),
        ..BasicHeader::default()
    };

    if content.len() != 25 {
        return (header, Some(HeaderError::BasicHeaderLength(content.len())));
    }

    header.app_id = match sub(content, 0, 1) {
        "F" => ApplicationId::Financial,
        "A" => ApplicationId::General,
        "L" => ApplicationId::Login,
        other => {
            return (
                header,
                Some(HeaderError::UnknownApplicationId(other.to_string())),
            );
        }
    };

    header.service_id = match sub(content, 1, 3) {
        "01" => ServiceId::FinGpa,
        "21" => ServiceId::AckNak,
        other => {
            return (
                header,
                Some(HeaderError::UnknownServiceId(other.to_string())),
            );
        }
    };

    header.logical_terminal_address = sub(content, 3, 15).to_string();
    header.session_number = sub(content, 15, 19).to_string();
    header.sequence_number = sub_from(content, 19).to_string();

    (header, None)
}

// ── References ──────────────────────────────────────────────────────────────

/// Decode a 28-character message input reference like
/// `120811BANKFRPPAXXX2222123456`: 6-digit date, 12-character logical
/// terminal address, 4-digit session, 6-digit sequence.
pub fn decode_input_reference(input: &str) -> Result<InputReference, HeaderError> {
    if input.len() != 28 {
        return Err(HeaderError::InputReferenceLength(input.len()));
    }

    let date_str = sub(input, 0, 6);
    let date = DateOrDateTime::parse(date_str).map_err(|cause| HeaderError::InputReferenceDate {
        raw: date_str.to_string(),
        cause,
    })?;

    Ok(InputReference {
        set: true,
        raw: input.to_string(),
        date,
        logical_terminal_address: sub(input, 6, 18).to_string(),
        session_number: sub(input, 18, 22).to_string(),
        sequence_number: sub_from(input, 22).to_string(),
    })
}

/// Decode a message output reference. The 28-character form is
/// date-fronted; the 32-character form carries a leading `HHMM` that is
/// rotated behind the date, and widens session/sequence to five digits
/// each.
pub fn decode_output_reference(input: &str) -> Result<OutputReference, HeaderError> {
    let mut reference = OutputReference {
        set: true,
        raw: input.to_string(),
        ..OutputReference::default()
    };

    match input.len() {
        28 => {
            let date_str = sub(input, 0, 6);
            reference.date =
                DateOrDateTime::parse(date_str).map_err(|cause| HeaderError::OutputReferenceDate {
                    raw: date_str.to_string(),
                    cause,
                })?;
            reference.logical_terminal_address = sub(input, 6, 18).to_string();
            reference.session_number = sub(input, 18, 23).to_string();
            reference.sequence_number = sub_from(input, 23).to_string();
        }
        32 => {
            let rotated = format!("{}{}", sub(input, 4, 10), sub(input, 0, 4));
            reference.date = DateOrDateTime::parse(&rotated).map_err(|cause| {
                HeaderError::OutputReferenceDate {
                    raw: rotated.clone(),
                    cause,
                }
            })?;
            reference.logical_terminal_address = sub(input, 10, 22).to_string();
            reference.session_number = sub(input, 22, 27).to_string();
            reference.sequence_number = sub_from(input, 27).to_string();
        }
        _ => {}
    }

    Ok(reference)
}

/// Decode an MRF message reference: a 10-digit date-time followed by a
/// 28-character input reference.
fn decode_reference(input: &str) -> (Reference, Option<HeaderError>) {
    let mut reference = Reference {
        set: true,
        raw: input.to_string(),
        ..Reference::default()
    };

    let date_time_str = sub(input, 0, 10);
    match DateTime::parse(date_time_str) {
        Ok(date_time) => reference.date_time = date_time,
        Err(cause) => {
            return (
                reference,
                Some(HeaderError::ReferenceDateTime {
                    raw: date_time_str.to_string(),
                    cause,
                }),
            );
        }
    }

    let tail = sub_from(input, 10);
    match decode_input_reference(tail) {
        Ok(mir) => reference.message_input_reference = mir,
        Err(cause) => {
            return (
                reference,
                Some(HeaderError::ReferenceInputReference {
                    raw: tail.to_string(),
                    cause: Box::new(cause),
                }),
            );
        }
    }

    (reference, None)
}

// ── Block 2 ─────────────────────────────────────────────────────────────────

fn priority_from(ch: &str) -> Result<Priority, HeaderError> {
    match ch {
        "S" => Ok(Priority::System),
        "N" => Ok(Priority::Normal),
        "U" => Ok(Priority::Urgent),
        other => Err(HeaderError::UnknownPriority(other.to_string())),
    }
}

fn delivery_monitor_from(ch: &str) -> Result<DeliveryMonitor, HeaderError> {
    match ch {
        "1" => Ok(DeliveryMonitor::NonDelivery),
        "2" => Ok(DeliveryMonitor::Delivery),
        "3" => Ok(DeliveryMonitor::Both),
        other => Err(HeaderError::InvalidDeliveryMonitor(other.to_string())),
    }
}

fn obsolescence_minutes(digits: &str) -> Result<i64, HeaderError> {
    let trimmed = digits.trim_start_matches('0');
    let factor: i64 = trimmed
        .parse()
        .map_err(|_| HeaderError::InvalidObsolescence(digits.to_string()))?;
    Ok(factor * OBSOLESCENCE_MINUTES_PER_FACTOR)
}

/// Apply the optional tail of an input app header. The tail layout is
/// keyed entirely off the content length.
fn fill_input_tail(header: &mut AppHeaderInput, content: &str) -> Result<(), HeaderError> {
    match content.len() {
        // I940SCBLZAJJXXXX — no optional fields.
        16 => {}
        // I940SCBLZAJJXXXXN — priority or delivery monitor.
        17 => {
            let ch = sub(content, 16, 17);
            match ch {
                "S" | "N" | "U" => header.message_priority = priority_from(ch)?,
                "1" | "2" | "3" => header.delivery_monitor = delivery_monitor_from(ch)?,
                other => {
                    return Err(HeaderError::InvalidPriorityOrDeliveryMonitor(
                        other.to_string(),
                    ));
                }
            }
        }
        // I940SCBLZAJJXXXXN2 — priority then delivery monitor.
        18 => {
            header.message_priority = priority_from(sub(content, 16, 17))?;
            header.delivery_monitor = delivery_monitor_from(sub(content, 17, 18))?;
        }
        // I940SCBLZAJJXXXX020 — obsolescence period only.
        19 => {
            header.obsolescence_period_minutes = obsolescence_minutes(sub_from(content, 16))?;
        }
        // I940SCBLZAJJXXXXN020 — one of priority/delivery monitor, then
        // obsolescence.
        20 => {
            let ch = sub(content, 16, 17);
            match ch {
                "S" | "N" | "U" => header.message_priority = priority_from(ch)?,
                "1" | "2" | "3" => header.delivery_monitor = delivery_monitor_from(ch)?,
                other => {
                    return Err(HeaderError::InvalidPriorityOrDeliveryMonitor(
                        other.to_string(),
                    ));
                }
            }
            header.obsolescence_period_minutes = obsolescence_minutes(sub_from(content, 17))?;
        }
        // I940SCBLZAJJXXXXN2020 — all three.
        21 => {
            header.message_priority = priority_from(sub(content, 16, 17))?;
            header.delivery_monitor = delivery_monitor_from(sub(content, 17, 18))?;
            header.obsolescence_period_minutes = obsolescence_minutes(sub_from(content, 18))?;
        }
        len => return Err(HeaderError::AppHeaderInputLength(len)),
    }
    Ok(())
}

/// Decode an input app header (`I940BOFAUS6BXBAMN2020`): message type,
/// receiver address, then the optional priority / delivery monitor /
/// obsolescence tail.
pub fn decode_app_header_input(block: &Block) -> (AppHeaderInput, Option<HeaderError>) {
    let content = &block.content;
    let mut header = AppHeaderInput {
        raw: format!("{{2:{content}}}"),
        ..AppHeaderInput::default()
    };

    if content.len() < 16 {
        return (
            header,
            Some(HeaderError::AppHeaderInputLength(content.len())),
        );
    }

    header.set = true;
    // The leading I is the direction marker, consumed by the caller.
    header.message_type = sub(content, 1, 4).to_string();
    header.receiver_address = sub(content, 4, 16).to_string();

    let error = fill_input_tail(&mut header, content).err();
    (header, error)
}

/// Decode an output app header
/// (`O9401157091028SCBLZAJJXXXX57121000020910281157N`): message type,
/// input time, message input reference, output date, output time, and an
/// optional priority.
pub fn decode_app_header_output(block: &Block) -> (AppHeaderOutput, Option<HeaderError>) {
    let content = &block.content;
    let mut header = AppHeaderOutput {
        raw: format!("{{2:{content}}}"),
        ..AppHeaderOutput::default()
    };

    if content.len() < 46 {
        return (
            header,
            Some(HeaderError::AppHeaderOutputLength(content.len())),
        );
    }

    header.set = true;
    header.message_type = sub(content, 1, 4).to_string();

    let input_time_str = sub(content, 4, 8);
    match Time::parse(input_time_str) {
        Ok(time) => header.input_time = time,
        Err(cause) => {
            return (
                header,
                Some(HeaderError::InvalidInputTime {
                    raw: input_time_str.to_string(),
                    cause,
                }),
            );
        }
    }

    let output_date_str = sub(content, 36, 42);
    match Date::parse(output_date_str) {
        Ok(date) => header.output_date = date,
        Err(cause) => {
            return (
                header,
                Some(HeaderError::InvalidOutputDate {
                    raw: output_date_str.to_string(),
                    cause,
                }),
            );
        }
    }

    let output_time_str = sub(content, 42, 46);
    match Time::parse(output_time_str) {
        Ok(time) => header.output_time = time,
        Err(cause) => {
            return (
                header,
                Some(HeaderError::InvalidOutputTime {
                    raw: output_time_str.to_string(),
                    cause,
                }),
            );
        }
    }

    match decode_input_reference(sub(content, 8, 36)) {
        Ok(mir) => header.message_input_reference = mir,
        Err(cause) => {
            return (header, Some(HeaderError::InputReference(Box::new(cause))));
        }
    }

    if content.len() == 47 {
        header.message_priority = match sub(content, 46, 47) {
            "N" => Priority::Normal,
            "S" => Priority::System,
            "U" => Priority::Urgent,
            other => {
                return (
                    header,
                    Some(HeaderError::InvalidOutputPriority(other.to_string())),
                );
            }
        };
    }

    (header, None)
}

/// Dispatch block 2 on its direction marker to the input or output
/// decoder. Exactly one of the returned headers is set on success.
pub fn decode_app_header(
    block: &Block,
) -> (AppHeaderInput, AppHeaderOutput, Option<HeaderError>) {
    let content = &block.content;

    if content.len() < 4 {
        return (
            AppHeaderInput::default(),
            AppHeaderOutput::default(),
            Some(HeaderError::AppHeaderLength(content.len())),
        );
    }

    match sub(content, 0, 1) {
        "I" => {
            let (input, error) = decode_app_header_input(block);
            (input, AppHeaderOutput::default(), error)
        }
        "O" => {
            let (output, error) = decode_app_header_output(block);
            (AppHeaderInput::default(), output, error)
        }
        other => (
            AppHeaderInput::default(),
            AppHeaderOutput::default(),
            Some(HeaderError::AppHeaderDirection(other.to_string())),
        ),
    }
}

// ── Block 3 ─────────────────────────────────────────────────────────────────

/// Decode the user header from block 3's sub-blocks. Unknown labels are
/// reported but do not stop the remaining sub-blocks from decoding.
pub fn decode_usr_header(block: &Block) -> (UsrHeader, Vec<HeaderError>) {
    let mut header = UsrHeader {
        set: true,
        raw: format!("{{3:{}}}", block.content),
        ..UsrHeader::default()
    };
    let mut errors = Vec::new();

    for sub_block in &block.blocks {
        let content = &sub_block.content;
        match sub_block.label.as_str() {
            "103" => header.service_id = content.clone(),
            "106" => match decode_input_reference(content) {
                Ok(mir) => header.message_input_reference = mir,
                Err(cause) => {
                    errors.push(HeaderError::UserHeaderInputReference(Box::new(cause)));
                }
            },
            "108" => header.message_user_reference = content.clone(),
            "111" => header.service_type_id = content.clone(),
            "113" => header.banking_priority = content.clone(),
            "115" => header.addressee_information = content.clone(),
            "119" => header.validation_flag = content.clone(),
            "121" => header.unique_end_to_end_transaction_reference = content.clone(),
            "165" => header.payment_release_information = content.clone(),
            "423" => match DateTimeSecOptCent::parse(content) {
                Ok(checkpoint) => header.balance_checkpoint_date_time = checkpoint,
                Err(cause) => errors.push(HeaderError::BalanceCheckpoint {
                    raw: content.clone(),
                    cause,
                }),
            },
            "424" => header.related_reference = content.clone(),
            "433" => header.sanctions_screening_information = content.clone(),
            "434" => header.payment_controls_information = content.clone(),
            other => errors.push(HeaderError::UnknownUserHeaderLabel(other.to_string())),
        }
    }

    (header, errors)
}

// ── Block 5 ─────────────────────────────────────────────────────────────────

fn decode_pde(input: &str) -> (PossibleDuplicateEmission, Option<HeaderError>) {
    let mut pde = PossibleDuplicateEmission {
        raw: input.to_string(),
        ..PossibleDuplicateEmission::default()
    };

    if input.len() != 32 {
        return (pde, Some(HeaderError::PdeLength(input.len())));
    }

    let time_str = sub(input, 0, 4);
    match Time::parse(time_str) {
        Ok(time) => pde.time = time,
        Err(cause) => {
            return (
                pde,
                Some(HeaderError::PdeTime {
                    raw: time_str.to_string(),
                    cause,
                }),
            );
        }
    }

    match decode_input_reference(sub_from(input, 4)) {
        Ok(mir) => pde.message_input_reference = mir,
        Err(cause) => {
            return (pde, Some(HeaderError::PdeInputReference(Box::new(cause))));
        }
    }

    (pde, None)
}

fn decode_pdm(input: &str) -> (PossibleDuplicateMessage, Option<HeaderError>) {
    let mut pdm = PossibleDuplicateMessage {
        raw: input.to_string(),
        ..PossibleDuplicateMessage::default()
    };

    if input.len() != 32 && input.len() != 36 {
        return (pdm, Some(HeaderError::PdmLength(input.len())));
    }

    let time_str = sub(input, 0, 4);
    match Time::parse(time_str) {
        Ok(time) => pdm.time = time,
        Err(cause) => {
            return (
                pdm,
                Some(HeaderError::PdmTime {
                    raw: time_str.to_string(),
                    cause,
                }),
            );
        }
    }

    match decode_output_reference(sub_from(input, 4)) {
        Ok(mor) => pdm.message_output_reference = mor,
        Err(cause) => {
            return (pdm, Some(HeaderError::PdmOutputReference(Box::new(cause))));
        }
    }

    (pdm, None)
}

fn decode_som(input: &str) -> (SystemOriginatedMessage, Option<HeaderError>) {
    let mut som = SystemOriginatedMessage {
        raw: input.to_string(),
        ..SystemOriginatedMessage::default()
    };

    if input.len() != 32 {
        return (som, Some(HeaderError::SysLength(input.len())));
    }

    let time_str = sub(input, 0, 4);
    match Time::parse(time_str) {
        Ok(time) => som.time = time,
        Err(cause) => {
            return (
                som,
                Some(HeaderError::SysTime {
                    raw: time_str.to_string(),
                    cause,
                }),
            );
        }
    }

    match decode_input_reference(sub_from(input, 4)) {
        Ok(mir) => som.message_input_reference = mir,
        Err(cause) => {
            return (som, Some(HeaderError::SysInputReference(Box::new(cause))));
        }
    }

    (som, None)
}

/// Decode the trailers from block 5's sub-blocks. Failures in one trailer
/// leave it partially filled and do not stop the siblings.
pub fn decode_trailers(block: &Block) -> (Trailers, Vec<HeaderError>) {
    let mut trailers = Trailers {
        set: true,
        ..Trailers::default()
    };
    let mut errors = Vec::new();
    let mut raw = String::from("{5:");

    for sub_block in &block.blocks {
        raw.push_str(&format!("{{{}:{}}}", sub_block.label, sub_block.content));

        match sub_block.label.as_str() {
            "CHK" => trailers.checksum = sub_block.content.clone(),
            "TNG" => trailers.test_and_training_message = true,
            "DLM" => trailers.delayed_message = true,
            "PDE" => {
                let (pde, error) = decode_pde(&sub_block.content);
                if let Some(error) = error {
                    errors.push(error);
                }
                trailers.possible_duplicate_emission = pde;
            }
            "PDM" => {
                let (pdm, error) = decode_pdm(&sub_block.content);
                if let Some(error) = error {
                    errors.push(error);
                }
                trailers.possible_duplicate_message = pdm;
            }
            "MRF" => {
                let (reference, error) = decode_reference(&sub_block.content);
                if let Some(error) = error {
                    errors.push(error);
                }
                trailers.message_reference = reference;
            }
            "SYS" => {
                let (som, error) = decode_som(&sub_block.content);
                if let Some(error) = error {
                    errors.push(error);
                }
                trailers.system_originated_message = som;
            }
            other => {
                trailers
                    .additional_trailers
                    .insert(other.to_string(), sub_block.content.clone());
            }
        }
    }

    raw.push('}');
    trailers.raw = raw;

    (trailers, errors)
}

// ── Whole message ───────────────────────────────────────────────────────────

/// Decode a generic message's header blocks into a typed [`Mtx`]. All
/// header errors are collected, tagged with the message's source line; the
/// returned message is filled as far as decoding got.
pub fn decode_message(message: RawMessage) -> (Mtx, Vec<ParseError>) {
    let line = message.line;
    let mut errors = Vec::new();

    let mut mtx = Mtx {
        base: Base {
            raw: message.raw,
            line,
            ..Base::default()
        },
        body: message.body,
    };

    let (basic_header, error) = decode_basic_header(&message.basic_header);
    if let Some(error) = error {
        errors.push(ParseError::new(MtError::BasicHeader(error), line));
    }
    mtx.base.basic_header = basic_header;

    let (input, output, error) = decode_app_header(&message.app_header);
    if let Some(error) = error {
        errors.push(ParseError::new(MtError::AppHeader(error), line));
    }
    mtx.base.app_header_input = input;
    mtx.base.app_header_output = output;

    // Blocks 3 and 5 are optional; absent blocks stay unset.
    if !message.usr_header.label.is_empty() {
        let (usr_header, usr_errors) = decode_usr_header(&message.usr_header);
        for error in usr_errors {
            errors.push(ParseError::new(MtError::UserHeader(error), line));
        }
        mtx.base.usr_header = usr_header;
    }

    if !message.trailers.label.is_empty() {
        let (trailers, trailer_errors) = decode_trailers(&message.trailers);
        for error in trailer_errors {
            errors.push(ParseError::new(MtError::Trailers(error), line));
        }
        mtx.base.trailers = trailers;
    }

    (mtx, errors)
}
