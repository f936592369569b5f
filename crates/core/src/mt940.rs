//! The MT940 customer statement message.
//!
//! A thin declarative layer over the generic pipeline: a typed record, the
//! schema describing its SWIFT field formats, the body mapping, and the
//! streaming/batch entry points.

use crate::config::ParseConfig;
use crate::decode::{field_context, repeated, single, DecodeMt};
use crate::record::{Balance, Base, Mtx, StatementLine};
use crate::stream::{parse_mtx, CancellationToken, QUEUE_BOUND};
use crate::validate::{FieldSource, FieldValue, RecordSchema, Requirement};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::LazyLock;
use std::thread;
use swift_mt_diagnostics::{DecodeError, MtError, ParseError, ParseErrors};

/// The message type this record decodes.
pub const MESSAGE_TYPE_MT940: &str = "940";

/// An MT940 customer statement message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MT940 {
    /// Headers and trailers shared by every MT message.
    pub base: Base,
    /// Tag 20 — transaction reference number.
    pub reference: String,
    /// Tag 25 — account identification.
    pub account_identification: String,
    /// Tag 28C — statement number, optionally `/`-joined with a sequence
    /// number.
    pub statement_number_sequence_number: String,
    /// Tag 60F — opening balance.
    pub opening_balance: Balance,
    /// Tag 61 — statement lines, in wire order.
    pub statement_lines: Vec<StatementLine>,
    /// Tag 86 — account owner information, one entry per occurrence, in
    /// wire order.
    pub account_owner_information: Vec<String>,
}

// ── Schema catalog ──────────────────────────────────────────────────────────

fn balance_schema() -> RecordSchema {
    RecordSchema::builder("Balance")
        .field("CreditDebit", "", Requirement::Mandatory, "1!a")
        .field("Date", "", Requirement::Mandatory, "6!n")
        .field("Currency", "", Requirement::Mandatory, "3!a")
        .field("Amount", "", Requirement::Mandatory, "15d")
        .must_build()
}

fn statement_line_schema() -> RecordSchema {
    RecordSchema::builder("StatementLine")
        .field("Date", "", Requirement::Mandatory, "6!n")
        .field("EntryDate", "", Requirement::Optional, "4!n")
        .field("FundsCode", "", Requirement::Mandatory, "2a")
        .field("Amount", "", Requirement::Mandatory, "15d")
        .field("SwiftCode", "", Requirement::Mandatory, "1!a3!c")
        .field("AccountOwnerReference", "", Requirement::Mandatory, "16x")
        .field("BankReference", "", Requirement::Optional, "//20x")
        .field("Description", "", Requirement::Optional, "34x")
        .must_build()
}

static MT940_SCHEMA: LazyLock<RecordSchema> = LazyLock::new(|| {
    RecordSchema::builder("MT940")
        .field("Reference", "20", Requirement::Mandatory, "16x")
        .field(
            "AccountIdentification",
            "25",
            Requirement::Mandatory,
            "2!c26!n|8!c/12!n",
        )
        .field(
            "StatementNumberSequenceNumber",
            "28C",
            Requirement::Mandatory,
            "5!n(/3!n)",
        )
        .dive("OpeningBalance", "60F", Requirement::Mandatory, balance_schema())
        .dive(
            "StatementLines",
            "61",
            Requirement::Optional,
            statement_line_schema(),
        )
        .field(
            "AccountOwnerInformation",
            "86",
            Requirement::Optional,
            "6*65x",
        )
        .must_build()
});

/// The compiled MT940 schema, built once and shared.
pub fn mt940_schema() -> &'static RecordSchema {
    &MT940_SCHEMA
}

// ── Field sources ───────────────────────────────────────────────────────────

impl FieldSource for Balance {
    fn field_value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "CreditDebit" => FieldValue::Text(Cow::Borrowed(self.credit_debit.as_str())),
            "Date" => FieldValue::Text(Cow::Borrowed(&self.date.raw)),
            "Currency" => FieldValue::Text(Cow::Borrowed(&self.currency)),
            "Amount" => FieldValue::Amount(self.amount),
            _ => FieldValue::Unsupported,
        }
    }
}

impl FieldSource for StatementLine {
    fn field_value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "Date" => FieldValue::Text(Cow::Borrowed(&self.date.raw)),
            "EntryDate" => FieldValue::Text(Cow::Borrowed(&self.entry_date.raw)),
            "FundsCode" => FieldValue::Text(Cow::Borrowed(self.funds_code.as_str())),
            "Amount" => FieldValue::Amount(self.amount),
            "SwiftCode" => FieldValue::Text(Cow::Borrowed(&self.swift_code)),
            "AccountOwnerReference" => {
                FieldValue::Text(Cow::Borrowed(&self.account_owner_reference))
            }
            "BankReference" => FieldValue::Text(Cow::Borrowed(&self.bank_reference)),
            "Description" => FieldValue::Text(Cow::Borrowed(&self.description)),
            _ => FieldValue::Unsupported,
        }
    }
}

impl FieldSource for MT940 {
    fn field_value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "Reference" => FieldValue::Text(Cow::Borrowed(&self.reference)),
            "AccountIdentification" => {
                FieldValue::Text(Cow::Borrowed(&self.account_identification))
            }
            "StatementNumberSequenceNumber" => {
                FieldValue::Text(Cow::Borrowed(&self.statement_number_sequence_number))
            }
            "OpeningBalance" => FieldValue::Record(&self.opening_balance),
            "StatementLines" => FieldValue::Records(
                self.statement_lines
                    .iter()
                    .map(|line| line as &dyn FieldSource)
                    .collect(),
            ),
            "AccountOwnerInformation" => {
                FieldValue::TextList(&self.account_owner_information)
            }
            _ => FieldValue::Unsupported,
        }
    }
}

// ── Decoding ────────────────────────────────────────────────────────────────

fn decode_body(
    mt940: &mut MT940,
    body: &BTreeMap<String, Vec<String>>,
) -> Result<(), DecodeError> {
    if let Some(values) = body.get("20") {
        mt940.reference = single(values)
            .map_err(|cause| field_context("20", "Reference", cause))?
            .to_string();
    }
    if let Some(values) = body.get("25") {
        mt940.account_identification = single(values)
            .map_err(|cause| field_context("25", "AccountIdentification", cause))?
            .to_string();
    }
    if let Some(values) = body.get("28C") {
        mt940.statement_number_sequence_number = single(values)
            .map_err(|cause| field_context("28C", "StatementNumberSequenceNumber", cause))?
            .to_string();
    }
    if let Some(values) = body.get("60F") {
        let value = single(values).map_err(|cause| field_context("60F", "OpeningBalance", cause))?;
        mt940.opening_balance = Balance::decode_mt(value)
            .map_err(|cause| field_context("60F", "OpeningBalance", cause))?;
    }
    if let Some(values) = body.get("61") {
        mt940.statement_lines = repeated::<StatementLine>(values)
            .map_err(|cause| field_context("61", "StatementLines", cause))?;
    }
    if let Some(values) = body.get("86") {
        mt940.account_owner_information = values.clone();
    }
    Ok(())
}

/// Decode a generic message into an MT940 record. The record is filled as
/// far as decoding got; a wrong message type or a failing field comes back
/// as the error.
pub fn mtx_to_mt940(mtx: Mtx) -> (MT940, Option<MtError>) {
    let mut mt940 = MT940::default();

    if mtx.base.message_type() != MESSAGE_TYPE_MT940 {
        let actual = mtx.base.message_type().to_string();
        mt940.base = mtx.base;
        return (
            mt940,
            Some(MtError::Decode {
                msg_type: MESSAGE_TYPE_MT940.to_string(),
                cause: DecodeError::MessageType {
                    expected: MESSAGE_TYPE_MT940.to_string(),
                    actual,
                },
            }),
        );
    }

    let body = mtx.body;
    mt940.base = mtx.base;

    let error = decode_body(&mut mt940, &body).err().map(|cause| MtError::Decode {
        msg_type: MESSAGE_TYPE_MT940.to_string(),
        cause,
    });

    (mt940, error)
}

/// Validate an MT940 record against its schema.
pub fn validate_mt940(mt940: &MT940) -> Result<(), MtError> {
    mt940_schema()
        .validate(mt940)
        .map_err(|cause| MtError::Validation {
            msg_type: MESSAGE_TYPE_MT940.to_string(),
            cause,
        })
}

/// Decode and, per the configuration, validate. Decode failures skip
/// validation; `skip_validation` skips only the pattern checks.
fn decode_and_validate(mtx: Mtx, config: &ParseConfig) -> (MT940, Option<MtError>) {
    let (mt940, error) = mtx_to_mt940(mtx);
    if error.is_some() || config.skip_validation {
        return (mt940, error);
    }
    match validate_mt940(&mt940) {
        Ok(()) => (mt940, None),
        Err(error) => (mt940, Some(error)),
    }
}

/// Parse a stream into MT940 messages.
///
/// Messages that fail decoding or validation are reported on the error
/// channel and, unless `lax` is set, discarded.
pub fn parse_mt940<R>(
    reader: R,
    config: ParseConfig,
    cancel: CancellationToken,
) -> (Receiver<MT940>, Receiver<ParseError>)
where
    R: Read + Send + 'static,
{
    let (mtx_rx, parse_error_rx) = parse_mtx(reader, config, cancel);

    let (message_tx, message_rx) = sync_channel(QUEUE_BOUND);
    let (error_tx, error_rx) = sync_channel(QUEUE_BOUND);

    // Forward the generic pipeline's errors onto the shared error queue.
    let forward_tx = error_tx.clone();
    thread::spawn(move || {
        for error in parse_error_rx {
            if forward_tx.send(error).is_err() {
                return;
            }
        }
    });

    thread::spawn(move || {
        for mtx in mtx_rx {
            let line = mtx.base.line;
            let (mt940, error) = decode_and_validate(mtx, &config);
            if let Some(error) = error {
                if error_tx.send(ParseError::new(error, line)).is_err() {
                    return;
                }
                if !config.lax {
                    continue;
                }
            }
            if message_tx.send(mt940).is_err() {
                return;
            }
        }
    });

    (message_rx, error_rx)
}

/// Parse an entire input into MT940 messages, aggregating all errors.
pub fn parse_all_mt940<R: Read>(
    reader: R,
    config: ParseConfig,
) -> (Vec<MT940>, Option<ParseErrors>) {
    let (generic_messages, parse_errors) = crate::stream::parse_all_mtx(reader, config);

    let mut messages = Vec::new();
    let mut errors = parse_errors.unwrap_or_default();

    for mtx in generic_messages {
        let line = mtx.base.line;
        let (mt940, error) = decode_and_validate(mtx, &config);
        if let Some(error) = error {
            errors.push(ParseError::new(error, line));
            if !config.lax {
                continue;
            }
        }
        messages.push(mt940);
    }

    (messages, errors.into_option())
}
