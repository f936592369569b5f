//! Typed message records: header structures, reference records, and the
//! body value types shared by the statement message families.

use crate::temporal::{Date, DateOrDateTime, DateTime, DateTimeSecOptCent, Month, Time};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Wire enumerations ───────────────────────────────────────────────────────

/// The application within which a message travels: `F` (FIN), `A` (GPA),
/// or `L` (GPA service messages such as LOGIN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApplicationId {
    /// `F` — FIN user-to-user, system and service messages.
    #[default]
    Financial,
    /// `A` — most GPA system and service messages.
    General,
    /// `L` — certain GPA service messages (LOGIN, LAKs, ABORT).
    Login,
}

impl ApplicationId {
    /// The wire character.
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationId::Financial => "F",
            ApplicationId::General => "A",
            ApplicationId::Login => "L",
        }
    }
}

/// The service id: `01` (FIN/GPA) or `21` (ACK/NAK).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServiceId {
    /// `01` — FIN/GPA.
    #[default]
    FinGpa,
    /// `21` — ACK/NAK.
    AckNak,
}

impl ServiceId {
    /// The wire digit pair.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceId::FinGpa => "01",
            ServiceId::AckNak => "21",
        }
    }
}

/// Delivery priority of a message: `S`, `N`, or `U`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    /// `N` — normal.
    #[default]
    Normal,
    /// `S` — system.
    System,
    /// `U` — urgent.
    Urgent,
}

impl Priority {
    /// The wire character.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Normal => "N",
            Priority::System => "S",
            Priority::Urgent => "U",
        }
    }
}

/// Delivery monitoring requested for a FIN user-to-user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeliveryMonitor {
    /// `1` — non-delivery warning.
    #[default]
    NonDelivery,
    /// `2` — delivery notification.
    Delivery,
    /// `3` — both.
    Both,
}

impl DeliveryMonitor {
    /// The wire digit.
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMonitor::NonDelivery => "1",
            DeliveryMonitor::Delivery => "2",
            DeliveryMonitor::Both => "3",
        }
    }
}

/// Whether a balance is a credit or a debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CreditDebit {
    /// `C`.
    #[default]
    Credit,
    /// `D`.
    Debit,
}

impl CreditDebit {
    /// The wire character.
    pub fn as_str(self) -> &'static str {
        match self {
            CreditDebit::Credit => "C",
            CreditDebit::Debit => "D",
        }
    }
}

/// The funds code of a statement line: credit, debit, or their reversals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FundsCode {
    /// `C`.
    #[default]
    Credit,
    /// `RC` — reversal of credit.
    CreditReversal,
    /// `D`.
    Debit,
    /// `RD` — reversal of debit.
    DebitReversal,
}

impl FundsCode {
    /// The wire code.
    pub fn as_str(self) -> &'static str {
        match self {
            FundsCode::Credit => "C",
            FundsCode::CreditReversal => "RC",
            FundsCode::Debit => "D",
            FundsCode::DebitReversal => "RD",
        }
    }
}

// ── Reference records ───────────────────────────────────────────────────────

/// A 28-character reference to an input message: date, logical terminal
/// address, session number, sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputReference {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The send date (or date-time).
    pub date: DateOrDateTime,
    /// The 12-character logical terminal address.
    pub logical_terminal_address: String,
    /// The session number.
    pub session_number: String,
    /// The sequence number.
    pub sequence_number: String,
}

/// A reference to an output message, carrying both the send date and time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputReference {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The send date (or rotated date-time for the 32-character variant).
    pub date: DateOrDateTime,
    /// The 12-character logical terminal address.
    pub logical_terminal_address: String,
    /// The session number.
    pub session_number: String,
    /// The sequence number.
    pub sequence_number: String,
}

/// A reference to an original user message: a date-time plus the input
/// reference of that message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reference {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// When the referenced message was sent.
    pub date_time: DateTime,
    /// The referenced message's input reference.
    pub message_input_reference: InputReference,
}

// ── Header records ──────────────────────────────────────────────────────────

/// Block 1 — the only mandatory block. Identifies the message and carries
/// control information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BasicHeader {
    /// The `{1:…}` reconstruction.
    pub raw: String,
    /// The application id.
    pub app_id: ApplicationId,
    /// The service id.
    pub service_id: ServiceId,
    /// The 12-character logical terminal address.
    pub logical_terminal_address: String,
    /// The 4-digit session number.
    pub session_number: String,
    /// The 6-digit sequence number.
    pub sequence_number: String,
}

/// Block 2, input variant — present on messages sent *to* the network.
/// Check [`Base::is_input`] (or `set`) before reading the fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppHeaderInput {
    /// Whether this message carries an input app header.
    pub set: bool,
    /// The `{2:…}` reconstruction.
    pub raw: String,
    /// The 3-digit message type (e.g. `940`).
    pub message_type: String,
    /// The receiver's 12-character address.
    pub receiver_address: String,
    /// The requested delivery priority.
    pub message_priority: Priority,
    /// The requested delivery monitoring.
    pub delivery_monitor: DeliveryMonitor,
    /// The obsolescence period, already converted to minutes.
    pub obsolescence_period_minutes: i64,
}

/// Block 2, output variant — present on messages received *from* the
/// network. Check [`Base::is_output`] (or `set`) before reading the fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppHeaderOutput {
    /// Whether this message carries an output app header.
    pub set: bool,
    /// The `{2:…}` reconstruction.
    pub raw: String,
    /// The 3-digit message type (e.g. `940`).
    pub message_type: String,
    /// The input time, in the sender's time zone.
    pub input_time: Time,
    /// The message input reference (MIR).
    pub message_input_reference: InputReference,
    /// The output date.
    pub output_date: Date,
    /// The output time.
    pub output_time: Time,
    /// The delivery priority, when present.
    pub message_priority: Priority,
}

/// Block 3 — the optional user header. Check [`Base::has_user_header`]
/// before reading the fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsrHeader {
    /// Whether the block was present.
    pub set: bool,
    /// The `{3:…}` reconstruction.
    pub raw: String,
    /// Sub-block `103` — FINCopy service identifier.
    pub service_id: String,
    /// Sub-block `106` — message input reference.
    pub message_input_reference: InputReference,
    /// Sub-block `108` — message user reference.
    pub message_user_reference: String,
    /// Sub-block `111` — service type identifier.
    pub service_type_id: String,
    /// Sub-block `113` — banking priority.
    pub banking_priority: String,
    /// Sub-block `115` — addressee information.
    pub addressee_information: String,
    /// Sub-block `119` — validation flag.
    pub validation_flag: String,
    /// Sub-block `121` — unique end-to-end transaction reference.
    pub unique_end_to_end_transaction_reference: String,
    /// Sub-block `165` — payment release information.
    pub payment_release_information: String,
    /// Sub-block `423` — balance checkpoint date and time.
    pub balance_checkpoint_date_time: DateTimeSecOptCent,
    /// Sub-block `424` — related reference.
    pub related_reference: String,
    /// Sub-block `433` — sanctions screening information.
    pub sanctions_screening_information: String,
    /// Sub-block `434` — payment controls information.
    pub payment_controls_information: String,
}

/// A `PDE` trailer: the sender believes the same message may have been
/// sent before.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PossibleDuplicateEmission {
    /// The wire text.
    pub raw: String,
    /// The emission time.
    pub time: Time,
    /// The input reference of the possibly duplicated message.
    pub message_input_reference: InputReference,
}

/// A `PDM` trailer: the system resent an output message whose prior
/// delivery may not be valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PossibleDuplicateMessage {
    /// The wire text.
    pub raw: String,
    /// The resend time.
    pub time: Time,
    /// The output reference of the possibly duplicated message.
    pub message_output_reference: OutputReference,
}

/// A `SYS` trailer: a system or service message reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemOriginatedMessage {
    /// The wire text.
    pub raw: String,
    /// The originating time.
    pub time: Time,
    /// The referenced input message.
    pub message_input_reference: InputReference,
}

/// Block 5 — the optional trailers. Check [`Base::has_trailers`] before
/// reading the fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trailers {
    /// Whether the block was present.
    pub set: bool,
    /// The `{5:…}` reconstruction, rebuilt from the sub-blocks.
    pub raw: String,
    /// `DLM` — the message was delayed.
    pub delayed_message: bool,
    /// `TNG` — test and training message.
    pub test_and_training_message: bool,
    /// `CHK` — the checksum, kept opaque.
    pub checksum: String,
    /// `MRF` — message reference.
    pub message_reference: Reference,
    /// `PDE` — possible duplicate emission.
    pub possible_duplicate_emission: PossibleDuplicateEmission,
    /// `PDM` — possible duplicate message.
    pub possible_duplicate_message: PossibleDuplicateMessage,
    /// `SYS` — system originated message.
    pub system_originated_message: SystemOriginatedMessage,
    /// Sub-blocks with labels outside the fixed set, by label.
    pub additional_trailers: BTreeMap<String, String>,
}

// ── Message base and generic message ────────────────────────────────────────

/// The structure every MT message shares, excluding the body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Base {
    /// The canonical-order reconstruction of the whole message.
    pub raw: String,
    /// The 1-based input line the message started on.
    pub line: usize,
    /// Block 1.
    pub basic_header: BasicHeader,
    /// Block 2, when the message is of the input variety.
    pub app_header_input: AppHeaderInput,
    /// Block 2, when the message is of the output variety.
    pub app_header_output: AppHeaderOutput,
    /// Block 3, when present.
    pub usr_header: UsrHeader,
    /// Block 5, when present.
    pub trailers: Trailers,
}

impl Base {
    /// `true` if the message carries an input app header.
    pub fn is_input(&self) -> bool {
        self.app_header_input.set
    }

    /// `true` if the message carries an output app header.
    pub fn is_output(&self) -> bool {
        self.app_header_output.set
    }

    /// The message type from whichever app header is present.
    pub fn message_type(&self) -> &str {
        if self.is_input() {
            &self.app_header_input.message_type
        } else {
            &self.app_header_output.message_type
        }
    }

    /// The priority from whichever app header is present.
    pub fn priority(&self) -> Priority {
        if self.is_input() {
            self.app_header_input.message_priority
        } else {
            self.app_header_output.message_priority
        }
    }

    /// `true` if the optional user header block was present.
    pub fn has_user_header(&self) -> bool {
        self.usr_header.set
    }

    /// `true` if the optional trailers block was present.
    pub fn has_trailers(&self) -> bool {
        self.trailers.set
    }
}

/// A complete message with decoded headers and an unprocessed body. The
/// message-type-specific records decode the body further.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mtx {
    /// The shared message structure.
    pub base: Base,
    /// The body: tag to values, values in wire order.
    pub body: BTreeMap<String, Vec<String>>,
}

// ── Body value records ──────────────────────────────────────────────────────

/// The balance of an account at a date, e.g. `C031002PLN40000,00`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Balance {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// Credit or debit.
    pub credit_debit: CreditDebit,
    /// The balance date.
    pub date: Date,
    /// The ISO currency code.
    pub currency: String,
    /// The amount, comma decimal mark on the wire.
    pub amount: f64,
}

/// One `:61:` statement line, e.g.
/// `0310201020C20000,00FMSCNONREF//8327000090031789` with an optional
/// second-line description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatementLine {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The value date.
    pub date: Date,
    /// The optional entry date (month and day).
    pub entry_date: Month,
    /// The funds code.
    pub funds_code: FundsCode,
    /// The amount.
    pub amount: f64,
    /// The 4-character transaction type code.
    pub swift_code: String,
    /// The account owner's reference.
    pub account_owner_reference: String,
    /// The bank's reference, including its `//` prefix.
    pub bank_reference: String,
    /// The optional supplementary details line.
    pub description: String,
}
