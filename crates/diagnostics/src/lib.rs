//! Diagnostics for the SWIFT MT toolchain.
//!
//! Provides the closed error taxonomy shared by the scanner, the pattern
//! engine, the header decoders, and the validator, plus [`ParseError`] (an
//! error tagged with the 1-based source line of the message it belongs to)
//! and [`ParseErrors`] (the aggregate returned by batch parsing).
//!
//! Every error in this crate is non-fatal from the parser's point of view:
//! parsing continues and errors are collected, per message, on a separate
//! stream.

#![warn(missing_docs)]

use serde::Serialize;
use std::fmt;
use thiserror::Error;

// ── Scanner errors ──────────────────────────────────────────────────────────

/// Errors produced by the block-structure scanner while reading the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[non_exhaustive]
pub enum ScanError {
    /// The underlying reader failed; the scanner terminates after this.
    #[error("could not read from input: {0}")]
    ReadFailed(String),
}

// ── Pattern compile errors ──────────────────────────────────────────────────

/// Errors produced while compiling a field-format pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// A `(` was never closed by a matching `)`.
    #[error("unclosed optional expression")]
    UnclosedOptional,
    /// A token appeared where the grammar does not allow it, e.g. a stray
    /// or doubled `*`.
    #[error("unexpected token {0}")]
    UnexpectedToken(String),
}

// ── Pattern match errors ────────────────────────────────────────────────────

/// Errors produced when matching a value against a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[non_exhaustive]
pub enum MatchError {
    /// The input does not start with the expected literal text.
    #[error("expected input to have literal {0:?}")]
    LiteralExpected(String),
    /// A strict character group matched fewer characters than required.
    #[error("expected {expected} characters within '{class_key}' group, got {actual}")]
    ClassCountShort {
        /// The character-class key of the group (`n`, `a`, `c`, `x`, `d`).
        class_key: char,
        /// The required character count.
        expected: usize,
        /// The number of characters actually matched.
        actual: usize,
    },
    /// A strict `d` group could not recognize an amount (digits, exactly one
    /// decimal comma, at least one fractional digit).
    #[error("expected amount within 'd' group")]
    AmountExpected,
    /// Both branches of an alternative failed.
    #[error("input invalid for or: left: {left}, right: {right}")]
    OrBranchFailed {
        /// The failure of the left branch.
        left: Box<MatchError>,
        /// The failure of the right branch.
        right: Box<MatchError>,
    },
    /// A failure inside a line-count expression, qualified with the 1-based
    /// line on which it occurred.
    #[error("line {line}: {cause}")]
    Line {
        /// The 1-based line number at the point of failure.
        line: usize,
        /// The underlying failure.
        cause: Box<MatchError>,
    },
    /// The pattern matched but left unconsumed input behind.
    #[error("incomplete match")]
    IncompleteMatch,
    /// Wrapper used by full-input validation around a partial-match failure.
    #[error("input invalid: {0}")]
    InputInvalid(Box<MatchError>),
}

// ── Temporal errors ─────────────────────────────────────────────────────────

/// Errors produced when parsing one of the fixed date/time shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[non_exhaustive]
pub enum TemporalError {
    /// Not a valid `HHMM` time.
    #[error("invalid time: {0:?}")]
    Time(String),
    /// Not a valid `MMDD` month/day.
    #[error("invalid month/day: {0:?}")]
    Month(String),
    /// Not a valid `YYMMDD` date.
    #[error("invalid date: {0:?}")]
    Date(String),
    /// Not a valid date-time of the named shape (`YYMMDDHHMM`,
    /// `YYMMDDHHMMSS`, `YYMMDDHHMMSS.mmm`, or `YYMMDDHHMM±HHMM`).
    #[error("invalid {shape} date-time: {raw:?}")]
    DateTime {
        /// The shape that failed to parse.
        shape: &'static str,
        /// The rejected input.
        raw: String,
    },
}

// ── Header decoding errors ──────────────────────────────────────────────────

/// Errors produced by the positional header decoders for blocks 1, 2, 3
/// and 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[non_exhaustive]
pub enum HeaderError {
    /// Block 1 content is not exactly 25 characters.
    #[error("invalid basic header block content length: {0}")]
    BasicHeaderLength(usize),
    /// Block 1 application id is not one of `F`, `A`, `L`.
    #[error("unknown application id in basic header block content: {0}")]
    UnknownApplicationId(String),
    /// Block 1 service id is not one of `01`, `21`.
    #[error("unknown service id in basic header block content: {0}")]
    UnknownServiceId(String),
    /// Block 2 content is shorter than the 4-character minimum.
    #[error("invalid app header block content length: {0}")]
    AppHeaderLength(usize),
    /// Block 2 does not start with `I` or `O`.
    #[error("invalid app header message type: {0}")]
    AppHeaderDirection(String),
    /// Input app header content length is outside 16..=21.
    #[error("invalid app header input block content length: {0}")]
    AppHeaderInputLength(usize),
    /// Output app header content is shorter than 46 characters.
    #[error("invalid app header output block content length: {0}")]
    AppHeaderOutputLength(usize),
    /// A priority character other than `S`, `N`, `U`.
    #[error("unknown message priority in app header input block content: {0}")]
    UnknownPriority(String),
    /// A delivery monitor character other than `1`, `2`, `3`.
    #[error("invalid delivery monitor in app header input block content: {0}")]
    InvalidDeliveryMonitor(String),
    /// A character that is neither a priority nor a delivery monitor.
    #[error("invalid priority or delivery monitor in app header input block content: {0}")]
    InvalidPriorityOrDeliveryMonitor(String),
    /// An obsolescence period that is not a positive decimal number.
    #[error("invalid obsolescence period in app header input block content: {0}")]
    InvalidObsolescence(String),
    /// The output app header priority character is not `S`, `N`, `U`.
    #[error("invalid message priority in app header output block content: {0}")]
    InvalidOutputPriority(String),
    /// The output app header input time failed to parse.
    #[error("invalid input time in app header output block content: {raw}: {cause}")]
    InvalidInputTime {
        /// The rejected time text.
        raw: String,
        /// The underlying temporal failure.
        cause: TemporalError,
    },
    /// The output app header output date failed to parse.
    #[error("invalid output date in app header output block content: {raw}: {cause}")]
    InvalidOutputDate {
        /// The rejected date text.
        raw: String,
        /// The underlying temporal failure.
        cause: TemporalError,
    },
    /// The output app header output time failed to parse.
    #[error("invalid output time in app header output block content: {raw}: {cause}")]
    InvalidOutputTime {
        /// The rejected time text.
        raw: String,
        /// The underlying temporal failure.
        cause: TemporalError,
    },
    /// A message input reference embedded in a header failed to decode.
    #[error("could not parse message input reference with date: {0}")]
    InputReference(Box<HeaderError>),
    /// A message input reference is not exactly 28 characters.
    #[error("invalid message input reference with date string length: {0}")]
    InputReferenceLength(usize),
    /// The date slice of a message input reference failed to parse.
    #[error("invalid message input reference with date date string: {raw}: {cause}")]
    InputReferenceDate {
        /// The rejected date text.
        raw: String,
        /// The underlying temporal failure.
        cause: TemporalError,
    },
    /// The date/time slice of a message output reference failed to parse.
    #[error("invalid message output reference date/time string: {raw}: {cause}")]
    OutputReferenceDate {
        /// The rejected date/time text.
        raw: String,
        /// The underlying temporal failure.
        cause: TemporalError,
    },
    /// The date/time slice of an MRF message reference failed to parse.
    #[error("invalid message reference date/time string: {raw}: {cause}")]
    ReferenceDateTime {
        /// The rejected date/time text.
        raw: String,
        /// The underlying temporal failure.
        cause: TemporalError,
    },
    /// The input reference of an MRF message reference failed to decode.
    #[error("invalid message reference message input reference: {raw}: {cause}")]
    ReferenceInputReference {
        /// The rejected reference text.
        raw: String,
        /// The underlying decode failure.
        cause: Box<HeaderError>,
    },
    /// A user header sub-block label outside the known set.
    #[error("invalid usr header block sub block label: {0}")]
    UnknownUserHeaderLabel(String),
    /// The user header `106` message input reference failed to decode.
    #[error("invalid message input reference: {0}")]
    UserHeaderInputReference(Box<HeaderError>),
    /// The user header `423` balance checkpoint date-time failed to parse.
    #[error("invalid balance checkpoint time in usr header block content: {raw}: {cause}")]
    BalanceCheckpoint {
        /// The rejected date-time text.
        raw: String,
        /// The underlying temporal failure.
        cause: TemporalError,
    },
    /// A `PDE` trailer is not exactly 32 characters.
    #[error("invalid possible duplicate emission string length: {0}")]
    PdeLength(usize),
    /// A `PDE` trailer time failed to parse.
    #[error("invalid possible duplicate emission time: {raw}: {cause}")]
    PdeTime {
        /// The rejected time text.
        raw: String,
        /// The underlying temporal failure.
        cause: TemporalError,
    },
    /// A `PDE` trailer input reference failed to decode.
    #[error("invalid possible duplicate emission message input reference: {0}")]
    PdeInputReference(Box<HeaderError>),
    /// A `PDM` trailer is not 32 or 36 characters.
    #[error("invalid possible duplicate message string length: {0}")]
    PdmLength(usize),
    /// A `PDM` trailer time failed to parse.
    #[error("invalid possible duplicate message time: {raw}: {cause}")]
    PdmTime {
        /// The rejected time text.
        raw: String,
        /// The underlying temporal failure.
        cause: TemporalError,
    },
    /// A `PDM` trailer output reference failed to decode.
    #[error("invalid possible duplicate message output reference: {0}")]
    PdmOutputReference(Box<HeaderError>),
    /// An `SYS` trailer is not exactly 32 characters.
    #[error("invalid system originated message string length: {0}")]
    SysLength(usize),
    /// An `SYS` trailer time failed to parse.
    #[error("invalid system originated message time: {raw}: {cause}")]
    SysTime {
        /// The rejected time text.
        raw: String,
        /// The underlying temporal failure.
        cause: TemporalError,
    },
    /// An `SYS` trailer input reference failed to decode.
    #[error("invalid system originated message input reference: {0}")]
    SysInputReference(Box<HeaderError>),
}

// ── Field decoding errors ───────────────────────────────────────────────────

/// Errors produced while decoding body field values into typed records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The message type in the app header does not match the requested
    /// record type.
    #[error("expected message type {expected}, got {actual}")]
    MessageType {
        /// The message type the caller asked for.
        expected: String,
        /// The message type found in the app header.
        actual: String,
    },
    /// A balance value is outside the 11..=25 character range.
    #[error("balance: invalid input length: {0}")]
    BalanceLength(usize),
    /// A credit/debit indicator other than `C` or `D`.
    #[error("credit/debit: invalid indicator: {0}")]
    CreditDebit(String),
    /// A balance date failed to parse.
    #[error("balance: invalid date")]
    BalanceDate,
    /// A balance amount failed to parse.
    #[error("balance: invalid amount")]
    BalanceAmount,
    /// A statement line date failed to parse.
    #[error("statement line: invalid date")]
    StatementLineDate,
    /// A statement line entry date failed to parse.
    #[error("statement line: invalid entry date")]
    StatementLineEntryDate,
    /// A statement line funds code other than `C`, `D`, `RC`, `RD`.
    #[error("statement line: invalid or missing funds code")]
    StatementLineFundsCode,
    /// A statement line amount failed to parse.
    #[error("statement line: invalid amount")]
    StatementLineAmount,
    /// A statement line swift code shorter than 4 characters.
    #[error("statement line: invalid or missing swift code")]
    StatementLineSwiftCode,
    /// Multiple wire values arrived for a field that holds a single value.
    #[error("multiple values but field is not repeatable")]
    MultipleValues,
    /// A repeated field's element failed to decode.
    #[error("decoding failed for repeated item: {0}")]
    RepeatedItem(Box<DecodeError>),
    /// Context wrapper naming the tag and record field that failed.
    #[error("decoding failed for tag {tag}, field {field}: {cause}")]
    Field {
        /// The SWIFT tag of the failing field (e.g. `61`).
        tag: String,
        /// The record field name (e.g. `StatementLines`).
        field: String,
        /// The underlying decode failure.
        cause: Box<DecodeError>,
    },
}

// ── Schema build errors ─────────────────────────────────────────────────────

/// Errors produced while building a record schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// A schema item carried a field-format pattern that does not compile.
    #[error("field {field}: invalid pattern {pattern:?}: {cause}")]
    Pattern {
        /// The record field name.
        field: String,
        /// The pattern source text.
        pattern: String,
        /// The compile failure.
        cause: PatternError,
    },
}

// ── Validation errors ───────────────────────────────────────────────────────

/// The leaf or nested cause attached to one field of a validated record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub enum ValidationCause {
    /// A mandatory field rendered to an empty (or zero) canonical value.
    MandatoryEmpty(String),
    /// The field's canonical value failed its compiled pattern.
    Pattern(MatchError),
    /// A schema item expected a nested record but the field produced a
    /// plain value (or the reverse).
    UnsupportedFieldKind(String),
    /// Failures of a nested record or of a repeated field's elements.
    Nested(ValidationErrors),
}

impl fmt::Display for ValidationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationCause::MandatoryEmpty(field) => {
                write!(f, "empty mandatory field {field}")
            }
            ValidationCause::Pattern(err) => write!(f, "pattern validation failed: {err}"),
            ValidationCause::UnsupportedFieldKind(field) => {
                write!(f, "unsupported field kind for {field}")
            }
            ValidationCause::Nested(errs) => write!(f, "{errs}"),
        }
    }
}

/// A validation failure attributed to one record field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// The record field name, possibly indexed (e.g. `StatementLines[1]`).
    pub field: String,
    /// The SWIFT tag label from the schema; empty for nested sub-fields.
    pub label: String,
    /// The cause, either a leaf or the failures of a nested record.
    pub cause: ValidationCause,
}

/// All validation failures of one record, in schema order.
///
/// Renders as an indented tree, one line per leaf failure, with nested
/// records indented one step further:
///
/// ```text
/// OpeningBalance|60F|:
///     Date: empty mandatory field Date
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// `true` if no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level field failures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Render the tree with the given indentation unit. Nested levels use
    /// the doubled unit, mirroring how the failures nest.
    pub fn render_indented(&self, indent: &str) -> String {
        let mut out = String::new();
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let mut head = err.field.clone();
            if !err.label.is_empty() {
                head.push('|');
                head.push_str(&err.label);
                head.push('|');
            }
            match &err.cause {
                ValidationCause::Nested(nested) => {
                    let deeper = format!("{indent}{indent}");
                    out.push_str(&format!(
                        "{indent}{head}:\n{}",
                        nested.render_indented(&deeper)
                    ));
                }
                leaf => out.push_str(&format!("{indent}{head}: {leaf}")),
            }
        }
        out
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_indented("\t"))
    }
}

impl std::error::Error for ValidationErrors {}

// ── Umbrella error and per-line reporting ───────────────────────────────────

/// Any error the MT parsing pipeline can attach to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[non_exhaustive]
pub enum MtError {
    /// A scanner failure.
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// Block 1 failed to decode.
    #[error("invalid basic header: {0}")]
    BasicHeader(HeaderError),
    /// Block 2 failed to decode.
    #[error("invalid app header: {0}")]
    AppHeader(HeaderError),
    /// Block 3 failed to decode.
    #[error("invalid user header: {0}")]
    UserHeader(HeaderError),
    /// Block 5 failed to decode.
    #[error("invalid trailers: {0}")]
    Trailers(HeaderError),
    /// The body failed to decode into a typed record.
    #[error("could not decode MT{msg_type} message: {cause}")]
    Decode {
        /// The message type of the record being decoded (e.g. `940`).
        msg_type: String,
        /// The underlying decode failure.
        cause: DecodeError,
    },
    /// The typed record failed field-format validation.
    #[error("validation failed for MT{msg_type} message:\n{cause}")]
    Validation {
        /// The message type of the record being validated.
        msg_type: String,
        /// The validation failure tree.
        cause: ValidationErrors,
    },
}

/// An error tagged with the 1-based source line of the message it belongs
/// to. Renders as `#<line>: <cause chain>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    line: usize,
    cause: MtError,
}

impl ParseError {
    /// Create a parse error for the message starting at `line`.
    pub fn new(cause: MtError, line: usize) -> Self {
        Self { line, cause }
    }

    /// The 1-based line in the input where the failing message starts.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The underlying cause.
    pub fn cause(&self) -> &MtError {
        &self.cause
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {}", self.line, self.cause)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// All parse errors of one input, in emission order.
///
/// Renders as a header line followed by one `#<line>: <chain>` entry per
/// error:
///
/// ```text
/// mt: Parse errors per message line:
/// #1: invalid basic header: invalid basic header block content length: 3
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParseErrors(Vec<ParseError>);

impl ParseErrors {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one error.
    pub fn push(&mut self, err: ParseError) {
        self.0.push(err);
    }

    /// `true` if no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate the errors in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.0.iter()
    }

    /// `None` when the group is empty, `Some(self)` otherwise. Batch entry
    /// points use this so that an error-free parse returns no error value.
    pub fn into_option(self) -> Option<ParseErrors> {
        if self.0.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl From<Vec<ParseError>> for ParseErrors {
    fn from(errs: Vec<ParseError>) -> Self {
        Self(errs)
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mt: Parse errors per message line:")?;
        for err in &self.0 {
            write!(f, "\n{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}
