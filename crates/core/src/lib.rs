//! SWIFT MT toolchain core library.
//!
//! Parses and validates SWIFT MT (Message Text) financial messages from a
//! byte stream into structured records. The pipeline has two stages: a
//! block-structure scanner that recognizes the `{label:…}` framing and
//! yields generic messages, and a field-format engine that compiles
//! SWIFT's positional field grammar (e.g. `1!a6!n3!a15d`) into matchers
//! used for validation. Header blocks decode into typed records; the body
//! decodes per message type (currently MT940).
//!
//! The main entry points are [`parse_mtx`] / [`parse_all_mtx`] for generic
//! messages and [`parse_mt940`] / [`parse_all_mt940`] for typed customer
//! statements.

#![warn(missing_docs)]

/// Character classes referenced by the pattern DSL.
pub mod charset;
/// Parse configuration.
pub mod config;
/// Decoding of body field values into typed records.
pub mod decode;
/// Positional decoders for the header blocks.
pub mod headers;
/// The MT940 customer statement message.
pub mod mt940;
/// The field-format pattern DSL: lexer, AST, parser, and matcher.
pub mod pattern;
/// Typed message records.
pub mod record;
/// Block-structure scanning: stream lexer and block parser.
pub mod scan;
/// Pipeline entry points, queues, and cancellation.
pub mod stream;
/// The fixed date/time shapes used by headers and trailers.
pub mod temporal;
/// Field-format validation driven by record schemas.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the common entry points; the full module paths remain
// available.

// Pipeline
pub use config::ParseConfig;
pub use stream::{parse_all_mtx, parse_mtx, CancellationToken};

// Typed records
pub use mt940::{mt940_schema, mtx_to_mt940, parse_all_mt940, parse_mt940, validate_mt940, MT940};
pub use record::{Balance, Base, Mtx, StatementLine};

// Pattern engine
pub use pattern::Pattern;

// Validation
pub use validate::{FieldSource, FieldValue, RecordSchema, Requirement};

// Diagnostics (re-exported from the diagnostics crate)
pub use swift_mt_diagnostics as diag;
pub use swift_mt_diagnostics::{MtError, ParseError, ParseErrors};
