//! Parse configuration.

use serde::{Deserialize, Serialize};

/// Options controlling the parsing pipeline.
///
/// ```
/// use swift_mt_core::ParseConfig;
///
/// let config = ParseConfig::new().lax(true).stop_on_error(true);
/// assert!(config.lax && config.stop_on_error && !config.skip_validation);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Skip field-pattern validation entirely. Structural decoding still
    /// runs and still fills the typed records; only the pattern checks are
    /// omitted. Useful when throughput matters more than validity.
    pub skip_validation: bool,
    /// Yield messages that fail validation instead of discarding them. The
    /// validation errors are still reported either way.
    pub lax: bool,
    /// Stop the scanner at its first error instead of continuing.
    pub stop_on_error: bool,
}

impl ParseConfig {
    /// The default configuration: validate, discard invalid messages,
    /// keep scanning after errors.
    pub fn new() -> ParseConfig {
        ParseConfig::default()
    }

    /// Set [`ParseConfig::skip_validation`].
    pub fn skip_validation(mut self, skip: bool) -> ParseConfig {
        self.skip_validation = skip;
        self
    }

    /// Set [`ParseConfig::lax`].
    pub fn lax(mut self, lax: bool) -> ParseConfig {
        self.lax = lax;
        self
    }

    /// Set [`ParseConfig::stop_on_error`].
    pub fn stop_on_error(mut self, stop: bool) -> ParseConfig {
        self.stop_on_error = stop;
        self
    }
}
