//! Decoding of body field values into typed records.
//!
//! Everything that turns a wire string into a typed value goes through
//! [`DecodeMt`]; composite records (balances, statement lines) slice their
//! input positionally and delegate the pieces to the temporal parsers.
//! Decoding is structural only — field-format validation is the
//! validator's job and can be skipped independently.

use crate::record::{Balance, CreditDebit, FundsCode, StatementLine};
use crate::temporal::{Date, Month};
use swift_mt_diagnostics::DecodeError;

/// A value that can be decoded from its wire representation.
pub trait DecodeMt: Sized {
    /// Decode `input` into a value.
    fn decode_mt(input: &str) -> Result<Self, DecodeError>;
}

pub(crate) fn credit_debit_from(input: &str) -> Result<CreditDebit, DecodeError> {
    match input {
        "C" => Ok(CreditDebit::Credit),
        "D" => Ok(CreditDebit::Debit),
        other => Err(DecodeError::CreditDebit(other.to_string())),
    }
}

/// Parse a comma-decimal amount (`40000,00`).
fn amount_from(input: &str) -> Option<f64> {
    input.replace(',', ".").parse().ok()
}

impl DecodeMt for Balance {
    /// Decode a balance like `C031002PLN40000,00`: credit/debit indicator,
    /// 6-digit date, 3-character currency, then the amount.
    fn decode_mt(input: &str) -> Result<Balance, DecodeError> {
        // All fixed-length fields plus 1 to 15 amount characters.
        if input.len() < 11 || input.len() > 25 {
            return Err(DecodeError::BalanceLength(input.len()));
        }

        let credit_debit = credit_debit_from(&input[0..1])?;

        let date = Date::parse(&input[1..7]).map_err(|_| DecodeError::BalanceDate)?;

        let currency = input[7..10].to_string();

        let amount = amount_from(&input[10..]).ok_or(DecodeError::BalanceAmount)?;

        Ok(Balance {
            set: true,
            raw: input.to_string(),
            credit_debit,
            date,
            currency,
            amount,
        })
    }
}

impl DecodeMt for StatementLine {
    /// Decode a statement line like
    /// `0310201020C20000,00FMSCNONREF//8327000090031789` with an optional
    /// description on a second line. The entry date is recognized by the
    /// funds code not following the value date directly.
    fn decode_mt(input: &str) -> Result<StatementLine, DecodeError> {
        let mut lines = input.split('\n');
        let first = lines.next().unwrap_or("");
        let description = lines.next().unwrap_or("").to_string();

        let mut line = StatementLine {
            raw: input.to_string(),
            description,
            ..StatementLine::default()
        };

        let date_str = first.get(0..6).ok_or(DecodeError::StatementLineDate)?;
        line.date = Date::parse(date_str).map_err(|_| DecodeError::StatementLineDate)?;
        let mut rest = &first[6..];

        let has_entry_date = !rest.starts_with('C') && !rest.starts_with('D');
        if has_entry_date {
            let entry_str = rest.get(0..4).ok_or(DecodeError::StatementLineEntryDate)?;
            line.entry_date =
                Month::parse(entry_str).map_err(|_| DecodeError::StatementLineEntryDate)?;
            rest = &rest[4..];
        }

        if let Some(tail) = rest.strip_prefix("RC") {
            line.funds_code = FundsCode::CreditReversal;
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("RD") {
            line.funds_code = FundsCode::DebitReversal;
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix('C') {
            line.funds_code = FundsCode::Credit;
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix('D') {
            line.funds_code = FundsCode::Debit;
            rest = tail;
        } else {
            return Err(DecodeError::StatementLineFundsCode);
        }

        let amount_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b',')
            .count();
        line.amount = amount_from(&rest[..amount_len]).ok_or(DecodeError::StatementLineAmount)?;
        rest = &rest[amount_len..];

        line.swift_code = rest
            .get(0..4)
            .ok_or(DecodeError::StatementLineSwiftCode)?
            .to_string();
        rest = &rest[4..];

        // A double slash separates the owner's reference from the bank's.
        let split: Vec<&str> = rest.split("//").collect();
        if split.len() == 2 {
            line.account_owner_reference = split[0].to_string();
            line.bank_reference = format!("//{}", split[1]);
        } else {
            line.account_owner_reference = rest.to_string();
        }

        line.set = true;
        Ok(line)
    }
}

// ── Body plumbing ───────────────────────────────────────────────────────────

/// Take the single value of a non-repeating field.
pub(crate) fn single(values: &[String]) -> Result<&str, DecodeError> {
    if values.len() > 1 {
        return Err(DecodeError::MultipleValues);
    }
    Ok(values.first().map(String::as_str).unwrap_or(""))
}

/// Decode every value of a repeating field.
pub(crate) fn repeated<T: DecodeMt>(values: &[String]) -> Result<Vec<T>, DecodeError> {
    values
        .iter()
        .map(|value| {
            T::decode_mt(value).map_err(|cause| DecodeError::RepeatedItem(Box::new(cause)))
        })
        .collect()
}

/// Attach tag and field context to a decode failure.
pub(crate) fn field_context(tag: &str, field: &str, cause: DecodeError) -> DecodeError {
    DecodeError::Field {
        tag: tag.to_string(),
        field: field.to_string(),
        cause: Box::new(cause),
    }
}
