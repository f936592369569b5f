//! Character classes referenced by field-format patterns.
//!
//! The pattern DSL names its classes with single-character keys: `n`
//! (digits), `a` (uppercase letters), `c` (digits or uppercase letters),
//! `d` (digits plus the decimal comma) and `x` (the full SWIFT character
//! repertoire). The table is closed; a key outside it compiles to a class
//! that matches nothing.

/// A named character class from the field-format DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// `n` — ASCII digits.
    Numeric,
    /// `a` — uppercase ASCII letters.
    UpperAlpha,
    /// `c` — digits or uppercase ASCII letters.
    UpperAlphaNumeric,
    /// `d` — digits plus the decimal comma. Groups of this class carry
    /// amount semantics: exactly one comma with at least one digit after it.
    Amount,
    /// `x` — digits, letters of both cases, and the SWIFT punctuation set.
    Extended,
    /// A key outside the table; matches nothing.
    Unknown,
}

/// Resolve a class key to its [`CharClass`]. Unknown keys resolve to
/// [`CharClass::Unknown`] rather than failing; the original grammar accepts
/// them at compile time.
pub fn class_for_key(key: char) -> CharClass {
    match key {
        'n' => CharClass::Numeric,
        'a' => CharClass::UpperAlpha,
        'c' => CharClass::UpperAlphaNumeric,
        'd' => CharClass::Amount,
        'x' => CharClass::Extended,
        _ => CharClass::Unknown,
    }
}

/// `true` if `key` is one of the five reserved class keys.
pub fn is_class_key(key: char) -> bool {
    matches!(key, 'n' | 'a' | 'c' | 'x' | 'd')
}

/// The punctuation accepted by the `x` class, plus newline and space.
fn is_special(r: char) -> bool {
    matches!(
        r,
        '/' | '-' | '?' | ':' | '(' | ')' | '.' | ',' | '\'' | '+' | '{' | '}' | '\n' | ' '
    )
}

impl CharClass {
    /// Membership test for a single scalar value.
    pub fn contains(self, r: char) -> bool {
        match self {
            CharClass::Numeric => r.is_ascii_digit(),
            CharClass::UpperAlpha => r.is_ascii_uppercase(),
            CharClass::UpperAlphaNumeric => r.is_ascii_digit() || r.is_ascii_uppercase(),
            CharClass::Amount => r.is_ascii_digit() || r == ',',
            CharClass::Extended => {
                r.is_ascii_digit()
                    || r.is_ascii_uppercase()
                    || r.is_ascii_lowercase()
                    || is_special(r)
            }
            CharClass::Unknown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accepts_digits_only() {
        assert!(CharClass::Numeric.contains('0'));
        assert!(CharClass::Numeric.contains('9'));
        assert!(!CharClass::Numeric.contains('a'));
        assert!(!CharClass::Numeric.contains(','));
    }

    #[test]
    fn upper_alpha_rejects_lowercase() {
        assert!(CharClass::UpperAlpha.contains('A'));
        assert!(!CharClass::UpperAlpha.contains('a'));
        assert!(!CharClass::UpperAlpha.contains('1'));
    }

    #[test]
    fn amount_accepts_digits_and_comma() {
        assert!(CharClass::Amount.contains('5'));
        assert!(CharClass::Amount.contains(','));
        assert!(!CharClass::Amount.contains('.'));
    }

    #[test]
    fn extended_covers_punctuation_and_both_cases() {
        for c in "Az9/-?:().,'+{} \n".chars() {
            assert!(CharClass::Extended.contains(c), "x should accept {c:?}");
        }
        assert!(!CharClass::Extended.contains('*'));
        assert!(!CharClass::Extended.contains('ą'));
    }

    #[test]
    fn unknown_key_matches_nothing() {
        assert_eq!(class_for_key('z'), CharClass::Unknown);
        assert!(!CharClass::Unknown.contains('z'));
    }

    #[test]
    fn reserved_keys_are_closed() {
        for c in "nacxd".chars() {
            assert!(is_class_key(c));
        }
        assert!(!is_class_key('b'));
    }
}
