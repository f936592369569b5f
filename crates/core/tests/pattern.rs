//! Table-driven tests for the field-format pattern engine.
//!
//! Covers: compile-time errors, full-input validation across literals,
//! char groups, amounts, optionals, alternatives and line counts, and the
//! partial-match properties the validator relies on.

use swift_mt_core::diag::{MatchError, PatternError};
use swift_mt_core::Pattern;

fn compile(source: &str) -> Pattern {
    match Pattern::compile(source) {
        Ok(pattern) => pattern,
        Err(error) => panic!("pattern {source:?} failed to compile: {error}"),
    }
}

fn assert_valid(source: &str, input: &str) {
    let pattern = compile(source);
    if let Err(error) = pattern.validate(input) {
        panic!("pattern {source:?} should accept {input:?}, got: {error}");
    }
}

fn assert_invalid(source: &str, input: &str, fragment: &str) {
    let pattern = compile(source);
    match pattern.validate(input) {
        Ok(()) => panic!("pattern {source:?} should reject {input:?}"),
        Err(error) => {
            let rendered = error.to_string();
            assert!(
                rendered.contains(fragment),
                "pattern {source:?} on {input:?}: expected error containing {fragment:?}, \
                 got {rendered:?}"
            );
        }
    }
}

// ─── Compilation ─────────────────────────────────────────────────────────────

#[test]
fn unclosed_optionals_fail_to_compile() {
    for source in ["(/", "(/(/)", "(/(/", "1!a|(", "2*(1!a", "2*1!a|(", "2*1!a|2*("] {
        assert_eq!(
            Pattern::compile(source).err(),
            Some(PatternError::UnclosedOptional),
            "pattern {source:?}"
        );
    }
}

#[test]
fn stray_line_count_markers_fail_to_compile() {
    for source in ["2**1!z", "(2**1!a)", "1!a|1!n|2**1!x", "(1!n|2**1!a)", "*1!a"] {
        assert_eq!(
            Pattern::compile(source).err(),
            Some(PatternError::UnexpectedToken("*".into())),
            "pattern {source:?}"
        );
    }
}

#[test]
fn benign_shapes_compile() {
    for source in ["(1!a2*1!a)", "(1!a|1!n)", "1!z", "16", "//((/)/)"] {
        assert!(
            Pattern::compile(source).is_ok(),
            "pattern {source:?} should compile"
        );
    }
}

// ─── Validation table ────────────────────────────────────────────────────────

#[test]
fn literal_and_char_group_validation() {
    assert_invalid("x16x", "y1234567890", "expected input to have literal \"x\"");
    assert_valid("x16x", "x1234567890");
    assert_valid("16", "16");
    assert_invalid("16x", "abc123,*", "incomplete match");
    assert_valid("16x", "1234567890ABCDEF");
    assert_invalid("3!a", "ABc", "expected 3 characters within 'a' group, got 2");
    assert_valid("/3!a", "/ABC");
    assert_invalid("/3!a", "ABC", "expected input to have literal \"/\"");
    assert_valid("/", "/");
}

#[test]
fn amount_group_validation() {
    assert_invalid("3d", "0,,", "incomplete match");
    assert_invalid("3d", "0,aa", "incomplete match");
    assert_invalid("3d", "0,000,00", "incomplete match");
    assert_valid("2d", "0,0");
    assert_invalid("2d", "0,00", "incomplete match");
    assert_valid("3d", "0,00");
    assert_invalid("3!d", "00,00", "incomplete match");
    assert_valid("3!d", "0,00");
    assert_invalid("3!d", "0,000,00", "incomplete match");
    assert_valid("3!d3!d", "0,000,00");
    assert_invalid("1!d", "1,", "expected amount within 'd' group");
    assert_invalid("1!d", "x,0", "expected amount within 'd' group");
}

#[test]
fn optional_validation() {
    assert_valid("//(//)", "//");
    assert_valid("//(//)", "////");
    assert_valid("//((/)/)", "////");
    assert_valid("(/)3!a", "/ABC");
    assert_valid("(/)3!a", "ABC");
    assert_valid("(/)", "/");
    assert_valid("(/)", "");
    assert_valid("(/(/))", "");
    assert_valid("(/(/))", "/");
    assert_valid("(/(/))", "//");
    assert_valid("(3!a)", "");
    assert_valid("(3!a)", "ABC");
    assert_valid("(2*3!a)", "");
    assert_valid("(2*3!a)", "ABC");
    assert_valid("(2*3!a)", "ABC\nDEF");
}

#[test]
fn swift_field_shapes_validate() {
    assert_valid("2!c26!n", "PL25106000760000888888888888");
    assert_valid("8!c/12!n", "BPHKPLPK/320000752973");
    assert_valid("1!a6!n3!a15d", "C020628PLN3481,35");
    assert_invalid(
        "5!n(/)3!n",
        "somethingelse",
        "expected 5 characters within 'n' group, got 0",
    );
}

#[test]
fn alternative_validation() {
    assert_valid("//|^^", "//");
    assert_valid("//|^^", "^^");
    assert_valid("2!c26!n|8!c/12!n", "PL25106000760000888888888888");
    assert_valid("2!c26!n|8!c/12!n", "BPHKPLPK/320000752973");
    assert_invalid("2!c26!n|8!c/12!n", "BPHKPLPK320000752973", "input invalid for or");
    assert_valid("2!a|(1!n)1!a", "AB");
    assert_valid("2!a|(1!n)1!a", "A");
    assert_valid("2!a|(1!n)1!a", "1A");
    assert_valid("2!a|1!a", "AB");
    assert_valid("1!n|2!a", "AB");
    assert_invalid("1!n|2!a", "12", "incomplete match");
    assert_invalid("2!n|1!n", "123", "incomplete match");
}

#[test]
fn line_count_validation() {
    assert_valid("6*65x", "abc\nefg\nhij");
    assert_valid("2*3!a2*3!n", "ABC\nDEF\n123\n456");
    assert_valid("1*6!n4!n2a|8n1!a3!c1*(//)16x", "1234561234AB\n//1010001272972001");
    assert_valid("1*6!n4!n2a|8n1!a3!c1*(//)16x", "12345678AABC\n//1010001272972001");
    assert_invalid(
        "1*6!n4!n2a|8n1!a3!c1*(//)16x",
        "12345678AABC\n//10100012729720011",
        "incomplete match",
    );
    assert_invalid(
        "1*6!n4!n2a|8n1!a3!c1*(//)16x",
        "12345678AAB\n//1010001272972001",
        "input invalid for or",
    );
}

#[test]
fn alternatives_between_line_counts() {
    assert_valid("2*1!a|2*1!n", "A\nB");
    assert_valid("2*1!a|2*1!n", "1\n2");
    assert_valid("1!a|(2*1!n|2*1!a)", "A");
    assert_valid("1!a|(2*1!n|2*1!a)", "1\n2");
    assert_valid("1!a|(2*1!n|2*1!a)", "A\nB");
    assert_valid("1!a|2!n|3!d1*1!a|2!n|3!d", "A\nB");
    assert_valid("1!a|2!n|3!d1*1!a|2!n|3!d", "12\n32");
    assert_valid("1!a|2!n|3!d1*1!a|2!n|3!d", "1,23\n4,56");
    assert_invalid("1!a|2!n|3!d1*1!a|2!n|3!d", "1\n32", "input invalid for or");
    assert_invalid("1!a|2!n|3!d1*1!a|2!n|3!d", "12\n3", "input invalid for or");
}

// ─── Matching properties ─────────────────────────────────────────────────────

#[test]
fn optional_always_accepts_empty_input() {
    for source in ["(/)", "(3!a)", "(2*3!a)", "(1!a|1!n)", "(/(/))"] {
        assert_valid(source, "");
    }
}

#[test]
fn literal_identity() {
    let pattern = compile("NONREF");
    assert_eq!(pattern.partial_match("NONREF", 1), Ok(""));
    assert!(pattern.validate("NONREF").is_ok());
    assert!(pattern.validate("NONREX").is_err());
    // A proper prefix match leaves the remainder unconsumed.
    assert_eq!(pattern.partial_match("NONREF123", 1), Ok("123"));
}

#[test]
fn non_strict_group_accepts_any_prefix_up_to_count() {
    let pattern = compile("4n");
    for input in ["", "1", "12", "123", "1234"] {
        assert!(
            pattern.validate(input).is_ok(),
            "4n should accept {input:?}"
        );
    }
    assert!(pattern.validate("12345").is_err());
}

#[test]
fn strict_group_accepts_exactly_count() {
    let pattern = compile("4!n");
    assert!(pattern.validate("1234").is_ok());
    for input in ["", "1", "123"] {
        assert!(
            pattern.validate(input).is_err(),
            "4!n should reject {input:?}"
        );
    }
}

#[test]
fn amount_requires_exactly_one_comma_with_fraction() {
    let pattern = compile("15d");
    assert_valid("15d", "1,0");
    assert_valid("15d", "123456,789");
    assert_invalid("15d", "123", "incomplete match");
    assert_invalid("15d", "123,", "incomplete match");
    assert_invalid("15d", "1,2,3", "incomplete match");
    assert!(pattern.validate("0,00").is_ok());
}

#[test]
fn or_picks_shorter_remainder_on_double_match() {
    // Both branches match a prefix; the one consuming more wins.
    let pattern = compile("3a|1!a");
    assert_eq!(pattern.partial_match("ABCD", 1), Ok("D"));
    // Full consumption by the left branch short-circuits.
    let pattern = compile("2!a|1!a");
    assert_eq!(pattern.partial_match("AB", 1), Ok(""));
}

#[test]
fn line_count_failure_names_the_line() {
    let pattern = compile("3*2!n");
    match pattern.validate("12\n3x\n45") {
        Err(MatchError::InputInvalid(inner)) => match *inner {
            MatchError::Line { line, .. } => assert_eq!(line, 2),
            other => panic!("expected a line-qualified error, got {other}"),
        },
        other => panic!("expected failure on line 2, got {other:?}"),
    }
}

#[test]
fn line_count_accepts_fewer_lines_than_the_maximum() {
    assert_valid("6*65x", "one line only");
    assert_valid("6*65x", "a\nb\nc\nd\ne\nf");
    assert_invalid("6*65x", "a\nb\nc\nd\ne\nf\ng", "incomplete match");
}
