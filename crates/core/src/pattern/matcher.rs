use super::{ast, lexer, parser};
use crate::charset::{class_for_key, CharClass};
use swift_mt_diagnostics::{MatchError, PatternError};

/// A compiled field-format pattern.
///
/// Compiled once, immutable afterwards, and safe to share across threads;
/// matching is referentially transparent. [`Pattern::validate`] checks a
/// whole value, [`Pattern::partial_match`] consumes a prefix and returns
/// the remainder.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    root: Matcher,
}

impl Pattern {
    /// Compile a pattern source string (e.g. `1!a6!n3!a15d`).
    pub fn compile(source: &str) -> Result<Pattern, PatternError> {
        let ast = parser::parse(lexer::lex(source))?;
        Ok(Pattern {
            source: source.to_string(),
            root: compile_node(&ast, 1),
        })
    }

    /// The pattern source this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match a prefix of `input`, starting at the given 1-based line, and
    /// return the unconsumed remainder.
    pub fn partial_match<'a>(
        &self,
        input: &'a str,
        current_line: usize,
    ) -> Result<&'a str, MatchError> {
        self.root.partial_match(input, current_line)
    }

    /// Validate a complete value: the pattern must match and consume all of
    /// `input`. Partial-match failures are wrapped as
    /// [`MatchError::InputInvalid`]; leftover input is
    /// [`MatchError::IncompleteMatch`].
    pub fn validate(&self, input: &str) -> Result<(), MatchError> {
        let rest = self
            .root
            .partial_match(input, 1)
            .map_err(|cause| MatchError::InputInvalid(Box::new(cause)))?;
        if !rest.is_empty() {
            return Err(MatchError::IncompleteMatch);
        }
        Ok(())
    }
}

// ── Matcher tree ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    CharGroup {
        class: CharClass,
        class_key: char,
        count: usize,
        strict: bool,
    },
    Optional(Box<Matcher>),
    Sequence(Vec<Matcher>),
    Or(Box<Matcher>, Box<Matcher>),
    /// The wrapped matcher applied per line while the current line lies in
    /// `[first, last)`. The bounds are fixed at compile time.
    Lines {
        first: usize,
        last: usize,
        node: Box<Matcher>,
    },
}

/// Lower an AST node into its matcher. `current_line` tracks the 1-based
/// line a line-count expression starts on; the expression's body is
/// compiled against the line following its range.
fn compile_node(node: &ast::Node, current_line: usize) -> Matcher {
    match node {
        ast::Node::Pattern(nodes) => Matcher::Sequence(
            nodes
                .iter()
                .map(|n| compile_node(n, current_line))
                .collect(),
        ),
        ast::Node::Literal(text) => Matcher::Literal(text.clone()),
        ast::Node::Optional(inner) => {
            Matcher::Optional(Box::new(compile_node(inner, current_line)))
        }
        ast::Node::CharGroup {
            count,
            strict,
            class_key,
        } => Matcher::CharGroup {
            class: class_for_key(*class_key),
            class_key: *class_key,
            count: *count,
            strict: *strict,
        },
        ast::Node::LineCount { lines, node } => {
            let last = current_line + lines;
            Matcher::Lines {
                first: current_line,
                last,
                node: Box::new(compile_node(node, last)),
            }
        }
        ast::Node::Or { left, right } => Matcher::Or(
            Box::new(compile_node(left, current_line)),
            Box::new(compile_node(right, current_line)),
        ),
    }
}

impl Matcher {
    fn partial_match<'a>(
        &self,
        input: &'a str,
        current_line: usize,
    ) -> Result<&'a str, MatchError> {
        match self {
            Matcher::Literal(text) => input
                .strip_prefix(text.as_str())
                .ok_or_else(|| MatchError::LiteralExpected(text.clone())),

            Matcher::CharGroup {
                class,
                class_key,
                count,
                strict,
            } => match_char_group(input, *class, *class_key, *count, *strict),

            Matcher::Optional(inner) => match inner.partial_match(input, current_line) {
                Ok(rest) => Ok(rest),
                Err(_) => Ok(input),
            },

            Matcher::Sequence(children) => {
                let mut rest = input;
                for child in children {
                    rest = child.partial_match(rest, current_line)?;
                }
                Ok(rest)
            }

            Matcher::Or(left, right) => {
                let left_result = left.partial_match(input, current_line);
                // The left branch covering the entire input wins outright.
                if let Ok("") = left_result {
                    return left_result;
                }
                let right_result = right.partial_match(input, current_line);
                match (left_result, right_result) {
                    (Ok(left_rest), Err(_)) => Ok(left_rest),
                    (Err(_), Ok(right_rest)) => Ok(right_rest),
                    (Ok(left_rest), Ok(right_rest)) => {
                        // Both matched: prefer the branch that consumed more.
                        if left_rest.len() <= right_rest.len() {
                            Ok(left_rest)
                        } else {
                            Ok(right_rest)
                        }
                    }
                    (Err(left_err), Err(right_err)) => Err(MatchError::OrBranchFailed {
                        left: Box::new(left_err),
                        right: Box::new(right_err),
                    }),
                }
            }

            Matcher::Lines { first, last, node } => {
                let mut rest = input;
                let mut line = current_line;
                let lines: Vec<&str> = input.split('\n').collect();
                let mut idx = 0;
                while idx < lines.len() && line >= *first && line < *last {
                    let text = lines[idx];
                    match node.partial_match(text, line) {
                        Err(cause) => {
                            return Err(MatchError::Line {
                                line,
                                cause: Box::new(cause),
                            });
                        }
                        Ok(line_rest) if !line_rest.is_empty() => {
                            return Err(MatchError::Line {
                                line,
                                cause: Box::new(MatchError::IncompleteMatch),
                            });
                        }
                        Ok(_) => {}
                    }
                    // Step past the line and its newline.
                    let advance = text.len() + 1;
                    rest = if rest.len() > advance {
                        &rest[advance..]
                    } else {
                        ""
                    };
                    line += 1;
                    idx += 1;
                }
                Ok(rest)
            }
        }
    }
}

fn match_char_group<'a>(
    input: &'a str,
    class: CharClass,
    class_key: char,
    count: usize,
    strict: bool,
) -> Result<&'a str, MatchError> {
    if class == CharClass::Amount {
        return match_amount(input, count, strict);
    }

    let mut matched = 0usize;
    let mut end = 0usize;
    for (idx, c) in input.char_indices() {
        if matched == count || !class.contains(c) {
            break;
        }
        matched += 1;
        end = idx + c.len_utf8();
    }

    if strict && matched < count {
        return Err(MatchError::ClassCountShort {
            class_key,
            expected: count,
            actual: matched,
        });
    }
    Ok(&input[end..])
}

/// Result of scanning for an amount: digits, exactly one decimal comma,
/// at least one fractional digit, with the digit total bounded by the
/// group count.
enum AmountScan {
    /// No amount shape present at the start of the input.
    Invalid,
    /// An amount was found: `digits` class characters over `consumed` bytes.
    Matched { digits: usize, consumed: usize },
}

fn scan_amount(input: &str, count: usize) -> AmountScan {
    let bytes = input.as_bytes();
    let mut consumed = 0usize;
    let mut before = 0usize;

    for &b in bytes {
        if before == count {
            break;
        }
        if b == b',' {
            consumed += 1;
            break;
        }
        if b.is_ascii_digit() {
            consumed += 1;
            before += 1;
        } else {
            return AmountScan::Invalid;
        }
    }

    let mut after = 0usize;
    for &b in &bytes[consumed..] {
        if before + after == count {
            break;
        }
        consumed += 1;
        if b.is_ascii_digit() {
            after += 1;
        } else {
            break;
        }
    }

    // An amount without fractional digits is not an amount.
    if after == 0 {
        return AmountScan::Invalid;
    }

    AmountScan::Matched {
        digits: before + after,
        consumed,
    }
}

fn match_amount(input: &str, count: usize, strict: bool) -> Result<&str, MatchError> {
    match scan_amount(input, count) {
        AmountScan::Invalid => {
            if strict {
                Err(MatchError::AmountExpected)
            } else {
                // Non-strict groups may match nothing at all.
                Ok(input)
            }
        }
        AmountScan::Matched { digits, consumed } => {
            if strict && digits < count {
                return Err(MatchError::ClassCountShort {
                    class_key: 'd',
                    expected: count,
                    actual: digits,
                });
            }
            Ok(&input[consumed..])
        }
    }
}
