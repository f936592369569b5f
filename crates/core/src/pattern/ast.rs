use serde::Serialize;

/// A node of the parsed field-format pattern.
///
/// The tree is directed and acyclic; alternatives that re-parent a
/// preceding line-count expression are resolved by the parser promoting the
/// accumulated subtree into the alternative's left side, never by mutating
/// nodes after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Node {
    /// An ordered sequence of sub-patterns.
    Pattern(Vec<Node>),
    /// Text matched verbatim.
    Literal(String),
    /// A group that may match or consume nothing.
    Optional(Box<Node>),
    /// Up to `count` characters of the named class; exactly `count` when
    /// `strict`.
    CharGroup {
        /// Maximum (or, when strict, exact) number of characters.
        count: usize,
        /// Whether the count is exact.
        strict: bool,
        /// The character-class key (`n`, `a`, `c`, `x`, `d`).
        class_key: char,
    },
    /// The wrapped pattern applied once per line, for up to `lines` lines.
    LineCount {
        /// Maximum number of successive lines.
        lines: usize,
        /// The per-line pattern.
        node: Box<Node>,
    },
    /// An alternative between two patterns.
    Or {
        /// The left branch, tried first.
        left: Box<Node>,
        /// The right branch.
        right: Box<Node>,
    },
}
