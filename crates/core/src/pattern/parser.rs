use super::ast::Node;
use super::lexer::Token;
use swift_mt_diagnostics::PatternError;

/// Parse a token stream (as produced by [`super::lexer::lex`]) into a
/// pattern AST. The returned node is always a [`Node::Pattern`].
pub fn parse(tokens: Vec<Token>) -> Result<Node, PatternError> {
    Parser { tokens, idx: 0 }.parse_pattern()
}

fn token_text(token: &Token) -> String {
    match token {
        Token::Literal(s) => s.clone(),
        Token::OptionalLeft => "(".into(),
        Token::OptionalRight => ")".into(),
        Token::LineCountMeta => "*".into(),
        Token::LineCount(n) | Token::CharCount(n) => n.to_string(),
        Token::CharCountStrictMeta => "!".into(),
        Token::CharSet(c) => c.to_string(),
        Token::Or => "|".into(),
        Token::Eof => "EOF".into(),
    }
}

struct Parser {
    tokens: Vec<Token>,
    idx: usize,
}

impl Parser {
    fn current(&self) -> Token {
        self.tokens[self.idx].clone()
    }

    /// Advance to the next token. The trailing EOF token is sticky.
    fn next(&mut self) {
        if self.idx < self.tokens.len() - 1 {
            self.idx += 1;
        }
    }

    fn backup(&mut self) {
        if self.idx > 0 {
            self.idx -= 1;
        }
    }

    fn peek(&self) -> Token {
        self.tokens.get(self.idx + 1).cloned().unwrap_or(Token::Eof)
    }

    fn parse_pattern(&mut self) -> Result<Node, PatternError> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut line_count_found = false;

        loop {
            match self.current() {
                Token::Eof => break,
                Token::Literal(text) => {
                    nodes.push(Node::Literal(text));
                    self.next();
                }
                Token::OptionalLeft => {
                    let optional = self.parse_optional()?;
                    nodes.push(optional);
                    self.next();
                }
                Token::CharCount(_) => {
                    let group = self.parse_char_group();
                    nodes.push(group);
                    self.next();
                }
                Token::LineCount(_) => {
                    // A line count after ordinary nodes puts those nodes on
                    // an implicit first line.
                    if !line_count_found && !nodes.is_empty() {
                        nodes = vec![Node::LineCount {
                            lines: 1,
                            node: Box::new(Node::Pattern(nodes)),
                        }];
                    }
                    let line_count = self.parse_line_count()?;
                    nodes.push(line_count);
                    line_count_found = true;
                    self.next();
                }
                Token::Or => {
                    let or = self.parse_or(Node::Pattern(std::mem::take(&mut nodes)))?;
                    nodes = vec![or];
                    self.next();
                }
                token => return Err(PatternError::UnexpectedToken(token_text(&token))),
            }
        }

        Ok(Node::Pattern(nodes))
    }

    fn parse_optional(&mut self) -> Result<Node, PatternError> {
        let mut wrapped: Vec<Node> = Vec::new();
        let mut left_meta_found = false;
        let mut line_count_found = false;

        loop {
            match self.current() {
                Token::Eof => return Err(PatternError::UnclosedOptional),
                Token::OptionalLeft => {
                    if left_meta_found {
                        let optional = self.parse_optional()?;
                        wrapped.push(optional);
                    } else {
                        left_meta_found = true;
                    }
                    self.next();
                }
                // The closing `)` stays current; the caller advances past it.
                Token::OptionalRight => {
                    return Ok(Node::Optional(Box::new(Node::Pattern(wrapped))));
                }
                Token::Literal(text) => {
                    wrapped.push(Node::Literal(text));
                    self.next();
                }
                Token::CharCount(_) => {
                    let group = self.parse_char_group();
                    wrapped.push(group);
                    self.next();
                }
                Token::LineCount(_) => {
                    if !line_count_found && !wrapped.is_empty() {
                        wrapped = vec![Node::LineCount {
                            lines: 1,
                            node: Box::new(Node::Pattern(wrapped)),
                        }];
                    }
                    let line_count = self.parse_line_count()?;
                    wrapped.push(line_count);
                    line_count_found = true;
                    self.next();
                }
                Token::Or => {
                    let or = self.parse_or(Node::Pattern(std::mem::take(&mut wrapped)))?;
                    wrapped = vec![or];
                    self.next();
                }
                token => return Err(PatternError::UnexpectedToken(token_text(&token))),
            }
        }
    }

    /// Collect one char group. The lexer guarantees the count is followed by
    /// an optional strict marker and a class key, so this cannot fail; the
    /// class-key token stays current for the caller to advance past.
    fn parse_char_group(&mut self) -> Node {
        let mut count = 0usize;
        let mut strict = false;
        let mut class_key = '\0';

        loop {
            match self.current() {
                Token::CharCount(n) => {
                    count = n;
                    self.next();
                }
                Token::CharCountStrictMeta => {
                    strict = true;
                    self.next();
                }
                Token::CharSet(key) => {
                    class_key = key;
                    break;
                }
                _ => break,
            }
        }

        Node::CharGroup {
            count,
            strict,
            class_key,
        }
    }

    fn parse_or(&mut self, left: Node) -> Result<Node, PatternError> {
        let mut right_nodes: Vec<Node> = Vec::new();
        let mut own_token_found = false;

        loop {
            match self.current() {
                // A closing `)` or the end of input ends the right side; the
                // `)` is handed back for the enclosing optional to see.
                Token::OptionalRight => {
                    self.backup();
                    return Ok(Node::Or {
                        left: Box::new(left),
                        right: Box::new(Node::Pattern(right_nodes)),
                    });
                }
                Token::Eof => {
                    return Ok(Node::Or {
                        left: Box::new(left),
                        right: Box::new(Node::Pattern(right_nodes)),
                    });
                }
                Token::Or => {
                    if own_token_found {
                        // A second `|`: everything collected so far becomes
                        // the left side of a nested alternative.
                        let or =
                            self.parse_or(Node::Pattern(std::mem::take(&mut right_nodes)))?;
                        return Ok(Node::Or {
                            left: Box::new(left),
                            right: Box::new(or),
                        });
                    }
                    own_token_found = true;
                    self.next();
                }
                Token::LineCount(_) => {
                    if right_nodes.is_empty() {
                        // The alternative's right side is itself a line-count
                        // expression.
                        let line_count = self.parse_line_count()?;
                        return Ok(Node::Or {
                            left: Box::new(left),
                            right: Box::new(line_count),
                        });
                    }
                    // A line count after collected nodes closes this
                    // alternative; the line count is re-read by the caller.
                    self.backup();
                    return Ok(Node::Or {
                        left: Box::new(left),
                        right: Box::new(Node::Pattern(right_nodes)),
                    });
                }
                Token::Literal(text) => {
                    right_nodes.push(Node::Literal(text));
                    self.next();
                }
                Token::OptionalLeft => {
                    let optional = self.parse_optional()?;
                    right_nodes.push(optional);
                    self.next();
                }
                Token::CharCount(_) => {
                    let group = self.parse_char_group();
                    right_nodes.push(group);
                    self.next();
                }
                token => return Err(PatternError::UnexpectedToken(token_text(&token))),
            }
        }
    }

    fn parse_line_count(&mut self) -> Result<Node, PatternError> {
        let mut lines = 0usize;
        let mut count_set = false;
        let mut meta_found = false;
        let mut wrapped: Vec<Node> = Vec::new();

        loop {
            match self.current() {
                Token::Eof => {
                    return Ok(Node::LineCount {
                        lines,
                        node: Box::new(Node::Pattern(wrapped)),
                    });
                }
                Token::LineCount(n) => {
                    if count_set {
                        // A new line count starts; finish this one and let
                        // the caller re-read the count.
                        self.backup();
                        return Ok(Node::LineCount {
                            lines,
                            node: Box::new(Node::Pattern(wrapped)),
                        });
                    }
                    lines = n;
                    count_set = true;
                    self.next();
                }
                Token::LineCountMeta => {
                    if meta_found {
                        return Err(PatternError::UnexpectedToken("*".into()));
                    }
                    meta_found = true;
                    self.next();
                }
                Token::OptionalLeft => {
                    let optional = self.parse_optional()?;
                    wrapped.push(optional);
                    self.next();
                }
                Token::CharCount(_) => {
                    let group = self.parse_char_group();
                    wrapped.push(group);
                    self.next();
                }
                Token::Or => {
                    if matches!(self.peek(), Token::LineCount(_)) {
                        // `n*…|m*…` — this line-count expression becomes the
                        // left side of the alternative.
                        let node = Node::LineCount {
                            lines,
                            node: Box::new(Node::Pattern(std::mem::take(&mut wrapped))),
                        };
                        return self.parse_or(node);
                    }
                    let or = self.parse_or(Node::Pattern(std::mem::take(&mut wrapped)))?;
                    wrapped = vec![or];
                    self.next();
                }
                Token::OptionalRight => {
                    self.backup();
                    return Ok(Node::LineCount {
                        lines,
                        node: Box::new(Node::Pattern(wrapped)),
                    });
                }
                token => return Err(PatternError::UnexpectedToken(token_text(&token))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::lex;
    use super::*;

    fn parse_src(src: &str) -> Result<Node, PatternError> {
        parse(lex(src))
    }

    #[test]
    fn sequence_of_groups() {
        let node = parse_src("1!a6!n").expect("parses");
        assert_eq!(
            node,
            Node::Pattern(vec![
                Node::CharGroup {
                    count: 1,
                    strict: true,
                    class_key: 'a'
                },
                Node::CharGroup {
                    count: 6,
                    strict: true,
                    class_key: 'n'
                },
            ])
        );
    }

    #[test]
    fn optional_wraps_sequence() {
        let node = parse_src("(/3!n)").expect("parses");
        assert_eq!(
            node,
            Node::Pattern(vec![Node::Optional(Box::new(Node::Pattern(vec![
                Node::Literal("/".into()),
                Node::CharGroup {
                    count: 3,
                    strict: true,
                    class_key: 'n'
                },
            ])))])
        );
    }

    #[test]
    fn or_takes_preceding_pattern_as_left() {
        let node = parse_src("2!c|8!c").expect("parses");
        match node {
            Node::Pattern(nodes) => match nodes.as_slice() {
                [Node::Or { left, right }] => {
                    assert_eq!(
                        **left,
                        Node::Pattern(vec![Node::CharGroup {
                            count: 2,
                            strict: true,
                            class_key: 'c'
                        }])
                    );
                    assert_eq!(
                        **right,
                        Node::Pattern(vec![Node::CharGroup {
                            count: 8,
                            strict: true,
                            class_key: 'c'
                        }])
                    );
                }
                other => panic!("expected a single Or node, got {other:?}"),
            },
            other => panic!("expected pattern, got {other:?}"),
        }
    }

    #[test]
    fn line_count_after_nodes_wraps_them_in_implicit_first_line() {
        let node = parse_src("4!n2*3!a").expect("parses");
        match node {
            Node::Pattern(nodes) => {
                assert_eq!(nodes.len(), 2, "implicit wrap plus explicit line count");
                assert!(matches!(nodes[0], Node::LineCount { lines: 1, .. }));
                assert!(matches!(nodes[1], Node::LineCount { lines: 2, .. }));
            }
            other => panic!("expected pattern, got {other:?}"),
        }
    }

    #[test]
    fn or_between_line_counts_promotes_left_line_count() {
        let node = parse_src("2*1!a|2*1!n").expect("parses");
        match node {
            Node::Pattern(nodes) => match nodes.as_slice() {
                [Node::Or { left, right }] => {
                    assert!(matches!(**left, Node::LineCount { lines: 2, .. }));
                    assert!(matches!(**right, Node::LineCount { lines: 2, .. }));
                }
                other => panic!("expected a single Or node, got {other:?}"),
            },
            other => panic!("expected pattern, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_optional_is_an_error() {
        for src in ["(/", "(/(/)", "(/(/", "1!a|(", "2*(1!a", "2*1!a|(", "2*1!a|2*("] {
            assert_eq!(
                parse_src(src),
                Err(PatternError::UnclosedOptional),
                "pattern {src:?}"
            );
        }
    }

    #[test]
    fn doubled_star_is_unexpected() {
        for src in ["2**1!z", "(2**1!a)", "1!a|1!n|2**1!x", "(1!n|2**1!a)"] {
            assert_eq!(
                parse_src(src),
                Err(PatternError::UnexpectedToken("*".into())),
                "pattern {src:?}"
            );
        }
    }

    #[test]
    fn bare_star_is_unexpected() {
        assert_eq!(
            parse_src("*1!a"),
            Err(PatternError::UnexpectedToken("*".into()))
        );
    }

    #[test]
    fn nested_optionals_parse() {
        assert!(parse_src("(1!a2*1!a)").is_ok());
        assert!(parse_src("(1!a|1!n)").is_ok());
        assert!(parse_src("//((/)/)").is_ok());
    }

    #[test]
    fn unknown_class_key_parses() {
        assert!(parse_src("1!z").is_ok());
    }
}
