//! CashAssembly parser.
//!
//! Turns the token stream into a tree of [`Node`]s. Pushes (`<...>`) and
//! operation arguments (`name(...)`) nest; everything else is flat. Parse
//! errors are kept in the tree as [`NodeKind::Error`] so that diagnostics
//! come out in source order once the tree is walked.

use crate::script::errors::AsmError;
use crate::script::lexer::{Pos, Token, TokenKind, tokenize};
use crate::utils::hex;

/// Deepest allowed nesting of pushes and argument lists.
pub(crate) const MAX_NESTING: usize = 256;

const HEX_PREFIX: &str = "0x";
const OPCODE_PREFIX: &str = "OP_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// `OP_...` mnemonic, resolved during assembly.
    Opcode(String),
    /// `0x...` literal, emitted verbatim.
    Hex(Vec<u8>),
    /// Decimal literal, emitted as a script number.
    Number(i64),
    /// String literal, emitted as UTF-8.
    Str(String),
    /// Reference to a data parameter, script, or operation.
    Identifier(String),
    /// `<...>`: contents compiled then pushed.
    Push(Vec<Node>),
    /// `name(...)`: one node per argument.
    Invoke { name: String, args: Vec<Node> },
    Error(AsmError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub pos: Pos,
}

impl Node {
    fn error(error: AsmError, pos: Pos) -> Self {
        Self {
            kind: NodeKind::Error(error),
            pos,
        }
    }
}

/// What closes the sequence currently being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    Push,
    Args,
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    index: usize,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.index).cloned()?;
        self.index += 1;
        Some(token)
    }

    fn peek_kind(&self) -> Option<&TokenKind<'a>> {
        self.tokens.get(self.index).map(|t| &t.kind)
    }

    /// Parses until `closer` (or end of input). Returns the nodes and the
    /// closing token's position, if one was found.
    fn sequence(&mut self, closer: Option<Closer>, depth: usize) -> (Vec<Node>, Option<Pos>) {
        let mut nodes = Vec::new();

        while let Some(token) = self.next() {
            let pos = token.pos;
            match token.kind {
                TokenKind::Word(text) => {
                    let node = classify_word(text, pos);
                    if matches!(node.kind, NodeKind::Identifier(_))
                        && self.peek_kind() == Some(&TokenKind::ArgsOpen)
                    {
                        self.index += 1;
                        self.invocation(text, pos, depth, &mut nodes);
                    } else {
                        nodes.push(node);
                    }
                }
                TokenKind::Str(text) => nodes.push(Node {
                    kind: NodeKind::Str(text.to_string()),
                    pos,
                }),
                TokenKind::PushOpen => self.push(pos, depth, &mut nodes),
                TokenKind::ArgsOpen => {
                    // Report once, then parse the contents so their own
                    // diagnostics are not lost.
                    nodes.push(Node::error(AsmError::UnexpectedArgumentsOpen, pos));
                    if depth >= MAX_NESTING {
                        self.skip_nested();
                    } else {
                        let (inner, _) = self.sequence(Some(Closer::Args), depth + 1);
                        nodes.extend(inner);
                    }
                }
                TokenKind::PushClose if closer == Some(Closer::Push) => {
                    return (nodes, Some(pos));
                }
                TokenKind::ArgsClose if closer == Some(Closer::Args) => {
                    return (nodes, Some(pos));
                }
                TokenKind::PushClose => {
                    nodes.push(Node::error(AsmError::UnexpectedPushClose, pos));
                }
                TokenKind::ArgsClose => {
                    nodes.push(Node::error(AsmError::UnexpectedArgumentsClose, pos));
                }
                TokenKind::Error(error) => nodes.push(Node::error(error, pos)),
            }
        }

        (nodes, None)
    }

    fn push(&mut self, open: Pos, depth: usize, nodes: &mut Vec<Node>) {
        if depth >= MAX_NESTING {
            nodes.push(Node::error(
                AsmError::NestingTooDeep { limit: MAX_NESTING },
                open,
            ));
            self.skip_nested();
            return;
        }

        let (body, close) = self.sequence(Some(Closer::Push), depth + 1);
        match close {
            Some(close) => nodes.push(Node {
                kind: NodeKind::Push(body),
                pos: span_between(open, close),
            }),
            None => {
                nodes.push(Node::error(AsmError::UnterminatedPush, open));
                nodes.extend(body);
            }
        }
    }

    fn invocation(&mut self, name: &str, pos: Pos, depth: usize, nodes: &mut Vec<Node>) {
        if depth >= MAX_NESTING {
            nodes.push(Node::error(
                AsmError::NestingTooDeep { limit: MAX_NESTING },
                pos,
            ));
            self.skip_nested();
            return;
        }

        let (args, close) = self.sequence(Some(Closer::Args), depth + 1);
        match close {
            Some(close) => nodes.push(Node {
                kind: NodeKind::Invoke {
                    name: name.to_string(),
                    args,
                },
                pos: span_between(pos, close),
            }),
            None => {
                nodes.push(Node::error(
                    AsmError::UnterminatedArguments {
                        name: name.to_string(),
                    },
                    pos,
                ));
                nodes.extend(args);
            }
        }
    }

    /// Skips tokens up to the closer matching an already consumed opener.
    fn skip_nested(&mut self) {
        let mut open = 1usize;
        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::PushOpen | TokenKind::ArgsOpen => open += 1,
                TokenKind::PushClose | TokenKind::ArgsClose => {
                    open -= 1;
                    if open == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Widens `start` to end at `end` when both are on the same line.
fn span_between(start: Pos, end: Pos) -> Pos {
    if start.line == end.line && end.column >= start.column {
        Pos {
            len: end.column + end.len - start.column,
            ..start
        }
    } else {
        start
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Classifies a word as a literal, opcode, or identifier.
fn classify_word(text: &str, pos: Pos) -> Node {
    let kind = if let Some(digits) = text.strip_prefix(HEX_PREFIX) {
        match hex::decode(digits) {
            Ok(bytes) => NodeKind::Hex(bytes),
            Err(reason) => NodeKind::Error(AsmError::MalformedHex {
                literal: text.to_string(),
                reason,
            }),
        }
    } else if text.starts_with(|c: char| c.is_ascii_digit())
        || (text.starts_with('-') && text[1..].starts_with(|c: char| c.is_ascii_digit()))
    {
        match text.parse::<i64>() {
            Ok(value) => NodeKind::Number(value),
            Err(_) => NodeKind::Error(AsmError::MalformedNumber(text.to_string())),
        }
    } else if text.starts_with(OPCODE_PREFIX) {
        NodeKind::Opcode(text.to_string())
    } else if is_identifier(text) {
        NodeKind::Identifier(text.to_string())
    } else {
        NodeKind::Error(AsmError::InvalidIdentifier(text.to_string()))
    };
    Node { kind, pos }
}

/// Parses a whole CashAssembly source into a node tree.
pub(crate) fn parse(source: &str) -> Vec<Node> {
    let mut parser = Parser {
        tokens: tokenize(source),
        index: 0,
    };
    parser.sequence(None, 0).0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<NodeKind> {
        parse(source).into_iter().map(|n| n.kind).collect()
    }

    #[test]
    fn literals_and_opcodes() {
        assert_eq!(
            kinds("OP_DUP 0xabcd -5 'hi' owner"),
            vec![
                NodeKind::Opcode("OP_DUP".to_string()),
                NodeKind::Hex(vec![0xab, 0xcd]),
                NodeKind::Number(-5),
                NodeKind::Str("hi".to_string()),
                NodeKind::Identifier("owner".to_string()),
            ]
        );
    }

    #[test]
    fn nested_push() {
        assert_eq!(
            kinds("<OP_1 <0x02>>"),
            vec![NodeKind::Push(vec![
                Node {
                    kind: NodeKind::Opcode("OP_1".to_string()),
                    pos: Pos {
                        line: 1,
                        column: 2,
                        len: 4
                    },
                },
                Node {
                    kind: NodeKind::Push(vec![Node {
                        kind: NodeKind::Hex(vec![0x02]),
                        pos: Pos {
                            line: 1,
                            column: 8,
                            len: 4
                        },
                    }]),
                    pos: Pos {
                        line: 1,
                        column: 7,
                        len: 6
                    },
                },
            ])]
        );
    }

    #[test]
    fn push_span_covers_brackets() {
        let nodes = parse("OP_1 <0xabcd>");
        assert_eq!(
            nodes[1].pos,
            Pos {
                line: 1,
                column: 6,
                len: 8
            }
        );
    }

    #[test]
    fn invocation_with_arguments() {
        match &kinds("sig(key <1>)")[0] {
            NodeKind::Invoke { name, args } => {
                assert_eq!(name, "sig");
                assert_eq!(args.len(), 2);
                assert_eq!(args[0].kind, NodeKind::Identifier("key".to_string()));
                assert!(matches!(args[1].kind, NodeKind::Push(_)));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn malformed_literals() {
        assert!(matches!(
            &kinds("0xabc")[0],
            NodeKind::Error(AsmError::MalformedHex { .. })
        ));
        assert!(matches!(
            &kinds("0xzz")[0],
            NodeKind::Error(AsmError::MalformedHex { .. })
        ));
        assert_eq!(
            kinds("12ab 99999999999999999999"),
            vec![
                NodeKind::Error(AsmError::MalformedNumber("12ab".to_string())),
                NodeKind::Error(AsmError::MalformedNumber(
                    "99999999999999999999".to_string()
                )),
            ]
        );
        assert_eq!(
            kinds("a-b -x"),
            vec![
                NodeKind::Error(AsmError::InvalidIdentifier("a-b".to_string())),
                NodeKind::Error(AsmError::InvalidIdentifier("-x".to_string())),
            ]
        );
    }

    #[test]
    fn unbalanced_delimiters() {
        assert_eq!(
            kinds("OP_1 >"),
            vec![
                NodeKind::Opcode("OP_1".to_string()),
                NodeKind::Error(AsmError::UnexpectedPushClose),
            ]
        );
        assert_eq!(
            kinds("<0x01 missing"),
            vec![
                NodeKind::Error(AsmError::UnterminatedPush),
                NodeKind::Hex(vec![0x01]),
                NodeKind::Identifier("missing".to_string()),
            ]
        );
        assert_eq!(
            kinds("op(1"),
            vec![
                NodeKind::Error(AsmError::UnterminatedArguments {
                    name: "op".to_string()
                }),
                NodeKind::Number(1),
            ]
        );
        assert_eq!(
            kinds(")"),
            vec![NodeKind::Error(AsmError::UnexpectedArgumentsClose)]
        );
        assert_eq!(
            kinds("(OP_1)"),
            vec![
                NodeKind::Error(AsmError::UnexpectedArgumentsOpen),
                NodeKind::Opcode("OP_1".to_string()),
            ]
        );
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let depth = MAX_NESTING + 10;
        let source = format!("{}0x01{}", "<".repeat(depth), ">".repeat(depth));
        let nodes = parse(&source);
        assert_eq!(nodes.len(), 1);

        let mut node = &nodes[0];
        let mut levels = 0;
        while let NodeKind::Push(body) = &node.kind {
            levels += 1;
            node = &body[0];
        }
        assert_eq!(levels, MAX_NESTING);
        assert_eq!(
            node.kind,
            NodeKind::Error(AsmError::NestingTooDeep { limit: MAX_NESTING })
        );
    }
}
