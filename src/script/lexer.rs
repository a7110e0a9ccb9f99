//! CashAssembly tokenizer.
//!
//! Rules:
//! - `//` starts a line comment, `/* ... */` is a block comment
//! - `<` `>` delimit pushes, `(` `)` delimit operation arguments
//! - `'...'` and `"..."` are string literals and may not span lines
//! - commas are ignored
//! - everything else is a whitespace-separated word
//!
//! Malformed input never stops the scan: it becomes an error token and
//! tokenizing resumes right after it.

use crate::script::errors::AsmError;

/// Position of a token in its source, 1-based, measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pos {
    pub line: usize,
    pub column: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// Opcode, identifier, or number/hex literal.
    Word(&'a str),
    /// String literal contents, without quotes.
    Str(&'a str),
    PushOpen,
    PushClose,
    ArgsOpen,
    ArgsClose,
    Error(AsmError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub pos: Pos,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-')
}

struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of the next character.
    offset: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.offset..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind<'a>, line: usize, column: usize, len: usize) {
        self.tokens.push(Token {
            kind,
            pos: Pos { line, column, len },
        });
    }

    fn run(mut self) -> Vec<Token<'a>> {
        while let Some(c) = self.peek() {
            let (line, column) = (self.line, self.column);
            match c {
                c if c.is_whitespace() || c == ',' => {
                    self.bump();
                }
                '/' if self.peek_second() == Some('/') => self.skip_line_comment(),
                '/' if self.peek_second() == Some('*') => self.skip_block_comment(),
                '<' | '>' | '(' | ')' => {
                    self.bump();
                    let kind = match c {
                        '<' => TokenKind::PushOpen,
                        '>' => TokenKind::PushClose,
                        '(' => TokenKind::ArgsOpen,
                        _ => TokenKind::ArgsClose,
                    };
                    self.push(kind, line, column, 1);
                }
                '\'' | '"' => self.string(c),
                c if is_word_char(c) => self.word(),
                other => {
                    self.bump();
                    self.push(
                        TokenKind::Error(AsmError::UnexpectedCharacter(other)),
                        line,
                        column,
                        1,
                    );
                }
            }
        }
        self.tokens
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) {
        let (line, column) = (self.line, self.column);
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return;
                }
                Some(_) => {}
                None => {
                    self.push(
                        TokenKind::Error(AsmError::UnterminatedComment),
                        line,
                        column,
                        2,
                    );
                    return;
                }
            }
        }
    }

    fn string(&mut self, quote: char) {
        let (line, column) = (self.line, self.column);
        self.bump();
        let start = self.offset;
        let mut len = 1;
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    let text = &self.source[start..self.offset];
                    self.bump();
                    self.push(TokenKind::Str(text), line, column, len + 1);
                    return;
                }
                Some('\n') | None => {
                    self.push(
                        TokenKind::Error(AsmError::UnterminatedString { quote }),
                        line,
                        column,
                        len,
                    );
                    return;
                }
                Some(_) => {
                    self.bump();
                    len += 1;
                }
            }
        }
    }

    fn word(&mut self) {
        let (line, column) = (self.line, self.column);
        let start = self.offset;
        let mut len = 0;
        while let Some(c) = self.peek() {
            if !is_word_char(c) {
                break;
            }
            self.bump();
            len += 1;
        }
        let text = &self.source[start..self.offset];
        self.push(TokenKind::Word(text), line, column, len);
    }
}

/// Tokenizes a whole CashAssembly source.
pub(crate) fn tokenize(source: &str) -> Vec<Token<'_>> {
    Lexer {
        source,
        offset: 0,
        line: 1,
        column: 1,
        tokens: Vec::new(),
    }
    .run()
}
