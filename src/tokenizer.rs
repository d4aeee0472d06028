//! One-pass tokenizer (`spec.md` §4.2).
//!
//! Grounded on `json_tok.rs`'s `Tok { kind, start, end }` shape — byte-offset
//! spans into the caller's buffer rather than borrowed `&str` slices, so the
//! token vector never ties down a lifetime of its own. Unlike `json_tok.rs`
//! this tokenizer is not resumable across `push()` calls: `spec.md` rules
//! streaming input out of scope, so it runs once over the whole buffer.

use crate::error::TokenizeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Sof,
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Colon,
    Comma,
    String,
    Number,
    Boolean,
    Null,
    Eof,
    /// Present for parity with `spec.md`'s token-kind set. This tokenizer
    /// never constructs it: a lexical fault is reported as an `Err` instead
    /// of an in-band error token.
    #[allow(dead_code)]
    Error,
}

/// A lexeme: `kind` plus a byte-offset span `[start, end)` into the source
/// the caller passed to [`tokenize`]. For `String` the span excludes the
/// surrounding quotes; for everything else it is the literal lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: Kind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    fn new(kind: Kind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}

struct Scan<'s> {
    bytes: &'s [u8],
    pos: usize,
}

impl<'s> Scan<'s> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn scan_string(&mut self) -> Result<Token, TokenizeError> {
        let quote_at = self.pos;
        self.pos += 1; // consume opening quote
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(TokenizeError::UnterminatedString { at: quote_at }),
                Some(b'\\') => {
                    self.pos += 1;
                    // A backslash-escaped byte never closes the string,
                    // including an escaped backslash followed by a quote.
                    if self.peek().is_some() {
                        self.pos += 1;
                    }
                }
                Some(b'"') => {
                    let end = self.pos;
                    self.pos += 1; // consume closing quote
                    return Ok(Token::new(Kind::String, start, end));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')
        ) {
            self.pos += 1;
        }
        Token::new(Kind::Number, start, self.pos)
    }

    fn scan_literal(&mut self, literal: &str, kind: Kind) -> Option<Token> {
        let start = self.pos;
        let end = start + literal.len();
        if self.bytes.get(start..end) == Some(literal.as_bytes()) {
            self.pos = end;
            Some(Token::new(kind, start, end))
        } else {
            None
        }
    }
}

/// Tokenize `source` in one pass, producing a vector beginning with `Sof`
/// and ending with `Eof`. Whitespace between tokens carries no semantics.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizeError> {
    let bytes = source.as_bytes();
    let mut scan = Scan { bytes, pos: 0 };
    let mut tokens = Vec::with_capacity(bytes.len() / 4 + 2);
    tokens.push(Token::new(Kind::Sof, 0, 0));

    loop {
        scan.skip_whitespace();
        let at = scan.pos;
        let Some(byte) = scan.peek() else {
            tokens.push(Token::new(Kind::Eof, at, at));
            return Ok(tokens);
        };

        let token = match byte {
            b'{' => {
                scan.pos += 1;
                Token::new(Kind::ObjectStart, at, at + 1)
            }
            b'}' => {
                scan.pos += 1;
                Token::new(Kind::ObjectEnd, at, at + 1)
            }
            b'[' => {
                scan.pos += 1;
                Token::new(Kind::ArrayStart, at, at + 1)
            }
            b']' => {
                scan.pos += 1;
                Token::new(Kind::ArrayEnd, at, at + 1)
            }
            b':' => {
                scan.pos += 1;
                Token::new(Kind::Colon, at, at + 1)
            }
            b',' => {
                scan.pos += 1;
                Token::new(Kind::Comma, at, at + 1)
            }
            b'"' => scan.scan_string()?,
            b'0'..=b'9' | b'-' | b'.' => scan.scan_number(),
            b'n' => scan
                .scan_literal("null", Kind::Null)
                .ok_or(TokenizeError::UnexpectedCharacter { byte, at })?,
            b't' | b'f' => {
                let (literal, kind) = if byte == b't' {
                    ("true", Kind::Boolean)
                } else {
                    ("false", Kind::Boolean)
                };
                scan.scan_literal(literal, kind)
                    .ok_or(TokenizeError::UnexpectedCharacter { byte, at })?
            }
            _ => return Err(TokenizeError::UnexpectedCharacter { byte, at }),
        };
        tokens.push(token);
    }
}
