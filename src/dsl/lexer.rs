//! Lexer (tokenizer) for the schematic DSL.

use crate::error::{LabError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A component name, net name or keyword
    Identifier,
    /// A number, possibly with SI prefix and unit (`4.7k`, `9V`, `20mA`)
    Number,
    /// A directive (starts with '.')
    Directive,
    /// Equals sign '='
    Equals,
    Newline,
    Eof,
}

/// Lexer for tokenizing schematic DSL input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let (line, column) = (self.line, self.column);
        let make = |kind, text: String| Token {
            kind,
            text,
            line,
            column,
        };

        let ch = match self.chars.peek().copied() {
            Some(ch) => ch,
            None => return Ok(make(TokenKind::Eof, String::new())),
        };

        let token = match ch {
            '\n' => {
                self.advance();
                make(TokenKind::Newline, "\n".to_string())
            }
            '=' => {
                self.advance();
                make(TokenKind::Equals, "=".to_string())
            }
            '.' => {
                self.advance();
                let name = self.read_word();
                if name.is_empty() {
                    return Err(LabError::lexer(line, column, "directive name expected after '.'"));
                }
                make(TokenKind::Directive, format!(".{}", name))
            }
            '-' | '+' | '0'..='9' => make(TokenKind::Number, self.read_number()),
            _ if ch.is_alphabetic() || ch == '_' => make(TokenKind::Identifier, self.read_word()),
            _ => {
                return Err(LabError::lexer(
                    line,
                    column,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        Ok(token)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '#' || ch == ';' {
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_while(&mut self, text: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(&ch) = self.chars.peek() {
            if !pred(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
    }

    fn read_word(&mut self) -> String {
        let mut text = String::new();
        self.read_while(&mut text, |c| c.is_alphanumeric() || c == '_');
        text
    }

    fn read_number(&mut self) -> String {
        let mut text = String::new();

        if let Some(&sign @ ('-' | '+')) = self.chars.peek() {
            text.push(sign);
            self.advance();
        }
        self.read_while(&mut text, |c| c.is_ascii_digit());

        if let Some(&'.') = self.chars.peek() {
            text.push('.');
            self.advance();
            self.read_while(&mut text, |c| c.is_ascii_digit());
        }

        // Exponent, only when a digit or sign follows the 'e'
        if let Some(&e @ ('e' | 'E')) = self.chars.peek() {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some(c) if c.is_ascii_digit() || *c == '-' || *c == '+') {
                text.push(e);
                self.advance();
                if let Some(&sign @ ('-' | '+')) = self.chars.peek() {
                    text.push(sign);
                    self.advance();
                }
                self.read_while(&mut text, |c| c.is_ascii_digit());
            }
        }

        // SI prefix, unit, or the rest of a numeric net name like "1a"
        self.read_while(&mut text, |c| c.is_alphanumeric() || c == '_');
        text
    }
}

/// Unit spellings accepted after a number, longest first.
const UNITS: &[&str] = &["ohms", "ohm", "Ω", "V", "A", "W"];

/// Parse a number with optional SI prefix and unit (`4.7k`, `9V`, `20mA`).
pub fn parse_value(text: &str) -> Option<f64> {
    let mut text = text.trim();
    if text.is_empty() {
        return None;
    }

    for unit in UNITS {
        if let Some(stripped) = text.strip_suffix(unit) {
            if !stripped.is_empty() {
                text = stripped;
                break;
            }
        }
    }

    let last = text.chars().last()?;
    let multiplier = match last {
        'p' => 1e-12,
        'n' => 1e-9,
        'u' | 'µ' => 1e-6,
        'm' => 1e-3,
        'k' | 'K' => 1e3,
        'M' => 1e6,
        'G' => 1e9,
        _ => 1.0,
    };
    let digits = if multiplier != 1.0 {
        &text[..text.len() - last.len_utf8()]
    } else {
        text
    };

    digits.parse::<f64>().ok().map(|v| v * multiplier)
}
