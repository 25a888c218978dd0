//! Lexical analysis for directive strings

use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Identifier(String),
    Number(i64),
    Boolean(bool),
    Str(String),

    // Operators
    Equals, // =
    Comma,  // ,

    /// Raw inner text of a `{SOURCE:key}` reference, braces stripped
    Placeholder(String),
    /// Raw `{...}` text of a JSON literal, braces included
    JsonBlob(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub column: usize,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(id) => write!(f, "identifier({})", id),
            TokenKind::Number(n) => write!(f, "number({})", n),
            TokenKind::Boolean(b) => write!(f, "boolean({})", b),
            TokenKind::Str(s) => write!(f, "string(\"{}\")", s),
            TokenKind::Equals => write!(f, "="),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Placeholder(p) => write!(f, "placeholder({{{}}})", p),
            TokenKind::JsonBlob(_) => write!(f, "json-blob"),
        }
    }
}

/// Deliberately lenient single-pass scanner. There is no lexical error
/// kind: characters that fit no token are silently skipped, and rejection
/// of bad input belongs to the validation stage, which reports data
/// instead of raising.
pub struct Lexer {
    input: Vec<char>,
    position: usize,

    // Distinguishes `{GET:q}` from a JSON literal after the balanced scan
    placeholder_regex: Regex,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            placeholder_regex: Regex::new(r"^\s*(GET|POST|ENV|SESSION|COOKIE)\s*(:|$)").unwrap(),
        }
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }

            let column = self.position + 1;
            let ch = self.advance();

            let kind = match ch {
                '=' => Some(TokenKind::Equals),
                ',' => Some(TokenKind::Comma),
                '\'' | '"' => Some(TokenKind::Str(self.read_string(ch))),
                '{' => Some(self.read_braced()),
                ch if ch.is_ascii_digit() => Some(self.read_number(ch)),
                '-' if self.peek().map_or(false, |c| c.is_ascii_digit()) => {
                    Some(self.read_number(ch))
                }
                ch if ch.is_alphabetic() || ch == '_' => {
                    let word = self.read_identifier(ch);
                    Some(self.identify_word(word))
                }
                // Lenient: anything unrecognized is dropped
                _ => None,
            };

            if let Some(kind) = kind {
                tokens.push(Token { kind, column });
            }
        }

        tokens
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.advance();
        }
    }

    fn advance(&mut self) -> char {
        if self.position < self.input.len() {
            let ch = self.input[self.position];
            self.position += 1;
            ch
        } else {
            '\0'
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Read until the matching unescaped quote. An unterminated string
    /// swallows the rest of the input rather than erroring.
    fn read_string(&mut self, quote: char) -> String {
        let mut value = String::new();
        let mut escaped = false;

        while let Some(ch) = self.peek() {
            if escaped {
                match ch {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    _ => value.push(ch),
                }
                escaped = false;
                self.advance();
            } else if ch == '\\' {
                escaped = true;
                self.advance();
            } else if ch == quote {
                self.advance();
                break;
            } else {
                value.push(ch);
                self.advance();
            }
        }

        value
    }

    /// Brace-depth-balanced scan from an already-consumed `{`. Returns the
    /// inner text; the closing brace is consumed. Runs to end of input if
    /// the braces never balance.
    fn read_balanced(&mut self) -> String {
        let mut inner = String::new();
        let mut depth = 1;

        while let Some(ch) = self.peek() {
            self.advance();
            match ch {
                '{' => {
                    depth += 1;
                    inner.push(ch);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    inner.push(ch);
                }
                _ => inner.push(ch),
            }
        }

        inner
    }

    fn read_braced(&mut self) -> TokenKind {
        let inner = self.read_balanced();
        if self.placeholder_regex.is_match(&inner) {
            TokenKind::Placeholder(inner.trim().to_string())
        } else {
            TokenKind::JsonBlob(format!("{{{}}}", inner))
        }
    }

    fn read_number(&mut self, first: char) -> TokenKind {
        let mut text = String::new();
        text.push(first);

        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            text.push(self.advance());
        }

        // Overflowing literals collapse to 0; the lexer has no error channel
        TokenKind::Number(text.parse().unwrap_or(0))
    }

    fn read_identifier(&mut self, first: char) -> String {
        let mut word = String::new();
        word.push(first);

        while self
            .peek()
            .map_or(false, |c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            word.push(self.advance());
        }

        word
    }

    fn identify_word(&self, word: String) -> TokenKind {
        match word.to_ascii_lowercase().as_str() {
            "true" | "yes" => TokenKind::Boolean(true),
            "false" | "no" => TokenKind::Boolean(false),
            _ => TokenKind::Identifier(word),
        }
    }
}
