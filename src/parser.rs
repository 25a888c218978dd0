//! Parser: token stream to raw attribute map

use crate::lexer::{Token, TokenKind};
use crate::types::{Placeholder, PlaceholderSource, Value};
use std::collections::HashMap;

/// Raw AST of one directive: the attribute map plus any syntax errors,
/// recorded as data. A broken attribute is abandoned and parsing resumes
/// at the next token, so one typo never loses the rest of the directive.
#[derive(Debug, Clone, Default)]
pub struct ParsedDirective {
    pub attributes: HashMap<String, Value>,
    pub errors: Vec<String>,
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> ParsedDirective {
        let mut directive = ParsedDirective::default();

        while !self.is_at_end() {
            self.parse_attribute(&mut directive);
        }

        directive
    }

    fn parse_attribute(&mut self, directive: &mut ParsedDirective) {
        let name = match self.advance().kind.clone() {
            TokenKind::Identifier(name) => name,
            TokenKind::Comma => return, // stray separator
            other => {
                directive
                    .errors
                    .push(format!("Expected parameter name, got {}", other));
                return;
            }
        };

        if !self.match_kind(&TokenKind::Equals) {
            directive
                .errors
                .push(format!("Expected '=' after '{}'", name));
            return;
        }

        if self.is_at_end() {
            directive
                .errors
                .push(format!("Missing value for '{}'", name));
            return;
        }

        let token = self.advance().kind.clone();
        let value = match token {
            TokenKind::Str(s) | TokenKind::Identifier(s) => Value::String(s),
            TokenKind::Number(n) => Value::Integer(n),
            TokenKind::Boolean(b) => Value::Boolean(b),
            TokenKind::Placeholder(text) => Value::Placeholder(parse_placeholder(&text)),
            TokenKind::JsonBlob(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(json) => Value::from_json(&json),
                Err(e) => {
                    directive
                        .errors
                        .push(format!("Malformed JSON in value for '{}': {}", name, e));
                    Value::Null
                }
            },
            TokenKind::Equals | TokenKind::Comma => {
                directive
                    .errors
                    .push(format!("Missing value for '{}'", name));
                return;
            }
        };

        // Map semantics: a repeated name overwrites the earlier value
        directive.attributes.insert(name, value);

        // Optional trailing comma
        self.match_kind(&TokenKind::Comma);
    }

    fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if !self.is_at_end() && &self.peek().kind == kind {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }
}

/// Split unwrapped placeholder text on the first ':'. The source defaults
/// to GET when absent or unrecognized.
fn parse_placeholder(text: &str) -> Placeholder {
    match text.split_once(':') {
        Some((word, key)) => Placeholder {
            source: PlaceholderSource::parse(word.trim()).unwrap_or(PlaceholderSource::Get),
            key: key.trim().to_string(),
        },
        None => Placeholder {
            source: PlaceholderSource::Get,
            key: text.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> ParsedDirective {
        let tokens = Lexer::new(input).tokenize();
        Parser::new(tokens).parse()
    }

    #[test]
    fn test_parse_simple_directive() {
        let directive = parse("type=post limit=5");
        assert!(directive.errors.is_empty());
        assert_eq!(
            directive.attributes.get("type"),
            Some(&Value::String("post".to_string()))
        );
        assert_eq!(directive.attributes.get("limit"), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_comma_separated_equivalent_to_spaced() {
        let spaced = parse("a=1 b=2");
        let commas = parse("a=1,b=2");
        assert_eq!(spaced.attributes, commas.attributes);
    }

    #[test]
    fn test_missing_equals_recovers() {
        let directive = parse("type post limit=5");
        // "type" fails its '=' check, then "post" restarts a group and
        // fails its own; the trailing attribute still lands
        assert_eq!(directive.errors.len(), 2);
        assert!(directive.errors[0].contains("type"));
        assert_eq!(directive.attributes.get("limit"), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_missing_value_recovers() {
        let directive = parse("type=, limit=5");
        assert!(directive.errors.iter().any(|e| e.contains("type")));
        assert!(!directive.attributes.contains_key("type"));
        assert_eq!(directive.attributes.get("limit"), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_trailing_missing_value() {
        let directive = parse("type=post limit=");
        assert!(directive.errors.iter().any(|e| e.contains("limit")));
        assert_eq!(
            directive.attributes.get("type"),
            Some(&Value::String("post".to_string()))
        );
    }

    #[test]
    fn test_duplicate_name_overwrites() {
        let directive = parse("limit=5 limit=8");
        assert_eq!(directive.attributes.get("limit"), Some(&Value::Integer(8)));
        assert!(directive.errors.is_empty());
    }

    #[test]
    fn test_placeholder_value() {
        let directive = parse("type={GET:t} author={SESSION:user}");
        match directive.attributes.get("type") {
            Some(Value::Placeholder(p)) => {
                assert_eq!(p.source, PlaceholderSource::Get);
                assert_eq!(p.key, "t");
            }
            other => panic!("Expected placeholder, got {:?}", other),
        }
        match directive.attributes.get("author") {
            Some(Value::Placeholder(p)) => assert_eq!(p.source, PlaceholderSource::Session),
            other => panic!("Expected placeholder, got {:?}", other),
        }
    }

    #[test]
    fn test_json_blob_value() {
        let directive = parse(r#"meta={"key": "color", "ids": [1, 2]}"#);
        assert!(directive.errors.is_empty());
        match directive.attributes.get("meta") {
            Some(Value::Array(values)) => assert_eq!(values.len(), 2),
            other => panic!("Expected array from JSON object, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_records_error_and_null() {
        let directive = parse(r#"meta={"key": }"#);
        assert!(directive.errors.iter().any(|e| e.contains("meta")));
        assert_eq!(directive.attributes.get("meta"), Some(&Value::Null));
    }

    #[test]
    fn test_bareword_with_dash() {
        let directive = parse("layout=grid-3");
        assert_eq!(
            directive.attributes.get("layout"),
            Some(&Value::String("grid-3".to_string()))
        );
    }
}
