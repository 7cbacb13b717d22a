//! Subject-style key patterns.
//!
//! Keys are dot-delimited token sequences. A pattern token is either a
//! literal, `*` (exactly one token) or `>` (one or more remaining tokens,
//! only valid as the final token).

use crate::errors::{ErrorCode, KvGraphError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Literal(String),
    Single,
    Tail,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPattern {
    source: String,
    tokens: Vec<Token>,
}

impl KeyPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(invalid(pattern, "pattern must not be empty"));
        }
        let raw: Vec<&str> = pattern.split('.').collect();
        let mut tokens = Vec::with_capacity(raw.len());
        for (idx, token) in raw.iter().enumerate() {
            let parsed = match *token {
                "" => return Err(invalid(pattern, "empty token")),
                "*" => Token::Single,
                ">" if idx + 1 == raw.len() => Token::Tail,
                ">" => return Err(invalid(pattern, "'>' must be the final token")),
                t if t.contains('*') || t.contains('>') => {
                    return Err(invalid(pattern, "wildcards must stand alone in a token"));
                }
                t => Token::Literal(t.to_string()),
            };
            tokens.push(parsed);
        }
        Ok(Self {
            source: pattern.to_string(),
            tokens,
        })
    }

    /// Parses a pattern list. Validation of every entry happens before any
    /// matching, so one bad pattern rejects the whole request.
    pub fn parse_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Self>> {
        patterns.iter().map(|p| Self::parse(p.as_ref())).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, key: &str) -> bool {
        let mut parts = key.split('.');
        for token in &self.tokens {
            match token {
                Token::Tail => return parts.next().is_some_and(|p| !p.is_empty()),
                Token::Single => match parts.next() {
                    Some(part) if !part.is_empty() => {}
                    _ => return false,
                },
                Token::Literal(lit) => match parts.next() {
                    Some(part) if part == lit => {}
                    _ => return false,
                },
            }
        }
        parts.next().is_none()
    }

    /// The leading literal portion, usable to narrow an ordered scan. An
    /// all-literal pattern returns the key itself; otherwise the prefix ends
    /// with a `.` separator. Empty when the pattern starts with a wildcard.
    pub fn literal_prefix(&self) -> String {
        let mut prefix = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(lit) => {
                    prefix.push_str(lit);
                    prefix.push('.');
                }
                Token::Single | Token::Tail => return prefix,
            }
        }
        prefix.pop();
        prefix
    }

    pub fn is_exact(&self) -> bool {
        self.tokens.iter().all(|t| matches!(t, Token::Literal(_)))
    }

    pub fn matches_everything(&self) -> bool {
        matches!(self.tokens.as_slice(), [Token::Tail])
    }
}

pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && !token
            .chars()
            .any(|c| c == '.' || c == '*' || c == '>' || c.is_whitespace())
}

fn invalid(pattern: &str, reason: &str) -> KvGraphError {
    KvGraphError::precondition(
        ErrorCode::KvInvalidPattern,
        format!("invalid key pattern '{pattern}': {reason}"),
    )
}
