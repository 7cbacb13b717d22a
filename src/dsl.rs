//! Text form of a traversal chain.
//!
//! `g.V().has('name', 'Alice').out('knows').count()`. The `g.` prefix is
//! optional. Arguments are string literals (single or double quoted),
//! numbers, `true`, `false`, `null`, or `[...]` lists of those. Only builder
//! operations are reachable from here.

use serde_json::Value;

use crate::{
    errors::{ErrorCode, KvGraphError, Result},
    grammar::OpName,
    traversal::OpCall,
};

pub fn parse_traversal(input: &str) -> Result<Vec<OpCall>> {
    let mut parser = Parser::new(input);
    parser.skip_ws();
    if parser.rest().starts_with("g.") {
        parser.pos += 2;
    }
    let mut calls = Vec::new();
    loop {
        parser.skip_ws();
        calls.push(parser.call()?);
        parser.skip_ws();
        match parser.peek() {
            None => break,
            Some('.') => parser.pos += 1,
            Some(other) => return Err(parser.error(&format!("expected '.' or end, found '{other}'"))),
        }
    }
    Ok(calls)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char) -> Result<()> {
        self.skip_ws();
        match self.bump() {
            Some(ch) if ch == want => Ok(()),
            Some(ch) => Err(self.error(&format!("expected '{want}', found '{ch}'"))),
            None => Err(self.error(&format!("expected '{want}', found end of input"))),
        }
    }

    fn error(&self, msg: &str) -> KvGraphError {
        KvGraphError::precondition(
            ErrorCode::DslSyntax,
            format!("{msg} at offset {}", self.pos),
        )
    }

    fn ident(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        {
            self.bump();
        }
        if start == self.pos {
            return Err(self.error("expected an operation name"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn call(&mut self) -> Result<OpCall> {
        let name: OpName = self.ident()?.parse()?;
        self.expect('(')?;
        let args = self.list(')')?;
        Ok(OpCall::new(name, args))
    }

    /// Comma separated values up to `close`, which is consumed.
    fn list(&mut self, close: char) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        self.skip_ws();
        if self.peek() == Some(close) {
            self.bump();
            return Ok(values);
        }
        loop {
            values.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(ch) if ch == close => return Ok(values),
                Some(ch) => return Err(self.error(&format!("expected ',' or '{close}', found '{ch}'"))),
                None => return Err(self.error(&format!("unterminated list, expected '{close}'"))),
            }
        }
    }

    fn value(&mut self) -> Result<Value> {
        self.skip_ws();
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.bump();
                self.string(quote).map(Value::String)
            }
            Some('[') => {
                self.bump();
                self.list(']').map(Value::Array)
            }
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.number(),
            Some(ch) if ch.is_ascii_alphabetic() => match self.ident()? {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                other => Err(self.error(&format!("unexpected word '{other}'"))),
            },
            Some(ch) => Err(self.error(&format!("unexpected '{ch}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn string(&mut self, quote: char) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(ch) if ch == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(ch) => out.push(ch),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(ch) => out.push(ch),
                None => return Err(self.error("unterminated string literal")),
            }
        }
    }

    fn number(&mut self) -> Result<Value> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | 'e' | 'E'))
        {
            self.bump();
        }
        let text = &self.src[start..self.pos];
        match serde_json::from_str::<Value>(text) {
            Ok(value @ Value::Number(_)) => Ok(value),
            _ => Err(self.error(&format!("invalid number '{text}'"))),
        }
    }
}
