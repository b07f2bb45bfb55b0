//! A small reference parser for tests and demos.
//!
//! One statement per line:
//!
//! ```text
//! // comment
//! borrow other
//! double: ƒ(x) x * 2
//! numbers: [1, 2, 3]
//! map(numbers, double)
//! ```
//!
//! Expressions are numbers with optional units (`5m`, `250ms`), `"text"`,
//! `true`, `false`, `none`, names, `[sequences]`, calls `f(a, b)`,
//! properties `a.b`, functions `ƒ(a, b) body` (or `fun(a, b) body`),
//! `changed(stream)`, `-` and `~` prefixes, and `?` placeholders. Binary
//! operators `+ - * / % < <= > >= = != & |` apply strictly left to right
//! with no precedence; use parentheses to group.

use crate::parser::{ParseError, SourceParser};
use rill_ir::{
    ensure_sufficient_stack, Ast, AstBuilder, BinaryOp, NodeId, SharedInterner, UnaryOp, Unit,
};

#[derive(Copy, Clone, Debug, Default)]
pub struct LineParser {
    lenient: bool,
}

impl LineParser {
    /// Fails on the first line that does not parse.
    pub fn new() -> Self {
        LineParser { lenient: false }
    }

    /// Keeps lines that do not parse as unparsable nodes.
    pub fn lenient() -> Self {
        LineParser { lenient: true }
    }
}

impl SourceParser for LineParser {
    fn parse(&self, text: &str, interner: &SharedInterner) -> Result<Ast, ParseError> {
        let mut builder = AstBuilder::new(interner);
        let mut statements = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }
            let parsed = tokenize(trimmed, index + 1).and_then(|tokens| {
                Line {
                    builder: &mut builder,
                    tokens,
                    position: 0,
                    line: index + 1,
                }
                .statement()
            });
            match parsed {
                Ok(statement) => statements.push(statement),
                Err(error) if self.lenient => {
                    tracing::debug!(%error, "keeping unparsable line");
                    statements.push(builder.unparsable(trimmed));
                }
                Err(error) => return Err(error),
            }
        }
        Ok(builder.program(&statements))
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number { digits: String, unit: String },
    Text(String),
    Name(String),
    Symbol(&'static str),
}

const SYMBOLS: [&str; 20] = [
    "<=", ">=", "!=", "+", "-", "*", "/", "%", "<", ">", "=", "&", "|", "~", "(", ")", "[", "]",
    ",", ".",
];

/// Tokens with their one-based columns.
fn tokenize(text: &str, line: usize) -> Result<Vec<(Token, usize)>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut at = 0;
    while let Some(&c) = chars.get(at) {
        let column = at + 1;
        if c.is_whitespace() {
            at += 1;
        } else if c.is_ascii_digit() {
            let start = at;
            while chars.get(at).is_some_and(|c| c.is_ascii_digit() || *c == '.') {
                at += 1;
            }
            let digits: String = chars[start..at].iter().collect();
            let unit_start = at;
            while chars.get(at).is_some_and(|c| c.is_alphabetic()) {
                at += 1;
            }
            let unit = chars[unit_start..at].iter().collect();
            tokens.push((Token::Number { digits, unit }, column));
        } else if c == '"' {
            let start = at + 1;
            let Some(length) = chars[start..].iter().position(|&c| c == '"') else {
                return Err(ParseError::new(line, column, "unterminated text"));
            };
            tokens.push((Token::Text(chars[start..start + length].iter().collect()), column));
            at = start + length + 1;
        } else if c.is_alphabetic() || c == '_' {
            let start = at;
            while chars.get(at).is_some_and(|c| c.is_alphanumeric() || *c == '_') {
                at += 1;
            }
            tokens.push((Token::Name(chars[start..at].iter().collect()), column));
        } else if c == ':' || c == '?' {
            tokens.push((Token::Symbol(if c == ':' { ":" } else { "?" }), column));
            at += 1;
        } else {
            let rest: String = chars[at..chars.len().min(at + 2)].iter().collect();
            let Some(symbol) = SYMBOLS.iter().find(|symbol| rest.starts_with(**symbol)) else {
                return Err(ParseError::new(line, column, format!("unexpected `{c}`")));
            };
            tokens.push((Token::Symbol(*symbol), column));
            at += symbol.chars().count();
        }
    }
    Ok(tokens)
}

fn binary_op(symbol: &str) -> Option<BinaryOp> {
    Some(match symbol {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Subtract,
        "*" => BinaryOp::Multiply,
        "/" => BinaryOp::Divide,
        "%" => BinaryOp::Remainder,
        "<" => BinaryOp::Less,
        "<=" => BinaryOp::LessEqual,
        ">" => BinaryOp::Greater,
        ">=" => BinaryOp::GreaterEqual,
        "=" => BinaryOp::Equal,
        "!=" => BinaryOp::NotEqual,
        "&" => BinaryOp::And,
        "|" => BinaryOp::Or,
        _ => return None,
    })
}

struct Line<'b> {
    builder: &'b mut AstBuilder,
    tokens: Vec<(Token, usize)>,
    position: usize,
    line: usize,
}

impl Line<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(token, _)| token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset).map(|(token, _)| token)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).map(|(token, _)| token.clone());
        self.position += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let column = self
            .tokens
            .get(self.position)
            .or(self.tokens.last())
            .map_or(1, |(_, column)| *column);
        ParseError::new(self.line, column, message)
    }

    fn at_symbol(&self, symbol: &str) -> bool {
        matches!(self.peek(), Some(Token::Symbol(found)) if *found == symbol)
    }

    fn expect(&mut self, symbol: &str) -> Result<(), ParseError> {
        if self.at_symbol(symbol) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected `{symbol}`")))
        }
    }

    fn statement(mut self) -> Result<NodeId, ParseError> {
        let statement = match (self.peek(), self.peek_at(1)) {
            (Some(Token::Name(keyword)), Some(Token::Name(source))) if keyword == "borrow" => {
                let source = source.clone();
                self.position += 2;
                self.builder.borrow(&source)
            }
            (Some(Token::Name(name)), Some(Token::Symbol(":"))) => {
                let name = name.clone();
                self.position += 2;
                let value = self.expression()?;
                self.builder.bind(&name, value)
            }
            _ => self.expression()?,
        };
        if self.peek().is_some() {
            return Err(self.error("expected the end of the line"));
        }
        Ok(statement)
    }

    fn expression(&mut self) -> Result<NodeId, ParseError> {
        ensure_sufficient_stack(|| {
            let mut left = self.unary()?;
            while let Some(op) = match self.peek() {
                Some(Token::Symbol(symbol)) => binary_op(symbol),
                _ => None,
            } {
                self.position += 1;
                let right = self.unary()?;
                left = self.builder.binary(op, left, right);
            }
            Ok(left)
        })
    }

    fn unary(&mut self) -> Result<NodeId, ParseError> {
        let op = match self.peek() {
            Some(Token::Symbol("-")) => UnaryOp::Negate,
            Some(Token::Symbol("~")) => UnaryOp::Not,
            _ => return self.postfix(),
        };
        self.position += 1;
        let operand = ensure_sufficient_stack(|| self.unary())?;
        Ok(self.builder.unary(op, operand))
    }

    fn postfix(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.primary()?;
        loop {
            if self.at_symbol("(") {
                self.position += 1;
                let arguments = self.list(")")?;
                node = self.builder.evaluate(node, &arguments);
            } else if self.at_symbol(".") {
                self.position += 1;
                let Some(Token::Name(name)) = self.next() else {
                    return Err(self.error("expected a property name"));
                };
                node = self.builder.property(node, &name);
            } else {
                return Ok(node);
            }
        }
    }

    /// Comma separated expressions up to and including `close`.
    fn list(&mut self, close: &str) -> Result<Vec<NodeId>, ParseError> {
        let mut items = Vec::new();
        if self.at_symbol(close) {
            self.position += 1;
            return Ok(items);
        }
        loop {
            items.push(self.expression()?);
            if self.at_symbol(",") {
                self.position += 1;
            } else {
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn primary(&mut self) -> Result<NodeId, ParseError> {
        let Some(token) = self.next() else {
            return Err(self.error("expected an expression"));
        };
        match token {
            Token::Number { digits, unit } => {
                let Some(unit) = Unit::parse(&unit) else {
                    self.position -= 1;
                    return Err(self.error(format!("`{unit}` is not a unit")));
                };
                Ok(self.builder.number_with_unit(&digits, unit))
            }
            Token::Text(text) => Ok(self.builder.text(&text)),
            Token::Name(name) => match name.as_str() {
                "true" => Ok(self.builder.boolean(true)),
                "false" => Ok(self.builder.boolean(false)),
                "none" => Ok(self.builder.none()),
                "ƒ" | "fun" if self.at_symbol("(") => self.function(),
                "changed" if self.at_symbol("(") => {
                    self.position += 1;
                    let stream = self.expression()?;
                    self.expect(")")?;
                    Ok(self.builder.changed(stream))
                }
                _ => Ok(self.builder.reference(&name)),
            },
            Token::Symbol("?") => Ok(self.builder.placeholder()),
            Token::Symbol("[") => {
                let items = self.list("]")?;
                Ok(self.builder.sequence(&items))
            }
            Token::Symbol("(") => {
                let inner = self.expression()?;
                self.expect(")")?;
                Ok(inner)
            }
            Token::Symbol(symbol) => {
                self.position -= 1;
                Err(self.error(format!("unexpected `{symbol}`")))
            }
        }
    }

    fn function(&mut self) -> Result<NodeId, ParseError> {
        self.expect("(")?;
        let mut inputs = Vec::new();
        if self.at_symbol(")") {
            self.position += 1;
        } else {
            loop {
                let Some(Token::Name(name)) = self.next() else {
                    self.position -= 1;
                    return Err(self.error("expected an input name"));
                };
                inputs.push(self.builder.input(&name));
                if self.at_symbol(",") {
                    self.position += 1;
                } else {
                    self.expect(")")?;
                    break;
                }
            }
        }
        let body = self.expression()?;
        Ok(self.builder.function("", &inputs, body))
    }
}

#[cfg(test)]
mod tests;
