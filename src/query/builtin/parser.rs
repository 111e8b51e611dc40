//! Recursive-descent parser for filter expressions.
//!
//! Precedence, loosest first: `|`, `or`, `and`, comparisons, postfix
//! indexing. Comparisons do not chain.

use super::lexer::Token;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identity,
    Literal(Value),
    /// `[a, b, ...]`
    Array(Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Pipe(Box<Expr>, Box<Expr>),
    Call(Builtin, Option<Box<Expr>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Not,
    Length,
    Has,
    Contains,
    StartsWith,
    EndsWith,
}

impl Builtin {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "not" => Self::Not,
            "length" => Self::Length,
            "has" => Self::Has,
            "contains" => Self::Contains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            _ => return None,
        })
    }

    const fn takes_argument(self) -> bool {
        !matches!(self, Self::Not | Self::Length)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Length => "length",
            Self::Has => "has",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
        }
    }
}

/// Parse a token stream into an expression tree.
///
/// # Errors
///
/// Returns a description of the first unexpected token.
pub fn parse(tokens: &[Token]) -> Result<Expr, String> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.pipe()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(format!("unexpected token {token:?}")),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, want: &Token) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(name)) if name == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: &Token) -> Result<(), String> {
        if self.eat(want) {
            Ok(())
        } else {
            Err(match self.peek() {
                Some(found) => format!("expected {want:?}, found {found:?}"),
                None => format!("expected {want:?}, found end of expression"),
            })
        }
    }

    fn pipe(&mut self) -> Result<Expr, String> {
        let mut lhs = self.or()?;
        while self.eat(&Token::Pipe) {
            let rhs = self.or()?;
            lhs = Expr::Pipe(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.and()?;
        while self.eat_keyword("or") {
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.comparison()?;
        while self.eat_keyword("and") {
            let rhs = self.comparison()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        let lhs = self.postfix()?;
        let op = match self.peek() {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::Ne) => CompareOp::Ne,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Le) => CompareOp::Le,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::Ge) => CompareOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.postfix()?;
        Ok(Expr::Compare(op, Box::new(lhs), Box::new(rhs)))
    }

    fn postfix(&mut self) -> Result<Expr, String> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                Some(Token::Field(name)) => {
                    let key = Expr::Literal(Value::String(name.clone()));
                    self.pos += 1;
                    expr = Expr::Index(Box::new(expr), Box::new(key));
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    expr = self.bracket_index(expr)?;
                }
                Some(Token::Dot) if self.tokens.get(self.pos + 1) == Some(&Token::LBracket) => {
                    self.pos += 2;
                    expr = self.bracket_index(expr)?;
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Parse `<expr>]` after an opening bracket.
    fn bracket_index(&mut self, target: Expr) -> Result<Expr, String> {
        let key = self.pipe()?;
        self.expect(&Token::RBracket)?;
        Ok(Expr::Index(Box::new(target), Box::new(key)))
    }

    fn primary(&mut self) -> Result<Expr, String> {
        let Some(token) = self.advance().cloned() else {
            return Err("unexpected end of expression".to_string());
        };

        match token {
            Token::Dot => {
                if self.eat(&Token::LBracket) {
                    self.bracket_index(Expr::Identity)
                } else if let Some(Token::Str(key)) = self.peek().cloned() {
                    self.pos += 1;
                    let key = Expr::Literal(Value::String(key));
                    Ok(Expr::Index(Box::new(Expr::Identity), Box::new(key)))
                } else {
                    Ok(Expr::Identity)
                }
            }
            Token::Field(name) => Ok(Expr::Index(
                Box::new(Expr::Identity),
                Box::new(Expr::Literal(Value::String(name))),
            )),
            Token::Str(value) => Ok(Expr::Literal(Value::String(value))),
            Token::Num(value) => Ok(Expr::Literal(number(value))),
            Token::LBracket => self.array(),
            Token::LParen => {
                let inner = self.pipe()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => self.identifier(&name),
            other => Err(format!("unexpected token {other:?}")),
        }
    }

    /// Elements of an array constructor; the opening `[` is consumed.
    fn array(&mut self) -> Result<Expr, String> {
        let mut items = Vec::new();
        if self.eat(&Token::RBracket) {
            return Ok(Expr::Array(items));
        }
        loop {
            items.push(self.pipe()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RBracket)?;
            return Ok(Expr::Array(items));
        }
    }

    fn identifier(&mut self, name: &str) -> Result<Expr, String> {
        match name {
            "true" => return Ok(Expr::Literal(Value::Bool(true))),
            "false" => return Ok(Expr::Literal(Value::Bool(false))),
            "null" => return Ok(Expr::Literal(Value::Null)),
            _ => {}
        }

        let builtin = Builtin::lookup(name).ok_or_else(|| format!("{name}/0 is not defined"))?;
        if !builtin.takes_argument() {
            return Ok(Expr::Call(builtin, None));
        }

        self.expect(&Token::LParen)
            .map_err(|_| format!("{name}/0 is not defined"))?;
        let argument = self.pipe()?;
        self.expect(&Token::RParen)?;
        Ok(Expr::Call(builtin, Some(Box::new(argument))))
    }
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}
