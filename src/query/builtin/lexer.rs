//! Tokenizer for filter expressions.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare `.`
    Dot,
    /// `.name`
    Field(String),
    Ident(String),
    Str(String),
    Num(f64),
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Pipe,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Split an expression into tokens.
///
/// # Errors
///
/// Returns a description of the first character that cannot start a token,
/// or of a malformed string or number literal.
pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut chars = input.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let token = match c {
            '.' => {
                chars.next();
                match chars.peek() {
                    Some(&next) if is_ident_start(next) => Token::Field(read_ident(&mut chars)),
                    _ => Token::Dot,
                }
            }
            '"' => {
                chars.next();
                Token::Str(read_string(&mut chars)?)
            }
            '0'..='9' => Token::Num(read_number(&mut chars)?),
            '-' => {
                chars.next();
                if !chars.peek().is_some_and(char::is_ascii_digit) {
                    return Err("unexpected '-' (arithmetic is not supported)".to_string());
                }
                Token::Num(-read_number(&mut chars)?)
            }
            c if is_ident_start(c) => Token::Ident(read_ident(&mut chars)),
            '[' => single(&mut chars, Token::LBracket),
            ']' => single(&mut chars, Token::RBracket),
            '(' => single(&mut chars, Token::LParen),
            ')' => single(&mut chars, Token::RParen),
            ',' => single(&mut chars, Token::Comma),
            '|' => single(&mut chars, Token::Pipe),
            '=' => {
                chars.next();
                expect_char(&mut chars, '=', "'=' (assignment is not supported)")?;
                Token::Eq
            }
            '!' => {
                chars.next();
                expect_char(&mut chars, '=', "'!'")?;
                Token::Ne
            }
            '<' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            other => return Err(format!("unexpected character '{other}'")),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn single(chars: &mut Peekable<Chars<'_>>, token: Token) -> Token {
    chars.next();
    token
}

fn expect_char(chars: &mut Peekable<Chars<'_>>, want: char, what: &str) -> Result<(), String> {
    if chars.next_if_eq(&want).is_some() {
        Ok(())
    } else {
        Err(format!("unexpected {what}"))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn read_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
        ident.push(c);
    }
    ident
}

fn read_number(chars: &mut Peekable<Chars<'_>>) -> Result<f64, String> {
    let mut text = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
        text.push(c);
    }
    if let Some(e) = chars.next_if(|c| *c == 'e' || *c == 'E') {
        text.push(e);
        if let Some(sign) = chars.next_if(|c| *c == '+' || *c == '-') {
            text.push(sign);
        }
        while let Some(c) = chars.next_if(char::is_ascii_digit) {
            text.push(c);
        }
    }
    text.parse()
        .map_err(|_| format!("invalid number literal '{text}'"))
}

fn read_string(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    let mut value = String::new();
    loop {
        match chars.next() {
            None => return Err("unterminated string literal".to_string()),
            Some('"') => return Ok(value),
            Some('\\') => value.push(read_escape(chars)?),
            Some(c) => value.push(c),
        }
    }
}

fn read_escape(chars: &mut Peekable<Chars<'_>>) -> Result<char, String> {
    match chars.next() {
        Some('"') => Ok('"'),
        Some('\\') => Ok('\\'),
        Some('/') => Ok('/'),
        Some('n') => Ok('\n'),
        Some('t') => Ok('\t'),
        Some('r') => Ok('\r'),
        Some('b') => Ok('\u{8}'),
        Some('f') => Ok('\u{c}'),
        Some('u') => {
            let hex: String = chars.by_ref().take(4).collect();
            u32::from_str_radix(&hex, 16)
                .ok()
                .filter(|_| hex.len() == 4)
                .and_then(char::from_u32)
                .ok_or_else(|| format!("invalid unicode escape '\\u{hex}'"))
        }
        Some(other) => Err(format!("invalid escape '\\{other}'")),
        None => Err("unterminated string literal".to_string()),
    }
}
