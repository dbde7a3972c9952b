//! Tokenizer for template expressions

use super::error::{Result, TemplateError};
use super::scanner::find_matching_brace;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    /// Template literal, split into literal text and raw `${...}` sources.
    /// Each raw part carries its byte offset within the expression.
    Template(Vec<RawTemplatePart>),
    Ident(String),
    Punct(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawTemplatePart {
    Str(String),
    Expr { source: String, offset: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Punctuators, longest first so that greedy matching works
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "...", "?.", "??", "=>", "==", "!=", "<=", ">=", "&&", "||", "(", ")", "[", "]",
    "{", "}", ",", ".", ":", "?", "!", "+", "-", "*", "/", "%", "<", ">",
];

/// Character-level lexer over a single expression
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    /// Offset of `src` within the enclosing expression, for error columns
    base: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::with_offset(src, 0)
    }

    pub fn with_offset(src: &'a str, base: usize) -> Self {
        Self { src, pos: 0, base }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else { break };
            let start = self.pos;

            let kind = if c.is_ascii_digit()
                || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
            {
                self.read_number()?
            } else if c == '"' || c == '\'' {
                TokenKind::Str(self.read_string(c)?)
            } else if c == '`' {
                TokenKind::Template(self.read_template()?)
            } else if is_ident_start(c) {
                TokenKind::Ident(self.read_ident())
            } else {
                TokenKind::Punct(self.read_punct()?)
            };

            tokens.push(Token {
                kind,
                start: self.base + start,
                end: self.base + self.pos,
            });
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::syntax(self.base + self.pos + 1, message)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn read_number(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = self.peek_at(1);
            let digit_after = if matches!(sign, Some('+' | '-')) {
                self.peek_at(2)
            } else {
                sign
            };
            if digit_after.is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
        let text = &self.src[start..self.pos];
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| self.error(format!("invalid number literal '{}'", text)))
    }

    fn read_escape(&mut self) -> Result<char> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated escape sequence"))?;
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            'u' => {
                let hex: String = (0..4).filter_map(|_| self.bump()).collect();
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error(format!("invalid unicode escape '\\u{}'", hex)))?
            }
            other => other,
        })
    }

    fn read_string(&mut self, quote: char) -> Result<String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string literal")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.read_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn read_template(&mut self) -> Result<Vec<RawTemplatePart>> {
        self.bump();
        let mut parts = Vec::new();
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated template literal")),
                Some('`') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    text.push(self.read_escape()?);
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    let open = self.pos + 1;
                    let close = find_matching_brace(self.src, open, b'{', b'}')?
                        .ok_or_else(|| self.error("unterminated ${ in template literal"))?;
                    if !text.is_empty() {
                        parts.push(RawTemplatePart::Str(std::mem::take(&mut text)));
                    }
                    parts.push(RawTemplatePart::Expr {
                        source: self.src[open + 1..close - 1].to_string(),
                        offset: self.base + open + 1,
                    });
                    self.pos = close;
                }
                Some(c) => {
                    self.bump();
                    text.push(c);
                }
            }
        }
        if !text.is_empty() {
            parts.push(RawTemplatePart::Str(text));
        }
        Ok(parts)
    }

    fn read_ident(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn read_punct(&mut self) -> Result<&'static str> {
        let rest = &self.src[self.pos..];
        for p in PUNCTUATORS {
            if rest.starts_with(p) {
                // `a?.5:b` is a conditional, not optional chaining
                if *p == "?." && rest[2..].starts_with(|c: char| c.is_ascii_digit()) {
                    continue;
                }
                self.pos += p.len();
                return Ok(p);
            }
        }
        let c = rest.chars().next().unwrap_or('\0');
        Err(self.error(format!("unexpected character '{}'", c)))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
