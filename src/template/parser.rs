//! Recursive-descent parser for template expressions
//!
//! The grammar is a small side-effect free subset of JavaScript expressions:
//! literals, template literals, identifiers, member/index access with
//! optional chaining, calls, array/object literals with spread, arrow
//! functions with expression bodies, and the usual unary, binary, logical
//! and conditional operators.

use std::rc::Rc;

use super::ast::{
    Arrow, BinaryOp, Element, Expr, Literal, LogicalOp, Property, TemplatePart, UnaryOp,
};
use super::error::{Result, TemplateError};
use super::lexer::{Lexer, RawTemplatePart, Token, TokenKind};

/// Maximum nesting depth accepted by the parser
const MAX_DEPTH: usize = 128;

/// Parse a complete expression
pub fn parse_expression(src: &str) -> Result<Expr> {
    parse_at(src, 0)
}

fn parse_at(src: &str, base: usize) -> Result<Expr> {
    let tokens = Lexer::with_offset(src, base).tokenize()?;
    let mut parser = Parser {
        src,
        base,
        tokens,
        pos: 0,
        depth: 0,
    };
    if parser.tokens.is_empty() {
        return Ok(Expr::Literal(Literal::Null));
    }
    let expr = parser.parse_assignment()?;
    if let Some(tok) = parser.tokens.get(parser.pos) {
        return Err(TemplateError::syntax(
            tok.start + 1,
            format!("unexpected {}", describe(&tok.kind)),
        ));
    }
    Ok(expr)
}

struct Parser<'a> {
    src: &'a str,
    base: usize,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn is_punct(&self, p: &str) -> bool {
        matches!(self.peek(), Some(TokenKind::Punct(q)) if *q == p)
    }

    fn eat(&mut self, p: &str) -> bool {
        if self.is_punct(p) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn column(&self) -> usize {
        match self.tokens.get(self.pos) {
            Some(tok) => tok.start + 1,
            None => self.base + self.src.len() + 1,
        }
    }

    fn expect(&mut self, p: &str) -> Result<()> {
        if self.eat(p) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", p)))
        }
    }

    fn unexpected(&self, wanted: &str) -> TemplateError {
        let found = match self.peek() {
            Some(kind) => describe(kind),
            None => "end of expression".to_string(),
        };
        TemplateError::syntax(self.column(), format!("expected {}, found {}", wanted, found))
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(TemplateError::RecursionLimit);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Arrow functions and conditionals
    fn parse_assignment(&mut self) -> Result<Expr> {
        self.enter()?;
        let result = if self.at_arrow() {
            self.parse_arrow()
        } else {
            self.parse_conditional()
        };
        self.leave();
        result
    }

    fn at_arrow(&self) -> bool {
        match self.peek() {
            Some(TokenKind::Ident(_)) => {
                matches!(self.peek_at(1), Some(TokenKind::Punct("=>")))
            }
            Some(TokenKind::Punct("(")) => {
                let mut depth = 0usize;
                for (i, tok) in self.tokens[self.pos..].iter().enumerate() {
                    match tok.kind {
                        TokenKind::Punct("(") => depth += 1,
                        TokenKind::Punct(")") => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(
                                    self.peek_at(i + 1),
                                    Some(TokenKind::Punct("=>"))
                                );
                            }
                        }
                        _ => {}
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn parse_arrow(&mut self) -> Result<Expr> {
        let start = self.tokens[self.pos].start;
        let mut params = Vec::new();
        if self.eat("(") {
            while !self.is_punct(")") {
                match self.peek().cloned() {
                    Some(TokenKind::Ident(name)) => {
                        self.pos += 1;
                        params.push(name);
                    }
                    _ => return Err(self.unexpected("parameter name")),
                }
                if !self.eat(",") {
                    break;
                }
            }
            self.expect(")")?;
        } else if let Some(TokenKind::Ident(name)) = self.peek().cloned() {
            self.pos += 1;
            params.push(name);
        }
        self.expect("=>")?;
        if self.is_punct("{") {
            return Err(TemplateError::syntax(
                self.column(),
                "arrow functions take an expression body; wrap object literals in parentheses",
            ));
        }
        let body = self.parse_assignment()?;
        let end = self.tokens[self.pos - 1].end;
        let source = self.src[start - self.base..end - self.base].to_string();
        Ok(Expr::Arrow(Rc::new(Arrow {
            params,
            body,
            source,
        })))
    }

    fn parse_conditional(&mut self) -> Result<Expr> {
        let test = self.parse_logical_or()?;
        if !self.eat("?") {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(":")?;
        let alternate = self.parse_assignment()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_logical_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_logical_and()?;
        loop {
            let op = if self.eat("||") {
                LogicalOp::Or
            } else if self.eat("??") {
                LogicalOp::Nullish
            } else {
                return Ok(left);
            };
            let right = self.parse_logical_and()?;
            left = Expr::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_logical_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_binary(0)?;
        while self.eat("&&") {
            let right = self.parse_binary(0)?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Precedence climbing over equality, relational, additive and
    /// multiplicative operators
    fn parse_binary(&mut self, level: usize) -> Result<Expr> {
        const LEVELS: &[&[(&str, BinaryOp)]] = &[
            &[
                ("===", BinaryOp::StrictEq),
                ("!==", BinaryOp::StrictNe),
                ("==", BinaryOp::Eq),
                ("!=", BinaryOp::Ne),
            ],
            &[
                ("<=", BinaryOp::Le),
                (">=", BinaryOp::Ge),
                ("<", BinaryOp::Lt),
                (">", BinaryOp::Gt),
            ],
            &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
            &[
                ("*", BinaryOp::Mul),
                ("/", BinaryOp::Div),
                ("%", BinaryOp::Rem),
            ],
        ];

        if level == LEVELS.len() {
            return self.parse_unary();
        }

        let mut left = self.parse_binary(level + 1)?;
        'outer: loop {
            for (punct, op) in LEVELS[level] {
                if self.eat(punct) {
                    let right = self.parse_binary(level + 1)?;
                    left = Expr::Binary {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = if self.eat("!") {
            UnaryOp::Not
        } else if self.eat("-") {
            UnaryOp::Neg
        } else if self.eat("+") {
            UnaryOp::Plus
        } else if matches!(self.peek(), Some(TokenKind::Ident(name)) if name == "typeof") {
            self.pos += 1;
            UnaryOp::TypeOf
        } else {
            return self.parse_postfix();
        };
        self.enter()?;
        let operand = self.parse_unary();
        self.leave();
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand?),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(".") {
                let property = self.parse_property_name()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                    optional: false,
                };
            } else if self.eat("?.") {
                if self.eat("(") {
                    let args = self.parse_elements(")")?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        optional: true,
                    };
                } else if self.eat("[") {
                    let index = self.parse_assignment()?;
                    self.expect("]")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        optional: true,
                    };
                } else {
                    let property = self.parse_property_name()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                        optional: true,
                    };
                }
            } else if self.eat("[") {
                let index = self.parse_assignment()?;
                self.expect("]")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    optional: false,
                };
            } else if self.eat("(") {
                let args = self.parse_elements(")")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    optional: false,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_property_name(&mut self) -> Result<String> {
        match self.peek().cloned() {
            Some(TokenKind::Ident(name)) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("property name")),
        }
    }

    /// Comma separated elements up to `close`, with spread and a trailing comma
    fn parse_elements(&mut self, close: &str) -> Result<Vec<Element>> {
        let mut items = Vec::new();
        while !self.is_punct(close) {
            if self.eat("...") {
                items.push(Element::Spread(self.parse_assignment()?));
            } else {
                items.push(Element::Item(self.parse_assignment()?));
            }
            if !self.eat(",") {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(tok) = self.tokens.get(self.pos).cloned() else {
            return Err(self.unexpected("expression"));
        };
        self.pos += 1;
        match tok.kind {
            TokenKind::Number(n) => Ok(Expr::Literal(Literal::Number(n))),
            TokenKind::Str(s) => Ok(Expr::Literal(Literal::String(s))),
            TokenKind::Template(parts) => self.parse_template(parts),
            TokenKind::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Literal::Bool(true)),
                "false" => Expr::Literal(Literal::Bool(false)),
                "null" | "undefined" => Expr::Literal(Literal::Null),
                _ => Expr::Ident(name),
            }),
            TokenKind::Punct("(") => {
                let inner = self.parse_assignment()?;
                self.expect(")")?;
                Ok(inner)
            }
            TokenKind::Punct("[") => {
                self.enter()?;
                let items = self.parse_elements("]");
                self.leave();
                Ok(Expr::Array(items?))
            }
            TokenKind::Punct("{") => {
                self.enter()?;
                let props = self.parse_object();
                self.leave();
                Ok(Expr::Object(props?))
            }
            other => {
                self.pos -= 1;
                Err(TemplateError::syntax(
                    tok.start + 1,
                    format!("unexpected {}", describe(&other)),
                ))
            }
        }
    }

    fn parse_object(&mut self) -> Result<Vec<Property>> {
        let mut props = Vec::new();
        while !self.is_punct("}") {
            if self.eat("...") {
                props.push(Property::Spread(self.parse_assignment()?));
            } else if self.eat("[") {
                let key = self.parse_assignment()?;
                self.expect("]")?;
                self.expect(":")?;
                props.push(Property::Computed(key, self.parse_assignment()?));
            } else {
                let key = match self.peek().cloned() {
                    Some(TokenKind::Ident(name)) => name,
                    Some(TokenKind::Str(s)) => s,
                    Some(TokenKind::Number(n)) => super::value::format_number(n),
                    _ => return Err(self.unexpected("property key")),
                };
                let shorthand = matches!(self.peek(), Some(TokenKind::Ident(_)))
                    && matches!(self.peek_at(1), Some(TokenKind::Punct("," | "}")));
                self.pos += 1;
                if shorthand {
                    props.push(Property::Named(key.clone(), Expr::Ident(key)));
                } else {
                    self.expect(":")?;
                    props.push(Property::Named(key, self.parse_assignment()?));
                }
            }
            if !self.eat(",") {
                break;
            }
        }
        self.expect("}")?;
        Ok(props)
    }

    fn parse_template(&mut self, parts: Vec<RawTemplatePart>) -> Result<Expr> {
        let mut out = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                RawTemplatePart::Str(s) => out.push(TemplatePart::Str(s)),
                RawTemplatePart::Expr { source, offset } => {
                    self.enter()?;
                    let parsed = parse_at(&source, offset);
                    self.leave();
                    out.push(TemplatePart::Expr(parsed?));
                }
            }
        }
        Ok(Expr::Template(out))
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(n) => format!("number {}", super::value::format_number(*n)),
        TokenKind::Str(_) => "string".to_string(),
        TokenKind::Template(_) => "template literal".to_string(),
        TokenKind::Ident(name) => format!("identifier '{}'", name),
        TokenKind::Punct(p) => format!("'{}'", p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        match expr {
            Expr::Binary {
                op: BinaryOp::Add,
                right,
                ..
            } => assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. })),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_arrow_with_parenthesized_object_body() {
        let expr = parse_expression("items.map(x => ({v:x})).length").unwrap();
        let Expr::Member { object, property, .. } = expr else {
            panic!("expected member access");
        };
        assert_eq!(property, "length");
        let Expr::Call { args, .. } = *object else {
            panic!("expected call");
        };
        match &args[0] {
            Element::Item(Expr::Arrow(arrow)) => {
                assert_eq!(arrow.params, vec!["x"]);
                assert_eq!(arrow.source, "x => ({v:x})");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_multi_param_arrow_source() {
        let expr = parse_expression("(a, b) => a.id - b.id").unwrap();
        match expr {
            Expr::Arrow(arrow) => {
                assert_eq!(arrow.params, vec!["a", "b"]);
                assert_eq!(arrow.source, "(a, b) => a.id - b.id");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parenthesized_expression_is_not_arrow() {
        assert!(matches!(
            parse_expression("(a + b) * 2").unwrap(),
            Expr::Binary { op: BinaryOp::Mul, .. }
        ));
    }

    #[test]
    fn test_object_literal_forms() {
        let expr = parse_expression("{title, 'x-y': 1, [k]: 2, ...rest}").unwrap();
        let Expr::Object(props) = expr else {
            panic!("expected object");
        };
        assert_eq!(props.len(), 4);
        assert!(matches!(&props[0], Property::Named(k, Expr::Ident(v)) if k == "title" && v == "title"));
        assert!(matches!(&props[1], Property::Named(k, _) if k == "x-y"));
        assert!(matches!(&props[2], Property::Computed(..)));
        assert!(matches!(&props[3], Property::Spread(_)));
    }

    #[test]
    fn test_empty_expression_is_null() {
        assert!(matches!(
            parse_expression("   ").unwrap(),
            Expr::Literal(Literal::Null)
        ));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse_expression("a b").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { column: 3, .. }));
    }

    #[test]
    fn test_block_body_rejected() {
        assert!(parse_expression("x => { return x }").is_err());
    }

    #[test]
    fn test_template_literal_columns_are_absolute() {
        let err = parse_expression("`a${ b c }`").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { column: 8, .. }));
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let src = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert!(matches!(
            parse_expression(&src),
            Err(TemplateError::RecursionLimit)
        ));
    }

    #[test]
    fn test_optional_chaining() {
        let expr = parse_expression("post?.title").unwrap();
        assert!(matches!(expr, Expr::Member { optional: true, .. }));
    }
}
