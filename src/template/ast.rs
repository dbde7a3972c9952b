//! Expression syntax tree

use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

/// One piece of a template literal
#[derive(Debug, Clone)]
pub enum TemplatePart {
    Str(String),
    Expr(Expr),
}

/// Array element or call argument
#[derive(Debug, Clone)]
pub enum Element {
    Item(Expr),
    Spread(Expr),
}

#[derive(Debug, Clone)]
pub enum Property {
    Named(String, Expr),
    Computed(Expr, Expr),
    Spread(Expr),
}

#[derive(Debug)]
pub struct Arrow {
    pub params: Vec<String>,
    pub body: Expr,
    pub source: String,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Template(Vec<TemplatePart>),
    Ident(String),
    Array(Vec<Element>),
    Object(Vec<Property>),
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Element>,
        optional: bool,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Arrow(Rc<Arrow>),
}
