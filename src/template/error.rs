//! Template error types

use thiserror::Error;

/// Errors raised while scanning, parsing or evaluating a template
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Invalid brace scan at offset {offset}: found {found:?}, expected '{open}' or '{close}'")]
    InvalidBraceStart {
        offset: usize,
        found: Option<char>,
        open: char,
        close: char,
    },

    #[error("Unmatched '{{' at offset {offset} near: {excerpt}")]
    UnbalancedBrace { offset: usize, excerpt: String },

    #[error("Syntax error at column {column}: {message}")]
    Syntax { column: usize, message: String },

    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Value is not callable: {0}")]
    NotCallable(String),

    #[error("Bad arguments to {function}: {message}")]
    BadArguments { function: String, message: String },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Error in template '{template}': {source}")]
    InTemplate {
        template: String,
        #[source]
        source: Box<TemplateError>,
    },

    #[error("Error in expression {{{expr}}}: {source}")]
    InExpression {
        expr: String,
        #[source]
        source: Box<TemplateError>,
    },

    #[error("Expression recursion limit exceeded")]
    RecursionLimit,
}

impl TemplateError {
    pub(crate) fn syntax(column: usize, message: impl Into<String>) -> Self {
        TemplateError::Syntax {
            column,
            message: message.into(),
        }
    }

    pub(crate) fn bad_args(function: &str, message: impl Into<String>) -> Self {
        TemplateError::BadArguments {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;
