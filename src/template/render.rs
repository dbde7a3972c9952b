//! Brace-expression template rendering

use std::path::Path;

use indexmap::IndexMap;
use walkdir::WalkDir;

use super::ast::Expr;
use super::context::Context;
use super::error::{Result, TemplateError};
use super::eval::evaluate;
use super::parser::parse_expression;
use super::scanner::{next_segment, Segment};
use crate::content::loader::read_entire_file;

#[derive(Debug)]
enum Part {
    Text(String),
    Expr { source: String, expr: Expr },
}

/// A template split into literal text and parsed `{...}` expressions
#[derive(Debug)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    /// Scan and parse every expression in `text`
    pub fn compile(text: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut pos = 0;

        while let Some(segment) = next_segment(text, pos)? {
            match segment {
                Segment::Escaped { backslash } => {
                    literal.push_str(&text[pos..backslash]);
                    literal.push('{');
                    pos = backslash + 2;
                }
                Segment::Expression(span) => {
                    literal.push_str(&text[pos..span.open]);
                    if !literal.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut literal)));
                    }
                    let source = span.inner(text);
                    let expr = parse_expression(source).map_err(|e| TemplateError::InExpression {
                        expr: source.to_string(),
                        source: Box::new(e),
                    })?;
                    parts.push(Part::Expr {
                        source: source.to_string(),
                        expr,
                    });
                    pos = span.close;
                }
            }
        }
        literal.push_str(&text[pos..]);
        if !literal.is_empty() {
            parts.push(Part::Text(literal));
        }
        Ok(Self { parts })
    }

    pub fn render(&self, ctx: &Context) -> Result<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Expr { source, expr } => {
                    let value = evaluate(expr, ctx).map_err(|e| TemplateError::InExpression {
                        expr: source.clone(),
                        source: Box::new(e),
                    })?;
                    out.push_str(&value.to_output_string());
                }
            }
        }
        Ok(out)
    }

    /// Number of `{...}` expressions in the template
    pub fn expression_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::Expr { .. }))
            .count()
    }
}

/// Substitute every `{...}` expression in `template` with its value
pub fn evaluate_dynamic_js(template: &str, ctx: &Context) -> Result<String> {
    Template::compile(template)?.render(ctx)
}

/// Named templates loaded from a directory of `.html` files
#[derive(Debug, Default)]
pub struct Templates {
    templates: IndexMap<String, Template>,
}

impl Templates {
    /// Load every `*.html` file in `dir`, keyed by file stem.
    ///
    /// Unreadable files are skipped with a warning. A template with
    /// unbalanced braces or a malformed expression is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut templates = Templates::default();
        if !dir.exists() {
            tracing::warn!("Templates directory not found: {:?}", dir);
            return Ok(templates);
        }

        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"));

        for entry in entries {
            let path = entry.path();
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(text) = read_entire_file(path) else {
                tracing::warn!("Skipping unreadable template: {:?}", path);
                continue;
            };
            templates.insert(name, &text)?;
            tracing::debug!("Loaded template: {}", name);
        }
        Ok(templates)
    }

    /// Compile and register a template under `name`
    pub fn insert(&mut self, name: &str, text: &str) -> Result<()> {
        let template = Template::compile(text).map_err(|e| TemplateError::InTemplate {
            template: name.to_string(),
            source: Box::new(e),
        })?;
        self.templates.insert(name.to_string(), template);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Render the template called `name`
    pub fn render(&self, name: &str, ctx: &Context) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| TemplateError::TemplateNotFound(name.to_string()))?;
        template.render(ctx).map_err(|e| TemplateError::InTemplate {
            template: name.to_string(),
            source: Box::new(e),
        })
    }
}
