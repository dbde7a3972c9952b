//! Tree-walking evaluator for parsed expressions
//!
//! Only context bindings, arrow parameters and the inert globals in
//! [`super::builtins`] are reachable from an expression.

use std::cmp::Ordering;
use std::rc::Rc;

use indexmap::IndexMap;

use super::ast::{BinaryOp, Element, Expr, Literal, LogicalOp, Property, TemplatePart, UnaryOp};
use super::builtins::{self, arg, relative_index};
use super::context::Context;
use super::error::{Result, TemplateError};
use super::value::{Closure, Function, Value};

/// Maximum nesting of function calls before evaluation is aborted
const MAX_CALL_DEPTH: usize = 256;

/// Variables visible at a point of evaluation: arrow parameters first,
/// then the render context.
#[derive(Clone)]
pub struct Scope {
    context: Context,
    locals: Option<Rc<Frame>>,
}

struct Frame {
    vars: Vec<(String, Value)>,
    parent: Option<Rc<Frame>>,
}

impl Scope {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            locals: None,
        }
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        let mut frame = self.locals.as_deref();
        while let Some(f) = frame {
            if let Some((_, v)) = f.vars.iter().rev().find(|(k, _)| k == name) {
                return Some(v.clone());
            }
            frame = f.parent.as_deref();
        }
        self.context.get(name).cloned()
    }

    fn bind(&self, vars: Vec<(String, Value)>) -> Scope {
        Scope {
            context: self.context.clone(),
            locals: Some(Rc::new(Frame {
                vars,
                parent: self.locals.clone(),
            })),
        }
    }
}

/// Evaluate an expression against a context
pub fn evaluate(expr: &Expr, context: &Context) -> Result<Value> {
    Interpreter::default().eval(expr, &Scope::new(context.clone()))
}

#[derive(Default)]
struct Interpreter {
    depth: usize,
}

impl Interpreter {
    fn eval(&mut self, expr: &Expr, scope: &Scope) -> Result<Value> {
        Ok(self.eval_chain(expr, scope)?.unwrap_or_default())
    }

    /// Evaluate, returning `None` when an optional chain short-circuits
    fn eval_chain(&mut self, expr: &Expr, scope: &Scope) -> Result<Option<Value>> {
        match expr {
            Expr::Member {
                object,
                property,
                optional,
            } => {
                let Some(target) = self.eval_chain(object, scope)? else {
                    return Ok(None);
                };
                if *optional && target.is_null() {
                    return Ok(None);
                }
                get_member(&target, property).map(Some)
            }
            Expr::Index {
                object,
                index,
                optional,
            } => {
                let Some(target) = self.eval_chain(object, scope)? else {
                    return Ok(None);
                };
                if *optional && target.is_null() {
                    return Ok(None);
                }
                let key = self.eval(index, scope)?.to_js_string();
                get_member(&target, &key).map(Some)
            }
            Expr::Call {
                callee,
                args,
                optional,
            } => self.eval_call(callee, args, *optional, scope),
            other => self.eval_plain(other, scope).map(Some),
        }
    }

    fn eval_plain(&mut self, expr: &Expr, scope: &Scope) -> Result<Value> {
        match expr {
            Expr::Literal(lit) => Ok(match lit {
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::string(s),
            }),
            Expr::Template(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Str(s) => out.push_str(s),
                        TemplatePart::Expr(e) => out.push_str(&self.eval(e, scope)?.to_js_string()),
                    }
                }
                Ok(Value::from(out))
            }
            Expr::Ident(name) => resolve(name, scope)
                .ok_or_else(|| TemplateError::UndefinedVariable(name.clone())),
            Expr::Array(elements) => Ok(Value::array(self.eval_elements(elements, scope)?)),
            Expr::Object(props) => self.eval_object(props, scope),
            Expr::Unary { op, operand } => self.eval_unary(*op, operand, scope),
            Expr::Binary { op, left, right } => {
                let l = self.eval(left, scope)?;
                let r = self.eval(right, scope)?;
                Ok(binary(*op, &l, &r))
            }
            Expr::Logical { op, left, right } => {
                let l = self.eval(left, scope)?;
                let short = match op {
                    LogicalOp::And => !l.is_truthy(),
                    LogicalOp::Or => l.is_truthy(),
                    LogicalOp::Nullish => !l.is_null(),
                };
                if short {
                    Ok(l)
                } else {
                    self.eval(right, scope)
                }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test, scope)?.is_truthy() {
                    self.eval(consequent, scope)
                } else {
                    self.eval(alternate, scope)
                }
            }
            Expr::Arrow(arrow) => Ok(Value::Function(Function::Closure(Rc::new(Closure {
                arrow: Rc::clone(arrow),
                scope: scope.clone(),
            })))),
            Expr::Member { .. } | Expr::Index { .. } | Expr::Call { .. } => self.eval(expr, scope),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr, scope: &Scope) -> Result<Value> {
        if op == UnaryOp::TypeOf {
            // typeof tolerates unbound names
            if let Expr::Ident(name) = operand {
                if resolve(name, scope).is_none() {
                    return Ok(Value::from("undefined"));
                }
            }
        }
        let v = self.eval(operand, scope)?;
        Ok(match op {
            UnaryOp::Not => Value::Bool(!v.is_truthy()),
            UnaryOp::Neg => Value::Number(-v.to_number()),
            UnaryOp::Plus => Value::Number(v.to_number()),
            UnaryOp::TypeOf => Value::from(type_of(&v)),
        })
    }

    fn eval_elements(&mut self, elements: &[Element], scope: &Scope) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                Element::Item(e) => out.push(self.eval(e, scope)?),
                Element::Spread(e) => match self.eval(e, scope)? {
                    Value::Array(items) => out.extend(items.iter().cloned()),
                    Value::String(s) => out.extend(s.chars().map(|c| Value::from(c.to_string()))),
                    other => {
                        return Err(TemplateError::Type(format!(
                            "{} is not iterable",
                            other.type_name()
                        )))
                    }
                },
            }
        }
        Ok(out)
    }

    fn eval_object(&mut self, props: &[Property], scope: &Scope) -> Result<Value> {
        let mut map = IndexMap::new();
        for prop in props {
            match prop {
                Property::Named(key, e) => {
                    map.insert(key.clone(), self.eval(e, scope)?);
                }
                Property::Computed(key, e) => {
                    let key = self.eval(key, scope)?.to_js_string();
                    map.insert(key, self.eval(e, scope)?);
                }
                Property::Spread(e) => match self.eval(e, scope)? {
                    Value::Object(other) => {
                        map.extend(other.iter().map(|(k, v)| (k.clone(), v.clone())))
                    }
                    Value::Array(items) => map.extend(
                        items
                            .iter()
                            .enumerate()
                            .map(|(i, v)| (i.to_string(), v.clone())),
                    ),
                    _ => {}
                },
            }
        }
        Ok(Value::object(map))
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Element],
        optional: bool,
        scope: &Scope,
    ) -> Result<Option<Value>> {
        // Method calls keep their receiver so built-in methods can dispatch on it
        let (receiver, name) = match callee {
            Expr::Member {
                object,
                property,
                optional: member_optional,
            } => {
                let Some(target) = self.eval_chain(object, scope)? else {
                    return Ok(None);
                };
                if *member_optional && target.is_null() {
                    return Ok(None);
                }
                (Some(target), property.clone())
            }
            _ => (None, describe(callee)),
        };

        let func = match &receiver {
            Some(target) => match target {
                Value::Object(map) => map.get(&name).cloned(),
                Value::Null => {
                    return Err(TemplateError::Type(format!(
                        "Cannot read properties of null (reading '{}')",
                        name
                    )))
                }
                _ => None,
            },
            None => match self.eval_chain(callee, scope)? {
                Some(v) => Some(v),
                None => return Ok(None),
            },
        };

        if optional && func.as_ref().map_or(receiver.is_none(), Value::is_null) {
            return Ok(None);
        }

        let args = self.eval_elements(args, scope)?;
        match (func, receiver) {
            (Some(Value::Function(f)), _) => self.call(&f, &args).map(Some),
            (None, Some(target)) => self.call_method(&target, &name, &args).map(Some),
            _ => Err(TemplateError::NotCallable(name)),
        }
    }

    fn call(&mut self, func: &Function, args: &[Value]) -> Result<Value> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(TemplateError::RecursionLimit);
        }
        self.depth += 1;
        let result = match func {
            Function::Native(native) => (native.func)(args),
            Function::Closure(closure) => {
                let vars = closure
                    .arrow
                    .params
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (p.clone(), arg(args, i).clone()))
                    .collect();
                let scope = closure.scope.bind(vars);
                self.eval(&closure.arrow.body, &scope)
            }
        };
        self.depth -= 1;
        result
    }

    fn call_method(&mut self, target: &Value, name: &str, args: &[Value]) -> Result<Value> {
        let found = match target {
            Value::Array(items) => self.array_method(items, name, args)?,
            Value::String(s) => builtins::string_method(s, name, args)?,
            Value::Number(n) => builtins::number_method(*n, name, args)?,
            Value::Bool(b) if name == "toString" => Some(Value::from(b.to_string())),
            _ => None,
        };
        found.ok_or_else(|| {
            TemplateError::NotCallable(format!("{}.{}", target.type_name(), name))
        })
    }

    fn callback(&mut self, args: &[Value], method: &str) -> Result<Function> {
        match args.first() {
            Some(Value::Function(f)) => Ok(f.clone()),
            _ => Err(TemplateError::bad_args(method, "expected a function")),
        }
    }

    fn array_method(
        &mut self,
        items: &Rc<Vec<Value>>,
        name: &str,
        args: &[Value],
    ) -> Result<Option<Value>> {
        let array = Value::Array(Rc::clone(items));
        let value = match name {
            "map" => {
                let f = self.callback(args, name)?;
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(self.call(&f, &[item.clone(), i.into(), array.clone()])?);
                }
                Value::array(out)
            }
            "filter" => {
                let f = self.callback(args, name)?;
                let mut out = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    if self.call(&f, &[item.clone(), i.into(), array.clone()])?.is_truthy() {
                        out.push(item.clone());
                    }
                }
                Value::array(out)
            }
            "find" | "findIndex" | "some" | "every" => {
                let f = self.callback(args, name)?;
                let mut hit = None;
                for (i, item) in items.iter().enumerate() {
                    let t = self.call(&f, &[item.clone(), i.into(), array.clone()])?.is_truthy();
                    if t != (name == "every") {
                        hit = Some(i);
                        break;
                    }
                }
                match (name, hit) {
                    ("find", Some(i)) => items[i].clone(),
                    ("find", None) => Value::Null,
                    ("findIndex", Some(i)) => i.into(),
                    ("findIndex", None) => Value::Number(-1.0),
                    ("some", hit) => Value::Bool(hit.is_some()),
                    (_, hit) => Value::Bool(hit.is_none()),
                }
            }
            "forEach" => {
                let f = self.callback(args, name)?;
                for (i, item) in items.iter().enumerate() {
                    self.call(&f, &[item.clone(), i.into(), array.clone()])?;
                }
                Value::Null
            }
            "reduce" => {
                let f = self.callback(args, name)?;
                let mut iter = items.iter().enumerate();
                let mut acc = match args.get(1) {
                    Some(init) => init.clone(),
                    None => match iter.next() {
                        Some((_, first)) => first.clone(),
                        None => {
                            return Err(TemplateError::bad_args(
                                name,
                                "empty array with no initial value",
                            ))
                        }
                    },
                };
                for (i, item) in iter {
                    acc = self.call(&f, &[acc, item.clone(), i.into(), array.clone()])?;
                }
                acc
            }
            "join" | "toString" => {
                let sep = match args.first() {
                    Some(v) if name == "join" && !v.is_null() => v.to_js_string(),
                    _ => ",".to_string(),
                };
                Value::from(
                    items
                        .iter()
                        .map(|v| if v.is_null() { String::new() } else { v.to_js_string() })
                        .collect::<Vec<_>>()
                        .join(&sep),
                )
            }
            "slice" => {
                let start = relative_index(arg(args, 0), items.len(), 0);
                let end = relative_index(arg(args, 1), items.len(), items.len());
                Value::array(items.get(start..end.max(start)).unwrap_or_default().to_vec())
            }
            "includes" => {
                let needle = arg(args, 0);
                Value::Bool(items.iter().any(|v| v.strict_equals(needle)))
            }
            "indexOf" => {
                let needle = arg(args, 0);
                match items.iter().position(|v| v.strict_equals(needle)) {
                    Some(i) => i.into(),
                    None => Value::Number(-1.0),
                }
            }
            "concat" => {
                let mut out = items.to_vec();
                for a in args {
                    match a {
                        Value::Array(more) => out.extend(more.iter().cloned()),
                        other => out.push(other.clone()),
                    }
                }
                Value::array(out)
            }
            "reverse" => Value::array(items.iter().rev().cloned().collect()),
            "flat" => {
                let mut out = Vec::new();
                for item in items.iter() {
                    match item {
                        Value::Array(inner) => out.extend(inner.iter().cloned()),
                        other => out.push(other.clone()),
                    }
                }
                Value::array(out)
            }
            "at" => {
                let n = arg(args, 0).to_number().trunc();
                let i = if n < 0.0 { items.len() as f64 + n } else { n };
                if i >= 0.0 {
                    items.get(i as usize).cloned().unwrap_or_default()
                } else {
                    Value::Null
                }
            }
            "sort" => Value::array(self.sort(items, args.first())?),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// Stable sort returning a new array; the receiver is never modified
    fn sort(&mut self, items: &[Value], compare: Option<&Value>) -> Result<Vec<Value>> {
        let mut out = items.to_vec();
        match compare {
            None | Some(Value::Null) => {
                out.sort_by_key(|v| v.to_js_string());
            }
            Some(Value::Function(f)) => {
                let mut failure = None;
                out.sort_by(|a, b| {
                    if failure.is_some() {
                        return Ordering::Equal;
                    }
                    match self.call(f, &[a.clone(), b.clone()]) {
                        Ok(v) => v.to_number().partial_cmp(&0.0).unwrap_or(Ordering::Equal),
                        Err(e) => {
                            failure = Some(e);
                            Ordering::Equal
                        }
                    }
                });
                if let Some(e) = failure {
                    return Err(e);
                }
            }
            Some(_) => return Err(TemplateError::bad_args("sort", "comparator must be a function")),
        }
        Ok(out)
    }
}

fn resolve(name: &str, scope: &Scope) -> Option<Value> {
    scope
        .lookup(name)
        .or_else(|| builtins::global(name))
        .or_else(|| (name == "undefined").then_some(Value::Null))
}

fn get_member(target: &Value, key: &str) -> Result<Value> {
    match target {
        Value::Null => Err(TemplateError::Type(format!(
            "Cannot read properties of null (reading '{}')",
            key
        ))),
        other => Ok(other.get_property(key).unwrap_or_default()),
    }
}

fn type_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "undefined",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
        Value::Function(_) => "function",
    }
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Value {
    let num = |f: fn(f64, f64) -> f64| Value::Number(f(l.to_number(), r.to_number()));
    match op {
        BinaryOp::Add => {
            let stringy = |v: &Value| {
                matches!(
                    v,
                    Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Function(_)
                )
            };
            if stringy(l) || stringy(r) {
                Value::from(l.to_js_string() + &r.to_js_string())
            } else {
                num(|a, b| a + b)
            }
        }
        BinaryOp::Sub => num(|a, b| a - b),
        BinaryOp::Mul => num(|a, b| a * b),
        BinaryOp::Div => num(|a, b| a / b),
        BinaryOp::Rem => num(|a, b| a % b),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
            let ord = match (l, r) {
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => l.to_number().partial_cmp(&r.to_number()),
            };
            Value::Bool(match (op, ord) {
                (_, None) => false,
                (BinaryOp::Lt, Some(o)) => o == Ordering::Less,
                (BinaryOp::Gt, Some(o)) => o == Ordering::Greater,
                (BinaryOp::Le, Some(o)) => o != Ordering::Greater,
                (_, Some(o)) => o != Ordering::Less,
            })
        }
        BinaryOp::Eq => Value::Bool(l.loose_equals(r)),
        BinaryOp::Ne => Value::Bool(!l.loose_equals(r)),
        BinaryOp::StrictEq => Value::Bool(l.strict_equals(r)),
        BinaryOp::StrictNe => Value::Bool(!l.strict_equals(r)),
    }
}

/// Short human-readable name for a callee, used in error messages
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Member { object, property, .. } => format!("{}.{}", describe(object), property),
        Expr::Index { object, .. } => format!("{}[...]", describe(object)),
        Expr::Call { callee, .. } => format!("{}(...)", describe(callee)),
        _ => "expression".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parser::parse_expression;

    fn eval_with(src: &str, ctx: &Context) -> Result<Value> {
        evaluate(&parse_expression(src)?, ctx)
    }

    fn eval_str(src: &str, ctx: &Context) -> String {
        eval_with(src, ctx).unwrap().to_js_string()
    }

    fn posts() -> Context {
        let post = |id: i64, slug: &str| {
            let mut m = IndexMap::new();
            m.insert("id".to_string(), Value::from(id));
            m.insert("slug".to_string(), Value::from(slug));
            Value::object(m)
        };
        Context::new().with(
            "posts",
            Value::array(vec![post(1, "hello"), post(2, "world"), post(3, "again")]),
        )
    }

    #[test]
    fn test_member_and_method_calls() {
        let ctx = posts();
        assert_eq!(eval_str("posts.length", &ctx), "3");
        assert_eq!(eval_str("posts[1].slug.toUpperCase()", &ctx), "WORLD");
        assert_eq!(
            eval_str("posts.map(p => p.slug).join(' ')", &ctx),
            "hello world again"
        );
    }

    #[test]
    fn test_arrow_returning_object_literal() {
        let ctx = Context::new().with("items", Value::array(vec![1i64.into(), 2i64.into()]));
        assert_eq!(eval_str("items.map(x => ({v:x})).length", &ctx), "2");
        assert_eq!(eval_str("items.map(x => ({v:x}))[1].v", &ctx), "2");
    }

    #[test]
    fn test_template_literal_and_concat() {
        let ctx = posts();
        assert_eq!(
            eval_str("posts.map(p => `<a href=\"/${p.slug}\">${p.id}</a>`)[0]", &ctx),
            "<a href=\"/hello\">1</a>"
        );
        assert_eq!(eval_str("'n=' + 1 + 2", &ctx), "n=12");
        assert_eq!(eval_str("1 + 2 + 'n'", &ctx), "3n");
    }

    #[test]
    fn test_filter_find_sort_reduce() {
        let ctx = posts();
        assert_eq!(eval_str("posts.filter(p => p.id > 1).length", &ctx), "2");
        assert_eq!(eval_str("posts.find(p => p.slug === 'world').id", &ctx), "2");
        assert_eq!(
            eval_str("posts.sort((a, b) => b.id - a.id).map(p => p.id).join()", &ctx),
            "3,2,1"
        );
        // receiver is unchanged
        assert_eq!(eval_str("posts.map(p => p.id).join()", &ctx), "1,2,3");
        assert_eq!(eval_str("posts.reduce((n, p) => n + p.id, 0)", &ctx), "6");
    }

    #[test]
    fn test_closures_capture_scope() {
        let ctx = Context::new().with("base", "/blog");
        assert_eq!(eval_str("(s => (p => base + s + p))('/')('x')", &ctx), "/blog/x");
    }

    #[test]
    fn test_logical_and_conditional() {
        let ctx = Context::new().with("title", "").with("n", Value::Null);
        assert_eq!(eval_str("title || 'Untitled'", &ctx), "Untitled");
        assert_eq!(eval_str("title ?? 'Untitled'", &ctx), "");
        assert_eq!(eval_str("n ?? 'none'", &ctx), "none");
        assert_eq!(eval_str("1 < 2 ? 'yes' : 'no'", &ctx), "yes");
    }

    #[test]
    fn test_undefined_identifier_is_error() {
        let ctx = Context::new();
        assert!(matches!(
            eval_with("missing", &ctx),
            Err(TemplateError::UndefinedVariable(name)) if name == "missing"
        ));
        assert_eq!(eval_str("typeof missing", &ctx), "undefined");
    }

    #[test]
    fn test_optional_chaining_short_circuits() {
        let ctx = Context::new().with("post", Value::Null);
        assert!(eval_with("post?.title.length", &ctx).unwrap().is_null());
        assert!(eval_with("post?.title.toUpperCase()", &ctx).unwrap().is_null());
        assert!(matches!(
            eval_with("post.title", &ctx),
            Err(TemplateError::Type(_))
        ));
    }

    #[test]
    fn test_missing_property_is_null() {
        let ctx = posts();
        assert!(eval_with("posts[0].title", &ctx).unwrap().is_null());
        assert!(eval_with("posts[10]", &ctx).unwrap().is_null());
    }

    #[test]
    fn test_calling_non_function_fails() {
        let ctx = Context::new().with("title", "x");
        assert!(matches!(
            eval_with("title()", &ctx),
            Err(TemplateError::NotCallable(_))
        ));
        assert!(matches!(
            eval_with("title.nope()", &ctx),
            Err(TemplateError::NotCallable(_))
        ));
    }

    #[test]
    fn test_native_functions_from_context() {
        let ctx = Context::new().with_function("double", |args| {
            Ok(Value::Number(arg(args, 0).to_number() * 2.0))
        });
        assert_eq!(eval_str("double(21)", &ctx), "42");
        assert_eq!(eval_str("[1, 2].map(double).join('+')", &ctx), "2+4");
    }

    #[test]
    fn test_spread() {
        let ctx = Context::new().with("a", Value::array(vec![1i64.into(), 2i64.into()]));
        assert_eq!(eval_str("[0, ...a, 3].join()", &ctx), "0,1,2,3");
        assert_eq!(eval_str("({...{x: 1}, y: 2}).x", &ctx), "1");
    }

    #[test]
    fn test_globals() {
        let ctx = Context::new();
        assert_eq!(eval_str("Math.max(1, 5, 3)", &ctx), "5");
        assert_eq!(eval_str("JSON.stringify({a: [1, 'b']})", &ctx), r#"{"a":[1,"b"]}"#);
        assert_eq!(eval_str("String(12) + Number('3')", &ctx), "123");
        assert!(eval_with("require('fs')", &ctx).is_err());
    }

    #[test]
    fn test_runaway_recursion_is_bounded() {
        let ctx = Context::new();
        let result = eval_with("(f => f(f))(f => f(f))", &ctx);
        assert!(matches!(result, Err(TemplateError::RecursionLimit)));
    }

    #[test]
    fn test_closure_values_keep_source() {
        let f = eval_with("(a, b) => a * b", &Context::new()).unwrap();
        match &f {
            Value::Function(func) => assert_eq!(func.source(), Some("(a, b) => a * b")),
            other => panic!("expected function, got {other:?}"),
        }
        let ctx = Context::new().with("mul", f);
        assert_eq!(eval_str("mul(3, 4)", &ctx), "12");
    }

    #[test]
    fn test_equality() {
        let ctx = Context::new();
        assert_eq!(eval_str("1 == '1'", &ctx), "true");
        assert_eq!(eval_str("1 === '1'", &ctx), "false");
        assert_eq!(eval_str("'b' > 'a'", &ctx), "true");
    }
}
