//! Runtime values for template expressions

use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

use super::ast::Arrow;
use super::error::Result;
use super::eval::Scope;

/// Signature of a function implemented in Rust
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value>;

/// A value visible to template expressions
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<Vec<Value>>),
    Object(Rc<IndexMap<String, Value>>),
    Function(Function),
}

/// A callable value
#[derive(Clone)]
pub enum Function {
    /// Implemented in Rust; has no source text
    Native(Rc<Native>),
    /// An arrow function written in expression syntax
    Closure(Rc<Closure>),
}

pub struct Native {
    pub name: String,
    pub func: Box<NativeFn>,
}

/// An arrow function together with the scope it was created in
pub struct Closure {
    pub arrow: Rc<Arrow>,
    pub scope: Scope,
}

impl Function {
    pub fn native<F>(name: &str, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Function::Native(Rc::new(Native {
            name: name.to_string(),
            func: Box::new(func),
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            Function::Native(n) => &n.name,
            Function::Closure(_) => "<arrow>",
        }
    }

    /// Source text, if the function was written in expression syntax
    pub fn source(&self) -> Option<&str> {
        match self {
            Function::Native(_) => None,
            Function::Closure(c) => Some(&c.arrow.source),
        }
    }
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }

    pub fn object(map: IndexMap<String, Value>) -> Self {
        Value::Object(Rc::new(map))
    }

    /// Convert for template output: top-level arrays are joined with
    /// newlines and null renders as nothing. Nested arrays stringify the
    /// usual comma-joined way.
    pub fn to_output_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Array(items) => items
                .iter()
                .map(|v| match v {
                    Value::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_js_string(),
        }
    }

    /// String conversion used by `+`, template literals and `String(x)`
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Array(items) => items
                .iter()
                .map(|v| match v {
                    Value::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Function(f) => match f.source() {
                Some(src) => src.to_string(),
                None => format!("function {}() {{ [native code] }}", f.name()),
            },
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else {
                    parse_js_number(t).unwrap_or(f64::NAN)
                }
            }
            Value::Array(items) => match items.len() {
                0 => 0.0,
                1 => items[0].to_number(),
                _ => f64::NAN,
            },
            Value::Object(_) | Value::Function(_) => f64::NAN,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Property lookup; missing properties are `None`
    pub fn get_property(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.get(key).cloned(),
            Value::Array(items) => {
                if key == "length" {
                    Some(Value::Number(items.len() as f64))
                } else {
                    key.parse::<usize>().ok().and_then(|i| items.get(i).cloned())
                }
            }
            Value::String(s) => {
                if key == "length" {
                    Some(Value::Number(s.encode_utf16().count() as f64))
                } else {
                    key.parse::<usize>()
                        .ok()
                        .and_then(|i| s.chars().nth(i))
                        .map(|c| Value::string(c.to_string()))
                }
            }
            _ => None,
        }
    }

    /// Strict equality (`===`); functions and containers compare by identity
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(Function::Native(a)), Value::Function(Function::Native(b))) => {
                Rc::ptr_eq(a, b)
            }
            (Value::Function(Function::Closure(a)), Value::Function(Function::Closure(b))) => {
                Rc::ptr_eq(a, b)
            }
            _ => false,
        }
    }

    /// Loose equality (`==`): strict, plus number/string/bool coercion
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(_), Value::String(_))
            | (Value::String(_), Value::Number(_))
            | (Value::Bool(_), _)
            | (_, Value::Bool(_))
                if !self.is_null() && !other.is_null() =>
            {
                self.to_number() == other.to_number()
            }
            _ => self.strict_equals(other),
        }
    }

    /// Convert from serde_json::Value
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(arr) => {
                Value::array(arr.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(obj) => Value::object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Object(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Function(func) => write!(f, "[function {}]", func.name()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

/// Format a number the way a browser would print it.
///
/// Uses the shortest round-trip digits, switching to exponent notation
/// below `1e-6` and from `1e21` up.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    // `{:e}` yields the shortest digits as `d.ddde<exp>`
    let sci = format!("{:e}", n.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exp.parse::<i32>().unwrap_or(0) + 1;

    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let (first, rest) = digits.split_at(1);
        let e = point - 1;
        let sign = if e < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, e.abs())
        }
    };

    if n < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Parse a numeric literal, rejecting the `inf`/`nan` spellings Rust accepts
pub fn parse_js_number(s: &str) -> Option<f64> {
    let looks_numeric = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !looks_numeric || !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_string_joins_arrays_with_newlines() {
        let v = Value::array(vec!["a".into(), Value::Number(2.0), Value::Null]);
        assert_eq!(v.to_output_string(), "a\n2\n");
        assert_eq!(v.to_js_string(), "a,2,");

        let nested = Value::array(vec![
            "<li>a</li>".into(),
            Value::array(vec![1i64.into(), Value::array(vec![2i64.into(), 3i64.into()])]),
        ]);
        assert_eq!(nested.to_output_string(), "<li>a</li>\n1,2,3");
    }

    #[test]
    fn test_null_renders_empty() {
        assert_eq!(Value::Null.to_output_string(), "");
        assert_eq!(Value::Null.to_js_string(), "null");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(-42.25), "-42.25");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(-2.5e-8), "-2.5e-8");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e300), "1.5e+300");
        assert_eq!(format_number(123456789012345680000.0), "123456789012345680000");
    }

    #[test]
    fn test_parse_js_number() {
        assert_eq!(parse_js_number("3"), Some(3.0));
        assert_eq!(parse_js_number("-2.5e3"), Some(-2500.0));
        assert_eq!(parse_js_number("inf"), None);
        assert_eq!(parse_js_number("NaN"), None);
        assert_eq!(parse_js_number("3px"), None);
        assert_eq!(parse_js_number("."), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::string("").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::Number(1.0).loose_equals(&Value::string("1")));
        assert!(!Value::Number(1.0).strict_equals(&Value::string("1")));
        assert!(Value::Bool(true).loose_equals(&Value::Number(1.0)));
        assert!(!Value::Null.loose_equals(&Value::Bool(false)));
    }

    #[test]
    fn test_from_json_preserves_key_order() {
        let json = serde_json::json!({"z": 1, "a": [true, "x"]});
        let v = Value::from_json(&json);
        match v {
            Value::Object(map) => {
                let keys: Vec<_> = map.keys().cloned().collect();
                assert_eq!(keys, vec!["z", "a"]);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_string_length_and_index() {
        let s = Value::string("héllo");
        assert_eq!(s.get_property("length").unwrap().to_number(), 5.0);
        assert_eq!(s.get_property("1").unwrap().to_js_string(), "é");
    }
}
