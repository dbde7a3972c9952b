//! Inert built-ins available to every expression
//!
//! These are pure functions over [`Value`]s. Nothing here can reach the
//! filesystem, the environment or any other process state.

use indexmap::IndexMap;

use super::error::{Result, TemplateError};
use super::value::{format_number, parse_js_number, Function, Value};

/// Global names resolved after the context and local bindings
pub fn global(name: &str) -> Option<Value> {
    let value = match name {
        "JSON" => object([Function::native("JSON.stringify", json_stringify)]),
        "Math" => object([
            Function::native("Math.floor", |args| math1(args, f64::floor)),
            Function::native("Math.ceil", |args| math1(args, f64::ceil)),
            Function::native("Math.round", |args| math1(args, |n| (n + 0.5).floor())),
            Function::native("Math.abs", |args| math1(args, f64::abs)),
            Function::native("Math.min", |args| {
                Ok(Value::Number(
                    args.iter().map(Value::to_number).fold(f64::INFINITY, f64::min),
                ))
            }),
            Function::native("Math.max", |args| {
                Ok(Value::Number(
                    args.iter()
                        .map(Value::to_number)
                        .fold(f64::NEG_INFINITY, f64::max),
                ))
            }),
        ]),
        "Object" => object([
            Function::native("Object.keys", |args| {
                Ok(Value::array(
                    entries(arg(args, 0)).into_iter().map(|(k, _)| k.into()).collect(),
                ))
            }),
            Function::native("Object.values", |args| {
                Ok(Value::array(
                    entries(arg(args, 0)).into_iter().map(|(_, v)| v).collect(),
                ))
            }),
            Function::native("Object.entries", |args| {
                Ok(Value::array(
                    entries(arg(args, 0))
                        .into_iter()
                        .map(|(k, v)| Value::array(vec![k.into(), v]))
                        .collect(),
                ))
            }),
        ]),
        "Array" => object([Function::native("Array.isArray", |args| {
            Ok(Value::Bool(matches!(arg(args, 0), Value::Array(_))))
        })]),
        "String" => Function::native("String", |args| {
            Ok(match args.first() {
                Some(v) => Value::string(v.to_js_string()),
                None => Value::string(""),
            })
        })
        .into(),
        "Number" => {
            Function::native("Number", |args| Ok(Value::Number(arg(args, 0).to_number()))).into()
        }
        "Boolean" => {
            Function::native("Boolean", |args| Ok(Value::Bool(arg(args, 0).is_truthy()))).into()
        }
        "parseInt" => Function::native("parseInt", |args| {
            Ok(Value::Number(parse_int(&arg(args, 0).to_js_string())))
        })
        .into(),
        "parseFloat" => Function::native("parseFloat", |args| {
            Ok(Value::Number(parse_float(&arg(args, 0).to_js_string())))
        })
        .into(),
        "NaN" => Value::Number(f64::NAN),
        "Infinity" => Value::Number(f64::INFINITY),
        _ => return None,
    };
    Some(value)
}

/// Build an object whose keys are the part of each function name after the dot
fn object<const N: usize>(functions: [Function; N]) -> Value {
    let map = functions
        .into_iter()
        .map(|f| {
            let key = f.name().rsplit('.').next().unwrap_or_default().to_string();
            (key, Value::Function(f))
        })
        .collect::<IndexMap<_, _>>();
    Value::object(map)
}

pub(crate) fn arg(args: &[Value], i: usize) -> &Value {
    const NULL: &Value = &Value::Null;
    args.get(i).unwrap_or(NULL)
}

fn math1(args: &[Value], f: impl Fn(f64) -> f64) -> Result<Value> {
    Ok(Value::Number(f(arg(args, 0).to_number())))
}

fn entries(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        _ => Vec::new(),
    }
}

/// JSON view of a value. Functions become `null`, as do non-finite numbers.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null | Value::Function(_) => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .filter(|(_, v)| !matches!(v, Value::Function(_)))
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

fn json_stringify(args: &[Value]) -> Result<Value> {
    let json = to_json(arg(args, 0));
    let pretty = arg(args, 2).to_number() > 0.0 || arg(args, 2).as_str().is_some();
    let text = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }
    .map_err(|e| TemplateError::bad_args("JSON.stringify", e.to_string()))?;
    Ok(Value::string(text))
}

fn parse_int(s: &str) -> f64 {
    let t = s.trim_start();
    let (sign, digits) = match t.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, t.strip_prefix('+').unwrap_or(t)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<f64>()
        .map(|n| sign * n)
        .unwrap_or(f64::NAN)
}

fn parse_float(s: &str) -> f64 {
    let t = s.trim();
    // longest numeric prefix
    (1..=t.len())
        .rev()
        .filter(|&i| t.is_char_boundary(i))
        .find_map(|i| parse_js_number(&t[..i]))
        .unwrap_or(f64::NAN)
}

/// Clamp a relative index the way `slice` does
pub(crate) fn relative_index(value: &Value, len: usize, default: usize) -> usize {
    if value.is_null() {
        return default;
    }
    let n = value.to_number();
    if n.is_nan() {
        0
    } else if n < 0.0 {
        (len as f64 + n.trunc()).max(0.0) as usize
    } else {
        (n.trunc() as usize).min(len)
    }
}

/// Clamp an index into `0..=len` the way `substring` does
fn clamped_index(value: &Value, len: usize, default: usize) -> usize {
    if value.is_null() {
        return default;
    }
    let n = value.to_number();
    if n.is_nan() || n <= 0.0 {
        0
    } else {
        (n.trunc() as usize).min(len)
    }
}

/// Methods on string receivers. `Ok(None)` means no such method.
pub fn string_method(s: &str, name: &str, args: &[Value]) -> Result<Option<Value>> {
    let text = |i: usize| arg(args, i).to_js_string();
    let value = match name {
        "toUpperCase" => s.to_uppercase().into(),
        "toLowerCase" => s.to_lowercase().into(),
        "trim" => s.trim().into(),
        "trimStart" => s.trim_start().into(),
        "trimEnd" => s.trim_end().into(),
        "toString" => s.into(),
        "slice" | "substring" => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len();
            let index = if name == "slice" { relative_index } else { clamped_index };
            let mut start = index(arg(args, 0), len, 0);
            let mut end = index(arg(args, 1), len, len);
            if name == "substring" && start > end {
                std::mem::swap(&mut start, &mut end);
            }
            if start >= end {
                "".into()
            } else {
                chars[start..end].iter().collect::<String>().into()
            }
        }
        "charAt" => {
            let i = arg(args, 0).to_number().max(0.0) as usize;
            s.chars()
                .nth(i)
                .map(|c| c.to_string())
                .unwrap_or_default()
                .into()
        }
        "split" => {
            let sep = arg(args, 0);
            let parts: Vec<Value> = match sep.as_str() {
                None if sep.is_null() => vec![s.into()],
                Some("") => s.chars().map(|c| c.to_string().into()).collect(),
                _ => s.split(sep.to_js_string().as_str()).map(Value::from).collect(),
            };
            let limit = arg(args, 1);
            if limit.is_null() {
                Value::array(parts)
            } else {
                let n = limit.to_number().max(0.0) as usize;
                Value::array(parts.into_iter().take(n).collect())
            }
        }
        "replace" => s.replacen(&text(0), &text(1), 1).into(),
        "replaceAll" => {
            let pattern = text(0);
            if pattern.is_empty() {
                return Err(TemplateError::bad_args("replaceAll", "empty pattern"));
            }
            s.replace(&pattern, &text(1)).into()
        }
        "startsWith" => Value::Bool(s.starts_with(&text(0))),
        "endsWith" => Value::Bool(s.ends_with(&text(0))),
        "includes" => Value::Bool(s.contains(&text(0))),
        "indexOf" => match s.find(&text(0)) {
            Some(byte) => Value::from(s[..byte].chars().count()),
            None => Value::Number(-1.0),
        },
        "repeat" => {
            let n = arg(args, 0).to_number();
            if !(0.0..=1e6).contains(&n) {
                return Err(TemplateError::bad_args("repeat", "count out of range"));
            }
            s.repeat(n as usize).into()
        }
        "padStart" | "padEnd" => {
            let width = arg(args, 0).to_number().max(0.0) as usize;
            let fill = if args.len() > 1 { text(1) } else { " ".to_string() };
            let len = s.chars().count();
            if width <= len || fill.is_empty() {
                s.into()
            } else {
                let pad: String = fill.chars().cycle().take(width - len).collect();
                if name == "padStart" {
                    format!("{}{}", pad, s).into()
                } else {
                    format!("{}{}", s, pad).into()
                }
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Methods on number receivers
pub fn number_method(n: f64, name: &str, args: &[Value]) -> Result<Option<Value>> {
    let value = match name {
        "toFixed" => {
            let digits = arg(args, 0).to_number();
            if !(0.0..=100.0).contains(&digits) {
                return Err(TemplateError::bad_args("toFixed", "digits out of range"));
            }
            format!("{:.*}", digits as usize, n).into()
        }
        "toString" => format_number(n).into(),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: Option<Value>) -> String {
        v.unwrap().to_js_string()
    }

    #[test]
    fn test_string_slice_negative() {
        let r = string_method("hello", "slice", &[Value::Number(-3.0)]).unwrap();
        assert_eq!(s(r), "llo");
        let r = string_method("hello", "slice", &[Value::Number(1.0), Value::Number(3.0)]).unwrap();
        assert_eq!(s(r), "el");
    }

    #[test]
    fn test_substring_clamps_negative_and_swaps() {
        let sub = |args: &[Value]| s(string_method("abc", "substring", args).unwrap());
        assert_eq!(sub(&[Value::Number(-1.0)]), "abc");
        assert_eq!(sub(&[Value::Number(f64::NAN), Value::Number(2.0)]), "ab");
        assert_eq!(sub(&[Value::Number(2.0), Value::Number(-5.0)]), "ab");
        assert_eq!(sub(&[Value::Number(2.0), Value::Number(0.0)]), "ab");
        assert_eq!(sub(&[Value::Number(1.0), Value::Number(10.0)]), "bc");
    }

    #[test]
    fn test_split_and_replace() {
        let r = string_method("a-b-c", "split", &["-".into()]).unwrap();
        assert_eq!(s(r), "a,b,c");
        let r = string_method("a-b-c", "replace", &["-".into(), "+".into()]).unwrap();
        assert_eq!(s(r), "a+b-c");
        let r = string_method("a-b-c", "replaceAll", &["-".into(), "+".into()]).unwrap();
        assert_eq!(s(r), "a+b+c");
    }

    #[test]
    fn test_unknown_method_is_none() {
        assert!(string_method("x", "nope", &[]).unwrap().is_none());
        assert!(number_method(1.0, "nope", &[]).unwrap().is_none());
    }

    #[test]
    fn test_to_fixed() {
        let r = number_method(3.14159, "toFixed", &[Value::Number(2.0)]).unwrap();
        assert_eq!(s(r), "3.14");
    }

    #[test]
    fn test_parse_int_and_float() {
        assert_eq!(parse_int("42px"), 42.0);
        assert_eq!(parse_int("-7"), -7.0);
        assert!(parse_int("px").is_nan());
        assert_eq!(parse_float("2.5rem"), 2.5);
    }

    #[test]
    fn test_globals_are_objects_of_functions() {
        let math = global("Math").unwrap();
        assert!(matches!(math.get_property("floor"), Some(Value::Function(_))));
        assert!(global("process").is_none());
        assert!(global("require").is_none());
    }

    #[test]
    fn test_to_json_drops_functions() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Number(1.0));
        map.insert(
            "f".to_string(),
            Function::native("f", |_| Ok(Value::Null)).into(),
        );
        let json = to_json(&Value::object(map));
        assert_eq!(json.to_string(), r#"{"a":1.0}"#.replace("1.0", "1"));
    }
}
