//! Global inlining: prepend build-time values to the client script as
//! literal `const` declarations

use indexmap::IndexMap;
use thiserror::Error;

use crate::template::{format_number, Value};

/// Deepest nesting written before giving up
const MAX_DEPTH: usize = 64;

#[derive(Error, Debug)]
pub enum InlineError {
    #[error("Cannot inline {path}: native function '{name}' has no source")]
    NativeFunction { path: String, name: String },

    #[error("Cannot inline {path}: {value} has no literal form")]
    NonFinite { path: String, value: String },

    #[error("Cannot inline {path}: value is nested too deeply")]
    TooDeep { path: String },
}

/// Prefix `script` with one `const` per variable, last variable first.
///
/// Data values become JSON-style literals and closures become their source
/// text. The script itself is appended unmodified after a blank line.
pub fn inline_globals(script: &str, variables: &IndexMap<String, Value>) -> Result<String, InlineError> {
    let mut out = String::new();
    for (name, value) in variables.iter().rev() {
        out.push_str("const ");
        out.push_str(name);
        out.push_str(" = ");
        write_literal(&mut out, value, name, 0)?;
        out.push_str(";\n");
    }
    out.push('\n');
    out.push_str(script);
    Ok(out)
}

fn write_literal(out: &mut String, value: &Value, path: &str, depth: usize) -> Result<(), InlineError> {
    if depth > MAX_DEPTH {
        return Err(InlineError::TooDeep {
            path: path.to_string(),
        });
    }
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) if n.is_finite() => out.push_str(&format_number(*n)),
        Value::Number(n) => {
            return Err(InlineError::NonFinite {
                path: path.to_string(),
                value: format_number(*n),
            })
        }
        Value::String(s) => push_json_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_literal(out, item, &format!("{}[{}]", path, i), depth + 1)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_json_string(out, key);
                out.push(':');
                write_literal(out, item, &format!("{}.{}", path, key), depth + 1)?;
            }
            out.push('}');
        }
        Value::Function(func) => match func.source() {
            Some(source) => out.push_str(source),
            None => {
                return Err(InlineError::NativeFunction {
                    path: path.to_string(),
                    name: func.name().to_string(),
                })
            }
        },
    }
    Ok(())
}

fn push_json_string(out: &mut String, s: &str) {
    // serializing a str cannot fail
    out.push_str(&serde_json::Value::from(s).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{evaluate, parse_expression, Context};

    fn vars(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_reverse_declaration_order() {
        let out = inline_globals(
            "main();",
            &vars(&[("a", Value::Number(1.0)), ("b", Value::Number(2.0))]),
        )
        .unwrap();
        assert_eq!(out, "const b = 2;\nconst a = 1;\n\nmain();");
        assert!(out.find("const b").unwrap() < out.find("const a").unwrap());
    }

    #[test]
    fn test_matches_single_posts_preamble() {
        let post = evaluate(
            &parse_expression("({id: 1, slug: 'hello', html: '<p>\"hi\"</p>'})").unwrap(),
            &Context::new(),
        )
        .unwrap();
        let out = inline_globals("run()", &vars(&[("posts", Value::array(vec![post]))])).unwrap();
        assert_eq!(
            out,
            "const posts = [{\"id\":1,\"slug\":\"hello\",\"html\":\"<p>\\\"hi\\\"</p>\"}];\n\nrun()"
        );
    }

    #[test]
    fn test_closures_inline_as_source() {
        let f = evaluate(&parse_expression("p => '/' + p.slug").unwrap(), &Context::new()).unwrap();
        let out = inline_globals("", &vars(&[("post_url", f)])).unwrap();
        assert_eq!(out, "const post_url = p => '/' + p.slug;\n\n");
    }

    #[test]
    fn test_native_function_fails() {
        let ctx = Context::new().with_function("read", |_| Ok(Value::Null));
        let read = ctx.get("read").unwrap().clone();
        let err = inline_globals("", &vars(&[("helpers", Value::array(vec![read]))])).unwrap_err();
        match err {
            InlineError::NativeFunction { path, name } => {
                assert_eq!(path, "helpers[0]");
                assert_eq!(name, "read");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_number_fails() {
        let err = inline_globals("", &vars(&[("n", Value::Number(f64::NAN))])).unwrap_err();
        assert!(matches!(err, InlineError::NonFinite { .. }));
    }

    #[test]
    fn test_deep_nesting_fails() {
        let mut v = Value::Null;
        for _ in 0..(MAX_DEPTH + 2) {
            v = Value::array(vec![v]);
        }
        assert!(matches!(
            inline_globals("", &vars(&[("deep", v)])),
            Err(InlineError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_script_is_unmodified() {
        let script = "const x = `{not an expression}`;\n";
        let out = inline_globals(script, &IndexMap::new()).unwrap();
        assert_eq!(out, format!("\n{}", script));
    }
}
