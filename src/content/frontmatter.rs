//! Front-matter parsing
//!
//! A document may start with a header block delimited by `---` lines. The
//! header is a flat list of `key: value` (or `key = value`) lines whose
//! values are typed as strings, numbers or booleans. There is no nesting.

use indexmap::IndexMap;
use serde::Serialize;

use crate::template::{parse_js_number, Value};

const DELIMITER: &str = "---";

/// A typed front-matter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Type a trimmed raw value
    pub fn parse(raw: &str) -> Self {
        if let Some(inner) = unquote(raw) {
            return Scalar::String(inner.to_string());
        }
        match raw {
            "true" | "yes" => return Scalar::Bool(true),
            "false" | "no" => return Scalar::Bool(false),
            _ => {}
        }
        if !raw.contains(' ') {
            if let Some(n) = parse_js_number(raw) {
                return Scalar::Number(n);
            }
        }
        Scalar::String(raw.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(*n),
            Scalar::String(s) => Value::string(s),
        }
    }
}

/// Front-matter fields in the order they appear
pub type Frontmatter = IndexMap<String, Scalar>;

/// Split a document into its front-matter and body.
///
/// Front-matter is recognized only when the document starts with `---` and
/// a second `---` occurs after offset 3. Otherwise the document is returned
/// unchanged as the body.
pub fn extract_frontmatter_and_data(document: &str) -> (Option<Frontmatter>, &str) {
    if !document.starts_with(DELIMITER) {
        return (None, document);
    }
    let close = match document[DELIMITER.len()..].find(DELIMITER) {
        Some(i) if i > 0 => i + DELIMITER.len(),
        _ => return (None, document),
    };
    let header = document[DELIMITER.len()..close].trim();
    let body = &document[close + DELIMITER.len()..];
    (Some(parse_frontmatter(header)), body)
}

/// Parse header lines into typed fields. Lines without a delimiter and
/// lines with an empty key are skipped; later keys overwrite earlier ones.
pub fn parse_frontmatter(header: &str) -> Frontmatter {
    let mut fields = Frontmatter::new();
    for line in header.lines() {
        let delim = match line.find(':') {
            Some(i) if i > 0 => i,
            _ => match line.find('=') {
                Some(i) => i,
                None => continue,
            },
        };
        let key = line[..delim].trim();
        if key.is_empty() {
            tracing::debug!("Skipping front-matter line without a key: {:?}", line);
            continue;
        }
        let value = line[delim + 1..].trim();
        fields.insert(key.to_string(), Scalar::parse(value));
    }
    fields
}

fn unquote(raw: &str) -> Option<&str> {
    let first = raw.chars().next()?;
    if raw.len() >= 2 && (first == '"' || first == '\'') && raw.ends_with(first) {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_with_frontmatter() {
        let doc = "---\ntitle: \"My Post\"\ndraft: true\nweight: 3\n---\n# Body\n";
        let (fm, body) = extract_frontmatter_and_data(doc);
        let fm = fm.unwrap();
        assert_eq!(fm["title"], Scalar::String("My Post".into()));
        assert_eq!(fm["draft"], Scalar::Bool(true));
        assert_eq!(fm["weight"], Scalar::Number(3.0));
        assert_eq!(body, "\n# Body\n");
    }

    #[test]
    fn test_extract_without_frontmatter() {
        let doc = "# Just markdown\n---\nmore";
        assert_eq!(extract_frontmatter_and_data(doc), (None, doc));
        assert_eq!(extract_frontmatter_and_data(""), (None, ""));
    }

    #[test]
    fn test_second_delimiter_must_follow_offset_three() {
        let doc = "------\nbody";
        assert_eq!(extract_frontmatter_and_data(doc), (None, doc));
        let doc = "---\nonly one delimiter";
        assert_eq!(extract_frontmatter_and_data(doc), (None, doc));
    }

    #[test]
    fn test_empty_frontmatter_block() {
        let (fm, body) = extract_frontmatter_and_data("---\n---\nbody");
        assert!(fm.unwrap().is_empty());
        assert_eq!(body, "\nbody");
    }

    #[test]
    fn test_value_typing() {
        let fm = parse_frontmatter(
            "a: yes\nb: no\nc: 2.5\nd: 3 apples\ne: '42'\nf: -1e3\ng: Infinity\nh: 1.0.0",
        );
        assert_eq!(fm["a"], Scalar::Bool(true));
        assert_eq!(fm["b"], Scalar::Bool(false));
        assert_eq!(fm["c"], Scalar::Number(2.5));
        assert_eq!(fm["d"], Scalar::String("3 apples".into()));
        assert_eq!(fm["e"], Scalar::String("42".into()));
        assert_eq!(fm["f"], Scalar::Number(-1000.0));
        assert_eq!(fm["g"], Scalar::String("Infinity".into()));
        assert_eq!(fm["h"], Scalar::String("1.0.0".into()));
    }

    #[test]
    fn test_delimiters() {
        let fm = parse_frontmatter("url: http://x.io/a=b\nlayout = wide\n: orphan\nno delimiter");
        assert_eq!(fm["url"], Scalar::String("http://x.io/a=b".into()));
        assert_eq!(fm["layout"], Scalar::String("wide".into()));
        assert_eq!(fm.len(), 2);
    }

    #[test]
    fn test_leading_colon_falls_back_to_equals() {
        let fm = parse_frontmatter(":weird = value");
        assert_eq!(fm[":weird"], Scalar::String("value".into()));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let fm = parse_frontmatter("title: One\ntitle: Two");
        assert_eq!(fm["title"], Scalar::String("Two".into()));
        assert_eq!(fm.len(), 1);
    }

    #[test]
    fn test_quoted_values_are_verbatim() {
        let fm = parse_frontmatter("a: \"true\"\nb: ' spaced '\nc: \"");
        assert_eq!(fm["a"], Scalar::String("true".into()));
        assert_eq!(fm["b"], Scalar::String(" spaced ".into()));
        assert_eq!(fm["c"], Scalar::String("\"".into()));
    }
}
