//! Post and Page models

use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use super::frontmatter::{Frontmatter, Scalar};
use crate::template::{format_number, Value};

/// A markdown document named `<id>-<slug>.md`
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Numeric prefix of the file name
    pub id: i64,

    /// File name without the id prefix and `.md` extension
    pub slug: String,

    /// Rendered HTML body
    pub html: String,

    /// Front-matter fields
    #[serde(flatten)]
    pub fields: Frontmatter,

    /// Full source file path
    #[serde(skip)]
    pub source: PathBuf,
}

/// Pages share the post model; they live in their own directory and
/// render through the `page` template.
pub type Page = Post;

impl Post {
    pub fn new(id: i64, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            html: String::new(),
            fields: Frontmatter::new(),
            source: PathBuf::new(),
        }
    }

    /// `title` from front-matter, falling back to the slug
    pub fn title(&self) -> &str {
        self.fields
            .get("title")
            .and_then(Scalar::as_str)
            .unwrap_or(&self.slug)
    }

    pub fn is_draft(&self) -> bool {
        self.fields
            .get("draft")
            .and_then(Scalar::as_bool)
            .unwrap_or(false)
    }

    /// Slug as seen by templates, the client router and the output file.
    ///
    /// A string or number `slug` front-matter field takes precedence over
    /// the file name when it is a single plain path segment.
    pub fn route(&self) -> String {
        let custom = match self.fields.get("slug") {
            Some(Scalar::String(s)) => s.clone(),
            Some(Scalar::Number(n)) => format_number(*n),
            Some(Scalar::Bool(_)) | None => return self.slug.clone(),
        };
        if is_plain_segment(&custom) {
            custom
        } else {
            tracing::warn!(
                "Ignoring slug {:?} in {:?}; using {:?}",
                custom,
                self.source,
                self.slug
            );
            self.slug.clone()
        }
    }

    /// Output file name relative to the output root
    pub fn output_path(&self) -> String {
        format!("{}.html", self.route())
    }

    /// Template value: `id`, `slug`, `title`, `html`, then every
    /// front-matter field. Front-matter keys overwrite the generated ones,
    /// except `slug`, which is always [`Post::route`].
    pub fn to_value(&self) -> Value {
        let mut map = IndexMap::new();
        map.insert("id".to_string(), Value::from(self.id));
        map.insert("slug".to_string(), Value::from(self.slug.as_str()));
        map.insert("title".to_string(), Value::from(self.slug.as_str()));
        map.insert("html".to_string(), Value::from(self.html.as_str()));
        for (key, scalar) in &self.fields {
            map.insert(key.clone(), scalar.to_value());
        }
        map.insert("slug".to_string(), Value::from(self.route().as_str()));
        Value::object(map)
    }
}

/// True for a non-empty name that stays in the directory it is joined to
fn is_plain_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    !name.contains(['/', '\\'])
        && matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
}

/// Split `<id>-<slug>.md` into its id and slug.
///
/// The id is the integer before the first `-`; the slug is the rest with a
/// trailing `.md` removed. Returns `None` when there is no integer prefix.
pub fn parse_file_name(name: &str) -> Option<(i64, String)> {
    let (prefix, rest) = name.split_once('-')?;
    let id = prefix.parse::<i64>().ok()?;
    let slug = rest.strip_suffix(".md").unwrap_or(rest);
    Some((id, slug.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_name() {
        assert_eq!(parse_file_name("1-hello.md"), Some((1, "hello".into())));
        assert_eq!(
            parse_file_name("12-my-first-post.md"),
            Some((12, "my-first-post".into()))
        );
        assert_eq!(parse_file_name("007-bond.md"), Some((7, "bond".into())));
        assert_eq!(parse_file_name("hello.md"), None);
        assert_eq!(parse_file_name("x-hello.md"), None);
    }

    #[test]
    fn test_title_falls_back_to_slug() {
        let mut post = Post::new(1, "hello");
        assert_eq!(post.title(), "hello");
        post.fields
            .insert("title".into(), Scalar::String("Hello!".into()));
        assert_eq!(post.title(), "Hello!");
    }

    #[test]
    fn test_to_value_lets_frontmatter_override() {
        let mut post = Post::new(2, "world");
        post.html = "<p>hi</p>".into();
        post.fields.insert("slug".into(), Scalar::String("custom".into()));
        post.fields.insert("weight".into(), Scalar::Number(3.0));

        let value = post.to_value();
        assert_eq!(value.get_property("id").unwrap().to_number(), 2.0);
        assert_eq!(value.get_property("slug").unwrap().to_js_string(), "custom");
        assert_eq!(value.get_property("weight").unwrap().to_number(), 3.0);
        assert_eq!(post.output_path(), "custom.html");
    }

    #[test]
    fn test_unsafe_slug_falls_back_to_file_name() {
        for bad in ["../escaped", "a/b", "..", ".", "", "/abs", r"a\b"] {
            let mut post = Post::new(1, "a");
            post.fields.insert("slug".into(), Scalar::String(bad.into()));
            assert_eq!(post.route(), "a", "{bad:?}");
            assert_eq!(post.output_path(), "a.html");
            assert_eq!(post.to_value().get_property("slug").unwrap().to_js_string(), "a");
        }
    }

    #[test]
    fn test_numeric_slug_is_one_string_everywhere() {
        let mut post = Post::new(2, "b");
        post.fields.insert("slug".into(), Scalar::Number(42.0));
        assert_eq!(post.output_path(), "42.html");
        let slug = post.to_value().get_property("slug").unwrap();
        assert!(matches!(slug, Value::String(_)));
        assert_eq!(slug.to_js_string(), "42");

        post.fields.insert("slug".into(), Scalar::Bool(true));
        assert_eq!(post.output_path(), "b.html");
        assert_eq!(post.to_value().get_property("slug").unwrap().to_js_string(), "b");
    }

    #[test]
    fn test_serialize_flattens_fields() {
        let mut post = Post::new(1, "hello");
        post.fields.insert("draft".into(), Scalar::Bool(false));
        let json = serde_json::to_string(&post).unwrap();
        assert_eq!(json, r#"{"id":1,"slug":"hello","html":"","draft":false}"#);
    }
}
