//! Build context assembly
//!
//! One base [`Context`] is built per run. Each page gets its own context
//! derived from it by copy-with-overrides.

use indexmap::IndexMap;
use std::path::{Component, Path, PathBuf};

use crate::config::SiteConfig;
use crate::content::{read_entire_file, Page, Post};
use crate::helpers;
use crate::template::builtins::arg;
use crate::template::{evaluate, parse_expression, Context, TemplateError, Value};

/// Values every page can see, before the script hash is known
pub struct SiteData {
    /// Site-level variables: `site`, `title`, `posts`, `pages`, helpers, globals
    pub context: Context,
    /// Variables inlined into the client script, in declaration order
    /// before reversal
    pub client: IndexMap<String, Value>,
}

/// Assemble the shared context and the client variables.
///
/// Config helpers are compiled here and evaluated against the shared
/// context, so they can use posts, globals and native helpers.
pub fn site_data(
    config: &SiteConfig,
    public_dir: &Path,
    posts: &[Post],
    pages: &[Page],
) -> Result<SiteData, TemplateError> {
    let posts = Value::array(posts.iter().map(Post::to_value).collect());
    let pages = Value::array(pages.iter().map(Page::to_value).collect());

    let mut site = IndexMap::new();
    site.insert("title".to_string(), Value::from(config.title.as_str()));
    site.insert("description".to_string(), Value::from(config.description.as_str()));
    site.insert("author".to_string(), Value::from(config.author.as_str()));
    site.insert("url".to_string(), Value::from(config.url.as_str()));

    let globals: Vec<(String, Value)> = config
        .globals
        .iter()
        .map(|(k, v)| (k.clone(), Value::from_json(v)))
        .collect();

    let base = Context::new()
        .with("site", Value::object(site))
        .with("title", config.title.as_str())
        .with("posts", posts.clone())
        .with("pages", pages.clone())
        .with_function("read", read_accessor(public_dir.to_path_buf()))
        .extend(globals.iter().cloned());
    let mut context = helpers::register(&base, config);

    let mut compiled = Vec::with_capacity(config.helpers.len());
    for (name, source) in &config.helpers {
        let value = parse_expression(source)
            .and_then(|expr| evaluate(&expr, &context))
            .map_err(|e| TemplateError::InExpression {
                expr: format!("helpers.{}", name),
                source: Box::new(e),
            })?;
        context = context.with(name, value.clone());
        compiled.push((name.clone(), value));
    }

    let mut client = IndexMap::new();
    client.extend(globals);
    client.extend(compiled);
    client.insert("pages".to_string(), pages);
    client.insert("posts".to_string(), posts);

    Ok(SiteData { context, client })
}

/// Add the stylesheet and script hash once the client script is final
pub fn with_assets(ctx: &Context, css: &str, js_hash: &str) -> Context {
    ctx.with("css", css).with("js_hash", js_hash)
}

/// Context for a post page
pub fn post_context(base: &Context, post: &Post) -> Context {
    base.extend([
        ("title", Value::from(post.title())),
        ("post", post.to_value()),
    ])
}

/// Context for a standalone page; it is bound as both `page` and `post`
pub fn page_context(base: &Context, page: &Page) -> Context {
    let value = page.to_value();
    base.extend([
        ("title", Value::from(page.title())),
        ("page", value.clone()),
        ("post", value),
    ])
}

/// Context for the shell template wrapping a rendered body
pub fn shell_context(page_ctx: &Context, content: String) -> Context {
    page_ctx.with("content", content)
}

/// `read(path)`: text of a file under `root`, or null when it is missing
/// or the path leaves `root`
fn read_accessor(root: PathBuf) -> impl Fn(&[Value]) -> crate::template::Result<Value> {
    move |args| {
        let rel = arg(args, 0).to_output_string();
        let rel = rel.trim_start_matches('/');
        let inside = Path::new(rel)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if rel.is_empty() || !inside {
            tracing::warn!("read() refused path outside the public directory: {:?}", rel);
            return Ok(Value::Null);
        }
        Ok(read_entire_file(&root.join(rel))
            .map(Value::from)
            .unwrap_or_default())
    }
}
