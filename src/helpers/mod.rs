//! Helper functions for templates
//!
//! Plain Rust helpers, plus [`register`] which binds them as callable
//! values in a template [`Context`].

pub mod date;
pub mod html;
pub mod url;

pub use date::format_date;
pub use html::{escape_html, strip_html, truncate};
pub use url::{full_url_for, url_for};

use crate::config::SiteConfig;
use crate::template::builtins::arg;
use crate::template::{Context, TemplateError, Value};

/// Bind `escape`, `strip_html`, `truncate`, `url_for`, `full_url_for` and
/// `format_date` in a new context derived from `ctx`
pub fn register(ctx: &Context, config: &SiteConfig) -> Context {
    let base_url = config.url.clone();
    ctx.with_function("escape", |args| {
        Ok(escape_html(&arg(args, 0).to_output_string()).into())
    })
    .with_function("strip_html", |args| {
        Ok(strip_html(&arg(args, 0).to_output_string()).into())
    })
    .with_function("truncate", |args| {
        let length = arg(args, 1).to_number();
        if !length.is_finite() || length < 0.0 {
            return Err(TemplateError::bad_args("truncate", "length must be a non-negative number"));
        }
        let omission = args.get(2).filter(|v| !v.is_null()).map(Value::to_js_string);
        Ok(truncate(&arg(args, 0).to_output_string(), length as usize, omission.as_deref()).into())
    })
    .with_function("url_for", |args| {
        Ok(url_for(&arg(args, 0).to_output_string()).into())
    })
    .with_function("full_url_for", move |args| {
        Ok(full_url_for(&base_url, &arg(args, 0).to_output_string()).into())
    })
    .with_function("format_date", |args| {
        let date = arg(args, 0).to_output_string();
        let format = match arg(args, 1) {
            Value::Null => "YYYY-MM-DD".to_string(),
            other => other.to_js_string(),
        };
        Ok(format_date(&date, &format)
            .map(Value::from)
            .unwrap_or_default())
    })
}
