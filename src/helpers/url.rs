//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped in URL paths; `/` is kept
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

/// Site-root URL for a path; external URLs pass through unchanged
///
/// # Examples
/// ```ignore
/// url_for("about") // -> "/about"
/// url_for("/my post.html") // -> "/my%20post.html"
/// ```
pub fn url_for(path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }
    let path = path.trim_start_matches('/');
    format!("/{}", utf8_percent_encode(path, PATH))
}

/// Full URL including the configured site URL
///
/// # Examples
/// ```ignore
/// full_url_for("https://example.com/", "/about") // -> "https://example.com/about"
/// ```
pub fn full_url_for(base: &str, path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }
    format!("{}{}", base.trim_end_matches('/'), url_for(path))
}
