//! Balanced brace scanning over template text

use super::error::{Result, TemplateError};

/// Number of characters shown on each side of a bad offset in error messages
const EXCERPT_RADIUS: usize = 24;

/// A balanced `{...}` region of a template.
///
/// `open` is the offset of the opening brace and `close` is one past the
/// matching closing brace, so `&text[open..close]` is the whole span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub open: usize,
    pub close: usize,
}

impl Span {
    /// Text strictly between the braces
    pub fn inner<'t>(&self, text: &'t str) -> &'t str {
        &text[self.open + 1..self.close - 1]
    }
}

/// Find the counterpart of the brace at `start`.
///
/// Scanning runs forward when `text[start]` is `open` and backward when it is
/// `close`. A forward scan returns the offset one past the matching `close`;
/// a backward scan returns the offset of the matching `open`. `Ok(None)` means
/// the braces never balance. Both braces must be ASCII.
pub fn find_matching_brace(text: &str, start: usize, open: u8, close: u8) -> Result<Option<usize>> {
    let bytes = text.as_bytes();
    let direction: isize = match bytes.get(start) {
        Some(&b) if b == open => 1,
        Some(&b) if b == close => -1,
        _ => {
            return Err(TemplateError::InvalidBraceStart {
                offset: start,
                found: text.get(start..).and_then(|s| s.chars().next()),
                open: open as char,
                close: close as char,
            })
        }
    };

    let (forward, backward) = if direction > 0 {
        (open, close)
    } else {
        (close, open)
    };

    let mut depth = 1usize;
    let mut index = start as isize;
    loop {
        index += direction;
        if index < 0 || index as usize >= bytes.len() {
            return Ok(None);
        }
        let b = bytes[index as usize];
        if b == forward {
            depth += 1;
        } else if b == backward {
            depth -= 1;
            if depth == 0 {
                let found = index as usize;
                return Ok(Some(if direction > 0 { found + 1 } else { found }));
            }
        }
    }
}

/// Locate the next expression span at or after `from`.
///
/// A backslash directly before `{` escapes it; escaped braces are reported as
/// `Segment::Escaped` so the caller can emit a literal brace.
pub(crate) fn next_segment(text: &str, from: usize) -> Result<Option<Segment>> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1) == Some(&b'{') => {
                return Ok(Some(Segment::Escaped { backslash: i }));
            }
            b'{' => {
                return match find_matching_brace(text, i, b'{', b'}')? {
                    Some(close) => Ok(Some(Segment::Expression(Span { open: i, close }))),
                    None => Err(TemplateError::UnbalancedBrace {
                        offset: i,
                        excerpt: excerpt(text, i),
                    }),
                };
            }
            _ => i += 1,
        }
    }
    Ok(None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment {
    Expression(Span),
    Escaped { backslash: usize },
}

/// Text surrounding `offset`, clamped to char boundaries
fn excerpt(text: &str, offset: usize) -> String {
    let mut start = offset.saturating_sub(EXCERPT_RADIUS);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (offset + EXCERPT_RADIUS).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].replace('\n', "\\n")
}
