//! Regex-based stylesheet minifier

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();
    static ref PUNCTUATION: Regex = Regex::new(r"\s*([{}\[\]():;,])\s*").unwrap();
    static ref HEX_COLOR: Regex = Regex::new(r"#([0-9a-fA-F]{6})").unwrap();
    static ref ZERO_UNIT: Regex =
        Regex::new(r":[+\-]?0(rem|em|ec|ex|px|pc|pt|vh|vw|vmin|vmax|%|mm|cm|in)").unwrap();
}

/// Minify a stylesheet: drop comments, whitespace around punctuation and
/// newlines, shorten `#aabbcc` colors and zero lengths, and drop the last
/// semicolon of each block.
pub fn minify_css(css: &str) -> String {
    let css = COMMENT.replace_all(css, "");
    let css = PUNCTUATION.replace_all(&css, "$1");
    let css = HEX_COLOR.replace_all(&css, |caps: &Captures| {
        let hex = caps[1].as_bytes();
        if hex[0] == hex[1] && hex[2] == hex[3] && hex[4] == hex[5] {
            format!(
                "#{}{}{}",
                hex[0] as char, hex[2] as char, hex[4] as char
            )
        } else {
            caps[0].to_string()
        }
    });
    let css = ZERO_UNIT.replace_all(&css, ":0");
    css.replace('\n', "").replace(";}", "}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let css = "/* header */\nbody {\n  color: #ffffff;\n  margin: 0px;\n}\n\na , b { padding : 0.5em ; }\n";
        assert_eq!(minify_css(css), "body{color:#fff;margin:0}a,b{padding:0.5em}");
    }

    #[test]
    fn test_multiline_comments_removed() {
        assert_eq!(minify_css("/* a\n * b\n */p{x:y}"), "p{x:y}");
    }

    #[test]
    fn test_hex_colors_only_shortened_when_paired() {
        assert_eq!(minify_css("a{color:#aabbcc}"), "a{color:#abc}");
        assert_eq!(minify_css("a{color:#abcdef}"), "a{color:#abcdef}");
        assert_eq!(minify_css("a{color:#AaBbCc}"), "a{color:#AaBbCc}");
    }

    #[test]
    fn test_zero_units() {
        assert_eq!(minify_css("a{top:-0px;left:0%;width:0vmax}"), "a{top:0;left:0;width:0}");
        assert_eq!(minify_css("a{top:05px}"), "a{top:05px}");
    }
}
