//! Content module - handles posts, pages, and content processing

pub mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{extract_frontmatter_and_data, parse_frontmatter, Frontmatter, Scalar};
pub use loader::{read_entire_file, ContentLoader};
pub use markdown::MarkdownRenderer;
pub use post::{parse_file_name, Page, Post};
