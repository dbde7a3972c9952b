//! Content loader - loads posts and pages from the public directory

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::frontmatter::extract_frontmatter_and_data;
use super::post::parse_file_name;
use super::{MarkdownRenderer, Page, Post};
use crate::Site;

/// Read a whole file as text; any failure is reported as `None`
pub fn read_entire_file(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::debug!("Could not read {:?}: {}", path, e);
            None
        }
    }
}

/// Read every markdown file directly inside `dir`, in file name order
pub fn scan_markdown_files(dir: &Path) -> Vec<(PathBuf, Option<String>)> {
    if !dir.exists() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_markdown_file(e.path()))
        .map(|e| {
            let path = e.into_path();
            let content = read_entire_file(&path);
            (path, content)
        })
        .collect()
}

/// Loads posts and pages for a site
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        let renderer = MarkdownRenderer::from_config(&site.config.highlight);
        Self { site, renderer }
    }

    /// Load all posts, ordered by file name
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        self.load_dir(&self.site.posts_dir)
    }

    /// Load all pages, ordered by file name
    pub fn load_pages(&self) -> Result<Vec<Page>> {
        self.load_dir(&self.site.pages_dir)
    }

    fn load_dir(&self, dir: &Path) -> Result<Vec<Post>> {
        let mut posts = Vec::new();

        for (path, content) in scan_markdown_files(dir) {
            let Some(content) = content else {
                tracing::warn!("Skipping unreadable file {:?}", path);
                continue;
            };
            let Some(post) = self.load_post(&path, &content)? else {
                continue;
            };
            if post.is_draft() && !self.site.config.render_drafts {
                tracing::debug!("Skipping draft {:?}", path);
                continue;
            }
            posts.push(post);
        }

        tracing::debug!("Loaded {} documents from {:?}", posts.len(), dir);
        Ok(posts)
    }

    /// Parse one document; `None` when the file name has no id prefix
    fn load_post(&self, path: &Path, content: &str) -> Result<Option<Post>> {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let Some((id, slug)) = parse_file_name(name) else {
            tracing::warn!("Skipping {:?}: expected a name like 1-my-post.md", path);
            return Ok(None);
        };

        let (fields, body) = extract_frontmatter_and_data(content);

        let mut post = Post::new(id, slug);
        post.html = self.renderer.render(body.trim())?;
        post.fields = fields.unwrap_or_default();
        post.source = path.to_path_buf();
        Ok(Some(post))
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "md")
}
