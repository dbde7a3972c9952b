//! pressroom: a static site builder with brace-expression templates
//!
//! Markdown posts and pages are rendered through `.html` templates whose
//! `{...}` spans are evaluated as expressions against a build context.
//! The post list is inlined into a client script that routes between the
//! pre-rendered pages without full reloads.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod template;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// A site rooted at a directory, with its resolved input and output paths
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory holding `_config.yml`
    pub base_dir: PathBuf,
    /// Static assets, posts and pages
    pub public_dir: PathBuf,
    /// Script, stylesheet and templates
    pub src_dir: PathBuf,
    /// Build output
    pub output_dir: PathBuf,
    pub posts_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub templates_dir: PathBuf,
}

impl Site {
    /// Open the site in `base_dir`; a missing `_config.yml` means defaults
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)
                .with_context(|| format!("Failed to load {:?}", config_path))?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Resolve paths for an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        let src_dir = base_dir.join(&config.src_dir);
        let output_dir = base_dir.join(&config.output_dir);
        let posts_dir = public_dir.join(&config.posts_dir);
        let pages_dir = public_dir.join(&config.pages_dir);
        let templates_dir = src_dir.join(&config.templates_dir);

        Self {
            config,
            base_dir,
            public_dir,
            src_dir,
            output_dir,
            posts_dir,
            pages_dir,
            templates_dir,
        }
    }

    /// Scaffold a new site in the base directory
    pub fn init(&self) -> Result<()> {
        commands::init::init_site(&self.base_dir)
    }

    /// Build the site into the output directory
    pub fn build(&self) -> Result<generator::BuildReport> {
        commands::generate::run(self)
    }

    /// Remove the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post, or a page with `page` set
    pub fn new_post(&self, title: &str, page: bool) -> Result<PathBuf> {
        commands::new::create_post(self, title, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.posts_dir, dir.path().join("public/_posts"));
        assert_eq!(site.pages_dir, dir.path().join("public/_pages"));
        assert_eq!(site.templates_dir, dir.path().join("src/templates"));
        assert_eq!(site.output_dir, dir.path().join("build"));
    }

    #[test]
    fn test_config_changes_layout() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "public_dir: static\noutput_dir: dist\n",
        )
        .unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.posts_dir, dir.path().join("static/_posts"));
        assert_eq!(site.output_dir, dir.path().join("dist"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_config.yml"), "output_dir: public\n").unwrap();
        assert!(Site::new(dir.path()).is_err());
    }
}
