//! Site configuration (_config.yml)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};

use super::ConfigError;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,

    // Directory
    /// Static assets copied to the output; also holds `posts_dir` and `pages_dir`
    pub public_dir: String,
    /// Pipeline inputs: shell script, stylesheet and `templates_dir`
    pub src_dir: String,
    pub output_dir: String,
    pub posts_dir: String,
    pub pages_dir: String,
    pub templates_dir: String,
    pub script: String,
    pub stylesheet: String,
    /// Glob patterns (relative to `public_dir`) never copied to the output
    pub exclude: Vec<String>,

    // Writing
    pub render_drafts: bool,
    pub minify_css: bool,
    pub highlight: HighlightConfig,

    // Server
    pub server: ServerConfig,

    /// Extra values exposed to templates and inlined into the client script
    pub globals: IndexMap<String, serde_json::Value>,

    /// Expression helpers, e.g. `post_url: "p => '/' + p.slug"`
    pub helpers: IndexMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Pressroom".to_string(),
            description: String::new(),
            author: String::new(),
            url: "http://localhost:8080".to_string(),

            public_dir: "public".to_string(),
            src_dir: "src".to_string(),
            output_dir: "build".to_string(),
            posts_dir: "_posts".to_string(),
            pages_dir: "_pages".to_string(),
            templates_dir: "templates".to_string(),
            script: "index.js".to_string(),
            stylesheet: "index.css".to_string(),
            exclude: Vec::new(),

            render_drafts: false,
            minify_css: true,
            highlight: HighlightConfig::default(),

            server: ServerConfig::default(),

            globals: IndexMap::new(),
            helpers: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate configuration text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = if content.trim().is_empty() {
            SiteConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: Default::default(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make a build unsafe or emit invalid script
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dirs = [
            ("public_dir", &self.public_dir),
            ("src_dir", &self.src_dir),
            ("output_dir", &self.output_dir),
            ("posts_dir", &self.posts_dir),
            ("pages_dir", &self.pages_dir),
            ("templates_dir", &self.templates_dir),
        ];
        for (name, dir) in dirs {
            let components: Vec<_> = Path::new(dir).components().collect();
            let normal = components
                .iter()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
                && components.iter().any(|c| matches!(c, Component::Normal(_)));
            if !normal {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a relative path inside the site, got {:?}",
                    name, dir
                )));
            }
        }

        // The output directory is deleted on every build
        if self.output_dir == self.public_dir || self.output_dir == self.src_dir {
            return Err(ConfigError::Invalid(format!(
                "output_dir {:?} must differ from public_dir and src_dir",
                self.output_dir
            )));
        }

        for name in self.globals.keys().chain(self.helpers.keys()) {
            if !is_identifier(name) {
                return Err(ConfigError::Invalid(format!(
                    "{:?} is not a valid variable name",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}

/// Dev server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub ip: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            ip: "localhost".to_string(),
        }
    }
}
