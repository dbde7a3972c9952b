//! Generator module - runs the build pipeline and writes the output directory

mod assemble;
mod css;
mod inline;
mod output;

pub use assemble::{page_context, post_context, shell_context, site_data, with_assets, SiteData};
pub use css::minify_css;
pub use inline::{inline_globals, InlineError};
pub use output::OutputSet;

use anyhow::{Context as _, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::{read_entire_file, ContentLoader};
use crate::template::{Context, Templates};
use crate::Site;

/// Client runtime used when the site has no script of its own
pub const DEFAULT_RUNTIME: &str = include_str!("../../assets/runtime.js");

/// Legacy cache-busting placeholders replaced by the script hash
const HASH_PLACEHOLDERS: [&str; 2] = ["__JS_HASH__", "__RANDOM__"];

/// Summary of a finished build
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub posts: usize,
    pub pages: usize,
    pub files: usize,
    pub js_hash: String,
}

/// Hex SHA-256 of the final client script
pub fn hash_script(script: &str) -> String {
    hex::encode(Sha256::digest(script.as_bytes()))
}

/// Static site generator
pub struct Generator<'a> {
    site: &'a Site,
}

impl<'a> Generator<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Build the site and replace the output directory with the result.
    ///
    /// The output directory is only touched once every file has been
    /// computed, so a failed build leaves the previous output in place.
    pub fn generate(&self) -> Result<BuildReport> {
        let start = std::time::Instant::now();
        let (outputs, report) = self.render()?;
        outputs.write_to(&self.site.output_dir)?;

        tracing::info!(
            "Generated {} files ({} posts, {} pages) in {:.2}s",
            report.files,
            report.posts,
            report.pages,
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Compute every output file in memory
    pub fn render(&self) -> Result<(OutputSet, BuildReport)> {
        let site = self.site;
        let config = &site.config;

        let loader = ContentLoader::new(site);
        let posts = loader.load_posts()?;
        let pages = loader.load_pages()?;
        tracing::info!("Loaded {} posts and {} pages", posts.len(), pages.len());

        let templates = self.load_templates()?;
        let css = self.load_stylesheet();
        let script = self.load_script();

        let data = site_data(config, &site.public_dir, &posts, &pages)
            .context("Failed to assemble the build context")?;
        let js = inline_globals(&script, &data.client).context("Failed to inline globals")?;
        let js_hash = hash_script(&js);
        let base = with_assets(&data.context, &css, &js_hash);

        let mut outputs = OutputSet::new();
        self.copy_assets(&mut outputs)?;
        outputs.insert(config.script.clone(), js);

        let finish = Finisher {
            templates: &templates,
            css: &css,
            js_hash: &js_hash,
            stylesheet_link: format!("<link rel=\"stylesheet\" href=\"./{}\" />", config.stylesheet),
        };

        if templates.contains("post") {
            for post in &posts {
                let ctx = post_context(&base, post);
                let html = finish
                    .page("post", &ctx)
                    .with_context(|| format!("Failed to render post {:?}", post.source))?;
                outputs.insert(post.output_path(), html);
            }
        } else if !posts.is_empty() {
            tracing::warn!("No post template found; skipping {} posts", posts.len());
        }

        let page_template = if templates.contains("page") { "page" } else { "post" };
        if templates.contains(page_template) {
            for page in &pages {
                let ctx = page_context(&base, page);
                let html = finish
                    .page(page_template, &ctx)
                    .with_context(|| format!("Failed to render page {:?}", page.source))?;
                outputs.insert(page.output_path(), html);
            }
        } else if !pages.is_empty() {
            tracing::warn!("No page template found; skipping {} pages", pages.len());
        }

        if templates.contains("home") {
            let html = finish
                .page("home", &base)
                .context("Failed to render the home page")?;
            outputs.insert("index.html", html);
        } else {
            tracing::warn!("No home template found; index.html not generated");
        }

        let report = BuildReport {
            posts: posts.len(),
            pages: pages.len(),
            files: outputs.len(),
            js_hash,
        };
        Ok((outputs, report))
    }

    /// Templates from the templates directory; a legacy `index.html` in the
    /// source directory serves as `home` when there is no home template.
    fn load_templates(&self) -> Result<Templates> {
        let mut templates = Templates::load(&self.site.templates_dir)
            .with_context(|| format!("Failed to load templates from {:?}", self.site.templates_dir))?;

        if !templates.contains("home") {
            let legacy = self.site.src_dir.join("index.html");
            if let Some(text) = read_entire_file(&legacy) {
                tracing::debug!("Using {:?} as the home template", legacy);
                templates
                    .insert("home", &text)
                    .with_context(|| format!("Failed to compile {:?}", legacy))?;
            }
        }
        Ok(templates)
    }

    fn load_stylesheet(&self) -> String {
        let path = self.site.src_dir.join(&self.site.config.stylesheet);
        let Some(css) = read_entire_file(&path) else {
            tracing::debug!("No stylesheet at {:?}", path);
            return String::new();
        };
        if self.site.config.minify_css {
            minify_css(&css)
        } else {
            css
        }
    }

    fn load_script(&self) -> String {
        let path = self.site.src_dir.join(&self.site.config.script);
        read_entire_file(&path).unwrap_or_else(|| {
            tracing::debug!("No script at {:?}; using the default runtime", path);
            DEFAULT_RUNTIME.to_string()
        })
    }

    /// Add every static asset under the public directory.
    ///
    /// Paths with a component starting with `_` (posts, pages) and paths
    /// matching an `exclude` pattern are skipped.
    fn copy_assets(&self, outputs: &mut OutputSet) -> Result<()> {
        let public_dir = &self.site.public_dir;
        if !public_dir.exists() {
            return Ok(());
        }

        let excludes = self
            .site
            .config
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {}", p)))
            .collect::<Result<Vec<_>>>()?;

        for entry in WalkDir::new(public_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(public_dir)?;
            if is_private(relative) || excludes.iter().any(|p| p.matches_path(relative)) {
                continue;
            }

            let contents = fs::read(path).with_context(|| format!("Failed to read asset {:?}", path))?;
            outputs.insert(relative.to_string_lossy().replace('\\', "/"), contents);
        }
        Ok(())
    }
}

/// Renders a page body and wraps it in the shell
struct Finisher<'t> {
    templates: &'t Templates,
    css: &'t str,
    js_hash: &'t str,
    stylesheet_link: String,
}

impl Finisher<'_> {
    fn page(&self, template: &str, ctx: &Context) -> Result<String> {
        let body = self.templates.render(template, ctx)?;
        let html = if self.templates.contains("shell") {
            self.templates.render("shell", &shell_context(ctx, body))?
        } else {
            body
        };
        Ok(self.finalize(html))
    }

    fn finalize(&self, html: String) -> String {
        let mut html = html.replace(&self.stylesheet_link, &format!("<style>{}</style>", self.css));
        for placeholder in HASH_PLACEHOLDERS {
            html = html.replace(placeholder, self.js_hash);
        }
        html
    }
}

/// Whether a path relative to the public directory is a pipeline input
fn is_private(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SHELL: &str = r#"<html><head><link rel="stylesheet" href="./index.css" /></head><body>{content}<script src="index.js?v=__JS_HASH__"></script></body></html>"#;

    fn write(root: &Path, path: &str, contents: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn sample_site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "public/_posts/1-hello.md", "First");
        write(root, "public/_posts/2-world.md", "---\ntitle: World\n---\nSecond");
        write(root, "public/_pages/1-about.md", "---\ntitle: About\n---\nMe");
        write(root, "public/img/logo.svg", "<svg/>");
        write(root, "src/index.css", "body {\n  color: #ffffff;\n}\n");
        write(root, "src/templates/post.html", "<article><h1>{title}</h1>{post.html}</article>");
        write(
            root,
            "src/templates/home.html",
            "<ul>{posts.map(p => `<li>${p.title}</li>`)}</ul>",
        );
        write(root, "src/templates/shell.html", SHELL);
        dir
    }

    fn output(set: &OutputSet, path: &str) -> String {
        String::from_utf8(set.get(path).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn test_end_to_end_posts_in_file_name_order() {
        let dir = sample_site();
        let site = Site::new(dir.path()).unwrap();
        let (set, report) = Generator::new(&site).render().unwrap();

        assert_eq!(report.posts, 2);
        assert_eq!(report.pages, 1);

        let js = output(&set, "index.js");
        assert!(js.starts_with("const posts = [{\"id\":1,\"slug\":\"hello\",\"title\":\"hello\""));
        assert!(js.contains("{\"id\":2,\"slug\":\"world\",\"title\":\"World\""));
        assert!(js.contains("\nconst pages = [{\"id\":1,\"slug\":\"about\""));
        assert!(js.ends_with(DEFAULT_RUNTIME));
        assert_eq!(report.js_hash, hash_script(&js));
    }

    #[test]
    fn test_pages_are_wrapped_in_shell() {
        let dir = sample_site();
        let site = Site::new(dir.path()).unwrap();
        let (set, report) = Generator::new(&site).render().unwrap();

        let world = output(&set, "world.html");
        assert!(world.starts_with("<html><head><style>body{color:#fff}</style></head><body>"));
        assert!(world.contains("<h1>World</h1>"));
        assert!(world.contains("<p>Second</p>"));
        assert!(world.contains(&format!("index.js?v={}", report.js_hash)));
        assert!(!world.contains("__JS_HASH__"));

        let home = output(&set, "index.html");
        assert!(home.contains("<ul><li>hello</li>\n<li>World</li></ul>"));

        // pages fall back to the post template
        assert!(output(&set, "about.html").contains("<h1>About</h1>"));
    }

    #[test]
    fn test_assets_are_copied_except_private_and_excluded() {
        let dir = sample_site();
        write(dir.path(), "public/drafts/wip.txt", "wip");
        write(dir.path(), "_config.yml", "exclude:\n  - \"drafts/**\"\n");
        let site = Site::new(dir.path()).unwrap();
        let (set, _) = Generator::new(&site).render().unwrap();

        assert_eq!(output(&set, "img/logo.svg"), "<svg/>");
        assert!(!set.contains("drafts/wip.txt"));
        assert!(set.paths().all(|p| !p.starts_with('_')));
    }

    #[test]
    fn test_build_is_deterministic() {
        let dir = sample_site();
        let site = Site::new(dir.path()).unwrap();
        let (first, _) = Generator::new(&site).render().unwrap();
        let (second, _) = Generator::new(&site).render().unwrap();
        assert_eq!(first.paths().collect::<Vec<_>>(), second.paths().collect::<Vec<_>>());
        for path in first.paths() {
            assert_eq!(first.get(path), second.get(path));
        }
    }

    #[test]
    fn test_failed_build_keeps_previous_output() {
        let dir = sample_site();
        write(dir.path(), "build/old.html", "old");
        write(dir.path(), "src/templates/post.html", "<h1>{title</h1>");
        let site = Site::new(dir.path()).unwrap();

        let err = Generator::new(&site).generate().unwrap_err();
        assert!(format!("{:#}", err).contains("Unmatched '{'"));
        assert!(dir.path().join("build/old.html").exists());
    }

    #[test]
    fn test_generate_writes_output_directory() {
        let dir = sample_site();
        write(dir.path(), "build/stale.html", "stale");
        let site = Site::new(dir.path()).unwrap();
        let report = Generator::new(&site).generate().unwrap();

        let build = dir.path().join("build");
        assert!(!build.join("stale.html").exists());
        assert!(build.join("index.html").exists());
        assert!(build.join("hello.html").exists());
        assert_eq!(report.files, 6);
    }

    #[test]
    fn test_legacy_home_template() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/index.html", "<p>{posts.length} posts</p>");
        write(dir.path(), "public/_posts/1-a.md", "a");
        let site = Site::new(dir.path()).unwrap();
        let (set, _) = Generator::new(&site).render().unwrap();
        assert_eq!(output(&set, "index.html"), "<p>1 posts</p>");
        // no post template: only the home page and the script
        assert!(!set.contains("a.html"));
    }

    #[test]
    fn test_site_script_replaces_default_runtime() {
        let dir = sample_site();
        write(dir.path(), "src/index.js", "start(posts);");
        let site = Site::new(dir.path()).unwrap();
        let (set, _) = Generator::new(&site).render().unwrap();
        assert!(output(&set, "index.js").ends_with("\n\nstart(posts);"));
    }

    #[test]
    fn test_slug_override_stays_inside_output() {
        let dir = sample_site();
        let root = dir.path();
        write(root, "public/_posts/3-a.md", "---\nslug: ../escaped\n---\nA");
        write(root, "public/_posts/4-b.md", "---\nslug: 42\n---\nB");
        let site = Site::new(root).unwrap();
        let (set, _) = Generator::new(&site).render().unwrap();

        assert!(set.paths().all(|p| !p.contains("..")));
        assert!(set.contains("a.html"));
        assert!(set.contains("42.html"));
        assert!(!set.contains("b.html"));
        let js = output(&set, "index.js");
        assert!(js.contains("{\"id\":3,\"slug\":\"a\""));
        assert!(js.contains("{\"id\":4,\"slug\":\"42\""));

        Generator::new(&site).generate().unwrap();
        assert!(!root.join("escaped.html").exists());
        assert!(site.output_dir.join("a.html").exists());
    }

    #[test]
    fn test_unreadable_inputs_do_not_fail_the_build() {
        let dir = sample_site();
        let root = dir.path();
        fs::write(root.join("public/_posts/3-bad.md"), [0xff, 0xfe, 0xfd]).unwrap();
        fs::write(root.join("src/templates/page.html"), [0xc3, b'{', 0xff]).unwrap();
        let site = Site::new(root).unwrap();

        let report = Generator::new(&site).generate().unwrap();
        assert_eq!(report.posts, 2);
        assert!(!site.output_dir.join("bad.html").exists());
        // unreadable page template falls back to the post template
        let about = fs::read_to_string(site.output_dir.join("about.html")).unwrap();
        assert!(about.contains("<h1>About</h1>"));
    }
}
