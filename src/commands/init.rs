//! Scaffold a new site

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::generator::DEFAULT_RUNTIME;

const CONFIG: &str = include_str!("../../assets/_config.yml");
const STYLESHEET: &str = include_str!("../../assets/index.css");
const FIRST_POST: &str = include_str!("../../assets/hello.md");

const TEMPLATES: [(&str, &str); 4] = [
    ("home.html", include_str!("../../assets/templates/home.html")),
    ("post.html", include_str!("../../assets/templates/post.html")),
    ("page.html", include_str!("../../assets/templates/page.html")),
    ("shell.html", include_str!("../../assets/templates/shell.html")),
];

/// Initialize a new site in the given directory.
///
/// Existing files are left untouched, so running it twice is harmless.
pub fn init_site(target_dir: &Path) -> Result<()> {
    for dir in ["public/_posts", "public/_pages", "src/templates"] {
        let dir = target_dir.join(dir);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }

    let now = chrono::Local::now();
    let first_post = FIRST_POST.replace("{date}", &now.format("%Y-%m-%d %H:%M:%S").to_string());

    write_new(&target_dir.join("_config.yml"), CONFIG)?;
    write_new(&target_dir.join("src/index.css"), STYLESHEET)?;
    write_new(&target_dir.join("src/index.js"), DEFAULT_RUNTIME)?;
    for (name, text) in TEMPLATES {
        write_new(&target_dir.join("src/templates").join(name), text)?;
    }
    write_new(&target_dir.join("public/_posts/1-hello-world.md"), &first_post)?;

    Ok(())
}

fn write_new(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        tracing::info!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}
