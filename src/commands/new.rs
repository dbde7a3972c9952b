//! Create a new post or page

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::parse_file_name;
use crate::Site;

/// Create `<next id>-<slug>.md` in the posts directory, or the pages
/// directory when `page` is set. Returns the new file's path.
pub fn create_post(site: &Site, title: &str, page: bool) -> Result<PathBuf> {
    let target_dir = if page { &site.pages_dir } else { &site.posts_dir };
    fs::create_dir_all(target_dir)
        .with_context(|| format!("Failed to create {:?}", target_dir))?;

    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }
    let id = next_id(target_dir)?;
    let file_path = target_dir.join(format!("{}-{}.md", id, slug));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let mut content = format!("---\ntitle: \"{}\"\n", title);
    if !page {
        content.push_str(&format!("date: {}\n", now.format("%Y-%m-%d %H:%M:%S")));
    }
    content.push_str("---\n\n");

    fs::write(&file_path, content).with_context(|| format!("Failed to write {:?}", file_path))?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// One more than the highest id prefix among the markdown files in `dir`
fn next_id(dir: &Path) -> Result<i64> {
    let mut max = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.ends_with(".md") {
            continue;
        }
        if let Some((id, _)) = parse_file_name(name) {
            max = max.max(id);
        }
    }
    Ok(max + 1)
}
