//! List site content

use anyhow::Result;

use crate::content::{ContentLoader, Post};
use crate::Site;

/// Print posts or pages in file name order
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    for line in listing(site, content_type)? {
        println!("{}", line);
    }
    Ok(())
}

/// Lines printed by [`run`]
pub fn listing(site: &Site, content_type: &str) -> Result<Vec<String>> {
    let loader = ContentLoader::new(site);
    let (label, items) = match content_type {
        "post" | "posts" => ("Posts", loader.load_posts()?),
        "page" | "pages" => ("Pages", loader.load_pages()?),
        _ => {
            anyhow::bail!("Unknown type: {}. Available: posts, pages", content_type);
        }
    };

    let mut lines = vec![format!("{} ({}):", label, items.len())];
    lines.extend(items.iter().map(describe));
    Ok(lines)
}

fn describe(post: &Post) -> String {
    let mut line = format!("  {:>4}  {} -> {}", post.id, post.title(), post.output_path());
    if post.is_draft() {
        line.push_str(" (draft)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_listing_posts() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(&site.posts_dir).unwrap();
        fs::write(site.posts_dir.join("1-hello.md"), "x").unwrap();
        fs::write(site.posts_dir.join("2-world.md"), "---\ntitle: World\n---\ny").unwrap();

        let lines = listing(&site, "posts").unwrap();
        assert_eq!(
            lines,
            vec![
                "Posts (2):".to_string(),
                "     1  hello -> hello.html".to_string(),
                "     2  World -> world.html".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_type() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert!(listing(&site, "tags").is_err());
        assert_eq!(listing(&site, "pages").unwrap(), vec!["Pages (0):".to_string()]);
    }
}
