//! In-memory destination file set

use anyhow::{Context as _, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};

/// Every file of a build, keyed by path relative to the output root.
///
/// Nothing touches the filesystem until [`OutputSet::write_to`].
#[derive(Debug, Default)]
pub struct OutputSet {
    files: BTreeMap<String, Vec<u8>>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any earlier contents at the same path
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        let path = path.into();
        if self.files.insert(path.clone(), contents.into()).is_some() {
            tracing::warn!("Output {} was produced twice; keeping the last", path);
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Replace `dir` with exactly the files in this set.
    ///
    /// Fails before touching `dir` if any path would land outside it.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        if let Some(bad) = self.paths().find(|p| !is_relative_inside(p)) {
            anyhow::bail!("Refusing to write {:?} outside {:?}", bad, dir);
        }

        if dir.exists() {
            fs::remove_dir_all(dir)
                .with_context(|| format!("Failed to remove output directory {:?}", dir))?;
        }
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;

        for (path, contents) in &self.files {
            let dest = dir.join(path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
            fs::write(&dest, contents).with_context(|| format!("Failed to write {:?}", dest))?;
            tracing::debug!("Wrote {}", path);
        }
        Ok(())
    }
}

fn is_relative_inside(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
