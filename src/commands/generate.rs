//! Build the site, once or on every change

use anyhow::{Context, Result};
use notify::Watcher;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::generator::{BuildReport, Generator};
use crate::Site;

/// Build the site into its output directory
pub fn run(site: &Site) -> Result<BuildReport> {
    Generator::new(site).generate()
}

/// Whether a changed path should trigger a rebuild
pub fn is_relevant_change(site: &Site, path: &Path) -> bool {
    if path.starts_with(&site.output_dir) {
        return false;
    }
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.contains("node_modules")
        && !path_str.ends_with('~')
}

/// Watch the site inputs and rebuild on changes. Blocks until the watcher
/// shuts down.
pub fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for dir in [&site.public_dir, &site.src_dir] {
        if dir.exists() {
            watcher
                .watch(dir, notify::RecursiveMode::Recursive)
                .with_context(|| format!("Failed to watch {:?}", dir))?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut last_rebuild = Instant::now();
    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let event: notify::Event = event;
                if !event.paths.iter().any(|p| is_relevant_change(site, p)) {
                    continue;
                }
                // Debounce: at most one rebuild per 500ms
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, rebuilding...");
                    if let Err(e) = run(site) {
                        tracing::error!("Build failed: {:#}", e);
                    }
                    last_rebuild = Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
