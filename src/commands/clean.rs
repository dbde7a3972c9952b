//! Clean the output directory

use anyhow::{Context, Result};
use std::fs;

use crate::Site;

/// Remove the output directory
pub fn run(site: &Site) -> Result<()> {
    if site.output_dir.exists() {
        fs::remove_dir_all(&site.output_dir)
            .with_context(|| format!("Failed to remove {:?}", site.output_dir))?;
        tracing::info!("Deleted: {:?}", site.output_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", site.output_dir);
    }
    Ok(())
}
