//! Clean the output directory

use anyhow::{Context as _, Result};
use std::fs;

use crate::generator::ensure_separate_output;
use crate::Blog;

/// Delete the output directory
pub fn run(blog: &Blog) -> Result<()> {
    ensure_separate_output(blog)?;

    if blog.output_dir.exists() {
        fs::remove_dir_all(&blog.output_dir)
            .with_context(|| format!("Failed to delete {:?}", blog.output_dir))?;
        tracing::info!("Deleted: {:?}", blog.output_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", blog.output_dir);
    }

    Ok(())
}
