//! quillsite: a small static blog generator
//!
//! Posts under `posts/` are filtered by their draft flag, sorted newest
//! first and rendered with Tera into `/posts/<slug>/` pages. Static asset
//! directories are copied verbatim. The [`enhance`] module models the
//! optional client-side behaviors the generated pages opt into.

pub mod collection;
pub mod commands;
pub mod config;
pub mod content;
pub mod enhance;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A blog site rooted at a directory
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Site root, where `blog.yml` lives
    pub base_dir: PathBuf,
    /// Content root
    pub input_dir: PathBuf,
    /// Generated site
    pub output_dir: PathBuf,
    /// Template overrides
    pub includes_dir: PathBuf,
}

impl Blog {
    /// Open the site in `base_dir`, with default configuration when there is
    /// no `blog.yml`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = config::SiteConfig::load_or_default(&base_dir)?;

        let input_dir = if config.input_dir.is_empty() || config.input_dir == "." {
            base_dir.clone()
        } else {
            base_dir.join(&config.input_dir)
        };
        let output_dir = base_dir.join(&config.output_dir);
        let includes_dir = input_dir.join(&config.includes_dir);

        Ok(Self {
            config,
            base_dir,
            input_dir,
            output_dir,
            includes_dir,
        })
    }

    /// Path of the configuration file
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(config::CONFIG_FILE)
    }

    /// Build the site into the output directory
    pub fn build(&self) -> Result<generator::BuildReport> {
        commands::build::run(self)
    }

    /// Delete the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, draft: bool, slug: Option<&str>) -> Result<PathBuf> {
        commands::new::create_post(self, title, draft, slug)
    }
}
