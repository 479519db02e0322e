//! Site configuration (blog.yml)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Name of the configuration file at the site root
pub const CONFIG_FILE: &str = "blog.yml";

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
    pub input_dir: String,
    pub output_dir: String,
    pub includes_dir: String,

    // Posts
    pub posts_glob: String,
    pub posts_prefix: String,
    pub default_slug: String,
    pub post_layout: String,
    pub page_layout: String,

    // Date format handed to the `date` filter by the built-in templates
    pub date_format: String,

    /// Enhancement script emitted by the built-in layout, if any
    pub script: Option<String>,

    /// Source directory -> destination under the output root, copied verbatim
    pub passthrough: IndexMap<String, String>,

    /// Glob patterns (relative to the input dir) never treated as content
    pub ignores: Vec<String>,

    #[serde(default)]
    pub highlight: HighlightConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut passthrough = IndexMap::new();
        passthrough.insert("public/css".to_string(), "css".to_string());
        passthrough.insert("public/js".to_string(), "js".to_string());

        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: String::new(),
            url: "http://example.com".to_string(),

            input_dir: ".".to_string(),
            output_dir: "_site".to_string(),
            includes_dir: "_includes".to_string(),

            posts_glob: "posts/*.md".to_string(),
            posts_prefix: "posts".to_string(),
            default_slug: "post".to_string(),
            post_layout: "post.html".to_string(),
            page_layout: "page.html".to_string(),

            date_format: "YYYY-MM-DD".to_string(),
            script: Some("/js/main.js".to_string()),
            passthrough,
            ignores: [
                ".kiro/**",
                ".cursor/**",
                "node_modules/**",
                "AGENTS.md",
                "README.md",
                "CONTENT-CONVENTION.md",
                "package.json",
                "package-lock.json",
                ".gitignore",
                CONFIG_FILE,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            highlight: HighlightConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Load `blog.yml` from a site directory, falling back to defaults
    pub fn load_or_default<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join(CONFIG_FILE);
        if config_path.exists() {
            tracing::debug!("Loading config from {:?}", config_path);
            Self::load(&config_path)
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            Ok(Self::default())
        }
    }

    /// Hostname of the configured site URL
    pub fn hostname(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.output_dir, "_site");
        assert_eq!(config.posts_glob, "posts/*.md");
        assert_eq!(config.default_slug, "post");
        let copies: Vec<_> = config.passthrough.iter().collect();
        assert_eq!(
            copies,
            vec![
                (&"public/css".to_string(), &"css".to_string()),
                (&"public/js".to_string(), &"js".to_string())
            ]
        );
        assert!(config.ignores.iter().any(|i| i == "node_modules/**"));
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Field Notes
url: https://notes.example.org
output_dir: dist
passthrough:
  assets: static
github: someone
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Field Notes");
        assert_eq!(config.output_dir, "dist");
        assert_eq!(config.posts_prefix, "posts");
        assert_eq!(config.passthrough.len(), 1);
        assert_eq!(config.passthrough.get("assets"), Some(&"static".to_string()));
        assert_eq!(
            config.extra.get("github").and_then(|v| v.as_str()),
            Some("someone")
        );
        assert_eq!(config.hostname().as_deref(), Some("notes.example.org"));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.title, "My Blog");
    }

    #[test]
    fn test_load_rejects_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "title: [unclosed").unwrap();
        assert!(SiteConfig::load_or_default(dir.path()).is_err());
    }
}
