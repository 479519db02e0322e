//! Initialize a new blog

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;

use crate::config::CONFIG_FILE;

const CONFIG_TEMPLATE: &str = r#"# quillsite configuration

title: My Blog
description: ''
author: ''
url: http://example.com

# Directories
input_dir: .
output_dir: _site
includes_dir: _includes

# Posts
posts_glob: posts/*.md
posts_prefix: posts
default_slug: post

# Copied verbatim to the output root
passthrough:
  public/css: css
  public/js: js

# Enhancement script loaded with `defer` by the built-in layout
script: /js/main.js
"#;

const ENHANCEMENT_SCRIPT: &str = include_str!("assets/main.js");

const STYLESHEET: &str = r#"body {
  font-family: system-ui, sans-serif;
  line-height: 1.6;
  max-width: 42rem;
  margin: 0 auto;
  padding: 1rem;
}

.skip-link {
  position: absolute;
  left: -999px;
}

.skip-link:focus {
  left: 1rem;
}

.js-keyboard-nav .js-focused {
  outline: 2px solid currentColor;
  outline-offset: 2px;
}
"#;

/// Scaffold a new site in `target_dir`
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    for dir in ["posts", "public/css", "public/js", "_includes"] {
        let path = target_dir.join(dir);
        fs::create_dir_all(&path).with_context(|| format!("Failed to create {:?}", path))?;
    }

    fs::write(&config_path, CONFIG_TEMPLATE)?;
    fs::write(target_dir.join("public/css/style.css"), STYLESHEET)?;
    fs::write(target_dir.join("public/js/main.js"), ENHANCEMENT_SCRIPT)?;

    let today = chrono::Utc::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
---

Welcome to your new blog. Posts live in `posts/` as Markdown files with
front matter. Set `draft: true` to keep a post out of the published site,
and `slug:` to choose its URL.

<!-- more -->

## Writing

```bash
$ quillsite new "My New Post"
```

## Previewing

```bash
$ quillsite serve
```
"#,
        today
    );
    fs::write(target_dir.join("posts/hello-world.md"), sample_post)?;

    tracing::debug!("Scaffolded site in {:?}", target_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Blog;

    #[test]
    fn test_init_scaffolds_buildable_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join("blog.yml").exists());
        assert!(dir.path().join("_includes").is_dir());

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.script.as_deref(), Some("/js/main.js"));
        assert_eq!(blog.config.output_dir, "_site");

        let report = blog.build().unwrap();
        assert_eq!(report.posts_written, 1);
        assert!(dir.path().join("_site/posts/hello-world/index.html").exists());
        assert!(dir.path().join("_site/css/style.css").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("_site/js/main.js")).unwrap(),
            ENHANCEMENT_SCRIPT
        );
        let post = fs::read_to_string(dir.path().join("_site/posts/hello-world/index.html")).unwrap();
        assert!(post.contains(r#"<script src="/js/main.js" defer></script>"#));
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blog.yml"), "title: Mine\n").unwrap();
        assert!(init_site(dir.path()).is_err());
        assert_eq!(
            fs::read_to_string(dir.path().join("blog.yml")).unwrap(),
            "title: Mine\n"
        );
    }
}
