//! Tera templates: built-in defaults plus site overrides from the includes dir
//!
//! The built-in set is embedded in the binary. Any `.html` file under the
//! site's includes dir is registered under its relative path, replacing a
//! built-in template of the same name.

use anyhow::{Context as _, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{Page, Post};
use crate::helpers::{date_filter, date_filter_millis, date_xml, full_url_for};

/// Template renderer with the built-in blog theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a renderer, layering templates from `includes_dir` over the built-ins
    pub fn new(config: &SiteConfig, includes_dir: &Path) -> Result<Self> {
        let mut tera = Tera::default();

        // Content is already rendered HTML; built-in templates escape
        // metadata fields with `| escape`
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("builtin/layout.html")),
            ("index.html", include_str!("builtin/index.html")),
            ("post.html", include_str!("builtin/post.html")),
            ("page.html", include_str!("builtin/page.html")),
        ])?;

        let overrides = collect_templates(includes_dir);
        if !overrides.is_empty() {
            tracing::debug!(
                "Loading {} templates from {:?}",
                overrides.len(),
                includes_dir
            );
            tera.add_template_files(
                overrides
                    .iter()
                    .map(|(path, name)| (path.as_path(), Some(name.as_str())))
                    .collect::<Vec<_>>(),
            )
            .with_context(|| format!("Failed to load templates from {:?}", includes_dir))?;
        }

        tera.register_filter("date", date_tera_filter);
        let site_config = config.clone();
        tera.register_filter(
            "url",
            move |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let path = tera::try_get_value!("url", "value", String, value);
                Ok(tera::Value::String(full_url_for(&site_config, &path)))
            },
        );

        Ok(Self { tera })
    }

    /// Whether a template with this name is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(template_name, context)
            .with_context(|| format!("Failed to render template {:?}", template_name))
    }
}

/// `.html` files under `dir` with their `/`-separated relative names
fn collect_templates(dir: &Path) -> Vec<(PathBuf, String)> {
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|ext| ext == "html").unwrap_or(false))
        .filter_map(|e| {
            let relative = e.path().strip_prefix(dir).ok()?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some((e.path().to_path_buf(), name))
        })
        .collect()
}

/// Tera filter: `date(format="YYYY-MM-DD")`, empty string for anything unparseable
fn date_tera_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let format = args.get("format").and_then(|f| f.as_str());

    let formatted = match value {
        tera::Value::String(s) => date_filter(s, format),
        tera::Value::Number(n) => n
            .as_i64()
            .map(|ms| date_filter_millis(ms, format))
            .unwrap_or_default(),
        _ => String::new(),
    };

    Ok(tera::Value::String(formatted))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub date_format: String,
    pub script: Option<String>,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            date_format: config.date_format.clone(),
            script: config.script.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    /// RFC 3339 date, `None` when undated
    pub date: Option<String>,
    pub url: String,
    pub slug: Option<String>,
    pub file_slug: String,
    pub tags: Vec<String>,
    pub excerpt: Option<String>,
    pub source: String,
}

impl PostData {
    /// Template view of a published post
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            date: post.date.as_ref().map(date_xml),
            url: post.permalink.clone().unwrap_or_default(),
            slug: post.slug.clone(),
            file_slug: post.file_slug.clone(),
            tags: post.tags.clone(),
            excerpt: post.excerpt.clone(),
            source: post.source.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub date: Option<String>,
    pub url: String,
    pub source: String,
}

impl PageData {
    pub fn from_page(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            date: page.date.as_ref().map(date_xml),
            url: page.permalink.clone().unwrap_or_default(),
            source: page.source.clone(),
        }
    }
}

/// Named collections exposed as `collections.<name>`
#[derive(Debug, Clone, Serialize)]
pub struct Collections {
    pub posts: Vec<PostData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn render_str(renderer: &mut TemplateRenderer, source: &str, context: &Context) -> String {
        renderer.tera.add_raw_template("__test.html", source).unwrap();
        renderer.render("__test.html", context).unwrap()
    }

    #[test]
    fn test_date_filter_in_templates() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = TemplateRenderer::new(&SiteConfig::default(), dir.path()).unwrap();
        let mut context = Context::new();
        context.insert("good", "2024-01-05T00:00:00Z");
        context.insert("bad", "not-a-date");
        context.insert("missing", &Option::<String>::None);

        let out = render_str(
            &mut renderer,
            r#"[{{ good | date(format="YYYY-MM-DD") }}][{{ bad | date(format="YYYY-MM-DD") }}][{{ missing | date }}]"#,
            &context,
        );
        assert_eq!(out, "[2024-01-05][][]");
    }

    #[test]
    fn test_url_filter() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..SiteConfig::default()
        };
        let mut renderer = TemplateRenderer::new(&config, dir.path()).unwrap();
        let out = render_str(&mut renderer, r#"{{ "/posts/a/" | url }}"#, &Context::new());
        assert_eq!(out, "https://example.com/posts/a/");
    }

    #[test]
    fn test_builtin_templates_escape_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig {
            title: "Tom & Jerry".to_string(),
            description: r#"say "hi" <now>"#.to_string(),
            ..SiteConfig::default()
        };
        let renderer = TemplateRenderer::new(&config, dir.path()).unwrap();

        let mut post = Post::new("<script>alert(1)</script>".to_string(), "posts/x.md".into());
        post.permalink = Some("/posts/x/".to_string());
        post.tags = vec!["a<b".to_string()];

        let mut context = Context::new();
        context.insert("site", &SiteData::from(&config));
        context.insert("post", &PostData::from_post(&post));
        context.insert("content", "<p>kept</p>");
        context.insert("prev_post", &Option::<NavPost>::None);
        context.insert("next_post", &Option::<NavPost>::None);

        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains("<p>kept</p>"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;&#x2F;script&gt;"));
        assert!(html.contains(r#"content="say &quot;hi&quot; &lt;now&gt;""#));
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(html.contains("<li>a&lt;b</li>"));
    }

    #[test]
    fn test_includes_override_builtins() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("partials")).unwrap();
        fs::write(dir.path().join("post.html"), "custom {{ content }}").unwrap();
        fs::write(dir.path().join("partials/card.html"), "card").unwrap();

        let renderer = TemplateRenderer::new(&SiteConfig::default(), dir.path()).unwrap();
        assert!(renderer.has_template("partials/card.html"));
        assert!(renderer.has_template("index.html"));

        let mut context = Context::new();
        context.insert("content", "<p>x</p>");
        assert_eq!(renderer.render("post.html", &context).unwrap(), "custom <p>x</p>");
    }
}
