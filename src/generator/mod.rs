//! Generator module - renders the published site with Tera templates

mod passthrough;

use anyhow::{Context as _, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tera::Context;

use crate::collection;
use crate::content::{permalink, Page, Post};
use crate::error::BuildError;
use crate::templates::{Collections, NavPost, PageData, PostData, SiteData, TemplateRenderer};
use crate::Blog;

pub use passthrough::copy_passthrough;

/// What a build produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub posts_written: usize,
    pub drafts_skipped: usize,
    pub pages_written: usize,
    pub files_copied: usize,
    pub index_written: bool,
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new(&blog.config, &blog.includes_dir)?;
        Ok(Self {
            blog: blog.clone(),
            renderer,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, posts: &[Post], pages: &[Page]) -> Result<BuildReport> {
        let published = collection::published(posts);
        let mut report = BuildReport {
            drafts_skipped: posts.len() - published.len(),
            ..BuildReport::default()
        };

        self.check_permalinks(&published, pages)?;

        let removed = clear_output_dir(&self.blog)?;
        if removed > 0 {
            tracing::debug!("Removed {} entries from the previous build", removed);
        }
        fs::create_dir_all(&self.blog.output_dir)
            .with_context(|| format!("Failed to create {:?}", self.blog.output_dir))?;

        report.files_copied = copy_passthrough(
            &self.blog.config,
            &self.blog.input_dir,
            &self.blog.output_dir,
        )?;

        let mut site = SiteData::from(&self.blog.config);
        site.script = self.available_script();
        let collections = Collections {
            posts: published.iter().map(|p| PostData::from_post(p)).collect(),
        };

        report.posts_written = self.generate_post_pages(&published, &site, &collections)?;
        report.pages_written = self.generate_page_pages(pages, &site, &collections)?;

        let has_home_page = pages.iter().any(|p| p.permalink.as_deref() == Some("/"));
        if !has_home_page {
            self.generate_index_page(&site, &collections)?;
            report.index_written = true;
        }

        Ok(report)
    }

    /// The configured enhancement script, dropped when it names a local
    /// file the build did not produce
    fn available_script(&self) -> Option<String> {
        let script = self.blog.config.script.as_deref().filter(|s| !s.is_empty())?;
        let is_local = script.starts_with('/') && !script.starts_with("//");
        if is_local {
            let file = self.blog.output_dir.join(script.trim_start_matches('/'));
            if !file.is_file() {
                tracing::warn!("Script {} not found in the output, leaving it out", script);
                return None;
            }
        }
        Some(script.to_string())
    }

    /// Published posts and pages must not share an output file
    fn check_permalinks(&self, posts: &[&Post], pages: &[Page]) -> Result<(), BuildError> {
        let mut seen: HashMap<String, &str> = HashMap::new();

        let items = posts
            .iter()
            .filter_map(|p| p.permalink.as_deref().map(|url| (url, p.source.as_str())))
            .chain(
                pages
                    .iter()
                    .filter_map(|p| p.permalink.as_deref().map(|url| (url, p.source.as_str()))),
            );

        for (url, source) in items {
            let file = permalink::output_file(url);
            if let Some(first) = seen.insert(file, source) {
                return Err(BuildError::DuplicatePermalink {
                    url: url.to_string(),
                    first: first.to_string(),
                    second: source.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Create a base context with common variables
    fn create_base_context(&self, site: &SiteData, collections: &Collections) -> Context {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("collections", collections);
        context.insert("current_year", &chrono::Utc::now().format("%Y").to_string());
        context
    }

    /// Render each published post to `<permalink>/index.html`
    fn generate_post_pages(
        &self,
        posts: &[&Post],
        site: &SiteData,
        collections: &Collections,
    ) -> Result<usize> {
        let mut written = 0;

        for (i, post) in posts.iter().enumerate() {
            let Some(url) = post.permalink.as_deref() else {
                continue;
            };
            self.require_layout(&post.layout, &post.source)?;

            // Collection is newest first: "previous" is the older neighbour
            let prev_post = posts.get(i + 1).map(|p| nav(p));
            let next_post = i.checked_sub(1).and_then(|j| posts.get(j)).map(|p| nav(p));

            let mut context = self.create_base_context(site, collections);
            context.insert("post", &collections.posts[i]);
            context.insert("content", &post.content);
            context.insert("extra", &post.extra);
            context.insert("prev_post", &prev_post);
            context.insert("next_post", &next_post);
            context.insert("current_path", url);

            let html = self.renderer.render(&post.layout, &context)?;
            self.write_output(url, &html)?;
            written += 1;
        }

        tracing::info!("Generated {} posts", written);
        Ok(written)
    }

    /// Render standalone pages that have an output path
    fn generate_page_pages(
        &self,
        pages: &[Page],
        site: &SiteData,
        collections: &Collections,
    ) -> Result<usize> {
        let mut written = 0;

        for page in pages {
            let Some(url) = page.permalink.as_deref() else {
                tracing::debug!("Skipping {} (permalink: false)", page.source);
                continue;
            };
            self.require_layout(&page.layout, &page.source)?;

            let mut context = self.create_base_context(site, collections);
            context.insert("page", &PageData::from_page(page));
            context.insert("content", &page.content);
            context.insert("extra", &page.extra);
            context.insert("current_path", url);

            let html = self.renderer.render(&page.layout, &context)?;
            self.write_output(url, &html)?;
            written += 1;
        }

        Ok(written)
    }

    /// Render the post listing at `/index.html`
    fn generate_index_page(&self, site: &SiteData, collections: &Collections) -> Result<()> {
        let mut context = self.create_base_context(site, collections);
        context.insert("current_path", "/");

        let html = self.renderer.render("index.html", &context)?;
        self.write_output("/", &html)?;
        tracing::info!("Generated index page");
        Ok(())
    }

    fn require_layout(&self, layout: &str, source: &str) -> Result<(), BuildError> {
        if self.renderer.has_template(layout) {
            Ok(())
        } else {
            Err(BuildError::MissingLayout {
                layout: layout.to_string(),
                source_file: source.to_string(),
            })
        }
    }

    fn write_output(&self, url: &str, html: &str) -> Result<()> {
        let output_path = self.blog.output_dir.join(permalink::output_file(url));
        write_file(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}

/// Fails when deleting the output dir would delete the site itself
pub fn ensure_separate_output(blog: &Blog) -> Result<(), BuildError> {
    let output = &blog.output_dir;
    if blog.base_dir.starts_with(output) || blog.input_dir.starts_with(output) {
        return Err(BuildError::OutputContainsSources {
            output_dir: output.display().to_string(),
        });
    }
    Ok(())
}

/// Empty the output dir so nothing from a previous build (such as a post
/// since marked as draft) survives. Returns the number of entries removed.
fn clear_output_dir(blog: &Blog) -> Result<usize> {
    ensure_separate_output(blog)?;
    if !blog.output_dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(&blog.output_dir)
        .with_context(|| format!("Failed to read {:?}", blog.output_dir))?
    {
        let path = entry?.path();
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.with_context(|| format!("Failed to delete {:?}", path))?;
        removed += 1;
    }
    Ok(removed)
}

fn nav(post: &Post) -> NavPost {
    NavPost {
        title: post.title.clone(),
        url: post.permalink.clone().unwrap_or_default(),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::loader::ContentLoader;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn build(root: &Path) -> Result<BuildReport> {
        let blog = Blog::new(root)?;
        let loader = ContentLoader::new(&blog);
        let posts = loader.load_posts()?;
        let pages = loader.load_pages()?;
        Generator::new(&blog)?.generate(&posts, &pages)
    }

    #[test]
    fn test_generate_site() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "posts/first.md", "---\ntitle: First\ndate: 2024-01-01\n---\nOne");
        write(
            root,
            "posts/second.md",
            "---\ntitle: Second\ndate: 2024-02-01\nslug: two\n---\nTwo",
        );
        write(
            root,
            "posts/wip.md",
            "---\ntitle: Work In Progress\ndate: 2024-03-01\ndraft: true\nslug: wip\n---\nWIP",
        );
        write(root, "about.md", "---\ntitle: About\n---\nAbout me");
        write(root, "public/css/style.css", "body { color: red; }");

        let report = build(root).unwrap();
        assert_eq!(
            report,
            BuildReport {
                posts_written: 2,
                drafts_skipped: 1,
                pages_written: 1,
                files_copied: 1,
                index_written: true,
            }
        );

        let out = root.join("_site");
        let first = fs::read_to_string(out.join("posts/first/index.html")).unwrap();
        assert!(first.contains("<h1>First</h1>"));
        assert!(first.contains("2024-01-01"));
        // Newer neighbour links forward
        assert!(first.contains(r#"href="/posts/two/""#));

        assert!(out.join("posts/two/index.html").exists());
        assert!(!out.join("posts/wip").exists());
        assert!(out.join("about/index.html").exists());

        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(!index.contains("Work In Progress"));
        let second_at = index.find("Second").unwrap();
        let first_at = index.find(">First<").unwrap();
        assert!(second_at < first_at);

        assert_eq!(
            fs::read(out.join("css/style.css")).unwrap(),
            b"body { color: red; }"
        );
    }

    #[test]
    fn test_duplicate_permalink_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/a.md", "---\nslug: same\n---\n");
        write(dir.path(), "posts/b.md", "---\nslug: same\n---\n");

        let err = build(dir.path()).unwrap_err();
        let err = err.downcast::<BuildError>().unwrap();
        assert!(matches!(err, BuildError::DuplicatePermalink { .. }));
    }

    #[test]
    fn test_draft_may_share_slug() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/a.md", "---\nslug: same\n---\n");
        write(dir.path(), "posts/b.md", "---\nslug: same\ndraft: true\n---\n");
        assert_eq!(build(dir.path()).unwrap().posts_written, 1);
    }

    #[test]
    fn test_missing_layout_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/a.md", "---\nlayout: fancy\n---\n");
        let err = build(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast::<BuildError>().unwrap(),
            BuildError::MissingLayout { layout, .. } if layout == "fancy.html"
        ));
    }

    #[test]
    fn test_rebuild_drops_output_of_new_drafts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "posts/a.md", "---\ntitle: A\n---\nA");
        write(root, "about.md", "---\ntitle: About\n---\nMe");
        build(root).unwrap();
        assert!(root.join("_site/posts/a/index.html").exists());

        write(root, "posts/a.md", "---\ntitle: A\ndraft: true\n---\nA");
        fs::remove_file(root.join("about.md")).unwrap();
        let report = build(root).unwrap();

        assert_eq!(report.drafts_skipped, 1);
        assert!(!root.join("_site/posts/a").exists());
        assert!(!root.join("_site/about").exists());
        assert!(root.join("_site/index.html").exists());
    }

    #[test]
    fn test_output_dir_must_not_contain_sources() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "blog.yml", "output_dir: .\n");
        write(dir.path(), "posts/a.md", "---\ntitle: A\n---\nA");

        let err = build(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast::<BuildError>().unwrap(),
            BuildError::OutputContainsSources { .. }
        ));
        assert!(dir.path().join("posts/a.md").exists());
    }

    #[test]
    fn test_script_tag_only_for_copied_script() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "posts/a.md", "---\ntitle: A\n---\nA");

        build(root).unwrap();
        let html = fs::read_to_string(root.join("_site/posts/a/index.html")).unwrap();
        assert!(!html.contains("<script"));

        write(root, "public/js/main.js", "(function () {})();");
        build(root).unwrap();
        let html = fs::read_to_string(root.join("_site/posts/a/index.html")).unwrap();
        assert!(html.contains(r#"<script src="/js/main.js" defer></script>"#));
    }

    #[test]
    fn test_remote_script_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "blog.yml", "script: https://cdn.example.com/enhance.js\n");
        write(root, "posts/a.md", "---\ntitle: A\n---\nA");

        build(root).unwrap();
        let html = fs::read_to_string(root.join("_site/index.html")).unwrap();
        assert!(html.contains(r#"src="https://cdn.example.com/enhance.js""#));
    }

    #[test]
    fn test_home_page_replaces_index() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", "---\ntitle: Home\n---\nWelcome home");
        let report = build(dir.path()).unwrap();
        assert!(!report.index_written);
        let index = fs::read_to_string(dir.path().join("_site/index.html")).unwrap();
        assert!(index.contains("Welcome home"));
    }
}
