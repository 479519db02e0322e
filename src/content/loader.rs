//! Content loader - loads posts and pages from the input directory

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{permalink, FrontMatter, MarkdownRenderer, Page, Post};
use crate::Blog;

/// `*` stays within one path segment, as it does for `glob::glob`
const PATH_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Loads content from the input directory
pub struct ContentLoader<'a> {
    blog: &'a Blog,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Self {
        let renderer = MarkdownRenderer::from_config(&blog.config.highlight);
        Self { blog, renderer }
    }

    /// Load every post matching the posts glob, drafts included, in path order
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let pattern = self.blog.input_dir.join(&self.blog.config.posts_glob);
        let pattern = pattern.to_string_lossy();

        let mut paths: Vec<PathBuf> = glob::glob(&pattern)
            .with_context(|| format!("Invalid posts glob {:?}", pattern))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file() && is_markdown_file(path))
            .collect();
        paths.sort();

        let mut posts = Vec::with_capacity(paths.len());
        for path in paths {
            match self.load_post(&path) {
                Ok(post) => posts.push(post),
                Err(e) => tracing::warn!("Failed to load post {:?}: {}", path, e),
            }
        }

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let draft = fm.is_draft();
        let slug = fm.slug();
        let file_slug = permalink::file_slug(path);
        let permalink =
            permalink::post_permalink(&self.blog.config, draft, slug.as_deref(), &file_slug);

        let (excerpt_md, full_md) = MarkdownRenderer::split_excerpt(body);
        let excerpt = match excerpt_md {
            Some(excerpt) => Some(self.renderer.render(&excerpt)?),
            None => None,
        };

        let mut post = Post::new(title_or_stem(fm.title.clone(), path), self.relative(path));
        post.date = fm.parse_date();
        post.draft = draft;
        post.slug = slug;
        post.file_slug = file_slug;
        post.raw = body.to_string();
        post.content = self.renderer.render(&full_md)?;
        post.excerpt = excerpt;
        post.tags = fm.tags;
        post.layout = layout_name(fm.layout.as_deref(), &self.blog.config.post_layout);
        post.full_source = path.to_path_buf();
        post.permalink = permalink;
        post.extra = fm.extra;

        if post.date.is_none() && fm.date.is_some() {
            tracing::warn!("Unrecognized date in {:?}, sorting it as undated", path);
        }

        Ok(post)
    }

    /// Load standalone markdown pages outside the posts collection
    pub fn load_pages(&self) -> Result<Vec<Page>> {
        let input_dir = &self.blog.input_dir;
        let ignores = self.ignore_patterns();
        let posts_pattern = Pattern::new(&self.blog.config.posts_glob)
            .with_context(|| format!("Invalid posts glob {:?}", self.blog.config.posts_glob))?;
        let reserved = self.reserved_dirs();

        let mut pages = Vec::new();

        let walker = WalkDir::new(input_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !is_hidden(entry, input_dir) && !reserved.iter().any(|d| entry.path().starts_with(d))
            });

        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let relative = self.relative(path);
            if posts_pattern.matches_with(&relative, PATH_MATCH)
                || ignores.iter().any(|p| p.matches_with(&relative, PATH_MATCH))
            {
                continue;
            }

            match self.load_page(path, &relative) {
                Ok(page) => pages.push(page),
                Err(e) => tracing::warn!("Failed to load page {:?}: {}", path, e),
            }
        }

        Ok(pages)
    }

    /// Load a single page from a file
    fn load_page(&self, path: &Path, relative: &str) -> Result<Page> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let permalink = match &fm.permalink {
            Some(serde_yaml::Value::Bool(false)) => None,
            Some(serde_yaml::Value::String(p)) if !p.is_empty() => {
                Some(permalink::page_permalink(p).unwrap_or_else(|| page_path(relative)))
            }
            _ => Some(page_path(relative)),
        };

        let mut page = Page::new(title_or_stem(fm.title.clone(), path), relative.to_string());
        page.date = fm.parse_date();
        page.raw = body.to_string();
        page.content = self.renderer.render(body)?;
        page.layout = layout_name(fm.layout.as_deref(), &self.blog.config.page_layout);
        page.permalink = permalink;
        page.extra = fm.extra;

        Ok(page)
    }

    /// Source path relative to the input dir, with `/` separators
    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.blog.input_dir)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn ignore_patterns(&self) -> Vec<Pattern> {
        self.blog
            .config
            .ignores
            .iter()
            .filter_map(|raw| match Pattern::new(raw) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!("Skipping invalid ignore pattern {:?}: {}", raw, e);
                    None
                }
            })
            .collect()
    }

    /// Directories that hold output, templates or verbatim assets
    fn reserved_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![
            self.blog.output_dir.clone(),
            self.blog.includes_dir.clone(),
        ];
        dirs.extend(
            self.blog
                .config
                .passthrough
                .keys()
                .map(|src| self.blog.input_dir.join(src)),
        );
        dirs
    }
}

/// URL path for a page source: `about.md` -> `/about/`, `docs/index.md` -> `/docs/`
fn page_path(relative: &str) -> String {
    let without_ext = relative
        .trim_end_matches(".markdown")
        .trim_end_matches(".md");

    if without_ext == "index" {
        "/".to_string()
    } else if let Some(dir) = without_ext.strip_suffix("/index") {
        format!("/{}/", dir)
    } else {
        format!("/{}/", without_ext)
    }
}

/// Template name for a front-matter layout, `.html` added when missing
fn layout_name(layout: Option<&str>, default: &str) -> String {
    match layout {
        Some(name) if !name.is_empty() => {
            if Path::new(name).extension().is_some() {
                name.to_string()
            } else {
                format!("{}.html", name)
            }
        }
        _ => default.to_string(),
    }
}

fn title_or_stem(title: Option<String>, path: &Path) -> String {
    title.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string()
    })
}

/// Dot- and underscore-prefixed entries below the root are never content
fn is_hidden(entry: &DirEntry, root: &Path) -> bool {
    entry.path() != root
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.') || s.starts_with('_'))
            .unwrap_or(false)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_posts() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "posts/2024-01-05-new-year.md",
            "---\ntitle: New Year\ndate: 2024-01-05\n---\nHello <!-- more --> rest",
        );
        write(
            dir.path(),
            "posts/secret.md",
            "---\ntitle: Secret\ndraft: true\nslug: hidden\n---\nShh",
        );
        write(dir.path(), "posts/nested/deep.md", "---\ntitle: Deep\n---\n");
        write(dir.path(), "posts/notes.txt", "not a post");

        let blog = Blog::new(dir.path()).unwrap();
        let posts = ContentLoader::new(&blog).load_posts().unwrap();

        assert_eq!(posts.len(), 2);
        let new_year = &posts[0];
        assert_eq!(new_year.title, "New Year");
        assert_eq!(new_year.file_slug, "new-year");
        assert_eq!(new_year.permalink.as_deref(), Some("/posts/new-year/"));
        assert_eq!(new_year.layout, "post.html");
        assert!(new_year.excerpt.is_some());
        assert_eq!(new_year.source, "posts/2024-01-05-new-year.md");

        let secret = &posts[1];
        assert!(secret.draft);
        assert_eq!(secret.slug.as_deref(), Some("hidden"));
        assert_eq!(secret.permalink, None);
    }

    #[test]
    fn test_load_pages_skips_ignored_and_reserved() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "about.md", "---\ntitle: About\nlayout: plain\n---\nMe");
        write(dir.path(), "README.md", "# Readme");
        write(dir.path(), "posts/a.md", "---\ntitle: A\n---\n");
        write(dir.path(), "docs/index.md", "# Docs");
        write(dir.path(), "hidden.md", "---\npermalink: false\n---\n");
        write(dir.path(), "custom.md", "---\npermalink: feed/custom.html\n---\n");
        write(dir.path(), "_site/old.md", "stale");
        write(dir.path(), "_includes/partial.md", "partial");
        write(dir.path(), "node_modules/pkg/README.md", "vendored");
        write(dir.path(), "public/css/notes.md", "asset");
        write(dir.path(), ".cursor/rules.md", "tooling");

        let blog = Blog::new(dir.path()).unwrap();
        let pages = ContentLoader::new(&blog).load_pages().unwrap();

        let mut sources: Vec<_> = pages.iter().map(|p| p.source.as_str()).collect();
        sources.sort();
        assert_eq!(sources, vec!["about.md", "custom.md", "docs/index.md", "hidden.md"]);

        let about = pages.iter().find(|p| p.source == "about.md").unwrap();
        assert_eq!(about.permalink.as_deref(), Some("/about/"));
        assert_eq!(about.layout, "plain.html");

        let docs = pages.iter().find(|p| p.source == "docs/index.md").unwrap();
        assert_eq!(docs.permalink.as_deref(), Some("/docs/"));

        let hidden = pages.iter().find(|p| p.source == "hidden.md").unwrap();
        assert_eq!(hidden.permalink, None);

        let custom = pages.iter().find(|p| p.source == "custom.md").unwrap();
        assert_eq!(custom.permalink.as_deref(), Some("/feed/custom.html"));
    }

    #[test]
    fn test_escaping_page_permalink_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        write(&site, "evil.md", "---\npermalink: ../../escaped.html\n---\nEvil");

        let blog = Blog::new(&site).unwrap();
        let pages = ContentLoader::new(&blog).load_pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].permalink.as_deref(), Some("/evil/"));

        blog.build().unwrap();
        assert!(site.join("_site/evil/index.html").exists());
        assert!(!dir.path().join("escaped.html").exists());
        assert!(!site.join("escaped.html").exists());
    }

    #[test]
    fn test_page_path() {
        assert_eq!(page_path("index.md"), "/");
        assert_eq!(page_path("about.md"), "/about/");
        assert_eq!(page_path("guides/setup.markdown"), "/guides/setup/");
    }
}
