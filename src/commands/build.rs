//! Build the site

use anyhow::{Context as _, Result};
use notify_debouncer_mini::notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::loader::ContentLoader;
use crate::generator::{BuildReport, Generator};
use crate::Blog;

/// Load content and generate the whole site
pub fn run(blog: &Blog) -> Result<BuildReport> {
    let start = Instant::now();

    let loader = ContentLoader::new(blog);
    let posts = loader.load_posts()?;
    let pages = loader.load_pages()?;

    tracing::info!("Loaded {} posts and {} pages", posts.len(), pages.len());

    let generator = Generator::new(blog)?;
    let report = generator.generate(&posts, &pages)?;

    tracing::info!(
        "Wrote {} posts ({} drafts skipped), {} pages, copied {} files in {:.2}s",
        report.posts_written,
        report.drafts_skipped,
        report.pages_written,
        report.files_copied,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Whether a changed path should trigger a rebuild
pub fn is_source_change(blog: &Blog, path: &Path) -> bool {
    !path.starts_with(&blog.output_dir)
        && !path
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with(".git"))
}

/// Rebuild on every source change until the watcher goes away. Blocks the
/// calling thread; `on_rebuild` runs after each successful build.
pub fn watch_with<F>(blog: &Blog, mut on_rebuild: F) -> Result<()>
where
    F: FnMut(&BuildReport),
{
    let (tx, rx) = channel::<DebounceEventResult>();

    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)
        .context("Failed to start the file watcher")?;

    debouncer
        .watcher()
        .watch(&blog.input_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {:?}", blog.input_dir))?;

    let config_path = blog.config_path();
    if config_path.exists() && !config_path.starts_with(&blog.input_dir) {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {:?}", config_path))?;
    }

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", blog.input_dir);

    for result in rx {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("Watch error: {}", e);
                continue;
            }
        };

        let changed: Vec<_> = events
            .iter()
            .filter(|e| is_source_change(blog, &e.path))
            .collect();
        if changed.is_empty() {
            continue;
        }
        for event in &changed {
            tracing::debug!("Changed: {:?}", event.path);
        }

        // blog.yml may have changed, so reopen the site
        let rebuilt = Blog::new(&blog.base_dir).and_then(|blog| run(&blog));
        match rebuilt {
            Ok(report) => on_rebuild(&report),
            Err(e) => tracing::error!("Build failed: {:#}", e),
        }
    }

    Ok(())
}

/// `build --watch`
pub fn watch(blog: &Blog) -> Result<()> {
    watch_with(blog, |_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_run_builds_site() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("posts")).unwrap();
        fs::write(
            dir.path().join("posts/first.md"),
            "---\ntitle: First\ndate: 2024-01-05\n---\nHello",
        )
        .unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        let report = run(&blog).unwrap();
        assert_eq!(report.posts_written, 1);
        assert!(report.index_written);
        assert!(dir.path().join("_site/posts/first/index.html").exists());
    }

    #[test]
    fn test_output_changes_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        assert!(is_source_change(&blog, &dir.path().join("posts/a.md")));
        assert!(!is_source_change(&blog, &dir.path().join("_site/index.html")));
        assert!(!is_source_change(&blog, &dir.path().join(".git/HEAD")));
    }
}
