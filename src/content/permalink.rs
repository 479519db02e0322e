//! Output paths for posts

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

use crate::config::SiteConfig;

lazy_static! {
    static ref DATE_PREFIX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}-").unwrap();
}

/// Slug derived from a source path: the file stem without a `YYYY-MM-DD-`
/// prefix, or the parent directory name for `index` files
pub fn file_slug(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");

    let stem = if stem == "index" {
        path.parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("")
    } else {
        stem
    };

    DATE_PREFIX.replace(stem, "").into_owned()
}

/// Permalink for a post: `/<prefix>/<slug>/`, or `None` for drafts.
///
/// The slug comes from front matter, then the file slug, then the
/// configured default segment.
pub fn post_permalink(
    config: &SiteConfig,
    draft: bool,
    slug: Option<&str>,
    file_slug: &str,
) -> Option<String> {
    if draft {
        return None;
    }

    let segment = [slug, Some(file_slug)]
        .into_iter()
        .flatten()
        .find(|s| is_usable_segment(s))
        .unwrap_or(config.default_slug.as_str());

    let prefix = config.posts_prefix.trim_matches('/');
    if prefix.is_empty() {
        Some(format!("/{}/", segment))
    } else {
        Some(format!("/{}/{}/", prefix, segment))
    }
}

/// A slug that stays inside the output directory
fn is_usable_segment(slug: &str) -> bool {
    if slug.is_empty() {
        return false;
    }
    let usable = !slug.starts_with('/')
        && !slug.contains('\\')
        && slug.split('/').all(|part| !part.is_empty() && part != "." && part != "..");
    if !usable {
        tracing::warn!("Ignoring slug {:?}: it would leave the output directory", slug);
    }
    usable
}

/// URL path for an explicit page `permalink`, or `None` (with a warning)
/// when it would leave the output directory
pub fn page_permalink(raw: &str) -> Option<String> {
    if !stays_inside_output(raw) {
        tracing::warn!("Ignoring permalink {:?}: it would leave the output directory", raw);
        return None;
    }
    Some(format!("/{}", raw.trim_start_matches('/')))
}

/// No `.`/`..` segments and no backslashes; empty segments are allowed
fn stays_inside_output(path: &str) -> bool {
    !path.contains('\\')
        && path
            .split('/')
            .filter(|part| !part.is_empty())
            .all(|part| part != "." && part != "..")
}

/// Output file under the output root for a URL path
pub fn output_file(url_path: &str) -> String {
    let clean = url_path.trim_start_matches('/');
    if clean.is_empty() || clean.ends_with('/') {
        format!("{}index.html", clean)
    } else {
        clean.to_string()
    }
}
