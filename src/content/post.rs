//! Post and Page models

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::collection::CollectionItem;

/// A blog post from the posts collection
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Publication date, if the front matter carried a valid one
    pub date: Option<DateTime<Utc>>,

    /// Excluded from the published collection and from output
    pub draft: bool,

    /// Slug from front matter
    pub slug: Option<String>,

    /// File stem without a leading date prefix
    pub file_slug: String,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Rendered excerpt (before <!-- more -->)
    pub excerpt: Option<String>,

    /// Post tags
    pub tags: Vec<String>,

    /// Layout template to use
    pub layout: String,

    /// Source file path relative to the input dir
    pub source: String,

    /// Full source file path
    #[serde(skip)]
    pub full_source: PathBuf,

    /// Output URL path, `None` for drafts
    pub permalink: Option<String>,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, source: String) -> Self {
        Self {
            title,
            date: None,
            draft: false,
            slug: None,
            file_slug: String::new(),
            raw: String::new(),
            content: String::new(),
            excerpt: None,
            tags: Vec::new(),
            layout: "post.html".to_string(),
            full_source: PathBuf::from(&source),
            source,
            permalink: None,
            extra: HashMap::new(),
        }
    }
}

impl CollectionItem for Post {
    fn is_draft(&self) -> bool {
        self.draft
    }

    fn sort_key(&self) -> i64 {
        self.date.map(|d| d.timestamp_millis()).unwrap_or(0)
    }
}

/// A standalone page outside the posts collection
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Page title
    pub title: String,

    /// Page date, if any
    pub date: Option<DateTime<Utc>>,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Layout template to use
    pub layout: String,

    /// Source file path relative to the input dir
    pub source: String,

    /// Output URL path, `None` when the page opts out with `permalink: false`
    pub permalink: Option<String>,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Page {
    /// Create a new page with minimal required fields
    pub fn new(title: String, source: String) -> Self {
        Self {
            title,
            date: None,
            raw: String::new(),
            content: String::new(),
            layout: "page.html".to_string(),
            source,
            permalink: None,
            extra: HashMap::new(),
        }
    }
}
