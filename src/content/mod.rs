//! Content module - posts, pages, front-matter and permalinks

mod frontmatter;
pub mod loader;
mod markdown;
pub mod permalink;
mod post;

pub use frontmatter::{is_truthy, parse_date_string, FrontMatter};
pub use markdown::MarkdownRenderer;
pub use post::{Page, Post};
