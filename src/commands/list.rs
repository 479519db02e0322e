//! List site content

use anyhow::Result;
use std::fmt::Write as _;

use crate::collection;
use crate::content::loader::ContentLoader;
use crate::content::Post;
use crate::helpers::format_date;
use crate::Blog;

/// List posts, drafts or pages
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    print!("{}", render(blog, content_type)?);
    Ok(())
}

fn render(blog: &Blog, content_type: &str) -> Result<String> {
    let loader = ContentLoader::new(blog);
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts = loader.load_posts()?;
            let published = collection::published(&posts);
            writeln!(out, "Posts ({}):", published.len())?;
            for post in published {
                writeln!(out, "  {}", describe_post(post))?;
            }
        }
        "draft" | "drafts" => {
            let posts = loader.load_posts()?;
            let drafts = collection::drafts(&posts);
            writeln!(out, "Drafts ({}):", drafts.len())?;
            for post in drafts {
                writeln!(out, "  {}", describe_post(post))?;
            }
        }
        "page" | "pages" => {
            let pages = loader.load_pages()?;
            writeln!(out, "Pages ({}):", pages.len())?;
            for page in pages {
                writeln!(
                    out,
                    "  {} {} [{}]",
                    page.permalink.as_deref().unwrap_or("-"),
                    page.title,
                    page.source
                )?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, drafts, pages",
                content_type
            );
        }
    }

    Ok(out)
}

fn describe_post(post: &Post) -> String {
    let date = post
        .date
        .map(|d| format_date(&d, None))
        .unwrap_or_else(|| "----------".to_string());
    format!(
        "{} - {} {} [{}]",
        date,
        post.title,
        post.permalink.as_deref().unwrap_or("(draft)"),
        post.source
    )
}
