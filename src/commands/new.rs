//! Create a new post

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::Blog;

/// Directory new posts go in: the literal prefix of the posts glob
fn posts_dir(blog: &Blog) -> PathBuf {
    let literal: PathBuf = Path::new(&blog.config.posts_glob)
        .components()
        .take_while(|c| {
            let part = c.as_os_str().to_string_lossy();
            !part.contains(['*', '?', '[', '{'])
        })
        .collect();

    // A glob without wildcards names a single file; use its directory
    let dir = if literal.extension().is_some() {
        literal.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        literal
    };
    blog.input_dir.join(dir)
}

/// Write `posts/<slug>.md` with front matter. Fails if the file exists.
pub fn create_post(blog: &Blog, title: &str, draft: bool, slug: Option<&str>) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    let slug = if slug.is_empty() {
        blog.config.default_slug.clone()
    } else {
        slug
    };

    let target_dir = posts_dir(blog);
    fs::create_dir_all(&target_dir)
        .with_context(|| format!("Failed to create {:?}", target_dir))?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Utc::now();
    let content = format!(
        "---\ntitle: {}\ndate: {}\ndraft: {}\nslug: {}\n---\n",
        serde_json::to_string(title)?,
        now.format("%Y-%m-%d %H:%M:%S"),
        draft,
        slug
    );

    fs::write(&file_path, content).with_context(|| format!("Failed to write {:?}", file_path))?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::loader::ContentLoader;

    #[test]
    fn test_create_post_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "Hello: World!", true, None).unwrap();
        assert_eq!(path, dir.path().join("posts/hello-world.md"));

        let posts = ContentLoader::new(&blog).load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Hello: World!");
        assert!(posts[0].draft);
        assert_eq!(posts[0].slug.as_deref(), Some("hello-world"));
        assert!(posts[0].date.is_some());
        assert_eq!(posts[0].permalink, None);
    }

    #[test]
    fn test_create_post_with_slug_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "Anything", false, Some("My Slug")).unwrap();
        assert_eq!(path.file_name().unwrap(), "my-slug.md");
        assert!(create_post(&blog, "Other", false, Some("my-slug")).is_err());
    }

    #[test]
    fn test_posts_dir_follows_glob() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blog.yml"), "posts_glob: content/blog/**/*.md\n").unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(posts_dir(&blog), dir.path().join("content/blog"));

        let path = create_post(&blog, "!!!", false, None).unwrap();
        assert_eq!(path, dir.path().join("content/blog/post.md"));
    }
}
