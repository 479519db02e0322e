//! URL helper functions

use crate::config::SiteConfig;

/// Normalize a site path to start with a single `/`
///
/// # Examples
/// ```ignore
/// url_for("css/style.css") // -> "/css/style.css"
/// ```
pub fn url_for(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Absolute URL for a site path; absolute URLs pass through unchanged
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/posts/hello/") // -> "https://example.com/posts/hello/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
        return path.to_string();
    }
    format!("{}{}", config.url.trim_end_matches('/'), url_for(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        assert_eq!(url_for("/css/style.css"), "/css/style.css");
        assert_eq!(url_for("posts/a/"), "/posts/a/");
        assert_eq!(url_for(""), "/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/posts/a/"),
            "https://example.com/posts/a/"
        );
        assert_eq!(
            full_url_for(&config, "https://other.example/x"),
            "https://other.example/x"
        );
    }
}
