//! Marker classes on links

use url::Url;

use super::dom::Selector;
use super::error::EnhanceError;
use super::Page;

/// Class added to every link
pub const LINK_CLASS: &str = "js-link";

/// Class added to links leaving the current host
pub const EXTERNAL_LINK_CLASS: &str = "js-external-link";

/// Class every `a[href]`, and mark the ones pointing at another host.
/// Returns the number of links classed.
pub(super) fn install(page: &mut Page) -> Result<usize, EnhanceError> {
    let location = page.document.location().clone();
    let links = page.document.select(Selector::Links);

    for link in &links {
        page.document.add_class(*link, LINK_CLASS)?;

        let href = page.document.attribute(*link, "href")?.unwrap_or("").to_string();
        match is_external(&location, &href) {
            Ok(true) => page.document.add_class(*link, EXTERNAL_LINK_CLASS)?,
            Ok(false) => {}
            Err(e) => tracing::debug!("Leaving {:?} without an external marker: {}", href, e),
        }
    }

    Ok(links.len())
}

/// Whether `href`, resolved against the page, is an http(s) URL on another host
pub fn is_external(location: &Url, href: &str) -> Result<bool, url::ParseError> {
    let resolved = location.join(href)?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return Ok(false);
    }
    Ok(resolved.host_str() != location.host_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/posts/hello/").unwrap()
    }

    #[test]
    fn test_is_external() {
        let location = page_url();
        assert!(is_external(&location, "https://external.example.com").unwrap());
        assert!(is_external(&location, "//cdn.example.net/lib.js").unwrap());
        assert!(!is_external(&location, "https://example.com/about/").unwrap());
        assert!(!is_external(&location, "HTTPS://EXAMPLE.COM:8443/").unwrap());
        assert!(!is_external(&location, "/about/").unwrap());
        assert!(!is_external(&location, "#top").unwrap());
        assert!(!is_external(&location, "mailto:me@elsewhere.org").unwrap());
    }

    #[test]
    fn test_malformed_url_is_an_error() {
        assert!(is_external(&page_url(), "http://[::1").is_err());
        assert!(is_external(&page_url(), "https://exa mple.com/").is_err());
    }
}
