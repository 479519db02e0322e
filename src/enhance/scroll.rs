//! Smooth scrolling for same-page anchor links

use super::dom::{ElementId, Event, EventKind, ScrollBehavior, ScrollBlock, Selector, Target};
use super::error::EnhanceError;
use super::{Handler, Page};

/// Attach the click handler to every `a[href^="#"]`. Does nothing when the
/// platform lacks `scroll-behavior` support.
pub(super) fn install(page: &mut Page) -> Result<usize, EnhanceError> {
    if !page.document.capabilities().scroll_behavior {
        tracing::debug!("scroll-behavior unsupported, leaving anchor links alone");
        return Ok(0);
    }

    let links = page.document.select(Selector::SamePageLinks);
    for link in &links {
        page.document
            .add_listener(Target::Element(*link), EventKind::Click, Handler::SmoothScroll, false);
    }
    Ok(links.len())
}

/// Scroll to the link's target instead of jumping, and record the fragment
pub(super) fn on_click(page: &mut Page, link: ElementId, event: &mut Event) -> Result<(), EnhanceError> {
    let href = page.document.attribute(link, "href")?.unwrap_or("").to_string();
    if href.is_empty() || href == "#" {
        return Ok(());
    }

    let Some(target) = page.document.query_selector(&href)? else {
        return Ok(());
    };

    event.prevent_default();
    page.document
        .scroll_into_view(target, ScrollBehavior::Smooth, ScrollBlock::Start)?;

    if page.document.capabilities().history {
        page.document.push_state(&href)?;
    }
    Ok(())
}
