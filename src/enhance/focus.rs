//! Keyboard focus visibility and skip-link focus

use super::dom::{ElementId, Event, EventKind, Key, ScrollBehavior, ScrollBlock, Selector, Target};
use super::error::EnhanceError;
use super::{Handler, Page};

/// Body class while the reader navigates with the keyboard
pub const KEYBOARD_NAV_CLASS: &str = "js-keyboard-nav";

/// Class on an interactive element focused during keyboard navigation
pub const FOCUSED_CLASS: &str = "js-focused";

/// Install keyboard tracking, focus marking, Space activation for links and
/// skip-link focus. Fails without a body, before anything is attached.
pub(super) fn install(page: &mut Page) -> Result<usize, EnhanceError> {
    page.document.body().ok_or(EnhanceError::MissingBody)?;

    let document = &mut page.document;
    document.add_listener(Target::Document, EventKind::KeyDown, Handler::TrackKeyboard, false);
    document.add_listener(Target::Document, EventKind::MouseDown, Handler::TrackPointer, false);
    let mut installed = 2;

    for element in document.select(Selector::Interactive) {
        let target = Target::Element(element);
        document.add_listener(target, EventKind::Focus, Handler::MarkFocused, false);
        document.add_listener(target, EventKind::Blur, Handler::ClearFocused, false);
        document.add_listener(target, EventKind::KeyDown, Handler::SpaceActivatesLink, false);
        installed += 3;
    }

    for link in document.select(Selector::SamePageLinks) {
        document.add_listener(Target::Element(link), EventKind::Click, Handler::FocusSkipTarget, false);
        installed += 1;
    }

    Ok(installed)
}

/// Tab switches the page into keyboard navigation
pub(super) fn on_document_key_down(page: &mut Page, event: &Event) -> Result<(), EnhanceError> {
    if event.key != Some(Key::Tab) {
        return Ok(());
    }
    let body = page.document.body().ok_or(EnhanceError::MissingBody)?;
    page.enhancer.state.keyboard_navigation = true;
    page.document.add_class(body, KEYBOARD_NAV_CLASS)
}

/// Any mouse press leaves keyboard navigation
pub(super) fn on_document_mouse_down(page: &mut Page) -> Result<(), EnhanceError> {
    let body = page.document.body().ok_or(EnhanceError::MissingBody)?;
    page.enhancer.state.keyboard_navigation = false;
    page.document.remove_class(body, KEYBOARD_NAV_CLASS)
}

pub(super) fn on_focus(page: &mut Page, element: ElementId) -> Result<(), EnhanceError> {
    if !page.enhancer.state.keyboard_navigation {
        return Ok(());
    }
    page.document.add_class(element, FOCUSED_CLASS)?;
    page.document
        .scroll_into_view(element, ScrollBehavior::Smooth, ScrollBlock::Nearest)
}

pub(super) fn on_blur(page: &mut Page, element: ElementId) -> Result<(), EnhanceError> {
    page.document.remove_class(element, FOCUSED_CLASS)
}

/// Space on a link follows it, like Enter does natively
pub(super) fn on_element_key_down(
    page: &mut Page,
    element: ElementId,
    event: &mut Event,
) -> Result<(), EnhanceError> {
    if event.key != Some(Key::Space) || page.document.element(element)?.tag() != "a" {
        return Ok(());
    }
    event.prevent_default();
    page.dispatch(Event::click(element));
    Ok(())
}

/// Move focus to an in-page anchor's target so "skip to content" lands there
pub(super) fn on_skip_link_click(
    page: &mut Page,
    link: ElementId,
    event: &mut Event,
) -> Result<(), EnhanceError> {
    let href = page.document.attribute(link, "href")?.unwrap_or("");
    let target_id = href.strip_prefix('#').unwrap_or(href).to_string();

    let Some(target) = page.document.get_element_by_id(&target_id) else {
        return Ok(());
    };

    event.prevent_default();
    page.document.set_attribute(target, "tabindex", "-1")?;
    page.focus(target);
    page.document
        .add_listener(Target::Element(target), EventKind::Blur, Handler::RestoreTabOrder, true);
    Ok(())
}

/// The target's temporary `tabindex` goes away once focus leaves it
pub(super) fn on_skip_target_blur(page: &mut Page, target: ElementId) -> Result<(), EnhanceError> {
    page.document.remove_attribute(target, "tabindex")
}
