//! Progressive enhancement for rendered pages
//!
//! Pages produced by the generator are fully usable on their own. This
//! module adds optional behaviors on top of a loaded [`Document`]:
//!
//! - smooth scrolling for same-page anchor links
//! - `js-link` / `js-external-link` marker classes
//! - keyboard focus visibility and skip-link focus
//!
//! An [`Enhancer`] starts uninitialized and becomes active exactly once,
//! when the document offers DOM queries and event listeners. Each behavior
//! installs independently; a failing one is logged and the rest still run.
//! Nothing here ever reports an error to the reader of the page.
//!
//! ```ignore
//! let mut doc = Document::new("https://example.com/")?;
//! let body = doc.append(None, "body")?;
//! let link = doc.append(Some(body), "a")?;
//! doc.set_attribute(link, "href", "#comments")?;
//!
//! let mut page = Page::load(doc);
//! let event = page.click(link);
//! ```

pub mod dom;
mod error;
mod focus;
mod links;
mod scroll;

pub use dom::{
    Capabilities, Document, Element, ElementId, Event, EventKind, Key, ReadyState, Scroll,
    ScrollBehavior, ScrollBlock, Selector, Target,
};
pub use error::EnhanceError;
pub use focus::{FOCUSED_CLASS, KEYBOARD_NAV_CLASS};
pub use links::{is_external, EXTERNAL_LINK_CLASS, LINK_CLASS};

/// Enhancer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Active,
}

/// Per-page-view state shared by the installed handlers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnhancementState {
    /// Most recent input came from the keyboard
    pub keyboard_navigation: bool,
}

/// Outcome of one behavior's installation: listeners attached or links classed
pub type InstallResult = Result<usize, EnhanceError>;

/// Per-behavior installation results
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub smooth_scroll: InstallResult,
    pub links: InstallResult,
    pub focus: InstallResult,
}

impl InstallReport {
    pub fn all_installed(&self) -> bool {
        self.smooth_scroll.is_ok() && self.links.is_ok() && self.focus.is_ok()
    }
}

/// What `init` did
#[derive(Debug)]
pub enum InitOutcome {
    /// Required APIs are missing; the page stays unenhanced
    Unsupported,
    /// Document still loading; installation waits for `DOMContentLoaded`
    Deferred,
    /// Behaviors installed right away
    Installed(InstallReport),
    /// A previous call already initialized or deferred
    AlreadyInitialized,
}

/// Listener callbacks the enhancements attach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handler {
    RunEnhancements,
    SmoothScroll,
    TrackKeyboard,
    TrackPointer,
    MarkFocused,
    ClearFocused,
    SpaceActivatesLink,
    FocusSkipTarget,
    RestoreTabOrder,
}

/// The enhancement layer for one page view
#[derive(Debug)]
pub struct Enhancer {
    phase: Phase,
    deferred: bool,
    state: EnhancementState,
    report: Option<InstallReport>,
}

impl Enhancer {
    pub fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            deferred: false,
            state: EnhancementState::default(),
            report: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> EnhancementState {
        self.state
    }

    /// Results of the installation, once it has run
    pub fn report(&self) -> Option<&InstallReport> {
        self.report.as_ref()
    }
}

impl Default for Enhancer {
    fn default() -> Self {
        Self::new()
    }
}

/// A loaded page: its document plus the enhancer bound to it
#[derive(Debug)]
pub struct Page {
    pub document: Document,
    enhancer: Enhancer,
}

impl Page {
    /// Load a document and let the enhancement layer install itself
    pub fn load(document: Document) -> Self {
        let mut page = Self::new(document);
        page.init();
        page
    }

    /// Wrap a document without running `init`
    pub fn new(document: Document) -> Self {
        Self {
            document,
            enhancer: Enhancer::new(),
        }
    }

    pub fn enhancer(&self) -> &Enhancer {
        &self.enhancer
    }

    /// Activate the enhancements, at most once per page
    pub fn init(&mut self) -> InitOutcome {
        if self.enhancer.phase == Phase::Active || self.enhancer.deferred {
            return InitOutcome::AlreadyInitialized;
        }

        if !self.document.capabilities().has_required() {
            tracing::debug!("Required DOM APIs missing, page stays unenhanced");
            return InitOutcome::Unsupported;
        }

        if self.document.ready_state() == ReadyState::Loading {
            self.document.add_listener(
                Target::Document,
                EventKind::DomContentLoaded,
                Handler::RunEnhancements,
                true,
            );
            self.enhancer.deferred = true;
            return InitOutcome::Deferred;
        }

        InitOutcome::Installed(self.run_enhancements())
    }

    fn run_enhancements(&mut self) -> InstallReport {
        self.enhancer.phase = Phase::Active;

        let report = InstallReport {
            smooth_scroll: scroll::install(self),
            links: links::install(self),
            focus: focus::install(self),
        };

        for (name, result) in [
            ("smooth scroll", &report.smooth_scroll),
            ("link", &report.links),
            ("focus", &report.focus),
        ] {
            match result {
                Ok(count) => tracing::debug!("Installed {} enhancement ({})", name, count),
                Err(e) => tracing::error!("The {} enhancement failed: {}", name, e),
            }
        }

        self.enhancer.report = Some(report.clone());
        report
    }

    /// The document finished parsing: fire `DOMContentLoaded`
    pub fn finish_loading(&mut self) {
        self.document.set_ready_state(ReadyState::Interactive);
        self.dispatch(Event::new(EventKind::DomContentLoaded, Target::Document));
    }

    /// Dispatch an event through its propagation path, then apply the
    /// browser's default action unless a handler prevented it
    pub fn dispatch(&mut self, mut event: Event) -> Event {
        let path = if event.kind.bubbles() {
            self.document.propagation_path(event.target)
        } else {
            vec![event.target]
        };

        for current in path {
            for handler in self.document.take_handlers(current, event.kind) {
                if let Err(e) = self.run_handler(handler, current, &mut event) {
                    tracing::error!("Enhancement handler {:?} failed: {}", handler, e);
                }
            }
        }

        if event.kind == EventKind::Click && !event.default_prevented() {
            if let Target::Element(id) = event.target {
                if let Some(link) = self.document.enclosing_link(id) {
                    let href = self
                        .document
                        .attribute(link, "href")
                        .ok()
                        .flatten()
                        .unwrap_or("")
                        .to_string();
                    self.document.navigate(&href);
                }
            }
        }

        event
    }

    fn run_handler(
        &mut self,
        handler: Handler,
        current: Target,
        event: &mut Event,
    ) -> Result<(), EnhanceError> {
        let element = match current {
            Target::Element(id) => Some(id),
            Target::Document => None,
        };

        match (handler, element) {
            (Handler::RunEnhancements, _) => {
                self.run_enhancements();
                Ok(())
            }
            (Handler::TrackKeyboard, _) => focus::on_document_key_down(self, event),
            (Handler::TrackPointer, _) => focus::on_document_mouse_down(self),
            (Handler::SmoothScroll, Some(link)) => scroll::on_click(self, link, event),
            (Handler::MarkFocused, Some(el)) => focus::on_focus(self, el),
            (Handler::ClearFocused, Some(el)) => focus::on_blur(self, el),
            (Handler::SpaceActivatesLink, Some(el)) => focus::on_element_key_down(self, el, event),
            (Handler::FocusSkipTarget, Some(link)) => focus::on_skip_link_click(self, link, event),
            (Handler::RestoreTabOrder, Some(el)) => focus::on_skip_target_blur(self, el),
            (handler, None) => {
                tracing::warn!("{:?} attached to the document, ignoring", handler);
                Ok(())
            }
        }
    }

    /// `element.focus()`: blur the previous element, then focus this one.
    /// Returns whether focus moved.
    pub fn focus(&mut self, element: ElementId) -> bool {
        if !self.document.is_focusable(element) {
            return false;
        }
        if self.document.focused() == Some(element) {
            return true;
        }

        self.blur();
        self.document.set_focused(Some(element));
        self.dispatch(Event::new(EventKind::Focus, Target::Element(element)));
        true
    }

    /// Remove focus from the focused element, if any
    pub fn blur(&mut self) {
        if let Some(previous) = self.document.focused() {
            self.document.set_focused(None);
            self.dispatch(Event::new(EventKind::Blur, Target::Element(previous)));
        }
    }

    /// A mouse click: press (moving focus), then click
    pub fn click(&mut self, element: ElementId) -> Event {
        let pressed = self.dispatch(Event::mouse_down(Target::Element(element)));
        if !pressed.default_prevented() && self.document.is_focusable(element) {
            self.focus(element);
        }
        self.dispatch(Event::click(element))
    }

    /// A key press on the focused element (or the body). Tab moves focus to
    /// the next tabbable element unless prevented.
    pub fn press_key(&mut self, key: Key) -> Event {
        let target = self
            .document
            .focused()
            .or_else(|| self.document.body())
            .map(Target::Element)
            .unwrap_or(Target::Document);

        let event = self.dispatch(Event::key_down(target, key));

        if event.key == Some(Key::Tab) && !event.default_prevented() {
            if let Some(next) = self.document.next_tabbable(self.document.focused()) {
                self.focus(next);
            }
        }
        event
    }
}
