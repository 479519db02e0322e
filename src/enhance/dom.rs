//! In-memory document model the enhancement layer runs against

use indexmap::IndexMap;
use url::Url;

use super::error::EnhanceError;
use super::Handler;

/// Handle to an element of one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

/// A DOM element
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    classes: Vec<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    /// Lowercase tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

/// Platform APIs the page happens to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub query_selector: bool,
    pub event_listeners: bool,
    /// CSS `scroll-behavior` support
    pub scroll_behavior: bool,
    /// `history.pushState`
    pub history: bool,
}

impl Capabilities {
    /// A modern browser
    pub fn full() -> Self {
        Self {
            query_selector: true,
            event_listeners: true,
            scroll_behavior: true,
            history: true,
        }
    }

    /// No scripting APIs at all
    pub fn none() -> Self {
        Self {
            query_selector: false,
            event_listeners: false,
            scroll_behavior: false,
            history: false,
        }
    }

    /// DOM queries and event listeners, without which nothing is installed
    pub fn has_required(&self) -> bool {
        self.query_selector && self.event_listeners
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}

/// `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// Where an event is dispatched or a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Document,
    Element(ElementId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    DomContentLoaded,
    Click,
    KeyDown,
    MouseDown,
    Focus,
    Blur,
}

impl EventKind {
    /// Focus events fire on their target only
    pub fn bubbles(self) -> bool {
        !matches!(self, EventKind::Focus | EventKind::Blur)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Tab,
    Enter,
    Space,
    Other(String),
}

impl Key {
    /// Key from a `KeyboardEvent.key` value
    pub fn from_name(name: &str) -> Self {
        match name {
            "Tab" => Key::Tab,
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            other => Key::Other(other.to_string()),
        }
    }
}

/// A dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: Target,
    pub key: Option<Key>,
    default_prevented: bool,
}

impl Event {
    pub fn new(kind: EventKind, target: Target) -> Self {
        Self {
            kind,
            target,
            key: None,
            default_prevented: false,
        }
    }

    pub fn click(element: ElementId) -> Self {
        Self::new(EventKind::Click, Target::Element(element))
    }

    pub fn key_down(target: Target, key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::new(EventKind::KeyDown, target)
        }
    }

    pub fn mouse_down(target: Target) -> Self {
        Self::new(EventKind::MouseDown, target)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Nearest,
}

/// One `scrollIntoView` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scroll {
    pub element: ElementId,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

/// Element sets the enhancements query for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `a[href]`
    Links,
    /// `a[href^="#"]`
    SamePageLinks,
    /// `a, button, input, textarea, select, [tabindex]:not([tabindex="-1"])`
    Interactive,
}

impl Selector {
    fn matches(self, element: &Element) -> bool {
        let href = element.attribute("href");
        match self {
            Selector::Links => element.tag == "a" && href.is_some(),
            Selector::SamePageLinks => {
                element.tag == "a" && href.map(|h| h.starts_with('#')).unwrap_or(false)
            }
            Selector::Interactive => {
                matches!(
                    element.tag.as_str(),
                    "a" | "button" | "input" | "textarea" | "select"
                ) || element
                    .attribute("tabindex")
                    .map(|t| t != "-1")
                    .unwrap_or(false)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Listener {
    target: Target,
    kind: EventKind,
    handler: Handler,
    once: bool,
}

/// A rendered page's document
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    body: Option<ElementId>,
    capabilities: Capabilities,
    ready_state: ReadyState,
    location: Url,
    listeners: Vec<Listener>,
    history: Vec<String>,
    scrolls: Vec<Scroll>,
    navigations: Vec<String>,
    focused: Option<ElementId>,
}

impl Document {
    /// Empty, fully loaded document at `location`
    pub fn new(location: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            elements: Vec::new(),
            body: None,
            capabilities: Capabilities::full(),
            ready_state: ReadyState::Complete,
            location: Url::parse(location)?,
            listeners: Vec::new(),
            history: Vec::new(),
            scrolls: Vec::new(),
            navigations: Vec::new(),
            focused: None,
        })
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_ready_state(mut self, ready_state: ReadyState) -> Self {
        self.ready_state = ready_state;
        self
    }

    /// Append a new element under `parent` (or as a root). The first `body`
    /// element becomes the document body.
    pub fn append(&mut self, parent: Option<ElementId>, tag: &str) -> Result<ElementId, EnhanceError> {
        if let Some(parent) = parent {
            self.element(parent)?;
        }

        let id = ElementId(self.elements.len());
        let tag = tag.to_ascii_lowercase();
        if tag == "body" && self.body.is_none() {
            self.body = Some(id);
        }
        self.elements.push(Element {
            tag,
            attributes: IndexMap::new(),
            classes: Vec::new(),
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.elements[parent.0].children.push(id);
        }
        Ok(id)
    }

    pub fn element(&self, id: ElementId) -> Result<&Element, EnhanceError> {
        self.elements.get(id.0).ok_or(EnhanceError::UnknownElement(id))
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, EnhanceError> {
        self.elements
            .get_mut(id.0)
            .ok_or(EnhanceError::UnknownElement(id))
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Result<Option<&str>, EnhanceError> {
        Ok(self.element(id)?.attribute(name))
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), EnhanceError> {
        let element = self.element_mut(id)?;
        if name == "class" {
            element.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            element.attributes.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> Result<(), EnhanceError> {
        self.element_mut(id)?.attributes.shift_remove(name);
        Ok(())
    }

    /// `classList.add`
    pub fn add_class(&mut self, id: ElementId, class: &str) -> Result<(), EnhanceError> {
        let element = self.element_mut(id)?;
        if !element.has_class(class) {
            element.classes.push(class.to_string());
        }
        Ok(())
    }

    /// `classList.remove`
    pub fn remove_class(&mut self, id: ElementId, class: &str) -> Result<(), EnhanceError> {
        self.element_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id).map(|e| e.has_class(class)).unwrap_or(false)
    }

    pub fn body(&self) -> Option<ElementId> {
        self.body
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub(crate) fn set_ready_state(&mut self, ready_state: ReadyState) {
        self.ready_state = ready_state;
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Elements in document (pre-)order
    fn document_order(&self) -> Vec<ElementId> {
        let mut order = Vec::with_capacity(self.elements.len());
        let mut stack: Vec<ElementId> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.parent.is_none())
            .map(|(i, _)| ElementId(i))
            .rev()
            .collect();

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.elements[id.0].children.iter().rev().copied());
        }
        order
    }

    /// `querySelectorAll` for the fixed selectors the enhancements use
    pub fn select(&self, selector: Selector) -> Vec<ElementId> {
        self.document_order()
            .into_iter()
            .filter(|id| selector.matches(&self.elements[id.0]))
            .collect()
    }

    /// `getElementById`
    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        if id.is_empty() {
            return None;
        }
        self.document_order()
            .into_iter()
            .find(|e| self.elements[e.0].attribute("id") == Some(id))
    }

    /// `querySelector` restricted to a single `#id` selector, the shape of an
    /// in-page anchor's `href`.
    ///
    /// Anything else is [`EnhanceError::InvalidSelector`], including input a
    /// browser would accept: type selectors (`section`), compound selectors
    /// (`#a.b`, `#a[x]`), combinators (`#a b`) and CSS escapes (`#\31 st`).
    /// Callers treat the error the way a browser's `SyntaxError` is treated:
    /// the anchor is left to its default behavior.
    pub fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, EnhanceError> {
        let id = selector
            .strip_prefix('#')
            .filter(|id| is_css_identifier(id))
            .ok_or_else(|| EnhanceError::InvalidSelector(selector.to_string()))?;
        Ok(self.get_element_by_id(id))
    }

    /// Whether `focus()` would move focus to the element
    pub fn is_focusable(&self, id: ElementId) -> bool {
        let Ok(element) = self.element(id) else {
            return false;
        };
        match element.tag.as_str() {
            "a" => element.attribute("href").is_some() || element.attribute("tabindex").is_some(),
            "button" | "input" | "textarea" | "select" => true,
            _ => element.attribute("tabindex").is_some(),
        }
    }

    /// Reachable with the Tab key
    pub fn is_tabbable(&self, id: ElementId) -> bool {
        self.is_focusable(id)
            && self
                .attribute(id, "tabindex")
                .ok()
                .flatten()
                .and_then(|t| t.trim().parse::<i32>().ok())
                .map(|t| t >= 0)
                .unwrap_or(true)
    }

    /// Next tabbable element after `from` in document order
    pub fn next_tabbable(&self, from: Option<ElementId>) -> Option<ElementId> {
        let order = self.document_order();
        let start = match from {
            Some(from) => order.iter().position(|id| *id == from)? + 1,
            None => 0,
        };
        order[start..].iter().copied().find(|id| self.is_tabbable(*id))
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    pub(crate) fn set_focused(&mut self, focused: Option<ElementId>) {
        self.focused = focused;
    }

    /// `element.scrollIntoView(options)`
    pub fn scroll_into_view(
        &mut self,
        element: ElementId,
        behavior: ScrollBehavior,
        block: ScrollBlock,
    ) -> Result<(), EnhanceError> {
        self.element(element)?;
        self.scrolls.push(Scroll {
            element,
            behavior,
            block,
        });
        Ok(())
    }

    pub fn scrolls(&self) -> &[Scroll] {
        &self.scrolls
    }

    /// `history.pushState(null, null, url)`: updates the location without loading
    pub fn push_state(&mut self, url: &str) -> Result<(), EnhanceError> {
        let next = self
            .location
            .join(url)
            .map_err(|e| EnhanceError::InvalidUrl(url.to_string(), e))?;
        self.location = next;
        self.history.push(url.to_string());
        Ok(())
    }

    /// URLs pushed onto history by script
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Default link navigation, taken when a click is not prevented
    pub(crate) fn navigate(&mut self, href: &str) {
        self.navigations.push(href.to_string());
    }

    /// Hrefs followed by the browser's default click action
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Nearest `a[href]` at or above the element
    pub(crate) fn enclosing_link(&self, id: ElementId) -> Option<ElementId> {
        let mut current = Some(id);
        while let Some(id) = current {
            let element = self.elements.get(id.0)?;
            if Selector::Links.matches(element) {
                return Some(id);
            }
            current = element.parent;
        }
        None
    }

    /// Target followed by its ancestors and finally the document
    pub(crate) fn propagation_path(&self, target: Target) -> Vec<Target> {
        let mut path = Vec::new();
        if let Target::Element(id) = target {
            let mut current = Some(id);
            while let Some(id) = current {
                path.push(Target::Element(id));
                current = self.elements.get(id.0).and_then(|e| e.parent);
            }
        }
        path.push(Target::Document);
        path
    }

    pub(crate) fn add_listener(&mut self, target: Target, kind: EventKind, handler: Handler, once: bool) {
        self.listeners.push(Listener {
            target,
            kind,
            handler,
            once,
        });
    }

    /// Handlers for `target`/`kind` in registration order; one-shot listeners are removed
    pub(crate) fn take_handlers(&mut self, target: Target, kind: EventKind) -> Vec<Handler> {
        let handlers = self
            .listeners
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .map(|l| l.handler)
            .collect();
        self.listeners
            .retain(|l| !(l.once && l.target == target && l.kind == kind));
        handlers
    }

    /// Number of installed event listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners attached to one target
    pub fn listeners_on(&self, target: Target) -> usize {
        self.listeners.iter().filter(|l| l.target == target).count()
    }
}

/// A bare CSS identifier: no leading digit (or `-digit`), only name characters.
///
/// Escapes are not decoded, and `.`, `[`, `:` or whitespace end the check with
/// `false`, so an id selector with anything after the identifier is rejected.
fn is_css_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    let second = chars.next();

    if first.is_ascii_digit() || (first == '-' && second.map(|c| c.is_ascii_digit()).unwrap_or(false)) {
        return false;
    }
    if first == '-' && second.is_none() {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
}
