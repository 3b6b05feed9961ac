//! Attribute values and event handlers
//!
//! Attributes are a flat name -> value map. Names starting with the `on`
//! marker followed by an uppercase letter are event handlers (`onClick`
//! listens for `click`); everything else is a plain attribute.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Attribute holding a text node's content
pub const NODE_VALUE: &str = "nodeValue";

/// Reserved name; children are never stored as an attribute
pub const CHILDREN: &str = "children";

/// Prefix marking an event-handler attribute
pub const EVENT_PREFIX: &str = "on";

/// Attribute mapping for one element
pub type Attributes = BTreeMap<String, AttrValue>;

/// Event delivered by the host to a listener
#[derive(Clone, Debug, PartialEq)]
pub struct HostEvent {
    /// Host event name, e.g. `click`
    pub name: String,
    /// Optional host-specific payload
    pub detail: Option<String>,
}

impl HostEvent {
    pub fn new(name: impl Into<String>) -> Self {
        HostEvent {
            name: name.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Shared event handler; equality is identity of the shared closure
#[derive(Clone)]
pub struct EventHandler(Arc<dyn Fn(&HostEvent) + Send + Sync>);

impl EventHandler {
    pub fn new(f: impl Fn(&HostEvent) + Send + Sync + 'static) -> Self {
        EventHandler(Arc::new(f))
    }

    pub fn call(&self, event: &HostEvent) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// Attribute value
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(EventHandler),
}

impl AttrValue {
    pub fn is_handler(&self) -> bool {
        matches!(self, AttrValue::Handler(_))
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            AttrValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render a plain value the way a host would store it
    pub fn to_host_string(&self) -> String {
        match self {
            AttrValue::Text(s) => s.clone(),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(f) => f.to_string(),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Handler(_) => String::new(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Int(i as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<EventHandler> for AttrValue {
    fn from(h: EventHandler) -> Self {
        AttrValue::Handler(h)
    }
}

/// Is this attribute name an event handler?
pub fn is_event(name: &str) -> bool {
    name.strip_prefix(EVENT_PREFIX)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Host event name for an event attribute (`onClick` -> `click`)
pub fn event_name(name: &str) -> Option<String> {
    if is_event(name) {
        Some(name[EVENT_PREFIX.len()..].to_ascii_lowercase())
    } else {
        None
    }
}

/// Is this attribute something the host stores as a plain property?
pub fn is_property(name: &str) -> bool {
    name != CHILDREN && !is_event(name)
}
