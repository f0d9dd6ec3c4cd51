//! Rendered element handle: carries action tokens and fires teardown once

use std::cell::{Cell, RefCell};
use std::fmt;

use compact_str::CompactString;
use indexmap::IndexMap;
use tracing::trace;

use crate::model::binding::ActionId;

/// Attribute holding the space separated action tokens of an element.
pub const ACTION_ATTRIBUTE: &str = "data-action-id";

type TeardownListener = Box<dyn FnOnce()>;

pub struct Element {
    tag: CompactString,
    attributes: RefCell<IndexMap<CompactString, CompactString>>,
    teardown_listeners: RefCell<Vec<TeardownListener>>,
    torn_down: Cell<bool>,
}

impl Element {
    pub fn new(tag: impl Into<CompactString>) -> Self {
        Self {
            tag: tag.into(),
            attributes: RefCell::new(IndexMap::new()),
            teardown_listeners: RefCell::new(Vec::new()),
            torn_down: Cell::new(false),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_attribute(&self, name: impl Into<CompactString>, value: impl Into<CompactString>) {
        self.attributes.borrow_mut().insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<CompactString> {
        self.attributes.borrow().get(name).cloned()
    }

    /// Record an action token on the element.
    pub fn add_action_id(&self, id: ActionId) {
        let mut attributes = self.attributes.borrow_mut();
        let entry = attributes
            .entry(CompactString::const_new(ACTION_ATTRIBUTE))
            .or_default();

        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(&id.to_string());
    }

    /// Tokens recorded on the element, in bind order.
    pub fn action_ids(&self) -> Vec<ActionId> {
        self.attributes
            .borrow()
            .get(ACTION_ATTRIBUTE)
            .map(|raw| {
                raw.split_whitespace()
                    .filter_map(|token| token.parse::<u64>().ok())
                    .map(ActionId::from_raw)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Listeners added after teardown run immediately.
    pub fn on_teardown(&self, listener: impl FnOnce() + 'static) {
        if self.torn_down.get() {
            listener();
            return;
        }
        self.teardown_listeners.borrow_mut().push(Box::new(listener));
    }

    /// Fire teardown listeners. Subsequent calls are no-ops.
    pub fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }

        let listeners = std::mem::take(&mut *self.teardown_listeners.borrow_mut());
        trace!(tag = %self.tag, listeners = listeners.len(), "element teardown");

        for listener in listeners {
            listener();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes.borrow())
            .field("torn_down", &self.torn_down.get())
            .finish()
    }
}
