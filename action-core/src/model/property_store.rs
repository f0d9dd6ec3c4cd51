//! In-memory reactive store implementing `ValueSubscriber`
//!
//! Paths are flat keys; the template context is not consulted. Hosts with a
//! real observation system plug in their own subscriber instead.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::controller::traits::{DynamicResolver, ValueSubscriber};
use crate::model::context::TemplateContext;
use crate::model::value::Value;

#[derive(Debug, Default)]
struct Subscriptions {
    opened: Cell<usize>,
    disposed: Cell<usize>,
}

#[derive(Debug, Default, Clone)]
pub struct PropertyStore {
    values: Rc<RefCell<FxHashMap<CompactString, Value>>>,
    subscriptions: Rc<Subscriptions>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, path: impl Into<CompactString>, value: Value) {
        self.values.borrow_mut().insert(path.into(), value);
    }

    /// Missing paths read as `Undefined`.
    pub fn get(&self, path: &str) -> Value {
        self.values.borrow().get(path).cloned().unwrap_or_default()
    }

    pub fn remove(&self, path: &str) -> Option<Value> {
        self.values.borrow_mut().remove(path)
    }

    /// Subscriptions opened and not yet disposed.
    pub fn live_subscriptions(&self) -> usize {
        self.subscriptions.opened.get() - self.subscriptions.disposed.get()
    }

    pub fn disposed_subscriptions(&self) -> usize {
        self.subscriptions.disposed.get()
    }
}

impl ValueSubscriber for PropertyStore {
    fn subscribe(&self, path: &str, _context: &TemplateContext) -> Box<dyn DynamicResolver> {
        let opened = &self.subscriptions.opened;
        opened.set(opened.get() + 1);
        trace!(path, "subscribed");

        Box::new(StoreResolver {
            path: CompactString::new(path),
            values: self.values.clone(),
            subscriptions: self.subscriptions.clone(),
        })
    }
}

struct StoreResolver {
    path: CompactString,
    values: Rc<RefCell<FxHashMap<CompactString, Value>>>,
    subscriptions: Rc<Subscriptions>,
}

impl DynamicResolver for StoreResolver {
    fn path(&self) -> &str {
        &self.path
    }

    fn current_value(&self) -> Value {
        self.values
            .borrow()
            .get(self.path.as_str())
            .cloned()
            .unwrap_or_default()
    }

    fn dispose(&mut self) {
        let disposed = &self.subscriptions.disposed;
        disposed.set(disposed.get() + 1);
        trace!(path = %self.path, "subscription disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_reads_live_value() {
        let store = PropertyStore::new();
        store.set("post.title", Value::from("first"));

        let resolver = store.subscribe("post.title", &TemplateContext::default());
        assert_eq!(resolver.current_value(), Value::from("first"));

        store.set("post.title", Value::from("second"));
        assert_eq!(resolver.current_value(), Value::from("second"));

        store.remove("post.title");
        assert!(resolver.current_value().is_undefined());
    }

    #[test]
    fn test_subscription_accounting() {
        let store = PropertyStore::new();
        let mut a = store.subscribe("a", &TemplateContext::default());
        let _b = store.subscribe("b", &TemplateContext::default());
        assert_eq!(store.live_subscriptions(), 2);

        a.dispose();
        assert_eq!(store.live_subscriptions(), 1);
        assert_eq!(store.disposed_subscriptions(), 1);
    }
}
