//! Ready-made receivers
//!
//! - [`ActionMap`]: named closures, dispatched by method name.
//! - [`ForwardingProxy`]: a single `send` closure taking the action name.
//! - [`ModelProxy`]: wraps an underlying model; parameters pointing at it
//!   are unwrapped before dispatch.

use std::cell::RefCell;
use std::fmt;

use compact_str::CompactString;
use indexmap::IndexMap;

use crate::controller::traits::{DirectReceiver, ForwardingReceiver, Receiver};
use crate::model::value::Value;

type Method = Box<dyn Fn(&[Value])>;

/// Receiver exposing only named methods.
pub struct ActionMap {
    name: CompactString,
    methods: IndexMap<CompactString, Method>,
}

impl ActionMap {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            methods: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_method(
        mut self,
        name: impl Into<CompactString>,
        method: impl Fn(&[Value]) + 'static,
    ) -> Self {
        self.insert(name, method);
        self
    }

    pub fn insert(&mut self, name: impl Into<CompactString>, method: impl Fn(&[Value]) + 'static) {
        self.methods.insert(name.into(), Box::new(method));
    }
}

impl DirectReceiver for ActionMap {
    fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    fn call(&self, name: &str, args: &[Value]) {
        if let Some(method) = self.methods.get(name) {
            method(args);
        }
    }
}

impl Receiver for ActionMap {
    fn describe(&self) -> CompactString {
        self.name.clone()
    }

    fn as_direct(&self) -> Option<&dyn DirectReceiver> {
        Some(self)
    }
}

impl fmt::Debug for ActionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionMap")
            .field("name", &self.name)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Receiver with the generic `send(name, ...args)` capability.
pub struct ForwardingProxy {
    name: CompactString,
    send: Box<dyn Fn(&str, &[Value])>,
}

impl ForwardingProxy {
    pub fn new(name: impl Into<CompactString>, send: impl Fn(&str, &[Value]) + 'static) -> Self {
        Self {
            name: name.into(),
            send: Box::new(send),
        }
    }
}

impl ForwardingReceiver for ForwardingProxy {
    fn send(&self, action: &str, args: &[Value]) {
        (self.send)(action, args);
    }
}

impl Receiver for ForwardingProxy {
    fn describe(&self) -> CompactString {
        self.name.clone()
    }

    fn as_forwarding(&self) -> Option<&dyn ForwardingReceiver> {
        Some(self)
    }
}

/// Controller-like wrapper around a model value.
pub struct ModelProxy {
    name: CompactString,
    model: RefCell<Value>,
    actions: Option<ActionMap>,
}

impl ModelProxy {
    pub fn new(name: impl Into<CompactString>, model: Value) -> Self {
        Self {
            name: name.into(),
            model: RefCell::new(model),
            actions: None,
        }
    }

    #[must_use]
    pub fn with_actions(mut self, actions: ActionMap) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn set_model(&self, model: Value) {
        *self.model.borrow_mut() = model;
    }
}

impl Receiver for ModelProxy {
    fn describe(&self) -> CompactString {
        self.name.clone()
    }

    fn as_direct(&self) -> Option<&dyn DirectReceiver> {
        self.actions.as_ref().map(|actions| actions as &dyn DirectReceiver)
    }

    fn model(&self) -> Option<Value> {
        Some(self.model.borrow().clone())
    }
}
