use compact_str::CompactString;

use crate::error::ActionResult;
use crate::model::context::TemplateContext;
use crate::model::value::Value;

/// An object an action can be dispatched to.
///
/// Capabilities are probed at dispatch time: a receiver may forward
/// arbitrary action names, expose named methods, or neither.
pub trait Receiver {
    /// Human readable name used in diagnostics.
    fn describe(&self) -> CompactString;

    fn as_forwarding(&self) -> Option<&dyn ForwardingReceiver> {
        None
    }

    fn as_direct(&self) -> Option<&dyn DirectReceiver> {
        None
    }

    /// Underlying model for receivers that wrap one (controller-like proxies).
    fn model(&self) -> Option<Value> {
        None
    }
}

/// Generic `send(name, ...args)` capability.
pub trait ForwardingReceiver {
    fn send(&self, action: &str, args: &[Value]);
}

/// Named-method capability.
pub trait DirectReceiver {
    fn has_method(&self, name: &str) -> bool;

    fn call(&self, name: &str, args: &[Value]);
}

/// A live subscription to a path expression.
pub trait DynamicResolver {
    /// Source path text, e.g. `controller.selectedAction`.
    fn path(&self) -> &str;

    fn current_value(&self) -> Value;

    /// Release the subscription. Callers guarantee a single call.
    fn dispose(&mut self);
}

/// Reactive value-subscription mechanism.
pub trait ValueSubscriber {
    fn subscribe(&self, path: &str, context: &TemplateContext) -> Box<dyn DynamicResolver>;
}

pub type Job = Box<dyn FnOnce() -> ActionResult<()>>;

/// Batched-update scheduler. Jobs run FIFO at the end of the current turn.
pub trait Scheduler {
    fn schedule(&self, job: Job);
}
