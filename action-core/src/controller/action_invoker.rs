//! ActionInvoker: event policy, then a scheduled resolve-and-dispatch job

use std::rc::Rc;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, error, warn};

use crate::controller::target_resolver::TargetResolver;
use crate::controller::traits::Scheduler;
use crate::error::{ActionError, ActionResult};
use crate::model::binding::ActionBinding;
use crate::model::event::InputEvent;
use crate::model::value::{Value, object_key};

pub type Arguments = SmallVec<[Value; 4]>;

pub struct ActionInvoker {
    scheduler: Rc<dyn Scheduler>,
}

impl ActionInvoker {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    /// Apply the binding's event policy and queue the dispatch.
    ///
    /// Call only for events that already passed the `EventGate`.
    pub fn invoke(&self, binding: Rc<ActionBinding>, event: &mut InputEvent) {
        Self::apply_event_policy(&binding, event);

        debug!(id = %binding.id(), event = %event, "action scheduled");
        self.scheduler
            .schedule(Box::new(move || Self::dispatch(&binding)));
    }

    pub fn apply_event_policy(binding: &ActionBinding, event: &mut InputEvent) {
        if !binding.prevent_default.is_disabled() {
            event.prevent_default();
        }

        if binding.bubbles.is_disabled() {
            event.stop_propagation();
        }
    }

    /// Resolve target, name and arguments now, then call the receiver.
    pub fn dispatch(binding: &ActionBinding) -> ActionResult<()> {
        let resolved = TargetResolver::resolve(binding)?;
        let receiver = resolved.receiver;
        let action = resolved.action_name.as_str();
        let args = Self::arguments(binding);

        if let Some(forwarding) = receiver.as_forwarding() {
            debug!(action, receiver = %receiver.describe(), "sending action");
            forwarding.send(action, &args);
            return Ok(());
        }

        match receiver.as_direct() {
            Some(direct) if direct.has_method(action) => {
                debug!(action, receiver = %receiver.describe(), "calling action method");
                direct.call(action, &args);
                Ok(())
            }
            _ => {
                let err = ActionError::missing_capability(action, receiver.describe());
                error!("{err}");
                Err(err)
            }
        }
    }

    /// Current parameter values in order, each unwrapped.
    pub fn arguments(binding: &ActionBinding) -> Arguments {
        binding
            .parameters
            .iter()
            .map(|param| unwrap_value(param.current_value()))
            .collect()
    }
}

/// Replace a wrapping receiver by its model until reaching a plain value.
pub fn unwrap_value(value: Value) -> Value {
    let mut seen = FxHashSet::default();
    unwrap_with(value, &mut seen)
}

fn unwrap_with(value: Value, seen: &mut FxHashSet<usize>) -> Value {
    let Value::Object(obj) = &value else {
        return value;
    };

    let Some(model) = obj.model() else {
        return value;
    };

    if !seen.insert(object_key(obj)) {
        warn!(receiver = %obj.describe(), "model chain loops back on itself");
        return value;
    }

    unwrap_with(model, seen)
}
