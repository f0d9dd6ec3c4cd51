//! ActionHelper: entry point for the template layer
//!
//! `bind` turns a descriptor into a registered binding (subscribing every
//! dynamic path against the template context), `handle` runs an incoming
//! event through the gate and the invoker, `unbind` tears a binding down.

use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;
use tracing::{debug, trace};

use crate::config::DispatchConfig;
use crate::controller::action_invoker::ActionInvoker;
use crate::controller::action_registry::ActionRegistry;
use crate::controller::event_gate::EventGate;
use crate::controller::lifecycle_binder::LifecycleBinder;
use crate::controller::traits::{Receiver, Scheduler, ValueSubscriber};
use crate::error::ActionError;
use crate::model::binding::{
    ActionBinding, ActionId, ActionNameSource, ParamSource, ResolverHandle, TargetSource, TriState,
};
use crate::model::context::TemplateContext;
use crate::model::element::Element;
use crate::model::event::{AllowedKeys, InputEvent};
use crate::model::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ActionNameSpec {
    /// Quoted name: `action 'save'`
    Literal(CompactString),

    /// Unquoted path read at dispatch time: `action selectedAction`
    Path(CompactString),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamSpec {
    Literal(Value),
    Path(CompactString),
}

#[derive(Clone, Default)]
pub enum TargetSpec {
    /// The context's ambient receiver.
    #[default]
    Ambient,

    Object(Rc<dyn Receiver>),

    /// `target=path`, resolved against the context on every dispatch.
    Path(CompactString),
}

impl fmt::Debug for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::Ambient => f.write_str("Ambient"),
            TargetSpec::Object(receiver) => {
                f.debug_tuple("Object").field(&receiver.describe()).finish()
            }
            TargetSpec::Path(path) => f.debug_tuple("Path").field(path).finish(),
        }
    }
}

/// What the template evaluated for one `{{action ...}}` occurrence.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    pub action: ActionNameSpec,
    pub params: Vec<ParamSpec>,
    pub event_name: Option<CompactString>,
    pub allowed_keys: AllowedKeys,
    pub prevent_default: TriState,
    pub bubbles: TriState,
    pub target: TargetSpec,
}

impl ActionDescriptor {
    fn with_action(action: ActionNameSpec) -> Self {
        Self {
            action,
            params: Vec::new(),
            event_name: None,
            allowed_keys: AllowedKeys::Unset,
            prevent_default: TriState::Unset,
            bubbles: TriState::Unset,
            target: TargetSpec::Ambient,
        }
    }

    pub fn literal(name: impl Into<CompactString>) -> Self {
        Self::with_action(ActionNameSpec::Literal(name.into()))
    }

    pub fn path(path: impl Into<CompactString>) -> Self {
        Self::with_action(ActionNameSpec::Path(path.into()))
    }

    #[must_use]
    pub fn on(mut self, event_name: impl Into<CompactString>) -> Self {
        self.event_name = Some(event_name.into());
        self
    }

    #[must_use]
    pub fn param(mut self, value: impl Into<Value>) -> Self {
        self.params.push(ParamSpec::Literal(value.into()));
        self
    }

    #[must_use]
    pub fn param_path(mut self, path: impl Into<CompactString>) -> Self {
        self.params.push(ParamSpec::Path(path.into()));
        self
    }

    #[must_use]
    pub fn allowed_keys(mut self, allowed_keys: AllowedKeys) -> Self {
        self.allowed_keys = allowed_keys;
        self
    }

    #[must_use]
    pub fn prevent_default(mut self, prevent_default: bool) -> Self {
        self.prevent_default = TriState::from(Some(prevent_default));
        self
    }

    #[must_use]
    pub fn bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = TriState::from(Some(bubbles));
        self
    }

    #[must_use]
    pub fn target(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }
}

/// Result of feeding an event to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// No binding under the token (already torn down).
    Unbound,

    /// The binding listens for a different event class.
    EventMismatch,

    /// Rejected by the modifier-key policy; the event is left untouched.
    Filtered,

    /// Policy applied, dispatch queued on the scheduler.
    Scheduled,
}

pub struct ActionHelper {
    registry: Rc<ActionRegistry>,
    invoker: ActionInvoker,
    subscriber: Rc<dyn ValueSubscriber>,
    config: DispatchConfig,
}

impl ActionHelper {
    pub fn new(
        subscriber: Rc<dyn ValueSubscriber>,
        scheduler: Rc<dyn Scheduler>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry: Rc::new(ActionRegistry::new()),
            invoker: ActionInvoker::new(scheduler),
            subscriber,
            config,
        }
    }

    pub fn registry(&self) -> &Rc<ActionRegistry> {
        &self.registry
    }

    fn subscribe(&self, path: &str, context: &TemplateContext) -> ResolverHandle {
        ResolverHandle::new(self.subscriber.subscribe(path, context))
    }

    /// Build the binding for `descriptor` and register it.
    pub fn bind(&self, descriptor: ActionDescriptor, context: &TemplateContext) -> ActionId {
        let action_name = match descriptor.action {
            ActionNameSpec::Literal(name) => ActionNameSource::Literal(name),
            ActionNameSpec::Path(path) => ActionNameSource::Dynamic(self.subscribe(&path, context)),
        };

        let target = match descriptor.target {
            TargetSpec::Ambient => TargetSource::Ambient(context.receiver().cloned()),
            TargetSpec::Object(receiver) => TargetSource::StaticRoot(receiver),
            TargetSpec::Path(path) => TargetSource::DynamicPath(self.subscribe(&path, context)),
        };

        let event_name = descriptor
            .event_name
            .unwrap_or_else(|| self.config.default_event_name.clone());

        let mut binding = ActionBinding::new(action_name, target)
            .on(event_name)
            .with_allowed_keys(descriptor.allowed_keys)
            .with_prevent_default(descriptor.prevent_default)
            .with_bubbles(descriptor.bubbles);

        for param in descriptor.params {
            binding = binding.with_param(match param {
                ParamSpec::Literal(value) => ParamSource::Literal(value),
                ParamSpec::Path(path) => ParamSource::Dynamic(self.subscribe(&path, context)),
            });
        }

        self.registry.register(binding)
    }

    /// Bind, record the token on `element` and unbind on its teardown.
    pub fn bind_element(
        &self,
        element: &Element,
        descriptor: ActionDescriptor,
        context: &TemplateContext,
    ) -> ActionId {
        let id = self.bind(descriptor, context);
        LifecycleBinder::attach(element, id, &self.registry);
        id
    }

    pub fn unbind(&self, id: ActionId) {
        self.registry.unregister(id);
    }

    /// Event entry point: lookup, gate, then invoke.
    pub fn handle(&self, id: ActionId, event: &mut InputEvent) -> HandleOutcome {
        let binding = match self.registry.lookup(id) {
            Ok(binding) => binding,
            Err(ActionError::NotFound { .. }) => {
                trace!(%id, event = %event, "event for unbound action ignored");
                return HandleOutcome::Unbound;
            }
            Err(e) => {
                debug!(%id, "lookup failed: {e}");
                return HandleOutcome::Unbound;
            }
        };

        if binding.event_name != event.event_type {
            return HandleOutcome::EventMismatch;
        }

        if !EventGate::is_allowed(event, &binding.allowed_keys) {
            trace!(%id, event = %event, "event filtered by modifier policy");
            return HandleOutcome::Filtered;
        }

        self.invoker.invoke(binding, event);
        HandleOutcome::Scheduled
    }

    /// Route an event to every action recorded on `element`.
    pub fn handle_element(&self, element: &Element, event: &mut InputEvent) -> Vec<HandleOutcome> {
        element
            .action_ids()
            .into_iter()
            .map(|id| self.handle(id, event))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::controller::run_loop::RunLoop;
    use crate::model::event::{Modifier, PointerButton};
    use crate::model::property_store::PropertyStore;
    use crate::model::receivers::{ActionMap, ForwardingProxy, ModelProxy};

    type CallLog = Rc<RefCell<Vec<String>>>;

    struct Harness {
        store: PropertyStore,
        run_loop: Rc<RunLoop>,
        helper: ActionHelper,
    }

    fn harness() -> Harness {
        let store = PropertyStore::new();
        let run_loop = Rc::new(RunLoop::default());
        let helper = ActionHelper::new(
            Rc::new(store.clone()),
            run_loop.clone(),
            DispatchConfig::default(),
        );
        Harness {
            store,
            run_loop,
            helper,
        }
    }

    fn recording_actions(name: &str, log: &CallLog, methods: &[&'static str]) -> ActionMap {
        let mut map = ActionMap::new(name);
        for &method in methods {
            let log = log.clone();
            let owner = name.to_string();
            map.insert(method, move |args| {
                log.borrow_mut()
                    .push(format!("{owner}.{method}({})", args.len()))
            });
        }
        map
    }

    fn ambient(log: &CallLog, methods: &[&'static str]) -> TemplateContext {
        TemplateContext::new(Value::Null)
            .with_receiver(Rc::new(recording_actions("controller", log, methods)))
    }

    #[test]
    fn test_click_dispatches_to_ambient_receiver_on_flush() {
        let h = harness();
        let log = CallLog::default();
        let id = h
            .helper
            .bind(ActionDescriptor::literal("save"), &ambient(&log, &["save"]));

        let mut event = InputEvent::click();
        assert_eq!(h.helper.handle(id, &mut event), HandleOutcome::Scheduled);
        assert!(event.is_default_prevented());
        assert!(!event.is_propagation_stopped());
        assert!(log.borrow().is_empty());

        h.run_loop.flush().unwrap();
        assert_eq!(*log.borrow(), vec!["controller.save(0)"]);
    }

    #[test]
    fn test_events_in_one_turn_flush_in_order() {
        let h = harness();
        let log = CallLog::default();
        let context = ambient(&log, &["first", "second"]);
        let first = h.helper.bind(ActionDescriptor::literal("first"), &context);
        let second = h.helper.bind(ActionDescriptor::literal("second"), &context);

        h.helper.handle(first, &mut InputEvent::click());
        h.helper.handle(second, &mut InputEvent::click());

        assert_eq!(h.run_loop.flush().unwrap(), 2);
        assert_eq!(
            *log.borrow(),
            vec!["controller.first(0)", "controller.second(0)"]
        );
    }

    #[test]
    fn test_modified_click_is_filtered_and_untouched() {
        let h = harness();
        let log = CallLog::default();
        let id = h
            .helper
            .bind(ActionDescriptor::literal("save"), &ambient(&log, &["save"]));

        let mut event = InputEvent::click().with_modifier(Modifier::Meta);
        assert_eq!(h.helper.handle(id, &mut event), HandleOutcome::Filtered);
        assert!(!event.is_default_prevented());
        assert_eq!(h.run_loop.pending(), 0);
    }

    #[test]
    fn test_allowed_keys_any_accepts_modifiers() {
        let h = harness();
        let log = CallLog::default();
        let id = h.helper.bind(
            ActionDescriptor::literal("save").allowed_keys(AllowedKeys::Any),
            &ambient(&log, &["save"]),
        );

        let mut event = InputEvent::click()
            .with_modifier(Modifier::Shift)
            .with_modifier(Modifier::Ctrl);
        assert_eq!(h.helper.handle(id, &mut event), HandleOutcome::Scheduled);
    }

    #[test]
    fn test_event_name_must_match() {
        let h = harness();
        let log = CallLog::default();
        let id = h.helper.bind(
            ActionDescriptor::literal("open").on("dblclick"),
            &ambient(&log, &["open"]),
        );

        assert_eq!(
            h.helper.handle(id, &mut InputEvent::click()),
            HandleOutcome::EventMismatch
        );
        let mut double = InputEvent::new("dblclick").with_button(PointerButton::Primary);
        assert_eq!(h.helper.handle(id, &mut double), HandleOutcome::Scheduled);
    }

    #[test]
    fn test_dynamic_target_follows_latest_value() {
        let h = harness();
        let log = CallLog::default();
        let a: Rc<dyn Receiver> = Rc::new(recording_actions("a", &log, &["select"]));
        let b: Rc<dyn Receiver> = Rc::new(recording_actions("b", &log, &["select"]));

        h.store.set("view", Value::object(a));
        let id = h.helper.bind(
            ActionDescriptor::literal("select").target(TargetSpec::Path("view".into())),
            &TemplateContext::default(),
        );

        h.helper.handle(id, &mut InputEvent::click());
        h.run_loop.flush().unwrap();

        h.store.set("view", Value::object(b));
        h.helper.handle(id, &mut InputEvent::click());
        h.run_loop.flush().unwrap();

        assert_eq!(*log.borrow(), vec!["a.select(0)", "b.select(0)"]);
    }

    #[test]
    fn test_dynamic_name_and_param_paths() {
        let h = harness();
        let sent = Rc::new(RefCell::new(Vec::new()));
        let sink = sent.clone();
        let router: Rc<dyn Receiver> = Rc::new(ForwardingProxy::new("router", move |name, args| {
            sink.borrow_mut().push((name.to_string(), args.to_vec()))
        }));

        let post = Value::from("post-7");
        let controller: Rc<dyn Receiver> = Rc::new(ModelProxy::new("postController", post.clone()));
        h.store.set("nextAction", Value::from("archive"));
        h.store.set("post", Value::object(controller));

        let id = h.helper.bind(
            ActionDescriptor::path("nextAction")
                .param_path("post")
                .param(3)
                .target(TargetSpec::Object(router)),
            &TemplateContext::default(),
        );

        h.helper.handle(id, &mut InputEvent::click());
        h.run_loop.flush().unwrap();

        assert_eq!(
            *sent.borrow(),
            vec![("archive".to_string(), vec![post, Value::from(3)])]
        );
    }

    #[test]
    fn test_unbound_token_is_ignored() {
        let h = harness();
        let log = CallLog::default();
        let id = h
            .helper
            .bind(ActionDescriptor::literal("save"), &ambient(&log, &["save"]));
        h.helper.unbind(id);
        h.helper.unbind(id);

        let mut event = InputEvent::click();
        assert_eq!(h.helper.handle(id, &mut event), HandleOutcome::Unbound);
        assert!(!event.is_default_prevented());
    }

    #[test]
    fn test_queued_dispatch_survives_unbind() {
        let h = harness();
        let log = CallLog::default();
        let id = h
            .helper
            .bind(ActionDescriptor::literal("save"), &ambient(&log, &["save"]));

        h.helper.handle(id, &mut InputEvent::click());
        h.helper.unbind(id);
        h.run_loop.flush().unwrap();

        assert_eq!(*log.borrow(), vec!["controller.save(0)"]);
        assert_eq!(h.helper.handle(id, &mut InputEvent::click()), HandleOutcome::Unbound);
    }

    #[test]
    fn test_element_teardown_disposes_subscriptions() {
        let h = harness();
        let log = CallLog::default();
        let element = Element::new("button");

        let id = h.helper.bind_element(
            &element,
            ActionDescriptor::path("current")
                .param_path("item")
                .target(TargetSpec::Path("view".into())),
            &ambient(&log, &[]),
        );
        assert_eq!(element.action_ids(), vec![id]);
        assert_eq!(h.store.live_subscriptions(), 3);

        element.teardown();
        assert_eq!(h.store.live_subscriptions(), 0);
        assert_eq!(h.store.disposed_subscriptions(), 3);
        assert!(!h.helper.registry().contains(id));

        h.helper.unbind(id);
        assert_eq!(h.store.disposed_subscriptions(), 3);
    }

    #[test]
    fn test_handle_element_routes_every_token() {
        let h = harness();
        let log = CallLog::default();
        let context = ambient(&log, &["select", "open"]);
        let element = Element::new("li");

        h.helper
            .bind_element(&element, ActionDescriptor::literal("select"), &context);
        h.helper.bind_element(
            &element,
            ActionDescriptor::literal("open").on("dblclick"),
            &context,
        );

        let outcomes = h.helper.handle_element(&element, &mut InputEvent::click());
        assert_eq!(
            outcomes,
            vec![HandleOutcome::Scheduled, HandleOutcome::EventMismatch]
        );
    }

    #[test]
    fn test_missing_method_surfaces_from_flush() {
        let h = harness();
        let log = CallLog::default();
        let id = h
            .helper
            .bind(ActionDescriptor::literal("destroy"), &ambient(&log, &["save"]));

        h.helper.handle(id, &mut InputEvent::click());
        assert!(matches!(
            h.run_loop.flush(),
            Err(ActionError::MissingDispatchCapability { .. })
        ));
    }
}
