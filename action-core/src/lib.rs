pub mod error;

pub mod config;

pub mod controller {
    pub mod traits;
    pub use traits::{
        DirectReceiver, DynamicResolver, ForwardingReceiver, Job, Receiver, Scheduler,
        ValueSubscriber,
    };

    pub mod event_gate;
    pub use event_gate::EventGate;

    pub mod target_resolver;
    pub use target_resolver::{ResolvedTarget, TargetResolver};

    pub mod action_registry;
    pub use action_registry::{ActionRegistry, RegistryStats};

    pub mod action_invoker;
    pub use action_invoker::{ActionInvoker, unwrap_value};

    pub mod lifecycle_binder;
    pub use lifecycle_binder::LifecycleBinder;

    pub mod run_loop;
    pub use run_loop::{RunLoop, RunLoopStats};

    pub mod action_helper;
    pub use action_helper::{
        ActionDescriptor, ActionHelper, ActionNameSpec, HandleOutcome, ParamSpec, TargetSpec,
    };
}

pub mod model {
    pub mod value;
    pub use value::{Callable, Value};

    pub mod event;
    pub use event::{AllowedKeys, InputEvent, Modifier, ModifierState, PointerButton};

    pub mod binding;
    pub use binding::{
        ActionBinding, ActionId, ActionNameSource, ParamSource, ResolverHandle, TargetSource,
        TriState,
    };

    pub mod context;
    pub use context::TemplateContext;

    pub mod element;
    pub use element::{ACTION_ATTRIBUTE, Element};

    pub mod receivers;
    pub use receivers::{ActionMap, ForwardingProxy, ModelProxy};

    pub mod property_store;
    pub use property_store::PropertyStore;
}

pub mod logging;
pub use logging::LoggerBuilder;

pub use config::Config;
pub use controller::{ActionHelper, HandleOutcome, RunLoop};
pub use error::{ActionError, ActionResult};
pub use model::{ActionId, InputEvent, TemplateContext, Value};
