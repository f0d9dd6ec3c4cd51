//! LifecycleBinder: unregisters a binding when its element is torn down

use std::rc::{Rc, Weak};

use tracing::trace;

use crate::controller::action_registry::ActionRegistry;
use crate::model::binding::ActionId;
use crate::model::element::Element;

pub struct LifecycleBinder;

impl LifecycleBinder {
    /// Record `id` on the element and unregister it on teardown.
    ///
    /// Holds the registry weakly: a registry dropped first has already
    /// disposed everything it owned.
    pub fn attach(element: &Element, id: ActionId, registry: &Rc<ActionRegistry>) {
        element.add_action_id(id);

        let registry: Weak<ActionRegistry> = Rc::downgrade(registry);
        element.on_teardown(move || {
            if let Some(registry) = registry.upgrade() {
                registry.unregister(id);
            } else {
                trace!(%id, "registry gone before element teardown");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;

    use crate::controller::traits::ValueSubscriber;
    use crate::model::binding::{ActionBinding, ActionNameSource, ResolverHandle, TargetSource};
    use crate::model::context::TemplateContext;
    use crate::model::property_store::PropertyStore;

    #[test]
    fn test_teardown_unregisters_and_disposes() {
        let store = PropertyStore::new();
        let registry = Rc::new(ActionRegistry::new());
        let element = Element::new("button");

        let target = ResolverHandle::new(store.subscribe("view", &TemplateContext::default()));
        let id = registry.register(ActionBinding::new(
            ActionNameSource::Literal(CompactString::new("save")),
            TargetSource::DynamicPath(target),
        ));
        LifecycleBinder::attach(&element, id, &registry);

        assert_eq!(element.action_ids(), vec![id]);
        assert!(registry.contains(id));

        element.teardown();
        element.teardown();

        assert!(!registry.contains(id));
        assert_eq!(store.disposed_subscriptions(), 1);
    }

    #[test]
    fn test_teardown_after_registry_dropped_is_harmless() {
        let registry = Rc::new(ActionRegistry::new());
        let element = Element::new("a");
        let id = registry.register(ActionBinding::new(
            ActionNameSource::Literal(CompactString::new("open")),
            TargetSource::Ambient(None),
        ));
        LifecycleBinder::attach(&element, id, &registry);

        drop(registry);
        element.teardown();
        assert!(element.is_torn_down());
    }
}
