//! ActionRegistry: id-keyed table of live action bindings
//!
//! Owned by the component that manages a template's lifetime; there is no
//! process-wide instance. Tokens come from a monotonically increasing
//! counter and are never handed out twice by the same registry.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{ActionError, ActionResult};
use crate::model::binding::{ActionBinding, ActionId};

/// Registry counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub registered: u64,
    pub unregistered: u64,
    pub live: usize,
}

#[derive(Debug, Default)]
pub struct ActionRegistry {
    bindings: RefCell<FxHashMap<ActionId, Rc<ActionBinding>>>,
    last_id: Cell<u64>,
    unregistered: Cell<u64>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, mut binding: ActionBinding) -> ActionId {
        let id = ActionId::from_raw(self.last_id.get() + 1);
        self.last_id.set(id.as_raw());

        binding.id = id;
        debug!(%id, event = %binding.event_name, "action registered");
        self.bindings.borrow_mut().insert(id, Rc::new(binding));

        id
    }

    /// Remove the binding and dispose its resolvers. Absent ids are ignored.
    pub fn unregister(&self, id: ActionId) -> bool {
        // Drop the table borrow before disposing: resolvers may call back in.
        let removed = self.bindings.borrow_mut().remove(&id);

        let Some(binding) = removed else {
            trace!(%id, "unregister of unknown action ignored");
            return false;
        };

        let disposed = binding.dispose_resolvers();
        self.unregistered.set(self.unregistered.get() + 1);
        debug!(%id, disposed, "action unregistered");

        true
    }

    pub fn lookup(&self, id: ActionId) -> ActionResult<Rc<ActionBinding>> {
        self.bindings
            .borrow()
            .get(&id)
            .cloned()
            .ok_or(ActionError::NotFound { id })
    }

    pub fn contains(&self, id: ActionId) -> bool {
        self.bindings.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// Unregister everything, e.g. when the owning template goes away.
    pub fn clear(&self) {
        let ids: Vec<ActionId> = self.bindings.borrow().keys().copied().collect();
        for id in ids {
            self.unregister(id);
        }
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            registered: self.last_id.get(),
            unregistered: self.unregistered.get(),
            live: self.len(),
        }
    }
}

impl Drop for ActionRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;
    use rustc_hash::FxHashSet;

    use crate::controller::traits::ValueSubscriber;
    use crate::model::binding::{ActionNameSource, ResolverHandle, TargetSource};
    use crate::model::context::TemplateContext;
    use crate::model::property_store::PropertyStore;

    fn binding(name: &str) -> ActionBinding {
        ActionBinding::new(
            ActionNameSource::Literal(CompactString::new(name)),
            TargetSource::Ambient(None),
        )
    }

    #[test]
    fn test_tokens_are_distinct() {
        let registry = ActionRegistry::new();
        let ids: Vec<ActionId> = (0..32)
            .map(|i| registry.register(binding(&format!("a{i}"))))
            .collect();

        let unique: FxHashSet<ActionId> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(registry.len(), 32);
    }

    #[test]
    fn test_unregister_leaves_others_alone() {
        let registry = ActionRegistry::new();
        let a = registry.register(binding("a"));
        let b = registry.register(binding("b"));

        assert!(registry.unregister(a));
        assert!(matches!(registry.lookup(a), Err(ActionError::NotFound { .. })));
        assert_eq!(registry.lookup(b).unwrap().id(), b);
    }

    #[test]
    fn test_unregister_is_idempotent_and_disposes_once() {
        let store = PropertyStore::new();
        let registry = ActionRegistry::new();
        let resolver =
            ResolverHandle::new(store.subscribe("actionName", &TemplateContext::default()));
        let id = registry.register(ActionBinding::new(
            ActionNameSource::Dynamic(resolver),
            TargetSource::Ambient(None),
        ));

        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert_eq!(store.disposed_subscriptions(), 1);
        assert_eq!(store.live_subscriptions(), 0);
    }

    #[test]
    fn test_ids_not_reused_after_unregister() {
        let registry = ActionRegistry::new();
        let first = registry.register(binding("a"));
        registry.unregister(first);
        let second = registry.register(binding("b"));

        assert_ne!(first, second);
        assert_eq!(
            registry.stats(),
            RegistryStats {
                registered: 2,
                unregistered: 1,
                live: 1,
            }
        );
    }

    #[test]
    fn test_drop_disposes_remaining_bindings() {
        let store = PropertyStore::new();
        {
            let registry = ActionRegistry::new();
            let resolver =
                ResolverHandle::new(store.subscribe("view", &TemplateContext::default()));
            registry.register(ActionBinding::new(
                ActionNameSource::Literal(CompactString::new("save")),
                TargetSource::DynamicPath(resolver),
            ));
            assert_eq!(store.live_subscriptions(), 1);
        }
        assert_eq!(store.live_subscriptions(), 0);
    }
}
