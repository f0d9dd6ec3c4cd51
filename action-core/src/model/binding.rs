//! `ActionBinding`: one registered `{{action}}` occurrence
//!
//! A binding owns every dynamic resolver it was built with. Resolvers are
//! wrapped in [`ResolverHandle`] so disposal happens at most once no matter
//! how many teardown paths reach it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::controller::traits::{DynamicResolver, Receiver};
use crate::model::event::AllowedKeys;
use crate::model::value::Value;

pub const DEFAULT_EVENT_NAME: &str = "click";

/// Opaque registry token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(u64);

impl ActionId {
    /// Placeholder carried by bindings that have not been registered yet.
    pub const UNASSIGNED: ActionId = ActionId(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unset / explicit true / explicit false. Only `Disabled` changes behaviour,
/// but the three states are kept distinct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriState {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl TriState {
    pub fn is_disabled(self) -> bool {
        self == TriState::Disabled
    }
}

impl From<Option<bool>> for TriState {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            None => TriState::Unset,
            Some(true) => TriState::Enabled,
            Some(false) => TriState::Disabled,
        }
    }
}

enum ResolverState {
    Live(Box<dyn DynamicResolver>),

    /// Value observed right before disposal.
    Disposed(Value),
}

/// Owning wrapper around a dynamic resolver.
pub struct ResolverHandle {
    path: CompactString,
    state: RefCell<ResolverState>,
}

impl ResolverHandle {
    pub fn new(resolver: Box<dyn DynamicResolver>) -> Self {
        Self {
            path: CompactString::new(resolver.path()),
            state: RefCell::new(ResolverState::Live(resolver)),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Live value, or the last value seen before disposal.
    pub fn current_value(&self) -> Value {
        match &*self.state.borrow() {
            ResolverState::Live(resolver) => resolver.current_value(),
            ResolverState::Disposed(last) => last.clone(),
        }
    }

    /// Returns `true` only for the call that actually disposed.
    pub fn dispose(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let ResolverState::Live(resolver) = &mut *state else {
            return false;
        };

        let last = resolver.current_value();
        resolver.dispose();
        *state = ResolverState::Disposed(last);
        true
    }

    pub fn is_disposed(&self) -> bool {
        matches!(&*self.state.borrow(), ResolverState::Disposed(_))
    }
}

impl fmt::Debug for ResolverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverHandle")
            .field("path", &self.path)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[derive(Debug)]
pub enum ActionNameSource {
    Literal(CompactString),
    Dynamic(ResolverHandle),
}

#[derive(Debug)]
pub enum ParamSource {
    Literal(Value),
    Dynamic(ResolverHandle),
}

impl ParamSource {
    pub fn current_value(&self) -> Value {
        match self {
            ParamSource::Literal(value) => value.clone(),
            ParamSource::Dynamic(resolver) => resolver.current_value(),
        }
    }
}

pub enum TargetSource {
    /// Receiver supplied by the template context at bind time.
    Ambient(Option<Rc<dyn Receiver>>),

    StaticRoot(Rc<dyn Receiver>),

    /// Re-read on every dispatch.
    DynamicPath(ResolverHandle),
}

impl fmt::Debug for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSource::Ambient(receiver) => f
                .debug_tuple("Ambient")
                .field(&receiver.as_ref().map(|r| r.describe()))
                .finish(),
            TargetSource::StaticRoot(receiver) => {
                f.debug_tuple("StaticRoot").field(&receiver.describe()).finish()
            }
            TargetSource::DynamicPath(resolver) => {
                f.debug_tuple("DynamicPath").field(resolver).finish()
            }
        }
    }
}

#[derive(Debug)]
pub struct ActionBinding {
    pub(crate) id: ActionId,
    pub event_name: CompactString,
    pub action_name: ActionNameSource,
    pub parameters: SmallVec<[ParamSource; 2]>,
    pub allowed_keys: AllowedKeys,
    pub prevent_default: TriState,
    pub bubbles: TriState,
    pub target: TargetSource,
}

impl ActionBinding {
    pub fn new(action_name: ActionNameSource, target: TargetSource) -> Self {
        Self {
            id: ActionId::UNASSIGNED,
            event_name: CompactString::const_new(DEFAULT_EVENT_NAME),
            action_name,
            parameters: SmallVec::new(),
            allowed_keys: AllowedKeys::Unset,
            prevent_default: TriState::Unset,
            bubbles: TriState::Unset,
            target,
        }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    #[must_use]
    pub fn on(mut self, event_name: impl Into<CompactString>) -> Self {
        self.event_name = event_name.into();
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: ParamSource) -> Self {
        self.parameters.push(param);
        self
    }

    #[must_use]
    pub fn with_allowed_keys(mut self, allowed_keys: AllowedKeys) -> Self {
        self.allowed_keys = allowed_keys;
        self
    }

    #[must_use]
    pub fn with_prevent_default(mut self, prevent_default: TriState) -> Self {
        self.prevent_default = prevent_default;
        self
    }

    #[must_use]
    pub fn with_bubbles(mut self, bubbles: TriState) -> Self {
        self.bubbles = bubbles;
        self
    }

    fn resolvers(&self) -> impl Iterator<Item = &ResolverHandle> {
        let name = match &self.action_name {
            ActionNameSource::Dynamic(resolver) => Some(resolver),
            ActionNameSource::Literal(_) => None,
        };
        let target = match &self.target {
            TargetSource::DynamicPath(resolver) => Some(resolver),
            _ => None,
        };
        let params = self.parameters.iter().filter_map(|param| match param {
            ParamSource::Dynamic(resolver) => Some(resolver),
            ParamSource::Literal(_) => None,
        });

        name.into_iter().chain(target).chain(params)
    }

    /// Dispose every live resolver; returns how many were released now.
    pub fn dispose_resolvers(&self) -> usize {
        self.resolvers().filter(|resolver| resolver.dispose()).count()
    }
}
