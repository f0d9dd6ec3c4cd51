//! TargetResolver: dispatch-time receiver and action name resolution

use std::rc::Rc;

use compact_str::CompactString;
use tracing::warn;

use crate::controller::traits::Receiver;
use crate::error::{ActionError, ActionResult};
use crate::model::binding::{ActionBinding, ActionNameSource, TargetSource};
use crate::model::value::Value;

/// Receiver and action name as seen at the moment of dispatch.
pub struct ResolvedTarget {
    pub receiver: Rc<dyn Receiver>,
    pub action_name: CompactString,
}

pub struct TargetResolver;

impl TargetResolver {
    pub fn resolve(binding: &ActionBinding) -> ActionResult<ResolvedTarget> {
        Ok(ResolvedTarget {
            receiver: Self::resolve_receiver(&binding.target)?,
            action_name: Self::resolve_action_name(&binding.action_name),
        })
    }

    pub fn resolve_receiver(target: &TargetSource) -> ActionResult<Rc<dyn Receiver>> {
        match target {
            TargetSource::Ambient(Some(receiver)) | TargetSource::StaticRoot(receiver) => {
                Ok(receiver.clone())
            }
            TargetSource::Ambient(None) => Err(ActionError::unresolved_target("<ambient>")),
            TargetSource::DynamicPath(resolver) => match resolver.current_value() {
                Value::Object(receiver) => Ok(receiver),
                _ => Err(ActionError::unresolved_target(resolver.path())),
            },
        }
    }

    /// An unquoted path that resolves to nothing (or to a function) is taken
    /// to be a mistyped literal: its own text becomes the action name.
    pub fn resolve_action_name(source: &ActionNameSource) -> CompactString {
        let resolver = match source {
            ActionNameSource::Literal(name) => return name.clone(),
            ActionNameSource::Dynamic(resolver) => resolver,
        };

        let value = resolver.current_value();
        if value.is_undefined() || value.is_callable() {
            warn!(
                path = resolver.path(),
                "You specified a quoteless path to the action binding '{0}' which did not \
                 resolve to an action name. Perhaps you meant to use a quoted action name? \
                 (e.g. action '{0}')",
                resolver.path()
            );
            return CompactString::new(resolver.path());
        }

        if value.is_falsy() {
            return CompactString::new(resolver.path());
        }

        value.to_text()
    }
}
