//! Template evaluation context handed to `bind`

use std::fmt;
use std::rc::Rc;

use crate::controller::traits::Receiver;
use crate::model::value::Value;

/// What the template knows at bind time: its root context object and the
/// ambient receiver (the controller-like fallback) if there is one.
#[derive(Clone, Default)]
pub struct TemplateContext {
    root: Value,
    receiver: Option<Rc<dyn Receiver>>,
}

impl TemplateContext {
    pub fn new(root: Value) -> Self {
        Self {
            root,
            receiver: None,
        }
    }

    #[must_use]
    pub fn with_receiver(mut self, receiver: Rc<dyn Receiver>) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn receiver(&self) -> Option<&Rc<dyn Receiver>> {
        self.receiver.as_ref()
    }
}

impl fmt::Debug for TemplateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateContext")
            .field("root", &self.root)
            .field("receiver", &self.receiver.as_ref().map(|r| r.describe()))
            .finish()
    }
}
