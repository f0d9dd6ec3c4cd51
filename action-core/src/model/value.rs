//! Dynamic values flowing through resolvers and action parameters

use std::fmt;
use std::rc::Rc;

use compact_str::{CompactString, ToCompactString};

use crate::controller::traits::Receiver;

/// Opaque callable value. Only its presence matters to dispatch: a dynamic
/// action name that resolves to one is treated as a mistyped literal.
#[derive(Clone)]
pub struct Callable(Rc<dyn Fn(&[Value]) -> Value>);

impl Callable {
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }
}

/// A live value as seen by templates.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,

    Null,

    Bool(bool),

    Number(f64),

    String(CompactString),

    List(Vec<Value>),

    Callable(Callable),

    /// A receiver object (controller, view, model proxy...).
    Object(Rc<dyn Receiver>),
}

impl Value {
    pub fn object(receiver: Rc<dyn Receiver>) -> Self {
        Self::Object(receiver)
    }

    pub fn callable(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self::Callable(Callable::new(f))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Callable(_))
    }

    /// Template falsiness: undefined, null, `false`, zero, NaN and `""`.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => true,
            Self::Bool(b) => !b,
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::String(s) => s.is_empty(),
            Self::List(_) | Self::Callable(_) | Self::Object(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Rc<dyn Receiver>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Textual form used when a value names an action.
    pub fn to_text(&self) -> CompactString {
        match self {
            Self::Undefined => CompactString::const_new("undefined"),
            Self::Null => CompactString::const_new("null"),
            Self::Bool(b) => b.to_compact_string(),
            Self::Number(n) => n.to_compact_string(),
            Self::String(s) => s.clone(),
            Self::List(items) => {
                let parts: Vec<CompactString> = items.iter().map(Value::to_text).collect();
                CompactString::from(parts.join(","))
            }
            Self::Callable(_) => CompactString::const_new("function"),
            Self::Object(obj) => obj.describe(),
        }
    }
}

/// Identity of a receiver object, used for cycle detection.
pub(crate) fn object_key(obj: &Rc<dyn Receiver>) -> usize {
    Rc::as_ptr(obj) as *const () as usize
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Object(obj) => f.debug_tuple("Object").field(&obj.describe()).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Callable(a), Self::Callable(b)) => Rc::ptr_eq(&a.0, &b.0),
            (Self::Object(a), Self::Object(b)) => object_key(a) == object_key(b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(CompactString::new(s))
    }
}

impl From<CompactString> for Value {
    fn from(s: CompactString) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<Rc<dyn Receiver>> for Value {
    fn from(receiver: Rc<dyn Receiver>) -> Self {
        Self::Object(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::receivers::ActionMap;

    #[test]
    fn test_objects_compare_by_identity() {
        let a: Rc<dyn Receiver> = Rc::new(ActionMap::new("a"));
        let b: Rc<dyn Receiver> = Rc::new(ActionMap::new("a"));

        assert_eq!(Value::object(a.clone()), Value::object(a.clone()));
        assert_ne!(Value::object(a), Value::object(b));
    }

    #[test]
    fn test_falsiness() {
        assert!(Value::Null.is_falsy());
        assert!(Value::from(f64::NAN).is_falsy());
        assert!(Value::from(0).is_falsy());
        assert!(!Value::from("0").is_falsy());
        assert!(!Value::List(Vec::new()).is_falsy());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::from("save").to_text(), "save");
        assert_eq!(Value::from(true).to_text(), "true");
        assert_eq!(Value::Undefined.to_text(), "undefined");
        assert_eq!(
            Value::List(vec![Value::from("a"), Value::from("b")]).to_text(),
            "a,b"
        );
    }
}
