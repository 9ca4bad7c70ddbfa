use crate::{class::Class, value::Value};
use std::fmt;

/// A host object that expressions can dot into.
///
/// Implement this for application types that should be visible inside a
/// context. Attributes are resolved by name; methods are exposed by returning
/// a [`ForeignFn::method`](crate::ForeignFn::method) bound to [`Object::class`]
/// from [`Object::attribute`], which subjects them to the sandbox.
pub trait Object: fmt::Debug {
    /// The class of this object, used for sandbox checks and error messages.
    fn class(&self) -> Class;

    /// Look up an attribute by name.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Look up an item by subscription, `object[key]`. Objects are not
    /// subscriptable unless they override this.
    fn item(&self, _key: &Value) -> Option<Value> {
        None
    }
}
