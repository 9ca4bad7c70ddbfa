//! Providers of the top-level names visible to an expression.

use crate::{
    object::Object,
    table::Table,
    value::Value,
};
use std::{
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

/// The top-level names an expression can refer to.
///
/// A context is only ever borrowed immutably for the duration of a single
/// evaluation; the engine never retains or mutates it.
pub trait Context {
    /// Look up a top-level name.
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Describe this context in error messages.
    fn describe(&self) -> String;
}

impl Context for Table {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

impl Context for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn describe(&self) -> String {
        format!("{:?}", Table::from(self.clone()))
    }
}

impl<S: std::hash::BuildHasher> Context for HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn describe(&self) -> String {
        format!("{:?}", self.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Table>())
    }
}

impl Context for Rc<dyn Object> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.attribute(name)
    }

    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

/// A value can serve as a context when it is a table or an object.
impl Context for Value {
    fn lookup(&self, name: &str) -> Option<Value> {
        match self {
            Value::Table(table) => table.lookup(name),
            Value::Object(object) => object.attribute(name),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}
