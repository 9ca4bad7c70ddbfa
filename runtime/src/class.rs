//! Type identities and the set of types whose methods expressions may call.

use std::{
    borrow::Cow,
    collections::BTreeSet,
    fmt,
    iter::FromIterator,
};

/// The identity of a type of value.
///
/// Every bound method carries the class it was defined in, which is what the
/// sandbox checks before a call is allowed.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Class(Cow<'static, str>);

impl Class {
    pub const NONE: Class = Class::new("NoneType");
    pub const BOOL: Class = Class::new("bool");
    pub const INT: Class = Class::new("int");
    pub const FLOAT: Class = Class::new("float");
    pub const STR: Class = Class::new("str");
    pub const LIST: Class = Class::new("list");
    pub const DICT: Class = Class::new("dict");
    pub const FUNCTION: Class = Class::new("function");
    pub const MODULE: Class = Class::new("module");

    pub const fn new(name: &'static str) -> Self {
        Class(Cow::Borrowed(name))
    }

    /// Create a class identity from a name only known at runtime.
    pub fn named(name: impl Into<String>) -> Self {
        Class(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<class '{}'>", self.0)
    }
}

/// A set of classes whose bound methods may be called.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClassSet(BTreeSet<Class>);

impl ClassSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in scalar types, which are always safe to call methods on.
    pub fn builtin() -> Self {
        [
            Class::NONE,
            Class::BOOL,
            Class::INT,
            Class::FLOAT,
            Class::STR,
            Class::LIST,
            Class::DICT,
            Class::MODULE,
        ]
        .iter()
        .cloned()
        .collect()
    }

    pub fn insert(&mut self, class: Class) -> bool {
        self.0.insert(class)
    }

    pub fn contains(&self, class: &Class) -> bool {
        self.0.contains(class)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Class> {
        self.0.iter()
    }
}

impl FromIterator<Class> for ClassSet {
    fn from_iter<I: IntoIterator<Item = Class>>(iter: I) -> Self {
        ClassSet(iter.into_iter().collect())
    }
}

impl Extend<Class> for ClassSet {
    fn extend<I: IntoIterator<Item = Class>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<'a> Extend<&'a Class> for ClassSet {
    fn extend<I: IntoIterator<Item = &'a Class>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().cloned())
    }
}
