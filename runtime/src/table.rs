use crate::value::{write_str_repr, Value};
use std::{
    collections::BTreeMap,
    fmt,
    iter::FromIterator,
    rc::Rc,
};

/// Implementation of a "table". Tables are used like a dictionary: a mapping
/// from string keys to values.
///
/// Expressions are read-only, so tables are immutable once built and are
/// shared by reference counting. Cloning a table is cheap.
#[derive(Clone, Default)]
pub struct Table {
    inner: Rc<BTreeMap<String, Value>>,
}

impl Table {
    /// Allocate a new, empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value indexed by a key, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.inner.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Return a copy of this table with one more entry.
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = (*self.inner).clone();
        map.insert(key.into(), value.into());
        Self::from(map)
    }
}

impl From<BTreeMap<String, Value>> for Table {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self {
            inner: Rc::new(map),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Table {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<BTreeMap<_, _>>()
            .into()
    }
}

/// Tables compare by content, like dictionaries do.
impl PartialEq for Table {
    fn eq(&self, rhs: &Table) -> bool {
        Rc::ptr_eq(&self.inner, &rhs.inner) || self.inner == rhs.inner
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;

        for (i, (key, value)) in self.inner.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write_str_repr(f, key)?;
            write!(f, ": {:?}", value)?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables() {
        let table = Table::new();

        assert!(table.get("foo").is_none());

        let table = table.with("foo", "hello");
        assert_eq!(table.get("foo"), Some(&Value::from("hello")));
        assert!(table.contains_key("foo"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_macro() {
        let table = crate::table! {
            "a" => 1,
            "b" => "two",
        };

        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(format!("{:?}", table), "{'a': 1, 'b': 'two'}");
    }
}
