//! Structures and implementations of the built-in data types.
use crate::{
    class::Class,
    foreign::ForeignFn,
    object::Object,
    table::Table,
};
use std::{
    fmt,
    iter::FromIterator,
    rc::Rc,
};

/// A dynamically typed value. This is a small enum that can represent any of
/// the possible data types an expression can produce or consume.
///
/// Scalar types are stored inline, while heavier types are stored behind a
/// pointer so that values can be copied cheaply. All values are immutable.
#[derive(Clone)]
pub enum Value {
    /// The "empty" value.
    None,

    Bool(bool),

    Int(i64),

    Float(f64),

    /// An immutable string, stored by reference.
    String(Rc<str>),

    /// An immutable list of values, stored by reference.
    List(Rc<[Value]>),

    /// A mapping from string keys to values.
    Table(Table),

    /// A host object with attributes.
    Object(Rc<dyn Object>),

    /// A native function or bound method.
    Function(ForeignFn),
}

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value).map(Value::Int).unwrap_or(Value::Float(value as f64))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values.into())
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Value::Table(table)
    }
}

impl From<ForeignFn> for Value {
    fn from(function: ForeignFn) -> Self {
        Value::Function(function)
    }
}

impl<T: Object + 'static> From<Rc<T>> for Value {
    fn from(object: Rc<T>) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::None)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(iter.into_iter().collect())
    }
}

impl Value {
    /// Create an object value.
    pub fn object(object: impl Object + 'static) -> Self {
        Value::Object(Rc::new(object))
    }

    /// Get the class of this value.
    pub fn class(&self) -> Class {
        match self {
            Value::None => Class::NONE,
            Value::Bool(_) => Class::BOOL,
            Value::Int(_) => Class::INT,
            Value::Float(_) => Class::FLOAT,
            Value::String(_) => Class::STR,
            Value::List(_) => Class::LIST,
            Value::Table(_) => Class::DICT,
            Value::Object(object) => object.class(),
            Value::Function(_) => Class::FUNCTION,
        }
    }

    /// Get the name of the type of this value, as used in error messages.
    pub fn type_name(&self) -> String {
        self.class().name().to_owned()
    }

    /// Determine if this value is considered a truthy value.
    ///
    /// `None`, `False`, zero, the empty string, and empty collections are
    /// considered falsey, and all other values are considered truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::String(value) => !value.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Table(table) => !table.is_empty(),
            Value::Object(_) | Value::Function(_) => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// If this value is an integer (booleans included), get its value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(value) => Some(*value as i64),
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// If this value is any kind of number (booleans included), get its value
    /// as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => self.as_int().map(|value| value as f64),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Int(_) | Value::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(&**value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(&**items),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&ForeignFn> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::None, Value::None) => true,
            (Value::String(lhs), Value::String(rhs)) => lhs == rhs,
            (Value::List(lhs), Value::List(rhs)) => lhs == rhs,
            (Value::Table(lhs), Value::Table(rhs)) => lhs == rhs,
            (Value::Object(lhs), Value::Object(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Function(lhs), Value::Function(rhs)) => lhs == rhs,
            (Value::Float(lhs), Value::Float(rhs)) => lhs == rhs,
            (Value::Float(float), other) | (other, Value::Float(float)) => match other.as_int() {
                Some(int) => int_equals_float(int, *float),
                None => false,
            },
            _ => match (self.as_int(), rhs.as_int()) {
                (Some(lhs), Some(rhs)) => lhs == rhs,
                _ => false,
            },
        }
    }
}

/// Compare an integer and a float exactly, without rounding the integer.
fn int_equals_float(int: i64, float: f64) -> bool {
    // 2^63 is exactly representable, so this bound admits every integral float
    // that fits in an i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    float.fract() == 0.0 && float >= -LIMIT && float < LIMIT && float as i64 == int
}

impl PartialEq<str> for Value {
    fn eq(&self, rhs: &str) -> bool {
        self.as_str() == Some(rhs)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, rhs: &&str) -> bool {
        self.as_str() == Some(*rhs)
    }
}

/// Write a string the way it would be written as a literal.
pub(crate) fn write_str_repr(f: &mut fmt::Formatter, value: &str) -> fmt::Result {
    if value.contains('\'') && !value.contains('"') {
        write!(f, "\"{}\"", value)
    } else {
        write!(f, "'{}'", value.replace('\'', "\\'"))
    }
}

fn write_float(f: &mut fmt::Formatter, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "nan")
    } else if value.is_infinite() {
        write!(f, "{}inf", if value < 0.0 { "-" } else { "" })
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        write!(f, "{:.1}", value)
    } else {
        write!(f, "{}", value)
    }
}

/// Renders values the way `repr()` would, quoting strings.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(value) => write_str_repr(f, value),
            value => fmt::Display::fmt(value, f),
        }
    }
}

/// Renders values the way `str()` would.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write_float(f, *value),
            Value::String(value) => write!(f, "{}", value),
            Value::List(items) => {
                write!(f, "[")?;

                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }

                write!(f, "]")
            },
            Value::Table(table) => write!(f, "{:?}", table),
            Value::Object(object) => write!(f, "{:?}", object),
            Value::Function(function) => write!(f, "{}", function),
        }
    }
}
