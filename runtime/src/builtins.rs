//! Implementations of built-in global functions that are always available.

use crate::{
    error::EvaluationError,
    foreign::ForeignFn,
    ops,
    table::Table,
    value::Value,
};
use pyexpr_syntax::ast::Operator;

/// Build the table of built-in functions. Built-ins are free functions, so the
/// sandbox never restricts them.
pub fn get() -> Table {
    table! {
        "abs" => ForeignFn::new("abs", abs),
        "all" => ForeignFn::new("all", all),
        "any" => ForeignFn::new("any", any),
        "float" => ForeignFn::new("float", float),
        "int" => ForeignFn::new("int", int),
        "len" => ForeignFn::new("len", len),
        "max" => ForeignFn::new("max", max),
        "min" => ForeignFn::new("min", min),
        "str" => ForeignFn::new("str", str),
    }
}

fn exactly_one<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value, EvaluationError> {
    match args {
        [arg] => Ok(arg),
        _ => throw!("{}() takes exactly one argument ({} given)", name, args.len()),
    }
}

fn at_most_one<'a>(name: &str, args: &'a [Value]) -> Result<Option<&'a Value>, EvaluationError> {
    match args {
        [] => Ok(None),
        [arg] => Ok(Some(arg)),
        _ => throw!("{}() takes at most 1 argument ({} given)", name, args.len()),
    }
}

/// Get the items of an iterable value. Strings iterate over characters and
/// dicts over their keys.
fn items(value: &Value) -> Result<Vec<Value>, EvaluationError> {
    match value {
        Value::List(items) => Ok(items.to_vec()),
        Value::String(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
        Value::Table(table) => Ok(table.keys().map(Value::from).collect()),
        value => throw!("'{}' object is not iterable", value.type_name()),
    }
}

/// Returns the absolute value of a number.
fn abs(args: &[Value]) -> Result<Value, EvaluationError> {
    match exactly_one("abs", args)? {
        Value::Float(value) => Ok(Value::Float(value.abs())),
        value @ (Value::Bool(_) | Value::Int(_)) => match value.as_int().and_then(i64::checked_abs) {
            Some(value) => Ok(Value::Int(value)),
            None => throw!("integer overflow in abs()"),
        },
        value => throw!("bad operand type for abs(): '{}'", value.type_name()),
    }
}

fn all(args: &[Value]) -> Result<Value, EvaluationError> {
    Ok(items(exactly_one("all", args)?)?.iter().all(Value::is_truthy).into())
}

fn any(args: &[Value]) -> Result<Value, EvaluationError> {
    Ok(items(exactly_one("any", args)?)?.iter().any(Value::is_truthy).into())
}

/// Returns the number of items in a collection, or characters in a string.
fn len(args: &[Value]) -> Result<Value, EvaluationError> {
    match exactly_one("len", args)? {
        Value::String(s) => Ok(s.chars().count().into()),
        Value::List(items) => Ok(items.len().into()),
        Value::Table(table) => Ok(table.len().into()),
        value => throw!("object of type '{}' has no len()", value.type_name()),
    }
}

fn max(args: &[Value]) -> Result<Value, EvaluationError> {
    extreme("max", Operator::Greater, args)
}

fn min(args: &[Value]) -> Result<Value, EvaluationError> {
    extreme("min", Operator::Less, args)
}

/// Find the first item that no other item beats under `operator`. Accepts a
/// single iterable or two or more positional arguments.
fn extreme(name: &str, operator: Operator, args: &[Value]) -> Result<Value, EvaluationError> {
    let candidates = match args {
        [] => throw!("{} expected at least 1 argument, got 0", name),
        [iterable] => items(iterable)?,
        args => args.to_vec(),
    };

    let mut candidates = candidates.into_iter();
    let mut best = match candidates.next() {
        Some(first) => first,
        None => throw!("{}() arg is an empty sequence", name),
    };

    for candidate in candidates {
        if ops::compare(operator, &candidate, &best)?.is_truthy() {
            best = candidate;
        }
    }

    Ok(best)
}

/// Converts a number or a numeric string into an integer. Floats are
/// truncated towards zero.
fn int(args: &[Value]) -> Result<Value, EvaluationError> {
    match at_most_one("int", args)? {
        None => Ok(Value::Int(0)),
        Some(value @ (Value::Bool(_) | Value::Int(_))) => Ok(value.as_int().into()),
        Some(Value::Float(value)) => {
            if !value.is_finite() {
                throw!("cannot convert float {} to integer", Value::Float(*value));
            }
            let truncated = value.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                throw!("integer overflow in int()");
            }
            Ok(Value::Int(truncated as i64))
        },
        Some(Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(value) => Ok(Value::Int(value)),
            Err(_) => throw!("invalid literal for int() with base 10: {:?}", Value::String(s.clone())),
        },
        Some(value) => throw!(
            "int() argument must be a string or a number, not '{}'",
            value.type_name()
        ),
    }
}

/// Converts a number or a numeric string into a float.
fn float(args: &[Value]) -> Result<Value, EvaluationError> {
    match at_most_one("float", args)? {
        None => Ok(Value::Float(0.0)),
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(value) => Ok(Value::Float(value)),
            Err(_) => throw!("could not convert string to float: {:?}", Value::String(s.clone())),
        },
        Some(value) => match value.as_float() {
            Some(value) => Ok(Value::Float(value)),
            None => throw!(
                "float() argument must be a string or a number, not '{}'",
                value.type_name()
            ),
        },
    }
}

/// Renders any value as a string.
fn str(args: &[Value]) -> Result<Value, EvaluationError> {
    Ok(match at_most_one("str", args)? {
        None => Value::from(""),
        Some(value @ Value::String(_)) => value.clone(),
        Some(value) => Value::from(value.to_string()),
    })
}
