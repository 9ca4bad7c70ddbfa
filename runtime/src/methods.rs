//! Methods of the built-in scalar types.
//!
//! Methods are bound to their receiver when they are looked up, and are owned
//! by the receiver's built-in class, so the sandbox always permits them.

use crate::{
    class::Class,
    error::EvaluationError,
    foreign::ForeignFn,
    value::Value,
};
use std::rc::Rc;

type Method = fn(&Value, &[Value]) -> Result<Value, EvaluationError>;

/// Look up a method of a built-in value by name, bound to that value.
pub(crate) fn lookup(receiver: &Value, name: &str) -> Option<Value> {
    let method: Method = match (receiver, name) {
        (Value::String(_), "lower") => str_lower,
        (Value::String(_), "upper") => str_upper,
        (Value::String(_), "strip") => str_strip,
        (Value::String(_), "lstrip") => str_lstrip,
        (Value::String(_), "rstrip") => str_rstrip,
        (Value::String(_), "startswith") => str_startswith,
        (Value::String(_), "endswith") => str_endswith,
        (Value::String(_), "split") => str_split,
        (Value::String(_), "replace") => str_replace,
        (Value::String(_), "find") => str_find,
        (Value::String(_), "count") => str_count,
        (Value::List(_), "count") => list_count,
        (Value::List(_), "index") => list_index,
        _ => return None,
    };

    let receiver = receiver.clone();
    let name: Rc<str> = name.into();
    let method_name = name.clone();

    Some(Value::Function(ForeignFn::method(receiver.class(), name, move |args| {
        method(&receiver, args).map_err(|e| {
            EvaluationError::with_cause(format!("{}.{}() failed", receiver.type_name(), method_name), e)
        })
    })))
}

fn receiver_str(receiver: &Value) -> Result<&str, EvaluationError> {
    receiver.as_str().ok_or_else(|| EvaluationError::new("receiver must be a str"))
}

fn receiver_list(receiver: &Value) -> Result<&[Value], EvaluationError> {
    receiver.as_list().ok_or_else(|| EvaluationError::new("receiver must be a list"))
}

fn arity(args: &[Value], min: usize, max: usize) -> Result<(), EvaluationError> {
    if args.len() < min || args.len() > max {
        throw!("expected between {} and {} arguments, got {}", min, max, args.len());
    }
    Ok(())
}

fn str_arg(args: &[Value], index: usize) -> Result<&str, EvaluationError> {
    match args.get(index) {
        Some(Value::String(value)) => Ok(&**value),
        Some(value) => throw!("argument {} must be str, not {}", index + 1, value.type_name()),
        None => throw!("missing argument {}", index + 1),
    }
}

/// An optional set of characters to strip; `None` strips whitespace.
fn strip_chars(args: &[Value]) -> Result<Option<Vec<char>>, EvaluationError> {
    arity(args, 0, 1)?;
    match args.first() {
        None | Some(Value::None) => Ok(None),
        Some(_) => Ok(Some(str_arg(args, 0)?.chars().collect())),
    }
}

fn str_lower(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    arity(args, 0, 0)?;
    Ok(receiver_str(receiver)?.to_lowercase().into())
}

fn str_upper(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    arity(args, 0, 0)?;
    Ok(receiver_str(receiver)?.to_uppercase().into())
}

fn str_strip(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    let s = receiver_str(receiver)?;
    Ok(match strip_chars(args)? {
        Some(chars) => s.trim_matches(chars.as_slice()),
        None => s.trim(),
    }
    .into())
}

fn str_lstrip(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    let s = receiver_str(receiver)?;
    Ok(match strip_chars(args)? {
        Some(chars) => s.trim_start_matches(chars.as_slice()),
        None => s.trim_start(),
    }
    .into())
}

fn str_rstrip(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    let s = receiver_str(receiver)?;
    Ok(match strip_chars(args)? {
        Some(chars) => s.trim_end_matches(chars.as_slice()),
        None => s.trim_end(),
    }
    .into())
}

fn str_startswith(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    arity(args, 1, 1)?;
    Ok(receiver_str(receiver)?.starts_with(str_arg(args, 0)?).into())
}

fn str_endswith(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    arity(args, 1, 1)?;
    Ok(receiver_str(receiver)?.ends_with(str_arg(args, 0)?).into())
}

fn str_split(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    arity(args, 0, 1)?;
    let s = receiver_str(receiver)?;

    Ok(match args.first() {
        None | Some(Value::None) => s.split_whitespace().map(Value::from).collect(),
        Some(_) => {
            let separator = str_arg(args, 0)?;
            if separator.is_empty() {
                throw!("empty separator");
            }
            s.split(separator).map(Value::from).collect()
        },
    })
}

fn str_replace(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    arity(args, 2, 2)?;
    Ok(receiver_str(receiver)?.replace(str_arg(args, 0)?, str_arg(args, 1)?).into())
}

fn str_find(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    arity(args, 1, 1)?;
    let s = receiver_str(receiver)?;

    Ok(match s.find(str_arg(args, 0)?) {
        Some(byte_index) => Value::from(s[..byte_index].chars().count()),
        None => Value::Int(-1),
    })
}

fn str_count(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    arity(args, 1, 1)?;
    Ok(receiver_str(receiver)?.matches(str_arg(args, 0)?).count().into())
}

fn list_count(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    arity(args, 1, 1)?;
    let needle = &args[0];
    Ok(receiver_list(receiver)?.iter().filter(|item| *item == needle).count().into())
}

fn list_index(receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    arity(args, 1, 1)?;
    let needle = &args[0];

    match receiver_list(receiver)?.iter().position(|item| item == needle) {
        Some(index) => Ok(index.into()),
        None => throw!("{:?} is not in list", needle),
    }
}
