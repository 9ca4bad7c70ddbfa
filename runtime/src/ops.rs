//! Operator semantics for values.

use crate::{
    error::EvaluationError,
    value::Value,
};
use pyexpr_syntax::ast::Operator;
use std::{cmp::Ordering, iter};

/// Operands of a binary numeric operation after promotion.
enum Numbers {
    Ints(i64, i64),
    Floats(f64, f64),
}

impl Numbers {
    /// Promote two operands to a common numeric type. Booleans count as
    /// integers, and an integer paired with a float becomes a float.
    fn promote(lhs: &Value, rhs: &Value) -> Option<Self> {
        if !lhs.is_number() || !rhs.is_number() {
            return None;
        }

        match (lhs.as_int(), rhs.as_int()) {
            (Some(lhs), Some(rhs)) => Some(Numbers::Ints(lhs, rhs)),
            _ => Some(Numbers::Floats(lhs.as_float()?, rhs.as_float()?)),
        }
    }
}

fn unsupported(operator: Operator, lhs: &Value, rhs: &Value) -> EvaluationError {
    EvaluationError::new(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        operator,
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn overflow(operator: Operator) -> EvaluationError {
    EvaluationError::new(format!("integer overflow in {}", operator))
}

/// Arithmetic negation.
pub(crate) fn negate(value: &Value) -> Result<Value, EvaluationError> {
    match value {
        Value::Float(value) => Ok(Value::Float(-value)),
        Value::Bool(_) | Value::Int(_) => match value.as_int().and_then(i64::checked_neg) {
            Some(value) => Ok(Value::Int(value)),
            None => Err(overflow(Operator::Negation)),
        },
        value => throw!("bad operand type for unary -: '{}'", value.type_name()),
    }
}

/// Logical inversion, following truthiness.
pub(crate) fn invert(value: &Value) -> Value {
    Value::Bool(!value.is_truthy())
}

/// Apply one of the binary arithmetic operators.
pub(crate) fn arithmetic(operator: Operator, lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    match operator {
        Operator::Addition => add(lhs, rhs),
        Operator::Subtraction => subtract(lhs, rhs),
        Operator::Multiplication => multiply(lhs, rhs),
        Operator::Division => divide(lhs, rhs),
        Operator::Exponentiation => power(lhs, rhs),
        operator => throw!("Incorrect operator {} for arithmetic expression", operator),
    }
}

fn add(lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    match (lhs, rhs) {
        (Value::String(lhs), Value::String(rhs)) => Ok(format!("{}{}", lhs, rhs).into()),
        (Value::List(lhs), Value::List(rhs)) => Ok(lhs.iter().chain(rhs.iter()).cloned().collect()),
        _ => match Numbers::promote(lhs, rhs) {
            Some(Numbers::Ints(a, b)) => a.checked_add(b).map(Value::Int).ok_or_else(|| overflow(Operator::Addition)),
            Some(Numbers::Floats(a, b)) => Ok(Value::Float(a + b)),
            None => Err(unsupported(Operator::Addition, lhs, rhs)),
        },
    }
}

fn subtract(lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    match Numbers::promote(lhs, rhs) {
        Some(Numbers::Ints(a, b)) => a.checked_sub(b).map(Value::Int).ok_or_else(|| overflow(Operator::Subtraction)),
        Some(Numbers::Floats(a, b)) => Ok(Value::Float(a - b)),
        None => Err(unsupported(Operator::Subtraction, lhs, rhs)),
    }
}

fn multiply(lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    match (lhs, rhs) {
        (Value::String(s), count @ (Value::Int(_) | Value::Bool(_)))
        | (count @ (Value::Int(_) | Value::Bool(_)), Value::String(s)) => {
            Ok(s.repeat(repetitions(s.len(), count)?).into())
        },
        (Value::List(items), count @ (Value::Int(_) | Value::Bool(_)))
        | (count @ (Value::Int(_) | Value::Bool(_)), Value::List(items)) => {
            Ok(iter::repeat(items.iter())
                .take(repetitions(items.len(), count)?)
                .flatten()
                .cloned()
                .collect())
        },
        _ => match Numbers::promote(lhs, rhs) {
            Some(Numbers::Ints(a, b)) => a
                .checked_mul(b)
                .map(Value::Int)
                .ok_or_else(|| overflow(Operator::Multiplication)),
            Some(Numbers::Floats(a, b)) => Ok(Value::Float(a * b)),
            None => Err(unsupported(Operator::Multiplication, lhs, rhs)),
        },
    }
}

/// Longest sequence, in elements or bytes, that repetition may produce.
const MAX_REPEATED_LEN: usize = 1 << 24;

/// How many times to repeat a sequence of `len` elements. Sequences repeated a
/// negative number of times are empty.
fn repetitions(len: usize, count: &Value) -> Result<usize, EvaluationError> {
    let count = count.as_int().and_then(|count| usize::try_from(count).ok()).unwrap_or(0);

    if len == 0 {
        return Ok(0);
    }

    match len.checked_mul(count) {
        Some(total) if total <= MAX_REPEATED_LEN => Ok(count),
        _ => throw!("repeated sequence is too long ({} x {})", len, count),
    }
}

fn divide(lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    match Numbers::promote(lhs, rhs) {
        Some(Numbers::Ints(a, b)) => divide_floats(a as f64, b as f64),
        Some(Numbers::Floats(a, b)) => divide_floats(a, b),
        None => Err(unsupported(Operator::Division, lhs, rhs)),
    }
}

fn divide_floats(a: f64, b: f64) -> Result<Value, EvaluationError> {
    if b == 0.0 {
        throw!("division by zero");
    }
    Ok(Value::Float(a / b))
}

fn power(lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    match Numbers::promote(lhs, rhs) {
        Some(Numbers::Ints(base, exponent)) if exponent >= 0 => u32::try_from(exponent)
            .ok()
            .and_then(|exponent| base.checked_pow(exponent))
            .map(Value::Int)
            .ok_or_else(|| overflow(Operator::Exponentiation)),
        Some(Numbers::Ints(base, exponent)) => power_floats(base as f64, exponent as f64),
        Some(Numbers::Floats(base, exponent)) => power_floats(base, exponent),
        None => Err(unsupported(Operator::Exponentiation, lhs, rhs)),
    }
}

fn power_floats(base: f64, exponent: f64) -> Result<Value, EvaluationError> {
    if base == 0.0 && exponent < 0.0 {
        throw!("0.0 cannot be raised to a negative power");
    }
    Ok(Value::Float(base.powf(exponent)))
}

/// Apply `and` or `or`. Both operands have already been evaluated; the
/// operators combine them bitwise rather than short-circuiting.
pub(crate) fn boolean(operator: Operator, lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    let combine: fn(i64, i64) -> i64 = match operator {
        Operator::Conjunction => |a: i64, b: i64| a & b,
        Operator::Disjunction => |a: i64, b: i64| a | b,
        operator => throw!("Incorrect operator {} for boolean expression", operator),
    };

    match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(combine(*a as i64, *b as i64) != 0)),
        (Value::Bool(_) | Value::Int(_), Value::Bool(_) | Value::Int(_)) => {
            match (lhs.as_int(), rhs.as_int()) {
                (Some(a), Some(b)) => Ok(Value::Int(combine(a, b))),
                _ => Err(unsupported(operator, lhs, rhs)),
            }
        },
        _ => Err(unsupported(operator, lhs, rhs)),
    }
}

/// Apply one of the comparison operators, including membership.
pub(crate) fn compare(operator: Operator, lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    let result = match operator {
        Operator::Equal => lhs == rhs,
        Operator::NotEqual => lhs != rhs,
        Operator::Greater => order(operator, lhs, rhs)? == Some(Ordering::Greater),
        Operator::GreaterOrEqual => matches!(order(operator, lhs, rhs)?, Some(Ordering::Greater | Ordering::Equal)),
        Operator::Less => order(operator, lhs, rhs)? == Some(Ordering::Less),
        Operator::LessOrEqual => matches!(order(operator, lhs, rhs)?, Some(Ordering::Less | Ordering::Equal)),
        Operator::In => contains(rhs, lhs)?,
        operator => throw!("Incorrect operator {} for comparison expression", operator),
    };

    Ok(Value::Bool(result))
}

/// Order two values. Unordered numbers (NaN) give `None`.
fn order(operator: Operator, lhs: &Value, rhs: &Value) -> Result<Option<Ordering>, EvaluationError> {
    match (lhs, rhs) {
        (Value::String(lhs), Value::String(rhs)) => Ok(Some(lhs.cmp(rhs))),
        (Value::List(lhs), Value::List(rhs)) => {
            for (a, b) in lhs.iter().zip(rhs.iter()) {
                if a != b {
                    return order(operator, a, b);
                }
            }
            Ok(Some(lhs.len().cmp(&rhs.len())))
        },
        _ => match Numbers::promote(lhs, rhs) {
            Some(Numbers::Ints(a, b)) => Ok(Some(a.cmp(&b))),
            Some(Numbers::Floats(a, b)) => Ok(a.partial_cmp(&b)),
            None => throw!(
                "'{}' not supported between instances of '{}' and '{}'",
                operator,
                lhs.type_name(),
                rhs.type_name()
            ),
        },
    }
}

/// Test whether `needle` is a member of `haystack`.
pub(crate) fn contains(haystack: &Value, needle: &Value) -> Result<bool, EvaluationError> {
    match haystack {
        Value::List(items) => Ok(items.iter().any(|item| item == needle)),
        Value::String(s) => match needle {
            Value::String(needle) => Ok(s.contains(&**needle)),
            needle => throw!("'in <string>' requires string as left operand, not {}", needle.type_name()),
        },
        Value::Table(table) => match needle {
            Value::String(key) => Ok(table.contains_key(key)),
            needle => throw!("dict keys are strings, not {}", needle.type_name()),
        },
        haystack => throw!("argument of type '{}' is not iterable", haystack.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[i64]) -> Value {
        items.iter().copied().map(Value::Int).collect()
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(arithmetic(Operator::Addition, &Value::Int(2), &Value::Int(3)).unwrap(), Value::Int(5));
        assert!(matches!(
            arithmetic(Operator::Exponentiation, &Value::Int(2), &Value::Int(10)).unwrap(),
            Value::Int(1024)
        ));
        assert!(matches!(
            arithmetic(Operator::Addition, &Value::Bool(true), &Value::Bool(true)).unwrap(),
            Value::Int(2)
        ));
    }

    #[test]
    fn division_is_always_float() {
        assert!(matches!(
            arithmetic(Operator::Division, &Value::Int(6), &Value::Int(3)).unwrap(),
            Value::Float(f) if f == 2.0
        ));
        assert!(arithmetic(Operator::Division, &Value::Int(1), &Value::Int(0)).is_err());
        assert!(arithmetic(Operator::Division, &Value::Float(1.0), &Value::Float(0.0)).is_err());
    }

    #[test]
    fn negative_exponent_is_float() {
        assert!(matches!(
            arithmetic(Operator::Exponentiation, &Value::Int(2), &Value::Int(-1)).unwrap(),
            Value::Float(f) if f == 0.5
        ));
        assert!(arithmetic(Operator::Exponentiation, &Value::Int(0), &Value::Int(-1)).is_err());
    }

    #[test]
    fn overflow_is_an_error() {
        let error = arithmetic(Operator::Multiplication, &Value::Int(i64::MAX), &Value::Int(2)).unwrap_err();
        assert_eq!(error.to_string(), "integer overflow in *");
        assert!(negate(&Value::Int(i64::MIN)).is_err());
    }

    #[test]
    fn sequences() {
        assert_eq!(arithmetic(Operator::Addition, &"ab".into(), &"cd".into()).unwrap(), "abcd");
        assert_eq!(arithmetic(Operator::Multiplication, &"ab".into(), &Value::Int(3)).unwrap(), "ababab");
        assert_eq!(arithmetic(Operator::Multiplication, &Value::Int(-1), &"ab".into()).unwrap(), "");
        assert_eq!(
            arithmetic(Operator::Addition, &list(&[1]), &list(&[2, 3])).unwrap(),
            list(&[1, 2, 3])
        );
        assert_eq!(
            arithmetic(Operator::Multiplication, &list(&[1, 2]), &Value::Int(2)).unwrap(),
            list(&[1, 2, 1, 2])
        );
    }

    #[test]
    fn repetition_is_bounded() {
        let huge = Value::Int(1_000_000_000_000);

        let error = arithmetic(Operator::Multiplication, &"a".into(), &huge).unwrap_err();
        assert!(error.to_string().starts_with("repeated sequence is too long"));
        assert!(arithmetic(Operator::Multiplication, &huge, &list(&[1, 2])).is_err());
        assert!(arithmetic(Operator::Multiplication, &list(&[1]), &Value::Int(i64::MAX)).is_err());

        assert_eq!(arithmetic(Operator::Multiplication, &"".into(), &huge).unwrap(), "");
        assert_eq!(arithmetic(Operator::Multiplication, &list(&[]), &huge).unwrap(), list(&[]));
    }

    #[test]
    fn mismatched_operands() {
        let error = arithmetic(Operator::Addition, &Value::Int(1), &"a".into()).unwrap_err();
        assert_eq!(error.to_string(), "unsupported operand type(s) for +: 'int' and 'str'");
        assert!(negate(&"a".into()).is_err());
    }

    #[test]
    fn boolean_operators_are_bitwise() {
        assert_eq!(boolean(Operator::Conjunction, &Value::Bool(true), &Value::Bool(false)).unwrap(), Value::Bool(false));
        assert_eq!(boolean(Operator::Disjunction, &Value::Bool(true), &Value::Bool(false)).unwrap(), Value::Bool(true));
        assert!(matches!(
            boolean(Operator::Conjunction, &Value::Int(6), &Value::Int(3)).unwrap(),
            Value::Int(2)
        ));
        assert!(matches!(
            boolean(Operator::Disjunction, &Value::Bool(true), &Value::Int(4)).unwrap(),
            Value::Int(5)
        ));
        assert!(boolean(Operator::Conjunction, &"a".into(), &Value::Bool(true)).is_err());
        assert!(boolean(Operator::Addition, &Value::Bool(true), &Value::Bool(true)).is_err());
    }

    #[test]
    fn ordering() {
        assert_eq!(compare(Operator::Less, &Value::Int(1), &Value::Float(1.5)).unwrap(), Value::Bool(true));
        assert_eq!(compare(Operator::GreaterOrEqual, &"b".into(), &"a".into()).unwrap(), Value::Bool(true));
        assert_eq!(compare(Operator::Less, &list(&[1, 2]), &list(&[1, 2, 0])).unwrap(), Value::Bool(true));
        assert_eq!(compare(Operator::Greater, &Value::Float(f64::NAN), &Value::Int(0)).unwrap(), Value::Bool(false));

        let error = compare(Operator::Less, &"a".into(), &Value::Int(1)).unwrap_err();
        assert_eq!(error.to_string(), "'<' not supported between instances of 'str' and 'int'");
    }

    #[test]
    fn membership() {
        assert!(contains(&list(&[1, 2, 3]), &Value::Int(3)).unwrap());
        assert!(!contains(&list(&[1, 2]), &Value::Int(3)).unwrap());
        assert!(contains(&"student@example.edu".into(), &"@example".into()).unwrap());
        assert!(contains(&Value::from(crate::table! { "uid" => "x", }), &"uid".into()).unwrap());
        assert!(contains(&"abc".into(), &Value::Int(1)).is_err());
        assert!(contains(&Value::Int(1), &Value::Int(1)).is_err());
    }
}
