//! This module contains the core logic of the interpreter.
//!
//! Evaluation is a recursive walk over the syntax tree. All of the state a walk
//! needs lives in a [`Frame`] that is passed down the recursion, so a single
//! tree can be evaluated any number of times, concurrently or reentrantly,
//! without anything leaking from one evaluation into the next.

use crate::{
    class::ClassSet,
    context::Context,
    error::EvaluationError,
    methods,
    ops,
    table::Table,
    value::Value,
};
use pyexpr_syntax::ast::*;

/// The environment an expression is evaluated in.
#[derive(Clone)]
pub(crate) struct Frame<'a> {
    /// Provides top-level names.
    context: &'a dyn Context,

    /// Classes whose bound methods may be called, built-ins included.
    safe_classes: &'a ClassSet,

    builtins: &'a Table,

    /// The value currently being dotted into, if any.
    scope: Option<Value>,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(context: &'a dyn Context, safe_classes: &'a ClassSet, builtins: &'a Table) -> Self {
        Self {
            context,
            safe_classes,
            builtins,
            scope: None,
        }
    }

    /// A frame for resolving names on the given value.
    fn with_scope(&self, scope: Value) -> Self {
        Self {
            scope: Some(scope),
            ..self.clone()
        }
    }

    /// A frame for resolving names at the top level.
    fn top_level(&self) -> Self {
        Self {
            scope: None,
            ..self.clone()
        }
    }
}

/// Evaluate an expression within a frame.
pub(crate) fn evaluate(frame: &Frame<'_>, expr: &Expr) -> Result<Value, EvaluationError> {
    match expr {
        Expr::Identifier(name) => evaluate_identifier(frame, name),
        Expr::String(value) => Ok(Value::from(value.as_str())),
        Expr::Number(text) => evaluate_number(text),
        Expr::Dot(dot) => evaluate_dot(frame, dot),
        Expr::UnaryArithmetic(unary) => match unary.operator {
            Operator::Negation => ops::negate(&evaluate(frame, &unary.argument)?),
            operator => throw!("Incorrect operator {} for unary arithmetic expression", operator),
        },
        Expr::UnaryBoolean(unary) => match unary.operator {
            Operator::Inversion => Ok(ops::invert(&evaluate(frame, &unary.argument)?)),
            operator => throw!("Incorrect operator {} for unary boolean expression", operator),
        },
        Expr::BinaryArithmetic(binary) => {
            let (lhs, rhs) = evaluate_operands(frame, binary)?;
            ops::arithmetic(binary.operator, &lhs, &rhs)
        },
        Expr::BinaryBoolean(binary) => {
            // Both sides are always evaluated; there is no short-circuiting.
            let (lhs, rhs) = evaluate_operands(frame, binary)?;
            ops::boolean(binary.operator, &lhs, &rhs)
        },
        Expr::Comparison(binary) => {
            let (lhs, rhs) = evaluate_operands(frame, binary)?;
            ops::compare(binary.operator, &lhs, &rhs)
        },
        Expr::Slice(slice) => evaluate_slice(frame, slice),
        Expr::Call(call) => evaluate_call(frame, call),
    }
}

fn evaluate_operands(frame: &Frame<'_>, binary: &BinaryExpression) -> Result<(Value, Value), EvaluationError> {
    Ok((evaluate(frame, &binary.left)?, evaluate(frame, &binary.right)?))
}

/// Integer if the literal is written as an integer, float otherwise.
fn evaluate_number(text: &str) -> Result<Value, EvaluationError> {
    if text.contains(|c| matches!(c, '.' | 'e' | 'E')) {
        return match text.parse::<f64>() {
            Ok(value) => Ok(Value::Float(value)),
            Err(_) => throw!("invalid number literal '{}'", text),
        };
    }

    match text.parse::<i64>() {
        Ok(value) => Ok(Value::Int(value)),
        Err(_) => throw!("integer overflow in literal '{}'", text),
    }
}

fn evaluate_identifier(frame: &Frame<'_>, name: &str) -> Result<Value, EvaluationError> {
    match frame.scope.as_ref() {
        Some(scope) => get_attribute(scope, name),
        None => {
            if let Some(builtin) = frame.builtins.get(name) {
                return Ok(builtin.clone());
            }

            match frame.context.lookup(name) {
                Some(value) => Ok(value),
                None => throw!("Cannot find attribute '{}' in {}", name, frame.context.describe()),
            }
        },
    }
}

/// Resolve an attribute on a value being dotted into.
fn get_attribute(target: &Value, name: &str) -> Result<Value, EvaluationError> {
    let attribute = match target {
        Value::Table(table) => table.get(name).cloned(),
        Value::Object(object) => object.attribute(name),
        Value::String(_) | Value::List(_) => methods::lookup(target, name),
        _ => None,
    };

    match attribute {
        Some(value) => Ok(value),
        None => throw!("Cannot find attribute '{}' in {:?}", name, target),
    }
}

fn evaluate_dot(frame: &Frame<'_>, dot: &DotExpression) -> Result<Value, EvaluationError> {
    let mut exprs = dot.0.iter();

    let mut value = match exprs.next() {
        Some(first) => evaluate(frame, first)?,
        None => throw!("Incorrect empty dot expression"),
    };

    for expr in exprs {
        value = evaluate(&frame.with_scope(value), expr)?;
    }

    Ok(value)
}

fn evaluate_slice(frame: &Frame<'_>, slice: &SliceExpression) -> Result<Value, EvaluationError> {
    let array = evaluate(frame, &slice.array)?;
    let index = evaluate(&frame.top_level(), &slice.index)?;

    subscript(&array, &index)
}

/// Get a single item out of a collection.
fn subscript(array: &Value, index: &Value) -> Result<Value, EvaluationError> {
    match array {
        Value::List(items) => {
            let position = sequence_index(array, index, items.len())?;
            Ok(items[position].clone())
        },
        Value::String(s) => {
            let position = sequence_index(array, index, s.chars().count())?;
            Ok(s.chars().nth(position).map(String::from).into())
        },
        Value::Table(table) => match index.as_str().and_then(|key| table.get(key)) {
            Some(value) => Ok(value.clone()),
            None => throw!("Cannot find key {:?} in {:?}", index, array),
        },
        Value::Object(object) => match object.item(index) {
            Some(value) => Ok(value),
            None => throw!("Cannot find key {:?} in {:?}", index, array),
        },
        array => throw!("'{}' object is not subscriptable", array.type_name()),
    }
}

/// Normalize a possibly negative index into a sequence of the given length.
fn sequence_index(array: &Value, index: &Value, len: usize) -> Result<usize, EvaluationError> {
    let index = match index {
        Value::Bool(_) | Value::Int(_) => index.as_int().unwrap_or_default(),
        index => throw!("{} indices must be integers, not {}", array.type_name(), index.type_name()),
    };

    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let position = if index < 0 { index + len } else { index };

    match usize::try_from(position) {
        Ok(position) if position < len as usize => Ok(position),
        _ => throw!("{} index out of range", array.type_name()),
    }
}

fn evaluate_call(frame: &Frame<'_>, call: &FunctionCallExpression) -> Result<Value, EvaluationError> {
    let callee = evaluate(frame, &call.function)?;

    // Arguments never see the scope of an enclosing dot chain.
    let top_level = frame.top_level();
    let args = call
        .arguments
        .iter()
        .map(|arg| evaluate(&top_level, arg))
        .collect::<Result<Vec<_>, _>>()?;

    let function = match &callee {
        Value::Function(function) => function,
        value => throw!("'{}' object is not callable", value.type_name()),
    };

    if let Some(owner) = function.owner() {
        if !frame.safe_classes.contains(owner) {
            log::debug!("refusing to call {}: {} is not a safe class", function, owner);
            throw!(
                "Function {} defined in a not-safe class {} and cannot be called",
                function.name(),
                owner
            );
        }
    }

    log::trace!("calling {} with {} argument(s)", function, args.len());

    function.call(&args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{class::Class, foreign::ForeignFn, object::Object};
    use pyexpr_syntax::parse;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Greeter;

    impl Object for Greeter {
        fn class(&self) -> Class {
            Class::new("Greeter")
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some("world".into()),
                "greet" => Some(
                    ForeignFn::method(self.class(), "greet", |args| {
                        Ok(format!("hello {}", args.first().cloned().unwrap_or_default()).into())
                    })
                    .into(),
                ),
                _ => None,
            }
        }
    }

    fn eval(source: &str, context: &dyn Context, safe_classes: &[Class]) -> Result<Value, EvaluationError> {
        let mut classes = ClassSet::builtin();
        classes.extend(safe_classes);
        let builtins = crate::builtins::get();

        evaluate(&Frame::new(context, &classes, &builtins), &parse(source).unwrap())
    }

    fn greeter_context() -> Table {
        table! {
            "greeter" => Rc::new(Greeter),
            "name" => "top",
        }
    }

    #[test]
    fn numbers_are_int_when_exact() {
        assert!(matches!(evaluate_number("42").unwrap(), Value::Int(42)));
        assert!(matches!(evaluate_number("-7").unwrap(), Value::Int(-7)));
        assert!(matches!(evaluate_number("1.5").unwrap(), Value::Float(f) if f == 1.5));
        assert!(matches!(evaluate_number("1e3").unwrap(), Value::Float(f) if f == 1000.0));
    }

    #[test]
    fn integer_literal_out_of_range() {
        assert!(matches!(evaluate_number("9223372036854775807").unwrap(), Value::Int(i64::MAX)));
        assert_eq!(
            evaluate_number("9223372036854775808").unwrap_err().to_string(),
            "integer overflow in literal '9223372036854775808'"
        );
        assert!(matches!(evaluate_number("9223372036854775808.0").unwrap(), Value::Float(_)));

        let error = eval("9223372036854775808 == 9223372036854775807", &Table::new(), &[]).unwrap_err();
        assert!(error.to_string().contains("integer overflow in literal"));
    }

    #[test]
    fn builtins_shadow_context_only_at_top_level() {
        let context = table! {
            "len" => "shadowed",
            "record" => table! { "len" => 3, },
        };

        assert!(eval("len", &context, &[]).unwrap().as_function().is_some());
        assert_eq!(eval("record.len", &context, &[]).unwrap(), Value::Int(3));
    }

    #[test]
    fn call_arguments_are_resolved_at_top_level() {
        let context = greeter_context();

        assert_eq!(eval("greeter.greet(name)", &context, &[Class::new("Greeter")]).unwrap(), "hello top");
        assert_eq!(
            eval("greeter.greet(greeter.name)", &context, &[Class::new("Greeter")]).unwrap(),
            "hello world"
        );
    }

    #[test]
    fn sandbox_rejects_unsafe_methods() {
        let context = greeter_context();

        let error = eval("greeter.greet('x')", &context, &[]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Function greet defined in a not-safe class <class 'Greeter'> and cannot be called"
        );

        // Attributes are not calls, so they are always readable.
        assert_eq!(eval("greeter.name", &context, &[]).unwrap(), "world");
    }

    #[test]
    fn attribute_errors_name_the_target() {
        let context = table! { "a" => table! { "b" => 1, }, };

        assert_eq!(
            eval("a.c", &context, &[]).unwrap_err().to_string(),
            "Cannot find attribute 'c' in {'b': 1}"
        );
        assert_eq!(
            eval("missing", &context, &[]).unwrap_err().to_string(),
            "Cannot find attribute 'missing' in {'a': {'b': 1}}"
        );
    }

    #[test]
    fn subscription() {
        let context = table! {
            "xs" => vec![Value::Int(1), Value::Int(2), Value::Int(3)],
            "word" => "héllo",
            "d" => table! { "k" => "v", },
        };

        assert_eq!(eval("xs[-1]", &context, &[]).unwrap(), Value::Int(3));
        assert_eq!(eval("word[1]", &context, &[]).unwrap(), "é");
        assert_eq!(eval("d['k']", &context, &[]).unwrap(), "v");
        assert_eq!(eval("xs[3]", &context, &[]).unwrap_err().to_string(), "list index out of range");
        assert_eq!(eval("xs[-4]", &context, &[]).unwrap_err().to_string(), "list index out of range");
        assert_eq!(
            eval("xs['a']", &context, &[]).unwrap_err().to_string(),
            "list indices must be integers, not str"
        );
        assert_eq!(eval("d['x']", &context, &[]).unwrap_err().to_string(), "Cannot find key 'x' in {'k': 'v'}");
    }

    #[test]
    fn calling_a_non_function() {
        let context = table! { "x" => 1, };

        assert_eq!(eval("x(1)", &context, &[]).unwrap_err().to_string(), "'int' object is not callable");
    }

    #[test]
    fn mismatched_operator_is_an_error() {
        let expr = Expr::UnaryBoolean(UnaryExpression {
            operator: Operator::Negation,
            argument: Box::new(Expr::number("1")),
        });
        let classes = ClassSet::builtin();
        let builtins = crate::builtins::get();
        let context = Table::new();

        let error = evaluate(&Frame::new(&context, &classes, &builtins), &expr).unwrap_err();
        assert_eq!(error.to_string(), "Incorrect operator - for unary boolean expression");
    }
}
