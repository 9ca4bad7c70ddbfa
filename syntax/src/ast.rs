//! Abstract syntax tree definitions for the expression language.
//!
//! A tree is produced once by the parser and never mutated afterwards. Every
//! parent exclusively owns its children, so trees can be cloned, shared behind
//! an `Arc`, or serialized freely.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The family an operator belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OperatorFamily {
    Arithmetic,
    Boolean,
    Comparison,
}

impl fmt::Display for OperatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            OperatorFamily::Arithmetic => "arithmetic",
            OperatorFamily::Boolean => "boolean",
            OperatorFamily::Comparison => "comparison",
        })
    }
}

/// Every operator the language knows about.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operator {
    // Arithmetic.
    Negation,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Exponentiation,

    // Boolean.
    Inversion,
    Conjunction,
    Disjunction,

    // Comparison.
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    In,
}

impl Operator {
    /// Get the family this operator belongs to.
    pub fn family(self) -> OperatorFamily {
        match self {
            Operator::Negation
            | Operator::Addition
            | Operator::Subtraction
            | Operator::Multiplication
            | Operator::Division
            | Operator::Exponentiation => OperatorFamily::Arithmetic,

            Operator::Inversion | Operator::Conjunction | Operator::Disjunction => OperatorFamily::Boolean,

            Operator::Equal
            | Operator::NotEqual
            | Operator::Greater
            | Operator::GreaterOrEqual
            | Operator::Less
            | Operator::LessOrEqual
            | Operator::In => OperatorFamily::Comparison,
        }
    }

    /// Returns true if this operator takes a single operand.
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Negation | Operator::Inversion)
    }

    /// The operator as it is written in source text.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Negation | Operator::Subtraction => "-",
            Operator::Addition => "+",
            Operator::Multiplication => "*",
            Operator::Division => "/",
            Operator::Exponentiation => "**",
            Operator::Inversion => "not",
            Operator::Conjunction => "and",
            Operator::Disjunction => "or",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::In => "in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Abstract representation of an expression.
///
/// Contains a variant for each different expression type. Unary and binary
/// expressions are split by operator family so that evaluation can dispatch on
/// the variant alone; use [`Expr::unary`] and [`Expr::binary`] to pick the
/// right variant for an operator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A bare name, resolved against the current scope or the context.
    Identifier(String),

    /// A string literal.
    String(String),

    /// A number literal, kept as written and coerced during evaluation.
    Number(String),

    /// A chain of member accesses, such as `a.b.c()`.
    Dot(DotExpression),

    /// Arithmetic negation, `-x`.
    UnaryArithmetic(UnaryExpression),

    /// Logical inversion, `not x`.
    UnaryBoolean(UnaryExpression),

    /// `+ - * / **`
    BinaryArithmetic(BinaryExpression),

    /// `and` and `or`.
    BinaryBoolean(BinaryExpression),

    /// `== != > >= < <= in`
    Comparison(BinaryExpression),

    /// A single-item subscription, `name[index]`.
    Slice(SliceExpression),

    /// A function call, `name(arg, ...)`.
    Call(FunctionCallExpression),
}

/// A dotted member access chain. Always holds at least one expression.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DotExpression(pub Vec<Expr>);

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnaryExpression {
    pub operator: Operator,
    pub argument: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinaryExpression {
    pub operator: Operator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

/// Subscription of a single item. Not a range slice.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliceExpression {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FunctionCallExpression {
    /// Always an [`Expr::Identifier`].
    pub function: Box<Expr>,
    pub arguments: Vec<Expr>,
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::String(value.into())
    }

    pub fn number(text: impl Into<String>) -> Self {
        Expr::Number(text.into())
    }

    /// Create a unary expression, choosing the variant from the operator.
    ///
    /// # Panics
    ///
    /// Panics if `operator` is a binary operator.
    pub fn unary(operator: Operator, argument: Expr) -> Self {
        assert!(operator.is_unary(), "'{}' is not a unary operator", operator);

        let expr = UnaryExpression {
            operator,
            argument: Box::new(argument),
        };

        match operator.family() {
            OperatorFamily::Boolean => Expr::UnaryBoolean(expr),
            _ => Expr::UnaryArithmetic(expr),
        }
    }

    /// Create a binary expression, choosing the variant from the operator
    /// family.
    ///
    /// # Panics
    ///
    /// Panics if `operator` is a unary operator.
    pub fn binary(operator: Operator, left: Expr, right: Expr) -> Self {
        assert!(!operator.is_unary(), "'{}' is not a binary operator", operator);

        let expr = BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        };

        match operator.family() {
            OperatorFamily::Arithmetic => Expr::BinaryArithmetic(expr),
            OperatorFamily::Boolean => Expr::BinaryBoolean(expr),
            OperatorFamily::Comparison => Expr::Comparison(expr),
        }
    }

    pub fn dot(exprs: Vec<Expr>) -> Self {
        debug_assert!(!exprs.is_empty());
        Expr::Dot(DotExpression(exprs))
    }

    pub fn slice(array: Expr, index: Expr) -> Self {
        Expr::Slice(SliceExpression {
            array: Box::new(array),
            index: Box::new(index),
        })
    }

    pub fn call(function: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Expr::Call(FunctionCallExpression {
            function: Box::new(Expr::Identifier(function.into())),
            arguments,
        })
    }
}

/// Renders the expression back into source text, fully parenthesizing every
/// operator so that the structure of the tree is visible.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Identifier(name) => f.write_str(name),
            Expr::String(value) => {
                if value.contains('\'') {
                    write!(f, "\"{}\"", value)
                } else {
                    write!(f, "'{}'", value)
                }
            },
            Expr::Number(text) => f.write_str(text),
            Expr::Dot(DotExpression(exprs)) => {
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{}", expr)?;
                }
                Ok(())
            },
            Expr::UnaryArithmetic(expr) => write!(f, "({}{})", expr.operator, expr.argument),
            Expr::UnaryBoolean(expr) => write!(f, "({} {})", expr.operator, expr.argument),
            Expr::BinaryArithmetic(expr) | Expr::BinaryBoolean(expr) | Expr::Comparison(expr) => {
                write!(f, "({} {} {})", expr.left, expr.operator, expr.right)
            },
            Expr::Slice(expr) => write!(f, "{}[{}]", expr.array, expr.index),
            Expr::Call(call) => {
                write!(f, "{}(", call.function)?;
                for (i, argument) in call.arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                f.write_str(")")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_families() {
        assert_eq!(Operator::Negation.family(), OperatorFamily::Arithmetic);
        assert_eq!(Operator::Exponentiation.family(), OperatorFamily::Arithmetic);
        assert_eq!(Operator::Inversion.family(), OperatorFamily::Boolean);
        assert_eq!(Operator::Disjunction.family(), OperatorFamily::Boolean);
        assert_eq!(Operator::In.family(), OperatorFamily::Comparison);
    }

    #[test]
    fn binary_constructor_picks_variant() {
        let one = || Expr::number("1");

        assert!(matches!(Expr::binary(Operator::Addition, one(), one()), Expr::BinaryArithmetic(_)));
        assert!(matches!(Expr::binary(Operator::Conjunction, one(), one()), Expr::BinaryBoolean(_)));
        assert!(matches!(Expr::binary(Operator::LessOrEqual, one(), one()), Expr::Comparison(_)));
        assert!(matches!(Expr::unary(Operator::Inversion, one()), Expr::UnaryBoolean(_)));
        assert!(matches!(Expr::unary(Operator::Negation, one()), Expr::UnaryArithmetic(_)));
    }

    #[test]
    #[should_panic]
    fn binary_constructor_rejects_unary_operator() {
        Expr::binary(Operator::Negation, Expr::number("1"), Expr::number("2"));
    }

    #[test]
    fn display_is_fully_parenthesized() {
        let expr = Expr::binary(
            Operator::Addition,
            Expr::number("1"),
            Expr::binary(Operator::Multiplication, Expr::number("2"), Expr::number("3")),
        );

        assert_eq!(expr.to_string(), "(1 + (2 * 3))");
    }
}
