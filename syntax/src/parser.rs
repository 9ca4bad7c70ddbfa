//! The language parser.
//!
//! The grammar itself lives in `grammar.pest`; this module reduces the parse
//! tree produced by pest directly into AST nodes. Each precedence level folds
//! its operands from left to right, except exponentiation which folds to the
//! right and the prefix operators `-` and `not`, which nest onto their operand.
use crate::{
    ast::*,
    error::ParseError,
    grammar::{self, Rule},
};
use pest::iterators::{Pair, Pairs};

/// Parse an expression into an abstract syntax tree.
///
/// The entire input must form a single expression; trailing text is an error.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut pairs = grammar::parse(input, Rule::expression).map_err(|e| ParseError::from_pest(input, e))?;

    let expression = next(&mut pairs)?;
    let expr = build(next(&mut expression.into_inner())?)?;

    log::trace!("parsed {:?} as {}", input, expr);

    Ok(expr)
}

fn next<'i>(pairs: &mut Pairs<'i, Rule>) -> Result<Pair<'i, Rule>, ParseError> {
    pairs.next().ok_or_else(ParseError::generic)
}

fn build(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    match pair.as_rule() {
        Rule::disjunction | Rule::conjunction | Rule::comparison | Rule::sum | Rule::product => {
            build_left_fold(pair.into_inner())
        },
        Rule::inversion | Rule::atom => build_prefixed(pair.into_inner()),
        Rule::power => build_power(pair.into_inner()),
        Rule::number => Ok(Expr::number(pair.as_str())),
        Rule::string => build_string(pair),
        Rule::identifier => Ok(Expr::identifier(pair.as_str())),
        Rule::dot_expression => {
            let mut operands = pair.into_inner().map(build).collect::<Result<Vec<_>, _>>()?;

            match operands.len() {
                1 => operands.pop().ok_or_else(ParseError::generic),
                _ => Ok(Expr::dot(operands)),
            }
        },
        Rule::slice_expression => {
            let mut inner = pair.into_inner();
            let array = build(next(&mut inner)?)?;
            let index = build(next(&mut inner)?)?;

            Ok(Expr::slice(array, index))
        },
        Rule::function_call => {
            let mut inner = pair.into_inner();
            let function = next(&mut inner)?.as_str().to_owned();
            let arguments = inner.map(build).collect::<Result<Vec<_>, _>>()?;

            Ok(Expr::call(function, arguments))
        },
        _ => Err(ParseError::generic()),
    }
}

/// Fold `operand (operator operand)*` into left-nested binary expressions.
fn build_left_fold(mut pairs: Pairs<Rule>) -> Result<Expr, ParseError> {
    let mut left = build(next(&mut pairs)?)?;

    while let Some(operator) = pairs.next() {
        let operator = operator_for(&operator)?;
        let right = build(next(&mut pairs)?)?;

        left = Expr::binary(operator, left, right);
    }

    Ok(left)
}

/// Build `prefix* operand`, nesting prefix operators right to left so that
/// `not not x` becomes `not (not x)`.
fn build_prefixed(pairs: Pairs<Rule>) -> Result<Expr, ParseError> {
    let mut prefixes = Vec::new();
    let mut operand = None;

    for pair in pairs {
        match pair.as_rule() {
            Rule::not_op | Rule::neg_op => prefixes.push(operator_for(&pair)?),
            _ => operand = Some(build(pair)?),
        }
    }

    let operand = operand.ok_or_else(ParseError::generic)?;

    Ok(prefixes
        .into_iter()
        .rev()
        .fold(operand, |expr, operator| Expr::unary(operator, expr)))
}

/// Build `atom (** power)?`. The grammar recurses on the right-hand side, which
/// makes exponentiation right-associative.
fn build_power(mut pairs: Pairs<Rule>) -> Result<Expr, ParseError> {
    let base = build(next(&mut pairs)?)?;

    match pairs.next() {
        Some(operator) => {
            let operator = operator_for(&operator)?;
            let exponent = build(next(&mut pairs)?)?;

            Ok(Expr::binary(operator, base, exponent))
        },
        None => Ok(base),
    }
}

fn build_string(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    // The only child is the quoted contents, which may be empty.
    let contents = pair.into_inner().next().map(|inner| inner.as_str()).unwrap_or("");

    Ok(Expr::string(contents))
}

fn operator_for(pair: &Pair<Rule>) -> Result<Operator, ParseError> {
    Ok(match pair.as_rule() {
        Rule::or_op => Operator::Disjunction,
        Rule::and_op => Operator::Conjunction,
        Rule::not_op => Operator::Inversion,
        Rule::eq => Operator::Equal,
        Rule::ne => Operator::NotEqual,
        Rule::gt => Operator::Greater,
        Rule::ge => Operator::GreaterOrEqual,
        Rule::lt => Operator::Less,
        Rule::le => Operator::LessOrEqual,
        Rule::in_op => Operator::In,
        Rule::add => Operator::Addition,
        Rule::sub => Operator::Subtraction,
        Rule::mul => Operator::Multiplication,
        Rule::div => Operator::Division,
        Rule::pow_op => Operator::Exponentiation,
        Rule::neg_op => Operator::Negation,
        _ => return Err(ParseError::generic()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn num(text: &str) -> Expr {
        Expr::number(text)
    }

    fn ident(name: &str) -> Expr {
        Expr::identifier(name)
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            Expr::binary(
                Operator::Addition,
                num("1"),
                Expr::binary(Operator::Multiplication, num("2"), num("3")),
            )
        );
    }

    #[test]
    fn parentheses_group() {
        assert_eq!(
            parse("(1 + 2) * 3").unwrap(),
            Expr::binary(
                Operator::Multiplication,
                Expr::binary(Operator::Addition, num("1"), num("2")),
                num("3"),
            )
        );
    }

    #[test]
    fn additive_operators_fold_left() {
        assert_eq!(
            parse("1 - 2 - 3").unwrap(),
            Expr::binary(
                Operator::Subtraction,
                Expr::binary(Operator::Subtraction, num("1"), num("2")),
                num("3"),
            )
        );
    }

    #[test]
    fn exponentiation_folds_right() {
        assert_eq!(
            parse("2 ** 3 ** 2").unwrap(),
            Expr::binary(
                Operator::Exponentiation,
                num("2"),
                Expr::binary(Operator::Exponentiation, num("3"), num("2")),
            )
        );
    }

    #[test]
    fn negation_nests() {
        assert_eq!(
            parse("- -5").unwrap(),
            Expr::unary(Operator::Negation, Expr::unary(Operator::Negation, num("5")))
        );
    }

    #[test]
    fn inversion_nests() {
        assert_eq!(
            parse("not not x").unwrap(),
            Expr::unary(Operator::Inversion, Expr::unary(Operator::Inversion, ident("x")))
        );
    }

    #[test]
    fn comparisons_chain_like_arithmetic() {
        assert_eq!(
            parse("1 < 2 < 3").unwrap(),
            Expr::binary(
                Operator::Less,
                Expr::binary(Operator::Less, num("1"), num("2")),
                num("3"),
            )
        );
    }

    #[test]
    fn boolean_precedence() {
        assert_eq!(
            parse("a or b and not c").unwrap(),
            Expr::binary(
                Operator::Disjunction,
                ident("a"),
                Expr::binary(
                    Operator::Conjunction,
                    ident("b"),
                    Expr::unary(Operator::Inversion, ident("c")),
                ),
            )
        );
    }

    #[test]
    fn membership() {
        assert_eq!(
            parse("a in xs").unwrap(),
            Expr::binary(Operator::In, ident("a"), ident("xs"))
        );
    }

    #[test]
    fn keywords_need_word_boundary() {
        assert_eq!(parse("index").unwrap(), ident("index"));
        assert_eq!(parse("order").unwrap(), ident("order"));
        assert_eq!(parse("notable").unwrap(), ident("notable"));
    }

    #[test]
    fn string_literals() {
        assert_eq!(parse("'hello'").unwrap(), Expr::string("hello"));
        assert_eq!(parse("\"it's\"").unwrap(), Expr::string("it's"));
        assert_eq!(parse("''").unwrap(), Expr::string(""));
    }

    #[test]
    fn number_literals_keep_their_text() {
        assert_eq!(parse("42").unwrap(), num("42"));
        assert_eq!(parse("3.25").unwrap(), num("3.25"));
        assert_eq!(parse("1e3").unwrap(), num("1e3"));
        assert_eq!(parse("+7").unwrap(), num("+7"));
    }

    #[test]
    fn identifiers_allow_dollar_and_underscore() {
        assert_eq!(parse("a_b$c1").unwrap(), ident("a_b$c1"));
    }

    #[test]
    fn dotted_chain_with_subscriptions() {
        assert_eq!(
            parse("subject.attributes['uid'].values[0]").unwrap(),
            Expr::dot(vec![
                ident("subject"),
                Expr::slice(ident("attributes"), Expr::string("uid")),
                Expr::slice(ident("values"), num("0")),
            ])
        );
    }

    #[test]
    fn dotted_chain_with_method_call() {
        assert_eq!(
            parse("name.upper()").unwrap(),
            Expr::dot(vec![ident("name"), Expr::call("upper", vec![])])
        );
    }

    #[test]
    fn function_call_arguments() {
        assert_eq!(
            parse("max(1, a.b, 2 + 3)").unwrap(),
            Expr::call("max", vec![
                num("1"),
                Expr::dot(vec![ident("a"), ident("b")]),
                Expr::binary(Operator::Addition, num("2"), num("3")),
            ])
        );
    }

    #[test]
    fn negated_power_base() {
        assert_eq!(
            parse("-2 ** 2").unwrap(),
            Expr::binary(
                Operator::Exponentiation,
                Expr::unary(Operator::Negation, num("2")),
                num("2"),
            )
        );
    }

    #[test]
    fn single_operand_is_not_a_dot_expression() {
        assert_eq!(parse("abs(x)").unwrap(), Expr::call("abs", vec![ident("x")]));
        assert_eq!(parse("xs[0]").unwrap(), Expr::slice(ident("xs"), num("0")));
    }

    #[test]
    fn deep_nesting_parses_in_linear_time() {
        let depth = 40;
        let calls = format!("{}1{}", "abs(".repeat(depth), ")".repeat(depth));
        let subscripts = format!("{}0{}", "a[".repeat(depth), "]".repeat(depth));
        let mixed = format!("{}x{}", "f(a[".repeat(depth), "])".repeat(depth));

        let start = Instant::now();
        for source in [&calls, &subscripts, &mixed] {
            parse(source).unwrap();
        }
        assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());

        let mut expr = parse(&calls).unwrap();
        for _ in 0..depth {
            match expr {
                Expr::Call(call) => expr = call.arguments.into_iter().next().unwrap(),
                other => panic!("expected a call, got {}", other),
            }
        }
        assert_eq!(expr, num("1"));
    }

    #[test]
    fn incomplete_expression_is_generic_error() {
        let error = parse("1 +").unwrap_err();

        assert_eq!(error.message, "Could not parse the expression");
        assert_eq!(error.token, None);
    }

    #[test]
    fn unexpected_symbol_is_reported() {
        let error = parse("1 + )").unwrap_err();

        assert_eq!(error.message, "Unexpected symbol ')' at position 4");
        assert_eq!(error.token.as_deref(), Some(")"));
        assert_eq!(error.position.map(|p| p.offset), Some(4));
    }

    #[test]
    fn trailing_input_is_rejected() {
        let error = parse("a b").unwrap_err();

        assert_eq!(error.token.as_deref(), Some("b"));
        assert_eq!(error.position.map(|p| p.offset), Some(2));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }
}
