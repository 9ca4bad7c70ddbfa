//! The evaluator facade, coupling the parser with the evaluation engine.
use crate::{
    builtins,
    class::{Class, ClassSet},
    context::Context,
    error::{Error, EvaluationError},
    eval::{self, Frame},
    value::Value,
};
use parking_lot::Mutex;
use pyexpr_syntax::{ast::Expr, ParseError};
use std::{
    collections::HashMap,
    sync::Arc,
    time::Instant,
};

/// Configure an evaluator.
#[derive(Clone, Debug, Default)]
pub struct EvaluatorBuilder {
    safe_classes: ClassSet,
    cache: bool,
}

impl EvaluatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit calling methods of the given class in every evaluation.
    pub fn safe_class(mut self, class: Class) -> Self {
        self.safe_classes.insert(class);
        self
    }

    /// Permit calling methods of all of the given classes in every evaluation.
    pub fn safe_classes(mut self, classes: impl IntoIterator<Item = Class>) -> Self {
        self.safe_classes.extend(classes);
        self
    }

    /// Cache parsed expressions by their text.
    ///
    /// Off by default. Worth enabling when the same handful of expressions is
    /// evaluated over and over; the cache is never evicted.
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    pub fn build(self) -> Evaluator {
        log::debug!(
            "evaluator built with {} extra safe class(es), cache {}",
            self.safe_classes.len(),
            if self.cache { "enabled" } else { "disabled" }
        );

        Evaluator {
            safe_classes: self.safe_classes,
            cache: if self.cache { Some(Mutex::new(HashMap::new())) } else { None },
        }
    }
}

/// Parses and evaluates expressions.
///
/// An evaluator holds no per-evaluation state, so one instance can be shared
/// freely, including across threads. Each call to [`Evaluator::evaluate`]
/// borrows its context immutably and leaves nothing behind.
#[derive(Debug, Default)]
pub struct Evaluator {
    /// Classes permitted in addition to those given for each call.
    safe_classes: ClassSet,

    /// Parsed expressions by their text, when caching is enabled.
    cache: Option<Mutex<HashMap<String, Arc<Expr>>>>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::new()
    }

    /// Parse an expression into a syntax tree.
    pub fn parse(&self, text: &str) -> Result<Arc<Expr>, ParseError> {
        if let Some(cache) = self.cache.as_ref() {
            if let Some(expr) = cache.lock().get(text) {
                log::trace!("parse cache hit for {:?}", text);
                return Ok(expr.clone());
            }
        }

        let start_time = Instant::now();
        let expr = Arc::new(pyexpr_syntax::parse(text)?);
        log::debug!("parsed {:?} in {:?}", text, start_time.elapsed());

        if let Some(cache) = self.cache.as_ref() {
            cache.lock().insert(text.to_owned(), expr.clone());
        }

        Ok(expr)
    }

    /// Check that an expression is well-formed without evaluating it.
    pub fn validate(&self, text: &str) -> Result<(), ParseError> {
        pyexpr_syntax::parse(text).map(|_| ())
    }

    /// Parse and evaluate an expression.
    ///
    /// Top-level names are resolved through `context`. Bound methods may only
    /// be called if they are defined in one of `safe_classes`, a class
    /// registered on the builder, or a built-in class.
    pub fn evaluate(&self, text: &str, context: &dyn Context, safe_classes: &[Class]) -> Result<Value, Error> {
        let expr = self.parse(text)?;

        Ok(self.evaluate_expr(&expr, context, safe_classes)?)
    }

    /// Evaluate an already parsed expression.
    pub fn evaluate_expr(
        &self,
        expr: &Expr,
        context: &dyn Context,
        safe_classes: &[Class],
    ) -> Result<Value, EvaluationError> {
        let mut classes = ClassSet::builtin();
        classes.extend(self.safe_classes.iter());
        classes.extend(safe_classes);

        let builtins = builtins::get();
        let frame = Frame::new(context, &classes, &builtins);

        let start_time = Instant::now();
        let result = eval::evaluate(&frame, expr);

        match &result {
            Ok(value) => log::debug!("evaluated {} to {:?} in {:?}", expr, value, start_time.elapsed()),
            Err(e) => log::debug!("evaluation of {} failed: {}", expr, e),
        }

        result
    }

    /// Number of parsed expressions currently cached.
    pub fn cached(&self) -> usize {
        self.cache.as_ref().map(|cache| cache.lock().len()).unwrap_or(0)
    }
}
