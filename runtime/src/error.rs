use pyexpr_syntax::ParseError;
use std::fmt;

/// An error raised while evaluating an expression.
///
/// Evaluation errors are unrecoverable for the evaluation that raised them:
/// there is no fallback value. Causes can be chained, which gives a poor man's
/// trace of where a failure inside a nested call came from.
#[derive(Clone, PartialEq)]
pub struct EvaluationError {
    message: String,
    cause: Option<Box<EvaluationError>>,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a new error with a message and another error that caused this one.
    pub fn with_cause(message: impl Into<String>, cause: EvaluationError) -> Self {
        Self {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Get the error message, without any causes.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the cause of the error, if present.
    #[inline]
    pub fn cause(&self) -> Option<&EvaluationError> {
        self.cause.as_deref()
    }
}

impl From<&str> for EvaluationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for EvaluationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl fmt::Debug for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)?;

        let mut cause = self.cause.as_ref();
        while let Some(c) = cause {
            write!(f, ": caused by: {}", c.message)?;
            cause = c.cause.as_ref();
        }

        Ok(())
    }
}

impl std::error::Error for EvaluationError {}

/// Any failure of [`Evaluator::evaluate`](crate::Evaluator::evaluate).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
