//! Filtering SAML subjects with expressions.
//!
//! An administrator configures an expression such as
//! `'staff' in subject.attribute_statement.attributes['eduPersonAffiliation'].values`
//! and only subjects for which it is true are admitted.

use crate::subject::Subject;
use pyexpr_runtime::{table, Error, Evaluator, Value};
use std::rc::Rc;

/// Everything that can go wrong filtering a subject.
#[derive(Debug, thiserror::Error)]
pub enum SubjectFilterError {
    #[error("incorrect filtration expression '{expression}': {source}")]
    Expression {
        expression: String,
        #[source]
        source: Error,
    },

    #[error("filtration expression '{expression}' returned a non-boolean value of type {type_name}")]
    NotBoolean { expression: String, type_name: String },
}

/// Decides whether subjects pass a filtration expression.
#[derive(Debug, Default)]
pub struct SubjectFilter {
    evaluator: Evaluator,
}

impl SubjectFilter {
    pub fn new(evaluator: Evaluator) -> Self {
        Self { evaluator }
    }

    /// Evaluate an expression with `subject` bound to the given subject.
    ///
    /// Only methods of the subject model itself may be called.
    pub fn execute(&self, expression: &str, subject: &Subject) -> Result<bool, SubjectFilterError> {
        let context = table! {
            "subject" => Rc::new(subject.clone()),
        };

        let result = self
            .evaluator
            .evaluate(expression, &context, &Subject::classes())
            .map_err(|source| SubjectFilterError::Expression {
                expression: expression.to_owned(),
                source,
            })?;

        match result {
            Value::Bool(admitted) => {
                log::debug!("subject from {} {} by '{}'", subject.idp, if admitted { "admitted" } else { "rejected" }, expression);
                Ok(admitted)
            },
            value => Err(SubjectFilterError::NotBoolean {
                expression: expression.to_owned(),
                type_name: value.type_name(),
            }),
        }
    }

    /// Check that an expression is well-formed, without evaluating it.
    pub fn validate(&self, expression: &str) -> Result<(), SubjectFilterError> {
        self.evaluator
            .validate(expression)
            .map_err(|e| SubjectFilterError::Expression {
                expression: expression.to_owned(),
                source: e.into(),
            })
    }
}
