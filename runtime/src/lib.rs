//! The pyexpr evaluation engine.
//!
//! Expressions are parsed by [`pyexpr_syntax`] and evaluated against a
//! [`Context`] by an [`Evaluator`]. Calls to bound methods are checked against
//! a sandbox of safe [`Class`]es.

#[macro_use]
mod macros;

mod builtins;
mod class;
mod context;
mod error;
mod eval;
mod foreign;
mod methods;
mod object;
mod ops;
mod runtime;
mod table;
mod value;

// Re-export syntax crate.
pub mod syntax {
    pub use pyexpr_syntax::*;
}

pub use crate::class::{Class, ClassSet};
pub use crate::context::Context;
pub use crate::error::{Error, EvaluationError};
pub use crate::foreign::ForeignFn;
pub use crate::object::Object;
pub use crate::runtime::{Evaluator, EvaluatorBuilder};
pub use crate::table::Table;
pub use crate::value::Value;

pub mod prelude {
    pub use crate::{Class, Context, EvaluationError, Evaluator, ForeignFn, Object, Table, Value};
}
