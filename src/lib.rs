//! A sandboxed, Python-like expression language.
//!
//! The engine lives in [`pyexpr_runtime`], re-exported here as [`runtime`].
//! This crate adds the SAML subject filter built on top of it, and helpers for
//! loading contexts from TOML.

pub mod config;
pub mod filter;
pub mod subject;

pub use pyexpr_runtime as runtime;
pub use pyexpr_runtime::{Class, Context, Error, EvaluationError, Evaluator, Value};
