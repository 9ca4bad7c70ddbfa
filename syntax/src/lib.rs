//! The core expression syntax implementation.
//!
//! The provided parser turns expression text into a high-level abstract syntax
//! tree, which can be evaluated directly by the runtime, dumped, or cached.

pub mod ast;
pub mod error;
mod grammar;
mod parser;
pub mod source;

pub use error::ParseError;
pub use parser::parse;
