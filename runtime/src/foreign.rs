use crate::{
    class::Class,
    error::EvaluationError,
    value::Value,
};
use std::{fmt, rc::Rc};

type Native = dyn Fn(&[Value]) -> Result<Value, EvaluationError>;

/// A native function that can be invoked by expressions.
///
/// A function is either free (a built-in such as `len`) or a method bound to a
/// receiver. Bound methods remember the class they were defined in so the
/// sandbox can decide whether they may be called without having to inspect the
/// receiver at call time.
#[derive(Clone)]
pub struct ForeignFn {
    name: Rc<str>,
    owner: Option<Class>,
    function: Rc<Native>,
}

impl ForeignFn {
    /// Create a free function.
    pub fn new(
        name: impl Into<Rc<str>>,
        function: impl Fn(&[Value]) -> Result<Value, EvaluationError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            owner: None,
            function: Rc::new(function),
        }
    }

    /// Create a method defined in the given class. The receiver is expected to
    /// be captured by the closure.
    pub fn method(
        owner: Class,
        name: impl Into<Rc<str>>,
        function: impl Fn(&[Value]) -> Result<Value, EvaluationError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            owner: Some(owner),
            function: Rc::new(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class this function is bound to, or `None` for a free function.
    pub fn owner(&self) -> Option<&Class> {
        self.owner.as_ref()
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, EvaluationError> {
        (self.function)(args)
    }
}

impl PartialEq for ForeignFn {
    fn eq(&self, rhs: &ForeignFn) -> bool {
        Rc::ptr_eq(&self.function, &rhs.function)
    }
}

impl fmt::Debug for ForeignFn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ForeignFn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "<bound method {}.{}>", owner.name(), self.name),
            None => write!(f, "<built-in function {}>", self.name),
        }
    }
}
