//! Function descriptors and signature extraction.
//!
//! A [`Function`] is an explicit description of a callable: its name, its
//! ordered parameters with annotations and defaults, and the body to run.
//! [`extract`] normalises the declared parameters into the list the schema
//! compiler walks.

use std::fmt;
use std::sync::Arc;

use crate::error::CallError;
use crate::shape::Annotation;
use crate::value::{Args, Kwargs, Value};

type Body = dyn Fn(Args) -> Result<Value, CallError> + Send + Sync;

/// A declared parameter.
///
/// # Examples
///
/// ```
/// use argslot_core::{Annotation, Param, Value};
///
/// let p = Param::new("a").with_type(Annotation::int()).with_default(1);
/// assert_eq!(p.name, "a");
/// assert_eq!(p.default, Some(Value::Int(1)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    /// Declared type; `None` means unannotated (a string).
    pub annotation: Option<Annotation>,
    /// Declared default; `None` means the parameter is required.
    pub default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }

    pub fn with_type(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A callable described by name, parameters and body.
///
/// Cloning is cheap; clones share the same descriptor and compare equal.
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionInner>,
}

struct FunctionInner {
    name: String,
    params: Vec<Param>,
    receiver: bool,
    body: Box<Body>,
}

impl Function {
    /// Starts describing a function called `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argslot_core::{Annotation, Function, Kwargs, Param, Value};
    ///
    /// let double = Function::builder("double")
    ///     .param(Param::new("x").with_type(Annotation::int()))
    ///     .build(|args| Ok(Value::Int(args.int("x")? * 2)));
    ///
    /// let mut kwargs = Kwargs::new();
    /// kwargs.insert("x".into(), Value::Int(21));
    /// assert_eq!(double.call(kwargs).unwrap(), Value::Int(42));
    /// ```
    pub fn builder(name: impl Into<String>) -> FunctionBuilder {
        FunctionBuilder {
            name: name.into(),
            params: Vec::new(),
            receiver: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Declared parameters, including the receiver of a method.
    pub fn params(&self) -> &[Param] {
        &self.inner.params
    }

    /// Returns `true` if the first parameter is a bound receiver.
    pub fn is_method(&self) -> bool {
        self.inner.receiver
    }

    /// Runs the body with the given keyword arguments.
    pub fn call(&self, kwargs: Kwargs) -> Result<Value, CallError> {
        (self.inner.body)(Args::new(self.name(), kwargs))
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.inner.name)
            .field("params", &self.inner.params)
            .field("receiver", &self.inner.receiver)
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`Function::builder`].
#[derive(Debug)]
pub struct FunctionBuilder {
    name: String,
    params: Vec<Param>,
    receiver: bool,
}

impl FunctionBuilder {
    /// Declares a bound receiver as the first parameter.
    ///
    /// The receiver is never exposed as a flag.
    pub fn receiver(mut self, name: impl Into<String>) -> Self {
        if !self.receiver {
            self.params.insert(0, Param::new(name));
            self.receiver = true;
        }
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn build<F>(self, body: F) -> Function
    where
        F: Fn(Args) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Function {
            inner: Arc::new(FunctionInner {
                name: self.name,
                params: self.params,
                receiver: self.receiver,
                body: Box::new(body),
            }),
        }
    }
}

/// A parameter normalised for schema compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureParam {
    pub name: String,
    /// Declared annotation with defaults applied; not yet classified.
    pub annotation: Annotation,
    pub default: Option<Value>,
    /// External flag name before any nesting prefix.
    pub flag: String,
}

/// Extracts the normalised parameter list of a function.
///
/// Declaration order is preserved. The receiver of a method is dropped,
/// unannotated parameters become strings, and a `Value::None` default wraps
/// the annotation in an optional unless it already admits absence.
///
/// # Examples
///
/// ```
/// use argslot_core::{Annotation, Function, Param, Value, extract};
///
/// let f = Function::builder("f")
///     .param(Param::new("a").with_default(Value::None))
///     .build(|_| Ok(Value::None));
///
/// let params = extract(&f);
/// assert_eq!(params[0].annotation, Annotation::optional(Annotation::str()));
/// ```
pub fn extract(function: &Function) -> Vec<SignatureParam> {
    let skip = usize::from(function.is_method());
    function
        .params()
        .iter()
        .skip(skip)
        .map(|param| {
            let mut annotation = param.annotation.clone().unwrap_or_else(Annotation::str);
            if matches!(param.default, Some(Value::None)) && !annotation.is_optional() {
                annotation = Annotation::optional(annotation);
            }
            SignatureParam {
                name: param.name.clone(),
                annotation,
                default: param.default.clone(),
                flag: param.name.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Leaf, TypeShape, classify};

    fn noop() -> impl Fn(Args) -> Result<Value, CallError> + Send + Sync + 'static {
        |_| Ok(Value::None)
    }

    #[test]
    fn test_extract_preserves_order() {
        let f = Function::builder("f")
            .param(Param::new("x").with_type(Annotation::int()))
            .param(Param::new("y").with_type(Annotation::float()).with_default(2.0))
            .param(Param::new("z").with_default("z"))
            .build(noop());

        let names: Vec<_> = extract(&f).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_unannotated_none_default_is_optional_str() {
        let f = Function::builder("f")
            .param(Param::new("a").with_default(Value::None))
            .build(noop());

        let params = extract(&f);
        assert_eq!(
            classify(&params[0].annotation),
            TypeShape::Optional(Box::new(TypeShape::Plain(Leaf::Str)))
        );
    }

    #[test]
    fn test_none_default_does_not_double_wrap() {
        let declared = Annotation::optional(Annotation::int());
        let f = Function::builder("f")
            .param(Param::new("a").with_type(declared.clone()).with_default(Value::None))
            .build(noop());

        assert_eq!(extract(&f)[0].annotation, declared);
    }

    #[test]
    fn test_receiver_is_excluded() {
        let f = Function::builder("method")
            .receiver("self")
            .param(Param::new("a").with_type(Annotation::int()))
            .build(noop());

        assert!(f.is_method());
        assert_eq!(f.params().len(), 2);
        let params = extract(&f);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "a");
        assert_eq!(params[0].flag, "a");
    }

    #[test]
    fn test_clones_compare_equal() {
        let f = Function::builder("f").build(noop());
        let g = Function::builder("f").build(noop());
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }
}
