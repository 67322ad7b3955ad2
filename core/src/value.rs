//! Runtime values flowing from parsed flags into reconstructed calls.
//!
//! A [`Value`] is what a single flag parses to, what a parameter defaults to,
//! and what a function body returns. [`Partial`] is the value a function-typed
//! parameter resolves to once its slot has been reconstructed.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::CallError;
use crate::function::Function;

/// Keyword arguments keyed by parameter or flag name.
pub type Kwargs = BTreeMap<String, Value>;

/// A dynamically typed argument or result value.
///
/// `Value::None` doubles as the reserved "absent" default: a parameter that
/// defaults to it is always treated as optional.
///
/// # Examples
///
/// ```
/// use argslot_core::Value;
///
/// assert_eq!(Value::from(5), Value::Int(5));
/// assert_eq!(Value::from(vec![6, 7]), Value::List(vec![Value::Int(6), Value::Int(7)]));
/// assert_eq!(Value::from(None::<i64>), Value::None);
/// assert_eq!(Value::Float(2.0).to_string(), "2.0");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Kwargs),
    Partial(Partial),
}

impl Value {
    /// Short type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Path(_) => "path",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
            Value::Partial(_) => "function",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns `true` for values that can be invoked.
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Partial(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a path; strings are accepted as paths.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(p) => Some(p),
            Value::Str(s) => Some(Path::new(s)),
            _ => None,
        }
    }

    /// Returns the elements of a list or tuple.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_partial(&self) -> Option<&Partial> {
        match self {
            Value::Partial(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => f.write_str(s),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::List(items) => write!(f, "[{}]", join(items)),
            Value::Tuple(items) => write!(f, "({})", join(items)),
            Value::Map(map) => {
                let entries: Vec<String> = map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::Partial(p) => write!(f, "{p}"),
        }
    }
}

fn join(items: &[Value]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::None => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Path(p) => serializer.serialize_str(&p.to_string_lossy()),
            Value::List(items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => map.serialize(serializer),
            Value::Partial(p) => p.serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<PathBuf> for Value {
    fn from(p: PathBuf) -> Self {
        Value::Path(p)
    }
}

impl From<Kwargs> for Value {
    fn from(map: Kwargs) -> Self {
        Value::Map(map)
    }
}

impl From<Partial> for Value {
    fn from(p: Partial) -> Self {
        Value::Partial(p)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

/// A function with some keyword arguments already bound.
///
/// Bound values act as defaults: arguments passed to
/// [`call_with`](Partial::call_with) override them.
#[derive(Clone)]
pub struct Partial {
    function: Function,
    bound: Kwargs,
}

impl Partial {
    pub fn new(function: Function, bound: Kwargs) -> Self {
        Self { function, bound }
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn bound(&self) -> &Kwargs {
        &self.bound
    }

    /// Invokes the function with only the bound arguments.
    pub fn call(&self) -> Result<Value, CallError> {
        self.call_with(Kwargs::new())
    }

    /// Invokes the function, letting `overrides` replace bound arguments.
    pub fn call_with(&self, overrides: Kwargs) -> Result<Value, CallError> {
        let mut kwargs = self.bound.clone();
        kwargs.extend(overrides);
        self.function.call(kwargs)
    }
}

impl PartialEq for Partial {
    fn eq(&self, other: &Self) -> bool {
        self.function == other.function && self.bound == other.bound
    }
}

impl fmt::Debug for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partial")
            .field("function", &self.function.name())
            .field("bound", &self.bound)
            .finish()
    }
}

impl fmt::Display for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.bound.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{}({})", self.function.name(), args.join(", "))
    }
}

impl Serialize for Partial {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("function", self.function.name())?;
        map.serialize_entry("bound", &self.bound)?;
        map.end()
    }
}

/// Arguments handed to a function body, with typed accessors.
///
/// # Examples
///
/// ```
/// use argslot_core::{Args, Kwargs, Value};
///
/// let mut kwargs = Kwargs::new();
/// kwargs.insert("a".into(), Value::Int(5));
/// kwargs.insert("b".into(), Value::None);
/// let args = Args::new("f", kwargs);
///
/// assert_eq!(args.int("a").unwrap(), 5);
/// assert_eq!(args.opt_int("b").unwrap(), None);
/// assert!(args.str("a").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Args {
    function: String,
    values: Kwargs,
}

impl Args {
    pub fn new(function: impl Into<String>, values: Kwargs) -> Self {
        Self {
            function: function.into(),
            values,
        }
    }

    /// Name of the function receiving these arguments.
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Value, CallError> {
        self.values
            .get(name)
            .ok_or_else(|| CallError::MissingArgument {
                function: self.function.clone(),
                name: name.to_string(),
            })
    }

    pub fn bool(&self, name: &str) -> Result<bool, CallError> {
        self.typed(name, "bool", Value::as_bool)
    }

    pub fn int(&self, name: &str) -> Result<i64, CallError> {
        self.typed(name, "int", Value::as_int)
    }

    pub fn float(&self, name: &str) -> Result<f64, CallError> {
        self.typed(name, "float", Value::as_float)
    }

    pub fn str(&self, name: &str) -> Result<&str, CallError> {
        self.typed(name, "str", Value::as_str)
    }

    pub fn path(&self, name: &str) -> Result<&Path, CallError> {
        self.typed(name, "path", Value::as_path)
    }

    pub fn seq(&self, name: &str) -> Result<&[Value], CallError> {
        self.typed(name, "list", Value::as_seq)
    }

    pub fn partial(&self, name: &str) -> Result<&Partial, CallError> {
        self.typed(name, "function", Value::as_partial)
    }

    /// Like [`int`](Args::int) but maps `Value::None` to `Ok(None)`.
    pub fn opt_int(&self, name: &str) -> Result<Option<i64>, CallError> {
        self.optional(name, "int", Value::as_int)
    }

    pub fn opt_float(&self, name: &str) -> Result<Option<f64>, CallError> {
        self.optional(name, "float", Value::as_float)
    }

    pub fn opt_str(&self, name: &str) -> Result<Option<&str>, CallError> {
        self.optional(name, "str", Value::as_str)
    }

    /// Consumes the arguments, returning the underlying map.
    pub fn into_kwargs(self) -> Kwargs {
        self.values
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: &'static str,
        get: impl Fn(&'a Value) -> Option<T>,
    ) -> Result<T, CallError> {
        let value = self.get(name)?;
        get(value).ok_or_else(|| CallError::TypeMismatch {
            function: self.function.clone(),
            name: name.to_string(),
            expected,
            found: value.type_name(),
        })
    }

    fn optional<'a, T>(
        &'a self,
        name: &str,
        expected: &'static str,
        get: impl Fn(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, CallError> {
        match self.get(name)? {
            Value::None => Ok(None),
            _ => self.typed(name, expected, get).map(Some),
        }
    }
}
