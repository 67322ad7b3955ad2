//! Declared annotations, their classified shapes, and canonical rendering.
//!
//! An [`Annotation`] is what a function descriptor declares for a parameter.
//! [`classify`] maps it onto exactly one [`TypeShape`]; [`render`] turns a
//! shape into the metavar shown in help output. Unknown annotations never
//! fail: they degrade to a plain leaf carrying the raw type name.
//!
//! # Example
//!
//! ```
//! use argslot_core::{Annotation, classify, render};
//!
//! let ann = Annotation::optional(Annotation::list(Annotation::union([
//!     Annotation::int(),
//!     Annotation::str(),
//! ])));
//! assert_eq!(render(&classify(&ann)).as_deref(), Some("[{Int,Str}]?"));
//! ```

use crate::error::ShapeError;
use crate::function::Function;
use crate::path::PathOptions;
use crate::value::Value;

const NONE_TOKENS: [&str; 3] = ["nil", "none", "null"];
const TRUE_TOKENS: [&str; 5] = ["1", "t", "true", "y", "yes"];
const FALSE_TOKENS: [&str; 5] = ["0", "f", "false", "n", "no"];

/// A parameter type as written in a function descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// A named type such as `int`, `float`, `bool`, `str`, or anything else.
    Named(String),
    /// The absent-value type; only meaningful as a union member.
    NoneType,
    /// One of several alternatives, in declaration order.
    Union(Vec<Annotation>),
    /// Zero or more repetitions.
    List(Box<Annotation>),
    /// A tuple; `variadic` marks the `(T, ...)` form.
    Tuple { items: Vec<Annotation>, variadic: bool },
    /// A set of literal values the parameter may take.
    Values(Vec<Value>),
    /// The value is built by calling one of these functions.
    Factory(Vec<Function>),
    /// A filesystem path with post-processing.
    Path(PathOptions),
}

impl Annotation {
    pub fn named(name: impl Into<String>) -> Self {
        Annotation::Named(name.into())
    }

    pub fn int() -> Self {
        Self::named("int")
    }

    pub fn float() -> Self {
        Self::named("float")
    }

    pub fn bool() -> Self {
        Self::named("bool")
    }

    pub fn str() -> Self {
        Self::named("str")
    }

    pub fn path(options: PathOptions) -> Self {
        Annotation::Path(options)
    }

    /// `inner` or absent.
    pub fn optional(inner: Annotation) -> Self {
        Annotation::Union(vec![inner, Annotation::NoneType])
    }

    pub fn union(members: impl IntoIterator<Item = Annotation>) -> Self {
        Annotation::Union(members.into_iter().collect())
    }

    pub fn list(elem: Annotation) -> Self {
        Annotation::List(Box::new(elem))
    }

    /// The `(T, ...)` homogeneous tuple.
    pub fn homo_tuple(elem: Annotation) -> Self {
        Annotation::Tuple {
            items: vec![elem],
            variadic: true,
        }
    }

    /// A fixed-arity tuple.
    pub fn tuple(items: impl IntoIterator<Item = Annotation>) -> Self {
        Annotation::Tuple {
            items: items.into_iter().collect(),
            variadic: false,
        }
    }

    pub fn values<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Annotation::Values(values.into_iter().map(Into::into).collect())
    }

    pub fn factory(function: Function) -> Self {
        Annotation::Factory(vec![function])
    }

    pub fn factories(alternatives: impl IntoIterator<Item = Function>) -> Self {
        Annotation::Factory(alternatives.into_iter().collect())
    }

    /// Raw type name used when the annotation degrades to a plain leaf.
    pub fn type_name(&self) -> &str {
        match self {
            Annotation::Named(name) => name,
            Annotation::NoneType => "none",
            Annotation::Union(_) => "union",
            Annotation::List(_) => "list",
            Annotation::Tuple { .. } => "tuple",
            Annotation::Values(_) => "values",
            Annotation::Factory(_) => "factory",
            Annotation::Path(_) => "path",
        }
    }

    /// Returns `true` if the absent value is already an allowed member.
    pub fn is_optional(&self) -> bool {
        match self {
            Annotation::Union(_) => flatten(self).iter().any(|m| **m == Annotation::NoneType),
            _ => false,
        }
    }
}

/// Scalar leaf types.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Int,
    Float,
    Bool,
    Str,
    Path(PathOptions),
    /// Unrecognised name; parsed as a string.
    Other(String),
}

impl Leaf {
    pub fn from_name(name: &str) -> Self {
        match name {
            "int" => Leaf::Int,
            "float" => Leaf::Float,
            "bool" => Leaf::Bool,
            "str" => Leaf::Str,
            "path" => Leaf::Path(PathOptions::default()),
            other => Leaf::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Leaf::Int => "int",
            Leaf::Float => "float",
            Leaf::Bool => "bool",
            Leaf::Str => "str",
            Leaf::Path(_) => "path",
            Leaf::Other(name) => name,
        }
    }

    fn parse(&self, text: &str) -> Result<Value, ShapeError> {
        let invalid = || ShapeError::Invalid {
            expected: self.name().to_string(),
            input: text.to_string(),
        };
        match self {
            Leaf::Int => text.trim().parse().map(Value::Int).map_err(|_| invalid()),
            Leaf::Float => text.trim().parse().map(Value::Float).map_err(|_| invalid()),
            Leaf::Bool => parse_bool(text).map(Value::Bool).ok_or_else(invalid),
            Leaf::Str | Leaf::Other(_) => Ok(Value::Str(text.to_string())),
            Leaf::Path(options) => options.resolve(text).map(Value::Path),
        }
    }
}

/// The classified structure of a parameter type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Plain(Leaf),
    Optional(Box<TypeShape>),
    Union(Vec<TypeShape>),
    List(Box<TypeShape>),
    HomoTuple(Box<TypeShape>),
    ValueUnion(Vec<Value>),
    FunctionTyped(Vec<Function>),
}

/// Classifies an annotation into exactly one shape.
///
/// Recognition order: function-typed (looking through optionality), then
/// optional, union, list, homogeneous tuple, value union, and finally plain.
///
/// # Examples
///
/// ```
/// use argslot_core::{Annotation, Leaf, TypeShape, classify};
///
/// assert_eq!(
///     classify(&Annotation::optional(Annotation::int())),
///     TypeShape::Optional(Box::new(TypeShape::Plain(Leaf::Int))),
/// );
/// assert_eq!(
///     classify(&Annotation::named("complex")),
///     TypeShape::Plain(Leaf::Other("complex".into())),
/// );
/// ```
pub fn classify(annotation: &Annotation) -> TypeShape {
    if let Some(alternatives) = function_alternatives(annotation) {
        return TypeShape::FunctionTyped(alternatives);
    }

    match annotation {
        Annotation::Union(_) => {
            let members = flatten(annotation);
            let (absent, present): (Vec<&Annotation>, Vec<&Annotation>) = members
                .into_iter()
                .partition(|m| **m == Annotation::NoneType);
            if absent.is_empty() {
                classify_union(&present)
            } else {
                TypeShape::Optional(Box::new(classify_union(&present)))
            }
        }
        Annotation::List(elem) => TypeShape::List(Box::new(classify(elem))),
        Annotation::Tuple {
            items,
            variadic: true,
        } if items.len() == 1 => TypeShape::HomoTuple(Box::new(classify(&items[0]))),
        Annotation::Values(values)
            if !values.is_empty() && values.iter().all(|v| !v.is_callable()) =>
        {
            TypeShape::ValueUnion(values.clone())
        }
        Annotation::Named(name) => TypeShape::Plain(Leaf::from_name(name)),
        Annotation::Path(options) => TypeShape::Plain(Leaf::Path(*options)),
        other => TypeShape::Plain(Leaf::Other(other.type_name().to_string())),
    }
}

fn classify_union(members: &[&Annotation]) -> TypeShape {
    let mut shapes: Vec<TypeShape> = Vec::with_capacity(members.len());
    for member in members {
        let shape = classify(member);
        if !shapes.contains(&shape) {
            shapes.push(shape);
        }
    }
    match shapes.len() {
        0 => TypeShape::Plain(Leaf::Other("none".to_string())),
        1 => shapes.remove(0),
        _ => TypeShape::Union(shapes),
    }
}

/// Flattens nested unions into one member list, preserving order.
fn flatten(annotation: &Annotation) -> Vec<&Annotation> {
    match annotation {
        Annotation::Union(members) => members.iter().flat_map(flatten).collect(),
        other => vec![other],
    }
}

/// Alternatives of a function-typed annotation, optional or not.
fn function_alternatives(annotation: &Annotation) -> Option<Vec<Function>> {
    let mut alternatives = Vec::new();
    let mut any = false;
    for member in flatten(annotation) {
        match member {
            Annotation::Factory(functions) if !functions.is_empty() => {
                alternatives.extend(functions.iter().cloned());
                any = true;
            }
            Annotation::NoneType => {}
            _ => return None,
        }
    }
    any.then_some(alternatives)
}

/// Renders a shape as its canonical signature string.
///
/// Returns `None` for value unions and function-typed shapes, whose help
/// text carries no type name.
///
/// # Examples
///
/// ```
/// use argslot_core::{Leaf, TypeShape, render};
///
/// let shape = TypeShape::List(Box::new(TypeShape::Optional(Box::new(TypeShape::Plain(Leaf::Int)))));
/// assert_eq!(render(&shape).as_deref(), Some("[Int?]"));
/// ```
pub fn render(shape: &TypeShape) -> Option<String> {
    match shape {
        TypeShape::Plain(leaf) => Some(capitalize(leaf.name())),
        TypeShape::Optional(inner) => render(inner).map(|s| format!("{s}?")),
        TypeShape::Union(variants) => {
            let parts = variants.iter().map(render).collect::<Option<Vec<_>>>()?;
            Some(format!("{{{}}}", parts.join(",")))
        }
        TypeShape::List(elem) => render(elem).map(|s| format!("[{s}]")),
        TypeShape::HomoTuple(elem) => render(elem).map(|s| format!("({s})")),
        TypeShape::ValueUnion(_) | TypeShape::FunctionTyped(_) => None,
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

impl TypeShape {
    pub fn render(&self) -> Option<String> {
        render(self)
    }

    pub fn is_function_typed(&self) -> bool {
        matches!(self, TypeShape::FunctionTyped(_))
    }

    /// Returns `true` if the flag may occur several times.
    pub fn is_repeated(&self) -> bool {
        match self {
            TypeShape::List(_) | TypeShape::HomoTuple(_) => true,
            TypeShape::Optional(inner) => inner.is_repeated(),
            _ => false,
        }
    }

    /// Returns `true` if the shape parses tokens as plain strings.
    pub fn is_textual(&self) -> bool {
        matches!(self, TypeShape::Plain(Leaf::Str | Leaf::Other(_)))
    }

    /// Allowed tokens, for shapes restricted to a closed set.
    pub fn choices(&self) -> Option<Vec<String>> {
        match self {
            TypeShape::ValueUnion(values) => Some(values.iter().map(ToString::to_string).collect()),
            TypeShape::Optional(inner) => {
                let mut choices = inner.choices()?;
                choices.push(NONE_TOKENS[1].to_string());
                Some(choices)
            }
            _ => None,
        }
    }

    /// Converts one command-line token into a value of this shape.
    ///
    /// For repeated shapes this converts a single occurrence; use
    /// [`collect`](TypeShape::collect) to assemble the occurrences.
    ///
    /// # Examples
    ///
    /// ```
    /// use argslot_core::{Annotation, Value, classify};
    ///
    /// let shape = classify(&Annotation::optional(Annotation::union([
    ///     Annotation::int(),
    ///     Annotation::str(),
    /// ])));
    /// assert_eq!(shape.parse_text("7").unwrap(), Value::Int(7));
    /// assert_eq!(shape.parse_text("seven").unwrap(), Value::Str("seven".into()));
    /// assert_eq!(shape.parse_text("None").unwrap(), Value::None);
    /// ```
    pub fn parse_text(&self, text: &str) -> Result<Value, ShapeError> {
        match self {
            TypeShape::Plain(leaf) => leaf.parse(text),
            TypeShape::Optional(inner) => {
                if is_none_token(text) {
                    Ok(Value::None)
                } else {
                    inner.parse_text(text)
                }
            }
            TypeShape::Union(variants) => variants
                .iter()
                .find_map(|v| v.parse_text(text).ok())
                .ok_or_else(|| ShapeError::Invalid {
                    expected: self.render().unwrap_or_else(|| "union".to_string()),
                    input: text.to_string(),
                }),
            TypeShape::List(elem) | TypeShape::HomoTuple(elem) => elem.parse_text(text),
            TypeShape::ValueUnion(values) => values
                .iter()
                .find(|literal| literal_matches(literal, text))
                .cloned()
                .ok_or_else(|| ShapeError::NotAChoice {
                    input: text.to_string(),
                    choices: values
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                }),
            TypeShape::FunctionTyped(_) => Err(ShapeError::NotParsable),
        }
    }

    /// Assembles the parsed occurrences of one flag into its final value.
    pub fn collect(&self, mut occurrences: Vec<Value>) -> Value {
        match self {
            TypeShape::List(_) => Value::List(occurrences),
            TypeShape::HomoTuple(_) => Value::Tuple(occurrences),
            TypeShape::Optional(inner) if inner.is_repeated() => {
                if occurrences.iter().all(Value::is_none) {
                    Value::None
                } else {
                    inner.collect(occurrences)
                }
            }
            _ => occurrences.pop().unwrap_or(Value::None),
        }
    }
}

fn is_none_token(text: &str) -> bool {
    NONE_TOKENS.contains(&text.to_ascii_lowercase().as_str())
}

fn parse_bool(text: &str) -> Option<bool> {
    let lowered = text.to_ascii_lowercase();
    if TRUE_TOKENS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Checks a token against a literal using the literal's own leaf type.
fn literal_matches(literal: &Value, text: &str) -> bool {
    match literal {
        Value::None => is_none_token(text),
        Value::Bool(b) => parse_bool(text) == Some(*b),
        Value::Int(i) => text.trim().parse::<i64>().ok() == Some(*i),
        Value::Float(x) => text.trim().parse::<f64>().ok() == Some(*x),
        Value::Str(s) => s == text,
        Value::Path(p) => p.as_path() == std::path::Path::new(text),
        _ => false,
    }
}
