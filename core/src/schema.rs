//! Schema compilation: flags for ordinary parameters, slots for factories.
//!
//! [`compile`] walks a function's extracted signature. Ordinary parameters
//! become [`FlagSpec`]s. A function-typed parameter instead gets a
//! discriminator flag, has its selected target compiled under a prefixed
//! scope, and records a [`Slot`] so reconstruction can rebuild the call.
//!
//! Flag names are qualified by their owner's path:
//!
//! | parameter                      | flag              |
//! |--------------------------------|-------------------|
//! | `a` on the top-level function  | `a`               |
//! | `dim` of factory param `model` | `model.dim`       |
//! | discriminator of `model`       | `model:choose`    |
//!
//! Neither `.` nor `:` may appear in a parameter name, so qualified names
//! never collide.
//!
//! # Example
//!
//! ```
//! use argslot_core::*;
//!
//! let encoder = Function::builder("encoder")
//!     .param(Param::new("dim").with_type(Annotation::int()).with_default(8))
//!     .build(|args| Ok(Value::Int(args.int("dim")?)));
//! let train = Function::builder("train")
//!     .param(Param::new("model").with_type(Annotation::factory(encoder)))
//!     .param(Param::new("lr").with_type(Annotation::float()).with_default(0.1))
//!     .build(|_| Ok(Value::None));
//!
//! let schema = compile(&train, &Defaults).unwrap();
//! assert_eq!(schema.flag_names(), vec!["model:choose", "model.dim", "lr"]);
//! assert_eq!(schema.slots[0].owner, "model");
//! ```

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::CompileError;
use crate::function::{Function, extract};
use crate::shape::{Annotation, TypeShape, classify};
use crate::value::Value;

/// Separator between an owner's flag name and a nested parameter name.
pub const NESTED_SEPARATOR: char = '.';

/// Suffix appended to an owner's flag name to name its discriminator.
pub const DISCRIMINATOR_SUFFIX: &str = ":choose";

/// Name of the discriminator flag for a function-typed flag.
pub fn discriminator_name(owner: &str) -> String {
    format!("{owner}{DISCRIMINATOR_SUFFIX}")
}

/// Name of a parameter nested under `owner`.
pub fn nested_name(owner: &str, param: &str) -> String {
    format!("{owner}{NESTED_SEPARATOR}{param}")
}

/// What a flag stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// An ordinary parameter value.
    Parameter,
    /// Which alternative a function-typed parameter selects.
    Discriminator,
}

/// One flag to register with the flag engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagSpec {
    /// External flag name, unique within the schema.
    pub name: String,
    /// Declared parameter name the flag feeds.
    pub param: String,
    #[serde(skip)]
    pub shape: TypeShape,
    /// Rendered shape for help output; `None` suppresses the type name.
    pub metavar: Option<String>,
    /// Declared default; `None` makes the flag required.
    pub default: Option<Value>,
    pub kind: FlagKind,
    /// Left out of help output.
    pub hidden: bool,
}

impl FlagSpec {
    fn parameter(name: String, param: String, shape: TypeShape, default: Option<Value>) -> Self {
        Self {
            metavar: shape.render(),
            name,
            param,
            shape,
            default,
            kind: FlagKind::Parameter,
            hidden: false,
        }
    }

    fn discriminator(owner: &str, alternatives: &[Function], selected_default: &Function) -> Self {
        let names: Vec<Value> = alternatives.iter().map(|f| Value::from(f.name())).collect();
        let shape = TypeShape::ValueUnion(names);
        Self {
            name: discriminator_name(owner),
            param: discriminator_name(owner),
            metavar: shape.render(),
            shape,
            default: Some(Value::from(selected_default.name())),
            kind: FlagKind::Discriminator,
            hidden: alternatives.len() == 1,
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Maps a declared parameter to the flag (or slot owner) supplying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub param: String,
    pub flag: String,
}

/// Bookkeeping for one function-typed parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    /// Flag name of the function-typed parameter; receives the rebuilt value.
    pub owner: String,
    /// The alternative selected for this invocation.
    #[serde(serialize_with = "serialize_function_name")]
    pub target: Function,
    pub discriminator: String,
    /// One binding per parameter of `target`, in declaration order.
    pub bindings: Vec<Binding>,
}

fn serialize_function_name<S: Serializer>(f: &Function, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(f.name())
}

/// The compiled form of one top-level function.
///
/// Slots are in pre-order over the call tree, so a slot always comes before
/// the slots nested inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    #[serde(serialize_with = "serialize_function_name")]
    pub function: Function,
    pub flags: Vec<FlagSpec>,
    pub slots: Vec<Slot>,
    /// Bindings for the top-level function's own parameters.
    pub bindings: Vec<Binding>,
}

impl Schema {
    pub fn flag_names(&self) -> Vec<&str> {
        self.flags.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn find_flag(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    pub fn find_slot(&self, owner: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.owner == owner)
    }
}

/// Chooses among the alternatives of a function-typed parameter.
///
/// Called with a discriminator flag name before the full parse; returning
/// `None` (or an unknown name) selects the default alternative.
pub trait Selector {
    fn selected(&self, discriminator: &str) -> Option<String>;
}

/// Always selects the default alternative.
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults;

impl Selector for Defaults {
    fn selected(&self, _discriminator: &str) -> Option<String> {
        None
    }
}

impl<F> Selector for F
where
    F: Fn(&str) -> Option<String>,
{
    fn selected(&self, discriminator: &str) -> Option<String> {
        self(discriminator)
    }
}

/// Compiles a function into its flags and slots.
///
/// Unrecognised annotations degrade to plain leaves and never fail; the only
/// failures are malformed alternative lists on factory parameters.
///
/// A factory parameter always resolves to one of its alternatives. An
/// optional factory whose default is `Value::None` selects the first
/// alternative; there is no absent state.
///
/// Descriptors are immutable and built bottom-up, so factory nesting is
/// always finite and the recursion terminates.
pub fn compile(function: &Function, selector: &dyn Selector) -> Result<Schema, CompileError> {
    let mut schema = Schema {
        function: function.clone(),
        flags: Vec::new(),
        slots: Vec::new(),
        bindings: Vec::new(),
    };
    schema.bindings = compile_scope(function, None, selector, &mut schema)?;
    debug!(
        function = function.name(),
        flags = schema.flags.len(),
        slots = schema.slots.len(),
        "Compiled schema"
    );
    Ok(schema)
}

fn compile_scope(
    function: &Function,
    owner: Option<&str>,
    selector: &dyn Selector,
    schema: &mut Schema,
) -> Result<Vec<Binding>, CompileError> {
    let mut bindings = Vec::new();

    for param in extract(function) {
        let flag = match owner {
            Some(owner) => nested_name(owner, &param.flag),
            None => param.flag.clone(),
        };
        bindings.push(Binding {
            param: param.name.clone(),
            flag: flag.clone(),
        });

        if lists_no_alternatives(&param.annotation) {
            return Err(CompileError::NoAlternatives(flag));
        }

        match classify(&param.annotation) {
            TypeShape::FunctionTyped(alternatives) => {
                let (default, target) =
                    select_alternative(&flag, &alternatives, param.default.as_ref(), selector)?;
                schema
                    .flags
                    .push(FlagSpec::discriminator(&flag, &alternatives, &default));

                debug!(owner = %flag, target = target.name(), "Opened slot");
                let index = schema.slots.len();
                schema.slots.push(Slot {
                    owner: flag.clone(),
                    target: target.clone(),
                    discriminator: discriminator_name(&flag),
                    bindings: Vec::new(),
                });

                let child = compile_scope(&target, Some(&flag), selector, schema)?;
                schema.slots[index].bindings = child;
            }
            shape => {
                let spec = FlagSpec::parameter(flag, param.name, shape, param.default);
                debug!(flag = %spec.name, metavar = ?spec.metavar, "Compiled flag");
                schema.flags.push(spec);
            }
        }
    }

    Ok(bindings)
}

/// Returns `true` for a factory annotation (optional or not) listing nothing.
fn lists_no_alternatives(annotation: &Annotation) -> bool {
    match annotation {
        Annotation::Factory(functions) => functions.is_empty(),
        Annotation::Union(members) => members.iter().any(lists_no_alternatives),
        _ => false,
    }
}

/// Returns `(default alternative, selected alternative)`.
fn select_alternative(
    flag: &str,
    alternatives: &[Function],
    declared_default: Option<&Value>,
    selector: &dyn Selector,
) -> Result<(Function, Function), CompileError> {
    for (i, alternative) in alternatives.iter().enumerate() {
        if alternatives[..i].iter().any(|f| f.name() == alternative.name()) {
            return Err(CompileError::DuplicateAlternative {
                flag: flag.to_string(),
                name: alternative.name().to_string(),
            });
        }
    }

    let by_name = |name: &str| alternatives.iter().find(|f| f.name() == name);
    let default = declared_default
        .and_then(Value::as_str)
        .and_then(by_name)
        .or_else(|| alternatives.first())
        .ok_or_else(|| CompileError::NoAlternatives(flag.to_string()))?;

    let selected = selector
        .selected(&discriminator_name(flag))
        .and_then(|name| by_name(&name).cloned())
        .unwrap_or_else(|| default.clone());

    Ok((default.clone(), selected))
}
