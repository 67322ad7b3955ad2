//! Signature-driven command-line schemas.
//!
//! This crate turns explicit function descriptors into flat flag schemas and
//! turns parsed flag values back into calls:
//!
//! - [`Function`] / [`Param`] / [`Annotation`]: what a callable declares.
//! - [`classify`] / [`TypeShape`]: the structural shape of a declared type,
//!   with [`TypeShape::parse_text`] converting command-line tokens.
//! - [`compile`] / [`Schema`]: flags for ordinary parameters and [`Slot`]s
//!   for function-typed parameters, whose alternatives are chosen through a
//!   [`Selector`].
//! - [`reconstruct`]: rebuilds nested [`Partial`] calls from a flat map of
//!   parsed values.
//! - [`FlagEngine`]: the seam a concrete flag parser plugs into.
//!
//! Validation ([`validate_function`], [`validate_schema`]) catches descriptor
//! mistakes and schema/binding mismatches.
//!
//! # Example
//!
//! ```
//! use argslot_core::*;
//!
//! let lstm = Function::builder("lstm")
//!     .param(Param::new("layers").with_type(Annotation::int()).with_default(1))
//!     .build(|args| Ok(Value::Int(args.int("layers")?)));
//! let train = Function::builder("train")
//!     .param(Param::new("model").with_type(Annotation::factory(lstm)))
//!     .param(Param::new("lr").with_type(Annotation::float()).with_default(0.01))
//!     .build(|args| {
//!         let layers = args.partial("model")?.call()?;
//!         Ok(Value::from(format!("{layers} layers @ {}", args.float("lr")?)))
//!     });
//!
//! let schema = compile(&train, &Defaults).unwrap();
//! assert_eq!(schema.flag_names(), vec!["model:choose", "model.layers", "lr"]);
//!
//! let mut parsed = Kwargs::new();
//! parsed.insert("model:choose".into(), Value::from("lstm"));
//! parsed.insert("model.layers".into(), Value::Int(3));
//! parsed.insert("lr".into(), Value::Float(0.5));
//!
//! let kwargs = reconstruct(&parsed, &schema, false).unwrap();
//! assert_eq!(train.call(kwargs).unwrap(), Value::from("3 layers @ 0.5"));
//! ```

mod engine;
mod error;
mod function;
mod path;
mod reconstruct;
mod schema;
mod shape;
mod validate;
mod value;

pub use engine::{FlagEngine, register_schema};
pub use error::{CallError, CompileError, ReconstructError, ShapeError};
pub use function::{Function, FunctionBuilder, Param, SignatureParam, extract};
pub use path::PathOptions;
pub use reconstruct::reconstruct;
pub use schema::{
    Binding, DISCRIMINATOR_SUFFIX, Defaults, FlagKind, FlagSpec, NESTED_SEPARATOR, Schema,
    Selector, Slot, compile, discriminator_name, nested_name,
};
pub use shape::{Annotation, Leaf, TypeShape, classify, render};
pub use validate::{
    RESERVED_PARAM_NAMES, ValidationError, is_valid_param_name, validate_function, validate_schema,
};
pub use value::{Args, Kwargs, Partial, Value};
