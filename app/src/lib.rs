//! Command-line interfaces from function descriptors.
//!
//! Register [`Function`](argslot_core::Function) descriptors with an [`App`];
//! every parameter becomes a `--flag`, and function-typed (factory) parameters
//! expand into `--{param}:choose` plus `--{param}.{nested}` flags for the
//! chosen alternative. On [`App::run`] the flat flags are parsed with clap and
//! reassembled into nested partial calls before the function is invoked.
//!
//! # Example
//!
//! ```
//! use argslot::App;
//! use argslot_core::{Annotation, Function, Param, Value};
//!
//! let adam = Function::builder("adam")
//!     .param(Param::new("lr").with_type(Annotation::float()).with_default(0.001))
//!     .build(|args| Ok(Value::from(format!("adam(lr={})", args.float("lr")?))));
//! let sgd = Function::builder("sgd")
//!     .param(Param::new("momentum").with_type(Annotation::float()).with_default(0.9))
//!     .build(|args| Ok(Value::from(format!("sgd(momentum={})", args.float("momentum")?))));
//! let train = Function::builder("train")
//!     .param(Param::new("optim").with_type(Annotation::factories([adam, sgd])))
//!     .build(|args| args.partial("optim")?.call());
//!
//! let mut app = App::new();
//! app.register(train).unwrap();
//!
//! let out = app.run(["--optim:choose", "sgd", "--optim.momentum", "0.5"]).unwrap();
//! assert_eq!(out, Value::from("sgd(momentum=0.5)"));
//! ```

mod app;
mod config;
mod engine;
mod error;
mod output;

pub use app::{App, Invocation, RegisterOptions};
pub use config::AppConfig;
pub use engine::{ClapEngine, ShapeParser};
pub use error::{AppError, ConfigError, RegistrationError, Result};
pub use output::{OutputFormat, format_schema, format_value};
