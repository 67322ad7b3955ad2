//! Function descriptor and compiled schema validation.
//!
//! [`validate_function`] catches descriptor mistakes before anything is
//! compiled: empty names, parameter names that would break flag naming or
//! shadow `--help`/`--version`, and duplicate parameters. [`validate_schema`] checks the structural invariants
//! of a compiled [`Schema`]; a failure there is a compiler defect, not bad
//! input.
//!
//! # Examples
//!
//! ```
//! use argslot_core::*;
//!
//! let good = Function::builder("f")
//!     .param(Param::new("a").with_type(Annotation::int()))
//!     .build(|_| Ok(Value::None));
//! assert!(validate_function(&good).is_empty());
//! assert!(validate_schema(&compile(&good, &Defaults).unwrap()).is_empty());
//!
//! // Invalid: dots are reserved for nested flag names
//! let bad = Function::builder("f")
//!     .param(Param::new("a.b"))
//!     .build(|_| Ok(Value::None));
//! assert!(!validate_function(&bad).is_empty());
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::function::Function;
use crate::schema::{FlagKind, Schema};
use crate::shape::{Annotation, TypeShape, classify};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex must compile")
});

/// Top-level flag names the command line keeps for itself.
pub const RESERVED_PARAM_NAMES: [&str; 2] = ["help", "version"];

/// Descriptor and schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Function name is empty or whitespace-only.
    #[error("function name cannot be empty")]
    EmptyFunctionName,
    /// Parameter name is not an identifier.
    #[error("invalid parameter name in {function}: '{name}'")]
    InvalidParameterName { function: String, name: String },
    /// A top-level parameter would shadow a built-in flag.
    #[error("parameter name in {function} is reserved: '{name}'")]
    ReservedParameterName { function: String, name: String },
    /// Two parameters of one function share a name.
    #[error("duplicate parameter in {function}: {name}")]
    DuplicateParameter { function: String, name: String },
    /// Two flags in one schema share a name.
    #[error("duplicate flag in schema: {0}")]
    DuplicateFlag(String),
    /// A slot's bindings do not match its target's parameters.
    #[error("slot {owner} does not bind parameter {param} of {target}")]
    UnboundParameter {
        owner: String,
        target: String,
        param: String,
    },
    /// A binding names neither a registered flag nor a slot owner.
    #[error("{owner} binds unknown flag {flag}")]
    UnknownBinding { owner: String, flag: String },
    /// A slot has no discriminator flag.
    #[error("slot {0} has no discriminator flag")]
    MissingDiscriminator(String),
}

/// Returns `true` if `name` can be used as a parameter name.
pub fn is_valid_param_name(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Validates a function descriptor and every factory alternative below it.
///
/// Only the top-level function is checked against
/// [`RESERVED_PARAM_NAMES`]; nested parameters are namespaced by their owner.
pub fn validate_function(function: &Function) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for param in function.params() {
        if RESERVED_PARAM_NAMES.contains(&param.name.as_str()) {
            errors.push(ValidationError::ReservedParameterName {
                function: function.name().to_string(),
                name: param.name.clone(),
            });
        }
    }
    let mut visited: Vec<Function> = Vec::new();
    validate_descriptor(function, &mut visited, &mut errors);
    errors
}

fn validate_descriptor(
    function: &Function,
    visited: &mut Vec<Function>,
    errors: &mut Vec<ValidationError>,
) {
    if visited.contains(function) {
        return;
    }
    visited.push(function.clone());

    if function.name().trim().is_empty() {
        errors.push(ValidationError::EmptyFunctionName);
        return;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for param in function.params() {
        if !is_valid_param_name(&param.name) {
            errors.push(ValidationError::InvalidParameterName {
                function: function.name().to_string(),
                name: param.name.clone(),
            });
        }
        if !seen.insert(param.name.as_str()) {
            errors.push(ValidationError::DuplicateParameter {
                function: function.name().to_string(),
                name: param.name.clone(),
            });
        }
        if let Some(annotation) = &param.annotation {
            if let TypeShape::FunctionTyped(alternatives) = classify(annotation) {
                for alternative in &alternatives {
                    validate_descriptor(alternative, visited, errors);
                }
            } else if let Annotation::Factory(alternatives) = annotation {
                for alternative in alternatives {
                    validate_descriptor(alternative, visited, errors);
                }
            }
        }
    }
}

/// Validates the structural invariants of a compiled schema.
///
/// Checks that flag names are unique, that every slot has a discriminator
/// and binds exactly its target's extracted parameters, and that every
/// binding refers to a flag or a slot owner.
pub fn validate_schema(schema: &Schema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut flags: HashSet<&str> = HashSet::new();
    for flag in &schema.flags {
        if !flags.insert(flag.name.as_str()) {
            errors.push(ValidationError::DuplicateFlag(flag.name.clone()));
        }
    }
    let owners: HashSet<&str> = schema.slots.iter().map(|s| s.owner.as_str()).collect();
    let known = |flag: &str| flags.contains(flag) || owners.contains(flag);

    for binding in &schema.bindings {
        if !known(&binding.flag) {
            errors.push(ValidationError::UnknownBinding {
                owner: schema.function.name().to_string(),
                flag: binding.flag.clone(),
            });
        }
    }

    for slot in &schema.slots {
        let has_discriminator = schema
            .find_flag(&slot.discriminator)
            .is_some_and(|f| f.kind == FlagKind::Discriminator);
        if !has_discriminator {
            errors.push(ValidationError::MissingDiscriminator(slot.owner.clone()));
        }

        for param in crate::function::extract(&slot.target) {
            if !slot.bindings.iter().any(|b| b.param == param.name) {
                errors.push(ValidationError::UnboundParameter {
                    owner: slot.owner.clone(),
                    target: slot.target.name().to_string(),
                    param: param.name,
                });
            }
        }

        for binding in &slot.bindings {
            if !known(&binding.flag) {
                errors.push(ValidationError::UnknownBinding {
                    owner: slot.owner.clone(),
                    flag: binding.flag.clone(),
                });
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Param;
    use crate::schema::{Binding, Defaults, compile};
    use crate::value::Value;

    fn function(name: &str, params: Vec<Param>) -> Function {
        params
            .into_iter()
            .fold(Function::builder(name), |b, p| b.param(p))
            .build(|_| Ok(Value::None))
    }

    #[test]
    fn test_param_name_rules() {
        assert!(is_valid_param_name("a"));
        assert!(is_valid_param_name("_hidden_2"));
        assert!(!is_valid_param_name("2a"));
        assert!(!is_valid_param_name("a.b"));
        assert!(!is_valid_param_name("a:choose"));
        assert!(!is_valid_param_name("a-b"));
        assert!(!is_valid_param_name(""));
    }

    #[test]
    fn test_validate_function_rejects_duplicates() {
        let f = function("f", vec![Param::new("a"), Param::new("a")]);
        assert_eq!(
            validate_function(&f),
            vec![ValidationError::DuplicateParameter {
                function: "f".into(),
                name: "a".into()
            }]
        );
    }

    #[test]
    fn test_validate_function_descends_into_factories() {
        let inner = function("inner", vec![Param::new("bad name")]);
        let outer = function(
            "outer",
            vec![Param::new("m").with_type(Annotation::optional(Annotation::factory(inner)))],
        );
        assert_eq!(
            validate_function(&outer),
            vec![ValidationError::InvalidParameterName {
                function: "inner".into(),
                name: "bad name".into()
            }]
        );
    }

    #[test]
    fn test_validate_function_rejects_reserved_names_at_top_level() {
        let f = function("f", vec![Param::new("help"), Param::new("version"), Param::new("a")]);
        assert_eq!(
            validate_function(&f),
            vec![
                ValidationError::ReservedParameterName {
                    function: "f".into(),
                    name: "help".into()
                },
                ValidationError::ReservedParameterName {
                    function: "f".into(),
                    name: "version".into()
                },
            ]
        );

        let inner = function("inner", vec![Param::new("help")]);
        let outer = function("outer", vec![Param::new("m").with_type(Annotation::factory(inner))]);
        assert!(validate_function(&outer).is_empty());
    }

    #[test]
    fn test_validate_function_rejects_empty_name() {
        let f = function("  ", vec![]);
        assert_eq!(validate_function(&f), vec![ValidationError::EmptyFunctionName]);
    }

    #[test]
    fn test_compiled_schema_is_valid() {
        let g = function("g", vec![Param::new("x").with_type(Annotation::int())]);
        let f = function(
            "f",
            vec![
                Param::new("m").with_type(Annotation::factory(g)),
                Param::new("y").with_default(1),
            ],
        );
        let schema = compile(&f, &Defaults).unwrap();
        assert!(validate_schema(&schema).is_empty());
    }

    #[test]
    fn test_desynchronised_schema_is_reported() {
        let g = function("g", vec![Param::new("x"), Param::new("y")]);
        let f = function("f", vec![Param::new("m").with_type(Annotation::factory(g))]);
        let mut schema = compile(&f, &Defaults).unwrap();

        schema.slots[0].bindings.pop();
        schema.slots[0].bindings.push(Binding {
            param: "x".into(),
            flag: "m.nope".into(),
        });
        schema.flags.push(schema.flags[0].clone());

        let errors = validate_schema(&schema);
        assert!(errors.contains(&ValidationError::DuplicateFlag("m:choose".into())));
        assert!(errors.contains(&ValidationError::UnboundParameter {
            owner: "m".into(),
            target: "g".into(),
            param: "y".into()
        }));
        assert!(errors.contains(&ValidationError::UnknownBinding {
            owner: "m".into(),
            flag: "m.nope".into()
        }));
    }
}
