//! Rebuilding nested calls from flat parsed flag values.
//!
//! Slots are processed in reverse discovery order. Because slots are
//! discovered in pre-order, a nested slot always comes after its parent and
//! is therefore resolved first; by the time a parent binds its parameters,
//! every factory parameter among them already holds a [`Partial`].

use tracing::debug;

use crate::error::ReconstructError;
use crate::schema::Schema;
use crate::value::{Kwargs, Partial, Value};

/// Rebuilds the keyword arguments for the schema's top-level function.
///
/// `parsed` maps every flag in `schema` to its value. With `keep_extras`
/// set, the result is the whole flat argument bag keyed by flag name, slot
/// owners replaced by their partials; otherwise it holds exactly the
/// top-level function's own parameters.
///
/// # Errors
///
/// [`ReconstructError::MissingValue`] if a binding names a flag absent from
/// `parsed`. This means the schema and the parsed values are out of sync.
///
/// # Examples
///
/// ```
/// use argslot_core::*;
///
/// let inner = Function::builder("inner")
///     .param(Param::new("x").with_type(Annotation::int()).with_default(1))
///     .build(|args| Ok(Value::Int(args.int("x")? + 1)));
/// let outer = Function::builder("outer")
///     .param(Param::new("f").with_type(Annotation::factory(inner)))
///     .build(|args| args.partial("f")?.call());
///
/// let schema = compile(&outer, &Defaults).unwrap();
/// let mut parsed = Kwargs::new();
/// parsed.insert("f:choose".into(), Value::from("inner"));
/// parsed.insert("f.x".into(), Value::Int(41));
///
/// let kwargs = reconstruct(&parsed, &schema, false).unwrap();
/// assert_eq!(outer.call(kwargs).unwrap(), Value::Int(42));
/// ```
pub fn reconstruct(
    parsed: &Kwargs,
    schema: &Schema,
    keep_extras: bool,
) -> Result<Kwargs, ReconstructError> {
    let mut values = parsed.clone();

    for slot in schema.slots.iter().rev() {
        let mut bound = Kwargs::new();
        for binding in &slot.bindings {
            let value = values
                .get(&binding.flag)
                .cloned()
                .ok_or_else(|| ReconstructError::MissingValue {
                    owner: slot.owner.clone(),
                    flag: binding.flag.clone(),
                })?;
            bound.insert(binding.param.clone(), value);
        }
        debug!(
            owner = %slot.owner,
            target = slot.target.name(),
            bound = bound.len(),
            "Resolved slot"
        );
        let partial = Partial::new(slot.target.clone(), bound);
        values.insert(slot.owner.clone(), Value::Partial(partial));
    }

    if keep_extras {
        return Ok(values);
    }

    let mut kwargs = Kwargs::new();
    for binding in &schema.bindings {
        let value = values
            .remove(&binding.flag)
            .ok_or_else(|| ReconstructError::MissingValue {
                owner: schema.function.name().to_string(),
                flag: binding.flag.clone(),
            })?;
        kwargs.insert(binding.param.clone(), value);
    }
    Ok(kwargs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{Function, Param};
    use crate::schema::{Defaults, compile};
    use crate::shape::Annotation;

    fn parsed(entries: &[(&str, Value)]) -> Kwargs {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Three levels: `top(model: encoder)`, `encoder(cell: lstm, width)`, `lstm(depth)`.
    fn three_levels() -> (Function, Function, Function) {
        let lstm = Function::builder("lstm")
            .param(Param::new("depth").with_type(Annotation::int()).with_default(1))
            .build(|args| Ok(Value::Int(args.int("depth")?)));
        let encoder = Function::builder("encoder")
            .param(Param::new("cell").with_type(Annotation::factory(lstm.clone())))
            .param(Param::new("width").with_type(Annotation::int()).with_default(4))
            .build(|args| {
                let depth = args.partial("cell")?.call()?.as_int().unwrap_or_default();
                Ok(Value::Int(depth * args.int("width")?))
            });
        let top = Function::builder("top")
            .param(Param::new("model").with_type(Annotation::factory(encoder.clone())))
            .build(|args| args.partial("model")?.call());
        (top, encoder, lstm)
    }

    #[test]
    fn test_plain_flags_pass_through() {
        let f = Function::builder("f")
            .param(Param::new("a").with_type(Annotation::int()).with_default(1))
            .build(|_| Ok(Value::None));
        let schema = compile(&f, &Defaults).unwrap();

        let kwargs = reconstruct(&parsed(&[("a", Value::Int(5))]), &schema, false).unwrap();
        assert_eq!(kwargs, parsed(&[("a", Value::Int(5))]));
    }

    #[test]
    fn test_deepest_slot_resolves_first() {
        let (top, encoder, lstm) = three_levels();
        let schema = compile(&top, &Defaults).unwrap();
        let values = parsed(&[
            ("model:choose", "encoder".into()),
            ("model.cell:choose", "lstm".into()),
            ("model.cell.depth", Value::Int(3)),
            ("model.width", Value::Int(5)),
        ]);

        let kwargs = reconstruct(&values, &schema, false).unwrap();
        assert_eq!(kwargs.len(), 1);

        let model = kwargs["model"].as_partial().unwrap();
        assert_eq!(model.function(), &encoder);
        let cell = model.bound()["cell"].as_partial().unwrap();
        assert_eq!(cell.function(), &lstm);
        assert_eq!(cell.bound(), &parsed(&[("depth", Value::Int(3))]));
        assert_eq!(model.bound()["width"], Value::Int(5));

        // No raw discriminator or flat flag value leaks into a parent's bindings.
        for value in model.bound().values() {
            assert!(!matches!(value, Value::Str(_)));
        }

        assert_eq!(top.call(kwargs).unwrap(), Value::Int(15));
    }

    #[test]
    fn test_keep_extras_returns_flat_bag() {
        let (top, _, _) = three_levels();
        let schema = compile(&top, &Defaults).unwrap();
        let values = parsed(&[
            ("model:choose", "encoder".into()),
            ("model.cell:choose", "lstm".into()),
            ("model.cell.depth", Value::Int(2)),
            ("model.width", Value::Int(2)),
        ]);

        let bag = reconstruct(&values, &schema, true).unwrap();
        assert!(bag.contains_key("model:choose"));
        assert_eq!(bag["model.cell.depth"], Value::Int(2));
        assert!(bag["model"].is_callable());
        assert!(bag["model.cell"].is_callable());
    }

    #[test]
    fn test_bound_values_can_be_overridden() {
        let (top, _, _) = three_levels();
        let schema = compile(&top, &Defaults).unwrap();
        let values = parsed(&[
            ("model:choose", "encoder".into()),
            ("model.cell:choose", "lstm".into()),
            ("model.cell.depth", Value::Int(2)),
            ("model.width", Value::Int(3)),
        ]);

        let kwargs = reconstruct(&values, &schema, false).unwrap();
        let model = kwargs["model"].as_partial().unwrap();
        assert_eq!(model.call().unwrap(), Value::Int(6));
        let overrides = parsed(&[("width", Value::Int(10))]);
        assert_eq!(model.call_with(overrides).unwrap(), Value::Int(20));
    }

    #[test]
    fn test_missing_binding_is_internal_error() {
        let (top, _, _) = three_levels();
        let schema = compile(&top, &Defaults).unwrap();
        let values = parsed(&[("model.width", Value::Int(3))]);

        assert_eq!(
            reconstruct(&values, &schema, false),
            Err(ReconstructError::MissingValue {
                owner: "model.cell".into(),
                flag: "model.cell.depth".into(),
            })
        );
    }
}
