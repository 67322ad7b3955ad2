//! The seam between compiled schemas and a concrete flag parser.

use tracing::debug;

use crate::schema::{FlagSpec, Schema};
use crate::value::Kwargs;

/// A flag parser that compiled schemas can be registered with.
///
/// `parse` must return one value per registered flag, keyed by flag name,
/// with omitted flags carrying their declared default.
pub trait FlagEngine {
    type Error;

    /// Registers one flag.
    fn register_flag(&mut self, flag: &FlagSpec) -> Result<(), Self::Error>;

    /// Parses `argv` (without a program name) against the registered flags.
    fn parse(&mut self, argv: &[String]) -> Result<Kwargs, Self::Error>;
}

/// Registers every flag of `schema` with `engine`, in schema order.
pub fn register_schema<E: FlagEngine>(engine: &mut E, schema: &Schema) -> Result<(), E::Error> {
    for flag in &schema.flags {
        engine.register_flag(flag)?;
    }
    debug!(
        function = schema.function.name(),
        flags = schema.flags.len(),
        "Registered schema"
    );
    Ok(())
}
