//! Clap-backed flag engine.
//!
//! Each [`FlagSpec`] becomes one `--{name}` option taking exactly one value
//! per occurrence. Tokens are converted by [`ShapeParser`], so a malformed
//! value is reported by clap with its usual formatting and exit code.

use std::ffi::OsStr;

use argslot_core::{FlagEngine, FlagKind, FlagSpec, Kwargs, ShapeError, TypeShape, Value};
use clap::builder::{PossibleValue, TypedValueParser};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};
use tracing::debug;

/// Converts command-line tokens through a [`TypeShape`].
#[derive(Debug, Clone)]
pub struct ShapeParser {
    shape: TypeShape,
}

impl ShapeParser {
    pub fn new(shape: TypeShape) -> Self {
        Self { shape }
    }
}

impl TypedValueParser for ShapeParser {
    type Value = Value;

    fn parse_ref(
        &self,
        cmd: &Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Value, clap::Error> {
        let text = value
            .to_str()
            .ok_or_else(|| clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;
        self.shape.parse_text(text).map_err(|e| {
            let flag = arg.map_or_else(|| "...".to_string(), ToString::to_string);
            clap::Error::raw(
                ErrorKind::InvalidValue,
                format!("invalid value '{text}' for '{flag}': {e}\n"),
            )
            .with_cmd(cmd)
        })
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        let choices = self.shape.choices()?;
        Some(Box::new(choices.into_iter().map(PossibleValue::new)))
    }
}

/// A [`FlagEngine`] built on the clap builder API.
///
/// # Examples
///
/// ```
/// use argslot::ClapEngine;
/// use argslot_core::*;
///
/// let f = Function::builder("f")
///     .param(Param::new("a").with_type(Annotation::int()).with_default(1))
///     .build(|_| Ok(Value::None));
/// let schema = compile(&f, &Defaults).unwrap();
///
/// let mut engine = ClapEngine::new("prog");
/// register_schema(&mut engine, &schema).unwrap();
/// let parsed = engine.parse(&["--a".into(), "5".into()]).unwrap();
/// assert_eq!(parsed["a"], Value::Int(5));
/// ```
#[derive(Debug, Clone)]
pub struct ClapEngine {
    command: Command,
    flags: Vec<FlagSpec>,
}

impl ClapEngine {
    /// Creates an engine whose usage line names `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_command(Command::new(name.into()))
    }

    /// Creates an engine on top of a preconfigured command.
    pub fn from_command(command: Command) -> Self {
        Self {
            command: command.no_binary_name(true).args_override_self(true),
            flags: Vec::new(),
        }
    }

    /// The clap command with every registered flag.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Renders the long help text.
    pub fn render_help(&mut self) -> String {
        self.command.render_long_help().to_string()
    }

    fn default_for(&self, flag: &FlagSpec) -> Result<Value, clap::Error> {
        match &flag.default {
            Some(default) => convert_default(flag, default).map_err(|e| {
                clap::Error::raw(
                    ErrorKind::InvalidValue,
                    format!("invalid default for '--{}': {e}\n", flag.name),
                )
                .with_cmd(&self.command)
            }),
            None => Err(clap::Error::raw(
                ErrorKind::MissingRequiredArgument,
                format!("the following required argument was not provided: --{}\n", flag.name),
            )
            .with_cmd(&self.command)),
        }
    }
}

impl FlagEngine for ClapEngine {
    type Error = clap::Error;

    fn register_flag(&mut self, flag: &FlagSpec) -> Result<(), clap::Error> {
        let repeated = flag.shape.is_repeated();
        let mut arg = Arg::new(flag.name.clone())
            .long(flag.name.clone())
            .num_args(1)
            .allow_negative_numbers(true)
            .action(if repeated { ArgAction::Append } else { ArgAction::Set })
            .value_parser(ShapeParser::new(flag.shape.clone()))
            .required(flag.is_required())
            .hide(flag.hidden);
        if let Some(metavar) = &flag.metavar {
            arg = arg.value_name(metavar.clone());
        }
        if let Some(default) = &flag.default {
            arg = arg.help(format!("(default: {default})"));
        }
        if flag.kind == FlagKind::Discriminator {
            arg = arg.help_heading("Alternatives");
        }

        debug!(flag = %flag.name, repeated, required = flag.is_required(), "Registered flag");
        self.command = std::mem::take(&mut self.command).arg(arg);
        self.flags.push(flag.clone());
        Ok(())
    }

    fn parse(&mut self, argv: &[String]) -> Result<Kwargs, clap::Error> {
        let matches = self.command.try_get_matches_from_mut(argv)?;

        let mut parsed = Kwargs::new();
        for flag in &self.flags {
            let value = match matches.get_many::<Value>(&flag.name) {
                Some(occurrences) => flag.shape.collect(occurrences.cloned().collect()),
                None => self.default_for(flag)?,
            };
            parsed.insert(flag.name.clone(), value);
        }
        debug!(flags = parsed.len(), "Parsed arguments");
        Ok(parsed)
    }
}

/// Converts a textual default through a non-textual shape.
///
/// Only single-valued shapes are converted; other defaults pass through
/// unchanged.
fn convert_default(flag: &FlagSpec, default: &Value) -> Result<Value, ShapeError> {
    match default {
        Value::Str(text)
            if flag.kind == FlagKind::Parameter
                && !flag.shape.is_textual()
                && !flag.shape.is_repeated() =>
        {
            flag.shape.parse_text(text)
        }
        other => Ok(other.clone()),
    }
}
