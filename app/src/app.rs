//! Registration and invocation of command-line callables.
//!
//! An [`App`] holds registered functions. One registration is invoked
//! directly; several become subcommands, the first token of `argv` picking
//! which one runs. Only the chosen function is compiled, with alternatives of
//! factory parameters chosen by peeking at `argv` before the full parse.

use argslot_core::{
    CallError, FlagEngine, Function, Kwargs, Schema, Selector, Value, compile, reconstruct,
    register_schema, validate_function, validate_schema,
};
use clap::Command;
use clap::error::ErrorKind;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::engine::ClapEngine;
use crate::error::{AppError, RegistrationError, Result};
use crate::output::{OutputFormat, format_schema};

/// Command name clap keeps for its own `help` subcommand.
const RESERVED_COMMAND: &str = "help";

/// Per-registration options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Hand the top-level function the full flat argument bag, keyed by
    /// flag name, instead of only its own parameters.
    pub keep_extras: bool,
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keep_extras(mut self) -> Self {
        self.keep_extras = true;
        self
    }
}

#[derive(Debug, Clone)]
struct Registration {
    name: String,
    function: Function,
    options: RegisterOptions,
}

/// A fully resolved call, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Registered name of the selected command.
    pub name: String,
    pub function: Function,
    pub kwargs: Kwargs,
}

impl Invocation {
    pub fn call(self) -> std::result::Result<Value, CallError> {
        self.function.call(self.kwargs)
    }
}

/// Picks alternatives from `--{discriminator} name` or `--{discriminator}=name`.
///
/// The last occurrence wins; nothing after `--` is considered.
struct ArgvSelector<'a> {
    argv: &'a [String],
}

impl Selector for ArgvSelector<'_> {
    fn selected(&self, discriminator: &str) -> Option<String> {
        let flag = format!("--{discriminator}");
        let prefix = format!("{flag}=");
        let mut found = None;
        let mut tokens = self.argv.iter();
        while let Some(token) = tokens.next() {
            if token == "--" {
                break;
            }
            if *token == flag {
                if let Some(value) = tokens.next() {
                    found = Some(value.clone());
                }
            } else if let Some(value) = token.strip_prefix(&prefix) {
                found = Some(value.to_string());
            }
        }
        found
    }
}

/// A set of registered callables exposed as one command-line program.
///
/// # Examples
///
/// ```
/// use argslot::App;
/// use argslot_core::{Annotation, Function, Param, Value};
///
/// let mut app = App::new();
/// app.register(
///     Function::builder("add")
///         .param(Param::new("a").with_type(Annotation::int()))
///         .param(Param::new("b").with_type(Annotation::int()).with_default(1))
///         .build(|args| Ok(Value::Int(args.int("a")? + args.int("b")?))),
/// )
/// .unwrap();
///
/// assert_eq!(app.run(["--a", "41"]).unwrap(), Value::Int(42));
/// ```
#[derive(Debug, Clone, Default)]
pub struct App {
    config: AppConfig,
    commands: Vec<Registration>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            commands: Vec::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registered command names, in registration order.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|r| r.name.as_str()).collect()
    }

    /// Registers `function` under its own name and hands it back unchanged.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::Duplicate`] if the name is taken,
    /// [`RegistrationError::Reserved`] for `help`, or
    /// [`RegistrationError::Invalid`] if the descriptor is malformed.
    pub fn register(&mut self, function: Function) -> std::result::Result<Function, RegistrationError> {
        let name = function.name().to_string();
        self.register_as(name, function, RegisterOptions::default())
    }

    /// Registers `function` under `name` with the given options.
    pub fn register_as(
        &mut self,
        name: impl Into<String>,
        function: Function,
        options: RegisterOptions,
    ) -> std::result::Result<Function, RegistrationError> {
        let name = name.into();
        if name == RESERVED_COMMAND {
            return Err(RegistrationError::Reserved(name));
        }
        if self.commands.iter().any(|r| r.name == name) {
            return Err(RegistrationError::Duplicate(name));
        }
        let errors = validate_function(&function);
        if !errors.is_empty() {
            return Err(RegistrationError::Invalid(errors));
        }

        debug!(command = %name, function = function.name(), ?options, "Registered command");
        self.commands.push(Registration {
            name,
            function: function.clone(),
            options,
        });
        Ok(function)
    }

    /// Parses `argv` (without the program name) into a ready-to-run call.
    ///
    /// # Errors
    ///
    /// [`AppError::Engine`] for parse failures and help or version requests;
    /// [`AppError::Compile`] for malformed alternatives. Other variants are
    /// internal failures.
    pub fn resolve<I, S>(&self, argv: I) -> Result<Invocation>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let (registration, rest) = self.select(&argv)?;
        let schema = self.compile_schema(registration, rest)?;

        let mut engine = ClapEngine::from_command(self.command_for(registration));
        register_schema(&mut engine, &schema)?;
        let parsed = engine.parse(rest)?;

        let keep_extras = registration.options.keep_extras || self.config.keep_extras;
        let kwargs = reconstruct(&parsed, &schema, keep_extras)?;
        info!(
            command = %registration.name,
            arguments = kwargs.len(),
            keep_extras,
            "Resolved invocation"
        );
        Ok(Invocation {
            name: registration.name.clone(),
            function: registration.function.clone(),
            kwargs,
        })
    }

    /// Parses `argv` and invokes the selected function.
    pub fn run<I, S>(&self, argv: I) -> Result<Value>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let invocation = self.resolve(argv)?;
        Ok(invocation.call()?)
    }

    /// Renders the schema `argv` would be parsed against, without parsing it.
    pub fn describe<I, S>(&self, argv: I, format: OutputFormat) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let (registration, rest) = self.select(&argv)?;
        let schema = self.compile_schema(registration, rest)?;
        format_schema(&schema, format).map_err(AppError::Output)
    }

    fn select<'a>(&self, argv: &'a [String]) -> Result<(&Registration, &'a [String])> {
        match self.commands.as_slice() {
            [] => Err(AppError::NothingRegistered),
            [only] => Ok((only, argv)),
            commands => {
                let chosen = argv
                    .first()
                    .and_then(|first| commands.iter().find(|r| &r.name == first));
                match chosen {
                    Some(registration) => Ok((registration, &argv[1..])),
                    None => Err(self.dispatch_error(argv)),
                }
            }
        }
    }

    fn compile_schema(&self, registration: &Registration, argv: &[String]) -> Result<Schema> {
        let selector = ArgvSelector { argv };
        let schema = compile(&registration.function, &selector)?;
        let errors = validate_schema(&schema);
        if !errors.is_empty() {
            return Err(AppError::Schema(errors));
        }
        Ok(schema)
    }

    fn base_command(&self, name: String) -> Command {
        let mut command = Command::new(name);
        if let Some(about) = &self.config.about {
            command = command.about(about.clone());
        }
        if let Some(version) = &self.config.version {
            command = command.version(version.clone());
        }
        command
    }

    fn command_for(&self, registration: &Registration) -> Command {
        if self.commands.len() == 1 {
            return self.base_command(self.config.name.clone());
        }
        self.base_command(registration.name.clone())
            .bin_name(format!("{} {}", self.config.name, registration.name))
    }

    /// Lets clap report a missing or unknown subcommand, or print the
    /// top-level help and version.
    fn dispatch_error(&self, argv: &[String]) -> AppError {
        let dispatcher = self
            .commands
            .iter()
            .fold(self.base_command(self.config.name.clone()), |cmd, r| {
                cmd.subcommand(Command::new(r.name.clone()))
            })
            .no_binary_name(true)
            .subcommand_required(true)
            .arg_required_else_help(true);
        match dispatcher.try_get_matches_from(argv) {
            Err(err) => AppError::Engine(err),
            Ok(_) => AppError::Engine(clap::Error::raw(
                ErrorKind::InvalidSubcommand,
                "unrecognized subcommand\n",
            )),
        }
    }
}
