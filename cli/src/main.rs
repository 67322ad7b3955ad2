use std::process::ExitCode;

use argslot::{App, AppConfig, AppError, OutputFormat, RegisterOptions, format_value};
use argslot_core::{Annotation, CallError, Function, Param, PathOptions, Value};
use clap::ValueEnum;
use tracing::{debug, error};

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Path of a YAML [`AppConfig`] overriding the built-in one.
const CONFIG_ENV: &str = "ARGSLOT_CONFIG";

/// When set to `json`, `yaml` or `table`, print the compiled schema instead of running.
const DESCRIBE_ENV: &str = "ARGSLOT_DESCRIBE";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    match run(argv) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        // Help, version and parse errors keep clap's output and exit codes.
        Err(AppError::Engine(err)) => err.exit(),
        Err(err) => {
            if err.is_internal() {
                error!(error = %err, "Internal failure");
            }
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(argv: Vec<String>) -> Result<String, AppError> {
    let config = load_config()?;
    let app = build_app(config)?;

    match describe_format()? {
        Some(format) => app.describe(argv, format),
        None => {
            let value = app.run(argv)?;
            format_value(&value, OutputFormat::Json).map_err(AppError::Output)
        }
    }
}

fn load_config() -> Result<AppConfig, AppError> {
    let Some(path) = std::env::var_os(CONFIG_ENV) else {
        return Ok(AppConfig::new("argslot-demo")
            .with_about("Demonstration of signature-driven command lines")
            .with_version(PACKAGE_VERSION));
    };
    debug!(path = ?path, "Loading configuration");
    Ok(AppConfig::load(&path)?)
}

fn describe_format() -> Result<Option<OutputFormat>, AppError> {
    match std::env::var(DESCRIBE_ENV) {
        Ok(raw) => OutputFormat::from_str(&raw, true)
            .map(Some)
            .map_err(|e| AppError::Output(format!("{DESCRIBE_ENV}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn build_app(config: AppConfig) -> Result<App, AppError> {
    let mut app = App::with_config(config);
    app.register(scalars())?;
    app.register(shapes())?;
    app.register(train())?;
    app.register(workdir())?;
    app.register_as("inspect", inspect(), RegisterOptions::new().keep_extras())?;
    Ok(app)
}

// ---------------------------------------------------------------------------
// Demonstration commands
// ---------------------------------------------------------------------------

/// Echoes its scalar arguments.
fn scalars() -> Function {
    Function::builder("scalars")
        .param(Param::new("a").with_type(Annotation::int()).with_default(1))
        .param(Param::new("b").with_type(Annotation::float()).with_default(2.0))
        .param(Param::new("d").with_type(Annotation::bool()).with_default(true))
        .param(Param::new("e").with_type(Annotation::str()).with_default("x"))
        .build(|args| Ok(Value::Map(args.into_kwargs())))
}

/// Echoes one argument of every composite shape.
fn shapes() -> Function {
    Function::builder("shapes")
        .param(
            Param::new("count")
                .with_type(Annotation::optional(Annotation::int()))
                .with_default(Value::None),
        )
        .param(Param::new("label").with_default(Value::None))
        .param(
            Param::new("ids")
                .with_type(Annotation::list(Annotation::int()))
                .with_default(vec![6, 7]),
        )
        .param(
            Param::new("size")
                .with_type(Annotation::homo_tuple(Annotation::float()))
                .with_default(Value::Tuple(vec![Value::Float(1.0), Value::Float(1.0)])),
        )
        .param(
            Param::new("key")
                .with_type(Annotation::union([Annotation::int(), Annotation::str()]))
                .with_default(0),
        )
        .param(
            Param::new("mode")
                .with_type(Annotation::values(["fast", "slow"]))
                .with_default("fast"),
        )
        .build(|args| Ok(Value::Map(args.into_kwargs())))
}

fn lstm() -> Function {
    Function::builder("lstm")
        .param(Param::new("layers").with_type(Annotation::int()).with_default(1))
        .param(Param::new("dropout").with_type(Annotation::float()).with_default(0.0))
        .build(|args| {
            Ok(Value::from(format!(
                "lstm(layers={}, dropout={})",
                args.int("layers")?,
                args.float("dropout")?
            )))
        })
}

fn gru() -> Function {
    Function::builder("gru")
        .param(Param::new("hidden").with_type(Annotation::int()).with_default(32))
        .build(|args| Ok(Value::from(format!("gru(hidden={})", args.int("hidden")?))))
}

fn encoder() -> Function {
    Function::builder("encoder")
        .param(Param::new("cell").with_type(Annotation::factories([lstm(), gru()])))
        .param(Param::new("dim").with_type(Annotation::int()).with_default(64))
        .build(|args| {
            let cell = args.partial("cell")?.call()?;
            Ok(Value::from(format!("encoder(dim={}, cell={cell})", args.int("dim")?)))
        })
}

fn adam() -> Function {
    Function::builder("adam")
        .param(Param::new("lr").with_type(Annotation::float()).with_default(0.001))
        .build(|args| Ok(Value::from(format!("adam(lr={})", args.float("lr")?))))
}

fn sgd() -> Function {
    Function::builder("sgd")
        .param(Param::new("lr").with_type(Annotation::float()).with_default(0.1))
        .param(Param::new("momentum").with_type(Annotation::float()).with_default(0.9))
        .build(|args| {
            Ok(Value::from(format!(
                "sgd(lr={}, momentum={})",
                args.float("lr")?,
                args.float("momentum")?
            )))
        })
}

/// Builds a nested model and optimizer from factory parameters.
fn train() -> Function {
    Function::builder("train")
        .param(Param::new("model").with_type(Annotation::factory(encoder())))
        .param(
            Param::new("optimizer")
                .with_type(Annotation::factories([adam(), sgd()]))
                .with_default("sgd"),
        )
        .param(Param::new("epochs").with_type(Annotation::int()).with_default(10))
        .build(|args| {
            let epochs = args.int("epochs")?;
            if epochs < 0 {
                return Err(CallError::failed(format!("epochs must be non-negative, got {epochs}")));
            }
            let model = args.partial("model")?.call()?;
            let optimizer = args.partial("optimizer")?.call()?;
            Ok(Value::from(format!(
                "train(epochs={epochs}, model={model}, optimizer={optimizer})"
            )))
        })
}

/// Returns the flat argument bag of a nested call.
fn inspect() -> Function {
    Function::builder("inspect")
        .param(Param::new("model").with_type(Annotation::factory(encoder())))
        .param(
            Param::new("optimizer")
                .with_type(Annotation::factories([adam(), sgd()]))
                .with_default("sgd"),
        )
        .build(|args| Ok(Value::Map(args.into_kwargs())))
}

/// Resolves (and creates) a working directory.
fn workdir() -> Function {
    Function::builder("workdir")
        .param(
            Param::new("path")
                .with_type(Annotation::path(
                    PathOptions::new().expanduser().absolute().mkdir(),
                ))
                .with_default("."),
        )
        .build(|args| Ok(Value::Path(args.path("path")?.to_path_buf())))
}
