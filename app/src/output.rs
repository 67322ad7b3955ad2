//! Output formatting for compiled schemas and results.

use argslot_core::{FlagKind, Schema, Value};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

/// Formats a compiled schema in the requested output format.
pub fn format_schema(schema: &Schema, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(schema)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(schema).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(schema_to_table(schema)),
    }
}

/// Formats a call result in the requested output format.
pub fn format_value(value: &Value, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(format!("{value}\n")),
    }
}

fn schema_to_table(schema: &Schema) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Function: {}  Flags: {}  Slots: {}\n",
        schema.function.name(),
        schema.flags.len(),
        schema.slots.len()
    ));

    if !schema.flags.is_empty() {
        out.push_str("\nFlags:\n");
        let names: Vec<String> = schema
            .flags
            .iter()
            .map(|f| match &f.metavar {
                Some(metavar) => format!("--{} <{metavar}>", f.name),
                None => format!("--{}", f.name),
            })
            .collect();
        let max_name = names.iter().map(String::len).max().unwrap_or(4);

        for (flag, name) in schema.flags.iter().zip(&names) {
            let mut desc = match &flag.default {
                Some(default) => format!("(default: {default})"),
                None => "(required)".to_string(),
            };
            if let Some(choices) = flag.shape.choices() {
                desc.push_str(&format!(" [{}]", choices.join(", ")));
            }
            if flag.kind == FlagKind::Discriminator && flag.hidden {
                desc.push_str(" hidden");
            }
            out.push_str(&format!("  {:<width$}  {desc}\n", name, width = max_name));
        }
    }

    if !schema.slots.is_empty() {
        out.push_str("\nSlots:\n");
        let max_owner = schema
            .slots
            .iter()
            .map(|s| s.owner.len())
            .max()
            .unwrap_or(4);

        for slot in &schema.slots {
            let params: Vec<&str> = slot.bindings.iter().map(|b| b.param.as_str()).collect();
            out.push_str(&format!(
                "  {:<width$}  {}({})\n",
                slot.owner,
                slot.target.name(),
                params.join(", "),
                width = max_owner
            ));
        }
    }

    out
}
