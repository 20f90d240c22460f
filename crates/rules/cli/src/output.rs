//! Output formatting utilities

use crate::error::{CliError, CliResult};
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format
    #[default]
    Json,
    /// YAML format
    Yaml,
}

/// Print a vector of items in the specified format
pub fn print_output<T: Serialize + Tabled>(data: Vec<T>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", "No results".dimmed());
            } else {
                println!("{}", Table::new(data));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&data)?),
    }
    Ok(())
}

/// Render a single document in the specified format
///
/// Documents have no tabular form; `Table` renders as pretty JSON.
pub fn render_single<T: Serialize>(data: &T, format: OutputFormat, compact: bool) -> CliResult<String> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Table | OutputFormat::Json if compact => serde_json::to_string(data)?,
        OutputFormat::Table | OutputFormat::Json => serde_json::to_string_pretty(data)?,
    };
    Ok(rendered)
}

/// Render a value as TOML
pub fn render_toml<T: Serialize>(data: &T) -> CliResult<String> {
    toml::to_string_pretty(data).map_err(|e| CliError::Config(e.to_string()))
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}
