//! CLI argument definitions for the admin console.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "admin-console",
    version,
    about = "Browse and edit the objects of a metadata-driven admin backend",
    long_about = "Browse and edit the objects of a metadata-driven admin backend.\n\n\
                  The backend publishes its objects, fields and actions at ./admin.json;\n\
                  every command is driven by that metadata."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: the platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Admin backend URL (overrides the settings file).
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds (overrides the settings file).
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the objects published by the backend.
    Objects,

    /// Show one page of records of an object.
    List(ListArgs),

    /// Show every field of one record.
    Show(RowArgs),

    /// Create a record.
    Create(CreateArgs),

    /// Change fields of one record.
    Edit(EditArgs),

    /// Run an object action over selected records.
    Action(ActionArgs),

    /// Delete one record.
    Delete(RowArgs),

    /// Print the settings file path and the effective settings.
    Config(ConfigArgs),
}

/// Which page of an object to look at.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Object name (case-insensitive) or path.
    #[arg(value_name = "OBJECT")]
    pub object: String,

    /// Search keyword.
    #[arg(long = "keyword", short = 'k')]
    pub keyword: Option<String>,

    /// One-based page number.
    #[arg(long = "page", default_value_t = 1)]
    pub page: usize,

    /// Sort by a field; prefix with `-` for descending. Repeatable.
    #[arg(long = "order", value_name = "FIELD", allow_hyphen_values = true)]
    pub order: Vec<String>,

    /// Filter such as `age>=30`, `name~bob` or `group=Admins,Staff`. Repeatable.
    #[arg(long = "filter", value_name = "EXPR")]
    pub filter: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Print the raw records as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct RowArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// One-based row number on the page, as printed by `list`.
    #[arg(long = "row", value_name = "N")]
    pub row: usize,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Object name (case-insensitive) or path.
    #[arg(value_name = "OBJECT")]
    pub object: String,

    /// Field value as `name=value`. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    #[command(flatten)]
    pub row: RowArgs,

    /// Field value as `name=value`. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,
}

#[derive(Args)]
pub struct ActionArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Action name as published by the backend.
    #[arg(value_name = "ACTION")]
    pub action: String,

    /// One-based row numbers to run the action on.
    #[arg(long = "rows", value_name = "N", value_delimiter = ',', required_unless_present = "all")]
    pub rows: Vec<usize>,

    /// Run the action on every row of the page.
    #[arg(long = "all", conflicts_with = "rows")]
    pub all: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the effective settings to the settings file.
    #[arg(long = "init")]
    pub init: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
