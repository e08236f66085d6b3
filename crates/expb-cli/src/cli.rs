//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "expb",
    version,
    about = "Inspect, check and resolve experiment builder projects",
    long_about = "Inspect component schemas, check parameter bindings against schemas and \
                  participant data, and resolve trial configuration per participant."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

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

    /// Allow participant cell values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List registered component types.
    Components(SchemaArgs),

    /// List the parameters of a component type.
    Params {
        #[arg(value_name = "TYPE")]
        component_type: String,

        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// List the point-grid presets.
    Presets,

    /// Print the resolved configuration of every trial for one participant.
    Resolve(ResolveArgs),

    /// Print presentation order sequences derived from data columns.
    Order(OrderArgs),

    /// Check a project's bindings against schemas and participant data.
    Check(CheckArgs),
}

#[derive(Args, Clone, Default)]
pub struct SchemaArgs {
    /// Load component metadata from `<DIR>/<type>.json` instead of the built-in set.
    #[arg(long = "metadata-dir", value_name = "DIR")]
    pub metadata_dir: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct BindingArgs {
    /// Accept literals whose shape does not match the declared parameter type.
    #[arg(long = "lenient")]
    pub lenient: bool,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Participant data (CSV or JSON rows).
    #[arg(long = "data", value_name = "FILE")]
    pub data: PathBuf,

    /// Zero-based participant row.
    #[arg(long = "row", value_name = "N", default_value_t = 0)]
    pub row: usize,

    #[command(flatten)]
    pub binding: BindingArgs,
}

#[derive(Args)]
pub struct OrderArgs {
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Column holding 1-based trial positions; repeat for several columns.
    #[arg(long = "column", value_name = "COLUMN", required = true)]
    pub columns: Vec<String>,

    /// Print the sequences as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Participant data to check csv bindings and order columns against.
    #[arg(long = "data", value_name = "FILE")]
    pub data: Option<PathBuf>,

    #[command(flatten)]
    pub binding: BindingArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
