//! CLI argument definitions for the fire-history builder.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "fras",
    version,
    about = "FRAS fire history builder - clean and merge state fire layers",
    long_about = "Clean, filter, and merge state fire-history layers into the\n\
                  unified FRAS/BREPS dataset.\n\n\
                  The workspace is a JSON file of named feature collections; input\n\
                  layers use their standard dataset names."
)]
pub struct Cli {
    /// Path to the JSON workspace holding the input layers.
    #[arg(value_name = "WORKSPACE")]
    pub workspace: PathBuf,

    /// Which build to run.
    #[arg(long = "variant", value_enum, default_value = "persistent")]
    pub variant: VariantArg,

    /// Store null and warn for unparseable dates instead of failing the stage.
    #[arg(long = "lenient-dates")]
    pub lenient_dates: bool,

    /// Write the finished workspace to a different path.
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI build-variant choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum VariantArg {
    Persistent,
    Transient,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
