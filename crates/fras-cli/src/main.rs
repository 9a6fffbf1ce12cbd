//! Fire history builder CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};

mod cli;
mod logging;
mod summary;

use crate::cli::{Cli, LogFormatArg, VariantArg};
use crate::logging::{LogConfig, LogFormat, init_logging};
use crate::summary::print_summary;

use fras_core::{DateErrorPolicy, InputLayers, PipelineOptions, Variant};
use fras_engine::{load_workspace, save_workspace};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    if let Err(error) = run_build(&cli) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run_build(cli: &Cli) -> anyhow::Result<()> {
    let mut workspace = load_workspace(&cli.workspace)?;
    let options = PipelineOptions {
        variant: match cli.variant {
            VariantArg::Persistent => Variant::Persistent,
            VariantArg::Transient => Variant::Transient,
        },
        date_errors: if cli.lenient_dates {
            DateErrorPolicy::NullAndWarn
        } else {
            DateErrorPolicy::Fail
        },
    };
    let result = fras_core::run(&mut workspace, &InputLayers::default(), &options)?;
    print_summary(&result);
    let destination = cli.out.as_deref().unwrap_or(&cli.workspace);
    save_workspace(&workspace, destination)?;
    Ok(())
}

/// Build logging configuration from CLI flags.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        with_ansi: match cli.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
        },
        log_file: cli.log_file.clone(),
    }
}
