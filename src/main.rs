//! sitepush - build, preview and publish a generated static blog.

mod build;
mod cli;
mod config;
mod deploy;
mod logger;
mod pipeline;
mod serve;
mod task;
mod utils;

use anyhow::Result;
use build::ExternalGenerator;
use clap::Parser;
use cli::Cli;
use config::SiteConfig;
use pipeline::{Pipeline, PipelineError};
use std::process::ExitCode;
use utils::{date::SystemClock, git::GitCli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            logger::error(&*err);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            logger::error(&err);
            ExitCode::from(exit_status(err.exit_code()))
        }
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let config = SiteConfig::load(cli)?;
    config.validate(&cli.resolved_command())?;
    Ok(config)
}

/// Run the tasks behind the selected command.
fn run(cli: &Cli, config: &SiteConfig) -> Result<(), PipelineError> {
    let mut pipeline = Pipeline::new(
        ExternalGenerator::from_config(config),
        GitCli::from_config(config),
        SystemClock,
        config.deploy.message.as_str(),
    );
    pipeline.run(cli.resolved_command().targets())
}

/// Clamp an external exit code into the range a process can report.
///
/// Anything that does not fit, or would read as success, becomes 1.
fn exit_status(code: i32) -> u8 {
    u8::try_from(code).ok().filter(|&code| code != 0).unwrap_or(1)
}
