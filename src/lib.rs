#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use log::{debug, warn};
use std::process::ExitCode;

pub mod cli;
mod error;
pub mod launch;
pub mod path;
#[cfg(windows)]
pub mod windows;

use cli::Options;
pub use error::RunnixError;
use launch::Launcher;

/// Runs one invocation end to end and maps the outcome to the process exit
/// status. `tokens` includes the program name.
#[must_use]
pub fn run<S: AsRef<str>>(tokens: &[S], launcher: &dyn Launcher) -> ExitCode {
    match try_run(tokens, launcher) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            err.report();
            ExitCode::FAILURE
        }
    }
}

pub fn try_run<S: AsRef<str>>(tokens: &[S], launcher: &dyn Launcher) -> Result<(), RunnixError> {
    if matches!(tokens, [_, flag] if matches!(flag.as_ref(), "-h" | "--help")) {
        print_help()?;
        return Ok(());
    }

    let request = cli::parse_tokens(tokens)?;

    let options = match Options::from_tokens(&request.options) {
        Ok(options) => options,
        Err(err) if err.use_stderr() => return Err(err.into()),
        Err(err) => {
            // -h or --version
            err.print()?;
            return Ok(());
        }
    };

    if options.script {
        warn!("-s (treat executable as script) is not supported yet; launching it as is");
    }

    let config = options.launch_config();
    let executable = path::to_subsystem_path(&request.executable_path)?;
    let command = request.command_line(&executable);
    debug!("running `{command}` in {}", config.distribution);

    launcher
        .launch(&config, &command)
        .map_err(|source| RunnixError::Launch { command, source })
}

fn print_help() -> std::io::Result<()> {
    use clap::CommandFactory;
    Options::command().print_help()
}
