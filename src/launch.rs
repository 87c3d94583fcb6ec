//! The seam between argument handling and whatever actually starts the
//! command inside WSL.

use crate::cli::DEFAULT_DISTRIBUTION;
use log::debug;
use std::process::Command;
use thiserror::Error;

/// Where and how a command is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Unique distribution name, e.g. `Ubuntu` or `Fabrikam.Distro.10.01`.
    pub distribution: String,
    /// Start in the caller's working directory instead of the user's home.
    pub use_current_working_directory: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            distribution: DEFAULT_DISTRIBUTION.to_owned(),
            use_current_working_directory: false,
        }
    }
}

/// A non-success completion of the launch primitive.
#[derive(Debug, Error)]
#[error("{reason}{}", .code.map(|code| format!(" (code {code:#x})")).unwrap_or_default())]
pub struct LaunchFailure {
    /// Platform-defined completion code, when the primitive produced one.
    pub code: Option<i32>,
    pub reason: String,
}

impl From<anyhow::Error> for LaunchFailure {
    fn from(err: anyhow::Error) -> Self {
        Self {
            code: None,
            reason: format!("{err:#}"),
        }
    }
}

/// Starts `command` inside a WSL distribution, forwarding this process's
/// standard streams, and blocks until the primitive reports back.
pub trait Launcher {
    fn launch(&self, config: &LaunchConfig, command: &str) -> Result<(), LaunchFailure>;
}

/// Launches through `wsl.exe`, which is reachable from Windows and from inside
/// WSL through interop.
#[derive(Debug, Clone, Copy, Default)]
pub struct WslExeLauncher;

impl WslExeLauncher {
    #[must_use]
    pub fn command(config: &LaunchConfig, command: &str) -> Command {
        let mut wsl = Command::new("wsl.exe");
        wsl.args(["-d", &config.distribution]);
        if !config.use_current_working_directory {
            wsl.args(["--cd", "~"]);
        }
        wsl.args(["--exec", "sh", "-c", command]);
        wsl
    }
}

/// Exit status `wsl.exe` uses for its own errors (unknown distribution, WSL
/// not installed, ...), as opposed to the launched command's status.
pub const WSL_EXE_LAUNCH_ERROR: i32 = -1;

/// Maps the exit code of `wsl.exe` to a launch outcome. Only `wsl.exe`'s own
/// error status is a failure; the launched command's status is just logged.
pub fn wsl_exe_outcome(code: Option<i32>) -> Result<(), LaunchFailure> {
    match code {
        Some(WSL_EXE_LAUNCH_ERROR) => Err(LaunchFailure {
            code,
            reason: "wsl.exe could not start the command".to_owned(),
        }),
        Some(code) => {
            debug!("command exited with {code}");
            Ok(())
        }
        None => {
            debug!("command was terminated by a signal");
            Ok(())
        }
    }
}

impl Launcher for WslExeLauncher {
    fn launch(&self, config: &LaunchConfig, command: &str) -> Result<(), LaunchFailure> {
        let mut wsl = Self::command(config, command);
        debug!("spawning {wsl:?}");

        let status = wsl.status().map_err(|err| LaunchFailure {
            code: err.raw_os_error(),
            reason: format!("failed to execute wsl.exe: {err}"),
        })?;

        wsl_exe_outcome(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args(command: &Command) -> Vec<&OsStr> {
        command.get_args().collect()
    }

    #[test]
    fn wsl_exe_starts_in_home_by_default() {
        let command = WslExeLauncher::command(&LaunchConfig::default(), "/mnt/c/a -v");
        assert_eq!(command.get_program(), "wsl.exe");
        assert_eq!(
            args(&command),
            ["-d", "Ubuntu", "--cd", "~", "--exec", "sh", "-c", "/mnt/c/a -v"]
        );
    }

    #[test]
    fn wsl_exe_honours_config() {
        let config = LaunchConfig {
            distribution: "Debian".to_owned(),
            use_current_working_directory: true,
        };
        let command = WslExeLauncher::command(&config, "/mnt/d/x");
        assert_eq!(args(&command), ["-d", "Debian", "--exec", "sh", "-c", "/mnt/d/x"]);
    }

    #[test]
    fn command_exit_status_is_not_a_launch_failure() {
        assert!(wsl_exe_outcome(Some(0)).is_ok());
        assert!(wsl_exe_outcome(Some(1)).is_ok());
        assert!(wsl_exe_outcome(Some(127)).is_ok());
        assert!(wsl_exe_outcome(None).is_ok());
    }

    #[test]
    fn wsl_exe_own_error_is_a_launch_failure() {
        let failure = wsl_exe_outcome(Some(WSL_EXE_LAUNCH_ERROR)).unwrap_err();
        assert_eq!(failure.code, Some(-1));
        assert_eq!(failure.reason, "wsl.exe could not start the command");
    }

    #[test]
    fn failure_message_includes_code() {
        let failure = LaunchFailure {
            code: Some(-2_147_024_894),
            reason: "The system cannot find the file specified.".to_owned(),
        };
        assert_eq!(
            failure.to_string(),
            "The system cannot find the file specified. (code 0x80070002)"
        );

        let failure = LaunchFailure::from(anyhow::anyhow!("wslapi.dll is not available"));
        assert_eq!(failure.code, None);
        assert_eq!(failure.to_string(), "wslapi.dll is not available");
    }
}
