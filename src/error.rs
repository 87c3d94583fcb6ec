use crate::{cli::Options, launch::LaunchFailure};
use clap::CommandFactory;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnixError {
    /// No executable path was supplied.
    #[error("too few arguments")]
    Usage,

    /// The executable path has no `<letter>:` drive prefix.
    #[error("`{0}` is not a drive-letter path (expected e.g. C:\\dir\\file)")]
    InvalidPath(String),

    /// The tokens collected after `--options` were rejected.
    #[error(transparent)]
    Options(#[from] clap::Error),

    /// The launch primitive reported a failure.
    #[error("couldn't run {command}. Error: {source}")]
    Launch {
        command: String,
        #[source]
        source: LaunchFailure,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RunnixError {
    /// Prints the error the way a user of the tool expects to see it.
    pub fn report(&self) {
        let _ = self
            .report_to(&mut io::stdout().lock(), &mut io::stderr().lock())
            .inspect_err(|err| eprintln!("runnix: failed to report `{self}` (error={err})"));
    }

    /// Usage errors go to `out` followed by the help text, everything else to
    /// `err_out`.
    pub fn report_to(&self, out: &mut impl Write, err_out: &mut impl Write) -> io::Result<()> {
        match self {
            RunnixError::Usage => {
                writeln!(out, "runnix: {self}")?;
                Options::command().write_help(out)
            }
            RunnixError::Options(err) => write!(err_out, "{err}"),
            _ => writeln!(err_out, "runnix: {self}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn usage_goes_to_stdout_with_help() {
        let (mut out, mut err_out) = (Vec::new(), Vec::new());
        RunnixError::Usage.report_to(&mut out, &mut err_out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("runnix: too few arguments\n"));
        assert!(out.contains("--args1"));
        assert!(err_out.is_empty());
    }

    #[test]
    fn launch_failure_goes_to_stderr() {
        let error = RunnixError::Launch {
            command: "/mnt/c/a".to_owned(),
            source: LaunchFailure {
                code: Some(2),
                reason: "failed to execute wsl.exe".to_owned(),
            },
        };
        let (mut out, mut err_out) = (Vec::new(), Vec::new());
        error.report_to(&mut out, &mut err_out).unwrap();

        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err_out).unwrap(),
            "runnix: couldn't run /mnt/c/a. Error: failed to execute wsl.exe (code 0x2)\n"
        );
    }

    #[test]
    fn write_failures_are_returned() {
        let err = RunnixError::Usage
            .report_to(&mut BrokenPipe, &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let err = RunnixError::InvalidPath("x".to_owned())
            .report_to(&mut Vec::new(), &mut BrokenPipe)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
