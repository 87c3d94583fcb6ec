use crate::{RunnixError, launch::LaunchConfig};
use clap::Parser;
use log::debug;

pub const DEFAULT_DISTRIBUTION: &str = "Ubuntu";

const USAGE: &str = "runnix --path <executable> [--args1 <args1>...] [--args2 <args2>...] \
                     [--options <options>...]\n       runnix <executable>";

const ARGUMENTS_HELP: &str = "\
Arguments:
  executable  linux executable or script stored outside WSL
  args1       stuff you can pass to bash such as DISPLAY=:0.0 before executable
  args2       the arguments to be passed to your executable
  options     specific flags to be passed to runnix (listed above)

The last token is never read as an argument, so end the line with -- when
passing args1, args2 or options.";

/// Flags accepted after `--options`.
#[derive(Debug, Parser)]
#[command(
    name = "runnix",
    version,
    about = "Run linux apps stored on Windows drives without opening WSL",
    override_usage = USAGE,
    after_help = ARGUMENTS_HELP
)]
pub struct Options {
    /// Treat [executable] as a script (not supported yet)
    #[arg(short = 's')]
    pub script: bool,

    /// Distribution to run the executable in, e.g. Fabrikam.Distro.10.01 or Ubuntu
    #[arg(short = 'd', value_name = "DISTRIBUTION", default_value = DEFAULT_DISTRIBUTION)]
    pub distribution: String,
}

impl Options {
    pub fn from_tokens(tokens: &[String]) -> Result<Self, clap::Error> {
        Self::try_parse_from(std::iter::once("runnix").chain(tokens.iter().map(String::as_str)))
    }

    #[must_use]
    pub fn launch_config(&self) -> LaunchConfig {
        LaunchConfig {
            distribution: self.distribution.clone(),
            ..LaunchConfig::default()
        }
    }
}

/// Everything needed to launch one executable.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub executable_path: String,
    pub pre_args: Vec<String>,
    pub run_args: Vec<String>,
    pub options: Vec<String>,
}

impl InvocationRequest {
    /// Builds the command line run inside WSL from an already translated
    /// executable path.
    #[must_use]
    pub fn command_line(&self, executable: &str) -> String {
        self.pre_args
            .iter()
            .map(String::as_str)
            .chain(Some(executable))
            .chain(self.run_args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collect {
    /// Stop at the first token not starting with `-`.
    WhileDashed,
    /// Take everything that is left.
    Remaining,
}

#[derive(Debug, Clone, Copy)]
enum Group {
    PreArgs,
    RunArgs,
    Options,
}

// Every rule also stops before the last token, which is never collected.
const SWITCHES: [(&str, Group, Collect); 3] = [
    ("--args1", Group::PreArgs, Collect::WhileDashed),
    ("--args2", Group::RunArgs, Collect::WhileDashed),
    ("--options", Group::Options, Collect::Remaining),
];

/// Splits the raw command line (program name included) into an
/// [`InvocationRequest`].
///
/// `runnix --path <exe> ...` and `runnix <exe>` are both accepted. Switch
/// groups may appear in any order and only their first occurrence counts.
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<InvocationRequest, RunnixError> {
    let tokens = tokens.iter().map(AsRef::<str>::as_ref).collect::<Vec<_>>();

    let executable_path = match tokens.as_slice() {
        [] | [_] | [_, "--path"] => return Err(RunnixError::Usage),
        [_, "--path", executable, ..] | [_, executable, ..] => (*executable).to_owned(),
    };
    if executable_path.is_empty() {
        return Err(RunnixError::Usage);
    }

    let mut request = InvocationRequest {
        executable_path,
        ..InvocationRequest::default()
    };

    for (switch, group, rule) in SWITCHES {
        let Some(index) = tokens.iter().position(|&token| token == switch) else {
            continue;
        };
        debug!("found {switch}");

        let collected = collect(&tokens, index + 1, rule);
        let target = match group {
            Group::PreArgs => &mut request.pre_args,
            Group::RunArgs => &mut request.run_args,
            Group::Options => &mut request.options,
        };
        *target = collected;
    }

    Ok(request)
}

fn collect(tokens: &[&str], start: usize, rule: Collect) -> Vec<String> {
    let end = tokens.len().saturating_sub(1);
    tokens
        .get(start..end)
        .unwrap_or_default()
        .iter()
        .take_while(|token| rule == Collect::Remaining || token.starts_with('-'))
        .map(|&token| token.to_owned())
        .collect()
}
