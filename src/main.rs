#![deny(clippy::all, clippy::pedantic)]

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let tokens = std::env::args_os()
        .map(|token| token.to_string_lossy().into_owned())
        .collect::<Vec<_>>();

    #[cfg(windows)]
    let launcher = runnix::windows::WslApiLauncher;
    #[cfg(not(windows))]
    let launcher = runnix::launch::WslExeLauncher;

    runnix::run(&tokens, &launcher)
}
