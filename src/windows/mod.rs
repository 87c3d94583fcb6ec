//! Launching through `WslLaunch` from `wslapi.dll`.

use crate::launch::{LaunchConfig, LaunchFailure, Launcher};
use anyhow::{Context, anyhow};
use log::debug;
use std::{ffi::OsStr, os::windows::ffi::OsStrExt};
use windows::{
    Win32::{
        Foundation::{GetLastError, HANDLE, HMODULE, WAIT_FAILED},
        System::{
            Console::{GetStdHandle, STD_ERROR_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE},
            LibraryLoader::{FreeLibrary, GetProcAddress, LOAD_LIBRARY_SEARCH_SYSTEM32, LoadLibraryExW},
            Threading::{GetExitCodeProcess, INFINITE, WaitForSingleObject},
        },
    },
    core::{Free, HRESULT, PCWSTR, s, w},
};

/// Releases the wrapped resource exactly once, on drop.
pub struct WindowsGuard<T: Free>(pub T);

impl<T: Free> Drop for WindowsGuard<T> {
    fn drop(&mut self) {
        unsafe { self.0.free() };
    }
}

struct LibraryGuard(HMODULE);

impl Drop for LibraryGuard {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            let _ = unsafe { FreeLibrary(self.0) };
        }
    }
}

// From wslapi.h; `use_current_working_directory` is a Win32 BOOL.
type WslLaunchFn = unsafe extern "system" fn(
    distribution_name: PCWSTR,
    command: PCWSTR,
    use_current_working_directory: i32,
    std_in: HANDLE,
    std_out: HANDLE,
    std_err: HANDLE,
    process: *mut HANDLE,
) -> HRESULT;

struct WslApi {
    // Keeps `launch` valid.
    _library: LibraryGuard,
    launch: WslLaunchFn,
}

impl WslApi {
    fn load() -> anyhow::Result<Self> {
        let library = unsafe { LoadLibraryExW(w!("wslapi"), None, LOAD_LIBRARY_SEARCH_SYSTEM32) }
            .map(LibraryGuard)
            .context("wslapi.dll is not available (is WSL installed?)")?;

        let proc = unsafe { GetProcAddress(library.0, s!("WslLaunch")) }
            .ok_or_else(|| anyhow!("wslapi.dll does not export WslLaunch"))?;

        // SAFETY: `WslLaunch` is declared with exactly this signature.
        let launch = unsafe {
            std::mem::transmute::<unsafe extern "system" fn() -> isize, WslLaunchFn>(proc)
        };

        Ok(Self {
            _library: library,
            launch,
        })
    }
}

/// The caller's stdin, stdout and stderr. These are borrowed, never closed.
fn std_handles() -> anyhow::Result<[HANDLE; 3]> {
    let handle = |which, name| {
        unsafe { GetStdHandle(which) }.with_context(|| format!("GetStdHandle({name}) failed"))
    };
    Ok([
        handle(STD_INPUT_HANDLE, "stdin")?,
        handle(STD_OUTPUT_HANDLE, "stdout")?,
        handle(STD_ERROR_HANDLE, "stderr")?,
    ])
}

fn to_wide(text: &str) -> Vec<u16> {
    OsStr::new(text).encode_wide().chain(Some(0)).collect()
}

/// Calls `WslLaunch` and waits for the started process to exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct WslApiLauncher;

impl Launcher for WslApiLauncher {
    fn launch(&self, config: &LaunchConfig, command: &str) -> Result<(), LaunchFailure> {
        let api = WslApi::load()?;
        let [std_in, std_out, std_err] = std_handles()?;

        let distribution = to_wide(&config.distribution);
        let wide_command = to_wide(command);
        let mut process = WindowsGuard(HANDLE::default());

        let result = unsafe {
            (api.launch)(
                PCWSTR(distribution.as_ptr()),
                PCWSTR(wide_command.as_ptr()),
                i32::from(config.use_current_working_directory),
                std_in,
                std_out,
                std_err,
                &raw mut process.0,
            )
        };

        if result.is_err() {
            return Err(LaunchFailure {
                code: Some(result.0),
                reason: result.message(),
            });
        }

        if process.0.is_invalid() {
            return Ok(());
        }

        if unsafe { WaitForSingleObject(process.0, INFINITE) } == WAIT_FAILED {
            return Err(LaunchFailure::from(anyhow!(
                "failed to wait for `{command}`: {}",
                unsafe { GetLastError() }.to_hresult().message()
            )));
        }

        let mut exit_code = 0u32;
        if unsafe { GetExitCodeProcess(process.0, &raw mut exit_code) }.is_ok() {
            debug!("`{command}` exited with {exit_code}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_strings_are_nul_terminated() {
        assert_eq!(to_wide("Ubuntu"), [85, 98, 117, 110, 116, 117, 0]);
        assert_eq!(to_wide(""), [0]);
    }
}
