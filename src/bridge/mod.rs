//! The bridge process
//!
//! Runs when the binary is invoked with the hidden bridge subcommand. Its
//! standard input and output are already the far ends of the duplex channel.
//! It launches the interpreter on those inherited streams, writes the
//! termination sentinel to the shared output pipe without waiting for the
//! interpreter, and exits.
//!
//! If the interpreter cannot be launched no sentinel is written and the
//! bridge exits with [`LAUNCH_FAILED_EXIT_CODE`].
//!
//! Any program that starts sessions without an explicit
//! [`bridge_program`](crate::SupervisorOptions::bridge_program) is re-invoked
//! as its own bridge, so its `main` must hand over to [`dispatch_if_bridge`]
//! before doing anything else.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};

use clap::Parser;

use crate::error::{EsoplayError, Result};
use crate::transport::subprocess::config::{
    BRIDGE_ENV, BRIDGE_SUBCOMMAND, LAUNCH_FAILED_EXIT_CODE, SENTINEL,
};

/// Exit status for a malformed bridge invocation
const USAGE_EXIT_CODE: i32 = 2;

/// Arguments of the bridge invocation
#[derive(Parser, Debug)]
#[command(name = BRIDGE_SUBCOMMAND)]
struct BridgeArgs {
    interpreter: String,
    file: PathBuf,
}

/// Run as the bridge if this process was started as one
///
/// Returns the exit code the process must exit with, or `None` when the
/// process was not started as a bridge.
///
/// ```no_run
/// fn main() -> std::process::ExitCode {
///     if let Some(code) = esoplay::bridge::dispatch_if_bridge() {
///         return code;
///     }
///     // ...start sessions as usual
///     std::process::ExitCode::SUCCESS
/// }
/// ```
#[must_use]
pub fn dispatch_if_bridge() -> Option<ExitCode> {
    let code = dispatch_args(std::env::args_os())?;
    Some(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

/// Run the bridge if `args` (program name first) are a bridge invocation
///
/// Returns the bridge's exit status, or `None` for any other invocation.
pub fn dispatch_args<I, T>(args: I) -> Option<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::<OsString>::into).skip(1).peekable();
    if args.peek().is_none_or(|arg| arg != BRIDGE_SUBCOMMAND) {
        return None;
    }

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    match BridgeArgs::try_parse_from(args) {
        Ok(bridge) => Some(run(&bridge.interpreter, &bridge.file)),
        Err(e) => {
            let _ = e.print();
            Some(USAGE_EXIT_CODE)
        }
    }
}

/// Resolve the interpreter the way a shell would
///
/// # Errors
/// Returns `EsoplayError::LaunchFailed` if the interpreter is not an executable on `PATH`
pub fn resolve_interpreter(interpreter: &str) -> Result<PathBuf> {
    which::which(interpreter).map_err(|e| {
        log::error!("cannot find interpreter {interpreter}: {e}");
        EsoplayError::launch_failed(interpreter, LAUNCH_FAILED_EXIT_CODE)
    })
}

/// Launch the interpreter on the bridge's own standard streams
///
/// The child is not waited for; it outlives the bridge.
///
/// # Errors
/// Returns `EsoplayError::LaunchFailed` if the interpreter cannot be found or spawned
pub fn launch_interpreter(interpreter: &str, file: &Path) -> Result<u32> {
    let program = resolve_interpreter(interpreter)?;
    let child = Command::new(&program)
        .arg(file)
        .env_remove(BRIDGE_ENV)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| {
            log::error!("cannot launch {}: {e}", program.display());
            EsoplayError::launch_failed(interpreter, LAUNCH_FAILED_EXIT_CODE)
        })?;
    Ok(child.id())
}

/// Write the sentinel to `out`
///
/// # Errors
/// Returns error if the write or flush fails
pub fn emit_sentinel<W: Write>(out: &mut W) -> Result<()> {
    out.write_all(SENTINEL.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Body of the bridge process; returns its exit status
pub fn run(interpreter: &str, file: &Path) -> i32 {
    let pid = match launch_interpreter(interpreter, file) {
        Ok(pid) => pid,
        Err(EsoplayError::LaunchFailed { code, .. }) => return code,
        Err(e) => {
            log::error!("{e}");
            return LAUNCH_FAILED_EXIT_CODE;
        }
    };
    log::debug!("interpreter {interpreter} running as pid {pid}");

    match emit_sentinel(&mut std::io::stdout().lock()) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("cannot write sentinel: {e}");
            1
        }
    }
}
