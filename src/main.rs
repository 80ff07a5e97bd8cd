// esoplay: execution environment for esoteric languages
//
// Invoked by users as `esoplay <interpreter> <file>`. The same binary is
// re-invoked internally as the bridge process.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use esoplay::{DEFAULT_TICKS_PER_SECOND, SupervisorOptions};

#[derive(Parser, Debug)]
#[command(
    name = "esoplay",
    version,
    about = "Execution environment for esoteric languages",
    after_help = "The interpreter receives one line per tick on its standard input:\n  \
                  K=<key>T=<elapsed-ms>\n\
                  and ends the session by printing >>ESOPLAY.TERMINATE<<."
)]
struct Cli {
    /// Interpreter to call to execute the file.
    #[arg(value_name = "INTERPRETER")]
    interpreter: String,

    /// File to play.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Ticks per second of the input loop.
    #[arg(long = "tps", default_value_t = DEFAULT_TICKS_PER_SECOND, value_parser = clap::value_parser!(u32).range(1..=1000))]
    ticks_per_second: u32,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Some(code) = esoplay::bridge::dispatch_if_bridge() {
        return code;
    }

    let cli = Cli::parse();
    match supervise(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("esoplay: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn supervise(cli: Cli) -> Result<()> {
    let options = SupervisorOptions::builder()
        .interpreter(cli.interpreter)
        .file(cli.file)
        .ticks_per_second(cli.ticks_per_second)
        .build()
        .context("invalid arguments")?;

    let termination = esoplay::run(options).await?;
    log::debug!("session ended: {termination:?}");
    Ok(())
}
