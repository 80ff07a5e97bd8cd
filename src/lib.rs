//! # esoplay
//!
//! A real-time supervisor that drives an interpreter (typically for an
//! esoteric language) as a subordinate process. Every tick it samples the
//! keyboard, sends the interpreter one line of the form
//! `K=<key>T=<elapsed-ms>`, and relays whatever the interpreter printed back
//! to the terminal. The session ends when the output stream carries the
//! in-band sentinel `>>ESOPLAY.TERMINATE<<`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::process::ExitCode;
//!
//! use esoplay::SupervisorOptions;
//!
//! fn main() -> ExitCode {
//!     // This executable doubles as the bridge process
//!     if let Some(code) = esoplay::bridge::dispatch_if_bridge() {
//!         return code;
//!     }
//!     match play() {
//!         Ok(()) => ExitCode::SUCCESS,
//!         Err(e) => {
//!             eprintln!("{e}");
//!             ExitCode::FAILURE
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn play() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = SupervisorOptions::builder()
//!         .interpreter("bf")
//!         .file("snake.bf")
//!         .ticks_per_second(10)
//!         .build()?;
//!
//!     let termination = esoplay::run(options).await?;
//!     log::info!("session ended: {termination:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Process topology
//!
//! ```text
//! supervisor ──stdin pipe──▶ bridge ─(inherited)─▶ interpreter
//!      ▲                                                │
//!      └──────────────stdout pipe───────────────────────┘
//! ```
//!
//! The bridge is this same executable re-invoked with a hidden subcommand
//! (see [`bridge`]). It launches the interpreter on the pipe ends it was
//! given, writes the sentinel, and exits.
//!
//! Unless [`SupervisorOptions::bridge_program`] names another program, the
//! executable that starts the session must call
//! [`bridge::dispatch_if_bridge`] at the top of `main`. A bridge that skips
//! it fails to connect instead of starting a nested session.
//!
//! ## Custom collaborators
//!
//! [`Supervisor`] is generic over its [`Transport`], [`KeySource`] and
//! terminal sink, so the tick loop can be driven by anything that speaks
//! those traits.

pub mod bridge;
pub mod channel;
pub mod error;
pub mod keyboard;
pub mod message;
pub mod supervisor;
pub mod transport;
pub mod types;

// Re-export main types
pub use error::{EsoplayError, Result};
pub use keyboard::TerminalKeys;
pub use message::{SentinelScanner, TickCodec, TokenCodec};
pub use supervisor::{Supervisor, run};
pub use transport::{InterpreterTransport, KeySource, Transport};
pub use types::{
    Session, SessionState, SupervisorOptions, SupervisorOptionsBuilder, Termination, TickMessage,
};

pub use transport::subprocess::config::{DEFAULT_TICKS_PER_SECOND, SENTINEL};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
