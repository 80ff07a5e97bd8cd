//! Subprocess transport driving the interpreter through a bridge process
//!
//! The supervisor re-invokes its own executable as the bridge, handing it
//! the far ends of the duplex channel as standard input and output. The
//! bridge launches the interpreter on those same streams.

mod command;
pub mod config;
mod lifecycle;
mod reader;
mod transport;

// Re-export public types
pub use command::BridgeCommand;
pub use transport::InterpreterTransport;
