//! Type definitions for esoplay
//!
//! - [`options`] - Session configuration and its builder
//! - [`session`] - Run-scoped session state and termination reasons
//! - [`tick`] - The per-tick message sent to the interpreter

pub mod options;
pub mod session;
pub mod tick;

// Re-export commonly used types
pub use options::{SupervisorOptions, SupervisorOptionsBuilder};
pub use session::{Session, SessionState, Termination};
pub use tick::TickMessage;
