//! Wire formats spoken with the interpreter and the terminal
//!
//! - [`codec`] - tick message encoder and keyboard token decoder
//! - [`sentinel`] - streaming detection and removal of the termination sentinel

pub mod codec;
pub mod sentinel;

pub use codec::{TickCodec, TokenCodec};
pub use sentinel::{Scan, SentinelScanner};
