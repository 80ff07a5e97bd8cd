//! Configuration constants for the subprocess transport

/// In-band marker that ends the session
pub const SENTINEL: &str = ">>ESOPLAY.TERMINATE<<";

/// Default tick rate of the polling loop
pub const DEFAULT_TICKS_PER_SECOND: u32 = 10;

/// Default size of one drain read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Upper bound on bytes drained in a single tick
///
/// Matches the default Linux pipe capacity so a fast writer cannot keep
/// one tick draining forever.
pub const MAX_DRAIN_BYTES_PER_TICK: usize = 64 * 1024;

/// Hidden subcommand that runs the binary as the bridge
pub const BRIDGE_SUBCOMMAND: &str = "__bridge";

/// Environment variable marking a process started as the bridge
///
/// Set on the bridge and removed again for the interpreter.
pub const BRIDGE_ENV: &str = "ESOPLAY_BRIDGE";

/// Bridge exit status meaning the interpreter could not be launched
pub const LAUNCH_FAILED_EXIT_CODE: i32 = 127;
