//! Supervisor options and configuration
//!
//! This module contains the configuration for a single supervised session,
//! including a builder pattern for easy configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{EsoplayError, Result};
use crate::transport::subprocess::config::{DEFAULT_READ_BUFFER_SIZE, DEFAULT_TICKS_PER_SECOND};

// ============================================================================
// Supervisor Options
// ============================================================================

/// Main options for an esoplay session
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    /// Interpreter executable name or path
    pub interpreter: String,
    /// File handed to the interpreter as its sole argument
    pub file: PathBuf,
    /// Tick rate of the polling loop
    pub ticks_per_second: u32,
    /// Size of the buffer used for each drain read
    pub read_buffer_size: usize,
    /// Program re-invoked as the bridge
    ///
    /// Defaults to the current executable, whose `main` must then call
    /// [`crate::bridge::dispatch_if_bridge`].
    pub bridge_program: Option<PathBuf>,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            interpreter: String::new(),
            file: PathBuf::new(),
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            bridge_program: None,
        }
    }
}

impl SupervisorOptions {
    /// Create a new builder for `SupervisorOptions`
    #[must_use]
    pub fn builder() -> SupervisorOptionsBuilder {
        SupervisorOptionsBuilder::default()
    }

    /// Length of one tick
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second.max(1)
    }

    /// Check that the options describe a runnable session
    ///
    /// # Errors
    /// Returns `EsoplayError::InvalidConfig` for an empty interpreter or file,
    /// a zero tick rate, or a zero read buffer
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.trim().is_empty() {
            return Err(EsoplayError::invalid_config("interpreter must not be empty"));
        }
        if self.file.as_os_str().is_empty() {
            return Err(EsoplayError::invalid_config("file must not be empty"));
        }
        if self.ticks_per_second == 0 {
            return Err(EsoplayError::invalid_config(
                "ticks_per_second must be at least 1",
            ));
        }
        if self.read_buffer_size == 0 {
            return Err(EsoplayError::invalid_config(
                "read_buffer_size must be at least 1",
            ));
        }
        Ok(())
    }

    /// Resolve the program used for the bridge process
    ///
    /// # Errors
    /// Returns error if no bridge program is set and the current executable
    /// cannot be determined
    pub fn resolve_bridge_program(&self) -> Result<PathBuf> {
        match self.bridge_program {
            Some(ref path) => Ok(path.clone()),
            None => std::env::current_exe().map_err(|e| {
                EsoplayError::spawn(format!("cannot locate current executable: {e}"))
            }),
        }
    }
}

// ============================================================================
// Builder for SupervisorOptions
// ============================================================================

/// Builder for `SupervisorOptions`
#[derive(Debug, Default)]
pub struct SupervisorOptionsBuilder {
    options: SupervisorOptions,
}

impl SupervisorOptionsBuilder {
    /// Set the interpreter
    #[must_use]
    pub fn interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.options.interpreter = interpreter.into();
        self
    }

    /// Set the file to play
    #[must_use]
    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.options.file = file.into();
        self
    }

    /// Set the tick rate
    #[must_use]
    pub const fn ticks_per_second(mut self, ticks: u32) -> Self {
        self.options.ticks_per_second = ticks;
        self
    }

    /// Set the drain buffer size
    #[must_use]
    pub const fn read_buffer_size(mut self, size: usize) -> Self {
        self.options.read_buffer_size = size;
        self
    }

    /// Set the bridge program
    #[must_use]
    pub fn bridge_program(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.bridge_program = Some(path.into());
        self
    }

    /// Build and validate the options
    ///
    /// # Errors
    /// Returns `EsoplayError::InvalidConfig` if validation fails
    pub fn build(self) -> Result<SupervisorOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SupervisorOptions::builder()
            .interpreter("bf")
            .file("hello.bf")
            .build()
            .unwrap();
        assert_eq!(options.ticks_per_second, 10);
        assert_eq!(options.read_buffer_size, 1024);
        assert_eq!(options.tick_period(), Duration::from_millis(100));
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let result = SupervisorOptions::builder()
            .interpreter("bf")
            .file("hello.bf")
            .ticks_per_second(0)
            .build();
        assert!(matches!(result, Err(EsoplayError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_interpreter_rejected() {
        let result = SupervisorOptions::builder().file("hello.bf").build();
        assert!(matches!(result, Err(EsoplayError::InvalidConfig(_))));
    }

    #[test]
    fn test_explicit_bridge_program() {
        let options = SupervisorOptions::builder()
            .interpreter("bf")
            .file("hello.bf")
            .bridge_program("/usr/local/bin/esoplay")
            .build()
            .unwrap();
        assert_eq!(
            options.resolve_bridge_program().unwrap(),
            PathBuf::from("/usr/local/bin/esoplay")
        );
    }
}
