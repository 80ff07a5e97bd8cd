//! Session state for one supervised run
//!
//! A `Session` is created once by the supervisor and threaded through every
//! tick by `&mut`. It carries the monotonic start time and the two-state
//! Running/Terminated machine.

use std::time::Instant;

use super::tick::TickMessage;

/// Why the tick loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The sentinel was observed in the output stream
    Sentinel,
    /// The output pipe reached end of stream before any sentinel
    OutputClosed,
    /// Writing a tick message failed; the interpreter side is gone
    InputClosed,
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ticks are being sent
    Running,
    /// Terminal state, entered exactly once
    Terminated(Termination),
}

/// Run-scoped context owned by the supervisor
#[derive(Debug)]
pub struct Session {
    started_at: Instant,
    state: SessionState,
    last_elapsed_ms: u64,
    ticks_sent: u64,
}

impl Session {
    /// Start a session now
    #[must_use]
    pub fn start() -> Self {
        Self::started_at(Instant::now())
    }

    /// Start a session from an explicit reference instant
    #[must_use]
    pub fn started_at(started_at: Instant) -> Self {
        Self {
            started_at,
            state: SessionState::Running,
            last_elapsed_ms: 0,
            ticks_sent: 0,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether ticks may still be sent
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running)
    }

    /// Reason the session ended, once it has
    #[must_use]
    pub const fn termination(&self) -> Option<Termination> {
        match self.state {
            SessionState::Running => None,
            SessionState::Terminated(reason) => Some(reason),
        }
    }

    /// Number of tick messages composed so far
    #[must_use]
    pub const fn ticks_sent(&self) -> u64 {
        self.ticks_sent
    }

    /// Milliseconds since start, never lower than a previously returned value
    pub fn elapsed_ms(&mut self) -> u64 {
        let elapsed = u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_elapsed_ms = self.last_elapsed_ms.max(elapsed);
        self.last_elapsed_ms
    }

    /// Compose the next tick message
    ///
    /// Returns `None` once the session is terminated so that nothing is
    /// sent after termination.
    pub fn next_message(&mut self, key: Option<Vec<u8>>) -> Option<TickMessage> {
        if !self.is_running() {
            return None;
        }
        let elapsed_ms = self.elapsed_ms();
        self.ticks_sent += 1;
        Some(TickMessage::new(key, elapsed_ms))
    }

    /// Move to the terminated state
    ///
    /// Returns `false` if the session had already terminated; the first
    /// reason is kept.
    pub fn terminate(&mut self, reason: Termination) -> bool {
        if self.is_running() {
            self.state = SessionState::Terminated(reason);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_elapsed_is_non_decreasing() {
        let mut session = Session::start();
        let mut previous = 0;
        for _ in 0..50 {
            let msg = session.next_message(None).unwrap();
            assert!(msg.elapsed_ms >= previous);
            previous = msg.elapsed_ms;
        }
        assert_eq!(session.ticks_sent(), 50);
    }

    #[test]
    fn test_elapsed_counts_from_start() {
        let start = Instant::now()
            .checked_sub(Duration::from_millis(250))
            .unwrap();
        let mut session = Session::started_at(start);
        assert!(session.elapsed_ms() >= 250);
    }

    #[test]
    fn test_terminates_once() {
        let mut session = Session::start();
        assert!(session.terminate(Termination::Sentinel));
        assert!(!session.terminate(Termination::OutputClosed));
        assert_eq!(session.termination(), Some(Termination::Sentinel));
        assert_eq!(
            session.state(),
            SessionState::Terminated(Termination::Sentinel)
        );
    }

    #[test]
    fn test_no_message_after_termination() {
        let mut session = Session::start();
        session.terminate(Termination::Sentinel);
        assert!(session.next_message(Some(b"a".to_vec())).is_none());
        assert_eq!(session.ticks_sent(), 0);
    }
}
