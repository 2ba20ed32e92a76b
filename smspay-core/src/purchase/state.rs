// src/purchase/state.rs

use std::fmt;
use std::time::Duration;

/// Where the current purchase session is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    CheckingEligibility,
    /// Counting down `interval_secs` before the next send; `remaining` shrinks on every tick.
    Waiting { interval_secs: u32, remaining: Duration },
    Submitting,
    AwaitingConfirmation,
    /// Posting delivery logs / polling `received-status` after a delivery.
    Verifying,
    Completing,
    Cancelling,
    Terminated(Termination),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Terminated(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Redeemed,
    Cancelled,
    Unsupported,
    NoConnection,
    Failed,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Termination::Redeemed => "redeemed",
            Termination::Cancelled => "cancelled",
            Termination::Unsupported => "unsupported",
            Termination::NoConnection => "no connection",
            Termination::Failed => "failed",
        };
        f.write_str(s)
    }
}
