//! Fault taxonomy for the guard (SPEC_FULL §7). Every variant here is
//! recoverable: the hook binary always turns a `GuardError` into a single
//! `ask` decision rather than a non-zero exit.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Bad input")]
    BadInput,

    #[error("Could not parse command or contains output redirect")]
    ParseOrRedirectFault,

    #[error("No commands found")]
    NoCommands,

    #[error("command not recognized as safe: {token}")]
    UnknownCommand { token: String },
}

impl GuardError {
    /// One-line human-readable reason surfaced in `permissionDecisionReason`.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
