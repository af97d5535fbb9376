//! Error handling for the poolbook crate
//!
//! Two domain-specific error enums cover the two failure surfaces of the
//! system: [`BookingError`] for everything that can go wrong while talking
//! to the portal during one booking attempt, and [`PlanningError`] for
//! failures while deciding *when* to book. The unified [`Error`] enum wraps
//! both for use across module boundaries.
//!
//! The booking loop never lets any of these halt the process: parse
//! failures and empty slots get their own log paths, everything else is
//! reported together with its recoverability, and the loop re-plans.

use std::io;
use thiserror::Error;

/// Errors raised during a single booking attempt against the portal
///
/// Each variant maps to one phase of the attempt. Transport failures are
/// folded into the phase that was executing so the operator always sees
/// *which* step broke.
#[derive(Error, Debug)]
pub enum BookingError {
    /// Login rejected or the SSO endpoint was unreachable
    #[error("authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// Schedule page unreachable or returned a non-success status
    #[error("schedule page not available: {reason}")]
    ScheduleUnavailable { reason: String },

    /// Schedule page structure did not match the expected table shape
    ///
    /// Distinct from [`BookingError::SlotUnavailable`]: this one means the
    /// integration itself is broken and needs maintenance.
    #[error("could not parse schedule page: {reason}")]
    ScheduleParseFailure { reason: String },

    /// The target instant holds no reservable lane
    #[error("no lane available at the requested time")]
    SlotUnavailable,

    /// Reservation initiation rejected or its response shape changed
    #[error("reservation request failed: {reason}")]
    BookingRequestFailed { reason: String },

    /// Confirmation response did not grant a permit
    #[error("booking confirmation failed: permit not granted")]
    ConfirmationFailed,
}

impl BookingError {
    pub fn auth_failed(reason: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            reason: reason.into(),
        }
    }

    pub fn schedule_unavailable(reason: impl Into<String>) -> Self {
        Self::ScheduleUnavailable {
            reason: reason.into(),
        }
    }

    pub fn parse_failure(reason: impl Into<String>) -> Self {
        Self::ScheduleParseFailure {
            reason: reason.into(),
        }
    }

    pub fn request_failed(reason: impl Into<String>) -> Self {
        Self::BookingRequestFailed {
            reason: reason.into(),
        }
    }

    /// Whether retrying at a later cycle can plausibly succeed
    ///
    /// Parse failures are excluded: a changed page format stays changed
    /// until the parser is fixed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ScheduleParseFailure { .. })
    }
}

/// Errors raised while planning the next booking instant
#[derive(Error, Debug)]
pub enum PlanningError {
    /// Preference vector is empty across a full week scan
    #[error("no booking preferences were found")]
    NoPreferencesFound,

    /// Preference file missing, unreadable, or the wrong shape
    #[error("invalid preference file: {reason}")]
    PreferenceFileInvalid { reason: String },
}

impl PlanningError {
    pub fn invalid_file(reason: impl Into<String>) -> Self {
        Self::PreferenceFileInvalid {
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for PlanningError {
    fn from(err: csv::Error) -> Self {
        Self::PreferenceFileInvalid {
            reason: err.to_string(),
        }
    }
}

impl From<io::Error> for PlanningError {
    fn from(err: io::Error) -> Self {
        Self::PreferenceFileInvalid {
            reason: err.to_string(),
        }
    }
}

/// Classification of errors for logging and handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Transport-level failures (login, fetch, submit)
    Network,
    /// Page structure did not match expectations
    Parsing,
    /// Normal outcome: the slot is simply gone
    Availability,
    /// Preference reading and target computation
    Planning,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the poolbook crate
#[derive(Error, Debug)]
pub enum Error {
    /// Booking-attempt errors
    #[error("booking error: {0}")]
    Booking(#[from] BookingError),

    /// Planning errors
    #[error("planning error: {0}")]
    Planning(#[from] PlanningError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Booking(e) => match e {
                BookingError::AuthenticationFailed { .. }
                | BookingError::ScheduleUnavailable { .. }
                | BookingError::BookingRequestFailed { .. }
                | BookingError::ConfirmationFailed => ErrorCategory::Network,
                BookingError::ScheduleParseFailure { .. } => ErrorCategory::Parsing,
                BookingError::SlotUnavailable => ErrorCategory::Availability,
            },
            Self::Planning(_) => ErrorCategory::Planning,
            Self::Io(_) => ErrorCategory::Other,
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// Check if this error is recoverable by retrying at a later cycle
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Booking(e) => e.is_recoverable(),
            Self::Planning(_) => true,
            Self::Io(_) => true,
            Self::Config(_) => false,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
