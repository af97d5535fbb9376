//! poolbook - automated pool-slot booking for the NTU sports facility portal
//!
//! The portal exposes no API: slots are claimed through an HTML form
//! workflow before other users take them. This crate keeps a short-lived
//! authenticated session, turns the portal's merged-cell schedule table
//! into a structured availability snapshot, and runs the two-phase
//! reserve-then-confirm transaction from a loop that wakes exactly when a
//! preferred slot opens.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures (credentials, session, snapshot)
//! - [`portal`] - HTTP client: authentication, schedule fetch, booking
//! - [`parser`] - Schedule-table parsing
//! - [`preferences`] - Weekly preference sheet reading
//! - [`scheduler`] - Target computation, bisection wait, booking loop
//! - [`error`] - Error taxonomy shared by all of the above
//!
//! # Example
//!
//! ```no_run
//! use poolbook::config::Config;
//! use poolbook::models::Credentials;
//! use poolbook::portal::PortalClient;
//! use poolbook::scheduler::BookingRunner;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let credentials = Credentials::from_env()?;
//!     let client = PortalClient::new(config.portal, credentials)?;
//!     let runner = BookingRunner::new(client, config.booking);
//!     runner.run().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod portal;
pub mod preferences;
pub mod scheduler;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{BookingError, Error, ErrorCategory, PlanningError, Result};
    pub use crate::models::{Credentials, PreferenceVector, ScheduleSnapshot, SessionToken};
    pub use crate::parser::ScheduleParser;
    pub use crate::portal::PortalClient;
    pub use crate::scheduler::BookingRunner;
}
