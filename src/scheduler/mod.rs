//! Booking schedule computation and the retry loop
//!
//! Three pieces drive *when* the daemon acts:
//!
//! - [`target`] - computes the next desired booking instant from the
//!   weekly preference vector
//! - [`wait`] - sleeps until an instant by repeated bisection, never
//!   waking early
//! - [`runner`] - the non-terminating attempt loop tying planning, the
//!   portal client and the waits together

pub mod runner;
pub mod target;
pub mod wait;

pub use runner::BookingRunner;
pub use target::next_target;
pub use wait::sleep_until;
