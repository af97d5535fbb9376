//! Bisection wait primitive
//!
//! Sleeps until a wall-clock instant by repeatedly sleeping half the
//! remaining duration. The halving keeps each nap bounded, so a suspended
//! or clock-adjusted host corrects course at the next check instead of
//! oversleeping an entire fixed-length nap. Once the half-step drops below
//! one second the full remainder is slept, so the function never returns
//! before the target.

use chrono::{Local, NaiveDateTime, TimeDelta};
use std::time::Duration;

/// Sleep until the given local wall-clock instant
///
/// Returns immediately when the target is already in the past.
pub async fn sleep_until(target: NaiveDateTime) {
    loop {
        let now = Local::now().naive_local();
        let remaining = target - now;
        if remaining <= TimeDelta::zero() {
            return;
        }

        let half = remaining / 2;
        let step = if half < TimeDelta::seconds(1) {
            remaining
        } else {
            half
        };
        tracing::debug!(seconds = step.num_seconds(), "sleeping");
        tokio::time::sleep(step.to_std().unwrap_or(Duration::from_millis(100))).await;
    }
}
