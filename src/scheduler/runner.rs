//! The booking loop
//!
//! One strictly sequential cycle: read preferences, compute the next
//! target, authenticate, fetch and parse the schedule, book, then sleep
//! until the next opportunity. The loop has no terminal state; it runs
//! until the process is stopped externally.
//!
//! Failure handling follows two fixed paths. A planning failure (broken
//! preference file, empty vector) waits a fallback interval and rereads.
//! Any booking-phase failure is logged with its kind and the loop sleeps
//! until the just-attempted target plus a fixed offset: if a slot attempt
//! failed, the next relevant opportunity is at least that far out, and
//! preferences are recomputed fresh on wake-up.

use chrono::{Duration, Local, NaiveDateTime};

use super::{target, wait};
use crate::config::BookingConfig;
use crate::error::{BookingError, PlanningError};
use crate::models::{ScheduleSnapshot, SessionToken};
use crate::parser::ScheduleParser;
use crate::portal::PortalClient;
use crate::preferences;

/// Drives booking attempts against the portal, forever
pub struct BookingRunner {
    client: PortalClient,
    parser: ScheduleParser,
    config: BookingConfig,
}

impl BookingRunner {
    pub fn new(client: PortalClient, config: BookingConfig) -> Self {
        Self {
            client,
            parser: ScheduleParser::new(),
            config,
        }
    }

    /// Run booking cycles until the enclosing task is dropped
    pub async fn run(&self) {
        loop {
            let target = match self.plan() {
                Ok(target) => target,
                Err(err) => {
                    tracing::error!(error = %err, "could not determine the next booking slot");
                    let retry = Local::now().naive_local()
                        + Duration::hours(self.config.preference_retry_hours);
                    tracing::info!(until = %retry, "waiting before rereading preferences");
                    wait::sleep_until(retry).await;
                    continue;
                }
            };

            tracing::info!(slot = %target, "attempting to book slot");
            match self.attempt(target).await {
                Ok(()) => tracing::info!(slot = %target, "booking confirmed"),
                Err(BookingError::SlotUnavailable) => {
                    tracing::warn!(slot = %target, "no lane available at the requested time");
                }
                Err(BookingError::ScheduleParseFailure { reason }) => {
                    tracing::error!(
                        %reason,
                        "schedule page no longer matches the expected format; \
                         the parser needs maintenance"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        slot = %target,
                        error = %err,
                        recoverable = err.is_recoverable(),
                        "booking attempt failed"
                    );
                }
            }

            let wake = target + Duration::hours(self.config.retry_offset_hours);
            tracing::info!(until = %wake, "sleeping until the next cycle");
            wait::sleep_until(wake).await;
        }
    }

    /// Reread preferences and compute the next future target
    fn plan(&self) -> Result<NaiveDateTime, PlanningError> {
        let prefs = preferences::read_preferences(&self.config.preferences_path)?;
        target::next_target(Local::now().naive_local(), &prefs)
    }

    /// One full booking attempt: authenticate, fetch, parse, book
    async fn attempt(&self, target: NaiveDateTime) -> Result<(), BookingError> {
        let session = self.client.authenticate().await?;
        let schedule = self.snapshot(&session).await?;
        self.client.book(&session, target, &schedule).await
    }

    /// Fetch and parse a fresh availability snapshot
    async fn snapshot(&self, session: &SessionToken) -> Result<ScheduleSnapshot, BookingError> {
        let page = self.client.fetch_schedule(session).await?;
        self.parser.parse(&page)
    }
}
