// Core data structures for the poolbook daemon

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;

use crate::error::{Error, PlanningError};

/// Login credentials for the facility portal
///
/// The matriculation number is normalized to upper case at construction,
/// matching what the portal expects. The PIN is redacted from debug output.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    pin: String,
    matric: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        pin: impl Into<String>,
        matric: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            pin: pin.into(),
            matric: matric.into().to_uppercase(),
        }
    }

    /// Read credentials from `POOLBOOK_USERNAME`, `POOLBOOK_PIN` and
    /// `POOLBOOK_MATRIC`
    pub fn from_env() -> Result<Self, Error> {
        let get = |key: &str| {
            std::env::var(key).map_err(|_| Error::config(format!("{key} is not set")))
        };
        Ok(Self::new(
            get("POOLBOOK_USERNAME")?,
            get("POOLBOOK_PIN")?,
            get("POOLBOOK_MATRIC")?,
        ))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn pin(&self) -> &str {
        &self.pin
    }

    pub fn matric(&self) -> &str {
        &self.matric
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("pin", &"<redacted>")
            .field("matric", &self.matric)
            .finish()
    }
}

/// Cookie set established by a successful login
///
/// Every subsequent request in the same booking attempt carries these
/// cookies in a single `Cookie` header. The token is re-established once
/// per attempt; no expiry is tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToken {
    cookies: BTreeMap<String, String>,
}

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Render the cookie set as a `Cookie` header value: `key=value` pairs
    /// joined by `;`
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl FromIterator<(String, String)> for SessionToken {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            cookies: iter.into_iter().collect(),
        }
    }
}

/// Desired booking hour per weekday, index 0 = Monday
///
/// Each entry is 0 (no booking wanted that day) or an hour in 8..=19,
/// the facility's operating window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceVector {
    hours: [u8; 7],
}

impl PreferenceVector {
    /// Operating hours of the facility; preference entries outside this
    /// window are rejected.
    pub const FIRST_HOUR: u8 = 8;
    pub const LAST_HOUR: u8 = 19;

    pub fn new(hours: [u8; 7]) -> Result<Self, PlanningError> {
        for (day, &hour) in hours.iter().enumerate() {
            if hour != 0 && !(Self::FIRST_HOUR..=Self::LAST_HOUR).contains(&hour) {
                return Err(PlanningError::invalid_file(format!(
                    "hour {hour} for weekday {day} is outside the {}..={} window",
                    Self::FIRST_HOUR,
                    Self::LAST_HOUR
                )));
            }
        }
        Ok(Self { hours })
    }

    /// Desired hour for the given weekday index (0 = Monday), or `None`
    /// when no booking is wanted that day
    pub fn hour_for(&self, weekday: usize) -> Option<u8> {
        match self.hours[weekday % 7] {
            0 => None,
            hour => Some(hour),
        }
    }

    /// True when no weekday has a desired hour
    pub fn is_empty(&self) -> bool {
        self.hours.iter().all(|&hour| hour == 0)
    }

    pub fn as_array(&self) -> [u8; 7] {
        self.hours
    }
}

/// Availability of the coming week's bookable slots
///
/// Maps each bookable instant to the reservable-lane token embedded in its
/// schedule cell, or `None` when every lane at that time is taken. Built
/// fresh on every attempt; availability changes externally, so snapshots
/// are never reused.
#[derive(Debug, Clone, Default)]
pub struct ScheduleSnapshot {
    slots: BTreeMap<NaiveDateTime, Option<String>>,
}

impl ScheduleSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one parsed cell. The first reservable token seen for an
    /// instant wins; later cells for the same instant cannot displace it.
    pub fn record(&mut self, instant: NaiveDateTime, token: Option<String>) {
        let entry = self.slots.entry(instant).or_insert(None);
        if entry.is_none() {
            *entry = token;
        }
    }

    /// Reservable token for the instant, if the slot exists and has a free
    /// lane
    pub fn token_for(&self, instant: NaiveDateTime) -> Option<&str> {
        self.slots.get(&instant).and_then(Option::as_deref)
    }

    /// Whether the snapshot contains the instant at all
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.slots.contains_key(&instant)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDateTime, Option<&str>)> {
        self.slots
            .iter()
            .map(|(instant, token)| (instant, token.as_deref()))
    }
}
