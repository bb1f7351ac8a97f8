//! Local-zone timestamp parsing and rendering.

use crate::error::{ConfigError, Error, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;

/// Timestamp shape shared by log lines and last-active marks.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts between naive local timestamps and UTC instants.
///
/// The zone is injected at construction so comparisons stay deterministic in
/// tests and under hosts that scrub the process environment. Log lines carry
/// no offset, so the writing and reading side must be configured with the
/// same zone.
#[derive(Debug, Clone, Copy)]
pub struct TimeConverter {
    zone: Zone,
}

#[derive(Debug, Clone, Copy)]
enum Zone {
    Named(Tz),
    Local,
}

impl TimeConverter {
    /// Interpret timestamps in a named IANA zone.
    pub fn with_zone(tz: Tz) -> Self {
        Self {
            zone: Zone::Named(tz),
        }
    }

    /// Interpret timestamps in the process-local zone.
    pub fn local() -> Self {
        Self { zone: Zone::Local }
    }

    /// Build from the optional configured zone name.
    pub fn from_config(name: Option<&str>) -> Result<Self> {
        match name {
            Some(name) => {
                let tz = name
                    .parse::<Tz>()
                    .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))?;
                Ok(Self::with_zone(tz))
            }
            None => Ok(Self::local()),
        }
    }

    /// Interpret a `YYYY-MM-DD HH:MM:SS` string in the configured zone and
    /// return the corresponding UTC instant.
    ///
    /// A timestamp made ambiguous by a DST fold resolves to the earliest
    /// valid instant; one that falls into a DST gap, or does not match the
    /// format at all, is an error.
    pub fn local_to_utc(&self, stamp: &str) -> Result<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(stamp.trim(), STAMP_FORMAT)
            .map_err(|_| Error::Timestamp {
                value: stamp.to_string(),
            })?;
        let resolved = match self.zone {
            Zone::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Zone::Local => chrono::Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        };
        resolved.ok_or_else(|| Error::Timestamp {
            value: stamp.to_string(),
        })
    }

    /// Current wall-clock time rendered in the configured zone, as written
    /// into log lines.
    pub fn now_stamp(&self) -> String {
        self.render(Utc::now())
    }

    /// Render a UTC instant in the configured zone.
    pub fn render(&self, instant: DateTime<Utc>) -> String {
        match self.zone {
            Zone::Named(tz) => instant.with_timezone(&tz).format(STAMP_FORMAT).to_string(),
            Zone::Local => instant
                .with_timezone(&chrono::Local)
                .format(STAMP_FORMAT)
                .to_string(),
        }
    }
}
