//! Catch-up replay of channel traffic missed while offline.

use crate::error::Result;
use crate::registry::RegistrationLookup;
use crate::store::ChannelLogStore;
use crate::time::TimeConverter;
use regex::Regex;
use std::sync::LazyLock;

/// Marker sent after the replayed lines to flag the switch to live traffic.
pub const SENTINEL: &str = "====== Now ======";

/// Extracts the bracketed timestamp a log line starts with.
static LINE_STAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]+)\]").expect("line stamp pattern is valid"));

/// Replays log lines written after a participant's last-active mark.
pub struct CatchUpReplayer {
    time: TimeConverter,
}

impl CatchUpReplayer {
    pub fn new(time: TimeConverter) -> Self {
        Self { time }
    }

    /// Resolve a connecting participant's last-active mark through the host's
    /// registration records. Only aliases whose name equals `name` exactly
    /// count; `None` means the participant is not registered and gets no
    /// replay.
    pub fn last_active_mark(
        &self,
        lookup: &dyn RegistrationLookup,
        name: &str,
    ) -> Option<String> {
        lookup
            .find_aliases_by_name(name)
            .into_iter()
            .filter(|(_, alias_name)| alias_name == name)
            .find_map(|(alias, _)| lookup.registration(alias))
            .map(|registration| registration.last_active)
    }

    /// Lines of `channel` written after `last_active`, oldest first, or
    /// `None` when the channel has no log at all (nothing to replay, no
    /// sentinel owed).
    ///
    /// The scan walks the log newest to oldest and stops at the first line
    /// stamped at or before the mark, so a line stamped exactly at the mark
    /// is not replayed. Lines whose stamp cannot be read are skipped and
    /// never end the scan.
    pub fn missed_lines(
        &self,
        store: &ChannelLogStore,
        channel: &str,
        last_active: &str,
    ) -> Result<Option<Vec<String>>> {
        let mark = self.time.local_to_utc(last_active)?;
        let Some(scan) = store.scan_reverse(channel)? else {
            return Ok(None);
        };

        let mut missed = Vec::new();
        for line in scan {
            let Some(stamp) = LINE_STAMP.captures(&line).map(|caps| caps[1].to_string()) else {
                tracing::debug!(channel, "skipping log line without a bracketed stamp");
                continue;
            };
            let entry = match self.time.local_to_utc(&stamp) {
                Ok(instant) => instant,
                Err(_) => {
                    tracing::debug!(channel, stamp, "skipping log line with unreadable stamp");
                    continue;
                }
            };
            if entry <= mark {
                break;
            }
            missed.push(line);
        }
        missed.reverse();
        Ok(Some(missed))
    }
}
