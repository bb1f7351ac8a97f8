//! Collaborator interfaces supplied by the host.

use crate::{AliasId, SessionId};
use std::collections::HashMap;

/// A registered participant record, as exposed by the host's registration
/// store. Read-only from this crate's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// When the identity was last seen, `YYYY-MM-DD HH:MM:SS` in the same
    /// zone the log is written in.
    pub last_active: String,
}

/// Read-only access to the host's registration records.
pub trait RegistrationLookup: Send + Sync {
    /// Alias ids whose name matches `name`. The host may match loosely
    /// (substring, case folding); the replayer filters for exact equality.
    fn find_aliases_by_name(&self, name: &str) -> HashMap<AliasId, String>;

    /// The registration for an alias, or `None` when the id has no record.
    fn registration(&self, alias: AliasId) -> Option<Registration>;
}

/// Outbound message delivery. Fire-and-forget: the host offers no delivery
/// confirmation, so there is nothing to propagate back.
pub trait ReplySink: Send + Sync {
    fn send_message(&self, session: SessionId, text: &str);
}
