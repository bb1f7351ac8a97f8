//! Chatscribe: per-channel chat logging with on-demand history and catch-up replay.
//!
//! The crate is the core of a chat-server plugin. The host adapter translates
//! its native callbacks into [`ChatEvent`]s, hands them to
//! [`service::ChatLogService::handle`], and delivers the returned [`Reply`]s.
//! Everything host-specific (callback subscription, session lifecycle) stays on
//! the host side.

pub mod command;
pub mod config;
pub mod error;
pub mod registry;
pub mod replay;
pub mod service;
pub mod store;
pub mod time;

pub use error::{Error, Result};

/// Virtual server identifier assigned by the host.
pub type ServerId = u64;

/// Session identifier of a connected participant.
pub type SessionId = u64;

/// Identifier of a registered alias in the host's registration store.
pub type AliasId = u64;

/// Host-delivered events the core reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A public text message was posted to a channel.
    Message {
        server: ServerId,
        session: SessionId,
        author: String,
        channel: String,
        text: String,
    },
    /// A participant connected and landed in `channel`.
    Connected {
        server: ServerId,
        session: SessionId,
        name: String,
        channel: String,
    },
}

/// One outbound line addressed to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub session: SessionId,
    pub text: String,
}
