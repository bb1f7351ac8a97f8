//! Event orchestration: classify, log, answer history, replay on connect.

use crate::command::{Command, CommandParser};
use crate::config::Config;
use crate::error::Result;
use crate::registry::{RegistrationLookup, ReplySink};
use crate::replay::{CatchUpReplayer, SENTINEL};
use crate::store::ChannelLogStore;
use crate::time::TimeConverter;
use crate::{ChatEvent, Reply, SessionId};
use std::sync::Arc;

/// The chat-log plugin core.
///
/// [`handle`](Self::handle) is a plain function from an event to the replies
/// it produces; nothing here depends on the host's callback machinery, which
/// keeps the core testable against stub collaborators.
pub struct ChatLogService {
    config: Config,
    store: ChannelLogStore,
    parser: CommandParser,
    time: TimeConverter,
    replayer: CatchUpReplayer,
    registrations: Arc<dyn RegistrationLookup>,
}

impl ChatLogService {
    /// Build the service. The only hard failures are an uncreatable log
    /// directory, an unknown configured timezone, and an unbuildable command
    /// prefix.
    pub fn new(config: Config, registrations: Arc<dyn RegistrationLookup>) -> Result<Self> {
        let store = ChannelLogStore::open(&config.history_directory)?;
        let time = TimeConverter::from_config(config.timezone.as_deref())?;
        let parser = CommandParser::new(&config.history_command, &config.offtopic_command)?;
        Ok(Self {
            replayer: CatchUpReplayer::new(time),
            config,
            store,
            parser,
            time,
            registrations,
        })
    }

    /// Handle one host event and return the replies it produced, in send
    /// order. Runs to completion on the calling thread, file I/O included.
    ///
    /// Per-event failures are reported through `tracing` and swallowed; after
    /// construction nothing here fails hard.
    pub fn handle(&self, event: &ChatEvent) -> Vec<Reply> {
        match event {
            ChatEvent::Message {
                server,
                session,
                author,
                channel,
                text,
            } => {
                if !self.config.covers_server(*server) {
                    return Vec::new();
                }
                self.on_message(*session, author, channel, text)
            }
            ChatEvent::Connected {
                server,
                session,
                name,
                channel,
            } => {
                if !self.config.covers_server(*server) {
                    return Vec::new();
                }
                self.on_connected(*session, name, channel)
            }
        }
    }

    /// Handle an event and push the replies straight into a sink.
    pub fn dispatch(&self, event: &ChatEvent, sink: &dyn ReplySink) {
        for reply in self.handle(event) {
            sink.send_message(reply.session, &reply.text);
        }
    }

    fn on_message(
        &self,
        session: SessionId,
        author: &str,
        channel: &str,
        text: &str,
    ) -> Vec<Reply> {
        match self.parser.classify(text) {
            Command::History {
                count,
                channel_override,
            } => {
                let target = channel_override.as_deref().unwrap_or(channel);
                tracing::debug!(channel = target, count, "serving history request");
                match self.store.tail(target, count) {
                    Ok(lines) => lines
                        .into_iter()
                        .map(|text| Reply { session, text })
                        .collect(),
                    Err(error) => {
                        tracing::warn!(%error, channel = target, "history read failed");
                        Vec::new()
                    }
                }
            }
            Command::Suppressed => Vec::new(),
            Command::Content => {
                if let Err(error) =
                    self.store
                        .append(channel, author, text, &self.time.now_stamp())
                {
                    // That one message is lost from the log; the service
                    // keeps running.
                    tracing::warn!(%error, channel, "dropping message that could not be logged");
                }
                Vec::new()
            }
        }
    }

    fn on_connected(&self, session: SessionId, name: &str, channel: &str) -> Vec<Reply> {
        let mut replies = vec![Reply {
            session,
            text: self.logging_notice(),
        }];

        let Some(mark) = self
            .replayer
            .last_active_mark(self.registrations.as_ref(), name)
        else {
            // Unregistered participants have no last-active mark to replay
            // from, and hear nothing about it.
            return replies;
        };
        match self.replayer.missed_lines(&self.store, channel, &mark) {
            Ok(Some(lines)) => {
                tracing::debug!(channel, name, missed = lines.len(), "catch-up replay");
                replies.extend(lines.into_iter().map(|text| Reply { session, text }));
                replies.push(Reply {
                    session,
                    text: SENTINEL.to_string(),
                });
            }
            // Channel was never logged; no replay attempted, no sentinel.
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, channel, name, "catch-up replay failed"),
        }
        replies
    }

    fn logging_notice(&self) -> String {
        format!(
            "Please note that all public chat is logged. Use {} to keep a message out of the log.",
            self.config.offtopic_command
        )
    }
}
