//! Classification of inbound chat text.

use crate::error::Result;
use anyhow::Context as _;
use regex::Regex;

/// Line count served when a history request names none.
const DEFAULT_HISTORY_COUNT: usize = 10;

/// What a single inbound message means to the logger.
///
/// The three variants are mutually exclusive and exhaustive: a message is
/// classified exactly once and either answered, dropped, or appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Request for the last `count` log lines, optionally of another channel.
    History {
        count: usize,
        channel_override: Option<String>,
    },
    /// Marked offtopic; never appended, never echoed.
    Suppressed,
    /// Ordinary chat content, appended to the channel log.
    Content,
}

/// Splits history and offtopic commands from loggable content.
///
/// Built once from the configured prefixes; classification itself is a pure
/// function of the message text.
#[derive(Debug, Clone)]
pub struct CommandParser {
    history_prefix: String,
    offtopic_prefix: String,
    history_args: Regex,
}

impl CommandParser {
    pub fn new(history_prefix: &str, offtopic_prefix: &str) -> Result<Self> {
        // `<prefix> <count> [<channel>]` — the whole argument tail is
        // optional; anything that fails to match falls back to the defaults.
        let pattern = format!(
            r"^{}\s+(\d+)(?:\s+(\S.*))?",
            regex::escape(history_prefix)
        );
        let history_args = Regex::new(&pattern).context("building history argument pattern")?;
        Ok(Self {
            history_prefix: history_prefix.to_string(),
            offtopic_prefix: offtopic_prefix.to_string(),
            history_args,
        })
    }

    /// Classify one message. History is checked before offtopic, and any text
    /// carrying neither prefix is content.
    pub fn classify(&self, text: &str) -> Command {
        if text.starts_with(&self.history_prefix) {
            let (count, channel_override) = match self.history_args.captures(text) {
                Some(caps) => {
                    let count = caps[1].parse().unwrap_or(DEFAULT_HISTORY_COUNT);
                    let channel = caps.get(2).map(|m| m.as_str().trim_end().to_string());
                    (count, channel)
                }
                None => (DEFAULT_HISTORY_COUNT, None),
            };
            Command::History {
                count,
                channel_override,
            }
        } else if text.starts_with(&self.offtopic_prefix) {
            Command::Suppressed
        } else {
            Command::Content
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CommandParser {
        CommandParser::new("!history", "!offtopic").expect("stock prefixes should build")
    }

    #[test]
    fn bare_history_request_defaults_to_ten_lines() {
        assert_eq!(
            parser().classify("!history"),
            Command::History {
                count: 10,
                channel_override: None
            }
        );
    }

    #[test]
    fn history_request_with_count() {
        assert_eq!(
            parser().classify("!history 25"),
            Command::History {
                count: 25,
                channel_override: None
            }
        );
    }

    #[test]
    fn history_request_with_count_and_channel() {
        assert_eq!(
            parser().classify("!history 5 dev talk"),
            Command::History {
                count: 5,
                channel_override: Some("dev talk".into())
            }
        );
    }

    #[test]
    fn malformed_history_arguments_fall_back_to_defaults() {
        // Not digits, so the argument match fails as a whole.
        assert_eq!(
            parser().classify("!history lots please"),
            Command::History {
                count: 10,
                channel_override: None
            }
        );
    }

    #[test]
    fn offtopic_prefix_suppresses() {
        assert_eq!(parser().classify("!offtopic lunch plans?"), Command::Suppressed);
        assert_eq!(parser().classify("!offtopic"), Command::Suppressed);
    }

    #[test]
    fn plain_text_is_content() {
        assert_eq!(parser().classify("morning all"), Command::Content);
        assert_eq!(
            parser().classify("see !history for the log"),
            Command::Content
        );
    }

    #[test]
    fn prefixes_with_regex_metacharacters_are_escaped() {
        let parser = CommandParser::new("?h", ".ot").expect("odd prefixes should build");
        assert_eq!(
            parser.classify("?h 3"),
            Command::History {
                count: 3,
                channel_override: None
            }
        );
        assert_eq!(parser.classify(".ot whatever"), Command::Suppressed);
        assert_eq!(parser.classify("xot whatever"), Command::Content);
    }
}
