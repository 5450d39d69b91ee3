//! Command dispatch and capability advertisement.
//!
//! Extensions are registered in a table keyed by command name; each entry
//! is the decode/handle/encode triple behind the [`ImapExtension`] trait.
//! The host feeds authenticated-state command lines to
//! [`Registry::dispatch`] and advertises [`Registry::capabilities`] during
//! capability negotiation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::encode;
use crate::handler::{ApplePushService, FAILURE_TEXT};
use crate::reader::LineReader;
use crate::session::SessionUser;
use crate::types::Reply;
use crate::xapsd::PushDaemon;
use crate::COMMAND;

/// A command extension the host can dispatch to.
///
/// One implementation per custom command. The command name doubles as the
/// capability string advertised to clients; there are no capability
/// parameters.
#[async_trait]
pub trait ImapExtension: Send + Sync {
    /// The command name, uppercase, as it appears on the wire.
    fn command(&self) -> &'static str;

    /// Decode, handle, and encode one command, returning wire-ready reply
    /// lines (CRLF included) in emission order.
    ///
    /// `args` is the argument portion of the line; tag and command name
    /// have already been consumed by the dispatcher. This never fails at
    /// the host boundary: every error becomes a tagged `BAD` line.
    async fn process(&self, tag: &str, args: &str, session: &dyn SessionUser) -> Vec<String>;
}

#[async_trait]
impl<D: PushDaemon + 'static> ImapExtension for ApplePushService<D> {
    fn command(&self) -> &'static str {
        COMMAND
    }

    async fn process(&self, tag: &str, args: &str, session: &dyn SessionUser) -> Vec<String> {
        let mut reader = LineReader::new(args);
        let request = match self.decode(tag, &mut reader) {
            Ok(request) => request,
            Err(e) => {
                // fails closed: nothing was sent to the daemon
                debug!(tag, error = %e, "rejecting malformed command");
                let bad = Reply::Bad {
                    tag: tag.to_string(),
                    text: e.to_string(),
                };
                return vec![encode::encode_reply(&bad).unwrap_or_default()];
            }
        };

        let replies = self.handle(request, session).await;

        let mut lines = Vec::with_capacity(replies.len());
        for reply in &replies {
            match self.encode(reply) {
                Ok(line) => lines.push(line),
                Err(e) => {
                    // the daemon handed us a topic we cannot quote; treat
                    // it like any other registration failure
                    error!(tag, error = %e, "could not encode reply");
                    let bad = Reply::Bad {
                        tag: tag.to_string(),
                        text: FAILURE_TEXT.to_string(),
                    };
                    return vec![encode::encode_reply(&bad).unwrap_or_default()];
                }
            }
        }
        lines
    }
}

/// Dispatch table for registered command extensions.
#[derive(Default)]
pub struct Registry {
    commands: HashMap<&'static str, Arc<dyn ImapExtension>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Register an extension under its command name.
    pub fn register(&mut self, extension: Arc<dyn ImapExtension>) {
        self.commands.insert(extension.command(), extension);
    }

    /// Capability strings to advertise, one per registered command.
    pub fn capabilities(&self) -> Vec<&'static str> {
        self.commands.keys().copied().collect()
    }

    /// Dispatch one command line.
    ///
    /// Returns `None` when the command is not one of ours, so the host can
    /// fall through to its own command set. Command-name matching is
    /// ASCII-case-insensitive, per IMAP convention.
    pub async fn dispatch(&self, line: &str, session: &dyn SessionUser) -> Option<Vec<String>> {
        let (tag, rest) = line.split_once(' ')?;
        let (command, args) = match rest.split_once(' ') {
            Some((command, args)) => (command, args),
            None => (rest.trim_end_matches(['\r', '\n']), ""),
        };

        let extension = self.commands.get(command.to_ascii_uppercase().as_str())?;
        Some(extension.process(tag, args, session).await)
    }
}
