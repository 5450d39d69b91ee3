//! Server-side support for the `XAPPLEPUSHSERVICE` IMAP extension.
//!
//! iOS Mail does not poll; it expects the IMAP server to advertise
//! `XAPPLEPUSHSERVICE` and relay mailbox changes to Apple's push service.
//! The heavy lifting is done by an external daemon,
//! [xapsd](https://github.com/freswa/dovecot-xaps-daemon); this crate is
//! the glue a host IMAP server needs on its side of the bridge:
//!
//! - decoding the `XAPPLEPUSHSERVICE` command and encoding its replies
//!   ([`parse`], [`encode`]),
//! - turning a decoded registration into a daemon call and wire replies
//!   ([`handler::ApplePushService`]),
//! - classifying raw mailbox events into push notifications and forwarding
//!   them ([`listener::MailboxListener`]),
//! - a thin HTTP client for the daemon's `/register` and `/notify`
//!   endpoints ([`xapsd::HttpClient`]).
//!
//! The host server keeps ownership of connections, authentication, and
//! capability negotiation; it hands authenticated-state command lines to a
//! [`Registry`] and raised mailbox events to the listener.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use imap_xaps::{
//!     ApplePushService, Config, HttpClient, MailboxListener, Registry, SessionUser,
//! };
//!
//! struct Session {
//!     username: String,
//! }
//!
//! impl SessionUser for Session {
//!     fn username(&self) -> String {
//!         self.username.clone()
//!     }
//! }
//!
//! # async fn run() -> Result<(), imap_xaps::Error> {
//! let config = Config::default();
//! let daemon = HttpClient::new(&config.base_url)?;
//!
//! let mut registry = Registry::new();
//! registry.register(Arc::new(ApplePushService::new(daemon.clone())));
//! // advertise registry.capabilities() alongside the host's own
//!
//! // one listener, sharing the daemon client, wired to the event source
//! let listener = MailboxListener::new(daemon);
//! # let _ = listener;
//!
//! let session = Session {
//!     username: "user@example.com".to_string(),
//! };
//! let line = "a1 XAPPLEPUSHSERVICE aps-version \"2\" aps-account-id \"acc\" \
//!             aps-device-token \"tok\" aps-subtopic \"sub\" mailboxes (INBOX)\r\n";
//! if let Some(replies) = registry.dispatch(line, &session).await {
//!     for reply in replies {
//!         // write each line back to the client connection
//!         print!("{}", reply);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod encode;
pub mod error;
pub mod handler;
pub mod listener;
pub mod parse;
pub mod reader;
pub mod registry;
pub mod session;
pub mod types;
pub mod xapsd;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::handler::ApplePushService;
pub use crate::listener::{classify, MailboxListener};
pub use crate::registry::{ImapExtension, Registry};
pub use crate::session::{identity_resolver, MailboxResolver, SessionUser};
pub use crate::types::*;
pub use crate::xapsd::{HttpClient, NotifyRequest, PushDaemon, RegisterRequest};

/// The command this crate implements, and the capability string advertised
/// for it.
pub const COMMAND: &str = "XAPPLEPUSHSERVICE";
