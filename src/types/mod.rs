//! Value types carried through one command or one event handling cycle.
//!
//! Everything here is short-lived: a [`Request`] is produced by the decoder,
//! consumed once by the handler, and dropped; a [`Response`] is produced by
//! the handler and consumed once by the encoder. Nothing is cached or kept
//! across commands.

mod event;
pub use self::event::{Flag, FlagUpdate, MailboxEvent, PushEvent};

/// A decoded `XAPPLEPUSHSERVICE` command.
///
/// All string fields except `version` are opaque to this crate: they are
/// passed through to the push daemon verbatim, without validation or
/// transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The client's command tag, echoed back in the tagged reply. Never
    /// interpreted.
    pub tag: String,
    /// The protocol version as provided by the client. Stored because it
    /// must be returned within the response. Currently validated against a
    /// single supported value at decode time.
    pub version: String,
    /// Mail account reference as sent by the device.
    pub account_id: String,
    /// Push token as sent by the device.
    pub device_token: String,
    /// APNS subtopic as sent by the device; stored by the daemon and used
    /// during notification.
    pub subtopic: String,
    /// Mailboxes the client wants push notifications for, in client order.
    ///
    /// May be empty after a successful decode: an empty `()` list is valid
    /// syntax, and the INBOX default is applied by the handler, not here.
    pub mailboxes: Vec<String>,
}

/// The untagged data reply to a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Matches the request's version.
    pub version: String,
    /// APNS topic to listen on, as returned by the daemon. Not validated
    /// locally.
    pub topic: String,
}

/// One wire-level reply emitted while handling a command.
///
/// A successful registration emits `Push` followed by `Ok`, exactly once
/// each and in that order. A failed one emits a single `Bad`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The untagged `* XAPPLEPUSHSERVICE ...` data response.
    Push(Response),
    /// Tagged completion status.
    Ok {
        /// Tag of the command being completed.
        tag: String,
    },
    /// Tagged failure status.
    Bad {
        /// Tag of the failed command.
        tag: String,
        /// Human-readable failure text. Generic for daemon failures;
        /// expected-vs-actual for decode failures.
        text: String,
    },
}
