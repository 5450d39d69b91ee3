use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// A push notification category understood by the daemon.
///
/// These are the event names put on the `/notify` wire, loosely following
/// the message-event vocabulary of [RFC
/// 5423](https://www.rfc-editor.org/rfc/rfc5423.html). The `Ord` impl only
/// exists so classified sets serialize in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PushEvent {
    /// A message arrived through normal delivery.
    MessageNew,
    /// A message was appended or moved into the mailbox by a client.
    MessageAppend,
    /// A message was permanently removed.
    MessageExpunge,
    /// Flags were set on one or more messages.
    FlagsSet,
    /// Flags were cleared on one or more messages.
    FlagsClear,
}

impl PushEvent {
    /// The wire name of this event.
    pub fn as_str(&self) -> &'static str {
        match *self {
            PushEvent::MessageNew => "MessageNew",
            PushEvent::MessageAppend => "MessageAppend",
            PushEvent::MessageExpunge => "MessageExpunge",
            PushEvent::FlagsSet => "FlagsSet",
            PushEvent::FlagsClear => "FlagsClear",
        }
    }
}

impl fmt::Display for PushEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message flag, as attached to messages by the storage subsystem.
///
/// System flags are pre-defined in [RFC 3501 section
/// 2.3.2](https://tools.ietf.org/html/rfc3501#section-2.3.2) and begin with
/// `\` on the wire; anything else is a user- or server-defined keyword.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum Flag<'a> {
    /// Message has been read.
    Seen,
    /// Message has been answered.
    Answered,
    /// Message is "flagged" for urgent/special attention.
    Flagged,
    /// Message is "deleted" for removal by later EXPUNGE.
    Deleted,
    /// Message has not completed composition.
    Draft,
    /// Message recently arrived in this mailbox.
    Recent,
    /// A non-standard user- or server-defined flag.
    Custom(Cow<'a, str>),
}

impl Flag<'static> {
    fn system(s: &str) -> Option<Self> {
        match s {
            "\\Seen" => Some(Flag::Seen),
            "\\Answered" => Some(Flag::Answered),
            "\\Flagged" => Some(Flag::Flagged),
            "\\Deleted" => Some(Flag::Deleted),
            "\\Draft" => Some(Flag::Draft),
            "\\Recent" => Some(Flag::Recent),
            _ => None,
        }
    }
}

impl<'a> fmt::Display for Flag<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Flag::Seen => write!(f, "\\Seen"),
            Flag::Answered => write!(f, "\\Answered"),
            Flag::Flagged => write!(f, "\\Flagged"),
            Flag::Deleted => write!(f, "\\Deleted"),
            Flag::Draft => write!(f, "\\Draft"),
            Flag::Recent => write!(f, "\\Recent"),
            Flag::Custom(ref s) => write!(f, "{}", s),
        }
    }
}

impl From<String> for Flag<'static> {
    fn from(s: String) -> Self {
        if let Some(f) = Flag::system(&s) {
            f
        } else {
            Flag::Custom(Cow::Owned(s))
        }
    }
}

impl<'a> From<&'a str> for Flag<'a> {
    fn from(s: &'a str) -> Self {
        if let Some(f) = Flag::system(s) {
            f
        } else {
            Flag::Custom(Cow::Borrowed(s))
        }
    }
}

/// The flag transition recorded for a single affected message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagUpdate {
    /// Flags before the update.
    pub old: Vec<Flag<'static>>,
    /// Flags after the update.
    pub new: Vec<Flag<'static>>,
}

impl FlagUpdate {
    /// Whether anything actually changed, compared as sets: a store that
    /// rewrites the same flags in a different order is not a change.
    pub fn changed(&self) -> bool {
        let old: HashSet<_> = self.old.iter().collect();
        let new: HashSet<_> = self.new.iter().collect();
        old != new
    }
}

/// A change notification raised by the mail-storage subsystem.
///
/// The `username` and `mailbox` carried here are the raw identities from
/// the storage layer; the listener resolves them before anything reaches
/// the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MailboxEvent {
    /// One or more messages were added to a mailbox.
    ///
    /// A single event can represent multiple operations: `delivery` and
    /// `appended`/`moved` are independent and not mutually exclusive.
    Added {
        /// Owner of the affected mailbox.
        username: String,
        /// Affected mailbox name.
        mailbox: String,
        /// The message arrived through normal mail delivery.
        delivery: bool,
        /// The message was appended by a client.
        appended: bool,
        /// The message was moved from another mailbox.
        moved: bool,
    },
    /// One or more messages were permanently removed.
    Expunged {
        /// Owner of the affected mailbox.
        username: String,
        /// Affected mailbox name.
        mailbox: String,
    },
    /// Flags changed on one or more messages.
    FlagsUpdated {
        /// Owner of the affected mailbox.
        username: String,
        /// Affected mailbox name.
        mailbox: String,
        /// Per-message flag transitions.
        updates: Vec<FlagUpdate>,
    },
    /// A mailbox was created. Not forwarded to the daemon.
    MailboxCreated {
        /// Owner of the new mailbox.
        username: String,
        /// New mailbox name.
        mailbox: String,
    },
    /// A mailbox was deleted. Not forwarded to the daemon.
    MailboxDeleted {
        /// Owner of the deleted mailbox.
        username: String,
        /// Deleted mailbox name.
        mailbox: String,
    },
}

impl MailboxEvent {
    /// Owner of the mailbox this event concerns.
    pub fn username(&self) -> &str {
        match *self {
            MailboxEvent::Added { ref username, .. }
            | MailboxEvent::Expunged { ref username, .. }
            | MailboxEvent::FlagsUpdated { ref username, .. }
            | MailboxEvent::MailboxCreated { ref username, .. }
            | MailboxEvent::MailboxDeleted { ref username, .. } => username,
        }
    }

    /// Name of the mailbox this event concerns.
    pub fn mailbox(&self) -> &str {
        match *self {
            MailboxEvent::Added { ref mailbox, .. }
            | MailboxEvent::Expunged { ref mailbox, .. }
            | MailboxEvent::FlagsUpdated { ref mailbox, .. }
            | MailboxEvent::MailboxCreated { ref mailbox, .. }
            | MailboxEvent::MailboxDeleted { ref mailbox, .. } => mailbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_event_wire_names() {
        assert_eq!(PushEvent::MessageNew.to_string(), "MessageNew");
        assert_eq!(PushEvent::FlagsClear.to_string(), "FlagsClear");
        assert_eq!(
            serde_json::to_string(&PushEvent::MessageExpunge).unwrap(),
            "\"MessageExpunge\""
        );
    }

    #[test]
    fn flag_roundtrip() {
        assert_eq!(Flag::from("\\Seen"), Flag::Seen);
        assert_eq!(Flag::from("$Forwarded").to_string(), "$Forwarded");
    }

    #[test]
    fn flag_update_reorder_is_not_a_change() {
        let update = FlagUpdate {
            old: vec![Flag::Seen, Flag::Flagged],
            new: vec![Flag::Flagged, Flag::Seen],
        };
        assert!(!update.changed());
    }

    #[test]
    fn flag_update_detects_change() {
        let update = FlagUpdate {
            old: vec![Flag::Seen],
            new: vec![Flag::Seen, Flag::Deleted],
        };
        assert!(update.changed());
    }
}
