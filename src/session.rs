//! Identity resolution seams shared by the command path and the event path.
//!
//! The push daemon is stateless: it correlates a `/notify` call with an
//! earlier `/register` purely by comparing the username and mailbox-name
//! strings. Whatever mapping is applied to those strings at registration
//! time must therefore be applied identically at event time, which is why
//! both [`ApplePushService`](crate::handler::ApplePushService) and
//! [`MailboxListener`](crate::listener::MailboxListener) take the same
//! [`MailboxResolver`] value.

use std::sync::Arc;

/// The authenticated identity behind the session that issued a command.
///
/// Supplied by the host server; this crate never authenticates anyone. The
/// returned username can be arbitrary, but the value the host's event
/// source attaches to mailbox events must resolve to the same string.
pub trait SessionUser: Send + Sync {
    /// Username the daemon will correlate this registration under.
    fn username(&self) -> String;
}

/// Maps a user-facing mailbox name to the name sent to the daemon.
///
/// Install the same resolver in the handler and the listener; the daemon
/// has no other way to match the two sides up.
pub type MailboxResolver = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The default resolver: a plain passthrough.
///
/// This is an extension point rather than a hardcoded identity because
/// user-visible IMAP names can differ between delegates of the same
/// mailbox. Delegation-aware mapping would slot in here, on both paths at
/// once.
pub fn identity_resolver() -> MailboxResolver {
    Arc::new(|name| name.to_string())
}
