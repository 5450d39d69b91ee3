//! Watches mailbox changes and forwards them to the push daemon.
//!
//! The mapping from raw storage events to push-event tags is a pure
//! function ([`classify`]) so it can be tested without a live mail server.
//! [`MailboxListener`] wraps it with identity resolution and the
//! fire-and-forget notify call: the event source never blocks on delivery,
//! and a failed notify is logged and dropped. Notifications are
//! supplementary to normal mail delivery, not authoritative, so lossy
//! best-effort semantics are acceptable here.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::session::{identity_resolver, MailboxResolver};
use crate::types::{MailboxEvent, PushEvent};
use crate::xapsd::{NotifyRequest, PushDaemon};

/// Map one raw mailbox event to its push-event tags.
///
/// Returns an empty set for events the daemon should not hear about:
/// unhandled event families, an `Added` that is neither a delivery nor an
/// append/move, and a `FlagsUpdated` where nothing actually changed.
pub fn classify(event: &MailboxEvent) -> BTreeSet<PushEvent> {
    let mut tags = BTreeSet::new();

    match *event {
        MailboxEvent::Added {
            delivery,
            appended,
            moved,
            ..
        } => {
            // a single event can represent multiple operations
            if delivery {
                tags.insert(PushEvent::MessageNew);
            }
            if appended || moved {
                tags.insert(PushEvent::MessageAppend);
            }
        }
        MailboxEvent::Expunged { .. } => {
            tags.insert(PushEvent::MessageExpunge);
        }
        MailboxEvent::FlagsUpdated { ref updates, .. } => {
            if updates.iter().any(|update| update.changed()) {
                // TODO: diff old/new flags and emit FlagsSet/FlagsClear
                //  precisely; for now assume both operations happened
                tags.insert(PushEvent::FlagsSet);
                tags.insert(PushEvent::FlagsClear);
            }
        }
        // TODO: handle the other events defined in
        //  https://datatracker.ietf.org/doc/html/rfc5423
        _ => {}
    }

    tags
}

/// Listens to relevant mailbox events and forwards them to the daemon.
pub struct MailboxListener<D> {
    daemon: D,
    resolve_mailbox: MailboxResolver,
}

impl<D: PushDaemon> MailboxListener<D> {
    /// Create the listener with the default (passthrough) mailbox resolver.
    pub fn new(daemon: D) -> MailboxListener<D> {
        MailboxListener {
            daemon,
            resolve_mailbox: identity_resolver(),
        }
    }

    /// Create the listener with a custom mailbox resolver.
    ///
    /// Must be the same resolver the registration handler was built with;
    /// the daemon correlates the two sides purely by the resolved strings.
    pub fn with_mailbox_resolver(
        daemon: D,
        resolve_mailbox: MailboxResolver,
    ) -> MailboxListener<D> {
        MailboxListener {
            daemon,
            resolve_mailbox,
        }
    }

    /// The eligibility filter: whether this event family is forwarded at
    /// all. Events that pass may still be dropped by classification.
    pub fn handles(event: &MailboxEvent) -> bool {
        matches!(
            *event,
            MailboxEvent::Added { .. }
                | MailboxEvent::Expunged { .. }
                | MailboxEvent::FlagsUpdated { .. }
        )
    }

    /// Classify an event and resolve it into the notify payload, or `None`
    /// if the event should be dropped.
    ///
    /// The username is taken from the event as-is and the mailbox name goes
    /// through the shared resolver, matching what registration sent.
    pub fn classify(&self, event: &MailboxEvent) -> Option<NotifyRequest> {
        let events = classify(event);
        if events.is_empty() {
            return None;
        }

        Some(NotifyRequest {
            username: event.username().to_string(),
            mailbox: (self.resolve_mailbox)(event.mailbox()),
            events,
        })
    }

    /// Handle one raised event: classify, and forward if anything came out.
    ///
    /// Exactly one notify call per event that classifies non-empty. Notify
    /// failures are absorbed here; nothing propagates to the event source.
    pub async fn on_event(&self, event: MailboxEvent) {
        debug!(?event, "received mailbox event");

        let Some(request) = self.classify(&event) else {
            return;
        };

        info!(
            username = %request.username,
            mailbox = %request.mailbox,
            events = %request
                .events
                .iter()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            "sending mailbox events to xapsd"
        );

        if let Err(e) = self.daemon.notify(request).await {
            warn!(error = %e, "failed to notify xapsd, dropping notification");
        }
    }
}
