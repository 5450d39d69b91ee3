//! Business logic for the `XAPPLEPUSHSERVICE` command.
//!
//! [`ApplePushService`] carries the decode/handle/encode triple for the
//! command. Decoding and encoding delegate to [`crate::parse`] and
//! [`crate::encode`]; [`ApplePushService::handle`] owns the semantics in
//! between: the INBOX default, identity resolution, the single daemon call,
//! and the translation of its outcome into wire replies.

use tracing::{error, info, warn};

use crate::encode;
use crate::error::Result;
use crate::parse;
use crate::reader::LineReader;
use crate::session::{identity_resolver, MailboxResolver, SessionUser};
use crate::types::{Reply, Request, Response};
use crate::xapsd::{PushDaemon, RegisterRequest};

/// The fixed text of the tagged failure status. Daemon error detail stays
/// in the logs; none of it crosses the wire to the client.
pub const FAILURE_TEXT: &str = "failed.";

/// Relays `XAPPLEPUSHSERVICE` registrations between IMAP clients and the
/// push daemon.
pub struct ApplePushService<D> {
    daemon: D,
    resolve_mailbox: MailboxResolver,
}

impl<D: PushDaemon> ApplePushService<D> {
    /// Create the handler with the default (passthrough) mailbox resolver.
    pub fn new(daemon: D) -> ApplePushService<D> {
        ApplePushService {
            daemon,
            resolve_mailbox: identity_resolver(),
        }
    }

    /// Create the handler with a custom mailbox resolver.
    ///
    /// The listener forwarding mailbox events must be built with the same
    /// resolver, or the daemon will fail to correlate events with the
    /// registrations made here.
    pub fn with_mailbox_resolver(
        daemon: D,
        resolve_mailbox: MailboxResolver,
    ) -> ApplePushService<D> {
        ApplePushService {
            daemon,
            resolve_mailbox,
        }
    }

    /// Decode one command line's arguments into a [`Request`].
    pub fn decode(&self, tag: &str, args: &mut LineReader<'_>) -> Result<Request> {
        parse::parse_xapplepushservice(tag, args)
    }

    /// Process a decoded request.
    ///
    /// Makes exactly one register call per request, no retries, and returns
    /// the replies to emit in order: `Push` then `Ok` on success, a single
    /// `Bad` on failure. Repeated identical requests each get their own
    /// daemon call; deduplication is the daemon's concern.
    pub async fn handle(&self, request: Request, session: &dyn SessionUser) -> Vec<Reply> {
        let Request {
            tag,
            version,
            account_id,
            device_token,
            subtopic,
            mut mailboxes,
        } = request;

        info!(
            %account_id,
            %device_token,
            %subtopic,
            mailboxes = %mailboxes.join(", "),
            "processing push registration"
        );

        if mailboxes.is_empty() {
            // the Dovecot plugin this command originates from assumes INBOX
            // when no explicit mailboxes were passed
            warn!("mailboxes is empty, defaulting to INBOX");
            mailboxes = vec!["INBOX".to_string()];
        }

        let username = session.username();
        let mailboxes = mailboxes
            .iter()
            .map(|name| (self.resolve_mailbox)(name))
            .collect();

        match self
            .daemon
            .register(RegisterRequest {
                account_id,
                device_token,
                subtopic,
                username,
                mailboxes,
            })
            .await
        {
            Ok(topic) => {
                info!(%version, %topic, "responding successfully");
                vec![
                    Reply::Push(Response { version, topic }),
                    Reply::Ok { tag },
                ]
            }
            Err(e) => {
                error!(error = %e, "push registration failed");
                vec![Reply::Bad {
                    tag,
                    text: FAILURE_TEXT.to_string(),
                }]
            }
        }
    }

    /// Serialize one reply to its wire line.
    pub fn encode(&self, reply: &Reply) -> Result<String> {
        encode::encode_reply(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::xapsd::NotifyRequest;
    use async_trait::async_trait;
    use std::io;
    use std::sync::Arc;
    use std::sync::Mutex;

    struct User(&'static str);

    impl SessionUser for User {
        fn username(&self) -> String {
            self.0.to_string()
        }
    }

    #[derive(Default)]
    struct RecordingDaemon {
        registers: Mutex<Vec<RegisterRequest>>,
        fail: bool,
    }

    impl RecordingDaemon {
        fn failing() -> RecordingDaemon {
            RecordingDaemon {
                registers: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl<'a> PushDaemon for &'a RecordingDaemon {
        async fn register(&self, request: RegisterRequest) -> crate::error::Result<String> {
            self.registers.lock().unwrap().push(request);
            if self.fail {
                Err(Error::Io(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "daemon down",
                )))
            } else {
                Ok("com.apple.mail.XServer.deadbeef".to_string())
            }
        }

        async fn notify(&self, _request: NotifyRequest) -> crate::error::Result<()> {
            unreachable!("handler never notifies");
        }
    }

    fn request(mailboxes: &[&str]) -> Request {
        Request {
            tag: "a1".to_string(),
            version: "2".to_string(),
            account_id: "acc".to_string(),
            device_token: "tok".to_string(),
            subtopic: "sub".to_string(),
            mailboxes: mailboxes.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn success_emits_push_then_ok() {
        let daemon = RecordingDaemon::default();
        let service = ApplePushService::new(&daemon);
        let replies = service.handle(request(&["INBOX", "Sent"]), &User("u")).await;
        assert_eq!(
            replies,
            vec![
                Reply::Push(Response {
                    version: "2".to_string(),
                    topic: "com.apple.mail.XServer.deadbeef".to_string(),
                }),
                Reply::Ok {
                    tag: "a1".to_string()
                },
            ]
        );

        let registers = daemon.registers.lock().unwrap();
        assert_eq!(registers.len(), 1);
        assert_eq!(registers[0].username, "u");
        assert_eq!(registers[0].mailboxes, vec!["INBOX", "Sent"]);
    }

    #[tokio::test]
    async fn empty_mailboxes_default_to_inbox() {
        let daemon = RecordingDaemon::default();
        let service = ApplePushService::new(&daemon);
        service.handle(request(&[]), &User("u")).await;
        let registers = daemon.registers.lock().unwrap();
        assert_eq!(registers[0].mailboxes, vec!["INBOX"]);
    }

    #[tokio::test]
    async fn failure_emits_single_bad_and_no_response() {
        let daemon = RecordingDaemon::failing();
        let service = ApplePushService::new(&daemon);
        let replies = service.handle(request(&["INBOX"]), &User("u")).await;
        assert_eq!(
            replies,
            vec![Reply::Bad {
                tag: "a1".to_string(),
                text: "failed.".to_string(),
            }]
        );
        // the call was still attempted exactly once
        assert_eq!(daemon.registers.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn identical_requests_each_reach_the_daemon() {
        let daemon = RecordingDaemon::default();
        let service = ApplePushService::new(&daemon);
        service.handle(request(&["INBOX"]), &User("u")).await;
        service.handle(request(&["INBOX"]), &User("u")).await;
        assert_eq!(daemon.registers.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn custom_mailbox_resolver_is_applied() {
        let daemon = RecordingDaemon::default();
        let service = ApplePushService::with_mailbox_resolver(
            &daemon,
            Arc::new(|name: &str| format!("shared/{}", name)),
        );
        service.handle(request(&["INBOX"]), &User("u")).await;
        let registers = daemon.registers.lock().unwrap();
        assert_eq!(registers[0].mailboxes, vec!["shared/INBOX"]);
    }

    #[tokio::test]
    async fn pass_through_fields_are_untouched() {
        let daemon = RecordingDaemon::default();
        let service = ApplePushService::new(&daemon);
        let mut req = request(&["INBOX"]);
        req.account_id = "weird \"account\"".to_string();
        service.handle(req, &User("u")).await;
        let registers = daemon.registers.lock().unwrap();
        assert_eq!(registers[0].account_id, "weird \"account\"");
    }
}
