//! Client for [xapsd](https://github.com/freswa/dovecot-xaps-daemon)'s HTTP
//! API.
//!
//! Two stateless operations: `POST /register` stores a device registration
//! and returns the APNS root topic as the raw response body, and `POST
//! /notify` asks the daemon to push for a mailbox event. The daemon looks
//! up which device to notify by the username and mailbox strings alone, so
//! callers must send the same resolved strings on both operations.
//!
//! The seam is the [`PushDaemon`] trait so the handler and listener can be
//! exercised without a network; [`HttpClient`] is the real implementation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::PushEvent;

/// Default daemon address, matching xapsd's stock configuration.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11619/";

/// Payload for the `/register` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    /// Mail account reference as sent by the device.
    #[serde(rename = "ApsAccountId")]
    pub account_id: String,
    /// Push token as sent by the device.
    #[serde(rename = "ApsDeviceToken")]
    pub device_token: String,
    /// APNS subtopic; stored by the daemon and replayed during notify.
    #[serde(rename = "ApsSubtopic")]
    pub subtopic: String,
    /// Resolved username; must match what notify later sends.
    #[serde(rename = "Username")]
    pub username: String,
    /// Resolved mailbox names; must match what notify later sends.
    #[serde(rename = "Mailboxes")]
    pub mailboxes: Vec<String>,
}

/// Payload for the `/notify` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifyRequest {
    /// Resolved username, as sent during register.
    #[serde(rename = "Username")]
    pub username: String,
    /// Resolved mailbox name, as sent during register.
    #[serde(rename = "Mailbox")]
    pub mailbox: String,
    /// Deduplicated event names for this mailbox change.
    #[serde(rename = "Events")]
    pub events: BTreeSet<PushEvent>,
}

/// The daemon operations this extension depends on.
///
/// Both calls suspend exactly once, on the underlying HTTP round trip, and
/// impose no deadline of their own beyond the transport's.
#[async_trait]
pub trait PushDaemon: Send + Sync {
    /// Register a device for push notifications.
    ///
    /// Returns the APNS root topic to hand back in the command response.
    async fn register(&self, request: RegisterRequest) -> Result<String>;

    /// Notify the daemon of a mailbox event.
    async fn notify(&self, request: NotifyRequest) -> Result<()>;
}

/// `PushDaemon` over HTTP via `reqwest`.
///
/// The base address is fixed at construction and immutable thereafter;
/// there is no other shared state.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    register_url: reqwest::Url,
    notify_url: reqwest::Url,
}

impl HttpClient {
    /// Create a client for the daemon at `base_url`.
    pub fn new(base_url: &str) -> Result<HttpClient> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base: reqwest::Url = base
            .parse()
            .map_err(|_| Error::BadBaseUrl(base_url.to_string()))?;
        let register_url = base
            .join("register")
            .map_err(|_| Error::BadBaseUrl(base_url.to_string()))?;
        let notify_url = base
            .join("notify")
            .map_err(|_| Error::BadBaseUrl(base_url.to_string()))?;

        info!(%base, "xapsd client initialized");

        Ok(HttpClient {
            http: reqwest::Client::new(),
            register_url,
            notify_url,
        })
    }
}

#[async_trait]
impl PushDaemon for HttpClient {
    async fn register(&self, request: RegisterRequest) -> Result<String> {
        debug!(
            account_id = %request.account_id,
            username = %request.username,
            "registering device with xapsd"
        );
        let response = self
            .http
            .post(self.register_url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        // the topic is the raw response body, not JSON
        Ok(response.text().await?)
    }

    async fn notify(&self, request: NotifyRequest) -> Result<()> {
        debug!(
            username = %request.username,
            mailbox = %request.mailbox,
            "notifying xapsd"
        );
        self.http
            .post(self.notify_url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_payload_shape() {
        let request = RegisterRequest {
            account_id: "E4E6C1AB".to_string(),
            device_token: "a0b1c2d3".to_string(),
            subtopic: "com.apple.mobilemail".to_string(),
            username: "user@example.com".to_string(),
            mailboxes: vec!["INBOX".to_string(), "Sent".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "ApsAccountId": "E4E6C1AB",
                "ApsDeviceToken": "a0b1c2d3",
                "ApsSubtopic": "com.apple.mobilemail",
                "Username": "user@example.com",
                "Mailboxes": ["INBOX", "Sent"],
            })
        );
    }

    #[test]
    fn notify_payload_shape() {
        let mut events = BTreeSet::new();
        events.insert(PushEvent::MessageAppend);
        events.insert(PushEvent::MessageNew);
        let request = NotifyRequest {
            username: "user@example.com".to_string(),
            mailbox: "INBOX".to_string(),
            events,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "Username": "user@example.com",
                "Mailbox": "INBOX",
                "Events": ["MessageNew", "MessageAppend"],
            })
        );
    }

    #[test]
    fn base_url_needs_to_parse() {
        assert!(HttpClient::new("not a url").is_err());
        assert!(HttpClient::new(DEFAULT_BASE_URL).is_ok());
    }

    #[test]
    fn base_url_without_trailing_slash() {
        let client = HttpClient::new("http://push.internal:11619").unwrap();
        assert_eq!(
            client.register_url.as_str(),
            "http://push.internal:11619/register"
        );
        assert_eq!(
            client.notify_url.as_str(),
            "http://push.internal:11619/notify"
        );
    }
}
