//! Encoder for replies to the `XAPPLEPUSHSERVICE` command.
//!
//! A successful registration produces an untagged data line carrying the
//! echoed version and the daemon-assigned topic, followed by a tagged `OK`;
//! a failure produces a single tagged `BAD`. String values go on the wire
//! as quoted strings with backslash/double-quote escaping, and values that
//! cannot be quoted (embedded CR or LF) are rejected before emission.

use crate::error::{Result, ValidateError};
use crate::types::{Reply, Response};
use crate::COMMAND;

macro_rules! quote {
    ($x:expr) => {
        format!("\"{}\"", $x.replace('\\', "\\\\").replace('"', "\\\""))
    };
}

/// Quote a string for the wire, rejecting values no quoting can make safe.
pub fn validate_str(value: &str) -> Result<String> {
    let quoted = quote!(value);
    if quoted.contains('\n') {
        return Err(ValidateError('\n').into());
    }
    if quoted.contains('\r') {
        return Err(ValidateError('\r').into());
    }
    Ok(quoted)
}

/// Serialize the untagged data response.
pub fn encode_response(response: &Response) -> Result<String> {
    Ok(format!(
        "* {} aps-version {} aps-topic {}\r\n",
        COMMAND,
        validate_str(&response.version)?,
        validate_str(&response.topic)?,
    ))
}

/// Serialize one reply to a wire-ready line, CRLF included.
pub fn encode_reply(reply: &Reply) -> Result<String> {
    match *reply {
        Reply::Push(ref response) => encode_response(response),
        Reply::Ok { ref tag } => Ok(format!("{} OK {} completed.\r\n", tag, COMMAND)),
        Reply::Bad { ref tag, ref text } => Ok(format!("{} BAD {}\r\n", tag, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn encode_push_response() {
        let line = encode_response(&Response {
            version: "2".to_string(),
            topic: "com.apple.mail.XServer.deadbeef".to_string(),
        })
        .unwrap();
        assert_eq!(
            line,
            "* XAPPLEPUSHSERVICE aps-version \"2\" aps-topic \"com.apple.mail.XServer.deadbeef\"\r\n"
        );
    }

    #[test]
    fn encode_tagged_statuses() {
        let ok = encode_reply(&Reply::Ok {
            tag: "a2".to_string(),
        })
        .unwrap();
        assert_eq!(ok, "a2 OK XAPPLEPUSHSERVICE completed.\r\n");

        let bad = encode_reply(&Reply::Bad {
            tag: "a3".to_string(),
            text: "failed.".to_string(),
        })
        .unwrap();
        assert_eq!(bad, "a3 BAD failed.\r\n");
    }

    #[test]
    fn quote_backslash() {
        assert_eq!("\"test\\\\text\"", quote!(r"test\text"));
    }

    #[test]
    fn quote_dquote() {
        assert_eq!("\"test\\\"text\"", quote!("test\"text"));
    }

    #[test]
    fn validate_newline() {
        match validate_str("test\nstring") {
            Err(Error::Validate(ValidateError('\n'))) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn validate_carriage_return() {
        match validate_str("test\rstring") {
            Err(Error::Validate(ValidateError('\r'))) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn topic_with_newline_is_rejected() {
        assert!(encode_response(&Response {
            version: "2".to_string(),
            topic: "bad\r\ntopic".to_string(),
        })
        .is_err());
    }
}
