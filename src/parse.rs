//! Decoder for the `XAPPLEPUSHSERVICE` argument grammar.
//!
//! The grammar is a fixed sequence of case-sensitive key atoms, each
//! followed by an astring value, ending with a parenthesized mailbox list:
//!
//! ```text
//! aps-version <astring>
//! aps-account-id <astring>
//! aps-device-token <astring>
//! aps-subtopic <astring>
//! mailboxes ( [mailbox ...] )
//! ```
//!
//! Decoding performs exactly one validation: the version must equal
//! [`SUPPORTED_VERSION`]. Mailbox names are not checked for legality or
//! non-emptiness here; the INBOX default is the handler's business.

use crate::error::{ParseError, Result};
use crate::reader::LineReader;
use crate::types::Request;

/// The single protocol version we expect and understand.
pub const SUPPORTED_VERSION: &str = "2";

/// Consumes a `(INBOX Sent Drafts)` structure, returning the names in
/// client order. An empty `()` list is valid and yields no names.
fn parse_mailboxes(reader: &mut LineReader<'_>) -> std::result::Result<Vec<String>, ParseError> {
    let mut mailboxes = Vec::new();

    reader.next_word_char()?;
    reader.consume_char('(')?;
    while reader.next_word_char()? != ')' {
        mailboxes.push(reader.mailbox()?);
    }
    reader.consume_char(')')?;

    Ok(mailboxes)
}

/// Decode the arguments of one `XAPPLEPUSHSERVICE` command into a
/// [`Request`].
///
/// Any structural deviation fails the whole line; no partial request is
/// produced and nothing is sent to the daemon.
pub fn parse_xapplepushservice(tag: &str, reader: &mut LineReader<'_>) -> Result<Request> {
    reader.atom_expect("aps-version")?;
    let version = reader.astring()?;
    if version != SUPPORTED_VERSION {
        return Err(ParseError::UnsupportedVersion(version).into());
    }

    reader.atom_expect("aps-account-id")?;
    let account_id = reader.astring()?;

    reader.atom_expect("aps-device-token")?;
    let device_token = reader.astring()?;

    reader.atom_expect("aps-subtopic")?;
    let subtopic = reader.astring()?;

    reader.atom_expect("mailboxes")?;
    let mailboxes = parse_mailboxes(reader)?;

    reader.eol()?;

    Ok(Request {
        tag: tag.to_string(),
        version,
        account_id,
        device_token,
        subtopic,
        mailboxes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn decode(args: &str) -> Result<Request> {
        let mut reader = LineReader::new(args);
        parse_xapplepushservice("a1", &mut reader)
    }

    #[test]
    fn full_command() {
        let req = decode(
            "aps-version \"2\" aps-account-id \"E4E6C1AB\" \
             aps-device-token \"a0b1c2d3\" aps-subtopic \"com.apple.mobilemail\" \
             mailboxes (INBOX Sent \"Drafts\")",
        )
        .unwrap();
        assert_eq!(req.tag, "a1");
        assert_eq!(req.version, "2");
        assert_eq!(req.account_id, "E4E6C1AB");
        assert_eq!(req.device_token, "a0b1c2d3");
        assert_eq!(req.subtopic, "com.apple.mobilemail");
        assert_eq!(req.mailboxes, vec!["INBOX", "Sent", "Drafts"]);
    }

    #[test]
    fn unquoted_values() {
        let req = decode(
            "aps-version 2 aps-account-id acc aps-device-token tok \
             aps-subtopic sub mailboxes (INBOX)",
        )
        .unwrap();
        assert_eq!(req.account_id, "acc");
        assert_eq!(req.mailboxes, vec!["INBOX"]);
    }

    #[test]
    fn empty_mailbox_list_is_valid() {
        let req = decode(
            "aps-version \"2\" aps-account-id \"a\" aps-device-token \"t\" \
             aps-subtopic \"s\" mailboxes ()",
        )
        .unwrap();
        assert!(req.mailboxes.is_empty());
    }

    #[test]
    fn unsupported_version_fails() {
        let err = decode(
            "aps-version \"3\" aps-account-id \"a\" aps-device-token \"t\" \
             aps-subtopic \"s\" mailboxes (INBOX)",
        )
        .unwrap_err();
        match err {
            Error::Parse(ParseError::UnsupportedVersion(ref v)) => {
                assert_eq!(v, "3");
            }
            e => panic!("unexpected error: {:?}", e),
        }
        assert_eq!(err.to_string(), "Unknown aps-version 3, expected 2.");
    }

    #[test]
    fn wrong_key_atom_fails_with_expected_vs_actual() {
        let err = decode("aps-version \"2\" aps-account \"a\"").unwrap_err();
        assert_eq!(err.to_string(), "Expected aps-account-id, got aps-account.");
    }

    #[test]
    fn missing_list_terminator_fails() {
        assert!(decode(
            "aps-version \"2\" aps-account-id \"a\" aps-device-token \"t\" \
             aps-subtopic \"s\" mailboxes (INBOX"
        )
        .is_err());
    }

    #[test]
    fn trailing_garbage_fails() {
        let err = decode(
            "aps-version \"2\" aps-account-id \"a\" aps-device-token \"t\" \
             aps-subtopic \"s\" mailboxes () extra",
        )
        .unwrap_err();
        match err {
            Error::Parse(ParseError::TrailingData(rest)) => assert_eq!(rest, "extra"),
            e => panic!("unexpected error: {:?}", e),
        }
    }

    #[test]
    fn truncated_line_fails() {
        assert!(decode("aps-version \"2\" aps-account-id").is_err());
        assert!(decode("").is_err());
    }

    #[test]
    fn inbox_normalized_in_list() {
        let req = decode(
            "aps-version \"2\" aps-account-id \"a\" aps-device-token \"t\" \
             aps-subtopic \"s\" mailboxes (inbox)",
        )
        .unwrap();
        assert_eq!(req.mailboxes, vec!["INBOX"]);
    }
}
