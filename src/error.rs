use std::error::Error as StdError;
use std::fmt;
use std::io::Error as IoError;
use std::result;

pub type Result<T> = result::Result<T, Error>;

/// A set of errors that can occur while serving the extension.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An `io::Error` raised by a daemon transport.
    Io(IoError),
    /// An error decoding a command line sent by a client.
    Parse(ParseError),
    /// Error validating data before it is put on the wire.
    Validate(ValidateError),
    /// An error from `reqwest` while talking to the push daemon.
    ///
    /// This covers connection failures, timeouts, and non-success HTTP
    /// statuses (the daemon client folds those in via `error_for_status`).
    Daemon(reqwest::Error),
    /// The configured daemon base URL could not be parsed.
    BadBaseUrl(String),
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<ValidateError> for Error {
    fn from(err: ValidateError) -> Error {
        Error::Validate(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Daemon(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Io(ref e) => fmt::Display::fmt(e, f),
            Error::Parse(ref e) => fmt::Display::fmt(e, f),
            Error::Validate(ref e) => fmt::Display::fmt(e, f),
            Error::Daemon(ref e) => fmt::Display::fmt(e, f),
            Error::BadBaseUrl(ref url) => write!(f, "invalid daemon base URL: {}", url),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            Error::Parse(ref e) => Some(e),
            Error::Validate(ref e) => Some(e),
            Error::Daemon(ref e) => Some(e),
            Error::BadBaseUrl(_) => None,
        }
    }
}

/// An error decoding a single command line.
///
/// Decoding fails closed: no partial request is produced and no daemon call
/// is made. The `Display` text of these variants is what ends up in the
/// tagged `BAD` reply, so it names what was expected and what was found,
/// nothing more.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// A fixed atom in the grammar did not match.
    Mismatch {
        /// The atom the grammar called for at this position.
        expected: String,
        /// What the client actually sent.
        found: String,
    },
    /// The client requested a protocol version we do not speak.
    UnsupportedVersion(String),
    /// The line ended while more input was expected.
    UnexpectedEnd(String),
    /// A character that does not fit the grammar at this position.
    UnexpectedChar {
        /// Description of what the grammar called for.
        expected: String,
        /// The offending character.
        found: char,
    },
    /// Content remained after the grammar was fully consumed.
    TrailingData(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ParseError::Mismatch {
                ref expected,
                ref found,
            } => write!(f, "Expected {}, got {}.", expected, found),
            ParseError::UnsupportedVersion(ref v) => {
                write!(
                    f,
                    "Unknown aps-version {}, expected {}.",
                    v,
                    crate::parse::SUPPORTED_VERSION
                )
            }
            ParseError::UnexpectedEnd(ref expected) => {
                write!(f, "Expected {}, got end of line.", expected)
            }
            ParseError::UnexpectedChar {
                ref expected,
                found,
            } => write!(f, "Expected {}, got {:?}.", expected, found),
            ParseError::TrailingData(ref rest) => {
                write!(f, "Expected end of line, got {:?}.", rest)
            }
        }
    }
}

impl StdError for ParseError {}

/// Invalid character found in data destined for a quoted string.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidateError(pub char);

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // print character in debug form because invalid ones are often whitespaces
        write!(f, "Invalid character in input: {:?}", self.0)
    }
}

impl StdError for ValidateError {}
