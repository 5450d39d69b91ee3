//! Tokenizer for a single command line.
//!
//! [`LineReader`] exposes the small set of decoding primitives the command
//! grammar is written in terms of: consume an atom (optionally verifying it
//! against an expected literal), consume an astring value, consume a single
//! delimiter character, skip to the next word, and assert end of line. Token
//! recognition itself is done with `nom`; the reader drives sequencing and
//! produces expected-vs-actual error text.

use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::{anychar, char, none_of};
use nom::multi::fold_many0;
use nom::sequence::{delimited, preceded};
use nom::IResult;

use crate::error::ParseError;

/// Characters that may appear in an unquoted atom. This is the RFC 3501
/// `ATOM-CHAR` set, minus list wildcards and resp-specials.
fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && !c.is_control() && !matches!(c, '(' | ')' | '{' | '"' | '\\' | '%' | '*')
}

fn atom_token(input: &str) -> IResult<&str, &str> {
    take_while1(is_atom_char)(input)
}

/// A double-quoted string. Backslash escapes the next character; in practice
/// only `\"` and `\\` are produced by conforming clients.
fn quoted_token(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((preceded(char('\\'), anychar), none_of("\"\\"))),
            String::new,
            |mut acc, c| {
                acc.push(c);
                acc
            },
        ),
        char('"'),
    )(input)
}

/// Reads tokens off the argument portion of a command line.
///
/// The tag and command name are assumed to have been consumed by the
/// dispatch layer; the reader sees only the arguments. A trailing CRLF (or
/// bare LF) is stripped on construction.
#[derive(Debug)]
pub struct LineReader<'a> {
    rest: &'a str,
}

impl<'a> LineReader<'a> {
    pub fn new(line: &'a str) -> LineReader<'a> {
        let rest = line
            .strip_suffix("\r\n")
            .or_else(|| line.strip_suffix('\n'))
            .unwrap_or(line);
        LineReader { rest }
    }

    fn skip_spaces(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\t']);
    }

    /// Skip whitespace and return the next character without consuming it.
    pub fn next_word_char(&mut self) -> Result<char, ParseError> {
        self.skip_spaces();
        self.rest
            .chars()
            .next()
            .ok_or_else(|| ParseError::UnexpectedEnd("an argument".to_string()))
    }

    /// Consume exactly the given character. Does not skip whitespace.
    pub fn consume_char(&mut self, expected: char) -> Result<(), ParseError> {
        match self.rest.chars().next() {
            Some(c) if c == expected => {
                self.rest = &self.rest[c.len_utf8()..];
                Ok(())
            }
            Some(c) => Err(ParseError::UnexpectedChar {
                expected: format!("{:?}", expected),
                found: c,
            }),
            None => Err(ParseError::UnexpectedEnd(format!("{:?}", expected))),
        }
    }

    /// Consume one atom.
    pub fn atom(&mut self) -> Result<&'a str, ParseError> {
        self.skip_spaces();
        match atom_token(self.rest) {
            Ok((rest, atom)) => {
                self.rest = rest;
                Ok(atom)
            }
            Err(_) => match self.rest.chars().next() {
                Some(c) => Err(ParseError::UnexpectedChar {
                    expected: "an atom".to_string(),
                    found: c,
                }),
                None => Err(ParseError::UnexpectedEnd("an atom".to_string())),
            },
        }
    }

    /// Consume an atom and verify it against the expected literal, failing
    /// with an expected-vs-actual message if it does not match.
    pub fn atom_expect(&mut self, expected: &str) -> Result<(), ParseError> {
        let actual = match self.atom() {
            Ok(a) => a,
            Err(ParseError::UnexpectedEnd(_)) => {
                return Err(ParseError::UnexpectedEnd(expected.to_string()))
            }
            Err(ParseError::UnexpectedChar { found, .. }) => {
                return Err(ParseError::UnexpectedChar {
                    expected: expected.to_string(),
                    found,
                })
            }
            Err(e) => return Err(e),
        };
        if actual == expected {
            Ok(())
        } else {
            Err(ParseError::Mismatch {
                expected: expected.to_string(),
                found: actual.to_string(),
            })
        }
    }

    /// Consume an astring: either a quoted string or a bare atom.
    ///
    /// Literal (`{n}` octet-count) syntax is not accepted here; the values
    /// carried by this command are short client-generated tokens.
    pub fn astring(&mut self) -> Result<String, ParseError> {
        self.skip_spaces();
        if self.rest.starts_with('"') {
            match quoted_token(self.rest) {
                Ok((rest, s)) => {
                    self.rest = rest;
                    Ok(s)
                }
                Err(_) => Err(ParseError::UnexpectedEnd("a closing quote".to_string())),
            }
        } else {
            self.atom().map(String::from)
        }
    }

    /// Consume a mailbox name.
    ///
    /// Mailbox names use astring syntax, with the special case that the
    /// INBOX name is matched case-insensitively and normalized to `INBOX`.
    pub fn mailbox(&mut self) -> Result<String, ParseError> {
        let name = self.astring()?;
        if name.eq_ignore_ascii_case("INBOX") {
            Ok("INBOX".to_string())
        } else {
            Ok(name)
        }
    }

    /// Assert that nothing but whitespace remains on the line.
    pub fn eol(&mut self) -> Result<(), ParseError> {
        self.skip_spaces();
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(ParseError::TrailingData(self.rest.to_string()))
        }
    }
}
