use crate::error::{ConfigError, TokenError};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A short link identifier.
///
/// A token is always a single, non-empty path segment, so that
/// `prefix + "/" + token` names exactly one record and the token can be used
/// verbatim as a mirror object key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
    /// Creates a `Token` after checking that it is a non-empty path segment.
    ///
    /// Characters are not checked against an alphabet: tokens arriving from
    /// requests or change events are looked up as-is.
    pub fn new(token: impl Into<String>) -> Result<Self, TokenError> {
        let token = token.into();
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        if token.contains('/') {
            return Err(TokenError::NotASegment(token));
        }
        Ok(Self(token))
    }

    /// Creates a `Token` without validation.
    ///
    /// Only for strings built from a validated [`Alphabet`].
    pub(crate) fn new_unchecked(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Joins the token onto a base URL, e.g. `https://sho.rt` -> `https://sho.rt/abc123`.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Token {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Token> for String {
    fn from(value: Token) -> Self {
        value.0
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// The character set tokens are drawn from.
///
/// The alphabet is taken literally: `a-z` means the three characters `a`, `-`
/// and `z`. Repeated characters are kept once so that sampling stays uniform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    pub fn new(chars: &str) -> Result<Self, ConfigError> {
        let mut unique: Vec<char> = Vec::with_capacity(chars.len());
        for c in chars.chars() {
            if c == '/' {
                return Err(ConfigError::SeparatorInAlphabet);
            }
            if !unique.contains(&c) {
                unique.push(c);
            }
        }

        if unique.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }

        Ok(Self { chars: unique })
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always `false`; an alphabet cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in &self.chars {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl FromStr for Alphabet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
