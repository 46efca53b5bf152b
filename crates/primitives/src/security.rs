//! Security code definitions.

use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Error raised when a security code fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid security code: {0} (expected NNNNNN.XX)")]
pub struct ParseCodeError(pub String);

/// Exchange-qualified A-share security code, e.g. `000001.SZ` or `600519.SH`.
///
/// The canonical form is six digits, a dot, and a two-letter uppercase
/// exchange suffix.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
pub struct SecurityCode(String);

impl SecurityCode {
    /// Parse and validate a security code.
    ///
    /// # Errors
    /// Returns [`ParseCodeError`] if the input is not `NNNNNN.XX`.
    pub fn parse(s: impl Into<String>) -> Result<Self, ParseCodeError> {
        let s = s.into();
        let bytes = s.as_bytes();
        let valid = bytes.len() == 9
            && bytes[..6].iter().all(u8::is_ascii_digit)
            && bytes[6] == b'.'
            && bytes[7..].iter().all(u8::is_ascii_uppercase);
        if valid { Ok(Self(s)) } else { Err(ParseCodeError(s)) }
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The six-digit ticker portion, without the exchange suffix.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.0[..6]
    }

    /// The two-letter exchange suffix.
    #[must_use]
    pub fn exchange(&self) -> &str {
        &self.0[7..]
    }
}

impl FromStr for SecurityCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
