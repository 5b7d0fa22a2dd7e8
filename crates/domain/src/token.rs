//! API token: the shared credential callers present on every request.

use std::fmt;

use subtle::ConstantTimeEq;

use crate::error::AuthError;

/// A lexically valid API token: non-empty, ASCII alphanumeric.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Parse a raw token, rejecting absent or malformed input.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedToken`] if the value is empty or contains
    /// anything other than ASCII letters and digits.
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(AuthError::MalformedToken);
        }
        Ok(Self(raw.to_string()))
    }

    /// Compare against `candidate` in constant time.
    #[must_use]
    pub fn verify(&self, candidate: &ApiToken) -> bool {
        self.0.as_bytes().ct_eq(candidate.0.as_bytes()).into()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}
