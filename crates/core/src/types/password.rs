//! Plaintext password wrapper with sign-up validation.

use std::fmt;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Minimum password length accepted at sign-up and login.
pub const MIN_LENGTH: usize = 8;

/// Errors that can occur when validating a password.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// The password is shorter than [`MIN_LENGTH`] characters.
    #[error("password must be at least {MIN_LENGTH} characters")]
    TooShort,
}

/// A plaintext password that has passed length validation.
///
/// The value is never printed: `Debug` renders a placeholder and there is no
/// `Display` or `Serialize` implementation.
///
/// ```
/// use shopzify_core::Password;
///
/// assert!(Password::parse("hunter22").is_ok());
/// assert!(Password::parse("short").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Validate and wrap a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::TooShort`] if the password has fewer than
    /// [`MIN_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, PasswordError> {
        if s.chars().count() < MIN_LENGTH {
            return Err(PasswordError::TooShort);
        }
        Ok(Self(s.to_owned()))
    }

    /// Borrow the plaintext. Only hashing and login requests should call this.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl<'de> Deserialize<'de> for Password {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
