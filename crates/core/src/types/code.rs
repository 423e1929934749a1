//! One-time login code type.
//!
//! A short numeric credential issued per phone number, valid for exactly
//! one successful verification within a fixed time window.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`OneTimeCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CodeError {
    /// The input string is empty.
    #[error("code cannot be empty")]
    Empty,
    /// The code has the wrong number of digits.
    #[error("code must be {expected} digits")]
    WrongLength {
        /// Expected number of digits.
        expected: usize,
    },
    /// The code contains a non-digit character.
    #[error("code must contain only digits")]
    NotNumeric,
}

/// A one-time numeric login code.
///
/// Codes are always [`Self::LENGTH`] ASCII digits. Comparison is plain
/// equality; single-use and expiry semantics live in the store, which
/// records issuance time and a consumed flag per code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OneTimeCode(String);

impl OneTimeCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 4;

    /// Parse a `OneTimeCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, has the wrong length, or
    /// contains non-digit characters.
    pub fn parse(s: &str) -> Result<Self, CodeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CodeError::Empty);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::NotNumeric);
        }
        if trimmed.len() != Self::LENGTH {
            return Err(CodeError::WrongLength {
                expected: Self::LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Build a code from a numeric value in `0..10^LENGTH`, zero-padded.
    ///
    /// Values outside the range wrap modulo `10^LENGTH`.
    #[must_use]
    pub fn from_number(n: u32) -> Self {
        let modulus = 10_u32.pow(u32::try_from(Self::LENGTH).unwrap_or(4));
        Self(format!("{:04}", n % modulus))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OneTimeCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OneTimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OneTimeCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for OneTimeCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OneTimeCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OneTimeCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OneTimeCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
