//! The "top N" cutoff supplied in request paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

use crate::error::{HazardError, HazardResult};

/// Positive rank cutoff for a ranking query.
///
/// Rows whose window rank is at most this value are returned. Tied rows share
/// a rank, so a response can hold more features than the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Limit(NonZeroU32);

impl Limit {
    /// Create a limit from a raw value, rejecting zero.
    pub fn new(value: u32) -> HazardResult<Self> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| HazardError::InvalidLimit("must be a positive integer, got 0".into()))
    }

    /// Parse a path segment such as `"25"`.
    ///
    /// Accepts only plain decimal digits: signs, whitespace, fractions and
    /// values above `u32::MAX` are rejected.
    pub fn parse(raw: &str) -> HazardResult<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HazardError::InvalidLimit(format!(
                "must be a positive integer, got '{}'",
                raw
            )));
        }

        let value: u32 = raw.parse().map_err(|_| {
            HazardError::InvalidLimit(format!("'{}' is out of range", raw))
        })?;

        Self::new(value)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Value as bound to the `int8` query parameter.
    pub fn as_i64(self) -> i64 {
        i64::from(self.0.get())
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
