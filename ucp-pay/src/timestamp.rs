//! Unix timestamp utilities for token lifetime windows.
//!
//! Vault tokens carry a `createdAt`/`expiresAt` pair expressed in seconds
//! since the Unix epoch. Timestamps serialize as stringified integers so
//! that JSON consumers whose number type cannot represent all 64-bit
//! integers never lose precision.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::time::SystemTime;

/// Seconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// # Serialization
///
/// Serialized as a stringified integer:
///
/// ```json
/// "1754550000"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnixTimestamp(u64);

impl Serialize for UnixTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for UnixTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let secs = s
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom("timestamp must be a non-negative integer"))?;
        Ok(Self(secs))
    }
}

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<u64> for UnixTimestamp {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl UnixTimestamp {
    /// Creates a [`UnixTimestamp`] from a raw seconds value.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the current system time as a [`UnixTimestamp`].
    ///
    /// # Panics
    ///
    /// Panics if the system clock is set to a time before the Unix epoch,
    /// which should never happen on properly configured systems.
    #[must_use]
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("SystemTime before UNIX epoch?!?")
            .as_secs();
        Self(secs)
    }

    /// Returns the timestamp as raw seconds since the Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Returns `true` once the current time has moved strictly past this
    /// timestamp.
    #[must_use]
    pub fn is_past(&self) -> bool {
        Self::now().0 > self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_string() {
        let ts = UnixTimestamp::from_secs(1754550000);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"1754550000\"");
    }

    #[test]
    fn deserializes_from_string() {
        let ts: UnixTimestamp = serde_json::from_str("\"900\"").unwrap();
        assert_eq!(ts.as_secs(), 900);
    }

    #[test]
    fn rejects_non_numeric_strings() {
        assert!(serde_json::from_str::<UnixTimestamp>("\"soon\"").is_err());
        assert!(serde_json::from_str::<UnixTimestamp>("\"-5\"").is_err());
    }

    #[test]
    fn add_saturates() {
        let ts = UnixTimestamp::from_secs(u64::MAX) + 900;
        assert_eq!(ts.as_secs(), u64::MAX);
    }

    #[test]
    fn past_and_future() {
        assert!(UnixTimestamp::from_secs(0).is_past());
        assert!(!(UnixTimestamp::now() + 3600).is_past());
    }
}
