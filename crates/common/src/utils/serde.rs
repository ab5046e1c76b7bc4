//! Serialization utilities for durations
//!
//! Timeouts and retry delays travel through config files and environment
//! variables as integer milliseconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serde serialization result type
type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

fn to_millis(duration: &Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// `Duration` as milliseconds (u64)
///
/// # Usage
/// ```rust,ignore
/// use std::time::Duration;
///
/// use marketlink_common::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Backoff {
///     #[serde(with = "duration_millis")]
///     step: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::{to_millis, Deserialize, Deserializer, Duration, SerializeResult, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.serialize_u64(to_millis(duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
