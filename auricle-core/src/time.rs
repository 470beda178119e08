//! Duration formatting and serialization helpers.
//!
//! Playback positions and track durations are `std::time::Duration` values;
//! this module renders them the way the player UI displays them and persists
//! them as fractional seconds.

use std::time::Duration;

/// Extension trait for clock-style rendering of durations.
pub trait DurationExt {
    /// Render as `M:SS` with seconds zero-padded to two digits.
    ///
    /// Minutes are not capped at 59; an hour-long track renders as `61:40`
    /// style output, matching the player UI.
    fn as_clock(&self) -> String;
}

impl DurationExt for Duration {
    fn as_clock(&self) -> String {
        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{minutes}:{seconds:02}")
    }
}

/// Serde adapter persisting a [`Duration`] as fractional seconds.
///
/// Used with `#[serde(with = "crate::time::secs")]` on persisted records.
/// Values a `Duration` cannot represent (negative, non-finite, or past
/// `Duration::MAX`) fail deserialization instead of panicking.
pub mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    /// # Errors
    ///
    /// Fails on second counts a `Duration` cannot hold.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_clock_zero() {
        assert_eq!(Duration::ZERO.as_clock(), "0:00");
    }

    #[test]
    fn test_as_clock_pads_seconds() {
        assert_eq!(Duration::from_secs(65).as_clock(), "1:05");
    }

    #[test]
    fn test_as_clock_two_minutes_five() {
        assert_eq!(Duration::from_secs(125).as_clock(), "2:05");
    }

    #[test]
    fn test_as_clock_does_not_cap_minutes() {
        assert_eq!(Duration::from_secs(3700).as_clock(), "61:40");
    }

    #[test]
    fn test_as_clock_truncates_subsecond() {
        assert_eq!(Duration::from_millis(59_900).as_clock(), "0:59");
    }

    #[test]
    fn test_secs_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "secs")]
            d: Duration,
        }

        let json = serde_json::to_string(&Wrapper {
            d: Duration::from_secs_f64(12.5),
        })
        .unwrap();
        assert_eq!(json, r#"{"d":12.5}"#);

        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.d, Duration::from_secs_f64(12.5));
    }

    #[test]
    fn test_secs_rejects_negative() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "secs")]
            #[allow(dead_code)]
            d: Duration,
        }

        let result: Result<Wrapper, _> = serde_json::from_str(r#"{"d":-1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_secs_rejects_out_of_range_without_panicking() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "secs")]
            #[allow(dead_code)]
            d: Duration,
        }

        // Finite but larger than any Duration can hold.
        let result: Result<Wrapper, _> = serde_json::from_str(r#"{"d":1e300}"#);
        assert!(result.is_err());

        let result: Result<Wrapper, _> = serde_json::from_str(r#"{"d":null}"#);
        assert!(result.is_err());
    }
}
