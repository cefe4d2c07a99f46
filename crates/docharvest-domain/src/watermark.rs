//! Watermark (last-scan) protocol
//!
//! A watermark is either unset (the source was never scanned successfully)
//! or a point in time. Items whose `updated_at` is at or after the
//! *effective* watermark count as new.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last successful scan of a tracked source
///
/// Persisted as a nullable RFC 3339 timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<DateTime<Utc>>", into = "Option<DateTime<Utc>>")]
pub enum Watermark {
    /// No scan has completed yet
    #[default]
    Unset,

    /// Start time of the last successful scan
    At(DateTime<Utc>),
}

impl Watermark {
    /// The timestamp, if set
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Watermark::Unset => None,
            Watermark::At(t) => Some(*t),
        }
    }

    /// Whether a scan has ever completed
    pub fn is_set(&self) -> bool {
        matches!(self, Watermark::At(_))
    }

    /// Watermark after a successful scan that started at `scan_start`
    ///
    /// Never moves backwards, even if the wall clock did.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use docharvest_domain::Watermark;
    ///
    /// let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let t0 = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    ///
    /// assert_eq!(Watermark::Unset.advance(t0), Watermark::At(t0));
    /// assert_eq!(Watermark::At(t1).advance(t0), Watermark::At(t1));
    /// ```
    pub fn advance(self, scan_start: DateTime<Utc>) -> Watermark {
        match self {
            Watermark::At(prev) if prev > scan_start => Watermark::At(prev),
            _ => Watermark::At(scan_start),
        }
    }
}

impl From<Option<DateTime<Utc>>> for Watermark {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Watermark::Unset, Watermark::At)
    }
}

impl From<Watermark> for Option<DateTime<Utc>> {
    fn from(value: Watermark) -> Self {
        value.timestamp()
    }
}

/// Threshold a scan compares `updated_at` against
///
/// - unset, including past annotations: epoch zero (everything is new)
/// - unset, not including past: `now` (nothing pre-existing is new)
/// - set: the stored timestamp
///
/// # Examples
///
/// ```
/// use chrono::{DateTime, Utc};
/// use docharvest_domain::{effective_watermark, Watermark};
///
/// let now = Utc::now();
/// assert_eq!(effective_watermark(Watermark::Unset, true, now), DateTime::<Utc>::UNIX_EPOCH);
/// assert_eq!(effective_watermark(Watermark::Unset, false, now), now);
/// ```
pub fn effective_watermark(
    watermark: Watermark,
    include_past: bool,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match watermark {
        Watermark::At(t) => t,
        Watermark::Unset if include_past => DateTime::<Utc>::UNIX_EPOCH,
        Watermark::Unset => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_effective_unset_include_past() {
        assert_eq!(
            effective_watermark(Watermark::Unset, true, at(1_000)),
            DateTime::<Utc>::UNIX_EPOCH
        );
    }

    #[test]
    fn test_effective_unset_exclude_past() {
        assert_eq!(effective_watermark(Watermark::Unset, false, at(1_000)), at(1_000));
    }

    #[test]
    fn test_effective_set_ignores_config() {
        let mark = Watermark::At(at(500));
        assert_eq!(effective_watermark(mark, true, at(1_000)), at(500));
        assert_eq!(effective_watermark(mark, false, at(1_000)), at(500));
    }

    #[test]
    fn test_serde_as_nullable_timestamp() {
        let unset = serde_json::to_string(&Watermark::Unset).unwrap();
        assert_eq!(unset, "null");

        let mark = Watermark::At(at(0));
        let json = serde_json::to_string(&mark).unwrap();
        assert_eq!(json, "\"1970-01-01T00:00:00Z\"");

        let back: Watermark = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mark);
    }

    #[test]
    fn test_is_set() {
        assert!(!Watermark::Unset.is_set());
        assert!(Watermark::At(at(1)).is_set());
        assert_eq!(Watermark::Unset.timestamp(), None);
    }

    proptest! {
        #[test]
        fn prop_advance_is_monotonic(starts in proptest::collection::vec(-1_000_000i64..1_000_000, 1..20)) {
            let base = at(1_700_000_000);
            let mut mark = Watermark::Unset;
            for offset in starts {
                let before = mark;
                mark = mark.advance(base + Duration::seconds(offset));
                if let Watermark::At(prev) = before {
                    prop_assert!(mark.timestamp().unwrap() >= prev);
                }
            }
        }

        #[test]
        fn prop_effective_never_after_now_when_unset(secs in 0i64..4_000_000_000, include_past: bool) {
            let now = at(secs);
            prop_assert!(effective_watermark(Watermark::Unset, include_past, now) <= now);
        }
    }
}
