//! Read filters and the magnitude acceptance policy

use crate::record::EarthquakeRecord;

/// Conventional threshold for the filtered deployment.
pub const DEFAULT_MIN_MAGNITUDE: f64 = 4.0;

/// Which records a store scan returns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RecordFilter {
    #[default]
    All,
    /// `magnitude >= threshold`
    MinMagnitude(f64),
}

impl RecordFilter {
    pub fn matches(&self, record: &EarthquakeRecord) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::MinMagnitude(threshold) => record.reaches(*threshold),
        }
    }
}

/// Single magnitude policy applied to ingestion, inbound POSTs and reads.
///
/// With no threshold every record is accepted and reads are unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RecordPolicy {
    pub min_magnitude: Option<f64>,
}

impl RecordPolicy {
    pub fn unfiltered() -> Self {
        Self { min_magnitude: None }
    }

    pub fn at_least(threshold: f64) -> Self {
        Self {
            min_magnitude: Some(threshold),
        }
    }

    /// Whether a record may be persisted.
    pub fn accepts(&self, record: &EarthquakeRecord) -> bool {
        self.read_filter().matches(record)
    }

    /// Filter used when serving reads.
    pub fn read_filter(&self) -> RecordFilter {
        match self.min_magnitude {
            Some(threshold) => RecordFilter::MinMagnitude(threshold),
            None => RecordFilter::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_matches_everything() {
        assert!(RecordFilter::All.matches(&EarthquakeRecord::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_policy_threshold() {
        let policy = RecordPolicy::at_least(DEFAULT_MIN_MAGNITUDE);
        assert!(policy.accepts(&EarthquakeRecord::new(4.0, 0.0, 0.0)));
        assert!(policy.accepts(&EarthquakeRecord::new(6.3, 0.0, 0.0)));
        assert!(!policy.accepts(&EarthquakeRecord::new(3.99, 0.0, 0.0)));
        assert_eq!(policy.read_filter(), RecordFilter::MinMagnitude(4.0));
    }

    #[test]
    fn test_unfiltered_policy() {
        let policy = RecordPolicy::unfiltered();
        assert!(policy.accepts(&EarthquakeRecord::new(0.1, 0.0, 0.0)));
        assert_eq!(policy.read_filter(), RecordFilter::All);
        assert_eq!(policy, RecordPolicy::default());
    }

    proptest! {
        #[test]
        fn prop_accepts_iff_threshold_reached(magnitude in -2.0f64..12.0, threshold in 0.0f64..10.0) {
            let record = EarthquakeRecord::new(magnitude, 0.0, 0.0);
            let policy = RecordPolicy::at_least(threshold);
            prop_assert_eq!(policy.accepts(&record), magnitude >= threshold);
            prop_assert_eq!(policy.read_filter().matches(&record), policy.accepts(&record));
        }
    }
}
