//! Batch counters
//!
//! `BatchTally` only ever grows. The success rate is computed against the
//! number of records in the input, not the number processed so far.

use serde::{Deserialize, Serialize};

/// Running success/failure counts of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTally {
    pub success_count: u64,
    pub fail_count: u64,
    /// Number of records in the input sequence
    pub total: u64,
}

impl BatchTally {
    pub fn new(total: u64) -> Self {
        Self {
            success_count: 0,
            fail_count: 0,
            total,
        }
    }

    /// Count one processed record
    pub fn record(&mut self, succeeded: bool) {
        if succeeded {
            self.success_count += 1;
        } else {
            self.fail_count += 1;
        }
    }

    /// Records processed so far
    pub fn processed(&self) -> u64 {
        self.success_count + self.fail_count
    }

    /// `success_count / total * 100`; zero for an empty batch
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.success_count as f64 / self.total as f64 * 100.0
    }

    /// Success rate with one decimal place, e.g. `"50.0%"`
    pub fn success_rate_display(&self) -> String {
        format!("{:.1}%", self.success_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts() {
        let mut tally = BatchTally::new(3);
        tally.record(true);
        tally.record(false);
        tally.record(true);
        assert_eq!(tally.success_count, 2);
        assert_eq!(tally.fail_count, 1);
        assert_eq!(tally.processed(), 3);
    }

    #[test]
    fn test_success_rate_display() {
        let mut tally = BatchTally::new(2);
        tally.record(true);
        tally.record(false);
        assert_eq!(tally.success_rate_display(), "50.0%");

        let mut tally = BatchTally::new(3);
        tally.record(true);
        assert_eq!(tally.success_rate_display(), "33.3%");
    }

    #[test]
    fn test_empty_rate_is_zero() {
        assert_eq!(BatchTally::new(0).success_rate_display(), "0.0%");
    }

    proptest::proptest! {
        #[test]
        fn prop_counts_partition_processed(results in proptest::collection::vec(proptest::bool::ANY, 0..200)) {
            let mut tally = BatchTally::new(results.len() as u64);
            for ok in &results {
                tally.record(*ok);
            }
            let successes = results.iter().filter(|ok| **ok).count() as u64;
            proptest::prop_assert_eq!(tally.success_count, successes);
            proptest::prop_assert_eq!(tally.processed(), results.len() as u64);
            proptest::prop_assert!(tally.success_rate() >= 0.0 && tally.success_rate() <= 100.0);
        }
    }
}
