use std::time::Duration;

use crate::char_len;

/// Derived statistics for one input/summary pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub original_length: usize,
    pub summary_length: usize,
    pub compression_ratio: f64,
    pub processing_time_seconds: f64,
}

pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn compute(original: &str, summary: &str, elapsed: Duration) -> Metrics {
        Self::compute_secs(original, summary, elapsed.as_secs_f64())
    }

    pub fn compute_secs(original: &str, summary: &str, elapsed_seconds: f64) -> Metrics {
        let original_length = char_len(original);
        let summary_length = char_len(summary);
        // Floor of one keeps an empty summary from dividing by zero
        let ratio = original_length as f64 / summary_length.max(1) as f64;

        Metrics {
            original_length,
            summary_length,
            compression_ratio: round_to(ratio, 2),
            processing_time_seconds: round_to(elapsed_seconds.max(0.0), 3),
        }
    }
}

/// Rounds to `decimals` places, sending exact halves to the even neighbour.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    let rounded = if scaled.fract().abs() == 0.5 {
        scaled.round_ties_even()
    } else {
        scaled.round()
    };
    rounded / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_ratio_rounding() {
        let metrics = MetricsCalculator::compute_secs(&"a".repeat(100), &"b".repeat(30), 0.0);
        assert_eq!(metrics.original_length, 100);
        assert_eq!(metrics.summary_length, 30);
        assert_eq!(metrics.compression_ratio, 3.33);
    }

    #[test]
    fn test_exact_ties_round_to_even() {
        // 615 / 120 == 5.125 and 61 / 8 == 7.625 are exact in binary
        let metrics = MetricsCalculator::compute_secs(&"a".repeat(615), &"b".repeat(120), 0.0);
        assert_eq!(metrics.compression_ratio, 5.12);

        let metrics = MetricsCalculator::compute_secs(&"a".repeat(61), &"b".repeat(8), 0.0);
        assert_eq!(metrics.compression_ratio, 7.62);

        let metrics = MetricsCalculator::compute_secs(&"a".repeat(63), &"b".repeat(8), 0.0);
        assert_eq!(metrics.compression_ratio, 7.88);
    }

    #[test]
    fn test_processing_time_ties_round_to_even() {
        assert_eq!(MetricsCalculator::compute_secs("a", "a", 0.0625).processing_time_seconds, 0.062);
        assert_eq!(MetricsCalculator::compute_secs("a", "a", 0.1875).processing_time_seconds, 0.188);
    }

    #[test]
    fn test_empty_summary_uses_floor_of_one() {
        let metrics = MetricsCalculator::compute_secs(&"a".repeat(60), "", 0.5);
        assert_eq!(metrics.summary_length, 0);
        assert_eq!(metrics.compression_ratio, 60.0);
    }

    #[test]
    fn test_lengths_are_characters() {
        let original = "Центральный банк России повысил ключевую ставку.";
        let metrics = MetricsCalculator::compute_secs(original, "Ставка", 0.0);
        assert_eq!(metrics.original_length, original.chars().count());
        assert_eq!(metrics.summary_length, 6);
    }

    #[test]
    fn test_processing_time_three_decimals() {
        let metrics = MetricsCalculator::compute(
            "abc",
            "a",
            Duration::from_micros(1_234_567),
        );
        assert_eq!(metrics.processing_time_seconds, 1.235);

        let metrics = MetricsCalculator::compute_secs("abc", "a", -0.2);
        assert_eq!(metrics.processing_time_seconds, 0.0);
    }
}
