use crate::config::BucketThresholds;
use crate::types::ProbabilityBucket;

pub const COLOR_HIGH: &str = "#00cc00";
pub const COLOR_MEDIUM_HIGH: &str = "#66cc33";
pub const COLOR_MEDIUM: &str = "#cccc00";
pub const COLOR_MEDIUM_LOW: &str = "#cc6600";
pub const COLOR_LOW: &str = "#cc0000";
pub const COLOR_UNKNOWN: &str = "#808080";

/// Buckets a probability with the default thresholds (0.8 / 0.6 / 0.4 / 0.2).
pub fn classify(probability: Option<f64>) -> ProbabilityBucket {
    classify_with(probability, &BucketThresholds::default())
}

/// Each named threshold is an exclusive lower bound. Out-of-range values are
/// not rejected: they fall through the comparison chain into `High` or `Low`.
pub fn classify_with(probability: Option<f64>, thresholds: &BucketThresholds) -> ProbabilityBucket {
    let Some(p) = probability else {
        return ProbabilityBucket::Unknown;
    };
    if p > thresholds.high {
        ProbabilityBucket::High
    } else if p > thresholds.medium_high {
        ProbabilityBucket::MediumHigh
    } else if p > thresholds.medium {
        ProbabilityBucket::Medium
    } else if p > thresholds.medium_low {
        ProbabilityBucket::MediumLow
    } else {
        ProbabilityBucket::Low
    }
}

pub fn bucket_color(bucket: ProbabilityBucket) -> &'static str {
    match bucket {
        ProbabilityBucket::High => COLOR_HIGH,
        ProbabilityBucket::MediumHigh => COLOR_MEDIUM_HIGH,
        ProbabilityBucket::Medium => COLOR_MEDIUM,
        ProbabilityBucket::MediumLow => COLOR_MEDIUM_LOW,
        ProbabilityBucket::Low => COLOR_LOW,
        ProbabilityBucket::Unknown => COLOR_UNKNOWN,
    }
}
