use crate::config::VisualizerConfig;

/// Display text for an absent value.
pub const NOT_AVAILABLE: &str = "N/A";

pub fn format_value(value: Option<f64>) -> String {
    format_value_with(value, VisualizerConfig::DEFAULT_DECIMALS)
}

/// Fixed-point rendering with exactly `decimals` fractional digits.
///
/// Uses the standard library float formatter, which rounds the exact binary
/// value to the nearest representable decimal (so `0.125` to two places
/// becomes `0.12`, the binary value being exactly halfway and ties going to
/// even). Negative and zero values format like any other number.
pub fn format_value_with(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_is_sentinel() {
        assert_eq!(format_value(None), "N/A");
        assert_eq!(format_value_with(None, 2), "N/A");
    }

    #[test]
    fn default_precision_is_four() {
        assert_eq!(format_value(Some(0.5)), "0.5000");
        assert_eq!(format_value(Some(0.92)), "0.9200");
        assert_eq!(format_value(Some(1.0)), "1.0000");
    }

    #[test]
    fn negative_values_format_normally() {
        assert_eq!(format_value_with(Some(-0.31), 2), "-0.31");
        assert_eq!(format_value(Some(-0.31)), "-0.3100");
        assert_eq!(format_value(Some(-3.0)), "-3.0000");
    }

    #[test]
    fn zero_decimals_drops_fraction() {
        assert_eq!(format_value_with(Some(2.0), 0), "2");
        assert_eq!(format_value_with(Some(0.0), 3), "0.000");
    }

    #[test]
    fn rounds_to_requested_precision() {
        assert_eq!(format_value(Some(0.123_456)), "0.1235");
        assert_eq!(format_value(Some(-0.083)), "-0.0830");
        assert_eq!(format_value_with(Some(0.666_666), 2), "0.67");
    }

    #[test]
    fn exact_binary_ties_round_to_even() {
        assert_eq!(format_value_with(Some(0.125), 2), "0.12");
        assert_eq!(format_value_with(Some(0.375), 2), "0.38");
        assert_eq!(format_value_with(Some(0.5), 0), "0");
        assert_eq!(format_value_with(Some(1.5), 0), "2");
        // 0.15 is stored slightly below the tie, so it rounds down
        assert_eq!(format_value_with(Some(0.15), 1), "0.1");
    }
}
