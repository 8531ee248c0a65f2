use crate::config::BucketThresholds;
use crate::error::VisualizerError;
use crate::pipeline::traits::{PayloadEncoder, RecordNormalizer, TooltipRenderer};
use crate::types::{
    NormalizedToken, RawTokenRecord, SelectionChances, TokenRenderPayload, TooltipPayload,
};
use crate::visualization::encoder::encode_with_precision;
use crate::visualization::normalizer::normalize_with;
use crate::visualization::tooltip::render_tooltip;

pub struct ThresholdNormalizer {
    pub thresholds: BucketThresholds,
}

impl RecordNormalizer for ThresholdNormalizer {
    fn normalize(&self, record: &RawTokenRecord) -> Result<NormalizedToken, VisualizerError> {
        normalize_with(record, &self.thresholds)
    }
}

pub struct FixedPrecisionEncoder {
    pub decimals: usize,
}

impl PayloadEncoder for FixedPrecisionEncoder {
    fn encode(&self, token: &NormalizedToken, chances: &SelectionChances) -> TokenRenderPayload {
        encode_with_precision(token, chances, self.decimals)
    }
}

pub struct HtmlTooltipRenderer;

impl TooltipRenderer for HtmlTooltipRenderer {
    fn render(&self, tooltip: &TooltipPayload) -> String {
        render_tooltip(tooltip)
    }
}

#[cfg(test)]
mod tests {
    use crate::types::ProbabilityBucket;
    use crate::visualization::encoder::encode_with_chances;
    use crate::visualization::normalizer::normalize;
    use crate::visualization::tooltip::RenderedToken;

    use super::*;

    fn record() -> RawTokenRecord {
        RawTokenRecord::new("cat")
            .with_probability(0.92)
            .with_log_probability(-0.083)
            .with_alternative("dog", Some(0.05), Some(-3.0))
    }

    #[test]
    fn threshold_normalizer_matches_free_function_with_defaults() {
        let normalizer = ThresholdNormalizer {
            thresholds: BucketThresholds::default(),
        };
        assert_eq!(
            normalizer.normalize(&record()).unwrap(),
            normalize(&record()).unwrap()
        );
    }

    #[test]
    fn threshold_normalizer_uses_its_thresholds() {
        let normalizer = ThresholdNormalizer {
            thresholds: BucketThresholds {
                high: 0.95,
                medium_high: 0.9,
                medium: 0.5,
                medium_low: 0.01,
            },
        };
        let token = normalizer.normalize(&record()).unwrap();
        assert_eq!(token.bucket, ProbabilityBucket::MediumHigh);
        assert_eq!(token.alternatives[0].bucket, ProbabilityBucket::MediumLow);
    }

    #[test]
    fn fixed_precision_encoder_default_matches_free_function() {
        let encoder = FixedPrecisionEncoder { decimals: 4 };
        let token = normalize(&record()).unwrap();
        let chances = SelectionChances::chosen_only(Some(0.9));
        assert_eq!(
            encoder.encode(&token, &chances),
            encode_with_chances(&token, &chances)
        );
    }

    #[test]
    fn html_tooltip_renderer_matches_free_function() {
        let token = normalize(&record()).unwrap();
        let payload = encode_with_chances(&token, &SelectionChances::none());
        assert_eq!(
            HtmlTooltipRenderer.render(&payload.tooltip),
            render_tooltip(&payload.tooltip)
        );
    }

    #[test]
    fn rendered_token_builds_tooltip_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct CountingRenderer(AtomicUsize);

        impl TooltipRenderer for CountingRenderer {
            fn render(&self, tooltip: &TooltipPayload) -> String {
                self.0.fetch_add(1, Ordering::SeqCst);
                render_tooltip(tooltip)
            }
        }

        let renderer = CountingRenderer(AtomicUsize::new(0));
        let token = normalize(&record()).unwrap();
        let rendered = RenderedToken::new(encode_with_chances(&token, &SelectionChances::none()));
        assert!(!rendered.is_tooltip_rendered());

        let first = rendered.tooltip_html(&renderer).to_string();
        let second = rendered.tooltip_html(&renderer).to_string();
        assert_eq!(first, second);
        assert!(rendered.is_tooltip_rendered());
        assert_eq!(renderer.0.load(Ordering::SeqCst), 1);
    }
}
