use crate::config::VisualizerConfig;
use crate::error::VisualizerError;
use crate::pipeline::defaults::{FixedPrecisionEncoder, HtmlTooltipRenderer, ThresholdNormalizer};
use crate::pipeline::runtime::{TokenVisualizer, TokenVisualizerParts};
use crate::pipeline::traits::{PayloadEncoder, RecordNormalizer, TooltipRenderer};

pub struct TokenVisualizerBuilder {
    config: VisualizerConfig,
    normalizer: Option<Box<dyn RecordNormalizer>>,
    encoder: Option<Box<dyn PayloadEncoder>>,
    tooltip_renderer: Option<Box<dyn TooltipRenderer>>,
}

impl TokenVisualizerBuilder {
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            config,
            normalizer: None,
            encoder: None,
            tooltip_renderer: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn RecordNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_encoder(mut self, encoder: Box<dyn PayloadEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_tooltip_renderer(mut self, tooltip_renderer: Box<dyn TooltipRenderer>) -> Self {
        self.tooltip_renderer = Some(tooltip_renderer);
        self
    }

    pub fn build(self) -> Result<TokenVisualizer, VisualizerError> {
        self.config.validate()?;
        let thresholds = self.config.thresholds;
        let decimals = self.config.decimals;

        Ok(TokenVisualizer::from_parts(TokenVisualizerParts {
            config: self.config,
            normalizer: self
                .normalizer
                .unwrap_or_else(|| Box::new(ThresholdNormalizer { thresholds })),
            encoder: self
                .encoder
                .unwrap_or_else(|| Box::new(FixedPrecisionEncoder { decimals })),
            tooltip_renderer: self
                .tooltip_renderer
                .unwrap_or_else(|| Box::new(HtmlTooltipRenderer)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BucketThresholds;
    use crate::types::{
        NormalizedToken, ProbabilityBucket, RawTokenRecord, SelectionChances, TokenRenderPayload,
        TooltipPayload,
    };
    use crate::visualization::encoder::encode_with_chances;
    use crate::visualization::normalizer::normalize;

    use super::*;

    struct UppercaseNormalizer;

    impl RecordNormalizer for UppercaseNormalizer {
        fn normalize(&self, record: &RawTokenRecord) -> Result<NormalizedToken, VisualizerError> {
            let mut token = normalize(record)?;
            token.text = token.text.to_uppercase();
            Ok(token)
        }
    }

    struct PlainTooltip;

    impl TooltipRenderer for PlainTooltip {
        fn render(&self, tooltip: &TooltipPayload) -> String {
            format!("{} ({})", tooltip.text, tooltip.probability_display)
        }
    }

    struct FixedEncoder;

    impl PayloadEncoder for FixedEncoder {
        fn encode(&self, token: &NormalizedToken, _chances: &SelectionChances) -> TokenRenderPayload {
            encode_with_chances(token, &SelectionChances::chosen_only(Some(1.0)))
        }
    }

    #[test]
    fn builder_defaults_follow_config() {
        let config = VisualizerConfig {
            decimals: 2,
            ..VisualizerConfig::default()
        };
        let visualizer = TokenVisualizerBuilder::new(config).build().expect("valid config");
        let token = visualizer
            .normalize_record(&RawTokenRecord::new("a").with_probability(0.5))
            .unwrap();
        let payload = visualizer.encode_token(&token, None).unwrap();
        assert_eq!(payload.tooltip.probability_display, "0.50");
    }

    #[test]
    fn build_fails_on_invalid_config() {
        let config = VisualizerConfig {
            thresholds: BucketThresholds {
                high: 0.1,
                ..BucketThresholds::default()
            },
            ..VisualizerConfig::default()
        };
        assert!(TokenVisualizerBuilder::new(config).build().is_err());
    }

    #[test]
    fn custom_stages_are_used() {
        let visualizer = TokenVisualizerBuilder::new(VisualizerConfig::default())
            .with_normalizer(Box::new(UppercaseNormalizer))
            .with_encoder(Box::new(FixedEncoder))
            .with_tooltip_renderer(Box::new(PlainTooltip))
            .build()
            .unwrap();
        let token = visualizer
            .normalize_record(&RawTokenRecord::new("abc").with_probability(0.9))
            .unwrap();
        assert_eq!(token.text, "ABC");
        assert_eq!(token.bucket, ProbabilityBucket::High);

        let payload = visualizer.encode_token(&token, None).unwrap();
        assert_eq!(payload.tooltip.selection_chance.as_deref(), Some("1.0000"));
        assert_eq!(visualizer.render_tooltip(&payload), "ABC (0.9000)");
    }
}
