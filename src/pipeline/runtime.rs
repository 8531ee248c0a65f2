use crate::config::{validate_top_p, VisualizerConfig};
use crate::error::VisualizerError;
use crate::pipeline::traits::{PayloadEncoder, RecordNormalizer, TooltipRenderer};
use crate::types::{
    NormalizedBatch, NormalizedToken, RawTokenRecord, RecordFailure, SelectionChances,
    TokenRenderPayload,
};
use crate::visualization::markup::render_payloads;
use crate::visualization::normalizer::{decode_record, normalize_batch_by};
use crate::visualization::nucleus::selection_chances;
use crate::visualization::tooltip::RenderedToken;

/// Everything produced for one completion.
#[derive(Debug)]
pub struct Visualization {
    pub payloads: Vec<TokenRenderPayload>,
    /// Input index of each entry in `payloads`.
    pub source_indices: Vec<usize>,
    pub html: String,
    pub failures: Vec<RecordFailure>,
}

pub struct TokenVisualizer {
    config: VisualizerConfig,
    normalizer: Box<dyn RecordNormalizer>,
    encoder: Box<dyn PayloadEncoder>,
    tooltip_renderer: Box<dyn TooltipRenderer>,
}

pub(crate) struct TokenVisualizerParts {
    pub config: VisualizerConfig,
    pub normalizer: Box<dyn RecordNormalizer>,
    pub encoder: Box<dyn PayloadEncoder>,
    pub tooltip_renderer: Box<dyn TooltipRenderer>,
}

impl TokenVisualizer {
    pub(crate) fn from_parts(parts: TokenVisualizerParts) -> Self {
        Self {
            config: parts.config,
            normalizer: parts.normalizer,
            encoder: parts.encoder,
            tooltip_renderer: parts.tooltip_renderer,
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn tooltip_renderer(&self) -> &dyn TooltipRenderer {
        self.tooltip_renderer.as_ref()
    }

    pub fn normalize_record(
        &self,
        record: &RawTokenRecord,
    ) -> Result<NormalizedToken, VisualizerError> {
        self.normalizer.normalize(record)
    }

    pub fn normalize_records(&self, records: &[RawTokenRecord]) -> NormalizedBatch {
        normalize_batch_by(records, |record| self.normalizer.normalize(record))
    }

    /// Decodes and normalizes untrusted JSON records; undecodable ones are
    /// reported as failures alongside records missing `text`.
    pub fn normalize_values(&self, values: &[serde_json::Value]) -> NormalizedBatch {
        normalize_batch_by(values, |value| {
            self.normalizer.normalize(&decode_record(value)?)
        })
    }

    /// `top_p = None` means top-p restriction is not active and every
    /// selection chance is omitted.
    pub fn encode_token(
        &self,
        token: &NormalizedToken,
        top_p: Option<f64>,
    ) -> Result<TokenRenderPayload, VisualizerError> {
        if let Some(top_p) = top_p {
            validate_top_p(top_p)?;
        }
        Ok(self.encode_unchecked(token, top_p))
    }

    pub fn encode_all(
        &self,
        tokens: &[NormalizedToken],
        top_p: Option<f64>,
    ) -> Result<Vec<TokenRenderPayload>, VisualizerError> {
        if let Some(top_p) = top_p {
            validate_top_p(top_p)?;
        }
        Ok(tokens
            .iter()
            .map(|token| self.encode_unchecked(token, top_p))
            .collect())
    }

    fn encode_unchecked(&self, token: &NormalizedToken, top_p: Option<f64>) -> TokenRenderPayload {
        let chances = match top_p {
            Some(top_p) => selection_chances(token, top_p),
            None => SelectionChances::none(),
        };
        self.encoder.encode(token, &chances)
    }

    /// Single-shot markup for the whole sequence, without selection chances.
    pub fn render_all(&self, tokens: &[NormalizedToken]) -> Result<String, VisualizerError> {
        let payloads: Vec<TokenRenderPayload> = tokens
            .iter()
            .map(|token| self.encode_unchecked(token, None))
            .collect();
        self.render_payloads(&payloads)
    }

    pub fn render_payloads(
        &self,
        payloads: &[TokenRenderPayload],
    ) -> Result<String, VisualizerError> {
        render_payloads(payloads, &self.config.container_class)
    }

    pub fn render_tooltip(&self, payload: &TokenRenderPayload) -> String {
        self.tooltip_renderer.render(&payload.tooltip)
    }

    /// Wraps payloads so each tooltip fragment is built only when first requested.
    pub fn lazy_tokens(&self, payloads: Vec<TokenRenderPayload>) -> Vec<RenderedToken> {
        payloads.into_iter().map(RenderedToken::new).collect()
    }

    pub fn visualize(
        &self,
        values: &[serde_json::Value],
        top_p: Option<f64>,
    ) -> Result<Visualization, VisualizerError> {
        if let Some(top_p) = top_p {
            validate_top_p(top_p)?;
        }
        self.finish(self.normalize_values(values), top_p)
    }

    pub fn visualize_records(
        &self,
        records: &[RawTokenRecord],
        top_p: Option<f64>,
    ) -> Result<Visualization, VisualizerError> {
        if let Some(top_p) = top_p {
            validate_top_p(top_p)?;
        }
        self.finish(self.normalize_records(records), top_p)
    }

    fn finish(
        &self,
        batch: NormalizedBatch,
        top_p: Option<f64>,
    ) -> Result<Visualization, VisualizerError> {
        let payloads: Vec<TokenRenderPayload> = batch
            .tokens
            .iter()
            .map(|token| self.encode_unchecked(token, top_p))
            .collect();
        let html = self.render_payloads(&payloads)?;
        tracing::info!(
            records = batch.record_count(),
            rendered = payloads.len(),
            failed = batch.failures.len(),
            top_p = top_p.unwrap_or(1.0),
            top_p_active = top_p.is_some(),
            "visualize: completed"
        );
        Ok(Visualization {
            payloads,
            source_indices: batch.source_indices,
            html,
            failures: batch.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::pipeline::builder::TokenVisualizerBuilder;
    use crate::types::ProbabilityBucket;

    use super::*;

    fn visualizer() -> TokenVisualizer {
        TokenVisualizerBuilder::new(VisualizerConfig::default())
            .build()
            .expect("default config is valid")
    }

    #[test]
    fn visualize_isolates_bad_records() {
        let values = vec![
            json!({"text": "a", "probability": 0.9}),
            json!({"probability": 0.4}),
            json!({"text": "c", "probability": "oops"}),
            json!({"text": "d"}),
        ];
        let out = visualizer().visualize(&values, None).unwrap();
        assert_eq!(out.payloads.len(), 2);
        assert_eq!(out.source_indices, vec![0, 3]);
        let failed: Vec<usize> = out.failures.iter().map(|f| f.index).collect();
        assert_eq!(failed, vec![1, 2]);
        assert!(out.failures.iter().all(|f| f.error.is_malformed_record()));
        assert_eq!(out.payloads[1].style.color_bucket, ProbabilityBucket::Unknown);
    }

    #[test]
    fn visualize_without_top_p_omits_chances() {
        let values = vec![json!({
            "text": "a",
            "probability": 0.6,
            "alternatives": {"b": {"probability": 0.4}}
        })];
        let out = visualizer().visualize(&values, None).unwrap();
        assert_eq!(out.payloads[0].tooltip.selection_chance, None);
        assert_eq!(out.payloads[0].tooltip.alternatives[0].selection_chance, None);
        assert!(!out.html.contains("selectionChance"));
    }

    #[test]
    fn visualize_with_top_p_fills_chances() {
        let values = vec![json!({
            "text": "a",
            "probability": 0.6,
            "alternatives": {"b": {"probability": 0.3}, "c": {"probability": 0.1}}
        })];
        let out = visualizer().visualize(&values, Some(0.8)).unwrap();
        let tooltip = &out.payloads[0].tooltip;
        // nucleus = {a, b}, mass 0.9
        assert_eq!(tooltip.selection_chance.as_deref(), Some("0.6667"));
        assert_eq!(tooltip.alternatives[0].selection_chance.as_deref(), Some("0.3333"));
        assert_eq!(tooltip.alternatives[1].selection_chance.as_deref(), Some("0.0000"));
    }

    #[test]
    fn visualize_rejects_invalid_top_p() {
        let err = visualizer().visualize(&[], Some(0.0)).unwrap_err();
        assert!(matches!(err, VisualizerError::InvalidConfig { .. }));
        assert!(visualizer().encode_all(&[], Some(2.0)).is_err());
    }

    #[test]
    fn html_matches_render_of_payloads() {
        let records = vec![
            RawTokenRecord::new("x").with_probability(0.3),
            RawTokenRecord::new("y"),
        ];
        let v = visualizer();
        let out = v.visualize_records(&records, None).unwrap();
        assert_eq!(out.html, v.render_payloads(&out.payloads).unwrap());
        let batch = v.normalize_records(&records);
        assert_eq!(v.render_all(&batch.tokens).unwrap(), out.html);
    }

    #[test]
    fn lazy_tokens_render_on_demand() {
        let v = visualizer();
        let batch = v.normalize_records(&[RawTokenRecord::new("x").with_probability(0.3)]);
        let payloads = v.encode_all(&batch.tokens, None).unwrap();
        let lazy = v.lazy_tokens(payloads.clone());
        assert!(!lazy[0].is_tooltip_rendered());
        let html = lazy[0].tooltip_html(v.tooltip_renderer());
        assert_eq!(html, v.render_tooltip(&payloads[0]));
        assert!(lazy[0].is_tooltip_rendered());
    }
}
