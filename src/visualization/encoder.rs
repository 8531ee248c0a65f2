use crate::config::VisualizerConfig;
use crate::types::{
    NormalizedToken, RenderStyle, SelectionChances, TokenRenderPayload, TooltipAlternative,
    TooltipPayload,
};
use crate::visualization::classifier::bucket_color;
use crate::visualization::formatter::format_value_with;

/// Payload for one token. `selection_chance` applies to the token itself;
/// pass `None` when top-p restriction is not in effect.
pub fn encode(token: &NormalizedToken, selection_chance: Option<f64>) -> TokenRenderPayload {
    encode_with_chances(token, &SelectionChances::chosen_only(selection_chance))
}

pub fn encode_with_chances(
    token: &NormalizedToken,
    chances: &SelectionChances,
) -> TokenRenderPayload {
    encode_with_precision(token, chances, VisualizerConfig::DEFAULT_DECIMALS)
}

/// Formats every number up front so the payload carries display strings only.
/// Token text is copied verbatim; escaping is the consumer's job.
pub fn encode_with_precision(
    token: &NormalizedToken,
    chances: &SelectionChances,
    decimals: usize,
) -> TokenRenderPayload {
    let alternatives = token
        .alternatives
        .iter()
        .enumerate()
        .map(|(i, alt)| TooltipAlternative {
            text: alt.text.clone(),
            probability_display: format_value_with(alt.probability, decimals),
            log_probability_display: format_value_with(alt.log_probability, decimals),
            color_bucket: alt.bucket,
            selection_chance: chances
                .alternative(i)
                .map(|c| format_value_with(Some(c), decimals)),
        })
        .collect();

    TokenRenderPayload {
        style: RenderStyle {
            color_bucket: token.bucket,
            color_hex: bucket_color(token.bucket).to_string(),
        },
        tooltip: TooltipPayload {
            text: token.text.clone(),
            color_bucket: token.bucket,
            probability_display: format_value_with(token.probability, decimals),
            log_probability_display: format_value_with(token.log_probability, decimals),
            selection_chance: chances
                .chosen
                .map(|c| format_value_with(Some(c), decimals)),
            alternatives,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProbabilityBucket, RawTokenRecord};
    use crate::visualization::normalizer::normalize;

    #[test]
    fn style_mirrors_token_bucket() {
        let token = normalize(&RawTokenRecord::new("x").with_probability(0.5)).unwrap();
        let payload = encode(&token, None);
        assert_eq!(payload.style.color_bucket, ProbabilityBucket::Medium);
        assert_eq!(payload.style.color_hex, "#cccc00");
        assert_eq!(payload.tooltip.color_bucket, ProbabilityBucket::Medium);
    }

    #[test]
    fn absent_selection_chance_is_omitted_not_na() {
        let token = normalize(&RawTokenRecord::new("x")).unwrap();
        let payload = encode(&token, None);
        assert_eq!(payload.tooltip.selection_chance, None);
        assert_eq!(payload.tooltip.probability_display, "N/A");
        assert_eq!(payload.tooltip.log_probability_display, "N/A");
    }

    #[test]
    fn provided_selection_chance_is_formatted() {
        let token = normalize(&RawTokenRecord::new("x").with_probability(0.5)).unwrap();
        let payload = encode(&token, Some(0.625));
        assert_eq!(payload.tooltip.selection_chance.as_deref(), Some("0.6250"));
    }

    #[test]
    fn plain_encode_leaves_alternative_chances_absent() {
        let token = normalize(
            &RawTokenRecord::new("x")
                .with_probability(0.5)
                .with_alternative("y", Some(0.2), Some(-1.6)),
        )
        .unwrap();
        let payload = encode(&token, Some(0.5));
        assert_eq!(payload.tooltip.alternatives[0].selection_chance, None);
        assert_eq!(payload.tooltip.alternatives[0].log_probability_display, "-1.6000");
    }

    #[test]
    fn chances_fill_alternatives_by_position() {
        let token = normalize(
            &RawTokenRecord::new("x")
                .with_probability(0.5)
                .with_alternative("y", Some(0.2), None)
                .with_alternative("z", Some(0.3), None),
        )
        .unwrap();
        let chances = SelectionChances {
            chosen: Some(0.5),
            alternatives: vec![Some(0.3), None],
        };
        let payload = encode_with_chances(&token, &chances);
        assert_eq!(payload.tooltip.alternatives[0].text, "z");
        assert_eq!(
            payload.tooltip.alternatives[0].selection_chance.as_deref(),
            Some("0.3000")
        );
        assert_eq!(payload.tooltip.alternatives[1].selection_chance, None);
    }

    #[test]
    fn precision_is_configurable() {
        let token = normalize(
            &RawTokenRecord::new("x")
                .with_probability(0.92)
                .with_log_probability(-0.083),
        )
        .unwrap();
        let payload = encode_with_precision(&token, &SelectionChances::none(), 2);
        assert_eq!(payload.tooltip.probability_display, "0.92");
        assert_eq!(payload.tooltip.log_probability_display, "-0.08");
    }

    #[test]
    fn text_is_not_escaped_by_encoder() {
        let token = normalize(&RawTokenRecord::new("<b>\"q\"</b>")).unwrap();
        let payload = encode(&token, None);
        assert_eq!(payload.tooltip.text, "<b>\"q\"</b>");
    }
}
