use std::cell::OnceCell;

use crate::error::VisualizerError;
use crate::pipeline::traits::TooltipRenderer;
use crate::types::{TokenRenderPayload, TooltipPayload};
use crate::visualization::markup::{escape_text, render_span};

/// Display fragment for one token's tooltip.
///
/// Pure string interpolation over already-formatted fields: the payload is
/// not modified and repeated calls return identical fragments.
pub fn render_tooltip(tooltip: &TooltipPayload) -> String {
    let main_class = tooltip.color_bucket.css_class();
    let mut html = String::from(r#"<div class="token-tooltip">"#);
    html.push_str(&format!(
        r#"<div class="token-info">Token: <span class="{main_class}">{}</span></div>"#,
        escape_text(&tooltip.text)
    ));
    html.push_str(&format!(
        r#"<div class="token-info">Probability: {}</div>"#,
        escape_text(&tooltip.probability_display)
    ));
    html.push_str(&format!(
        r#"<div class="token-info">Log Probability: {}</div>"#,
        escape_text(&tooltip.log_probability_display)
    ));
    if let Some(chance) = &tooltip.selection_chance {
        html.push_str(&format!(
            r#"<div class="token-info">Selection Chance (Top P): {}</div>"#,
            escape_text(chance)
        ));
    }

    if !tooltip.alternatives.is_empty() {
        html.push_str(r#"<div class="token-alternatives"><h4>Alternatives:</h4>"#);
        for alt in &tooltip.alternatives {
            let class = alt.color_bucket.css_class();
            html.push_str(&format!(r#"<div class="alt-token {class}">"#));
            html.push_str(&format!(
                r#"<span class="alt-text"><span class="{class}">{}</span></span>"#,
                escape_text(&alt.text)
            ));
            html.push_str(&format!(
                r#"<span class="alt-prob">P: {}</span>"#,
                escape_text(&alt.probability_display)
            ));
            html.push_str(&format!(
                r#"<span class="alt-logprob">LogP: {}</span>"#,
                escape_text(&alt.log_probability_display)
            ));
            if let Some(chance) = &alt.selection_chance {
                html.push_str(&format!(
                    r#"<span class="alt-chance">Chance: {}</span>"#,
                    escape_text(chance)
                ));
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");
    }

    html.push_str("</div>");
    html
}

/// Renders straight from a `data-tooltip` value that the consumer has already
/// attribute-unescaped.
pub fn render_tooltip_attribute(json: &str) -> Result<String, VisualizerError> {
    Ok(render_tooltip(&TooltipPayload::from_attribute_json(json)?))
}

/// One token's payload with a tooltip fragment built on first request.
#[derive(Debug)]
pub struct RenderedToken {
    payload: TokenRenderPayload,
    tooltip_html: OnceCell<String>,
}

impl RenderedToken {
    pub fn new(payload: TokenRenderPayload) -> Self {
        Self {
            payload,
            tooltip_html: OnceCell::new(),
        }
    }

    pub fn payload(&self) -> &TokenRenderPayload {
        &self.payload
    }

    pub fn span_html(&self) -> Result<String, VisualizerError> {
        render_span(&self.payload)
    }

    pub fn is_tooltip_rendered(&self) -> bool {
        self.tooltip_html.get().is_some()
    }

    pub fn tooltip_html(&self, renderer: &dyn TooltipRenderer) -> &str {
        self.tooltip_html
            .get_or_init(|| renderer.render(&self.payload.tooltip))
    }

    pub fn into_payload(self) -> TokenRenderPayload {
        self.payload
    }
}
