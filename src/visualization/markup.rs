use crate::config::VisualizerConfig;
use crate::error::VisualizerError;
use crate::types::{NormalizedToken, SelectionChances, TokenRenderPayload};
use crate::visualization::encoder::encode_with_chances;

/// Escapes text placed between tags.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a value placed inside a single- or double-quoted attribute.
pub fn escape_attribute(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Single-shot markup with default settings and no selection chances.
pub fn render_all(tokens: &[NormalizedToken]) -> Result<String, VisualizerError> {
    let payloads: Vec<TokenRenderPayload> = tokens
        .iter()
        .map(|token| encode_with_chances(token, &SelectionChances::none()))
        .collect();
    render_payloads(&payloads, &VisualizerConfig::default().container_class)
}

/// Wraps every payload in a colored span carrying its tooltip as a JSON
/// `data-tooltip` attribute, inside one container element.
pub fn render_payloads(
    payloads: &[TokenRenderPayload],
    container_class: &str,
) -> Result<String, VisualizerError> {
    let mut html = format!(r#"<div class="{}">"#, escape_attribute(container_class));
    for payload in payloads {
        html.push_str(&render_span(payload)?);
    }
    html.push_str("</div>");
    Ok(html)
}

pub fn render_span(payload: &TokenRenderPayload) -> Result<String, VisualizerError> {
    let tooltip_json = payload.tooltip.to_attribute_json()?;
    Ok(format!(
        r#"<span class="token {}" style="background-color: {};" data-tooltip="{}">{}</span>"#,
        payload.style.color_bucket.css_class(),
        escape_attribute(&payload.style.color_hex),
        escape_attribute(&tooltip_json),
        escape_text(&payload.tooltip.text),
    ))
}
