use std::cmp::Ordering;
use std::fmt;

use serde::de::{IgnoredAny, MapAccess, SeqAccess, Unexpected, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::VisualizerError;

/// Discrete severity class for a probability value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbabilityBucket {
    High,
    MediumHigh,
    Medium,
    MediumLow,
    Low,
    Unknown,
}

impl ProbabilityBucket {
    pub const ALL: [ProbabilityBucket; 6] = [
        ProbabilityBucket::High,
        ProbabilityBucket::MediumHigh,
        ProbabilityBucket::Medium,
        ProbabilityBucket::MediumLow,
        ProbabilityBucket::Low,
        ProbabilityBucket::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::MediumHigh => "medium_high",
            Self::Medium => "medium",
            Self::MediumLow => "medium_low",
            Self::Low => "low",
            Self::Unknown => "unknown",
        }
    }

    /// Stylesheet class used by markup and tooltip fragments.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::High => "high-prob",
            Self::MediumHigh => "medium-high-prob",
            Self::Medium => "medium-prob",
            Self::MediumLow => "medium-low-prob",
            Self::Low => "low-prob",
            Self::Unknown => "unknown-prob",
        }
    }

    /// Higher is more confident. `None` for `Unknown`, which sits outside the ordering.
    pub fn severity(self) -> Option<u8> {
        match self {
            Self::High => Some(4),
            Self::MediumHigh => Some(3),
            Self::Medium => Some(2),
            Self::MediumLow => Some(1),
            Self::Low => Some(0),
            Self::Unknown => None,
        }
    }
}

impl PartialOrd for ProbabilityBucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.severity(), other.severity()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            (None, None) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for ProbabilityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One alternative as reported by the completion backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAlternative {
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(
        default,
        rename = "logProbability",
        alias = "logprob",
        alias = "log_probability"
    )]
    pub log_probability: Option<f64>,
}

/// Alternative text -> info, kept in document order.
///
/// Keys are unique: inserting an existing key replaces its value and keeps
/// the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAlternatives(Vec<(String, RawAlternative)>);

impl RawAlternatives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: impl Into<String>, info: RawAlternative) {
        let text = text.into();
        if let Some(slot) = self.0.iter_mut().find(|(existing, _)| *existing == text) {
            slot.1 = info;
        } else {
            self.0.push((text, info));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawAlternative)> {
        self.0.iter().map(|(text, info)| (text.as_str(), info))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, RawAlternative)> for RawAlternatives {
    fn from_iter<I: IntoIterator<Item = (S, RawAlternative)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (text, info) in iter {
            out.insert(text, info);
        }
        out
    }
}

impl Serialize for RawAlternatives {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (text, info) in &self.0 {
            map.serialize_entry(text, info)?;
        }
        map.end()
    }
}

struct RawAlternativesVisitor;

impl<'de> Visitor<'de> for RawAlternativesVisitor {
    type Value = RawAlternatives;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping alternative text to probability info, an empty list, or null")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawAlternatives::new())
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawAlternatives::new())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        // Only the empty list is accepted; a populated one has no text keys.
        if access.next_element::<IgnoredAny>()?.is_some() {
            return Err(serde::de::Error::invalid_type(Unexpected::Seq, &self));
        }
        Ok(RawAlternatives::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut out = RawAlternatives::new();
        while let Some((text, info)) = access.next_entry::<String, Option<RawAlternative>>()? {
            out.insert(text, info.unwrap_or_default());
        }
        Ok(out)
    }
}

impl<'de> Deserialize<'de> for RawAlternatives {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawAlternativesVisitor)
    }
}

/// Untrusted per-token input. Only `text` is mandatory; everything else degrades to unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTokenRecord {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(
        default,
        rename = "logProbability",
        alias = "logprob",
        alias = "log_probability"
    )]
    pub log_probability: Option<f64>,
    #[serde(default, alias = "top_logprobs")]
    pub alternatives: RawAlternatives,
}

impl RawTokenRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    pub fn with_log_probability(mut self, log_probability: f64) -> Self {
        self.log_probability = Some(log_probability);
        self
    }

    pub fn with_alternative(
        mut self,
        text: impl Into<String>,
        probability: Option<f64>,
        log_probability: Option<f64>,
    ) -> Self {
        self.alternatives.insert(
            text,
            RawAlternative {
                probability,
                log_probability,
            },
        );
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeCandidate {
    pub text: String,
    pub probability: Option<f64>,
    pub log_probability: Option<f64>,
    pub bucket: ProbabilityBucket,
}

/// Canonical form of one token record. Alternatives are sorted by descending probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedToken {
    pub text: String,
    pub probability: Option<f64>,
    pub log_probability: Option<f64>,
    pub bucket: ProbabilityBucket,
    pub alternatives: Vec<AlternativeCandidate>,
}

/// Per-token top-p selection chances, index-aligned with `NormalizedToken::alternatives`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionChances {
    pub chosen: Option<f64>,
    pub alternatives: Vec<Option<f64>>,
}

impl SelectionChances {
    /// Top-p restriction not active: every chance is omitted.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn chosen_only(chosen: Option<f64>) -> Self {
        Self {
            chosen,
            alternatives: Vec::new(),
        }
    }

    pub fn alternative(&self, index: usize) -> Option<f64> {
        self.alternatives.get(index).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStyle {
    pub color_bucket: ProbabilityBucket,
    pub color_hex: String,
}

/// Display-ready tooltip data. Every numeric field is already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipPayload {
    pub text: String,
    pub color_bucket: ProbabilityBucket,
    pub probability_display: String,
    pub log_probability_display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_chance: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<TooltipAlternative>,
}

impl TooltipPayload {
    /// Serialized form carried by the `data-tooltip` attribute (before attribute escaping).
    pub fn to_attribute_json(&self) -> Result<String, VisualizerError> {
        serde_json::to_string(self).map_err(|e| VisualizerError::json("serialize tooltip", e))
    }

    pub fn from_attribute_json(json: &str) -> Result<Self, VisualizerError> {
        serde_json::from_str(json).map_err(|e| VisualizerError::json("parse tooltip", e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipAlternative {
    pub text: String,
    pub probability_display: String,
    pub log_probability_display: String,
    pub color_bucket: ProbabilityBucket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_chance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRenderPayload {
    pub style: RenderStyle,
    pub tooltip: TooltipPayload,
}

#[derive(Debug)]
pub struct RecordFailure {
    /// Position of the rejected record in the input sequence.
    pub index: usize,
    pub error: VisualizerError,
}

/// Partial-success result of normalizing a sequence of records.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub tokens: Vec<NormalizedToken>,
    /// Input index of each entry in `tokens`.
    pub source_indices: Vec<usize>,
    pub failures: Vec<RecordFailure>,
}

impl NormalizedBatch {
    pub fn record_count(&self) -> usize {
        self.tokens.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }
}
