pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod visualization;

pub use config::{BucketThresholds, VisualizerConfig};
pub use error::VisualizerError;
pub use pipeline::builder::TokenVisualizerBuilder;
pub use pipeline::runtime::{TokenVisualizer, Visualization};
pub use pipeline::traits::{PayloadEncoder, RecordNormalizer, TooltipRenderer};
pub use types::{
    AlternativeCandidate, NormalizedBatch, NormalizedToken, ProbabilityBucket, RawAlternative,
    RawAlternatives, RawTokenRecord, RecordFailure, RenderStyle, SelectionChances,
    TokenRenderPayload, TooltipAlternative, TooltipPayload,
};
pub use visualization::classifier::{bucket_color, classify, classify_with};
pub use visualization::encoder::{encode, encode_with_chances, encode_with_precision};
pub use visualization::formatter::{format_value, format_value_with, NOT_AVAILABLE};
pub use visualization::markup::{escape_attribute, escape_text, render_all, render_payloads};
pub use visualization::normalizer::{
    decode_record, normalize, normalize_batch, normalize_values, normalize_with,
};
pub use visualization::nucleus::selection_chances;
pub use visualization::tooltip::{render_tooltip, render_tooltip_attribute, RenderedToken};
