use crate::error::VisualizerError;
use crate::types::{
    NormalizedToken, RawTokenRecord, SelectionChances, TokenRenderPayload, TooltipPayload,
};

pub trait RecordNormalizer: Send + Sync {
    fn normalize(&self, record: &RawTokenRecord) -> Result<NormalizedToken, VisualizerError>;
}

pub trait PayloadEncoder: Send + Sync {
    fn encode(&self, token: &NormalizedToken, chances: &SelectionChances) -> TokenRenderPayload;
}

pub trait TooltipRenderer: Send + Sync {
    fn render(&self, tooltip: &TooltipPayload) -> String;
}
