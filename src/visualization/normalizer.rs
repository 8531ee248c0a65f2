use std::cmp::Ordering;

use serde::Deserialize;

use crate::config::BucketThresholds;
use crate::error::VisualizerError;
use crate::types::{
    AlternativeCandidate, NormalizedBatch, NormalizedToken, RawTokenRecord, RecordFailure,
};
use crate::visualization::classifier::classify_with;

pub fn normalize(record: &RawTokenRecord) -> Result<NormalizedToken, VisualizerError> {
    normalize_with(record, &BucketThresholds::default())
}

/// Builds the canonical token: buckets for the chosen token and every
/// alternative, alternatives sorted by descending probability.
///
/// Absent probabilities sort as `0.0`; equal keys keep their input order.
/// Only a missing `text` (or a NaN numeric field) rejects the record.
pub fn normalize_with(
    record: &RawTokenRecord,
    thresholds: &BucketThresholds,
) -> Result<NormalizedToken, VisualizerError> {
    let text = record
        .text
        .as_ref()
        .ok_or_else(|| VisualizerError::malformed_record("record has no `text`"))?;
    require_number("probability", record.probability)?;
    require_number("logProbability", record.log_probability)?;

    let mut alternatives = Vec::with_capacity(record.alternatives.len());
    for (alt_text, info) in record.alternatives.iter() {
        require_number("alternative probability", info.probability)?;
        require_number("alternative logProbability", info.log_probability)?;
        alternatives.push(AlternativeCandidate {
            text: alt_text.to_string(),
            probability: info.probability,
            log_probability: info.log_probability,
            bucket: classify_with(info.probability, thresholds),
        });
    }
    // slice::sort_by is stable.
    alternatives.sort_by(|a, b| {
        sort_key(b.probability)
            .partial_cmp(&sort_key(a.probability))
            .unwrap_or(Ordering::Equal)
    });

    Ok(NormalizedToken {
        text: text.clone(),
        probability: record.probability,
        log_probability: record.log_probability,
        bucket: classify_with(record.probability, thresholds),
        alternatives,
    })
}

fn sort_key(probability: Option<f64>) -> f64 {
    probability.unwrap_or(0.0)
}

fn require_number(field: &str, value: Option<f64>) -> Result<(), VisualizerError> {
    match value {
        Some(v) if v.is_nan() => Err(VisualizerError::malformed_record(format!(
            "`{field}` is not a number"
        ))),
        _ => Ok(()),
    }
}

/// Decodes one untrusted JSON value into a raw record.
pub fn decode_record(value: &serde_json::Value) -> Result<RawTokenRecord, VisualizerError> {
    RawTokenRecord::deserialize(value)
        .map_err(|e| VisualizerError::malformed_record(format!("cannot decode record: {e}")))
}

pub fn normalize_batch(records: &[RawTokenRecord]) -> NormalizedBatch {
    normalize_batch_by(records, normalize)
}

/// Like [`normalize_batch`], but records that fail to decode are isolated too.
pub fn normalize_values(values: &[serde_json::Value]) -> NormalizedBatch {
    normalize_batch_by(values, |value| normalize(&decode_record(value)?))
}

/// Runs `normalize_one` over every item, collecting failures by index instead
/// of stopping at the first one.
pub(crate) fn normalize_batch_by<T>(
    items: &[T],
    normalize_one: impl Fn(&T) -> Result<NormalizedToken, VisualizerError>,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (index, item) in items.iter().enumerate() {
        match normalize_one(item) {
            Ok(token) => {
                batch.tokens.push(token);
                batch.source_indices.push(index);
            }
            Err(err) => {
                let err = err.at_index(index);
                tracing::warn!(index, error = %err, "normalize: skipping record");
                batch.failures.push(RecordFailure { index, error: err });
            }
        }
    }
    tracing::debug!(
        records = items.len(),
        normalized = batch.tokens.len(),
        failed = batch.failures.len(),
        "normalize: batch complete"
    );
    batch
}
