//! Merges the primary ffprobe response into a file's property map.
//!
//! The response must describe exactly one video and one audio stream. Any
//! other layout is a structural anomaly and fails the file. Missing stream
//! bitrates and a degenerate `0/0` frame rate are not errors: they are
//! reported back as fallback requests.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

use super::planner::{PendingProperty, QueryPlan};
use crate::error::{CoreError, CoreResult};
use crate::properties::table::{
    extension_matches_format, ARTIST_KEY, ARTIST_TAGS, FORMAT_TAGS_KEY, MAX_PROBE_SCORE,
};
use crate::properties::{PropertyMap, StreamKind, Target};

/// Value ffprobe reports for a frame rate it could not determine.
const DEGENERATE_FRAME_RATE: &str = "0/0";

#[derive(Debug, Deserialize)]
struct ProbeResponse {
    #[serde(default)]
    streams: Vec<Map<String, Value>>,
    #[serde(default)]
    format: Option<Map<String, Value>>,
    #[serde(default)]
    error: Option<Value>,
}

/// Additional passes requested by the merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Stream kinds whose bitrate must be computed from packets.
    pub bitrate_fallback: BTreeSet<StreamKind>,
    /// Whether the video frame rate must be computed from packet counts.
    pub frame_rate_fallback: bool,
}

impl MergeOutcome {
    pub fn needs_fallback(&self) -> bool {
        !self.bitrate_fallback.is_empty() || self.frame_rate_fallback
    }
}

/// Parses `output` (compact JSON) and fills the rows pending in `plan`.
pub fn merge(
    path: &Path,
    plan: &QueryPlan,
    output: &str,
    map: &mut PropertyMap,
) -> CoreResult<MergeOutcome> {
    let response: ProbeResponse = serde_json::from_str(output)
        .map_err(|e| CoreError::JsonParseError(format!("{}: {}", path.display(), e)))?;

    if let Some(error) = &response.error {
        log::warn!("ffprobe reported an error for '{}': {}", path.display(), error);
    }

    let streams = classify_streams(path, output, &response.streams)?;
    let mut outcome = MergeOutcome::default();

    for (kind, stream) in &streams {
        for pending in plan
            .pending
            .iter()
            .filter(|p| p.spec.target == Target::Stream(*kind))
        {
            merge_stream_row(path, *kind, stream, pending, map, &mut outcome);
        }
    }

    let empty = Map::new();
    let format = response.format.as_ref().unwrap_or(&empty);

    for pending in plan
        .pending
        .iter()
        .filter(|p| p.spec.target == Target::Format)
    {
        match format.get(pending.spec.field).filter(|v| !v.is_null()) {
            Some(value) => {
                map.insert(pending.spec.probed_key(), copy_value(value));
            }
            None => log::warn!(
                "ffprobe did not report format {} for {} of '{}'",
                pending.spec.field,
                pending.spec.canonical,
                path.display()
            ),
        }
    }

    validate_format(path, format);
    merge_tags(format, map);

    Ok(outcome)
}

/// Assigns a kind to every stream and checks the one-video-one-audio layout.
fn classify_streams<'a>(
    path: &Path,
    output: &str,
    streams: &'a [Map<String, Value>],
) -> CoreResult<Vec<(StreamKind, &'a Map<String, Value>)>> {
    let anomaly = |reason: String| {
        log::debug!("ffprobe response for '{}': {}", path.display(), output);
        CoreError::StructuralAnomaly {
            path: path.to_path_buf(),
            reason,
        }
    };

    if streams.len() > 2 {
        return Err(anomaly(format!(
            "{} streams reported, expected one video and one audio stream",
            streams.len()
        )));
    }

    let mut classified: Vec<(StreamKind, &Map<String, Value>)> = Vec::with_capacity(2);
    for stream in streams {
        let codec_type = stream
            .get("codec_type")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let kind = StreamKind::from_codec_type(codec_type)
            .ok_or_else(|| anomaly(format!("unexpected stream type '{codec_type}'")))?;
        if classified.iter().any(|(seen, _)| *seen == kind) {
            return Err(anomaly(format!("more than one {kind} stream")));
        }
        classified.push((kind, stream));
    }

    if classified.len() != 2 {
        return Err(anomaly(format!(
            "{} stream(s) reported, expected one video and one audio stream",
            classified.len()
        )));
    }

    Ok(classified)
}

fn merge_stream_row(
    path: &Path,
    kind: StreamKind,
    stream: &Map<String, Value>,
    pending: &PendingProperty,
    map: &mut PropertyMap,
    outcome: &mut MergeOutcome,
) {
    let spec = pending.spec;
    let value = stream.get(spec.field).filter(|v| !v.is_null());

    let Some(value) = value else {
        if spec.is_stream_bitrate() {
            log::info!(
                "No {} bit_rate reported for '{}', calculating from packets",
                kind,
                path.display()
            );
            outcome.bitrate_fallback.insert(kind);
        } else {
            log::warn!(
                "ffprobe did not report {} {} for {} of '{}'",
                kind,
                spec.field,
                spec.canonical,
                path.display()
            );
        }
        return;
    };

    if kind == StreamKind::Video
        && spec.field == "avg_frame_rate"
        && value.as_str() == Some(DEGENERATE_FRAME_RATE)
    {
        log::info!(
            "Frame rate of '{}' reported as {}, counting packets",
            path.display(),
            DEGENERATE_FRAME_RATE
        );
        outcome.frame_rate_fallback = true;
        return;
    }

    map.insert(spec.probed_key(), copy_value(value));
}

/// Integral numbers become integers; every other value is kept as is.
fn copy_value(value: &Value) -> Value {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Value::from(int)
            } else if let Some(float) = number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            {
                Value::from(float as i64)
            } else {
                value.clone()
            }
        }
        _ => value.clone(),
    }
}

/// Logs a low detection score and a container that does not match the
/// file extension. Neither is fatal.
fn validate_format(path: &Path, format: &Map<String, Value>) {
    if let Some(score) = format.get("probe_score").and_then(Value::as_i64) {
        if score < MAX_PROBE_SCORE {
            log::warn!(
                "ffprobe detected the format of '{}' with score {} of {}",
                path.display(),
                score,
                MAX_PROBE_SCORE
            );
        }
    }

    let format_name = format.get("format_name").and_then(Value::as_str);
    let extension = path.extension().and_then(|ext| ext.to_str());
    if let (Some(format_name), Some(extension)) = (format_name, extension) {
        if !extension_matches_format(format_name, extension) {
            log::warn!(
                "Extension '.{}' of '{}' does not match detected format '{}'",
                extension,
                path.display(),
                format_name
            );
        }
    }
}

fn merge_tags(format: &Map<String, Value>, map: &mut PropertyMap) {
    let Some(tags) = format.get("tags").and_then(Value::as_object) else {
        return;
    };

    map.insert(FORMAT_TAGS_KEY, Value::Object(tags.clone()));

    let artist = ARTIST_TAGS.iter().find_map(|wanted| {
        tags.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, value)| value)
    });
    if let Some(artist) = artist {
        map.insert(ARTIST_KEY, artist.clone());
    }
}
