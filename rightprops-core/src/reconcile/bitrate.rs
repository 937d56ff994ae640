//! Encoding bitrate computed from packet sizes when the container does not
//! declare one for a stream.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::timing::{
    TimeBase, bits_per_second, parse_count, parse_seconds, resolve_duration,
};
use crate::error::CoreResult;
use crate::external::{FfprobeExecutor, PrintFormat, ProbeRequest};
use crate::properties::StreamKind;
use crate::properties::table::calculated_bitrate_key;

const BITRATE_ENTRIES: &str =
    "packet=codec_type,duration,size:stream=codec_type,time_base,duration";

/// Running totals for one stream kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackAccumulator {
    pub sum_bytes: u64,
    pub sum_duration_ticks: i64,
    pub time_base: Option<TimeBase>,
    pub declared_duration: Option<f64>,
    pub packet_count: u64,
}

impl FallbackAccumulator {
    /// Seconds covered by the stream, see [`resolve_duration`].
    pub fn duration(&self) -> Option<f64> {
        resolve_duration(self.declared_duration, self.sum_duration_ticks, self.time_base)
    }
}

/// Builds the packet pass for `kinds`. A single kind is selected on the
/// command line; with both, lines are told apart by their codec_type column.
pub fn bitrate_request(kinds: &BTreeSet<StreamKind>) -> ProbeRequest {
    let request = ProbeRequest::new(BITRATE_ENTRIES, PrintFormat::Csv { print_section: true });
    let mut iter = kinds.iter();
    match (iter.next(), iter.next()) {
        (Some(kind), None) => request.select_streams(*kind),
        _ => request,
    }
}

/// Adds one CSV line to the accumulators.
///
/// Lines look like `packet,<type>,<duration ticks>,<size>` and
/// `stream,<type>,<time_base>,<duration seconds>`.
pub fn accumulate_line(
    line: &str,
    kinds: &BTreeSet<StreamKind>,
    accumulators: &mut BTreeMap<StreamKind, FallbackAccumulator>,
) {
    let mut columns = line.trim().split(',');
    let section = columns.next();
    let Some(kind) = columns.next().and_then(StreamKind::from_codec_type) else {
        return;
    };
    if !kinds.contains(&kind) {
        return;
    }

    let first = columns.next().unwrap_or("");
    let second = columns.next().unwrap_or("");
    let acc = accumulators.entry(kind).or_default();

    match section {
        Some("packet") => {
            acc.packet_count += 1;
            acc.sum_duration_ticks = acc
                .sum_duration_ticks
                .saturating_add(parse_count(first).unwrap_or(0));
            acc.sum_bytes = acc
                .sum_bytes
                .saturating_add(parse_count(second).map_or(0, |size| size.max(0) as u64));
        }
        Some("stream") => {
            acc.time_base = TimeBase::parse(first);
            acc.declared_duration = parse_seconds(second);
        }
        _ => {}
    }
}

/// Runs the packet pass and returns the derived bitrate of each kind whose
/// duration could be resolved.
pub async fn calculate_bitrates(
    executor: &dyn FfprobeExecutor,
    path: &Path,
    kinds: &BTreeSet<StreamKind>,
    cancel: &CancellationToken,
) -> CoreResult<Vec<(String, Value)>> {
    let request = bitrate_request(kinds);
    let mut accumulators = BTreeMap::new();
    executor
        .stream_lines(&request, path, cancel, &mut |line: &str| {
            accumulate_line(line, kinds, &mut accumulators)
        })
        .await?;

    let mut derived = Vec::new();
    for kind in kinds {
        let Some(acc) = accumulators.get(kind) else {
            log::warn!("No {} packets found in '{}', bitrate omitted", kind, path.display());
            continue;
        };

        log::debug!(
            "{} bitrate inputs for '{}': {} packets, {} bytes, {} ticks, \
             time base {:?}, declared duration {:?}",
            kind,
            path.display(),
            acc.packet_count,
            acc.sum_bytes,
            acc.sum_duration_ticks,
            acc.time_base,
            acc.declared_duration
        );
        if acc.declared_duration.is_none() {
            log::warn!(
                "No {} stream duration declared for '{}', summing packet durations",
                kind,
                path.display()
            );
        }

        match acc.duration().and_then(|secs| bits_per_second(acc.sum_bytes, secs)) {
            Some(bps) => derived.push((calculated_bitrate_key(*kind), Value::from(bps))),
            None => log::warn!(
                "Could not resolve the {} stream duration of '{}', bitrate omitted",
                kind,
                path.display()
            ),
        }
    }

    Ok(derived)
}
