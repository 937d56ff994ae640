//! Video frame rate computed by counting packets when ffprobe reports
//! `0/0`.
//!
//! The first pass reads the packet count, time base and declared duration
//! of the video stream. When the duration is not declared a second pass
//! sums the per-packet durations.

use serde_json::Value;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::timing::{TimeBase, parse_count, parse_seconds, resolve_duration};
use crate::error::CoreResult;
use crate::external::{FfprobeExecutor, PrintFormat, ProbeRequest};
use crate::properties::StreamKind;
use crate::properties::table::VIDEO_FRAME_RATE_CALCULATED_KEY;

/// Parsed `time_base,duration,nb_read_packets` line.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketCount {
    pub time_base: Option<TimeBase>,
    pub declared_duration: Option<f64>,
    pub packets: Option<i64>,
}

pub fn count_request() -> ProbeRequest {
    ProbeRequest::new(
        "stream=time_base,duration,nb_read_packets",
        PrintFormat::Csv { print_section: false },
    )
    .select_streams(StreamKind::Video)
    .count_packets()
}

pub fn packet_duration_request() -> ProbeRequest {
    ProbeRequest::new("packet=duration", PrintFormat::DefaultNoKey)
        .select_streams(StreamKind::Video)
}

/// Parses the last non-empty line of the count pass.
pub fn parse_count_output(output: &str) -> Option<PacketCount> {
    let line = output.lines().rev().find(|line| !line.trim().is_empty())?;
    let mut columns = line.trim().split(',');
    let time_base = TimeBase::parse(columns.next()?);
    let declared_duration = columns.next().and_then(parse_seconds);
    let packets = columns.next().and_then(parse_count);

    Some(PacketCount {
        time_base,
        declared_duration,
        packets,
    })
}

/// Formats the derived rate as `<packets>/<seconds>`.
pub fn format_frame_rate(packets: i64, seconds: f64) -> String {
    format!("{packets}/{seconds}")
}

/// Runs the count pass (and the duration pass when needed) for `path`.
pub async fn calculate_frame_rate(
    executor: &dyn FfprobeExecutor,
    path: &Path,
    cancel: &CancellationToken,
) -> CoreResult<Option<(String, Value)>> {
    let output = executor.read_to_string(&count_request(), path, cancel).await?;
    let Some(count) = parse_count_output(&output) else {
        log::warn!("No packet count reported for '{}', frame rate omitted", path.display());
        return Ok(None);
    };
    log::debug!("Frame rate inputs for '{}': {:?}", path.display(), count);

    let Some(packets) = count.packets else {
        log::warn!("Unparseable packet count for '{}', frame rate omitted", path.display());
        return Ok(None);
    };

    let seconds = match count.declared_duration {
        Some(declared) => resolve_duration(Some(declared), 0, count.time_base),
        None => {
            log::warn!(
                "No video stream duration declared for '{}', summing packet durations",
                path.display()
            );
            let mut ticks: i64 = 0;
            executor
                .stream_lines(&packet_duration_request(), path, cancel, &mut |line: &str| {
                    ticks = ticks.saturating_add(parse_count(line).unwrap_or(0));
                })
                .await?;
            resolve_duration(None, ticks, count.time_base)
        }
    };

    match seconds {
        Some(seconds) => Ok(Some((
            VIDEO_FRAME_RATE_CALCULATED_KEY.to_string(),
            Value::from(format_frame_rate(packets, seconds)),
        ))),
        None => {
            log::warn!(
                "Could not resolve the video duration of '{}', frame rate omitted",
                path.display()
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_output_takes_last_line() {
        let parsed = parse_count_output("1/1000,5.000000,100\n1/90000,10.000000,250\n\n").unwrap();
        assert_eq!(parsed.time_base, Some(TimeBase { num: 1, den: 90000 }));
        assert_eq!(parsed.declared_duration, Some(10.0));
        assert_eq!(parsed.packets, Some(250));
    }

    #[test]
    fn test_parse_count_output_with_na_duration() {
        let parsed = parse_count_output("1/1000,N/A,300").unwrap();
        assert_eq!(parsed.declared_duration, None);
        assert_eq!(parsed.packets, Some(300));
        assert_eq!(parse_count_output(""), None);
    }

    #[test]
    fn test_format_frame_rate() {
        assert_eq!(format_frame_rate(300, 10.0), "300/10");
        assert_eq!(format_frame_rate(250, 10.5), "250/10.5");
    }

    #[test]
    fn test_requests() {
        let args = count_request().args();
        assert!(args.iter().any(|a| a == "-count_packets"));
        assert!(args.iter().any(|a| a == "csv=print_section=0"));

        let args = packet_duration_request().args();
        assert!(args.windows(2).any(|w| w == ["-select_streams", "v"]));
        assert!(args.iter().any(|a| a == "default=nokey=1:noprint_wrappers=1"));
    }
}
