//! Static mapping between canonical properties and ffprobe section entries.
//!
//! The canonical names follow the platform property namespace
//! (`System.Video.FrameWidth`, ...). Each row names the ffprobe section the
//! value lives in and the entry within that section. Row order follows the
//! platform's full-details property list and is the order in which the
//! planner records pending rows.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Classification of a media stream reported by ffprobe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    /// Classifies an ffprobe `codec_type` value. Anything other than video
    /// or audio yields `None`.
    pub fn from_codec_type(codec_type: &str) -> Option<Self> {
        match codec_type {
            "video" => Some(StreamKind::Video),
            "audio" => Some(StreamKind::Audio),
            _ => None,
        }
    }

    /// The `codec_type` string ffprobe uses for this kind.
    pub fn codec_type(self) -> &'static str {
        match self {
            StreamKind::Video => "video",
            StreamKind::Audio => "audio",
        }
    }

    /// Stream specifier accepted by `-select_streams`.
    pub fn specifier(self) -> &'static str {
        match self {
            StreamKind::Video => "v",
            StreamKind::Audio => "a",
        }
    }

    /// Capitalized name used in property keys (`FFProbe.Video...`).
    pub fn key_segment(self) -> &'static str {
        match self {
            StreamKind::Video => "Video",
            StreamKind::Audio => "Audio",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codec_type())
    }
}

/// ffprobe section a property is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Stream,
    Format,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::Stream => "stream",
            Section::Format => "format",
        }
    }
}

/// Where a property's value is found in an ffprobe response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The container-level `format` section.
    Format,
    /// The stream of the given kind.
    Stream(StreamKind),
}

impl Target {
    pub fn section(self) -> Section {
        match self {
            Target::Format => Section::Format,
            Target::Stream(_) => Section::Stream,
        }
    }
}

/// One row of the property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    /// Name in the platform namespace, e.g. `System.Video.FrameWidth`.
    pub canonical: &'static str,
    /// Section (and stream kind) holding the value.
    pub target: Target,
    /// Entry name inside the ffprobe section.
    pub field: &'static str,
}

impl PropertySpec {
    /// Key under which a value retrieved from ffprobe is stored: the
    /// canonical name with its `System` prefix replaced by `FFProbe`.
    pub fn probed_key(&self) -> String {
        let suffix = self
            .canonical
            .strip_prefix("System")
            .unwrap_or(self.canonical);
        format!("{PROBED_KEY_PREFIX}{suffix}")
    }

    /// True for a stream-level bitrate row, the only row with a fallback.
    pub fn is_stream_bitrate(&self) -> bool {
        matches!(self.target, Target::Stream(_)) && self.field == "bit_rate"
    }
}

/// Prefix of every key written by the reconciliation engine.
pub const PROBED_KEY_PREFIX: &str = "FFProbe";

/// Suffix of keys holding locally derived values.
pub const CALCULATED_SUFFIX: &str = "Calculated";

/// Key holding the verbatim container tags.
pub const FORMAT_TAGS_KEY: &str = "FFProbe.Format.Tags";

/// Key holding the unified artist value.
pub const ARTIST_KEY: &str = "FFProbe.Music.Artist";

/// Key of the direct video frame rate value.
pub const VIDEO_FRAME_RATE_KEY: &str = "FFProbe.Video.FrameRate";

/// Key of the derived video frame rate value.
pub const VIDEO_FRAME_RATE_CALCULATED_KEY: &str = "FFProbe.Video.FrameRate.Calculated";

/// Key of the derived encoding bitrate for a stream kind.
pub fn calculated_bitrate_key(kind: StreamKind) -> String {
    format!(
        "{PROBED_KEY_PREFIX}.{}.EncodingBitrate.{CALCULATED_SUFFIX}",
        kind.key_segment()
    )
}

const VIDEO: Target = Target::Stream(StreamKind::Video);
const AUDIO: Target = Target::Stream(StreamKind::Audio);

const fn row(canonical: &'static str, target: Target, field: &'static str) -> PropertySpec {
    PropertySpec {
        canonical,
        target,
        field,
    }
}

/// The canonical property table.
pub static PROPERTY_TABLE: [PropertySpec; 9] = [
    row("System.Media.Duration", Target::Format, "duration"),
    row("System.Video.FrameWidth", VIDEO, "width"),
    row("System.Video.FrameHeight", VIDEO, "height"),
    row("System.Video.EncodingBitrate", VIDEO, "bit_rate"),
    row("System.Video.TotalBitrate", Target::Format, "bit_rate"),
    row("System.Video.FrameRate", VIDEO, "avg_frame_rate"),
    row("System.Audio.EncodingBitrate", AUDIO, "bit_rate"),
    row("System.Audio.ChannelCount", AUDIO, "channels"),
    row("System.Audio.SampleRate", AUDIO, "sample_rate"),
];

/// Entries always requested alongside any stream entries: `codec_type`
/// classifies streams.
pub const STREAM_DIAGNOSTIC_FIELDS: &[&str] = &["codec_type"];

/// Entries always requested alongside any format entries: `format_name` is
/// checked against the file extension and `probe_score` against its maximum.
pub const FORMAT_DIAGNOSTIC_FIELDS: &[&str] = &["format_name", "probe_score"];

/// Highest confidence score ffprobe assigns to a detected format.
pub const MAX_PROBE_SCORE: i64 = 100;

/// Container tags inspected for the unified artist value, in priority order.
pub const ARTIST_TAGS: &[&str] = &["artist", "album_artist", "author"];

/// Extensions of demuxers whose `format_name` is not itself a list of
/// extensions.
static FORMAT_EXTENSION_ALIASES: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        HashMap::from([
            ("mpeg", &["mpg", "mpeg"][..]),
            ("asf", &["asf", "wmv", "wma"][..]),
            ("ogg", &["ogg", "ogv", "spx", "opus"][..]),
            ("matroska,webm", &["mkv", "mk3d", "mka", "mks", "webm"][..]),
            (
                "mov,mp4,m4a,3gp,3g2,mj2",
                &[
                    "mov", "mp4", "m4a", "3gp", "3g2", "mj2", "psp", "m4b", "ism", "ismv",
                    "isma", "f4v", "avif",
                ][..],
            ),
        ])
    });

/// Returns true if `extension` (without the leading dot) is a known
/// extension for the demuxer named `format_name`.
pub fn extension_matches_format(format_name: &str, extension: &str) -> bool {
    let matches = |candidate: &str| candidate.eq_ignore_ascii_case(extension);

    format_name.split(',').any(|name| matches(name.trim()))
        || FORMAT_EXTENSION_ALIASES
            .get(format_name)
            .is_some_and(|exts| exts.iter().any(|ext| matches(ext)))
}
