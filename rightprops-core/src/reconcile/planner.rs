//! Computes the smallest ffprobe request covering a file's missing
//! properties.

use crate::external::{PrintFormat, ProbeRequest};
use crate::properties::table::{FORMAT_DIAGNOSTIC_FIELDS, STREAM_DIAGNOSTIC_FIELDS};
use crate::properties::{PROPERTY_TABLE, PropertyMap, PropertySpec, Section};

/// A table row the map is missing, with its position in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingProperty {
    pub index: usize,
    pub spec: &'static PropertySpec,
}

/// Result of planning one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    /// Value passed to `-show_entries`. Empty when nothing is pending.
    pub prober_argument: String,
    /// Missing rows, in table order.
    pub pending: Vec<PendingProperty>,
}

impl QueryPlan {
    /// True when no ffprobe call is needed.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The primary JSON request for this plan.
    pub fn request(&self) -> ProbeRequest {
        ProbeRequest::new(self.prober_argument.clone(), PrintFormat::JsonCompact)
    }
}

/// Plans against the canonical property table.
pub fn plan(map: &PropertyMap) -> QueryPlan {
    plan_with_table(map, &PROPERTY_TABLE)
}

pub fn plan_with_table(map: &PropertyMap, table: &'static [PropertySpec]) -> QueryPlan {
    let mut stream_fields: Vec<&'static str> = Vec::new();
    let mut format_fields: Vec<&'static str> = Vec::new();
    let mut pending = Vec::new();

    for (index, spec) in table.iter().enumerate() {
        if map.contains_key(spec.canonical) {
            continue;
        }
        pending.push(PendingProperty { index, spec });
        let fields = match spec.target.section() {
            Section::Stream => &mut stream_fields,
            Section::Format => &mut format_fields,
        };
        push_unique(fields, spec.field);
    }

    if pending.is_empty() {
        return QueryPlan::default();
    }

    for &field in STREAM_DIAGNOSTIC_FIELDS {
        push_unique(&mut stream_fields, field);
    }
    for &field in FORMAT_DIAGNOSTIC_FIELDS {
        push_unique(&mut format_fields, field);
    }

    let prober_argument = format!(
        "{}={}:{}={}:error:format_tags",
        Section::Stream.name(),
        stream_fields.join(","),
        Section::Format.name(),
        format_fields.join(",")
    );

    QueryPlan {
        prober_argument,
        pending,
    }
}

fn push_unique(fields: &mut Vec<&'static str>, field: &'static str) {
    if !fields.contains(&field) {
        fields.push(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map_requests_every_row() {
        let plan = plan(&PropertyMap::new());

        assert_eq!(plan.pending.len(), PROPERTY_TABLE.len());
        assert_eq!(
            plan.prober_argument,
            "stream=width,height,bit_rate,avg_frame_rate,channels,sample_rate,codec_type:\
             format=duration,bit_rate,format_name,probe_score:error:format_tags"
        );
        let indexes: Vec<_> = plan.pending.iter().map(|p| p.index).collect();
        assert_eq!(indexes, (0..PROPERTY_TABLE.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_present_rows_are_skipped() {
        let mut map = PropertyMap::new();
        map.insert("System.Video.FrameWidth", 1920);
        map.insert("System.Video.FrameHeight", 1080);
        map.insert("System.Media.Duration", 10);

        let plan = plan(&map);

        assert!(plan.pending.iter().all(|p| !map.contains_key(p.spec.canonical)));
        assert!(!plan.prober_argument.contains("width"));
        assert!(!plan.prober_argument.contains("duration"));
        assert_eq!(plan.pending.first().map(|p| p.index), Some(3));
    }

    #[test]
    fn test_diagnostics_added_to_both_sections() {
        let mut map = PropertyMap::new();
        for spec in PROPERTY_TABLE.iter().filter(|s| s.canonical != "System.Audio.ChannelCount") {
            map.insert(spec.canonical, 1);
        }

        let plan = plan(&map);

        assert_eq!(plan.pending.len(), 1);
        assert_eq!(plan.pending[0].index, 7);
        assert_eq!(
            plan.prober_argument,
            "stream=channels,codec_type:format=format_name,probe_score:error:format_tags"
        );
    }

    #[test]
    fn test_complete_map_needs_no_probe() {
        let map: PropertyMap = PROPERTY_TABLE
            .iter()
            .map(|spec| (spec.canonical, 0))
            .collect();

        let plan = plan(&map);

        assert!(plan.is_empty());
        assert!(plan.prober_argument.is_empty());
    }

    #[test]
    fn test_shared_field_names_deduplicated_per_section() {
        // bit_rate appears twice in the stream section and once in format
        let plan = plan(&PropertyMap::new());
        let stream_part = plan.prober_argument.split(':').next().unwrap();
        assert_eq!(stream_part.matches("bit_rate").count(), 1);
    }
}
