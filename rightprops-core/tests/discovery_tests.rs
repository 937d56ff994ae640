// rightprops-core/tests/discovery_tests.rs

use rightprops_core::config::CoreConfigBuilder;
use rightprops_core::error::CoreError;
use rightprops_core::external::mocks::MockFfprobeExecutor;
use rightprops_core::{FsPropertySource, PropertyCollector, PropertyMap};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

/// Minimal ISO base media header, sniffed as video/mp4.
const MP4_HEADER: &[u8] = &[
    0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm', 0x00, 0x00, 0x02,
    0x00, b'i', b's', b'o', b'm', b'm', b'p', b'4', b'1',
];

fn write_video(path: &Path) {
    fs::write(path, MP4_HEADER).unwrap();
}

fn collector(
    dir: &Path,
    probe: bool,
    recursive: bool,
    mock: &MockFfprobeExecutor,
) -> PropertyCollector {
    let config = CoreConfigBuilder::new()
        .lookup_dir(dir.to_path_buf())
        .probe_missing_props(probe)
        .recursive(recursive)
        .build();
    PropertyCollector::with_components(config, Arc::new(FsPropertySource), Arc::new(mock.clone()))
}

fn primary_pattern(path: &Path) -> String {
    format!("json=compact=1 {}", path.display())
}

fn names(maps: &[PropertyMap]) -> Vec<String> {
    let mut names: Vec<String> = maps
        .iter()
        .filter_map(|m| m.get_str("System.FileName").map(str::to_string))
        .collect();
    names.sort();
    names
}

fn two_stream_output() -> String {
    json!({
        "streams": [
            {
                "codec_type": "video",
                "width": 640,
                "height": 360,
                "bit_rate": "800000",
                "avg_frame_rate": "24/1"
            },
            {"codec_type": "audio", "bit_rate": "96000", "channels": 1, "sample_rate": "22050"}
        ],
        "format": {
            "duration": "3.000000",
            "bit_rate": "896000",
            "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
            "probe_score": 100
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_probe_disabled_collects_every_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "plain text").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    write_video(&dir.path().join("nested").join("clip.mp4"));
    let mock = MockFfprobeExecutor::new();

    let maps = collector(dir.path(), false, true, &mock).collect().await.unwrap();

    assert_eq!(names(&maps), vec!["clip.mp4", "notes.txt"]);
    assert!(maps.iter().all(|m| m.keys().all(|k| !k.starts_with("FFProbe"))));
    assert!(mock.get_received_calls().is_empty());
}

#[tokio::test]
async fn test_non_recursive_stays_at_top_level() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("top.txt"), "a").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested").join("deep.txt"), "b").unwrap();
    let mock = MockFfprobeExecutor::new();

    let maps = collector(dir.path(), true, false, &mock).collect().await.unwrap();

    assert_eq!(names(&maps), vec!["top.txt"]);
}

#[tokio::test]
async fn test_only_video_files_are_probed() {
    let dir = tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    write_video(&video);
    fs::write(dir.path().join("readme.txt"), "hello").unwrap();
    let mock = MockFfprobeExecutor::new();
    mock.add_output_expectation(&primary_pattern(&video), &two_stream_output());

    let maps = collector(dir.path(), true, true, &mock).collect().await.unwrap();

    assert_eq!(maps.len(), 2);
    let calls = mock.get_received_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].last().map(String::as_str), video.to_str());

    let clip = maps
        .iter()
        .find(|m| m.get_str("System.FileName") == Some("clip.mp4"))
        .unwrap();
    assert_eq!(clip.get("FFProbe.Video.FrameWidth"), Some(&json!(640)));
    assert_eq!(clip.get("FFProbe.Audio.ChannelCount"), Some(&json!(1)));
}

#[tokio::test]
async fn test_structural_anomaly_discards_results() {
    let dir = tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    write_video(&video);
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();
    let mock = MockFfprobeExecutor::new();
    let three_streams = json!({
        "streams": [
            {"codec_type": "video"},
            {"codec_type": "audio"},
            {"codec_type": "audio"}
        ],
        "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "probe_score": 100}
    })
    .to_string();
    mock.add_output_expectation(&primary_pattern(&video), &three_streams);

    let result = collector(dir.path(), true, true, &mock).collect().await;

    assert!(matches!(result, Err(CoreError::StructuralAnomaly { .. })));
}

#[tokio::test]
async fn test_failure_cancels_outstanding_probes() {
    let dir = tempdir().unwrap();
    let stuck = dir.path().join("stuck.mp4");
    let broken = dir.path().join("broken.mp4");
    write_video(&stuck);
    write_video(&broken);
    let mock = MockFfprobeExecutor::new();
    mock.add_hang_expectation(&primary_pattern(&stuck));
    mock.add_error_expectation(
        &primary_pattern(&broken),
        CoreError::JsonParseError("unexpected end of input".into()),
    );

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        collector(dir.path(), true, true, &mock).collect(),
    )
    .await
    .expect("collection should unwind after the first failure");

    assert!(matches!(result, Err(CoreError::JsonParseError(_))));
}

#[tokio::test]
async fn test_external_cancellation_is_reported() {
    let dir = tempdir().unwrap();
    let stuck = dir.path().join("stuck.mp4");
    write_video(&stuck);
    let mock = MockFfprobeExecutor::new();
    mock.add_hang_expectation(&primary_pattern(&stuck));

    let collector = collector(dir.path(), true, true, &mock);
    let token = collector.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(10), collector.collect())
        .await
        .expect("collection should stop once cancelled");

    assert!(matches!(result, Err(CoreError::Cancelled)));
}

#[tokio::test]
async fn test_missing_lookup_dir_is_configuration_error() {
    let dir = tempdir().unwrap();
    let mock = MockFfprobeExecutor::new();

    let result = collector(&dir.path().join("missing"), true, true, &mock)
        .collect()
        .await;

    assert!(matches!(result, Err(CoreError::PathError(_))));
}
