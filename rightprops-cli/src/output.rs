//! Writing collected property maps to the run's JSON file.

use rightprops_core::{PropertyMap, format_elapsed};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{CliErrorContext, CliResult};

/// Name of the output file for a run started at `timestamp`.
pub fn output_file_name(timestamp: &str) -> String {
    format!("props.{timestamp}.json")
}

/// Writes `maps` as a pretty-printed JSON array to `dir/props.<timestamp>.json`
/// and returns the path written.
pub fn write_results(dir: &Path, timestamp: &str, maps: &[PropertyMap]) -> CliResult<PathBuf> {
    let path = dir.join(output_file_name(timestamp));
    let start = Instant::now();

    let file = File::create(&path)
        .cli_with_context(|| format!("Failed to create '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, maps)
        .map_err(std::io::Error::from)
        .cli_with_context(|| format!("Failed to write '{}'", path.display()))?;
    writer
        .flush()
        .cli_with_context(|| format!("Failed to write '{}'", path.display()))?;

    log::info!(
        "Wrote {} result(s) to '{}' in {}",
        maps.len(),
        path.display(),
        format_elapsed(start.elapsed())
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    #[test]
    fn test_writes_unescaped_pretty_array() {
        let dir = tempdir().unwrap();
        let map: PropertyMap = vec![("System.FileName", json!("café.mp4"))].into_iter().collect();

        let path = write_results(dir.path(), "20240601_123045", &[map]).unwrap();

        assert_eq!(path.file_name().unwrap(), "props.20240601_123045.json");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("café.mp4"));
        assert!(text.contains('\n'));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!([{"System.FileName": "café.mp4"}]));
    }

    #[test]
    fn test_empty_run_writes_empty_array() {
        let dir = tempdir().unwrap();
        let path = write_results(dir.path(), "20240601_000000", &[]).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap().trim(), "[]");
    }
}
