//! Implementation of the property collection run.
//!
//! Resolves the command-line paths, checks the ffprobe binary, runs the core
//! collector with Ctrl-C wired to its cancellation token, and writes the
//! results to the current directory.

use crate::cli::Cli;
use crate::error::{CliErrorContext, CliResult};
use crate::logging::get_timestamp;
use crate::output::write_results;

use rightprops_core::config::DEFAULT_FFPROBE_BIN;
use rightprops_core::{CoreConfig, CoreConfigBuilder, PropertyCollector, check_dependency};

use log::{info, warn};
use std::path::{Path, PathBuf};

/// Makes `path` absolute relative to the current directory.
fn absolute(path: &Path) -> CliResult<PathBuf> {
    std::path::absolute(path)
        .cli_with_context(|| format!("Failed to resolve path '{}'", path.display()))
}

/// Resolves the ffprobe executable. A bare program name is left for PATH
/// lookup; anything with a directory component is made absolute.
pub fn resolve_ffprobe_bin(bin: Option<&Path>) -> CliResult<PathBuf> {
    match bin {
        None => Ok(PathBuf::from(DEFAULT_FFPROBE_BIN)),
        Some(bin) if bin.components().count() > 1 => absolute(bin),
        Some(bin) => Ok(bin.to_path_buf()),
    }
}

/// Builds and validates the core configuration from the arguments.
pub fn build_config(args: &Cli) -> CliResult<CoreConfig> {
    let config = CoreConfigBuilder::new()
        .lookup_dir(absolute(&args.lookup_dir)?)
        .ffprobe_bin(resolve_ffprobe_bin(args.ffprobe_bin.as_deref())?)
        .probe_missing_props(!args.no_video_missing_props_probe)
        .recursive(!args.no_recursive)
        .build();
    config.validate()?;
    Ok(config)
}

/// Runs a full collection and returns the path of the written JSON file.
pub async fn run_collect(args: &Cli) -> CliResult<PathBuf> {
    let config = build_config(args)?;
    let output_dir = std::env::current_dir()
        .cli_context("Failed to determine the current directory")?;
    let timestamp = get_timestamp();

    if config.probe_missing_props {
        if let Err(e) = check_dependency(&config.ffprobe_bin) {
            warn!("ffprobe check failed ({}), video files cannot be probed", e);
        }
    } else {
        info!("Probing of missing video properties is disabled");
    }

    let collector = PropertyCollector::new(config);
    let token = collector.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding work");
            token.cancel();
        }
    });

    let maps = collector.collect().await?;
    write_results(&output_dir, &timestamp, &maps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rightprops_core::CoreError;
    use tempfile::tempdir;

    #[test]
    fn test_bare_ffprobe_name_is_kept() {
        assert_eq!(resolve_ffprobe_bin(None).unwrap(), PathBuf::from("ffprobe"));
        assert_eq!(
            resolve_ffprobe_bin(Some(Path::new("ffprobe7"))).unwrap(),
            PathBuf::from("ffprobe7")
        );
    }

    #[test]
    fn test_relative_ffprobe_path_is_made_absolute() {
        let resolved = resolve_ffprobe_bin(Some(Path::new("bin/ffprobe"))).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("bin/ffprobe"));
    }

    #[test]
    fn test_build_config_maps_flags() {
        let dir = tempdir().unwrap();
        let args = Cli::try_parse_from([
            "rightprops",
            "--no-recursive",
            "--no-video-missing-props-probe",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();

        let config = build_config(&args).unwrap();

        assert!(!config.recursive);
        assert!(!config.probe_missing_props);
        assert!(config.lookup_dir.is_absolute());
    }

    #[test]
    fn test_build_config_rejects_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, b"x").unwrap();
        let args = Cli::try_parse_from(["rightprops", file.to_str().unwrap()]).unwrap();

        assert!(matches!(build_config(&args), Err(CoreError::NotADirectory(_))));
    }
}
