use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{parse_json, JsonParseError};
use thiserror::Error;
use tracing::info;

use super::gameplay::GameplayTuning;

pub(crate) const GAMEPLAY_CONFIG_FILE: &str = "gameplay.json";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: JsonParseError,
    },
    #[error("invalid config file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Loads tuning from `path`. A missing file yields the defaults.
pub(crate) fn load_gameplay_tuning(path: &Path) -> Result<GameplayTuning, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "gameplay_config_defaulted");
            return Ok(GameplayTuning::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let tuning: GameplayTuning = parse_json(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tuning.validate().map_err(|reason| ConfigError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    info!(path = %path.display(), "gameplay_config_loaded");
    Ok(tuning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::CameraMode;

    fn write_config(dir: &tempfile::TempDir, raw: &str) -> PathBuf {
        let path = dir.path().join(GAMEPLAY_CONFIG_FILE);
        fs::write(&path, raw).expect("write config");
        path
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tuning = load_gameplay_tuning(&dir.path().join(GAMEPLAY_CONFIG_FILE)).expect("tuning");
        assert_eq!(tuning, GameplayTuning::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_config(
            &dir,
            r#"{ "max_speed": 3.0, "camera_mode": "follow", "ground_ray_distance": 0.1 }"#,
        );

        let tuning = load_gameplay_tuning(&path).expect("tuning");
        assert_eq!(tuning.max_speed, 3.0);
        assert_eq!(tuning.camera_mode, CameraMode::Follow);
        assert_eq!(tuning.ground_ray_distance, Some(0.1));
        assert_eq!(tuning.look_sensitivity, 0.002);
        assert_eq!(tuning.jump_impulse, 5.0);
    }

    #[test]
    fn unknown_field_is_a_parse_error_with_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_config(&dir, r#"{ "max_sped": 3.0 }"#);

        let error = load_gameplay_tuning(&path).expect_err("unknown field");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn wrong_type_reports_field_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_config(&dir, r#"{ "follow_offset": [0.0, "up", 6.0] }"#);

        match load_gameplay_tuning(&path).expect_err("bad type") {
            ConfigError::Parse { source, .. } => assert_eq!(source.json_path, "follow_offset[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        for raw in [
            r#"{ "look_sensitivity": 0.0 }"#,
            r#"{ "follow_smoothing": 1.5 }"#,
            r#"{ "vertical_fov_degrees": 180.0 }"#,
            r#"{ "ground_ray_distance": -1.0 }"#,
        ] {
            let path = write_config(&dir, raw);
            let error = load_gameplay_tuning(&path).expect_err(raw);
            assert!(matches!(error, ConfigError::Invalid { .. }), "{raw}");
        }
    }
}
