use std::env;

use engine::{load_level, resolve_app_paths, LevelLoadError, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{load_gameplay_tuning, ConfigError, GAMEPLAY_CONFIG_FILE};
use super::gameplay;

const LEVEL_ENV_VAR: &str = "UNEARTHED_LEVEL";
const DEFAULT_LEVEL: &str = "entrance";

pub(crate) struct AppWiring {
    pub(crate) level_name: String,
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Level(#[from] LevelLoadError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{var} must be a plain level name, got '{value}'")]
    InvalidLevelName { var: &'static str, value: String },
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Unearthed Startup ===");

    let paths = resolve_app_paths()?;
    let level_name = level_name_from_env()?;
    let level = load_level(&paths.level_file(&level_name))?;
    let tuning = load_gameplay_tuning(&paths.config_dir.join(GAMEPLAY_CONFIG_FILE))?;
    info!(
        root = %paths.root.display(),
        level = %level.name,
        camera_mode = ?tuning.camera_mode,
        "bootstrap_ready"
    );

    let config = LoopConfig {
        window_title: format!("Unearthed | {}", level.name),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        level_name,
        config,
        scene: gameplay::build_gameplay_scene(level, tuning),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn level_name_from_env() -> Result<String, BootstrapError> {
    parse_level_name(env::var(LEVEL_ENV_VAR).ok().as_deref())
}

fn parse_level_name(raw: Option<&str>) -> Result<String, BootstrapError> {
    let name = raw.map(str::trim).filter(|name| !name.is_empty());
    let Some(name) = name else {
        return Ok(DEFAULT_LEVEL.to_string());
    };
    let plain = name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if !plain {
        return Err(BootstrapError::InvalidLevelName {
            var: LEVEL_ENV_VAR,
            value: name.to_string(),
        });
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_name_defaults_to_entrance() {
        assert_eq!(parse_level_name(None).expect("default"), "entrance");
        assert_eq!(parse_level_name(Some("   ")).expect("blank"), "entrance");
    }

    #[test]
    fn level_name_is_trimmed() {
        assert_eq!(parse_level_name(Some(" caves ")).expect("name"), "caves");
    }

    #[test]
    fn level_name_rejects_paths() {
        assert!(parse_level_name(Some("../secret")).is_err());
        assert!(parse_level_name(Some("levels/entrance")).is_err());
    }

    #[test]
    fn shipped_entrance_level_loads_with_default_config() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let paths = engine::AppPaths::from_root(root);
        let level = load_level(&paths.level_file(DEFAULT_LEVEL)).expect("entrance level");
        let tuning = load_gameplay_tuning(&paths.config_dir.join(GAMEPLAY_CONFIG_FILE))
            .expect("gameplay config");

        assert_eq!(level.name, "entrance");
        assert!(level.triggers.iter().any(|trigger| trigger.id == "exit_gate"));
        assert!(tuning.validate().is_ok());
    }
}
