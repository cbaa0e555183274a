use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod physics;

pub use app::{
    project_segment, run_app, view_to_screen, world_to_screen, world_to_view, AppError,
    Camera3D, DialogDirective, InputAction, InputSnapshot, LoopConfig, LoopMetricsSnapshot,
    Renderer, Scene, SceneCommand, SceneWorld, Viewport, WireLine, DEFAULT_VERTICAL_FOV_RADIANS,
    NEAR_PLANE, SKY_CLEAR_COLOR, SLOW_FRAME_ENV_VAR,
};
pub use content::{
    load_level, parse_json, parse_level, JsonParseError, LevelDef, LevelLoadError, StaticBoxDef,
    TriggerActionDef, TriggerDef, TriggerModeDef, DEFAULT_SPAWN_YAW,
};
pub use physics::{
    BodyHandle, BodyShape, DynamicBodyDesc, PhysicsWorld, RapierWorld, RayHit, DEFAULT_GRAVITY,
};

pub const ROOT_ENV_VAR: &str = "UNEARTHED_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub levels_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        Self {
            levels_dir: assets_dir.join("levels"),
            config_dir: assets_dir.join("config"),
            root,
        }
    }

    pub fn level_file(&self, level_name: &str) -> PathBuf {
        self.levels_dir.join(format!("{level_name}.json"))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "UNEARTHED_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
PowerShell: $env:{env_var}=\"C:\\path\\to\\unearthed\"\n\
Bash/zsh: export {env_var}=\"/path/to/unearthed\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_root().map(AppPaths::from_root)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            find_root_above(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_root_above(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::create_dir(dir.path().join("assets")).expect("assets");
        assert!(!is_repo_marker(dir.path()));

        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("cargo toml");
        assert!(is_repo_marker(dir.path()));
    }

    #[test]
    fn root_is_found_from_nested_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("cargo toml");
        fs::create_dir(dir.path().join("crates")).expect("crates");
        let nested = dir.path().join("target").join("debug");
        fs::create_dir_all(&nested).expect("nested");

        let root = find_root_above(&nested).expect("root");
        assert_eq!(root, normalize_path(dir.path()));
    }

    #[test]
    fn app_paths_point_into_assets() {
        let paths = AppPaths::from_root(PathBuf::from("/game"));
        assert_eq!(paths.levels_dir, PathBuf::from("/game/assets/levels"));
        assert_eq!(paths.config_dir, PathBuf::from("/game/assets/config"));
        assert_eq!(
            paths.level_file("entrance"),
            PathBuf::from("/game/assets/levels/entrance.json")
        );
    }
}
