use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::Deserialize;
use thiserror::Error;

use super::{parse_json, JsonParseError};

/// Facing used by the entrance level when a file does not say otherwise.
pub const DEFAULT_SPAWN_YAW: f32 = std::f32::consts::PI * 1.5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelDef {
    pub name: String,
    pub player_spawn: [f32; 3],
    #[serde(default = "default_spawn_yaw")]
    pub player_spawn_yaw: f32,
    #[serde(default)]
    pub static_boxes: Vec<StaticBoxDef>,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
}

fn default_spawn_yaw() -> f32 {
    DEFAULT_SPAWN_YAW
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticBoxDef {
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerDef {
    pub id: String,
    pub corner_a: [f32; 3],
    pub corner_b: [f32; 3],
    #[serde(default)]
    pub mode: TriggerModeDef,
    pub on_enter: TriggerActionDef,
    #[serde(default)]
    pub on_exit: Option<TriggerActionDef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerModeDef {
    #[default]
    EveryEntry,
    Once,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerActionDef {
    ShowDialog {
        text: String,
        #[serde(default)]
        duration_seconds: Option<f32>,
    },
    Teleport {
        to: [f32; 3],
    },
}

impl LevelDef {
    pub fn player_spawn(&self) -> Vec3 {
        Vec3::from_array(self.player_spawn)
    }
}

impl StaticBoxDef {
    pub fn center(&self) -> Vec3 {
        Vec3::from_array(self.center)
    }

    pub fn half_extents(&self) -> Vec3 {
        Vec3::from_array(self.half_extents)
    }
}

impl TriggerDef {
    pub fn corners(&self) -> (Vec3, Vec3) {
        (
            Vec3::from_array(self.corner_a),
            Vec3::from_array(self.corner_b),
        )
    }
}

#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("failed to read level file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse level file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: JsonParseError,
    },
    #[error("invalid level file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

pub fn load_level(path: &Path) -> Result<LevelDef, LevelLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LevelLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&raw, path)
}

/// Parses and validates a level. `path` is only used for error messages.
pub fn parse_level(raw: &str, path: &Path) -> Result<LevelDef, LevelLoadError> {
    let level: LevelDef = parse_json(raw).map_err(|source| LevelLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_level(&level).map_err(|reason| LevelLoadError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(level)
}

fn validate_level(level: &LevelDef) -> Result<(), String> {
    ensure_finite("player_spawn", &level.player_spawn)?;
    ensure_finite("player_spawn_yaw", &[level.player_spawn_yaw])?;

    for (index, def) in level.static_boxes.iter().enumerate() {
        ensure_finite(&format!("static_boxes[{index}].center"), &def.center)?;
        ensure_finite(&format!("static_boxes[{index}].half_extents"), &def.half_extents)?;
        if def.half_extents.iter().any(|extent| *extent <= 0.0) {
            return Err(format!(
                "static_boxes[{index}].half_extents must be positive"
            ));
        }
    }

    let mut seen_ids = HashSet::new();
    for (index, def) in level.triggers.iter().enumerate() {
        if def.id.trim().is_empty() {
            return Err(format!("triggers[{index}].id must not be empty"));
        }
        if !seen_ids.insert(def.id.as_str()) {
            return Err(format!("duplicate trigger id '{}'", def.id));
        }
        // Zero-volume regions are fine: min == max is a point region.
        ensure_finite(&format!("triggers[{index}].corner_a"), &def.corner_a)?;
        ensure_finite(&format!("triggers[{index}].corner_b"), &def.corner_b)?;
        validate_action(&format!("triggers[{index}].on_enter"), &def.on_enter)?;
        if let Some(on_exit) = &def.on_exit {
            validate_action(&format!("triggers[{index}].on_exit"), on_exit)?;
        }
    }
    Ok(())
}

fn validate_action(field: &str, action: &TriggerActionDef) -> Result<(), String> {
    match action {
        TriggerActionDef::ShowDialog {
            duration_seconds, ..
        } => match duration_seconds {
            Some(duration) if !duration.is_finite() || *duration <= 0.0 => Err(format!(
                "{field}.show_dialog.duration_seconds must be positive"
            )),
            _ => Ok(()),
        },
        TriggerActionDef::Teleport { to } => ensure_finite(&format!("{field}.teleport.to"), to),
    }
}

fn ensure_finite(field: &str, values: &[f32]) -> Result<(), String> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(format!("{field} must be finite"))
    }
}
