use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};

use engine::{
    BodyHandle, BodyShape, Camera3D, DialogDirective, DynamicBodyDesc, InputAction, InputSnapshot,
    LevelDef, PhysicsWorld, RapierWorld, Scene, SceneCommand, SceneWorld, TriggerActionDef,
    TriggerDef, TriggerModeDef, SKY_CLEAR_COLOR,
};
use glam::{EulerRot, Mat3, Quat, Vec2, Vec3};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

const PITCH_LIMIT_RADIANS: f32 = FRAC_PI_2;
const PLAYER_BALL_RADIUS: f32 = 0.5;
const PLAYER_MASS: f32 = 1.0;
const FOLLOW_REFERENCE_HZ: f32 = 60.0;
const MOVEMENT_HINT: &str = "Press W, A, S, D to move!";
const GAMEPLAY_SYSTEM_ORDER_TEXT: &str =
    "InputSampling>Locomotion>PhysicsStep>LookUpdate>CameraCompose>DialogExpiry>TriggerEvaluation";
const GROUND_GRID_HALF_EXTENT: f32 = 48.0;
const GROUND_GRID_SPACING: f32 = 4.0;
const GROUND_GRID_COLOR: [u8; 4] = [24, 48, 72, 255];
const STATIC_BOX_COLOR: [u8; 4] = [150, 160, 180, 255];
const TRIGGER_VOLUME_COLOR: [u8; 4] = [230, 190, 60, 255];

include!("types.rs");
include!("look.rs");
include!("locomotion.rs");
include!("triggers.rs");
include!("dialog.rs");
include!("camera.rs");
include!("systems.rs");
include!("scene_impl.rs");
include!("util.rs");

pub(crate) fn build_gameplay_scene(level: LevelDef, tuning: GameplayTuning) -> Box<dyn Scene> {
    Box::new(GameplayScene::new(level, tuning, RapierWorld::default()))
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
