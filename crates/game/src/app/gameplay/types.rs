#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CameraMode {
    #[default]
    FirstPerson,
    Follow,
}

/// Gameplay tuning loaded from `assets/config/gameplay.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameplayTuning {
    pub(crate) look_sensitivity: f32,
    pub(crate) max_speed: f32,
    pub(crate) jump_impulse: f32,
    pub(crate) grounded_epsilon: f32,
    /// When set, jumping also requires a downward ray hit within this
    /// distance below the player collider.
    pub(crate) ground_ray_distance: Option<f32>,
    pub(crate) camera_mode: CameraMode,
    pub(crate) eye_height: f32,
    pub(crate) follow_offset: [f32; 3],
    pub(crate) follow_pointer_bias: [f32; 2],
    pub(crate) follow_look_bias: f32,
    /// Lerp factor per 60 Hz frame.
    pub(crate) follow_smoothing: f32,
    pub(crate) dialog_duration_seconds: f32,
    pub(crate) vertical_fov_degrees: f32,
}

impl Default for GameplayTuning {
    fn default() -> Self {
        Self {
            look_sensitivity: 0.002,
            max_speed: 6.0,
            jump_impulse: 5.0,
            grounded_epsilon: 0.05,
            ground_ray_distance: None,
            camera_mode: CameraMode::FirstPerson,
            eye_height: 1.5,
            follow_offset: [0.0, 3.0, 6.0],
            follow_pointer_bias: [2.0, 1.0],
            follow_look_bias: 0.5,
            follow_smoothing: 0.1,
            dialog_duration_seconds: 5.0,
            vertical_fov_degrees: 90.0,
        }
    }
}

impl GameplayTuning {
    pub(crate) fn validate(&self) -> Result<(), String> {
        let positive = [
            ("look_sensitivity", self.look_sensitivity),
            ("grounded_epsilon", self.grounded_epsilon),
            ("dialog_duration_seconds", self.dialog_duration_seconds),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{field} must be a positive number, got {value}"));
            }
        }

        let non_negative = [
            ("max_speed", self.max_speed),
            ("jump_impulse", self.jump_impulse),
            ("follow_look_bias", self.follow_look_bias),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("{field} must be zero or positive, got {value}"));
            }
        }

        if let Some(distance) = self.ground_ray_distance {
            if !(distance.is_finite() && distance > 0.0) {
                return Err(format!(
                    "ground_ray_distance must be a positive number, got {distance}"
                ));
            }
        }
        if !self.eye_height.is_finite() {
            return Err("eye_height must be finite".to_string());
        }
        if !self
            .follow_offset
            .iter()
            .chain(self.follow_pointer_bias.iter())
            .all(|value| value.is_finite())
        {
            return Err("follow_offset and follow_pointer_bias must be finite".to_string());
        }
        if !(self.follow_smoothing > 0.0 && self.follow_smoothing <= 1.0) {
            return Err(format!(
                "follow_smoothing must be in (0, 1], got {}",
                self.follow_smoothing
            ));
        }
        if !(self.vertical_fov_degrees > 0.0 && self.vertical_fov_degrees < 180.0) {
            return Err(format!(
                "vertical_fov_degrees must be in (0, 180), got {}",
                self.vertical_fov_degrees
            ));
        }
        Ok(())
    }

    fn vertical_fov_radians(&self) -> f32 {
        self.vertical_fov_degrees.to_radians()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PlayerBody {
    handle: BodyHandle,
    shape: BodyShape,
}

/// Look angles in radians. Yaw is never wrapped; pitch stays within
/// `[-PITCH_LIMIT_RADIANS, PITCH_LIMIT_RADIANS]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LookState {
    yaw: f32,
    pitch: f32,
}

/// Horizontal movement axes derived from look yaw.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MovementBasis {
    forward: Vec3,
    right: Vec3,
}

/// Blocks a second jump until the first one has visibly ended.
///
/// After an impulse the latch stays spent until the player is grounded
/// again and has either released the jump key or been seen falling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct JumpLatch {
    spent: bool,
    released_since_jump: bool,
    descended_since_jump: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CameraPose {
    position: Vec3,
    orientation: Quat,
}

/// Everything the per-tick systems mutate about the player.
#[derive(Debug, Clone, PartialEq)]
struct PlayerState {
    body: Option<PlayerBody>,
    look: LookState,
    jump: JumpLatch,
    /// Position read back after the most recent physics step.
    position: Option<Vec3>,
    pending_teleport: Option<Vec3>,
    camera: Option<CameraPose>,
}

impl PlayerState {
    fn new(initial_yaw: f32) -> Self {
        Self {
            body: None,
            look: LookState::new(initial_yaw),
            jump: JumpLatch::default(),
            position: None,
            pending_teleport: None,
            camera: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TriggerId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerMode {
    EveryEntry,
    Once,
}

impl From<TriggerModeDef> for TriggerMode {
    fn from(value: TriggerModeDef) -> Self {
        match value {
            TriggerModeDef::EveryEntry => Self::EveryEntry,
            TriggerModeDef::Once => Self::Once,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerEdge {
    Entered,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TriggerEvent {
    id: TriggerId,
    edge: TriggerEdge,
}

#[derive(Debug, Error)]
enum TriggerError {
    #[error("trigger id '{0}' is already registered")]
    DuplicateId(String),
    #[error("dialog duration must be a positive number of seconds, got {0}")]
    InvalidDialogDuration(f32),
    #[error("teleport target must be finite, got {0}")]
    InvalidTeleportTarget(Vec3),
}

type TriggerCallback = Box<dyn FnMut(&mut TriggerContext<'_>) -> Result<(), TriggerError>>;

#[derive(Debug, Clone, PartialEq)]
struct ActiveDialog {
    text: String,
    remaining_seconds: f32,
}
