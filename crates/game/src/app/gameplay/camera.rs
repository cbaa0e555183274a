/// Strategy that turns the post-physics player position into a camera pose.
trait CameraRig {
    fn name(&self) -> &'static str;

    fn compose(
        &mut self,
        player_position: Vec3,
        look: &LookState,
        input: &InputSnapshot,
        dt_seconds: f32,
    ) -> CameraPose;

    /// Forgets any smoothing history, e.g. after a teleport.
    fn reset(&mut self) {}
}

struct FirstPersonRig {
    eye_height: f32,
}

impl CameraRig for FirstPersonRig {
    fn name(&self) -> &'static str {
        "first_person"
    }

    fn compose(
        &mut self,
        player_position: Vec3,
        look: &LookState,
        _input: &InputSnapshot,
        _dt_seconds: f32,
    ) -> CameraPose {
        CameraPose {
            position: player_position + Vec3::Y * self.eye_height,
            orientation: look.orientation(),
        }
    }
}

/// Trails the player from a fixed offset and leans toward the cursor.
struct FollowRig {
    offset: Vec3,
    pointer_bias: Vec2,
    look_bias: f32,
    smoothing_per_frame: f32,
    smoothed: Option<(Vec3, Vec3)>,
}

impl FollowRig {
    fn new(offset: Vec3, pointer_bias: Vec2, look_bias: f32, smoothing_per_frame: f32) -> Self {
        Self {
            offset,
            pointer_bias,
            look_bias,
            smoothing_per_frame,
            smoothed: None,
        }
    }

    /// Blend factor for `dt_seconds` that matches `smoothing_per_frame` at 60 Hz.
    fn blend_factor(&self, dt_seconds: f32) -> f32 {
        let frames = (dt_seconds * FOLLOW_REFERENCE_HZ).max(0.0);
        1.0 - (1.0 - self.smoothing_per_frame).powf(frames)
    }
}

impl CameraRig for FollowRig {
    fn name(&self) -> &'static str {
        "follow"
    }

    fn compose(
        &mut self,
        player_position: Vec3,
        _look: &LookState,
        input: &InputSnapshot,
        dt_seconds: f32,
    ) -> CameraPose {
        let cursor = input.cursor_ndc().unwrap_or(Vec2::ZERO);
        let ideal_position = player_position
            + self.offset
            + Vec3::new(cursor.x * self.pointer_bias.x, cursor.y * self.pointer_bias.y, 0.0);
        let ideal_target = player_position + Vec3::new(cursor.x, cursor.y, 0.0) * self.look_bias;

        let (position, target) = match self.smoothed {
            Some((position, target)) => {
                let alpha = self.blend_factor(dt_seconds);
                (
                    position.lerp(ideal_position, alpha),
                    target.lerp(ideal_target, alpha),
                )
            }
            None => (ideal_position, ideal_target),
        };
        self.smoothed = Some((position, target));

        CameraPose {
            position,
            orientation: look_at_orientation(position, target),
        }
    }

    fn reset(&mut self) {
        self.smoothed = None;
    }
}

fn camera_rig_for(tuning: &GameplayTuning) -> Box<dyn CameraRig> {
    match tuning.camera_mode {
        CameraMode::FirstPerson => Box::new(FirstPersonRig {
            eye_height: tuning.eye_height,
        }),
        CameraMode::Follow => Box::new(FollowRig::new(
            Vec3::from_array(tuning.follow_offset),
            Vec2::from_array(tuning.follow_pointer_bias),
            tuning.follow_look_bias,
            tuning.follow_smoothing,
        )),
    }
}
