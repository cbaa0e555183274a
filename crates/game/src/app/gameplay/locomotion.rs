fn desired_horizontal_velocity(
    input: &InputSnapshot,
    basis: MovementBasis,
    max_speed: f32,
) -> Vec3 {
    let mut direction = Vec3::ZERO;
    if input.is_down(InputAction::Forward) {
        direction += basis.forward;
    }
    if input.is_down(InputAction::Backward) {
        direction -= basis.forward;
    }
    if input.is_down(InputAction::Left) {
        direction -= basis.right;
    }
    if input.is_down(InputAction::Right) {
        direction += basis.right;
    }
    direction.y = 0.0;

    direction
        .try_normalize()
        .map_or(Vec3::ZERO, |direction| direction * max_speed)
}

impl JumpLatch {
    fn observe(&mut self, jump_down: bool, vertical_speed: f32, grounded_epsilon: f32) {
        if !self.spent {
            return;
        }
        if !jump_down {
            self.released_since_jump = true;
        }
        if vertical_speed < -grounded_epsilon {
            self.descended_since_jump = true;
        }
    }

    fn ready(&mut self, grounded: bool) -> bool {
        if self.spent && grounded && (self.released_since_jump || self.descended_since_jump) {
            *self = Self::default();
        }
        !self.spent
    }

    fn spend(&mut self) {
        *self = Self {
            spent: true,
            released_since_jump: false,
            descended_since_jump: false,
        };
    }
}

impl PlayerBody {
    /// Distance from the body centre to the bottom of its collider.
    fn half_height(&self) -> f32 {
        match self.shape {
            BodyShape::Ball { radius } => radius,
            BodyShape::Capsule {
                half_height,
                radius,
            } => half_height + radius,
        }
    }
}

/// Vertical-speed heuristic, optionally confirmed by a short ray cast.
///
/// The speed check alone is approximate: at the apex of a jump the body is
/// briefly slow enough to count as grounded.
fn is_grounded(
    physics: &impl PhysicsWorld,
    body: &PlayerBody,
    position: Vec3,
    vertical_speed: f32,
    tuning: &GameplayTuning,
) -> bool {
    if vertical_speed.abs() >= tuning.grounded_epsilon {
        return false;
    }
    match tuning.ground_ray_distance {
        Some(ray_distance) => physics
            .cast_ray(
                position,
                Vec3::NEG_Y,
                body.half_height() + ray_distance,
                Some(body.handle),
            )
            .is_some(),
        None => true,
    }
}

/// Writes this tick's movement into the player body. Returns true when a jump
/// impulse was applied.
fn apply_locomotion(
    player: &mut PlayerState,
    physics: &mut impl PhysicsWorld,
    input: &InputSnapshot,
    tuning: &GameplayTuning,
) -> bool {
    let Some(body) = player.body else {
        return false;
    };
    let (Some(current), Some(position)) =
        (physics.linear_velocity(body.handle), physics.position(body.handle))
    else {
        return false;
    };

    let horizontal =
        desired_horizontal_velocity(input, player.look.movement_basis(), tuning.max_speed);
    let mut next = Vec3::new(horizontal.x, current.y, horizontal.z);

    let jump_down = input.is_down(InputAction::Jump);
    player
        .jump
        .observe(jump_down, current.y, tuning.grounded_epsilon);
    let grounded = is_grounded(physics, &body, position, current.y, tuning);
    let jumped = jump_down && player.jump.ready(grounded) && grounded;
    if jumped {
        next.y = tuning.jump_impulse;
        player.jump.spend();
        debug!(
            vertical_speed_before = current.y,
            impulse = tuning.jump_impulse,
            "jump_applied"
        );
    }

    physics.set_linear_velocity(body.handle, next);
    jumped
}
