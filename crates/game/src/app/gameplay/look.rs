impl LookState {
    fn new(yaw: f32) -> Self {
        Self { yaw, pitch: 0.0 }
    }

    fn apply_pointer_delta(&mut self, delta: Vec2, sensitivity: f32) {
        if !delta.is_finite() {
            return;
        }
        self.yaw -= delta.x * sensitivity;
        self.pitch = (self.pitch - delta.y * sensitivity)
            .clamp(-PITCH_LIMIT_RADIANS, PITCH_LIMIT_RADIANS);
    }

    /// Yaw around world up, then pitch around the yawed right axis. No roll.
    fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Horizontal projection of the camera axes. Built from yaw alone so the
    /// basis stays defined when pitch is at the vertical limit.
    fn movement_basis(&self) -> MovementBasis {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        MovementBasis {
            forward: Vec3::new(-sin_yaw, 0.0, -cos_yaw),
            right: Vec3::new(cos_yaw, 0.0, -sin_yaw),
        }
    }
}

impl MovementBasis {
    #[cfg(test)]
    fn world_axes() -> Self {
        Self {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
        }
    }
}
