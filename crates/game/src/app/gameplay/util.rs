/// Orientation whose forward axis (-Z) points from `eye` to `target`.
fn look_at_orientation(eye: Vec3, target: Vec3) -> Quat {
    let Some(back) = (eye - target).try_normalize() else {
        return Quat::IDENTITY;
    };
    let Some(right) = Vec3::Y.cross(back).try_normalize() else {
        // Looking straight up or down; any yaw works.
        return Quat::from_rotation_x(if back.y > 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 });
    };
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize()
}

fn floored_coordinates(position: Vec3) -> String {
    format!(
        "{}, {}, {}",
        position.x.floor() as i64,
        position.y.floor() as i64,
        position.z.floor() as i64
    )
}

fn hud_title(level_name: &str, position: Option<Vec3>, dialog: Option<&str>) -> String {
    let mut title = format!("Unearthed | {level_name}");
    if let Some(position) = position {
        title.push_str(" | ");
        title.push_str(&floored_coordinates(position));
    }
    title.push_str(" | ");
    title.push_str(MOVEMENT_HINT);
    if let Some(text) = dialog {
        title.push_str(" | ");
        title.push_str(text);
    }
    title
}

/// Top face of the highest static box, used to place the ground grid.
fn highest_floor_top(level: &LevelDef) -> Option<f32> {
    level
        .static_boxes
        .iter()
        .map(|def| def.center[1] + def.half_extents[1])
        .reduce(f32::max)
}
