use glam::{Vec2, Vec3};

use crate::app::Camera3D;

pub const NEAR_PLANE: f32 = 0.05;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// World point expressed in the camera's frame (-z forward, +y up).
pub fn world_to_view(world: Vec3, camera: &Camera3D) -> Vec3 {
    camera.orientation.inverse() * (world - camera.position)
}

/// Projects a view-space point to pixel coordinates. `None` behind the near plane.
pub fn view_to_screen(view: Vec3, camera: &Camera3D, viewport: Viewport) -> Option<Vec2> {
    if -view.z < NEAR_PLANE {
        return None;
    }
    Some(screen_from_view(view, camera, viewport))
}

fn screen_from_view(view: Vec3, camera: &Camera3D, viewport: Viewport) -> Vec2 {
    let depth = (-view.z).max(NEAR_PLANE);
    let focal = 1.0 / (camera.vertical_fov_radians * 0.5).tan();
    let ndc_x = view.x * focal / (viewport.aspect() * depth);
    let ndc_y = view.y * focal / depth;
    Vec2::new(
        (ndc_x + 1.0) * 0.5 * viewport.width as f32,
        (1.0 - ndc_y) * 0.5 * viewport.height as f32,
    )
}

pub fn world_to_screen(world: Vec3, camera: &Camera3D, viewport: Viewport) -> Option<Vec2> {
    view_to_screen(world_to_view(world, camera), camera, viewport)
}

/// Projects a world segment, clipping it against the near plane first.
pub fn project_segment(
    start: Vec3,
    end: Vec3,
    camera: &Camera3D,
    viewport: Viewport,
) -> Option<(Vec2, Vec2)> {
    let mut a = world_to_view(start, camera);
    let mut b = world_to_view(end, camera);
    let clip_z = -NEAR_PLANE;
    match (a.z <= clip_z, b.z <= clip_z) {
        (false, false) => return None,
        (true, false) => b = a + (b - a) * ((clip_z - a.z) / (b.z - a.z)),
        (false, true) => a = b + (a - b) * ((clip_z - b.z) / (a.z - b.z)),
        (true, true) => {}
    }
    Some((
        screen_from_view(a, camera, viewport),
        screen_from_view(b, camera, viewport),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    #[test]
    fn point_ahead_maps_to_viewport_center() {
        let camera = Camera3D::default();
        let screen = world_to_screen(Vec3::new(0.0, 0.0, -5.0), &camera, VIEWPORT).expect("visible");
        assert!((screen.x - 400.0).abs() < 1e-3);
        assert!((screen.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn point_behind_camera_is_culled() {
        let camera = Camera3D::default();
        assert!(world_to_screen(Vec3::new(0.0, 0.0, 5.0), &camera, VIEWPORT).is_none());
    }

    #[test]
    fn higher_points_land_higher_on_screen() {
        let camera = Camera3D::default();
        let low = world_to_screen(Vec3::new(0.0, -1.0, -5.0), &camera, VIEWPORT).expect("low");
        let high = world_to_screen(Vec3::new(0.0, 1.0, -5.0), &camera, VIEWPORT).expect("high");
        assert!(high.y < low.y);
    }

    #[test]
    fn camera_yaw_rotates_view() {
        // Turning left by 90 degrees puts world -x straight ahead.
        let camera = Camera3D {
            orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..Camera3D::default()
        };
        let screen = world_to_screen(Vec3::new(-5.0, 0.0, 0.0), &camera, VIEWPORT).expect("visible");
        assert!((screen.x - 400.0).abs() < 1e-3);
    }

    #[test]
    fn segment_crossing_near_plane_is_clipped() {
        let camera = Camera3D::default();
        let projected = project_segment(
            Vec3::new(0.0, -1.0, 5.0),
            Vec3::new(0.0, -1.0, -5.0),
            &camera,
            VIEWPORT,
        );
        assert!(projected.is_some());

        let hidden = project_segment(
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 2.0),
            &camera,
            VIEWPORT,
        );
        assert!(hidden.is_none());
    }
}
