use glam::{Quat, Vec2, Vec3};

use super::input::{ActionStates, InputAction};

pub const DEFAULT_VERTICAL_FOV_RADIANS: f32 = std::f32::consts::FRAC_PI_2;
pub const SKY_CLEAR_COLOR: [u8; 4] = [0, 16, 32, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    pointer_locked: bool,
    pointer_delta: Vec2,
    cursor_position_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        pointer_locked: bool,
        pointer_delta: Vec2,
        cursor_position_px: Option<Vec2>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            pointer_locked,
            pointer_delta,
            cursor_position_px,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Raw pointer motion since the previous tick. Always zero while unlocked.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Cursor position mapped to `[-1, 1]` on both axes, +y up.
    pub fn cursor_ndc(&self) -> Option<Vec2> {
        let cursor = self.cursor_position_px?;
        if self.window_width == 0 || self.window_height == 0 {
            return None;
        }
        let x = cursor.x / self.window_width as f32 * 2.0 - 1.0;
        let y = 1.0 - cursor.y / self.window_height as f32 * 2.0;
        Some(Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0)))
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_pointer_locked(mut self, pointer_locked: bool) -> Self {
        self.pointer_locked = pointer_locked;
        self
    }

    pub fn with_pointer_delta(mut self, pointer_delta: Vec2) -> Self {
        self.pointer_delta = pointer_delta;
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

/// Camera handed to the renderer once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub orientation: Quat,
    pub vertical_fov_radians: f32,
}

impl Default for Camera3D {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            vertical_fov_radians: DEFAULT_VERTICAL_FOV_RADIANS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: [u8; 4],
}

/// Transient dialog the renderer shows until `remaining_seconds` runs out.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogDirective {
    pub text: String,
    pub remaining_seconds: f32,
}

/// Everything the renderer needs from the active scene.
///
/// Static lines are pushed once at load; the camera and dialog are rewritten
/// every tick.
#[derive(Debug, Clone)]
pub struct SceneWorld {
    camera: Camera3D,
    clear_color: [u8; 4],
    lines: Vec<WireLine>,
    dialog: Option<DialogDirective>,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self {
            camera: Camera3D::default(),
            clear_color: SKY_CLEAR_COLOR,
            lines: Vec::new(),
            dialog: None,
        }
    }
}

impl SceneWorld {
    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera3D) {
        self.camera = camera;
    }

    pub fn clear_color(&self) -> [u8; 4] {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, clear_color: [u8; 4]) {
        self.clear_color = clear_color;
    }

    pub fn lines(&self) -> &[WireLine] {
        &self.lines
    }

    pub fn dialog(&self) -> Option<&DialogDirective> {
        self.dialog.as_ref()
    }

    pub fn set_dialog(&mut self, dialog: Option<DialogDirective>) {
        self.dialog = dialog;
    }

    pub fn clear_lines(&mut self) {
        self.lines.clear();
    }

    pub fn push_line(&mut self, start: Vec3, end: Vec3, color: [u8; 4]) {
        self.lines.push(WireLine { start, end, color });
    }

    /// Pushes the twelve edges of an axis-aligned box.
    pub fn push_box_wireframe(&mut self, min: Vec3, max: Vec3, color: [u8; 4]) {
        let corner = |x: bool, y: bool, z: bool| {
            Vec3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };
        for a in [false, true] {
            for b in [false, true] {
                self.push_line(corner(false, a, b), corner(true, a, b), color);
                self.push_line(corner(a, false, b), corner(a, true, b), color);
                self.push_line(corner(a, b, false), corner(a, b, true), color);
            }
        }
    }

    /// Pushes a square grid on the horizontal plane through `center`.
    pub fn push_ground_grid(&mut self, center: Vec3, half_extent: f32, spacing: f32, color: [u8; 4]) {
        if spacing <= 0.0 || half_extent <= 0.0 {
            return;
        }
        let steps = (half_extent / spacing).floor() as i32;
        for step in -steps..=steps {
            let offset = step as f32 * spacing;
            self.push_line(
                Vec3::new(center.x + offset, center.y, center.z - half_extent),
                Vec3::new(center.x + offset, center.y, center.z + half_extent),
                color,
            );
            self.push_line(
                Vec3::new(center.x - half_extent, center.y, center.z + offset),
                Vec3::new(center.x + half_extent, center.y, center.z + offset),
                color,
            );
        }
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

/// Owns the single active scene and its world.
pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(fixed_dt_seconds, input, &mut self.world)
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.world);
        self.world.clear_lines();
        self.world.set_dialog(None);
        self.is_loaded = false;
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingScene {
        loads: u32,
        updates: u32,
        unloads: u32,
    }

    impl Scene for CountingScene {
        fn load(&mut self, world: &mut SceneWorld) {
            self.loads += 1;
            world.push_line(Vec3::ZERO, Vec3::X, [255; 4]);
            world.set_dialog(Some(DialogDirective {
                text: "hello".to_string(),
                remaining_seconds: 1.0,
            }));
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            input: &InputSnapshot,
            _world: &mut SceneWorld,
        ) -> SceneCommand {
            self.updates += 1;
            if input.quit_requested() {
                SceneCommand::Quit
            } else {
                SceneCommand::None
            }
        }

        fn unload(&mut self, _world: &mut SceneWorld) {
            self.unloads += 1;
        }
    }

    #[test]
    fn box_wireframe_has_twelve_edges() {
        let mut world = SceneWorld::default();
        world.push_box_wireframe(Vec3::ZERO, Vec3::ONE, [255; 4]);
        assert_eq!(world.lines().len(), 12);
        for line in world.lines() {
            let length = (line.end - line.start).length();
            assert!((length - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn ground_grid_skips_invalid_spacing() {
        let mut world = SceneWorld::default();
        world.push_ground_grid(Vec3::ZERO, 10.0, 0.0, [255; 4]);
        assert!(world.lines().is_empty());

        world.push_ground_grid(Vec3::ZERO, 2.0, 1.0, [255; 4]);
        assert_eq!(world.lines().len(), 10);
    }

    #[test]
    fn cursor_ndc_maps_corners_and_center() {
        let snapshot = InputSnapshot::empty()
            .with_window_size((800, 600))
            .with_cursor_position_px(Some(Vec2::new(400.0, 300.0)));
        let center = snapshot.cursor_ndc().expect("center");
        assert!(center.length() < 1e-6);

        let top_left = snapshot
            .with_cursor_position_px(Some(Vec2::new(0.0, 0.0)))
            .cursor_ndc()
            .expect("top left");
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn cursor_ndc_is_none_without_cursor_or_window() {
        assert!(InputSnapshot::empty().cursor_ndc().is_none());
        let no_window = InputSnapshot::empty().with_cursor_position_px(Some(Vec2::ONE));
        assert!(no_window.cursor_ndc().is_none());
    }

    #[test]
    fn runtime_loads_once_and_skips_updates_before_load() {
        let mut runtime = SceneRuntime::new(Box::<CountingScene>::default());
        let quit = InputSnapshot::new(true, ActionStates::default(), false, Vec2::ZERO, None, 0, 0);

        assert_eq!(runtime.update(1.0 / 60.0, &quit), SceneCommand::None);
        runtime.load();
        runtime.load();
        assert_eq!(runtime.world().lines().len(), 1);
        assert_eq!(runtime.update(1.0 / 60.0, &quit), SceneCommand::Quit);

        runtime.shutdown();
        assert!(runtime.world().lines().is_empty());
        assert!(runtime.world().dialog().is_none());
    }
}
