use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec2;
use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{DeviceEvent, ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowBuilder};

use super::input::{ActionStates, PointerAccumulator};
use super::metrics::MetricsAccumulator;
use super::scene::SceneRuntime;
use super::{InputAction, InputSnapshot, Renderer, Scene, SceneCommand};

pub const SLOW_FRAME_ENV_VAR: &str = "UNEARTHED_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Unearthed".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(5),
            simulated_slow_frame_ms: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Runs `scene` at a fixed tick rate until the window closes or the scene quits.
///
/// Each tick samples input exactly once, hands it to the scene, and the most
/// recent `SceneWorld` is drawn once per redraw.
pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    let mut runtime = SceneRuntime::new(scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(5));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let inner_size = window.inner_size();
    let mut input_collector = InputCollector::new(inner_size.width, inner_size.height);

    runtime.load();
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(focused) => {
                    input_collector.handle_focus_changed(focused);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if !event.repeat {
                        let is_pressed = event.state == ElementState::Pressed;
                        input_collector.handle_physical_key(event.physical_key, is_pressed);
                    }
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    if let Some(lock) = input_collector.take_pointer_lock_request() {
                        let locked = apply_pointer_lock(&window, lock);
                        input_collector.set_pointer_locked(locked);
                        info!(requested = lock, locked, "pointer_lock_changed");
                    }

                    if slow_frame_delay > Duration::ZERO {
                        // Explicit debug perturbation only.
                        thread::sleep(slow_frame_delay);
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;
                    accumulator =
                        accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        let command = runtime.update(fixed_dt_seconds, &input_snapshot);
                        metrics_accumulator.record_tick();
                        if command == SceneCommand::Quit {
                            info!(reason = "scene_quit", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    if let Err(error) = renderer.render_world(runtime.world()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }

                    let next_title = runtime.debug_title();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }

                    metrics_accumulator.record_frame(raw_frame_dt);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                input_collector.handle_mouse_motion(delta.0 as f32, delta.1 as f32);
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                runtime.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn apply_pointer_lock(window: &Window, lock: bool) -> bool {
    if !lock {
        if let Err(error) = window.set_cursor_grab(CursorGrabMode::None) {
            warn!(error = %error, "cursor_release_failed");
        }
        window.set_cursor_visible(true);
        return false;
    }

    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    match grabbed {
        Ok(()) => {
            window.set_cursor_visible(false);
            true
        }
        Err(error) => {
            warn!(error = %error, "cursor_grab_failed");
            false
        }
    }
}

/// Single writer of the per-tick input snapshot.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    pointer: PointerAccumulator,
    pending_pointer_lock: Option<bool>,
    cursor_position_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        match key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.action_states.set(InputAction::Forward, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.action_states.set(InputAction::Backward, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.action_states.set(InputAction::Left, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.action_states.set(InputAction::Right, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Space) => {
                self.action_states.set(InputAction::Jump, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Escape) if is_pressed => {
                // First Escape frees the pointer, a second one leaves the game.
                if self.pointer.is_locked() || self.pending_pointer_lock == Some(true) {
                    self.pending_pointer_lock = Some(false);
                } else {
                    self.quit_requested = true;
                }
            }
            _ => {}
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left && state == ElementState::Pressed && !self.pointer.is_locked()
        {
            self.pending_pointer_lock = Some(true);
        }
    }

    fn handle_mouse_motion(&mut self, dx: f32, dy: f32) {
        self.pointer.push_delta(dx, dy);
    }

    fn handle_focus_changed(&mut self, focused: bool) {
        if focused {
            return;
        }
        self.action_states.release_all();
        if self.pointer.is_locked() {
            self.pending_pointer_lock = Some(false);
        }
    }

    fn take_pointer_lock_request(&mut self) -> Option<bool> {
        self.pending_pointer_lock.take()
    }

    fn set_pointer_locked(&mut self, locked: bool) {
        self.pointer.set_locked(locked);
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2::new(x, y));
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let (dx, dy) = self.pointer.drain();
        InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.pointer.is_locked(),
            Vec2::new(dx, dy),
            self.cursor_position_px,
            self.window_width,
            self.window_height,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let result = plan_sim_steps(Duration::from_millis(48), Duration::from_millis(16), 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let result = plan_sim_steps(Duration::from_millis(120), Duration::from_millis(16), 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn wasd_arrows_and_space_map_to_actions() {
        let mut input = InputCollector::new(1280, 720);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::ArrowLeft), true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Space), true);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::Forward));
        assert!(snapshot.is_down(InputAction::Left));
        assert!(snapshot.is_down(InputAction::Jump));
        assert!(!snapshot.is_down(InputAction::Backward));
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyD), false);

        assert!(!input.snapshot_for_tick().is_down(InputAction::Right));
    }

    #[test]
    fn held_actions_persist_across_ticks() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyS), true);

        assert!(input.snapshot_for_tick().is_down(InputAction::Backward));
        assert!(input.snapshot_for_tick().is_down(InputAction::Backward));
    }

    #[test]
    fn pointer_delta_is_dropped_until_locked() {
        let mut input = InputCollector::new(1280, 720);
        input.handle_mouse_motion(12.0, -3.0);
        let unlocked = input.snapshot_for_tick();
        assert!(!unlocked.pointer_locked());
        assert_eq!(unlocked.pointer_delta(), Vec2::ZERO);

        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        assert_eq!(input.take_pointer_lock_request(), Some(true));
        input.set_pointer_locked(true);
        input.handle_mouse_motion(12.0, -3.0);
        input.handle_mouse_motion(1.0, 1.0);

        let locked = input.snapshot_for_tick();
        assert!(locked.pointer_locked());
        assert_eq!(locked.pointer_delta(), Vec2::new(13.0, -2.0));
    }

    #[test]
    fn pointer_delta_does_not_carry_into_next_tick() {
        let mut input = InputCollector::default();
        input.set_pointer_locked(true);
        input.handle_mouse_motion(4.0, 4.0);

        assert_eq!(input.snapshot_for_tick().pointer_delta(), Vec2::new(4.0, 4.0));
        assert_eq!(input.snapshot_for_tick().pointer_delta(), Vec2::ZERO);
    }

    #[test]
    fn escape_releases_lock_before_quitting() {
        let mut input = InputCollector::default();
        input.set_pointer_locked(true);

        input.handle_physical_key(PhysicalKey::Code(KeyCode::Escape), true);
        assert!(!input.quit_requested);
        assert_eq!(input.take_pointer_lock_request(), Some(false));
        input.set_pointer_locked(false);

        input.handle_physical_key(PhysicalKey::Code(KeyCode::Escape), true);
        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn focus_loss_releases_keys_and_pointer() {
        let mut input = InputCollector::default();
        input.set_pointer_locked(true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);

        input.handle_focus_changed(false);

        assert!(!input.snapshot_for_tick().is_down(InputAction::Forward));
        assert_eq!(input.take_pointer_lock_request(), Some(false));
    }

    #[test]
    fn click_while_locked_does_not_request_again() {
        let mut input = InputCollector::default();
        input.set_pointer_locked(true);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        assert_eq!(input.take_pointer_lock_request(), None);
    }

    #[test]
    fn snapshot_carries_cursor_and_window_size() {
        let mut input = InputCollector::new(1280, 720);
        input.set_cursor_position_px(100.0, 200.0);
        let snapshot = input.snapshot_for_tick();

        assert_eq!(snapshot.window_size(), (1280, 720));
        assert_eq!(snapshot.cursor_position_px(), Some(Vec2::new(100.0, 200.0)));

        input.clear_cursor_position();
        assert!(input.snapshot_for_tick().cursor_position_px().is_none());
    }
}
