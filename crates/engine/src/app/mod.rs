mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    project_segment, view_to_screen, world_to_screen, world_to_view, Renderer, Viewport,
    NEAR_PLANE,
};
pub use scene::{
    Camera3D, DialogDirective, InputSnapshot, Scene, SceneCommand, SceneWorld, WireLine,
    DEFAULT_VERTICAL_FOV_RADIANS, SKY_CLEAR_COLOR,
};
