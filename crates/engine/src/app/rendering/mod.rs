mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{
    project_segment, view_to_screen, world_to_screen, world_to_view, Viewport, NEAR_PLANE,
};
