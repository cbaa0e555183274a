use std::sync::Arc;

use glam::Vec2;
use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::SceneWorld;

use super::transform::project_segment;
use super::Viewport;

const CROSSHAIR_HALF_SIZE_PX: i32 = 4;
const CROSSHAIR_COLOR: [u8; 4] = [220, 220, 240, 255];
const DIALOG_PANEL_COLOR: [u8; 4] = [12, 12, 24, 255];
const DIALOG_BORDER_COLOR: [u8; 4] = [230, 190, 60, 255];
const DIALOG_COUNTDOWN_COLOR: [u8; 4] = [150, 160, 180, 255];
/// Seconds over which the countdown bar shrinks to nothing.
const DIALOG_COUNTDOWN_SECONDS: f32 = 5.0;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let viewport = self.viewport;
        let frame = self.pixels.frame_mut();
        draw_world(frame, viewport, world);
        self.pixels.render()
    }
}

fn draw_world(frame: &mut [u8], viewport: Viewport, world: &SceneWorld) {
    let clear_color = world.clear_color();
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&clear_color);
    }

    let camera = world.camera();
    for line in world.lines() {
        if let Some((a, b)) = project_segment(line.start, line.end, camera, viewport) {
            draw_line(frame, viewport, a, b, line.color);
        }
    }

    let cx = viewport.width as i32 / 2;
    let cy = viewport.height as i32 / 2;
    for offset in -CROSSHAIR_HALF_SIZE_PX..=CROSSHAIR_HALF_SIZE_PX {
        put_pixel(frame, viewport, cx + offset, cy, CROSSHAIR_COLOR);
        put_pixel(frame, viewport, cx, cy + offset, CROSSHAIR_COLOR);
    }

    if let Some(dialog) = world.dialog() {
        draw_dialog_panel(frame, viewport, dialog.remaining_seconds);
    }
}

/// Panel across the lower part of the screen with a countdown bar along its
/// top edge. Text itself is shown in the window title.
fn draw_dialog_panel(frame: &mut [u8], viewport: Viewport, remaining_seconds: f32) {
    let (width, height) = (viewport.width as i32, viewport.height as i32);
    let (left, right) = (width / 8, width - width / 8);
    let (top, bottom) = (height - height / 5, height - height / 12);
    if right <= left || bottom <= top {
        return;
    }

    for y in top..=bottom {
        for x in left..=right {
            put_pixel(frame, viewport, x, y, DIALOG_PANEL_COLOR);
        }
    }
    for x in left..=right {
        put_pixel(frame, viewport, x, top, DIALOG_BORDER_COLOR);
        put_pixel(frame, viewport, x, bottom, DIALOG_BORDER_COLOR);
    }
    for y in top..=bottom {
        put_pixel(frame, viewport, left, y, DIALOG_BORDER_COLOR);
        put_pixel(frame, viewport, right, y, DIALOG_BORDER_COLOR);
    }

    let fraction = (remaining_seconds / DIALOG_COUNTDOWN_SECONDS).clamp(0.0, 1.0);
    let bar_end = left + 2 + ((right - left - 4) as f32 * fraction) as i32;
    for x in left + 2..bar_end {
        put_pixel(frame, viewport, x, top + 2, DIALOG_COUNTDOWN_COLOR);
    }
}

fn draw_line(frame: &mut [u8], viewport: Viewport, a: Vec2, b: Vec2, color: [u8; 4]) {
    let Some((a, b)) = clip_to_viewport(a, b, viewport) else {
        return;
    };
    let (mut x0, mut y0) = (a.x.round() as i32, a.y.round() as i32);
    let (x1, y1) = (b.x.round() as i32, b.y.round() as i32);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(frame, viewport, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Liang-Barsky clip so huge off-screen projections never walk millions of pixels.
fn clip_to_viewport(a: Vec2, b: Vec2, viewport: Viewport) -> Option<(Vec2, Vec2)> {
    let max = Vec2::new(viewport.width as f32 - 1.0, viewport.height as f32 - 1.0);
    let delta = b - a;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;
    let edges = [
        (-delta.x, a.x),
        (delta.x, max.x - a.x),
        (-delta.y, a.y),
        (delta.y, max.y - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((a + delta * t0, a + delta * t1))
}

fn put_pixel(frame: &mut [u8], viewport: Viewport, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= viewport.width as i32 || y >= viewport.height as i32 {
        return;
    }
    let index = (y as usize * viewport.width as usize + x as usize) * 4;
    if let Some(pixel) = frame.get_mut(index..index + 4) {
        pixel.copy_from_slice(&color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::DialogDirective;
    use glam::Vec3;

    const VIEWPORT: Viewport = Viewport {
        width: 64,
        height: 48,
    };

    fn pixel_at(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
        let index = (y * VIEWPORT.width as usize + x) * 4;
        [frame[index], frame[index + 1], frame[index + 2], frame[index + 3]]
    }

    #[test]
    fn clip_rejects_segment_fully_outside() {
        let clipped = clip_to_viewport(Vec2::new(-10.0, -10.0), Vec2::new(-5.0, -1.0), VIEWPORT);
        assert!(clipped.is_none());
    }

    #[test]
    fn clip_trims_segment_to_bounds() {
        let (a, b) = clip_to_viewport(Vec2::new(-100.0, 10.0), Vec2::new(1000.0, 10.0), VIEWPORT)
            .expect("crosses viewport");
        assert!((a.x - 0.0).abs() < 1e-3);
        assert!((b.x - 63.0).abs() < 1e-3);
    }

    #[test]
    fn draw_world_clears_and_draws_lines() {
        let mut frame = vec![0u8; (VIEWPORT.width * VIEWPORT.height * 4) as usize];
        let mut world = SceneWorld::default();
        let red = [255, 0, 0, 255];
        world.push_line(Vec3::new(-1.0, -1.0, -5.0), Vec3::new(1.0, -1.0, -5.0), red);

        draw_world(&mut frame, VIEWPORT, &world);

        assert_eq!(pixel_at(&frame, 0, 0), world.clear_color());
        assert_eq!(pixel_at(&frame, 30, 29), red);
    }

    #[test]
    fn dialog_panel_is_drawn_only_while_a_dialog_is_set() {
        let mut frame = vec![0u8; (VIEWPORT.width * VIEWPORT.height * 4) as usize];
        let mut world = SceneWorld::default();

        draw_world(&mut frame, VIEWPORT, &world);
        assert_eq!(pixel_at(&frame, 32, 42), world.clear_color());

        world.set_dialog(Some(DialogDirective {
            text: "You Win!".to_string(),
            remaining_seconds: 2.5,
        }));
        draw_world(&mut frame, VIEWPORT, &world);
        assert_eq!(pixel_at(&frame, 32, 42), DIALOG_PANEL_COLOR);
        assert_eq!(pixel_at(&frame, 8, 40), DIALOG_BORDER_COLOR);
        // Half the countdown remains: bar covers the left half only.
        assert_eq!(pixel_at(&frame, 20, 41), DIALOG_COUNTDOWN_COLOR);
        assert_eq!(pixel_at(&frame, 50, 41), DIALOG_PANEL_COLOR);
    }
}
