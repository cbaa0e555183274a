//! Physics collaborator seam.
//!
//! Gameplay code never integrates motion itself: it reads and writes body
//! state through [`PhysicsWorld`] and lets the implementation step the
//! simulation and resolve collisions against static level geometry.

mod rapier_world;

use glam::{Quat, Vec3};

pub use rapier_world::{RapierWorld, DEFAULT_GRAVITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Ball { radius: f32 },
    Capsule { half_height: f32, radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicBodyDesc {
    pub position: Vec3,
    pub rotation: Quat,
    pub shape: BodyShape,
    pub mass: f32,
    pub lock_rotations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
}

pub trait PhysicsWorld {
    fn spawn_dynamic_body(&mut self, desc: &DynamicBodyDesc) -> BodyHandle;
    fn add_static_box(&mut self, center: Vec3, half_extents: Vec3);
    /// Returns false when the handle was unknown.
    fn remove_body(&mut self, body: BodyHandle) -> bool;

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3>;
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3);
    fn position(&self, body: BodyHandle) -> Option<Vec3>;
    fn set_position(&mut self, body: BodyHandle, position: Vec3);
    fn set_rotation(&mut self, body: BodyHandle, rotation: Quat);

    /// First static or dynamic hit along `direction`, ignoring `exclude`.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<BodyHandle>,
    ) -> Option<RayHit>;

    fn step(&mut self, dt_seconds: f32);
}
