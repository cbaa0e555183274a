use std::collections::HashMap;

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;
use tracing::debug;

use super::{BodyHandle, BodyShape, DynamicBodyDesc, PhysicsWorld, RayHit};

pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// [`PhysicsWorld`] backed by a rapier3d pipeline.
pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    handles: HashMap<BodyHandle, RigidBodyHandle>,
    next_handle: u64,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl RapierWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: to_vector(gravity),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            handles: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn body_count(&self) -> usize {
        self.handles.len()
    }

    fn body(&self, body: BodyHandle) -> Option<&RigidBody> {
        let handle = self.handles.get(&body)?;
        self.bodies.get(*handle)
    }

    fn body_mut(&mut self, body: BodyHandle) -> Option<&mut RigidBody> {
        let handle = self.handles.get(&body)?;
        self.bodies.get_mut(*handle)
    }
}

impl PhysicsWorld for RapierWorld {
    fn spawn_dynamic_body(&mut self, desc: &DynamicBodyDesc) -> BodyHandle {
        let mut builder = RigidBodyBuilder::dynamic().translation(to_vector(desc.position));
        if desc.lock_rotations {
            builder = builder.lock_rotations();
        }
        let mut rigid_body = builder.build();
        rigid_body.set_rotation(to_rotation(desc.rotation), false);
        let rapier_handle = self.bodies.insert(rigid_body);

        let collider = match desc.shape {
            BodyShape::Ball { radius } => ColliderBuilder::ball(radius),
            BodyShape::Capsule {
                half_height,
                radius,
            } => ColliderBuilder::capsule_y(half_height, radius),
        }
        .mass(desc.mass)
        .build();
        self.colliders
            .insert_with_parent(collider, rapier_handle, &mut self.bodies);

        let handle = BodyHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.handles.insert(handle, rapier_handle);
        debug!(body = handle.0, "physics_body_spawned");
        handle
    }

    fn add_static_box(&mut self, center: Vec3, half_extents: Vec3) {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(to_vector(center))
            .build();
        self.colliders.insert(collider);
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        let Some(handle) = self.handles.remove(&body) else {
            return false;
        };
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.body(body).map(|rigid_body| to_vec3(rigid_body.linvel()))
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        if let Some(rigid_body) = self.body_mut(body) {
            rigid_body.set_linvel(to_vector(velocity), true);
        }
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        self.body(body)
            .map(|rigid_body| to_vec3(rigid_body.translation()))
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) {
        if let Some(rigid_body) = self.body_mut(body) {
            rigid_body.set_translation(to_vector(position), true);
        }
    }

    fn set_rotation(&mut self, body: BodyHandle, rotation: Quat) {
        if let Some(rigid_body) = self.body_mut(body) {
            rigid_body.set_rotation(to_rotation(rotation), true);
        }
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<BodyHandle>,
    ) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        if !(max_distance > 0.0) {
            return None;
        }
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );
        let mut filter = QueryFilter::default();
        if let Some(handle) = exclude.and_then(|body| self.handles.get(&body)) {
            filter = filter.exclude_rigid_body(*handle);
        }
        self.query_pipeline
            .cast_ray(&self.bodies, &self.colliders, &ray, max_distance, true, filter)
            .map(|(_, distance)| RayHit {
                point: origin + direction * distance,
                distance,
            })
    }

    fn step(&mut self, dt_seconds: f32) {
        if !(dt_seconds > 0.0) {
            return;
        }
        self.integration_parameters.dt = dt_seconds;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }
}

fn to_vector(value: Vec3) -> Vector<Real> {
    vector![value.x, value.y, value.z]
}

fn to_vec3(value: &Vector<Real>) -> Vec3 {
    Vec3::new(value.x, value.y, value.z)
}

fn to_rotation(value: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(value.w, value.x, value.y, value.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn ball_at(position: Vec3) -> DynamicBodyDesc {
        DynamicBodyDesc {
            position,
            rotation: Quat::IDENTITY,
            shape: BodyShape::Ball { radius: 0.5 },
            mass: 1.0,
            lock_rotations: true,
        }
    }

    fn world_with_floor() -> RapierWorld {
        let mut world = RapierWorld::default();
        world.add_static_box(Vec3::new(0.0, -1.0, 0.0), Vec3::new(20.0, 1.0, 20.0));
        world
    }

    #[test]
    fn unsupported_body_falls_under_gravity() {
        let mut world = RapierWorld::default();
        let body = world.spawn_dynamic_body(&ball_at(Vec3::new(0.0, 5.0, 0.0)));
        for _ in 0..30 {
            world.step(DT);
        }

        let position = world.position(body).expect("position");
        let velocity = world.linear_velocity(body).expect("velocity");
        assert!(position.y < 5.0);
        assert!(velocity.y < 0.0);
    }

    #[test]
    fn velocity_and_position_writes_are_visible() {
        let mut world = RapierWorld::default();
        let body = world.spawn_dynamic_body(&ball_at(Vec3::ZERO));

        world.set_linear_velocity(body, Vec3::new(1.0, 2.0, 3.0));
        world.set_position(body, Vec3::new(4.0, 5.0, 6.0));

        assert_eq!(world.linear_velocity(body), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(world.position(body), Some(Vec3::new(4.0, 5.0, 6.0)));
    }

    #[test]
    fn unknown_handles_read_none_and_ignore_writes() {
        let mut world = RapierWorld::default();
        let missing = BodyHandle(99);

        world.set_linear_velocity(missing, Vec3::ONE);
        world.set_rotation(missing, Quat::IDENTITY);
        assert!(world.position(missing).is_none());
        assert!(world.linear_velocity(missing).is_none());
        assert!(!world.remove_body(missing));
    }

    #[test]
    fn removed_body_is_forgotten() {
        let mut world = RapierWorld::default();
        let body = world.spawn_dynamic_body(&ball_at(Vec3::ZERO));
        assert_eq!(world.body_count(), 1);

        assert!(world.remove_body(body));
        assert_eq!(world.body_count(), 0);
        assert!(world.position(body).is_none());
    }

    #[test]
    fn ray_hits_static_floor() {
        let mut world = world_with_floor();
        world.step(DT);

        let hit = world
            .cast_ray(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 20.0, None)
            .expect("floor hit");
        assert!((hit.distance - 5.0).abs() < 1e-3);
        assert!(hit.point.y.abs() < 1e-3);

        assert!(world
            .cast_ray(Vec3::new(0.0, 5.0, 0.0), Vec3::Y, 20.0, None)
            .is_none());
        assert!(world
            .cast_ray(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, 20.0, None)
            .is_none());
    }

    #[test]
    fn ray_can_skip_the_casting_body() {
        let mut world = world_with_floor();
        let body = world.spawn_dynamic_body(&ball_at(Vec3::new(0.0, 2.0, 0.0)));
        world.step(DT);

        let own = world
            .cast_ray(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 10.0, None)
            .expect("own collider");
        let past_self = world
            .cast_ray(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 10.0, Some(body))
            .expect("floor");

        assert!(own.distance < 0.1);
        assert!((past_self.distance - 2.0).abs() < 1e-3);
    }

    #[test]
    fn ball_comes_to_rest_on_floor() {
        let mut world = world_with_floor();
        let body = world.spawn_dynamic_body(&ball_at(Vec3::new(0.0, 1.0, 0.0)));
        for _ in 0..180 {
            world.step(DT);
        }

        let position = world.position(body).expect("position");
        let velocity = world.linear_velocity(body).expect("velocity");
        assert!((position.y - 0.5).abs() < 0.05, "y = {}", position.y);
        assert!(velocity.y.abs() < 0.05, "vy = {}", velocity.y);
    }
}
