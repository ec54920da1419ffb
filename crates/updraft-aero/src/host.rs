//! The rigid-body host the engine drives.
//!
//! The engine never integrates motion itself. It reads body poses and
//! velocities from a [`PhysicsHost`], pushes forces and torques back, and
//! asks it for the ground-effect raycast.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use updraft_core::layers::LayerMask;
use updraft_core::types::Pose;

/// Opaque rigid-body handle owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Primitives the aerodynamics engine consumes from the physics world.
pub trait PhysicsHost {
    /// Current world pose, or None if the body no longer exists.
    fn body_pose(&self, body: BodyHandle) -> Option<Pose>;

    /// Velocity of the material point of `body` at `world_point`.
    fn point_velocity(&self, body: BodyHandle, world_point: DVec3) -> Option<DVec3>;

    /// Accumulate `force` (N) acting at `world_position`.
    fn apply_force_at_position(&mut self, body: BodyHandle, force: DVec3, world_position: DVec3);

    /// Accumulate a pure torque (N·m) produced at `world_position`.
    fn apply_torque_at_position(&mut self, body: BodyHandle, torque: DVec3, world_position: DVec3);

    /// Distance to the first hit straight down from `origin`, if any within
    /// `max_distance` on a layer in `mask`.
    fn raycast_downward(&self, origin: DVec3, max_distance: f64, mask: LayerMask) -> Option<f64>;
}

/// Rigid body state for [`KinematicHost`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub pose: Pose,
    pub velocity: DVec3,
    pub angular_velocity: DVec3,
    pub mass: f64,
    /// Scalar moment of inertia (kg·m²).
    pub inertia: f64,
    #[serde(skip)]
    force: DVec3,
    #[serde(skip)]
    torque: DVec3,
}

impl RigidBody {
    pub fn new(pose: Pose, mass: f64, inertia: f64) -> Self {
        Self {
            pose,
            velocity: DVec3::ZERO,
            angular_velocity: DVec3::ZERO,
            mass,
            inertia,
            force: DVec3::ZERO,
            torque: DVec3::ZERO,
        }
    }

    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Force accumulated since the last step.
    pub fn pending_force(&self) -> DVec3 {
        self.force
    }

    /// Torque accumulated since the last step, about the center of mass.
    pub fn pending_torque(&self) -> DVec3 {
        self.torque
    }
}

/// Minimal reference host: point-mass bodies with scalar inertia over a flat
/// ground plane. Good enough for tests and offline tooling.
#[derive(Debug, Clone, Default)]
pub struct KinematicHost {
    bodies: Vec<RigidBody>,
    pub gravity: DVec3,
    /// Height of the terrain plane. None means no ground.
    pub ground_height: Option<f64>,
}

impl KinematicHost {
    pub fn new(gravity: DVec3, ground_height: Option<f64>) -> Self {
        Self {
            bodies: Vec::new(),
            gravity,
            ground_height,
        }
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        self.bodies.push(body);
        BodyHandle(self.bodies.len() as u32 - 1)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0 as usize)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.0 as usize)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Semi-implicit Euler step. Clears accumulated forces.
    pub fn step(&mut self, dt: f64) {
        for body in &mut self.bodies {
            if body.mass > 0.0 {
                body.velocity += (body.force / body.mass + self.gravity) * dt;
            }
            if body.inertia > 0.0 {
                body.angular_velocity += body.torque / body.inertia * dt;
            }
            body.pose.position += body.velocity * dt;
            body.pose.rotation =
                (DQuat::from_scaled_axis(body.angular_velocity * dt) * body.pose.rotation).normalize();

            if let Some(ground) = self.ground_height {
                if body.pose.position.y < ground {
                    body.pose.position.y = ground;
                    body.velocity.y = body.velocity.y.max(0.0);
                }
            }

            body.force = DVec3::ZERO;
            body.torque = DVec3::ZERO;
        }
    }
}

impl PhysicsHost for KinematicHost {
    fn body_pose(&self, body: BodyHandle) -> Option<Pose> {
        self.body(body).map(|b| b.pose)
    }

    fn point_velocity(&self, body: BodyHandle, world_point: DVec3) -> Option<DVec3> {
        self.body(body).map(|b| {
            b.velocity + b.angular_velocity.cross(world_point - b.pose.position)
        })
    }

    fn apply_force_at_position(&mut self, body: BodyHandle, force: DVec3, world_position: DVec3) {
        if let Some(b) = self.body_mut(body) {
            b.force += force;
            b.torque += (world_position - b.pose.position).cross(force);
        }
    }

    fn apply_torque_at_position(&mut self, body: BodyHandle, torque: DVec3, _world_position: DVec3) {
        if let Some(b) = self.body_mut(body) {
            b.torque += torque;
        }
    }

    fn raycast_downward(&self, origin: DVec3, max_distance: f64, mask: LayerMask) -> Option<f64> {
        if !mask.contains(LayerMask::TERRAIN) {
            return None;
        }
        let distance = origin.y - self.ground_height?;
        (0.0..=max_distance).contains(&distance).then_some(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn off_center_force_produces_torque() {
        let mut host = KinematicHost::default();
        let body = host.add_body(RigidBody::new(Pose::IDENTITY, 2.0, 1.0));
        host.apply_force_at_position(body, DVec3::Y, DVec3::X);
        let b = host.body(body).unwrap();
        assert_eq!(b.pending_force(), DVec3::Y);
        assert_eq!(b.pending_torque(), DVec3::Z);
    }

    #[test]
    fn step_integrates_and_clears() {
        let mut host = KinematicHost::new(DVec3::new(0.0, -10.0, 0.0), None);
        let body = host.add_body(RigidBody::new(Pose::IDENTITY, 1.0, 1.0));
        host.apply_force_at_position(body, DVec3::new(0.0, 10.0, 0.0), DVec3::ZERO);
        host.step(0.1);
        let b = host.body(body).unwrap();
        assert_eq!(b.velocity, DVec3::ZERO);
        assert_eq!(b.pending_force(), DVec3::ZERO);

        host.step(0.1);
        assert_abs_diff_eq!(host.body(body).unwrap().velocity.y, -1.0);
    }

    #[test]
    fn raycast_hits_ground_within_range() {
        let host = KinematicHost::new(DVec3::ZERO, Some(2.0));
        let mask = LayerMask::ground_effect();
        assert_eq!(host.raycast_downward(DVec3::new(0.0, 7.0, 0.0), 10.0, mask), Some(5.0));
        assert_eq!(host.raycast_downward(DVec3::new(0.0, 30.0, 0.0), 10.0, mask), None);
        assert_eq!(host.raycast_downward(DVec3::new(0.0, 7.0, 0.0), 10.0, LayerMask::UI), None);
    }

    #[test]
    fn point_velocity_includes_rotation() {
        let mut host = KinematicHost::default();
        let body = host.add_body(RigidBody::new(Pose::IDENTITY, 1.0, 1.0));
        host.body_mut(body).unwrap().angular_velocity = DVec3::Y;
        let v = host.point_velocity(body, DVec3::X).unwrap();
        assert!(v.abs_diff_eq(DVec3::new(0.0, 0.0, -1.0), 1e-12));
    }
}
