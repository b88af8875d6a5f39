//! Physics provider seam.
//!
//! The simulation only needs a handful of rigid-body operations, collected in
//! the [`PhysicsWorld`] trait. [`RapierWorld`] implements them on top of
//! rapier3d; contact resolution, broad-phase and solving stay inside rapier.

use glam::Vec3;
use rapier3d::prelude::*;

/// Stable, non-owning reference to a body registered in a [`PhysicsWorld`].
///
/// Handles are indices into the provider's own arena and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) usize);

impl BodyHandle {
    /// Position of this body in registration order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// How a body's motion is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Integrated from forces and contacts.
    Dynamic,
    /// Driven to an externally supplied translation each step; still pushes
    /// dynamic bodies out of the way.
    KinematicPositionBased,
}

/// Operations the simulation consumes from a rigid-body engine.
///
/// Passing a handle that did not come from the same world is a programming
/// error and implementations are free to panic.
pub trait PhysicsWorld {
    /// Register a body of the given kind at `translation`.
    fn create_body(&mut self, kind: BodyKind, translation: Vec3) -> BodyHandle;

    /// Attach a spherical collider to `body`.
    fn attach_ball(&mut self, body: BodyHandle, radius: f32, density: f32);

    /// Advance the simulation by one step.
    fn step(&mut self);

    /// Current translation of `body`.
    fn translation(&self, body: BodyHandle) -> Vec3;

    /// Target translation a kinematic body reaches at the next step.
    fn set_next_kinematic_translation(&mut self, body: BodyHandle, translation: Vec3);

    /// Accumulate a force on `body`. Forces persist across steps until reset.
    fn add_force(&mut self, body: BodyHandle, force: Vec3);

    /// Clear all forces accumulated on `body`.
    fn reset_forces(&mut self, body: BodyHandle);
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// rapier3d-backed physics world with zero gravity.
pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    handles: Vec<RigidBodyHandle>,
}

impl RapierWorld {
    /// Create an empty world. The only force acting on bodies is whatever the
    /// caller applies.
    pub fn new() -> Self {
        Self {
            gravity: Vector::zeros(),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            handles: Vec::new(),
        }
    }

    /// Fixed step size in seconds.
    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Number of registered bodies.
    pub fn body_count(&self) -> usize {
        self.handles.len()
    }

    /// Number of registered colliders.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Radius of the first ball collider attached to `body`, if any.
    pub fn ball_radius(&self, body: BodyHandle) -> Option<f32> {
        self.rigid_body(body)
            .colliders()
            .iter()
            .filter_map(|handle| self.colliders.get(*handle))
            .find_map(|collider| collider.shape().as_ball().map(|ball| ball.radius))
    }

    /// Mass of `body` as derived from its colliders.
    pub fn mass(&self, body: BodyHandle) -> f32 {
        self.rigid_body(body).mass()
    }

    fn rigid_body(&self, body: BodyHandle) -> &RigidBody {
        &self.bodies[self.handles[body.0]]
    }

    fn rigid_body_mut(&mut self, body: BodyHandle) -> &mut RigidBody {
        &mut self.bodies[self.handles[body.0]]
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld for RapierWorld {
    fn create_body(&mut self, kind: BodyKind, translation: Vec3) -> BodyHandle {
        let builder = match kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::KinematicPositionBased => RigidBodyBuilder::kinematic_position_based(),
        };
        let handle = self.bodies.insert(builder.translation(to_vector(translation)).build());
        self.handles.push(handle);
        BodyHandle(self.handles.len() - 1)
    }

    fn attach_ball(&mut self, body: BodyHandle, radius: f32, density: f32) {
        let parent = self.handles[body.0];
        let collider = ColliderBuilder::ball(radius).density(density).build();
        self.colliders
            .insert_with_parent(collider, parent, &mut self.bodies);
    }

    fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
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

    fn translation(&self, body: BodyHandle) -> Vec3 {
        to_vec3(self.rigid_body(body).translation())
    }

    fn set_next_kinematic_translation(&mut self, body: BodyHandle, translation: Vec3) {
        let rigid_body = self.rigid_body_mut(body);
        rigid_body.set_next_kinematic_translation(to_vector(translation));
        rigid_body.wake_up(true);
    }

    fn add_force(&mut self, body: BodyHandle, force: Vec3) {
        self.rigid_body_mut(body).add_force(to_vector(force), true);
    }

    fn reset_forces(&mut self, body: BodyHandle) {
        self.rigid_body_mut(body).reset_forces(true);
    }
}

/// In-memory world that records every call, for exercising the simulation
/// without a real solver.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// One call made against a [`RecordingWorld`].
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum Op {
        Create(BodyKind),
        AttachBall { body: BodyHandle, radius: f32, density: f32 },
        Step,
        SetNextTranslation(BodyHandle, Vec3),
        AddForce(BodyHandle, Vec3),
        ResetForces(BodyHandle),
    }

    #[derive(Debug, Clone)]
    pub struct RecordedBody {
        pub kind: BodyKind,
        pub translation: Vec3,
        pub next_translation: Option<Vec3>,
        pub force: Vec3,
    }

    /// Toy world: dynamic bodies move by `force * 0.01` per step, kinematic
    /// bodies jump to their target.
    #[derive(Debug, Default)]
    pub struct RecordingWorld {
        pub bodies: Vec<RecordedBody>,
        pub ops: Vec<Op>,
    }

    impl RecordingWorld {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn force(&self, body: BodyHandle) -> Vec3 {
            self.bodies[body.0].force
        }
    }

    impl PhysicsWorld for RecordingWorld {
        fn create_body(&mut self, kind: BodyKind, translation: Vec3) -> BodyHandle {
            self.ops.push(Op::Create(kind));
            self.bodies.push(RecordedBody {
                kind,
                translation,
                next_translation: None,
                force: Vec3::ZERO,
            });
            BodyHandle(self.bodies.len() - 1)
        }

        fn attach_ball(&mut self, body: BodyHandle, radius: f32, density: f32) {
            self.ops.push(Op::AttachBall { body, radius, density });
        }

        fn step(&mut self) {
            self.ops.push(Op::Step);
            for body in &mut self.bodies {
                match body.kind {
                    BodyKind::Dynamic => body.translation += body.force * 0.01,
                    BodyKind::KinematicPositionBased => {
                        if let Some(next) = body.next_translation.take() {
                            body.translation = next;
                        }
                    }
                }
            }
        }

        fn translation(&self, body: BodyHandle) -> Vec3 {
            self.bodies[body.0].translation
        }

        fn set_next_kinematic_translation(&mut self, body: BodyHandle, translation: Vec3) {
            self.ops.push(Op::SetNextTranslation(body, translation));
            self.bodies[body.0].next_translation = Some(translation);
        }

        fn add_force(&mut self, body: BodyHandle, force: Vec3) {
            self.ops.push(Op::AddForce(body, force));
            self.bodies[body.0].force += force;
        }

        fn reset_forces(&mut self, body: BodyHandle) {
            self.ops.push(Op::ResetForces(body));
            self.bodies[body.0].force = Vec3::ZERO;
        }
    }
}
