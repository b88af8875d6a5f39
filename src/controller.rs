//! Pointer-driven kinematic collider.

use glam::Vec2;

use crate::config::ControllerSettings;
use crate::physics::{BodyHandle, BodyKind, PhysicsWorld};
use crate::scene::{InstanceId, Scene, VisualInstance};

/// The singleton body that follows the pointer and shoves other bodies.
///
/// Its collider is larger than its visual sphere so the push is felt before
/// the spheres visibly touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerController {
    handle: BodyHandle,
    instance: InstanceId,
    settings: ControllerSettings,
}

impl PointerController {
    /// Register the kinematic body, its collider and its lit visual, placed
    /// where a centered pointer maps to.
    pub fn spawn<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        scene: &mut Scene,
        settings: ControllerSettings,
    ) -> Self {
        let start = settings.mapping.to_world(Vec2::ZERO);

        let handle = world.create_body(BodyKind::KinematicPositionBased, start);
        world.attach_ball(handle, settings.collider_radius(), settings.density);

        let instance = scene.add(
            VisualInstance::new()
                .with_position(start)
                .with_scale(settings.visual_radius)
                .with_material(settings.color, settings.emissive)
                .with_light(settings.light),
        );

        Self {
            handle,
            instance,
            settings,
        }
    }

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn visual_radius(&self) -> f32 {
        self.settings.visual_radius
    }

    pub fn collider_radius(&self) -> f32 {
        self.settings.collider_radius()
    }

    /// Steer toward the pointer, then show wherever physics actually has the
    /// body. The visual trails the target by one step.
    pub fn update<W: PhysicsWorld + ?Sized>(&self, world: &mut W, scene: &mut Scene, pointer: Vec2) {
        let target = self.settings.mapping.to_world(pointer);
        world.set_next_kinematic_translation(self.handle, target);
        scene.set_position(self.instance, world.translation(self.handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::testing::{Op, RecordingWorld};
    use glam::Vec3;

    #[test]
    fn test_collider_three_times_visual() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let controller = PointerController::spawn(&mut world, &mut scene, ControllerSettings::default());

        assert_eq!(controller.visual_radius(), 0.25);
        assert_eq!(controller.collider_radius(), 0.75);
        assert!(world.ops.contains(&Op::Create(BodyKind::KinematicPositionBased)));
        assert!(world.ops.contains(&Op::AttachBall {
            body: controller.handle(),
            radius: 0.75,
            density: 1.0,
        }));
        assert_eq!(scene.get(controller.instance()).unwrap().scale, 0.25);
    }

    #[test]
    fn test_collider_scale_holds_for_any_radius() {
        for radius in [0.1, 0.4, 1.0] {
            let settings = ControllerSettings {
                visual_radius: radius,
                ..Default::default()
            };
            let mut world = RecordingWorld::new();
            let mut scene = Scene::new();
            let controller = PointerController::spawn(&mut world, &mut scene, settings);
            assert!((controller.collider_radius() - 3.0 * radius).abs() < 1e-6);
        }
    }

    #[test]
    fn test_carries_point_light() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        PointerController::spawn(&mut world, &mut scene, ControllerSettings::default());
        assert_eq!(scene.lights().count(), 1);
    }

    #[test]
    fn test_update_sets_mapped_target() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let controller = PointerController::spawn(&mut world, &mut scene, ControllerSettings::default());

        controller.update(&mut world, &mut scene, Vec2::new(0.4, -0.6));

        let Some(Op::SetNextTranslation(_, target)) = world.ops.last().copied() else {
            panic!("expected a kinematic target");
        };
        assert!((target - Vec3::new(2.0, -3.0, 0.2)).length() < 1e-6);
    }

    #[test]
    fn test_visual_trails_target_by_one_step() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let controller = PointerController::spawn(&mut world, &mut scene, ControllerSettings::default());
        let pointer = Vec2::new(1.0, 1.0);

        controller.update(&mut world, &mut scene, pointer);
        assert_eq!(scene.get(controller.instance()).unwrap().position, Vec3::new(0.0, 0.0, 0.2));

        world.step();
        controller.update(&mut world, &mut scene, pointer);
        assert_eq!(scene.get(controller.instance()).unwrap().position, Vec3::new(5.0, 5.0, 0.2));
    }

    #[test]
    fn test_update_is_idempotent_without_step() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let controller = PointerController::spawn(&mut world, &mut scene, ControllerSettings::default());
        let pointer = Vec2::new(-0.3, 0.8);

        controller.update(&mut world, &mut scene, pointer);
        let first = scene.get(controller.instance()).unwrap().position;
        controller.update(&mut world, &mut scene, pointer);
        let second = scene.get(controller.instance()).unwrap().position;

        assert_eq!(first, second);
    }
}
