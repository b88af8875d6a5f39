//! Attracted bodies and the factory that spawns them.
//!
//! A [`Body`] pairs one dynamic physics body with one scene instance. Its
//! contract: after every [`Body::update`], the instance position equals the
//! physics translation exactly.

use glam::Vec3;

use crate::config::{Attraction, SpawnSettings};
use crate::physics::{BodyHandle, BodyKind, PhysicsWorld};
use crate::scene::{InstanceId, Scene};
use crate::spawn::SpawnContext;
use crate::template::{TemplateSlot, VisualTemplate};

/// A dynamic body pulled toward the attraction center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    handle: BodyHandle,
    instance: InstanceId,
    radius: f32,
    attraction: Attraction,
}

impl Body {
    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Replace last frame's force with a fresh pull toward the center, then
    /// sync the visual to the physics translation.
    pub fn update<W: PhysicsWorld + ?Sized>(&self, world: &mut W, scene: &mut Scene) {
        world.reset_forces(self.handle);
        let position = world.translation(self.handle);
        world.add_force(self.handle, self.attraction.force_at(position));
        scene.set_position(self.instance, position);
    }

    /// Whether the visual currently matches the physics translation.
    pub fn in_sync<W: PhysicsWorld + ?Sized>(&self, world: &W, scene: &Scene) -> bool {
        scene
            .get(self.instance)
            .is_some_and(|instance| instance.position == world.translation(self.handle))
    }
}

/// Spawns [`Body`]s with randomized radius and position.
pub struct BodyFactory {
    template: TemplateSlot,
    spawn: SpawnSettings,
    attraction: Attraction,
    ctx: SpawnContext,
}

impl BodyFactory {
    pub fn new(
        template: TemplateSlot,
        spawn: SpawnSettings,
        attraction: Attraction,
        ctx: SpawnContext,
    ) -> Self {
        Self {
            template,
            spawn,
            attraction,
            ctx,
        }
    }

    /// Create one body, or `None` if the template is not ready yet.
    ///
    /// Nothing is registered in `world` or `scene` when `None` is returned.
    pub fn spawn<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        scene: &mut Scene,
    ) -> Option<Body> {
        let template = self.template.get()?;

        let radius = self.ctx.random_range(self.spawn.min_radius, self.spawn.max_radius);
        let position = self
            .ctx
            .random_in_cube(self.spawn.cube_center, self.spawn.cube_side);

        Some(self.register(world, scene, &template, position, radius))
    }

    /// Spawn a body at a fixed position and radius, bypassing the RNG.
    pub fn spawn_at<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        scene: &mut Scene,
        position: Vec3,
        radius: f32,
    ) -> Option<Body> {
        let template = self.template.get()?;
        Some(self.register(world, scene, &template, position, radius))
    }

    fn register<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        scene: &mut Scene,
        template: &VisualTemplate,
        position: Vec3,
        radius: f32,
    ) -> Body {
        let handle = world.create_body(BodyKind::Dynamic, position);
        world.attach_ball(handle, radius, radius * self.spawn.density_per_radius);
        let instance = scene.add(template.instantiate(position, radius));
        self.ctx.next_index();

        Body {
            handle,
            instance,
            radius,
            attraction: self.attraction,
        }
    }

    /// Number of bodies this factory has produced.
    pub fn spawned(&self) -> u32 {
        self.ctx.spawned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::testing::{Op, RecordingWorld};

    fn factory(slot: TemplateSlot) -> BodyFactory {
        BodyFactory::new(
            slot,
            SpawnSettings::default(),
            Attraction::default(),
            SpawnContext::seeded(11),
        )
    }

    #[test]
    fn test_spawn_within_ranges() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let mut factory = factory(TemplateSlot::ready(VisualTemplate::default()));
        let spawn = SpawnSettings::default();

        for _ in 0..150 {
            let body = factory.spawn(&mut world, &mut scene).unwrap();
            assert!((0.1..0.35).contains(&body.radius()));
            let p = world.translation(body.handle());
            assert!(spawn.contains(p), "{p:?} outside spawn cube");
            assert_eq!(scene.get(body.instance()).unwrap().scale, body.radius());
        }
        assert_eq!(factory.spawned(), 150);
    }

    #[test]
    fn test_collider_density_proportional_to_radius() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let mut factory = factory(TemplateSlot::ready(VisualTemplate::default()));

        let body = factory.spawn(&mut world, &mut scene).unwrap();

        assert!(world.ops.contains(&Op::AttachBall {
            body: body.handle(),
            radius: body.radius(),
            density: body.radius(),
        }));
    }

    #[test]
    fn test_unready_template_spawns_nothing() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let mut factory = factory(TemplateSlot::pending());

        assert!(factory.spawn(&mut world, &mut scene).is_none());
        assert!(world.ops.is_empty());
        assert!(scene.is_empty());
        assert_eq!(factory.spawned(), 0);
    }

    #[test]
    fn test_update_pulls_toward_center() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let mut factory = factory(TemplateSlot::ready(VisualTemplate::default()));

        for _ in 0..20 {
            let body = factory.spawn(&mut world, &mut scene).unwrap();
            body.update(&mut world, &mut scene);

            let p = world.translation(body.handle());
            let f = world.force(body.handle());
            assert!(f.dot(Vec3::ZERO - p) > 0.0);
            assert!((f.length() - 0.7).abs() < 1e-5);
        }
    }

    #[test]
    fn test_update_resets_before_adding() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let mut factory = factory(TemplateSlot::ready(VisualTemplate::default()));
        let body = factory.spawn(&mut world, &mut scene).unwrap();

        body.update(&mut world, &mut scene);
        body.update(&mut world, &mut scene);

        // Forces never pile up across updates.
        assert!((world.force(body.handle()).length() - 0.7).abs() < 1e-5);
        let tail = &world.ops[world.ops.len() - 2..];
        assert!(matches!(tail[0], Op::ResetForces(_)));
        assert!(matches!(tail[1], Op::AddForce(_, _)));
    }

    #[test]
    fn test_visual_tracks_physics_after_update() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let mut factory = factory(TemplateSlot::ready(VisualTemplate::default()));
        let body = factory.spawn(&mut world, &mut scene).unwrap();

        for _ in 0..5 {
            body.update(&mut world, &mut scene);
            assert!(body.in_sync(&world, &scene));
            world.step();
            assert!(!body.in_sync(&world, &scene));
        }
    }

    #[test]
    fn test_update_is_idempotent_without_step() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let mut factory = factory(TemplateSlot::ready(VisualTemplate::default()));
        let body = factory.spawn(&mut world, &mut scene).unwrap();

        body.update(&mut world, &mut scene);
        let first = scene.get(body.instance()).unwrap().position;
        body.update(&mut world, &mut scene);
        let second = scene.get(body.instance()).unwrap().position;

        assert_eq!(first, second);
    }

    #[test]
    fn test_spawn_at_registers_like_spawn() {
        let mut world = RecordingWorld::new();
        let mut scene = Scene::new();
        let mut factory = factory(TemplateSlot::ready(VisualTemplate::default()));
        let position = Vec3::new(0.5, 1.0, -0.5);

        let body = factory.spawn_at(&mut world, &mut scene, position, 0.3).unwrap();

        assert_eq!(
            world.ops,
            vec![
                Op::Create(BodyKind::Dynamic),
                Op::AttachBall {
                    body: body.handle(),
                    radius: 0.3,
                    density: 0.3,
                },
            ]
        );
        let instance = scene.get(body.instance()).unwrap();
        assert_eq!(instance.position, position);
        assert_eq!(instance.scale, 0.3);
        assert_eq!(factory.spawned(), 1);
    }
}
