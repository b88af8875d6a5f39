//! The per-frame simulation loop and the demo builder.

use std::convert::Infallible;

use winit::event_loop::{ControlFlow, EventLoop};

use crate::body::{Body, BodyFactory};
use crate::config::{BloomSettings, SceneConfig};
use crate::controller::PointerController;
use crate::error::SimulationError;
use crate::input::SharedPointer;
use crate::physics::{PhysicsWorld, RapierWorld};
use crate::scene::Scene;
use crate::spawn::SpawnContext;
use crate::template::{TemplateLoader, TemplateSlot, TemplateSource};
use crate::window::App;

/// Consumes the scene once per frame.
pub trait Renderer {
    type Error;

    fn render(&mut self, scene: &Scene) -> Result<(), Self::Error>;
}

/// Renderer that draws nothing. Useful for headless runs and benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    type Error = Infallible;

    fn render(&mut self, _scene: &Scene) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Lifecycle of a [`SimulationLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, nothing spawned yet.
    Idle,
    /// Populated and advancing one step per frame.
    Running,
}

/// Owns the physics world and the scene and advances both each frame.
pub struct SimulationLoop<W: PhysicsWorld> {
    state: LoopState,
    world: W,
    scene: Scene,
    config: SceneConfig,
    template: TemplateSlot,
    pointer: SharedPointer,
    controller: Option<PointerController>,
    bodies: Vec<Body>,
    frames: u64,
}

impl<W: PhysicsWorld> SimulationLoop<W> {
    pub fn new(world: W, config: SceneConfig, template: TemplateSlot, pointer: SharedPointer) -> Self {
        Self {
            state: LoopState::Idle,
            world,
            scene: Scene::new(),
            bodies: Vec::with_capacity(config.body_count),
            config,
            template,
            pointer,
            controller: None,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Readiness handle the body factory draws from.
    pub fn template(&self) -> &TemplateSlot {
        &self.template
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn controller(&self) -> Option<&PointerController> {
        self.controller.as_ref()
    }

    /// Frames advanced since the loop started running.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Spawn the controller and the body population, then switch to
    /// [`LoopState::Running`]. Does nothing once running.
    ///
    /// Bodies whose template is not ready are skipped.
    pub fn start(&mut self) {
        if self.state == LoopState::Running {
            return;
        }

        self.controller = Some(PointerController::spawn(
            &mut self.world,
            &mut self.scene,
            self.config.controller,
        ));

        let mut factory = BodyFactory::new(
            self.template.clone(),
            self.config.spawn,
            self.config.attraction,
            SpawnContext::new(self.config.seed),
        );
        for _ in 0..self.config.body_count {
            if let Some(body) = factory.spawn(&mut self.world, &mut self.scene) {
                self.bodies.push(body);
            }
        }

        let skipped = self.config.body_count - self.bodies.len();
        if skipped > 0 {
            log::warn!("template not ready, skipped {} of {} bodies", skipped, self.config.body_count);
        }
        log::info!("spawned {} bodies", self.bodies.len());
        self.state = LoopState::Running;
    }

    /// Advance one frame: step physics, update the controller from one
    /// pointer snapshot, update every body in spawn order, render.
    pub fn frame<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<(), R::Error> {
        self.advance();
        renderer.render(&self.scene)
    }

    /// Everything [`SimulationLoop::frame`] does except rendering.
    pub fn advance(&mut self) {
        if self.state == LoopState::Idle {
            self.start();
        }

        self.world.step();

        if let Some(controller) = &self.controller {
            let pointer = self.pointer.snapshot();
            controller.update(&mut self.world, &mut self.scene, pointer);
        }

        for body in &self.bodies {
            body.update(&mut self.world, &mut self.scene);
        }

        self.frames += 1;
    }
}

/// Builder for the interactive demo window.
///
/// ```ignore
/// Simulation::new()
///     .with_body_count(200)
///     .with_template(TemplateSource::ColorMap("assets/rock.png".into()))
///     .run()?;
/// ```
pub struct Simulation {
    config: SceneConfig,
    source: TemplateSource,
}

impl Simulation {
    /// Create a new simulation with default settings.
    pub fn new() -> Self {
        Self {
            config: SceneConfig::default(),
            source: TemplateSource::Builtin,
        }
    }

    /// Replace the whole scene configuration.
    pub fn with_config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of bodies.
    pub fn with_body_count(mut self, count: usize) -> Self {
        self.config.body_count = count;
        self
    }

    /// Fix the spawn layout seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Choose where the body template comes from.
    pub fn with_template(mut self, source: TemplateSource) -> Self {
        self.source = source;
        self
    }

    /// Tune the bloom pass.
    pub fn with_bloom(mut self, bloom: BloomSettings) -> Self {
        self.config.bloom = bloom;
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), SimulationError> {
        let template = TemplateLoader::spawn(self.source);
        let pointer = SharedPointer::new();
        let sim = SimulationLoop::new(RapierWorld::new(), self.config, template, pointer.clone());

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(sim, pointer);
        event_loop.run_app(&mut app)?;

        match app.into_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::testing::{Op, RecordingWorld};
    use crate::template::VisualTemplate;
    use glam::{Vec2, Vec3};

    fn ready_loop(count: usize) -> SimulationLoop<RecordingWorld> {
        SimulationLoop::new(
            RecordingWorld::new(),
            SceneConfig::default().with_body_count(count).with_seed(5),
            TemplateSlot::ready(VisualTemplate::default()),
            SharedPointer::new(),
        )
    }

    /// Counts renders and the scene size each one saw.
    #[derive(Default)]
    struct CountingRenderer {
        renders: usize,
        instances: Vec<usize>,
    }

    impl Renderer for CountingRenderer {
        type Error = Infallible;

        fn render(&mut self, scene: &Scene) -> Result<(), Infallible> {
            self.renders += 1;
            self.instances.push(scene.len());
            Ok(())
        }
    }

    #[test]
    fn test_idle_until_first_frame() {
        let mut sim = ready_loop(10);
        assert_eq!(sim.state(), LoopState::Idle);
        assert!(sim.bodies().is_empty());
        assert!(sim.controller().is_none());

        sim.frame(&mut NullRenderer).unwrap();

        assert_eq!(sim.state(), LoopState::Running);
        assert_eq!(sim.bodies().len(), 10);
        assert!(sim.controller().is_some());
        assert_eq!(sim.scene().len(), 11);
    }

    #[test]
    fn test_start_runs_once() {
        let mut sim = ready_loop(3);
        sim.start();
        sim.start();
        sim.frame(&mut NullRenderer).unwrap();
        assert_eq!(sim.bodies().len(), 3);
        assert_eq!(sim.world().bodies.len(), 4);
    }

    #[test]
    fn test_one_render_per_frame() {
        let mut sim = ready_loop(4);
        let mut counter = CountingRenderer::default();
        for _ in 0..7 {
            sim.frame(&mut counter).unwrap();
        }
        assert_eq!(counter.renders, 7);
        assert_eq!(sim.frames(), 7);
        assert!(counter.instances.iter().all(|&n| n == 5));
    }

    #[test]
    fn test_frame_order_step_controller_bodies() {
        let mut sim = ready_loop(3);
        sim.start();
        let setup_ops = sim.world().ops.len();

        sim.frame(&mut NullRenderer).unwrap();

        let frame_ops = &sim.world().ops[setup_ops..];
        assert_eq!(frame_ops[0], Op::Step);
        assert!(matches!(frame_ops[1], Op::SetNextTranslation(_, _)));

        let body_handles: Vec<_> = frame_ops[2..]
            .iter()
            .filter_map(|op| match op {
                Op::AddForce(handle, _) => Some(*handle),
                _ => None,
            })
            .collect();
        let expected: Vec<_> = sim.bodies().iter().map(|b| b.handle()).collect();
        assert_eq!(body_handles, expected);
    }

    #[test]
    fn test_visuals_in_sync_after_frame() {
        let mut sim = ready_loop(20);
        for _ in 0..5 {
            sim.frame(&mut NullRenderer).unwrap();
            for body in sim.bodies() {
                assert!(body.in_sync(sim.world(), sim.scene()));
            }
        }
    }

    #[test]
    fn test_pointer_snapshot_drives_controller() {
        let pointer = SharedPointer::new();
        let mut sim = SimulationLoop::new(
            RecordingWorld::new(),
            SceneConfig::default().with_body_count(0),
            TemplateSlot::ready(VisualTemplate::default()),
            pointer.clone(),
        );

        pointer.set(Vec2::new(0.4, -0.6));
        sim.frame(&mut NullRenderer).unwrap();
        sim.frame(&mut NullRenderer).unwrap();

        let controller = *sim.controller().unwrap();
        let shown = sim.scene().get(controller.instance()).unwrap().position;
        assert!((shown - Vec3::new(2.0, -3.0, 0.2)).length() < 1e-6);
    }

    #[test]
    fn test_unready_template_still_spawns_controller() {
        let mut sim = SimulationLoop::new(
            RecordingWorld::new(),
            SceneConfig::default(),
            TemplateSlot::pending(),
            SharedPointer::new(),
        );

        sim.frame(&mut NullRenderer).unwrap();

        assert_eq!(sim.state(), LoopState::Running);
        assert!(sim.bodies().is_empty());
        assert!(sim.controller().is_some());
        assert_eq!(sim.scene().len(), 1);
    }

    #[test]
    fn test_renderer_error_is_returned() {
        struct Broken;
        impl Renderer for Broken {
            type Error = &'static str;
            fn render(&mut self, _scene: &Scene) -> Result<(), &'static str> {
                Err("surface lost")
            }
        }

        let mut sim = ready_loop(2);
        assert_eq!(sim.frame(&mut Broken), Err("surface lost"));
        assert_eq!(sim.frames(), 1);
    }
}
