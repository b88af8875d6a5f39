//! # swarmlight
//!
//! A glowing attraction-field demo. A swarm of rigid spheres is pulled toward
//! a center by a constant-magnitude force, a kinematic collider follows the
//! pointer and shoves them around, and the result is rendered with bloom.
//!
//! ## Quick Start
//!
//! ```ignore
//! use swarmlight::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     Simulation::new()
//!         .with_body_count(150)
//!         .with_bloom(BloomSettings { strength: 2.0, ..Default::default() })
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Physics
//!
//! Rigid-body work is delegated through the [`PhysicsWorld`] trait.
//! [`RapierWorld`] backs it with rapier3d in a zero-gravity world; the only
//! forces are the ones bodies apply themselves.
//!
//! ### Bodies
//!
//! Each [`Body`] pairs a physics handle with a scene instance. Every frame it
//! clears its forces, re-aims a fixed-magnitude pull at the attraction
//! center and copies the physics translation onto its visual.
//!
//! ### Pointer controller
//!
//! [`PointerController`] is a kinematic body whose collider is three times
//! its visual radius. It tracks the pointer through a [`SharedPointer`],
//! carries the scene's point light and pushes bodies out of its way.
//!
//! ### Frame loop
//!
//! [`SimulationLoop`] populates the world on its first frame, then each frame
//! steps physics, updates the controller, updates every body and hands the
//! [`Scene`] to a [`Renderer`].
//!
//! ## Headless use
//!
//! ```ignore
//! use swarmlight::prelude::*;
//!
//! let mut sim = SimulationLoop::new(
//!     RapierWorld::new(),
//!     SceneConfig::default().with_seed(7),
//!     TemplateSlot::ready(VisualTemplate::default()),
//!     SharedPointer::new(),
//! );
//! for _ in 0..600 {
//!     sim.advance();
//! }
//! ```

pub mod body;
pub mod config;
pub mod controller;
pub mod error;
mod gpu;
pub mod input;
pub mod physics;
pub mod scene;
mod simulation;
pub mod spawn;
pub mod template;
pub mod time;
mod window;

pub use body::{Body, BodyFactory};
pub use config::{Attraction, BloomSettings, ControllerSettings, PointerMapping, SceneConfig, SpawnSettings};
pub use controller::PointerController;
pub use error::{GpuError, SimulationError, TemplateError};
pub use glam::{Vec2, Vec3};
pub use gpu::{Camera, GpuState, MAX_LIGHTS};
pub use input::{PointerInput, SharedPointer};
pub use physics::{BodyHandle, BodyKind, PhysicsWorld, RapierWorld};
pub use scene::{InstanceId, PointLight, Scene, VisualInstance};
pub use simulation::{LoopState, NullRenderer, Renderer, Simulation, SimulationLoop};
pub use spawn::SpawnContext;
pub use template::{TemplateLoader, TemplateSlot, TemplateSource, TemplateState, VisualTemplate};
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use swarmlight::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{BloomSettings, SceneConfig};
    pub use crate::error::SimulationError;
    pub use crate::input::SharedPointer;
    pub use crate::physics::{PhysicsWorld, RapierWorld};
    pub use crate::scene::Scene;
    pub use crate::simulation::{LoopState, NullRenderer, Renderer, Simulation, SimulationLoop};
    pub use crate::template::{TemplateSlot, TemplateSource, VisualTemplate};
    pub use crate::{Vec2, Vec3};
}
