//! Scene configuration.
//!
//! Every setting has a default matching the stock demo; use the `with_*`
//! methods to override individual values.
//!
//! ```ignore
//! let config = SceneConfig::default()
//!     .with_body_count(300)
//!     .with_seed(7)
//!     .with_attraction(Attraction { strength: 1.2, ..Default::default() });
//! ```

use glam::{Vec2, Vec3};

use crate::scene::PointLight;

/// Where bodies appear and how big they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSettings {
    /// Lower bound of the radius range (inclusive).
    pub min_radius: f32,
    /// Upper bound of the radius range (exclusive).
    pub max_radius: f32,
    /// Center of the spawn cube.
    pub cube_center: Vec3,
    /// Side length of the spawn cube.
    pub cube_side: f32,
    /// Collider density per unit of radius. Density is proportional to
    /// radius, not a physical unit.
    pub density_per_radius: f32,
}

impl SpawnSettings {
    /// Whether `p` lies inside the spawn cube (upper faces excluded).
    pub fn contains(&self, p: Vec3) -> bool {
        let min = self.cube_center - Vec3::splat(self.cube_side * 0.5);
        let max = self.cube_center + Vec3::splat(self.cube_side * 0.5);
        p.cmpge(min).all() && p.cmplt(max).all()
    }
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            min_radius: 0.1,
            max_radius: 0.35,
            cube_center: Vec3::new(0.0, 3.0, 0.0),
            cube_side: 6.0,
            density_per_radius: 1.0,
        }
    }
}

/// Constant-magnitude pull toward a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attraction {
    /// Point every body is pulled toward.
    pub center: Vec3,
    /// Force magnitude, independent of distance.
    pub strength: f32,
}

impl Attraction {
    /// Force to apply to a body at `position`.
    ///
    /// Zero when the body sits exactly on the center.
    pub fn force_at(&self, position: Vec3) -> Vec3 {
        let away = (position - self.center).normalize_or_zero();
        -self.strength * away
    }
}

impl Default for Attraction {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            strength: 0.7,
        }
    }
}

/// Linear map from normalized pointer coordinates to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMapping {
    /// Multiplier applied to both pointer axes.
    pub scale: f32,
    /// Constant world z of the mapped point.
    pub depth: f32,
}

impl PointerMapping {
    /// World position for a pointer in `[-1, 1]²`.
    pub fn to_world(&self, pointer: Vec2) -> Vec3 {
        Vec3::new(pointer.x * self.scale, pointer.y * self.scale, self.depth)
    }
}

impl Default for PointerMapping {
    fn default() -> Self {
        Self {
            scale: 5.0,
            depth: 0.2,
        }
    }
}

/// The pointer-driven collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    /// Radius of the visible sphere.
    pub visual_radius: f32,
    /// Collider radius as a multiple of `visual_radius`. Larger than one so
    /// the push reaches further than the visible sphere.
    pub collider_scale: f32,
    /// Collider density.
    pub density: f32,
    pub mapping: PointerMapping,
    pub color: Vec3,
    pub emissive: f32,
    pub light: PointLight,
}

impl ControllerSettings {
    /// Radius of the physics collider.
    pub fn collider_radius(&self) -> f32 {
        self.visual_radius * self.collider_scale
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            visual_radius: 0.25,
            collider_scale: 3.0,
            density: 1.0,
            mapping: PointerMapping::default(),
            color: Vec3::ONE,
            emissive: 2.0,
            light: PointLight::default(),
        }
    }
}

/// Bloom post-process parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Luminance above which pixels start to bloom.
    pub threshold: f32,
    /// Multiplier on the blurred highlights when composited.
    pub strength: f32,
    /// Spread of the blur, in texels per tap.
    pub radius: f32,
    /// Tonemapping exposure.
    pub exposure: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            strength: 1.5,
            radius: 1.5,
            exposure: 1.0,
        }
    }
}

/// Everything the simulation loop needs to populate and drive the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Number of bodies spawned when the loop starts.
    pub body_count: usize,
    /// RNG seed for spawn layout. `None` seeds from the clock.
    pub seed: Option<u64>,
    pub spawn: SpawnSettings,
    pub attraction: Attraction,
    pub controller: ControllerSettings,
    pub bloom: BloomSettings,
}

impl SceneConfig {
    pub fn with_body_count(mut self, count: usize) -> Self {
        self.body_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_spawn(mut self, spawn: SpawnSettings) -> Self {
        self.spawn = spawn;
        self
    }

    pub fn with_attraction(mut self, attraction: Attraction) -> Self {
        self.attraction = attraction;
        self
    }

    pub fn with_controller(mut self, controller: ControllerSettings) -> Self {
        self.controller = controller;
        self
    }

    pub fn with_bloom(mut self, bloom: BloomSettings) -> Self {
        self.bloom = bloom;
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            body_count: 150,
            seed: None,
            spawn: SpawnSettings::default(),
            attraction: Attraction::default(),
            controller: ControllerSettings::default(),
            bloom: BloomSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_mapping() {
        let mapping = PointerMapping::default();
        let p = mapping.to_world(Vec2::new(0.4, -0.6));
        assert!((p - Vec3::new(2.0, -3.0, 0.2)).length() < 1e-6);
        assert_eq!(mapping.to_world(Vec2::ZERO), Vec3::new(0.0, 0.0, 0.2));
    }

    #[test]
    fn test_attraction_constant_magnitude() {
        let attraction = Attraction::default();
        for p in [Vec3::new(0.1, 0.0, 0.0), Vec3::new(3.0, 4.0, 0.0), Vec3::splat(-50.0)] {
            let f = attraction.force_at(p);
            assert!((f.length() - 0.7).abs() < 1e-5);
            assert!(f.dot(attraction.center - p) > 0.0);
        }
    }

    #[test]
    fn test_attraction_at_center_is_zero() {
        let attraction = Attraction::default();
        assert_eq!(attraction.force_at(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_default_collider_is_three_times_visual() {
        let controller = ControllerSettings::default();
        assert_eq!(controller.collider_radius(), 0.75);
    }

    #[test]
    fn test_spawn_cube_bounds() {
        let spawn = SpawnSettings::default();
        assert!(spawn.contains(Vec3::new(-3.0, 0.0, -3.0)));
        assert!(spawn.contains(Vec3::new(2.9, 5.9, 2.9)));
        assert!(!spawn.contains(Vec3::new(0.0, -0.1, 0.0)));
        assert!(!spawn.contains(Vec3::new(3.0, 3.0, 0.0)));
    }

    #[test]
    fn test_builder_overrides() {
        let config = SceneConfig::default().with_body_count(10).with_seed(3);
        assert_eq!(config.body_count, 10);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.attraction, Attraction::default());
    }
}
