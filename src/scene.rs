//! Visual scene graph.
//!
//! A flat arena of [`VisualInstance`]s. Instances are addressed by
//! [`InstanceId`], which stays valid for the life of the scene.

use glam::Vec3;

/// Stable reference to an instance in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(usize);

impl InstanceId {
    /// Position of this instance in insertion order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A point light attached to an instance. It sits at the instance position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Linear RGB color.
    pub color: Vec3,
    /// Scalar brightness multiplier.
    pub intensity: f32,
    /// Distance at which the light's contribution reaches zero.
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 3.0,
            range: 8.0,
        }
    }
}

/// One renderable sphere in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualInstance {
    /// World-space center.
    pub position: Vec3,
    /// World-space radius.
    pub scale: f32,
    /// Linear RGB albedo.
    pub color: Vec3,
    /// Self-illumination multiplier; values above the bloom threshold glow.
    pub emissive: f32,
    /// Optional light carried along with the instance.
    pub light: Option<PointLight>,
}

impl VisualInstance {
    /// Unlit, unit-sized white instance at the origin.
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
            color: Vec3::ONE,
            emissive: 0.0,
            light: None,
        }
    }

    /// Set the world-space center.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the world-space radius.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set albedo and emissive strength.
    pub fn with_material(mut self, color: Vec3, emissive: f32) -> Self {
        self.color = color;
        self.emissive = emissive;
        self
    }

    /// Attach a point light.
    pub fn with_light(mut self, light: PointLight) -> Self {
        self.light = Some(light);
        self
    }
}

impl Default for VisualInstance {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of every visual instance.
#[derive(Debug, Default)]
pub struct Scene {
    instances: Vec<VisualInstance>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance and return its id.
    pub fn add(&mut self, instance: VisualInstance) -> InstanceId {
        self.instances.push(instance);
        InstanceId(self.instances.len() - 1)
    }

    pub fn get(&self, id: InstanceId) -> Option<&VisualInstance> {
        self.instances.get(id.0)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut VisualInstance> {
        self.instances.get_mut(id.0)
    }

    /// Move an instance. Unknown ids are ignored.
    pub fn set_position(&mut self, id: InstanceId, position: Vec3) {
        if let Some(instance) = self.instances.get_mut(id.0) {
            instance.position = position;
        }
    }

    /// Instances in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &VisualInstance> {
        self.instances.iter()
    }

    /// Every attached light together with its world position.
    pub fn lights(&self) -> impl Iterator<Item = (Vec3, PointLight)> + '_ {
        self.instances
            .iter()
            .filter_map(|instance| instance.light.map(|light| (instance.position, light)))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
