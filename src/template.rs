//! Shared visual template and its readiness handle.
//!
//! Bodies are clones of one [`VisualTemplate`]. The template may come from
//! disk, so it is published through a [`TemplateSlot`]: a small promise that
//! is pending until a [`TemplateLoader`] either fills it or marks it failed.
//! The body factory reads the slot explicitly instead of relying on a global
//! "loaded" flag.
//!
//! ```ignore
//! let slot = TemplateLoader::spawn(TemplateSource::ColorMap("assets/rock.png".into()));
//! // ... later, from the frame loop
//! if let Some(template) = slot.get() {
//!     scene.add(template.instantiate(Vec3::ZERO, 0.2));
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use glam::Vec3;

use crate::error::TemplateError;
use crate::scene::VisualInstance;

/// Material shared by every body instance.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualTemplate {
    /// Linear RGB albedo.
    pub color: Vec3,
    /// Self-illumination multiplier.
    pub emissive: f32,
}

impl VisualTemplate {
    /// Clone the template into a scene instance of the given radius.
    pub fn instantiate(&self, position: Vec3, radius: f32) -> VisualInstance {
        VisualInstance::new()
            .with_position(position)
            .with_scale(radius)
            .with_material(self.color, self.emissive)
    }

    /// Template tinted by the mean color of an image file.
    pub fn from_color_map(path: &Path) -> Result<Self, TemplateError> {
        let image = image::open(path)?.to_rgb32f();
        let pixel_count = (image.width() as usize) * (image.height() as usize);
        if pixel_count == 0 {
            return Err(TemplateError::EmptyImage(path.to_path_buf()));
        }

        let sum = image
            .pixels()
            .fold(Vec3::ZERO, |acc, p| acc + Vec3::new(p[0], p[1], p[2]));
        // image decodes sRGB bytes as-is; convert the mean to linear.
        let mean = sum / pixel_count as f32;
        let linear = Vec3::new(
            srgb_to_linear(mean.x),
            srgb_to_linear(mean.y),
            srgb_to_linear(mean.z),
        );

        Ok(Self {
            color: linear,
            ..Self::default()
        })
    }
}

impl Default for VisualTemplate {
    fn default() -> Self {
        Self {
            color: Vec3::new(0.35, 0.55, 1.0),
            emissive: 0.35,
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Where the template comes from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TemplateSource {
    /// Built-in material, ready immediately.
    #[default]
    Builtin,
    /// Image file whose mean color tints the built-in material.
    ColorMap(PathBuf),
}

/// Load state of a [`TemplateSlot`].
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateState {
    Pending,
    Ready(Arc<VisualTemplate>),
    Failed(String),
}

#[derive(Debug)]
struct SlotInner {
    state: Mutex<TemplateState>,
    changed: Condvar,
}

/// Shareable readiness handle for the visual template.
///
/// Cloning the slot shares the same underlying state. The state moves out of
/// `Pending` at most once.
#[derive(Debug, Clone)]
pub struct TemplateSlot {
    inner: Arc<SlotInner>,
}

impl TemplateSlot {
    /// A slot that has not been resolved yet.
    pub fn pending() -> Self {
        Self {
            inner: Arc::new(SlotInner {
                state: Mutex::new(TemplateState::Pending),
                changed: Condvar::new(),
            }),
        }
    }

    /// A slot that is already resolved with `template`.
    pub fn ready(template: VisualTemplate) -> Self {
        let slot = Self::pending();
        slot.fulfill(template);
        slot
    }

    fn lock(&self) -> MutexGuard<'_, TemplateState> {
        // A panic while holding the lock leaves the state itself intact.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn resolve(&self, next: TemplateState) -> bool {
        let mut state = self.lock();
        if *state != TemplateState::Pending {
            return false;
        }
        *state = next;
        self.inner.changed.notify_all();
        true
    }

    /// Publish the template. Returns `false` if the slot was already resolved.
    pub fn fulfill(&self, template: VisualTemplate) -> bool {
        self.resolve(TemplateState::Ready(Arc::new(template)))
    }

    /// Mark loading as failed. Returns `false` if the slot was already resolved.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.resolve(TemplateState::Failed(reason.into()))
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> TemplateState {
        self.lock().clone()
    }

    /// The template, if it has been published.
    pub fn get(&self) -> Option<Arc<VisualTemplate>> {
        match &*self.lock() {
            TemplateState::Ready(template) => Some(template.clone()),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.lock(), TemplateState::Ready(_))
    }

    /// Block until the slot leaves `Pending` and return the final state.
    pub fn wait(&self) -> TemplateState {
        let mut state = self.lock();
        while *state == TemplateState::Pending {
            state = self
                .inner
                .changed
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        state.clone()
    }

    /// Like [`TemplateSlot::wait`], but gives up after `timeout` and returns
    /// whatever state the slot is in then, possibly still `Pending`.
    pub fn wait_timeout(&self, timeout: Duration) -> TemplateState {
        let state = self.lock();
        let (state, _) = self
            .inner
            .changed
            .wait_timeout_while(state, timeout, |state| *state == TemplateState::Pending)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.clone()
    }
}

/// Resolves a [`TemplateSource`] into a [`TemplateSlot`].
pub struct TemplateLoader;

impl TemplateLoader {
    /// Start loading `source`. Built-in templates resolve before this returns;
    /// files are read on a background thread.
    pub fn spawn(source: TemplateSource) -> TemplateSlot {
        match source {
            TemplateSource::Builtin => TemplateSlot::ready(VisualTemplate::default()),
            TemplateSource::ColorMap(path) => {
                let slot = TemplateSlot::pending();
                let publisher = slot.clone();
                let spawned = thread::Builder::new()
                    .name("template-loader".into())
                    .spawn(move || Self::load_into(&path, &publisher));
                if let Err(e) = spawned {
                    log::error!("could not start template loader: {}", e);
                    slot.fail(e.to_string());
                }
                slot
            }
        }
    }

    fn load_into(path: &Path, slot: &TemplateSlot) {
        match VisualTemplate::from_color_map(path) {
            Ok(template) => {
                log::info!("loaded template color map {}", path.display());
                slot.fulfill(template);
            }
            Err(e) => {
                log::error!("{}", e);
                slot.fail(e.to_string());
            }
        }
    }
}
