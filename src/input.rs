//! Pointer input.
//!
//! [`SharedPointer`] is the one piece of state shared between the input side
//! and the frame loop: a normalized `[-1, 1]²` coordinate pair where the last
//! write wins. [`PointerInput`] turns raw winit cursor and touch events into
//! writes on it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{TouchPhase, WindowEvent};

#[derive(Debug, Default)]
struct PointerCells {
    x: AtomicU32,
    y: AtomicU32,
}

/// Normalized pointer position, cheap to clone and share.
///
/// Each axis is a plain overwrite; a reader may see one axis from the
/// previous write, which is at most a frame stale.
#[derive(Debug, Clone, Default)]
pub struct SharedPointer {
    cells: Arc<PointerCells>,
}

impl SharedPointer {
    /// Pointer at the center of the window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the pointer, clamped to `[-1, 1]` on each axis.
    pub fn set(&self, ndc: Vec2) {
        let clamped = ndc.clamp(Vec2::NEG_ONE, Vec2::ONE);
        self.cells.x.store(clamped.x.to_bits(), Ordering::Relaxed);
        self.cells.y.store(clamped.y.to_bits(), Ordering::Relaxed);
    }

    /// Read the latest pointer position.
    pub fn snapshot(&self) -> Vec2 {
        Vec2::new(
            f32::from_bits(self.cells.x.load(Ordering::Relaxed)),
            f32::from_bits(self.cells.y.load(Ordering::Relaxed)),
        )
    }
}

/// Map a window-pixel position to normalized device coordinates.
///
/// Origin is the window center, x grows right, y grows up.
pub fn to_ndc(position: PhysicalPosition<f64>, window_size: (u32, u32)) -> Option<Vec2> {
    let (w, h) = window_size;
    if w == 0 || h == 0 {
        return None;
    }
    Some(Vec2::new(
        (position.x as f32 / w as f32) * 2.0 - 1.0,
        1.0 - (position.y as f32 / h as f32) * 2.0,
    ))
}

/// Feeds window events into a [`SharedPointer`].
#[derive(Debug)]
pub struct PointerInput {
    pointer: SharedPointer,
    window_size: (u32, u32),
}

impl PointerInput {
    pub fn new(pointer: SharedPointer) -> Self {
        Self {
            pointer,
            window_size: (800, 600),
        }
    }

    /// Update window size for NDC calculations.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Process a winit window event. Returns `true` if the pointer moved.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        let position = match event {
            WindowEvent::CursorMoved { position, .. } => *position,
            WindowEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started | TouchPhase::Moved => touch.location,
                TouchPhase::Ended | TouchPhase::Cancelled => return false,
            },
            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
                return false;
            }
            _ => return false,
        };

        match to_ndc(position, self.window_size) {
            Some(ndc) => {
                self.pointer.set(ndc);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    #[test]
    fn test_to_ndc_center_and_corners() {
        let size = (800, 600);
        let center = to_ndc(PhysicalPosition::new(400.0, 300.0), size).unwrap();
        assert!(center.length() < 1e-6);

        let top_left = to_ndc(PhysicalPosition::new(0.0, 0.0), size).unwrap();
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));

        let bottom_right = to_ndc(PhysicalPosition::new(800.0, 600.0), size).unwrap();
        assert_eq!(bottom_right, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_zero_sized_window_is_ignored() {
        assert!(to_ndc(PhysicalPosition::new(1.0, 1.0), (0, 600)).is_none());
    }

    #[test]
    fn test_shared_pointer_last_write_wins() {
        let pointer = SharedPointer::new();
        assert_eq!(pointer.snapshot(), Vec2::ZERO);

        let writer = pointer.clone();
        writer.set(Vec2::new(0.4, -0.6));
        writer.set(Vec2::new(0.1, 0.2));

        assert_eq!(pointer.snapshot(), Vec2::new(0.1, 0.2));
    }

    #[test]
    fn test_shared_pointer_clamps() {
        let pointer = SharedPointer::new();
        pointer.set(Vec2::new(3.0, -7.0));
        assert_eq!(pointer.snapshot(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_resize_changes_mapping() {
        let pointer = SharedPointer::new();
        let mut input = PointerInput::new(pointer.clone());

        assert!(!input.handle_event(&WindowEvent::Resized(PhysicalSize::new(200, 100))));
        assert_eq!(input.window_size, (200, 100));
    }
}
