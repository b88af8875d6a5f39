//! Random spawn helpers.
//!
//! [`SpawnContext`] wraps a small RNG with the few distributions the body
//! factory needs. Seed it explicitly for reproducible layouts.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// RNG plus spawn-shaped sampling helpers.
pub struct SpawnContext {
    /// Number of samples handed out so far via [`SpawnContext::next_index`].
    index: u32,
    rng: SmallRng,
}

impl SpawnContext {
    /// Deterministic context for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            index: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Context seeded from the wall clock, different on every run.
    pub fn from_time() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(seed)
    }

    /// Either [`SpawnContext::seeded`] or [`SpawnContext::from_time`].
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_time(),
        }
    }

    /// Returns the current spawn index and advances it.
    pub fn next_index(&mut self) -> u32 {
        let index = self.index;
        self.index += 1;
        index
    }

    /// How many indices have been handed out.
    pub fn spawned(&self) -> u32 {
        self.index
    }

    /// Random f32 in `[min, max)`. An empty range yields `min`.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if min < max {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Uniform point inside an axis-aligned cube with the given center and
    /// side length. Each axis lies in `[center - side/2, center + side/2)`.
    /// A cube with no extent yields `center`.
    pub fn random_in_cube(&mut self, center: Vec3, side: f32) -> Vec3 {
        let half = side.max(0.0) * 0.5;
        center
            + Vec3::new(
                self.random_range(-half, half),
                self.random_range(-half, half),
                self.random_range(-half, half),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_in_cube_bounds() {
        let mut ctx = SpawnContext::seeded(7);
        let center = Vec3::new(0.0, 3.0, 0.0);
        for _ in 0..1000 {
            let p = ctx.random_in_cube(center, 6.0);
            assert!((-3.0..3.0).contains(&p.x));
            assert!((0.0..6.0).contains(&p.y));
            assert!((-3.0..3.0).contains(&p.z));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SpawnContext::seeded(99);
        let mut b = SpawnContext::seeded(99);
        for _ in 0..10 {
            assert_eq!(a.random_range(0.1, 0.35), b.random_range(0.1, 0.35));
        }
    }

    #[test]
    fn test_empty_range_yields_min() {
        let mut ctx = SpawnContext::seeded(3);
        assert_eq!(ctx.random_range(0.2, 0.2), 0.2);
        assert_eq!(ctx.random_range(0.5, 0.1), 0.5);
    }

    #[test]
    fn test_zero_side_cube_is_center() {
        let mut ctx = SpawnContext::seeded(3);
        let center = Vec3::new(1.0, -2.0, 0.5);
        assert_eq!(ctx.random_in_cube(center, 0.0), center);
        assert_eq!(ctx.random_in_cube(center, -4.0), center);
    }

    #[test]
    fn test_next_index_counts_up() {
        let mut ctx = SpawnContext::new(Some(1));
        assert_eq!(ctx.next_index(), 0);
        assert_eq!(ctx.next_index(), 1);
        assert_eq!(ctx.spawned(), 2);
    }
}
