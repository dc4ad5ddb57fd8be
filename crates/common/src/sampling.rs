use glam::{Quat, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::TAU;

/// Seedable random source for spawn-time sampling.
///
/// Every simulation owns its own sampler so runs are reproducible from a seed.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: SmallRng,
}

impl Sampler {
    /// Deterministic sampler for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Sampler seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Normal distribution sample. A zero or invalid deviation yields `mean`.
    pub fn gaussian(&mut self, mean: f32, std_dev: f32) -> f32 {
        if std_dev <= 0.0 {
            return mean;
        }
        match Normal::new(mean, std_dev) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => mean,
        }
    }

    /// Uniform sample in `[low, high)`. Collapses to `low` for an empty range.
    pub fn uniform(&mut self, low: f32, high: f32) -> f32 {
        if high > low {
            self.rng.gen_range(low..high)
        } else {
            low
        }
    }

    /// Uniform sample in `[low, high]`.
    pub fn uniform_inclusive(&mut self, low: f32, high: f32) -> f32 {
        if high > low {
            self.rng.gen_range(low..=high)
        } else {
            low
        }
    }

    /// Independent per-axis Gaussian jitter around `center`.
    pub fn jitter(&mut self, center: Vec3, deviation: Vec3) -> Vec3 {
        center
            + Vec3::new(
                self.gaussian(0.0, deviation.x),
                self.gaussian(0.0, deviation.y),
                self.gaussian(0.0, deviation.z),
            )
    }

    /// Unit direction inside a cone around `axis`.
    ///
    /// The direction is tilted by a polar angle in `[0, max_angle)` about the
    /// fixed `perpendicular`, then swung by an azimuth in `[0, tau)` about
    /// `axis`. `perpendicular` is not re-derived per sample. Both inputs must
    /// be unit length.
    pub fn cone_direction(&mut self, axis: Vec3, perpendicular: Vec3, max_angle: f32) -> Vec3 {
        let polar = self.uniform(0.0, max_angle);
        let azimuth = self.uniform(0.0, TAU);
        let rotation =
            Quat::from_axis_angle(axis, azimuth) * Quat::from_axis_angle(perpendicular, polar);
        (rotation * axis).normalize()
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Sampler::seeded(7);
        let mut b = Sampler::seeded(7);
        for _ in 0..32 {
            assert_eq!(a.gaussian(1.0, 0.5), b.gaussian(1.0, 0.5));
            assert_eq!(a.uniform(0.0, 3.0), b.uniform(0.0, 3.0));
        }
    }

    #[test]
    fn zero_deviation_gaussian_is_mean() {
        let mut s = Sampler::seeded(1);
        assert_eq!(s.gaussian(4.0, 0.0), 4.0);
        assert_eq!(s.gaussian(4.0, -1.0), 4.0);
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut s = Sampler::seeded(3);
        for _ in 0..1000 {
            let v = s.uniform(-2.0, 5.0);
            assert!((-2.0..5.0).contains(&v));
            let w = s.uniform_inclusive(0.9, 1.1);
            assert!((0.9..=1.1).contains(&w));
        }
    }

    #[test]
    fn empty_ranges_collapse() {
        let mut s = Sampler::seeded(3);
        assert_eq!(s.uniform(1.0, 1.0), 1.0);
        assert_eq!(s.uniform_inclusive(2.0, 2.0), 2.0);
        assert_eq!(s.uniform(0.0, -1.0), 0.0);
    }

    #[test]
    fn jitter_without_deviation_is_exact() {
        let mut s = Sampler::seeded(9);
        let c = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(s.jitter(c, Vec3::ZERO), c);
    }

    #[test]
    fn cone_direction_within_angle() {
        let mut s = Sampler::seeded(11);
        let axis = Vec3::Y;
        let perpendicular = Vec3::X;
        let max_angle = 0.4;
        for _ in 0..500 {
            let d = s.cone_direction(axis, perpendicular, max_angle);
            assert!((d.length() - 1.0).abs() < 1e-4);
            assert!(d.angle_between(axis) <= max_angle + 1e-3);
        }
    }

    #[test]
    fn zero_cone_angle_is_axis() {
        let mut s = Sampler::seeded(5);
        let d = s.cone_direction(Vec3::Y, Vec3::Z, 0.0);
        assert!((d - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn cone_spreads_around_axis() {
        let mut s = Sampler::seeded(21);
        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        let mut min_z = f32::MAX;
        let mut max_z = f32::MIN;
        for _ in 0..500 {
            let d = s.cone_direction(Vec3::Y, Vec3::X, 0.5);
            min_x = min_x.min(d.x);
            max_x = max_x.max(d.x);
            min_z = min_z.min(d.z);
            max_z = max_z.max(d.z);
        }
        assert!(min_x < -0.1 && max_x > 0.1);
        assert!(min_z < -0.1 && max_z > 0.1);
    }
}
