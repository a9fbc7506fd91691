//! Per-point oscillator state driving the scene's wave motion.
//!
//! Every animated vertex carries a phase oscillator sampled once at
//! startup; advancing a field increments each phase by its angular
//! speed and recomputes the displaced position handed to the GPU.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::params::WaveParams;

/// A single oscillating point.
///
/// `base`, `amplitude` and `angular_speed` are fixed at creation; only
/// `phase` changes, monotonically, wrapping implicitly through cosine
/// periodicity.
#[derive(Debug, Clone, Copy)]
pub struct Wave {
    pub base: Vec3,
    pub phase: f32,
    pub amplitude: f32,
    pub angular_speed: f32,
}

impl Wave {
    /// Sample oscillator values for a base point from the configured ranges
    pub fn sample<R: Rng>(base: Vec3, params: &WaveParams, rng: &mut R) -> Self {
        Self {
            base,
            phase: rng.gen::<f32>() * TAU,
            amplitude: params.amplitude_min + rng.gen::<f32>() * params.amplitude_range,
            angular_speed: params.speed_min + rng.gen::<f32>() * params.speed_range,
        }
    }

    /// Cosine displacement for the current phase
    pub fn offset(&self) -> f32 {
        self.phase.cos() * self.amplitude
    }
}

/// How a wave displaces its point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveMotion {
    /// Only the x axis oscillates; y and z stay at the base position.
    SphereAxis,
    /// All three axes share the same cosine offset, so a point slides
    /// along a fixed diagonal rather than orbiting.
    AllAxes,
}

/// A fixed collection of waves plus the displaced positions uploaded to
/// the renderer each frame.
pub struct WaveField {
    motion: WaveMotion,
    waves: Vec<Wave>,
    positions: Vec<[f32; 3]>,
}

impl WaveField {
    /// Build a field by sampling one oscillator per base point.
    ///
    /// Display positions start at the base positions; the first call to
    /// [`advance`](Self::advance) displaces them.
    pub fn new<R: Rng>(
        bases: impl IntoIterator<Item = Vec3>,
        motion: WaveMotion,
        params: &WaveParams,
        rng: &mut R,
    ) -> Self {
        let waves: Vec<Wave> = bases
            .into_iter()
            .map(|base| Wave::sample(base, params, rng))
            .collect();
        let positions = waves.iter().map(|wave| wave.base.to_array()).collect();
        Self {
            motion,
            waves,
            positions,
        }
    }

    /// Build a field from fully specified waves, bypassing sampling.
    pub fn from_waves(waves: Vec<Wave>, motion: WaveMotion) -> Self {
        let positions = waves.iter().map(|wave| wave.base.to_array()).collect();
        Self {
            motion,
            waves,
            positions,
        }
    }

    /// Advance every oscillator by one frame and recompute the
    /// displaced positions.
    pub fn advance(&mut self) {
        for (wave, position) in self.waves.iter_mut().zip(&mut self.positions) {
            wave.phase += wave.angular_speed;
            let offset = wave.offset();
            *position = match self.motion {
                WaveMotion::SphereAxis => [wave.base.x + offset, wave.base.y, wave.base.z],
                WaveMotion::AllAxes => [
                    wave.base.x + offset,
                    wave.base.y + offset,
                    wave.base.z + offset,
                ],
            };
        }
    }

    pub fn motion(&self) -> WaveMotion {
        self.motion
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Displaced positions for upload, parallel to [`waves`](Self::waves)
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn single_field(wave: Wave, motion: WaveMotion) -> WaveField {
        WaveField::from_waves(vec![wave], motion)
    }

    #[test]
    fn test_phase_accumulates_unwrapped() {
        let mut field = single_field(
            Wave {
                base: Vec3::ZERO,
                phase: 1.25,
                amplitude: 2.0,
                angular_speed: 0.03,
            },
            WaveMotion::AllAxes,
        );

        for _ in 0..500 {
            field.advance();
        }

        let expected = 1.25 + 500.0 * 0.03;
        assert!((field.waves()[0].phase - expected).abs() < 1e-3);
    }

    #[test]
    fn test_sphere_axis_leaves_y_and_z_fixed() {
        let mut field = single_field(
            Wave {
                base: Vec3::new(3.0, -7.5, 2.25),
                phase: 0.4,
                amplitude: 5.0,
                angular_speed: 0.02,
            },
            WaveMotion::SphereAxis,
        );

        for _ in 0..200 {
            field.advance();
            let [x, y, z] = field.positions()[0];
            assert_ne!(x, 3.0);
            assert_eq!(y, -7.5);
            assert_eq!(z, 2.25);
        }
    }

    #[test]
    fn test_all_axes_share_one_offset() {
        let mut field = single_field(
            Wave {
                base: Vec3::new(12.0, -4.0, 9.0),
                phase: 2.0,
                amplitude: 3.0,
                angular_speed: 0.015,
            },
            WaveMotion::AllAxes,
        );

        for _ in 0..100 {
            field.advance();
            let [x, y, z] = field.positions()[0];
            let wave = &field.waves()[0];
            let dx = x - wave.base.x;
            let dy = y - wave.base.y;
            let dz = z - wave.base.z;
            assert_eq!(dx, dy);
            assert_eq!(dx, dz);
        }
    }

    #[test]
    fn test_sphere_point_after_one_frame() {
        let mut field = single_field(
            Wave {
                base: Vec3::new(10.0, 0.0, 0.0),
                phase: 0.0,
                amplitude: 2.0,
                angular_speed: 0.01,
            },
            WaveMotion::SphereAxis,
        );

        field.advance();

        let wave = &field.waves()[0];
        assert!((wave.phase - 0.01).abs() < 1e-7);

        let [x, y, z] = field.positions()[0];
        assert!((x - (10.0 + 0.01f32.cos() * 2.0)).abs() < 1e-6);
        assert_eq!(y, 0.0);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn test_particle_after_one_frame() {
        let mut field = single_field(
            Wave {
                base: Vec3::new(5.0, 5.0, 5.0),
                phase: 0.0,
                amplitude: 1.0,
                angular_speed: 0.02,
            },
            WaveMotion::AllAxes,
        );

        field.advance();

        let expected = 5.0 + 0.02f32.cos();
        let [x, y, z] = field.positions()[0];
        assert!((x - expected).abs() < 1e-6);
        assert_eq!(x, y);
        assert_eq!(x, z);
    }

    #[test]
    fn test_sampled_values_stay_in_range() {
        let params = WaveParams::default();
        let mut rng = StdRng::seed_from_u64(7);
        let field = WaveField::new(
            (0..10_000).map(|_| Vec3::ZERO),
            WaveMotion::AllAxes,
            &params,
            &mut rng,
        );

        for wave in field.waves() {
            assert!(wave.phase >= 0.0 && wave.phase < TAU);
            assert!(wave.amplitude >= 1.5 && wave.amplitude < 5.2);
            assert!(wave.angular_speed >= 0.01 && wave.angular_speed < 0.03);
        }
    }

    #[test]
    fn test_sampled_means_near_range_midpoints() {
        let params = WaveParams::default();
        let mut rng = StdRng::seed_from_u64(99);
        let field = WaveField::new(
            (0..10_000).map(|_| Vec3::ZERO),
            WaveMotion::AllAxes,
            &params,
            &mut rng,
        );

        let count = field.len() as f32;
        let mean =
            |f: fn(&Wave) -> f32| field.waves().iter().map(f).sum::<f32>() / count;

        assert!((mean(|w| w.phase) - TAU / 2.0).abs() < 0.1);
        assert!((mean(|w| w.amplitude) - 3.35).abs() < 0.05);
        assert!((mean(|w| w.angular_speed) - 0.02).abs() < 0.001);
    }

    #[test]
    fn test_positions_start_at_base() {
        let params = WaveParams::default();
        let mut rng = StdRng::seed_from_u64(1);
        let bases = vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 0.0, 8.0)];
        let field = WaveField::new(bases.clone(), WaveMotion::SphereAxis, &params, &mut rng);

        assert_eq!(field.len(), 2);
        for (base, position) in bases.iter().zip(field.positions()) {
            assert_eq!(base.to_array(), *position);
        }
    }
}
