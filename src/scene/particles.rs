//! Free-floating particle field beyond the sphere.

use glam::Vec3;
use rand::Rng;

use crate::params::{lerp_rgb, ParticleParams, WaveParams};
use crate::waves::{WaveField, WaveMotion};

/// Point cloud with one oscillator per particle and a color gradient
/// swept across the collection by index.
pub struct ParticleCloud {
    pub field: WaveField,
    colors: Vec<[f32; 3]>,
}

impl ParticleCloud {
    pub fn new<R: Rng>(params: &ParticleParams, waves: &WaveParams, rng: &mut R) -> Self {
        let mut bases = Vec::with_capacity(params.count);
        let mut colors = Vec::with_capacity(params.count);

        for i in 0..params.count {
            bases.push(Vec3::new(
                params.x_min + rng.gen::<f32>() * params.x_span,
                (rng.gen::<f32>() - 0.5) * params.spread,
                (rng.gen::<f32>() - 0.5) * params.spread,
            ));
            colors.push(lerp_rgb(
                params.color_start,
                params.color_end,
                i as f32 / params.count as f32,
            ));
        }

        let field = WaveField::new(bases, WaveMotion::AllAxes, waves, rng);

        Self { field, colors }
    }

    pub fn count(&self) -> usize {
        self.field.len()
    }

    /// Per-particle colors, parallel to the wave field
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn default_cloud() -> ParticleCloud {
        let mut rng = StdRng::seed_from_u64(11);
        ParticleCloud::new(&ParticleParams::default(), &WaveParams::default(), &mut rng)
    }

    #[test]
    fn test_count_and_placement_ranges() {
        let cloud = default_cloud();
        assert_eq!(cloud.count(), 10_000);

        for wave in cloud.field.waves() {
            assert!(wave.base.x >= 200.0 && wave.base.x < 1500.0);
            assert!(wave.base.y >= -400.0 && wave.base.y < 400.0);
            assert!(wave.base.z >= -400.0 && wave.base.z < 400.0);
        }
    }

    #[test]
    fn test_color_gradient_endpoints() {
        let params = ParticleParams::default();
        let cloud = default_cloud();

        assert_eq!(cloud.colors()[0], params.color_start);

        // last color is one step short of the end stop
        let last = cloud.colors()[cloud.count() - 1];
        let expected = lerp_rgb(params.color_start, params.color_end, 0.9999);
        for axis in 0..3 {
            assert!((last[axis] - expected[axis]).abs() < 1e-4);
        }
    }

    #[test]
    fn test_all_axes_displace_together() {
        let mut cloud = default_cloud();
        cloud.field.advance();

        for (wave, position) in cloud.field.waves().iter().zip(cloud.field.positions()) {
            let dx = position[0] - wave.base.x;
            let dy = position[1] - wave.base.y;
            let dz = position[2] - wave.base.z;
            assert_eq!(dx, dy);
            assert_eq!(dx, dz);
        }
    }
}
