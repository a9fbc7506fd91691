//! Scene state: the animated sphere and particle field plus the camera.

mod particles;
mod sphere;

// Re-export public types
pub use particles::ParticleCloud;
pub use sphere::SphereSurface;

use rand::Rng;

use crate::camera::Camera;
use crate::params::{RenderConfig, SceneParams};

/// Everything the frame driver mutates and the renderer reads.
///
/// Built once at startup from an injected seedable RNG; points are
/// never added or removed afterwards.
pub struct SceneState {
    pub sphere: SphereSurface,
    pub particles: ParticleCloud,
    pub camera: Camera,
}

impl SceneState {
    pub fn new<R: Rng>(params: &SceneParams, config: &RenderConfig, rng: &mut R) -> Self {
        Self {
            sphere: SphereSurface::new(&params.sphere, &params.waves, rng),
            particles: ParticleCloud::new(&params.particles, &params.waves, rng),
            camera: Camera::new(config),
        }
    }

    /// Advance every oscillator in both fields by one frame.
    ///
    /// Phase increments are per-frame, not time-based, so animation
    /// speed follows the display refresh rate.
    pub fn advance_frame(&mut self) {
        self.sphere.field.advance();
        self.particles.field.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_scene_creation() {
        let mut rng = StdRng::seed_from_u64(42);
        let scene = SceneState::new(&SceneParams::default(), &RenderConfig::default(), &mut rng);

        assert_eq!(scene.sphere.vertex_count(), 59 * 60 + 2);
        assert_eq!(scene.particles.count(), 10_000);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let params = SceneParams::default();
        let config = RenderConfig::default();

        let mut a_rng = StdRng::seed_from_u64(7);
        let mut b_rng = StdRng::seed_from_u64(7);
        let a = SceneState::new(&params, &config, &mut a_rng);
        let b = SceneState::new(&params, &config, &mut b_rng);

        for (wa, wb) in a.sphere.field.waves().iter().zip(b.sphere.field.waves()) {
            assert_eq!(wa.phase, wb.phase);
            assert_eq!(wa.amplitude, wb.amplitude);
            assert_eq!(wa.angular_speed, wb.angular_speed);
        }
    }

    #[test]
    fn test_advance_frame_moves_both_fields() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut scene =
            SceneState::new(&SceneParams::default(), &RenderConfig::default(), &mut rng);

        let sphere_before = scene.sphere.field.positions()[1];
        let particle_before = scene.particles.field.positions()[0];

        scene.advance_frame();

        assert_ne!(scene.sphere.field.positions()[1], sphere_before);
        assert_ne!(scene.particles.field.positions()[0], particle_before);
    }
}
