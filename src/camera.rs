//! Fixed look-at camera for the scene.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Camera rest position, off to the side looking back at the origin
const EYE: Vec3 = Vec3::new(-70.0, 0.0, 0.0);
const TARGET: Vec3 = Vec3::ZERO;

/// Perspective camera; only the aspect ratio changes after creation,
/// driven by window resize events.
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    fov_degrees: f32,
    near_plane: f32,
    far_plane: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            eye: EYE,
            target: TARGET,
            fov_degrees: config.fov_degrees,
            near_plane: config.near_plane,
            far_plane: config.far_plane,
            aspect: config.aspect_ratio(),
        }
    }

    /// Track a new output surface size.
    ///
    /// Idempotent; callers pass every resize event through without
    /// deduplication.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Combined view-projection matrix for the current aspect ratio
    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near_plane,
            self.far_plane,
        );
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_aspect_is_exact_and_idempotent() {
        let mut camera = Camera::new(&RenderConfig::default());

        camera.set_aspect(1920, 1080);
        let first = camera.aspect();
        assert_eq!(first, 1920.0 / 1080.0);

        camera.set_aspect(1920, 1080);
        assert_eq!(camera.aspect(), first);
    }

    #[test]
    fn test_view_proj_is_valid() {
        let camera = Camera::new(&RenderConfig::default());
        let view_proj = camera.view_proj();

        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(view_proj.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_aspect_follows_resize() {
        let config = RenderConfig {
            width: 800,
            height: 600,
            ..Default::default()
        };
        let mut camera = Camera::new(&config);
        assert_eq!(camera.aspect(), 800.0 / 600.0);

        let before = camera.view_proj();
        camera.set_aspect(640, 480);
        assert_eq!(camera.aspect(), 640.0 / 480.0);
        // same ratio, so the projection is unchanged
        assert_eq!(camera.view_proj(), before);
    }
}
