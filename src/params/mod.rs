//! Scene and render configuration with documented defaults.

/// Convert a `0xRRGGBB` hex value to normalized sRGB components
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Linear interpolation between two colors
pub fn lerp_rgb(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Perspective projection and output surface configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clip plane distance
    pub near_plane: f32,

    /// Far clip plane distance
    pub far_plane: f32,

    /// Output surface width (pixels)
    pub width: u32,

    /// Output surface height (pixels)
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near_plane: 0.1,
            far_plane: 1500.0,
            width: 1280,
            height: 720,
        }
    }
}

impl RenderConfig {
    /// Width / height ratio for the projection matrix
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Oscillator sampling ranges shared by both wave fields
#[derive(Debug, Clone)]
pub struct WaveParams {
    /// Minimum displacement amplitude
    pub amplitude_min: f32,

    /// Width of the amplitude range above the minimum
    pub amplitude_range: f32,

    /// Minimum phase increment per frame (radians)
    pub speed_min: f32,

    /// Width of the speed range above the minimum
    pub speed_range: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            amplitude_min: 1.5,
            amplitude_range: 3.7,
            speed_min: 0.01,
            speed_range: 0.02,
        }
    }
}

/// Wavy sphere mesh configuration
#[derive(Debug, Clone)]
pub struct SphereParams {
    /// Sphere radius
    pub radius: f32,

    /// Longitude segments (must be >= 3)
    pub width_segments: u32,

    /// Latitude segments (must be >= 2)
    pub height_segments: u32,

    /// Gradient color at the north pole
    pub color_top: [f32; 3],

    /// Gradient color at the south pole
    pub color_bottom: [f32; 3],
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 10.0,
            width_segments: 60,
            height_segments: 60,
            color_top: rgb(0xfbc2eb),
            color_bottom: rgb(0xa18cd1),
        }
    }
}

impl SphereParams {
    /// Validate tessellation limits
    pub fn validate(&self) -> Result<(), String> {
        if self.width_segments < 3 {
            return Err(format!(
                "sphere width segments must be >= 3, got {}",
                self.width_segments
            ));
        }
        if self.height_segments < 2 {
            return Err(format!(
                "sphere height segments must be >= 2, got {}",
                self.height_segments
            ));
        }
        if self.radius <= 0.0 {
            return Err(format!("sphere radius must be > 0, got {}", self.radius));
        }
        Ok(())
    }
}

/// Free-floating particle field configuration
#[derive(Debug, Clone)]
pub struct ParticleParams {
    /// Number of particles, fixed at startup
    pub count: usize,

    /// Lower bound of the x placement range
    pub x_min: f32,

    /// Width of the x placement range
    pub x_span: f32,

    /// Total spread of the y and z placement ranges, centered on zero
    pub spread: f32,

    /// Gradient color for the first particle
    pub color_start: [f32; 3],

    /// Gradient color approached by the last particle
    pub color_end: [f32; 3],
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: 10_000,
            x_min: 200.0,
            x_span: 1300.0,
            spread: 800.0,
            color_start: rgb(0xffecd2),
            color_end: rgb(0xff9a9e),
        }
    }
}

/// Top-level scene configuration
#[derive(Debug, Clone, Default)]
pub struct SceneParams {
    pub sphere: SphereParams,
    pub particles: ParticleParams,
    pub waves: WaveParams,
    pub background: Background,
}

impl SceneParams {
    pub fn validate(&self) -> Result<(), String> {
        self.sphere.validate()
    }
}

/// Canvas clear color
#[derive(Debug, Clone)]
pub struct Background {
    pub color: [f32; 3],
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: rgb(0xfdcbf1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_conversion() {
        assert_eq!(rgb(0x000000), [0.0, 0.0, 0.0]);
        assert_eq!(rgb(0xffffff), [1.0, 1.0, 1.0]);
        let c = rgb(0xff9a9e);
        assert_eq!(c[0], 1.0);
        assert!((c[1] - 154.0 / 255.0).abs() < 1e-6);
        assert!((c[2] - 158.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_lerp_rgb_endpoints() {
        let a = [0.1, 0.2, 0.3];
        let b = [0.9, 0.8, 0.7];
        assert_eq!(lerp_rgb(a, b, 0.0), a);
        assert_eq!(lerp_rgb(a, b, 1.0), b);
        let mid = lerp_rgb(a, b, 0.5);
        assert!((mid[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_aspect_ratio() {
        let config = RenderConfig {
            width: 1280,
            height: 720,
            ..Default::default()
        };
        assert!((config.aspect_ratio() - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_params_validation() {
        assert!(SphereParams::default().validate().is_ok());

        let mut params = SphereParams::default();
        params.width_segments = 2;
        assert!(params.validate().is_err());

        let mut params = SphereParams::default();
        params.height_segments = 1;
        assert!(params.validate().is_err());

        let mut params = SphereParams::default();
        params.radius = 0.0;
        assert!(params.validate().is_err());
    }
}
