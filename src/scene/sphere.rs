//! Wavy sphere surface: welded lat/lon tessellation plus its wave field.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use crate::params::{lerp_rgb, SphereParams, WaveParams};
use crate::waves::{WaveField, WaveMotion};

/// Sphere mesh with one oscillator per welded vertex.
///
/// Normals and colors are fixed at creation; only the positions in the
/// wave field move. Normals stay the rest-pose radial directions even
/// while vertices are displaced.
pub struct SphereSurface {
    pub field: WaveField,
    normals: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl SphereSurface {
    pub fn new<R: Rng>(params: &SphereParams, waves: &WaveParams, rng: &mut R) -> Self {
        let (bases, indices) = tessellate(
            params.radius,
            params.width_segments,
            params.height_segments,
        );

        let normals = bases
            .iter()
            .map(|base| (*base / params.radius).to_array())
            .collect();

        // Two-stop gradient along the vertical axis, top color at +y
        let colors = bases
            .iter()
            .map(|base| {
                let t = (base.y / params.radius + 1.0) * 0.5;
                lerp_rgb(params.color_bottom, params.color_top, t)
            })
            .collect();

        let field = WaveField::new(bases, WaveMotion::SphereAxis, waves, rng);

        Self {
            field,
            normals,
            colors,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.field.len()
    }

    /// Rest-pose unit normals, parallel to the wave field
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Per-vertex gradient colors, parallel to the wave field
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Triangle list indices into the wave field positions
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// Generate a lat/lon sphere with shared pole and seam vertices, so
/// every surface point owns exactly one oscillator.
fn tessellate(radius: f32, width_segments: u32, height_segments: u32) -> (Vec<Vec3>, Vec<u32>) {
    let w = width_segments;
    let h = height_segments;

    let mut vertices = Vec::with_capacity(((h - 1) * w + 2) as usize);
    vertices.push(Vec3::new(0.0, radius, 0.0));
    for iy in 1..h {
        let theta = iy as f32 * PI / h as f32;
        for ix in 0..w {
            let phi = ix as f32 * TAU / w as f32;
            vertices.push(Vec3::new(
                radius * theta.sin() * phi.cos(),
                radius * theta.cos(),
                radius * theta.sin() * phi.sin(),
            ));
        }
    }
    vertices.push(Vec3::new(0.0, -radius, 0.0));

    // Ring vertex lookup with seam wrap; ring 1 starts after the pole
    let ring = |iy: u32, ix: u32| 1 + (iy - 1) * w + (ix % w);

    let mut indices = Vec::with_capacity((6 * w * (h - 1)) as usize);

    for ix in 0..w {
        indices.extend_from_slice(&[0, ring(1, ix + 1), ring(1, ix)]);
    }

    for iy in 1..h - 1 {
        for ix in 0..w {
            let a = ring(iy, ix);
            let b = ring(iy, ix + 1);
            let c = ring(iy + 1, ix);
            let d = ring(iy + 1, ix + 1);
            indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    let south = (h - 1) * w + 1;
    for ix in 0..w {
        indices.extend_from_slice(&[south, ring(h - 1, ix), ring(h - 1, ix + 1)]);
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn default_sphere() -> SphereSurface {
        let mut rng = StdRng::seed_from_u64(3);
        SphereSurface::new(&SphereParams::default(), &WaveParams::default(), &mut rng)
    }

    #[test]
    fn test_welded_vertex_count() {
        let sphere = default_sphere();
        // (h - 1) rings of w vertices plus the two poles
        assert_eq!(sphere.vertex_count(), 59 * 60 + 2);
        assert_eq!(sphere.normals().len(), sphere.vertex_count());
        assert_eq!(sphere.colors().len(), sphere.vertex_count());
    }

    #[test]
    fn test_index_count_and_bounds() {
        let sphere = default_sphere();
        assert_eq!(sphere.indices().len(), 6 * 60 * 59);
        assert_eq!(sphere.indices().len() % 3, 0);

        let count = sphere.vertex_count() as u32;
        assert!(sphere.indices().iter().all(|&i| i < count));
    }

    #[test]
    fn test_bases_on_sphere_with_radial_normals() {
        let sphere = default_sphere();
        for (wave, normal) in sphere.field.waves().iter().zip(sphere.normals()) {
            assert!((wave.base.length() - 10.0).abs() < 1e-4);
            let n = Vec3::from_array(*normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((n * 10.0 - wave.base).length() < 1e-4);
        }
    }

    #[test]
    fn test_gradient_colors_follow_height() {
        let params = SphereParams::default();
        let sphere = default_sphere();

        // north pole is generated first, south pole last
        let first = sphere.colors()[0];
        let last = sphere.colors()[sphere.colors().len() - 1];
        for axis in 0..3 {
            assert!((first[axis] - params.color_top[axis]).abs() < 1e-5);
            assert!((last[axis] - params.color_bottom[axis]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_only_x_moves_when_advanced() {
        let mut sphere = default_sphere();
        let bases: Vec<_> = sphere.field.waves().iter().map(|w| w.base).collect();

        for _ in 0..10 {
            sphere.field.advance();
        }

        for (base, position) in bases.iter().zip(sphere.field.positions()) {
            assert_eq!(position[1], base.y);
            assert_eq!(position[2], base.z);
        }
    }
}
