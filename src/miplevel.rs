//! A single six-face floating point cube image.

use crate::direction::{remap_uv, texel_coord_to_vector, texel_pixel_solid_angle, vector_to_texel, NUM_FACES};
use crate::geometry::Vec3;

/// One level of a cubemap mip pyramid: six square face buffers sharing the
/// same edge length and channel count.
///
/// Invariants: all six face buffers have identical length
/// `size * size * samples_per_pixel`; `samples_per_pixel >= 3`.
#[derive(Debug, Clone)]
pub struct MipLevel {
    size: u32,
    samples_per_pixel: u32,
    faces: [Vec<f32>; NUM_FACES],
}

impl MipLevel {
    /// Allocate a zero-filled level of the given edge length and channel
    /// count (3 = RGB, 4 = RGBA).
    #[must_use]
    pub fn new(size: u32, samples_per_pixel: u32) -> Self {
        debug_assert!(samples_per_pixel >= 3, "samples_per_pixel must be >= 3");
        let len = (size * size * samples_per_pixel) as usize;
        Self {
            size,
            samples_per_pixel,
            faces: std::array::from_fn(|_| vec![0.0; len]),
        }
    }

    /// Build a normaliser cubemap: a 4-channel level whose RGB holds the
    /// unit direction of each texel and whose alpha holds that texel's
    /// solid angle, under the given `fixup` convention.
    #[must_use]
    pub fn build_normalizer(size: u32, fixup: bool) -> Self {
        let mut level = Self::new(size, 4);
        for face in 0..NUM_FACES {
            for v in 0..size {
                for u in 0..size {
                    let dir = texel_coord_to_vector(face, u as f32, v as f32, size, fixup);
                    let solid_angle = {
                        let (ru, rv) = remap_uv(u as f32, v as f32, size, fixup);
                        texel_pixel_solid_angle(ru, rv, size)
                    };
                    let idx = ((v * size + u) * 4) as usize;
                    let buf = &mut level.faces[face];
                    buf[idx] = dir.x;
                    buf[idx + 1] = dir.y;
                    buf[idx + 2] = dir.z;
                    buf[idx + 3] = solid_angle as f32;
                }
            }
        }
        level
    }

    /// Edge length in texels.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Channels per texel (3 or 4).
    #[must_use]
    pub const fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    /// Raw per-face buffers, row-major with stride `size * samples_per_pixel`.
    #[must_use]
    pub fn faces(&self) -> &[Vec<f32>; NUM_FACES] {
        &self.faces
    }

    /// Mutable raw per-face buffers.
    pub fn faces_mut(&mut self) -> &mut [Vec<f32>; NUM_FACES] {
        &mut self.faces
    }

    /// A single face's texel buffer.
    #[must_use]
    pub fn face(&self, face: usize) -> &[f32] {
        &self.faces[face]
    }

    /// Mutable access to a single face's texel buffer.
    pub fn face_mut(&mut self, face: usize) -> &mut [f32] {
        &mut self.faces[face]
    }

    /// Nearest-neighbour sample by unit direction. Only RGB is returned;
    /// alpha (if present) is ignored.
    #[must_use]
    pub fn sample(&self, direction: Vec3) -> Vec3 {
        let (face, u, v) = vector_to_texel(direction, self.size);
        self.sample_nearest(face, u, v)
    }

    /// Nearest-neighbour sample at an explicit `(face, u, v)` pixel-space
    /// coordinate (as produced by [`crate::direction::vector_to_texel`]).
    #[must_use]
    pub fn sample_nearest(&self, face: usize, u: f32, v: f32) -> Vec3 {
        let max_idx = self.size as f32 - 1.0;
        let i = u.round().clamp(0.0, max_idx) as u32;
        let j = v.round().clamp(0.0, max_idx) as u32;
        let spp = self.samples_per_pixel as usize;
        let idx = ((j * self.size + i) as usize) * spp;
        let data = &self.faces[face];
        Vec3::new(data[idx], data[idx + 1], data[idx + 2])
    }

    /// Overwrite every texel with the given RGB(A) colour. Only the first
    /// `samples_per_pixel` components of `colour` are written.
    pub fn fill(&mut self, colour: [f32; 4]) {
        let spp = self.samples_per_pixel as usize;
        for face in &mut self.faces {
            for texel in face.chunks_exact_mut(spp) {
                texel.copy_from_slice(&colour[..spp]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_writes_every_texel() {
        let mut level = MipLevel::new(4, 3);
        level.fill([0.5, 0.25, 0.75, 1.0]);
        for face in level.faces() {
            for texel in face.chunks_exact(3) {
                assert_eq!(texel, [0.5, 0.25, 0.75]);
            }
        }
    }

    #[test]
    fn sample_reads_back_stored_texel() {
        let mut level = MipLevel::new(8, 3);
        // +X face is face 0; place a distinct colour at its centre texel.
        let idx = ((4 * 8 + 4) * 3) as usize;
        level.face_mut(0)[idx..idx + 3].copy_from_slice(&[1.0, 2.0, 3.0]);
        let sample = level.sample(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(sample, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn normalizer_solid_angles_sum_to_4pi() {
        let level = MipLevel::build_normalizer(16, false);
        let mut sum = 0.0f64;
        for face in level.faces() {
            for texel in face.chunks_exact(4) {
                sum += f64::from(texel[3]);
            }
        }
        let rel_err = (sum - 4.0 * std::f64::consts::PI).abs() / (4.0 * std::f64::consts::PI);
        assert!(rel_err < 1e-3, "rel_err={rel_err}");
    }
}
