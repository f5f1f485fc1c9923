//! Precomputed per-level sample tables for the specular pre-filter and
//! background blur integrators.
//!
//! Both caches are rebuilt once per output mip level and then treated as
//! read-only for the duration of that level's integration (spec'd in terms
//! of `numSamples`, `roughnessLinear`/`radius`, and `sourceSize`).

use crate::direction::NUM_FACES;
use crate::geometry::{hammersley, Vec3};

/// One precomputed GGX sample: a tangent-space reflected light direction
/// plus the mip level it should be fetched from.
#[derive(Debug, Clone, Copy)]
pub struct GgxSample {
    /// Reflected light direction in tangent space (normal = +Z).
    pub direction: Vec3,
    /// Precomputed LOD to sample the source cubemap at.
    pub lod: f32,
}

/// The GGX importance-sample set for one (`num_samples`, `roughness_linear`,
/// `source_size`) triple.
#[derive(Debug, Clone)]
pub struct GgxSampleCache {
    samples: Vec<GgxSample>,
    weight_sum: f64,
}

impl GgxSampleCache {
    /// Build the cache per spec: Hammersley sampling of the GGX half-vector
    /// distribution, reflected to a light direction, with a precomputed LOD
    /// derived from the sample's solid angle relative to the source texel's.
    #[must_use]
    pub fn build(num_samples: u32, roughness_linear: f32, source_size: u32, max_level: f32) -> Self {
        let alpha = roughness_linear * roughness_linear;
        let omega_p = 4.0 * std::f64::consts::PI / (6.0 * f64::from(source_size * source_size));

        let mut samples = Vec::with_capacity(num_samples as usize);
        let mut weight_sum = 0.0_f64;

        for i in 0..num_samples {
            let (xi_x, xi_y) = hammersley(i, num_samples);
            let phi = 2.0 * std::f32::consts::PI * xi_x;
            let cos_theta = ((1.0 - xi_y) / (1.0 + (alpha * alpha - 1.0) * xi_y)).sqrt();
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

            let h = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
            let l = 2.0 * h.z * h - Vec3::Z;

            let denom = cos_theta * cos_theta * (alpha * alpha - 1.0) + 1.0;
            let d_ggx = (alpha * alpha) / (std::f32::consts::PI * denom * denom);
            let pdf_h = d_ggx * cos_theta;
            let pdf_l = pdf_h / (4.0 * h.z).max(1e-6);

            let omega_s = 1.0 / (f64::from(num_samples) * f64::from(pdf_l).max(1e-12));
            let lod = if num_samples <= 1 {
                0.0
            } else {
                (0.5 * (omega_s / omega_p).log2()) as f32
            }
            .clamp(0.0, max_level);

            weight_sum += f64::from(l.z);
            samples.push(GgxSample { direction: l, lod });
        }

        Self { samples, weight_sum }
    }

    /// The precomputed samples, in build order.
    #[must_use]
    pub fn samples(&self) -> &[GgxSample] {
        &self.samples
    }

    /// Σ N·L across all samples, used to normalise the integrated result.
    #[must_use]
    pub const fn weight_sum(&self) -> f64 {
        self.weight_sum
    }
}

/// One precomputed cone sample: a tangent-space direction plus a
/// Gaussian-falloff weight.
#[derive(Debug, Clone, Copy)]
pub struct ConeSample {
    /// Sampled direction in tangent space (normal = +Z).
    pub direction: Vec3,
    /// Gaussian weight `exp(-theta^2 / (2 sigma^2))`.
    pub weight: f32,
}

/// The uniform-cone sample set used by the background blur.
#[derive(Debug, Clone)]
pub struct ConeSampleCache {
    samples: Vec<ConeSample>,
    weight_sum: f64,
}

impl ConeSampleCache {
    /// Build the cache: uniform samples over the spherical cap of half-angle
    /// `radius` radians, each weighted by a Gaussian falloff with
    /// `sigma = radius / 3`.
    #[must_use]
    pub fn build(num_samples: u32, radius: f32, sigma_sqr: f32) -> Self {
        let cos_theta_max = radius.cos();

        let mut samples = Vec::with_capacity(num_samples as usize);
        let mut weight_sum = 0.0_f64;

        for i in 0..num_samples {
            let (xi_x, xi_y) = hammersley(i, num_samples);
            let phi = 2.0 * std::f32::consts::PI * xi_x;
            let cos_theta = 1.0 - xi_y * (1.0 - cos_theta_max);
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
            let theta = cos_theta.clamp(-1.0, 1.0).acos();

            let direction = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
            let weight = (-(theta * theta) / (2.0 * sigma_sqr)).exp();

            weight_sum += f64::from(weight);
            samples.push(ConeSample { direction, weight });
        }

        Self { samples, weight_sum }
    }

    /// The precomputed samples, in build order.
    #[must_use]
    pub fn samples(&self) -> &[ConeSample] {
        &self.samples
    }

    /// Σw across all samples, used to normalise the integrated result.
    #[must_use]
    pub const fn weight_sum(&self) -> f64 {
        self.weight_sum
    }
}

/// Rotate a tangent-space direction by `angle` around the shared Z axis,
/// matching the closed-form rotation used by both integrators (spec §4.3
/// step 3): x,y rotate in-plane, z is scaled by `(1 - cos(angle)) + cos(angle)`,
/// which is an identity for a unit-length input but kept explicit to match
/// the source's floating point sequencing.
#[must_use]
pub fn rotate_tangent_direction(angle: f32, l: Vec3) -> Vec3 {
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    Vec3::new(l.x * c + l.y * s, -l.x * s + l.y * c, l.z * (t + c))
}

/// Per-pixel rotation offset that multiplexes the sample pattern across a
/// normal's tangent frame (spec §4.3 step 2).
#[must_use]
pub fn rotation_offset(normal: Vec3, num_rotations: u32) -> f32 {
    let rad = 2.0 * std::f32::consts::PI / num_rotations as f32;
    let gi = (normal.z + normal.x).abs() * 128.0;
    rad * ((gi * 0.5).rem_euclid(2.0 * std::f32::consts::PI).cos() * 0.5 + 0.5)
}

/// How many faces share one set of precomputed samples; re-exported here so
/// callers building per-face iterators don't need to import `direction`.
pub const FACE_COUNT: usize = NUM_FACES;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ggx_zero_roughness_reflects_straight_up() {
        let cache = GgxSampleCache::build(1, 0.0, 64, 6.0);
        let sample = cache.samples()[0];
        assert!((sample.direction - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn ggx_weight_sum_is_positive() {
        let cache = GgxSampleCache::build(256, 0.5, 64, 6.0);
        assert!(cache.weight_sum() > 0.0);
    }

    #[test]
    fn cone_samples_stay_within_half_angle() {
        let radius = 0.3_f32;
        let cache = ConeSampleCache::build(512, radius, (radius / 3.0).powi(2));
        for sample in cache.samples() {
            assert!(sample.direction.z >= radius.cos() - 1e-5);
        }
    }

    #[test]
    fn rotate_tangent_direction_preserves_length() {
        let d = Vec3::new(0.6, 0.8, 0.0).normalize();
        let r = rotate_tangent_direction(1.234, d);
        assert!((r.length() - 1.0).abs() < 1e-5);
    }
}
