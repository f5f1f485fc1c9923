//! Specular pre-filter engine: per-level roughness scheduling, the
//! row-parallel integration harness shared with the background blur, and
//! the tagged [`Operator`] enum that replaces the source's per-pixel
//! polymorphism (spec §9 "dynamic dispatch over per-pixel operations").

use glam::DVec3;
use log::{debug, info};
use rayon::prelude::*;

use crate::cubemap::Cubemap;
use crate::direction::{texel_coord_to_vector, NUM_FACES};
use crate::geometry::Vec3;
use crate::miplevel::MipLevel;
use crate::sample_cache::{rotate_tangent_direction, rotation_offset, ConeSample, GgxSample, GgxSampleCache};

/// Sentinel colour written to pre-filter levels beyond `endMipMap`: these
/// levels are not physically meaningful.
pub const SENTINEL_COLOUR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

/// The per-pixel operation a [`fill_face`] pass performs, chosen once per
/// output level rather than dispatched per pixel.
pub enum Operator<'a> {
    /// Roughness 0 (or a single-sample level): an unfiltered copy from the
    /// matching source resolution.
    Copy {
        /// Index into the source cubemap's levels matching this output size.
        native_level: usize,
    },
    /// GGX importance-sampled specular integration.
    Prefilter {
        /// Precomputed GGX sample set for this level's roughness.
        cache: &'a GgxSampleCache,
        /// Rotation multiplex count.
        num_rotations: u32,
        /// Whether the source carries a mip pyramid to LOD-sample from.
        use_lod: bool,
    },
    /// Cone-sampled background blur (no N·L weighting, base level only).
    Background {
        /// Precomputed cone sample set for this blur radius.
        cache: &'a crate::sample_cache::ConeSampleCache,
        /// Rotation multiplex count.
        num_rotations: u32,
    },
}

/// Orthonormal tangent basis (T, B) for normal `n`, per spec §4.3 step 1.
fn tangent_basis(n: Vec3) -> (Vec3, Vec3) {
    let up = if n.z.abs() < 0.999 { Vec3::Z } else { Vec3::X };
    let tangent_x = up.cross(n).normalize();
    let tangent_y = n.cross(tangent_x).normalize();
    (tangent_x, tangent_y)
}

fn integrate_prefilter(source: &Cubemap, n: Vec3, samples: &[GgxSample], weight_sum: f64, num_rotations: u32, use_lod: bool) -> Vec3 {
    let (tangent_x, tangent_y) = tangent_basis(n);
    let rad = 2.0 * std::f32::consts::PI / num_rotations as f32;
    let offset = rotation_offset(n, num_rotations);

    let mut accum = DVec3::ZERO;
    for sample in samples {
        let l = sample.direction;
        let n_dot_l = f64::from(l.z);

        let mut colour_sum = DVec3::ZERO;
        let world = tangent_x * l.x + tangent_y * l.y + n * l.z;
        colour_sum += to_dvec3(if use_lod {
            source.sample_lod(sample.lod, world)
        } else {
            source.sample(world)
        });

        for rotation in 1..num_rotations {
            let l2 = rotate_tangent_direction(offset + rotation as f32 * rad, l);
            let world = tangent_x * l2.x + tangent_y * l2.y + n * l2.z;
            colour_sum += to_dvec3(if use_lod {
                source.sample_lod(sample.lod, world)
            } else {
                source.sample(world)
            });
        }

        accum += colour_sum * n_dot_l;
    }

    from_dvec3(accum / (weight_sum * f64::from(num_rotations.max(1))))
}

fn integrate_background(source: &Cubemap, n: Vec3, samples: &[ConeSample], weight_sum: f64, num_rotations: u32) -> Vec3 {
    let (tangent_x, tangent_y) = tangent_basis(n);
    let rad = 2.0 * std::f32::consts::PI / num_rotations as f32;

    let mut accum = DVec3::ZERO;
    for sample in samples {
        let h = sample.direction;

        let mut colour_sum = DVec3::ZERO;
        let world = tangent_x * h.x + tangent_y * h.y + n * h.z;
        colour_sum += to_dvec3(source.sample(world));

        for rotation in 1..num_rotations {
            let h2 = rotate_tangent_direction(rotation as f32 * rad, h);
            let world = tangent_x * h2.x + tangent_y * h2.y + n * h2.z;
            colour_sum += to_dvec3(source.sample(world));
        }

        accum += colour_sum * f64::from(sample.weight);
    }

    from_dvec3(accum / (weight_sum * f64::from(num_rotations.max(1))))
}

fn to_dvec3(v: Vec3) -> DVec3 {
    DVec3::new(f64::from(v.x), f64::from(v.y), f64::from(v.z))
}

fn from_dvec3(v: DVec3) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

fn evaluate_pixel(op: &Operator<'_>, source: &Cubemap, normal: Vec3) -> Vec3 {
    match op {
        Operator::Copy { native_level } => source.level(*native_level).sample(normal),
        Operator::Prefilter { cache, num_rotations, use_lod } => {
            integrate_prefilter(source, normal, cache.samples(), cache.weight_sum(), *num_rotations, *use_lod)
        }
        Operator::Background { cache, num_rotations } => {
            integrate_background(source, normal, cache.samples(), cache.weight_sum(), *num_rotations)
        }
    }
}

/// Fill every texel of `face` in `level` by evaluating `op` at each texel's
/// direction, with row ranges partitioned across threads (spec §5: the unit
/// of parallel work is a row range of a single output face).
pub fn fill_face(level: &mut MipLevel, face: usize, fixup: bool, op: &Operator<'_>, source: &Cubemap) {
    let size = level.size();
    let spp = level.samples_per_pixel() as usize;
    let row_stride = size as usize * spp;

    level.face_mut(face).par_chunks_mut(row_stride).enumerate().for_each(|(v, row)| {
        for u in 0..size {
            let direction = texel_coord_to_vector(face, u as f32, v as f32, size, fixup);
            let colour = evaluate_pixel(op, source, direction);
            let idx = u as usize * spp;
            row[idx] = colour.x;
            row[idx + 1] = colour.y;
            row[idx + 2] = colour.z;
        }
    });
}

/// Fill all six faces of `level` with `op`.
pub fn fill_level(level: &mut MipLevel, fixup: bool, op: &Operator<'_>, source: &Cubemap) {
    for face in 0..NUM_FACES {
        fill_face(level, face, fixup, op, source);
    }
}

/// Compute one pre-filtered output level at the given linear roughness.
///
/// Roughness is clamped to `[0, 1]`; at roughness 0 (or `num_samples <= 1`)
/// this is an unfiltered copy from the matching source resolution rather
/// than an importance-sampled integral (spec §4.3 level schedule, §7 class 2).
#[must_use]
pub fn prefilter_level(source: &Cubemap, size: u32, roughness_linear: f32, num_samples: u32, num_rotations: u32, fixup: bool) -> MipLevel {
    let roughness_linear = roughness_linear.clamp(0.0, 1.0);
    let num_samples = if roughness_linear == 0.0 { 1 } else { num_samples.max(1) };
    let num_rotations = num_rotations.max(1);

    let mut level = MipLevel::new(size, 3);

    if roughness_linear == 0.0 || num_samples == 1 {
        let native_level = source.level_for_size(size).unwrap_or(0);
        fill_level(&mut level, fixup, &Operator::Copy { native_level }, source);
    } else {
        let max_level = (source.level_count() as f32 - 1.0).max(0.0);
        let cache = GgxSampleCache::build(num_samples, roughness_linear, source.size(), max_level);
        let use_lod = source.level_count() > 1;
        fill_level(
            &mut level,
            fixup,
            &Operator::Prefilter { cache: &cache, num_rotations, use_lod },
            source,
        );
    }

    level
}

/// Generate the full pre-filtered mip pyramid: `log2(start_size) + 1`
/// levels, roughness increasing quadratically from 0 to 1 up to
/// `endMipMap = log2(start_size) - log2(end_size)`, with levels beyond
/// that filled with [`SENTINEL_COLOUR`] (spec §4.3 level schedule).
#[must_use]
pub fn generate_prefiltered_pyramid(source: &Cubemap, start_size: u32, end_size: u32, num_samples: u32, num_rotations: u32, fixup: bool) -> Vec<MipLevel> {
    let total_mipmap = start_size.max(1).ilog2();
    let end_mipmap = total_mipmap.saturating_sub(end_size.max(1).ilog2());
    let step = if end_mipmap == 0 { 0.0 } else { 1.0 / end_mipmap as f32 };

    info!("prefilter: {} levels from {start_size}x{start_size}, endMipMap={end_mipmap}", total_mipmap + 1);

    (0..=total_mipmap)
        .map(|i| {
            let size = (start_size >> i).max(1);
            if i <= end_mipmap {
                let roughness = (step * i as f32).powi(2);
                debug!("level {i}: size={size} roughness={roughness}");
                prefilter_level(source, size, roughness, num_samples, num_rotations, fixup)
            } else {
                let mut level = MipLevel::new(size, 4);
                level.fill(SENTINEL_COLOUR);
                level
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miplevel::MipLevel;

    fn constant_cubemap(size: u32, colour: [f32; 4]) -> Cubemap {
        let mut level = MipLevel::new(size, 3);
        level.fill(colour);
        Cubemap::single_level(level)
    }

    #[test]
    fn roughness_zero_is_bit_exact_copy() {
        let source = constant_cubemap(4, [0.25, 0.5, 0.75, 1.0]);
        let out = prefilter_level(&source, 4, 0.0, 64, 4, false);
        for face in out.faces() {
            for texel in face.chunks_exact(3) {
                assert_eq!(texel, [0.25, 0.5, 0.75]);
            }
        }
    }

    #[test]
    fn high_roughness_mean_matches_source_mean() {
        let source = constant_cubemap(8, [1.0, 1.0, 1.0, 1.0]);
        let out = prefilter_level(&source, 8, 1.0, 1024, 1, false);
        for face in out.faces() {
            for texel in face.chunks_exact(3) {
                let mean = (texel[0] + texel[1] + texel[2]) / 3.0;
                assert!((mean - 1.0).abs() < 0.05, "mean={mean}");
            }
        }
    }

    #[test]
    fn output_is_roughly_independent_of_num_rotations() {
        let source = constant_cubemap(8, [0.6, 0.3, 0.1, 1.0]);
        let out_r1 = prefilter_level(&source, 8, 0.6, 2048, 1, false);
        let out_r8 = prefilter_level(&source, 8, 0.6, 2048, 8, false);

        let mean = |level: &MipLevel| -> f32 {
            let mut sum = 0.0;
            let mut count = 0.0;
            for face in level.faces() {
                for texel in face.chunks_exact(3) {
                    sum += texel[0] + texel[1] + texel[2];
                    count += 3.0;
                }
            }
            sum / count
        };

        let ratio = mean(&out_r1) / mean(&out_r8);
        assert!((ratio - 1.0).abs() < 0.02, "ratio={ratio}");
    }
}
