//! Background blur: a single cone-averaged pass over the environment,
//! reusing the row-parallel harness from [`crate::prefilter`].

use log::info;

use crate::cubemap::Cubemap;
use crate::miplevel::MipLevel;
use crate::prefilter::{fill_level, Operator};
use crate::sample_cache::ConeSampleCache;

/// Produce a blurred background cubemap at `size` by averaging each output
/// direction over a Gaussian-weighted cone of half-angle `radius` radians.
///
/// `radius` is clamped to `[0, 1]` (spec §7 class 2); `num_samples` and
/// `num_rotations` are forced to at least 1.
#[must_use]
pub fn generate_background_cubemap(source: &Cubemap, size: u32, radius: f32, num_samples: u32, num_rotations: u32, fixup: bool) -> MipLevel {
    let radius = radius.clamp(0.0, 1.0);
    let num_samples = num_samples.max(1);
    let num_rotations = num_rotations.max(1);

    let sigma = radius / 3.0;
    let cache = ConeSampleCache::build(num_samples, radius, sigma * sigma);

    info!("background: size={size} radius={radius} samples={num_samples} rotations={num_rotations}");

    let mut level = MipLevel::new(size, 3);
    fill_level(&mut level, fixup, &Operator::Background { cache: &cache, num_rotations }, source);
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;

    #[test]
    fn constant_environment_blurs_to_itself() {
        let mut base = MipLevel::new(8, 3);
        base.fill([0.4, 0.2, 0.9, 1.0]);
        let source = Cubemap::single_level(base);

        let out = generate_background_cubemap(&source, 8, 0.3, 256, 1, false);
        let sample = out.sample(Vec3::new(1.0, 0.0, 0.0));
        assert!((sample.x - 0.4).abs() < 0.02);
        assert!((sample.y - 0.2).abs() < 0.02);
        assert!((sample.z - 0.9).abs() < 0.02);
    }

    #[test]
    fn zero_radius_keeps_sharp_transition_at_face_centre() {
        let mut base = MipLevel::new(8, 3);
        base.fill([1.0, 1.0, 1.0, 1.0]);
        let source = Cubemap::single_level(base);
        let out = generate_background_cubemap(&source, 8, 0.0, 8, 1, false);
        let sample = out.sample(Vec3::new(1.0, 0.0, 0.0));
        assert!((sample.x - 1.0).abs() < 1e-3);
    }
}
