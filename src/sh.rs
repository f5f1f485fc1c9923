//! Real spherical harmonics up to band 4 (25 coefficients): projection of an
//! environment cubemap and reconstruction of a low-frequency irradiance
//! cubemap from the projected coefficients.

use crate::cubemap::Cubemap;
use crate::direction::NUM_FACES;
use crate::geometry::Vec3;
use crate::miplevel::MipLevel;

/// Number of real SH coefficients carried (bands 0..4 inclusive).
pub const NUM_COEFFICIENTS: usize = 25;

/// Sloan's convolution-with-clamped-cosine band factors. All coefficients
/// within a band share the same factor; band 3 (indices 9..15) is zeroed on
/// reconstruction even though it is still computed during projection.
pub const BAND_FACTORS: [f64; NUM_COEFFICIENTS] = [
    1.0, 2.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0, 1.0 / 4.0, 1.0 / 4.0, 1.0 / 4.0, 1.0 / 4.0, 1.0 / 4.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, -1.0 / 24.0, -1.0 / 24.0, -1.0 / 24.0, -1.0 / 24.0, -1.0 / 24.0, -1.0 / 24.0, -1.0 / 24.0,
    -1.0 / 24.0, -1.0 / 24.0,
];

/// Per-colour-channel SH coefficients produced by [`project`].
#[derive(Debug, Clone)]
pub struct SphericalHarmonics {
    /// Red channel coefficients, band order 0..4.
    pub r: [f64; NUM_COEFFICIENTS],
    /// Green channel coefficients.
    pub g: [f64; NUM_COEFFICIENTS],
    /// Blue channel coefficients.
    pub b: [f64; NUM_COEFFICIENTS],
}

impl SphericalHarmonics {
    /// Multiply each coefficient by its band factor, the form emitted to
    /// stdout and used directly by [`reconstruct`].
    #[must_use]
    pub fn banded(&self) -> Self {
        let apply = |c: &[f64; NUM_COEFFICIENTS]| {
            let mut out = [0.0; NUM_COEFFICIENTS];
            for i in 0..NUM_COEFFICIENTS {
                out[i] = c[i] * BAND_FACTORS[i];
            }
            out
        };
        Self { r: apply(&self.r), g: apply(&self.g), b: apply(&self.b) }
    }
}

/// Evaluate all 25 real SH basis functions at unit direction `d`.
///
/// Exact closed-form polynomials in (x, y, z); the numerical coefficients
/// are pinned by tests at the six axis-aligned directions and must not
/// drift, since they define the external SH output format.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn eval_sh_basis(d: Vec3) -> [f64; NUM_COEFFICIENTS] {
    use std::f64::consts::PI;
    let sqrt_pi = PI.sqrt();

    let xx = f64::from(d.x);
    let yy = f64::from(d.y);
    let zz = f64::from(d.z);

    let mut x = [1.0_f64; 6];
    let mut y = [1.0_f64; 6];
    let mut z = [1.0_f64; 6];
    for i in 1..6 {
        x[i] = xx * x[i - 1];
        y[i] = yy * y[i - 1];
        z[i] = zz * z[i - 1];
    }

    let mut res = [0.0_f64; NUM_COEFFICIENTS];
    res[0] = 1.0 / (2.0 * sqrt_pi);

    res[1] = -(3.0 / PI).sqrt() * yy / 2.0;
    res[2] = (3.0 / PI).sqrt() * zz / 2.0;
    res[3] = -(3.0 / PI).sqrt() * xx / 2.0;

    res[4] = (15.0 / PI).sqrt() * xx * yy / 2.0;
    res[5] = -(15.0 / PI).sqrt() * yy * zz / 2.0;
    res[6] = (5.0 / PI).sqrt() * (-1.0 + 3.0 * z[2]) / 4.0;
    res[7] = -(15.0 / PI).sqrt() * xx * zz / 2.0;
    res[8] = (15.0 / PI).sqrt() * (x[2] - y[2]) / 4.0;

    res[9] = (35.0 / (2.0 * PI)).sqrt() * (-3.0 * x[2] * yy + y[3]) / 4.0;
    res[10] = (105.0 / PI).sqrt() * xx * yy * zz / 2.0;
    res[11] = -(21.0 / (2.0 * PI)).sqrt() * yy * (-1.0 + 5.0 * z[2]) / 4.0;
    res[12] = (7.0 / PI).sqrt() * zz * (-3.0 + 5.0 * z[2]) / 4.0;
    res[13] = -(21.0 / (2.0 * PI)).sqrt() * xx * (-1.0 + 5.0 * z[2]) / 4.0;
    res[14] = (105.0 / PI).sqrt() * (x[2] - y[2]) * zz / 4.0;
    res[15] = -(35.0 / (2.0 * PI)).sqrt() * (x[3] - 3.0 * xx * y[2]) / 4.0;

    res[16] = 3.0 * (35.0 / PI).sqrt() * xx * yy * (x[2] - y[2]) / 4.0;
    res[17] = -3.0 * (35.0 / (2.0 * PI)).sqrt() * (3.0 * x[2] * yy - y[3]) * zz / 4.0;
    res[18] = 3.0 * (5.0 / PI).sqrt() * xx * yy * (-1.0 + 7.0 * z[2]) / 4.0;
    res[19] = -3.0 * (5.0 / (2.0 * PI)).sqrt() * yy * zz * (-3.0 + 7.0 * z[2]) / 4.0;
    res[20] = 3.0 * (3.0 - 30.0 * z[2] + 35.0 * z[4]) / (16.0 * sqrt_pi);
    res[21] = -3.0 * (5.0 / (2.0 * PI)).sqrt() * xx * zz * (-3.0 + 7.0 * z[2]) / 4.0;
    res[22] = 3.0 * (5.0 / PI).sqrt() * (x[2] - y[2]) * (-1.0 + 7.0 * z[2]) / 8.0;
    res[23] = -3.0 * (35.0 / (2.0 * PI)).sqrt() * (x[3] - 3.0 * xx * y[2]) * zz / 4.0;
    res[24] = 3.0 * (35.0 / PI).sqrt() * (x[4] - 6.0 * x[2] * y[2] + y[4]) / 16.0;

    res
}

/// Project a source cubemap onto the real SH basis (spec §4.4). Accumulators
/// are 64-bit throughout; the result is rescaled so total accumulated
/// weight matches the solid angle of the sphere (4π).
#[must_use]
pub fn project(source: &Cubemap, fixup: bool, solid_angle_weighting: bool) -> SphericalHarmonics {
    let size = source.size();
    let normalizer = MipLevel::build_normalizer(size, fixup);
    let spp = source.base_level().samples_per_pixel() as usize;

    let mut sh_r = [0.0_f64; NUM_COEFFICIENTS];
    let mut sh_g = [0.0_f64; NUM_COEFFICIENTS];
    let mut sh_b = [0.0_f64; NUM_COEFFICIENTS];
    let mut weight_accum = 0.0_f64;

    for face in 0..NUM_FACES {
        let norm_face = normalizer.face(face);
        let src_face = source.base_level().face(face);
        for texel in 0..(size as usize * size as usize) {
            let n = &norm_face[texel * 4..texel * 4 + 4];
            let dir = Vec3::new(n[0], n[1], n[2]);
            let solid_angle = f64::from(n[3]);
            let weight = if solid_angle_weighting { solid_angle } else { 1.0 };

            let basis = eval_sh_basis(dir);
            let c = &src_face[texel * spp..texel * spp + 3];
            let (r, g, b) = (f64::from(c[0]), f64::from(c[1]), f64::from(c[2]));

            for i in 0..NUM_COEFFICIENTS {
                sh_r[i] += r * basis[i] * weight;
                sh_g[i] += g * basis[i] * weight;
                sh_b[i] += b * basis[i] * weight;
            }
            weight_accum += weight;
        }
    }

    let norm = 4.0 * std::f64::consts::PI / weight_accum;
    for i in 0..NUM_COEFFICIENTS {
        sh_r[i] *= norm;
        sh_g[i] *= norm;
        sh_b[i] *= norm;
    }

    SphericalHarmonics { r: sh_r, g: sh_g, b: sh_b }
}

/// Reconstruct a low-frequency irradiance cubemap of edge length `size`
/// from already-projected SH coefficients (spec §4.4). Band factors are
/// applied here; callers who already hold [`SphericalHarmonics::banded`]
/// coefficients should pass those through an all-ones-factor path instead —
/// in practice this crate always reconstructs straight from `project`'s
/// output, so banding happens exactly once.
#[must_use]
pub fn reconstruct(sh: &SphericalHarmonics, size: u32, fixup: bool) -> MipLevel {
    let normalizer = MipLevel::build_normalizer(size, fixup);
    let mut out = MipLevel::new(size, 4);

    for face in 0..NUM_FACES {
        let norm_face = normalizer.face(face);
        let out_face = out.face_mut(face);
        for texel in 0..(size as usize * size as usize) {
            let n = &norm_face[texel * 4..texel * 4 + 4];
            let dir = Vec3::new(n[0], n[1], n[2]);
            let basis = eval_sh_basis(dir);

            let mut r = 0.0_f64;
            let mut g = 0.0_f64;
            let mut b = 0.0_f64;
            for i in 0..NUM_COEFFICIENTS {
                r += sh.r[i] * basis[i] * BAND_FACTORS[i];
                g += sh.g[i] * basis[i] * BAND_FACTORS[i];
                b += sh.b[i] * basis[i] * BAND_FACTORS[i];
            }

            let idx = texel * 4;
            out_face[idx] = r as f32;
            out_face[idx + 1] = g as f32;
            out_face[idx + 2] = b as f32;
            out_face[idx + 3] = 1.0;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_dc_term_is_constant() {
        for d in [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X, -Vec3::Y, -Vec3::Z] {
            let basis = eval_sh_basis(d);
            assert!((basis[0] - 1.0 / (2.0 * std::f64::consts::PI.sqrt())).abs() < 1e-12);
        }
    }

    #[test]
    fn basis_band1_matches_axis_directions() {
        let basis = eval_sh_basis(Vec3::Z);
        assert!((basis[2] - (3.0 / std::f64::consts::PI).sqrt() / 2.0).abs() < 1e-12);
        assert!(basis[1].abs() < 1e-12);
        assert!(basis[3].abs() < 1e-12);
    }

    #[test]
    fn constant_white_environment_projects_to_dc_only() {
        let mut level = MipLevel::new(16, 3);
        level.fill([1.0, 1.0, 1.0, 1.0]);
        let cubemap = Cubemap::single_level(level);

        let sh = project(&cubemap, false, true);
        let expected_dc = 2.0 * std::f64::consts::PI.sqrt();
        assert!((sh.r[0] - expected_dc).abs() < 1e-5, "dc={}", sh.r[0]);
        for i in 1..NUM_COEFFICIENTS {
            assert!(sh.r[i].abs() < 1e-5, "coefficient {i} = {}", sh.r[i]);
        }
    }

    #[test]
    fn constant_white_environment_reconstructs_to_constant() {
        let mut level = MipLevel::new(16, 3);
        level.fill([1.0, 1.0, 1.0, 1.0]);
        let cubemap = Cubemap::single_level(level);

        let sh = project(&cubemap, false, true);
        let out = reconstruct(&sh, 8, false);
        for face in out.faces() {
            for texel in face.chunks_exact(4) {
                assert!((texel[0] - 1.0).abs() < 1e-4, "r={}", texel[0]);
                assert!((texel[1] - 1.0).abs() < 1e-4, "g={}", texel[1]);
                assert!((texel[2] - 1.0).abs() < 1e-4, "b={}", texel[2]);
                assert_eq!(texel[3], 1.0);
            }
        }
    }

    #[test]
    fn single_lit_face_has_zero_green_and_blue() {
        let mut level = MipLevel::new(16, 3);
        level.fill([0.0, 0.0, 0.0, 1.0]);
        let idx_face = 0usize; // +X
        for texel in level.face_mut(idx_face).chunks_exact_mut(3) {
            texel.copy_from_slice(&[1.0, 0.0, 0.0]);
        }
        let cubemap = Cubemap::single_level(level);

        let sh = project(&cubemap, false, true);
        for i in 0..NUM_COEFFICIENTS {
            assert_eq!(sh.g[i], 0.0);
            assert_eq!(sh.b[i], 0.0);
        }
        assert!(sh.r[0] > 0.0);
    }
}
