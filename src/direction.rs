//! Face/texel ↔ unit-direction mapping and per-texel solid angle.
//!
//! The face axis table below is an external interface (spec §6): it must be
//! reproduced bit-for-bit, including axis signs, because downstream tools
//! (and the tests pinning direction outputs at face centres) depend on it.

use crate::geometry::Vec3;

/// Number of cube faces.
pub const NUM_FACES: usize = 6;

/// `(uAxis, vAxis, faceAxis)` per face, in face order `+X, -X, +Y, -Y, +Z, -Z`.
const FACE_AXES: [(Vec3, Vec3, Vec3); NUM_FACES] = [
    (Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
    (Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, -1.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
    (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
    (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, -1.0, 0.0)),
    (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
    (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
];

/// `u`,`v` continuous texel coordinates remapped to `[-1, 1]` face space.
///
/// Edge-fixup ("stretch") mode snaps the outermost texel centres to `±1` so
/// adjacent faces meet exactly on the shared seam; centered mode places the
/// sample at the texel centre.
pub(crate) fn remap_uv(ui: f32, vi: f32, size: u32, fixup: bool) -> (f32, f32) {
    if fixup {
        let denom = size as f32 - 1.0;
        (2.0 * ui / denom - 1.0, 2.0 * vi / denom - 1.0)
    } else {
        let size = size as f32;
        (2.0 * (ui + 0.5) / size - 1.0, 2.0 * (vi + 0.5) / size - 1.0)
    }
}

/// Map a (face, texel) coordinate to a unit direction.
///
/// `ui`, `vi` are continuous texel coordinates in `[0, size)`.
#[must_use]
pub fn texel_coord_to_vector(face: usize, ui: f32, vi: f32, size: u32, fixup: bool) -> Vec3 {
    let (u_axis, v_axis, face_axis) = FACE_AXES[face];
    let (u, v) = remap_uv(ui, vi, size, fixup);
    (u_axis * u + v_axis * v + face_axis).normalize()
}

/// `atan2(x*y, sqrt(x*x + y*y + 1))` — Öhrström's solid-angle corner term.
fn area_element(x: f64, y: f64) -> f64 {
    (x * y).atan2((x * x + y * y + 1.0).sqrt())
}

/// Exact solid angle (in steradians) subtended by the texel centred at
/// `(u, v)` in `[-1, 1]` face space, for a face of edge length `size`.
#[must_use]
pub fn texel_pixel_solid_angle(u: f32, v: f32, size: u32) -> f64 {
    let px = 2.0 / f64::from(size);
    let (u, v) = (f64::from(u), f64::from(v));
    let x0 = u - px * 0.5;
    let x1 = u + px * 0.5;
    let y0 = v - px * 0.5;
    let y1 = v + px * 0.5;
    area_element(x1, y1) - area_element(x1, y0) - area_element(x0, y1) + area_element(x0, y0)
}

/// Map a unit direction back to a `(face, u, v)` pixel-space coordinate.
///
/// Face selection picks the largest-magnitude component, tie-breaking in
/// the order `+X > -X > +Y > -Y > +Z > -Z` (spec §4.2).
#[must_use]
pub fn vector_to_texel(d: Vec3, size: u32) -> (usize, f32, f32) {
    let (ax, ay, az) = (d.x.abs(), d.y.abs(), d.z.abs());
    let face = if ax >= ay && ax >= az {
        usize::from(d.x < 0.0)
    } else if ay >= az {
        2 + usize::from(d.y < 0.0)
    } else {
        4 + usize::from(d.z < 0.0)
    };

    let (u_axis, v_axis, face_axis) = FACE_AXES[face];
    let dom = d.dot(face_axis);
    let u = d.dot(u_axis) / dom;
    let v = d.dot(v_axis) / dom;

    let size = size as f32;
    (face, (u + 1.0) * 0.5 * size, (v + 1.0) * 0.5 * size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn texel_direction_is_unit_length() {
        for face in 0..NUM_FACES {
            for &(u, v) in &[(0.0, 0.0), (7.0, 3.0), (15.0, 15.0)] {
                let d = texel_coord_to_vector(face, u, v, 16, false);
                assert!((d.length() - 1.0).abs() < 1e-6, "face {face} ({u},{v})");
            }
        }
    }

    #[test]
    fn face_centres_match_axis_table() {
        // Face centre (size/2 - 0.5, size/2 - 0.5 for even size) should be
        // close to the pure faceAxis direction.
        let size = 8;
        let centre = size as f32 / 2.0 - 0.5;
        let expected = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ];
        for face in 0..NUM_FACES {
            let d = texel_coord_to_vector(face, centre, centre, size, false);
            assert!((d - expected[face]).length() < 1e-6, "face {face}: {d:?}");
        }
    }

    #[test]
    fn solid_angle_sums_to_4pi() {
        for &size in &[8u32, 16, 64] {
            let mut sum = 0.0;
            for _face in 0..NUM_FACES {
                for v in 0..size {
                    for u in 0..size {
                        let (uu, vv) = remap_uv(u as f32, v as f32, size, false);
                        sum += texel_pixel_solid_angle(uu, vv, size);
                    }
                }
            }
            let rel_err = (sum - 4.0 * PI).abs() / (4.0 * PI);
            assert!(rel_err < 1e-4, "size {size}: sum={sum}, rel_err={rel_err}");
        }
    }

    #[test]
    fn round_trip_direction_to_texel_and_back() {
        let size = 32;
        for face in 0..NUM_FACES {
            let d = texel_coord_to_vector(face, 10.0, 20.0, size, false);
            let (f2, u, v) = vector_to_texel(d, size);
            assert_eq!(f2, face);
            let back = texel_coord_to_vector(f2, u - 0.5, v - 0.5, size, false);
            assert!((back - d).length() < 2.0 / size as f32);
        }
    }

    #[test]
    fn edge_fixup_snaps_corners_to_unit_diagonal() {
        let size = 16;
        for face in 0..NUM_FACES {
            let d = texel_coord_to_vector(face, 0.0, 0.0, size, true);
            let inv_sqrt3 = 1.0 / 3.0_f32.sqrt();
            for c in [d.x, d.y, d.z] {
                assert!(
                    (c.abs() - inv_sqrt3).abs() < 1e-6,
                    "face {face} corner component {c}"
                );
            }
        }
    }
}
