//! OpenEXR collaborator: loads and saves the six-face cubemap format and
//! equirectangular float images the pipeline reads and writes, plus mip
//! pyramid filename discovery (spec §6 image I/O contract, §4.7).

use std::path::{Path, PathBuf};

use exr::prelude::*;

use crate::direction::NUM_FACES;
use crate::error::{EnvBakeError, Result};
use crate::miplevel::MipLevel;

const FACE_LAYER_NAMES: [&str; NUM_FACES] = ["face_px", "face_nx", "face_py", "face_ny", "face_pz", "face_nz"];

/// Load a cubemap from a multi-part EXR file: one layer per face, in the
/// order of spec.md §6's face axis table. Rejects files whose six layers
/// disagree in size or whose channel count is below 3.
pub fn load_cubemap(path: &Path) -> Result<MipLevel> {
    let image: Image<Layers<AnyChannels<FlatSamples>>> = read_all_flat_layers_from_file(path)
        .map_err(|e| EnvBakeError::InvalidImage(format!("{}: {e}", path.display())))?;

    if image.layer_data.len() != NUM_FACES {
        return Err(EnvBakeError::InvalidImage(format!(
            "{}: expected {NUM_FACES} face layers, found {}",
            path.display(),
            image.layer_data.len()
        )));
    }

    let mut size: Option<usize> = None;
    let mut samples_per_pixel: Option<usize> = None;
    let mut faces: [Vec<f32>; NUM_FACES] = Default::default();

    for (face, layer) in image.layer_data.iter().enumerate() {
        let width = layer.size.width();
        let height = layer.size.height();
        if width != height {
            return Err(EnvBakeError::InvalidImage(format!("{}: face {face} is not square ({width}x{height})", path.display())));
        }
        if let Some(expected) = size {
            if expected != width {
                return Err(EnvBakeError::InvalidImage(format!("{}: face {face} size {width} disagrees with {expected}", path.display())));
            }
        } else {
            size = Some(width);
        }

        let channels = &layer.channel_data.list;
        if channels.len() < 3 {
            return Err(EnvBakeError::InvalidImage(format!("{}: face {face} has {} channels, need >= 3", path.display(), channels.len())));
        }
        let spp = channels.len();
        if let Some(expected) = samples_per_pixel {
            if expected != spp {
                return Err(EnvBakeError::InvalidImage(format!("{}: face {face} channel count {spp} disagrees with {expected}", path.display())));
            }
        } else {
            samples_per_pixel = Some(spp);
        }

        let mut interleaved = vec![0.0_f32; width * height * spp];
        for (c, channel) in channels.iter().enumerate() {
            let values: Vec<f32> = match &channel.sample_data {
                FlatSamples::F16(v) => v.iter().map(|x| x.to_f32()).collect(),
                FlatSamples::F32(v) => v.clone(),
                FlatSamples::U32(v) => v.iter().map(|&x| x as f32).collect(),
            };
            for (texel, value) in values.into_iter().enumerate() {
                interleaved[texel * spp + c] = value;
            }
        }
        faces[face] = interleaved;
    }

    let size = size.ok_or_else(|| EnvBakeError::InvalidImage("empty cubemap file".to_owned()))?;
    let spp = samples_per_pixel.unwrap_or(3);

    let mut level = MipLevel::new(size as u32, spp as u32);
    *level.faces_mut() = faces;
    Ok(level)
}

/// Save a cubemap level to a multi-part EXR file, one layer per face.
pub fn save_cubemap(level: &MipLevel, path: &Path) -> Result<()> {
    let size = level.size() as usize;
    let spp = level.samples_per_pixel() as usize;
    let channel_names: &[&str] = if spp >= 4 { &["R", "G", "B", "A"] } else { &["R", "G", "B"] };

    let layers: Vec<Layer<AnyChannels<FlatSamples>>> = (0..NUM_FACES)
        .map(|face| {
            let data = level.face(face);
            let channels: SmallVec<[AnyChannel<FlatSamples>; 4]> = channel_names
                .iter()
                .enumerate()
                .map(|(c, &name)| {
                    let samples: Vec<f32> = data.iter().skip(c).step_by(spp).copied().collect();
                    AnyChannel::new(name, FlatSamples::F32(samples))
                })
                .collect();

            Layer::new(
                (size, size),
                LayerAttributes::named(Text::from(FACE_LAYER_NAMES[face])),
                Encoding::FAST_LOSSLESS,
                AnyChannels::sort(channels),
            )
        })
        .collect();

    let image = Image::from_layers(ImageAttributes::new(IntegerBounds::from_dimensions((size, size))), layers);
    image.write().to_file(path).map_err(|e| EnvBakeError::Io(std::io::Error::other(e)))?;
    Ok(())
}

/// Probe `{prefix}_0.exr`, `{prefix}_1.exr`, … until the next index's file
/// does not exist, returning the discovered paths in level order.
#[must_use]
pub fn discover_mip_pyramid(prefix: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    loop {
        let candidate = mip_level_path(prefix, paths.len());
        if candidate.is_file() {
            paths.push(candidate);
        } else {
            break;
        }
    }
    paths
}

/// The path `{prefix}_{level}.exr` used both to probe and to write a mip
/// pyramid level.
#[must_use]
pub fn mip_level_path(prefix: &Path, level: usize) -> PathBuf {
    let mut name = prefix.file_name().map(std::ffi::OsStr::to_owned).unwrap_or_default();
    name.push(format!("_{level}.exr"));
    prefix.with_file_name(name)
}

/// Load a mip pyramid from `{prefix}_0.exr`, `{prefix}_1.exr`, ….
pub fn load_mip_pyramid(prefix: &Path) -> Result<Vec<MipLevel>> {
    let paths = discover_mip_pyramid(prefix);
    if paths.is_empty() {
        return Err(EnvBakeError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, format!("no mip levels found for prefix {}", prefix.display()))));
    }
    paths.iter().map(|p| load_cubemap(p)).collect()
}

struct EquirectBuffer {
    width: usize,
    data: Vec<f32>,
}

/// Load a single-part equirectangular float RGB(A) image for the light
/// extractor, returning `(pixels, width, height, channels)`.
pub fn load_equirectangular(path: &Path) -> Result<(Vec<f32>, usize, usize, usize)> {
    let image = read_first_rgba_layer_from_file(
        path,
        |resolution, _| EquirectBuffer { width: resolution.width(), data: vec![0.0_f32; resolution.width() * resolution.height() * 4] },
        |buffer, position, (r, g, b, a): (f32, f32, f32, f32)| {
            let idx = (position.y() * buffer.width + position.x()) * 4;
            buffer.data[idx] = r;
            buffer.data[idx + 1] = g;
            buffer.data[idx + 2] = b;
            buffer.data[idx + 3] = a;
        },
    )
    .map_err(|e| EnvBakeError::InvalidImage(format!("{}: {e}", path.display())))?;

    let buffer = image.layer_data.channel_data.pixels;
    let width = buffer.width;
    let height = buffer.data.len() / 4 / width;
    Ok((buffer.data, width, height, 4))
}
