//! `clap`-derived command line surface (spec §6 "CLI surface", §4.8).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Offline HDR environment cubemap processor for image-based lighting.
#[derive(Debug, Parser)]
#[command(name = "envbake", version, about)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The four pipeline stages exposed on the command line.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a pre-filtered specular mip pyramid.
    Prefilter(PrefilterArgs),
    /// Project and reconstruct a spherical-harmonics irradiance cubemap.
    Sh(ShArgs),
    /// Generate a cone-blurred background cubemap.
    Background(BackgroundArgs),
    /// Extract dominant directional lights from an equirectangular image.
    Extract(ExtractArgs),
}

/// Arguments for `envbake prefilter`.
#[derive(Debug, Args)]
pub struct PrefilterArgs {
    /// Source cubemap EXR file.
    #[arg(long)]
    pub input: PathBuf,
    /// Output filename prefix; levels are written to `{prefix}_{level}.exr`.
    #[arg(long)]
    pub output_prefix: PathBuf,
    /// Edge length of the highest-resolution output level.
    #[arg(long)]
    pub start_size: u32,
    /// Edge length of the last physically-meaningful output level.
    #[arg(long)]
    pub end_size: u32,
    /// GGX importance samples per texel.
    #[arg(long, default_value_t = 1024)]
    pub samples: u32,
    /// Rotation multiplex count.
    #[arg(long, default_value_t = 1)]
    pub rotations: u32,
    /// Use edge-fixup (stretch) texel remapping.
    #[arg(long)]
    pub fixup: bool,
}

/// Arguments for `envbake sh`.
#[derive(Debug, Args)]
pub struct ShArgs {
    /// Source cubemap EXR file.
    #[arg(long)]
    pub input: PathBuf,
    /// Reconstructed irradiance cubemap output path.
    #[arg(long)]
    pub output: PathBuf,
    /// Edge length of the reconstructed output cubemap.
    #[arg(long)]
    pub output_size: u32,
    /// Weight the projection sum by per-texel solid angle.
    #[arg(long)]
    pub solid_angle_weighting: bool,
    /// Use edge-fixup (stretch) texel remapping.
    #[arg(long)]
    pub fixup: bool,
}

/// Arguments for `envbake background`.
#[derive(Debug, Args)]
pub struct BackgroundArgs {
    /// Source cubemap EXR file.
    #[arg(long)]
    pub input: PathBuf,
    /// Output cubemap EXR path.
    #[arg(long)]
    pub output: PathBuf,
    /// Cone half-angle in radians, clamped to `[0, 1]`.
    #[arg(long)]
    pub radius: f32,
    /// Cone samples per texel.
    #[arg(long, default_value_t = 256)]
    pub samples: u32,
    /// Rotation multiplex count.
    #[arg(long, default_value_t = 1)]
    pub rotations: u32,
    /// Use edge-fixup (stretch) texel remapping.
    #[arg(long)]
    pub fixup: bool,
}

/// Arguments for `envbake extract`.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Source equirectangular EXR file.
    #[arg(long)]
    pub input: PathBuf,
    /// Output JSON path listing the extracted lights.
    #[arg(long)]
    pub output: PathBuf,
    /// Maximum number of lights to emit.
    #[arg(long, default_value_t = 16)]
    pub num_lights: u32,
    /// Merge-border angle, degrees.
    #[arg(long, default_value_t = 5.0)]
    pub degree_merge: f32,
    /// Maximum normalised envelope size a coarse merge may reach.
    #[arg(long, default_value_t = 1.0)]
    pub area_max: f32,
}
