//! `envbake` binary entry point: subcommand dispatch, image I/O, and the
//! fixed stdout format for `sh` coefficients (spec.md §6).

use std::process::ExitCode;

use clap::Parser;
use envbake::background::generate_background_cubemap;
use envbake::cli::{BackgroundArgs, Cli, Command, ExtractArgs, PrefilterArgs, ShArgs};
use envbake::cubemap::Cubemap;
use envbake::error::{EnvBakeError, Result};
use envbake::io::{load_cubemap, load_equirectangular, mip_level_path, save_cubemap};
use envbake::light_extract::extract_lights;
use envbake::prefilter::generate_prefiltered_pyramid;
use envbake::sh::{project, reconstruct, SphericalHarmonics, NUM_COEFFICIENTS};
use log::info;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Prefilter(args) => run_prefilter(&args),
        Command::Sh(args) => run_sh(&args),
        Command::Background(args) => run_background(&args),
        Command::Extract(args) => run_extract(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ (EnvBakeError::Io(_) | EnvBakeError::InvalidImage(_))) => {
            log::error!("{err}");
            ExitCode::from(1)
        }
        Err(err @ EnvBakeError::Invariant(_)) => {
            log::error!("{err}");
            ExitCode::from(2)
        }
    }
}

fn run_prefilter(args: &PrefilterArgs) -> Result<()> {
    let base = load_cubemap(&args.input)?;
    info!("prefilter: loaded base level size={}", base.size());
    let source = Cubemap::single_level(base);

    let levels = generate_prefiltered_pyramid(&source, args.start_size, args.end_size, args.samples, args.rotations, args.fixup);
    for (index, level) in levels.iter().enumerate() {
        let path = mip_level_path(&args.output_prefix, index);
        save_cubemap(level, &path)?;
        info!("prefilter: wrote level {index} ({}x{}) to {}", level.size(), level.size(), path.display());
    }
    Ok(())
}

fn run_sh(args: &ShArgs) -> Result<()> {
    let base = load_cubemap(&args.input)?;
    let source = Cubemap::single_level(base);

    let coefficients = project(&source, args.fixup, args.solid_angle_weighting);
    let banded = coefficients.banded();
    print_sh_coefficients(&banded);

    let reconstructed = reconstruct(&coefficients, args.output_size, args.fixup);
    save_cubemap(&reconstructed, &args.output)?;
    info!("sh: wrote reconstructed irradiance cubemap to {}", args.output.display());
    Ok(())
}

fn run_background(args: &BackgroundArgs) -> Result<()> {
    let base = load_cubemap(&args.input)?;
    let source = Cubemap::single_level(base);

    let level = generate_background_cubemap(&source, source.size(), args.radius, args.samples, args.rotations, args.fixup);
    save_cubemap(&level, &args.output)?;
    info!("background: wrote {}x{} cubemap to {}", level.size(), level.size(), args.output.display());
    Ok(())
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let (pixels, width, height, channels) = load_equirectangular(&args.input)?;
    if channels < 3 {
        return Err(EnvBakeError::Invariant(format!("equirectangular image has {channels} channels, need >= 3")));
    }

    let lights = extract_lights(&pixels, width, height, channels, args.num_lights as usize, f64::from(args.degree_merge), f64::from(args.area_max));
    info!("extract: {} lights extracted from {width}x{height} image", lights.len());

    let json = serde_json::to_string_pretty(&lights).map_err(|e| EnvBakeError::Invariant(format!("light list serialisation failed: {e}")))?;
    std::fs::write(&args.output, json)?;
    info!("extract: wrote light list to {}", args.output.display());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_sh_coefficients(sh: &SphericalHarmonics) {
    let format_band = |c: &[f64; NUM_COEFFICIENTS]| c.iter().map(|v| format!("{v}")).collect::<Vec<_>>().join(", ");

    println!("shR: [ {} ]", format_band(&sh.r));
    println!("shG: [ {} ]", format_band(&sh.g));
    println!("shB: [ {} ]", format_band(&sh.b));

    let interleaved: Vec<String> = (0..NUM_COEFFICIENTS).flat_map(|i| [format!("{}", sh.r[i]), format!("{}", sh.g[i]), format!("{}", sh.b[i])]).collect();
    println!("shCoef: [ {} ]", interleaved.join(", "));
}
