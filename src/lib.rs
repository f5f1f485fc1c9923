// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Offline HDR environment cubemap processor for physically-based
//! image-based lighting (IBL).
//!
//! Given a six-face floating-point cubemap representing an environment
//! light, this crate produces a mip-mapped, GGX-importance-sampled
//! pre-filtered specular cubemap, a low-frequency spherical-harmonics
//! diffuse irradiance approximation, a cone-blurred background cubemap, and
//! a list of dominant directional lights extracted from an equirectangular
//! projection of the same environment.
//!
//! # Key entry points
//!
//! - [`prefilter::generate_prefiltered_pyramid`] - specular mip pyramid
//! - [`sh::project`] / [`sh::reconstruct`] - diffuse irradiance via SH
//! - [`background::generate_background_cubemap`] - blurred background
//! - [`light_extract::extract_lights`] - dominant light extraction
//!
//! # Architecture
//!
//! [`cubemap::Cubemap`] and [`miplevel::MipLevel`] are the shared six-face
//! image representation every filter operates on. [`prefilter::fill_level`]
//! is the common row-parallel evaluation harness (built on `rayon`) shared
//! by specular pre-filtering and background blurring; both are expressed as
//! [`prefilter::Operator`] variants dispatched once per output level rather
//! than per pixel. [`sample_cache::GgxSampleCache`] and
//! [`sample_cache::ConeSampleCache`] precompute the importance-sampling
//! directions each operator integrates over. [`io`] is the only module that
//! touches the filesystem, reading and writing the six-layer-per-file EXR
//! convention via the `exr` crate.

pub mod background;
pub mod cli;
pub mod cubemap;
pub mod direction;
pub mod error;
pub mod geometry;
pub mod io;
pub mod light_extract;
pub mod miplevel;
pub mod prefilter;
pub mod sample_cache;
pub mod sh;
