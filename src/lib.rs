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
#![warn(unused_results)]
#![warn(unused_qualifications)]
// Cast hygiene
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]

//! Scatter instanced models across primitive surfaces, built on wgpu.
//!
//! A surface (plane, cube, sphere or cone) is sampled at random
//! barycentric points and a model (rock, grass, flower or cone) is drawn
//! once per point through a single instanced draw call.
//!
//! # Key entry points
//!
//! - [`scene::ScatterScene`] - owns the surface, the points, the instance
//!   batch and every GPU resource behind them; generic over a
//!   [`gpu::backend::RenderBackend`]
//! - [`engine::ScatterEngine`] - the windowed renderer around a scene
//! - [`options::Options`] - the live control tree (TOML presets, JSON
//!   Schema, panel edits)
//! - [`sampling::PointSampler`] - uniform-by-triangle point sampling
//!
//! # Architecture
//!
//! Option edits flow into [`ScatterScene::set_options`](scene::ScatterScene::set_options),
//! which rebuilds only what went stale and always releases old resources
//! before creating new ones. Models load on worker threads through
//! [`assets::AssetLoader`]; a superseded load is cancelled and its result
//! discarded, so the scene only ever instances the model currently
//! selected.

pub mod assets;
pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod instancing;
pub mod options;
pub mod renderer;
pub mod sampling;
pub mod scene;
pub mod surface;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use engine::command::ScatterCommand;
pub use engine::ScatterEngine;
pub use error::ScatterError;
pub use input::{InputEvent, InputProcessor, KeyBindings};
pub use options::Options;
pub use scene::ScatterScene;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
