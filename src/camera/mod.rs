//! Orbit camera for viewing the scatter scene.

/// Orbit controller managing rotation, pan, zoom, and GPU resources.
pub mod controller;
/// Core camera struct and GPU uniform types.
pub mod core;
