//! GPU plumbing: device setup, the resource-allocation seam, textures and
//! the lighting uniform.

/// Resource allocation trait plus a counting headless implementation.
pub mod backend;
/// Sun/ambient uniform and its bind group.
pub mod lighting;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// Image-file textures.
pub mod texture;
/// [`backend::RenderBackend`] on a real wgpu device.
pub mod wgpu_backend;
