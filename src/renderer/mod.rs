//! Forward rendering of the scatter scene.

pub(crate) mod pipeline_util;
/// Surface + instance draw pass.
pub mod scatter_pass;
