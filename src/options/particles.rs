use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::assets::AssetKind;

/// Scattered particle configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Model", inline)]
#[serde(default)]
pub struct ParticleOptions {
    /// Number of instances to scatter.
    #[schemars(title = "Count", range(min = 1, max = 100_000), extend("step" = 1))]
    pub count: u32,
    /// Uniform per-instance scale.
    #[schemars(title = "Size", range(min = 0.1, max = 1.0), extend("step" = 0.01))]
    pub size: f32,
    /// Model scattered at every point.
    #[schemars(title = "Model Choice")]
    pub model: AssetKind,
    /// Whether the instance batch is drawn.
    #[schemars(title = "Visibility")]
    pub visible: bool,
}

impl ParticleOptions {
    /// Smallest accepted count.
    pub const MIN_COUNT: u32 = 1;
    /// Largest accepted count.
    pub const MAX_COUNT: u32 = 100_000;
    /// Smallest accepted instance size.
    pub const MIN_SIZE: f32 = 0.1;
    /// Largest accepted instance size.
    pub const MAX_SIZE: f32 = 1.0;
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            count: 200,
            size: 0.1,
            model: AssetKind::Rock,
            visible: true,
        }
    }
}
