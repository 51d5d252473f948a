use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sun and ambient light.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Sun", inline)]
#[serde(default)]
pub struct LightingOptions {
    /// Sun position; the light shines from here toward the origin.
    #[schemars(title = "Sun Position")]
    pub sun_position: [f32; 3],
    /// Sun radiance multiplier.
    #[schemars(title = "Sun Intensity", range(min = 1.0, max = 10.0), extend("step" = 0.5))]
    pub sun_intensity: f32,
    /// Strength of the sky fill light.
    #[schemars(title = "Ambient", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub ambient: f32,
    /// Exposure applied before tone mapping.
    #[schemars(skip)]
    pub exposure: f32,
    /// Linear RGB tint of the ambient term.
    #[schemars(skip)]
    pub sky_color: [f32; 3],
}

impl LightingOptions {
    /// Smallest accepted sun intensity.
    pub const MIN_SUN_INTENSITY: f32 = 1.0;
    /// Largest accepted sun intensity.
    pub const MAX_SUN_INTENSITY: f32 = 10.0;
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            sun_position: [0.8, 0.2, -0.4],
            sun_intensity: 5.0,
            ambient: 1.0,
            exposure: 0.35,
            sky_color: [0.62, 0.71, 0.82],
        }
    }
}
