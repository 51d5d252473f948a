use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Performance overlay toggle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Performance", inline)]
#[serde(default)]
pub struct DebugOptions {
    /// Periodically log frame rate and live GPU resources.
    #[schemars(title = "Show Performance")]
    pub show_performance: bool,
    /// Seconds between performance log lines.
    #[schemars(skip)]
    pub report_interval_secs: f32,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            show_performance: true,
            report_interval_secs: 2.0,
        }
    }
}
