//! Centralized scene options with TOML preset support.
//!
//! Everything the control panel can change (surface shape and placement,
//! particle count/size/model/visibility, sun, camera, performance overlay)
//! lives here. Options serialize to/from TOML for presets, and
//! [`Options::json_schema`] describes the UI-exposed subset so an external
//! widget provider can render the panel.

mod assets;
mod camera;
mod debug;
mod lighting;
mod particles;
mod surface;

use std::path::Path;

pub use assets::{AssetOptions, TextureMaps};
pub use camera::CameraOptions;
pub use debug::DebugOptions;
pub use lighting::LightingOptions;
pub use particles::ParticleOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use surface::{Placement, Rotation, SurfaceOptions};

use crate::assets::AssetKind;
use crate::error::ScatterError;
use crate::input::KeyBindings;
use crate::surface::ShapeKind;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[particles]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct Options {
    /// Scatter surface.
    pub surface: SurfaceOptions,
    /// Scattered instances.
    pub particles: ParticleOptions,
    /// Sun and ambient light.
    pub lighting: LightingOptions,
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
    /// Performance overlay.
    pub debug: DebugOptions,
    /// Asset file locations.
    #[schemars(skip)]
    pub assets: AssetOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeyBindings,
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ScatterError> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ScatterError::invalid(
            field,
            format!("{value} is outside [{min}, {max}]"),
        ))
    }
}

fn check_finite(field: &str, values: &[f32]) -> Result<(), ScatterError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ScatterError::invalid(field, "must be finite"))
    }
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults; values
    /// are validated after parsing.
    pub fn load(path: &Path) -> Result<Self, ScatterError> {
        let content = std::fs::read_to_string(path).map_err(ScatterError::Io)?;
        let options: Self = toml::from_str(&content)
            .map_err(|e| ScatterError::OptionsParse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), ScatterError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScatterError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ScatterError::Io)?;
        }
        std::fs::write(path, content).map_err(ScatterError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Check every panel-exposed value against its accepted range.
    pub fn validate(&self) -> Result<(), ScatterError> {
        let s = &self.surface;
        check_finite("surface.size", &[s.size])?;
        check_range(
            "surface.size",
            s.size,
            SurfaceOptions::MIN_SIZE,
            SurfaceOptions::MAX_SIZE,
        )?;
        check_finite("surface.position", &[s.position.x, s.position.z])?;
        check_finite("surface.rotation", &[s.rotation.x, s.rotation.y, s.rotation.z])?;

        let p = &self.particles;
        check_range(
            "particles.count",
            p.count,
            ParticleOptions::MIN_COUNT,
            ParticleOptions::MAX_COUNT,
        )?;
        check_finite("particles.size", &[p.size])?;
        check_range(
            "particles.size",
            p.size,
            ParticleOptions::MIN_SIZE,
            ParticleOptions::MAX_SIZE,
        )?;

        let l = &self.lighting;
        check_finite("lighting.sun_position", &l.sun_position)?;
        if l.sun_position == [0.0; 3] {
            return Err(ScatterError::invalid(
                "lighting.sun_position",
                "must not be the origin",
            ));
        }
        check_finite("lighting.sun_intensity", &[l.sun_intensity])?;
        check_range(
            "lighting.sun_intensity",
            l.sun_intensity,
            LightingOptions::MIN_SUN_INTENSITY,
            LightingOptions::MAX_SUN_INTENSITY,
        )?;

        let c = &self.camera;
        check_finite("camera", &[c.fovy, c.znear, c.zfar])?;
        if c.znear <= 0.0 || c.zfar <= c.znear {
            return Err(ScatterError::invalid(
                "camera.znear",
                "require 0 < znear < zfar",
            ));
        }
        check_range("camera.fovy", c.fovy, 1.0, 179.0)?;

        check_range(
            "debug.report_interval_secs",
            self.debug.report_interval_secs,
            0.1,
            3600.0,
        )
    }

    /// Apply a single panel edit (`section.field = value`).
    ///
    /// Shape and model names are parsed strictly so an unrecognized name is
    /// reported as [`ScatterError::UnknownShape`] /
    /// [`ScatterError::UnknownAsset`]. On any error the options are left
    /// unchanged.
    pub fn apply_edit(
        &mut self,
        section: &str,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), ScatterError> {
        let value = match (section, field, value) {
            ("surface", "shape", serde_json::Value::String(name)) => {
                serde_json::Value::from(name.parse::<ShapeKind>()?.name())
            }
            ("particles", "model", serde_json::Value::String(name)) => {
                serde_json::Value::from(name.parse::<AssetKind>()?.name())
            }
            (_, _, value) => value,
        };

        let path = format!("{section}.{field}");
        let mut root = serde_json::to_value(&*self)
            .map_err(|e| ScatterError::OptionsParse(e.to_string()))?;
        let slot = root
            .get_mut(section)
            .and_then(|s| s.get_mut(field))
            .ok_or_else(|| ScatterError::invalid(&path, "no such option"))?;
        *slot = value;

        let updated: Self = serde_json::from_value(root)
            .map_err(|e| ScatterError::invalid(&path, e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
