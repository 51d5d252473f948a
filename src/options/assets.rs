use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::assets::AssetKind;

/// Image files for the surface material, relative to the asset root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TextureMaps {
    /// Base colour (sRGB).
    pub diffuse: PathBuf,
    /// Tangent-space normal map.
    pub normal: PathBuf,
    /// Roughness in the green channel.
    pub roughness: PathBuf,
    /// Ambient occlusion in the red channel.
    pub ambient_occlusion: PathBuf,
}

impl Default for TextureMaps {
    fn default() -> Self {
        Self {
            diffuse: "maps/coast_sand_rocks_02_diff_1k.jpg".into(),
            normal: "maps/coast_sand_rocks_02_nor_dx_1k.jpg".into(),
            roughness: "maps/coast_sand_rocks_02_rough_1k.jpg".into(),
            ambient_occlusion: "maps/coast_sand_rocks_02_ao_1k.jpg".into(),
        }
    }
}

/// Where model and texture files live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AssetOptions {
    /// Directory every other asset path is relative to.
    pub root: PathBuf,
    /// File extension of model files (`<model>.<ext>`).
    pub model_extension: String,
    /// Surface material maps.
    pub surface_maps: TextureMaps,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            root: "assets".into(),
            model_extension: "gltf".into(),
            surface_maps: TextureMaps::default(),
        }
    }
}

impl AssetOptions {
    /// Path of the model file for `kind`.
    #[must_use]
    pub fn model_path(&self, kind: AssetKind) -> PathBuf {
        self.root
            .join(format!("{}.{}", kind.name(), self.model_extension))
    }

    /// Surface maps with every path joined onto the asset root.
    #[must_use]
    pub fn resolved_surface_maps(&self) -> TextureMaps {
        let maps = &self.surface_maps;
        TextureMaps {
            diffuse: self.root.join(&maps.diffuse),
            normal: self.root.join(&maps.normal),
            roughness: self.root.join(&maps.roughness),
            ambient_occlusion: self.root.join(&maps.ambient_occlusion),
        }
    }
}
