//! Model assets scattered across the surface.
//!
//! [`AssetLoader`] reads models on short-lived worker threads through a
//! [`ModelSource`]; the main thread polls it once per frame. Every request
//! carries a [`CancellationToken`] and a [`RequestId`], so a load that was
//! superseded by a newer selection is never applied.

pub(crate) mod loader;
mod source;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use loader::{AssetLoader, CancellationToken, RequestId};
pub use source::{GltfSource, ModelSource};

use crate::error::ScatterError;
use crate::gpu::backend::MaterialDesc;
use crate::surface::MeshData;

/// Model that gets instanced at every sampled point.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Rock.
    #[default]
    Rock,
    /// Grass tuft.
    Grass,
    /// Flower.
    Flower,
    /// Traffic cone.
    Cone,
}

impl AssetKind {
    /// Every supported model, in panel order.
    pub const ALL: [Self; 4] = [Self::Rock, Self::Grass, Self::Flower, Self::Cone];

    /// Lowercase name, also the model file stem.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Rock => "rock",
            Self::Grass => "grass",
            Self::Flower => "flower",
            Self::Cone => "cone",
        }
    }

    /// The model after this one in panel order (wraps around).
    #[must_use]
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetKind {
    type Err = ScatterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScatterError::UnknownAsset(s.to_owned()))
    }
}

/// Errors from reading a model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The file could not be read.
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// The file is not valid glTF.
    Gltf {
        /// File that failed.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// The document has no mesh primitive.
    NoMesh(PathBuf),
    /// The first primitive has no POSITION attribute.
    MissingPositions(PathBuf),
    /// The worker thread could not be started or died.
    Worker(String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            }
            Self::Gltf { path, message } => {
                write!(f, "invalid glTF {}: {message}", path.display())
            }
            Self::NoMesh(path) => {
                write!(f, "{} contains no mesh", path.display())
            }
            Self::MissingPositions(path) => {
                write!(f, "{} has a primitive without positions", path.display())
            }
            Self::Worker(msg) => write!(f, "asset worker failed: {msg}"),
        }
    }
}

impl std::error::Error for AssetError {}

/// A model ready for upload: geometry plus a material description.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAsset {
    /// Which model this is.
    pub kind: AssetKind,
    /// Geometry in model space.
    pub mesh: MeshData,
    /// Flat material parameters read from the file.
    pub material: MaterialDesc,
}

/// Where the currently selected model is in its lifecycle.
#[derive(Debug, Clone, Default)]
pub enum AssetState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A load for this kind is in flight.
    Pending(AssetKind),
    /// The model is available.
    Ready(Arc<LoadedAsset>),
    /// The most recent request failed.
    Failed {
        /// Kind that was requested.
        kind: AssetKind,
        /// Why it failed.
        error: AssetError,
    },
}

impl AssetState {
    /// The loaded asset, if ready.
    #[must_use]
    pub fn ready(&self) -> Option<&Arc<LoadedAsset>> {
        match self {
            Self::Ready(asset) => Some(asset),
            _ => None,
        }
    }

    /// `true` while a load is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}
