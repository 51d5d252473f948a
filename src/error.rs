//! Crate-level error types.

use std::fmt;

use crate::assets::AssetError;
use crate::gpu::render_context::RenderContextError;

/// Errors produced by the strew crate.
#[derive(Debug)]
pub enum ScatterError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// A surface shape name that is not one of the supported primitives.
    UnknownShape(String),
    /// A model name that is not one of the supported assets.
    UnknownAsset(String),
    /// An option value failed validation.
    InvalidOption {
        /// Dotted path of the offending field (e.g. `particles.count`).
        field: String,
        /// Human-readable reason.
        reason: String,
    },
    /// Failed to load or decode a model asset.
    Asset(AssetError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML/JSON options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl ScatterError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ScatterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::UnknownShape(name) => {
                write!(
                    f,
                    "unknown surface shape '{name}' (expected plane, cube, \
                     sphere or cone)"
                )
            }
            Self::UnknownAsset(name) => {
                write!(
                    f,
                    "unknown model '{name}' (expected rock, grass, flower or \
                     cone)"
                )
            }
            Self::InvalidOption { field, reason } => {
                write!(f, "invalid option {field}: {reason}")
            }
            Self::Asset(e) => write!(f, "asset error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for ScatterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Asset(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for ScatterError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<AssetError> for ScatterError {
    fn from(e: AssetError) -> Self {
        Self::Asset(e)
    }
}

impl From<std::io::Error> for ScatterError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
