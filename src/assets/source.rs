use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use super::{AssetError, AssetKind, CancellationToken, LoadedAsset};
use crate::gpu::backend::MaterialDesc;
use crate::options::AssetOptions;
use crate::surface::MeshData;

/// Something that can produce a model for an [`AssetKind`].
///
/// Implementations run on a worker thread. Long-running readers should check
/// `cancel` between stages and bail out early once it is set; the loader
/// drops results from cancelled requests regardless.
pub trait ModelSource: Send + Sync {
    /// Read and decode the model for `kind`.
    fn load(
        &self,
        kind: AssetKind,
        cancel: &CancellationToken,
    ) -> Result<LoadedAsset, AssetError>;

    /// Point later loads at a new asset location. Sources that do not read
    /// from disk can ignore this.
    fn set_assets(&self, _assets: &AssetOptions) {}
}

/// Reads `<root>/<kind>.<ext>` with the `gltf` crate.
#[derive(Debug)]
pub struct GltfSource {
    assets: RwLock<AssetOptions>,
}

impl GltfSource {
    /// Source reading model files from the configured asset root.
    #[must_use]
    pub fn new(assets: AssetOptions) -> Self {
        Self {
            assets: RwLock::new(assets),
        }
    }

    /// Where `kind` is read from under the current configuration.
    #[must_use]
    pub fn model_path(&self, kind: AssetKind) -> PathBuf {
        self.assets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .model_path(kind)
    }
}

impl ModelSource for GltfSource {
    fn load(
        &self,
        kind: AssetKind,
        cancel: &CancellationToken,
    ) -> Result<LoadedAsset, AssetError> {
        let path = self.model_path(kind);
        let (document, buffers, _images) =
            gltf::import(&path).map_err(|e| import_error(&path, e))?;
        if cancel.is_cancelled() {
            // Nobody will look at this result; skip the decode.
            return Err(AssetError::Worker("cancelled".to_owned()));
        }

        let primitive = document
            .meshes()
            .next()
            .and_then(|mesh| mesh.primitives().next())
            .ok_or_else(|| AssetError::NoMesh(path.clone()))?;
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(AssetError::Gltf {
                message: format!("{:?} primitives are not supported", primitive.mode()),
                path,
            });
        }
        let reader = primitive
            .reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| AssetError::MissingPositions(path.clone()))?
            .collect();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(Iterator::collect)
            .unwrap_or_default();
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|tc| tc.into_f32().collect())
            .unwrap_or_default();
        let indices: Vec<u32> = reader.read_indices().map_or_else(
            || (0..positions.len() as u32).collect(),
            |idx| idx.into_u32().collect(),
        );

        let mut mesh = MeshData {
            positions,
            normals,
            uvs,
            indices,
        };
        if mesh.normals.len() != mesh.positions.len() {
            mesh.compute_normals();
        }
        if !mesh.indices_in_bounds() {
            return Err(AssetError::Gltf {
                path,
                message: "index references a missing vertex".to_owned(),
            });
        }

        let pbr = primitive.material().pbr_metallic_roughness();
        let material = MaterialDesc {
            base_color: pbr.base_color_factor(),
            roughness: pbr.roughness_factor(),
            double_sided: primitive.material().double_sided(),
            textures: None,
        };

        log::debug!(
            "decoded {}: {} vertices, {} triangles",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(LoadedAsset {
            kind,
            mesh,
            material,
        })
    }

    fn set_assets(&self, assets: &AssetOptions) {
        *self.assets.write().unwrap_or_else(PoisonError::into_inner) = assets.clone();
    }
}

fn import_error(path: &Path, error: gltf::Error) -> AssetError {
    match error {
        gltf::Error::Io(e) => AssetError::Io {
            path: path.to_owned(),
            message: e.to_string(),
        },
        other => AssetError::Gltf {
            path: path.to_owned(),
            message: other.to_string(),
        },
    }
}
