//! The live scatter scene: one surface, one instance batch.
//!
//! [`ScatterScene`] is the single owner of both drawables and of the GPU
//! resources behind them. Every option change goes through
//! [`ScatterScene::set_options`], which works out what is stale and
//! rebuilds only that, always releasing the old resources before creating
//! new ones:
//!
//! | change                         | surface | resample | batch        |
//! |--------------------------------|---------|----------|--------------|
//! | shape, size, position, rotation| rebuild | yes      | rebuild      |
//! | particle count                 |         | yes      | rebuild      |
//! | particle size                  |         |          | rebuild      |
//! | model                          |         |          | after load   |
//! | asset root or model extension  | if root |          | reload model |
//! | visibility                     |         |          | flag only    |

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;

use crate::assets::{AssetLoader, AssetState, LoadedAsset, ModelSource};
use crate::error::ScatterError;
use crate::gpu::backend::{MaterialDesc, RenderBackend, ResourceSet, ResourceStats};
use crate::instancing::{InstanceBatch, InstanceRaw};
use crate::options::Options;
use crate::sampling::{PointSampler, SampledPoints};
use crate::surface::Surface;

/// Coordinator for the surface → sampler → instances pipeline.
pub struct ScatterScene<B: RenderBackend> {
    backend: B,
    loader: AssetLoader,
    sampler: PointSampler<StdRng>,
    options: Options,
    surface: Option<Surface>,
    surface_gpu: Option<ResourceSet<B>>,
    points: SampledPoints,
    batch: Option<InstanceBatch>,
    batch_gpu: Option<ResourceSet<B>>,
    generation: u64,
}

impl<B: RenderBackend> ScatterScene<B> {
    /// Build the initial scene and start loading the selected model.
    pub fn new(
        backend: B,
        source: Arc<dyn ModelSource>,
        options: Options,
    ) -> Result<Self, ScatterError> {
        Self::with_seed(backend, source, options, rand::random())
    }

    /// Like [`new`](Self::new) with a fixed sampling seed.
    pub fn with_seed(
        backend: B,
        source: Arc<dyn ModelSource>,
        options: Options,
        seed: u64,
    ) -> Result<Self, ScatterError> {
        options.validate()?;
        let mut scene = Self {
            backend,
            loader: AssetLoader::new(source),
            sampler: PointSampler::seeded(seed),
            options,
            surface: None,
            surface_gpu: None,
            points: SampledPoints::default(),
            batch: None,
            batch_gpu: None,
            generation: 0,
        };
        scene.rebuild_surface();
        scene.select_model();
        Ok(scene)
    }

    /// Replace the options, rebuilding whatever they invalidate.
    ///
    /// Invalid options are rejected and nothing changes.
    pub fn set_options(&mut self, options: Options) -> Result<(), ScatterError> {
        options.validate()?;
        let old = std::mem::replace(&mut self.options, options);
        let new = &self.options;

        let surface_changed = old.surface != new.surface
            || old.assets.surface_maps != new.assets.surface_maps
            || old.assets.root != new.assets.root;
        let count_changed = old.particles.count != new.particles.count;
        let size_changed = old.particles.size != new.particles.size;
        let models_moved = old.assets.root != new.assets.root
            || old.assets.model_extension != new.assets.model_extension;
        let model_changed = models_moved || old.particles.model != new.particles.model;
        let visibility_changed = old.particles.visible != new.particles.visible;

        if models_moved {
            self.loader.reconfigure(&self.options.assets);
        }
        if surface_changed {
            self.rebuild_surface();
        } else if count_changed {
            self.resample();
        } else if size_changed && !model_changed {
            self.rebuild_batch();
        }

        if model_changed {
            self.select_model();
        } else if visibility_changed {
            let visible = self.options.particles.visible;
            if let Some(batch) = &mut self.batch {
                batch.set_visible(visible);
            }
        }
        Ok(())
    }

    /// Apply one panel edit (`section.field = value`).
    pub fn apply_edit(
        &mut self,
        section: &str,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), ScatterError> {
        let mut options = self.options.clone();
        options.apply_edit(section, field, value)?;
        self.set_options(options)
    }

    /// Poll the asset loader; rebuilds the batch when the selected model
    /// arrives. Returns `true` when the scene changed.
    pub fn update(&mut self) -> bool {
        match self.loader.poll() {
            Some(state) => self.on_asset_state(&state),
            None => false,
        }
    }

    /// Block until the pending model resolves or `timeout` passes.
    pub fn wait_for_asset(&mut self, timeout: Duration) -> bool {
        match self.loader.poll_timeout(timeout) {
            Some(state) => self.on_asset_state(&state),
            None => false,
        }
    }

    /// Draw new random points and rebuild the batch on them.
    pub fn resample(&mut self) {
        let count = self.options.particles.count as usize;
        self.points = self
            .sampler
            .sample(self.surface.as_ref().map(Surface::mesh), count);
        self.rebuild_batch();
    }

    /// Release every GPU resource and drop both drawables.
    pub fn teardown(&mut self) {
        self.loader.cancel_in_flight();
        self.release_batch();
        if let Some(old) = self.surface_gpu.take() {
            old.release(&mut self.backend);
        }
        self.surface = None;
        self.points = SampledPoints::default();
    }

    /// Current options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The live surface.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Points the current batch was built on (mesh-local space).
    pub fn points(&self) -> &SampledPoints {
        &self.points
    }

    /// The live instance batch.
    pub fn batch(&self) -> Option<&InstanceBatch> {
        self.batch.as_ref()
    }

    /// Where the selected model is in loading.
    pub fn asset_state(&self) -> &AssetState {
        self.loader.state()
    }

    /// GPU resources of the surface.
    pub fn surface_resources(&self) -> Option<&ResourceSet<B>> {
        self.surface_gpu.as_ref()
    }

    /// GPU resources of the batch, present only while it should be drawn.
    pub fn batch_resources(&self) -> Option<&ResourceSet<B>> {
        self.batch
            .as_ref()
            .filter(|b| b.is_visible())
            .and(self.batch_gpu.as_ref())
    }

    /// Bumped on every rebuild of either drawable.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The backend resources are allocated from.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend access (e.g. for drawing).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Live resource counts.
    pub fn stats(&self) -> ResourceStats {
        self.backend.stats()
    }

    fn on_asset_state(&mut self, state: &AssetState) -> bool {
        match state {
            AssetState::Ready(asset) if asset.kind == self.options.particles.model => {
                self.rebuild_batch();
                true
            }
            AssetState::Failed { kind, error } => {
                log::error!("no {kind} instances: {error}");
                false
            }
            _ => false,
        }
    }

    fn select_model(&mut self) {
        let kind = self.options.particles.model;
        let ready = self.loader.request(kind).ready().is_some();
        if ready {
            self.rebuild_batch();
        } else {
            // The old model must not linger while the new one loads.
            self.release_batch();
        }
    }

    fn rebuild_surface(&mut self) {
        if let Some(old) = self.surface_gpu.take() {
            old.release(&mut self.backend);
        }
        let surface = Surface::build(&self.options.surface);
        let material = MaterialDesc {
            double_sided: true,
            textures: Some(self.options.assets.resolved_surface_maps()),
            ..MaterialDesc::default()
        };
        self.surface_gpu = Some(ResourceSet::create(
            &mut self.backend,
            surface.name(),
            surface.mesh(),
            &material,
            &[InstanceRaw::from_mat4(&surface.transform())],
        ));
        log::info!(
            "surface: {} size {} ({} triangles)",
            surface.name(),
            surface.size(),
            surface.mesh().triangle_count()
        );
        self.surface = Some(surface);
        self.generation += 1;
        self.resample();
    }

    fn current_asset(&self) -> Option<Arc<LoadedAsset>> {
        self.loader
            .state()
            .ready()
            .filter(|a| a.kind == self.options.particles.model)
            .cloned()
    }

    fn rebuild_batch(&mut self) {
        self.release_batch();
        // Instances only ever sit on a surface.
        let Some(root) = self.surface.as_ref().map(Surface::transform) else {
            return;
        };
        let asset = self.current_asset();
        let Some(batch) = InstanceBatch::build(
            &self.points,
            &self.options.particles,
            asset.as_deref(),
            root,
            self.sampler.rng_mut(),
        ) else {
            log::debug!("{} not loaded yet; no instances", self.options.particles.model);
            return;
        };
        let Some(asset) = asset else {
            return;
        };

        self.batch_gpu = Some(ResourceSet::create(
            &mut self.backend,
            asset.kind.name(),
            &asset.mesh,
            &asset.material,
            &batch.world_instances(),
        ));
        log::info!("{} × {} at size {}", batch.len(), batch.kind(), batch.scale());
        self.batch = Some(batch);
        self.generation += 1;
    }

    fn release_batch(&mut self) {
        if let Some(old) = self.batch_gpu.take() {
            old.release(&mut self.backend);
        }
        self.batch = None;
    }
}

impl<B: RenderBackend> Drop for ScatterScene<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::assets::loader::tests::GatedSource;
    use crate::assets::AssetKind;
    use crate::gpu::backend::HeadlessBackend;
    use crate::surface::ShapeKind;

    const WAIT: Duration = Duration::from_secs(5);

    fn ready_scene(options: Options) -> ScatterScene<HeadlessBackend> {
        let mut scene = ScatterScene::with_seed(
            HeadlessBackend::new(),
            GatedSource::holding(&[]),
            options,
            42,
        )
        .unwrap();
        assert!(scene.wait_for_asset(WAIT));
        scene
    }

    fn live(scene: &ScatterScene<HeadlessBackend>) -> (usize, usize, usize) {
        let s = scene.stats();
        (s.meshes, s.materials, s.instance_buffers)
    }

    #[test]
    fn initial_scene_has_surface_and_batch() {
        let scene = ready_scene(Options::default());
        assert_eq!(scene.surface().unwrap().kind(), ShapeKind::Plane);
        assert_eq!(scene.points().len(), 200);
        assert_eq!(scene.batch().unwrap().len(), 200);
        assert_eq!(live(&scene), (2, 2, 2));
        assert!(scene.batch_resources().is_some());
    }

    #[test]
    fn repeated_changes_never_accumulate_resources() {
        let mut scene = ready_scene(Options::default());
        let edits = [
            ("surface", "shape", json!("sphere")),
            ("surface", "size", json!(3.5)),
            ("particles", "count", json!(50)),
            ("surface", "shape", json!("cone")),
            ("particles", "size", json!(0.4)),
            ("surface", "rotation", json!({"x": 0.0, "y": 45.0, "z": 0.0})),
            ("surface", "shape", json!("cube")),
            ("particles", "count", json!(1234)),
        ];
        for (section, field, value) in edits {
            scene.apply_edit(section, field, value).unwrap();
            assert_eq!(live(&scene), (2, 2, 2), "after {section}.{field}");
            assert_eq!(
                scene.points().len(),
                scene.options().particles.count as usize
            );
        }
        let stats = scene.stats();
        assert_eq!(stats.created - stats.released, 6);
        assert_eq!(scene.surface().unwrap().kind(), ShapeKind::Cube);
        assert_eq!(scene.batch().unwrap().len(), 1234);
    }

    #[test]
    fn plane_of_ten_points_lies_on_the_ground() {
        let mut options = Options::default();
        options.particles.count = 10;
        let scene = ready_scene(options);
        let surface = scene.surface().unwrap();
        let world = scene.points().to_world(&surface.transform());
        assert_eq!(world.len(), 10);
        for p in world {
            assert!(p.y.abs() < 1e-5);
            assert!(p.x.abs() <= 2.5 && p.z.abs() <= 2.5);
        }
    }

    #[test]
    fn stale_model_is_never_instanced() {
        let source = GatedSource::holding(&[AssetKind::Rock]);
        let mut scene = ScatterScene::with_seed(
            HeadlessBackend::new(),
            source.clone(),
            Options::default(),
            1,
        )
        .unwrap();
        assert!(scene.asset_state().is_pending());
        assert!(scene.batch().is_none());

        scene.apply_edit("particles", "model", json!("grass")).unwrap();
        assert!(scene.wait_for_asset(WAIT));
        assert_eq!(scene.batch().unwrap().kind(), AssetKind::Grass);

        source.open(AssetKind::Rock);
        std::thread::sleep(Duration::from_millis(50));
        assert!(!scene.update());
        assert_eq!(scene.batch().unwrap().kind(), AssetKind::Grass);
        assert_eq!(live(&scene), (2, 2, 2));
    }

    #[test]
    fn switching_to_unloaded_model_drops_old_batch() {
        let source = GatedSource::holding(&[AssetKind::Flower]);
        let mut scene = ScatterScene::with_seed(
            HeadlessBackend::new(),
            source.clone(),
            Options::default(),
            2,
        )
        .unwrap();
        assert!(scene.wait_for_asset(WAIT));
        assert_eq!(live(&scene), (2, 2, 2));

        scene.apply_edit("particles", "model", json!("flower")).unwrap();
        assert!(scene.batch().is_none());
        assert_eq!(live(&scene), (1, 1, 1));

        source.open(AssetKind::Flower);
        assert!(scene.wait_for_asset(WAIT));
        assert_eq!(scene.batch().unwrap().kind(), AssetKind::Flower);

        // Back to rock: cached, so immediate.
        scene.apply_edit("particles", "model", json!("rock")).unwrap();
        assert_eq!(scene.batch().unwrap().kind(), AssetKind::Rock);
        assert_eq!(live(&scene), (2, 2, 2));
    }

    #[test]
    fn failed_load_leaves_surface_only() {
        let source = GatedSource::holding(&[]);
        source.failing.lock().unwrap().push(AssetKind::Rock);
        let mut scene =
            ScatterScene::with_seed(HeadlessBackend::new(), source, Options::default(), 3)
                .unwrap();
        assert!(!scene.wait_for_asset(WAIT));
        assert!(matches!(scene.asset_state(), AssetState::Failed { .. }));
        assert!(scene.batch().is_none());
        assert_eq!(scene.points().len(), 200);
        assert_eq!(live(&scene), (1, 1, 1));
    }

    #[test]
    fn moving_the_asset_root_reloads_the_model() {
        let source = GatedSource::holding(&[]);
        let mut scene = ScatterScene::with_seed(
            HeadlessBackend::new(),
            source.clone(),
            Options::default(),
            4,
        )
        .unwrap();
        assert!(scene.wait_for_asset(WAIT));
        assert_eq!(source.loads.lock().unwrap().len(), 1);

        let mut options = scene.options().clone();
        options.assets.root = "mods/desert".into();
        options.assets.model_extension = "glb".to_owned();
        scene.set_options(options.clone()).unwrap();
        assert!(scene.batch().is_none());
        assert!(scene.asset_state().is_pending());

        assert!(scene.wait_for_asset(WAIT));
        let loads = source.loads.lock().unwrap();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[1], (AssetKind::Rock, Some(options.assets)));
        drop(loads);
        assert_eq!(scene.batch().unwrap().kind(), AssetKind::Rock);
        assert_eq!(live(&scene), (2, 2, 2));
    }

    #[test]
    fn visibility_is_a_flag_not_a_rebuild() {
        let mut scene = ready_scene(Options::default());
        let created = scene.stats().created;
        scene.apply_edit("particles", "visible", json!(false)).unwrap();
        assert_eq!(scene.stats().created, created);
        assert!(!scene.batch().unwrap().is_visible());
        assert!(scene.batch_resources().is_none());
        scene.apply_edit("particles", "visible", json!(true)).unwrap();
        assert!(scene.batch_resources().is_some());
    }

    #[test]
    fn rejected_edit_changes_nothing() {
        let mut scene = ready_scene(Options::default());
        let before = scene.stats();
        let generation = scene.generation();
        assert!(matches!(
            scene.apply_edit("surface", "shape", json!("torus")),
            Err(ScatterError::UnknownShape(_))
        ));
        assert!(scene.apply_edit("particles", "count", json!(0)).is_err());
        assert_eq!(scene.stats(), before);
        assert_eq!(scene.generation(), generation);
    }

    #[test]
    fn teardown_releases_everything() {
        let mut scene = ready_scene(Options::default());
        scene.teardown();
        let stats = scene.stats();
        assert_eq!(stats.live(), 0);
        assert_eq!(stats.created, stats.released);
        assert!(scene.surface().is_none());
        assert!(scene.points().is_empty());
    }

    #[test]
    fn particle_edits_after_teardown_instance_nothing() {
        let mut scene = ready_scene(Options::default());
        scene.teardown();
        scene.apply_edit("particles", "count", json!(50)).unwrap();
        scene.apply_edit("particles", "size", json!(0.5)).unwrap();
        scene.apply_edit("particles", "model", json!("cone")).unwrap();
        let _ = scene.wait_for_asset(WAIT);
        assert!(scene.points().is_empty());
        assert!(scene.batch().is_none());
        assert_eq!(scene.stats().live(), 0);
    }

    #[test]
    fn resample_moves_points_but_keeps_count() {
        let mut scene = ready_scene(Options::default());
        let before = scene.points().clone();
        scene.resample();
        assert_eq!(scene.points().len(), before.len());
        assert_ne!(scene.points(), &before);
        assert_eq!(live(&scene), (2, 2, 2));
    }
}
