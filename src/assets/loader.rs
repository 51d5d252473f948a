use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use rustc_hash::FxHashMap;
use web_time::Instant;

use super::{AssetError, AssetKind, AssetState, LoadedAsset, ModelSource};
use crate::options::AssetOptions;

/// Shared flag telling a worker its result is no longer wanted.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the request as superseded.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Monotonically increasing id of a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct LoadResult {
    id: RequestId,
    kind: AssetKind,
    result: Result<LoadedAsset, AssetError>,
}

struct InFlight {
    id: RequestId,
    kind: AssetKind,
    token: CancellationToken,
}

/// Loads models off the main thread and keeps only the latest request.
pub struct AssetLoader {
    source: Arc<dyn ModelSource>,
    result_tx: mpsc::Sender<LoadResult>,
    result_rx: mpsc::Receiver<LoadResult>,
    cache: FxHashMap<AssetKind, Arc<LoadedAsset>>,
    in_flight: Option<InFlight>,
    next_id: u64,
    state: AssetState,
}

impl AssetLoader {
    /// Loader reading through `source`.
    pub fn new(source: Arc<dyn ModelSource>) -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        Self {
            source,
            result_tx,
            result_rx,
            cache: FxHashMap::default(),
            in_flight: None,
            next_id: 0,
            state: AssetState::Idle,
        }
    }

    /// Current state of the latest request.
    #[must_use]
    pub fn state(&self) -> &AssetState {
        &self.state
    }

    /// Id of the request still in flight, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|f| f.id)
    }

    /// Select `kind` as the wanted model.
    ///
    /// Any earlier in-flight request is cancelled. Cached kinds become
    /// [`AssetState::Ready`] immediately; otherwise a worker is spawned and
    /// the state is [`AssetState::Pending`] until [`poll`](Self::poll) sees
    /// its result.
    pub fn request(&mut self, kind: AssetKind) -> &AssetState {
        if let Some(current) = &self.in_flight {
            if current.kind == kind {
                return &self.state;
            }
        }
        self.cancel_in_flight();

        if let Some(asset) = self.cache.get(&kind) {
            self.state = AssetState::Ready(Arc::clone(asset));
            return &self.state;
        }

        self.next_id += 1;
        let id = RequestId(self.next_id);
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let source = Arc::clone(&self.source);
        let tx = self.result_tx.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("asset-{kind}"))
            .spawn(move || {
                let result = source.load(kind, &worker_token);
                if worker_token.is_cancelled() {
                    log::debug!("dropping cancelled {kind} load {id}");
                    return;
                }
                let _ = tx.send(LoadResult { id, kind, result });
            });

        match spawned {
            Ok(_handle) => {
                log::debug!("loading {kind} ({id})");
                self.in_flight = Some(InFlight { id, kind, token });
                self.state = AssetState::Pending(kind);
            }
            Err(e) => {
                let error = AssetError::Worker(e.to_string());
                log::warn!("cannot load {kind}: {error}");
                self.state = AssetState::Failed { kind, error };
            }
        }
        &self.state
    }

    /// Drain finished loads without blocking. Returns the new state when the
    /// current request resolved during this call.
    pub fn poll(&mut self) -> Option<AssetState> {
        let mut changed = None;
        while let Ok(msg) = self.result_rx.try_recv() {
            if let Some(state) = self.accept(msg) {
                changed = Some(state);
            }
        }
        changed
    }

    /// Block until the current request resolves or `timeout` elapses.
    pub fn poll_timeout(&mut self, timeout: Duration) -> Option<AssetState> {
        let deadline = Instant::now() + timeout;
        while self.in_flight.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Ok(msg) = self.result_rx.recv_timeout(remaining) else {
                break;
            };
            if let Some(state) = self.accept(msg) {
                return Some(state);
            }
        }
        None
    }

    /// Cancel whatever is in flight. The state keeps its last value.
    pub fn cancel_in_flight(&mut self) {
        if let Some(prev) = self.in_flight.take() {
            prev.token.cancel();
            log::debug!("cancelled {} load {}", prev.kind, prev.id);
        }
    }

    /// Point the source at a new asset location. Everything loaded from the
    /// old one is forgotten and the state returns to [`AssetState::Idle`].
    pub fn reconfigure(&mut self, assets: &AssetOptions) {
        self.cancel_in_flight();
        self.cache.clear();
        self.source.set_assets(assets);
        self.state = AssetState::Idle;
        log::info!("model files now read from {}", assets.root.display());
    }

    fn accept(&mut self, msg: LoadResult) -> Option<AssetState> {
        let is_current = self.in_flight.as_ref().is_some_and(|f| f.id == msg.id);
        if !is_current {
            log::debug!("discarding stale {} load {}", msg.kind, msg.id);
            return None;
        }
        self.in_flight = None;

        self.state = match msg.result {
            Ok(asset) => {
                let asset = Arc::new(asset);
                let _ = self.cache.insert(msg.kind, Arc::clone(&asset));
                log::info!("loaded {} model", msg.kind);
                AssetState::Ready(asset)
            }
            Err(error) => {
                log::warn!("failed to load {} model: {error}", msg.kind);
                AssetState::Failed {
                    kind: msg.kind,
                    error,
                }
            }
        };
        Some(self.state.clone())
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Condvar, Mutex};

    use super::*;
    use crate::gpu::backend::MaterialDesc;
    use crate::surface::primitives;

    /// Source that returns a tiny mesh per kind, optionally holding selected
    /// kinds until [`GatedSource::open`] is called.
    #[derive(Default)]
    pub(crate) struct GatedSource {
        held: Mutex<Vec<AssetKind>>,
        released: Condvar,
        pub(crate) failing: Mutex<Vec<AssetKind>>,
        pub(crate) loads: Mutex<Vec<(AssetKind, Option<AssetOptions>)>>,
        configured: Mutex<Option<AssetOptions>>,
    }

    impl GatedSource {
        pub(crate) fn holding(kinds: &[AssetKind]) -> Arc<Self> {
            let source = Self::default();
            *source.held.lock().unwrap() = kinds.to_vec();
            Arc::new(source)
        }

        pub(crate) fn open(&self, kind: AssetKind) {
            self.held.lock().unwrap().retain(|&k| k != kind);
            self.released.notify_all();
        }
    }

    impl ModelSource for GatedSource {
        fn load(
            &self,
            kind: AssetKind,
            _cancel: &CancellationToken,
        ) -> Result<LoadedAsset, AssetError> {
            let mut held = self.held.lock().unwrap();
            while held.contains(&kind) {
                held = self.released.wait(held).unwrap();
            }
            drop(held);
            let configured = self.configured.lock().unwrap().clone();
            self.loads.lock().unwrap().push((kind, configured));
            if self.failing.lock().unwrap().contains(&kind) {
                return Err(AssetError::NoMesh(format!("{kind}.gltf").into()));
            }
            Ok(LoadedAsset {
                kind,
                mesh: primitives::cube(1.0),
                material: MaterialDesc::default(),
            })
        }

        fn set_assets(&self, assets: &AssetOptions) {
            *self.configured.lock().unwrap() = Some(assets.clone());
        }
    }

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn ready_after_worker_finishes() {
        let mut loader = AssetLoader::new(GatedSource::holding(&[]));
        assert!(loader.request(AssetKind::Rock).is_pending());
        let state = loader.poll_timeout(WAIT).unwrap();
        assert_eq!(state.ready().unwrap().kind, AssetKind::Rock);
        assert!(loader.in_flight().is_none());
    }

    #[test]
    fn superseded_load_is_never_applied() {
        let source = GatedSource::holding(&[AssetKind::Rock]);
        let mut loader = AssetLoader::new(source.clone());

        let _ = loader.request(AssetKind::Rock);
        let rock_id = loader.in_flight().unwrap();
        let _ = loader.request(AssetKind::Grass);
        assert!(loader.in_flight().unwrap() > rock_id);

        let state = loader.poll_timeout(WAIT).unwrap();
        assert_eq!(state.ready().unwrap().kind, AssetKind::Grass);

        // Let the rock worker finish; its result must be dropped.
        source.open(AssetKind::Rock);
        std::thread::sleep(Duration::from_millis(50));
        assert!(loader.poll().is_none());
        assert_eq!(loader.state().ready().unwrap().kind, AssetKind::Grass);
    }

    #[test]
    fn failure_is_reported_not_hung() {
        let source = GatedSource::holding(&[]);
        source.failing.lock().unwrap().push(AssetKind::Flower);
        let mut loader = AssetLoader::new(source);

        let _ = loader.request(AssetKind::Flower);
        let state = loader.poll_timeout(WAIT).unwrap();
        assert!(matches!(
            state,
            AssetState::Failed { kind: AssetKind::Flower, error: AssetError::NoMesh(_) }
        ));
    }

    #[test]
    fn cached_kind_is_ready_immediately() {
        let mut loader = AssetLoader::new(GatedSource::holding(&[]));
        let _ = loader.request(AssetKind::Cone);
        let _ = loader.poll_timeout(WAIT).unwrap();
        let _ = loader.request(AssetKind::Grass);
        let _ = loader.poll_timeout(WAIT).unwrap();

        let state = loader.request(AssetKind::Cone);
        assert_eq!(state.ready().unwrap().kind, AssetKind::Cone);
        assert!(loader.in_flight().is_none());
    }

    #[test]
    fn reconfigure_forgets_cached_models() {
        let source = GatedSource::holding(&[]);
        let mut loader = AssetLoader::new(source.clone());
        let _ = loader.request(AssetKind::Rock);
        let _ = loader.poll_timeout(WAIT).unwrap();

        let moved = AssetOptions {
            root: "elsewhere".into(),
            ..AssetOptions::default()
        };
        loader.reconfigure(&moved);
        assert!(matches!(loader.state(), AssetState::Idle));

        assert!(loader.request(AssetKind::Rock).is_pending());
        let _ = loader.poll_timeout(WAIT).unwrap();
        let loads = source.loads.lock().unwrap();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[1].1.as_ref(), Some(&moved));
    }

    #[test]
    fn repeated_request_reuses_in_flight_load() {
        let source = GatedSource::holding(&[AssetKind::Rock]);
        let mut loader = AssetLoader::new(source.clone());
        let _ = loader.request(AssetKind::Rock);
        let id = loader.in_flight().unwrap();
        let _ = loader.request(AssetKind::Rock);
        assert_eq!(loader.in_flight(), Some(id));
        source.open(AssetKind::Rock);
        assert!(loader.poll_timeout(WAIT).is_some());
    }
}
