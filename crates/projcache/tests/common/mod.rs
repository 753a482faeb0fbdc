//! Shared collaborators for projcache integration tests.
#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, Receiver, Sender};
use projcache::ConfigCache;
use projcache_core::errors::{ParseError, StorageError, WatchError};
use projcache_core::events::types::{
    EvictedEvent, HitEvent, InvalidatedEvent, InvalidationReason, LoadFailedEvent, PopulatedEvent,
};
use projcache_core::{
    AccessControl, CacheConfig, CacheEventHandler, CacheKey, CacheWeight, ConfigParsers,
    DocumentStorage, ParameterMap, PathWatcher, TierKind, XmlDocument,
};

// ---- storage ----

#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    reads: AtomicUsize,
}

impl MemoryStorage {
    pub fn put(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), contents.into());
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        self.files.lock().unwrap().remove(path.as_ref());
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl DocumentStorage for MemoryStorage {
    fn read(&self, key: &CacheKey) -> Result<Vec<u8>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .get(key.as_path())
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: key.to_string(),
            })
    }
}

/// Blocks the next read until released, so a test can invalidate mid-load.
pub struct GatedStorage {
    pub inner: MemoryStorage,
    armed: AtomicBool,
    entered: Sender<()>,
    release: Receiver<()>,
}

pub struct Gate {
    pub entered: Receiver<()>,
    pub release: Sender<()>,
}

impl GatedStorage {
    pub fn new() -> (Self, Gate) {
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);
        let storage = Self {
            inner: MemoryStorage::default(),
            armed: AtomicBool::new(true),
            entered: entered_tx,
            release: release_rx,
        };
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (storage, gate)
    }
}

impl DocumentStorage for GatedStorage {
    fn read(&self, key: &CacheKey) -> Result<Vec<u8>, StorageError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.send(()).unwrap();
            self.release.recv().unwrap();
        }
        self.inner.read(key)
    }
}

// ---- parsers ----

#[derive(Default)]
pub struct Counters {
    pub project_parsers: AtomicUsize,
    pub protocol_parsers: AtomicUsize,
    pub projects: AtomicUsize,
}

impl Counters {
    pub fn project_parsers(&self) -> usize {
        self.project_parsers.load(Ordering::SeqCst)
    }

    pub fn protocol_parsers(&self) -> usize {
        self.protocol_parsers.load(Ordering::SeqCst)
    }

    pub fn projects(&self) -> usize {
        self.projects.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct ProjectView {
    pub title: String,
}

#[derive(Debug)]
pub struct ProtocolView {
    pub title: String,
    pub access: Option<String>,
    pub params: ParameterMap,
}

impl CacheWeight for ProtocolView {}

#[derive(Debug)]
pub struct Project {
    pub name: String,
    pub layers: usize,
    size: usize,
}

impl CacheWeight for Project {
    fn cache_weight(&self) -> u32 {
        u32::try_from(self.size).unwrap_or(u32::MAX).max(1)
    }
}

/// Accepts documents whose root is `<qgis>`; the title is its `projectname`.
#[derive(Default)]
pub struct TestParsers {
    pub counters: Arc<Counters>,
}

fn checked_title(document: &XmlDocument) -> Result<String, ParseError> {
    let root = document.root();
    if root.name != "qgis" {
        return Err(ParseError::rejected(format!("unexpected root <{}>", root.name)));
    }
    Ok(root.attribute("projectname").unwrap_or_default().to_string())
}

impl ConfigParsers for TestParsers {
    type ProjectParser = ProjectView;
    type ProtocolParser = ProtocolView;
    type Project = Project;

    fn project_parser(&self, document: &XmlDocument) -> Result<ProjectView, ParseError> {
        self.counters.project_parsers.fetch_add(1, Ordering::SeqCst);
        Ok(ProjectView {
            title: checked_title(document)?,
        })
    }

    fn protocol_parser(
        &self,
        document: &XmlDocument,
        access: Option<&dyn AccessControl>,
        params: &ParameterMap,
    ) -> Result<ProtocolView, ParseError> {
        self.counters.protocol_parsers.fetch_add(1, Ordering::SeqCst);
        Ok(ProtocolView {
            title: checked_title(document)?,
            access: access.and_then(|a| a.cache_key()),
            params: params.clone(),
        })
    }

    fn parse_project(&self, _key: &CacheKey, bytes: &[u8]) -> Result<Project, ParseError> {
        self.counters.projects.fetch_add(1, Ordering::SeqCst);
        let document = XmlDocument::parse(bytes)?;
        let name = checked_title(&document)?;
        let layers = document
            .root()
            .elements()
            .filter(|e| e.name == "layer")
            .count();
        Ok(Project {
            name,
            layers,
            size: bytes.len(),
        })
    }
}

pub struct Rules(pub &'static str);

impl AccessControl for Rules {
    fn cache_key(&self) -> Option<String> {
        Some(self.0.to_string())
    }
}

// ---- watcher ----

#[derive(Default)]
pub struct RecordingWatcher {
    watched: Mutex<BTreeSet<PathBuf>>,
    pub watch_calls: AtomicUsize,
    pub unwatch_calls: AtomicUsize,
    pub fail_watch: AtomicBool,
}

impl RecordingWatcher {
    pub fn watched(&self) -> Vec<PathBuf> {
        self.watched.lock().unwrap().iter().cloned().collect()
    }

    pub fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }

    pub fn unwatch_calls(&self) -> usize {
        self.unwatch_calls.load(Ordering::SeqCst)
    }
}

impl PathWatcher for RecordingWatcher {
    fn watch(&self, key: &CacheKey) -> Result<(), WatchError> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_watch.load(Ordering::SeqCst) {
            return Err(WatchError::Backend {
                path: key.to_string(),
                message: "watch limit reached".to_string(),
            });
        }
        self.watched.lock().unwrap().insert(key.as_path().to_path_buf());
        Ok(())
    }

    fn unwatch(&self, key: &CacheKey) -> Result<(), WatchError> {
        self.unwatch_calls.fetch_add(1, Ordering::SeqCst);
        self.watched.lock().unwrap().remove(key.as_path());
        Ok(())
    }
}

// ---- events ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Populated(TierKind, PathBuf),
    Hit(TierKind, PathBuf),
    Failed(TierKind, &'static str),
    Invalidated(InvalidationReason, PathBuf),
    Evicted(TierKind, PathBuf),
}

#[derive(Default)]
pub struct RecordingEvents {
    seen: Mutex<Vec<Recorded>>,
}

impl RecordingEvents {
    pub fn take(&self) -> Vec<Recorded> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }

    fn push(&self, event: Recorded) {
        self.seen.lock().unwrap().push(event);
    }
}

impl CacheEventHandler for RecordingEvents {
    fn on_populated(&self, event: &PopulatedEvent) {
        self.push(Recorded::Populated(event.tier, event.key.as_path().to_path_buf()));
    }

    fn on_hit(&self, event: &HitEvent) {
        self.push(Recorded::Hit(event.tier, event.key.as_path().to_path_buf()));
    }

    fn on_load_failed(&self, event: &LoadFailedEvent) {
        self.push(Recorded::Failed(event.tier, event.code));
    }

    fn on_invalidated(&self, event: &InvalidatedEvent) {
        self.push(Recorded::Invalidated(event.reason, event.key.as_path().to_path_buf()));
    }

    fn on_evicted(&self, event: &EvictedEvent) {
        self.push(Recorded::Evicted(event.tier, event.key.as_path().to_path_buf()));
    }
}

// ---- fixture ----

pub struct Fixture {
    pub cache: ConfigCache<TestParsers>,
    pub storage: Arc<MemoryStorage>,
    pub watcher: Arc<RecordingWatcher>,
    pub counters: Arc<Counters>,
    pub events: Arc<RecordingEvents>,
}

pub fn fixture(config: CacheConfig) -> Fixture {
    let storage = Arc::new(MemoryStorage::default());
    let watcher = Arc::new(RecordingWatcher::default());
    let events = Arc::new(RecordingEvents::default());
    let parsers = TestParsers::default();
    let counters = Arc::clone(&parsers.counters);
    let cache = ConfigCache::builder(parsers)
        .config(config)
        .storage(Arc::clone(&storage) as Arc<dyn DocumentStorage>)
        .watcher(Arc::clone(&watcher) as Arc<dyn PathWatcher>)
        .event_handler(Arc::clone(&events) as Arc<dyn CacheEventHandler>)
        .build()
        .unwrap();
    Fixture {
        cache,
        storage,
        watcher,
        counters,
        events,
    }
}

pub fn project_xml(name: &str) -> String {
    format!(r#"<qgis projectname="{name}"><layer id="roads"/><layer id="rivers"/></qgis>"#)
}

pub fn key(path: &str) -> CacheKey {
    CacheKey::new(path).unwrap()
}
