//! Artifact registry: lazily loaded, versioned handle to the model bundle.
//!
//! `load()` reads the models directory once and hands out the same
//! `Arc<ArtifactBundle>` until `reload()` builds a fresh bundle and swaps the
//! reference. Readers holding the previous `Arc` keep a consistent snapshot.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

pub mod bundle;
pub mod scales;

pub use bundle::*;
pub use scales::*;

use crate::config::Settings;

pub struct ArtifactRegistry {
    dir: PathBuf,
    current: RwLock<Option<Arc<ArtifactBundle>>>,
    next_version: AtomicU64,
}

impl ArtifactRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: RwLock::new(None),
            next_version: AtomicU64::new(1),
        }
    }

    /// Process-wide registry rooted at the configured models directory.
    pub fn global() -> &'static ArtifactRegistry {
        static GLOBAL: OnceLock<ArtifactRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| ArtifactRegistry::new(Settings::from_env().models_dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The cached bundle, loading it on first use.
    pub fn load(&self) -> Arc<ArtifactBundle> {
        {
            let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
            if let Some(bundle) = guard.as_ref() {
                return Arc::clone(bundle);
            }
        }

        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have loaded while we waited for the write lock.
        if let Some(bundle) = guard.as_ref() {
            return Arc::clone(bundle);
        }
        let bundle = Arc::new(self.read_bundle());
        *guard = Some(Arc::clone(&bundle));
        bundle
    }

    /// Re-read storage and swap in the new bundle.
    pub fn reload(&self) -> Arc<ArtifactBundle> {
        let bundle = Arc::new(self.read_bundle());
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let previous = guard.replace(Arc::clone(&bundle));
        tracing::info!(
            previous = previous.map(|b| b.version()),
            current = bundle.version(),
            "artifact bundle reloaded"
        );
        bundle
    }

    /// Version of the cached bundle, if one has been loaded.
    pub fn loaded_version(&self) -> Option<u64> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|b| b.version())
    }

    fn read_bundle(&self) -> ArtifactBundle {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        ArtifactBundle::load_dir(&self.dir, version)
    }
}
