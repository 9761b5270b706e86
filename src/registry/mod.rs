//! Pattern Registry - Versioned, swappable pattern tables
//!
//! Classifications take a snapshot (`Arc`) of the active tables at the start
//! of the call, so a reload never exposes a half-updated table. New tables
//! are compiled before the swap; a bad file leaves the previous version
//! active.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{anyhow, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::patterns::{CompiledPatterns, PatternError, PatternTables};

/// One immutable version of the pattern tables
#[derive(Debug)]
pub struct Snapshot {
    pub version: u64,
    pub patterns: CompiledPatterns,
}

/// Shared holder of the active pattern tables
#[derive(Clone, Debug)]
pub struct PatternRegistry {
    active: Arc<RwLock<Arc<Snapshot>>>,
}

impl PatternRegistry {
    pub fn new(patterns: CompiledPatterns) -> Self {
        Self {
            active: Arc::new(RwLock::new(Arc::new(Snapshot {
                version: 1,
                patterns,
            }))),
        }
    }

    /// Registry over the built-in tables
    pub fn builtin() -> Result<Self, PatternError> {
        Ok(Self::new(CompiledPatterns::builtin()?))
    }

    /// Registry over tables loaded from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PatternError> {
        let tables = PatternTables::load(path)?;
        Ok(Self::new(CompiledPatterns::compile(&tables)?))
    }

    /// The active snapshot
    pub fn current(&self) -> Arc<Snapshot> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn version(&self) -> u64 {
        self.current().version
    }

    /// Compile `tables` and make them active. Returns the new version.
    pub fn replace(&self, tables: &PatternTables) -> Result<u64, PatternError> {
        let patterns = CompiledPatterns::compile(tables)?;
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        let version = active.version + 1;
        *active = Arc::new(Snapshot { version, patterns });
        info!(version, "Pattern tables replaced");
        Ok(version)
    }

    /// Load tables from `path` and make them active
    pub fn reload_from(&self, path: impl AsRef<Path>) -> Result<u64, PatternError> {
        let tables = PatternTables::load(path)?;
        self.replace(&tables)
    }

    /// Reload whenever `path` changes on disk.
    ///
    /// Must be called inside a tokio runtime. Watching stops when the
    /// returned watcher is dropped.
    pub fn watch(&self, path: impl AsRef<Path>) -> Result<RecommendedWatcher> {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| anyhow!("pattern path has no file name: {}", path.display()))?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let relevant = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                        && event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == Some(file_name.as_os_str()));
                    if relevant {
                        let _ = tx.send(());
                    }
                }
                Err(e) => warn!(error = %e, "Pattern file watch error"),
            }
        })?;
        // Editors often replace the file, so watch the directory
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let registry = self.clone();
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                // Coalesce bursts of events from a single save
                while rx.try_recv().is_ok() {}
                match registry.reload_from(&path) {
                    Ok(version) => debug!(version, path = %path.display(), "Pattern file reloaded"),
                    Err(e) => warn!(
                        error = %e,
                        version = registry.version(),
                        "Pattern reload failed, keeping previous tables"
                    ),
                }
            }
        });

        info!(dir = %dir.display(), "Watching pattern tables for changes");
        Ok(watcher)
    }
}
