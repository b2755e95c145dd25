//! Per-workspace decorator storage.
//!
//! Each workspace keeps its decorators in `<root>/.vscode/swissknifeDecorators.json`.
//! Collections are loaded lazily on first access, cached for the lifetime of
//! the store, and written back after every mutation. Writers of the same
//! workspace are serialized by a per-workspace mutex.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

use crate::config::{write_json_atomic, DecoratorSettings};
use crate::error::{DecoratorError, Result};
use crate::model::{DecoratorEntry, Glyph, RelativePath, DEFAULT_GLYPH};

/// Notification sent to subscribers after a workspace's decorators changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoratorsChanged {
    pub workspace: PathBuf,
    pub paths: Vec<RelativePath>,
}

/// Outcome of a mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Paths whose glyph was added, removed, or replaced.
    pub affected: Vec<RelativePath>,
    /// False when the disk write failed; the cache still holds the new state.
    pub persisted: bool,
}

#[derive(Default)]
struct WorkspaceSlot {
    entries: Option<Vec<DecoratorEntry>>,
    /// Support folder already known to exist (skips a stat on every write)
    support_folder_ready: bool,
    migration_checked: bool,
}

pub struct DecoratorStore {
    settings: DecoratorSettings,
    workspaces: DashMap<PathBuf, Arc<Mutex<WorkspaceSlot>>>,
    subscribers: Mutex<Vec<mpsc::Sender<DecoratorsChanged>>>,
}

impl DecoratorStore {
    pub fn new(settings: DecoratorSettings) -> Self {
        Self {
            settings,
            workspaces: DashMap::new(),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> &DecoratorSettings {
        &self.settings
    }

    /// Canonical on-disk location of a workspace's decorators. Pure; see
    /// [`DecoratorStore::ensure_migrated`] for the legacy conversion.
    pub fn resolve_file_path(&self, workspace: &Path) -> PathBuf {
        self.settings.decorators_path_for(workspace)
    }

    /// Register for change notifications. Dropped receivers are pruned on the
    /// next notification.
    pub fn subscribe(&self) -> mpsc::Receiver<DecoratorsChanged> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }

    fn slot(&self, workspace: &Path) -> Arc<Mutex<WorkspaceSlot>> {
        // Clone the Arc out so the shard lock is released before locking the slot
        self.workspaces
            .entry(workspace.to_path_buf())
            .or_default()
            .value()
            .clone()
    }

    /// Convert a legacy checked-files list into the decorator format.
    ///
    /// Runs only when the legacy file exists and the new file does not.
    /// Returns true if a migration happened. Running it again is a no-op.
    pub fn ensure_migrated(&self, workspace: &Path) -> Result<bool> {
        let slot = self.slot(workspace);
        let mut slot = slot.lock();
        let migrated = self.migrate_legacy(workspace, &mut slot)?;
        slot.migration_checked = true;
        Ok(migrated)
    }

    fn migrate_legacy(&self, workspace: &Path, slot: &mut WorkspaceSlot) -> Result<bool> {
        let legacy = self.settings.legacy_path_for(workspace);
        let target = self.resolve_file_path(workspace);

        if !legacy.is_file() || target.exists() {
            return Ok(false);
        }

        let checked: Vec<String> = read_json(&legacy)?;
        let entries: Vec<DecoratorEntry> = checked
            .into_iter()
            .map(|file| DecoratorEntry::new(RelativePath::new(file), Glyph::new(DEFAULT_GLYPH)))
            .collect();

        self.ensure_support_folder(workspace, slot)?;
        write_json_atomic(&target, &entries).map_err(|source| DecoratorError::Write {
            path: target.clone(),
            source,
        })?;

        if let Err(e) = std::fs::remove_file(&legacy) {
            tracing::warn!(path = %legacy.display(), "failed to remove legacy decorator file: {e}");
        }

        tracing::info!(
            workspace = %workspace.display(),
            count = entries.len(),
            "migrated legacy checked files"
        );
        Ok(true)
    }

    /// Decorators of a workspace, loading them from disk on first access.
    ///
    /// A missing file is an empty collection. A corrupt file is an error and
    /// leaves the cache unset so a later call can succeed once it is fixed.
    pub fn entries_for(&self, workspace: &Path) -> Result<Vec<DecoratorEntry>> {
        let slot = self.slot(workspace);
        let mut slot = slot.lock();
        Ok(self.load(workspace, &mut slot)?.clone())
    }

    /// Glyph of a single file, looked up in place under the workspace lock.
    pub fn glyph_for(&self, workspace: &Path, file: &RelativePath) -> Result<Option<Glyph>> {
        let slot = self.slot(workspace);
        let mut slot = slot.lock();
        Ok(self
            .load(workspace, &mut slot)?
            .iter()
            .find(|e| &e.file == file)
            .map(|e| e.decorator.clone()))
    }

    fn load<'a>(
        &self,
        workspace: &Path,
        slot: &'a mut WorkspaceSlot,
    ) -> Result<&'a mut Vec<DecoratorEntry>> {
        if slot.entries.is_none() {
            if !slot.migration_checked {
                self.migrate_legacy(workspace, slot)?;
                slot.migration_checked = true;
            }

            let path = self.resolve_file_path(workspace);
            let entries = if path.exists() {
                read_json(&path)?
            } else {
                Vec::new()
            };
            tracing::debug!(
                workspace = %workspace.display(),
                count = entries.len(),
                "loaded decorators"
            );
            slot.entries = Some(entries);
        }

        Ok(slot.entries.get_or_insert_with(Vec::new))
    }

    /// Replace a workspace's decorators wholesale.
    pub fn replace_entries(
        &self,
        workspace: &Path,
        entries: Vec<DecoratorEntry>,
    ) -> Result<ChangeSet> {
        self.modify_entries(workspace, move |_| entries)
    }

    /// Read-modify-write under the workspace lock.
    ///
    /// Only the read can fail. A failed write is logged and reported through
    /// `ChangeSet::persisted`; the cache keeps the new state either way.
    pub fn modify_entries<F>(&self, workspace: &Path, f: F) -> Result<ChangeSet>
    where
        F: FnOnce(&[DecoratorEntry]) -> Vec<DecoratorEntry>,
    {
        let slot = self.slot(workspace);
        let mut slot = slot.lock();

        let current = self.load(workspace, &mut slot)?;
        let updated = f(current.as_slice());
        let affected = diff_paths(current.as_slice(), &updated);
        *current = updated;

        let persisted = match self.persist(workspace, &mut slot) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(workspace = %workspace.display(), "{e}");
                false
            }
        };
        drop(slot);

        self.notify(DecoratorsChanged {
            workspace: workspace.to_path_buf(),
            paths: affected.clone(),
        });

        Ok(ChangeSet {
            affected,
            persisted,
        })
    }

    fn persist(&self, workspace: &Path, slot: &mut WorkspaceSlot) -> Result<()> {
        self.ensure_support_folder(workspace, slot)?;
        let path = self.resolve_file_path(workspace);
        let entries = slot.entries.as_deref().unwrap_or_default();
        write_json_atomic(&path, &entries).map_err(|source| DecoratorError::Write { path, source })
    }

    fn ensure_support_folder(&self, workspace: &Path, slot: &mut WorkspaceSlot) -> Result<()> {
        if slot.support_folder_ready {
            return Ok(());
        }
        let folder = self.settings.support_folder_for(workspace);
        std::fs::create_dir_all(&folder).map_err(|source| DecoratorError::Write {
            path: folder,
            source,
        })?;
        slot.support_folder_ready = true;
        Ok(())
    }

    /// Drop the cached collection so the next read goes back to disk.
    pub fn invalidate(&self, workspace: &Path) {
        if let Some(slot) = self.workspaces.get(workspace).map(|s| s.value().clone()) {
            slot.lock().entries = None;
        }
    }

    /// Whether a workspace's collection is currently cached.
    pub fn is_cached(&self, workspace: &Path) -> bool {
        self.workspaces
            .get(workspace)
            .map(|s| s.value().clone())
            .is_some_and(|slot| slot.lock().entries.is_some())
    }

    fn notify(&self, change: DecoratorsChanged) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(change.clone()).is_ok());
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| DecoratorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DecoratorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Paths whose glyph differs between two collections, in first-seen order.
fn diff_paths(before: &[DecoratorEntry], after: &[DecoratorEntry]) -> Vec<RelativePath> {
    let old: HashMap<&RelativePath, &Glyph> =
        before.iter().map(|e| (&e.file, &e.decorator)).collect();
    let new: HashMap<&RelativePath, &Glyph> =
        after.iter().map(|e| (&e.file, &e.decorator)).collect();

    let mut affected = Vec::new();
    for entry in after {
        if old.get(&entry.file) != Some(&&entry.decorator) && !affected.contains(&entry.file) {
            affected.push(entry.file.clone());
        }
    }
    for entry in before {
        if !new.contains_key(&entry.file) && !affected.contains(&entry.file) {
            affected.push(entry.file.clone());
        }
    }
    affected
}
