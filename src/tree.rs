//! Flat listing of every decorated file across the open workspaces.
//!
//! Items are labelled `<glyph> <workspace name>/<relative path>` so files with
//! the same relative path in different workspaces stay distinguishable.
//! Refreshes are driven by two channels: store notifications (changes made
//! through this process) and per-workspace file watches (changes made by
//! anyone else, e.g. a `git pull`). Both are drained on the host thread by
//! [`DecoratorTreeView::process_events`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::host::Host;
use crate::model::{Glyph, RelativePath};
use crate::store::{DecoratorStore, DecoratorsChanged};
use crate::watcher::{self, DecoratorFileChanged, DecoratorWatcher};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeItem {
    pub workspace_name: String,
    pub workspace_root: PathBuf,
    pub file: RelativePath,
    pub glyph: Glyph,
}

impl TreeItem {
    /// `<workspace name>/<relative path>`
    pub fn path(&self) -> String {
        format!("{}/{}", self.workspace_name, self.file)
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.glyph, self.path())
    }
}

pub struct DecoratorTreeView<H: Host> {
    store: Arc<DecoratorStore>,
    host: Arc<H>,
    items: Vec<TreeItem>,
    watchers: HashMap<PathBuf, DecoratorWatcher>,
    watch_tx: Sender<DecoratorFileChanged>,
    watch_rx: Receiver<DecoratorFileChanged>,
    store_rx: Receiver<DecoratorsChanged>,
    disposed: bool,
}

impl<H: Host> DecoratorTreeView<H> {
    pub fn new(store: Arc<DecoratorStore>, host: Arc<H>) -> Self {
        let (watch_tx, watch_rx) = mpsc::channel();
        let store_rx = store.subscribe();
        let mut view = Self {
            store,
            host,
            items: Vec::new(),
            watchers: HashMap::new(),
            watch_tx,
            watch_rx,
            store_rx,
            disposed: false,
        };
        view.refresh();
        view
    }

    pub fn children(&self) -> &[TreeItem] {
        &self.items
    }

    /// Re-aggregate every open workspace. A workspace whose decorator file
    /// cannot be read is skipped (and logged) rather than blanking the panel.
    pub fn refresh(&mut self) {
        let mut items = Vec::new();

        for folder in self.host.workspace_folders() {
            match self.store.entries_for(&folder.root) {
                Ok(entries) => items.extend(entries.into_iter().map(|e| TreeItem {
                    workspace_name: folder.name.clone(),
                    workspace_root: folder.root.clone(),
                    file: e.file,
                    glyph: e.decorator,
                })),
                Err(e) => {
                    tracing::warn!(workspace = %folder.name, "skipping decorators: {e}");
                }
            }
            self.ensure_watch(&folder.root);
        }

        self.items = items;
    }

    /// Register the file watch for a workspace, at most once.
    fn ensure_watch(&mut self, workspace: &Path) {
        if self.disposed || self.watchers.contains_key(workspace) {
            return;
        }
        match watcher::start_watching(workspace, self.store.settings(), self.watch_tx.clone()) {
            Ok(Some(w)) => {
                self.watchers.insert(workspace.to_path_buf(), w);
            }
            // Support folder not created yet; retried on the next refresh
            Ok(None) => {}
            Err(e) => tracing::warn!(workspace = %workspace.display(), "{e}"),
        }
    }

    pub fn is_watching(&self, workspace: &Path) -> bool {
        self.watchers.contains_key(workspace)
    }

    /// Drain pending notifications and refresh once if any arrived.
    /// Returns true when the UI should re-render.
    pub fn process_events(&mut self) -> bool {
        let mut dirty = false;

        while self.store_rx.try_recv().is_ok() {
            dirty = true;
        }

        let mut changed_on_disk = HashSet::new();
        while let Ok(event) = self.watch_rx.try_recv() {
            changed_on_disk.insert(event.workspace);
        }
        for workspace in &changed_on_disk {
            self.store.invalidate(workspace);
            dirty = true;
        }

        if dirty {
            self.refresh();
        }
        dirty
    }

    /// The set of open workspaces changed: drop watches of closed ones and
    /// re-aggregate.
    pub fn on_workspaces_changed(&mut self) {
        let open: HashSet<PathBuf> = self
            .host
            .workspace_folders()
            .into_iter()
            .map(|f| f.root)
            .collect();
        self.watchers.retain(|root, _| open.contains(root));
        self.refresh();
    }

    /// Open the file behind a `<workspace name>/<relative path>` item.
    /// Directories and missing files are logged and ignored.
    pub fn on_selection(&self, item_path: &str) {
        let Some((workspace_name, relative)) = item_path.split_once('/') else {
            tracing::debug!(item = item_path, "selection has no workspace prefix");
            return;
        };
        let folders = self.host.workspace_folders();
        let Some(folder) = folders.iter().find(|f| f.name == workspace_name) else {
            tracing::debug!(workspace = workspace_name, "selection for a closed workspace");
            return;
        };

        let file = RelativePath::new(relative).to_absolute(&folder.root);
        match std::fs::symlink_metadata(&file) {
            Ok(meta) if meta.is_file() => {
                if let Err(e) = self.host.open_file(&file) {
                    tracing::warn!(path = %file.display(), "failed to open: {e}");
                }
            }
            Ok(meta) if meta.is_dir() => {
                tracing::debug!(path = %file.display(), "trying to open a directory, ignoring");
            }
            Ok(_) => {
                tracing::debug!(path = %file.display(), "not a regular file, ignoring");
            }
            Err(e) => {
                tracing::debug!(path = %file.display(), "cannot open selection: {e}");
            }
        }
    }

    /// Release every file watch. Later refreshes still aggregate but never
    /// watch again.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.watchers.clear();
    }
}
