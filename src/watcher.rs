use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::config::DecoratorSettings;
use crate::error::{DecoratorError, Result};

pub type DecoratorWatcher = Debouncer<notify::RecommendedWatcher>;

/// Emitted when a workspace's decorator file changes on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoratorFileChanged {
    pub workspace: PathBuf,
}

/// Only the decorator file itself matters; other files in the support
/// folder (settings, launch configs) are noise.
pub(crate) fn is_decorator_file(path: &Path, settings: &DecoratorSettings) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name == settings.decorators_file)
}

/// Watch a workspace's support folder and report decorator file changes on `tx`.
///
/// Returns `Ok(None)` when the support folder does not exist yet. Dropping the
/// returned debouncer stops the watch.
pub(crate) fn start_watching(
    workspace: &Path,
    settings: &DecoratorSettings,
    tx: Sender<DecoratorFileChanged>,
) -> Result<Option<DecoratorWatcher>> {
    let folder = settings.support_folder_for(workspace);
    if !folder.is_dir() {
        return Ok(None);
    }

    let workspace_owned = workspace.to_path_buf();
    let filter = settings.clone();

    let mut debouncer = new_debouncer(
        Duration::from_millis(settings.watch_debounce_ms),
        move |events: std::result::Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>| {
            let events = match events {
                Ok(events) => events,
                Err(e) => {
                    tracing::warn!("decorator watcher error: {e}");
                    return;
                }
            };

            let relevant = events.iter().any(|e| {
                matches!(e.kind, DebouncedEventKind::Any) && is_decorator_file(&e.path, &filter)
            });

            if relevant {
                let _ = tx.send(DecoratorFileChanged {
                    workspace: workspace_owned.clone(),
                });
            }
        },
    )
    .map_err(|e| DecoratorError::Watch(format!("failed to create watcher: {e}")))?;

    debouncer
        .watcher()
        .watch(folder.as_path(), RecursiveMode::NonRecursive)
        .map_err(|e| DecoratorError::Watch(format!("failed to watch {}: {e}", folder.display())))?;

    tracing::debug!(folder = %folder.display(), "watching decorators");
    Ok(Some(debouncer))
}
