use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::host::{workspace_for_path, Host};
use crate::model::RelativePath;
use crate::store::{DecoratorStore, DecoratorsChanged};

/// Badge shown next to a file in the explorer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDecoration {
    pub badge: String,
    pub tooltip: Option<String>,
}

/// Answers "which badge does this file get" from the store's cache.
pub struct BadgeProvider<H: Host> {
    store: Arc<DecoratorStore>,
    host: Arc<H>,
}

impl<H: Host> BadgeProvider<H> {
    pub fn new(store: Arc<DecoratorStore>, host: Arc<H>) -> Self {
        Self { store, host }
    }

    /// Never fails: paths outside every workspace, untagged paths, and
    /// workspaces with a corrupt decorator file all yield `None`.
    pub fn provide_file_decoration(&self, path: &Path) -> Option<FileDecoration> {
        let folders = self.host.workspace_folders();
        let workspace = workspace_for_path(&folders, path)?;
        let relative = RelativePath::from_absolute(&workspace.root, path)?;

        let glyph = match self.store.glyph_for(&workspace.root, &relative) {
            Ok(glyph) => glyph?,
            Err(e) => {
                tracing::warn!(workspace = %workspace.root.display(), "no badges: {e}");
                return None;
            }
        };

        Some(FileDecoration {
            tooltip: Some(format!("Decorated with {glyph}")),
            badge: glyph.as_str().to_string(),
        })
    }

    /// Absolute paths whose badge must be re-rendered after a store change.
    pub fn affected_locations(&self, change: &DecoratorsChanged) -> Vec<PathBuf> {
        change
            .paths
            .iter()
            .map(|p| p.to_absolute(&change.workspace))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoratorSettings;
    use crate::host::testing::RecordingHost;
    use crate::host::WorkspaceFolder;
    use crate::model::{DecoratorEntry, Glyph};
    use std::fs;
    use tempfile::TempDir;

    fn provider(ws: &TempDir) -> (BadgeProvider<RecordingHost>, Arc<DecoratorStore>) {
        let store = Arc::new(DecoratorStore::new(DecoratorSettings::default()));
        let host = Arc::new(RecordingHost::with_folders(vec![WorkspaceFolder::from_root(
            ws.path(),
        )]));
        (BadgeProvider::new(store.clone(), host), store)
    }

    #[test]
    fn tagged_file_gets_its_glyph() {
        let ws = TempDir::new().unwrap();
        let (provider, store) = provider(&ws);
        store
            .replace_entries(
                ws.path(),
                vec![DecoratorEntry::new(RelativePath::new("src/a.ts"), Glyph::new("👀"))],
            )
            .unwrap();

        let decoration = provider
            .provide_file_decoration(&ws.path().join("src").join("a.ts"))
            .unwrap();
        assert_eq!(decoration.badge, "👀");
        assert_eq!(decoration.tooltip.as_deref(), Some("Decorated with 👀"));
    }

    #[test]
    fn unknown_and_outside_paths_have_no_badge() {
        let ws = TempDir::new().unwrap();
        let (provider, _) = provider(&ws);

        assert!(provider.provide_file_decoration(&ws.path().join("nope.ts")).is_none());
        assert!(provider.provide_file_decoration(Path::new("/definitely/elsewhere.ts")).is_none());
        assert!(provider.provide_file_decoration(ws.path()).is_none());
    }

    #[test]
    fn parent_dir_escape_has_no_badge() {
        let ws = TempDir::new().unwrap();
        let (provider, store) = provider(&ws);
        store
            .replace_entries(
                ws.path(),
                vec![DecoratorEntry::new(RelativePath::new("other/a.ts"), Glyph::new("X"))],
            )
            .unwrap();

        assert!(provider.provide_file_decoration(&ws.path().join("other/a.ts")).is_some());
        assert!(provider
            .provide_file_decoration(&ws.path().join("..").join("other").join("a.ts"))
            .is_none());
    }

    #[test]
    fn corrupt_file_means_no_badge() {
        let ws = TempDir::new().unwrap();
        let (provider, store) = provider(&ws);
        let path = store.resolve_file_path(ws.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json{").unwrap();

        assert!(provider.provide_file_decoration(&ws.path().join("a.ts")).is_none());
    }

    #[test]
    fn change_maps_to_absolute_locations() {
        let ws = TempDir::new().unwrap();
        let (provider, _) = provider(&ws);
        let change = DecoratorsChanged {
            workspace: ws.path().to_path_buf(),
            paths: vec![RelativePath::new("a.ts"), RelativePath::new("src/b.ts")],
        };

        assert_eq!(
            provider.affected_locations(&change),
            vec![ws.path().join("a.ts"), ws.path().join("src").join("b.ts")]
        );
    }
}
