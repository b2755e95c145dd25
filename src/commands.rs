//! User-facing tag actions: the built-in glyphs and the custom glyph prompt.

use std::path::Path;
use std::sync::Arc;

use crate::error::{DecoratorError, Result};
use crate::fs::list_descendants;
use crate::host::{workspace_for_path, Host};
use crate::model::{Glyph, RelativePath};
use crate::policy::{self, TagRequest};
use crate::store::{ChangeSet, DecoratorStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoratorCommand {
    Check,
    Reject,
    Eyes,
    Custom,
}

pub struct Decorators<H: Host> {
    store: Arc<DecoratorStore>,
    host: Arc<H>,
}

impl<H: Host> Decorators<H> {
    pub fn new(store: Arc<DecoratorStore>, host: Arc<H>) -> Self {
        Self { store, host }
    }

    /// Run a command against a file or folder.
    ///
    /// Returns `Ok(None)` when the custom glyph prompt was cancelled.
    pub fn run(&self, command: DecoratorCommand, target: &Path) -> Result<Option<ChangeSet>> {
        let settings = self.store.settings();
        let glyph = match command {
            DecoratorCommand::Check => settings.check_glyph.clone(),
            DecoratorCommand::Reject => settings.reject_glyph.clone(),
            DecoratorCommand::Eyes => settings.eyes_glyph.clone(),
            DecoratorCommand::Custom => match self.prompt_glyph()? {
                Some(glyph) => glyph,
                None => return Ok(None),
            },
        };
        self.decorate(target, &glyph).map(Some)
    }

    /// Ask the host for a one-character glyph. Empty input fails validation.
    fn prompt_glyph(&self) -> Result<Option<Glyph>> {
        let prompt = &self.store.settings().custom_prompt;
        let Some(input) = self.host.prompt_input(prompt, None) else {
            tracing::debug!("custom decorator cancelled");
            return Ok(None);
        };

        Glyph::custom(&input).map(Some).inspect_err(|e| {
            self.host.show_error(&e.to_string());
        })
    }

    /// Toggle `glyph` on `target`. A folder toggles itself and everything below it.
    /// Every failure is also shown to the user.
    pub fn decorate(&self, target: &Path, glyph: &Glyph) -> Result<ChangeSet> {
        self.toggle_on(target, glyph)
            .inspect_err(|e| self.host.show_error(&e.to_string()))
    }

    fn toggle_on(&self, target: &Path, glyph: &Glyph) -> Result<ChangeSet> {
        let folders = self.host.workspace_folders();
        let workspace = workspace_for_path(&folders, target)
            .ok_or_else(|| DecoratorError::OutsideWorkspace(target.to_path_buf()))?;

        let request = resolve_request(&workspace.root, target)?;
        let change = self.store.modify_entries(&workspace.root, |entries| {
            policy::toggle(entries, &request, glyph)
        })?;

        tracing::info!(
            workspace = %workspace.name,
            glyph = %glyph,
            affected = change.affected.len(),
            "decorated {}",
            target.display()
        );
        Ok(change)
    }
}

/// Turn a target path into a policy request, enumerating folders once.
pub fn resolve_request(workspace: &Path, target: &Path) -> Result<TagRequest> {
    let relative = RelativePath::from_absolute(workspace, target)
        .ok_or_else(|| DecoratorError::OutsideWorkspace(target.to_path_buf()))?;

    if !target.is_dir() {
        return Ok(TagRequest::SingleFile(relative));
    }

    let descendants = list_descendants(target)
        .map_err(|e| DecoratorError::Read {
            path: target.to_path_buf(),
            source: std::io::Error::other(e),
        })?
        .iter()
        .filter_map(|p| RelativePath::from_absolute(workspace, p))
        .collect();

    Ok(TagRequest::Folder {
        folder: relative,
        descendants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoratorSettings;
    use crate::host::testing::RecordingHost;
    use crate::host::WorkspaceFolder;
    use crate::model::DecoratorEntry;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Decorators<RecordingHost>, Arc<DecoratorStore>, Arc<RecordingHost>) {
        let ws = TempDir::new().unwrap();
        let root = ws.path();
        fs::create_dir_all(root.join("src/deep")).unwrap();
        fs::write(root.join("src/a.ts"), "").unwrap();
        fs::write(root.join("src/deep/b.ts"), "").unwrap();
        fs::write(root.join("main.ts"), "").unwrap();

        let store = Arc::new(DecoratorStore::new(DecoratorSettings::default()));
        let host = Arc::new(RecordingHost::with_folders(vec![WorkspaceFolder::from_root(root)]));
        let decorators = Decorators::new(store.clone(), host.clone());
        (ws, decorators, store, host)
    }

    fn glyphs(store: &DecoratorStore, ws: &TempDir) -> Vec<(String, String)> {
        store
            .entries_for(ws.path())
            .unwrap()
            .into_iter()
            .map(|e| (e.file.as_str().to_string(), e.decorator.as_str().to_string()))
            .collect()
    }

    #[test]
    fn check_toggles_a_file() {
        let (ws, decorators, store, _) = setup();
        let file = ws.path().join("main.ts");

        decorators.run(DecoratorCommand::Check, &file).unwrap();
        assert_eq!(glyphs(&store, &ws), vec![("main.ts".to_string(), "✓".to_string())]);

        decorators.run(DecoratorCommand::Check, &file).unwrap();
        assert!(glyphs(&store, &ws).is_empty());
    }

    #[test]
    fn other_preset_replaces_glyph() {
        let (ws, decorators, store, _) = setup();
        let file = ws.path().join("main.ts");

        decorators.run(DecoratorCommand::Check, &file).unwrap();
        decorators.run(DecoratorCommand::Eyes, &file).unwrap();
        assert_eq!(glyphs(&store, &ws), vec![("main.ts".to_string(), "👀".to_string())]);
    }

    #[test]
    fn folder_tags_whole_subtree_then_clears_it() {
        let (ws, decorators, store, _) = setup();
        store
            .replace_entries(
                ws.path(),
                vec![DecoratorEntry::new(RelativePath::new("src/a.ts"), Glyph::new("✗"))],
            )
            .unwrap();

        let folder = ws.path().join("src");
        let change = decorators.run(DecoratorCommand::Check, &folder).unwrap().unwrap();
        assert!(change.persisted);

        let mut tagged = glyphs(&store, &ws);
        tagged.sort();
        assert_eq!(
            tagged,
            vec![
                ("src".to_string(), "✓".to_string()),
                ("src/a.ts".to_string(), "✓".to_string()),
                ("src/deep".to_string(), "✓".to_string()),
                ("src/deep/b.ts".to_string(), "✓".to_string()),
            ]
        );

        decorators.run(DecoratorCommand::Check, &folder).unwrap();
        assert!(glyphs(&store, &ws).is_empty());
    }

    #[test]
    fn custom_glyph_from_prompt() {
        let (ws, decorators, store, host) = setup();
        host.answer(Some("★"));

        let change = decorators
            .run(DecoratorCommand::Custom, &ws.path().join("main.ts"))
            .unwrap();
        assert!(change.is_some());
        assert_eq!(glyphs(&store, &ws), vec![("main.ts".to_string(), "★".to_string())]);
        assert_eq!(
            host.prompts.lock().as_slice(),
            ["Provide a custom decorator (1 character only)"]
        );
    }

    #[test]
    fn cancelled_prompt_changes_nothing() {
        let (ws, decorators, store, host) = setup();
        let file = ws.path().join("main.ts");

        host.answer(None);
        assert!(decorators.run(DecoratorCommand::Custom, &file).unwrap().is_none());

        assert!(glyphs(&store, &ws).is_empty());
        assert!(!store.settings().decorators_path_for(ws.path()).exists());
        assert!(host.errors.lock().is_empty());
    }

    #[test]
    fn empty_glyph_is_rejected_with_message() {
        let (ws, decorators, store, host) = setup();
        host.answer(Some(""));

        let err = decorators
            .run(DecoratorCommand::Custom, &ws.path().join("main.ts"))
            .unwrap_err();
        assert!(matches!(err, DecoratorError::Validation(_)));
        assert_eq!(
            host.errors.lock().as_slice(),
            ["Custom decorator must be 1 character long"]
        );
        assert!(!store.settings().decorators_path_for(ws.path()).exists());
    }

    #[test]
    fn multi_char_glyph_is_rejected_before_store() {
        let (ws, decorators, store, host) = setup();
        host.answer(Some("ab"));

        let err = decorators
            .run(DecoratorCommand::Custom, &ws.path().join("main.ts"))
            .unwrap_err();
        assert!(matches!(err, DecoratorError::Validation(_)));
        assert_eq!(
            host.errors.lock().as_slice(),
            ["Custom decorator must be 1 character long"]
        );
        assert!(!store.settings().decorators_path_for(ws.path()).exists());
    }

    #[test]
    fn outside_workspace_is_an_error() {
        let (_ws, decorators, _, _) = setup();
        let other = TempDir::new().unwrap();
        let err = decorators
            .run(DecoratorCommand::Check, &other.path().join("x.ts"))
            .unwrap_err();
        assert!(matches!(err, DecoratorError::OutsideWorkspace(_)));
    }

    #[test]
    fn workspace_root_cannot_be_decorated() {
        let (ws, decorators, _, host) = setup();
        let err = decorators.run(DecoratorCommand::Check, ws.path()).unwrap_err();
        assert!(matches!(err, DecoratorError::OutsideWorkspace(_)));
        assert_eq!(host.errors.lock().len(), 1);
    }

    #[test]
    fn parent_dir_escape_is_rejected_and_shown() {
        let (ws, decorators, store, host) = setup();
        let escaped = ws.path().join("src").join("..").join("..").join("main.ts");

        let err = decorators.run(DecoratorCommand::Check, &escaped).unwrap_err();
        assert!(matches!(err, DecoratorError::OutsideWorkspace(_)));
        assert_eq!(host.errors.lock().len(), 1);
        assert!(glyphs(&store, &ws).is_empty());
    }

    #[test]
    fn corrupt_file_is_shown_to_the_user() {
        let (ws, decorators, store, host) = setup();
        let path = store.resolve_file_path(ws.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json{").unwrap();

        let err = decorators
            .run(DecoratorCommand::Check, &ws.path().join("main.ts"))
            .unwrap_err();
        assert!(err.is_parse());
        assert_eq!(host.errors.lock().len(), 1);
    }

    #[test]
    fn resolve_request_for_file_and_folder() {
        let (ws, _, _, _) = setup();
        let root = ws.path();

        assert_eq!(
            resolve_request(root, &root.join("main.ts")).unwrap(),
            TagRequest::SingleFile(RelativePath::new("main.ts"))
        );
        assert_eq!(
            resolve_request(root, &root.join("src")).unwrap(),
            TagRequest::Folder {
                folder: RelativePath::new("src"),
                descendants: vec![
                    RelativePath::new("src/a.ts"),
                    RelativePath::new("src/deep"),
                    RelativePath::new("src/deep/b.ts"),
                ],
            }
        );
    }
}
