//! The editor side of the decorator subsystem.

use std::path::{Path, PathBuf};

/// An open workspace: display name plus absolute root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceFolder {
    pub name: String,
    pub root: PathBuf,
}

impl WorkspaceFolder {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    /// Name a workspace after its root folder.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.to_string_lossy().to_string());
        Self { name, root }
    }
}

/// Services the decorator subsystem needs from the editor.
pub trait Host: Send + Sync {
    fn workspace_folders(&self) -> Vec<WorkspaceFolder>;

    /// Single-line text prompt. `None` means the user cancelled.
    fn prompt_input(&self, prompt: &str, placeholder: Option<&str>) -> Option<String>;

    fn open_file(&self, path: &Path) -> Result<(), String>;

    fn show_error(&self, message: &str);
}

/// The deepest open workspace containing `path`.
pub fn workspace_for_path<'a>(
    folders: &'a [WorkspaceFolder],
    path: &Path,
) -> Option<&'a WorkspaceFolder> {
    folders
        .iter()
        .filter(|f| path.starts_with(&f.root))
        .max_by_key(|f| f.root.components().count())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Host double that records what it was asked to do.
    #[derive(Default)]
    pub(crate) struct RecordingHost {
        pub(crate) folders: Mutex<Vec<WorkspaceFolder>>,
        pub(crate) answers: Mutex<Vec<Option<String>>>,
        pub(crate) prompts: Mutex<Vec<String>>,
        pub(crate) opened: Mutex<Vec<PathBuf>>,
        pub(crate) errors: Mutex<Vec<String>>,
    }

    impl RecordingHost {
        pub(crate) fn with_folders(folders: Vec<WorkspaceFolder>) -> Self {
            let host = Self::default();
            *host.folders.lock() = folders;
            host
        }

        pub(crate) fn answer(&self, answer: Option<&str>) {
            self.answers.lock().push(answer.map(str::to_string));
        }
    }

    impl Host for RecordingHost {
        fn workspace_folders(&self) -> Vec<WorkspaceFolder> {
            self.folders.lock().clone()
        }

        fn prompt_input(&self, prompt: &str, _placeholder: Option<&str>) -> Option<String> {
            self.prompts.lock().push(prompt.to_string());
            let mut answers = self.answers.lock();
            if answers.is_empty() {
                None
            } else {
                answers.remove(0)
            }
        }

        fn open_file(&self, path: &Path) -> Result<(), String> {
            self.opened.lock().push(path.to_path_buf());
            Ok(())
        }

        fn show_error(&self, message: &str) {
            self.errors.lock().push(message.to_string());
        }
    }
}
