use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{DecoratorError, Result};

/// Glyph given to every path found in a legacy checked-files list.
pub const DEFAULT_GLYPH: &str = "✓";

/// Path of a file relative to its workspace root, always using `/` as separator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelativePath(String);

impl RelativePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into().replace('\\', "/"))
    }

    /// Express `path` relative to `root`. Returns `None` when `path` is not
    /// under `root`, is the root itself, or escapes it through `..`.
    pub fn from_absolute(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        if parts.is_empty() {
            return None;
        }
        Some(Self(parts.join("/")))
    }

    /// Absolute location of this path under `root`.
    pub fn to_absolute(&self, root: &Path) -> PathBuf {
        self.0
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(root.to_path_buf(), |acc, part| acc.join(part))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short badge string shown next to a decorated file.
///
/// The store does not enforce a length; `Glyph::custom` applies the
/// single-character rule for user-typed glyphs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Glyph(String);

impl Glyph {
    pub fn new(glyph: impl Into<String>) -> Self {
        Self(glyph.into())
    }

    /// Validate a glyph typed by the user: exactly one character.
    pub fn custom(input: &str) -> Result<Self> {
        if input.chars().count() != 1 {
            return Err(DecoratorError::Validation(
                "Custom decorator must be 1 character long".to_string(),
            ));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self(DEFAULT_GLYPH.to_string())
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One decorated file within a workspace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratorEntry {
    pub file: RelativePath,
    pub decorator: Glyph,
}

impl DecoratorEntry {
    pub fn new(file: RelativePath, decorator: Glyph) -> Self {
        Self { file, decorator }
    }
}
