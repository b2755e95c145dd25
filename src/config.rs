use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::{Glyph, DEFAULT_GLYPH};

pub const SETTINGS_FILE: &str = "decorators.json";

/// Get the config directory using platform-appropriate location.
///
/// - macOS: `~/Library/Application Support/swissknife/`
/// - Linux: `~/.config/swissknife/` (or `$XDG_CONFIG_HOME`)
/// - Windows: `%APPDATA%/swissknife/`
///
/// Falls back to `~/.swissknife/` if platform dir is unavailable.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("swissknife"))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".swissknife")
        })
}

/// Load a JSON config file from `dir`, returning Default if missing or corrupt.
/// Corrupt files are logged instead of silently resetting state.
pub(crate) fn load_json_config<T: DeserializeOwned + Default>(dir: &Path, filename: &str) -> T {
    let path = dir.join(filename);
    if !path.exists() {
        return T::default();
    }
    let content = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), "could not read config: {e}");
            return T::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(path = %path.display(), "corrupt config, using defaults: {e}");
            T::default()
        }
    }
}

/// Save a JSON config file into `dir`, creating the directory if needed.
pub(crate) fn save_json_config<T: Serialize>(
    dir: &Path,
    filename: &str,
    config: &T,
) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    write_json_atomic(&dir.join(filename), config)
}

/// Write a value as pretty-printed JSON (2-space indent) atomically:
/// temp file + rename, so readers see either the old or the new file.
pub(crate) fn write_json_atomic<T: Serialize>(target: &Path, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp = target.with_file_name(format!("{}.tmp.{}", file_name, std::process::id()));

    std::fs::write(&temp, &json)?;

    std::fs::rename(&temp, target).inspect_err(|_| {
        let _ = std::fs::remove_file(&temp);
    })
}

// ---------------------------------------------------------------------------
// DecoratorSettings
// ---------------------------------------------------------------------------

/// Where decorator state lives inside a workspace and which glyphs the
/// built-in commands apply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecoratorSettings {
    /// Hidden per-workspace folder holding the decorator file
    #[serde(default = "default_support_folder")]
    pub support_folder: String,
    #[serde(default = "default_decorators_file")]
    pub decorators_file: String,
    /// Old checked-files list, only read to migrate it
    #[serde(default = "default_legacy_file")]
    pub legacy_file: String,
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
    #[serde(default = "default_check_glyph")]
    pub check_glyph: Glyph,
    #[serde(default = "default_reject_glyph")]
    pub reject_glyph: Glyph,
    #[serde(default = "default_eyes_glyph")]
    pub eyes_glyph: Glyph,
    #[serde(default = "default_custom_prompt")]
    pub custom_prompt: String,
}

fn default_support_folder() -> String {
    ".vscode".to_string()
}

fn default_decorators_file() -> String {
    "swissknifeDecorators.json".to_string()
}

fn default_legacy_file() -> String {
    "swissknifeCheckedFiles.json".to_string()
}

fn default_watch_debounce_ms() -> u64 {
    200
}

fn default_check_glyph() -> Glyph {
    Glyph::new(DEFAULT_GLYPH)
}

fn default_reject_glyph() -> Glyph {
    Glyph::new("✗")
}

fn default_eyes_glyph() -> Glyph {
    Glyph::new("👀")
}

fn default_custom_prompt() -> String {
    "Provide a custom decorator (1 character only)".to_string()
}

impl Default for DecoratorSettings {
    fn default() -> Self {
        Self {
            support_folder: default_support_folder(),
            decorators_file: default_decorators_file(),
            legacy_file: default_legacy_file(),
            watch_debounce_ms: default_watch_debounce_ms(),
            check_glyph: default_check_glyph(),
            reject_glyph: default_reject_glyph(),
            eyes_glyph: default_eyes_glyph(),
            custom_prompt: default_custom_prompt(),
        }
    }
}

impl DecoratorSettings {
    /// `<workspace>/.vscode`
    pub fn support_folder_for(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.support_folder)
    }

    /// `<workspace>/.vscode/swissknifeDecorators.json`
    pub fn decorators_path_for(&self, workspace: &Path) -> PathBuf {
        self.support_folder_for(workspace).join(&self.decorators_file)
    }

    /// `<workspace>/.vscode/swissknifeCheckedFiles.json`
    pub fn legacy_path_for(&self, workspace: &Path) -> PathBuf {
        self.support_folder_for(workspace).join(&self.legacy_file)
    }
}

pub fn load_settings() -> DecoratorSettings {
    load_json_config(&config_dir(), SETTINGS_FILE)
}

pub fn save_settings(settings: &DecoratorSettings) -> std::io::Result<()> {
    save_json_config(&config_dir(), SETTINGS_FILE, settings)
}
