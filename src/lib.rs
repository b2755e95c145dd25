pub mod badge;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs;
pub mod host;
pub mod model;
pub mod policy;
pub mod store;
pub mod tree;
mod watcher;

pub use badge::{BadgeProvider, FileDecoration};
pub use commands::{DecoratorCommand, Decorators};
pub use config::DecoratorSettings;
pub use error::{DecoratorError, Result};
pub use host::{Host, WorkspaceFolder};
pub use model::{DecoratorEntry, Glyph, RelativePath, DEFAULT_GLYPH};
pub use policy::{TagOperation, TagRequest};
pub use store::{ChangeSet, DecoratorStore, DecoratorsChanged};
pub use tree::{DecoratorTreeView, TreeItem};
pub use watcher::DecoratorFileChanged;
