//! Tag toggling rules.
//!
//! Applying a glyph to a path that has none adds it, applying the glyph it
//! already has removes it, and applying a different glyph replaces it. For a
//! folder the folder's own state picks one operation for the whole subtree.

use std::collections::{HashMap, HashSet};

use crate::model::{DecoratorEntry, Glyph, RelativePath};

/// What a tag action targets, resolved before the policy runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagRequest {
    SingleFile(RelativePath),
    /// A folder and every file and folder below it.
    Folder {
        folder: RelativePath,
        descendants: Vec<RelativePath>,
    },
}

impl TagRequest {
    /// Folder first, then descendants, without duplicates.
    pub fn targets(&self) -> Vec<&RelativePath> {
        match self {
            Self::SingleFile(path) => vec![path],
            Self::Folder {
                folder,
                descendants,
            } => {
                let mut seen = HashSet::new();
                std::iter::once(folder)
                    .chain(descendants)
                    .filter(|p| seen.insert(*p))
                    .collect()
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagOperation {
    Add,
    Remove,
    Update,
}

/// Decide the operation for one path given its current glyph.
pub fn decide(current: Option<&Glyph>, requested: &Glyph) -> TagOperation {
    match current {
        None => TagOperation::Add,
        Some(glyph) if glyph == requested => TagOperation::Remove,
        Some(_) => TagOperation::Update,
    }
}

/// Operation per target path.
pub fn plan(
    entries: &[DecoratorEntry],
    request: &TagRequest,
    glyph: &Glyph,
) -> Vec<(RelativePath, TagOperation)> {
    let current: HashMap<&RelativePath, &Glyph> =
        entries.iter().map(|e| (&e.file, &e.decorator)).collect();

    match request {
        TagRequest::SingleFile(path) => {
            vec![(path.clone(), decide(current.get(path).copied(), glyph))]
        }
        TagRequest::Folder { folder, .. } => {
            // Decided once from the folder's own entry, not per child
            let op = decide(current.get(folder).copied(), glyph);
            request
                .targets()
                .into_iter()
                .map(|path| (path.clone(), op))
                .collect()
        }
    }
}

/// Build the new collection: added and updated entries in plan order,
/// followed by the untouched entries in their original order.
pub fn apply(
    entries: &[DecoratorEntry],
    plan: &[(RelativePath, TagOperation)],
    glyph: &Glyph,
) -> Vec<DecoratorEntry> {
    let touched: HashSet<&RelativePath> = plan.iter().map(|(path, _)| path).collect();

    let mut result: Vec<DecoratorEntry> = plan
        .iter()
        .filter(|(_, op)| *op != TagOperation::Remove)
        .map(|(path, _)| DecoratorEntry::new(path.clone(), glyph.clone()))
        .collect();

    result.extend(
        entries
            .iter()
            .filter(|e| !touched.contains(&e.file))
            .cloned(),
    );
    result
}

/// Plan and apply in one step.
pub fn toggle(entries: &[DecoratorEntry], request: &TagRequest, glyph: &Glyph) -> Vec<DecoratorEntry> {
    apply(entries, &plan(entries, request, glyph), glyph)
}
