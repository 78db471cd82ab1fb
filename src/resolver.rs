//! "Copy next tag from source".
//!
//! Finds the first tag of the source segment (in document order) that the
//! target has fewer copies of, and places it at the target cursor, wrapping
//! the selection when the tag is one half of a pair.

use std::{collections::HashMap, ops::Range};

use serde::{Deserialize, Serialize};

use crate::{
    markup::{self, EditableSegment, TagToken},
    registry::{Side, TagRegistry},
};

/// Cursor and optional selection inside an [`EditableSegment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    pub position: usize,
    pub selection: Option<Range<usize>>,
}

impl CursorState {
    /// A caret with no selection.
    pub fn at(position: usize) -> Self {
        CursorState {
            position,
            selection: None,
        }
    }

    /// A selection between two offsets, in either order. The caret sits at
    /// `head`. An empty selection collapses to a caret.
    pub fn selecting(anchor: usize, head: usize) -> Self {
        let selection = if anchor == head {
            None
        } else {
            Some(anchor.min(head)..anchor.max(head))
        };
        CursorState {
            position: head,
            selection,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selection.as_ref().is_some_and(|range| !range.is_empty())
    }
}

/// A successful tag transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResult {
    /// The tag that was missing from the target.
    pub token: TagToken,
    /// `true` when a start/end pair was placed around the selection.
    pub wrapped: bool,
    /// Cursor after the edit; the selection is always cleared.
    pub cursor: CursorState,
}

/// Outcome of [`copy_next_tag`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagTransfer {
    Applied(EditResult),
    /// The target already has every tag the source has.
    NothingMissing,
    /// The missing tag is an empty tag and a range is selected.
    CannotWrap(TagToken),
}

impl TagTransfer {
    pub fn is_applied(&self) -> bool {
        matches!(self, TagTransfer::Applied(_))
    }

    pub fn edit(&self) -> Option<&EditResult> {
        match self {
            TagTransfer::Applied(edit) => Some(edit),
            _ => None,
        }
    }
}

/// First source token whose count in `source` exceeds its count in `target`.
///
/// Tokens are compared by their rendered markup, so `{1>` and `<1}` are
/// counted separately. Ties go to the earliest occurrence in the source.
pub fn next_missing_tag(source: &[TagToken], target: &[TagToken]) -> Option<TagToken> {
    let source_counts = count_tokens(source);
    let target_counts = count_tokens(target);

    source
        .iter()
        .find(|token| {
            let key = token.to_markup();
            let have = target_counts.get(&key).copied().unwrap_or(0);
            source_counts.get(&key).copied().unwrap_or(0) > have
        })
        .cloned()
}

/// Resolves the next missing tag between a source markup string and the
/// current target content.
pub fn resolve_next_tag(source_markup: &str, target: &EditableSegment) -> Option<TagToken> {
    let source_tokens = markup::tag_tokens(source_markup);
    let target_tokens: Vec<TagToken> = target.tags().cloned().collect();
    next_missing_tag(&source_tokens, &target_tokens)
}

fn count_tokens(tokens: &[TagToken]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.to_markup()).or_insert(0) += 1;
    }
    counts
}

/// Copies the next missing tag from `source_markup` into `target`.
///
/// - no selection: the tag is inserted at the caret;
/// - selection and a start/end tag: a start tag goes before the selection
///   and an end tag after it;
/// - selection and an empty tag: nothing happens.
///
/// When the copied tag is a placeholder without a target-side entry in
/// `registry`, one is added with the source-side content (empty if the
/// source has none).
pub fn copy_next_tag(
    source_markup: &str,
    target: &mut EditableSegment,
    cursor: &CursorState,
    registry: &mut TagRegistry,
) -> TagTransfer {
    let Some(token) = resolve_next_tag(source_markup, target) else {
        log::trace!("no tag missing from target");
        return TagTransfer::NothingMissing;
    };

    let edit = match cursor.selection.clone().filter(|range| !range.is_empty()) {
        None => {
            let position = cursor.position.min(target.len());
            target.insert_tag(position, token.clone());
            EditResult {
                token: token.clone(),
                wrapped: false,
                cursor: CursorState::at(position + 1),
            }
        }
        Some(_) if !token.is_pairable() => {
            log::trace!("cannot wrap selection with empty tag {token}");
            return TagTransfer::CannotWrap(token);
        }
        Some(range) => {
            let start = range.start.min(target.len());
            let end = range.end.min(target.len());
            target.insert_tag(start, TagToken::start(token.name.clone()));
            // The start tag shifted the selection by one position.
            target.insert_tag(end + 1, TagToken::end(token.name.clone()));
            EditResult {
                token: token.clone(),
                wrapped: true,
                cursor: CursorState::at(end + 2),
            }
        }
    };

    log::trace!("copied {} into target", token);
    register_target_tag(&token, registry);
    TagTransfer::Applied(edit)
}

fn register_target_tag(token: &TagToken, registry: &mut TagRegistry) {
    if token.is_builtin() || registry.find_tag_by_id(&token.name, Side::Target).is_some() {
        return;
    }
    let content = match registry.find_tag_by_id(&token.name, Side::Source) {
        Some(tag) => tag.content.clone(),
        None => {
            log::warn!(
                "tag `{}` has no source-side content, registering it empty",
                token.name
            );
            String::new()
        }
    };
    registry.add_tag(&token.name, &content, Side::Target);
}
