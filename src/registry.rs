//! Per trans-unit storage of placeholder tag content.
//!
//! Only numeric (non-builtin) tags have entries. Each side keeps its own list
//! and ids never repeat within a list.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Which segment of a trans-unit an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Content attached to a placeholder tag id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub content: String,
}

impl Tag {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Tag {
            id: id.into(),
            content: content.into(),
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}} {}", self.id, self.content)
    }
}

/// Source- and target-side tag lists of one trans-unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRegistry {
    source: Vec<Tag>,
    target: Vec<Tag>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from loaded lists. Later duplicates of an id are
    /// dropped so the uniqueness invariant holds from the start.
    pub fn from_lists(source: Vec<Tag>, target: Vec<Tag>) -> Self {
        let mut registry = TagRegistry::new();
        for (side, tags) in [(Side::Source, source), (Side::Target, target)] {
            for tag in tags {
                if registry.add_tag(&tag.id, &tag.content, side).is_none() {
                    log::warn!("dropping duplicate {side} tag id `{}`", tag.id);
                }
            }
        }
        registry
    }

    pub fn tags(&self, side: Side) -> &[Tag] {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    fn tags_mut(&mut self, side: Side) -> &mut Vec<Tag> {
        match side {
            Side::Source => &mut self.source,
            Side::Target => &mut self.target,
        }
    }

    /// Looks a tag up by id on one side.
    pub fn find_tag_by_id(&self, id: &str, side: Side) -> Option<&Tag> {
        self.tags(side).iter().find(|tag| tag.id == id)
    }

    /// Content for `id`, empty when the id is not registered.
    pub fn content_of(&self, id: &str, side: Side) -> &str {
        self.find_tag_by_id(id, side)
            .map(|tag| tag.content.as_str())
            .unwrap_or_default()
    }

    /// Appends a tag to one side.
    ///
    /// Returns `None` and leaves the list untouched when `id` is already
    /// present on that side.
    pub fn add_tag(&mut self, id: &str, content: &str, side: Side) -> Option<&Tag> {
        if self.find_tag_by_id(id, side).is_some() {
            return None;
        }
        let tags = self.tags_mut(side);
        tags.push(Tag::new(id, content));
        tags.last()
    }
}
