use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
    markup::{EditableSegment, TagToken},
    model::{CAPY_NS, TargetState, XLIFF_NS, capy, xlf},
    registry::{Side, Tag, TagRegistry},
    resolver::{self, CursorState, TagTransfer},
    xml::{Element, QName},
};

/// The `<source>` segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub text: String,
}

impl Source {
    pub fn from_element(elem: &Element) -> Self {
        Source {
            text: elem.text_or_empty().to_string(),
        }
    }

    pub fn to_element(&self) -> Element {
        Element::new(xlf("source")).with_text(self.text.as_str())
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// The `<target>` segment and its state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub text: String,
    pub state: TargetState,
}

impl Target {
    pub fn from_element(elem: &Element) -> Self {
        Target {
            text: elem.text_or_empty().to_string(),
            state: TargetState::from_attr(elem.attr("state")),
        }
    }

    pub fn to_element(&self) -> Element {
        let mut elem = Element::new(xlf("target")).with_text(self.text.as_str());
        if self.state != TargetState::None {
            elem.set_attr(QName::local("state"), self.state.as_str());
        }
        elem
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// An alternative translation (`<alt-trans>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AltTrans {
    pub origin: Option<String>,
    pub target: Target,
}

impl AltTrans {
    pub fn from_element(elem: &Element) -> Self {
        AltTrans {
            origin: elem.attr("origin").map(str::to_string),
            target: elem
                .first_child(XLIFF_NS, "target")
                .map(Target::from_element)
                .unwrap_or_default(),
        }
    }

    pub fn to_element(&self) -> Element {
        let mut elem = Element::new(xlf("alt-trans"));
        elem.set_attr_opt(QName::local("origin"), self.origin.as_deref());
        elem.push(self.target.to_element());
        elem
    }
}

/// A translatable item: source, target, state and tag metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransUnit {
    pub id: Option<String>,
    pub original_id: Option<String>,
    pub translate: bool,
    pub source: Source,
    pub target: Target,
    pub alt_translations: Vec<AltTrans>,
    pub tags: TagRegistry,
}

impl Default for TransUnit {
    fn default() -> Self {
        TransUnit {
            id: None,
            original_id: None,
            translate: true,
            source: Source::default(),
            target: Target::default(),
            alt_translations: Vec::new(),
            tags: TagRegistry::default(),
        }
    }
}

impl TransUnit {
    /// Builds a unit with the given id and segments.
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        TransUnit {
            id: Some(id.into()),
            source: Source {
                text: source.into(),
            },
            target: Target {
                text: target.into(),
                state: TargetState::None,
            },
            ..TransUnit::default()
        }
    }

    pub fn id_or_empty(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn find_tag_by_id(&self, id: &str, side: Side) -> Option<&Tag> {
        self.tags.find_tag_by_id(id, side)
    }

    pub fn add_tag(&mut self, id: &str, content: &str, side: Side) -> Option<&Tag> {
        self.tags.add_tag(id, content, side)
    }

    /// Markup text of one segment.
    pub fn segment_text(&self, side: Side) -> &str {
        match side {
            Side::Source => &self.source.text,
            Side::Target => &self.target.text,
        }
    }

    pub fn set_segment_text(&mut self, side: Side, text: impl Into<String>) {
        match side {
            Side::Source => self.source.text = text.into(),
            Side::Target => self.target.text = text.into(),
        }
    }

    /// One segment decoded for editing.
    pub fn editable(&self, side: Side) -> EditableSegment {
        EditableSegment::from_markup(self.segment_text(side))
    }

    /// The tag the target should receive next, if any.
    pub fn next_missing_tag(&self) -> Option<TagToken> {
        resolver::resolve_next_tag(&self.source.text, &self.editable(Side::Target))
    }

    /// Copies the next missing source tag into an editor's working copy of
    /// the target. The stored target text is left alone.
    pub fn copy_next_tag_into(
        &mut self,
        target: &mut EditableSegment,
        cursor: &CursorState,
    ) -> TagTransfer {
        resolver::copy_next_tag(&self.source.text, target, cursor, &mut self.tags)
    }

    /// Copies the next missing source tag into the stored target text.
    pub fn copy_next_tag_from_source(&mut self, cursor: &CursorState) -> TagTransfer {
        let mut target = self.editable(Side::Target);
        let transfer = self.copy_next_tag_into(&mut target, cursor);
        if transfer.is_applied() {
            self.target.text = target.to_markup();
        }
        transfer
    }

    pub fn from_element(elem: &Element) -> Self {
        let source = elem.first_child(XLIFF_NS, "source");
        let target = elem.first_child(XLIFF_NS, "target");
        if target.is_none() {
            log::warn!(
                "trans-unit `{}` has no target, using an empty one",
                elem.attr("id").unwrap_or_default()
            );
        }

        TransUnit {
            id: elem.attr("id").map(str::to_string),
            original_id: elem.attr_ns(CAPY_NS, "original-id").map(str::to_string),
            translate: elem.attr("translate").unwrap_or("yes") == "yes",
            source: source.map(Source::from_element).unwrap_or_default(),
            target: target.map(Target::from_element).unwrap_or_default(),
            alt_translations: elem
                .children_named(XLIFF_NS, "alt-trans")
                .map(AltTrans::from_element)
                .collect(),
            tags: TagRegistry::from_lists(
                tag_list(elem, "source-props"),
                tag_list(elem, "target-props"),
            ),
        }
    }

    pub fn to_element(&self) -> Element {
        let mut elem = Element::new(xlf("trans-unit"));
        elem.set_attr_opt(QName::local("id"), self.id.as_deref());
        elem.set_attr_opt(capy("original-id"), self.original_id.as_deref());
        elem.set_attr(
            QName::local("translate"),
            if self.translate { "yes" } else { "no" },
        );
        elem.push(self.source.to_element());
        elem.push(self.target.to_element());
        for alt_trans in &self.alt_translations {
            elem.push(alt_trans.to_element());
        }
        elem.push(tag_list_element("source-props", self.tags.tags(Side::Source)));
        elem.push(tag_list_element("target-props", self.tags.tags(Side::Target)));
        elem
    }
}

impl Display for TransUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} | {}", self.source, self.target)
    }
}

fn tag_list(unit: &Element, container: &str) -> Vec<Tag> {
    unit.first_child(CAPY_NS, container)
        .map(|props| {
            props
                .children_named(CAPY_NS, "tag")
                .map(tag_from_element)
                .collect()
        })
        .unwrap_or_default()
}

fn tag_from_element(elem: &Element) -> Tag {
    Tag {
        id: elem.attr("id").unwrap_or_default().to_string(),
        content: elem
            .first_child(CAPY_NS, "content")
            .map(|content| content.text_or_empty().to_string())
            .unwrap_or_default(),
    }
}

fn tag_list_element(container: &str, tags: &[Tag]) -> Element {
    let mut elem = Element::new(capy(container));
    for tag in tags {
        let mut tag_elem = Element::new(capy("tag"));
        tag_elem.set_attr(QName::local("id"), tag.id.as_str());
        tag_elem.push(Element::new(capy("content")).with_text(tag.content.as_str()));
        elem.push(tag_elem);
    }
    elem
}
