//! Inline tag markup codec.
//!
//! Segments carry formatting spans and placeholders as short inline tags:
//!
//! - start tag: `{b>`, `{bi>`, `{2>`
//! - end tag: `<b}`, `<2}`
//! - empty tag: `{3}` (numeric names only) or the marker `{j}`
//!
//! Tag names are either a combination of the builtin formatting codes
//! `b`, `i`, `u`, `_` (subscript), `^` (superscript), or a one- or two-digit
//! number. Numeric tags are placeholders whose content lives in the
//! trans-unit tag registry; builtin tags carry no content.
//!
//! [`decode`] never fails: anything that is not a well-formed tag is kept as
//! literal text. [`encode`] is its inverse, so
//! `encode(&decode(s)) == s` for any `s` free of `\r` and of the
//! [`LINE_BREAK`] marker itself.

use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Line-break marker used inside decoded literal runs.
pub const LINE_BREAK: char = '\u{2028}';

const PARAGRAPH_SEPARATOR: char = '\u{2029}';

lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(concat!(
        r"(?P<start>\{(?:[biu_^]+|[0-9]{1,2})>)",
        r"|(?P<end><(?:[biu_^]+|[0-9]{1,2})\})",
        r"|(?P<empty>\{(?:[0-9]{1,2}|j)\})",
    ))
    .unwrap();
}

/// Kind of an inline tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Start,
    End,
    Empty,
}

/// A single inline tag as it appears in a segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagToken {
    pub name: String,
    pub kind: TagKind,
}

impl TagToken {
    pub fn new(name: impl Into<String>, kind: TagKind) -> Self {
        TagToken {
            name: name.into(),
            kind,
        }
    }

    pub fn start(name: impl Into<String>) -> Self {
        Self::new(name, TagKind::Start)
    }

    pub fn end(name: impl Into<String>) -> Self {
        Self::new(name, TagKind::End)
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, TagKind::Empty)
    }

    /// Builtin tags (formatting codes and `{j}`) have no registry entry.
    pub fn is_builtin(&self) -> bool {
        is_builtin_name(&self.name)
    }

    /// Start and end tags can wrap a range; empty tags cannot.
    pub fn is_pairable(&self) -> bool {
        self.kind != TagKind::Empty
    }

    /// The other half of a start/end pair.
    pub fn counterpart(&self) -> Option<TagToken> {
        match self.kind {
            TagKind::Start => Some(TagToken::end(self.name.clone())),
            TagKind::End => Some(TagToken::start(self.name.clone())),
            TagKind::Empty => None,
        }
    }

    /// Renders the token back to its markup substring, e.g. `{2>`.
    pub fn to_markup(&self) -> String {
        self.to_string()
    }
}

impl Display for TagToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TagKind::Start => write!(f, "{{{}>", self.name),
            TagKind::End => write!(f, "<{}}}", self.name),
            TagKind::Empty => write!(f, "{{{}}}", self.name),
        }
    }
}

/// Returns `true` for names that are not purely numeric.
pub fn is_builtin_name(name: &str) -> bool {
    name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit())
}

/// One piece of a decoded segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Run {
    Literal(String),
    Tag(TagToken),
}

/// Splits markup text into literal runs and tag tokens.
///
/// Line endings inside literal runs (`\r\n`, `\r`, `\n`) become [`LINE_BREAK`].
pub fn decode(text: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in TAG_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            runs.push(Run::Literal(normalize_line_breaks(
                &text[last..whole.start()],
            )));
        }

        let kind = if caps.name("start").is_some() {
            TagKind::Start
        } else if caps.name("end").is_some() {
            TagKind::End
        } else {
            TagKind::Empty
        };
        // Delimiters are single ASCII bytes on both sides.
        let matched = whole.as_str();
        let name = &matched[1..matched.len() - 1];
        runs.push(Run::Tag(TagToken::new(name, kind)));

        last = whole.end();
    }

    if last < text.len() {
        runs.push(Run::Literal(normalize_line_breaks(&text[last..])));
    }
    runs
}

/// Serializes runs back to markup text.
pub fn encode(runs: &[Run]) -> String {
    let mut out = String::new();
    for run in runs {
        match run {
            Run::Literal(text) => out.extend(text.chars().map(denormalize_char)),
            Run::Tag(token) => out.push_str(&token.to_markup()),
        }
    }
    out
}

/// Tag tokens of a markup string, in document order.
pub fn tag_tokens(text: &str) -> Vec<TagToken> {
    decode(text)
        .into_iter()
        .filter_map(|run| match run {
            Run::Tag(token) => Some(token),
            Run::Literal(_) => None,
        })
        .collect()
}

fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', &LINE_BREAK.to_string())
}

fn denormalize_char(c: char) -> char {
    match c {
        LINE_BREAK | PARAGRAPH_SEPARATOR => '\n',
        other => other,
    }
}

/// A unit of editable content: one character or one whole tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Char(char),
    Tag(TagToken),
}

/// Segment content as an editor sees it.
///
/// Every character and every tag occupies exactly one position, so cursor
/// and selection offsets index directly into [`EditableSegment::pieces`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableSegment {
    pieces: Vec<Piece>,
}

impl EditableSegment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_markup(text: &str) -> Self {
        Self::from_runs(&decode(text))
    }

    pub fn from_runs(runs: &[Run]) -> Self {
        let mut pieces = Vec::new();
        for run in runs {
            match run {
                Run::Literal(text) => pieces.extend(text.chars().map(Piece::Char)),
                Run::Tag(token) => pieces.push(Piece::Tag(token.clone())),
            }
        }
        EditableSegment { pieces }
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Tags in document order.
    pub fn tags(&self) -> impl Iterator<Item = &TagToken> {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Tag(token) => Some(token),
            Piece::Char(_) => None,
        })
    }

    /// Regroups the pieces into runs, merging adjacent characters.
    pub fn to_runs(&self) -> Vec<Run> {
        runs_of(&self.pieces)
    }

    pub fn to_markup(&self) -> String {
        encode(&self.to_runs())
    }

    /// Markup for the pieces in `start..end`, clamped to the segment.
    pub fn to_markup_in_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.pieces.len());
        let start = start.min(end);
        encode(&runs_of(&self.pieces[start..end]))
    }

    /// Inserts a tag at `pos` (clamped to the end).
    pub fn insert_tag(&mut self, pos: usize, token: TagToken) {
        let pos = pos.min(self.pieces.len());
        self.pieces.insert(pos, Piece::Tag(token));
    }

    /// Inserts typed or pasted text at `pos`, turning any well-formed tag
    /// markup in it into tags. Returns the number of positions inserted.
    pub fn insert_markup(&mut self, pos: usize, text: &str) -> usize {
        let pos = pos.min(self.pieces.len());
        let inserted = EditableSegment::from_markup(text).pieces;
        let count = inserted.len();
        self.pieces.splice(pos..pos, inserted);
        count
    }

    /// Removes the pieces in `start..end`, clamped to the segment.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        let end = end.min(self.pieces.len());
        let start = start.min(end);
        self.pieces.drain(start..end);
    }
}

fn runs_of(pieces: &[Piece]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut literal = String::new();
    for piece in pieces {
        match piece {
            Piece::Char(c) => literal.push(*c),
            Piece::Tag(token) => {
                if !literal.is_empty() {
                    runs.push(Run::Literal(std::mem::take(&mut literal)));
                }
                runs.push(Run::Tag(token.clone()));
            }
        }
    }
    if !literal.is_empty() {
        runs.push(Run::Literal(literal));
    }
    runs
}
