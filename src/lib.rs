#![forbid(unsafe_code)]
//! Inline tag codec and document model for Capybara-flavoured XLIFF 1.2.
//!
//! Segments carry formatting and placeholder tags as short inline markup
//! (`Hello {1>world<1}`, `{b>bold<b}`, `{2}`). This crate decodes that
//! markup into tokens and back without loss, tracks placeholder content per
//! trans-unit, copies missing tags from source to target, and loads/saves
//! the XLIFF container.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use capyxliff::{CursorState, Xliff};
//!
//! let mut document = Xliff::load("project.xlf")?;
//! if let Some(unit) = document.trans_unit_mut(0) {
//!     unit.copy_next_tag_from_source(&CursorState::at(0));
//! }
//! document.save("project.xlf")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod grid;
pub mod load_options;
pub mod markup;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod traits;
pub mod xml;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    grid::{SegmentChanged, TranslationGrid, all_units, open_document, save_document},
    load_options::LoadOptions,
    markup::{EditableSegment, Run, TagKind, TagToken, decode, encode},
    model::{AltTrans, Body, File, Group, Source, Target, TargetState, TransUnit, Xliff},
    registry::{Side, Tag, TagRegistry},
    resolver::{CursorState, EditResult, TagTransfer},
    traits::XmlDocument,
};
