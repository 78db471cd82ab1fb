//! The XLIFF entity graph.
//!
//! `Xliff` → `File` → `Body` → `Group` → `TransUnit`, each a plain owned
//! value. Every entity has a `from_element` / `to_element` pair working on
//! [`crate::xml::Element`]; a missing optional child becomes an empty value
//! instead of an error.

pub mod document;
pub mod state;
pub mod unit;

pub use document::{Body, Context, ContextGroup, File, Group, Xliff};
pub use state::TargetState;
pub use unit::{AltTrans, Source, Target, TransUnit};

use crate::xml::{Prefixes, QName};

/// XLIFF 1.2 namespace, written as the default namespace.
pub const XLIFF_NS: &str = "urn:oasis:names:tc:xliff:document:1.2";

/// Capybara extension namespace, written with the `capy` prefix.
pub const CAPY_NS: &str = "http://capybaratranslation.com/capyxliff/1.0";

pub const CAPY_PREFIX: &str = "capy";

pub(crate) const PREFIXES: Prefixes<'static> = Prefixes {
    default: XLIFF_NS,
    bound: &[(CAPY_PREFIX, CAPY_NS)],
};

pub(crate) fn xlf(local: &str) -> QName {
    QName::new(XLIFF_NS, local)
}

pub(crate) fn capy(local: &str) -> QName {
    QName::new(CAPY_NS, local)
}
