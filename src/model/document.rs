use std::path::Path;

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::{
    error::Error,
    load_options::LoadOptions,
    model::{CAPY_NS, PREFIXES, TransUnit, XLIFF_NS, capy, xlf},
    traits::XmlDocument,
    xml::{Element, Prefixes, QName},
};

/// A `<context>` inside a context group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub context_type: Option<String>,
    pub value: String,
}

impl Context {
    pub fn from_element(elem: &Element) -> Self {
        Context {
            context_type: elem.attr("context-type").map(str::to_string),
            value: elem.text_or_empty().to_string(),
        }
    }

    pub fn to_element(&self) -> Element {
        let mut elem = Element::new(xlf("context")).with_text(self.value.as_str());
        elem.set_attr_opt(QName::local("context-type"), self.context_type.as_deref());
        elem
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextGroup {
    pub contexts: Vec<Context>,
}

impl ContextGroup {
    pub fn from_element(elem: &Element) -> Self {
        ContextGroup {
            contexts: elem
                .children_named(XLIFF_NS, "context")
                .map(Context::from_element)
                .collect(),
        }
    }

    pub fn to_element(&self) -> Element {
        let mut elem = Element::new(xlf("context-group"));
        for context in &self.contexts {
            elem.push(context.to_element());
        }
        elem
    }
}

/// A `<group>` of trans-units. Unit order is document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Option<String>,
    pub original_id: Option<String>,
    pub context_group: Option<ContextGroup>,
    pub trans_units: Vec<TransUnit>,
}

impl Group {
    pub fn from_element(elem: &Element) -> Self {
        Group {
            id: elem.attr("id").map(str::to_string),
            original_id: elem.attr_ns(CAPY_NS, "original-id").map(str::to_string),
            context_group: elem
                .first_child(XLIFF_NS, "context-group")
                .map(ContextGroup::from_element),
            trans_units: elem
                .children_named(XLIFF_NS, "trans-unit")
                .map(TransUnit::from_element)
                .collect(),
        }
    }

    pub fn to_element(&self) -> Element {
        let mut elem = Element::new(xlf("group"));
        elem.set_attr_opt(QName::local("id"), self.id.as_deref());
        elem.set_attr_opt(capy("original-id"), self.original_id.as_deref());
        if let Some(context_group) = &self.context_group {
            elem.push(context_group.to_element());
        }
        for unit in &self.trans_units {
            elem.push(unit.to_element());
        }
        elem
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub groups: Vec<Group>,
}

impl Body {
    pub fn from_element(elem: &Element) -> Self {
        Body {
            groups: elem
                .children_named(XLIFF_NS, "group")
                .map(Group::from_element)
                .collect(),
        }
    }

    pub fn to_element(&self) -> Element {
        let mut elem = Element::new(xlf("body"));
        for group in &self.groups {
            elem.push(group.to_element());
        }
        elem
    }
}

/// A `<file>`: one original document and its language pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub original: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    pub datatype: Option<String>,
    pub body: Body,
}

impl File {
    pub fn source_language_id(&self) -> Option<LanguageIdentifier> {
        self.source_language.as_deref()?.parse().ok()
    }

    pub fn target_language_id(&self) -> Option<LanguageIdentifier> {
        self.target_language.as_deref()?.parse().ok()
    }

    pub fn from_element(elem: &Element) -> Self {
        let body = match elem.first_child(XLIFF_NS, "body") {
            Some(body) => Body::from_element(body),
            None => {
                log::warn!(
                    "file `{}` has no body",
                    elem.attr("original").unwrap_or_default()
                );
                Body::default()
            }
        };
        File {
            original: elem.attr("original").map(str::to_string),
            source_language: elem.attr("source-language").map(str::to_string),
            target_language: elem.attr("target-language").map(str::to_string),
            datatype: elem.attr("datatype").map(str::to_string),
            body,
        }
    }

    pub fn to_element(&self) -> Element {
        let mut elem = Element::new(xlf("file"));
        elem.set_attr_opt(QName::local("original"), self.original.as_deref());
        elem.set_attr_opt(
            QName::local("source-language"),
            self.source_language.as_deref(),
        );
        elem.set_attr_opt(
            QName::local("target-language"),
            self.target_language.as_deref(),
        );
        elem.set_attr_opt(QName::local("datatype"), self.datatype.as_deref());
        elem.push(self.body.to_element());
        elem
    }
}

/// A whole XLIFF document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xliff {
    pub version: String,
    pub capy_version: String,
    pub files: Vec<File>,
}

impl Default for Xliff {
    fn default() -> Self {
        Xliff {
            version: "1.2".to_string(),
            capy_version: "1.0".to_string(),
            files: Vec::new(),
        }
    }
}

impl Xliff {
    /// Source language of the first file, empty when there is none.
    pub fn source_language(&self) -> &str {
        self.files
            .first()
            .and_then(|file| file.source_language.as_deref())
            .unwrap_or_default()
    }

    /// Target language of the first file, empty when there is none.
    pub fn target_language(&self) -> &str {
        self.files
            .first()
            .and_then(|file| file.target_language.as_deref())
            .unwrap_or_default()
    }

    /// All trans-units across files and groups, in document order.
    pub fn trans_units(&self) -> impl Iterator<Item = &TransUnit> {
        self.files
            .iter()
            .flat_map(|file| file.body.groups.iter())
            .flat_map(|group| group.trans_units.iter())
    }

    pub fn trans_units_mut(&mut self) -> impl Iterator<Item = &mut TransUnit> {
        self.files
            .iter_mut()
            .flat_map(|file| file.body.groups.iter_mut())
            .flat_map(|group| group.trans_units.iter_mut())
    }

    /// Flattened trans-units; index `i` is row `i` of an editing grid.
    pub fn all_trans_units(&self) -> Vec<&TransUnit> {
        self.trans_units().collect()
    }

    pub fn unit_count(&self) -> usize {
        self.trans_units().count()
    }

    pub fn trans_unit(&self, index: usize) -> Option<&TransUnit> {
        self.trans_units().nth(index)
    }

    pub fn trans_unit_mut(&mut self, index: usize) -> Option<&mut TransUnit> {
        self.trans_units_mut().nth(index)
    }

    /// First unit with the given id.
    pub fn find_trans_unit(&self, id: &str) -> Option<&TransUnit> {
        self.trans_units().find(|unit| unit.id.as_deref() == Some(id))
    }

    pub fn find_trans_unit_mut(&mut self, id: &str) -> Option<&mut TransUnit> {
        self.trans_units_mut()
            .find(|unit| unit.id.as_deref() == Some(id))
    }

    /// Builds the document from its root. The root must be `xliff` in the
    /// XLIFF 1.2 namespace; an unqualified `<xliff>` is rejected rather than
    /// read as a document without files.
    pub fn from_element(elem: &Element) -> Result<Self, Error> {
        if !elem.name.is(XLIFF_NS, "xliff") {
            let found = match &elem.name.namespace {
                Some(namespace) => format!("<{}> in `{}`", elem.name.local, namespace),
                None => format!("<{}> without a namespace", elem.name.local),
            };
            return Err(Error::InvalidDocument(format!(
                "expected an XLIFF 1.2 <xliff> root, found {found}"
            )));
        }
        let defaults = Xliff::default();
        Ok(Xliff {
            version: elem
                .attr("version")
                .map(str::to_string)
                .unwrap_or(defaults.version),
            capy_version: elem
                .attr_ns(CAPY_NS, "version")
                .map(str::to_string)
                .unwrap_or(defaults.capy_version),
            files: elem
                .children_named(XLIFF_NS, "file")
                .map(File::from_element)
                .collect(),
        })
    }

    pub fn to_element(&self) -> Element {
        let mut elem = Element::new(xlf("xliff"));
        elem.set_attr(QName::local("version"), self.version.as_str());
        elem.set_attr(capy("version"), self.capy_version.as_str());
        for file in &self.files {
            elem.push(file.to_element());
        }
        elem
    }

    /// Loads a file with default options.
    ///
    /// Fails with [`Error::InvalidDocument`] when the root is not an
    /// `xliff` element in the XLIFF 1.2 namespace, including an `<xliff>`
    /// root with no namespace declaration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::load_with(path, &LoadOptions::default())
    }

    /// Loads a file, picking relaxed parser limits for large files.
    pub fn load_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, Error> {
        let document = Self::read_with(path, options)?;
        log::debug!(
            "loaded {} file(s), {} trans-unit(s)",
            document.files.len(),
            document.unit_count()
        );
        Ok(document)
    }

    /// Writes the document to `destination`. A failed save leaves the
    /// in-memory document untouched and usable.
    pub fn save<P: AsRef<Path>>(&self, destination: P) -> Result<(), Error> {
        self.write_to(destination)
    }
}

impl XmlDocument for Xliff {
    const PREFIXES: Prefixes<'static> = PREFIXES;

    fn from_root(root: &Element) -> Result<Self, Error> {
        Self::from_element(root)
    }

    fn to_root(&self) -> Element {
        self.to_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TargetState;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" xmlns:capy="http://capybaratranslation.com/capyxliff/1.0" version="1.2" capy:version="1.0">
  <file original="a.docx" source-language="en-US" target-language="de-DE" datatype="x-docx">
    <body>
      <group id="g1" capy:original-id="p1">
        <context-group>
          <context context-type="paragraph">Intro</context>
        </context-group>
        <trans-unit id="1" translate="yes">
          <source>One</source>
          <target state="final">Eins</target>
        </trans-unit>
        <trans-unit id="2">
          <source>Two</source>
          <target/>
        </trans-unit>
      </group>
      <group id="g2">
        <trans-unit id="3">
          <source>Three</source>
        </trans-unit>
      </group>
    </body>
  </file>
  <file original="b.docx" source-language="en-US" target-language="de-DE">
    <body>
      <group id="g3">
        <trans-unit id="4">
          <source>Four</source>
          <target>Vier</target>
        </trans-unit>
      </group>
    </body>
  </file>
</xliff>
"#;

    fn ids(doc: &Xliff) -> Vec<String> {
        doc.trans_units()
            .map(|unit| unit.id_or_empty().to_string())
            .collect()
    }

    #[test]
    fn test_parse_sample() {
        let doc = Xliff::from_str(SAMPLE).unwrap();
        assert_eq!(doc.version, "1.2");
        assert_eq!(doc.capy_version, "1.0");
        assert_eq!(doc.files.len(), 2);
        assert_eq!(doc.source_language(), "en-US");
        assert_eq!(doc.target_language(), "de-DE");

        let file = &doc.files[0];
        assert_eq!(file.datatype.as_deref(), Some("x-docx"));
        assert_eq!(file.target_language_id().unwrap().language.as_str(), "de");

        let group = &file.body.groups[0];
        assert_eq!(group.original_id.as_deref(), Some("p1"));
        let contexts = &group.context_group.as_ref().unwrap().contexts;
        assert_eq!(contexts[0].context_type.as_deref(), Some("paragraph"));
        assert_eq!(contexts[0].value, "Intro");
        assert!(file.body.groups[1].context_group.is_none());
    }

    #[test]
    fn test_flatten_in_document_order() {
        let doc = Xliff::from_str(SAMPLE).unwrap();
        assert_eq!(ids(&doc), vec!["1", "2", "3", "4"]);
        assert_eq!(ids(&doc), ids(&doc));
        assert_eq!(doc.all_trans_units().len(), 4);
        assert_eq!(doc.trans_unit(2).unwrap().source.text, "Three");
    }

    #[test]
    fn test_missing_target_is_empty() {
        let doc = Xliff::from_str(SAMPLE).unwrap();
        let unit = doc.find_trans_unit("3").unwrap();
        assert_eq!(unit.target.text, "");
        assert_eq!(unit.target.state, TargetState::None);
        assert_eq!(doc.find_trans_unit("1").unwrap().target.state, TargetState::Final);
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let err = Xliff::from_str("<resources/>").unwrap_err();
        assert!(matches!(err, Error::InvalidDocument(_)));
        let err = Xliff::from_str("<xliff version=\"1.2\"/>").unwrap_err();
        assert!(matches!(err, Error::InvalidDocument(_)));
        assert!(err.to_string().contains("<xliff> without a namespace"));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(Xliff::from_str("<xliff xmlns=\"urn:oasis:names:tc:xliff:document:1.2\">").is_err());
        assert!(Xliff::from_str("not xml at all").is_err());
    }

    #[test]
    fn test_missing_versions_use_defaults() {
        let doc = Xliff::from_str(r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2"/>"#).unwrap();
        assert_eq!(doc.version, "1.2");
        assert_eq!(doc.capy_version, "1.0");
        assert!(doc.files.is_empty());
        assert_eq!(doc.source_language(), "");
    }

    #[test]
    fn test_serialized_output_shape() {
        let doc = Xliff::from_str(SAMPLE).unwrap();
        let out = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<xliff "));
        assert!(out.contains(r#"xmlns="urn:oasis:names:tc:xliff:document:1.2""#));
        assert!(out.contains(r#"xmlns:capy="http://capybaratranslation.com/capyxliff/1.0""#));
        assert!(out.contains(r#"capy:version="1.0""#));
        assert!(out.contains(r#"<target state="final">Eins</target>"#));
        assert!(out.contains("<target></target>"));
        assert!(!out.contains("state=\"none\""));
        assert!(out.contains("<capy:source-props/>"));
    }

    #[test]
    fn test_serialize_round_trip() {
        let doc = Xliff::from_str(SAMPLE).unwrap();
        let reparsed = Xliff::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_find_trans_unit_mut() {
        let mut doc = Xliff::from_str(SAMPLE).unwrap();
        doc.find_trans_unit_mut("4").unwrap().target.text = "VIER".to_string();
        assert_eq!(doc.trans_unit(3).unwrap().target.text, "VIER");
        assert!(doc.find_trans_unit_mut("missing").is_none());
    }
}
