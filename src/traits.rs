//! Reading and writing XML-backed documents.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, Cursor, Write},
    path::Path,
};

use crate::{
    error::Error,
    load_options::LoadOptions,
    xml::{self, Element, ParseLimits, Prefixes},
};

/// A document that converts to and from a single XML root element.
///
/// Implementors only describe the element mapping; parsing, limits,
/// input decoding and saving come for free.
///
/// # Example
///
/// ```rust,no_run
/// use capyxliff::{Xliff, traits::XmlDocument};
/// let document = Xliff::read_from("project.xlf")?;
/// document.write_to("project_copy.xlf")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait XmlDocument: Sized {
    /// Namespaces declared on the written root element.
    const PREFIXES: Prefixes<'static>;

    /// Builds the document from its parsed root element.
    fn from_root(root: &Element) -> Result<Self, Error>;

    /// Builds the root element to write.
    fn to_root(&self) -> Element;

    /// Parse from any reader with explicit limits.
    fn parse<R: BufRead>(reader: R, limits: ParseLimits) -> Result<Self, Error> {
        let root = xml::parse_document(reader, limits)?;
        Self::from_root(&root)
    }

    /// Parse from any reader with default limits.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        Self::parse(reader, ParseLimits::default())
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error> {
        Self::from_reader(Cursor::new(s))
    }

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Parse from file path with default options.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::read_with(path, &LoadOptions::default())
    }

    /// Parse from file path. Large files get relaxed limits; UTF-16 input
    /// with a byte order mark is transcoded.
    fn read_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        let limits = options.limits_for(size);
        log::debug!(
            "reading {} ({} bytes, {} limits)",
            path.display(),
            size,
            if limits == ParseLimits::default() {
                "default"
            } else {
                "relaxed"
            }
        );

        let decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .strip_bom(true)
            .build(file);
        Self::parse(BufReader::new(decoder), limits)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        xml::write_document(writer, &self.to_root(), &Self::PREFIXES)
    }

    /// Serialize to UTF-8 bytes.
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.to_writer(&mut out)?;
        Ok(out)
    }

    /// Write to file path. Serialization happens before the file is opened.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes).map_err(|e| Error::save_error(path, e))?;
        log::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}
