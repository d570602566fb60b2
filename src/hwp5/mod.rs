//! HWP 5.0 binary format parser.
//!
//! This module handles parsing of HWP 5.0 documents stored in OLE containers.
//! A document holds a `FileHeader`, a `DocInfo` stream of shared style and
//! resource tables, and one record stream per body section.

mod assemble;
mod container;
pub mod control;
pub mod docinfo;
mod header;
mod record;
pub mod section;
pub mod text;

pub use container::{stream, Hwp5Container, StreamEntry};
pub use docinfo::DocInfo;
pub use header::{Capability, FileHeader, Version};
pub use record::{decompress_stream, read_records, Record, RecordHeader, RecordIterator, TagId};
pub use section::{parse_section, Section};

use crate::error::{Error, Protection, Result};
use crate::ir::Document;
use crate::parse_options::ParseOptions;
use assemble::{Assembler, ImageSource};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// HWP 5.0 document parser.
pub struct Hwp5Parser {
    container: Hwp5Container,
    header: FileHeader,
    options: ParseOptions,
    title: String,
    doc_info: Option<DocInfo>,
}

impl Hwp5Parser {
    /// Opens an HWP 5.0 document from a file path.
    ///
    /// The document title is taken from the file stem.
    pub fn open(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let container = Hwp5Container::open(path)?;
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::with_container(container, options, title)
    }

    /// Opens an HWP 5.0 document from bytes.
    pub fn from_bytes(data: Vec<u8>, options: ParseOptions) -> Result<Self> {
        Self::with_container(Hwp5Container::from_bytes(data)?, options, String::new())
    }

    /// Opens an HWP 5.0 document from a reader.
    pub fn from_reader<R: Read + Seek + Send + Sync + 'static>(reader: R, options: ParseOptions) -> Result<Self> {
        Self::with_container(Hwp5Container::from_reader(reader)?, options, String::new())
    }

    fn with_container(container: Hwp5Container, options: ParseOptions, title: String) -> Result<Self> {
        let header = FileHeader::parse(&container.read_stream(stream::FILE_HEADER)?)?;
        log::debug!(
            "HWP {} (properties 0x{:08X}: {:?})",
            header.version_string(),
            header.properties,
            header.capabilities()
        );
        header.check_protection()?;

        Ok(Self {
            container,
            header,
            options,
            title,
            doc_info: None,
        })
    }

    /// Returns the file header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Returns the resource tables once `parse` has run.
    pub fn doc_info(&self) -> Option<&DocInfo> {
        self.doc_info.as_ref()
    }

    /// Returns the underlying container.
    pub fn container(&self) -> &Hwp5Container {
        &self.container
    }

    /// Returns true if the document streams are compressed.
    pub fn is_compressed(&self) -> bool {
        self.header.is_compressed()
    }

    /// Returns the document version (e.g. "5.1.0.1").
    pub fn version(&self) -> String {
        self.header.version_string()
    }

    /// Releases the container. Safe to call more than once.
    pub fn close(&self) {
        self.container.close();
    }

    /// Parses the document into the intermediate representation.
    pub fn parse(&mut self) -> Result<Document> {
        let doc_info = DocInfo::parse(&self.read_decompressed(stream::DOC_INFO)?)?;
        log::debug!(
            "DocInfo: {} char shapes, {} para shapes, {} styles, {} bin data",
            doc_info.char_shapes.len(),
            doc_info.para_shapes.len(),
            doc_info.styles.len(),
            doc_info.bin_data.len()
        );

        let sections = self.container.body_sections();
        if sections.is_empty() {
            if self.header.is_distribution() || self.container.has_view_text() {
                return Err(Error::UnsupportedProtection(Protection::Distribution));
            }
            return Err(Error::StreamNotFound(stream::BODY_TEXT.to_string()));
        }

        let images = self.options.extract_images.then(|| ImageSource {
            container: &self.container,
            compressed: self.header.is_compressed(),
            dir: self.options.image_dir.as_deref(),
        });
        let mut assembler = Assembler::new(&doc_info, images);

        for name in &sections {
            match self.parse_body_section(name) {
                Ok(section) => assembler.push_section(&section),
                Err(e) if self.options.is_lenient() => {
                    log::warn!("skipping {name}: {e}");
                }
                Err(e) => {
                    return Err(Error::Section {
                        name: name.clone(),
                        source: Box::new(e),
                    })
                }
            }
        }

        let mut document = assembler.finish();
        document.metadata.title = self.title.clone();
        document.metadata.creator = format!("HWP {}", self.header.version_string());

        self.doc_info = Some(doc_info);
        Ok(document)
    }

    fn parse_body_section(&self, name: &str) -> Result<Section> {
        let data = self.read_decompressed(name)?;
        log::debug!("{name}: {} bytes", data.len());
        parse_section(&data, self.options.extract_images)
    }

    fn read_decompressed(&self, name: &str) -> Result<Vec<u8>> {
        let data = self.container.read_stream(name)?;
        if self.header.is_compressed() {
            decompress_stream(&data)
        } else {
            Ok(data)
        }
    }

    /// Writes every BinData stream into `dir`, returning the written paths.
    ///
    /// Streams that cannot be read are skipped with a warning.
    pub fn extract_images(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for entry in self.container.entries() {
            if entry.parent() != Some(stream::BIN_DATA) {
                continue;
            }
            let data = match self.container.read_stream(&entry.full_path()) {
                Ok(data) if self.header.is_compressed() => decompress_stream(&data).unwrap_or(data),
                Ok(data) => data,
                Err(e) => {
                    log::warn!("{}: {e}", entry.full_path());
                    continue;
                }
            };
            written.push(PathBuf::from(assemble::write_image(dir, &entry.name, &data)?));
        }
        Ok(written)
    }
}
