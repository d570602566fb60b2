//! OLE container wrapper for HWP 5.0 documents.

use crate::error::{Error, Result};
use cfb::CompoundFile;
use std::cell::RefCell;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Component, Path};

/// Stream names used by HWP 5.0.
pub mod stream {
    pub const FILE_HEADER: &str = "FileHeader";
    pub const DOC_INFO: &str = "DocInfo";
    pub const BODY_TEXT: &str = "BodyText";
    pub const VIEW_TEXT: &str = "ViewText";
    pub const BIN_DATA: &str = "BinData";
    pub const SECTION_PREFIX: &str = "Section";
}

/// Byte source the container can be opened over.
pub trait ReadSeek: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> ReadSeek for T {}

/// A stream inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    /// Storage names from the root down to the stream's parent
    pub storages: Vec<String>,
    /// Leaf stream name
    pub name: String,
}

impl StreamEntry {
    /// Slash-joined path without a leading slash (`BodyText/Section0`).
    pub fn full_path(&self) -> String {
        let mut parts = self.storages.clone();
        parts.push(self.name.clone());
        parts.join("/")
    }

    /// Name of the immediate parent storage.
    pub fn parent(&self) -> Option<&str> {
        self.storages.last().map(String::as_str)
    }
}

/// OLE container wrapper for HWP 5.0 documents.
pub struct Hwp5Container {
    cfb: RefCell<Option<CompoundFile<Box<dyn ReadSeek>>>>,
    entries: Vec<StreamEntry>,
}

impl Hwp5Container {
    /// Opens an HWP 5.0 container from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotAFile(path.to_path_buf()));
        }
        Self::from_reader(File::open(path)?)
    }

    /// Opens an HWP 5.0 container from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Opens an HWP 5.0 container from a reader.
    pub fn from_reader<R: Read + Seek + Send + Sync + 'static>(reader: R) -> Result<Self> {
        let source: Box<dyn ReadSeek> = Box::new(reader);
        let cfb = CompoundFile::open(source).map_err(|e| Error::NotAContainer(e.to_string()))?;

        let entries: Vec<StreamEntry> = cfb
            .walk()
            .filter(|entry| entry.is_stream())
            .map(|entry| StreamEntry {
                storages: storage_names(entry.path()),
                name: entry.name().to_string(),
            })
            .collect();
        log::debug!("container: {} streams", entries.len());

        Ok(Self {
            cfb: RefCell::new(Some(cfb)),
            entries,
        })
    }

    /// Releases the underlying reader. Safe to call more than once.
    pub fn close(&self) {
        self.cfb.borrow_mut().take();
    }

    /// Returns true once the container has been closed.
    pub fn is_closed(&self) -> bool {
        self.cfb.borrow().is_none()
    }

    /// Lists all streams in the container.
    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }

    /// Resolves a stream name to a container entry.
    ///
    /// Tries the exact leaf name, then the full slash-joined path, then a
    /// leaf name whose immediate parent storage matches.
    pub fn find_entry(&self, name: &str) -> Option<&StreamEntry> {
        let wanted = name.trim_start_matches('/');
        let mut parts = wanted.rsplit('/');
        let leaf = parts.next().unwrap_or(wanted);
        let parent = parts.next();

        self.entries
            .iter()
            .find(|e| e.name == wanted)
            .or_else(|| self.entries.iter().find(|e| e.full_path() == wanted))
            .or_else(|| {
                let parent = parent?;
                self.entries
                    .iter()
                    .find(|e| e.name == leaf && e.parent() == Some(parent))
            })
    }

    /// Checks if a stream exists.
    pub fn stream_exists(&self, name: &str) -> bool {
        self.find_entry(name).is_some()
    }

    /// Reads a raw stream without decompression.
    pub fn read_stream(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .find_entry(name)
            .ok_or_else(|| Error::StreamNotFound(name.to_string()))?;
        let path = format!("/{}", entry.full_path());

        let mut guard = self.cfb.borrow_mut();
        let cfb = guard
            .as_mut()
            .ok_or_else(|| Error::InvalidData("container is closed".into()))?;
        let mut stream = cfb
            .open_stream(&path)
            .map_err(|_| Error::StreamNotFound(name.to_string()))?;

        let mut data = Vec::new();
        stream.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Lists body section streams ordered by section number.
    ///
    /// Falls back to any `Section*` stream outside `ViewText` when there is
    /// no `BodyText` storage.
    pub fn body_sections(&self) -> Vec<String> {
        let is_section = |e: &&StreamEntry| e.name.starts_with(stream::SECTION_PREFIX);

        let mut sections: Vec<&StreamEntry> = self
            .entries
            .iter()
            .filter(is_section)
            .filter(|e| e.parent() == Some(stream::BODY_TEXT))
            .collect();

        if sections.is_empty() {
            sections = self
                .entries
                .iter()
                .filter(is_section)
                .filter(|e| !e.storages.iter().any(|s| s == stream::VIEW_TEXT))
                .collect();
        }

        sections.sort_by_key(|e| (section_number(&e.name), e.name.clone()));
        sections.into_iter().map(StreamEntry::full_path).collect()
    }

    /// Returns true if the container holds `ViewText` sections.
    pub fn has_view_text(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.storages.iter().any(|s| s == stream::VIEW_TEXT))
    }

    /// Reads a raw BinData stream, trying `BINxxxx.ext` then `BINxxxx`.
    pub fn read_bin_data(&self, id: u16, extension: &str) -> Result<Vec<u8>> {
        let base = format!("{}/BIN{:04X}", stream::BIN_DATA, id);
        if !extension.is_empty() {
            let with_ext = format!("{base}.{extension}");
            if self.stream_exists(&with_ext) {
                return self.read_stream(&with_ext);
            }
        }
        self.read_stream(&base)
    }
}

/// Names of the storages enclosing an entry path (`/BodyText/Section0`).
fn storage_names(path: &Path) -> Vec<String> {
    path.parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Numeric suffix of a `SectionN` name; unnumbered names sort last.
fn section_number(name: &str) -> u32 {
    name.strip_prefix(stream::SECTION_PREFIX)
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX)
}
