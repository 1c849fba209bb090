//! Word package (zipped Office Open XML) backend.
//!
//! Part discovery follows the package relationships:
//! 1. `_rels/.rels` names the main document part (`officeDocument` relationship)
//! 2. the main part's own `.rels` file names its header and footer parts
//!
//! Saving rewrites the archive. Modified parts are re-serialized with their
//! original compression method; every other entry is copied raw.

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use super::xml::XmlPart;
use super::{ContentTree, Document, DocumentOpener};
use crate::error::{Error, Result};

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const HEADER_REL: &str = "/header";
const FOOTER_REL: &str = "/footer";

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    kind: String,
    target: String,
    external: bool,
}

/// An open Word package: its main part plus header and footer parts.
#[derive(Debug)]
pub struct WordPackage {
    path: PathBuf,
    main: XmlPart,
    headers: Vec<XmlPart>,
    footers: Vec<XmlPart>,
}

impl WordPackage {
    pub fn open(path: &Path) -> Result<Self> {
        let source = path.display().to_string();
        let file = fs::File::open(path)
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("open {}", source))))?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| Error::document_invalid_package(&source, e.to_string()))?;

        let main_name = resolve_main_part(&mut archive, &source)?;
        let main = load_part(&mut archive, &source, &main_name)?;

        let mut headers = Vec::new();
        let mut footers = Vec::new();
        for rel in read_relationships(&mut archive, &source, &rels_name_for(&main_name))? {
            if rel.external {
                continue;
            }
            let part_name = resolve_target(&main_name, &rel.target);
            if rel.kind.ends_with(HEADER_REL) {
                headers.push(load_part(&mut archive, &source, &part_name)?);
            } else if rel.kind.ends_with(FOOTER_REL) {
                footers.push(load_part(&mut archive, &source, &part_name)?);
            }
        }

        Ok(WordPackage {
            path: path.to_path_buf(),
            main,
            headers,
            footers,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn main_part(&self) -> &XmlPart {
        &self.main
    }

    pub fn headers(&self) -> &[XmlPart] {
        &self.headers
    }

    pub fn footers(&self) -> &[XmlPart] {
        &self.footers
    }

    pub fn is_modified(&self) -> bool {
        self.parts().any(XmlPart::is_modified)
    }

    fn parts(&self) -> impl Iterator<Item = &XmlPart> {
        std::iter::once(&self.main)
            .chain(self.headers.iter())
            .chain(self.footers.iter())
    }

    fn parts_mut(&mut self) -> impl Iterator<Item = &mut XmlPart> {
        std::iter::once(&mut self.main)
            .chain(self.headers.iter_mut())
            .chain(self.footers.iter_mut())
    }

    fn write_archive(&self) -> Result<()> {
        let source = self.path.display().to_string();

        let mut updated: HashMap<&str, Vec<u8>> = HashMap::new();
        for part in self.parts().filter(|p| p.is_modified()) {
            updated.insert(part.name(), part.to_bytes(&source)?);
        }

        let file = fs::File::open(&self.path)
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("open {}", source))))?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| Error::document_invalid_package(&source, e.to_string()))?;

        let zip_err = |e: ZipError| {
            Error::internal_io(e.to_string(), Some(format!("rewrite {}", source)))
        };

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for idx in 0..archive.len() {
            let entry = archive.by_index(idx).map_err(zip_err)?;
            let name = entry.name().to_string();

            match updated.get(name.as_str()) {
                Some(bytes) => {
                    let options = FileOptions::default()
                        .compression_method(entry.compression())
                        .last_modified_time(entry.last_modified());
                    writer.start_file(name, options).map_err(zip_err)?;
                    writer.write_all(bytes).map_err(|e| {
                        Error::internal_io(e.to_string(), Some(format!("rewrite {}", source)))
                    })?;
                }
                None => writer.raw_copy_file(entry).map_err(zip_err)?,
            }
        }

        let buffer = writer.finish().map_err(zip_err)?.into_inner();
        drop(archive);

        fs::write(&self.path, buffer)
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("write {}", source))))
    }
}

impl Document for WordPackage {
    fn main_content(&mut self) -> &mut dyn ContentTree {
        &mut self.main
    }

    fn header_parts(&mut self) -> Vec<&mut dyn ContentTree> {
        self.headers
            .iter_mut()
            .map(|p| p as &mut dyn ContentTree)
            .collect()
    }

    fn footer_parts(&mut self) -> Vec<&mut dyn ContentTree> {
        self.footers
            .iter_mut()
            .map(|p| p as &mut dyn ContentTree)
            .collect()
    }

    fn save(&mut self) -> Result<bool> {
        if !self.is_modified() {
            return Ok(false);
        }
        self.write_archive()?;
        self.parts_mut().for_each(XmlPart::mark_saved);
        Ok(true)
    }
}

/// Opens Word packages from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordOpener;

impl DocumentOpener for WordOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn Document>> {
        Ok(Box::new(WordPackage::open(path)?))
    }
}

// ============================================================================
// Archive helpers
// ============================================================================

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    source: &str,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(Error::document_invalid_package(source, e.to_string())),
    };

    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| Error::document_invalid_package(source, format!("{}: {}", name, e)))?;
    Ok(Some(bytes))
}

fn load_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    source: &str,
    name: &str,
) -> Result<XmlPart> {
    let bytes = read_entry(archive, source, name)?
        .ok_or_else(|| Error::document_part_missing(source, name))?;
    XmlPart::parse(source, name, &bytes)
}

fn resolve_main_part<R: Read + Seek>(archive: &mut ZipArchive<R>, source: &str) -> Result<String> {
    let main = read_relationships(archive, source, PACKAGE_RELS)?
        .into_iter()
        .find(|rel| !rel.external && rel.kind.ends_with(OFFICE_DOCUMENT_REL))
        .map(|rel| resolve_target("", &rel.target))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());
    Ok(main)
}

fn read_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    source: &str,
    rels_name: &str,
) -> Result<Vec<Relationship>> {
    match read_entry(archive, source, rels_name)? {
        Some(bytes) => parse_relationships(source, rels_name, &bytes),
        None => Ok(Vec::new()),
    }
}

fn parse_relationships(source: &str, rels_name: &str, bytes: &[u8]) -> Result<Vec<Relationship>> {
    let invalid = |e: quick_xml::Error| Error::document_invalid_xml(source, rels_name, e.to_string());

    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut relationships = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(invalid)? {
            Event::Eof => break,
            Event::Start(tag) | Event::Empty(tag) if tag.local_name().as_ref() == b"Relationship" => {
                let mut rel = Relationship {
                    kind: String::new(),
                    target: String::new(),
                    external: false,
                };
                for attr in tag.attributes() {
                    let attr = attr.map_err(|e| invalid(e.into()))?;
                    let value = attr.unescape_value().map_err(invalid)?.into_owned();
                    match attr.key.as_ref() {
                        b"Type" => rel.kind = value,
                        b"Target" => rel.target = value,
                        b"TargetMode" => rel.external = value.eq_ignore_ascii_case("External"),
                        _ => {}
                    }
                }
                relationships.push(rel);
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// Relationship part name for `part` (`word/document.xml` → `word/_rels/document.xml.rels`).
fn rels_name_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of `base_part`.
///
/// Absolute targets (leading `/`) are package-root relative. `.` and `..`
/// segments are normalized away.
fn resolve_target(base_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    if !target.starts_with('/') {
        if let Some((dir, _)) = base_part.rsplit_once('/') {
            segments.extend(dir.split('/').filter(|s| !s.is_empty()));
        }
    }

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
