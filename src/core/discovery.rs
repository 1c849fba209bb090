//! Candidate file discovery.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::file_name::split_name;

/// A document found under the run root. Never mutated after discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFile {
    pub full_path: PathBuf,
    pub directory: PathBuf,
    pub file_name: String,
    pub base_name: String,
    pub extension: String,
}

impl CandidateFile {
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let (base_name, extension) = split_name(&file_name);

        Some(CandidateFile {
            full_path: path.to_path_buf(),
            directory,
            base_name: base_name.to_string(),
            extension: extension.to_string(),
            file_name,
        })
    }
}

/// Discovery filter settings.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Extensions without the leading dot, compared case-insensitively.
    pub extensions: Vec<String>,
    pub include_hidden: bool,
}

/// Recursively collect documents under `root`.
///
/// Unreadable directories are skipped. Order follows the filesystem.
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Vec<CandidateFile> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_document_extension(entry.path(), &options.extensions))
        .filter(|entry| options.include_hidden || !is_hidden(entry.path()))
        .filter_map(|entry| CandidateFile::from_path(entry.path()))
        .collect()
}

fn has_document_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

#[cfg(windows)]
fn is_hidden(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    std::fs::metadata(path)
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
