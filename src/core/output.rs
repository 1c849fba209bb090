//! Public output types for monthshift command responses.
//!
//! These are part of the library API: the batch committer produces them and
//! the CLI serializes them into its JSON envelope.

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// Batch Operations
// ============================================================================

/// Final state of one file after a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Committed under a new name.
    Renamed,
    /// Committed under the same name (content changed only).
    Rewritten,
    /// Discarded; original untouched.
    Unchanged,
    /// Failed; original untouched unless the commit had started.
    Error,
}

/// Summary of a batch replace run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub total: u32,
    pub renamed: u32,
    pub rewritten: u32,
    pub unchanged: u32,
    pub errors: u32,
    pub dry_run: bool,
    pub items: Vec<BatchResultItem>,
}

/// Individual file result within a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResultItem {
    pub path: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_changed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
}

/// Why a single file failed. Same code and hints as a top-level error, so
/// recovery advice (e.g. where a staged copy was kept) reaches the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl From<&Error> for ItemError {
    fn from(err: &Error) -> Self {
        ItemError {
            code: err.code.as_str().to_string(),
            message: err.message.clone(),
            hints: err.hints.iter().map(|h| h.message.clone()).collect(),
        }
    }
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        for hint in &self.hints {
            write!(f, " ({})", hint)?;
        }
        Ok(())
    }
}

impl BatchResult {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Number of files that were (or, in a dry run, would be) committed.
    pub fn committed(&self) -> u32 {
        self.renamed + self.rewritten
    }

    pub fn record_renamed(&mut self, path: String, new_name: String, nodes_changed: usize) {
        self.total += 1;
        self.renamed += 1;
        self.items.push(BatchResultItem {
            path,
            status: FileStatus::Renamed,
            new_name: Some(new_name),
            nodes_changed: Some(nodes_changed),
            error: None,
        });
    }

    pub fn record_rewritten(&mut self, path: String, nodes_changed: usize) {
        self.total += 1;
        self.rewritten += 1;
        self.items.push(BatchResultItem {
            path,
            status: FileStatus::Rewritten,
            new_name: None,
            nodes_changed: Some(nodes_changed),
            error: None,
        });
    }

    pub fn record_unchanged(&mut self, path: String) {
        self.total += 1;
        self.unchanged += 1;
        self.items.push(BatchResultItem {
            path,
            status: FileStatus::Unchanged,
            new_name: None,
            nodes_changed: None,
            error: None,
        });
    }

    pub fn record_error(&mut self, path: String, error: ItemError) {
        self.total += 1;
        self.errors += 1;
        self.items.push(BatchResultItem {
            path,
            status: FileStatus::Error,
            new_name: None,
            nodes_changed: None,
            error: Some(error),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_items() {
        let mut result = BatchResult::new(false);
        result.record_renamed("a/3月.docx".into(), "4月.docx".into(), 2);
        result.record_rewritten("a/report.docx".into(), 1);
        result.record_unchanged("a/other.docx".into());
        result.record_error(
            "a/broken.docx".into(),
            ItemError::from(&Error::internal_io("denied", None)),
        );

        assert_eq!(result.total, 4);
        assert_eq!(result.committed(), 2);
        assert_eq!(result.errors, 1);
        assert_eq!(result.items.len(), 4);
        assert_eq!(result.items[3].status, FileStatus::Error);
    }

    #[test]
    fn serializes_camel_case_and_skips_empty_fields() {
        let mut result = BatchResult::new(true);
        result.record_unchanged("x.docx".into());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["dryRun"], true);
        assert_eq!(json["items"][0]["status"], "unchanged");
        assert!(json["items"][0].get("newName").is_none());
        assert!(json["items"][0].get("error").is_none());
    }

    #[test]
    fn item_error_keeps_code_and_hints() {
        let err = Error::file_collision("3月.docx", "4月.docx");
        let item = ItemError::from(&err);

        assert_eq!(item.code, "file.collision");
        assert_eq!(item.hints.len(), 1);
        assert!(item.to_string().contains("Move or rename the existing file"));

        let mut result = BatchResult::new(false);
        result.record_error("3月.docx".into(), item);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["items"][0]["error"]["code"], "file.collision");
        assert!(json["items"][0]["error"]["hints"][0].is_string());
    }
}
