//! Replace-and-commit pipeline.
//!
//! Each file is handled on its own staged copy:
//! 1. Copy the original to `<stem>_temp.docx` in the same directory
//! 2. Mutate the copy through the document model
//! 3. Compute the new file name from the original name
//! 4. Commit (delete original, move copy to the new name) when content or name
//!    changed, otherwise discard the copy
//!
//! A failure in any step is recorded for that file only; the staged copy is
//! removed and the batch moves on. The one exception is a failed final move:
//! the original is already deleted, so the copy stays and the error names it.

use std::path::{Path, PathBuf};

use crate::discovery::CandidateFile;
use crate::document::{mutate_document, DocumentOpener};
use crate::error::{Error, Result};
use crate::file_name::transform_name;
use crate::output::{BatchResult, ItemError};
use crate::substitution::SubstitutionSpec;
use crate::utils::io;

/// Staging settings for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Appended to the original stem to form the temp name.
    pub temp_suffix: String,
    /// Extension of the temp copy, with leading dot.
    pub temp_extension: String,
    /// Run every step but always discard the staged copy.
    pub dry_run: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            temp_suffix: "_temp".to_string(),
            temp_extension: ".docx".to_string(),
            dry_run: false,
        }
    }
}

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Committed {
        new_name: String,
        renamed: bool,
        content_changed: bool,
        nodes_changed: usize,
    },
    Discarded,
}

/// Staged copy of a file. Deleted on drop unless promoted.
struct TempArtifact {
    path: PathBuf,
    armed: bool,
}

impl TempArtifact {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Move the staged copy to `target`.
    ///
    /// Called after the original is gone, so the copy is kept on failure: it is
    /// the only remaining version of the file.
    fn promote(mut self, target: &Path) -> Result<()> {
        self.armed = false;
        io::move_file(
            &self.path,
            target,
            &format!("move {} to {}", self.path.display(), target.display()),
        )
        .map_err(|e| e.with_hint(format!("The updated copy was kept at {}", self.path.display())))
    }

    fn discard(mut self) -> Result<()> {
        io::remove_file_if_exists(&self.path, &format!("delete {}", self.path.display()))?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Runs the per-file protocol over a list of candidates.
pub struct BatchCommitter<'a> {
    spec: &'a SubstitutionSpec,
    opener: &'a dyn DocumentOpener,
    options: BatchOptions,
}

impl<'a> BatchCommitter<'a> {
    pub fn new(spec: &'a SubstitutionSpec, opener: &'a dyn DocumentOpener, options: BatchOptions) -> Self {
        Self { spec, opener, options }
    }

    /// Temp path for `file`: same directory, `<stem><suffix><temp extension>`.
    pub fn temp_path_for(&self, file: &CandidateFile) -> PathBuf {
        file.directory.join(format!(
            "{}{}{}",
            file.base_name, self.options.temp_suffix, self.options.temp_extension
        ))
    }

    /// Process every file in order. Failures never abort the batch.
    pub fn run(&self, files: &[CandidateFile]) -> BatchResult {
        let mut result = BatchResult::new(self.options.dry_run);
        let total = files.len();

        for (idx, file) in files.iter().enumerate() {
            log_status!("replace", "[{}/{}] {}", idx + 1, total, file.file_name);
            let path = file.full_path.display().to_string();

            match self.process_file(file) {
                Ok(FileOutcome::Committed {
                    new_name,
                    renamed,
                    nodes_changed,
                    ..
                }) => {
                    let verb = if self.options.dry_run { "Would update" } else { "Updated" };
                    log_status!("replace", "{}: {} -> {}", verb, file.file_name, new_name);
                    if renamed {
                        result.record_renamed(path, new_name, nodes_changed);
                    } else {
                        result.record_rewritten(path, nodes_changed);
                    }
                }
                Ok(FileOutcome::Discarded) => result.record_unchanged(path),
                Err(err) => {
                    let item = ItemError::from(&err);
                    log_status!("replace", "Failed to process {}: {}", file.file_name, item);
                    result.record_error(path, item);
                }
            }
        }

        result
    }

    /// Run the full protocol for one file.
    pub fn process_file(&self, file: &CandidateFile) -> Result<FileOutcome> {
        let temp = TempArtifact::new(self.temp_path_for(file));
        io::copy_file(
            &file.full_path,
            temp.path(),
            &format!("copy {} to {}", file.full_path.display(), temp.path().display()),
        )?;

        let mutation = {
            let mut doc = self.opener.open(temp.path())?;
            let mutation = mutate_document(doc.as_mut(), self.spec);
            if mutation.content_changed && !self.options.dry_run {
                doc.save()?;
            }
            mutation
        };

        let new_name = transform_name(&file.file_name, self.spec);
        let renamed = new_name != file.file_name;

        if !mutation.content_changed && !renamed {
            temp.discard()?;
            return Ok(FileOutcome::Discarded);
        }

        let target = file.directory.join(&new_name);
        if renamed && target.exists() {
            return Err(Error::file_collision(&file.file_name, &new_name));
        }

        if self.options.dry_run {
            temp.discard()?;
        } else {
            commit(&file.full_path, temp, &target)?;
        }

        Ok(FileOutcome::Committed {
            new_name,
            renamed,
            content_changed: mutation.content_changed,
            nodes_changed: mutation.nodes_changed,
        })
    }
}

/// Replace `original` with the staged copy, stored as `target`.
fn commit(original: &Path, temp: TempArtifact, target: &Path) -> Result<()> {
    io::remove_file_if_exists(original, &format!("delete {}", original.display()))?;
    temp.promote(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContentTree, Document, TextNode};
    use std::cell::RefCell;
    use std::fs;

    /// Fake document whose body is a flat list of strings read from the file.
    struct LineDocument {
        path: PathBuf,
        lines: Vec<LineNode>,
    }

    struct LineNode(String);

    impl TextNode for LineNode {
        fn text(&self) -> &str {
            &self.0
        }

        fn set_text(&mut self, value: String) {
            self.0 = value;
        }
    }

    impl ContentTree for Vec<LineNode> {
        fn visit_text_nodes(&mut self, visit: &mut dyn FnMut(&mut dyn TextNode)) {
            for node in self.iter_mut() {
                visit(node);
            }
        }
    }

    impl Document for LineDocument {
        fn main_content(&mut self) -> &mut dyn ContentTree {
            &mut self.lines
        }

        fn header_parts(&mut self) -> Vec<&mut dyn ContentTree> {
            Vec::new()
        }

        fn footer_parts(&mut self) -> Vec<&mut dyn ContentTree> {
            Vec::new()
        }

        fn save(&mut self) -> Result<bool> {
            let body: Vec<&str> = self.lines.iter().map(|l| l.0.as_str()).collect();
            fs::write(&self.path, body.join("\n")).map_err(|e| Error::internal_io(e.to_string(), None))?;
            Ok(true)
        }
    }

    /// Opens plain-text files as line documents; files starting with `CORRUPT` fail.
    #[derive(Default)]
    struct LineOpener {
        opened: RefCell<Vec<PathBuf>>,
    }

    impl DocumentOpener for LineOpener {
        fn open(&self, path: &Path) -> Result<Box<dyn Document>> {
            self.opened.borrow_mut().push(path.to_path_buf());
            let content = fs::read_to_string(path).map_err(|e| Error::internal_io(e.to_string(), None))?;
            if content.starts_with("CORRUPT") {
                return Err(Error::document_invalid_package(path.display().to_string(), "bad archive"));
            }
            Ok(Box::new(LineDocument {
                path: path.to_path_buf(),
                lines: content.lines().map(|l| LineNode(l.to_string())).collect(),
            }))
        }
    }

    fn candidate(dir: &Path, name: &str, content: &str) -> CandidateFile {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        CandidateFile::from_path(&path).unwrap()
    }

    fn march_to_april() -> SubstitutionSpec {
        SubstitutionSpec::new(3, 4, None).unwrap()
    }

    #[test]
    fn temp_path_uses_stem_suffix_and_canonical_extension() {
        let spec = march_to_april();
        let opener = LineOpener::default();
        let committer = BatchCommitter::new(&spec, &opener, BatchOptions::default());
        let file = CandidateFile::from_path(Path::new("/docs/plan.docm")).unwrap();

        assert_eq!(committer.temp_path_for(&file), PathBuf::from("/docs/plan_temp.docx"));
    }

    #[test]
    fn content_and_name_change_commits_under_new_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = candidate(dir.path(), "3月报告.docx", "3月计划");
        let spec = march_to_april();
        let opener = LineOpener::default();
        let committer = BatchCommitter::new(&spec, &opener, BatchOptions::default());

        let outcome = committer.process_file(&file).unwrap();

        assert_eq!(
            outcome,
            FileOutcome::Committed {
                new_name: "4月报告.docx".to_string(),
                renamed: true,
                content_changed: true,
                nodes_changed: 1,
            }
        );
        assert!(!dir.path().join("3月报告.docx").exists());
        assert!(!dir.path().join("3月报告_temp.docx").exists());
        assert_eq!(fs::read_to_string(dir.path().join("4月报告.docx")).unwrap(), "4月计划");
    }

    #[test]
    fn name_only_change_still_commits() {
        let dir = tempfile::tempdir().unwrap();
        let file = candidate(dir.path(), "3月.docx", "nothing here");
        let spec = march_to_april();
        let opener = LineOpener::default();
        let committer = BatchCommitter::new(&spec, &opener, BatchOptions::default());

        let outcome = committer.process_file(&file).unwrap();

        assert!(matches!(outcome, FileOutcome::Committed { renamed: true, content_changed: false, .. }));
        assert_eq!(fs::read_to_string(dir.path().join("4月.docx")).unwrap(), "nothing here");
        assert!(!dir.path().join("3月.docx").exists());
    }

    #[test]
    fn content_only_change_rewrites_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = candidate(dir.path(), "report.docx", "2023年 3月");
        let spec = SubstitutionSpec::new(3, 4, Some((2023, 2024))).unwrap();
        let opener = LineOpener::default();
        let committer = BatchCommitter::new(&spec, &opener, BatchOptions::default());

        let outcome = committer.process_file(&file).unwrap();

        assert!(matches!(outcome, FileOutcome::Committed { renamed: false, content_changed: true, .. }));
        assert_eq!(fs::read_to_string(dir.path().join("report.docx")).unwrap(), "2024年 4月");
        assert!(!dir.path().join("report_temp.docx").exists());
    }

    #[test]
    fn no_change_discards_temp_and_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let file = candidate(dir.path(), "memo.docx", "5月");
        let spec = march_to_april();
        let opener = LineOpener::default();
        let committer = BatchCommitter::new(&spec, &opener, BatchOptions::default());

        assert_eq!(committer.process_file(&file).unwrap(), FileOutcome::Discarded);
        assert_eq!(fs::read_to_string(dir.path().join("memo.docx")).unwrap(), "5月");
        assert!(!dir.path().join("memo_temp.docx").exists());
    }

    #[test]
    fn stale_temp_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("memo_temp.docx"), "stale 3月").unwrap();
        let file = candidate(dir.path(), "memo.docx", "nothing");
        let spec = march_to_april();
        let opener = LineOpener::default();
        let committer = BatchCommitter::new(&spec, &opener, BatchOptions::default());

        assert_eq!(committer.process_file(&file).unwrap(), FileOutcome::Discarded);
        assert!(!dir.path().join("memo_temp.docx").exists());
        assert_eq!(opener.opened.borrow()[0], dir.path().join("memo_temp.docx"));
    }

    #[test]
    fn open_failure_keeps_original_and_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let file = candidate(dir.path(), "3月坏.docx", "CORRUPT 3月");
        let spec = march_to_april();
        let opener = LineOpener::default();
        let committer = BatchCommitter::new(&spec, &opener, BatchOptions::default());

        let err = committer.process_file(&file).unwrap_err();

        assert_eq!(err.code.as_str(), "document.invalid_package");
        assert_eq!(fs::read_to_string(dir.path().join("3月坏.docx")).unwrap(), "CORRUPT 3月");
        assert!(!dir.path().join("3月坏_temp.docx").exists());
        assert!(!dir.path().join("4月坏.docx").exists());
    }

    #[test]
    fn rename_collision_fails_before_deleting_original() {
        let dir = tempfile::tempdir().unwrap();
        let file = candidate(dir.path(), "3月.docx", "3月");
        fs::write(dir.path().join("4月.docx"), "existing").unwrap();
        let spec = march_to_april();
        let opener = LineOpener::default();
        let committer = BatchCommitter::new(&spec, &opener, BatchOptions::default());

        let err = committer.process_file(&file).unwrap_err();

        assert_eq!(err.code.as_str(), "file.collision");
        assert_eq!(fs::read_to_string(dir.path().join("3月.docx")).unwrap(), "3月");
        assert_eq!(fs::read_to_string(dir.path().join("4月.docx")).unwrap(), "existing");
        assert!(!dir.path().join("3月_temp.docx").exists());
    }

    #[test]
    fn failed_move_after_delete_keeps_staged_copy() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("3月.docx");
        let staged = dir.path().join("3月_temp.docx");
        fs::write(&original, "3月").unwrap();
        fs::write(&staged, "4月").unwrap();

        let err = commit(
            &original,
            TempArtifact::new(staged.clone()),
            &dir.path().join("missing").join("4月.docx"),
        )
        .unwrap_err();

        assert_eq!(err.code.as_str(), "internal.io_error");
        assert!(!original.exists());
        assert_eq!(fs::read_to_string(&staged).unwrap(), "4月");
        assert!(err.hints[0].message.contains(&staged.display().to_string()));
    }

    #[test]
    fn commit_moves_staged_copy_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("report.docx");
        let staged = dir.path().join("report_temp.docx");
        fs::write(&original, "old").unwrap();
        fs::write(&staged, "new").unwrap();

        commit(&original, TempArtifact::new(staged.clone()), &original).unwrap();

        assert_eq!(fs::read_to_string(&original).unwrap(), "new");
        assert!(!staged.exists());
    }

    /// The new name outgrows the file system's name limit, so only the final
    /// move fails; the staged copy has a shorter name and survives.
    #[cfg(unix)]
    #[test]
    fn run_reports_where_staged_copy_was_kept() {
        let dir = tempfile::tempdir().unwrap();
        let stem = format!("3月{}", "a".repeat(246));
        let file = candidate(dir.path(), &format!("{}.docx", stem), "3月");
        assert_eq!(file.file_name.len(), 255);

        let spec = SubstitutionSpec::new(3, 12, None).unwrap();
        let opener = LineOpener::default();
        let options = BatchOptions {
            temp_suffix: "_".to_string(),
            temp_extension: ".x".to_string(),
            dry_run: false,
        };
        let committer = BatchCommitter::new(&spec, &opener, options);
        let staged = committer.temp_path_for(&file);

        let result = committer.run(std::slice::from_ref(&file));

        assert_eq!(result.errors, 1);
        let error = result.items[0].error.as_ref().unwrap();
        assert_eq!(error.code, "internal.io_error");
        assert!(error.hints[0].contains(&staged.display().to_string()));
        assert!(!file.full_path.exists());
        assert_eq!(fs::read_to_string(&staged).unwrap(), "12月");
    }

    #[test]
    fn dry_run_reports_without_touching_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = candidate(dir.path(), "3月.docx", "3月");
        let spec = march_to_april();
        let opener = LineOpener::default();
        let options = BatchOptions {
            dry_run: true,
            ..BatchOptions::default()
        };
        let committer = BatchCommitter::new(&spec, &opener, options);

        let result = committer.run(std::slice::from_ref(&file));

        assert!(result.dry_run);
        assert_eq!(result.renamed, 1);
        assert_eq!(fs::read_to_string(dir.path().join("3月.docx")).unwrap(), "3月");
        assert!(!dir.path().join("4月.docx").exists());
        assert!(!dir.path().join("3月_temp.docx").exists());
    }

    #[test]
    fn run_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            candidate(dir.path(), "broken.docx", "CORRUPT"),
            candidate(dir.path(), "3月.docx", "3月"),
            candidate(dir.path(), "plain.docx", "plain"),
        ];
        let spec = march_to_april();
        let opener = LineOpener::default();
        let committer = BatchCommitter::new(&spec, &opener, BatchOptions::default());

        let result = committer.run(&files);

        assert_eq!(result.total, 3);
        assert_eq!(result.errors, 1);
        assert_eq!(result.renamed, 1);
        assert_eq!(result.unchanged, 1);
        assert!(result.items[0].error.is_some());
        assert!(dir.path().join("broken.docx").exists());
        assert!(dir.path().join("4月.docx").exists());
    }
}
