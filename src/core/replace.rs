//! Directory-level replace run: discover, then commit file by file.

use std::path::Path;

use crate::batch::{BatchCommitter, BatchOptions};
use crate::defaults::Defaults;
use crate::discovery::{discover, DiscoveryOptions};
use crate::document::{DocumentOpener, WordOpener};
use crate::error::{Error, Result};
use crate::output::BatchResult;
use crate::substitution::SubstitutionSpec;

/// Replace tokens in every document under `root` using the Word package backend.
pub fn replace_in_directory(
    root: &Path,
    spec: &SubstitutionSpec,
    defaults: &Defaults,
    dry_run: bool,
) -> Result<BatchResult> {
    replace_with_opener(root, spec, defaults, dry_run, &WordOpener)
}

pub fn replace_with_opener(
    root: &Path,
    spec: &SubstitutionSpec,
    defaults: &Defaults,
    dry_run: bool,
    opener: &dyn DocumentOpener,
) -> Result<BatchResult> {
    if !root.is_dir() {
        return Err(Error::validation_invalid_argument(
            "path",
            "Path is not a directory",
            Some(root.display().to_string()),
            None,
        ));
    }
    defaults.validate()?;

    log_status!("replace", "Replacing {}月 with {}月", spec.old_month, spec.new_month);
    if let (Some(old), Some(new)) = (spec.old_year, spec.new_year) {
        log_status!("replace", "Replacing {} with {}", old, new);
    }

    let files = discover(
        root,
        &DiscoveryOptions {
            extensions: defaults.document_extensions.clone(),
            include_hidden: defaults.include_hidden,
        },
    );

    if files.is_empty() {
        log_status!("replace", "No files found under {}", root.display());
        return Ok(BatchResult::new(dry_run));
    }
    log_status!("replace", "Found {} file(s)", files.len());

    let options = BatchOptions {
        temp_suffix: defaults.temp_suffix.clone(),
        temp_extension: defaults.temp_extension.clone(),
        dry_run,
    };
    let result = BatchCommitter::new(spec, opener, options).run(&files);

    log_status!(
        "replace",
        "Done: {} committed, {} unchanged, {} failed",
        result.committed(),
        result.unchanged,
        result.errors
    );

    Ok(result)
}
