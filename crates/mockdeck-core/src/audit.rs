//! Cross-checks the registry against the implementation files on disk.
//!
//! Records are created out-of-band by adding a file and an entry by hand,
//! so the two halves drift: a record can point at a file that was never
//! written, and a file can survive its record. `audit` finds both.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::CoreError;
use crate::registry::{companion, Registry};

/// What the cross-check found. Empty on a healthy gallery.
#[derive(Debug, Default, Serialize)]
pub struct AuditReport {
    /// Ids whose companion file is missing or unresolvable.
    pub missing_companions: Vec<String>,
    /// Implementation files no record imports.
    pub orphan_files: Vec<PathBuf>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.missing_companions.is_empty() && self.orphan_files.is_empty()
    }
}

pub fn audit(registry: &Registry) -> Result<AuditReport, CoreError> {
    let mut report = AuditReport::default();
    let mut referenced = BTreeSet::new();

    for record in registry.list()? {
        match companion::resolve(registry.root(), &record.import_path) {
            Ok(path) if path.exists() => {
                referenced.insert(path);
            }
            Ok(path) => {
                referenced.insert(path);
                report.missing_companions.push(record.id);
            }
            Err(_) => report.missing_companions.push(record.id),
        }
    }

    let src_dir = registry.root().join("src");
    for entry in WalkDir::new(&src_dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let is_source = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "ts" || ext == "tsx");
        if is_source && !referenced.contains(&path) {
            report.orphan_files.push(path);
        }
    }
    Ok(report)
}
