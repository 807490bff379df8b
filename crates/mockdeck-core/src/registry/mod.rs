//! The version registry: a source file treated as a mutable database.
//!
//! Every mutator is one read-locate-write transaction. Validation runs
//! before the write begins; the whole read-modify-write cycle holds an
//! advisory lock so concurrent mutators cannot interleave and revert each
//! other.

pub mod companion;
pub mod scanner;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub use companion::FileRemoval;

use crate::config::Settings;
use crate::error::CoreError;
use crate::model::{validate_id, VariantType, VersionRecord};

/// Outcome of a delete. The registry rewrite is authoritative; the
/// companion file phase is best-effort and reported separately so callers
/// can decide what a partial success means to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub registry_updated: bool,
    pub file_removed: FileRemoval,
}

pub struct Registry {
    path: PathBuf,
    root: PathBuf,
}

impl Registry {
    pub fn new(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: root.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.registry_path(), settings.versions_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // The lock lives on a sidecar file so the registry itself can be
    // swapped with a rename while the lock is held.
    fn lock_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!("{name}.lock"))
    }

    fn acquire(&self, exclusive: bool) -> Result<fs::File, CoreError> {
        let lock = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(self.lock_path())?;
        if exclusive {
            fs2::FileExt::lock_exclusive(&lock).map_err(CoreError::Io)?;
        } else {
            fs2::FileExt::lock_shared(&lock).map_err(CoreError::Io)?;
        }
        Ok(lock)
    }

    fn write_atomic(&self, text: &str) -> Result<(), CoreError> {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = self.path.with_file_name(format!("{name}.tmp"));
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// One read-modify-write cycle under the registry lock. The closure
    /// returns the rewritten buffer (or `None` to skip the write) plus a
    /// value to hand back; an unchanged buffer is not rewritten, so
    /// no-op mutations leave the file byte-identical.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&str) -> Result<(Option<String>, T), CoreError>,
    ) -> Result<T, CoreError> {
        let lock = self.acquire(true)?;
        let outcome = (|| {
            let text = fs::read_to_string(&self.path)?;
            let (rewritten, value) = op(&text)?;
            if let Some(updated) = rewritten {
                if updated != text {
                    self.write_atomic(&updated)?;
                }
            }
            Ok(value)
        })();
        let _ = fs2::FileExt::unlock(&lock);
        outcome
    }

    /// All records in registry order, joined with their import paths.
    pub fn list(&self) -> Result<Vec<VersionRecord>, CoreError> {
        let lock = self.acquire(false)?;
        let text = fs::read_to_string(&self.path);
        let _ = fs2::FileExt::unlock(&lock);
        let text = text?;

        let mut records = Vec::new();
        for raw in scanner::parse_all(&text)? {
            let variant: VariantType = raw.variant.parse()?;
            let import_path = scanner::import_line(&text, &raw.component)
                .map(|(_, path)| path)
                .unwrap_or_default();
            if import_path.is_empty() {
                debug!(id = %raw.id, "record has no matching import line");
            }
            records.push(VersionRecord {
                id: raw.id,
                title: raw.title,
                variant,
                component: raw.component,
                import_path,
            });
        }
        Ok(records)
    }

    /// Change a record's classification. Any current-to-any transition is
    /// legal; reclassifying to the current value is a no-op success.
    pub fn reclassify(&self, id: &str, variant: VariantType) -> Result<(), CoreError> {
        validate_id(id)?;
        self.mutate(|text| {
            let record = scanner::locate(text, id)?;
            let updated = scanner::replace(text, &record.variant_span, variant.as_str());
            Ok((Some(updated), ()))
        })
    }

    /// Change a record's display title. The title is trimmed and must be
    /// non-empty; quotes and control characters are escaped so the
    /// rewritten literal stays valid.
    pub fn rename(&self, id: &str, title: &str) -> Result<(), CoreError> {
        validate_id(id)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::EmptyTitle);
        }
        self.mutate(|text| {
            let record = scanner::locate(text, id)?;
            let updated = scanner::replace(text, &record.title_span, &scanner::escape(title));
            Ok((Some(updated), ()))
        })
    }

    /// Remove a record, its import line, and its implementation file.
    /// The registry edit and the file removal are two phases; the second
    /// never rolls back the first.
    pub fn delete(&self, id: &str) -> Result<DeleteOutcome, CoreError> {
        validate_id(id)?;
        let import_path = self.mutate(|text| {
            let record = scanner::locate(text, id)?;
            let (_, path) = scanner::import_line(text, &record.component)
                .ok_or_else(|| CoreError::ImportNotFound { id: id.to_string() })?;
            // imports precede the list, so dropping the block first
            // leaves the import line's offsets valid
            let without_record = scanner::remove_record(text, &record)?;
            let (line, _) = scanner::import_line(&without_record, &record.component)
                .ok_or_else(|| CoreError::ImportNotFound { id: id.to_string() })?;
            let updated = format!(
                "{}{}",
                &without_record[..line.start],
                &without_record[line.end..]
            );
            Ok((Some(updated), path))
        })?;

        let file_removed = companion::remove(&self.root, &import_path);
        if file_removed == FileRemoval::Failed {
            warn!(id, path = %import_path, "registry updated but companion file removal failed");
        }
        Ok(DeleteOutcome {
            registry_updated: true,
            file_removed,
        })
    }
}
