//! Whole-file JSON store mapping a version id to its review note.
//!
//! Replace-only semantics: callers send the full desired document and the
//! store overwrites what was there. No merge, no retry.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read as _, Write as _};
use std::path::PathBuf;

use crate::error::CoreError;
use crate::model::NoteEntry;

pub struct NotesStore {
    path: PathBuf,
}

impl NotesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The full persisted mapping. A missing file is an empty map, never
    /// a partial one.
    pub fn load(&self) -> Result<BTreeMap<String, NoteEntry>, CoreError> {
        let file = match fs::OpenOptions::new().read(true).open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        fs2::FileExt::lock_shared(&file).map_err(CoreError::Io)?;
        let mut data = String::new();
        let read = (&file).read_to_string(&mut data);
        let _ = fs2::FileExt::unlock(&file);
        read?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Overwrite the whole document with an exclusive file lock held for
    /// the write.
    pub fn replace(&self, notes: &BTreeMap<String, NoteEntry>) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(notes)?;
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        fs2::FileExt::lock_exclusive(&file).map_err(CoreError::Io)?;
        let written = (&file).write_all(json.as_bytes());
        let _ = fs2::FileExt::unlock(&file);
        written?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = NotesStore::new(tmp.path().join("notes.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_replace_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = NotesStore::new(tmp.path().join("notes.json"));

        let mut notes = BTreeMap::new();
        notes.insert(
            "v1".to_string(),
            NoteEntry {
                notes: "tighten the hero copy".into(),
                source: Some("review".into()),
                approved_at: None,
            },
        );
        store.replace(&notes).unwrap();
        assert_eq!(store.load().unwrap(), notes);

        // full-replace semantics: the old document is gone entirely
        let empty = BTreeMap::new();
        store.replace(&empty).unwrap();
        assert_eq!(store.load().unwrap(), empty);
    }

    #[test]
    fn test_malformed_document_is_a_json_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.json");
        fs::write(&path, "{not json").unwrap();
        let store = NotesStore::new(path);
        assert!(matches!(store.load(), Err(CoreError::Json(_))));
    }
}
