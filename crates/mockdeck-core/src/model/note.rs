use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reviewer's annotation for one version, keyed by version id in the
/// notes document. Lives independently of the registry: a note may
/// outlive the record it describes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(
        rename = "approvedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub approved_at: Option<DateTime<Utc>>,
}
