pub mod note;
pub mod version;

pub use note::NoteEntry;
pub use version::{validate_id, VariantType, VersionRecord};
