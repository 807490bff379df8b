use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5173;

/// Where the gallery lives on disk and how the API server binds.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Defaults overridden by MOCKDECK_ROOT / MOCKDECK_HOST / MOCKDECK_PORT.
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            root: env::var("MOCKDECK_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.root),
            host: env::var("MOCKDECK_HOST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.host),
            port: env::var("MOCKDECK_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Directory holding the registry and the implementation files.
    pub fn versions_root(&self) -> PathBuf {
        self.root.join("versions")
    }

    /// The registry source file.
    pub fn registry_path(&self) -> PathBuf {
        self.versions_root().join("index.ts")
    }

    /// The notes document.
    pub fn notes_path(&self) -> PathBuf {
        self.versions_root().join("notes.json")
    }
}
