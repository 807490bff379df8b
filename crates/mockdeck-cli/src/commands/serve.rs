use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mockdeck_core::config::Settings;

#[derive(Args)]
pub struct ServeArgs {
    /// Gallery root (defaults to MOCKDECK_ROOT or the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Bind address (defaults to MOCKDECK_HOST or 127.0.0.1)
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Bind port (defaults to MOCKDECK_PORT or 5173)
    #[arg(long)]
    pub port: Option<u16>,
}

pub fn run(args: &ServeArgs) -> Result<()> {
    let mut settings = Settings::from_env();
    if let Some(root) = &args.root {
        settings.root = root.clone();
    }
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }

    if !settings.registry_path().exists() {
        anyhow::bail!(
            "No version registry at {}. Run from a gallery root or pass --root.",
            settings.registry_path().display()
        );
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
    rt.block_on(mockdeck_server::serve(settings))
        .context("Server error")
}
