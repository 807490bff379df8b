use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mockdeck_core::config::Settings;
use mockdeck_core::registry::Registry;

use crate::output::{format, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    /// Gallery root (defaults to MOCKDECK_ROOT or the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

pub fn run(args: &ListArgs, fmt: OutputFormat) -> Result<()> {
    let mut settings = Settings::from_env();
    if let Some(root) = &args.root {
        settings.root = root.clone();
    }
    if !settings.registry_path().exists() {
        anyhow::bail!(
            "No version registry at {}",
            settings.registry_path().display()
        );
    }

    let registry = Registry::from_settings(&settings);
    let records = registry
        .list()
        .context("Failed to read the version registry")?;
    println!("{}", format::format_version_list(&records, fmt));
    Ok(())
}
