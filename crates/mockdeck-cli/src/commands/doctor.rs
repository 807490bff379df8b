use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mockdeck_core::audit;
use mockdeck_core::config::Settings;
use mockdeck_core::registry::Registry;

use crate::output::{format, OutputFormat};

#[derive(Args)]
pub struct DoctorArgs {
    /// Gallery root (defaults to MOCKDECK_ROOT or the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

pub fn run(args: &DoctorArgs, fmt: OutputFormat) -> Result<()> {
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
    let report = audit::audit(&registry).context("Failed to audit the gallery")?;
    println!("{}", format::format_audit(&report, fmt));

    if !report.is_clean() {
        anyhow::bail!("Gallery is not clean");
    }
    Ok(())
}
