use mockdeck_core::audit::AuditReport;
use mockdeck_core::model::VersionRecord;

use super::OutputFormat;

pub fn format_version_list(records: &[VersionRecord], fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => serde_json::to_string_pretty(records).unwrap_or_default(),
        OutputFormat::Text => format_version_list_text(records),
    }
}

fn format_version_list_text(records: &[VersionRecord]) -> String {
    if records.is_empty() {
        return "No versions found.".to_string();
    }
    records
        .iter()
        .map(|r| {
            format!(
                "\u{25c6} {} {} [{}] {}",
                r.id, r.title, r.variant, r.import_path
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_audit(report: &AuditReport, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Text => format_audit_text(report),
    }
}

fn format_audit_text(report: &AuditReport) -> String {
    if report.is_clean() {
        return "Gallery is clean.".to_string();
    }
    let mut lines = Vec::new();
    for id in &report.missing_companions {
        lines.push(format!("missing companion: {id}"));
    }
    for path in &report.orphan_files {
        lines.push(format!("orphan file: {}", path.display()));
    }
    lines.join("\n")
}
