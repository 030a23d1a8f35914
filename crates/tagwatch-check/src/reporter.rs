//! Scan reporter module
//!
//! Formats scan reports as human-readable text, JSON, or YAML.

use chrono::{DateTime, Local};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::{settings::Style, Table, Tabled};
use tagwatch_docker::ComposeInventory;
use tagwatch_image::UpdateStatus;

use crate::outcome::CheckOutcome;
use crate::report::{ScanReport, ScanSummary};

const RULE_WIDTH: usize = 80;

/// Output format for scan reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable colored output
    #[default]
    Human,
    /// JSON format for machine consumption
    Json,
    /// YAML format for machine consumption
    Yaml,
}

/// Scan report formatter
pub struct ScanReporter {
    verbose: bool,
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "CONTAINER")]
    container: String,
    #[tabled(rename = "IMAGE")]
    image: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

impl ScanReporter {
    /// Create a new reporter; verbose output adds digests and failure details
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Format the scan report
    pub fn format(&self, report: &ScanReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.format_human(report),
            OutputFormat::Json => self.format_json(report),
            OutputFormat::Yaml => self.format_yaml(report),
        }
    }

    /// Banner with the scan timestamp
    pub fn format_header(&self, scanned_at: &DateTime<Local>) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        format!(
            "{}\n{}\n{}\n{}\n",
            rule.cyan().bold(),
            "Docker Image Update Check".cyan().bold(),
            format!("Scan Date: {}", scanned_at.format("%Y-%m-%d %H:%M:%S")).cyan(),
            rule.cyan().bold()
        )
    }

    /// One line per finished check, printed while a scan is running
    pub fn format_progress(&self, outcome: &CheckOutcome) -> String {
        let verdict = match outcome.status {
            UpdateStatus::UpdateAvailable => "UPDATE AVAILABLE".green().to_string(),
            UpdateStatus::UpToDate => "Up to date".blue().to_string(),
            UpdateStatus::Unverifiable => match &outcome.reason {
                Some(reason) => format!("Could not verify ({})", reason).yellow().to_string(),
                None => "Could not verify".yellow().to_string(),
            },
        };
        format!(
            "Checking {} ({})... {}",
            outcome.container_name.cyan(),
            outcome.image,
            verdict
        )
    }

    /// Format as human-readable output
    fn format_human(&self, report: &ScanReport) -> String {
        let mut output = self.format_header(&report.scanned_at);
        output.push('\n');

        if let Some(compose) = &report.compose {
            output.push_str(&self.format_compose(compose));
            output.push('\n');
        }

        output.push_str(&self.format_results(report));
        output
    }

    /// Outcome table and summary counts
    pub fn format_results(&self, report: &ScanReport) -> String {
        if report.outcomes.is_empty() {
            return format!("{}\n", "No running containers found.".yellow());
        }

        let mut output = self.format_table(&report.outcomes);
        output.push('\n');

        if self.verbose {
            output.push_str(&self.format_details(&report.outcomes));
        }

        output.push_str(&self.format_summary(&report.summary()));
        output
    }

    /// Compose files found and the services each declares
    pub fn format_compose(&self, compose: &ComposeInventory) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}\n",
            "Scanning for compose files in:".bold(),
            compose.base_dir.display()
        ));
        output.push_str(&format!("Found {} compose file(s)\n", compose.files_found));

        for file in &compose.files {
            output.push_str(&format!(
                "  {}: {} service(s)\n",
                file.label().cyan(),
                file.services.len()
            ));
        }
        for warning in &compose.warnings {
            output.push_str(&format!("  {} {}\n", "⚠".yellow(), warning));
        }

        output
    }

    fn format_table(&self, outcomes: &[CheckOutcome]) -> String {
        let rows: Vec<OutcomeRow> = outcomes
            .iter()
            .map(|o| OutcomeRow {
                container: o.container_name.clone(),
                image: o.image.clone(),
                status: status_label(o),
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::sharp());

        let mut output = format!("{}\n", table);
        if outcomes.iter().any(CheckOutcome::is_low_confidence) {
            output.push_str(&format!(
                "{}\n",
                "* remote digest computed from the manifest body (no Docker-Content-Digest header)"
                    .dimmed()
            ));
        }
        output
    }

    fn format_details(&self, outcomes: &[CheckOutcome]) -> String {
        let mut output = format!("{}\n", "Details".bold().underline());

        for outcome in outcomes {
            output.push_str(&format!(
                "  {} ({})\n",
                outcome.container_name.bold(),
                outcome.image_reference
            ));
            output.push_str(&format!(
                "    local:  {}\n",
                digest_or_dash(outcome.local_digest.as_ref())
            ));
            output.push_str(&format!(
                "    remote: {}{}\n",
                digest_or_dash(outcome.remote_digest.as_ref()),
                outcome
                    .digest_source
                    .map(|s| format!(" ({})", s))
                    .unwrap_or_default()
            ));
            if let Some(detail) = &outcome.detail {
                output.push_str(&format!("    {}\n", detail.dimmed()));
            }
        }

        output.push('\n');
        output
    }

    /// Format the summary section
    fn format_summary(&self, summary: &ScanSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", "Summary:".bold()));
        output.push_str(&format!("  Total containers: {}\n", summary.total));

        let updates = if summary.updates_available > 0 {
            summary.updates_available.green().to_string()
        } else {
            summary.updates_available.blue().to_string()
        };
        output.push_str(&format!("  Updates available: {}\n", updates));
        output.push_str(&format!("  Up to date: {}\n", summary.up_to_date.blue()));
        output.push_str(&format!(
            "  Could not check: {}\n",
            summary.unverifiable.yellow()
        ));

        output
    }

    /// Format as JSON
    fn format_json(&self, report: &ScanReport) -> String {
        let json_report = JsonScanReport::from(report);
        serde_json::to_string_pretty(&json_report)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {}\"}}", e))
    }

    /// Format as YAML
    fn format_yaml(&self, report: &ScanReport) -> String {
        let json_report = JsonScanReport::from(report);
        serde_yaml_ng::to_string(&json_report)
            .unwrap_or_else(|e| format!("error: \"Failed to serialize: {}\"", e))
    }
}

impl Default for ScanReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

fn status_label(outcome: &CheckOutcome) -> String {
    let mut label = match outcome.status {
        UpdateStatus::UpdateAvailable => format!("⬆ {}", outcome.status),
        UpdateStatus::UpToDate => format!("✓ {}", outcome.status),
        UpdateStatus::Unverifiable => match &outcome.reason {
            Some(reason) => format!("⚠ {} ({})", outcome.status, reason),
            None => format!("⚠ {}", outcome.status),
        },
    };
    if outcome.is_low_confidence() {
        label.push_str(" *");
    }
    label
}

fn digest_or_dash(digest: Option<&tagwatch_image::DigestValue>) -> String {
    digest
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Serializable form of a scan report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonScanReport<'a> {
    scanned_at: String,
    summary: ScanSummary,
    has_updates: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    compose: Option<JsonCompose<'a>>,
    outcomes: &'a [CheckOutcome],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonCompose<'a> {
    base_dir: String,
    files_found: usize,
    files: Vec<JsonComposeFile<'a>>,
    warnings: &'a [String],
}

#[derive(Debug, Serialize)]
struct JsonComposeFile<'a> {
    path: String,
    services: &'a BTreeMap<String, String>,
}

impl<'a> From<&'a ScanReport> for JsonScanReport<'a> {
    fn from(report: &'a ScanReport) -> Self {
        Self {
            scanned_at: report.scanned_at.to_rfc3339(),
            summary: report.summary(),
            has_updates: report.has_updates(),
            compose: report.compose.as_ref().map(|c| JsonCompose {
                base_dir: c.base_dir.display().to_string(),
                files_found: c.files_found,
                files: c
                    .files
                    .iter()
                    .map(|f| JsonComposeFile {
                        path: f.path.display().to_string(),
                        services: &f.services,
                    })
                    .collect(),
                warnings: &c.warnings,
            }),
            outcomes: &report.outcomes,
        }
    }
}
