//! Report export. Filters a snapshot of threats and logs by time range and
//! status, then renders CSV, Markdown or JSON to a file. Rendering is pure
//! string building; only the final write touches the filesystem.

use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::core::time::format_timestamp;
use crate::core::types::{LogEntry, Threat, ThreatStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "md" | "markdown" => Some(ReportFormat::Markdown),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportContent {
    Threats,
    Logs,
    All,
}

impl ReportContent {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "threats" => Some(ReportContent::Threats),
            "logs" => Some(ReportContent::Logs),
            "all" => Some(ReportContent::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    LastHour,
    Last24Hours,
    Last7Days,
    Last30Days,
    All,
}

impl TimeRange {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "1h" => Some(TimeRange::LastHour),
            "24h" => Some(TimeRange::Last24Hours),
            "7d" => Some(TimeRange::Last7Days),
            "30d" => Some(TimeRange::Last30Days),
            "all" => Some(TimeRange::All),
            _ => None,
        }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRange::LastHour => Some(now - Duration::hours(1)),
            TimeRange::Last24Hours => Some(now - Duration::hours(24)),
            TimeRange::Last7Days => Some(now - Duration::days(7)),
            TimeRange::Last30Days => Some(now - Duration::days(30)),
            TimeRange::All => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: ReportFormat,
    pub content: ReportContent,
    pub time_range: TimeRange,
    pub include_resolved: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: ReportFormat::Csv,
            content: ReportContent::All,
            time_range: TimeRange::Last24Hours,
            include_resolved: true,
        }
    }
}

pub fn filter_threats(
    threats: &[Threat],
    options: &ReportOptions,
    now: DateTime<Utc>,
) -> Vec<Threat> {
    let cutoff = options.time_range.cutoff(now);
    threats
        .iter()
        .filter(|t| cutoff.map_or(true, |c| t.timestamp >= c))
        .filter(|t| options.include_resolved || t.status != ThreatStatus::Resolved)
        .cloned()
        .collect()
}

pub fn filter_logs(logs: &[LogEntry], options: &ReportOptions, now: DateTime<Utc>) -> Vec<LogEntry> {
    let cutoff = options.time_range.cutoff(now);
    logs.iter()
        .filter(|l| cutoff.map_or(true, |c| l.timestamp >= c))
        .cloned()
        .collect()
}

pub fn write_report(
    threats: &[Threat],
    logs: &[LogEntry],
    options: &ReportOptions,
    path: &Path,
) -> Result<()> {
    let now = crate::core::time::now_utc();
    let threats = filter_threats(threats, options, now);
    let logs = filter_logs(logs, options, now);

    let out = match options.format {
        ReportFormat::Csv => render_csv(&threats, &logs, options),
        ReportFormat::Markdown => render_markdown(&threats, &logs, options, now),
        ReportFormat::Json => render_json(&threats, &logs, options, now)?,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, out)?;
    Ok(())
}

fn render_csv(threats: &[Threat], logs: &[LogEntry], options: &ReportOptions) -> String {
    let mut out = String::new();
    if matches!(options.content, ReportContent::Threats | ReportContent::All) {
        out.push_str("section,id,timestamp,type,severity,status,source,title,anomaly_score\n");
        for t in threats {
            out.push_str(&format!(
                "threat,{},{},{},{},{},{},{},{:.2}\n",
                csv_field(&t.id),
                csv_field(&format_timestamp(&t.timestamp.to_rfc3339())),
                csv_field(&t.threat_type.to_string()),
                t.severity,
                t.status,
                csv_field(&t.source),
                csv_field(&t.title),
                t.anomaly_score
            ));
        }
    }
    if matches!(options.content, ReportContent::Logs | ReportContent::All) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("section,id,timestamp,source,level,message\n");
        for l in logs {
            out.push_str(&format!(
                "log,{},{},{},{},{}\n",
                csv_field(&l.id),
                csv_field(&format_timestamp(&l.timestamp.to_rfc3339())),
                csv_field(&l.source),
                l.level,
                csv_field(&l.message)
            ));
        }
    }
    out
}

fn render_markdown(
    threats: &[Threat],
    logs: &[LogEntry],
    options: &ReportOptions,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    out.push_str("# Security Report\n\n");
    out.push_str(&format!(
        "- Generated: {}\n",
        format_timestamp(&now.to_rfc3339())
    ));
    out.push_str(&format!("- Threats: {}\n", threats.len()));
    out.push_str(&format!("- Logs: {}\n\n", logs.len()));

    if matches!(options.content, ReportContent::Threats | ReportContent::All) {
        out.push_str("## Threats\n\n");
        if threats.is_empty() {
            out.push_str("No threats in this window.\n\n");
        }
        for t in threats {
            out.push_str(&format!("### {} ({})\n", t.title, t.severity));
            out.push_str(&format!("- Status: {}\n", t.status));
            out.push_str(&format!("- Type: {}\n", t.threat_type));
            out.push_str(&format!(
                "- Detected: {}\n",
                format_timestamp(&t.timestamp.to_rfc3339())
            ));
            out.push_str(&format!("- Source: {}\n", t.source));
            out.push_str(&format!("- Anomaly score: {:.2}\n", t.anomaly_score));
            if !t.indicators.is_empty() {
                out.push_str("- Indicators:\n");
                for ind in &t.indicators {
                    out.push_str(&format!("  - {}\n", ind));
                }
            }
            if !t.actions.is_empty() {
                out.push_str("- Actions Taken:\n");
                for action in &t.actions {
                    out.push_str(&format!("  - {}\n", action));
                }
            }
            out.push('\n');
        }
    }

    if matches!(options.content, ReportContent::Logs | ReportContent::All) {
        out.push_str("## Logs\n\n");
        if logs.is_empty() {
            out.push_str("No logs in this window.\n");
        } else {
            out.push_str("| Timestamp | Source | Level | Message |\n");
            out.push_str("|---|---|---|---|\n");
            for l in logs {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    format_timestamp(&l.timestamp.to_rfc3339()),
                    l.source,
                    l.level,
                    l.message.replace('|', "\\|")
                ));
            }
        }
    }
    out
}

fn render_json(
    threats: &[Threat],
    logs: &[LogEntry],
    options: &ReportOptions,
    now: DateTime<Utc>,
) -> Result<String> {
    #[derive(Serialize)]
    struct ReportBundle<'a> {
        generated_at: DateTime<Utc>,
        threat_count: usize,
        log_count: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        threats: Option<&'a [Threat]>,
        #[serde(skip_serializing_if = "Option::is_none")]
        logs: Option<&'a [LogEntry]>,
    }

    let bundle = ReportBundle {
        generated_at: now,
        threat_count: threats.len(),
        log_count: logs.len(),
        threats: matches!(options.content, ReportContent::Threats | ReportContent::All)
            .then_some(threats),
        logs: matches!(options.content, ReportContent::Logs | ReportContent::All).then_some(logs),
    };
    Ok(serde_json::to_string_pretty(&bundle)?)
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
