use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Lifecycle of a simulated threat. Transitions only move forward in rank;
/// `Resolved` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThreatStatus {
    Active,
    Investigating,
    Contained,
    Resolved,
}

impl ThreatStatus {
    pub fn rank(&self) -> u8 {
        match self {
            ThreatStatus::Active => 0,
            ThreatStatus::Investigating => 1,
            ThreatStatus::Contained => 2,
            ThreatStatus::Resolved => 3,
        }
    }

    pub fn can_advance_to(&self, next: ThreatStatus) -> bool {
        next.rank() > self.rank()
    }
}

impl fmt::Display for ThreatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreatStatus::Active => write!(f, "active"),
            ThreatStatus::Investigating => write!(f, "investigating"),
            ThreatStatus::Contained => write!(f, "contained"),
            ThreatStatus::Resolved => write!(f, "resolved"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ThreatType {
    #[serde(rename = "brute force")]
    BruteForce,
    #[serde(rename = "malware")]
    Malware,
    #[serde(rename = "unauthorized access")]
    UnauthorizedAccess,
    #[serde(rename = "privilege escalation")]
    PrivilegeEscalation,
    #[serde(rename = "data exfiltration")]
    DataExfiltration,
    #[serde(rename = "anomaly")]
    Anomaly,
}

impl ThreatType {
    pub const ALL: [ThreatType; 6] = [
        ThreatType::BruteForce,
        ThreatType::Malware,
        ThreatType::UnauthorizedAccess,
        ThreatType::PrivilegeEscalation,
        ThreatType::DataExfiltration,
        ThreatType::Anomaly,
    ];
}

impl fmt::Display for ThreatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreatType::BruteForce => write!(f, "brute force"),
            ThreatType::Malware => write!(f, "malware"),
            ThreatType::UnauthorizedAccess => write!(f, "unauthorized access"),
            ThreatType::PrivilegeEscalation => write!(f, "privilege escalation"),
            ThreatType::DataExfiltration => write!(f, "data exfiltration"),
            ThreatType::Anomaly => write!(f, "anomaly"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threat {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub threat_type: ThreatType,
    pub severity: Severity,
    pub status: ThreatStatus,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub indicators: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    pub anomaly_score: f64,
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionType {
    #[serde(rename = "respond_to_threat")]
    Respond,
    #[serde(rename = "contain_threat")]
    Contain,
    #[serde(rename = "resolve_threat")]
    Resolve,
}

impl ActionType {
    pub fn target_status(&self) -> ThreatStatus {
        match self {
            ActionType::Respond => ThreatStatus::Investigating,
            ActionType::Contain => ThreatStatus::Contained,
            ActionType::Resolve => ThreatStatus::Resolved,
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            ActionType::Respond => "respond_to_threat",
            ActionType::Contain => "contain_threat",
            ActionType::Resolve => "resolve_threat",
        }
    }

    pub fn default_note(&self) -> &'static str {
        match self {
            ActionType::Respond => "Investigation started by operator",
            ActionType::Contain => "Threat contained by operator",
            ActionType::Resolve => "Resolved by operator",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action_type: ActionType,
    pub threat_id: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_id: String,
    pub threat_id: String,
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SystemHealth {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_logs: usize,
    pub logs_last_hour: usize,
    pub active_threats: usize,
    pub resolved_threats: usize,
    pub anomaly_count: usize,
    pub system_health: SystemHealth,
    pub agents: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogFilter {
    pub source: Option<String>,
    pub level: Option<LogLevel>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl LogFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(source) = &self.source {
            if !entry.source.eq_ignore_ascii_case(source) {
                return false;
            }
        }
        if let Some(level) = self.level {
            if entry.level != level {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if entry.timestamp > end {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, entries: Vec<LogEntry>) -> Vec<LogEntry> {
        let mut out: Vec<LogEntry> = entries.into_iter().filter(|e| self.matches(e)).collect();
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(source) = &self.source {
            query.push(("source", source.clone()));
        }
        if let Some(level) = self.level {
            query.push(("level", level.to_string()));
        }
        if let Some(start) = self.start_time {
            query.push(("start_time", start.to_rfc3339()));
        }
        if let Some(end) = self.end_time {
            query.push(("end_time", end.to_rfc3339()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreatFilter {
    pub severity: Option<Severity>,
    pub threat_type: Option<ThreatType>,
    pub status: Option<ThreatStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl ThreatFilter {
    pub fn matches(&self, threat: &Threat) -> bool {
        if let Some(severity) = self.severity {
            if threat.severity != severity {
                return false;
            }
        }
        if let Some(threat_type) = self.threat_type {
            if threat.threat_type != threat_type {
                return false;
            }
        }
        if let Some(status) = self.status {
            if threat.status != status {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if threat.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if threat.timestamp > end {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, threats: Vec<Threat>) -> Vec<Threat> {
        let mut out: Vec<Threat> = threats.into_iter().filter(|t| self.matches(t)).collect();
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(severity) = self.severity {
            query.push(("severity", severity.to_string()));
        }
        if let Some(threat_type) = self.threat_type {
            query.push(("type", threat_type.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.to_string()));
        }
        if let Some(start) = self.start_time {
            query.push(("start_time", start.to_rfc3339()));
        }
        if let Some(end) = self.end_time {
            query.push(("end_time", end.to_rfc3339()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}
