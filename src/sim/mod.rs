//! In-memory synthetic telemetry generator. Owns a bounded log ring buffer
//! and a bounded threat registry, advances a simulated clock, and exposes
//! explicit commands (`tick`, `sweep`, `apply_action`) next to pure reads
//! (`logs`, `threats`, `stats`).

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::SimulatorConfig;
use crate::core::error::SentinelError;
use crate::core::time::now_utc;
use crate::core::types::{
    ActionType, LogEntry, LogLevel, Severity, SystemHealth, SystemStats, Threat, ThreatStatus,
    ThreatType,
};

pub mod catalog;
pub mod runner;

const AUTO_RESOLVE_NOTE: &str = "Automatically resolved by system";

pub struct TelemetrySimulator {
    cfg: SimulatorConfig,
    rng: StdRng,
    clock: DateTime<Utc>,
    logs: VecDeque<LogEntry>,
    threats: Vec<Threat>,
    cooldowns: HashMap<ThreatType, DateTime<Utc>>,
}

impl TelemetrySimulator {
    pub fn new(cfg: SimulatorConfig) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            cfg,
            rng,
            clock: now_utc(),
            logs: VecDeque::new(),
            threats: Vec::new(),
            cooldowns: HashMap::new(),
        }
    }

    pub fn clock(&self) -> DateTime<Utc> {
        self.clock
    }

    pub fn advance_clock(&mut self, delta: Duration) {
        self.clock += delta;
    }

    /// Catch the simulated clock up to wall time. Never moves it backward.
    pub fn sync_clock(&mut self, now: DateTime<Utc>) {
        if now > self.clock {
            self.clock = now;
        }
    }

    /// Seed the registry the way a dashboard expects to find it on first
    /// load: 5-8 threats spread over the past 3-4 hours, a mix of active and
    /// resolved, each with one correlated log.
    pub fn seed_initial(&mut self) {
        let count = self.rng.gen_range(5..=8);
        for _ in 0..count {
            let hours_ago = self.rng.gen_range(0.0..4.0_f64);
            let ts = self.clock - Duration::seconds((hours_ago * 3600.0) as i64);
            let threat_type = ThreatType::ALL[self.rng.gen_range(0..ThreatType::ALL.len())];
            let mut threat = self.build_threat(threat_type, ts);
            if self.rng.gen_bool(0.4) {
                threat.status = ThreatStatus::Resolved;
            }
            let log = self.alert_log_for(&threat);
            self.push_log(log);
            self.push_threat(threat);
        }
        tracing::info!("seeded simulator with {} initial threats", count);
    }

    /// Emit up to `max_logs_per_call` new log entries. The simulated clock
    /// advances 1-5 seconds per entry, so timestamps are strictly increasing
    /// even when calls arrive back to back.
    pub fn generate_logs(&mut self, count: usize) -> Vec<LogEntry> {
        let count = count.min(self.cfg.max_logs_per_call);
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let step = self.rng.gen_range(1_000..=5_000);
            self.clock += Duration::milliseconds(step);

            let correlated = self.rng.gen_bool(self.cfg.threat_log_probability);
            let entry = match self.pick_active_threat().filter(|_| correlated) {
                Some(threat) => self.correlated_log(&threat),
                None => self.normal_log(),
            };
            out.push(entry.clone());
            self.push_log(entry);
        }
        out
    }

    /// All retained entries, newest first. Stable: entries with equal
    /// timestamps keep insertion order.
    pub fn logs(&self) -> Vec<LogEntry> {
        let mut out: Vec<LogEntry> = self.logs.iter().cloned().collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }

    /// All retained threats, newest first. Pure read: no sweep, no spawning.
    pub fn threats(&self) -> Vec<Threat> {
        let mut out = self.threats.clone();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }

    /// Create a threat from the archetype catalog. A random archetype honors
    /// the cool-down window and returns `None` when every archetype is
    /// cooling down; an explicit `requested` type always spawns.
    pub fn spawn_threat(&mut self, requested: Option<ThreatType>) -> Option<Threat> {
        let threat_type = match requested {
            Some(t) => t,
            None => {
                let cooldown = Duration::seconds(self.cfg.archetype_cooldown_secs);
                let available: Vec<ThreatType> = ThreatType::ALL
                    .into_iter()
                    .filter(|t| match self.cooldowns.get(t) {
                        Some(last) => self.clock.signed_duration_since(*last) >= cooldown,
                        None => true,
                    })
                    .collect();
                if available.is_empty() {
                    tracing::debug!("all threat archetypes cooling down; skipping spawn");
                    return None;
                }
                available[self.rng.gen_range(0..available.len())]
            }
        };

        let ts = self.clock;
        let threat = self.build_threat(threat_type, ts);
        self.cooldowns.insert(threat_type, ts);
        tracing::info!(
            "new threat generated: {} ({})",
            threat.title,
            threat.severity
        );
        self.push_threat(threat.clone());
        Some(threat)
    }

    /// One generation step: a small batch of logs, a low-probability threat
    /// spawn, then the auto-resolve sweep. Hosts call this on their own
    /// schedule instead of relying on side-effecting reads.
    pub fn tick(&mut self) {
        self.sync_clock(now_utc());
        let batch = self.rng.gen_range(1..=self.cfg.max_logs_per_call);
        self.generate_logs(batch);
        if self.rng.gen_bool(self.cfg.spawn_probability) {
            let _ = self.spawn_threat(None);
        }
        self.sweep();
    }

    /// Auto-resolve active threats older than the configured threshold,
    /// appending one resolution note each. Returns how many were resolved.
    pub fn sweep(&mut self) -> usize {
        let threshold = Duration::minutes(self.cfg.auto_resolve_after_mins);
        let now = self.clock;
        let mut resolved = 0usize;
        for threat in self.threats.iter_mut() {
            if threat.status == ThreatStatus::Active
                && now.signed_duration_since(threat.timestamp) > threshold
            {
                threat.status = ThreatStatus::Resolved;
                threat.actions.push(AUTO_RESOLVE_NOTE.to_string());
                resolved += 1;
            }
        }
        if resolved > 0 {
            tracing::info!(
                "auto-resolved {} threats older than {} minutes",
                resolved,
                self.cfg.auto_resolve_after_mins
            );
        }
        resolved
    }

    /// Advance a threat's status. Transitions only move forward; anything
    /// else is rejected so callers cannot regress the state machine.
    pub fn apply_action(
        &mut self,
        threat_id: &str,
        action: ActionType,
        note: Option<&str>,
    ) -> Result<Threat, SentinelError> {
        let target = action.target_status();
        let threat = self
            .threats
            .iter_mut()
            .find(|t| t.id == threat_id)
            .ok_or_else(|| SentinelError::UnknownThreat(threat_id.to_string()))?;
        if !threat.status.can_advance_to(target) {
            return Err(SentinelError::InvalidTransition {
                from: threat.status,
                to: target,
            });
        }
        threat.status = target;
        threat
            .actions
            .push(note.unwrap_or(action.default_note()).to_string());
        tracing::info!(
            "threat {} moved to {} via {}",
            threat.id,
            target,
            action.wire_name()
        );
        Ok(threat.clone())
    }

    pub fn stats(&self) -> SystemStats {
        let hour_ago = self.clock - Duration::hours(1);
        let logs_last_hour = self
            .logs
            .iter()
            .filter(|l| l.timestamp >= hour_ago)
            .count();
        let active_threats = self
            .threats
            .iter()
            .filter(|t| t.status == ThreatStatus::Active)
            .count();
        let resolved_threats = self
            .threats
            .iter()
            .filter(|t| t.status == ThreatStatus::Resolved)
            .count();
        let anomaly_count = self
            .threats
            .iter()
            .filter(|t| t.anomaly_score > 0.6)
            .count();

        let system_health = if active_threats > 5 {
            SystemHealth::Critical
        } else if active_threats > 2 {
            SystemHealth::Warning
        } else {
            SystemHealth::Healthy
        };

        let mut agents = BTreeMap::new();
        for agent in ["SentinelCore", "LogCollector", "AnomalyDetector", "ResponseManager"] {
            agents.insert(agent.to_string(), "active".to_string());
        }

        SystemStats {
            total_logs: self.logs.len(),
            logs_last_hour,
            active_threats,
            resolved_threats,
            anomaly_count,
            system_health,
            agents,
        }
    }

    fn push_log(&mut self, entry: LogEntry) {
        self.logs.push_back(entry);
        while self.logs.len() > self.cfg.log_capacity {
            self.logs.pop_front();
        }
    }

    /// Registry eviction prefers dropping the oldest resolved threat; only
    /// when nothing is resolved does the oldest overall go.
    fn push_threat(&mut self, threat: Threat) {
        self.threats.push(threat);
        while self.threats.len() > self.cfg.threat_capacity {
            let victim = self
                .threats
                .iter()
                .enumerate()
                .filter(|(_, t)| t.status == ThreatStatus::Resolved)
                .min_by_key(|(_, t)| t.timestamp)
                .map(|(i, _)| i)
                .or_else(|| {
                    self.threats
                        .iter()
                        .enumerate()
                        .min_by_key(|(_, t)| t.timestamp)
                        .map(|(i, _)| i)
                });
            match victim {
                Some(i) => {
                    self.threats.remove(i);
                }
                None => break,
            }
        }
    }

    fn pick_active_threat(&mut self) -> Option<Threat> {
        let active: Vec<&Threat> = self
            .threats
            .iter()
            .filter(|t| t.status == ThreatStatus::Active)
            .collect();
        if active.is_empty() {
            return None;
        }
        Some(active[self.rng.gen_range(0..active.len())].clone())
    }

    fn build_threat(&mut self, threat_type: ThreatType, ts: DateTime<Utc>) -> Threat {
        let pattern = catalog::pattern_for(threat_type);
        // Archetypes carry a severity tendency, not a guarantee.
        let severity = if self.rng.gen_bool(0.5) {
            pattern.severity
        } else {
            [Severity::Low, Severity::Medium, Severity::High, Severity::Critical]
                [self.rng.gen_range(0..4)]
        };
        let anomaly_score = catalog::anomaly_score_for(&mut self.rng, severity);
        let user = if self.rng.gen_bool(0.7) {
            Some(catalog::pick(&mut self.rng, catalog::USERS).to_string())
        } else {
            None
        };
        let hostname = Some(catalog::pick(&mut self.rng, catalog::HOSTNAMES).to_string());

        let mut details = self.threat_details(threat_type);
        details.insert(
            "response_time_seconds".to_string(),
            json!(self.rng.gen_range(5..=125)),
        );

        Threat {
            id: Uuid::new_v4().to_string(),
            title: pattern.title.to_string(),
            description: pattern.description.to_string(),
            threat_type,
            severity,
            status: ThreatStatus::Active,
            timestamp: ts,
            source: pattern.source.to_string(),
            user,
            hostname,
            indicators: pattern.indicators.iter().map(|s| s.to_string()).collect(),
            actions: pattern
                .containment_actions
                .iter()
                .map(|s| s.to_string())
                .collect(),
            anomaly_score,
            details,
        }
    }

    fn threat_details(&mut self, threat_type: ThreatType) -> BTreeMap<String, Value> {
        let mut details = BTreeMap::new();
        match threat_type {
            ThreatType::BruteForce => {
                details.insert(
                    "ip_address".to_string(),
                    json!(catalog::random_ip(&mut self.rng)),
                );
                details.insert(
                    "failed_attempts".to_string(),
                    json!(self.rng.gen_range(5..=14)),
                );
                details.insert(
                    "time_window_minutes".to_string(),
                    json!(self.rng.gen_range(1..=10)),
                );
            }
            ThreatType::Malware => {
                details.insert(
                    "malware_name".to_string(),
                    json!(catalog::pick(&mut self.rng, catalog::MALWARE_NAMES)),
                );
                details.insert(
                    "file_path".to_string(),
                    json!(catalog::pick(&mut self.rng, catalog::SUSPICIOUS_FILE_PATHS)),
                );
            }
            ThreatType::DataExfiltration => {
                details.insert(
                    "bytes_transferred".to_string(),
                    json!(self.rng.gen_range(100..1000) * 1_048_576u64),
                );
                details.insert(
                    "destination_ip".to_string(),
                    json!(catalog::random_ip(&mut self.rng)),
                );
            }
            ThreatType::UnauthorizedAccess
            | ThreatType::PrivilegeEscalation
            | ThreatType::Anomaly => {
                details.insert(
                    "resource".to_string(),
                    json!(catalog::pick(&mut self.rng, catalog::HOSTNAMES)),
                );
            }
        }
        details
    }

    /// The one log every seeded threat arrives with.
    fn alert_log_for(&mut self, threat: &Threat) -> LogEntry {
        let mut details = BTreeMap::new();
        details.insert("related_threat".to_string(), json!(threat.id));
        if let Some(user) = &threat.user {
            details.insert("user".to_string(), json!(user));
        }
        LogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: threat.timestamp,
            source: threat.source.clone(),
            level: level_for_severity(threat.severity),
            message: format!("Security alert: {}", threat.title),
            details,
        }
    }

    /// Log that reuses an active threat's contextual fields, so the stream
    /// stays internally consistent. Carries `details.related_threat`.
    fn correlated_log(&mut self, threat: &Threat) -> LogEntry {
        let ts = self.clock;
        match threat.threat_type {
            ThreatType::BruteForce => {
                let user = catalog::pick(&mut self.rng, catalog::USERS).to_string();
                let ip = threat
                    .details
                    .get("ip_address")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| catalog::random_ip(&mut self.rng));
                let mut details = BTreeMap::new();
                details.insert("event_id".to_string(), json!(4625));
                details.insert("user".to_string(), json!(user));
                details.insert("ip_address".to_string(), json!(ip));
                details.insert("failure_reason".to_string(), json!("Invalid password"));
                details.insert("related_threat".to_string(), json!(threat.id));
                LogEntry {
                    id: Uuid::new_v4().to_string(),
                    timestamp: ts,
                    source: "Windows-Security".to_string(),
                    level: LogLevel::Warning,
                    message: format!(
                        "Event ID 4625: Failed account login attempt for user {} from {}",
                        details["user"].as_str().unwrap_or("unknown"),
                        details["ip_address"].as_str().unwrap_or("unknown")
                    ),
                    details,
                }
            }
            ThreatType::Malware => {
                let malware = threat
                    .details
                    .get("malware_name")
                    .and_then(Value::as_str)
                    .unwrap_or("Suspicious.GenericML")
                    .to_string();
                let file_path = threat
                    .details
                    .get("file_path")
                    .and_then(Value::as_str)
                    .unwrap_or("C:\\Users\\Administrator\\Downloads\\invoice.exe")
                    .to_string();
                let mut details = BTreeMap::new();
                details.insert("malware_name".to_string(), json!(malware));
                details.insert("file_path".to_string(), json!(file_path));
                details.insert("action_taken".to_string(), json!("Quarantined"));
                details.insert("related_threat".to_string(), json!(threat.id));
                LogEntry {
                    id: Uuid::new_v4().to_string(),
                    timestamp: ts,
                    source: "Windows-Defender/Operational".to_string(),
                    level: LogLevel::Error,
                    message: "Malware detected: Suspicious file activity identified".to_string(),
                    details,
                }
            }
            _ => {
                let user = threat
                    .user
                    .clone()
                    .unwrap_or_else(|| catalog::pick(&mut self.rng, catalog::USERS).to_string());
                let mut details = BTreeMap::new();
                details.insert("related_threat".to_string(), json!(threat.id));
                details.insert("user".to_string(), json!(user));
                LogEntry {
                    id: Uuid::new_v4().to_string(),
                    timestamp: ts,
                    source: threat.source.clone(),
                    level: level_for_severity(threat.severity),
                    message: format!("Activity related to {} threat detected", threat.threat_type),
                    details,
                }
            }
        }
    }

    fn normal_log(&mut self) -> LogEntry {
        let ts = self.clock;
        let roll: f64 = self.rng.gen();
        if roll < 0.6 {
            let source = catalog::pick(&mut self.rng, catalog::WINDOWS_SOURCES).to_string();
            if source == "Windows-Security" {
                return self.windows_security_log(ts);
            }
            self.windows_system_log(ts, source)
        } else if roll < 0.8 {
            self.cloud_log(ts)
        } else if roll < 0.9 {
            self.network_log(ts)
        } else {
            self.database_log(ts)
        }
    }

    fn windows_security_log(&mut self, ts: DateTime<Utc>) -> LogEntry {
        let idx = self.rng.gen_range(0..catalog::WINDOWS_SECURITY_EVENTS.len());
        let event = &catalog::WINDOWS_SECURITY_EVENTS[idx];
        let user = catalog::pick(&mut self.rng, catalog::USERS).to_string();
        let ip = catalog::random_ip(&mut self.rng);
        let mut details = BTreeMap::new();
        details.insert("event_id".to_string(), json!(event.event_id));
        details.insert("user".to_string(), json!(user.clone()));
        details.insert("ip_address".to_string(), json!(ip.clone()));
        details.insert(
            "process_id".to_string(),
            json!(self.rng.gen_range(1_000..11_000)),
        );
        details.insert("success".to_string(), json!(event.level == LogLevel::Info));
        LogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: ts,
            source: "Windows-Security".to_string(),
            level: event.level,
            message: format!(
                "Event ID {}: {} for user {} from {}",
                event.event_id, event.description, user, ip
            ),
            details,
        }
    }

    fn windows_system_log(&mut self, ts: DateTime<Utc>, source: String) -> LogEntry {
        let mut details = BTreeMap::new();
        details.insert(
            "process_name".to_string(),
            json!(catalog::pick(&mut self.rng, catalog::PROCESS_NAMES)),
        );
        details.insert(
            "process_id".to_string(),
            json!(self.rng.gen_range(1_000..11_000)),
        );
        LogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: ts,
            source,
            level: LogLevel::Info,
            message: catalog::pick(&mut self.rng, catalog::SYSTEM_MESSAGES).to_string(),
            details,
        }
    }

    fn cloud_log(&mut self, ts: DateTime<Utc>) -> LogEntry {
        let source = catalog::pick(&mut self.rng, catalog::CLOUD_SOURCES).to_string();
        let action = catalog::pick(&mut self.rng, catalog::CLOUD_ACTIONS).to_string();
        let region = catalog::pick(&mut self.rng, catalog::CLOUD_REGIONS).to_string();
        let mut details = BTreeMap::new();
        details.insert("action".to_string(), json!(action.clone()));
        details.insert("region".to_string(), json!(region.clone()));
        details.insert(
            "resource_id".to_string(),
            json!(format!("arn:aws:{:06x}", self.rng.gen_range(0..0xFFFFFF))),
        );
        details.insert(
            "user_identity".to_string(),
            json!(catalog::pick(&mut self.rng, catalog::USERS)),
        );
        LogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: ts,
            source,
            level: if self.rng.gen_bool(0.8) {
                LogLevel::Info
            } else {
                LogLevel::Warning
            },
            message: format!("Cloud API call: {} performed in {}", action, region),
            details,
        }
    }

    fn network_log(&mut self, ts: DateTime<Utc>) -> LogEntry {
        let source = catalog::pick(&mut self.rng, catalog::NETWORK_SOURCES).to_string();
        let protocol = catalog::pick(&mut self.rng, catalog::PROTOCOLS).to_string();
        let src_ip = catalog::random_ip(&mut self.rng);
        let dst_ip = catalog::random_ip(&mut self.rng);
        let port = catalog::PORTS[self.rng.gen_range(0..catalog::PORTS.len())];
        let allowed = self.rng.gen_bool(0.9);
        let mut details = BTreeMap::new();
        details.insert("protocol".to_string(), json!(protocol.clone()));
        details.insert("src_ip".to_string(), json!(src_ip.clone()));
        details.insert("dst_ip".to_string(), json!(dst_ip.clone()));
        details.insert("dst_port".to_string(), json!(port));
        details.insert(
            "bytes_transferred".to_string(),
            json!(self.rng.gen_range(0..100_000)),
        );
        LogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: ts,
            source,
            level: if self.rng.gen_bool(0.8) {
                LogLevel::Info
            } else {
                LogLevel::Warning
            },
            message: format!(
                "{} connection from {} to {}:{} {}",
                protocol,
                src_ip,
                dst_ip,
                port,
                if allowed { "allowed" } else { "blocked" }
            ),
            details,
        }
    }

    fn database_log(&mut self, ts: DateTime<Utc>) -> LogEntry {
        let source = catalog::pick(&mut self.rng, catalog::DATABASE_SOURCES).to_string();
        let query_type = catalog::pick(&mut self.rng, catalog::QUERY_TYPES).to_string();
        let table = catalog::pick(&mut self.rng, catalog::TABLES).to_string();
        let mut details = BTreeMap::new();
        details.insert("query_type".to_string(), json!(query_type.clone()));
        details.insert("table".to_string(), json!(table.clone()));
        details.insert(
            "duration_ms".to_string(),
            json!(self.rng.gen_range(0..1_000)),
        );
        details.insert(
            "rows_affected".to_string(),
            json!(self.rng.gen_range(0..100)),
        );
        details.insert(
            "user".to_string(),
            json!(catalog::pick(&mut self.rng, catalog::USERS)),
        );
        LogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: ts,
            source,
            level: if self.rng.gen_bool(0.9) {
                LogLevel::Info
            } else {
                LogLevel::Warning
            },
            message: format!(
                "Database query: {} on table {} completed successfully",
                query_type, table
            ),
            details,
        }
    }
}

fn level_for_severity(severity: Severity) -> LogLevel {
    match severity {
        Severity::Critical | Severity::High => LogLevel::Error,
        Severity::Medium => LogLevel::Warning,
        Severity::Low => LogLevel::Info,
    }
}
