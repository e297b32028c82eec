//! Static catalogs the generator draws from. Archetype text, source pools and
//! score ranges are data, not logic; the simulator is an interpreter over
//! these tables.

use rand::Rng;

use crate::core::types::{LogLevel, Severity, ThreatType};

pub struct ThreatPattern {
    pub threat_type: ThreatType,
    pub title: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub source: &'static str,
    pub indicators: &'static [&'static str],
    pub containment_actions: &'static [&'static str],
}

pub const THREAT_PATTERNS: [ThreatPattern; 6] = [
    ThreatPattern {
        threat_type: ThreatType::BruteForce,
        title: "Brute Force Attack Detected",
        description: "Multiple failed login attempts from same source",
        severity: Severity::High,
        source: "Windows-Security",
        indicators: &[
            "Multiple 4625 events",
            "Same source IP",
            "Different account names",
        ],
        containment_actions: &[
            "Temporarily locked account",
            "Added source IPs to blocklist",
            "Notified security team",
        ],
    },
    ThreatPattern {
        threat_type: ThreatType::Malware,
        title: "Malware Activity Detected",
        description: "Suspicious process execution pattern identified",
        severity: Severity::Critical,
        source: "Windows-Defender/Operational",
        indicators: &[
            "Suspicious file hash",
            "Unusual process tree",
            "Known malware patterns",
        ],
        containment_actions: &[
            "Isolated affected system",
            "Blocked outbound connections",
            "Initiated malware scan",
        ],
    },
    ThreatPattern {
        threat_type: ThreatType::UnauthorizedAccess,
        title: "Unauthorized Access Attempt",
        description: "Attempt to access restricted resource",
        severity: Severity::Medium,
        source: "Windows-Security",
        indicators: &[
            "Access denied event",
            "Non-business hours",
            "Sensitive resource",
        ],
        containment_actions: &[
            "Terminated active sessions",
            "Applied conditional access policies",
            "Escalated to security team",
        ],
    },
    ThreatPattern {
        threat_type: ThreatType::PrivilegeEscalation,
        title: "Privilege Escalation Detected",
        description: "User gained elevated privileges through suspicious means",
        severity: Severity::High,
        source: "Windows-Security",
        indicators: &[
            "Special privileges assigned",
            "Unusual group membership change",
            "Admin commands executed",
        ],
        containment_actions: &[
            "Revoked suspicious permissions",
            "Enforced just-in-time access for admins",
            "Initiated security review",
        ],
    },
    ThreatPattern {
        threat_type: ThreatType::DataExfiltration,
        title: "Potential Data Exfiltration",
        description: "Unusual outbound data transfer detected",
        severity: Severity::High,
        source: "Network-IDS",
        indicators: &[
            "Large outbound transfer",
            "Unusual destination",
            "Sensitive file access",
        ],
        containment_actions: &[
            "Blocked data transfer",
            "Alerted data protection team",
            "Created forensic snapshot of affected resources",
        ],
    },
    ThreatPattern {
        threat_type: ThreatType::Anomaly,
        title: "System Behavior Anomaly",
        description: "Unusual system behavior detected by analysis engine",
        severity: Severity::Medium,
        source: "Windows-System",
        indicators: &[
            "Unusual process relationship",
            "Statistical deviation",
            "Time-based anomaly",
        ],
        containment_actions: &[
            "Increased monitoring for affected resources",
            "Applied additional authentication requirements",
            "Updated baseline behavior patterns",
        ],
    },
];

pub fn pattern_for(threat_type: ThreatType) -> &'static ThreatPattern {
    THREAT_PATTERNS
        .iter()
        .find(|p| p.threat_type == threat_type)
        .unwrap_or(&THREAT_PATTERNS[0])
}

pub const WINDOWS_SOURCES: &[&str] = &[
    "Windows-Security",
    "Windows-System",
    "Windows-Application",
    "Windows-PowerShell/Operational",
    "Windows-Sysmon/Operational",
    "Windows-Defender/Operational",
];

pub const CLOUD_SOURCES: &[&str] = &["AWS-CloudTrail", "AWS-GuardDuty", "AWS-SecurityHub"];

pub const NETWORK_SOURCES: &[&str] = &["Network-Firewall", "Network-IDS", "Network-Router"];

pub const DATABASE_SOURCES: &[&str] =
    &["Database-MySQL", "Database-PostgreSQL", "Database-SQLServer"];

pub struct SecurityEvent {
    pub event_id: u32,
    pub description: &'static str,
    pub level: LogLevel,
}

pub const WINDOWS_SECURITY_EVENTS: &[SecurityEvent] = &[
    SecurityEvent { event_id: 4624, description: "Successful account login", level: LogLevel::Info },
    SecurityEvent { event_id: 4625, description: "Failed account login attempt", level: LogLevel::Warning },
    SecurityEvent { event_id: 4634, description: "An account was logged off", level: LogLevel::Info },
    SecurityEvent { event_id: 4648, description: "A logon was attempted using explicit credentials", level: LogLevel::Warning },
    SecurityEvent { event_id: 4672, description: "Special privileges assigned to new logon", level: LogLevel::Warning },
    SecurityEvent { event_id: 4688, description: "A new process has been created", level: LogLevel::Info },
    SecurityEvent { event_id: 4720, description: "A user account was created", level: LogLevel::Warning },
    SecurityEvent { event_id: 4722, description: "A user account was enabled", level: LogLevel::Info },
    SecurityEvent { event_id: 4724, description: "An attempt was made to reset an account's password", level: LogLevel::Warning },
    SecurityEvent { event_id: 4732, description: "A member was added to a security-enabled local group", level: LogLevel::Warning },
    SecurityEvent { event_id: 4740, description: "A user account was locked out", level: LogLevel::Warning },
    SecurityEvent { event_id: 5156, description: "The Windows Filtering Platform permitted a connection", level: LogLevel::Info },
    SecurityEvent { event_id: 5157, description: "The Windows Filtering Platform blocked a connection", level: LogLevel::Warning },
    SecurityEvent { event_id: 7045, description: "A service was installed in the system", level: LogLevel::Warning },
    SecurityEvent { event_id: 1102, description: "The audit log was cleared", level: LogLevel::Error },
];

pub const USERS: &[&str] = &[
    "administrator",
    "system",
    "john.doe",
    "sarah.smith",
    "helpdesk",
    "backup_svc",
    "dev_user",
    "web_admin",
    "db_admin",
    "guest",
];

pub const HOSTNAMES: &[&str] = &["vm-prod-01", "vm-dev-03", "appserver-web1", "dc-core-02"];

pub const PROCESS_NAMES: &[&str] = &["svchost.exe", "explorer.exe", "chrome.exe", "taskmgr.exe"];

pub const MALWARE_NAMES: &[&str] = &[
    "Trojan.Generic",
    "Ransomware.Cryptolocker",
    "Backdoor.Bot",
    "Exploit.PDF",
];

pub const SUSPICIOUS_FILE_PATHS: &[&str] = &[
    "C:\\Users\\Administrator\\Downloads\\invoice.pdf.exe",
    "C:\\Program Files\\Temp\\svchost.exe",
    "C:\\Windows\\System32\\rundIl32.exe",
    "C:\\Users\\Public\\suspicious.dll",
];

pub const CLOUD_ACTIONS: &[&str] =
    &["ListBuckets", "GetObject", "PutObject", "CreateUser", "AssumeRole"];

pub const CLOUD_REGIONS: &[&str] = &["us-east-1", "us-west-2", "eu-west-1"];

pub const PROTOCOLS: &[&str] = &["TCP", "UDP", "HTTP", "HTTPS"];

pub const PORTS: &[u16] = &[22, 80, 443, 3389, 8080, 3306];

pub const QUERY_TYPES: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE"];

pub const TABLES: &[&str] = &["users", "products", "orders", "logs", "sessions"];

pub const SYSTEM_MESSAGES: &[&str] = &[
    "Service started successfully",
    "Application launched",
    "System resource usage normal",
    "Scheduled task completed",
    "Driver loaded successfully",
];

pub fn pick<'a, R: Rng>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

pub fn random_ip<R: Rng>(rng: &mut R) -> String {
    format!(
        "192.168.{}.{}",
        rng.gen_range(0..255u16),
        rng.gen_range(0..255u16)
    )
}

/// Severity-conditioned score sample. Cosmetic: the ranges only make critical
/// threats look scarier than low ones, there is no model behind them.
pub fn anomaly_score_for<R: Rng>(rng: &mut R, severity: Severity) -> f64 {
    match severity {
        Severity::Critical => rng.gen_range(0.9..=1.0),
        Severity::High => rng.gen_range(0.7..0.9),
        Severity::Medium => rng.gen_range(0.5..0.7),
        Severity::Low => rng.gen_range(0.2..0.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_archetype_has_a_pattern() {
        for threat_type in ThreatType::ALL {
            let pattern = pattern_for(threat_type);
            assert_eq!(pattern.threat_type, threat_type);
            assert!(!pattern.indicators.is_empty());
            assert!(!pattern.containment_actions.is_empty());
        }
    }

    #[test]
    fn anomaly_score_ranges_stay_in_band() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            assert!(anomaly_score_for(&mut rng, Severity::Critical) >= 0.9);
            assert!(anomaly_score_for(&mut rng, Severity::Low) < 0.5);
            let score = anomaly_score_for(&mut rng, Severity::High);
            assert!((0.0..=1.0).contains(&score));
        }
    }
}
