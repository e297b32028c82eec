use chrono::Duration;

use sentinel_sim::config::SimulatorConfig;
use sentinel_sim::core::time::{format_relative_time, format_timestamp};
use sentinel_sim::core::types::{ActionType, Severity, ThreatStatus, ThreatType};
use sentinel_sim::sim::TelemetrySimulator;

fn sim_with(cfg: SimulatorConfig) -> TelemetrySimulator {
    TelemetrySimulator::new(cfg)
}

fn seeded(seed: u64) -> TelemetrySimulator {
    sim_with(SimulatorConfig {
        seed: Some(seed),
        ..SimulatorConfig::default()
    })
}

#[test]
fn log_timestamps_strictly_increase_across_batches() {
    let mut sim = seeded(1);
    let first = sim.generate_logs(5);
    let second = sim.generate_logs(5);

    let mut all = first;
    all.extend(second);
    for pair in all.windows(2) {
        assert!(
            pair[1].timestamp > pair[0].timestamp,
            "expected {} > {}",
            pair[1].timestamp,
            pair[0].timestamp
        );
    }

    // the read side returns newest first
    let view = sim.logs();
    for pair in view.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
    }
}

#[test]
fn generate_logs_returns_exactly_what_was_asked() {
    let mut sim = seeded(2);
    assert_eq!(sim.generate_logs(3).len(), 3);
    // requests above the per-call cap are clamped
    assert_eq!(sim.generate_logs(50).len(), 5);
}

#[test]
fn log_buffer_is_bounded() {
    let mut sim = sim_with(SimulatorConfig {
        log_capacity: 20,
        seed: Some(3),
        ..SimulatorConfig::default()
    });
    for _ in 0..30 {
        sim.generate_logs(5);
    }
    assert_eq!(sim.logs().len(), 20);
}

#[test]
fn threat_registry_is_bounded() {
    let mut sim = sim_with(SimulatorConfig {
        threat_capacity: 10,
        seed: Some(4),
        ..SimulatorConfig::default()
    });
    for _ in 0..30 {
        let _ = sim.spawn_threat(Some(ThreatType::Anomaly));
        sim.advance_clock(Duration::seconds(1));
    }
    assert_eq!(sim.threats().len(), 10);
}

#[test]
fn status_only_moves_forward() {
    let mut sim = seeded(5);
    let threat = sim.spawn_threat(Some(ThreatType::BruteForce)).unwrap();

    let after = sim
        .apply_action(&threat.id, ActionType::Contain, None)
        .unwrap();
    assert_eq!(after.status, ThreatStatus::Contained);

    // going back to investigating is a regression and must fail
    let err = sim.apply_action(&threat.id, ActionType::Respond, None);
    assert!(err.is_err());

    let still = sim
        .threats()
        .into_iter()
        .find(|t| t.id == threat.id)
        .unwrap();
    assert_eq!(still.status, ThreatStatus::Contained);
}

#[test]
fn unknown_threat_is_rejected() {
    let mut sim = seeded(6);
    assert!(sim
        .apply_action("no-such-id", ActionType::Resolve, None)
        .is_err());
}

#[test]
fn sweep_resolves_only_old_threats() {
    let mut sim = seeded(7);
    let old = sim.spawn_threat(Some(ThreatType::Malware)).unwrap();
    sim.advance_clock(Duration::minutes(91));
    let fresh = sim.spawn_threat(Some(ThreatType::BruteForce)).unwrap();

    assert_eq!(sim.sweep(), 1);

    let threats = sim.threats();
    let old_now = threats.iter().find(|t| t.id == old.id).unwrap();
    let fresh_now = threats.iter().find(|t| t.id == fresh.id).unwrap();
    assert_eq!(old_now.status, ThreatStatus::Resolved);
    assert_eq!(fresh_now.status, ThreatStatus::Active);

    // exactly one resolution note was appended
    let auto_notes = old_now
        .actions
        .iter()
        .filter(|a| a.as_str() == "Automatically resolved by system")
        .count();
    assert_eq!(auto_notes, 1);

    // a second sweep does not touch it again
    assert_eq!(sim.sweep(), 0);
}

#[test]
fn threat_at_exactly_threshold_is_not_swept() {
    let mut sim = seeded(8);
    let _ = sim.spawn_threat(Some(ThreatType::Anomaly));
    sim.advance_clock(Duration::minutes(90));
    assert_eq!(sim.sweep(), 0);
    sim.advance_clock(Duration::seconds(1));
    assert_eq!(sim.sweep(), 1);
}

#[test]
fn resolving_via_action_appends_note() {
    let mut sim = seeded(9);
    let threat = sim.spawn_threat(Some(ThreatType::DataExfiltration)).unwrap();
    let before_actions = threat.actions.len();

    let resolved = sim
        .apply_action(&threat.id, ActionType::Resolve, Some("Closed after triage"))
        .unwrap();
    assert_eq!(resolved.status, ThreatStatus::Resolved);
    assert_eq!(resolved.actions.len(), before_actions + 1);
    assert_eq!(resolved.actions.last().map(String::as_str), Some("Closed after triage"));
}

#[test]
fn anomaly_scores_stay_in_range_and_track_severity() {
    let mut sim = seeded(10);
    // spawn plenty so both severity extremes show up
    for i in 0..200 {
        sim.advance_clock(Duration::seconds(200));
        let t = ThreatType::ALL[i % ThreatType::ALL.len()];
        let _ = sim.spawn_threat(Some(t));
    }

    let threats = sim.threats();
    let mut critical = Vec::new();
    let mut low = Vec::new();
    for t in &threats {
        assert!((0.0..=1.0).contains(&t.anomaly_score), "score out of range");
        match t.severity {
            Severity::Critical => critical.push(t.anomaly_score),
            Severity::Low => low.push(t.anomaly_score),
            _ => {}
        }
    }
    assert!(!critical.is_empty() && !low.is_empty());
    let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
    assert!(mean(&critical) > mean(&low));
}

#[test]
fn seed_initial_populates_history() {
    let mut sim = seeded(12);
    sim.seed_initial();
    let threats = sim.threats();
    assert!((5..=8).contains(&threats.len()));
    assert_eq!(sim.logs().len(), threats.len());

    let now = sim.clock();
    for t in &threats {
        let age = now.signed_duration_since(t.timestamp);
        assert!(age >= Duration::zero());
        assert!(age <= Duration::hours(4));
    }
}

#[test]
fn stats_count_recent_logs_and_anomalies() {
    let mut sim = seeded(13);
    sim.generate_logs(5);
    sim.advance_clock(Duration::hours(2));
    sim.generate_logs(5);

    let stats = sim.stats();
    assert_eq!(stats.total_logs, 10);
    assert_eq!(stats.logs_last_hour, 5);

    let _ = sim.spawn_threat(Some(ThreatType::Malware));
    let stats = sim.stats();
    assert_eq!(stats.active_threats, 1);
    // critical archetype scores land above the anomaly threshold
    assert!(stats.anomaly_count >= 1 || sim.threats()[0].anomaly_score <= 0.6);
}

#[test]
fn formatters_degrade_to_sentinels() {
    assert_eq!(format_timestamp("garbage"), "Invalid date");
    assert_eq!(format_timestamp(""), "Invalid date");
    assert_eq!(format_relative_time("garbage"), "Unknown time");
    assert_eq!(format_timestamp("2025-06-01T12:00:00Z"), "01 Jun 2025, 05:30:00 PM IST");
}

#[test]
fn deterministic_given_same_seed() {
    let mut a = seeded(99);
    let mut b = seeded(99);
    let logs_a = a.generate_logs(5);
    let logs_b = b.generate_logs(5);
    let msgs_a: Vec<&str> = logs_a.iter().map(|l| l.message.as_str()).collect();
    let msgs_b: Vec<&str> = logs_b.iter().map(|l| l.message.as_str()).collect();
    assert_eq!(msgs_a, msgs_b);
}
