use std::{fs, path::Path};

use serde::Deserialize;

use crate::core::error::SentinelError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub offline: bool,
    pub simulator: SimulatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            timeout_ms: 5_000,
            user_agent: "sentinel-sim/1.0 (production)".to_string(),
            offline: false,
            simulator: SimulatorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Ring-buffer capacity for retained log entries.
    pub log_capacity: usize,
    /// Registry capacity for retained threats.
    pub threat_capacity: usize,
    /// Hard cap on logs emitted per `generate_logs` call.
    pub max_logs_per_call: usize,
    /// Probability that an emitted log correlates with an active threat.
    pub threat_log_probability: f64,
    /// Probability that a tick spawns a new threat.
    pub spawn_probability: f64,
    /// Minimum simulated seconds between two threats of the same archetype.
    pub archetype_cooldown_secs: i64,
    /// Active threats older than this (simulated minutes) auto-resolve.
    pub auto_resolve_after_mins: i64,
    pub generation_period_secs: u64,
    pub sweep_period_secs: u64,
    /// Fixed RNG seed; omit for entropy.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            log_capacity: 200,
            threat_capacity: 50,
            max_logs_per_call: 5,
            threat_log_probability: 0.1,
            spawn_probability: 0.05,
            archetype_cooldown_secs: 180,
            auto_resolve_after_mins: 90,
            generation_period_secs: 15,
            sweep_period_secs: 60,
            seed: None,
        }
    }
}

pub fn load_config(path: Option<&str>) -> Result<AppConfig, SentinelError> {
    let default_path = Path::new("config/sentinel.toml");
    let path = path.map(Path::new).unwrap_or(default_path);

    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| SentinelError::Config(e.to_string()))?;
    let cfg: AppConfig =
        toml::from_str(&content).map_err(|e| SentinelError::Config(e.to_string()))?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &AppConfig) -> Result<(), SentinelError> {
    let sim = &cfg.simulator;
    if sim.log_capacity == 0 || sim.threat_capacity == 0 {
        return Err(SentinelError::Config(
            "simulator capacities must be non-zero".into(),
        ));
    }
    if !(0.0..=1.0).contains(&sim.threat_log_probability)
        || !(0.0..=1.0).contains(&sim.spawn_probability)
    {
        return Err(SentinelError::Config(
            "simulator probabilities must be within [0, 1]".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: AppConfig = toml::from_str("offline = true\n[simulator]\nseed = 7\n").unwrap();
        assert!(cfg.offline);
        assert_eq!(cfg.simulator.seed, Some(7));
        assert_eq!(cfg.simulator.log_capacity, 200);
        assert_eq!(cfg.simulator.auto_resolve_after_mins, 90);
    }

    #[test]
    fn bad_probability_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.simulator.spawn_probability = 1.5;
        assert!(validate(&cfg).is_err());
    }
}
