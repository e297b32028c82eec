//! HTTP client for a live backend with a silent simulator fallback. Every
//! fetch tries the network first (unless offline mode is on) and degrades to
//! locally generated data when the backend is unreachable, so callers always
//! get an answer.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::config::AppConfig;
use crate::core::error::SentinelError;
use crate::core::types::{
    ActionRequest, ActionResult, LogEntry, LogFilter, SystemStats, Threat, ThreatFilter,
};
use crate::sim::runner::SharedSimulator;

#[derive(Debug, Deserialize)]
struct LogsResponse {
    logs: Vec<LogEntry>,
}

#[derive(Debug, Deserialize)]
struct ThreatsResponse {
    threats: Vec<Threat>,
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    offline: bool,
    sim: SharedSimulator,
}

impl ApiClient {
    pub fn new(config: &AppConfig, sim: SharedSimulator) -> Result<Self, SentinelError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(SentinelError::from)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            offline: config.offline,
            sim,
        })
    }

    pub async fn fetch_logs(&self, filter: &LogFilter) -> Vec<LogEntry> {
        if !self.offline {
            let url = format!("{}/api/logs", self.base_url);
            match self
                .get_json::<LogsResponse>(&url, &filter.to_query())
                .await
            {
                Ok(resp) => return resp.logs,
                Err(err) => warn!("log fetch failed, using simulated data: {}", err),
            }
        }
        let mut sim = self.sim.lock().expect("simulator mutex poisoned");
        sim.tick();
        filter.apply(sim.logs())
    }

    pub async fn fetch_threats(&self, filter: &ThreatFilter) -> Vec<Threat> {
        if !self.offline {
            let url = format!("{}/api/threats", self.base_url);
            match self
                .get_json::<ThreatsResponse>(&url, &filter.to_query())
                .await
            {
                Ok(resp) => return resp.threats,
                Err(err) => warn!("threat fetch failed, using simulated data: {}", err),
            }
        }
        let mut sim = self.sim.lock().expect("simulator mutex poisoned");
        sim.tick();
        filter.apply(sim.threats())
    }

    pub async fn fetch_stats(&self) -> SystemStats {
        if !self.offline {
            let url = format!("{}/api/stats", self.base_url);
            match self.get_json::<SystemStats>(&url, &[]).await {
                Ok(stats) => return stats,
                Err(err) => warn!("stats fetch failed, using simulated data: {}", err),
            }
        }
        let sim = self.sim.lock().expect("simulator mutex poisoned");
        sim.stats()
    }

    /// Response actions go to the backend when it is reachable; otherwise the
    /// transition is applied to the local registry so the workflow still
    /// completes end to end.
    pub async fn trigger_action(
        &self,
        request: &ActionRequest,
    ) -> Result<ActionResult, SentinelError> {
        if !self.offline {
            let url = format!(
                "{}/api/threats/{}/action",
                self.base_url, request.threat_id
            );
            let outcome = async {
                let resp = self
                    .client
                    .post(&url)
                    .json(request)
                    .send()
                    .await?
                    .error_for_status()?;
                resp.json::<ActionResult>().await.map_err(SentinelError::from)
            }
            .await;
            match outcome {
                Ok(result) => return Ok(result),
                Err(err) => warn!("action request failed, applying locally: {}", err),
            }
        }
        let note = request
            .parameters
            .get("note")
            .and_then(serde_json::Value::as_str);
        let mut sim = self.sim.lock().expect("simulator mutex poisoned");
        let threat = sim.apply_action(&request.threat_id, request.action_type, note)?;
        Ok(ActionResult {
            action_id: uuid::Uuid::new_v4().to_string(),
            threat_id: threat.id,
            status: "completed".to_string(),
            message: format!("{} applied locally", request.action_type.wire_name()),
            timestamp: crate::core::time::now_utc(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, SentinelError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        resp.json::<T>().await.map_err(SentinelError::from)
    }
}
