//! Background driver for a shared simulator. Runs the generation tick and the
//! auto-resolve sweep on independent tokio intervals and stops cleanly on
//! demand.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::SimulatorConfig;
use crate::sim::TelemetrySimulator;

pub type SharedSimulator = Arc<Mutex<TelemetrySimulator>>;

pub fn shared(sim: TelemetrySimulator) -> SharedSimulator {
    Arc::new(Mutex::new(sim))
}

pub struct SimulatorRunner {
    sim: SharedSimulator,
    generation_period: Duration,
    sweep_period: Duration,
    shutdown: Option<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

impl SimulatorRunner {
    pub fn new(sim: SharedSimulator, cfg: &SimulatorConfig) -> Self {
        Self {
            sim,
            generation_period: Duration::from_secs(cfg.generation_period_secs),
            sweep_period: Duration::from_secs(cfg.sweep_period_secs),
            shutdown: None,
            tasks: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_some()
    }

    /// Spawn the tick and sweep loops. Calling `start` on a running runner is
    /// a no-op.
    pub fn start(&mut self) {
        if self.shutdown.is_some() {
            return;
        }
        let (tx, rx) = watch::channel(false);

        let sim = self.sim.clone();
        let mut rx_tick = rx.clone();
        let period = self.generation_period;
        self.tasks.push(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        sim.lock().expect("simulator mutex poisoned").tick();
                    }
                    _ = rx_tick.changed() => break,
                }
            }
            tracing::debug!("generation loop stopped");
        }));

        let sim = self.sim.clone();
        let mut rx_sweep = rx;
        let period = self.sweep_period;
        self.tasks.push(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let mut guard = sim.lock().expect("simulator mutex poisoned");
                        guard.sync_clock(crate::core::time::now_utc());
                        guard.sweep();
                    }
                    _ = rx_sweep.changed() => break,
                }
            }
            tracing::debug!("sweep loop stopped");
        }));

        self.shutdown = Some(tx);
        tracing::info!(
            "simulator runner started (tick every {:?}, sweep every {:?})",
            self.generation_period,
            self.sweep_period
        );
    }

    /// Signal both loops and wait for them to finish. Idempotent.
    pub async fn stop(&mut self) {
        let Some(tx) = self.shutdown.take() else {
            return;
        };
        let _ = tx.send(true);
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        tracing::info!("simulator runner stopped");
    }
}

impl Drop for SimulatorRunner {
    fn drop(&mut self) {
        // Abort rather than await; Drop cannot be async. A graceful shutdown
        // goes through `stop`.
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}
