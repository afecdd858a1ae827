//! Optional background loop advancing simulated time.

use super::core::{MatchingEngine, lock};
use super::operations::drain_state;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

/// Target drain cadence at simulation speed 1.0.
const DRIVER_TICK_SECS: f64 = 0.001;

impl MatchingEngine {
    /// Starts the simulation driver: a dedicated thread that drains the
    /// engine on a roughly one millisecond cadence divided by the
    /// configured simulation speed. A second call while running is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let tick = Duration::from_secs_f64(DRIVER_TICK_SECS / self.simulation_speed);
        let spawned = thread::Builder::new()
            .name("matchbook-driver".to_string())
            .spawn(move || {
                info!("simulation driver started");
                while running.load(Ordering::SeqCst) {
                    drain_state(&state);
                    thread::sleep(tick);
                }
                info!("simulation driver stopped");
            });

        match spawned {
            Ok(handle) => {
                *lock(&self.driver) = Some(handle);
            }
            Err(err) => {
                error!("failed to spawn simulation driver: {err}");
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Signals the driver to stop and joins it. A call while stopped is a
    /// no-op.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = lock(&self.driver).take() {
            let _ = handle.join();
        }
    }

    /// Whether the simulation driver is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for MatchingEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
