//! Per-agent stochastic network latency model.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Floor applied to every sampled delay, in seconds.
///
/// Keeps sub-millisecond profiles meaningful while ruling out zero or
/// negative delays when jitter swings below the base.
pub const MIN_LATENCY_SECS: f64 = 1e-6;

/// Lost packets are modelled as one retransmission round trip.
const RETRANSMIT_MULTIPLIER: f64 = 10.0;

/// Describes how long an agent's orders take to reach the engine.
///
/// All durations are seconds. Sampling is pure with respect to the
/// injected RNG: the engine supplies its seeded generator, so runs with
/// the same seed replay the same delays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyProfile {
    /// Typical one-way delay in seconds.
    pub base_latency: f64,
    /// Uniform jitter half-width in seconds.
    pub jitter: f64,
    /// Probability that a submission is "lost" and retransmitted.
    pub packet_loss_rate: f64,
}

impl LatencyProfile {
    /// Creates a profile with the given base latency, no jitter and no loss.
    #[must_use]
    pub fn new(base_latency: f64) -> Self {
        Self {
            base_latency: base_latency.max(0.0),
            jitter: 0.0,
            packet_loss_rate: 0.0,
        }
    }

    /// Sets the uniform jitter half-width.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.max(0.0);
        self
    }

    /// Sets the packet-loss probability, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_packet_loss(mut self, rate: f64) -> Self {
        self.packet_loss_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Samples a delay in seconds.
    ///
    /// With probability `packet_loss_rate` the result is `base_latency`
    /// times ten, modelling a retransmission; otherwise it is the base
    /// plus uniform jitter. Either way the result is clamped to
    /// [`MIN_LATENCY_SECS`].
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.packet_loss_rate > 0.0 && rng.gen_range(0.0..1.0) < self.packet_loss_rate {
            return (self.base_latency * RETRANSMIT_MULTIPLIER).max(MIN_LATENCY_SECS);
        }
        let jitter = if self.jitter > 0.0 {
            rng.gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        (self.base_latency + jitter).max(MIN_LATENCY_SECS)
    }
}

impl Default for LatencyProfile {
    /// 100 us base with 50 us jitter and no loss, a co-located-ish profile.
    fn default() -> Self {
        Self {
            base_latency: 1e-4,
            jitter: 5e-5,
            packet_loss_rate: 0.0,
        }
    }
}
