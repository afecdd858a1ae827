//! Multi-symbol matching engine: latency-scheduled submission, event
//! dispatch, statistics accounting and the background simulation driver.

mod core;
mod driver;
mod error;
mod events;
mod latency;
mod operations;
mod statistics;

pub use core::{EngineConfig, MatchingEngine};
pub use error::EngineError;
pub use latency::{LatencyProfile, MIN_LATENCY_SECS};
pub use operations::NOISE_AGENT_ID;
pub use statistics::EngineStatistics;
