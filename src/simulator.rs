//! Metrics simulator
//!
//! One tick nudges the gauges, bandwidth and uptime of every running
//! server. Stopped and transient servers are left alone.

use crate::models::{clamp_bandwidth, clamp_percent, Server};
use crate::registry::Registry;
use crate::rng::RandomSource;

/// Symmetric jitter spread per gauge
pub const CPU_JITTER: f64 = 5.0;
pub const MEMORY_JITTER: f64 = 4.0;
pub const DISK_JITTER: f64 = 2.0;
/// Maximum bandwidth added per tick, in GB
pub const BANDWIDTH_STEP: f64 = 18.0;
/// Uptime added per tick, in hours
pub const UPTIME_STEP: f64 = 0.2;

/// Drift a single running server by one tick
pub fn drift(server: Server, rng: &mut dyn RandomSource, bandwidth_cap: f64) -> Server {
    if !server.is_running() {
        return server;
    }
    let cpu = server.cpu_usage as f64 + rng.uniform(-CPU_JITTER, CPU_JITTER);
    let memory = server.memory_usage as f64 + rng.uniform(-MEMORY_JITTER, MEMORY_JITTER);
    let disk = server.disk_usage as f64 + rng.uniform(-DISK_JITTER, DISK_JITTER);
    let bandwidth = server.bandwidth_used + rng.uniform(0.0, BANDWIDTH_STEP);

    Server {
        cpu_usage: clamp_percent(cpu),
        memory_usage: clamp_percent(memory),
        disk_usage: clamp_percent(disk),
        uptime_hours: server.uptime_hours + UPTIME_STEP,
        bandwidth_used: clamp_bandwidth(bandwidth, bandwidth_cap),
        ..server
    }
}

/// Apply one tick to the whole registry
pub fn tick(registry: &mut Registry, rng: &mut dyn RandomSource, bandwidth_cap: f64) {
    registry.update_all(|server| drift(server, &mut *rng, bandwidth_cap));
    tracing::debug!(revision = registry.revision(), "Metrics tick applied");
}
