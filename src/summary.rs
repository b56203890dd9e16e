//! Fleet-wide summary, independent of any active filter

use serde::Serialize;

use crate::models::Server;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub active: usize,
    pub total: usize,
    /// Rounded mean CPU over running servers, 0 when none run
    pub avg_cpu: u8,
    pub monthly_spend: u64,
    pub alerts: u64,
}

pub fn summarize(servers: &[Server]) -> FleetSummary {
    let running: Vec<&Server> = servers.iter().filter(|s| s.is_running()).collect();
    let avg_cpu = if running.is_empty() {
        0
    } else {
        let sum: u64 = running.iter().map(|s| s.cpu_usage as u64).sum();
        (sum as f64 / running.len() as f64).round() as u8
    };

    FleetSummary {
        active: running.len(),
        total: servers.len(),
        avg_cpu,
        monthly_spend: servers.iter().map(|s| s.monthly_cost as u64).sum(),
        alerts: servers.iter().map(|s| s.alerts as u64).sum(),
    }
}
