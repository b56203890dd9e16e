//! Server model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound for bandwidth usage, in GB
pub const BANDWIDTH_CAP: f64 = 2048.0;

/// Monthly cost at which a server moves to premium support
pub const PREMIUM_COST_THRESHOLD: u32 = 50;

/// Status of a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// Powered on and reporting metrics
    Running,
    /// Powered off
    Stopped,
    /// Rebooting, returns to running on its own
    Restarting,
    /// Being provisioned, returns to running on its own
    Deploying,
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerStatus::Running => write!(f, "running"),
            ServerStatus::Stopped => write!(f, "stopped"),
            ServerStatus::Restarting => write!(f, "restarting"),
            ServerStatus::Deploying => write!(f, "deploying"),
        }
    }
}

impl std::str::FromStr for ServerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(ServerStatus::Running),
            "stopped" => Ok(ServerStatus::Stopped),
            "restarting" => Ok(ServerStatus::Restarting),
            "deploying" => Ok(ServerStatus::Deploying),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

impl ServerStatus {
    /// Transient states resolve to `Running` through a scheduled completion
    pub fn is_transient(self) -> bool {
        matches!(self, ServerStatus::Restarting | ServerStatus::Deploying)
    }
}

/// Support tier, derived from monthly cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportTier {
    Standard,
    Premium,
}

impl SupportTier {
    pub fn for_cost(monthly_cost: u32) -> Self {
        if monthly_cost >= PREMIUM_COST_THRESHOLD {
            SupportTier::Premium
        } else {
            SupportTier::Standard
        }
    }
}

impl std::fmt::Display for SupportTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupportTier::Standard => write!(f, "standard"),
            SupportTier::Premium => write!(f, "premium"),
        }
    }
}

/// A simulated virtual server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    pub provider: String,
    pub region: String,
    pub plan: String,
    /// IPv4-shaped address, fixed at creation
    pub ip: String,
    pub status: ServerStatus,
    /// CPU usage percentage
    pub cpu_usage: u8,
    /// Memory usage percentage
    pub memory_usage: u8,
    /// Disk usage percentage
    pub disk_usage: u8,
    /// Bandwidth used this month, in GB
    pub bandwidth_used: f64,
    pub uptime_hours: f64,
    pub alerts: u32,
    pub backups_enabled: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_backup_at: DateTime<Utc>,
    pub support_tier: SupportTier,
    pub monthly_cost: u32,
}

impl Server {
    pub fn is_running(&self) -> bool {
        self.status == ServerStatus::Running
    }

    /// Tier recomputed from the current cost
    pub fn derived_tier(&self) -> SupportTier {
        SupportTier::for_cost(self.monthly_cost)
    }

    /// Pull gauges, bandwidth and tier back inside their invariants.
    /// Used on records that did not come from the engine itself.
    pub fn normalized(self, bandwidth_cap: f64) -> Self {
        Server {
            cpu_usage: self.cpu_usage.min(100),
            memory_usage: self.memory_usage.min(100),
            disk_usage: self.disk_usage.min(100),
            bandwidth_used: clamp_bandwidth(self.bandwidth_used, bandwidth_cap),
            support_tier: self.derived_tier(),
            tags: normalize_tags(&self.tags),
            ..self
        }
    }
}

/// Clamp a gauge reading to a whole percentage
pub fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Clamp bandwidth to `[0, cap]`
pub fn clamp_bandwidth(value: f64, cap: f64) -> f64 {
    value.clamp(0.0, cap)
}

/// Normalize tags: trim, drop blanks, keep first occurrence of duplicates
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Parse comma-separated tag input
pub fn parse_tags(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}
