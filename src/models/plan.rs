//! Plan catalog, providers and regions

use serde::Serialize;

/// A hosting plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub name: &'static str,
    /// Monthly cost in whole currency units
    pub monthly_cost: u32,
    pub cpu_count: u32,
    /// Memory in GB
    pub memory_gb: u32,
}

/// Used when a requested plan is not in the catalog
pub const DEFAULT_PLAN: Plan = Plan {
    name: "Custom",
    monthly_cost: 32,
    cpu_count: 2,
    memory_gb: 4,
};

pub const PLANS: &[Plan] = &[
    Plan { name: "CX22", monthly_cost: 6, cpu_count: 2, memory_gb: 4 },
    Plan { name: "CPX31", monthly_cost: 16, cpu_count: 4, memory_gb: 8 },
    Plan { name: "Basic 2GB", monthly_cost: 12, cpu_count: 1, memory_gb: 2 },
    Plan { name: "General 8GB", monthly_cost: 48, cpu_count: 2, memory_gb: 8 },
    Plan { name: "AX41-NVMe", monthly_cost: 58, cpu_count: 6, memory_gb: 64 },
    Plan { name: "Dedicated 16GB", monthly_cost: 96, cpu_count: 8, memory_gb: 16 },
];

pub const PROVIDERS: &[&str] = &["Hetzner", "DigitalOcean", "Vultr", "Linode"];

/// Regions offered by a provider, empty for unknown providers
pub fn regions_for(provider: &str) -> &'static [&'static str] {
    match provider {
        "Hetzner" => &["Falkenstein 1", "Nuremberg 1", "Frankfurt 1", "Helsinki 1", "Ashburn 1"],
        "DigitalOcean" => &["New York 3", "Amsterdam 3", "Frankfurt 1", "Singapore 1"],
        "Vultr" => &["Chicago", "Los Angeles", "London", "Tokyo"],
        "Linode" => &["Newark", "Atlanta", "Frankfurt", "Sydney"],
        _ => &[],
    }
}

/// Look up a plan by exact name
pub fn find_plan(name: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|p| p.name == name)
}

/// Look up a plan, falling back to [`DEFAULT_PLAN`]
pub fn resolve_plan(name: &str) -> Plan {
    find_plan(name).copied().unwrap_or(DEFAULT_PLAN)
}
