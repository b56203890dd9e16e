//! Static seed fleet, used when nothing usable is persisted

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{resolve_plan, Server, ServerStatus, SupportTier};

struct SeedRow {
    id: &'static str,
    name: &'static str,
    provider: &'static str,
    region: &'static str,
    plan: &'static str,
    ip: &'static str,
    status: ServerStatus,
    cpu: u8,
    memory: u8,
    disk: u8,
    bandwidth: f64,
    uptime: f64,
    alerts: u32,
    backups: bool,
    tags: &'static [&'static str],
    age_days: i64,
    backup_age_hours: i64,
}

const SEED: &[SeedRow] = &[
    SeedRow {
        id: "srv-fra-01",
        name: "api-gateway",
        provider: "Hetzner",
        region: "Frankfurt 1",
        plan: "AX41-NVMe",
        ip: "23.88.41.120",
        status: ServerStatus::Running,
        cpu: 42,
        memory: 61,
        disk: 48,
        bandwidth: 812.4,
        uptime: 1420.6,
        alerts: 0,
        backups: true,
        tags: &["production", "api"],
        age_days: 210,
        backup_age_hours: 6,
    },
    SeedRow {
        id: "srv-ams-02",
        name: "postgres-primary",
        provider: "DigitalOcean",
        region: "Amsterdam 3",
        plan: "General 8GB",
        ip: "46.101.22.87",
        status: ServerStatus::Running,
        cpu: 67,
        memory: 78,
        disk: 71,
        bandwidth: 1203.9,
        uptime: 980.2,
        alerts: 2,
        backups: true,
        tags: &["production", "database"],
        age_days: 180,
        backup_age_hours: 2,
    },
    SeedRow {
        id: "srv-nyc-03",
        name: "staging-web",
        provider: "DigitalOcean",
        region: "New York 3",
        plan: "Basic 2GB",
        ip: "34.201.17.44",
        status: ServerStatus::Stopped,
        cpu: 0,
        memory: 0,
        disk: 33,
        bandwidth: 96.0,
        uptime: 0.0,
        alerts: 0,
        backups: false,
        tags: &["staging", "web"],
        age_days: 45,
        backup_age_hours: 72,
    },
    SeedRow {
        id: "srv-tyo-04",
        name: "edge-cache",
        provider: "Vultr",
        region: "Tokyo",
        plan: "CPX31",
        ip: "45.77.13.201",
        status: ServerStatus::Running,
        cpu: 23,
        memory: 39,
        disk: 18,
        bandwidth: 1877.5,
        uptime: 312.8,
        alerts: 1,
        backups: true,
        tags: &["edge", "cdn"],
        age_days: 30,
        backup_age_hours: 20,
    },
    SeedRow {
        id: "srv-ewr-05",
        name: "ci-runner",
        provider: "Linode",
        region: "Newark",
        plan: "Dedicated 16GB",
        ip: "17.139.210.66",
        status: ServerStatus::Stopped,
        cpu: 0,
        memory: 0,
        disk: 56,
        bandwidth: 402.3,
        uptime: 0.0,
        alerts: 0,
        backups: false,
        tags: &["ci", "internal"],
        age_days: 90,
        backup_age_hours: 240,
    },
    SeedRow {
        id: "srv-hel-06",
        name: "monitoring",
        provider: "Hetzner",
        region: "Helsinki 1",
        plan: "CX22",
        ip: "37.27.190.12",
        status: ServerStatus::Running,
        cpu: 12,
        memory: 44,
        disk: 27,
        bandwidth: 155.0,
        uptime: 2210.4,
        alerts: 0,
        backups: true,
        tags: &["internal", "observability"],
        age_days: 365,
        backup_age_hours: 12,
    },
];

/// Seed fleet anchored at the current time
pub fn seed_servers() -> Vec<Server> {
    seed_servers_at(Utc::now())
}

/// Seed fleet with timestamps relative to `now`
pub fn seed_servers_at(now: DateTime<Utc>) -> Vec<Server> {
    SEED.iter()
        .map(|row| {
            let cost = resolve_plan(row.plan).monthly_cost;
            Server {
                id: row.id.to_string(),
                name: row.name.to_string(),
                provider: row.provider.to_string(),
                region: row.region.to_string(),
                plan: row.plan.to_string(),
                ip: row.ip.to_string(),
                status: row.status,
                cpu_usage: row.cpu,
                memory_usage: row.memory,
                disk_usage: row.disk,
                bandwidth_used: row.bandwidth,
                uptime_hours: row.uptime,
                alerts: row.alerts,
                backups_enabled: row.backups,
                tags: row.tags.iter().map(|t| t.to_string()).collect(),
                created_at: now - TimeDelta::days(row.age_days),
                last_backup_at: now - TimeDelta::hours(row.backup_age_hours),
                support_tier: SupportTier::for_cost(cost),
                monthly_cost: cost,
            }
        })
        .collect()
}
