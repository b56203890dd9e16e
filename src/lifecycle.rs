//! Lifecycle controller
//!
//! Power toggle, reboot and provisioning. Unknown ids and forbidden states
//! degrade to no-ops. Reboot and provision leave the server in a transient
//! state and schedule exactly one completion back to `Running`.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::config::FleetConfig;
use crate::models::{
    clamp_bandwidth, clamp_percent, resolve_plan, ProvisionRequest, Server, ServerStatus,
    SupportTier,
};
use crate::registry::Registry;
use crate::rng::{int_inclusive, offset_floor, RandomSource};
use crate::scheduler::{Completion, CompletionKind, Scheduler};
use crate::Result;

/// Bandwidth credited back when a server is powered off
const POWER_OFF_BANDWIDTH_REFUND: f64 = 15.0;

/// Disk usage of a freshly provisioned server
const FRESH_DISK_USAGE: u8 = 8;

/// Mutable view over the engine parts a lifecycle operation touches
pub struct Lifecycle<'a> {
    pub registry: &'a mut Registry,
    pub scheduler: &'a mut Scheduler,
    pub rng: &'a mut dyn RandomSource,
    pub config: &'a FleetConfig,
    /// Current simulated time
    pub now: Duration,
}

impl<'a> Lifecycle<'a> {
    /// Flip `Running` <-> `Stopped`. Transient servers are left alone.
    pub fn toggle_power(&mut self, id: &str) -> Option<Server> {
        let rng = &mut *self.rng;
        let cap = self.config.bandwidth_cap;
        let before = self.registry.get(id)?.status;

        let server = self.registry.upsert(id, |server| match server.status {
            ServerStatus::Running => Server {
                status: ServerStatus::Stopped,
                cpu_usage: 0,
                memory_usage: 0,
                uptime_hours: 0.0,
                bandwidth_used: clamp_bandwidth(
                    server.bandwidth_used - POWER_OFF_BANDWIDTH_REFUND,
                    cap,
                ),
                ..server
            },
            ServerStatus::Stopped => Server {
                status: ServerStatus::Running,
                uptime_hours: 0.2,
                cpu_usage: clamp_percent(offset_floor(rng, 35.0, 20.0)),
                memory_usage: clamp_percent(offset_floor(rng, 40.0, 25.0)),
                ..server
            },
            ServerStatus::Restarting | ServerStatus::Deploying => server,
        })?;

        if server.status != before {
            tracing::info!(server = %id, from = %before, to = %server.status, "Power toggled");
        } else {
            tracing::debug!(server = %id, status = %before, "Power toggle ignored");
        }
        Some(server)
    }

    /// Send a running server into `Restarting` and schedule its return
    pub fn reboot(&mut self, id: &str) -> Option<Server> {
        let current = self.registry.get(id)?;
        if current.status != ServerStatus::Running {
            tracing::debug!(server = %id, status = %current.status, "Reboot ignored");
            return Some(current.clone());
        }

        let server = self.registry.upsert(id, |server| Server {
            status: ServerStatus::Restarting,
            ..server
        })?;
        self.scheduler.schedule(
            id,
            CompletionKind::Reboot,
            self.now + self.config.reboot_delay(),
        );
        tracing::info!(server = %id, "Reboot started");
        Some(server)
    }

    /// Create a deploying server at the front of the registry
    pub fn provision(&mut self, request: &ProvisionRequest, created_at: DateTime<Utc>) -> Result<Server> {
        let plan = resolve_plan(&request.plan);
        let id = self.fresh_id();
        let ip = self.synthetic_ip();

        let server = Server {
            id: id.clone(),
            name: request.resolved_name(),
            provider: request.provider.clone(),
            region: request.region.clone(),
            plan: request.plan.clone(),
            ip,
            status: ServerStatus::Deploying,
            cpu_usage: 0,
            memory_usage: 0,
            disk_usage: FRESH_DISK_USAGE,
            bandwidth_used: 0.0,
            uptime_hours: 0.0,
            alerts: 0,
            backups_enabled: request.backups_enabled,
            tags: request.resolved_tags(),
            created_at,
            last_backup_at: created_at,
            support_tier: SupportTier::for_cost(plan.monthly_cost),
            monthly_cost: plan.monthly_cost,
        };

        self.registry.insert_front(server.clone())?;
        self.scheduler.schedule(
            &id,
            CompletionKind::Provision,
            self.now + self.config.provision_delay(),
        );
        tracing::info!(
            server = %id,
            provider = %server.provider,
            region = %server.region,
            plan = %server.plan,
            cost = server.monthly_cost,
            "Provisioning started"
        );
        Ok(server)
    }

    /// Schedule a completion for a server persisted mid-transition
    pub fn resume_transient(&mut self, id: &str) -> bool {
        let Some(server) = self.registry.get(id) else {
            return false;
        };
        let (kind, delay) = match server.status {
            ServerStatus::Restarting => (CompletionKind::Reboot, self.config.reboot_delay()),
            ServerStatus::Deploying => (CompletionKind::Provision, self.config.provision_delay()),
            _ => return false,
        };
        if !self.scheduler.pending_for(id).is_empty() {
            return false;
        }
        self.scheduler.schedule(id, kind, self.now + delay);
        tracing::info!(server = %id, kind = %kind, "Resumed interrupted transition");
        true
    }

    /// Fire a due completion. No-op if the server has gone away.
    pub fn complete(&mut self, completion: &Completion) -> Option<Server> {
        let rng = &mut *self.rng;
        let server = match completion.kind {
            CompletionKind::Reboot => self.registry.upsert(&completion.server_id, |server| Server {
                status: ServerStatus::Running,
                uptime_hours: 0.4,
                cpu_usage: clamp_percent(offset_floor(rng, 38.0, 15.0)),
                memory_usage: clamp_percent(offset_floor(rng, 42.0, 18.0)),
                ..server
            }),
            CompletionKind::Provision => {
                self.registry.upsert(&completion.server_id, |server| Server {
                    status: ServerStatus::Running,
                    uptime_hours: 0.1,
                    cpu_usage: clamp_percent(offset_floor(rng, 30.0, 18.0)),
                    memory_usage: clamp_percent(offset_floor(rng, 35.0, 22.0)),
                    ..server
                })
            }
        };

        match &server {
            Some(_) => {
                tracing::info!(server = %completion.server_id, kind = %completion.kind, "Server running")
            }
            None => {
                tracing::debug!(server = %completion.server_id, kind = %completion.kind, "Completion for missing server")
            }
        }
        server
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let mut bytes = [0u8; 16];
            self.rng.fill_bytes(&mut bytes);
            let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
            let id = format!("srv-{}", uuid);
            if !self.registry.contains(&id) {
                return id;
            }
        }
    }

    fn synthetic_ip(&mut self) -> String {
        let rng = &mut *self.rng;
        format!(
            "{}.{}.{}.{}",
            int_inclusive(rng, 10, 49),
            int_inclusive(rng, 10, 240),
            int_inclusive(rng, 10, 240),
            int_inclusive(rng, 10, 240),
        )
    }
}
