//! Fleet engine
//!
//! Owns the registry, random source, completion scheduler and store, and
//! runs everything against a simulated clock. Every mutation goes through
//! here, so a single `&mut Fleet` is the whole concurrency story.

use chrono::Utc;
use std::time::Duration;

use crate::config::FleetConfig;
use crate::lifecycle::Lifecycle;
use crate::models::{ProvisionRequest, Server};
use crate::query::{filter_servers, StatusFilter};
use crate::registry::Registry;
use crate::rng::{RandomSource, StdRandom};
use crate::scheduler::Scheduler;
use crate::seed::seed_servers;
use crate::simulator;
use crate::store::{self, Store};
use crate::summary::{summarize, FleetSummary};
use crate::Result;

pub struct Fleet {
    registry: Registry,
    scheduler: Scheduler,
    rng: Box<dyn RandomSource>,
    config: FleetConfig,
    store: Option<Store>,
    /// Simulated time since the engine started
    now: Duration,
    next_tick: Duration,
    saved_revision: Option<u64>,
}

impl Fleet {
    /// Engine over the seed fleet
    pub fn new(config: FleetConfig) -> Result<Self> {
        Self::with_servers(config, seed_servers())
    }

    /// Engine over the given records. Out-of-range gauges, bandwidth and
    /// tiers are repaired, and records caught mid-transition get a fresh
    /// completion scheduled.
    pub fn with_servers(config: FleetConfig, servers: Vec<Server>) -> Result<Self> {
        config.validate()?;
        let servers: Vec<Server> = servers
            .into_iter()
            .map(|server| server.normalized(config.bandwidth_cap))
            .collect();
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(StdRandom::seeded(seed)),
            None => Box::new(StdRandom::from_entropy()),
        };
        let mut fleet = Self {
            registry: Registry::from_servers(servers),
            scheduler: Scheduler::new(),
            rng,
            next_tick: config.tick_interval(),
            config,
            store: None,
            now: Duration::ZERO,
            saved_revision: None,
        };
        fleet.resume_transients();
        Ok(fleet)
    }

    /// Engine backed by a store. Absent or malformed data falls back to
    /// the seed fleet.
    pub fn open(config: FleetConfig, store: Store) -> Result<Self> {
        let servers = match store::load_servers(&store) {
            Some(servers) => servers,
            None => {
                tracing::info!("No usable fleet data, starting from seed");
                seed_servers()
            }
        };
        let mut fleet = Self::with_servers(config, servers)?;
        fleet.store = Some(store);
        fleet.persist();
        Ok(fleet)
    }

    /// Swap the random source
    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Current simulated time
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn servers(&self) -> &[Server] {
        self.registry.list()
    }

    pub fn get(&self, id: &str) -> Option<&Server> {
        self.registry.get(id)
    }

    pub fn revision(&self) -> u64 {
        self.registry.revision()
    }

    pub fn pending_completions(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Filtered projection, in registry order
    pub fn visible(&self, query: &str, filter: StatusFilter) -> Vec<Server> {
        filter_servers(self.registry.list(), query, filter)
    }

    pub fn summary(&self) -> FleetSummary {
        summarize(self.registry.list())
    }

    pub fn toggle_power(&mut self, id: &str) -> Option<Server> {
        let server = self.lifecycle().toggle_power(id);
        self.persist();
        server
    }

    pub fn reboot(&mut self, id: &str) -> Option<Server> {
        let server = self.lifecycle().reboot(id);
        self.persist();
        server
    }

    pub fn provision(&mut self, request: &ProvisionRequest) -> Result<Server> {
        let server = self.lifecycle().provision(request, Utc::now())?;
        self.persist();
        Ok(server)
    }

    /// One metrics pass, without moving the clock
    pub fn tick(&mut self) {
        simulator::tick(&mut self.registry, self.rng.as_mut(), self.config.bandwidth_cap);
        self.persist();
    }

    /// Move the simulated clock forward by `dt`, firing ticks and due
    /// completions in time order. Completions win ties with ticks.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.now + dt;
        loop {
            let completion = self.scheduler.next_due().filter(|due| *due <= target);
            let tick = Some(self.next_tick).filter(|at| *at <= target);
            match (completion, tick) {
                (Some(due), Some(at)) if due <= at => self.fire_due(due),
                (Some(due), None) => self.fire_due(due),
                (_, Some(at)) => {
                    self.now = at;
                    simulator::tick(&mut self.registry, self.rng.as_mut(), self.config.bandwidth_cap);
                    self.next_tick = at + self.config.tick_interval();
                }
                (None, None) => break,
            }
        }
        self.now = target;
        self.persist();
    }

    /// Advance until no completion is pending
    pub fn settle(&mut self) {
        while let Some(due) = self.scheduler.next_due() {
            self.advance(due.saturating_sub(self.now));
        }
    }

    /// Replace the fleet with the seed data
    pub fn reset(&mut self) {
        self.scheduler.cancel_all();
        self.registry = Registry::from_servers(seed_servers());
        self.saved_revision = None;
        self.persist();
        tracing::info!(servers = self.registry.len(), "Fleet reset to seed data");
    }

    /// Teardown: cancel pending completions and flush the store
    pub fn shutdown(&mut self) -> usize {
        let cancelled = self.scheduler.cancel_all();
        self.persist();
        cancelled
    }

    fn lifecycle(&mut self) -> Lifecycle<'_> {
        Lifecycle {
            registry: &mut self.registry,
            scheduler: &mut self.scheduler,
            rng: self.rng.as_mut(),
            config: &self.config,
            now: self.now,
        }
    }

    fn fire_due(&mut self, due: Duration) {
        self.now = due;
        for completion in self.scheduler.take_due(due) {
            self.lifecycle().complete(&completion);
        }
    }

    fn resume_transients(&mut self) {
        let transient: Vec<String> = self
            .registry
            .list()
            .iter()
            .filter(|s| s.status.is_transient())
            .map(|s| s.id.clone())
            .collect();
        for id in transient {
            self.lifecycle().resume_transient(&id);
        }
    }

    /// Write the fleet out if it changed since the last save
    fn persist(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        let revision = self.registry.revision();
        if self.saved_revision == Some(revision) {
            return;
        }
        match store::save_servers(store, self.registry.list()) {
            Ok(()) => self.saved_revision = Some(revision),
            Err(e) => tracing::warn!(error = %e, "Failed to persist fleet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServerStatus;

    fn test_fleet() -> Fleet {
        let config = FleetConfig::builder().seed(17).build();
        Fleet::new(config).unwrap()
    }

    fn first_with(fleet: &Fleet, status: ServerStatus) -> String {
        fleet
            .servers()
            .iter()
            .find(|s| s.status == status)
            .map(|s| s.id.clone())
            .unwrap()
    }

    #[test]
    fn test_fleet_rejects_invalid_config() {
        let config = FleetConfig::builder().tick_interval(Duration::ZERO).build();
        assert!(Fleet::new(config).is_err());
    }

    #[test]
    fn test_advance_fires_ticks_on_interval() {
        let mut fleet = test_fleet();
        let id = first_with(&fleet, ServerStatus::Running);
        let uptime = fleet.get(&id).unwrap().uptime_hours;

        fleet.advance(Duration::from_millis(4799));
        assert_eq!(fleet.get(&id).unwrap().uptime_hours, uptime);

        fleet.advance(Duration::from_millis(1));
        assert!((fleet.get(&id).unwrap().uptime_hours - (uptime + 0.2)).abs() < 1e-9);

        fleet.advance(Duration::from_millis(4800 * 3));
        assert!((fleet.get(&id).unwrap().uptime_hours - (uptime + 0.8)).abs() < 1e-9);
        assert_eq!(fleet.now(), Duration::from_millis(4800 * 4));
    }

    #[test]
    fn test_reboot_completes_after_delay() {
        let mut fleet = test_fleet();
        let id = first_with(&fleet, ServerStatus::Running);

        fleet.reboot(&id);
        fleet.advance(Duration::from_millis(2799));
        assert_eq!(fleet.get(&id).unwrap().status, ServerStatus::Restarting);

        fleet.advance(Duration::from_millis(1));
        let server = fleet.get(&id).unwrap();
        assert_eq!(server.status, ServerStatus::Running);
        assert_eq!(server.uptime_hours, 0.4);
        assert_eq!(fleet.pending_completions(), 0);
    }

    #[test]
    fn test_completion_before_tick_on_tie() {
        let config = FleetConfig::builder()
            .seed(1)
            .tick_interval(Duration::from_millis(1000))
            .reboot_delay(Duration::from_millis(1000))
            .build();
        let mut fleet = Fleet::new(config).unwrap();
        let id = first_with(&fleet, ServerStatus::Running);

        fleet.reboot(&id);
        fleet.advance(Duration::from_millis(1000));
        // completion set uptime to 0.4, then the tick at the same instant added 0.2
        assert!((fleet.get(&id).unwrap().uptime_hours - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_provision_then_settle() {
        let mut fleet = test_fleet();
        let request = ProvisionRequest::new("Hetzner", "Helsinki 1", "CPX31").name("worker");

        let server = fleet.provision(&request).unwrap();
        assert_eq!(fleet.servers()[0].id, server.id);
        assert_eq!(server.status, ServerStatus::Deploying);

        fleet.settle();
        assert_eq!(fleet.get(&server.id).unwrap().status, ServerStatus::Running);
        assert_eq!(fleet.now(), Duration::from_millis(3400));
    }

    #[test]
    fn test_transient_records_resume_on_load() {
        let mut servers = seed_servers();
        servers[0].status = ServerStatus::Restarting;
        servers[1].status = ServerStatus::Deploying;
        let config = FleetConfig::builder().seed(2).build();

        let mut fleet = Fleet::with_servers(config, servers.clone()).unwrap();
        assert_eq!(fleet.pending_completions(), 2);

        fleet.settle();
        assert_eq!(fleet.get(&servers[0].id).unwrap().status, ServerStatus::Running);
        assert_eq!(fleet.get(&servers[1].id).unwrap().status, ServerStatus::Running);
    }

    #[test]
    fn test_shutdown_cancels_pending() {
        let mut fleet = test_fleet();
        let id = first_with(&fleet, ServerStatus::Running);
        fleet.reboot(&id);
        fleet.provision(&ProvisionRequest::new("Vultr", "London", "CX22")).unwrap();

        assert_eq!(fleet.shutdown(), 2);
        assert_eq!(fleet.pending_completions(), 0);

        fleet.advance(Duration::from_secs(60));
        assert_eq!(fleet.get(&id).unwrap().status, ServerStatus::Restarting);
    }

    #[test]
    fn test_open_persists_changes() {
        let store = Store::in_memory();
        let config = FleetConfig::builder().seed(4).build();
        let mut fleet = Fleet::open(config.clone(), store.clone()).unwrap();
        assert!(store::load_servers(&store).is_some());

        let id = first_with(&fleet, ServerStatus::Stopped);
        fleet.toggle_power(&id);

        let reloaded = Fleet::open(config, store).unwrap();
        assert_eq!(reloaded.get(&id).unwrap().status, ServerStatus::Running);
    }

    #[test]
    fn test_reset_restores_seed() {
        let mut fleet = test_fleet();
        fleet.provision(&ProvisionRequest::new("Vultr", "London", "CX22")).unwrap();
        assert_eq!(fleet.servers().len(), seed_servers().len() + 1);

        fleet.reset();
        assert_eq!(fleet.servers().len(), seed_servers().len());
        assert_eq!(fleet.pending_completions(), 0);
    }
}
