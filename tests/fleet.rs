//! Fleet behavior through the public API

use std::collections::HashSet;
use std::time::Duration;
use tempfile::TempDir;
use vps_fleet::models::{SupportTier, BANDWIDTH_CAP};
use vps_fleet::seed::seed_servers;
use vps_fleet::store::{self, STORAGE_KEY, STORE_FILE};
use vps_fleet::{Fleet, FleetConfig, ProvisionRequest, ServerStatus, StatusFilter, Store};

fn seeded_fleet(seed: u64) -> Fleet {
    Fleet::new(FleetConfig::builder().seed(seed).build()).unwrap()
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
fn metrics_stay_in_bounds_over_many_ticks() {
    let mut fleet = seeded_fleet(99);
    let before: Vec<_> = fleet.servers().to_vec();

    for _ in 0..500 {
        fleet.tick();
    }

    for (old, new) in before.iter().zip(fleet.servers()) {
        assert_eq!(old.id, new.id);
        assert!(new.cpu_usage <= 100);
        assert!(new.memory_usage <= 100);
        assert!(new.disk_usage <= 100);
        assert!(new.bandwidth_used >= 0.0 && new.bandwidth_used <= BANDWIDTH_CAP);
        if new.status != ServerStatus::Running {
            assert_eq!(old, new, "non-running server drifted");
        }
    }
}

#[test]
fn toggle_twice_returns_to_running() {
    let mut fleet = seeded_fleet(3);
    let id = first_with(&fleet, ServerStatus::Running);

    let stopped = fleet.toggle_power(&id).unwrap();
    assert_eq!(stopped.status, ServerStatus::Stopped);
    assert_eq!(stopped.cpu_usage, 0);
    assert_eq!(stopped.memory_usage, 0);
    assert_eq!(stopped.uptime_hours, 0.0);

    let running = fleet.toggle_power(&id).unwrap();
    assert_eq!(running.status, ServerStatus::Running);
    assert_eq!(running.uptime_hours, 0.2);
    assert!((35..55).contains(&running.cpu_usage));
    assert!((40..65).contains(&running.memory_usage));
}

#[test]
fn transient_servers_ignore_toggle_and_reboot() {
    let mut fleet = seeded_fleet(5);
    let id = first_with(&fleet, ServerStatus::Running);
    fleet.reboot(&id);
    let revision = fleet.revision();

    let toggled = fleet.toggle_power(&id).unwrap();
    assert_eq!(toggled.status, ServerStatus::Restarting);
    let rebooted = fleet.reboot(&id).unwrap();
    assert_eq!(rebooted.status, ServerStatus::Restarting);

    assert_eq!(fleet.revision(), revision);
    assert_eq!(fleet.pending_completions(), 1);
}

#[test]
fn unknown_id_is_a_no_op() {
    let mut fleet = seeded_fleet(5);
    let revision = fleet.revision();

    assert!(fleet.toggle_power("srv-missing").is_none());
    assert!(fleet.reboot("srv-missing").is_none());
    assert_eq!(fleet.revision(), revision);
    assert_eq!(fleet.pending_completions(), 0);
}

#[test]
fn reboot_completes_exactly_once() {
    let mut fleet = seeded_fleet(11);
    let id = first_with(&fleet, ServerStatus::Running);
    fleet.reboot(&id);

    fleet.advance(Duration::from_millis(2800));
    let server = fleet.get(&id).unwrap().clone();
    assert_eq!(server.status, ServerStatus::Running);
    assert_eq!(server.uptime_hours, 0.4);
    assert!((38..53).contains(&server.cpu_usage));
    assert!((42..60).contains(&server.memory_usage));
    assert_eq!(fleet.pending_completions(), 0);

    // stopping right after must not be undone by a stray completion
    fleet.toggle_power(&id);
    fleet.advance(Duration::from_secs(30));
    assert_eq!(fleet.get(&id).unwrap().status, ServerStatus::Stopped);
}

#[test]
fn provision_with_tags_then_complete() {
    let mut fleet = seeded_fleet(21);
    let total = fleet.servers().len();
    let request = ProvisionRequest::new("Hetzner", "Frankfurt 1", "AX41-NVMe")
        .tags_csv(" api , production, ,api");

    let server = fleet.provision(&request).unwrap();
    assert_eq!(fleet.servers().len(), total + 1);
    assert_eq!(fleet.servers()[0].id, server.id);
    assert!(server.id.starts_with("srv-"));
    assert_eq!(server.name, "New Instance • Frankfurt 1");
    assert_eq!(server.status, ServerStatus::Deploying);
    assert_eq!(server.monthly_cost, 58);
    assert_eq!(server.support_tier, SupportTier::Premium);
    assert_eq!(server.tags, vec!["api", "production"]);
    assert_eq!(server.disk_usage, 8);
    assert!(server.backups_enabled);

    let octets: Vec<u32> = server.ip.split('.').map(|o| o.parse().unwrap()).collect();
    assert_eq!(octets.len(), 4);
    assert!((10..=49).contains(&octets[0]));
    assert!(octets[1..].iter().all(|o| (10..=240).contains(o)));

    fleet.advance(Duration::from_millis(3400));
    let server = fleet.get(&server.id).unwrap();
    assert_eq!(server.status, ServerStatus::Running);
    assert_eq!(server.uptime_hours, 0.1);
}

#[test]
fn provision_frankfurt_defaults() {
    let mut fleet = seeded_fleet(2);
    let request = ProvisionRequest::new("Hetzner", "Frankfurt 1", "AX41-NVMe")
        .name("")
        .tags(Vec::<String>::new())
        .backups(true);

    let server = fleet.provision(&request).unwrap();
    assert_eq!(server.name, "New Instance • Frankfurt 1");
    assert_eq!(server.tags, vec!["new"]);
    assert_eq!(server.monthly_cost, 58);
    assert_eq!(server.support_tier, SupportTier::Premium);
    assert_eq!(server.status, ServerStatus::Deploying);
}

#[test]
fn provisioned_ids_are_unique() {
    let mut fleet = seeded_fleet(8);
    for _ in 0..50 {
        fleet
            .provision(&ProvisionRequest::new("Vultr", "Tokyo", "CPX31"))
            .unwrap();
    }

    let ids: HashSet<&str> = fleet.servers().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), fleet.servers().len());
}

#[test]
fn unknown_plan_uses_default_pricing() {
    let mut fleet = seeded_fleet(8);
    let request = ProvisionRequest::new("Linode", "Newark", "Mystery").name("  ");

    let server = fleet.provision(&request).unwrap();
    assert_eq!(server.monthly_cost, 32);
    assert_eq!(server.support_tier, SupportTier::Standard);
    assert_eq!(server.name, "New Instance • Newark");
    assert_eq!(server.tags, vec!["new"]);
}

#[test]
fn support_tier_follows_cost() {
    let fleet = seeded_fleet(1);
    for server in fleet.servers() {
        let expected = if server.monthly_cost >= 50 {
            SupportTier::Premium
        } else {
            SupportTier::Standard
        };
        assert_eq!(server.support_tier, expected, "{}", server.id);
    }
}

#[test]
fn visible_filters_by_status_and_query() {
    let fleet = seeded_fleet(1);

    assert_eq!(fleet.visible("", StatusFilter::All), fleet.servers());
    assert_eq!(fleet.visible("  ", StatusFilter::All), fleet.servers());

    let internal = fleet.visible("INTERNAL", StatusFilter::All);
    let ids: Vec<&str> = internal.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["srv-ewr-05", "srv-hel-06"]);

    let running_internal = fleet.visible("intern", StatusFilter::Only(ServerStatus::Running));
    assert_eq!(running_internal.len(), 1);
    assert_eq!(running_internal[0].id, "srv-hel-06");

    assert!(fleet.visible("no-such-thing", StatusFilter::All).is_empty());
}

#[test]
fn status_filter_cycle() {
    let mut filter = StatusFilter::All;
    filter = filter.cycle();
    assert_eq!(filter, StatusFilter::Only(ServerStatus::Running));
    filter = filter.cycle();
    assert_eq!(filter, StatusFilter::Only(ServerStatus::Stopped));
    filter = filter.cycle();
    assert_eq!(filter, StatusFilter::All);
}

#[test]
fn summary_ignores_active_filter() {
    let mut fleet = seeded_fleet(1);
    let summary = fleet.summary();
    assert_eq!(summary.total, 6);
    assert_eq!(summary.active, 4);
    assert_eq!(summary.monthly_spend, 236);
    assert_eq!(summary.alerts, 3);

    for id in fleet
        .servers()
        .iter()
        .filter(|s| s.is_running())
        .map(|s| s.id.clone())
        .collect::<Vec<_>>()
    {
        fleet.toggle_power(&id);
    }
    let summary = fleet.summary();
    assert_eq!(summary.active, 0);
    assert_eq!(summary.avg_cpu, 0);
}

#[test]
fn summary_of_one_running_one_stopped() {
    let seed = seed_servers();
    let servers = vec![seed[0].clone(), seed[2].clone()];
    let fleet = Fleet::with_servers(FleetConfig::default(), servers).unwrap();

    let summary = fleet.summary();
    assert_eq!(summary.active, 1);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.avg_cpu, 42);
}

#[test]
fn corrupt_store_falls_back_to_seed() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(STORE_FILE);
    std::fs::write(&path, "{ definitely not json").unwrap();

    let store = Store::open(&path).unwrap();
    let fleet = Fleet::open(FleetConfig::default(), store).unwrap();
    let ids: Vec<String> = fleet.servers().iter().map(|s| s.id.clone()).collect();
    let seed: Vec<String> = seed_servers().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, seed);
}

#[test]
fn malformed_value_falls_back_to_seed() {
    let store = Store::in_memory();
    store.set(STORAGE_KEY, r#"[{"id": 7}]"#).unwrap();

    let fleet = Fleet::open(FleetConfig::default(), store.clone()).unwrap();
    assert_eq!(fleet.servers().len(), seed_servers().len());
    assert_eq!(store::load_servers(&store).unwrap().len(), seed_servers().len());
}

#[test]
fn stored_records_are_repaired_on_load() {
    let mut servers = seed_servers();
    let stopped = servers.iter_mut().find(|s| s.id == "srv-nyc-03").unwrap();
    assert_eq!(stopped.status, ServerStatus::Stopped);
    stopped.disk_usage = 250;
    stopped.cpu_usage = 180;
    stopped.bandwidth_used = 9000.0;
    stopped.support_tier = SupportTier::Premium;

    let store = Store::in_memory();
    store::save_servers(&store, &servers).unwrap();

    let mut fleet = Fleet::open(FleetConfig::default(), store.clone()).unwrap();
    fleet.tick();

    let server = fleet.get("srv-nyc-03").unwrap();
    assert_eq!(server.monthly_cost, 12);
    assert_eq!(server.disk_usage, 100);
    assert_eq!(server.cpu_usage, 100);
    assert_eq!(server.bandwidth_used, BANDWIDTH_CAP);
    assert_eq!(server.support_tier, SupportTier::Standard);

    let saved = store::load_servers(&store).unwrap();
    let saved = saved.iter().find(|s| s.id == "srv-nyc-03").unwrap();
    assert_eq!(saved.support_tier, SupportTier::Standard);
    assert_eq!(saved.disk_usage, 100);
}

#[test]
fn fleet_survives_reopen_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(STORE_FILE);
    let config = FleetConfig::builder().seed(12).build();

    let id = {
        let mut fleet = Fleet::open(config.clone(), Store::open(&path).unwrap()).unwrap();
        let server = fleet
            .provision(&ProvisionRequest::new("DigitalOcean", "Amsterdam 3", "General 8GB"))
            .unwrap();
        server.id
    };

    let mut fleet = Fleet::open(config, Store::open(&path).unwrap()).unwrap();
    assert_eq!(fleet.servers()[0].id, id);
    assert_eq!(fleet.get(&id).unwrap().status, ServerStatus::Deploying);
    assert_eq!(fleet.pending_completions(), 1);

    fleet.settle();
    assert_eq!(fleet.get(&id).unwrap().status, ServerStatus::Running);
}

#[test]
fn shutdown_leaves_nothing_pending() {
    let mut fleet = seeded_fleet(6);
    let id = first_with(&fleet, ServerStatus::Running);
    fleet.reboot(&id);
    fleet
        .provision(&ProvisionRequest::new("Hetzner", "Helsinki 1", "CX22"))
        .unwrap();

    assert_eq!(fleet.shutdown(), 2);
    assert_eq!(fleet.pending_completions(), 0);
    assert_eq!(fleet.shutdown(), 0);
}
