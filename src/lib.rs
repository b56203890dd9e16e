//! Simulated VPS Fleet
//!
//! An engine for a simulated fleet of virtual private servers: a registry
//! of server records, a metrics simulator that drifts utilization on a
//! fixed tick, and a lifecycle controller for power toggling, reboots and
//! provisioning with delayed completions.
//!
//! # Key Features
//!
//! - **Deterministic when asked** - Inject a seeded or mocked random source
//! - **Simulated clock** - Ticks and delayed completions fire in time order
//! - **Pure views** - Filtering and fleet summaries recomputed on demand
//! - **Flat persistence** - One JSON array under one key
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use vps_fleet::{Fleet, FleetConfig, ProvisionRequest, StatusFilter};
//!
//! let mut fleet = Fleet::new(FleetConfig::default())?;
//!
//! let request = ProvisionRequest::new("Hetzner", "Frankfurt 1", "AX41-NVMe")
//!     .tags_csv("api, production");
//! let server = fleet.provision(&request)?;
//!
//! fleet.advance(Duration::from_secs(5));
//!
//! let running = fleet.visible("api", StatusFilter::All);
//! println!("{} servers, avg cpu {}%", running.len(), fleet.summary().avg_cpu);
//! # let _ = server;
//! # Ok::<(), vps_fleet::Error>(())
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod fleet;
pub mod lifecycle;
pub mod models;
pub mod query;
pub mod registry;
pub mod rng;
pub mod scheduler;
pub mod seed;
pub mod simulator;
pub mod store;
pub mod summary;

pub use config::FleetConfig;
pub use error::{Error, Result};
pub use fleet::Fleet;
pub use models::{ProvisionRequest, Server, ServerStatus, SupportTier};
pub use query::StatusFilter;
pub use registry::Registry;
pub use store::Store;
pub use summary::FleetSummary;
