//! Fleet configuration with builder pattern

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::models::BANDWIDTH_CAP;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Interval between metric ticks
    pub tick_interval_ms: u64,
    /// Delay before a rebooting server is running again
    pub reboot_delay_ms: u64,
    /// Delay before a deploying server is running
    pub provision_delay_ms: u64,
    /// Bandwidth ceiling in GB
    pub bandwidth_cap: f64,
    /// Fixed seed for reproducible simulations
    pub seed: Option<u64>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 4800,
            reboot_delay_ms: 2800,
            provision_delay_ms: 3400,
            bandwidth_cap: BANDWIDTH_CAP,
            seed: None,
        }
    }
}

impl FleetConfig {
    pub fn builder() -> FleetConfigBuilder {
        FleetConfigBuilder::default()
    }

    /// Load from a TOML file; missing keys keep their defaults
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FleetConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(crate::Error::Config("tick_interval_ms must be positive".into()));
        }
        if self.reboot_delay_ms == 0 {
            return Err(crate::Error::Config("reboot_delay_ms must be positive".into()));
        }
        if self.provision_delay_ms == 0 {
            return Err(crate::Error::Config("provision_delay_ms must be positive".into()));
        }
        if self.bandwidth_cap.is_nan() || self.bandwidth_cap <= 0.0 {
            return Err(crate::Error::Config("bandwidth_cap must be positive".into()));
        }
        if self.bandwidth_cap > BANDWIDTH_CAP {
            return Err(crate::Error::Config(format!(
                "bandwidth_cap must not exceed {}",
                BANDWIDTH_CAP
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn reboot_delay(&self) -> Duration {
        Duration::from_millis(self.reboot_delay_ms)
    }

    pub fn provision_delay(&self) -> Duration {
        Duration::from_millis(self.provision_delay_ms)
    }
}

#[derive(Default)]
pub struct FleetConfigBuilder {
    config: FleetConfig,
}

impl FleetConfigBuilder {
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn reboot_delay(mut self, delay: Duration) -> Self {
        self.config.reboot_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn provision_delay(mut self, delay: Duration) -> Self {
        self.config.provision_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn bandwidth_cap(mut self, cap: f64) -> Self {
        self.config.bandwidth_cap = cap;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> FleetConfig {
        self.config
    }

    pub fn build_validated(self) -> crate::Result<FleetConfig> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
