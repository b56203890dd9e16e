//! Provisioning request

use serde::{Deserialize, Serialize};

use super::server::{normalize_tags, parse_tags};

/// Payload for provisioning a new server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProvisionRequest {
    pub name: String,
    pub provider: String,
    pub region: String,
    pub plan: String,
    pub tags: Vec<String>,
    pub backups_enabled: bool,
}

impl ProvisionRequest {
    pub fn new(
        provider: impl Into<String>,
        region: impl Into<String>,
        plan: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            region: region.into(),
            plan: plan.into(),
            backups_enabled: true,
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    /// Tags from comma-separated form input
    pub fn tags_csv(mut self, input: &str) -> Self {
        self.tags = parse_tags(input);
        self
    }

    pub fn backups(mut self, enabled: bool) -> Self {
        self.backups_enabled = enabled;
        self
    }

    /// Name to give the server, defaulting blank input
    pub fn resolved_name(&self) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            format!("New Instance • {}", self.region)
        } else {
            name.to_string()
        }
    }

    /// Tags to give the server, defaulting to `["new"]`
    pub fn resolved_tags(&self) -> Vec<String> {
        let tags = normalize_tags(&self.tags);
        if tags.is_empty() {
            vec!["new".to_string()]
        } else {
            tags
        }
    }
}
