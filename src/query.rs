//! Query and status filtering over a registry snapshot

use crate::models::{Server, ServerStatus};

/// Status filter: everything, or one concrete status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ServerStatus),
}

impl StatusFilter {
    /// Options offered by the filter row
    pub const CHOICES: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(ServerStatus::Running),
        StatusFilter::Only(ServerStatus::Stopped),
        StatusFilter::Only(ServerStatus::Deploying),
    ];

    /// Header button cycle: all -> running -> stopped -> all
    pub fn cycle(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(ServerStatus::Running),
            StatusFilter::Only(ServerStatus::Running) => StatusFilter::Only(ServerStatus::Stopped),
            _ => StatusFilter::All,
        }
    }

    pub fn matches(self, status: ServerStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<ServerStatus>().map(StatusFilter::Only)
    }
}

fn matches_query(server: &Server, needle: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(needle);
    hit(&server.name)
        || hit(&server.provider)
        || hit(&server.region)
        || hit(&server.ip)
        || server.tags.iter().any(|t| hit(t))
}

/// Servers passing both the status filter and the free-text query, in
/// registry order. A blank query passes everything.
pub fn filter_servers(servers: &[Server], query: &str, filter: StatusFilter) -> Vec<Server> {
    let needle = query.trim().to_lowercase();
    servers
        .iter()
        .filter(|s| filter.matches(s.status))
        .filter(|s| needle.is_empty() || matches_query(s, &needle))
        .cloned()
        .collect()
}
