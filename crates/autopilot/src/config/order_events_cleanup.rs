use {
    serde::{Deserialize, Serialize},
    std::time::Duration,
};

fn default_cleanup_interval() -> Duration {
    Duration::from_secs(86400) // 1d
}

fn default_cleanup_threshold() -> Duration {
    Duration::from_secs(2592000) // 30d
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OrderEventsCleanupConfig {
    /// Time interval between each cleanup operation of the `order_events`
    /// database table.
    #[serde(with = "humantime_serde", default = "default_cleanup_interval")]
    pub cleanup_interval: Duration,

    /// Age threshold for order events to be eligible for cleanup in the
    /// `order_events` database table.
    #[serde(with = "humantime_serde", default = "default_cleanup_threshold")]
    pub cleanup_threshold: Duration,
}

impl Default for OrderEventsCleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: default_cleanup_interval(),
            cleanup_threshold: default_cleanup_threshold(),
        }
    }
}
