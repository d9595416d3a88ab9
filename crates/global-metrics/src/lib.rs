//! Process-wide home for every `#[derive(prometheus_metric_storage::MetricStorage)]`
//! struct in the workspace. Each crate calls `Metrics::instance(global_metrics::get_metric_storage_registry())`
//! so every collector ends up registered on the one registry the metrics
//! server scrapes, regardless of which crate defined it.

use {once_cell::sync::Lazy, prometheus_metric_storage::StorageRegistry};

static METRIC_STORAGE_REGISTRY: Lazy<StorageRegistry> = Lazy::new(StorageRegistry::default);

pub fn get_metric_storage_registry() -> &'static StorageRegistry {
    &METRIC_STORAGE_REGISTRY
}
