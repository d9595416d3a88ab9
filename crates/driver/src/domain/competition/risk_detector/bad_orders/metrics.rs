use {
    crate::{
        domain::competition::{order::Uid, risk_detector::Quality},
        infra::{observe::metrics, solver},
    },
    dashmap::DashMap,
    model::time::now_in_epoch_seconds,
    std::{
        sync::{Arc, Weak},
        time::{Duration, Instant},
    },
};

#[derive(Debug)]
struct OrderStatistics {
    attempts: u32,
    fails: u32,
    flagged_unsupported_at: Option<Instant>,
    /// When an order was last seen in a solution. This
    /// timestamp is used to determine whether the order's
    /// metrics can be evicted from the cache to avoid bloat.
    last_seen_at: Instant,
}

/// Monitors orders to determine whether they are considered "unsupported" based
/// on the ratio of failing to total settlement encoding attempts. An order must
/// have participated in at least `REQUIRED_MEASUREMENTS` attempts to be
/// evaluated. If, at that point, the ratio of failures is greater than or equal
/// to `FAILURE_RATIO`, the order is considered unsupported.
#[derive(Clone)]
pub struct Detector {
    failure_ratio: f64,
    required_measurements: u32,
    counter: Arc<DashMap<Uid, OrderStatistics>>,
    log_only: bool,
    order_freeze_time: Duration,
    solver: solver::Name,
}

impl Detector {
    pub fn new(
        failure_ratio: f64,
        required_measurements: u32,
        log_only: bool,
        order_freeze_time: Duration,
        gc_interval: Duration,
        gc_max_age: Duration,
        solver: solver::Name,
    ) -> Self {
        let counter = Arc::new(DashMap::default());

        Self::spawn_gc_task(Arc::downgrade(&counter), gc_interval, gc_max_age);

        Self {
            failure_ratio,
            required_measurements,
            counter: counter.clone(),
            log_only,
            order_freeze_time,
            solver,
        }
    }

    pub fn get_quality(&self, order: &Uid, now: Instant) -> Quality {
        let Some(stats) = self.counter.get(order) else {
            return Quality::Unknown;
        };

        if stats
            .flagged_unsupported_at
            .is_some_and(|t| now.duration_since(t) > self.order_freeze_time)
        {
            // Sometimes tokens only cause issues temporarily. If the token's freeze
            // period expired we pretend we don't have enough information to give it
            // another chance. If it still behaves badly it will get frozen immediately.
            return Quality::Unknown;
        }

        match self.log_only {
            true => Quality::Supported,
            false => self.quality_based_on_stats(&stats),
        }
    }

    fn quality_based_on_stats(&self, stats: &OrderStatistics) -> Quality {
        if stats.attempts < self.required_measurements {
            return Quality::Unknown;
        }
        let token_failure_ratio = f64::from(stats.fails) / f64::from(stats.attempts);
        match token_failure_ratio >= self.failure_ratio {
            true => Quality::Unsupported,
            false => Quality::Supported,
        }
    }

    /// Updates the orders that participated in settlements by
    /// incrementing their attempt count.
    /// `failure` indicates whether the settlement was successful or not.
    pub fn update_orders(&self, orders: &[Uid], failure: bool) {
        let now = Instant::now();
        let mut new_unsupported_orders = vec![];
        orders.iter().for_each(|order| {
            let mut stats = self
                .counter
                .entry(*order)
                .and_modify(|counter| {
                    counter.attempts += 1;
                    counter.fails += u32::from(failure);
                    counter.last_seen_at = now;
                })
                .or_insert_with(|| OrderStatistics {
                    attempts: 1,
                    fails: u32::from(failure),
                    flagged_unsupported_at: None,
                    last_seen_at: now,
                });

            // order needs to be frozen as unsupported for a while
            if self.quality_based_on_stats(&stats) == Quality::Unsupported
                && stats
                    .flagged_unsupported_at
                    .is_none_or(|t| now.duration_since(t) > self.order_freeze_time)
            {
                new_unsupported_orders.push(order);
                stats.flagged_unsupported_at = Some(now);
            }
        });

        if !new_unsupported_orders.is_empty() {
            tracing::debug!(
                orders = ?new_unsupported_orders,
                "mark order as unsupported"
            );
            metrics::get()
                .bad_orders_detected
                .with_label_values(&[&self.solver.0])
                .inc_by(new_unsupported_orders.len() as u64);
        }
    }

    /// Spawns a background tasks that periodically evicts items from the cache
    /// that are no longer relevant to avoid bloat.
    fn spawn_gc_task(
        cache: Weak<DashMap<Uid, OrderStatistics>>,
        interval: Duration,
        max_age: Duration,
    ) {
        tokio::task::spawn(async move {
            let mut interval = tokio::time::interval(interval);
            while let Some(cache) = cache.upgrade() {
                let now = Instant::now();
                let now_as_unix = now_in_epoch_seconds();

                cache.retain(|uid, stats| {
                    uid.valid_to() > now_as_unix && now.duration_since(stats.last_seen_at) < max_age
                });
                interval.tick().await;
            }
            tracing::debug!("terminating gc task because cache was dropped");
        });
    }
}
