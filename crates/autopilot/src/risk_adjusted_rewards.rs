//! Implementation of CIP-14 risk adjusted solver rewards as described in https://forum.cow.fi/t/cip-14-risk-adjusted-solver-rewards/1132 .
//!
//! Note slight differences in the formulas due conversion of units (gas, gas
//! price, COW to ETH) that are glossed over in the CIP.
//!
//! This module uses argument structs in order to better document and
//! differentiate many arguments of the type f64 where it would be easy to mix
//! them up when calling the function.

use {
    crate::database::Postgres,
    anyhow::{ensure, Context, Result},
    database::orders::Quote,
    futures::StreamExt,
    gas_estimation::GasPriceEstimating,
    model::order::{Order, OrderClass, OrderUid},
    primitive_types::H160,
    shared::price_estimation::native::{NativePriceEstimateResult, NativePriceEstimating},
    std::{
        sync::{Arc, Mutex},
        time::{Duration, Instant},
    },
};

#[derive(Copy, Clone, Debug, Default)]
pub struct Configuration {
    pub beta: f64,
    pub alpha1: f64,
    pub alpha2: f64,
    /// T, in COW base units
    pub profit: f64,
    /// in gas units
    pub gas_cap: f64,
    /// in COW base units
    pub reward_cap: f64,
}

pub struct Calculator {
    config: Configuration,
    database: Postgres,
    gas_price: Arc<dyn GasPriceEstimating>,
    native_price: BestEffortCowPriceEstimator,
}

impl Calculator {
    /// Time limit for CoW token price cached in [BestEffortCowPriceEstimator].
    /// Hardcoded to avoid bloating the service configuration.
    const COW_PRICE_MAX_AGE: Duration = Duration::from_secs(10 * 60);

    pub fn new(
        config: Configuration,
        database: Postgres,
        cow_token: H160,
        gas_price: Arc<dyn GasPriceEstimating>,
        native_price: Arc<dyn NativePriceEstimating>,
    ) -> Self {
        Self {
            config,
            database,
            gas_price,
            native_price: BestEffortCowPriceEstimator::new(
                native_price,
                cow_token,
                Self::COW_PRICE_MAX_AGE,
            ),
        }
    }

    /// Returns the rewards in COW base units for several orders.
    ///
    /// An outer error indicates that no reward calculations were performed.
    ///
    /// An inner error indicates that the reward for this order could not be
    /// calculated.
    ///
    /// The Ok-Vec has the same number of elements as the input orders-slice.
    /// Each element corresponds to the order at the same index.
    pub async fn calculate_many(&self, orders: &[Order]) -> Result<Vec<Result<f64>>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let gas_price = async {
            Ok(self
                .gas_price
                .estimate()
                .await
                .context("gas price")?
                .effective_gas_price())
        };
        let cow_price = async {
            self.native_price
                .get_price(Instant::now())
                .await
                .context("cow native price")
        };
        let (gas_price, cow_price) = futures::future::try_join(gas_price, cow_price).await?;
        tracing::trace!("gas_price={gas_price:.2e} cow_price={cow_price:.2e}");
        Ok(futures::stream::iter(orders)
            .then(|order| async {
                if order.metadata.class == OrderClass::Liquidity || order.data.partially_fillable {
                    return Ok(0.);
                }
                let quote = self
                    .quote(&order.metadata.uid)
                    .await?
                    .context("missing quote")?;
                capped_reward_cow(
                    self.config,
                    CappedCowArgs {
                        gas: quote.gas_amount,
                        gas_price,
                        cow_price,
                    },
                )
            })
            .collect()
            .await)
    }

    async fn quote(&self, order: &OrderUid) -> Result<Option<Quote>, sqlx::Error> {
        let mut ex = self.database.0.acquire().await?;
        database::orders::read_quote(&mut ex, &database::byte_array::ByteArray(order.0)).await
    }
}

const COW_BASE: f64 = 1e18;

#[derive(Copy, Clone, Debug)]
struct CappedCowArgs {
    /// units of gas needed to settle the order
    gas: f64,
    /// the price of one gas unit in ETH atoms
    gas_price: f64,
    /// the price of one COW atom in ETH atoms
    cow_price: f64,
}

fn capped_reward_cow(
    Configuration {
        beta,
        alpha1,
        alpha2,
        profit,
        gas_cap,
        reward_cap,
    }: Configuration,
    CappedCowArgs {
        gas,
        gas_price,
        cow_price,
    }: CappedCowArgs,
) -> Result<f64> {
    let args = UncappedEthArgs {
        beta,
        alpha1,
        alpha2,
        profit: profit * COW_BASE * cow_price,
        gas: gas.min(gas_cap),
        gas_price,
    };
    let reward = uncapped_reward_eth_atoms(args) / cow_price / COW_BASE;
    ensure!(
        reward.is_finite() && reward >= 0.,
        "reward is weird {:?}",
        reward
    );
    Ok(reward.min(reward_cap))
}

#[derive(Copy, Clone, Debug)]
struct UncappedEthArgs {
    /// β
    beta: f64,
    /// ɑ1
    alpha1: f64,
    /// ɑ2
    alpha2: f64,
    /// T, in ETH atoms, conversion to and from COW has to be done outside
    profit: f64,
    /// units of gas needed to settle the order, capping has to be done outside
    gas: f64,
    /// the price of one gas unit in ETH atoms
    gas_price: f64,
}

/// Returns uncapped reward in ETH atoms.
fn uncapped_reward_eth_atoms(
    UncappedEthArgs {
        beta,
        alpha1,
        alpha2,
        profit,
        gas,
        gas_price,
    }: UncappedEthArgs,
) -> f64 {
    let cost = gas * gas_price;
    // The way https://github.com/cowprotocol/risk_adjusted_rewards calculates the parameters gas is
    // expressed in thousandth and gas price in gwei so we need to adjust our atom
    // based values.
    let exponent = -beta - alpha1 * (gas / 1e3) - alpha2 * (gas_price / 1e9);
    let revert_probability = 1. / (1. + exponent.exp());
    (profit + cost) / (1. - revert_probability) - cost
}

/// A caching wrapper over [NativePriceEstimating] used to estimate and cache
/// CoW token price. Implemented to enable the [Calculator] produce rewards even
/// when a fresh estimate is not available.
struct BestEffortCowPriceEstimator {
    inner: Arc<dyn NativePriceEstimating>,
    cow_token: H160,
    /// Cached value and a timestamp.
    fallback_cache: Mutex<Option<(f64, Instant)>>,
    /// How long is the value valid after being set.
    max_age: Duration,
}

impl BestEffortCowPriceEstimator {
    fn new(inner: Arc<dyn NativePriceEstimating>, cow_token: H160, max_age: Duration) -> Self {
        Self {
            inner,
            cow_token,
            fallback_cache: Mutex::new(None),
            max_age,
        }
    }

    /// Attempts to use the inner estimator to get a fresh price estimate.
    /// If that fails, attempts to return the value from cache.
    async fn get_price(&self, current_time: Instant) -> NativePriceEstimateResult {
        let fresh = self
            .inner
            .estimate_native_prices(std::slice::from_ref(&self.cow_token))
            .next()
            .await
            .unwrap()
            .1;

        match fresh {
            Ok(price) => {
                self.set_cached(price, current_time);
                Ok(price)
            }
            Err(error) => {
                let price = self.get_cached(current_time);
                if let Some(price) = price {
                    tracing::warn!(
                        ?error,
                        "Using an old CoW token price from a fallback cache, fetching a fresh \
                         estimate failed"
                    );
                    Ok(price)
                } else {
                    Err(error)
                }
            }
        }
    }

    fn get_cached(&self, current_time: Instant) -> Option<f64> {
        let (price, timestamp) = (*self.fallback_cache.lock().unwrap())?;

        if timestamp + self.max_age >= current_time {
            Some(price)
        } else {
            None
        }
    }

    fn set_cached(&self, price: f64, current_time: Instant) {
        self.fallback_cache
            .lock()
            .unwrap()
            .replace((price, current_time));
    }
}
