use {
    anyhow::{Context, Result},
    gas_estimation::GasPriceEstimating,
    model::{auction::AuctionWithId as AuctionModel, TokenPair},
    primitive_types::H160,
    shared::recent_block_cache::Block,
    solver::{
        liquidity::order_converter::OrderConverter,
        liquidity_collector::LiquidityCollecting,
        settlement::external_prices::ExternalPrices,
        solver::Auction,
    },
    std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc,
        },
        time::{Duration, Instant},
    },
};

// TODO eventually this has to be part of the auction coming from the autopilot.
/// Determines how much time a solver has to compute solutions for an incoming
/// `Auction`.
const RUN_DURATION: Duration = Duration::from_secs(15);

#[async_trait::async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AuctionConverting: Send + Sync {
    async fn convert_auction(&self, model: AuctionModel, block: u64) -> Result<Auction>;
}

pub struct AuctionConverter {
    pub order_converter: Arc<OrderConverter>,
    pub gas_price_estimator: Arc<dyn GasPriceEstimating>,
    pub native_token: H160,
    pub run: AtomicU64,
    pub liquidity_collector: Box<dyn LiquidityCollecting>,
}

impl AuctionConverter {
    pub fn new(
        gas_price_estimator: Arc<dyn GasPriceEstimating>,
        liquidity_collector: Box<dyn LiquidityCollecting>,
        order_converter: Arc<OrderConverter>,
    ) -> Self {
        Self {
            gas_price_estimator,
            native_token: order_converter.native_token.address(),
            run: AtomicU64::default(),
            liquidity_collector,
            order_converter,
        }
    }
}

#[async_trait::async_trait]
impl AuctionConverting for AuctionConverter {
    async fn convert_auction(&self, auction: AuctionModel, block: u64) -> Result<Auction> {
        let auction_id = auction.id;
        let auction = auction.auction;
        let run = self.run.fetch_add(1, Ordering::SeqCst);
        let orders = auction
            .orders
            .into_iter()
            .filter_map(|order| {
                let uid = order.metadata.uid;
                match self.order_converter.normalize_limit_order(order) {
                    Ok(mut order)
                        if order.buy_amount != 0.into() && order.sell_amount != 0.into() =>
                    {
                        order.reward = auction.rewards.get(&uid).copied().unwrap_or(0.);
                        Some(order)
                    }
                    Err(err) => {
                        // This should never happen unless we are getting malformed
                        // orders from the API - so raise an alert if this happens.
                        tracing::error!(?err, "error normalizing limit order");
                        None
                    }
                    _ => {
                        // TODO: Find out why those orders are not an issue in the old driver.
                        // Those orders cause errors inside quasimodo.
                        let err = anyhow::anyhow!("but_amount or sell_amount is 0");
                        tracing::error!(?err, "error normalizing limit order");
                        None
                    }
                }
            })
            .collect::<Vec<_>>();
        anyhow::ensure!(
            orders.iter().any(|o| !o.is_liquidity_order()),
            "auction contains no user orders"
        );

        tracing::info!(?orders, "got {} orders", orders.len());

        let token_pairs: HashSet<_> = orders
            .iter()
            .filter(|o| !o.is_liquidity_order())
            .flat_map(|o| TokenPair::new(o.buy_token, o.sell_token))
            .collect();

        let liquidity = self
            .liquidity_collector
            .get_liquidity(token_pairs, Block::Number(block))
            .await?;

        let external_prices =
            ExternalPrices::try_from_auction_prices(self.native_token, auction.prices)
                .context("malformed acution prices")?;
        tracing::debug!(?external_prices, "estimated prices");

        let gas_price = self
            .gas_price_estimator
            .estimate()
            .await
            .context("failed to estimate gas price")?;
        tracing::debug!("solving with gas price of {:?}", gas_price);

        Ok(Auction {
            id: auction_id,
            run,
            orders,
            liquidity,
            liquidity_fetch_block: block,
            gas_price: gas_price.effective_gas_price(),
            deadline: Instant::now() + RUN_DURATION,
            external_prices,
        })
    }
}
