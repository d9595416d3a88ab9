//! This module contains the logic for decoding the function input for
//! GPv2Settlement::settle function.

use {
    anyhow::{Context, Result},
    app_data::AppDataHash,
    bigdecimal::{Signed, Zero},
    contracts::GPv2Settlement,
    ethcontract::{common::FunctionExt, tokens::Tokenize, Address, Bytes, U256},
    model::{
        order::{BuyTokenDestination, OrderData, OrderKind, OrderUid, SellTokenSource},
        signature::{Signature, SigningScheme},
        DomainSeparator,
    },
    num::BigRational,
    number::conversions::{big_rational_to_u256, u256_to_big_rational},
    shared::{conversions::U256Ext, external_prices::ExternalPrices},
    std::collections::HashSet,
    web3::ethabi::{Function, Token},
};

// Original type for input of `GPv2Settlement.settle` function.
type DecodedSettlementTokenized = (
    Vec<Address>,
    Vec<U256>,
    Vec<(
        U256,            // sellTokenIndex
        U256,            // buyTokenIndex
        Address,         // receiver
        U256,            // sellAmount
        U256,            // buyAmount
        u32,             // validTo
        Bytes<[u8; 32]>, // appData
        U256,            // feeAmount
        U256,            // flags
        U256,            // executedAmount
        Bytes<Vec<u8>>,  // signature
    )>,
    [Vec<(Address, U256, Bytes<Vec<u8>>)>; 3],
);

#[derive(Debug, PartialEq, Eq)]
pub struct DecodedSettlement {
    // TODO check if `EncodedSettlement` can be reused
    pub tokens: Vec<Address>,
    pub clearing_prices: Vec<U256>,
    pub trades: Vec<TradeWithOrderUid>,
    pub interactions: [Vec<DecodedInteraction>; 3],
    /// Data that was appended to the regular call data of the `settle()` call
    /// as a form of on-chain meta data. This gets used to associated a
    /// settlement with an auction.
    pub metadata: Option<Bytes<[u8; Self::META_DATA_LEN]>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DecodedTrade {
    pub sell_token_index: U256,
    pub buy_token_index: U256,
    pub receiver: Address,
    pub sell_amount: U256,
    pub buy_amount: U256,
    pub valid_to: u32,
    pub app_data: Bytes<[u8; 32]>,
    pub fee_amount: U256,
    pub flags: TradeFlags,
    pub executed_amount: U256,
    pub signature: Bytes<Vec<u8>>,
}

impl DecodedTrade {
    /// Returns the signature of the order.
    fn signature(&self) -> Result<Signature> {
        Signature::from_bytes(self.flags.signing_scheme(), &self.signature.0)
    }

    /// Returns the order uid of the order associated with this trade.
    pub fn uid(&self, domain_separator: &DomainSeparator, tokens: &[Address]) -> Result<OrderUid> {
        let order = OrderData {
            sell_token: tokens[self.sell_token_index.as_u64() as usize],
            buy_token: tokens[self.buy_token_index.as_u64() as usize],
            sell_amount: self.sell_amount,
            buy_amount: self.buy_amount,
            valid_to: self.valid_to,
            app_data: AppDataHash(self.app_data.0),
            fee_amount: self.fee_amount,
            kind: self.flags.order_kind(),
            partially_fillable: self.flags.partially_fillable(),
            receiver: Some(self.receiver),
            sell_token_balance: self.flags.sell_token_balance(),
            buy_token_balance: self.flags.buy_token_balance(),
        };
        let owner = self
            .signature()
            .context("signature is invalid")?
            .recover_owner(&self.signature.0, domain_separator, &order.hash_struct())
            .context("cant recover owner")?;
        Ok(order.uid(domain_separator, &owner))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TradeWithOrderUid {
    pub inner: DecodedTrade,
    pub order_uid: OrderUid,
}

/// Trade flags are encoded in a 256-bit integer field. For more information on
/// how flags are encoded see:
/// <https://github.com/cowprotocol/contracts/blob/v1.0.0/src/contracts/libraries/GPv2Trade.sol#L58-L94>
#[derive(Debug, PartialEq, Eq)]
pub struct TradeFlags(pub U256);

impl TradeFlags {
    fn as_u8(&self) -> u8 {
        self.0.byte(0)
    }

    fn order_kind(&self) -> OrderKind {
        if self.as_u8() & 0b1 == 0 {
            OrderKind::Sell
        } else {
            OrderKind::Buy
        }
    }

    fn partially_fillable(&self) -> bool {
        self.as_u8() & 0b10 != 0
    }

    fn sell_token_balance(&self) -> SellTokenSource {
        if self.as_u8() & 0x08 == 0 {
            SellTokenSource::Erc20
        } else if self.as_u8() & 0x04 == 0 {
            SellTokenSource::External
        } else {
            SellTokenSource::Internal
        }
    }

    fn buy_token_balance(&self) -> BuyTokenDestination {
        if self.as_u8() & 0x10 == 0 {
            BuyTokenDestination::Erc20
        } else {
            BuyTokenDestination::Internal
        }
    }

    fn signing_scheme(&self) -> SigningScheme {
        match (self.as_u8() >> 5) & 0b11 {
            0b00 => SigningScheme::Eip712,
            0b01 => SigningScheme::EthSign,
            0b10 => SigningScheme::Eip1271,
            0b11 => SigningScheme::PreSign,
            _ => unreachable!(),
        }
    }
}

impl From<U256> for TradeFlags {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct DecodedInteraction {
    pub target: Address,
    pub value: U256,
    pub call_data: Bytes<Vec<u8>>,
}

impl From<(Address, U256, Bytes<Vec<u8>>)> for DecodedInteraction {
    fn from((target, value, call_data): (Address, U256, Bytes<Vec<u8>>)) -> Self {
        Self {
            target,
            value,
            call_data,
        }
    }
}

impl DecodedSettlement {
    /// Number of bytes that may be appended to the calldata to store an auction
    /// id.
    pub const META_DATA_LEN: usize = 8;

    pub fn new(input: &[u8], domain_separator: &DomainSeparator) -> Result<Self, DecodingError> {
        let function = GPv2Settlement::raw_contract()
            .interface
            .abi
            .function("settle")
            .unwrap();
        let without_selector = input
            .strip_prefix(&function.selector())
            .ok_or(DecodingError::InvalidSelector)?;

        // Decoding calldata without expecting metadata can succeed even if metadata
        // was appended. The other way around would not work so we do that first.
        if let Ok(decoded) = Self::try_new(without_selector, function, domain_separator, true) {
            return Ok(decoded);
        }
        Self::try_new(without_selector, function, domain_separator, false).map_err(Into::into)
    }

    fn try_new(
        data: &[u8],
        function: &Function,
        domain_separator: &DomainSeparator,
        with_metadata: bool,
    ) -> Result<Self> {
        let metadata_len = if with_metadata {
            anyhow::ensure!(
                data.len() % 32 == Self::META_DATA_LEN,
                "calldata does not contain the expected number of bytes to include metadata"
            );
            Self::META_DATA_LEN
        } else {
            0
        };

        let (calldata, metadata) = data.split_at(data.len() - metadata_len);
        let tokenized = function
            .decode_input(calldata)
            .context("tokenizing settlement calldata failed")?;
        let decoded = <DecodedSettlementTokenized>::from_token(Token::Tuple(tokenized))
            .context("decoding tokenized settlement calldata failed")?;

        let (tokens, clearing_prices, trades, interactions) = decoded;
        let trades = trades
            .into_iter()
            .filter_map(|trade| {
                let trade = DecodedTrade {
                    sell_token_index: trade.0,
                    buy_token_index: trade.1,
                    receiver: trade.2,
                    sell_amount: trade.3,
                    buy_amount: trade.4,
                    valid_to: trade.5,
                    app_data: trade.6,
                    fee_amount: trade.7,
                    flags: trade.8.into(),
                    executed_amount: trade.9,
                    signature: trade.10,
                };
                match trade.uid(domain_separator, &tokens) {
                    Ok(order_uid) => Some(TradeWithOrderUid {
                        inner: trade,
                        order_uid,
                    }),
                    Err(err) => {
                        tracing::error!(
                            ?err,
                            ?trade,
                            "failed to calculate order uid, we don't know which order this trade \
                             belongs to"
                        );
                        None
                    }
                }
            })
            .collect();
        Ok(Self {
            tokens,
            clearing_prices,
            trades,
            interactions: interactions.map(|inner| inner.into_iter().map(Into::into).collect()),
            metadata: metadata.try_into().ok().map(Bytes),
        })
    }

    /// Returns the total surplus denominated in the native asset for the
    /// solution.
    pub fn total_surplus(
        &self,
        external_prices: &ExternalPrices,
        jit_order_uids: HashSet<OrderUid>,
    ) -> U256 {
        self.trades
            .iter()
            .filter(|trade| !jit_order_uids.contains(&trade.order_uid))
            .fold(0.into(), |acc, trade| {
                acc + surplus(
                    &trade.inner,
                    &self.tokens,
                    &self.clearing_prices,
                    external_prices,
                )
                .unwrap_or_else(|| {
                    tracing::warn!("possible incomplete surplus calculation");
                    0.into()
                })
            })
    }

    /// Returns fees for all trades.
    pub fn all_fees(&self, external_prices: &ExternalPrices) -> Vec<Fees> {
        self.trades
            .iter()
            .map(|trade| {
                self.fee(trade, external_prices).unwrap_or_else(|| {
                    tracing::warn!("possible incomplete fee calculation");
                    // we should have an order execution for every trade
                    Fees {
                        order: trade.order_uid,
                        kind: FeeKind::User,
                        sell: U256::zero(),
                        native: U256::zero(),
                    }
                })
            })
            .collect()
    }

    fn fee(&self, trade: &TradeWithOrderUid, external_prices: &ExternalPrices) -> Option<Fees> {
        let sell_index = trade.inner.sell_token_index.as_u64() as usize;
        let buy_index = trade.inner.buy_token_index.as_u64() as usize;
        let sell_token = self.tokens.get(sell_index)?;
        let buy_token = self.tokens.get(buy_index)?;

        let (kind, fee) = match trade.inner.fee_amount.is_zero() {
            false => (FeeKind::User, trade.inner.fee_amount),
            true => {
                // get executed(adjusted) prices
                let adjusted_sell_price = self.clearing_prices.get(sell_index).cloned()?;
                let adjusted_buy_price = self.clearing_prices.get(buy_index).cloned()?;

                // get uniform prices
                let sell_index = self.tokens.iter().position(|token| token == sell_token)?;
                let buy_index = self.tokens.iter().position(|token| token == buy_token)?;
                let uniform_sell_price = self.clearing_prices.get(sell_index).cloned()?;
                let uniform_buy_price = self.clearing_prices.get(buy_index).cloned()?;

                // the logic is opposite to the code in function `custom_price_for_limit_order`
                let fee = match trade.inner.flags.order_kind() {
                    OrderKind::Buy => {
                        let required_sell_amount = trade
                            .inner
                            .executed_amount
                            .checked_mul(adjusted_buy_price)?
                            .checked_div(adjusted_sell_price)?;
                        let required_sell_amount_with_ucp = trade
                            .inner
                            .executed_amount
                            .checked_mul(uniform_buy_price)?
                            .checked_div(uniform_sell_price)?;
                        required_sell_amount.checked_sub(required_sell_amount_with_ucp)?
                    }
                    OrderKind::Sell => {
                        let received_buy_amount = trade
                            .inner
                            .executed_amount
                            .checked_mul(adjusted_sell_price)?
                            .checked_div(adjusted_buy_price)?;
                        let sell_amount_needed_with_ucp = received_buy_amount
                            .checked_mul(uniform_buy_price)?
                            .checked_div(uniform_sell_price)?;
                        trade
                            .inner
                            .executed_amount
                            .checked_sub(sell_amount_needed_with_ucp)?
                    }
                };
                (FeeKind::Surplus, fee)
            }
        };

        // converts the fee which is denominated in `sell_token` to the native token.
        tracing::trace!(?fee, "fee before conversion to native token");
        let native =
            external_prices.try_get_native_amount(*sell_token, u256_to_big_rational(&fee))?;
        tracing::trace!(?native, "fee after conversion to native token");

        Some(Fees {
            order: trade.order_uid,
            kind,
            sell: fee,
            native: big_rational_to_u256(&native).ok()?,
        })
    }
}

/// Can be populated multiple times for the same order (partially fillable
/// orders)
#[derive(Debug)]
pub struct Fees {
    /// The UID of the order associated with these fees.
    pub order: OrderUid,
    /// The type of fee that was executed.
    pub kind: FeeKind,
    /// The executed fees in the sell token.
    pub sell: U256,
    /// The executed fees in the native token.
    pub native: U256,
}

impl Fees {
    /// Get the surplus fee for this order.
    pub fn executed_surplus_fee(&self) -> Option<U256> {
        match self.kind {
            FeeKind::User => None,
            FeeKind::Surplus => Some(self.sell),
        }
    }
}

#[derive(Debug)]
pub enum FeeKind {
    User,
    Surplus,
}

fn surplus(
    trade: &DecodedTrade,
    tokens: &[Address],
    clearing_prices: &[U256],
    external_prices: &ExternalPrices,
) -> Option<U256> {
    let sell_token_index = trade.sell_token_index.as_u64() as usize;
    let buy_token_index = trade.buy_token_index.as_u64() as usize;

    let sell_token_clearing_price = clearing_prices.get(sell_token_index)?.to_big_rational();
    let buy_token_clearing_price = clearing_prices.get(buy_token_index)?.to_big_rational();
    let kind = trade.flags.order_kind();

    if match kind {
        OrderKind::Sell => &buy_token_clearing_price,
        OrderKind::Buy => &sell_token_clearing_price,
    }
    .is_zero()
    {
        return None;
    }

    let surplus = trade_surplus(
        kind,
        &trade.sell_amount.to_big_rational(),
        &trade.buy_amount.to_big_rational(),
        &trade.executed_amount.to_big_rational(),
        &sell_token_clearing_price,
        &buy_token_clearing_price,
    )?;

    let normalized_surplus = match kind {
        OrderKind::Sell => {
            let buy_token = tokens.get(buy_token_index)?;
            external_prices.try_get_native_amount(*buy_token, surplus / buy_token_clearing_price)?
        }
        OrderKind::Buy => {
            let sell_token = tokens.get(sell_token_index)?;
            external_prices
                .try_get_native_amount(*sell_token, surplus / sell_token_clearing_price)?
        }
    };

    big_rational_to_u256(&normalized_surplus).ok()
}

fn trade_surplus(
    kind: OrderKind,
    sell_amount: &BigRational,
    buy_amount: &BigRational,
    executed_amount: &BigRational,
    sell_token_price: &BigRational,
    buy_token_price: &BigRational,
) -> Option<BigRational> {
    match kind {
        OrderKind::Buy => buy_order_surplus(
            sell_token_price,
            buy_token_price,
            sell_amount,
            buy_amount,
            executed_amount,
        ),
        OrderKind::Sell => sell_order_surplus(
            sell_token_price,
            buy_token_price,
            sell_amount,
            buy_amount,
            executed_amount,
        ),
    }
}

// The difference between what you were willing to sell (executed_amount *
// limit_price) converted into reference token (multiplied by buy_token_price)
// and what you had to sell denominated in the reference token (executed_amount
// * buy_token_price)
fn buy_order_surplus(
    sell_token_price: &BigRational,
    buy_token_price: &BigRational,
    sell_amount_limit: &BigRational,
    buy_amount_limit: &BigRational,
    executed_buy_amount: &BigRational,
) -> Option<BigRational> {
    if buy_amount_limit.is_zero() {
        return None;
    }
    let limit_sell_amount = executed_buy_amount * sell_amount_limit / buy_amount_limit;
    let res = (limit_sell_amount * sell_token_price) - (executed_buy_amount * buy_token_price);
    if res.is_negative() {
        None
    } else {
        Some(res)
    }
}

// The difference of your proceeds denominated in the reference token
// (executed_sell_amount * sell_token_price) and what you were minimally willing
// to receive in buy tokens (executed_sell_amount * limit_price) converted to
// amount in reference token at the effective price (multiplied by
// buy_token_price)
fn sell_order_surplus(
    sell_token_price: &BigRational,
    buy_token_price: &BigRational,
    sell_amount_limit: &BigRational,
    buy_amount_limit: &BigRational,
    executed_sell_amount: &BigRational,
) -> Option<BigRational> {
    if sell_amount_limit.is_zero() {
        return None;
    }
    let limit_buy_amount = executed_sell_amount * buy_amount_limit / sell_amount_limit;
    let res = (executed_sell_amount * sell_token_price) - (limit_buy_amount * buy_token_price);
    if res.is_negative() {
        None
    } else {
        Some(res)
    }
}

#[derive(Debug)]
pub enum DecodingError {
    InvalidSelector,
    Other(anyhow::Error),
}

impl From<anyhow::Error> for DecodingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err)
    }
}

impl From<DecodingError> for anyhow::Error {
    fn from(err: DecodingError) -> Self {
        match err {
            DecodingError::InvalidSelector => anyhow::anyhow!("invalid function selector"),
            DecodingError::Other(err) => err,
        }
    }
}

/// `input` is the raw call data from the transaction receipt.
/// Example: `13d79a0b00000000` where `13d79a0b` is the function selector for
/// `settle` function in case of GPv2Settlement contract.
pub fn decode_function_input(
    function: &Function,
    input: &[u8],
) -> Result<Vec<Token>, DecodingError> {
    let input = input
        .strip_prefix(&function.selector())
        .ok_or(DecodingError::InvalidSelector)?;
    let decoded_input = function
        .decode_input(input)
        .context("decode input failed")?;
    Ok(decoded_input)
}
