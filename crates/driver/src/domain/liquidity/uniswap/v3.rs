/// A Uniswap V3 concentrated liquidity pool.
///
/// [^1]: <https://uniswap.org/whitepaper-v3.pdf>
#[derive(Clone, Debug)]
pub struct Pool {}
