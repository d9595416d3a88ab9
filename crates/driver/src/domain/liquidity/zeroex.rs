/// A signed 0x Protocol Limit Order [^1].
///
/// [^1]: <https://docs.0x.org/limit-orders-advanced-traders/docs/introduction>
#[derive(Clone, Debug)]
pub struct LimitOrder {}
