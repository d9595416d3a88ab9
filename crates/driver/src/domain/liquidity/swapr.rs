/// A Unswap V2 like constant product pool, with the notable difference that the
/// pool fees are dynamic and can be changed by the protocol administrator.
#[derive(Clone, Debug)]
pub struct Pool {}
