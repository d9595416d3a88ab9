#[cfg(feature = "bin")]
pub mod paths;

include!(concat!(env!("OUT_DIR"), "/BalancerV2Vault.rs"));
include!(concat!(env!("OUT_DIR"), "/BalancerV2WeightedPool.rs"));
include!(concat!(
    env!("OUT_DIR"),
    "/BalancerV2WeightedPoolFactory.rs"
));
include!(concat!(env!("OUT_DIR"), "/ERC20.rs"));
include!(concat!(env!("OUT_DIR"), "/ERC20Mintable.rs"));
include!(concat!(env!("OUT_DIR"), "/GPv2AllowListAuthentication.rs"));
include!(concat!(env!("OUT_DIR"), "/GPv2Settlement.rs"));
include!(concat!(env!("OUT_DIR"), "/IUniswapLikePair.rs"));
include!(concat!(env!("OUT_DIR"), "/IUniswapLikeRouter.rs"));
include!(concat!(env!("OUT_DIR"), "/SushiswapV2Factory.rs"));
include!(concat!(env!("OUT_DIR"), "/SushiswapV2Router02.rs"));
include!(concat!(env!("OUT_DIR"), "/UniswapV2Factory.rs"));
include!(concat!(env!("OUT_DIR"), "/UniswapV2Router02.rs"));
include!(concat!(env!("OUT_DIR"), "/WETH9.rs"));
