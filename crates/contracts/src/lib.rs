#![allow(clippy::let_unit_value)]

pub use ethcontract;

#[macro_use]
mod macros;

#[cfg(feature = "bin")]
pub mod paths;
pub mod storage_accessible;
pub mod vault;
pub mod web3;

macro_rules! include_contracts {
    ($($name:ident;)*) => {$(
        include!(concat!(env!("OUT_DIR"), "/", stringify!($name), ".rs"));
    )*};
}

include_contracts! {
    BalancerV2Authorizer;
    BalancerV2BasePool;
    BalancerV2BasePoolFactory;
    BalancerV2ComposableStablePool;
    BalancerV2ComposableStablePoolFactory;
    BalancerV2ComposableStablePoolFactoryV3;
    BalancerV2ComposableStablePoolFactoryV4;
    BalancerV2ComposableStablePoolFactoryV5;
    BalancerV2LiquidityBootstrappingPool;
    BalancerV2LiquidityBootstrappingPoolFactory;
    BalancerV2NoProtocolFeeLiquidityBootstrappingPoolFactory;
    BalancerV2StablePool;
    BalancerV2StablePoolFactoryV2;
    BalancerV2Vault;
    BalancerV2WeightedPool2TokensFactory;
    BalancerV2WeightedPool;
    BalancerV2WeightedPoolFactory;
    BalancerV2WeightedPoolFactoryV3;
    BalancerV2WeightedPoolFactoryV4;
    BaoswapRouter;
    CoWSwapEthFlow;
    CoWSwapOnchainOrders;
    CowProtocolToken;
    ERC1271SignatureValidator;
    ERC20;
    ERC20Mintable;
    GPv2AllowListAuthentication;
    GPv2Settlement;
    GnosisSafe;
    GnosisSafeCompatibilityFallbackHandler;
    GnosisSafeProxy;
    GnosisSafeProxyFactory;
    HoneyswapRouter;
    HooksTrampoline;
    ISwaprPair;
    IUniswapLikePair;
    IUniswapLikeRouter;
    IUniswapV3Factory;
    IZeroEx;
    PancakeRouter;
    ChainalysisOracle;
    SushiSwapRouter;
    SwaprRouter;
    TestnetUniswapV2Router02;
    UniswapV2Factory;
    UniswapV2Router02;
    UniswapV3Pool;
    UniswapV3SwapRouter;
    WETH9;
}

pub mod support {
    include_contracts! {
        AnyoneAuthenticator;
        Balances;
        FetchBlock;
        Multicall;
        Signatures;
        SimulateCode;
        Solver;
        Swapper;
        Trader;
    }
}

pub mod test {
    include_contracts! {
        Counter;
        GasHog;
    }
}
