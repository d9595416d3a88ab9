pub mod blockchain;
pub mod config;
pub mod persistence;
pub mod shadow;
pub mod solvers;

pub use {
    blockchain::Ethereum,
    order_validation::banned,
    persistence::Persistence,
    solvers::Driver,
};
