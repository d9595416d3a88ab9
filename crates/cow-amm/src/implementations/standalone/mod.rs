//! Code specific to the second iteration of CoW AMMs which have been developed
//! in-house but are no longer based on safes to reduce gas costs.

pub(crate) mod amm;
pub(crate) mod factory;
