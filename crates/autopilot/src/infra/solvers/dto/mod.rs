//! Types for communicating with drivers as defined in
//! `crates/driver/openapi.yml`.

pub mod quote;
pub mod reveal;
pub mod settle;
pub mod solve;
