pub mod auction;
mod eth;
pub mod events;
pub mod fee;
pub mod quote;

pub use {
    auction::{
        order::{Order, OrderUid},
        Auction,
        AuctionId,
        AuctionWithId,
    },
    events::Events,
    fee::ProtocolFee,
    quote::Quote,
};
