//! Matching engine and its callback surface.

#[allow(clippy::module_inception)]
mod engine;
mod events;

pub use engine::MatchingEngine;
pub use events::{
    CancelRejected, ClientOrderId, ExecutionListener, ExpirationAcked, ExpirationRejected,
    FullCancelAcked, LimitOrderAcked, MakerFill, MarketOrderAcked, PartialCancelAcked, TakerFill,
    TradeExecuted, TraderId,
};
