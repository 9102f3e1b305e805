//! Event adapter layer: bus seam, event vocabulary, fill aggregation and
//! the request-to-engine translation.

#[allow(clippy::module_inception)]
mod adapter;
mod bus;
mod events;
mod fills;

pub use adapter::ExchangeAdapter;
pub use bus::{BusError, ChannelBus, EventBus, PublishedEvent, RecordingBus, SimClock, TokioBus};
pub use events::{
    BangEvent, CancelRejectEvent, ExpirationAckEvent, ExpirationRejectEvent,
    ExpirationTriggerRequest, FillEvent, FullCancelAckEvent, FullCancelRequest,
    LTwoOrderBookEvent, LimitOrderRequest, MarketEvent, MarketOrderAckEvent, MarketOrderRequest,
    OrderAckEvent, OrderKind, OrderRejectEvent, OrderRequest, PartialCancelAckEvent,
    PartialCancelRequest, TradeEvent, topics,
};
pub use fills::FillTracker;
