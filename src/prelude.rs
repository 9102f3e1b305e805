//! Prelude module that re-exports commonly used types and traits.
//!
//! Instead of importing each type individually, you can use:
//!
//! ```rust
//! use simbook::prelude::*;
//! ```

// Book types
pub use crate::orderbook::{
    BookCore, Clearing, DepthLevel, DepthSnapshot, MatchBookOutcome, OrderBook, OrderBookError,
    OrderDetails, PriceModification, QuantityModification, RequeuePriority, SnapshotPackage,
};

// Price level types
pub use crate::pricelevel::{
    FillRecord, OrderId, Price, PriceLevel, Quantity, QueueEnd, RestingOrder, Side, SweepOutcome,
    TRANSIENT_ID_BASE,
};

// Engine and callback types
pub use crate::engine::{
    ClientOrderId, ExecutionListener, LimitOrderAcked, MakerFill, MarketOrderAcked, MatchingEngine,
    TakerFill, TradeExecuted, TraderId,
};

// Adapter, bus and event types
pub use crate::adapter::{
    ChannelBus, EventBus, ExchangeAdapter, FillEvent, FillTracker, LTwoOrderBookEvent,
    LimitOrderRequest, MarketEvent, MarketOrderRequest, OrderKind, OrderRequest, PublishedEvent,
    RecordingBus, SimClock, TokioBus, topics,
};

// Utility functions
pub use crate::utils::current_time_millis;
