//! # Simbook: Order Book Matching for Discrete-Event Trading Simulations
//!
//! A single-symbol limit order book matching engine together with the
//! event-driven adapter that connects it to a simulation's publish/subscribe
//! bus. The engine maintains strict price-time priority, matches incoming
//! orders against resting liquidity, supports modification and cancellation
//! with queue-priority control, and exposes L2 depth snapshots. The adapter
//! translates inbound order-flow requests into engine calls and emits a
//! stream of semantically precise acknowledgements, fills, trades, rejects
//! and diff-gated book updates for trading algorithms and the expiration
//! subsystem.
//!
//! ## Architecture
//!
//! The crate is layered, leaves first:
//!
//! - [`pricelevel`]: an ordered queue of resting orders at one price, with
//!   front/back insertion and a directional sweep that consumes liquidity
//!   in strict queue order.
//! - [`orderbook`]: the book core ([`BookCore`]): bid side descending and
//!   ask side ascending, a global order-id index, and the raw
//!   match/book/modify/cancel primitives; plus the side-remembering
//!   [`OrderBook`] facade and depth snapshots.
//! - [`engine`]: the [`MatchingEngine`]: limit and market placement,
//!   cancellation, expiration checks, and an ordered callback protocol
//!   (acknowledge, then trade / maker-fill / taker-fill per match segment).
//!   Takers that never rest are labelled with ids from a reserved transient
//!   range, so consumers can classify any id without asking the engine.
//! - [`adapter`]: the [`ExchangeAdapter`]: owns the
//!   `(trader, client order id) ↔ exchange order id` mapping, tracks
//!   per-order cumulative fill quantity and volume-weighted average price,
//!   routes outbound events onto `<EventName>.<trader>`, broadcast and
//!   `<EventName>.<symbol>` topics, and suppresses L2 snapshots that would
//!   repeat the previously published depth.
//!
//! ## Concurrency model
//!
//! The core is single-threaded cooperative: every engine mutation and every
//! adapter state transition runs on the event-bus dispatch thread, and all
//! engine callbacks execute synchronously on the stack of the originating
//! call. The bus implementations enqueue published events, so a subscriber
//! reacting to an event can never re-enter the engine mid-call.
//!
//! ## Example
//!
//! ```rust
//! use simbook::prelude::*;
//!
//! let mut adapter = ExchangeAdapter::new("XYZ", RecordingBus::new());
//! adapter.handle(
//!     "alice",
//!     OrderRequest::Limit(LimitOrderRequest {
//!         symbol: "XYZ".to_string(),
//!         side: Side::Buy,
//!         price: 100,
//!         quantity: 10,
//!         timeout: 0,
//!         client_order_id: 1,
//!     }),
//! );
//! for published in adapter.bus().take() {
//!     println!("{}: {}", published.topic, published.event.name());
//! }
//! ```
//!
//! Swap [`RecordingBus`] for [`ChannelBus`] or [`TokioBus`] to feed a real
//! simulation loop, and drive the timestamps on L2 events through a shared
//! [`SimClock`].

pub mod adapter;
pub mod engine;
pub mod orderbook;
pub mod pricelevel;

pub mod prelude;
mod utils;

pub use adapter::{
    ChannelBus, EventBus, ExchangeAdapter, MarketEvent, OrderKind, OrderRequest, PublishedEvent,
    RecordingBus, SimClock, TokioBus,
};
pub use engine::{ExecutionListener, MatchingEngine};
pub use orderbook::{
    BookCore, DepthLevel, DepthSnapshot, OrderBook, OrderBookError, OrderDetails, RequeuePriority,
    SnapshotPackage,
};
pub use pricelevel::{OrderId, Price, PriceLevel, Quantity, QueueEnd, Side, TRANSIENT_ID_BASE};
pub use utils::current_time_millis;
