//! Inbound request events and outbound lifecycle events.
//!
//! Outbound events are published by topic. Trader-addressed events go to
//! `<EventName>.<trader_id>`; events the expiration subsystem watches are
//! also published bare on `<EventName>`; the L2 feed goes to
//! `<EventName>.<symbol>`.

use crate::engine::ClientOrderId;
use crate::orderbook::DepthLevel;
use crate::pricelevel::{OrderId, Price, Quantity, Side};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inbound order-flow request, scoped to one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderRequest {
    /// Place a limit order.
    Limit(LimitOrderRequest),
    /// Place a market order.
    Market(MarketOrderRequest),
    /// Cancel a resting limit order whole.
    FullCancelLimit(FullCancelRequest),
    /// Cancel a market order whole (always rejected post-submission).
    FullCancelMarket(FullCancelRequest),
    /// Reduce a resting limit order.
    PartialCancelLimit(PartialCancelRequest),
    /// Reduce a market order (always rejected post-submission).
    PartialCancelMarket(PartialCancelRequest),
    /// Expiration subsystem asks whether an order has timed out.
    TriggerExpiredLimitOrder(ExpirationTriggerRequest),
    /// Global reset.
    Bang,
}

impl OrderRequest {
    /// The symbol the request addresses, `None` for the global reset.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            OrderRequest::Limit(r) => Some(&r.symbol),
            OrderRequest::Market(r) => Some(&r.symbol),
            OrderRequest::FullCancelLimit(r) | OrderRequest::FullCancelMarket(r) => {
                Some(&r.symbol)
            }
            OrderRequest::PartialCancelLimit(r) | OrderRequest::PartialCancelMarket(r) => {
                Some(&r.symbol)
            }
            OrderRequest::TriggerExpiredLimitOrder(r) => Some(&r.symbol),
            OrderRequest::Bang => None,
        }
    }
}

/// Payload of [`OrderRequest::Limit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrderRequest {
    /// Target symbol.
    pub symbol: String,
    /// Order side.
    pub side: Side,
    /// Limit price.
    pub price: Price,
    /// Requested quantity.
    pub quantity: Quantity,
    /// Expiration timestamp, carried opaquely.
    pub timeout: u64,
    /// Sender's id for the order.
    pub client_order_id: ClientOrderId,
}

/// Payload of [`OrderRequest::Market`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrderRequest {
    /// Target symbol.
    pub symbol: String,
    /// Order side.
    pub side: Side,
    /// Requested quantity.
    pub quantity: Quantity,
    /// Present for schema parity with limit requests; market orders never
    /// rest, so it is ignored.
    pub timeout: u64,
    /// Sender's id for the order.
    pub client_order_id: ClientOrderId,
}

/// Payload of the full-cancel requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullCancelRequest {
    /// Target symbol.
    pub symbol: String,
    /// Client order id of the order to cancel.
    pub target_client_order_id: ClientOrderId,
    /// The cancel request's own client order id.
    pub client_order_id: ClientOrderId,
}

/// Payload of the partial-cancel requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialCancelRequest {
    /// Target symbol.
    pub symbol: String,
    /// Client order id of the order to reduce.
    pub target_client_order_id: ClientOrderId,
    /// Quantity to remove. A value at or above the resting quantity
    /// promotes the request to a full cancel.
    pub cancel_quantity: Quantity,
    /// The cancel request's own client order id.
    pub client_order_id: ClientOrderId,
}

/// Payload of [`OrderRequest::TriggerExpiredLimitOrder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationTriggerRequest {
    /// Target symbol.
    pub symbol: String,
    /// Exchange order id the trigger addresses.
    pub target_order_id: OrderId,
    /// The timeout the trigger was scheduled with, echoed back.
    pub original_timeout: u64,
}

/// Whether an exchange id was issued for a limit or a market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    /// A limit order (resting or transient).
    Limit,
    /// A market order (always transient).
    Market,
}

/// An outbound lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarketEvent {
    /// Limit order accepted.
    LimitOrderAck(OrderAckEvent),
    /// Limit order rejected before reaching the engine.
    LimitOrderReject(OrderRejectEvent),
    /// Market order accepted and matched.
    MarketOrderAck(MarketOrderAckEvent),
    /// Market order rejected before reaching the engine.
    MarketOrderReject(OrderRejectEvent),
    /// Resting limit order cancelled whole.
    FullCancelLimitAck(FullCancelAckEvent),
    /// Full cancel of a limit order failed.
    FullCancelLimitReject(CancelRejectEvent),
    /// Resting limit order reduced.
    PartialCancelLimitAck(PartialCancelAckEvent),
    /// Partial cancel of a limit order failed.
    PartialCancelLimitReject(CancelRejectEvent),
    /// Market orders cannot be cancelled post-submission.
    FullCancelMarketReject(CancelRejectEvent),
    /// Market orders cannot be reduced post-submission.
    PartialCancelMarketReject(CancelRejectEvent),
    /// Partial fill on a limit order.
    PartialFillLimit(FillEvent),
    /// Final fill on a limit order.
    FullFillLimit(FillEvent),
    /// Partial fill on a market order.
    PartialFillMarket(FillEvent),
    /// Final fill on a market order.
    FullFillMarket(FillEvent),
    /// A trade segment between a maker and a taker.
    Trade(TradeEvent),
    /// Diff-gated L2 book snapshot.
    LTwoOrderBook(LTwoOrderBookEvent),
    /// An expiration trigger removed its order.
    AckTriggerExpiredLimitOrder(ExpirationAckEvent),
    /// An expiration trigger found its order already gone.
    RejectTriggerExpiredLimitOrder(ExpirationRejectEvent),
    /// Global reset echo.
    Bang(BangEvent),
}

impl MarketEvent {
    /// The event's topic base name.
    pub fn name(&self) -> &'static str {
        match self {
            MarketEvent::LimitOrderAck(_) => "LimitOrderAckEvent",
            MarketEvent::LimitOrderReject(_) => "LimitOrderRejectEvent",
            MarketEvent::MarketOrderAck(_) => "MarketOrderAckEvent",
            MarketEvent::MarketOrderReject(_) => "MarketOrderRejectEvent",
            MarketEvent::FullCancelLimitAck(_) => "FullCancelLimitAckEvent",
            MarketEvent::FullCancelLimitReject(_) => "FullCancelLimitRejectEvent",
            MarketEvent::PartialCancelLimitAck(_) => "PartialCancelLimitAckEvent",
            MarketEvent::PartialCancelLimitReject(_) => "PartialCancelLimitRejectEvent",
            MarketEvent::FullCancelMarketReject(_) => "FullCancelMarketRejectEvent",
            MarketEvent::PartialCancelMarketReject(_) => "PartialCancelMarketRejectEvent",
            MarketEvent::PartialFillLimit(_) => "PartialFillLimitEvent",
            MarketEvent::FullFillLimit(_) => "FullFillLimitEvent",
            MarketEvent::PartialFillMarket(_) => "PartialFillMarketEvent",
            MarketEvent::FullFillMarket(_) => "FullFillMarketEvent",
            MarketEvent::Trade(_) => "TradeEvent",
            MarketEvent::LTwoOrderBook(_) => "LTwoOrderBookEvent",
            MarketEvent::AckTriggerExpiredLimitOrder(_) => "AckTriggerExpiredLimitOrderEvent",
            MarketEvent::RejectTriggerExpiredLimitOrder(_) => "RejectTriggerExpiredLimitOrderEvent",
            MarketEvent::Bang(_) => "BangEvent",
        }
    }
}

/// Topic naming helpers.
pub mod topics {
    /// Trader-addressed topic: `<EventName>.<trader_id>`.
    pub fn trader(event_name: &str, trader_id: &str) -> String {
        format!("{event_name}.{trader_id}")
    }

    /// Symbol feed topic: `<EventName>.<symbol>`.
    pub fn symbol(event_name: &str, symbol: &str) -> String {
        format!("{event_name}.{symbol}")
    }

    /// Broadcast topic: the bare event name.
    pub fn broadcast(event_name: &str) -> String {
        event_name.to_string()
    }
}

/// Acknowledgement of an accepted limit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAckEvent {
    /// Exchange order id (transient when nothing rested).
    pub order_id: OrderId,
    /// The placer's id for the order.
    pub client_order_id: ClientOrderId,
    /// Order side.
    pub side: Side,
    /// Limit price.
    pub price: Price,
    /// Requested quantity.
    pub quantity: Quantity,
    /// Symbol.
    pub symbol: String,
    /// Expiration timestamp, echoed for the expiration subsystem.
    pub timeout: u64,
    /// The placing trader.
    pub trader_id: String,
}

/// Acknowledgement of an executed market order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrderAckEvent {
    /// Transient exchange order id.
    pub order_id: OrderId,
    /// The placer's id for the order.
    pub client_order_id: ClientOrderId,
    /// Order side.
    pub side: Side,
    /// Requested quantity.
    pub requested_quantity: Quantity,
    /// Executed quantity.
    pub executed_quantity: Quantity,
    /// Quantity that found no liquidity.
    pub unfilled_quantity: Quantity,
    /// Symbol.
    pub symbol: String,
    /// The placing trader.
    pub trader_id: String,
}

/// Rejection of an order request that never reached the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRejectEvent {
    /// The request's client order id.
    pub client_order_id: ClientOrderId,
    /// Symbol.
    pub symbol: String,
    /// Why the request was rejected.
    pub reason: String,
    /// The requesting trader.
    pub trader_id: String,
}

/// Acknowledgement of a full cancel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullCancelAckEvent {
    /// The cancelled order.
    pub order_id: OrderId,
    /// The cancel request's own client order id.
    pub client_order_id: ClientOrderId,
    /// Side the order rested on.
    pub side: Side,
    /// Its level price.
    pub price: Price,
    /// Quantity removed.
    pub cancelled_quantity: Quantity,
    /// Symbol.
    pub symbol: String,
    /// The requesting trader.
    pub trader_id: String,
}

/// Acknowledgement of a partial cancel (in-place reduction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialCancelAckEvent {
    /// The reduced order; id unchanged.
    pub order_id: OrderId,
    /// The cancel request's own client order id.
    pub client_order_id: ClientOrderId,
    /// Its level price.
    pub price: Price,
    /// Quantity removed by this operation.
    pub cancelled_quantity: Quantity,
    /// Quantity still resting afterwards.
    pub remaining_quantity: Quantity,
    /// Symbol.
    pub symbol: String,
    /// The requesting trader.
    pub trader_id: String,
}

/// Rejection of a cancel request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelRejectEvent {
    /// The cancel request's own client order id.
    pub client_order_id: ClientOrderId,
    /// Symbol.
    pub symbol: String,
    /// Why the request was rejected.
    pub reason: String,
    /// The requesting trader.
    pub trader_id: String,
}

/// A fill notification with running aggregates.
///
/// Partial fills carry the segment price and quantity plus the leaves
/// quantity; the final fill carries the last segment price, the total
/// filled quantity and no leaves. `average_price` always reflects every
/// fill the order has received so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    /// The filled order.
    pub order_id: OrderId,
    /// The owner's id for the order.
    pub client_order_id: ClientOrderId,
    /// The order's side.
    pub side: Side,
    /// Symbol.
    pub symbol: String,
    /// Segment price (last segment price on the final fill).
    pub price: Price,
    /// Segment quantity, or total filled quantity on the final fill.
    pub quantity: Quantity,
    /// Open quantity after this segment; `None` on the final fill.
    pub leaves_quantity: Option<Quantity>,
    /// Total quantity filled so far.
    pub cumulative_quantity: Quantity,
    /// Volume-weighted average price over all fills so far.
    pub average_price: f64,
    /// Whether the order was the resting side of the trade.
    pub is_maker: bool,
    /// The owning trader.
    pub trader_id: String,
}

/// A trade between two orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Symbol.
    pub symbol: String,
    /// Unique trade identifier.
    pub trade_id: Uuid,
    /// Maker's client order id.
    pub maker_client_order_id: ClientOrderId,
    /// Taker's client order id.
    pub taker_client_order_id: ClientOrderId,
    /// Maker exchange order id.
    pub maker_order_id: OrderId,
    /// Taker exchange order id.
    pub taker_order_id: OrderId,
    /// Trade price.
    pub price: Price,
    /// Traded quantity.
    pub quantity: Quantity,
    /// The maker's side.
    pub maker_side: Side,
    /// Whether the trade fully consumed the maker.
    pub maker_exhausted: bool,
}

/// L2 depth event: bids highest price first, asks lowest price first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LTwoOrderBookEvent {
    /// Symbol.
    pub symbol: String,
    /// Bid rows, best first.
    pub bids: Vec<DepthLevel>,
    /// Ask rows, best first.
    pub asks: Vec<DepthLevel>,
    /// Simulation timestamp of publication.
    pub timestamp: u64,
}

/// An expiration trigger removed its order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationAckEvent {
    /// The expired order.
    pub order_id: OrderId,
    /// The original placer's client order id.
    pub client_order_id: ClientOrderId,
    /// The original placing trader.
    pub trader_id: String,
    /// Level price at removal.
    pub price: Price,
    /// Quantity removed.
    pub quantity: Quantity,
    /// The trigger's original timeout, echoed.
    pub timeout: u64,
    /// Symbol.
    pub symbol: String,
}

/// An expiration trigger found its order already gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationRejectEvent {
    /// The id the trigger addressed.
    pub order_id: OrderId,
    /// Last known client order id, zero when unknown.
    pub client_order_id: ClientOrderId,
    /// Last known placing trader, empty when unknown.
    pub trader_id: String,
    /// The trigger's original timeout, echoed.
    pub timeout: u64,
    /// Symbol.
    pub symbol: String,
}

/// Global reset echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BangEvent {
    /// Simulation timestamp of the reset.
    pub timestamp: u64,
}
