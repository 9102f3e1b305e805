//! Engine callback payloads and the listener seam.
//!
//! The engine emits a closed set of lifecycle callbacks, all synchronous on
//! the stack of the originating engine call. Implementors override the
//! callbacks they care about; every method defaults to a no-op.

use crate::pricelevel::{OrderId, Price, Quantity, Side};
use uuid::Uuid;

/// Identifier of the agent that owns an order. The event adapter treats the
/// sender of an inbound request as the trader id.
pub type TraderId = String;

/// Client-assigned order identifier, unique per trader.
pub type ClientOrderId = u64;

/// A limit order was accepted. Emitted before any fill callback for the
/// same call. `remaining_quantity` is what rested (zero for a full take,
/// in which case `order_id` is transient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrderAcked {
    /// Resting id, or a transient id when nothing rested.
    pub order_id: OrderId,
    /// Side of the incoming order.
    pub side: Side,
    /// Limit price.
    pub price: Price,
    /// Original requested quantity.
    pub quantity: Quantity,
    /// Quantity left resting after the match walk.
    pub remaining_quantity: Quantity,
    /// Owner of the order.
    pub trader_id: TraderId,
    /// Owner's id for the order.
    pub client_order_id: ClientOrderId,
    /// Expiration timestamp carried opaquely for the expiration subsystem.
    pub timeout: u64,
}

/// A market order was accepted and matched. Emitted before the fill
/// callbacks are replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketOrderAcked {
    /// Transient id labelling this market order's fills.
    pub order_id: OrderId,
    /// Side of the incoming order.
    pub side: Side,
    /// Quantity requested.
    pub requested_quantity: Quantity,
    /// Quantity actually executed.
    pub executed_quantity: Quantity,
    /// Quantity that found no liquidity.
    pub unfilled_quantity: Quantity,
    /// Owner of the order.
    pub trader_id: TraderId,
    /// Owner's id for the order.
    pub client_order_id: ClientOrderId,
}

/// One trade segment between a maker and a taker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeExecuted {
    /// Unique trade identifier.
    pub trade_id: Uuid,
    /// Resting order consumed.
    pub maker_order_id: OrderId,
    /// Maker's side.
    pub maker_side: Side,
    /// Incoming order.
    pub taker_order_id: OrderId,
    /// Taker's side.
    pub taker_side: Side,
    /// Trade price (the maker's level price).
    pub price: Price,
    /// Traded quantity.
    pub quantity: Quantity,
    /// Whether this segment fully consumed the maker.
    pub maker_exhausted: bool,
    /// Maker owner.
    pub maker_trader_id: TraderId,
    /// Maker's client order id.
    pub maker_client_order_id: ClientOrderId,
    /// Taker owner.
    pub taker_trader_id: TraderId,
    /// Taker's client order id.
    pub taker_client_order_id: ClientOrderId,
}

/// A fill delivered to a resting (maker) order.
///
/// On a partial fill `quantity` is the segment quantity; on a full fill it
/// is the order's lifetime aggregate filled quantity and `price` is the
/// final segment's price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerFill {
    /// The maker order.
    pub order_id: OrderId,
    /// Fill price.
    pub price: Price,
    /// Segment quantity (partial) or aggregate filled quantity (full).
    pub quantity: Quantity,
    /// Quantity still resting after this segment (zero on a full fill).
    pub leaves_quantity: Quantity,
    /// The maker's side.
    pub side: Side,
    /// Maker owner.
    pub trader_id: TraderId,
    /// Maker's client order id.
    pub client_order_id: ClientOrderId,
}

/// A fill delivered to the incoming (taker) order.
///
/// Same aggregate convention as [`MakerFill`]: partials carry the segment
/// quantity and the running leaves quantity, the closing full fill carries
/// the aggregate executed quantity and a zero leaves quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakerFill {
    /// The taker order (resting id if it booked, transient otherwise).
    pub order_id: OrderId,
    /// The taker's side.
    pub side: Side,
    /// Fill price (last segment price on a full fill).
    pub price: Price,
    /// Segment quantity (partial) or aggregate executed quantity (full).
    pub quantity: Quantity,
    /// Quantity still open after this segment.
    pub leaves_quantity: Quantity,
    /// Taker owner.
    pub trader_id: TraderId,
    /// Taker's client order id.
    pub client_order_id: ClientOrderId,
}

/// A resting order was cancelled whole.
///
/// Carries the side itself: once the order is gone the book can no longer
/// answer for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullCancelAcked {
    /// The cancelled order.
    pub order_id: OrderId,
    /// Its level price.
    pub price: Price,
    /// Quantity removed.
    pub quantity: Quantity,
    /// Side it rested on.
    pub side: Side,
    /// Requesting trader (not necessarily the owner).
    pub req_trader_id: TraderId,
    /// The cancel request's own client order id.
    pub req_client_order_id: ClientOrderId,
}

/// A resting order was reduced in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialCancelAcked {
    /// The reduced order; id unchanged.
    pub order_id: OrderId,
    /// Its level price.
    pub price: Price,
    /// Quantity removed by this operation.
    pub cancelled_quantity: Quantity,
    /// Quantity still resting afterwards (zero when the reduction removed
    /// the order outright).
    pub remaining_quantity: Quantity,
    /// Requesting trader.
    pub req_trader_id: TraderId,
    /// The request's own client order id.
    pub req_client_order_id: ClientOrderId,
}

/// A cancel or modify addressed an id the book does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelRejected {
    /// The id the request addressed.
    pub order_id: OrderId,
    /// Human-readable reason.
    pub reason: String,
    /// Requesting trader.
    pub req_trader_id: TraderId,
    /// The request's own client order id.
    pub req_client_order_id: ClientOrderId,
}

/// An expiration trigger removed its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpirationAcked {
    /// The expired order.
    pub order_id: OrderId,
    /// Its level price.
    pub price: Price,
    /// Quantity removed.
    pub quantity: Quantity,
    /// The order's original owner, from the engine's metadata store.
    pub trader_id: TraderId,
    /// The original client order id.
    pub client_order_id: ClientOrderId,
    /// Timeout echoed from the trigger.
    pub timeout: u64,
}

/// An expiration trigger addressed an order that is no longer resting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpirationRejected {
    /// The id the trigger addressed.
    pub order_id: OrderId,
    /// Last known owner, empty when the engine no longer has metadata.
    pub trader_id: TraderId,
    /// Last known client order id, zero when unknown.
    pub client_order_id: ClientOrderId,
    /// Timeout echoed from the trigger.
    pub timeout: u64,
}

/// Receiver of the engine's lifecycle callbacks.
///
/// All callbacks run synchronously inside the engine call that produced
/// them; the engine completes its book mutation before invoking any of
/// them. Implementations must not call back into the engine.
pub trait ExecutionListener {
    /// A limit order was accepted.
    fn on_limit_ack(&mut self, event: &LimitOrderAcked) {
        let _ = event;
    }

    /// A market order was accepted and matched.
    fn on_market_ack(&mut self, event: &MarketOrderAcked) {
        let _ = event;
    }

    /// A trade segment occurred.
    fn on_trade(&mut self, event: &TradeExecuted) {
        let _ = event;
    }

    /// A maker was partially consumed.
    fn on_maker_partial_fill(&mut self, event: &MakerFill) {
        let _ = event;
    }

    /// A maker was fully consumed; `quantity` is its lifetime aggregate.
    fn on_maker_full_fill(&mut self, event: &MakerFill) {
        let _ = event;
    }

    /// The taker executed a segment but is not yet done.
    fn on_taker_partial_fill(&mut self, event: &TakerFill) {
        let _ = event;
    }

    /// The taker is fully executed; `quantity` is its aggregate.
    fn on_taker_full_fill(&mut self, event: &TakerFill) {
        let _ = event;
    }

    /// A full cancel succeeded.
    fn on_full_cancel(&mut self, event: &FullCancelAcked) {
        let _ = event;
    }

    /// A full cancel addressed an unknown order.
    fn on_full_cancel_reject(&mut self, event: &CancelRejected) {
        let _ = event;
    }

    /// A quantity reduction succeeded.
    fn on_partial_cancel(&mut self, event: &PartialCancelAcked) {
        let _ = event;
    }

    /// A quantity reduction addressed an unknown order.
    fn on_partial_cancel_reject(&mut self, event: &CancelRejected) {
        let _ = event;
    }

    /// An expiration trigger removed its order.
    fn on_expiration_ack(&mut self, event: &ExpirationAcked) {
        let _ = event;
    }

    /// An expiration trigger found its order already gone.
    fn on_expiration_reject(&mut self, event: &ExpirationRejected) {
        let _ = event;
    }

    /// Depth snapshot in the flat wire layout: alternating price and
    /// aggregate quantity, bids highest first, asks lowest first.
    fn on_depth_snapshot(&mut self, bids: &[u64], asks: &[u64]) {
        let _ = (bids, asks);
    }
}
