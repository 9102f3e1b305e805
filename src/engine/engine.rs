//! The matching engine: placement, cancellation, expiration and the
//! ordered callback protocol.

use super::events::{
    CancelRejected, ClientOrderId, ExecutionListener, ExpirationAcked, ExpirationRejected,
    FullCancelAcked, LimitOrderAcked, MakerFill, MarketOrderAcked, PartialCancelAcked, TakerFill,
    TradeExecuted, TraderId,
};
use crate::orderbook::{Clearing, OrderBook, OrderDetails, RequeuePriority};
use crate::pricelevel::{OrderId, Price, Quantity, Side};
use std::collections::HashMap;
use tracing::{trace, warn};
use uuid::Uuid;

/// Deterministic trade id source: v5 uuids over a per-engine namespace.
#[derive(Debug)]
struct TradeIdGenerator {
    namespace: Uuid,
    counter: u64,
}

impl TradeIdGenerator {
    fn new() -> Self {
        Self {
            namespace: Uuid::new_v4(),
            counter: 0,
        }
    }

    fn next(&mut self) -> Uuid {
        self.counter += 1;
        Uuid::new_v5(&self.namespace, &self.counter.to_be_bytes())
    }
}

/// Per-order metadata the engine keeps while an order is non-terminal.
#[derive(Debug, Clone)]
struct OrderContext {
    trader_id: TraderId,
    client_order_id: ClientOrderId,
    timeout: u64,
    /// Lifetime filled quantity, taker-phase fills included. Reported as
    /// the aggregate on the order's full-fill callback.
    filled_quantity: Quantity,
}

/// Matching engine for one symbol.
///
/// Wraps the book and adds order identity: who placed each resting order,
/// under which client id, with which timeout, and how much of it has
/// filled so far. Every mutating call takes an [`ExecutionListener`] and
/// reports its outcome through the ordered callback protocol: one
/// acknowledgement, then per match segment (best price first, FIFO within
/// a level) a trade, a maker fill and a taker fill, the closing taker
/// segment collapsing into a single full-fill callback.
#[derive(Debug)]
pub struct MatchingEngine {
    book: OrderBook,
    contexts: HashMap<OrderId, OrderContext>,
    trade_ids: TradeIdGenerator,
}

impl MatchingEngine {
    /// Creates an engine with an empty book for `symbol`.
    pub fn new(symbol: &str) -> Self {
        Self {
            book: OrderBook::new(symbol),
            contexts: HashMap::new(),
            trade_ids: TradeIdGenerator::new(),
        }
    }

    /// The symbol this engine matches.
    pub fn symbol(&self) -> &str {
        self.book.symbol()
    }

    /// Read access to the underlying book.
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Places a limit order: match first, book any remainder.
    ///
    /// Returns the resting id when a remainder booked, `None` when the
    /// order fully executed as a taker (its callbacks then carry a
    /// transient id).
    #[allow(clippy::too_many_arguments)]
    pub fn place_limit(
        &mut self,
        side: Side,
        price: Price,
        quantity: Quantity,
        timeout: u64,
        trader_id: &str,
        client_order_id: ClientOrderId,
        listener: &mut dyn ExecutionListener,
    ) -> Option<OrderId> {
        trace!(
            "place_limit {} {}@{} x{} for {}/{}",
            side, quantity, price, timeout, trader_id, client_order_id
        );
        let outcome = self.book.limit_match_book(side, price, quantity);
        let executed = quantity - outcome.remaining;

        let ack_id = match outcome.booked {
            Some(resting) => {
                self.contexts.insert(
                    resting,
                    OrderContext {
                        trader_id: trader_id.to_string(),
                        client_order_id,
                        timeout,
                        filled_quantity: executed,
                    },
                );
                resting
            }
            // Fully taken: a transient id labels the ack and the fills.
            None => self.book.allocate_transient_id(),
        };

        listener.on_limit_ack(&LimitOrderAcked {
            order_id: ack_id,
            side,
            price,
            quantity,
            remaining_quantity: outcome.remaining,
            trader_id: trader_id.to_string(),
            client_order_id,
            timeout,
        });

        self.replay_fills(
            ack_id,
            side,
            quantity,
            outcome.remaining,
            trader_id,
            client_order_id,
            &outcome.clearings,
            listener,
        );
        outcome.booked
    }

    /// Places a market order. The allocated transient id is returned and
    /// is terminal by the time this call returns: the engine keeps no
    /// metadata for it afterwards.
    pub fn place_market(
        &mut self,
        side: Side,
        quantity: Quantity,
        trader_id: &str,
        client_order_id: ClientOrderId,
        listener: &mut dyn ExecutionListener,
    ) -> OrderId {
        trace!(
            "place_market {} x{} for {}/{}",
            side, quantity, trader_id, client_order_id
        );
        let order_id = self.book.allocate_transient_id();
        self.contexts.insert(
            order_id,
            OrderContext {
                trader_id: trader_id.to_string(),
                client_order_id,
                timeout: 0,
                filled_quantity: 0,
            },
        );

        let (remaining, clearings) = self.book.market_match(side, quantity);
        let executed = quantity - remaining;

        listener.on_market_ack(&MarketOrderAcked {
            order_id,
            side,
            requested_quantity: quantity,
            executed_quantity: executed,
            unfilled_quantity: remaining,
            trader_id: trader_id.to_string(),
            client_order_id,
        });

        self.replay_fills(
            order_id,
            side,
            quantity,
            remaining,
            trader_id,
            client_order_id,
            &clearings,
            listener,
        );
        self.contexts.remove(&order_id);
        order_id
    }

    /// Replays match clearings as the ordered trade / maker-fill /
    /// taker-fill callback sequence.
    #[allow(clippy::too_many_arguments)]
    fn replay_fills(
        &mut self,
        taker_id: OrderId,
        taker_side: Side,
        requested: Quantity,
        remaining: Quantity,
        taker_trader: &str,
        taker_cid: ClientOrderId,
        clearings: &[Clearing],
        listener: &mut dyn ExecutionListener,
    ) {
        let executed_total = requested - remaining;
        let mut taker_cum: Quantity = 0;

        for clearing in clearings {
            for fill in &clearing.fills {
                let (maker_trader, maker_cid, maker_total) =
                    match self.contexts.get_mut(&fill.maker_id) {
                        Some(ctx) => {
                            ctx.filled_quantity += fill.quantity;
                            (
                                ctx.trader_id.clone(),
                                ctx.client_order_id,
                                ctx.filled_quantity,
                            )
                        }
                        None => {
                            warn!("maker {} has no context entry", fill.maker_id);
                            (String::new(), 0, fill.quantity)
                        }
                    };

                listener.on_trade(&TradeExecuted {
                    trade_id: self.trade_ids.next(),
                    maker_order_id: fill.maker_id,
                    maker_side: taker_side.opposite(),
                    taker_order_id: taker_id,
                    taker_side,
                    price: clearing.price,
                    quantity: fill.quantity,
                    maker_exhausted: fill.exhausted,
                    maker_trader_id: maker_trader.clone(),
                    maker_client_order_id: maker_cid,
                    taker_trader_id: taker_trader.to_string(),
                    taker_client_order_id: taker_cid,
                });

                let maker_fill = MakerFill {
                    order_id: fill.maker_id,
                    price: clearing.price,
                    quantity: if fill.exhausted {
                        maker_total
                    } else {
                        fill.quantity
                    },
                    leaves_quantity: if fill.exhausted {
                        0
                    } else {
                        self.book
                            .order_details(fill.maker_id)
                            .map(|d| d.quantity)
                            .unwrap_or(0)
                    },
                    side: taker_side.opposite(),
                    trader_id: maker_trader,
                    client_order_id: maker_cid,
                };
                if fill.exhausted {
                    listener.on_maker_full_fill(&maker_fill);
                    self.contexts.remove(&fill.maker_id);
                } else {
                    listener.on_maker_partial_fill(&maker_fill);
                }

                taker_cum += fill.quantity;
                let closing = remaining == 0 && taker_cum == executed_total;
                let taker_fill = TakerFill {
                    order_id: taker_id,
                    side: taker_side,
                    price: clearing.price,
                    quantity: if closing { executed_total } else { fill.quantity },
                    leaves_quantity: requested - taker_cum,
                    trader_id: taker_trader.to_string(),
                    client_order_id: taker_cid,
                };
                if closing {
                    listener.on_taker_full_fill(&taker_fill);
                } else {
                    listener.on_taker_partial_fill(&taker_fill);
                }
            }
        }
    }

    /// Cancels a resting order whole. The requester's identity is echoed in
    /// the callback; the book supplies price, quantity and side.
    pub fn cancel(
        &mut self,
        order_id: OrderId,
        req_trader_id: &str,
        req_client_order_id: ClientOrderId,
        listener: &mut dyn ExecutionListener,
    ) -> bool {
        match self.book.cancel_order(order_id) {
            Some((price, quantity, side)) => {
                self.contexts.remove(&order_id);
                listener.on_full_cancel(&FullCancelAcked {
                    order_id,
                    price,
                    quantity,
                    side,
                    req_trader_id: req_trader_id.to_string(),
                    req_client_order_id,
                });
                true
            }
            None => {
                listener.on_full_cancel_reject(&CancelRejected {
                    order_id,
                    reason: "order not resting".to_string(),
                    req_trader_id: req_trader_id.to_string(),
                    req_client_order_id,
                });
                false
            }
        }
    }

    /// Attempts the removal an expiration trigger asked for. The original
    /// owner is looked up in the engine's own metadata store, never taken
    /// from the caller.
    pub fn cancel_if_expired(
        &mut self,
        order_id: OrderId,
        original_timeout: u64,
        listener: &mut dyn ExecutionListener,
    ) -> bool {
        match self.book.cancel_order(order_id) {
            Some((price, quantity, _side)) => {
                let (trader_id, client_order_id) = match self.contexts.remove(&order_id) {
                    Some(ctx) => (ctx.trader_id, ctx.client_order_id),
                    None => {
                        warn!("expired order {} had no context entry", order_id);
                        (String::new(), 0)
                    }
                };
                listener.on_expiration_ack(&ExpirationAcked {
                    order_id,
                    price,
                    quantity,
                    trader_id,
                    client_order_id,
                    timeout: original_timeout,
                });
                true
            }
            None => {
                let (trader_id, client_order_id) = self
                    .contexts
                    .get(&order_id)
                    .map(|ctx| (ctx.trader_id.clone(), ctx.client_order_id))
                    .unwrap_or_default();
                listener.on_expiration_reject(&ExpirationRejected {
                    order_id,
                    trader_id,
                    client_order_id,
                    timeout: original_timeout,
                });
                false
            }
        }
    }

    /// Reduces a resting order in place. Callers pass the absolute new
    /// quantity; a zero target removes the order, which is still reported
    /// through the partial-cancel callback (the consumer decides how to
    /// surface the removal).
    pub fn modify_quantity(
        &mut self,
        order_id: OrderId,
        new_quantity: Quantity,
        req_trader_id: &str,
        req_client_order_id: ClientOrderId,
        listener: &mut dyn ExecutionListener,
    ) -> bool {
        match self
            .book
            .modify_quantity(order_id, new_quantity, RequeuePriority::InPlace)
        {
            Some(report) => {
                if report.removed {
                    self.contexts.remove(&order_id);
                }
                listener.on_partial_cancel(&PartialCancelAcked {
                    order_id,
                    price: report.price,
                    cancelled_quantity: report.old_quantity.saturating_sub(report.new_quantity),
                    remaining_quantity: report.new_quantity,
                    req_trader_id: req_trader_id.to_string(),
                    req_client_order_id,
                });
                true
            }
            None => {
                listener.on_partial_cancel_reject(&CancelRejected {
                    order_id,
                    reason: "order not found".to_string(),
                    req_trader_id: req_trader_id.to_string(),
                    req_client_order_id,
                });
                false
            }
        }
    }

    /// Price, remaining quantity and side of a resting order. `None` once
    /// the order is gone, however it went.
    pub fn get_order_details(&self, order_id: OrderId) -> Option<OrderDetails> {
        self.book.order_details(order_id)
    }

    /// Fires a depth snapshot callback. Read-only; gating by diff is the
    /// consumer's concern.
    pub fn emit_depth(&self, listener: &mut dyn ExecutionListener) {
        let bids = self.book.depth_flat(Side::Buy);
        let asks = self.book.depth_flat(Side::Sell);
        listener.on_depth_snapshot(&bids, &asks);
    }

    /// Restores the freshly-constructed state: empty book, no metadata,
    /// id allocation restarted.
    pub fn reset(&mut self) {
        self.book.clear();
        self.contexts.clear();
        trace!("engine reset for {}", self.symbol());
    }
}
