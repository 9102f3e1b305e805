//! Event adapter: translates inbound order-flow requests into engine calls
//! and forwards engine callbacks as precisely typed outbound events.

use super::bus::EventBus;
use super::events::{
    BangEvent, CancelRejectEvent, ExpirationAckEvent, ExpirationRejectEvent, FillEvent,
    FullCancelAckEvent, FullCancelRequest, LTwoOrderBookEvent, LimitOrderRequest, MarketEvent,
    MarketOrderAckEvent, MarketOrderRequest, OrderAckEvent, OrderKind, OrderRejectEvent,
    OrderRequest, PartialCancelAckEvent, PartialCancelRequest, TradeEvent, topics,
};
use super::fills::FillTracker;
use crate::engine::{
    CancelRejected, ClientOrderId, ExecutionListener, ExpirationAcked, ExpirationRejected,
    FullCancelAcked, LimitOrderAcked, MakerFill, MarketOrderAcked, MatchingEngine,
    PartialCancelAcked, TakerFill, TradeExecuted, TraderId,
};
use crate::orderbook::DepthLevel;
use crate::pricelevel::OrderId;
use std::collections::HashMap;
use tracing::{error, trace, warn};

/// Mapping and aggregation state the adapter keeps per live order.
#[derive(Debug, Default)]
struct AdapterState {
    /// `(trader, client order id)` → exchange id.
    client_to_exchange: HashMap<(TraderId, ClientOrderId), OrderId>,
    /// Exchange id → `(trader, client order id)`.
    exchange_to_client: HashMap<OrderId, (TraderId, ClientOrderId)>,
    /// Exchange id → limit or market.
    kinds: HashMap<OrderId, OrderKind>,
    /// Exchange id → running fill aggregates.
    fills: HashMap<OrderId, FillTracker>,
    /// Exchange id → agent that asked for the expiration check.
    expiration_senders: HashMap<OrderId, TraderId>,
    /// L2 rows last published, used to suppress no-op snapshots.
    last_bids: Option<Vec<DepthLevel>>,
    last_asks: Option<Vec<DepthLevel>>,
}

impl AdapterState {
    fn register(&mut self, order_id: OrderId, trader: &str, cid: ClientOrderId, kind: OrderKind) {
        if self
            .exchange_to_client
            .insert(order_id, (trader.to_string(), cid))
            .is_some()
        {
            warn!("double register of order {}", order_id);
        }
        self.client_to_exchange
            .insert((trader.to_string(), cid), order_id);
        self.kinds.insert(order_id, kind);
    }

    fn resolve(&self, trader: &str, cid: ClientOrderId) -> Option<OrderId> {
        self.client_to_exchange
            .get(&(trader.to_string(), cid))
            .copied()
    }

    fn kind(&self, order_id: OrderId) -> Option<OrderKind> {
        self.kinds.get(&order_id).copied()
    }

    /// Removes every trace of an order that must be tracked; a miss is a
    /// warning, never fatal.
    fn unregister(&mut self, order_id: OrderId) {
        match self.exchange_to_client.remove(&order_id) {
            Some(key) => {
                self.client_to_exchange.remove(&key);
            }
            None => warn!("remove of untracked order {}", order_id),
        }
        self.kinds.remove(&order_id);
        self.fills.remove(&order_id);
    }

    /// Removes every trace of an order, quietly tolerating ids that were
    /// never registered (transient takers).
    fn remove_if_tracked(&mut self, order_id: OrderId) {
        if let Some(key) = self.exchange_to_client.remove(&order_id) {
            self.client_to_exchange.remove(&key);
        }
        self.kinds.remove(&order_id);
        self.fills.remove(&order_id);
    }
}

/// Borrowed view the engine calls back into: adapter state plus the bus,
/// with the engine itself deliberately out of reach.
struct AdapterSink<'a, B: EventBus> {
    symbol: &'a str,
    bus: &'a B,
    state: &'a mut AdapterState,
}

impl<'a, B: EventBus> AdapterSink<'a, B> {
    fn publish(&self, topic: String, event: MarketEvent) {
        if let Err(e) = self.bus.publish(&topic, event) {
            error!("dropping outbound event: {}", e);
        }
    }

    fn publish_to_trader(&self, trader: &str, event: MarketEvent) {
        self.publish(topics::trader(event.name(), trader), event);
    }

    fn publish_broadcast(&self, event: MarketEvent) {
        self.publish(topics::broadcast(event.name()), event);
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_event(
        &mut self,
        callback_order_id: OrderId,
        cid: ClientOrderId,
        side: crate::pricelevel::Side,
        price: crate::pricelevel::Price,
        quantity: crate::pricelevel::Quantity,
        leaves: Option<crate::pricelevel::Quantity>,
        trader: &str,
        is_maker: bool,
        is_final: bool,
    ) -> FillEvent {
        let tracker = self.state.fills.entry(callback_order_id).or_default();
        if is_final {
            // The closing callback reports the lifetime aggregate; the
            // unaccounted remainder is derived and folded at the last
            // segment's price.
            tracker.fold_final(quantity, price);
        } else {
            tracker.apply_segment(price, quantity);
        }
        let event = FillEvent {
            order_id: callback_order_id,
            client_order_id: cid,
            side,
            symbol: self.symbol.to_string(),
            price,
            quantity,
            leaves_quantity: leaves,
            cumulative_quantity: tracker.cumulative_quantity(),
            average_price: tracker.average_price(),
            is_maker,
            trader_id: trader.to_string(),
        };
        if is_final {
            self.state.fills.remove(&callback_order_id);
        }
        event
    }
}

impl<'a, B: EventBus> ExecutionListener for AdapterSink<'a, B> {
    fn on_limit_ack(&mut self, event: &LimitOrderAcked) {
        if event.remaining_quantity > 0 {
            self.state
                .register(event.order_id, &event.trader_id, event.client_order_id, OrderKind::Limit);
        }
        let outbound = MarketEvent::LimitOrderAck(OrderAckEvent {
            order_id: event.order_id,
            client_order_id: event.client_order_id,
            side: event.side,
            price: event.price,
            quantity: event.quantity,
            symbol: self.symbol.to_string(),
            timeout: event.timeout,
            trader_id: event.trader_id.clone(),
        });
        self.publish_to_trader(&event.trader_id, outbound.clone());
        // The expiration subsystem learns new (id, timeout) pairs here.
        self.publish_broadcast(outbound);
    }

    fn on_market_ack(&mut self, event: &MarketOrderAcked) {
        self.state
            .register(event.order_id, &event.trader_id, event.client_order_id, OrderKind::Market);
        let outbound = MarketEvent::MarketOrderAck(MarketOrderAckEvent {
            order_id: event.order_id,
            client_order_id: event.client_order_id,
            side: event.side,
            requested_quantity: event.requested_quantity,
            executed_quantity: event.executed_quantity,
            unfilled_quantity: event.unfilled_quantity,
            symbol: self.symbol.to_string(),
            trader_id: event.trader_id.clone(),
        });
        self.publish_to_trader(&event.trader_id, outbound);
    }

    fn on_trade(&mut self, event: &TradeExecuted) {
        let outbound = MarketEvent::Trade(TradeEvent {
            symbol: self.symbol.to_string(),
            trade_id: event.trade_id,
            maker_client_order_id: event.maker_client_order_id,
            taker_client_order_id: event.taker_client_order_id,
            maker_order_id: event.maker_order_id,
            taker_order_id: event.taker_order_id,
            price: event.price,
            quantity: event.quantity,
            maker_side: event.maker_side,
            maker_exhausted: event.maker_exhausted,
        });
        self.publish_to_trader(&event.maker_trader_id, outbound.clone());
        // Self-matching publishes once: the taker stream only gets a copy
        // when it is a different stream.
        if event.taker_trader_id != event.maker_trader_id {
            self.publish_to_trader(&event.taker_trader_id, outbound);
        }
    }

    fn on_maker_partial_fill(&mut self, event: &MakerFill) {
        let fill = self.fill_event(
            event.order_id,
            event.client_order_id,
            event.side,
            event.price,
            event.quantity,
            Some(event.leaves_quantity),
            &event.trader_id,
            true,
            false,
        );
        self.publish_to_trader(&event.trader_id, MarketEvent::PartialFillLimit(fill));
    }

    fn on_maker_full_fill(&mut self, event: &MakerFill) {
        let fill = self.fill_event(
            event.order_id,
            event.client_order_id,
            event.side,
            event.price,
            event.quantity,
            None,
            &event.trader_id,
            true,
            true,
        );
        self.publish_to_trader(&event.trader_id, MarketEvent::FullFillLimit(fill));
        self.state.unregister(event.order_id);
    }

    fn on_taker_partial_fill(&mut self, event: &TakerFill) {
        let kind = self.state.kind(event.order_id).unwrap_or(OrderKind::Limit);
        let fill = self.fill_event(
            event.order_id,
            event.client_order_id,
            event.side,
            event.price,
            event.quantity,
            Some(event.leaves_quantity),
            &event.trader_id,
            false,
            false,
        );
        let outbound = match kind {
            OrderKind::Limit => MarketEvent::PartialFillLimit(fill),
            OrderKind::Market => MarketEvent::PartialFillMarket(fill),
        };
        self.publish_to_trader(&event.trader_id, outbound);
    }

    fn on_taker_full_fill(&mut self, event: &TakerFill) {
        let kind = self.state.kind(event.order_id).unwrap_or(OrderKind::Limit);
        let fill = self.fill_event(
            event.order_id,
            event.client_order_id,
            event.side,
            event.price,
            event.quantity,
            None,
            &event.trader_id,
            false,
            true,
        );
        let outbound = match kind {
            OrderKind::Limit => MarketEvent::FullFillLimit(fill),
            OrderKind::Market => MarketEvent::FullFillMarket(fill),
        };
        self.publish_to_trader(&event.trader_id, outbound);
        self.state.remove_if_tracked(event.order_id);
    }

    fn on_full_cancel(&mut self, event: &FullCancelAcked) {
        let outbound = MarketEvent::FullCancelLimitAck(FullCancelAckEvent {
            order_id: event.order_id,
            client_order_id: event.req_client_order_id,
            side: event.side,
            price: event.price,
            cancelled_quantity: event.quantity,
            symbol: self.symbol.to_string(),
            trader_id: event.req_trader_id.clone(),
        });
        self.publish_to_trader(&event.req_trader_id, outbound.clone());
        self.publish_broadcast(outbound);
        self.state.unregister(event.order_id);
    }

    fn on_full_cancel_reject(&mut self, event: &CancelRejected) {
        let outbound = MarketEvent::FullCancelLimitReject(CancelRejectEvent {
            client_order_id: event.req_client_order_id,
            symbol: self.symbol.to_string(),
            reason: event.reason.clone(),
            trader_id: event.req_trader_id.clone(),
        });
        self.publish_to_trader(&event.req_trader_id, outbound);
    }

    fn on_partial_cancel(&mut self, event: &PartialCancelAcked) {
        let outbound = MarketEvent::PartialCancelLimitAck(PartialCancelAckEvent {
            order_id: event.order_id,
            client_order_id: event.req_client_order_id,
            price: event.price,
            cancelled_quantity: event.cancelled_quantity,
            remaining_quantity: event.remaining_quantity,
            symbol: self.symbol.to_string(),
            trader_id: event.req_trader_id.clone(),
        });
        self.publish_to_trader(&event.req_trader_id, outbound);
        if event.remaining_quantity == 0 {
            // Reduction removed the order outright.
            self.state.remove_if_tracked(event.order_id);
        }
    }

    fn on_partial_cancel_reject(&mut self, event: &CancelRejected) {
        let outbound = MarketEvent::PartialCancelLimitReject(CancelRejectEvent {
            client_order_id: event.req_client_order_id,
            symbol: self.symbol.to_string(),
            reason: event.reason.clone(),
            trader_id: event.req_trader_id.clone(),
        });
        self.publish_to_trader(&event.req_trader_id, outbound);
    }

    fn on_expiration_ack(&mut self, event: &ExpirationAcked) {
        let trigger_sender = self.state.expiration_senders.remove(&event.order_id);
        let outbound = MarketEvent::AckTriggerExpiredLimitOrder(ExpirationAckEvent {
            order_id: event.order_id,
            client_order_id: event.client_order_id,
            trader_id: event.trader_id.clone(),
            price: event.price,
            quantity: event.quantity,
            timeout: event.timeout,
            symbol: self.symbol.to_string(),
        });
        if let Some(sender) = &trigger_sender {
            self.publish_to_trader(sender, outbound.clone());
        }
        if trigger_sender.as_deref() != Some(event.trader_id.as_str()) {
            self.publish_to_trader(&event.trader_id, outbound.clone());
        }
        self.publish_broadcast(outbound);
        self.state.unregister(event.order_id);
    }

    fn on_expiration_reject(&mut self, event: &ExpirationRejected) {
        // The order mapping stays: the order may still be live.
        let trigger_sender = self.state.expiration_senders.remove(&event.order_id);
        let outbound = MarketEvent::RejectTriggerExpiredLimitOrder(ExpirationRejectEvent {
            order_id: event.order_id,
            client_order_id: event.client_order_id,
            trader_id: event.trader_id.clone(),
            timeout: event.timeout,
            symbol: self.symbol.to_string(),
        });
        match trigger_sender {
            Some(sender) => self.publish_to_trader(&sender, outbound),
            None => {
                warn!("expiration reject for {} with no recorded trigger sender", event.order_id);
                self.publish_broadcast(outbound);
            }
        }
    }

    fn on_depth_snapshot(&mut self, bids: &[u64], asks: &[u64]) {
        let rows = |flat: &[u64]| {
            flat.chunks_exact(2)
                .map(|pair| DepthLevel {
                    price: pair[0],
                    quantity: pair[1],
                })
                .collect::<Vec<_>>()
        };
        let bids = rows(bids);
        let asks = rows(asks);

        let unchanged = self.state.last_bids.as_ref() == Some(&bids)
            && self.state.last_asks.as_ref() == Some(&asks);
        if unchanged {
            return;
        }

        let outbound = MarketEvent::LTwoOrderBook(LTwoOrderBookEvent {
            symbol: self.symbol.to_string(),
            bids: bids.clone(),
            asks: asks.clone(),
            timestamp: self.bus.now(),
        });
        self.publish(topics::symbol("LTwoOrderBookEvent", self.symbol), outbound);
        self.state.last_bids = Some(bids);
        self.state.last_asks = Some(asks);
    }
}

/// The event adapter for one symbol: owns the engine, the client↔exchange
/// id mapping, per-order fill aggregates, and the diff-gated L2 feed.
///
/// The adapter runs on the event-bus dispatch thread: one inbound request
/// is fully processed, and all outbound events it triggers published,
/// before the next request is handled.
pub struct ExchangeAdapter<B: EventBus> {
    symbol: String,
    engine: MatchingEngine,
    bus: B,
    state: AdapterState,
}

impl<B: EventBus> ExchangeAdapter<B> {
    /// Creates an adapter with a fresh engine for `symbol`.
    pub fn new(symbol: &str, bus: B) -> Self {
        Self {
            symbol: symbol.to_string(),
            engine: MatchingEngine::new(symbol),
            bus,
            state: AdapterState::default(),
        }
    }

    /// The symbol this adapter serves.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Read access to the engine.
    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// Read access to the bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Handles one inbound request from `sender`. The sender is the trader
    /// id for every order the request creates or addresses.
    pub fn handle(&mut self, sender: &str, request: OrderRequest) {
        if let Some(symbol) = request.symbol()
            && symbol != self.symbol
        {
            // Topic filtering should have prevented this.
            trace!("dropping {} request for foreign symbol {}", sender, symbol);
            return;
        }
        match request {
            OrderRequest::Limit(r) => self.handle_limit(sender, r),
            OrderRequest::Market(r) => self.handle_market(sender, r),
            OrderRequest::FullCancelLimit(r) => self.handle_full_cancel_limit(sender, r),
            OrderRequest::PartialCancelLimit(r) => self.handle_partial_cancel_limit(sender, r),
            OrderRequest::FullCancelMarket(r) => self.reject_market_cancel(sender, r.client_order_id, false),
            OrderRequest::PartialCancelMarket(r) => self.reject_market_cancel(sender, r.client_order_id, true),
            OrderRequest::TriggerExpiredLimitOrder(r) => {
                self.handle_expiration_trigger(sender, r.target_order_id, r.original_timeout)
            }
            OrderRequest::Bang => self.handle_bang(),
        }
    }

    fn sink(&mut self) -> AdapterSink<'_, B> {
        AdapterSink {
            symbol: &self.symbol,
            bus: &self.bus,
            state: &mut self.state,
        }
    }

    fn publish_depth(&mut self) {
        let mut sink = AdapterSink {
            symbol: &self.symbol,
            bus: &self.bus,
            state: &mut self.state,
        };
        self.engine.emit_depth(&mut sink);
    }

    fn handle_limit(&mut self, sender: &str, request: LimitOrderRequest) {
        if request.quantity == 0 || request.price == 0 {
            let reject = MarketEvent::LimitOrderReject(OrderRejectEvent {
                client_order_id: request.client_order_id,
                symbol: self.symbol.clone(),
                reason: "invalid price or quantity".to_string(),
                trader_id: sender.to_string(),
            });
            self.sink().publish_to_trader(sender, reject);
            return;
        }
        let mut sink = AdapterSink {
            symbol: &self.symbol,
            bus: &self.bus,
            state: &mut self.state,
        };
        self.engine.place_limit(
            request.side,
            request.price,
            request.quantity,
            request.timeout,
            sender,
            request.client_order_id,
            &mut sink,
        );
        self.publish_depth();
    }

    fn handle_market(&mut self, sender: &str, request: MarketOrderRequest) {
        if request.quantity == 0 {
            let reject = MarketEvent::MarketOrderReject(OrderRejectEvent {
                client_order_id: request.client_order_id,
                symbol: self.symbol.clone(),
                reason: "invalid quantity".to_string(),
                trader_id: sender.to_string(),
            });
            self.sink().publish_to_trader(sender, reject);
            return;
        }
        let mut sink = AdapterSink {
            symbol: &self.symbol,
            bus: &self.bus,
            state: &mut self.state,
        };
        let order_id = self.engine.place_market(
            request.side,
            request.quantity,
            sender,
            request.client_order_id,
            &mut sink,
        );
        // Market ids are terminal once the dispatch returns.
        self.state.remove_if_tracked(order_id);
        self.publish_depth();
    }

    fn handle_full_cancel_limit(&mut self, sender: &str, request: FullCancelRequest) {
        let target = self.state.resolve(sender, request.target_client_order_id);
        let Some(order_id) = target.filter(|id| self.state.kind(*id) == Some(OrderKind::Limit))
        else {
            let reject = MarketEvent::FullCancelLimitReject(CancelRejectEvent {
                client_order_id: request.client_order_id,
                symbol: self.symbol.clone(),
                reason: "no such limit order".to_string(),
                trader_id: sender.to_string(),
            });
            self.sink().publish_to_trader(sender, reject);
            return;
        };
        let mut sink = AdapterSink {
            symbol: &self.symbol,
            bus: &self.bus,
            state: &mut self.state,
        };
        self.engine
            .cancel(order_id, sender, request.client_order_id, &mut sink);
        self.publish_depth();
    }

    fn handle_partial_cancel_limit(&mut self, sender: &str, request: PartialCancelRequest) {
        let reject = |adapter: &mut Self, reason: &str| {
            let event = MarketEvent::PartialCancelLimitReject(CancelRejectEvent {
                client_order_id: request.client_order_id,
                symbol: adapter.symbol.clone(),
                reason: reason.to_string(),
                trader_id: sender.to_string(),
            });
            adapter.sink().publish_to_trader(sender, event);
        };

        if request.cancel_quantity == 0 {
            reject(self, "invalid cancel quantity");
            return;
        }
        let target = self.state.resolve(sender, request.target_client_order_id);
        let Some(order_id) = target.filter(|id| self.state.kind(*id) == Some(OrderKind::Limit))
        else {
            reject(self, "no such limit order");
            return;
        };
        // A fill may already have emptied the order; the request itself
        // still gets an answer.
        let Some(details) = self.engine.get_order_details(order_id) else {
            reject(self, "order no longer resting");
            return;
        };

        let mut sink = AdapterSink {
            symbol: &self.symbol,
            bus: &self.bus,
            state: &mut self.state,
        };
        if request.cancel_quantity >= details.quantity {
            // Reduction at or beyond the resting size promotes to a full
            // cancel.
            self.engine
                .cancel(order_id, sender, request.client_order_id, &mut sink);
        } else {
            self.engine.modify_quantity(
                order_id,
                details.quantity - request.cancel_quantity,
                sender,
                request.client_order_id,
                &mut sink,
            );
        }
        self.publish_depth();
    }

    fn reject_market_cancel(&mut self, sender: &str, cid: ClientOrderId, partial: bool) {
        // Market orders cannot be cancelled post-submission; the engine is
        // never consulted.
        let payload = CancelRejectEvent {
            client_order_id: cid,
            symbol: self.symbol.clone(),
            reason: "market orders cannot be cancelled".to_string(),
            trader_id: sender.to_string(),
        };
        let event = if partial {
            MarketEvent::PartialCancelMarketReject(payload)
        } else {
            MarketEvent::FullCancelMarketReject(payload)
        };
        self.sink().publish_to_trader(sender, event);
    }

    fn handle_expiration_trigger(&mut self, sender: &str, order_id: OrderId, original_timeout: u64) {
        if self
            .state
            .expiration_senders
            .insert(order_id, sender.to_string())
            .is_some()
        {
            warn!("overlapping expiration triggers for {}", order_id);
        }
        let mut sink = AdapterSink {
            symbol: &self.symbol,
            bus: &self.bus,
            state: &mut self.state,
        };
        self.engine
            .cancel_if_expired(order_id, original_timeout, &mut sink);
        self.publish_depth();
    }

    fn handle_bang(&mut self) {
        trace!("bang: resetting {} adapter and engine", self.symbol);
        self.state = AdapterState::default();
        self.engine.reset();
        let timestamp = self.bus.now();
        self.sink()
            .publish_broadcast(MarketEvent::Bang(BangEvent { timestamp }));
    }

    #[cfg(test)]
    pub(crate) fn tracked_orders(&self) -> usize {
        self.state.exchange_to_client.len()
    }
}
