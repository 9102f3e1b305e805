//! Side-remembering facade over the book core.

use super::book::BookCore;
use super::matching::{Clearing, MatchBookOutcome};
use super::modifications::{PriceModification, QuantityModification, RequeuePriority};
use crate::pricelevel::{OrderId, Price, Quantity, Side};
use std::collections::HashMap;
use tracing::trace;

/// Resting-order details as seen from outside the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDetails {
    /// Level price.
    pub price: Price,
    /// Remaining open quantity.
    pub quantity: Quantity,
    /// Side the order rests on.
    pub side: Side,
}

/// A single-symbol order book.
///
/// Wraps [`BookCore`] and remembers each resting order's side, so callers
/// can cancel or modify by id alone. Every operation that creates a resting
/// id records its side; every operation that removes or re-ids a resting
/// order updates the side map in the same step as the underlying mutation.
#[derive(Debug)]
pub struct OrderBook {
    symbol: String,
    core: BookCore,
    sides: HashMap<OrderId, Side>,
}

impl OrderBook {
    /// Creates an empty book for `symbol`.
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            core: BookCore::new(),
            sides: HashMap::new(),
        }
    }

    /// The symbol this book trades.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn forget_exhausted(&mut self, clearings: &[Clearing]) {
        for clearing in clearings {
            for fill in &clearing.fills {
                if fill.exhausted {
                    self.sides.remove(&fill.maker_id);
                }
            }
        }
    }

    /// Matches an incoming limit order and books any remainder.
    pub fn limit_match_book(
        &mut self,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> MatchBookOutcome {
        let outcome = self.core.limit_match_book(side, price, quantity);
        self.forget_exhausted(&outcome.clearings);
        if let Some(id) = outcome.booked {
            self.sides.insert(id, side);
        }
        outcome
    }

    /// Matches an incoming market order. Never rests.
    pub fn market_match(&mut self, side: Side, quantity: Quantity) -> (Quantity, Vec<Clearing>) {
        let (remaining, clearings) = self.core.market_match(side, quantity);
        self.forget_exhausted(&clearings);
        (remaining, clearings)
    }

    /// Removes a resting order by id, reporting its price, removed
    /// quantity, and side.
    pub fn cancel_order(&mut self, id: OrderId) -> Option<(Price, Quantity, Side)> {
        let side = *self.sides.get(&id)?;
        let (price, quantity) = self.core.delete_order(side, id)?;
        self.sides.remove(&id);
        trace!("cancelled {} {} {}@{} on {}", id, side, quantity, price, self.symbol);
        Some((price, quantity, side))
    }

    /// Changes a resting order's quantity by id. See
    /// [`BookCore::modify_quantity`] for the priority semantics.
    pub fn modify_quantity(
        &mut self,
        id: OrderId,
        new_quantity: Quantity,
        priority: RequeuePriority,
    ) -> Option<QuantityModification> {
        let side = *self.sides.get(&id)?;
        let report = self.core.modify_quantity(side, id, new_quantity, priority)?;
        self.apply_requeue(id, report.removed, report.new_id, side);
        Some(report)
    }

    /// Moves a resting order to a new price by id.
    pub fn modify_price(
        &mut self,
        id: OrderId,
        new_price: Price,
        priority: RequeuePriority,
    ) -> Option<PriceModification> {
        let side = *self.sides.get(&id)?;
        let report = self.core.modify_price(side, id, new_price, priority)?;
        self.apply_requeue(id, report.removed, report.new_id, side);
        Some(report)
    }

    /// Moves a resting order to a new price and quantity by id.
    pub fn modify_price_quantity(
        &mut self,
        id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
        priority: RequeuePriority,
    ) -> Option<PriceModification> {
        let side = *self.sides.get(&id)?;
        let report = self
            .core
            .modify_price_quantity(side, id, new_price, new_quantity, priority)?;
        self.apply_requeue(id, report.removed, report.new_id, side);
        Some(report)
    }

    fn apply_requeue(&mut self, id: OrderId, removed: bool, new_id: Option<OrderId>, side: Side) {
        if removed {
            self.sides.remove(&id);
            return;
        }
        if let Some(new_id) = new_id {
            self.sides.remove(&id);
            self.sides.insert(new_id, side);
        }
    }

    /// Side of a resting order.
    pub fn order_side(&self, id: OrderId) -> Option<Side> {
        self.sides.get(&id).copied()
    }

    /// Price, remaining quantity and side of a resting order. Returns
    /// `None` once the order is gone, however it went.
    pub fn order_details(&self, id: OrderId) -> Option<OrderDetails> {
        let side = *self.sides.get(&id)?;
        let price = self.core.order_price(id)?;
        let quantity = self.core.order_quantity(side, id)?;
        Some(OrderDetails {
            price,
            quantity,
            side,
        })
    }

    /// Best (highest) bid price.
    pub fn best_bid(&self) -> Option<Price> {
        self.core.best_price(Side::Buy)
    }

    /// Best (lowest) ask price.
    pub fn best_ask(&self) -> Option<Price> {
        self.core.best_price(Side::Sell)
    }

    /// Best ask minus best bid, when both sides are populated.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.saturating_sub(bid)),
            _ => None,
        }
    }

    /// One side's levels best price first as `(price, aggregate quantity)`.
    pub fn depth(&self, side: Side) -> Vec<(Price, Quantity)> {
        self.core.depth(side)
    }

    /// One side's depth in the flat wire layout (alternating price, qty).
    pub fn depth_flat(&self, side: Side) -> Vec<u64> {
        self.core.depth_flat(side)
    }

    /// Aggregate quantity resting at one price.
    pub fn quantity_at(&self, side: Side, price: Price) -> Quantity {
        self.core.quantity_at(side, price)
    }

    /// Total number of resting orders.
    pub fn order_count(&self) -> usize {
        self.core.order_count()
    }

    /// Number of price levels on `side`.
    pub fn level_count(&self, side: Side) -> usize {
        self.core.level_count(side)
    }

    /// Allocates an id from the transient range.
    pub fn allocate_transient_id(&mut self) -> OrderId {
        self.core.allocate_transient_id()
    }

    /// Drops all orders, levels and side records and restarts id
    /// allocation, as if freshly constructed.
    pub fn clear(&mut self) {
        self.core.clear();
        self.sides.clear();
    }

    #[cfg(test)]
    pub(crate) fn side_index_len(&self) -> usize {
        self.sides.len()
    }
}
