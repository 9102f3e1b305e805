//! Core book structure: two price-indexed sides plus a global order-id index.

use super::ids::OrderIdAllocator;
use crate::pricelevel::{OrderId, Price, PriceLevel, Quantity, QueueEnd, Side};
use either::Either;
use std::collections::{BTreeMap, HashMap};
use tracing::{error, trace};

/// The raw book: bid and ask sides ordered by price, and an id → price
/// index covering every resting order.
///
/// Sides are addressed explicitly on every call; the side-remembering
/// facade lives in [`OrderBook`](super::OrderBook). Invariants:
///
/// - no two levels on one side share a price;
/// - every id in the index resolves to exactly one level on the addressed
///   side, and every order inside any level appears in the index;
/// - a level exists exactly as long as it holds at least one order.
#[derive(Debug)]
pub struct BookCore {
    /// Bid levels; best bid is the highest price (iterated in reverse).
    pub(super) bids: BTreeMap<Price, PriceLevel>,
    /// Ask levels; best ask is the lowest price.
    pub(super) asks: BTreeMap<Price, PriceLevel>,
    /// Resting order id → level price. The side is supplied by callers.
    pub(super) locations: HashMap<OrderId, Price>,
    /// Exchange id source shared by booking, requeues and transient takers.
    pub(super) ids: OrderIdAllocator,
}

impl BookCore {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            locations: HashMap::new(),
            ids: OrderIdAllocator::new(),
        }
    }

    pub(super) fn levels(&self, side: Side) -> &BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    pub(super) fn levels_mut(&mut self, side: Side) -> &mut BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Iterates one side's levels best price first.
    pub(super) fn levels_best_first(
        &self,
        side: Side,
    ) -> impl Iterator<Item = (&Price, &PriceLevel)> {
        match side {
            Side::Buy => Either::Left(self.bids.iter().rev()),
            Side::Sell => Either::Right(self.asks.iter()),
        }
    }

    /// Best price on `side`: highest bid or lowest ask.
    pub fn best_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.bids.keys().next_back().copied(),
            Side::Sell => self.asks.keys().next().copied(),
        }
    }

    /// Books a new resting order at the back of the `price` level on
    /// `side`, creating the level if needed. Returns the freshly allocated
    /// id, which the global index resolves to that level from this point.
    pub fn book(&mut self, side: Side, price: Price, quantity: Quantity) -> OrderId {
        let id = self.ids.next_resting();
        let level = self
            .levels_mut(side)
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price));
        let inserted = level.insert(QueueEnd::Back, id, quantity);
        debug_assert!(inserted, "freshly allocated id cannot collide");
        self.locations.insert(id, price);
        trace!("booked {} {} {}@{}", id, side, quantity, price);
        id
    }

    /// Removes a resting order. Returns its level price and the quantity
    /// removed, or `None` when the id is unknown on `side`.
    ///
    /// The emptied level is erased in the same step as its last order.
    pub fn delete_order(&mut self, side: Side, id: OrderId) -> Option<(Price, Quantity)> {
        let price = *self.locations.get(&id)?;
        let levels = self.levels_mut(side);
        let Some(level) = levels.get_mut(&price) else {
            error!("id index points {} at missing {} level {}", id, side, price);
            self.locations.remove(&id);
            return None;
        };
        let Some(quantity) = level.erase(id) else {
            error!("id index lists {} but {} level {} does not hold it", id, side, price);
            self.locations.remove(&id);
            return None;
        };
        if level.is_empty() {
            levels.remove(&price);
        }
        self.locations.remove(&id);
        trace!("deleted {} {} {}@{}", id, side, quantity, price);
        Some((price, quantity))
    }

    /// Level price of a resting order.
    pub fn order_price(&self, id: OrderId) -> Option<Price> {
        self.locations.get(&id).copied()
    }

    /// Remaining quantity of a resting order on `side`.
    pub fn order_quantity(&self, side: Side, id: OrderId) -> Option<Quantity> {
        let price = self.locations.get(&id)?;
        self.levels(side).get(price)?.order_quantity(id)
    }

    /// Allocates an id from the transient range.
    pub fn allocate_transient_id(&mut self) -> OrderId {
        self.ids.next_transient()
    }

    /// Aggregate quantity resting at one price, zero when the level is absent.
    pub fn quantity_at(&self, side: Side, price: Price) -> Quantity {
        self.levels(side)
            .get(&price)
            .map(|l| l.total_quantity())
            .unwrap_or(0)
    }

    /// Total number of resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.locations.len()
    }

    /// Number of price levels on `side`.
    pub fn level_count(&self, side: Side) -> usize {
        self.levels(side).len()
    }

    /// One side's levels best price first as `(price, aggregate quantity)`.
    pub fn depth(&self, side: Side) -> Vec<(Price, Quantity)> {
        self.levels_best_first(side)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    /// One side's depth in the flat wire layout: alternating price and
    /// aggregate quantity, best price first, no zero rows.
    pub fn depth_flat(&self, side: Side) -> Vec<u64> {
        let mut flat = Vec::with_capacity(self.level_count(side) * 2);
        for (price, level) in self.levels_best_first(side) {
            flat.push(*price);
            flat.push(level.total_quantity());
        }
        flat
    }

    /// Drops every level and index entry and restarts id allocation.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.locations.clear();
        self.ids.reset();
    }
}

impl Default for BookCore {
    fn default() -> Self {
        Self::new()
    }
}
