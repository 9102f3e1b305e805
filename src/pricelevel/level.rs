//! A single price level: an ordered queue of resting orders at one price.

use super::order_queue::{OrderQueue, RestingOrder};
use super::types::{OrderId, Price, Quantity, QueueEnd};
use tracing::trace;

/// One fill produced while sweeping a level, in consumption order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillRecord {
    /// The resting (maker) order consumed.
    pub maker_id: OrderId,
    /// Quantity traded against this maker in this segment.
    pub quantity: Quantity,
    /// Whether the maker was fully consumed by this segment.
    pub exhausted: bool,
}

/// Result of a directional sweep over one level.
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    /// Fills in the order the makers were consumed.
    pub fills: Vec<FillRecord>,
    /// Ids fully consumed by the sweep; each appears at most once.
    pub exhausted: Vec<OrderId>,
    /// Total quantity taken out of the level.
    pub swept_quantity: Quantity,
}

/// All orders resting at a single price on one side of the book.
///
/// Invariant: `total_quantity` always equals the sum of the member orders'
/// quantities. The level is removed from its book by the owning side when
/// `total_quantity` reaches zero; an empty level is never left behind.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    total_quantity: Quantity,
    orders: OrderQueue,
}

impl PriceLevel {
    /// Creates an empty level at `price`.
    pub fn new(price: Price) -> Self {
        Self {
            price,
            total_quantity: 0,
            orders: OrderQueue::new(),
        }
    }

    /// The level's price.
    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Sum of all resting quantities at this level.
    #[inline]
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Number of resting orders.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Whether the level holds no orders.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Inserts a resting order at the chosen end.
    ///
    /// `Back` is the standard price-time placement for freshly booked
    /// orders; `Front` is used by priority-preserving requeues. Returns
    /// `false` if the id is already present at this level.
    pub fn insert(&mut self, position: QueueEnd, id: OrderId, quantity: Quantity) -> bool {
        if !self.orders.push(position, RestingOrder { id, quantity }) {
            return false;
        }
        self.total_quantity += quantity;
        trace!(
            "level {}: inserted order {} qty {} at {:?}",
            self.price, id, quantity, position
        );
        true
    }

    /// Removes the order with `id`, returning its remaining quantity.
    pub fn erase(&mut self, id: OrderId) -> Option<Quantity> {
        let removed = self.orders.remove(id)?;
        self.total_quantity -= removed.quantity;
        trace!("level {}: erased order {} qty {}", self.price, id, removed.quantity);
        Some(removed.quantity)
    }

    /// Remaining quantity of the order with `id`, if present.
    pub fn order_quantity(&self, id: OrderId) -> Option<Quantity> {
        self.orders.get(id).map(|o| o.quantity)
    }

    /// Whether the order with `id` rests at this level.
    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains(id)
    }

    /// Sets the quantity of an existing order in place, keeping its queue
    /// position. Returns the previous quantity. `new_quantity` must be
    /// positive; a zero target is an [`erase`](Self::erase).
    pub fn set_order_quantity(&mut self, id: OrderId, new_quantity: Quantity) -> Option<Quantity> {
        debug_assert!(new_quantity > 0);
        let order = self.orders.get_mut(id)?;
        let old = order.quantity;
        order.quantity = new_quantity;
        self.total_quantity = self.total_quantity - old + new_quantity;
        Some(old)
    }

    /// Consumes up to `quantity` from the chosen end of the queue.
    ///
    /// Each consumed maker yields one [`FillRecord`]; makers whose quantity
    /// hits zero are recorded first and erased only once the record is
    /// taken, so the walk never observes a half-removed entry. The sweep
    /// stops when the level empties or the requested quantity is satisfied.
    pub fn sweep(&mut self, quantity: Quantity, from: QueueEnd) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();
        let mut remaining = quantity;

        while remaining > 0 {
            let Some(front) = self.orders.peek_mut(from) else {
                break;
            };
            if front.quantity <= remaining {
                // Maker fully consumed: record, then advance past it.
                let taken = self.orders.pop(from).expect("peeked order is present");
                remaining -= taken.quantity;
                self.total_quantity -= taken.quantity;
                outcome.fills.push(FillRecord {
                    maker_id: taken.id,
                    quantity: taken.quantity,
                    exhausted: true,
                });
                outcome.exhausted.push(taken.id);
                outcome.swept_quantity += taken.quantity;
            } else {
                front.quantity -= remaining;
                let maker_id = front.id;
                self.total_quantity -= remaining;
                outcome.fills.push(FillRecord {
                    maker_id,
                    quantity: remaining,
                    exhausted: false,
                });
                outcome.swept_quantity += remaining;
                remaining = 0;
            }
        }

        trace!(
            "level {}: swept {} across {} fills, {} exhausted",
            self.price,
            outcome.swept_quantity,
            outcome.fills.len(),
            outcome.exhausted.len()
        );
        outcome
    }

    /// Iterates resting orders front to back.
    pub fn iter(&self) -> impl Iterator<Item = &RestingOrder> {
        self.orders.iter()
    }
}
