//! In-place and requeueing modification of resting orders.

use super::book::BookCore;
use crate::pricelevel::{OrderId, Price, PriceLevel, Quantity, QueueEnd, Side};
use tracing::trace;

/// Queue-priority policy for a modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequeuePriority {
    /// Keep the existing node: id preserved, queue position preserved.
    /// For a price change this relocates to the back of the new level but
    /// still preserves the id.
    InPlace,
    /// Reinsert at the front of the target level under a new id.
    Front,
    /// Reinsert at the back of the target level under a new id.
    Back,
}

impl RequeuePriority {
    fn as_queue_end(self) -> QueueEnd {
        match self {
            RequeuePriority::Front => QueueEnd::Front,
            // InPlace relocations also land at the back.
            RequeuePriority::InPlace | RequeuePriority::Back => QueueEnd::Back,
        }
    }
}

/// Report of a quantity modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityModification {
    /// Id the modification addressed.
    pub order_id: OrderId,
    /// Level price of the order.
    pub price: Price,
    /// Quantity before the modification.
    pub old_quantity: Quantity,
    /// Quantity after the modification (zero when removed).
    pub new_quantity: Quantity,
    /// Whether the order was removed outright (`new_quantity` was zero).
    pub removed: bool,
    /// Replacement id when the order was requeued under `Front`/`Back`.
    pub new_id: Option<OrderId>,
}

/// Report of a price (or price and quantity) modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceModification {
    /// Id the modification addressed.
    pub order_id: OrderId,
    /// Level price before the modification.
    pub old_price: Price,
    /// Level price after the modification.
    pub new_price: Price,
    /// Quantity before the modification.
    pub old_quantity: Quantity,
    /// Quantity after the modification (zero when removed).
    pub new_quantity: Quantity,
    /// Whether the order was removed outright.
    pub removed: bool,
    /// Replacement id when the order was requeued under `Front`/`Back`.
    pub new_id: Option<OrderId>,
}

impl BookCore {
    fn insert_at(&mut self, side: Side, price: Price, end: QueueEnd, id: OrderId, qty: Quantity) {
        let level = self
            .levels_mut(side)
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price));
        let inserted = level.insert(end, id, qty);
        debug_assert!(inserted, "reinserted id cannot collide");
        self.locations.insert(id, price);
    }

    /// Changes a resting order's quantity.
    ///
    /// A zero target deletes the order and reports `removed`. `InPlace`
    /// adjusts the existing node, preserving id and queue position; `Front`
    /// and `Back` erase the node and reinsert it at the chosen end of the
    /// same level under a freshly allocated id.
    pub fn modify_quantity(
        &mut self,
        side: Side,
        id: OrderId,
        new_quantity: Quantity,
        priority: RequeuePriority,
    ) -> Option<QuantityModification> {
        let price = *self.locations.get(&id)?;
        let old_quantity = self.levels(side).get(&price)?.order_quantity(id)?;

        if new_quantity == 0 {
            self.delete_order(side, id)?;
            return Some(QuantityModification {
                order_id: id,
                price,
                old_quantity,
                new_quantity: 0,
                removed: true,
                new_id: None,
            });
        }

        let new_id = match priority {
            RequeuePriority::InPlace => {
                let level = self.levels_mut(side).get_mut(&price)?;
                level.set_order_quantity(id, new_quantity)?;
                None
            }
            RequeuePriority::Front | RequeuePriority::Back => {
                self.delete_order(side, id)?;
                let replacement = self.ids.next_resting();
                self.insert_at(side, price, priority.as_queue_end(), replacement, new_quantity);
                Some(replacement)
            }
        };
        trace!(
            "modified qty {} {}@{}: {} -> {} ({:?})",
            id, side, price, old_quantity, new_quantity, priority
        );
        Some(QuantityModification {
            order_id: id,
            price,
            old_quantity,
            new_quantity,
            removed: false,
            new_id,
        })
    }

    /// Moves a resting order to a new price, keeping its quantity.
    ///
    /// `InPlace` at the *same* price is a true no-op: id preserved, queue
    /// position preserved. `InPlace` at a *different* price preserves the
    /// id but relocates to the back of the new level. `Front`/`Back`
    /// reallocate the id and insert at the chosen end of the new level.
    pub fn modify_price(
        &mut self,
        side: Side,
        id: OrderId,
        new_price: Price,
        priority: RequeuePriority,
    ) -> Option<PriceModification> {
        let old_price = *self.locations.get(&id)?;
        let quantity = self.levels(side).get(&old_price)?.order_quantity(id)?;
        self.relocate(side, id, old_price, new_price, quantity, quantity, priority)
    }

    /// Moves a resting order to a new price and quantity in one step, with
    /// the same priority semantics as [`modify_price`](Self::modify_price).
    /// A zero quantity deletes the order.
    pub fn modify_price_quantity(
        &mut self,
        side: Side,
        id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
        priority: RequeuePriority,
    ) -> Option<PriceModification> {
        let old_price = *self.locations.get(&id)?;
        let old_quantity = self.levels(side).get(&old_price)?.order_quantity(id)?;

        if new_quantity == 0 {
            self.delete_order(side, id)?;
            return Some(PriceModification {
                order_id: id,
                old_price,
                new_price,
                old_quantity,
                new_quantity: 0,
                removed: true,
                new_id: None,
            });
        }
        self.relocate(side, id, old_price, new_price, old_quantity, new_quantity, priority)
    }

    #[allow(clippy::too_many_arguments)]
    fn relocate(
        &mut self,
        side: Side,
        id: OrderId,
        old_price: Price,
        new_price: Price,
        old_quantity: Quantity,
        new_quantity: Quantity,
        priority: RequeuePriority,
    ) -> Option<PriceModification> {
        let same_price = new_price == old_price;

        let new_id = match priority {
            RequeuePriority::InPlace if same_price => {
                if new_quantity != old_quantity {
                    let level = self.levels_mut(side).get_mut(&old_price)?;
                    level.set_order_quantity(id, new_quantity)?;
                }
                None
            }
            RequeuePriority::InPlace => {
                // Id survives the move; priority does not.
                self.delete_order(side, id)?;
                self.insert_at(side, new_price, QueueEnd::Back, id, new_quantity);
                None
            }
            RequeuePriority::Front | RequeuePriority::Back => {
                self.delete_order(side, id)?;
                let replacement = self.ids.next_resting();
                self.insert_at(side, new_price, priority.as_queue_end(), replacement, new_quantity);
                Some(replacement)
            }
        };
        trace!(
            "modified price {} {}: {}@{} -> {}@{} ({:?})",
            id, side, old_quantity, old_price, new_quantity, new_price, priority
        );
        Some(PriceModification {
            order_id: id,
            old_price,
            new_price,
            old_quantity,
            new_quantity,
            removed: false,
            new_id,
        })
    }
}
