//! Per-order cumulative fill aggregation.

use crate::pricelevel::{Price, Quantity};
use tracing::error;

/// Running fill aggregates for one order.
///
/// Quantity accumulates in integer lots; value accumulates the segment
/// notionals (price × quantity) in double precision, so the running
/// average price is `value / quantity`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FillTracker {
    cumulative_quantity: Quantity,
    cumulative_value: f64,
}

impl FillTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one fill segment into the aggregates.
    pub fn apply_segment(&mut self, price: Price, quantity: Quantity) {
        self.cumulative_quantity += quantity;
        self.cumulative_value += price as f64 * quantity as f64;
    }

    /// Total quantity filled so far.
    pub fn cumulative_quantity(&self) -> Quantity {
        self.cumulative_quantity
    }

    /// Volume-weighted average price over all segments so far. Zero before
    /// the first fill.
    pub fn average_price(&self) -> f64 {
        if self.cumulative_quantity == 0 {
            0.0
        } else {
            self.cumulative_value / self.cumulative_quantity as f64
        }
    }

    /// Reconciles the tracker with the engine's aggregate on a full fill.
    ///
    /// The engine may or may not have emitted a partial for the closing
    /// segment; the derived `aggregate − cumulative` difference is the
    /// single source of truth for what is still unaccounted, and it is
    /// folded in at `last_price` before the final event is built. An
    /// aggregate below the tracked cumulative is a hard inconsistency: it
    /// is logged, the engine's aggregate overwrites the tracked quantity,
    /// and `false` is returned.
    pub fn fold_final(&mut self, aggregate: Quantity, last_price: Price) -> bool {
        if aggregate < self.cumulative_quantity {
            error!(
                "fill aggregate {} below tracked cumulative {}; keeping engine value",
                aggregate, self.cumulative_quantity
            );
            self.cumulative_quantity = aggregate;
            return false;
        }
        let final_segment = aggregate - self.cumulative_quantity;
        if final_segment > 0 {
            self.apply_segment(last_price, final_segment);
        }
        true
    }
}
