//! Primitive types shared across the book layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Price in integer ticks.
pub type Price = u64;

/// Order quantity in integer lots.
pub type Quantity = u64;

/// First identifier of the transient range. Ids at or above this value label
/// orders that never rest on the book (market orders and aggressive limit
/// orders that fully execute), so consumers can classify an id without
/// consulting the engine after the order is gone.
pub const TRANSIENT_ID_BASE: u64 = 1_000_000_000;

/// Exchange-assigned order identifier.
///
/// Resting ids are allocated sequentially from 1; transient ids sequentially
/// from [`TRANSIENT_ID_BASE`]. Ids are never reused within one engine
/// lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Returns the raw numeric value.
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Whether this id belongs to the transient range.
    #[inline]
    pub fn is_transient(self) -> bool {
        self.0 >= TRANSIENT_ID_BASE
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The side of the book an order rests on or attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bid side (buy orders); best price is the highest.
    Buy,
    /// Ask side (sell orders); best price is the lowest.
    Sell,
}

impl Side {
    /// Returns the opposite side.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// An end of a level's order queue.
///
/// Used both as an insertion position (`Back` is the standard price-time
/// placement, `Front` preserves priority for in-place requeues) and as the
/// end a sweep consumes from (`Front` is FIFO).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueEnd {
    /// Head of the queue (first to be consumed under FIFO).
    Front,
    /// Tail of the queue.
    Back,
}
