//! Order book depth snapshot for market data

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

use super::error::OrderBookError;
use super::wrapper::OrderBook;
use crate::pricelevel::{Price, Quantity, Side};

/// One L2 row: a price and the aggregate quantity resting there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Level price.
    pub price: Price,
    /// Aggregate resting quantity at that price.
    pub quantity: Quantity,
}

/// A snapshot of the book's depth at a specific point in simulation time.
///
/// Bids are ordered highest price first, asks lowest price first; rows with
/// zero quantity never appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    /// The symbol or identifier for this order book
    pub symbol: String,

    /// Simulation timestamp the snapshot was taken at (milliseconds)
    pub timestamp: u64,

    /// Bid levels, best first
    pub bids: Vec<DepthLevel>,

    /// Ask levels, best first
    pub asks: Vec<DepthLevel>,
}

impl DepthSnapshot {
    /// Builds a snapshot of `book` stamped with `timestamp`.
    pub fn capture(book: &OrderBook, timestamp: u64) -> Self {
        let rows = |side: Side| {
            book.depth(side)
                .into_iter()
                .map(|(price, quantity)| DepthLevel { price, quantity })
                .collect()
        };
        Self {
            symbol: book.symbol().to_string(),
            timestamp,
            bids: rows(Side::Buy),
            asks: rows(Side::Sell),
        }
    }

    /// Rebuilds a snapshot from the flat wire layout (alternating price and
    /// quantity per side). Trailing odd values are ignored.
    pub fn from_flat(symbol: &str, timestamp: u64, bids: &[u64], asks: &[u64]) -> Self {
        let rows = |flat: &[u64]| {
            flat.chunks_exact(2)
                .map(|pair| DepthLevel {
                    price: pair[0],
                    quantity: pair[1],
                })
                .collect()
        };
        Self {
            symbol: symbol.to_string(),
            timestamp,
            bids: rows(bids),
            asks: rows(asks),
        }
    }

    /// Get the best bid price and quantity
    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        let best = self.bids.first().map(|l| (l.price, l.quantity));
        trace!("best_bid: {:?}", best);
        best
    }

    /// Get the best ask price and quantity
    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        let best = self.asks.first().map(|l| (l.price, l.quantity));
        trace!("best_ask: {:?}", best);
        best
    }

    /// Get the mid price (average of best bid and best ask)
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some((bid as f64 + ask as f64) / 2.0),
            _ => None,
        }
    }

    /// Get the spread (best ask - best bid)
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some(ask.saturating_sub(bid)),
            _ => None,
        }
    }

    /// Calculate the total volume on the bid side
    pub fn total_bid_volume(&self) -> Quantity {
        self.bids.iter().map(|l| l.quantity).sum()
    }

    /// Calculate the total volume on the ask side
    pub fn total_ask_volume(&self) -> Quantity {
        self.asks.iter().map(|l| l.quantity).sum()
    }
}

/// Format version used for checksum-enabled depth snapshots.
pub const DEPTH_SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Wrapper that provides checksum validation for [`DepthSnapshot`] instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPackage {
    /// Version of the snapshot schema for forward compatibility.
    pub version: u32,
    /// Snapshot payload.
    pub snapshot: DepthSnapshot,
    /// Hex-encoded checksum of the serialized snapshot.
    pub checksum: String,
}

impl SnapshotPackage {
    /// Creates a new package computing the checksum of the snapshot contents.
    pub fn new(snapshot: DepthSnapshot) -> Result<Self, OrderBookError> {
        let checksum = Self::compute_checksum(&snapshot)?;
        Ok(Self {
            version: DEPTH_SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    /// Serializes the package to JSON.
    pub fn to_json(&self) -> Result<String, OrderBookError> {
        serde_json::to_string(self).map_err(|error| OrderBookError::SerializationError {
            message: error.to_string(),
        })
    }

    /// Deserializes the package from JSON and validates version and checksum.
    pub fn from_json(data: &str) -> Result<Self, OrderBookError> {
        let package: SnapshotPackage =
            serde_json::from_str(data).map_err(|error| OrderBookError::DeserializationError {
                message: error.to_string(),
            })?;
        package.validate()?;
        Ok(package)
    }

    /// Validates the checksum and version.
    pub fn validate(&self) -> Result<(), OrderBookError> {
        if self.version != DEPTH_SNAPSHOT_FORMAT_VERSION {
            return Err(OrderBookError::UnsupportedVersion {
                found: self.version,
                supported: DEPTH_SNAPSHOT_FORMAT_VERSION,
            });
        }
        let actual = Self::compute_checksum(&self.snapshot)?;
        if actual != self.checksum {
            return Err(OrderBookError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }

    fn compute_checksum(snapshot: &DepthSnapshot) -> Result<String, OrderBookError> {
        let serialized =
            serde_json::to_vec(snapshot).map_err(|error| OrderBookError::SerializationError {
                message: error.to_string(),
            })?;
        let mut hasher = Sha256::new();
        hasher.update(&serialized);
        let digest = hasher.finalize();
        Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
    }
}
