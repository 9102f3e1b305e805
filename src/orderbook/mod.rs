//! Book core and side-dispatched wrapper for a single symbol.

mod book;
mod error;
mod ids;
mod matching;
mod modifications;
mod snapshot;
mod wrapper;

pub use book::BookCore;
pub use error::OrderBookError;
pub use ids::OrderIdAllocator;
pub use matching::{Clearing, MatchBookOutcome};
pub use modifications::{PriceModification, QuantityModification, RequeuePriority};
pub use snapshot::{DEPTH_SNAPSHOT_FORMAT_VERSION, DepthLevel, DepthSnapshot, SnapshotPackage};
pub use wrapper::{OrderBook, OrderDetails};
