//! Price level layer: resting orders, ordered queues and single-level sweeps.

mod level;
mod order_queue;
mod types;

pub use level::{FillRecord, PriceLevel, SweepOutcome};
pub use order_queue::{OrderQueue, RestingOrder};
pub use types::{OrderId, Price, Quantity, QueueEnd, Side, TRANSIENT_ID_BASE};
