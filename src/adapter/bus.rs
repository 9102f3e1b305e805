//! Event bus seam: publish-by-topic plus the simulation clock.
//!
//! The adapter only ever talks to [`EventBus`]. The shipping
//! implementations enqueue onto a channel and let the simulation loop
//! drain it, which keeps publication non-re-entrant into the engine: a
//! subscriber reacting to an event cannot land back inside the engine call
//! that produced it.

use super::events::MarketEvent;
use crate::utils::current_time_millis;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use tracing::trace;

/// Errors from the bus seam.
#[derive(Debug)]
#[non_exhaustive]
pub enum BusError {
    /// The receiving end of the bus is gone.
    SendFailed {
        /// Topic of the dropped event.
        topic: String,
    },
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::SendFailed { topic } => {
                write!(f, "failed to publish on topic {topic}: receiver closed")
            }
        }
    }
}

impl std::error::Error for BusError {}

/// A published event together with its topic.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    /// The topic the event was published on.
    pub topic: String,
    /// The event payload.
    pub event: MarketEvent,
}

/// Publish-by-topic primitive plus the current simulation time.
pub trait EventBus {
    /// Publishes `event` on `topic`. Implementations enqueue; delivery
    /// happens outside the publishing call.
    fn publish(&self, topic: &str, event: MarketEvent) -> Result<(), BusError>;

    /// Current simulation time in milliseconds.
    fn now(&self) -> u64;
}

/// A shared simulation clock, advanced by the simulation driver.
#[derive(Debug, Clone, Default)]
pub struct SimClock(Arc<AtomicU64>);

impl SimClock {
    /// Creates a clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time in milliseconds.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Sets the simulation time.
    pub fn set(&self, millis: u64) {
        self.0.store(millis, Ordering::Relaxed);
    }

    /// Advances the simulation time.
    pub fn advance(&self, millis: u64) {
        self.0.fetch_add(millis, Ordering::Relaxed);
    }
}

/// Bus over a standard library mpsc channel.
pub struct ChannelBus {
    sender: mpsc::Sender<PublishedEvent>,
    clock: Option<SimClock>,
}

impl ChannelBus {
    /// Creates a bus on the wall clock. Returns the bus and the receiving
    /// end the simulation loop drains.
    pub fn new() -> (Self, mpsc::Receiver<PublishedEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
                clock: None,
            },
            receiver,
        )
    }

    /// Creates a bus driven by a shared simulation clock.
    pub fn with_clock(clock: SimClock) -> (Self, mpsc::Receiver<PublishedEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
                clock: Some(clock),
            },
            receiver,
        )
    }
}

impl EventBus for ChannelBus {
    fn publish(&self, topic: &str, event: MarketEvent) -> Result<(), BusError> {
        trace!("publish {} -> {}", event.name(), topic);
        self.sender
            .send(PublishedEvent {
                topic: topic.to_string(),
                event,
            })
            .map_err(|_| BusError::SendFailed {
                topic: topic.to_string(),
            })
    }

    fn now(&self) -> u64 {
        match &self.clock {
            Some(clock) => clock.get(),
            None => current_time_millis(),
        }
    }
}

/// Bus over a Tokio unbounded mpsc channel, for simulations whose
/// consumers run as async tasks.
pub struct TokioBus {
    sender: tokio::sync::mpsc::UnboundedSender<PublishedEvent>,
    clock: Option<SimClock>,
}

impl TokioBus {
    /// Creates a bus on the wall clock.
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<PublishedEvent>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (
            Self {
                sender,
                clock: None,
            },
            receiver,
        )
    }

    /// Creates a bus driven by a shared simulation clock.
    pub fn with_clock(
        clock: SimClock,
    ) -> (Self, tokio::sync::mpsc::UnboundedReceiver<PublishedEvent>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (
            Self {
                sender,
                clock: Some(clock),
            },
            receiver,
        )
    }
}

impl EventBus for TokioBus {
    fn publish(&self, topic: &str, event: MarketEvent) -> Result<(), BusError> {
        trace!("publish {} -> {}", event.name(), topic);
        self.sender
            .send(PublishedEvent {
                topic: topic.to_string(),
                event,
            })
            .map_err(|_| BusError::SendFailed {
                topic: topic.to_string(),
            })
    }

    fn now(&self) -> u64 {
        match &self.clock {
            Some(clock) => clock.get(),
            None => current_time_millis(),
        }
    }
}

/// Bus that records everything published, in order. Useful for tests and
/// for replay capture in simulations.
#[derive(Debug, Default)]
pub struct RecordingBus {
    events: RefCell<Vec<PublishedEvent>>,
    time: Cell<u64>,
}

impl RecordingBus {
    /// Creates an empty recorder at simulation time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time reported by [`EventBus::now`].
    pub fn set_time(&self, millis: u64) {
        self.time.set(millis);
    }

    /// Takes everything recorded so far, leaving the recorder empty.
    pub fn take(&self) -> Vec<PublishedEvent> {
        self.events.take()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Topics recorded so far, in publication order.
    pub fn topics(&self) -> Vec<String> {
        self.events.borrow().iter().map(|p| p.topic.clone()).collect()
    }
}

impl EventBus for RecordingBus {
    fn publish(&self, topic: &str, event: MarketEvent) -> Result<(), BusError> {
        self.events.borrow_mut().push(PublishedEvent {
            topic: topic.to_string(),
            event,
        });
        Ok(())
    }

    fn now(&self) -> u64 {
        self.time.get()
    }
}
