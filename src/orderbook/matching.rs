//! Matching primitives: walking the opposite side best price first.

use super::book::BookCore;
use crate::pricelevel::{FillRecord, OrderId, Price, Quantity, QueueEnd, Side};
use tracing::trace;

/// All fills produced at one price level during a single match walk.
#[derive(Debug, Clone)]
pub struct Clearing {
    /// Price of the swept level.
    pub price: Price,
    /// Fills in the order the makers were consumed.
    pub fills: Vec<FillRecord>,
}

/// Outcome of [`BookCore::limit_match_book`].
#[derive(Debug, Clone)]
pub struct MatchBookOutcome {
    /// Id of the booked remainder, when any quantity rested.
    pub booked: Option<OrderId>,
    /// Quantity left unexecuted by the match walk (booked when non-zero).
    pub remaining: Quantity,
    /// Per-level clearings in strictly best-price-first order.
    pub clearings: Vec<Clearing>,
}

impl BookCore {
    /// Walks the side opposite to `taker_side` best price first, sweeping
    /// each aggressable level with the chosen fill priority. `limit` of
    /// `None` removes the price gate (market order semantics).
    ///
    /// Each swept level contributes one [`Clearing`]; a level therefore
    /// appears at most once per walk. Levels are erased the moment their
    /// last order is consumed, and exhausted ids leave the global index in
    /// the same step.
    fn match_against(
        &mut self,
        taker_side: Side,
        limit: Option<Price>,
        quantity: Quantity,
        fill_from: QueueEnd,
    ) -> (Quantity, Vec<Clearing>) {
        let mut remaining = quantity;
        let mut clearings = Vec::new();

        let (levels, locations) = match taker_side.opposite() {
            Side::Buy => (&mut self.bids, &mut self.locations),
            Side::Sell => (&mut self.asks, &mut self.locations),
        };

        while remaining > 0 {
            // Best opposite price: lowest ask for a buyer, highest bid for
            // a seller.
            let best = match taker_side {
                Side::Buy => levels.keys().next().copied(),
                Side::Sell => levels.keys().next_back().copied(),
            };
            let Some(best) = best else {
                break;
            };
            if let Some(limit) = limit {
                let aggressable = match taker_side {
                    Side::Buy => best <= limit,
                    Side::Sell => best >= limit,
                };
                if !aggressable {
                    break;
                }
            }

            let level = levels.get_mut(&best).expect("best price has a level");
            let outcome = level.sweep(remaining, fill_from);
            remaining -= outcome.swept_quantity;
            if level.is_empty() {
                levels.remove(&best);
            }
            for id in &outcome.exhausted {
                locations.remove(id);
            }
            clearings.push(Clearing {
                price: best,
                fills: outcome.fills,
            });
        }

        trace!(
            "{} taker for {} matched {} across {} levels",
            taker_side,
            quantity,
            quantity - remaining,
            clearings.len()
        );
        (remaining, clearings)
    }

    /// Matches an incoming limit order against the opposite side while the
    /// best opposite price is aggressable. Nothing rests here; the caller
    /// decides what happens to the remainder.
    pub fn limit_match(
        &mut self,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> (Quantity, Vec<Clearing>) {
        self.match_against(side, Some(price), quantity, QueueEnd::Front)
    }

    /// Matches an incoming market order: like [`limit_match`](Self::limit_match)
    /// without the price gate. Market orders never rest.
    pub fn market_match(&mut self, side: Side, quantity: Quantity) -> (Quantity, Vec<Clearing>) {
        self.match_against(side, None, quantity, QueueEnd::Front)
    }

    /// Matches first, then books whatever remains at `price` on `side`.
    pub fn limit_match_book(
        &mut self,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> MatchBookOutcome {
        let (remaining, clearings) = self.limit_match(side, price, quantity);
        let booked = if remaining > 0 {
            Some(self.book(side, price, remaining))
        } else {
            None
        };
        MatchBookOutcome {
            booked,
            remaining,
            clearings,
        }
    }
}
