//! Randomized operation sequences against the book invariants.

use proptest::prelude::*;
use simbook::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Place {
        side: Side,
        price: Price,
        qty: Quantity,
    },
    Market {
        side: Side,
        qty: Quantity,
    },
    Cancel {
        slot: usize,
    },
    Reduce {
        slot: usize,
        by: Quantity,
    },
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (side_strategy(), 95u64..=105, 1u64..=20)
            .prop_map(|(side, price, qty)| Op::Place { side, price, qty }),
        1 => (side_strategy(), 1u64..=30).prop_map(|(side, qty)| Op::Market { side, qty }),
        1 => any::<usize>().prop_map(|slot| Op::Cancel { slot }),
        1 => (any::<usize>(), 1u64..=10).prop_map(|(slot, by)| Op::Reduce { slot, by }),
    ]
}

fn drop_exhausted(live: &mut Vec<OrderId>, clearings: &[Clearing]) {
    let exhausted: HashSet<OrderId> = clearings
        .iter()
        .flat_map(|c| c.fills.iter())
        .filter(|f| f.exhausted)
        .map(|f| f.maker_id)
        .collect();
    live.retain(|id| !exhausted.contains(id));
}

/// The externally observable invariants: both indexes agree with the
/// levels, sides stay strictly sorted, and aggregate depth equals the sum
/// of the live orders' quantities.
fn check_invariants(book: &OrderBook, live: &[OrderId]) {
    assert_eq!(book.order_count(), live.len());

    let mut side_totals = [0u64, 0u64];
    for &id in live {
        let details = book
            .order_details(id)
            .expect("live order resolves through every index");
        assert!(details.quantity > 0);
        match details.side {
            Side::Buy => side_totals[0] += details.quantity,
            Side::Sell => side_totals[1] += details.quantity,
        }
    }

    let bids = book.depth(Side::Buy);
    let asks = book.depth(Side::Sell);
    assert!(bids.windows(2).all(|w| w[0].0 > w[1].0), "bids not descending");
    assert!(asks.windows(2).all(|w| w[0].0 < w[1].0), "asks not ascending");
    assert!(bids.iter().all(|&(_, q)| q > 0), "empty bid level left behind");
    assert!(asks.iter().all(|&(_, q)| q > 0), "empty ask level left behind");
    assert_eq!(bids.iter().map(|&(_, q)| q).sum::<u64>(), side_totals[0]);
    assert_eq!(asks.iter().map(|&(_, q)| q).sum::<u64>(), side_totals[1]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_random_operation_sequences_preserve_invariants(
        ops in proptest::collection::vec(op_strategy(), 1..100)
    ) {
        let mut book = OrderBook::new("XYZ");
        let mut live: Vec<OrderId> = Vec::new();

        for op in ops {
            match op {
                Op::Place { side, price, qty } => {
                    let outcome = book.limit_match_book(side, price, qty);
                    drop_exhausted(&mut live, &outcome.clearings);
                    if let Some(id) = outcome.booked {
                        live.push(id);
                    }
                }
                Op::Market { side, qty } => {
                    let (_, clearings) = book.market_match(side, qty);
                    drop_exhausted(&mut live, &clearings);
                }
                Op::Cancel { slot } => {
                    if !live.is_empty() {
                        let id = live.remove(slot % live.len());
                        prop_assert!(book.cancel_order(id).is_some());
                    }
                }
                Op::Reduce { slot, by } => {
                    if !live.is_empty() {
                        let idx = slot % live.len();
                        let id = live[idx];
                        let details = book.order_details(id).unwrap();
                        let target = details.quantity.saturating_sub(by);
                        let report = book
                            .modify_quantity(id, target, RequeuePriority::InPlace)
                            .unwrap();
                        if report.removed {
                            live.remove(idx);
                        }
                    }
                }
            }
            check_invariants(&book, &live);
        }
    }
}
