use simbook::prelude::*;

fn place(book: &mut OrderBook, side: Side, price: Price, qty: Quantity) -> OrderId {
    book.limit_match_book(side, price, qty)
        .booked
        .expect("uncrossed placement rests")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_depth_descending_ask_depth_ascending() {
        let mut book = OrderBook::new("XYZ");
        for price in [101, 99, 100, 97] {
            place(&mut book, Side::Buy, price, 1);
        }
        for price in [103, 106, 104, 108] {
            place(&mut book, Side::Sell, price, 1);
        }

        let bid_prices: Vec<_> = book.depth(Side::Buy).iter().map(|(p, _)| *p).collect();
        let ask_prices: Vec<_> = book.depth(Side::Sell).iter().map(|(p, _)| *p).collect();
        assert!(bid_prices.windows(2).all(|w| w[0] > w[1]));
        assert!(ask_prices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_level_total_equals_member_sum() {
        let mut book = OrderBook::new("XYZ");
        let a = place(&mut book, Side::Buy, 100, 10);
        let b = place(&mut book, Side::Buy, 100, 7);
        place(&mut book, Side::Buy, 100, 3);

        assert_eq!(book.quantity_at(Side::Buy, 100), 20);
        book.cancel_order(b).unwrap();
        assert_eq!(book.quantity_at(Side::Buy, 100), 13);
        book.modify_quantity(a, 4, RequeuePriority::InPlace).unwrap();
        assert_eq!(book.quantity_at(Side::Buy, 100), 7);
    }

    #[test]
    fn test_place_then_cancel_returns_exact_quantity() {
        // A limit order that never matches gives back exactly what it
        // brought, whatever the quantity.
        for qty in [1, 2, 17, 1000] {
            let mut book = OrderBook::new("XYZ");
            let id = place(&mut book, Side::Buy, 100, qty);
            let (price, cancelled, side) = book.cancel_order(id).unwrap();
            assert_eq!((price, cancelled, side), (100, qty, Side::Buy));
        }
    }

    #[test]
    fn test_fifo_aggressor_exhausts_first_leaves_second() {
        let mut book = OrderBook::new("XYZ");
        let a = place(&mut book, Side::Buy, 100, 8);
        let b = place(&mut book, Side::Buy, 100, 12);

        let (remaining, clearings) = book.market_match(Side::Sell, 8);
        assert_eq!(remaining, 0);
        assert_eq!(clearings.len(), 1);
        assert_eq!(clearings[0].fills.len(), 1);
        assert_eq!(clearings[0].fills[0].maker_id, a);
        assert!(clearings[0].fills[0].exhausted);
        assert_eq!(book.order_details(b).unwrap().quantity, 12);
    }

    #[test]
    fn test_clearings_visit_each_level_once() {
        let mut book = OrderBook::new("XYZ");
        place(&mut book, Side::Sell, 101, 2);
        place(&mut book, Side::Sell, 101, 2);
        place(&mut book, Side::Sell, 102, 2);

        let (_, clearings) = book.market_match(Side::Buy, 6);
        let prices: Vec<_> = clearings.iter().map(|c| c.price).collect();
        assert_eq!(prices, vec![101, 102]);
    }

    #[test]
    fn test_ids_never_reused_across_operations() {
        let mut book = OrderBook::new("XYZ");
        let mut seen = std::collections::HashSet::new();
        for i in 0..50u64 {
            let id = place(&mut book, Side::Buy, 90 + (i % 10), 5);
            assert!(seen.insert(id), "id {id} reused");
            if i % 3 == 0 {
                // Requeue allocates another fresh id.
                let report = book.modify_quantity(id, 6, RequeuePriority::Back).unwrap();
                assert!(seen.insert(report.new_id.unwrap()), "requeue id reused");
            }
        }
    }

    #[test]
    fn test_snapshot_matches_depth_after_mixed_operations() {
        let mut book = OrderBook::new("XYZ");
        let a = place(&mut book, Side::Buy, 100, 10);
        place(&mut book, Side::Buy, 99, 5);
        place(&mut book, Side::Sell, 102, 6);
        book.market_match(Side::Sell, 4);
        book.modify_quantity(a, 3, RequeuePriority::InPlace).unwrap();

        let snapshot = DepthSnapshot::capture(&book, 0);
        let bids: Vec<_> = snapshot.bids.iter().map(|l| (l.price, l.quantity)).collect();
        assert_eq!(bids, book.depth(Side::Buy));
        let asks: Vec<_> = snapshot.asks.iter().map(|l| (l.price, l.quantity)).collect();
        assert_eq!(asks, book.depth(Side::Sell));
    }
}
