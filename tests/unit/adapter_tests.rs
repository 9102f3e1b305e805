use simbook::adapter::{ExpirationTriggerRequest, FullCancelRequest, PartialCancelRequest};
use simbook::prelude::*;

fn adapter() -> ExchangeAdapter<RecordingBus> {
    ExchangeAdapter::new("XYZ", RecordingBus::new())
}

fn limit(side: Side, price: Price, qty: Quantity, cid: u64) -> OrderRequest {
    OrderRequest::Limit(LimitOrderRequest {
        symbol: "XYZ".to_string(),
        side,
        price,
        quantity: qty,
        timeout: 0,
        client_order_id: cid,
    })
}

fn market(side: Side, qty: Quantity, cid: u64) -> OrderRequest {
    OrderRequest::Market(MarketOrderRequest {
        symbol: "XYZ".to_string(),
        side,
        quantity: qty,
        timeout: 0,
        client_order_id: cid,
    })
}

fn full_cancel(target_cid: u64, cid: u64) -> OrderRequest {
    OrderRequest::FullCancelLimit(FullCancelRequest {
        symbol: "XYZ".to_string(),
        target_client_order_id: target_cid,
        client_order_id: cid,
    })
}

fn fills_of(published: &[PublishedEvent]) -> Vec<&FillEvent> {
    published
        .iter()
        .filter_map(|p| match &p.event {
            MarketEvent::PartialFillLimit(f)
            | MarketEvent::FullFillLimit(f)
            | MarketEvent::PartialFillMarket(f)
            | MarketEvent::FullFillMarket(f) => Some(f),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cancel_of_unknown_target_rejected_with_request_cid() {
        let mut adapter = adapter();
        adapter.handle("alice", full_cancel(404, 7));
        let published = adapter.bus().take();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "FullCancelLimitRejectEvent.alice");
        let MarketEvent::FullCancelLimitReject(reject) = &published[0].event else {
            panic!("expected reject");
        };
        assert_eq!(reject.client_order_id, 7);
    }

    #[test]
    fn test_cancel_does_not_cross_traders() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Buy, 100, 10, 1));
        adapter.bus().take();

        // Bob's cid 1 is not alice's cid 1.
        adapter.handle("bob", full_cancel(1, 2));
        let published = adapter.bus().take();
        assert!(matches!(
            published[0].event,
            MarketEvent::FullCancelLimitReject(_)
        ));
        assert_eq!(adapter.engine().book().order_count(), 1);
    }

    #[test]
    fn test_maker_aggregates_across_separate_taker_dispatches() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Buy, 100, 10, 1));
        adapter.bus().take();

        adapter.handle("bob", market(Side::Sell, 4, 2));
        let first = adapter.bus().take();
        let maker_first = fills_of(&first)
            .into_iter()
            .find(|f| f.is_maker)
            .expect("maker partial");
        assert_eq!(maker_first.quantity, 4);
        assert_eq!(maker_first.cumulative_quantity, 4);
        assert_eq!(maker_first.leaves_quantity, Some(6));
        assert!((maker_first.average_price - 100.0).abs() < 1e-12);

        adapter.handle("bob", market(Side::Sell, 6, 3));
        let second = adapter.bus().take();
        let maker_full = fills_of(&second)
            .into_iter()
            .find(|f| f.is_maker)
            .expect("maker full");
        assert_eq!(maker_full.quantity, 10);
        assert_eq!(maker_full.cumulative_quantity, 10);
        assert_eq!(maker_full.leaves_quantity, None);
        assert!((maker_full.average_price - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_fill_segments_account_for_whole_order() {
        // Property: over an order's life, segment quantities sum to the
        // original quantity minus cancelled minus still-resting.
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Buy, 100, 20, 1));
        adapter.bus().take();

        adapter.handle("bob", market(Side::Sell, 5, 2));
        let mut segments: Vec<Quantity> = fills_of(&adapter.bus().take())
            .into_iter()
            .filter(|f| f.is_maker)
            .map(|f| f.quantity)
            .collect();

        adapter.handle(
            "alice",
            OrderRequest::PartialCancelLimit(PartialCancelRequest {
                symbol: "XYZ".to_string(),
                target_client_order_id: 1,
                cancel_quantity: 3,
                client_order_id: 3,
            }),
        );
        adapter.bus().take();

        adapter.handle("bob", market(Side::Sell, 4, 4));
        segments.extend(
            fills_of(&adapter.bus().take())
                .into_iter()
                .filter(|f| f.is_maker)
                .map(|f| f.quantity),
        );

        let remaining = adapter
            .engine()
            .book()
            .quantity_at(Side::Buy, 100);
        let filled: Quantity = segments.iter().sum();
        assert_eq!(filled + 3 + remaining, 20);
        assert_eq!(remaining, 8);
    }

    #[test]
    fn test_self_trade_publishes_single_trade_event() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Sell, 102, 5, 1));
        adapter.bus().take();

        adapter.handle("alice", market(Side::Buy, 3, 2));
        let published = adapter.bus().take();
        let trade_topics: Vec<_> = published
            .iter()
            .filter(|p| matches!(p.event, MarketEvent::Trade(_)))
            .map(|p| p.topic.as_str())
            .collect();
        assert_eq!(trade_topics, vec!["TradeEvent.alice"]);
    }

    #[test]
    fn test_l2_suppressed_when_book_unchanged() {
        let mut adapter = adapter();
        // First market order on the empty book publishes the baseline
        // (empty) book; the second changes nothing and is suppressed.
        adapter.handle("alice", market(Side::Buy, 5, 1));
        let first = adapter.bus().take();
        assert_eq!(
            first
                .iter()
                .filter(|p| matches!(p.event, MarketEvent::LTwoOrderBook(_)))
                .count(),
            1
        );

        adapter.handle("alice", market(Side::Buy, 5, 2));
        let second = adapter.bus().take();
        assert_eq!(
            second
                .iter()
                .filter(|p| matches!(p.event, MarketEvent::LTwoOrderBook(_)))
                .count(),
            0
        );
    }

    #[test]
    fn test_unfilled_market_order_acks_and_leaves_no_state() {
        let mut adapter = adapter();
        adapter.handle("alice", market(Side::Buy, 5, 1));
        let published = adapter.bus().take();

        let MarketEvent::MarketOrderAck(ack) = &published[0].event else {
            panic!("expected market ack");
        };
        assert_eq!(ack.executed_quantity, 0);
        assert_eq!(ack.unfilled_quantity, 5);
        assert!(ack.order_id.is_transient());
        // No fills, no trades on an empty book.
        assert!(fills_of(&published).is_empty());
    }

    #[test]
    fn test_partially_filled_market_gets_no_taker_full_fill() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Sell, 102, 3, 1));
        adapter.bus().take();

        adapter.handle("bob", market(Side::Buy, 10, 2));
        let published = adapter.bus().take();
        let taker_fills: Vec<_> = fills_of(&published)
            .into_iter()
            .filter(|f| !f.is_maker)
            .collect();
        assert_eq!(taker_fills.len(), 1);
        assert_eq!(taker_fills[0].quantity, 3);
        assert_eq!(taker_fills[0].leaves_quantity, Some(7));
        assert!(
            published
                .iter()
                .all(|p| !matches!(p.event, MarketEvent::FullFillMarket(_)))
        );
    }

    #[test]
    fn test_expired_then_cancel_is_rejected() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Buy, 99, 4, 1));
        let published = adapter.bus().take();
        let order_id = published
            .iter()
            .find_map(|p| match &p.event {
                MarketEvent::LimitOrderAck(ack) => Some(ack.order_id),
                _ => None,
            })
            .unwrap();

        adapter.handle(
            "scheduler",
            OrderRequest::TriggerExpiredLimitOrder(ExpirationTriggerRequest {
                symbol: "XYZ".to_string(),
                target_order_id: order_id,
                original_timeout: 1000,
            }),
        );
        adapter.bus().take();

        // The race resolved in favour of expiration: the cancel now finds
        // no mapping.
        adapter.handle("alice", full_cancel(1, 2));
        let published = adapter.bus().take();
        assert!(matches!(
            published[0].event,
            MarketEvent::FullCancelLimitReject(_)
        ));
    }

    #[test]
    fn test_bang_resets_l2_baseline_and_mappings() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Buy, 100, 10, 1));
        adapter.handle("anyone", OrderRequest::Bang);
        adapter.bus().take();

        // Same placement again: mapping works from scratch and the L2
        // publishes as if freshly constructed.
        adapter.handle("alice", limit(Side::Buy, 100, 10, 1));
        let published = adapter.bus().take();
        let l2 = published
            .iter()
            .find_map(|p| match &p.event {
                MarketEvent::LTwoOrderBook(l2) => Some(l2),
                _ => None,
            })
            .expect("L2 after bang");
        assert_eq!(l2.bids.len(), 1);
        assert_eq!(l2.bids[0].price, 100);

        adapter.handle("alice", full_cancel(1, 2));
        let published = adapter.bus().take();
        assert!(matches!(
            published[0].event,
            MarketEvent::FullCancelLimitAck(_)
        ));
    }

    #[test]
    fn test_sim_clock_timestamps_l2_events() {
        let bus = RecordingBus::new();
        bus.set_time(1234);
        let mut adapter = ExchangeAdapter::new("XYZ", bus);
        adapter.handle("alice", limit(Side::Buy, 100, 10, 1));
        let published = adapter.bus().take();
        let MarketEvent::LTwoOrderBook(l2) = &published
            .iter()
            .find(|p| matches!(p.event, MarketEvent::LTwoOrderBook(_)))
            .unwrap()
            .event
        else {
            panic!("expected L2");
        };
        assert_eq!(l2.timestamp, 1234);
    }
}
