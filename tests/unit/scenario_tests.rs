//! End-to-end request/event scenarios through the adapter.

use simbook::prelude::*;

fn adapter() -> ExchangeAdapter<RecordingBus> {
    ExchangeAdapter::new("XYZ", RecordingBus::new())
}

fn limit(side: Side, price: Price, qty: Quantity, timeout: u64, cid: u64) -> OrderRequest {
    OrderRequest::Limit(LimitOrderRequest {
        symbol: "XYZ".to_string(),
        side,
        price,
        quantity: qty,
        timeout,
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

fn partial_cancel(target_cid: u64, cancel_qty: Quantity, cid: u64) -> OrderRequest {
    OrderRequest::PartialCancelLimit(simbook::adapter::PartialCancelRequest {
        symbol: "XYZ".to_string(),
        target_client_order_id: target_cid,
        cancel_quantity: cancel_qty,
        client_order_id: cid,
    })
}

fn rows(levels: &[(Price, Quantity)]) -> Vec<DepthLevel> {
    levels
        .iter()
        .map(|&(price, quantity)| DepthLevel { price, quantity })
        .collect()
}

fn last_l2(published: &[PublishedEvent]) -> LTwoOrderBookEvent {
    published
        .iter()
        .rev()
        .find_map(|p| match &p.event {
            MarketEvent::LTwoOrderBook(l2) => Some(l2.clone()),
            _ => None,
        })
        .expect("an L2 event was published")
}

fn acked_order_id(published: &[PublishedEvent]) -> OrderId {
    published
        .iter()
        .find_map(|p| match &p.event {
            MarketEvent::LimitOrderAck(ack) => Some(ack.order_id),
            _ => None,
        })
        .expect("a limit ack was published")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S1: two resting orders on an uncrossed book.
    #[test]
    fn test_s1_uncrossed_book() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Buy, 100, 10, 0, 1));
        adapter.handle("bob", limit(Side::Sell, 102, 5, 0, 2));

        let published = adapter.bus().take();
        let trades = published
            .iter()
            .filter(|p| matches!(p.event, MarketEvent::Trade(_)))
            .count();
        assert_eq!(trades, 0);

        let acks: Vec<_> = published
            .iter()
            .filter(|p| matches!(p.event, MarketEvent::LimitOrderAck(_)))
            .map(|p| p.topic.as_str())
            .collect();
        assert_eq!(
            acks,
            vec![
                "LimitOrderAckEvent.alice",
                "LimitOrderAckEvent",
                "LimitOrderAckEvent.bob",
                "LimitOrderAckEvent",
            ]
        );

        let l2 = last_l2(&published);
        assert_eq!(l2.bids, rows(&[(100, 10)]));
        assert_eq!(l2.asks, rows(&[(102, 5)]));
    }

    /// S2: a market order fully takes against the resting ask.
    #[test]
    fn test_s2_full_taker_fill() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Buy, 100, 10, 0, 1));
        adapter.handle("bob", limit(Side::Sell, 102, 5, 0, 2));
        adapter.bus().take();

        adapter.handle("carol", market(Side::Buy, 3, 3));
        let published = adapter.bus().take();

        let topics: Vec<_> = published.iter().map(|p| p.topic.as_str()).collect();
        assert_eq!(
            topics,
            vec![
                "MarketOrderAckEvent.carol",
                "TradeEvent.bob",
                "TradeEvent.carol",
                "PartialFillLimitEvent.bob",
                "FullFillMarketEvent.carol",
                "LTwoOrderBookEvent.XYZ",
            ]
        );

        let MarketEvent::MarketOrderAck(ack) = &published[0].event else {
            panic!("expected market ack");
        };
        assert_eq!(ack.requested_quantity, 3);
        assert_eq!(ack.executed_quantity, 3);
        assert_eq!(ack.unfilled_quantity, 0);

        let MarketEvent::Trade(trade) = &published[1].event else {
            panic!("expected trade");
        };
        assert_eq!(trade.price, 102);
        assert_eq!(trade.quantity, 3);
        assert!(!trade.maker_exhausted);

        let MarketEvent::PartialFillLimit(maker_fill) = &published[3].event else {
            panic!("expected maker partial fill");
        };
        assert!(maker_fill.is_maker);
        assert_eq!(maker_fill.price, 102);
        assert_eq!(maker_fill.quantity, 3);
        assert_eq!(maker_fill.leaves_quantity, Some(2));

        let MarketEvent::FullFillMarket(taker_fill) = &published[4].event else {
            panic!("expected taker full fill");
        };
        assert!(!taker_fill.is_maker);
        assert_eq!(taker_fill.quantity, 3);
        assert_eq!(taker_fill.cumulative_quantity, 3);
        assert!((taker_fill.average_price - 102.0).abs() < 1e-12);

        let l2 = last_l2(&published);
        assert_eq!(l2.bids, rows(&[(100, 10)]));
        assert_eq!(l2.asks, rows(&[(102, 2)]));
    }

    /// S3: an aggressive limit sweeps two price levels and fully executes.
    #[test]
    fn test_s3_multi_level_sweep() {
        let mut adapter = adapter();
        adapter.handle("maia", limit(Side::Sell, 101, 4, 0, 1));
        adapter.handle("maia", limit(Side::Sell, 102, 5, 0, 2));
        adapter.bus().take();

        adapter.handle("theo", limit(Side::Buy, 103, 6, 0, 3));
        let published = adapter.bus().take();

        let topics: Vec<_> = published.iter().map(|p| p.topic.as_str()).collect();
        assert_eq!(
            topics,
            vec![
                "LimitOrderAckEvent.theo",
                "LimitOrderAckEvent",
                "TradeEvent.maia",
                "TradeEvent.theo",
                "FullFillLimitEvent.maia",
                "PartialFillLimitEvent.theo",
                "TradeEvent.maia",
                "TradeEvent.theo",
                "PartialFillLimitEvent.maia",
                "FullFillLimitEvent.theo",
                "LTwoOrderBookEvent.XYZ",
            ]
        );

        let MarketEvent::PartialFillLimit(seg1) = &published[5].event else {
            panic!("expected taker partial");
        };
        assert_eq!(seg1.price, 101);
        assert_eq!(seg1.quantity, 4);
        assert_eq!(seg1.leaves_quantity, Some(2));
        assert_eq!(seg1.cumulative_quantity, 4);

        let MarketEvent::PartialFillLimit(maker2) = &published[8].event else {
            panic!("expected maker partial");
        };
        assert_eq!(maker2.price, 102);
        assert_eq!(maker2.quantity, 2);
        assert_eq!(maker2.leaves_quantity, Some(3));

        let MarketEvent::FullFillLimit(full) = &published[9].event else {
            panic!("expected taker full fill");
        };
        assert_eq!(full.quantity, 6);
        assert_eq!(full.price, 102);
        let expected = (101.0 * 4.0 + 102.0 * 2.0) / 6.0;
        assert!((full.average_price - expected).abs() < 1e-12);

        let l2 = last_l2(&published);
        assert!(l2.bids.is_empty());
        assert_eq!(l2.asks, rows(&[(102, 3)]));
    }

    /// S4: a partial cancel reduces in place, mapping retained.
    #[test]
    fn test_s4_partial_cancel_by_reduction() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Buy, 100, 10, 0, 1));
        adapter.bus().take();

        adapter.handle("alice", partial_cancel(1, 3, 2));
        let published = adapter.bus().take();

        let MarketEvent::PartialCancelLimitAck(ack) = &published[0].event else {
            panic!("expected partial cancel ack, got {:?}", published[0].event);
        };
        assert_eq!(published[0].topic, "PartialCancelLimitAckEvent.alice");
        assert_eq!(ack.cancelled_quantity, 3);
        assert_eq!(ack.remaining_quantity, 7);
        assert_eq!(ack.client_order_id, 2);

        let l2 = last_l2(&published);
        assert_eq!(l2.bids, rows(&[(100, 7)]));

        // Mapping retained: a second reduction still resolves.
        adapter.handle("alice", partial_cancel(1, 2, 3));
        let published = adapter.bus().take();
        assert!(matches!(
            published[0].event,
            MarketEvent::PartialCancelLimitAck(_)
        ));
    }

    /// S5: a partial cancel at or above the resting size promotes to a
    /// full cancel and removes the mapping.
    #[test]
    fn test_s5_partial_cancel_exceeding_size() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Buy, 100, 10, 0, 1));
        adapter.handle("alice", partial_cancel(1, 3, 2));
        adapter.bus().take();

        adapter.handle("alice", partial_cancel(1, 50, 3));
        let published = adapter.bus().take();

        let MarketEvent::FullCancelLimitAck(ack) = &published[0].event else {
            panic!("expected promoted full cancel, got {:?}", published[0].event);
        };
        assert_eq!(published[0].topic, "FullCancelLimitAckEvent.alice");
        assert_eq!(ack.cancelled_quantity, 7);
        assert_eq!(ack.client_order_id, 3);
        // Broadcast copy for the expiration subsystem.
        assert_eq!(published[1].topic, "FullCancelLimitAckEvent");

        let l2 = last_l2(&published);
        assert!(l2.bids.is_empty());

        // Mapping removed: further cancels are rejected.
        adapter.handle("alice", partial_cancel(1, 1, 4));
        let published = adapter.bus().take();
        assert!(matches!(
            published[0].event,
            MarketEvent::PartialCancelLimitReject(_)
        ));
    }

    /// S6: an external expiration trigger removes the order once and is
    /// rejected the second time.
    #[test]
    fn test_s6_expiration() {
        let mut adapter = adapter();
        adapter.handle("alice", limit(Side::Buy, 99, 4, 5000, 1));
        let order_id = acked_order_id(&adapter.bus().take());

        adapter.handle(
            "scheduler",
            OrderRequest::TriggerExpiredLimitOrder(simbook::adapter::ExpirationTriggerRequest {
                symbol: "XYZ".to_string(),
                target_order_id: order_id,
                original_timeout: 5000,
            }),
        );
        let published = adapter.bus().take();
        let topics: Vec<_> = published.iter().map(|p| p.topic.as_str()).collect();
        assert_eq!(
            topics,
            vec![
                "AckTriggerExpiredLimitOrderEvent.scheduler",
                "AckTriggerExpiredLimitOrderEvent.alice",
                "AckTriggerExpiredLimitOrderEvent",
                "LTwoOrderBookEvent.XYZ",
            ]
        );
        let MarketEvent::AckTriggerExpiredLimitOrder(ack) = &published[0].event else {
            panic!("expected expiration ack");
        };
        assert_eq!(ack.order_id, order_id);
        assert_eq!(ack.price, 99);
        assert_eq!(ack.quantity, 4);
        assert_eq!(ack.trader_id, "alice");
        assert_eq!(ack.client_order_id, 1);
        assert_eq!(ack.timeout, 5000);

        let l2 = last_l2(&published);
        assert!(l2.bids.is_empty());

        // Second trigger: reject to the trigger sender, book unchanged so
        // no further L2.
        adapter.handle(
            "scheduler",
            OrderRequest::TriggerExpiredLimitOrder(simbook::adapter::ExpirationTriggerRequest {
                symbol: "XYZ".to_string(),
                target_order_id: order_id,
                original_timeout: 5000,
            }),
        );
        let published = adapter.bus().take();
        let topics: Vec<_> = published.iter().map(|p| p.topic.as_str()).collect();
        assert_eq!(topics, vec!["RejectTriggerExpiredLimitOrderEvent.scheduler"]);
    }
}
