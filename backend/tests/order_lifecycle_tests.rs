//! Order lifecycle property and unit tests
//!
//! Covers:
//! - the order status state machine (monotonic, one compensating edge)
//! - order totals arithmetic
//! - exactly-once stock application under retried completion
//! - cancellation as the exact inverse of completion
//! - insufficient stock aborting a completion with no partial effects

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{compute_order_totals, line_total, OrderStatus};

fn order_status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::Pending),
        Just(OrderStatus::Processing),
        Just(OrderStatus::Completed),
        Just(OrderStatus::Cancelled),
    ]
}

// ============================================================================
// In-memory model of an order's ledger interaction
//
// Mirrors the transition algorithm: completing debits every line whose
// stock_applied flag is false (all-or-nothing), cancelling credits every
// line whose flag is true.
// ============================================================================

#[derive(Debug, Clone)]
struct ModelItem {
    quantity: i64,
    stock_applied: bool,
}

/// Attempt completion; on insufficiency nothing changes at all
fn complete(stock: &mut i64, items: &mut [ModelItem]) -> Result<(), ()> {
    let needed: i64 = items
        .iter()
        .filter(|i| !i.stock_applied)
        .map(|i| i.quantity)
        .sum();
    if needed > *stock {
        return Err(());
    }
    for item in items.iter_mut().filter(|i| !i.stock_applied) {
        *stock -= item.quantity;
        item.stock_applied = true;
    }
    Ok(())
}

/// Cancel: credit back whatever completion applied
fn cancel(stock: &mut i64, items: &mut [ModelItem]) {
    for item in items.iter_mut().filter(|i| i.stock_applied) {
        *stock += item.quantity;
        item.stock_applied = false;
    }
}

fn model_items_strategy() -> impl Strategy<Value = Vec<ModelItem>> {
    prop::collection::vec(
        (1..=20i64).prop_map(|quantity| ModelItem {
            quantity,
            stock_applied: false,
        }),
        1..6,
    )
}

proptest! {
    // ========================================================================
    // State machine properties
    // ========================================================================

    /// Retrying the current status is always legal
    #[test]
    fn test_same_status_always_legal(status in order_status_strategy()) {
        prop_assert!(status.can_transition_to(status));
    }

    /// Nothing leaves cancelled
    #[test]
    fn test_cancelled_is_terminal(next in order_status_strategy()) {
        prop_assert_eq!(
            OrderStatus::Cancelled.can_transition_to(next),
            next == OrderStatus::Cancelled
        );
    }

    /// The only edges out of completed are the retry and the
    /// compensating cancellation
    #[test]
    fn test_completed_edges(next in order_status_strategy()) {
        let allowed = next == OrderStatus::Completed || next == OrderStatus::Cancelled;
        prop_assert_eq!(OrderStatus::Completed.can_transition_to(next), allowed);
    }

    /// Status never moves backwards to pending
    #[test]
    fn test_no_edge_back_to_pending(from in order_status_strategy()) {
        if from != OrderStatus::Pending {
            prop_assert!(!from.can_transition_to(OrderStatus::Pending));
        }
    }

    // ========================================================================
    // Totals properties
    // ========================================================================

    /// total = sub_total + tax, and sub_total is the sum of line totals
    #[test]
    fn test_totals_identity(
        lines in prop::collection::vec((1..=50i64, 1..=10_000i64), 1..8),
        gst in 0..=40i64
    ) {
        let line_totals: Vec<Decimal> = lines
            .iter()
            .map(|(qty, cents)| line_total(*qty, Decimal::new(*cents, 2)))
            .collect();
        let expected_sub: Decimal = line_totals.iter().copied().sum();

        let totals = compute_order_totals(line_totals, Decimal::from(gst));

        prop_assert_eq!(totals.sub_total, expected_sub);
        prop_assert_eq!(totals.total, totals.sub_total + totals.tax);
        prop_assert_eq!(
            totals.tax,
            (expected_sub * Decimal::from(gst) / Decimal::from(100)).round_dp(2)
        );
    }

    // ========================================================================
    // Exactly-once stock application
    // ========================================================================

    /// Completing once debits each line exactly once; completing again
    /// changes nothing
    #[test]
    fn test_completion_is_idempotent(
        mut items in model_items_strategy(),
        extra in 0..=50i64
    ) {
        let needed: i64 = items.iter().map(|i| i.quantity).sum();
        let mut stock = needed + extra;

        complete(&mut stock, &mut items).unwrap();
        let after_first = stock;
        prop_assert_eq!(after_first, extra);

        // Retried completion: every flag is already set, so nothing moves
        complete(&mut stock, &mut items).unwrap();
        prop_assert_eq!(stock, after_first);
    }

    /// Cancelling a completed order restores the exact pre-completion stock
    #[test]
    fn test_cancel_exactly_reverses_completion(
        mut items in model_items_strategy(),
        extra in 0..=50i64
    ) {
        let needed: i64 = items.iter().map(|i| i.quantity).sum();
        let before = needed + extra;
        let mut stock = before;

        complete(&mut stock, &mut items).unwrap();
        cancel(&mut stock, &mut items);

        prop_assert_eq!(stock, before);
        prop_assert!(items.iter().all(|i| !i.stock_applied));
    }

    /// A failed completion leaves stock and flags untouched
    #[test]
    fn test_insufficient_stock_aborts_whole_transition(
        mut items in model_items_strategy(),
        shortfall in 1..=10i64
    ) {
        let needed: i64 = items.iter().map(|i| i.quantity).sum();
        let before = (needed - shortfall).max(0);
        let mut stock = before;

        if needed > stock {
            prop_assert!(complete(&mut stock, &mut items).is_err());
            prop_assert_eq!(stock, before);
            prop_assert!(items.iter().all(|i| !i.stock_applied));
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Order of one line of 5 on a product with stock 3: completion
    /// fails, stock stays 3, nothing is applied
    #[test]
    fn test_completion_rejected_on_short_stock() {
        let mut stock = 3;
        let mut items = vec![ModelItem {
            quantity: 5,
            stock_applied: false,
        }];

        assert!(complete(&mut stock, &mut items).is_err());
        assert_eq!(stock, 3);
        assert!(!items[0].stock_applied);
    }

    /// Cancelling before completion is a pure status change; no credits
    #[test]
    fn test_cancel_before_completion_moves_no_stock() {
        let mut stock = 7;
        let mut items = vec![
            ModelItem {
                quantity: 2,
                stock_applied: false,
            },
            ModelItem {
                quantity: 3,
                stock_applied: false,
            },
        ];

        cancel(&mut stock, &mut items);
        assert_eq!(stock, 7);
    }

    #[test]
    fn test_default_gst_example() {
        // Two lines at 100 and 200, 18% GST
        let totals = compute_order_totals(
            vec![Decimal::from(100), Decimal::from(200)],
            Decimal::from(18),
        );
        assert_eq!(totals.sub_total, Decimal::from(300));
        assert_eq!(totals.tax, Decimal::from(54));
        assert_eq!(totals.total, Decimal::from(354));
    }

    #[test]
    fn test_unknown_status_is_rejected_at_parse() {
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse("returned"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }
}
