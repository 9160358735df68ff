//! Purchase lifecycle and return property and unit tests
//!
//! Covers:
//! - the purchase status state machine (approved synonym, terminal returned)
//! - the stock-constrained return clamp
//! - preview purity and preview/commit agreement
//! - the shared-stock scenario: purchased units partially consumed by a
//!   sale before the purchase is returned

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{returnable_quantity, PurchaseStatus, ReturnPreview, ReturnPreviewLine};

fn purchase_status_strategy() -> impl Strategy<Value = PurchaseStatus> {
    prop_oneof![
        Just(PurchaseStatus::Pending),
        Just(PurchaseStatus::Completed),
        Just(PurchaseStatus::Returned),
    ]
}

proptest! {
    // ========================================================================
    // State machine properties
    // ========================================================================

    /// Returned is terminal, including against itself: a second return
    /// must be rejected, never silently repeated
    #[test]
    fn test_returned_is_terminal(next in purchase_status_strategy()) {
        prop_assert!(!PurchaseStatus::Returned.can_transition_to(next));
    }

    /// A return is only reachable from completed
    #[test]
    fn test_return_only_from_completed(from in purchase_status_strategy()) {
        prop_assert_eq!(
            from.can_transition_to(PurchaseStatus::Returned),
            from == PurchaseStatus::Completed
        );
    }

    // ========================================================================
    // Return clamp properties
    // ========================================================================

    /// The returnable quantity never exceeds either the purchased
    /// quantity or the live stock, and debiting it never drives stock
    /// negative
    #[test]
    fn test_clamp_bounds(purchased in 0..=1000i64, stock in 0..=1000i64) {
        let returnable = returnable_quantity(purchased, stock);
        prop_assert!(returnable <= purchased);
        prop_assert!(returnable <= stock);
        prop_assert!(stock - returnable >= 0);
    }

    /// Full return is possible exactly when stock covers the purchase
    #[test]
    fn test_full_return_condition(purchased in 1..=1000i64, stock in 0..=1000i64) {
        let line = ReturnPreviewLine::compute(
            Uuid::new_v4(),
            "Test product".to_string(),
            purchased,
            stock,
            Decimal::from(10),
        );
        prop_assert_eq!(line.can_fully_return, stock >= purchased);
    }

    /// The potential refund is the clamped quantity at the purchase's
    /// unit cost
    #[test]
    fn test_refund_matches_clamp(
        purchased in 0..=1000i64,
        stock in 0..=1000i64,
        cost_cents in 1..=100_000i64
    ) {
        let unit_cost = Decimal::new(cost_cents, 2);
        let line = ReturnPreviewLine::compute(
            Uuid::new_v4(),
            "Test product".to_string(),
            purchased,
            stock,
            unit_cost,
        );
        prop_assert_eq!(
            line.potential_refund,
            Decimal::from(line.returnable_quantity) * unit_cost
        );
    }

    /// Previewing is pure: recomputing from the same inputs gives the
    /// same projection
    #[test]
    fn test_preview_is_pure(
        purchased in 0..=1000i64,
        stock in 0..=1000i64,
        cost_cents in 1..=100_000i64
    ) {
        let product_id = Uuid::new_v4();
        let unit_cost = Decimal::new(cost_cents, 2);
        let a = ReturnPreviewLine::compute(
            product_id, "Test product".to_string(), purchased, stock, unit_cost,
        );
        let b = ReturnPreviewLine::compute(
            product_id, "Test product".to_string(), purchased, stock, unit_cost,
        );
        prop_assert_eq!(a.returnable_quantity, b.returnable_quantity);
        prop_assert_eq!(a.potential_refund, b.potential_refund);
        prop_assert_eq!(a.can_fully_return, b.can_fully_return);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_approved_is_a_synonym_of_completed() {
        assert_eq!(
            PurchaseStatus::parse("approved"),
            Some(PurchaseStatus::Completed)
        );
    }

    #[test]
    fn test_pending_cannot_be_returned_directly() {
        assert!(!PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Returned));
    }

    /// The shared-stock scenario:
    /// stock 0 -> purchase 10 completed -> stock 10 -> order of 4
    /// completed -> stock 6 -> return preview shows 6 returnable with a
    /// partial-return flag -> committing debits 6 and refunds exactly
    /// what the preview projected
    #[test]
    fn test_purchase_sell_return_scenario() {
        let product_id = Uuid::new_v4();
        let unit_cost = Decimal::new(2500, 2); // 25.00 per unit
        let mut stock = 0i64;

        // Purchase of 10 completed: ledger credit
        let purchased = 10;
        stock += purchased;
        assert_eq!(stock, 10);

        // Order of 4 completed: ledger debit from the same counter
        stock -= 4;
        assert_eq!(stock, 6);

        // Preview: returnable is clamped to the 6 units still on hand
        let preview_line = ReturnPreviewLine::compute(
            product_id,
            "Test product".to_string(),
            purchased,
            stock,
            unit_cost,
        );
        assert_eq!(preview_line.returnable_quantity, 6);
        assert!(!preview_line.can_fully_return);
        assert_eq!(preview_line.potential_refund, Decimal::from(6) * unit_cost);

        let preview = ReturnPreview::from_lines(Uuid::new_v4(), vec![preview_line.clone()]);
        assert_eq!(preview.total_refund, Decimal::new(15000, 2)); // 150.00
        assert!(!preview.can_fully_return);

        // Commit: re-clamp against live stock, debit, record the refund
        let returnable = returnable_quantity(purchased, stock);
        assert_eq!(returnable, 6);
        stock -= returnable;
        let refund = Decimal::from(returnable) * unit_cost;

        assert_eq!(stock, 0);
        assert_eq!(refund, preview_line.potential_refund);
    }

    /// Stock consumed entirely by sales: the return commits with a zero
    /// refund rather than failing
    #[test]
    fn test_return_clamps_to_zero_when_stock_gone() {
        let returnable = returnable_quantity(10, 0);
        assert_eq!(returnable, 0);

        let line = ReturnPreviewLine::compute(
            Uuid::new_v4(),
            "Test product".to_string(),
            10,
            0,
            Decimal::from(25),
        );
        assert_eq!(line.returnable_quantity, 0);
        assert_eq!(line.potential_refund, Decimal::ZERO);
        assert!(!line.can_fully_return);
    }

    /// Aggregate preview math over several lines
    #[test]
    fn test_preview_aggregates_lines() {
        let lines = vec![
            ReturnPreviewLine::compute(
                Uuid::new_v4(),
                "Fully returnable".to_string(),
                5,
                8,
                Decimal::from(10),
            ),
            ReturnPreviewLine::compute(
                Uuid::new_v4(),
                "Partially returnable".to_string(),
                10,
                4,
                Decimal::from(20),
            ),
        ];

        let preview = ReturnPreview::from_lines(Uuid::new_v4(), lines);
        // 5 * 10 + 4 * 20
        assert_eq!(preview.total_refund, Decimal::from(130));
        assert!(!preview.can_fully_return);
    }
}
