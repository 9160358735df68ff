//! Validation utilities for the Retail Inventory Management System

use rust_decimal::Decimal;

// ============================================================================
// Line Item Validations
// ============================================================================

/// Validate a line item quantity (must be strictly positive)
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a unit cost (must not be negative)
pub fn validate_unit_cost(unit_cost: Decimal) -> Result<(), &'static str> {
    if unit_cost < Decimal::ZERO {
        return Err("Unit cost cannot be negative");
    }
    Ok(())
}

/// Validate that an order or purchase has at least one line item
pub fn validate_line_item_count(count: usize) -> Result<(), &'static str> {
    if count == 0 {
        return Err("At least one line item is required");
    }
    Ok(())
}

// ============================================================================
// Identifier Validations
// ============================================================================

/// Validate an invoice/purchase reference number
///
/// Accepts 3-32 characters of uppercase alphanumerics and dashes
/// (e.g., "INV-2024-0001", "PUR-2024-0001").
pub fn validate_reference_no(reference: &str) -> Result<(), &'static str> {
    if reference.len() < 3 {
        return Err("Reference number must be at least 3 characters");
    }
    if reference.len() > 32 {
        return Err("Reference number must be at most 32 characters");
    }
    if !reference
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Reference number must be uppercase alphanumeric with dashes");
    }
    Ok(())
}

/// Validate a GST percentage (0-100)
pub fn validate_gst_percent(gst: Decimal) -> Result<(), &'static str> {
    if gst < Decimal::ZERO || gst > Decimal::from(100) {
        return Err("GST percent must be between 0 and 100");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a phone number (7-15 digits, optional separators)
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 7 && digits.len() <= 15 {
        Ok(())
    } else {
        Err("Invalid phone number")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        compute_order_totals, line_total, returnable_quantity, OrderStatus, PurchaseStatus,
    };

    // ========================================================================
    // Line Item Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
    }

    #[test]
    fn test_validate_unit_cost() {
        assert!(validate_unit_cost(Decimal::ZERO).is_ok());
        assert!(validate_unit_cost(Decimal::new(1999, 2)).is_ok());
        assert!(validate_unit_cost(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_line_item_count() {
        assert!(validate_line_item_count(1).is_ok());
        assert!(validate_line_item_count(50).is_ok());
        assert!(validate_line_item_count(0).is_err());
    }

    // ========================================================================
    // Identifier Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_reference_no_valid() {
        assert!(validate_reference_no("INV-2024-0001").is_ok());
        assert!(validate_reference_no("PUR-2024-0001").is_ok());
        assert!(validate_reference_no("A1B").is_ok());
    }

    #[test]
    fn test_validate_reference_no_invalid() {
        assert!(validate_reference_no("AB").is_err()); // Too short
        assert!(validate_reference_no("inv-2024-0001").is_err()); // Lowercase
        assert!(validate_reference_no("INV 2024").is_err()); // Space
        assert!(validate_reference_no(&"X".repeat(33)).is_err()); // Too long
    }

    #[test]
    fn test_validate_gst_percent() {
        assert!(validate_gst_percent(Decimal::ZERO).is_ok());
        assert!(validate_gst_percent(Decimal::from(18)).is_ok());
        assert!(validate_gst_percent(Decimal::from(100)).is_ok());
        assert!(validate_gst_percent(Decimal::from(-1)).is_err());
        assert!(validate_gst_percent(Decimal::from(101)).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0812345678").is_ok());
        assert!(validate_phone("081-234-5678").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("abcdefghij").is_err());
    }

    // ========================================================================
    // Order Totals Tests
    // ========================================================================

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(4, Decimal::new(2550, 2)), Decimal::new(10200, 2));
        assert_eq!(line_total(1, Decimal::from(100)), Decimal::from(100));
    }

    #[test]
    fn test_order_totals_default_gst() {
        let totals = compute_order_totals(
            vec![Decimal::from(100), Decimal::from(200)],
            Decimal::from(18),
        );
        assert_eq!(totals.sub_total, Decimal::from(300));
        assert_eq!(totals.tax, Decimal::from(54));
        assert_eq!(totals.total, Decimal::from(354));
    }

    #[test]
    fn test_order_totals_zero_gst() {
        let totals = compute_order_totals(vec![Decimal::from(250)], Decimal::ZERO);
        assert_eq!(totals.sub_total, Decimal::from(250));
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(250));
    }

    #[test]
    fn test_order_totals_tax_rounded_to_cents() {
        // 18% of 33.33 = 5.9994, rounds to 6.00
        let totals = compute_order_totals(vec![Decimal::new(3333, 2)], Decimal::from(18));
        assert_eq!(totals.tax, Decimal::new(600, 2));
        assert_eq!(totals.total, Decimal::new(3933, 2));
    }

    #[test]
    fn test_order_totals_is_sum_plus_tax() {
        let totals = compute_order_totals(
            vec![Decimal::new(1999, 2), Decimal::new(505, 2)],
            Decimal::from(18),
        );
        assert_eq!(totals.total, totals.sub_total + totals.tax);
    }

    // ========================================================================
    // Order Status State Machine Tests
    // ========================================================================

    #[test]
    fn test_order_status_forward_edges() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Cancelled));
    }

    #[test]
    fn test_order_status_compensating_edge() {
        // The single backward-looking edge: completed -> cancelled
        assert!(OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_order_status_rejected_edges() {
        use OrderStatus::*;
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Processing));
        assert!(!Cancelled.can_transition_to(Completed));
    }

    #[test]
    fn test_order_status_retries_are_legal() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn test_order_status_parse_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    // ========================================================================
    // Purchase Status State Machine Tests
    // ========================================================================

    #[test]
    fn test_purchase_status_edges() {
        use PurchaseStatus::*;
        assert!(Pending.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Returned));
        assert!(!Pending.can_transition_to(Returned));
        assert!(!Completed.can_transition_to(Pending));
    }

    #[test]
    fn test_purchase_returned_is_terminal() {
        use PurchaseStatus::*;
        // Returns are not idempotent: re-returning is rejected outright
        assert!(!Returned.can_transition_to(Returned));
        assert!(!Returned.can_transition_to(Pending));
        assert!(!Returned.can_transition_to(Completed));
    }

    #[test]
    fn test_purchase_approved_is_completed() {
        assert_eq!(
            PurchaseStatus::parse("approved"),
            Some(PurchaseStatus::Completed)
        );
        assert_eq!(
            PurchaseStatus::parse("completed"),
            Some(PurchaseStatus::Completed)
        );
    }

    // ========================================================================
    // Return Clamp Tests
    // ========================================================================

    #[test]
    fn test_returnable_quantity_clamped_by_stock() {
        assert_eq!(returnable_quantity(10, 6), 6);
        assert_eq!(returnable_quantity(10, 10), 10);
        assert_eq!(returnable_quantity(10, 15), 10);
        assert_eq!(returnable_quantity(10, 0), 0);
    }

    #[test]
    fn test_returnable_quantity_never_negative() {
        assert_eq!(returnable_quantity(10, -3), 0);
        assert_eq!(returnable_quantity(0, 5), 0);
    }
}
