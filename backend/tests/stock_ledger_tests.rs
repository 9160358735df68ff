//! Stock ledger property and unit tests
//!
//! Covers the ledger accounting guarantees:
//! - stock never goes negative under any debit/credit sequence
//! - stock after a sequence equals initial + applied credits - applied debits
//! - a refused debit changes nothing

use proptest::prelude::*;

/// One ledger operation: credit adds, debit subtracts
#[derive(Debug, Clone, Copy)]
enum LedgerOp {
    Credit(i64),
    Debit(i64),
}

/// Apply an operation with the ledger's floor-at-zero semantics:
/// a debit larger than the current stock is refused outright and the
/// stock is left untouched. Returns the new stock and whether the
/// operation was applied.
fn apply(stock: i64, op: LedgerOp) -> (i64, bool) {
    match op {
        LedgerOp::Credit(qty) => (stock + qty, true),
        LedgerOp::Debit(qty) if qty <= stock => (stock - qty, true),
        LedgerOp::Debit(_) => (stock, false),
    }
}

fn ledger_op_strategy() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        (1..=100i64).prop_map(LedgerOp::Credit),
        (1..=100i64).prop_map(LedgerOp::Debit),
    ]
}

proptest! {
    /// Stock never goes negative, whatever the operation sequence
    #[test]
    fn test_stock_never_negative(
        initial in 0..=50i64,
        ops in prop::collection::vec(ledger_op_strategy(), 0..50)
    ) {
        let mut stock = initial;
        for op in ops {
            let (next, _) = apply(stock, op);
            prop_assert!(next >= 0, "stock went negative: {}", next);
            stock = next;
        }
    }

    /// Final stock equals initial + sum of applied credits - sum of
    /// applied debits
    #[test]
    fn test_stock_accounting_identity(
        initial in 0..=50i64,
        ops in prop::collection::vec(ledger_op_strategy(), 0..50)
    ) {
        let mut stock = initial;
        let mut applied_credits = 0i64;
        let mut applied_debits = 0i64;

        for op in ops {
            let (next, applied) = apply(stock, op);
            if applied {
                match op {
                    LedgerOp::Credit(qty) => applied_credits += qty,
                    LedgerOp::Debit(qty) => applied_debits += qty,
                }
            }
            stock = next;
        }

        prop_assert_eq!(stock, initial + applied_credits - applied_debits);
    }

    /// A refused debit is a no-op
    #[test]
    fn test_refused_debit_changes_nothing(
        stock in 0..=50i64,
        excess in 1..=100i64
    ) {
        let (next, applied) = apply(stock, LedgerOp::Debit(stock + excess));
        prop_assert!(!applied);
        prop_assert_eq!(next, stock);
    }

    /// Credits have no upper bound
    #[test]
    fn test_credit_always_applies(stock in 0..=1_000_000i64, qty in 1..=1_000_000i64) {
        let (next, applied) = apply(stock, LedgerOp::Credit(qty));
        prop_assert!(applied);
        prop_assert_eq!(next, stock + qty);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_exact_debit_empties_stock() {
        let (next, applied) = apply(10, LedgerOp::Debit(10));
        assert!(applied);
        assert_eq!(next, 0);
    }

    #[test]
    fn test_debit_one_over_is_refused() {
        let (next, applied) = apply(10, LedgerOp::Debit(11));
        assert!(!applied);
        assert_eq!(next, 10);
    }

    #[test]
    fn test_interleaved_sequence() {
        // credit 10, debit 4, credit 3, debit 9 = 0
        let ops = [
            LedgerOp::Credit(10),
            LedgerOp::Debit(4),
            LedgerOp::Credit(3),
            LedgerOp::Debit(9),
        ];
        let mut stock = 0;
        for op in ops {
            let (next, applied) = apply(stock, op);
            assert!(applied);
            stock = next;
        }
        assert_eq!(stock, 0);
    }
}
