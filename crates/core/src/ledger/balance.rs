//! Cached GL balance deltas.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::types::{GlAccountType, JournalLine};

/// Net change to one GL account's cached balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceDelta {
    /// GL account ID.
    pub account_id: Uuid,
    /// Signed change, by the account's normal side.
    pub delta: Decimal,
}

/// Folds journal lines into one delta per account, in first-seen order.
///
/// Accounts whose lines cancel out are kept with a zero delta so callers
/// can still lock them in a stable order.
pub fn balance_deltas<'a, I>(lines: I) -> Vec<BalanceDelta>
where
    I: IntoIterator<Item = (&'a JournalLine, GlAccountType)>,
{
    let mut deltas: Vec<BalanceDelta> = Vec::new();
    for (line, account_type) in lines {
        let change = account_type.balance_change(line.debit, line.credit);
        match deltas.iter_mut().find(|d| d.account_id == line.account_id) {
            Some(existing) => existing.delta += change,
            None => deltas.push(BalanceDelta {
                account_id: line.account_id,
                delta: change,
            }),
        }
    }
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(account_id: Uuid, debit: Decimal, credit: Decimal) -> JournalLine {
        JournalLine {
            account_id,
            account_code: "x".to_string(),
            debit,
            credit,
            description: String::new(),
        }
    }

    #[test]
    fn test_same_account_lines_are_netted() {
        let cash = Uuid::new_v4();
        let momo = Uuid::new_v4();
        let lines = [
            line(momo, dec!(100), dec!(0)),
            line(cash, dec!(2), dec!(0)),
            line(cash, dec!(0), dec!(100)),
        ];

        let deltas = balance_deltas(lines.iter().map(|l| (l, GlAccountType::Asset)));
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0], BalanceDelta { account_id: momo, delta: dec!(100) });
        assert_eq!(deltas[1], BalanceDelta { account_id: cash, delta: dec!(-98) });
    }

    #[test]
    fn test_credit_normal_accounts_grow_on_credit() {
        let revenue = Uuid::new_v4();
        let lines = [line(revenue, dec!(0), dec!(3.50))];
        let deltas = balance_deltas(lines.iter().map(|l| (l, GlAccountType::Revenue)));
        assert_eq!(deltas[0].delta, dec!(3.50));
    }
}
