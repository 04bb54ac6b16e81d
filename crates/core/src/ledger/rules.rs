//! Posting rules: which accounts each business event debits and credits.
//!
//! `P` below is the GL asset mirroring the payment float's type.
//!
//! | Event              | Debit                  | Credit                 |
//! |--------------------|------------------------|------------------------|
//! | Power sale         | P: A+F                 | 1030: A, 4003: F       |
//! | MoMo cash-in       | P: A+F                 | 1010: A, 4001: F       |
//! | MoMo cash-out      | 1010: A, P: F          | P: A, 4001: F          |
//! | Agency deposit     | P: A+F                 | 1020: A, 4002: F       |
//! | Agency withdrawal  | 1020: A, P: F          | P: A, 4002: F          |
//! | Card issuance      | P: F                   | 4004: F                |
//! | Jumia collection   | 1050: A                | 2100: A                |
//! | Jumia settlement   | 2100: A                | 1050: A                |
//! | Expense            | category account: A    | P: A                   |
//! | Float transfer     | destination float: A   | source float: A        |
//! | Adjustment +A      | float: A               | 3001: A                |
//! | Adjustment -A      | 3001: A                | float: A               |

use rust_decimal::Decimal;

use super::chart::{ExpenseCategory, codes};
use super::types::{EntrySide, GlAccountType, JournalDraft, LineSpec, PostingContext};
use crate::float::FloatAccountType;

use super::types::GlAccountType::{Asset, Equity, Liability, Revenue};

/// A business event that moves money.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// Prepaid power sold to a customer.
    PowerSale {
        /// Units value.
        amount: Decimal,
        /// Service fee.
        fee: Decimal,
        /// Float that took the customer's money.
        payment: FloatAccountType,
    },
    /// Customer deposits cash, agent sends e-money.
    MomoCashIn {
        /// E-money sent.
        amount: Decimal,
        /// Commission charged.
        fee: Decimal,
        /// Float that took the cash.
        payment: FloatAccountType,
    },
    /// Customer sends e-money, agent pays out cash.
    MomoCashOut {
        /// Cash paid out.
        amount: Decimal,
        /// Commission charged.
        fee: Decimal,
        /// Float that paid the cash.
        payment: FloatAccountType,
    },
    /// Agency banking deposit into a partner bank account.
    AgencyDeposit {
        /// Deposit amount.
        amount: Decimal,
        /// Commission charged.
        fee: Decimal,
        /// Float that took the cash.
        payment: FloatAccountType,
    },
    /// Agency banking withdrawal from a partner bank account.
    AgencyWithdrawal {
        /// Withdrawal amount.
        amount: Decimal,
        /// Commission charged.
        fee: Decimal,
        /// Float that paid the cash.
        payment: FloatAccountType,
    },
    /// E-Zwich card sold.
    CardIssuance {
        /// Issuance fee.
        fee: Decimal,
        /// Float that took the fee.
        payment: FloatAccountType,
    },
    /// Pay-on-delivery cash collected for Jumia.
    JumiaCollection {
        /// Amount collected.
        amount: Decimal,
    },
    /// Collected funds paid over to Jumia.
    JumiaSettlement {
        /// Amount settled.
        amount: Decimal,
    },
    /// Branch expense.
    Expense {
        /// Expense amount.
        amount: Decimal,
        /// Expense category.
        category: ExpenseCategory,
        /// Float the expense was paid from.
        payment: FloatAccountType,
    },
    /// Funds moved between two floats of one branch.
    FloatTransfer {
        /// Amount moved.
        amount: Decimal,
        /// Source float type.
        from: FloatAccountType,
        /// Destination float type.
        to: FloatAccountType,
    },
    /// Manual float top-up (positive) or withdrawal (negative).
    ManualAdjustment {
        /// Signed delta applied to the float.
        delta: Decimal,
        /// Float that was adjusted.
        float: FloatAccountType,
    },
}

impl LedgerEvent {
    /// Event kind stored as the journal's `source_transaction_type`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PowerSale { .. } => "power_sale",
            Self::MomoCashIn { .. } => "momo_cash_in",
            Self::MomoCashOut { .. } => "momo_cash_out",
            Self::AgencyDeposit { .. } => "agency_deposit",
            Self::AgencyWithdrawal { .. } => "agency_withdrawal",
            Self::CardIssuance { .. } => "card_issuance",
            Self::JumiaCollection { .. } => "jumia_collection",
            Self::JumiaSettlement { .. } => "jumia_settlement",
            Self::Expense { .. } => "expense",
            Self::FloatTransfer { .. } => "float_transfer",
            Self::ManualAdjustment { .. } => "manual_adjustment",
        }
    }
}

/// Stateless posting rules.
pub struct PostingRules;

impl PostingRules {
    /// Builds the journal draft for an event.
    ///
    /// Zero-amount lines are dropped here; resolution rejects anything
    /// negative.
    #[must_use]
    pub fn draft(event: &LedgerEvent, context: PostingContext) -> JournalDraft {
        let lines = Self::lines(event)
            .into_iter()
            .filter(|l| l.amount != Decimal::ZERO)
            .collect();
        JournalDraft { context, lines }
    }

    /// All lines for an event, including zero ones.
    #[must_use]
    pub fn lines(event: &LedgerEvent) -> Vec<LineSpec> {
        match *event {
            LedgerEvent::PowerSale {
                amount,
                fee,
                payment,
            } => Self::sale(
                payment,
                amount,
                fee,
                (codes::POWER_FLOAT, "Power float"),
                (codes::POWER_COMMISSION, "Power commission"),
            ),
            LedgerEvent::MomoCashIn {
                amount,
                fee,
                payment,
            } => Self::sale(
                payment,
                amount,
                fee,
                (codes::MOMO_FLOAT, "MoMo float"),
                (codes::MOMO_COMMISSION, "MoMo commission"),
            ),
            LedgerEvent::MomoCashOut {
                amount,
                fee,
                payment,
            } => Self::payout(
                payment,
                amount,
                fee,
                (codes::MOMO_FLOAT, "MoMo float"),
                (codes::MOMO_COMMISSION, "MoMo commission"),
            ),
            LedgerEvent::AgencyDeposit {
                amount,
                fee,
                payment,
            } => Self::sale(
                payment,
                amount,
                fee,
                (codes::AGENCY_FLOAT, "Agency banking float"),
                (codes::AGENCY_COMMISSION, "Agency banking commission"),
            ),
            LedgerEvent::AgencyWithdrawal {
                amount,
                fee,
                payment,
            } => Self::payout(
                payment,
                amount,
                fee,
                (codes::AGENCY_FLOAT, "Agency banking float"),
                (codes::AGENCY_COMMISSION, "Agency banking commission"),
            ),
            LedgerEvent::CardIssuance { fee, payment } => vec![
                LineSpec::debit(payment.gl_code(), Asset, fee, "Card issuance fee received"),
                LineSpec::credit(codes::CARD_ISSUANCE_FEES, Revenue, fee, "Card issuance fee"),
            ],
            LedgerEvent::JumiaCollection { amount } => vec![
                LineSpec::debit(codes::JUMIA_FLOAT, Asset, amount, "Jumia POD collection"),
                LineSpec::credit(codes::JUMIA_PAYABLE, Liability, amount, "Due to Jumia"),
            ],
            LedgerEvent::JumiaSettlement { amount } => vec![
                LineSpec::debit(codes::JUMIA_PAYABLE, Liability, amount, "Settled to Jumia"),
                LineSpec::credit(codes::JUMIA_FLOAT, Asset, amount, "Jumia settlement paid"),
            ],
            LedgerEvent::Expense {
                amount,
                category,
                payment,
            } => vec![
                LineSpec::any_of(
                    category.gl_codes(),
                    GlAccountType::Expense,
                    EntrySide::Debit,
                    amount,
                    format!("{category} expense"),
                ),
                LineSpec::credit(payment.gl_code(), Asset, amount, "Expense paid"),
            ],
            LedgerEvent::FloatTransfer { amount, from, to } => vec![
                LineSpec::debit(to.gl_code(), Asset, amount, format!("Transfer from {from}")),
                LineSpec::credit(from.gl_code(), Asset, amount, format!("Transfer to {to}")),
            ],
            LedgerEvent::ManualAdjustment { delta, float } => {
                let amount = delta.abs();
                if delta >= Decimal::ZERO {
                    vec![
                        LineSpec::debit(float.gl_code(), Asset, amount, "Float top-up"),
                        LineSpec::credit(codes::OWNERS_CAPITAL, Equity, amount, "Capital injected"),
                    ]
                } else {
                    vec![
                        LineSpec::debit(codes::OWNERS_CAPITAL, Equity, amount, "Capital withdrawn"),
                        LineSpec::credit(float.gl_code(), Asset, amount, "Float withdrawal"),
                    ]
                }
            }
        }
    }

    /// Customer pays `A+F` into the payment float for `A` of service.
    fn sale(
        payment: FloatAccountType,
        amount: Decimal,
        fee: Decimal,
        service: (&'static str, &str),
        commission: (&'static str, &str),
    ) -> Vec<LineSpec> {
        vec![
            LineSpec::debit(payment.gl_code(), Asset, amount + fee, "Received from customer"),
            LineSpec::credit(service.0, Asset, amount, service.1),
            LineSpec::credit(commission.0, Revenue, fee, commission.1),
        ]
    }

    /// Service float receives `A`; payment float pays out `A` and keeps `F`.
    fn payout(
        payment: FloatAccountType,
        amount: Decimal,
        fee: Decimal,
        service: (&'static str, &str),
        commission: (&'static str, &str),
    ) -> Vec<LineSpec> {
        vec![
            LineSpec::debit(service.0, Asset, amount, service.1),
            LineSpec::debit(payment.gl_code(), Asset, fee, "Fee received"),
            LineSpec::credit(payment.gl_code(), Asset, amount, "Paid to customer"),
            LineSpec::credit(commission.0, Revenue, fee, commission.1),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sides(lines: &[LineSpec]) -> (Decimal, Decimal) {
        lines.iter().fold((Decimal::ZERO, Decimal::ZERO), |(d, c), l| match l.side {
            EntrySide::Debit => (d + l.amount, c),
            EntrySide::Credit => (d, c + l.amount),
        })
    }

    #[test]
    fn test_power_sale_lines() {
        let lines = PostingRules::lines(&LedgerEvent::PowerSale {
            amount: dec!(100),
            fee: dec!(2.50),
            payment: FloatAccountType::CashInTill,
        });

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].codes, vec!["1001"]);
        assert_eq!(lines[0].amount, dec!(102.50));
        assert_eq!(lines[1].codes, vec!["1030"]);
        assert_eq!(lines[2].codes, vec!["4003"]);
        assert_eq!(lines[2].account_type, GlAccountType::Revenue);
        assert_eq!(sides(&lines), (dec!(102.50), dec!(102.50)));
    }

    #[test]
    fn test_momo_cash_out_keeps_same_account_pair() {
        let lines = PostingRules::lines(&LedgerEvent::MomoCashOut {
            amount: dec!(500),
            fee: dec!(5),
            payment: FloatAccountType::CashInTill,
        });

        let cash_lines: Vec<_> = lines.iter().filter(|l| l.codes == vec!["1001"]).collect();
        assert_eq!(cash_lines.len(), 2);
        assert_eq!(sides(&lines), (dec!(505), dec!(505)));
    }

    #[test]
    fn test_zero_fee_lines_dropped_from_draft() {
        let context = PostingContext {
            source_module: "momo".to_string(),
            source_transaction_id: None,
            source_transaction_type: "momo_cash_in".to_string(),
            description: String::new(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            branch_id: uuid::Uuid::nil(),
            created_by: uuid::Uuid::nil(),
            metadata: serde_json::Value::Null,
        };
        let draft = PostingRules::draft(
            &LedgerEvent::MomoCashIn {
                amount: dec!(40),
                fee: Decimal::ZERO,
                payment: FloatAccountType::CashInTill,
            },
            context,
        );
        assert_eq!(draft.lines.len(), 2);
    }

    #[test]
    fn test_expense_uses_category_codes() {
        let lines = PostingRules::lines(&LedgerEvent::Expense {
            amount: dec!(80),
            category: ExpenseCategory::Operational,
            payment: FloatAccountType::CashInTill,
        });
        assert_eq!(lines[0].codes, vec!["5001", "5100"]);
        assert_eq!(lines[0].side, EntrySide::Debit);
        assert_eq!(lines[1].codes, vec!["1001"]);
        assert_eq!(lines[1].side, EntrySide::Credit);
    }

    #[test]
    fn test_negative_adjustment_debits_capital() {
        let lines = PostingRules::lines(&LedgerEvent::ManualAdjustment {
            delta: dec!(-30),
            float: FloatAccountType::Momo,
        });
        assert_eq!(lines[0].codes, vec!["3001"]);
        assert_eq!(lines[0].amount, dec!(30));
        assert_eq!(lines[1].codes, vec!["1010"]);
        assert_eq!(lines[1].side, EntrySide::Credit);
    }
}
