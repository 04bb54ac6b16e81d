//! Notification message construction.

use rust_decimal::Decimal;
use serde_json::Value;

use super::{Channel, Notification};
use crate::recorder::{DomainTransaction, TransactionModule};

/// Which lifecycle step the customer is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    /// Transaction completed.
    Completed,
    /// Transaction reversed.
    Reversed,
}

/// Customer contact details found in a transaction's details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    /// Mobile number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

impl Contact {
    /// Reads `customer_phone` (or MoMo's `phone_number`) and `customer_email`.
    #[must_use]
    pub fn from_details(details: &Value) -> Self {
        let text = |key: &str| {
            details
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };
        Self {
            phone: text("customer_phone").or_else(|| text("phone_number")),
            email: text("customer_email"),
        }
    }

    /// True when there is nobody to notify.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none()
    }
}

/// Builds one notification per available channel.
#[must_use]
pub fn build_notifications(
    transaction: &DomainTransaction,
    event: NotificationEvent,
) -> Vec<Notification> {
    let contact = Contact::from_details(&transaction.details);
    if contact.is_empty() {
        return Vec::new();
    }

    let label = module_label(transaction.module);
    let total = transaction.amount + transaction.fee;
    let reference = transaction.reference.as_deref().unwrap_or("-");
    let (subject, body) = match event {
        NotificationEvent::Completed => (
            format!("{label} transaction completed"),
            format!(
                "Your {label} transaction of GHS {} (fee GHS {}) was successful. Ref: {reference}.",
                money(transaction.amount),
                money(transaction.fee),
            ),
        ),
        NotificationEvent::Reversed => (
            format!("{label} transaction reversed"),
            format!(
                "Your {label} transaction of GHS {} has been reversed. Ref: {reference}.",
                money(total),
            ),
        ),
    };

    let mut out = Vec::with_capacity(2);
    if let Some(phone) = contact.phone {
        out.push(Notification {
            channel: Channel::Sms,
            recipient: phone,
            subject: subject.clone(),
            body: body.clone(),
        });
    }
    if let Some(email) = contact.email {
        out.push(Notification {
            channel: Channel::Email,
            recipient: email,
            subject,
            body,
        });
    }
    out
}

const fn module_label(module: TransactionModule) -> &'static str {
    match module {
        TransactionModule::Power => "Power",
        TransactionModule::Momo => "Mobile Money",
        TransactionModule::AgencyBanking => "Agency Banking",
        TransactionModule::EZwich => "E-Zwich",
        TransactionModule::JumiaCollection | TransactionModule::JumiaSettlement => "Jumia",
        TransactionModule::Expenses => "Expense",
    }
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::TransactionStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use uuid::Uuid;

    fn transaction(details: Value) -> DomainTransaction {
        DomainTransaction {
            id: Uuid::new_v4(),
            branch_id: Uuid::new_v4(),
            module: TransactionModule::Power,
            status: TransactionStatus::Completed,
            amount: dec!(50),
            fee: dec!(1.5),
            reference: Some("PW-001".to_string()),
            payment_float_id: None,
            service_float_id: None,
            details,
            gl_transaction_id: None,
            notes: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_no_contact_no_messages() {
        let tx = transaction(json!({"meter_number": "123"}));
        assert!(build_notifications(&tx, NotificationEvent::Completed).is_empty());
    }

    #[test]
    fn test_both_channels() {
        let tx = transaction(json!({
            "customer_phone": " 0241234567 ",
            "customer_email": "ama@example.com"
        }));
        let messages = build_notifications(&tx, NotificationEvent::Completed);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].channel, Channel::Sms);
        assert_eq!(messages[0].recipient, "0241234567");
        assert_eq!(
            messages[0].body,
            "Your Power transaction of GHS 50.00 (fee GHS 1.50) was successful. Ref: PW-001."
        );
        assert_eq!(messages[1].channel, Channel::Email);
        assert_eq!(messages[1].subject, "Power transaction completed");
    }

    #[test]
    fn test_momo_phone_number_is_a_contact() {
        let contact = Contact::from_details(&json!({"phone_number": "0551112222"}));
        assert_eq!(contact.phone.as_deref(), Some("0551112222"));
        assert!(contact.email.is_none());
    }

    #[test]
    fn test_reversal_message_includes_fee() {
        let tx = transaction(json!({"customer_phone": "0241234567"}));
        let messages = build_notifications(&tx, NotificationEvent::Reversed);
        assert!(messages[0].body.contains("GHS 51.50 has been reversed"));
    }
}
