//! Billing details embedded in an organization (stored as JSONB).

use serde::{Deserialize, Serialize};

/// How an organization pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    /// Card on file.
    CreditCard,
    /// PayPal account.
    Paypal,
    /// Wire transfer.
    BankTransfer,
}

/// Settlement state of the current billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Settled.
    Paid,
    /// Not yet paid.
    #[default]
    Unpaid,
    /// Payment initiated but not confirmed.
    Pending,
}

/// Billing address, contact and payment state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingInfo {
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let info: BillingInfo =
            serde_json::from_str(r#"{"city":"Oslo","paymentMethod":"bankTransfer"}"#)
                .expect("billing info parses");
        assert_eq!(info.city.as_deref(), Some("Oslo"));
        assert_eq!(info.payment_method, Some(PaymentMethod::BankTransfer));
        assert_eq!(info.payment_status, PaymentStatus::Unpaid);
    }
}
