//! Donation form validation.

use serde::{Deserialize, Serialize};

use crate::donation::error::{DonationError, DonationResult};
use crate::stellar::Amount;

pub const MSG_MISSING_FIELDS: &str = "Please fill in all fields";
pub const MSG_INVALID_AMOUNT: &str = "Donation amount must be a valid number";
pub const MSG_NON_POSITIVE_AMOUNT: &str = "Donation amount must be greater than 0";

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub recipient: String,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationRequest {
    pub amount: Amount,
    /// Recipient as entered; its strkey form is checked when building.
    pub recipient: String,
}

impl DonationForm {
    pub fn new(amount: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            recipient: recipient.into(),
        }
    }

    /// Validate the form. Never touches the network.
    pub fn validate(&self) -> DonationResult<DonationRequest> {
        let amount = self.amount.trim();
        let recipient = self.recipient.trim();

        if amount.is_empty() || recipient.is_empty() {
            return Err(DonationError::Validation(MSG_MISSING_FIELDS.to_string()));
        }

        let amount: Amount = amount
            .parse()
            .map_err(|_| DonationError::Validation(MSG_INVALID_AMOUNT.to_string()))?;

        if !amount.is_positive() {
            return Err(DonationError::Validation(MSG_NON_POSITIVE_AMOUNT.to_string()));
        }

        Ok(DonationRequest {
            amount,
            recipient: recipient.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(form: DonationForm) -> String {
        form.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(message(DonationForm::new("", "GDEST")), MSG_MISSING_FIELDS);
        assert_eq!(message(DonationForm::new("5", "  ")), MSG_MISSING_FIELDS);
        assert_eq!(message(DonationForm::default()), MSG_MISSING_FIELDS);
    }

    #[test]
    fn test_non_positive_amount() {
        assert_eq!(message(DonationForm::new("0", "GDEST")), MSG_NON_POSITIVE_AMOUNT);
        assert_eq!(message(DonationForm::new("-3", "GDEST")), MSG_NON_POSITIVE_AMOUNT);
        assert_eq!(message(DonationForm::new("0.0000000", "GDEST")), MSG_NON_POSITIVE_AMOUNT);
    }

    #[test]
    fn test_unparsable_amount() {
        assert_eq!(message(DonationForm::new("five", "GDEST")), MSG_INVALID_AMOUNT);
        assert_eq!(message(DonationForm::new("1.123456789", "GDEST")), MSG_INVALID_AMOUNT);
    }

    #[test]
    fn test_valid_form() {
        let request = DonationForm::new(" 5 ", " GDEST ").validate().unwrap();
        assert_eq!(request.amount.to_string(), "5");
        assert_eq!(request.recipient, "GDEST");
    }
}
