//! # Billing Patch
//!
//! Typed partial update. Only mutable fields are accepted; `id`,
//! `created_at` and any unknown key are rejected at decode time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{ValidationError, ValidationResult};
use super::record::{validate_amount, validate_currency, BillingRecord, BillingStatus};
use super::timestamp;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BillingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub paid_at: Option<DateTime<Utc>>,
    /// Replaces the whole metadata map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl BillingPatch {
    /// Decode an untyped field map, rejecting unknown or immutable fields
    pub fn from_json(value: Value) -> ValidationResult<Self> {
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        *self == BillingPatch::default()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(customer_id) = &self.customer_id {
            if customer_id.trim().is_empty() {
                return Err(ValidationError::field("customer_id", "must not be empty"));
            }
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(currency) = &self.currency {
            validate_currency(currency)?;
        }
        Ok(())
    }

    /// Merge into `record`. Call `validate` first.
    pub fn apply(&self, record: &mut BillingRecord) {
        if let Some(customer_id) = &self.customer_id {
            record.customer_id = customer_id.clone();
        }
        if let Some(amount) = self.amount {
            record.amount = amount;
        }
        if let Some(currency) = &self.currency {
            record.currency = currency.clone();
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(description) = &self.description {
            record.description = Some(description.clone());
        }
        if let Some(due_date) = self.due_date {
            record.due_date = due_date;
        }
        if let Some(paid_at) = self.paid_at {
            record.paid_at = Some(paid_at);
        }
        if let Some(metadata) = &self.metadata {
            record.metadata = metadata.clone();
        }
    }
}
