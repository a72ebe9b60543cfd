//! # Billing Record

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{ValidationError, ValidationResult};
use super::timestamp;

/// Payment state of a billing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl BillingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::Pending => "pending",
            BillingStatus::Paid => "paid",
            BillingStatus::Overdue => "overdue",
            BillingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A billing record, owned by whichever tier currently holds it
///
/// `created_at` drives archival eligibility and never changes after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRecord {
    /// Empty only on records submitted for creation; an id is assigned then
    #[serde(default)]
    pub id: String,
    pub customer_id: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub status: BillingStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub due_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl BillingRecord {
    /// New pending record created now, due in `due_in_days`
    pub fn new(
        id: impl Into<String>,
        customer_id: impl Into<String>,
        amount: f64,
        due_in_days: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            customer_id: customer_id.into(),
            amount,
            currency: default_currency(),
            status: BillingStatus::Pending,
            description: None,
            created_at: now,
            due_date: now + chrono::Duration::days(due_in_days),
            paid_at: None,
            metadata: Map::new(),
        }
    }

    /// Decode a stored JSON document
    pub fn from_document(doc: Value) -> ValidationResult<Self> {
        serde_json::from_value(doc).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    /// Full JSON representation, as written to the cold tier
    pub fn to_document(&self) -> ValidationResult<Value> {
        serde_json::to_value(self).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    pub fn to_json_bytes(&self) -> ValidationResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    pub fn from_json_bytes(bytes: &[u8]) -> ValidationResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    /// True when the record was created strictly before `cutoff`
    pub fn is_older_than(&self, cutoff: DateTime<Utc>) -> bool {
        self.created_at < cutoff
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Field-level checks applied before a record enters the hot tier
    pub fn validate(&self) -> ValidationResult<()> {
        if !self.has_id() {
            return Err(ValidationError::field("id", "must not be empty"));
        }
        if self.customer_id.trim().is_empty() {
            return Err(ValidationError::field("customer_id", "must not be empty"));
        }
        validate_amount(self.amount)?;
        validate_currency(&self.currency)?;
        Ok(())
    }
}

pub(crate) fn validate_amount(amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() {
        return Err(ValidationError::field("amount", "must be a finite number"));
    }
    Ok(())
}

pub(crate) fn validate_currency(currency: &str) -> ValidationResult<()> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::field(
            "currency",
            format!("'{}' is not a three-letter ISO code", currency),
        ));
    }
    Ok(())
}
