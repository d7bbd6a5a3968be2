// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub const OTHER_CATEGORY: &str = "other";
pub const DEFAULT_REMINDER_TIME: &str = "20:00";

const EXPENSE_CATEGORIES: &[&str] = &[
    "leisure",
    "food",
    "transport",
    "shopping",
    "services",
    OTHER_CATEGORY,
];
const INCOME_CATEGORIES: &[&str] = &["salary", "freelance", "investment-returns", OTHER_CATEGORY];
const INVESTMENT_CATEGORIES: &[&str] = &["stocks", "funds", "crypto", "real-estate", OTHER_CATEGORY];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    // Legacy records carry no type at all and are expenses.
    #[default]
    Expense,
    Income,
    Investment,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [
        TransactionType::Expense,
        TransactionType::Income,
        TransactionType::Investment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
            TransactionType::Investment => "investment",
        }
    }

    /// The fixed category list for this type.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TransactionType::Expense => EXPENSE_CATEGORIES,
            TransactionType::Income => INCOME_CATEGORIES,
            TransactionType::Investment => INVESTMENT_CATEGORIES,
        }
    }

    pub fn accepts(&self, category: &str) -> bool {
        self.categories().contains(&category)
    }

    pub fn default_category(&self) -> &'static str {
        self.categories()[0]
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" => Ok(TransactionType::Expense),
            "income" => Ok(TransactionType::Income),
            "investment" => Ok(TransactionType::Investment),
            other => Err(ValidationError::UnknownType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    pub description: String,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub occurred_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn category_or_other(&self) -> &str {
        self.category.as_deref().unwrap_or(OTHER_CATEGORY)
    }

    /// Decode a stored document body. Fails only when the body is not a
    /// transaction at all; a bad date or a missing type are tolerated.
    pub fn from_document(id: &str, data: &Value) -> serde_json::Result<Transaction> {
        let doc = TransactionDocument::deserialize(data)?;
        Ok(Transaction {
            id: id.to_string(),
            amount: doc.amount,
            description: doc.description,
            category: doc.category.filter(|c| !c.trim().is_empty()),
            kind: doc.kind,
            occurred_at: doc.occurred_at,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionDocument {
    amount: Decimal,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(rename = "type", default)]
    kind: TransactionType,
    #[serde(alias = "date", default, deserialize_with = "lenient_timestamp")]
    occurred_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

/// User input for a create or a full-record update.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub kind: TransactionType,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl TransactionDraft {
    pub fn new(amount: Decimal, description: &str, category: &str, kind: TransactionType) -> Self {
        TransactionDraft {
            amount,
            description: description.to_string(),
            category: category.to_string(),
            kind,
            occurred_at: None,
        }
    }

    pub fn occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(at);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(ValidationError::NegativeAmount(self.amount));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let category = self.category.trim();
        if !self.kind.accepts(category) {
            return Err(ValidationError::CategoryMismatch {
                category: category.to_string(),
                kind: self.kind,
            });
        }
        Ok(())
    }

    /// Document body for a new record; `occurredAt` falls back to `now`.
    pub fn to_create_document(&self, now: DateTime<Utc>) -> Value {
        self.document(self.occurred_at.unwrap_or(now), Some(now), None)
    }

    /// Document body replacing `existing` in full, keeping its dates.
    pub fn to_update_document(&self, existing: Option<&Transaction>, now: DateTime<Utc>) -> Value {
        let occurred_at = self
            .occurred_at
            .or_else(|| existing.and_then(|t| t.occurred_at))
            .unwrap_or(now);
        let created_at = existing.and_then(|t| t.created_at);
        self.document(occurred_at, created_at, Some(now))
    }

    fn document(
        &self,
        occurred_at: DateTime<Utc>,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Value {
        json!({
            "amount": self.amount,
            "description": self.description.trim(),
            "category": self.category.trim(),
            "type": self.kind,
            "occurredAt": occurred_at,
            "createdAt": created_at,
            "updatedAt": updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(alias = "amount")]
    pub monthly_ceiling: Decimal,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn validate_ceiling(ceiling: Decimal) -> Result<Decimal, ValidationError> {
    if ceiling.is_sign_negative() && !ceiling.is_zero() {
        return Err(ValidationError::NegativeCeiling(ceiling));
    }
    Ok(ceiling)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSetting {
    #[serde(default)]
    pub enabled: bool,
    #[serde(alias = "time", default = "default_reminder_time")]
    pub reminder_time: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_reminder_time() -> String {
    DEFAULT_REMINDER_TIME.to_string()
}

impl Default for NotificationSetting {
    fn default() -> Self {
        NotificationSetting {
            enabled: false,
            reminder_time: default_reminder_time(),
            updated_at: None,
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`, or a
/// `{seconds, nanoseconds}` object. Anything else becomes `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                return Some(Utc.from_utc_datetime(&naive));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
        Value::Object(map) => {
            let secs = map.get("seconds").and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(secs, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_timestamp))
}
