// SPDX-License-Identifier: MIT

//! Claims store - the typed seam between the assistant and the claims database
//!
//! Every tool and workflow node talks to the database through [`ClaimsStore`].
//! Reads are described by the [`ClaimsQuery`] table: one fixed, parameterized
//! SELECT per operation. Writes are the two inserts the OHIP workflow needs.
//! The schema itself is owned by the database; nothing here creates or
//! migrates tables.

mod postgres;
mod queries;

pub use postgres::PgClaimsStore;
pub use queries::{ClaimsQuery, QueryParam, QuerySpec};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Provider assigned to new users and policies when none is given
pub const DEFAULT_PROVIDER_ID: &str = "prov-001";

/// OHIP is publicly funded; policies carry no premium
pub const OHIP_MONTHLY_PREMIUM: f64 = 0.0;

const COVERAGE_DAYS: i64 = 365;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("query '{query}' expects {expected} argument(s)")]
    Arity { query: &'static str, expected: usize },

    #[error("could not decode row from '{query}': {message}")]
    Decode { query: &'static str, message: String },
}

/// A row of the `users` table. Columns are read as text whatever their
/// SQL type, so integer or uuid keys decode alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(deserialize_with = "required_text")]
    pub user_id: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub health_card: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub provider_id: Option<String>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn required_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    scalar_text(Value::deserialize(deserializer)?)
        .ok_or_else(|| de::Error::custom("user_id column is null"))
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Fields for registering a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub health_card: String,
    pub name: Option<String>,
    pub dob: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub provider_id: Option<String>,
}

impl NewUser {
    pub fn phone_or_default(&self) -> &str {
        self.phone.as_deref().unwrap_or("")
    }

    pub fn provider_or_default(&self) -> &str {
        self.provider_id.as_deref().unwrap_or(DEFAULT_PROVIDER_ID)
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub user_id: Uuid,
}

impl std::fmt::Display for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Registered new user: {}", self.user_id)
    }
}

/// Fields for opening a policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPolicy {
    pub user_id: String,
    pub provider_id: String,
    pub plan_type: Option<String>,
}

impl NewPolicy {
    /// Assign identifiers and a one-year coverage window starting `today`.
    pub fn issue(self, today: NaiveDate) -> PolicyReceipt {
        let policy_id = Uuid::new_v4();
        PolicyReceipt {
            policy_id,
            policy_number: policy_number(&Uuid::new_v4()),
            user_id: self.user_id,
            provider_id: self.provider_id,
            plan_type: self.plan_type,
            coverage_start: today,
            coverage_end: today + Duration::days(COVERAGE_DAYS),
            monthly_premium: OHIP_MONTHLY_PREMIUM,
        }
    }
}

/// `POL-` followed by the first eight hex digits of `seed`, upper-cased
pub fn policy_number(seed: &Uuid) -> String {
    let hex = seed.simple().to_string();
    format!("POL-{}", hex[..8].to_uppercase())
}

/// A policy that has been written to the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyReceipt {
    pub policy_id: Uuid,
    pub policy_number: String,
    pub user_id: String,
    pub provider_id: String,
    pub plan_type: Option<String>,
    pub coverage_start: NaiveDate,
    pub coverage_end: NaiveDate,
    pub monthly_premium: f64,
}

impl std::fmt::Display for PolicyReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Policy {} created for user {}",
            self.policy_number, self.user_id
        )
    }
}

/// Database operations used by tools and workflow nodes.
///
/// Implementations report failures as `Err`; an empty result set is `Ok(vec![])`.
#[async_trait]
pub trait ClaimsStore: Send + Sync {
    /// Run one of the fixed read queries; each row is returned as a JSON object
    async fn fetch_rows(
        &self,
        query: ClaimsQuery,
        arg: Option<&str>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert a user under a freshly generated id. Not idempotent.
    async fn register_user(&self, user: &NewUser) -> Result<Registration, StoreError>;

    /// Insert an active policy. Not idempotent.
    async fn create_policy(&self, policy: NewPolicy) -> Result<PolicyReceipt, StoreError>;

    /// Typed lookup of the user holding `health_card`
    async fn find_user_by_health_card(
        &self,
        health_card: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let query = ClaimsQuery::FindUserByHealthCard;
        let rows = self.fetch_rows(query, Some(health_card)).await?;
        match rows.into_iter().next() {
            None => Ok(None),
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| StoreError::Decode {
                    query: query.spec().tool_name,
                    message: e.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct RowsStore {
        rows: Vec<Value>,
        seen: Mutex<Option<(ClaimsQuery, Option<String>)>>,
    }

    #[async_trait]
    impl ClaimsStore for RowsStore {
        async fn fetch_rows(
            &self,
            query: ClaimsQuery,
            arg: Option<&str>,
        ) -> Result<Vec<Value>, StoreError> {
            *self.seen.lock().unwrap() = Some((query, arg.map(str::to_string)));
            Ok(self.rows.clone())
        }

        async fn register_user(&self, _user: &NewUser) -> Result<Registration, StoreError> {
            unreachable!()
        }

        async fn create_policy(&self, _policy: NewPolicy) -> Result<PolicyReceipt, StoreError> {
            unreachable!()
        }
    }

    #[test]
    fn test_policy_number_format() {
        let seed = Uuid::parse_str("3f2b9c1a-0000-4000-8000-000000000000").unwrap();
        assert_eq!(policy_number(&seed), "POL-3F2B9C1A");
    }

    #[test]
    fn test_issue_covers_one_year() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let receipt = NewPolicy {
            user_id: "u-1".to_string(),
            provider_id: DEFAULT_PROVIDER_ID.to_string(),
            plan_type: Some("basic".to_string()),
        }
        .issue(today);

        assert_eq!(receipt.coverage_start, today);
        assert_eq!(
            receipt.coverage_end,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert_eq!(receipt.monthly_premium, 0.0);
        assert!(receipt.policy_number.starts_with("POL-"));
        assert_eq!(receipt.policy_number.len(), 12);
        assert_eq!(
            receipt.to_string(),
            format!("Policy {} created for user u-1", receipt.policy_number)
        );
    }

    #[test]
    fn test_new_user_defaults() {
        let user = NewUser {
            health_card: "HC1".to_string(),
            ..Default::default()
        };
        assert_eq!(user.phone_or_default(), "");
        assert_eq!(user.provider_or_default(), "prov-001");
    }

    #[tokio::test]
    async fn test_find_user_decodes_first_row() {
        let store = RowsStore {
            rows: vec![json!({
                "user_id": "7d1e",
                "name": "John Doe",
                "dob": "2001-01-01",
                "health_card": "HC1234567890",
                "email": "john@studentmail.com",
                "phone": "555-4321",
                "provider_id": "prov-001"
            })],
            seen: Mutex::new(None),
        };

        let user = store
            .find_user_by_health_card("HC1234567890")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.user_id, "7d1e");
        assert_eq!(user.name.as_deref(), Some("John Doe"));

        let seen = store.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.0, ClaimsQuery::FindUserByHealthCard);
        assert_eq!(seen.1.as_deref(), Some("HC1234567890"));
    }

    #[tokio::test]
    async fn test_find_user_empty_is_none() {
        let store = RowsStore {
            rows: vec![],
            seen: Mutex::new(None),
        };
        assert!(store.find_user_by_health_card("HC0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_user_undecodable_row() {
        let store = RowsStore {
            rows: vec![json!({"name": "no id"})],
            seen: Mutex::new(None),
        };
        let err = store.find_user_by_health_card("HC0").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
        assert!(err.to_string().contains("user_id"));

        let store = RowsStore {
            rows: vec![json!({"user_id": null})],
            seen: Mutex::new(None),
        };
        let err = store.find_user_by_health_card("HC0").await.unwrap_err();
        assert!(err.to_string().contains("user_id column is null"));
    }

    #[tokio::test]
    async fn test_find_user_accepts_non_text_columns() {
        let store = RowsStore {
            rows: vec![json!({
                "user_id": 42,
                "name": "John Doe",
                "phone": 5554321,
                "email": null,
                "created_at": "2024-01-01T00:00:00"
            })],
            seen: Mutex::new(None),
        };

        let user = store
            .find_user_by_health_card("HC1234567890")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.user_id, "42");
        assert_eq!(user.phone.as_deref(), Some("5554321"));
        assert!(user.email.is_none());
        assert!(user.dob.is_none());
    }
}
