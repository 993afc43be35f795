// SPDX-License-Identifier: MIT

//! PostgreSQL implementation of [`ClaimsStore`]

use super::{
    ClaimsQuery, ClaimsStore, NewPolicy, NewUser, PolicyReceipt, Registration, StoreError,
};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Claims store backed by a connection pool
#[derive(Clone, Debug)]
pub struct PgClaimsStore {
    pool: PgPool,
}

impl PgClaimsStore {
    /// Connect to `database_url`, failing fast if the database is unreachable
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        log::info!("Connected to claims database");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Wrap a row-returning statement so each row comes back as one JSON object
fn as_json_rows(sql: &str) -> String {
    format!("SELECT to_jsonb(q) FROM ({}) AS q", sql)
}

#[async_trait]
impl ClaimsStore for PgClaimsStore {
    async fn fetch_rows(
        &self,
        query: ClaimsQuery,
        arg: Option<&str>,
    ) -> Result<Vec<Value>, StoreError> {
        let spec = query.spec();
        if spec.param.is_some() != arg.is_some() {
            return Err(StoreError::Arity {
                query: spec.tool_name,
                expected: query.arity(),
            });
        }

        let sql = as_json_rows(spec.sql);
        let mut statement = sqlx::query_scalar::<_, Value>(&sql);
        if let Some(arg) = arg {
            statement = statement.bind(arg.to_string());
        }

        let rows = statement.fetch_all(&self.pool).await?;
        log::debug!("{} returned {} row(s)", spec.tool_name, rows.len());
        Ok(rows)
    }

    async fn register_user(&self, user: &NewUser) -> Result<Registration, StoreError> {
        let user_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO users (user_id, name, dob, health_card, email, phone, provider_id)
            VALUES ($1, $2, $3::date, $4, $5, $6, $7)
            "#,
        )
        .bind(user_id)
        .bind(&user.name)
        .bind(&user.dob)
        .bind(&user.health_card)
        .bind(&user.email)
        .bind(user.phone_or_default())
        .bind(user.provider_or_default())
        .execute(&self.pool)
        .await?;

        log::info!("Registered user {} for health card {}", user_id, user.health_card);
        Ok(Registration { user_id })
    }

    async fn create_policy(&self, policy: NewPolicy) -> Result<PolicyReceipt, StoreError> {
        let receipt = policy.issue(chrono::Local::now().date_naive());

        sqlx::query(
            r#"
            INSERT INTO policies (policy_id, user_id, provider_id, policy_number,
                                  plan_type, coverage_start, coverage_end, active, monthly_premium)
            VALUES ($1, $2::uuid, $3, $4, $5, $6, $7, TRUE, $8)
            "#,
        )
        .bind(receipt.policy_id)
        .bind(&receipt.user_id)
        .bind(&receipt.provider_id)
        .bind(&receipt.policy_number)
        .bind(&receipt.plan_type)
        .bind(receipt.coverage_start)
        .bind(receipt.coverage_end)
        .bind(receipt.monthly_premium)
        .execute(&self.pool)
        .await?;

        log::info!(
            "Created policy {} for user {}",
            receipt.policy_number,
            receipt.user_id
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_json_rows_wraps_statement() {
        assert_eq!(
            as_json_rows("SELECT 1 AS one"),
            "SELECT to_jsonb(q) FROM (SELECT 1 AS one) AS q"
        );
    }

    #[tokio::test]
    async fn test_arity_checked_before_touching_database() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@localhost:1/none")
            .unwrap();
        let store = PgClaimsStore::from_pool(pool);

        let err = store
            .fetch_rows(ClaimsQuery::PoliciesByUser, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Arity { expected: 1, .. }));

        let err = store
            .fetch_rows(ClaimsQuery::ActivePolicies, Some("extra"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Arity { expected: 0, .. }));
    }
}
