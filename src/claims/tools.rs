// SPDX-License-Identifier: MIT

//! Claims database operations exposed to the agent as tools

use crate::adk::error::{AssistantError, Result};
use crate::adk::tool::Tool;
use crate::claims::store::{ClaimsQuery, ClaimsStore, NewPolicy, NewUser, DEFAULT_PROVIDER_ID};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::sync::Arc;

// --- Static schemas ---

static REGISTER_USER_SCHEMA: Lazy<Value> = Lazy::new(schema_of::<RegisterUserArgs>);
static CREATE_POLICY_SCHEMA: Lazy<Value> = Lazy::new(schema_of::<CreatePolicyArgs>);

fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| json!({"type": "object"}))
}

fn parse_args<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T> {
    serde_json::from_value(input).map_err(|e| AssistantError::invalid_arguments(tool, e.to_string()))
}

/// One fixed read query. Returns `{"status": "ok"|"empty", "rows": [...]}`.
pub struct QueryTool {
    query: ClaimsQuery,
    store: Arc<dyn ClaimsStore>,
    schema: Value,
}

impl QueryTool {
    pub fn new(query: ClaimsQuery, store: Arc<dyn ClaimsStore>) -> Self {
        let schema = match query.spec().param {
            Some(param) => json!({
                "type": "object",
                "properties": {
                    (param.name()): {
                        "type": "string",
                        "description": param.description()
                    }
                },
                "required": [param.name()]
            }),
            None => json!({"type": "object", "properties": {}}),
        };
        Self {
            query,
            store,
            schema,
        }
    }

    fn argument(&self, input: &Value) -> Result<Option<String>> {
        let Some(param) = self.query.spec().param else {
            return Ok(None);
        };
        match input.get(param.name()) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            _ => Err(AssistantError::invalid_arguments(
                self.name(),
                format!("missing required argument '{}'", param.name()),
            )),
        }
    }
}

#[async_trait]
impl Tool for QueryTool {
    fn name(&self) -> &str {
        self.query.spec().tool_name
    }

    fn description(&self) -> &str {
        self.query.spec().description
    }

    fn schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let arg = self.argument(&input)?;
        let rows = self.store.fetch_rows(self.query, arg.as_deref()).await?;
        log::debug!("{} returned {} row(s)", self.name(), rows.len());

        let status = if rows.is_empty() { "empty" } else { "ok" };
        Ok(json!({"status": status, "rows": rows}))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RegisterUserArgs {
    /// Full name
    pub name: String,
    /// Date of birth, YYYY-MM-DD
    pub dob: String,
    /// Health card number
    pub health_card: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Defaults to prov-001
    #[serde(default)]
    pub provider_id: Option<String>,
}

/// Inserts a user under a fresh id
pub struct RegisterUserTool {
    store: Arc<dyn ClaimsStore>,
}

impl RegisterUserTool {
    pub fn new(store: Arc<dyn ClaimsStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RegisterUserTool {
    fn name(&self) -> &str {
        "register_new_user"
    }

    fn description(&self) -> &str {
        "Register a new user with name, date of birth, health card and email. Returns the new user_id."
    }

    fn schema(&self) -> &Value {
        &REGISTER_USER_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: RegisterUserArgs = parse_args(self.name(), input)?;
        let user = NewUser {
            health_card: args.health_card,
            name: Some(args.name),
            dob: Some(args.dob),
            email: Some(args.email),
            phone: args.phone,
            provider_id: args.provider_id,
        };
        let registration = self.store.register_user(&user).await?;
        log::info!("{}", registration);
        Ok(serde_json::to_value(registration)?)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePolicyArgs {
    pub user_id: String,
    /// Defaults to prov-001
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub plan_type: Option<String>,
}

/// Opens a one-year, premium-free OHIP policy
pub struct CreatePolicyTool {
    store: Arc<dyn ClaimsStore>,
}

impl CreatePolicyTool {
    pub fn new(store: Arc<dyn ClaimsStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CreatePolicyTool {
    fn name(&self) -> &str {
        "create_policy"
    }

    fn description(&self) -> &str {
        "Create a new OHIP policy for a given user. Coverage runs one year from today with no premium."
    }

    fn schema(&self) -> &Value {
        &CREATE_POLICY_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: CreatePolicyArgs = parse_args(self.name(), input)?;
        let receipt = self
            .store
            .create_policy(NewPolicy {
                user_id: args.user_id,
                provider_id: args
                    .provider_id
                    .unwrap_or_else(|| DEFAULT_PROVIDER_ID.to_string()),
                plan_type: args.plan_type,
            })
            .await?;
        log::info!("{}", receipt);
        Ok(serde_json::to_value(receipt)?)
    }
}

/// Every read query plus the two write tools
pub fn create_tools(store: Arc<dyn ClaimsStore>) -> Vec<Arc<dyn Tool>> {
    let mut tools: Vec<Arc<dyn Tool>> = ClaimsQuery::ALL
        .iter()
        .map(|&query| Arc::new(QueryTool::new(query, store.clone())) as Arc<dyn Tool>)
        .collect();
    tools.push(Arc::new(RegisterUserTool::new(store.clone())));
    tools.push(Arc::new(CreatePolicyTool::new(store)));
    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::store::{PolicyReceipt, Registration, StoreError};
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeStore {
        rows: Vec<Value>,
        fail: bool,
        calls: Mutex<Vec<(ClaimsQuery, Option<String>)>>,
        policies: Mutex<Vec<NewPolicy>>,
    }

    #[async_trait]
    impl ClaimsStore for FakeStore {
        async fn fetch_rows(
            &self,
            query: ClaimsQuery,
            arg: Option<&str>,
        ) -> std::result::Result<Vec<Value>, StoreError> {
            self.calls
                .lock()
                .unwrap()
                .push((query, arg.map(str::to_string)));
            if self.fail {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(self.rows.clone())
        }

        async fn register_user(
            &self,
            _user: &NewUser,
        ) -> std::result::Result<Registration, StoreError> {
            Ok(Registration {
                user_id: Uuid::nil(),
            })
        }

        async fn create_policy(
            &self,
            policy: NewPolicy,
        ) -> std::result::Result<PolicyReceipt, StoreError> {
            self.policies.lock().unwrap().push(policy.clone());
            Ok(policy.issue(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
        }
    }

    #[test]
    fn test_create_tools_names_are_unique() {
        let tools = create_tools(Arc::new(FakeStore::default()));
        let names: HashSet<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), tools.len());
        assert_eq!(tools.len(), ClaimsQuery::ALL.len() + 2);
        assert!(names.contains("find_user_by_health_card_or_id"));
        assert!(names.contains("register_new_user"));
        assert!(names.contains("create_policy"));
    }

    #[test]
    fn test_query_schema_requires_param() {
        let tool = QueryTool::new(ClaimsQuery::ClaimDetails, Arc::new(FakeStore::default()));
        assert_eq!(tool.schema()["required"], json!(["claim_id"]));

        let tool = QueryTool::new(ClaimsQuery::ActivePolicies, Arc::new(FakeStore::default()));
        assert!(tool.schema().get("required").is_none());
    }

    #[tokio::test]
    async fn test_query_tool_status() {
        let store = Arc::new(FakeStore {
            rows: vec![json!({"claim_id": "c1", "status": "approved"})],
            ..Default::default()
        });
        let tool = QueryTool::new(ClaimsQuery::ClaimDetails, store.clone());

        let result = tool.execute(json!({"claim_id": " c1 "})).await.unwrap();
        assert_eq!(result["status"], "ok");
        assert_eq!(result["rows"][0]["status"], "approved");
        assert_eq!(
            store.calls.lock().unwrap()[0],
            (ClaimsQuery::ClaimDetails, Some("c1".to_string()))
        );

        let empty = QueryTool::new(ClaimsQuery::ActivePolicies, Arc::new(FakeStore::default()));
        let result = empty.execute(json!({})).await.unwrap();
        assert_eq!(result, json!({"status": "empty", "rows": []}));
    }

    #[tokio::test]
    async fn test_query_tool_missing_argument() {
        let tool = QueryTool::new(ClaimsQuery::PoliciesByUser, Arc::new(FakeStore::default()));
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, AssistantError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_query_tool_propagates_store_error() {
        let tool = QueryTool::new(
            ClaimsQuery::ActivePolicies,
            Arc::new(FakeStore {
                fail: true,
                ..Default::default()
            }),
        );
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, AssistantError::Store(_)));
    }

    #[tokio::test]
    async fn test_create_policy_defaults_provider() {
        let store = Arc::new(FakeStore::default());
        let tool = CreatePolicyTool::new(store.clone());

        let receipt = tool
            .execute(json!({"user_id": "u1", "plan_type": "basic"}))
            .await
            .unwrap();
        assert_eq!(receipt["user_id"], "u1");
        assert_eq!(receipt["monthly_premium"], 0.0);
        assert_eq!(store.policies.lock().unwrap()[0].provider_id, "prov-001");
    }

    #[tokio::test]
    async fn test_register_user_requires_fields() {
        let tool = RegisterUserTool::new(Arc::new(FakeStore::default()));
        let err = tool.execute(json!({"name": "John"})).await.unwrap_err();
        assert!(matches!(err, AssistantError::InvalidArguments { .. }));

        let ok = tool
            .execute(json!({
                "name": "John Doe",
                "dob": "2001-01-01",
                "health_card": "HC1",
                "email": "john@studentmail.com"
            }))
            .await
            .unwrap();
        assert_eq!(ok["user_id"], Uuid::nil().to_string());
        assert!(REGISTER_USER_SCHEMA["properties"].get("health_card").is_some());
    }
}
