// SPDX-License-Identifier: MIT

//! State threaded through the OHIP application graph

use serde::{Deserialize, Serialize};

use super::graph::GraphState;
use crate::claims::store::{PolicyReceipt, Registration, UserRecord};

/// Identity payload the workflow starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub health_card: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub plan_type: Option<String>,
}

impl Default for Applicant {
    /// The student profile used when a chat query asks to apply for OHIP
    fn default() -> Self {
        Self {
            health_card: "HC1234567890".to_string(),
            name: Some("John Doe".to_string()),
            dob: Some("2001-01-01".to_string()),
            email: Some("john@studentmail.com".to_string()),
            phone: Some("555-4321".to_string()),
            provider_id: Some("prov-001".to_string()),
            plan_type: Some("basic".to_string()),
        }
    }
}

impl Applicant {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// Result of looking a user up by health card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found(UserRecord),
    NotFound,
}

/// Accumulated workflow state. Every field is optional; nodes fill the
/// result slots as they run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub find_user: Option<LookupOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_user: Option<Registration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rag_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_policy: Option<PolicyReceipt>,
}

/// Partial update returned by a node. `None` fields leave state untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationUpdate {
    pub health_card: Option<String>,
    pub name: Option<String>,
    pub dob: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub provider_id: Option<String>,
    pub plan_type: Option<String>,
    pub find_user: Option<LookupOutcome>,
    pub register_user: Option<Registration>,
    pub rag_info: Option<String>,
    pub guidance: Option<String>,
    pub create_policy: Option<PolicyReceipt>,
}

macro_rules! overwrite_present {
    ($state:expr, $update:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $update.$field {
                $state.$field = Some(value);
            }
        )+
    };
}

impl GraphState for ApplicationState {
    type Update = ApplicationUpdate;

    fn merge(&mut self, update: ApplicationUpdate) {
        overwrite_present!(self, update;
            health_card, name, dob, email, phone, provider_id, plan_type,
            find_user, register_user, rag_info, guidance, create_policy,
        );
    }
}

impl ApplicationState {
    /// Id of the user the policy should be written for: the fresh
    /// registration if one happened, otherwise the user found by lookup.
    pub fn resolved_user_id(&self) -> Option<String> {
        if let Some(registration) = &self.register_user {
            return Some(registration.user_id.to_string());
        }
        match &self.find_user {
            Some(LookupOutcome::Found(user)) => Some(user.user_id.clone()),
            _ => None,
        }
    }
}

impl From<Applicant> for ApplicationState {
    fn from(applicant: Applicant) -> Self {
        Self {
            health_card: Some(applicant.health_card),
            name: applicant.name,
            dob: applicant.dob,
            email: applicant.email,
            phone: applicant.phone,
            provider_id: applicant.provider_id,
            plan_type: applicant.plan_type,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn found(user_id: &str) -> LookupOutcome {
        LookupOutcome::Found(UserRecord {
            user_id: user_id.to_string(),
            name: Some("John Doe".to_string()),
            dob: None,
            health_card: Some("HC1234567890".to_string()),
            email: None,
            phone: None,
            provider_id: None,
        })
    }

    #[test]
    fn test_merge_overwrites_only_present_fields() {
        let mut state = ApplicationState::from(Applicant::default());
        state.merge(ApplicationUpdate {
            rag_info: Some("OHIP information for John Doe".to_string()),
            ..Default::default()
        });
        state.merge(ApplicationUpdate {
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        });

        assert_eq!(state.name.as_deref(), Some("Jane Doe"));
        assert_eq!(
            state.rag_info.as_deref(),
            Some("OHIP information for John Doe")
        );
        assert_eq!(state.health_card.as_deref(), Some("HC1234567890"));
        assert_eq!(state.plan_type.as_deref(), Some("basic"));
    }

    #[test]
    fn test_empty_update_is_identity() {
        let mut state = ApplicationState::from(Applicant::default());
        let before = state.clone();
        state.merge(ApplicationUpdate::default());
        assert_eq!(state, before);
    }

    #[test]
    fn test_resolved_user_id_prefers_registration() {
        let registered = Uuid::new_v4();
        let mut state = ApplicationState {
            find_user: Some(LookupOutcome::NotFound),
            ..Default::default()
        };
        assert_eq!(state.resolved_user_id(), None);

        state.register_user = Some(Registration {
            user_id: registered,
        });
        assert_eq!(state.resolved_user_id(), Some(registered.to_string()));

        let known = ApplicationState {
            find_user: Some(found("u-42")),
            ..Default::default()
        };
        assert_eq!(known.resolved_user_id().as_deref(), Some("u-42"));
    }

    #[test]
    fn test_serialization_skips_unset_fields() {
        let state = ApplicationState {
            health_card: Some("HC1".to_string()),
            find_user: Some(LookupOutcome::NotFound),
            ..Default::default()
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            json!({"health_card": "HC1", "find_user": {"status": "not_found"}})
        );
    }

    #[test]
    fn test_applicant_from_yaml_requires_health_card() {
        let applicant = Applicant::from_yaml(
            "health_card: HC999\nname: Priya Patel\nplan_type: student\n",
        )
        .unwrap();
        assert_eq!(applicant.health_card, "HC999");
        assert_eq!(applicant.name.as_deref(), Some("Priya Patel"));
        assert!(applicant.dob.is_none());

        assert!(Applicant::from_yaml("name: Nobody\n").is_err());
    }
}
