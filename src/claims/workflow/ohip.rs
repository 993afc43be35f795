// SPDX-License-Identifier: MIT

//! OHIP application graph
//!
//! ```text
//! find_user --found--------------------> rag_info -> create_policy -> END
//!           \--not_found--> register_user --/
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use super::graph::{CompiledGraph, Execution, Node, StateGraph};
use super::state::{Applicant, ApplicationState, ApplicationUpdate, LookupOutcome};
use crate::adk::error::{Result, WorkflowError};
use crate::adk::model::{Content, GenerationConfig, Model};
use crate::claims::prompts::{OHIP_GUIDANCE_REQUEST, OHIP_GUIDANCE_SYSTEM};
use crate::claims::store::{ClaimsStore, NewPolicy, NewUser, DEFAULT_PROVIDER_ID};

pub const FIND_USER: &str = "find_user";
pub const REGISTER_USER: &str = "register_user";
pub const RAG_INFO: &str = "rag_info";
pub const CREATE_POLICY: &str = "create_policy";

/// Looks the applicant up by health card
pub struct FindUser {
    store: Arc<dyn ClaimsStore>,
}

#[async_trait]
impl Node<ApplicationState> for FindUser {
    async fn run(&self, state: &ApplicationState) -> Result<ApplicationUpdate> {
        let health_card = state
            .health_card
            .as_deref()
            .ok_or(WorkflowError::MissingField("health_card"))?;
        log::info!("Starting user lookup for health card {}", health_card);

        let outcome = match self.store.find_user_by_health_card(health_card).await? {
            Some(user) => LookupOutcome::Found(user),
            None => LookupOutcome::NotFound,
        };
        log::info!("User lookup completed");
        log::debug!("User lookup result: {:?}", outcome);

        Ok(ApplicationUpdate {
            find_user: Some(outcome),
            ..Default::default()
        })
    }
}

/// Inserts the applicant as a new user
pub struct RegisterUser {
    store: Arc<dyn ClaimsStore>,
}

#[async_trait]
impl Node<ApplicationState> for RegisterUser {
    async fn run(&self, state: &ApplicationState) -> Result<ApplicationUpdate> {
        let user = NewUser {
            health_card: state
                .health_card
                .clone()
                .ok_or(WorkflowError::MissingField("health_card"))?,
            name: state.name.clone(),
            dob: state.dob.clone(),
            email: state.email.clone(),
            phone: state.phone.clone(),
            provider_id: state.provider_id.clone(),
        };
        log::info!(
            "Registering user: {}",
            user.name.as_deref().unwrap_or("<unnamed>")
        );

        let registration = self.store.register_user(&user).await?;
        log::info!("User registration completed");
        log::debug!("Registration result: {}", registration);

        Ok(ApplicationUpdate {
            register_user: Some(registration),
            ..Default::default()
        })
    }
}

/// Writes the OHIP information text, optionally with LLM guidance
pub struct RagInfo {
    guidance: Option<Arc<dyn Model>>,
    config: GenerationConfig,
}

impl RagInfo {
    pub fn template(name: Option<&str>) -> String {
        format!("OHIP information for {}", name.unwrap_or("applicant"))
    }

    async fn ask_guidance(&self, model: &dyn Model) -> Result<String> {
        let history = [
            Content::system(OHIP_GUIDANCE_SYSTEM),
            Content::user(OHIP_GUIDANCE_REQUEST),
        ];
        let reply = model
            .generate_content(&history, Some(&self.config), None)
            .await?;
        Ok(reply.text().trim().to_string())
    }
}

#[async_trait]
impl Node<ApplicationState> for RagInfo {
    async fn run(&self, state: &ApplicationState) -> Result<ApplicationUpdate> {
        log::info!("Generating OHIP information");
        let rag_info = Self::template(state.name.as_deref());

        let guidance = match &self.guidance {
            Some(model) => Some(self.ask_guidance(model.as_ref()).await?),
            None => None,
        };
        log::debug!("OHIP information: {}", rag_info);

        Ok(ApplicationUpdate {
            rag_info: Some(rag_info),
            guidance,
            ..Default::default()
        })
    }
}

/// Opens the applicant's policy
pub struct CreatePolicy {
    store: Arc<dyn ClaimsStore>,
}

#[async_trait]
impl Node<ApplicationState> for CreatePolicy {
    async fn run(&self, state: &ApplicationState) -> Result<ApplicationUpdate> {
        let user_id = state
            .resolved_user_id()
            .ok_or(WorkflowError::MissingField("user_id"))?;
        if matches!(state.find_user, Some(LookupOutcome::Found(_))) {
            log::info!("User {} already known; issuing an additional policy", user_id);
        }

        let policy = NewPolicy {
            user_id,
            provider_id: state
                .provider_id
                .clone()
                .unwrap_or_else(|| DEFAULT_PROVIDER_ID.to_string()),
            plan_type: state.plan_type.clone(),
        };
        log::info!(
            "Creating insurance policy, plan {}",
            policy.plan_type.as_deref().unwrap_or("<none>")
        );

        let receipt = self.store.create_policy(policy).await?;
        log::info!("Policy creation completed");
        log::debug!("Policy creation result: {}", receipt);

        Ok(ApplicationUpdate {
            create_policy: Some(receipt),
            ..Default::default()
        })
    }
}

/// Branch key after `find_user`: `rag_info` for a known user,
/// `register_user` otherwise
pub fn route_after_lookup(state: &ApplicationState) -> &'static str {
    let decision = match &state.find_user {
        Some(LookupOutcome::Found(_)) => RAG_INFO,
        Some(LookupOutcome::NotFound) | None => REGISTER_USER,
    };
    log::info!("Decision: {}", decision);
    decision
}

/// Text heuristic for callers that only hold a rendered lookup result:
/// registration is needed when the text mentions neither `user_id` nor
/// `name` (case-insensitive). A real row that happens to contain neither
/// word is misclassified as "not found".
pub fn legacy_needs_registration(lookup_text: &str) -> bool {
    let lower = lookup_text.to_lowercase();
    !lower.contains("user_id") && !lower.contains("name")
}

pub fn build_ohip_graph(
    store: Arc<dyn ClaimsStore>,
    guidance: Option<Arc<dyn Model>>,
    config: GenerationConfig,
) -> std::result::Result<CompiledGraph<ApplicationState>, WorkflowError> {
    let mut graph: StateGraph<ApplicationState> = StateGraph::new();
    graph
        .add_node(
            FIND_USER,
            Arc::new(FindUser {
                store: store.clone(),
            }),
        )
        .add_node(
            REGISTER_USER,
            Arc::new(RegisterUser {
                store: store.clone(),
            }),
        )
        .add_node(RAG_INFO, Arc::new(RagInfo { guidance, config }))
        .add_node(CREATE_POLICY, Arc::new(CreatePolicy { store }))
        .set_entry_point(FIND_USER)
        .add_conditional_edges(
            FIND_USER,
            route_after_lookup,
            [(REGISTER_USER, REGISTER_USER), (RAG_INFO, RAG_INFO)],
        )
        .add_edge(REGISTER_USER, RAG_INFO)
        .add_edge(RAG_INFO, CREATE_POLICY)
        .set_finish_point(CREATE_POLICY);

    let compiled = graph.compile()?;
    log::info!(
        "OHIP workflow graph compiled, entry point {}",
        compiled.entry_point()
    );
    Ok(compiled)
}

/// Compiled OHIP graph, shared across requests
pub struct OhipWorkflow {
    graph: CompiledGraph<ApplicationState>,
}

impl OhipWorkflow {
    pub fn new(
        store: Arc<dyn ClaimsStore>,
        guidance: Option<Arc<dyn Model>>,
        config: GenerationConfig,
    ) -> std::result::Result<Self, WorkflowError> {
        Ok(Self {
            graph: build_ohip_graph(store, guidance, config)?,
        })
    }

    pub async fn run(&self, applicant: Applicant) -> Result<ApplicationState> {
        self.graph.invoke(applicant.into()).await
    }

    pub async fn run_with_trace(&self, applicant: Applicant) -> Result<Execution<ApplicationState>> {
        self.graph.invoke_with_trace(applicant.into()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::store::UserRecord;

    #[test]
    fn test_legacy_heuristic() {
        assert!(legacy_needs_registration("no matching rows"));
        assert!(legacy_needs_registration("[]"));
        assert!(!legacy_needs_registration(
            "[{'user_id': 'u1', 'name': 'John Doe'}]"
        ));
        assert!(!legacy_needs_registration("NAME: John"));
        assert!(!legacy_needs_registration("USER_ID=7"));
        // row text without either word looks like a miss
        assert!(legacy_needs_registration("[('u1', 'John Doe', 'HC1')]"));
    }

    #[test]
    fn test_route_after_lookup() {
        let mut state = ApplicationState {
            find_user: Some(LookupOutcome::NotFound),
            ..Default::default()
        };
        assert_eq!(route_after_lookup(&state), REGISTER_USER);

        state.find_user = Some(LookupOutcome::Found(UserRecord {
            user_id: "u1".to_string(),
            name: None,
            dob: None,
            health_card: None,
            email: None,
            phone: None,
            provider_id: None,
        }));
        assert_eq!(route_after_lookup(&state), RAG_INFO);
    }

    #[test]
    fn test_rag_template() {
        assert_eq!(
            RagInfo::template(Some("John Doe")),
            "OHIP information for John Doe"
        );
        assert_eq!(RagInfo::template(None), "OHIP information for applicant");
    }
}
