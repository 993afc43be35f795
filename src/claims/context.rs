// SPDX-License-Identifier: MIT

//! Application context shared by every request

use std::sync::Arc;
use thiserror::Error;

use crate::adk::agent::{Agent, ReActAgent};
use crate::adk::error::{AssistantError, Result};
use crate::adk::model::mistral::MistralModel;
use crate::adk::model::{GenerationConfig, Model};
use crate::claims::config::Config;
use crate::claims::intake::{self, Route};
use crate::claims::prompts::{AGENT_NAME, INSURANCE_BOT_INSTRUCTION};
use crate::claims::registry::ToolRegistry;
use crate::claims::store::{ClaimsStore, PgClaimsStore};
use crate::claims::tools::create_tools;
use crate::claims::workflow::{Applicant, OhipWorkflow};

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("Agent not initialized")]
    Unavailable,

    #[error(transparent)]
    Failed(#[from] AssistantError),
}

/// Built once at start-up; read-only afterwards
pub struct AppContext {
    agent: Option<Arc<dyn Agent>>,
    workflow: Option<Arc<OhipWorkflow>>,
    applicant: Applicant,
}

impl AppContext {
    pub fn new(agent: Arc<dyn Agent>, workflow: Arc<OhipWorkflow>, applicant: Applicant) -> Self {
        Self {
            agent: Some(agent),
            workflow: Some(workflow),
            applicant,
        }
    }

    /// A context whose every query answers [`AnswerError::Unavailable`]
    pub fn unavailable() -> Self {
        Self {
            agent: None,
            workflow: None,
            applicant: Applicant::default(),
        }
    }

    /// Connect to the database and the model and build the agent and workflow
    pub async fn initialize(config: &Config, applicant: Applicant) -> Result<Self> {
        log::info!("Connecting to claims database");
        let store: Arc<dyn ClaimsStore> = Arc::new(
            PgClaimsStore::connect(&config.database_url, config.database_max_connections).await?,
        );

        let api_key = config
            .mistral_api_key
            .clone()
            .ok_or_else(|| AssistantError::config("MISTRAL_API_KEY must be set"))?;
        let mistral = MistralModel::new(api_key, config.model.clone(), &config.mistral_base_url)?;
        log::info!("Loaded Mistral model {}", mistral.model_name());
        let model: Arc<dyn Model> = Arc::new(mistral);

        Self::from_parts(config, store, model, applicant)
    }

    /// Assemble the context around an existing store and model
    pub fn from_parts(
        config: &Config,
        store: Arc<dyn ClaimsStore>,
        model: Arc<dyn Model>,
        applicant: Applicant,
    ) -> Result<Self> {
        let generation = GenerationConfig::with_temperature(config.temperature);
        let registry = ToolRegistry::from_tools(create_tools(store.clone()))?;
        log::info!(
            "Registered {} tools: {}",
            registry.len(),
            registry.names().join(", ")
        );

        let agent = ReActAgent::new(
            AGENT_NAME,
            INSURANCE_BOT_INSTRUCTION,
            model.clone(),
            registry.tools(),
            config.max_iterations,
        )
        .with_generation_config(generation.clone());

        let guidance = config.ohip_guidance.then_some(model);
        let workflow = OhipWorkflow::new(store, guidance, generation)?;
        log::info!("Agent and OHIP workflow initialized");

        Ok(Self::new(Arc::new(agent), Arc::new(workflow), applicant))
    }

    pub fn is_ready(&self) -> bool {
        self.agent.is_some() && self.workflow.is_some()
    }

    /// Route one chat query. OHIP applications return the final workflow
    /// state rendered as JSON.
    pub async fn answer(&self, raw_query: &str) -> std::result::Result<String, AnswerError> {
        let (Some(agent), Some(workflow)) = (&self.agent, &self.workflow) else {
            return Err(AnswerError::Unavailable);
        };

        let query = intake::normalize_query(raw_query);
        match intake::route(&query) {
            Route::OhipWorkflow => {
                log::info!("Routing query to the OHIP workflow");
                let state = workflow.run(self.applicant.clone()).await?;
                Ok(serde_json::to_string(&state).map_err(AssistantError::from)?)
            }
            Route::Agent => Ok(agent.run(query).await?),
        }
    }
}
