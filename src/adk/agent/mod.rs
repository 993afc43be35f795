// SPDX-License-Identifier: MIT

//! Agent module - the chat agent abstraction
//!
//! - `ReActAgent` - Reasoning + Acting loop over a model and a tool set

mod react;

pub use react::ReActAgent;

use crate::adk::error::Result;
use async_trait::async_trait;

/// Core agent trait for all agent types
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent name
    fn name(&self) -> &str;

    /// Run the agent with the given input
    async fn run(&self, input: String) -> Result<String>;
}
