// SPDX-License-Identifier: MIT

//! ReAct Agent - Reasoning + Acting pattern
//!
//! The agent keeps a scratchpad of Thought / Action / Observation lines and
//! re-prompts the model with it while the model keeps calling tools. A reply
//! without a function call is the answer (an optional `Final Answer:` prefix
//! is stripped). The iteration budget bounds the number of model calls.

use super::Agent;
use crate::adk::error::Result;
use crate::adk::model::{Content, GenerationConfig, Model, Part};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

const FINAL_ANSWER: &str = "final answer:";

pub struct ReActAgent {
    name: String,
    instruction: String,
    model: Arc<dyn Model>,
    tools: Vec<Arc<dyn Tool>>,
    tool_index: HashMap<String, usize>,
    max_iterations: u32,
    generation: Option<GenerationConfig>,
}

#[derive(Debug)]
enum ReActStep {
    Action {
        thought: Option<String>,
        tool: String,
        args: serde_json::Value,
    },
    FinalAnswer(String),
    Empty,
}

impl ReActAgent {
    pub fn new(
        name: impl Into<String>,
        instruction: impl Into<String>,
        model: Arc<dyn Model>,
        tools: Vec<Arc<dyn Tool>>,
        max_iterations: u32,
    ) -> Self {
        let tool_index = tools
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name().to_string(), i))
            .collect();

        Self {
            name: name.into(),
            instruction: instruction.into(),
            model,
            tools,
            tool_index,
            max_iterations,
            generation: None,
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation = Some(config);
        self
    }

    fn system_prompt(&self) -> String {
        let tool_section = if self.tools.is_empty() {
            "No tools are available. You must answer based on your knowledge.".to_string()
        } else {
            let lines: Vec<String> = self
                .tools
                .iter()
                .map(|t| format!("- {}: {}", t.name(), t.description()))
                .collect();
            format!("Available tools:\n{}", lines.join("\n"))
        };

        format!(
            r#"{}

{}

Work step by step. At each step either:
- call exactly one of the tools above with a function call, or
- reply to the user with plain text, which ends the conversation turn.

Tool results are given back to you as Observations. Never mention Thought, Action or Observation in the final answer."#,
            self.instruction, tool_section
        )
    }

    fn prompt_with_scratchpad(input: &str, scratchpad: &[String]) -> String {
        if scratchpad.is_empty() {
            input.to_string()
        } else {
            format!(
                "{}\n\n--- Previous Steps ---\n{}\n\nContinue from where you left off.",
                input,
                scratchpad.join("\n")
            )
        }
    }

    /// A function call anywhere in the reply wins over its text; text alone
    /// is the final answer.
    fn parse_step(response: &Content) -> ReActStep {
        let text = response.text();
        let text = text.trim();

        let call = response.parts.iter().find_map(|part| match part {
            Part::FunctionCall { name, args, .. } => Some((name.clone(), args.clone())),
            _ => None,
        });
        if let Some((tool, args)) = call {
            return ReActStep::Action {
                thought: (!text.is_empty()).then(|| text.to_string()),
                tool,
                args,
            };
        }

        if text.is_empty() {
            return ReActStep::Empty;
        }
        ReActStep::FinalAnswer(strip_final_answer(text).to_string())
    }

    /// Run a tool and render its result as an observation.
    /// Failures become `Error: ...` observations so the model can report them.
    async fn observe(&self, tool_name: &str, args: serde_json::Value) -> String {
        let Some(tool) = self.tool_index.get(tool_name).map(|&i| &self.tools[i]) else {
            log::error!("Tool {} not found", tool_name);
            return format!("Error: Tool '{}' not found", tool_name);
        };

        match tool.execute(args).await {
            Ok(result) => serde_json::to_string_pretty(&result).unwrap_or_default(),
            Err(e) => {
                log::error!("Tool {} failed: {}", tool_name, e);
                format!("Error: {}", e)
            }
        }
    }
}

#[async_trait]
impl Agent for ReActAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: String) -> Result<String> {
        let system_prompt = self.system_prompt();
        let mut scratchpad: Vec<String> = Vec::new();

        for iteration in 0..self.max_iterations {
            log::info!(
                "ReActAgent {} iteration {}/{}",
                self.name,
                iteration + 1,
                self.max_iterations
            );

            let history = vec![
                Content::system(system_prompt.clone()),
                Content::user(Self::prompt_with_scratchpad(&input, &scratchpad)),
            ];

            let response = self
                .model
                .generate_content(
                    &history,
                    self.generation.as_ref(),
                    Some(self.tools.as_slice()),
                )
                .await?;

            let step = Self::parse_step(&response);
            log::debug!("ReActAgent step: {:?}", step);

            match step {
                ReActStep::Empty => {
                    log::warn!("Model returned an empty reply");
                }
                ReActStep::Action {
                    thought,
                    tool,
                    args,
                } => {
                    if let Some(thought) = thought {
                        log::info!("Thought: {}", thought);
                        scratchpad.push(format!("Thought: {}", thought));
                    }
                    log::info!("Action: {}({})", tool, args);
                    scratchpad.push(format!("Action: {}({})", tool, args));
                    let observation = self.observe(&tool, args).await;
                    log::info!("Observation: {}", observation);
                    scratchpad.push(format!("Observation: {}", observation));
                }
                ReActStep::FinalAnswer(answer) => {
                    log::info!("Final Answer: {}", answer);
                    return Ok(answer);
                }
            }
        }

        log::warn!(
            "ReActAgent {} reached max iterations ({})",
            self.name,
            self.max_iterations
        );

        Ok(format!(
            "Reached maximum iterations. Here's what I found:\n\n{}",
            scratchpad.join("\n")
        ))
    }
}

fn strip_final_answer(text: &str) -> &str {
    if text.len() >= FINAL_ANSWER.len()
        && text.is_char_boundary(FINAL_ANSWER.len())
        && text[..FINAL_ANSWER.len()].eq_ignore_ascii_case(FINAL_ANSWER)
    {
        text[FINAL_ANSWER.len()..].trim()
    } else {
        text
    }
}
