// SPDX-License-Identifier: MIT

//! InsuranceBot: claims tools, the OHIP workflow and the HTTP front door

pub mod config;
pub mod context;
pub mod intake;
pub mod prompts;
pub mod registry;
pub mod server;
pub mod store;
pub mod tools;
pub mod workflow;
