// SPDX-License-Identifier: MIT

//! Agent development kit: agents, models, tools and the shared error type.

pub mod agent;
pub mod error;
pub mod model;
pub mod tool;
