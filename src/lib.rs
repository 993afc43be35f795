// SPDX-License-Identifier: MIT

//! InsuranceBot: a chat agent over a claims database, plus the fixed
//! "apply for OHIP" workflow.

pub mod adk;
pub mod claims;
