// SPDX-License-Identifier: MIT

//! The fixed "apply for OHIP" workflow and the state-graph engine it runs on

pub mod graph;
pub mod ohip;
pub mod state;

pub use ohip::{build_ohip_graph, legacy_needs_registration, OhipWorkflow};
pub use state::{Applicant, ApplicationState, ApplicationUpdate, LookupOutcome};
