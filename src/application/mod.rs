//! Application layer - Commands, Queries, and Handlers.
//!
//! Handlers coordinate the ports for one request each. The orchestrator
//! drives a device through the multi-step submit, pay and signup flow.

pub mod handlers;
pub mod orchestrator;

pub use orchestrator::{
    AccountNudge, CheckoutRedirect, ConfirmationPolling, OrchestratorPorts, OrchestratorSettings,
    SubmissionOrchestrator, SubmitStep,
};
