//! Docent — conversational agent engine.
//!
//! Mediates between a model backend, external tools (web search,
//! human-in-the-loop escalation, a document-workspace comment API), and two
//! front-ends: an interactive prompt and a webhook server reacting to
//! comment events. The core is the turn-taking loop in [`agent_loop`],
//! which decides per turn whether to call the model, execute a tool,
//! suspend for human input, or terminate — and persists conversation state
//! across asynchronous interruptions.

pub mod agent_loop;
pub mod cli;
pub mod config;
pub mod error;
pub mod provider;
pub mod server;
pub mod tools;
pub mod types;
pub mod workspace;
