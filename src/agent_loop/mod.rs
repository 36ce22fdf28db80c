//! The agent turn-taking engine: turn executor, conversation state store,
//! and the control loop that wires them to the tool registry.

pub mod runner;
pub mod store;
pub mod turn;

pub use runner::{LoopRunner, TurnOutcome};
pub use store::{MemoryThreadStore, SuspensionCheckpoint, ThreadStore};
pub use turn::TurnExecutor;
