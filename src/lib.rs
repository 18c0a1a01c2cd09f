//! AI layer for the WorkHive platform: declarative flow schemas, the
//! orchestrator that turns validated inputs into schema-conformant model
//! outputs, the tools the model may call mid-generation, and the
//! focus-session state machine the workspace UI drives.
//!
//! The orchestrator persists nothing and never retries silently; every
//! failure is a typed [`FlowError`] the caller can surface. See the `flows`
//! module for the product flow catalog and its one-function-per-flow API.

pub mod config;
pub mod error;
pub mod flow;
pub mod flows;
pub mod prompt;
pub mod provider;
pub mod schema;
pub mod session;
pub mod tool;

pub use config::Settings;
pub use error::{FlowError, FlowResult, SessionError, ValidationError, Violation};
pub use flow::runner::Orchestrator;
pub use flow::{FlowOutput, FlowSpec};
pub use flows::FlowRegistry;
pub use schema::{Field, Schema};
pub use session::{FocusSession, SessionMode, SessionSnapshot, TEAM_CAPACITY};
pub use tool::{Tool, ToolRegistry};
