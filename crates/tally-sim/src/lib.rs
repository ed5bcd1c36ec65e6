//! Tally Sim
//!
//! Replays scripted interactions (element tree, trigger mounts, clicks,
//! command submissions) against a palette session and reports the context
//! and visible commands after every step.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod runner;
pub mod scenario;

pub use error::SimError;
pub use runner::{replay, RunReport, Runner, StepReport, Submission};
pub use scenario::{CommandDecl, ElementDecl, Expectation, Scenario, Step};

/// Built-in time tracking scenario
pub const DEMO_SCENARIO: &str = include_str!("../scenarios/demo.yaml");

/// Parse the built-in scenario
///
/// # Errors
/// - `SimError::Yaml` if the embedded scenario is malformed
pub fn demo() -> Result<Scenario, SimError> {
    Scenario::from_yaml(DEMO_SCENARIO)
}
