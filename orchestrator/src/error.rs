// orchestrator/src/error.rs

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("failed to compile trigger rules: {0}")]
    RuleCompile(#[from] regex::Error),

    #[error("{0} is unavailable (lock poisoned)")]
    StateUnavailable(&'static str),

    #[error("decision path panicked: {0}")]
    Panicked(String),

    #[error("failed to build completion client: {0}")]
    Client(#[from] gate_core::LlmError),
}
