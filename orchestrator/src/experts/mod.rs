// orchestrator/src/experts/mod.rs

// Everything that talks to the completion model
pub mod llm_client;
pub mod memory_analyzer;
