// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod agents;
pub mod config;
pub mod crew;
pub mod error;
pub mod llm;
pub mod manuscript;
pub mod tools;
pub mod utils;
pub mod validator;

pub use agents::{AgentSpec, builtin_agents};
pub use config::{Config, ModelConfig, OutputConfig, PipelineConfig, SearchConfig, ValidationConfig};
pub use crew::{
    Crew, CrewDefinition, CrewOutput, CrewStats, PromptVars, RunSettings, TaskOutput, TaskSpec,
};
pub use error::{CrewError, Result};
pub use llm::{CompletionClient, CompletionRequest, LlmClient, ModelId, Provider};
pub use manuscript::{Manuscript, ManuscriptWriter, RunSummary};
pub use tools::{SerperSearch, Tool};
pub use utils::{HealthReport, OperationTimer, Validator};
pub use validator::{
    ChapterBounds, ChapterValidator, Rejection, SplitMode, Verdict, validate_chapters,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default();
        let definition = CrewDefinition::builtin(config.validation.bounds());
        assert!(definition.validate().is_ok());
        assert!(validate_chapters("", 8, 10, 300, 400).starts_with("Found 0 chapters"));
    }
}
