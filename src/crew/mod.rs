// file: src/crew/mod.rs
// description: crew module exports and public api
// reference: sequential crew orchestration

pub mod definition;
pub mod progress;
pub mod prompt;
pub mod runner;
pub mod task;

pub use definition::CrewDefinition;
pub use progress::{CrewStats, ProgressTracker};
pub use prompt::{PromptVars, TaskPrompt};
pub use runner::{Crew, CrewOutput, RunSettings, TaskOutput};
pub use task::{TaskSpec, builtin_tasks};
