// file: src/crew/runner.rs
// description: sequential crew execution with validation-driven re-prompting
// reference: orchestrates the staged book writing workflow

use crate::agents::AgentSpec;
use crate::config::Config;
use crate::crew::definition::CrewDefinition;
use crate::crew::progress::{CrewStats, ProgressTracker};
use crate::crew::prompt::{PromptVars, TaskPrompt, retry_prompt};
use crate::crew::task::TaskSpec;
use crate::error::{CrewError, Result};
use crate::llm::{CompletionClient, CompletionRequest};
use crate::tools::{SerperSearch, Tool, render_hits};
use crate::validator::{ChapterValidator, SplitMode, Verdict};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub temperature: f32,
    pub max_validation_retries: usize,
    pub split_mode: SplitMode,
    pub show_progress: bool,
    pub colored: bool,
    pub log_outputs: bool,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            temperature: config.model.temperature,
            max_validation_retries: config.pipeline.max_validation_retries,
            split_mode: config.validation.split_mode,
            show_progress: true,
            colored: true,
            log_outputs: config.pipeline.verbose,
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    pub task: String,
    pub agent_role: String,
    pub raw: String,
    pub attempts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrewOutput {
    pub outputs: Vec<TaskOutput>,
    pub stats: CrewStats,
}

impl CrewOutput {
    pub fn final_output(&self) -> Option<&TaskOutput> {
        self.outputs.last()
    }

    pub fn output(&self, task_key: &str) -> Option<&TaskOutput> {
        self.outputs.iter().find(|output| output.task == task_key)
    }
}

pub struct Crew<C> {
    definition: CrewDefinition,
    client: C,
    search: Option<SerperSearch>,
    vars: PromptVars,
    settings: RunSettings,
}

impl<C: CompletionClient> Crew<C> {
    pub fn new(
        definition: CrewDefinition,
        client: C,
        vars: PromptVars,
        settings: RunSettings,
    ) -> Result<Self> {
        definition.validate()?;

        Ok(Self {
            definition,
            client,
            search: None,
            vars,
            settings,
        })
    }

    pub fn with_search(mut self, search: SerperSearch) -> Self {
        self.search = Some(search);
        self
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Runs every task in declared order; each one sees the outputs of the
    /// tasks named in its context.
    pub async fn kickoff(&self) -> Result<CrewOutput> {
        let total = self.definition.tasks.len();
        info!(
            "Running crew with {} tasks on model {}",
            total,
            self.client.model()
        );

        let progress = if self.settings.show_progress {
            ProgressTracker::with_color(total, self.settings.colored)
        } else {
            ProgressTracker::hidden(total)
        };

        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(total);

        for (index, task) in self.definition.tasks.iter().enumerate() {
            let agent = self.definition.agent(&task.agent)?;
            info!("[{}/{}] {} -> {}", index + 1, total, agent.role, task.key);
            progress.start_task(&task.key, &agent.role);

            for placeholder in self
                .vars
                .unknown_placeholders(&task.description)
                .into_iter()
                .chain(self.vars.unknown_placeholders(&task.expected_output))
            {
                warn!("Task {} has unresolved placeholder {{{}}}", task.key, placeholder);
            }

            let context: Vec<(&str, &str)> = task
                .context
                .iter()
                .filter_map(|key| {
                    outputs
                        .iter()
                        .find(|output| &output.task == key)
                        .map(|output| (output.task.as_str(), output.raw.as_str()))
                })
                .collect();

            let search_results = if agent.has_tool(Tool::WebSearch) {
                self.search_context().await
            } else {
                None
            };

            let prompt = TaskPrompt {
                task,
                agent,
                context,
                search_results,
            };

            let output = self.execute_task(task, agent, &prompt, &progress).await?;
            progress.complete_task(output.raw.split_whitespace().count());

            if self.settings.log_outputs {
                debug!("Output of {}:\n{}", task.key, output.raw);
            }
            info!(
                "Completed {} in {} attempt(s)",
                output.task, output.attempts
            );

            outputs.push(output);
        }

        let stats = progress.get_stats();
        progress.finish();
        log_final_stats(&stats);

        Ok(CrewOutput { outputs, stats })
    }

    async fn execute_task(
        &self,
        task: &TaskSpec,
        agent: &AgentSpec,
        prompt: &TaskPrompt<'_>,
        progress: &ProgressTracker,
    ) -> Result<TaskOutput> {
        let validator = task
            .validator
            .map(|bounds| ChapterValidator::new(bounds).with_mode(self.settings.split_mode));

        let base_prompt = prompt.render(&self.vars);
        let mut request = CompletionRequest {
            system: prompt.system(),
            prompt: base_prompt.clone(),
            temperature: self.settings.temperature,
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            progress.inc_attempts();

            let raw = self.client.complete(&request).await?;
            if raw.trim().is_empty() {
                return Err(CrewError::EmptyCompletion(task.key.clone()));
            }

            let rejection = match validator.as_ref().map(|v| v.validate(&raw)) {
                Some(Verdict::Rejected(rejection)) => Some(rejection),
                None | Some(Verdict::Accepted(_)) => None,
            };

            let Some(rejection) = rejection else {
                return Ok(TaskOutput {
                    task: task.key.clone(),
                    agent_role: agent.role.clone(),
                    raw,
                    attempts,
                });
            };

            if attempts > self.settings.max_validation_retries {
                return Err(CrewError::ValidationExhausted {
                    task: task.key.clone(),
                    attempts,
                    reason: rejection.to_string(),
                });
            }

            warn!(
                "Output of {} rejected (attempt {}): {}",
                task.key, attempts, rejection
            );
            progress.inc_validation_retries();
            progress.set_message(format!("Retrying {}: {}", task.key, rejection));
            request.prompt = retry_prompt(&base_prompt, &raw, &rejection);
        }
    }

    async fn search_context(&self) -> Option<String> {
        let Some(search) = &self.search else {
            debug!("No search client configured, skipping web search");
            return None;
        };

        let topic = self.vars.get("topic").unwrap_or_default();
        match search.search(topic).await {
            Ok(hits) if hits.is_empty() => {
                warn!("Web search returned no results for {}", topic);
                None
            }
            Ok(hits) => Some(render_hits(&hits)),
            Err(e) => {
                warn!("Web search failed, continuing without results: {}", e);
                None
            }
        }
    }
}

fn log_final_stats(stats: &CrewStats) {
    info!("=== Crew Execution Summary ===");
    info!("Duration: {} seconds", stats.duration_secs);
    info!("Tasks completed: {}", stats.tasks_completed);
    info!("LLM calls: {}", stats.attempts);
    info!("Validation retries: {} ({:.2}%)", stats.validation_retries, stats.retry_rate());
    info!(
        "Words produced: {} ({:.1} words/sec)",
        stats.words_produced,
        stats.words_per_second()
    );
    info!("==============================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::task::{CREATE_OUTLINE, DRAFT_CHAPTERS, FORMAT_BOOK, GENERATE_IDEAS};
    use crate::validator::ChapterBounds;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedClient {
        replies: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedClient {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl CompletionClient for ScriptedClient {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| CrewError::LlmRequest("script exhausted".to_string()))
        }
    }

    fn bounds() -> ChapterBounds {
        ChapterBounds::new(2, 3, 3, 5)
    }

    fn settings(retries: usize) -> RunSettings {
        RunSettings {
            temperature: 0.7,
            max_validation_retries: retries,
            split_mode: SplitMode::Substring,
            show_progress: false,
            colored: false,
            log_outputs: false,
        }
    }

    fn crew(replies: &[&str], retries: usize) -> Crew<ScriptedClient> {
        let bounds = bounds();
        Crew::new(
            CrewDefinition::builtin(bounds),
            ScriptedClient::new(replies),
            PromptVars::new("Frontend", Some("Landing Pages"), &bounds),
            settings(retries),
        )
        .unwrap()
    }

    const GOOD_DRAFT: &str = "Chapter 1: one two three\nChapter 2: four five six";
    const SHORT_DRAFT: &str = "Chapter 1: one two three";

    #[tokio::test]
    async fn test_runs_all_tasks_in_order() {
        let crew = crew(&["ideas", "outline", GOOD_DRAFT, "polished", "# Book"], 0);
        let output = crew.kickoff().await.unwrap();

        let keys: Vec<&str> = output.outputs.iter().map(|o| o.task.as_str()).collect();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[0], GENERATE_IDEAS);
        assert_eq!(output.final_output().unwrap().task, FORMAT_BOOK);
        assert_eq!(output.final_output().unwrap().raw, "# Book");
        assert_eq!(output.stats.tasks_completed, 5);
        assert_eq!(output.stats.validation_retries, 0);
    }

    #[tokio::test]
    async fn test_context_flows_to_next_task() {
        let crew = crew(&["IDEA-LIST", "OUTLINE-TEXT", GOOD_DRAFT, "polished", "# Book"], 0);
        crew.kickoff().await.unwrap();

        let requests = crew.client.requests();
        assert!(requests[1].prompt.contains("### Output of generate_ideas\nIDEA-LIST"));
        assert!(requests[2].prompt.contains("OUTLINE-TEXT"));
        assert!(!requests[2].prompt.contains("IDEA-LIST"));
        assert!(requests[1].system.contains("Outline Architect"));
        assert!(requests[0].prompt.contains("'Frontend'"));
    }

    #[tokio::test]
    async fn test_rejected_draft_is_reprompted() {
        let crew = crew(
            &["ideas", "outline", SHORT_DRAFT, GOOD_DRAFT, "polished", "# Book"],
            2,
        );
        let output = crew.kickoff().await.unwrap();

        let draft = output.output(DRAFT_CHAPTERS).unwrap();
        assert_eq!(draft.attempts, 2);
        assert_eq!(draft.raw, GOOD_DRAFT);
        assert_eq!(output.stats.validation_retries, 1);

        let requests = crew.client.requests();
        assert!(requests[3].prompt.contains("Found 1 chapters. Please rewrite with 2-3 chapters."));
        assert!(requests[3].prompt.contains(SHORT_DRAFT));
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let crew = crew(&["ideas", "outline", SHORT_DRAFT, SHORT_DRAFT], 1);
        let err = crew.kickoff().await.unwrap_err();

        match err {
            CrewError::ValidationExhausted {
                task,
                attempts,
                reason,
            } => {
                assert_eq!(task, DRAFT_CHAPTERS);
                assert_eq!(attempts, 2);
                assert!(reason.contains("Found 1 chapters"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_completion_fails() {
        let crew = crew(&["ideas", "   "], 0);
        let err = crew.kickoff().await.unwrap_err();
        assert!(matches!(err, CrewError::EmptyCompletion(ref key) if key == CREATE_OUTLINE));
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        let crew = crew(&["ideas"], 3);
        let err = tokio_test::block_on(crew.kickoff()).unwrap_err();
        assert!(matches!(err, CrewError::LlmRequest(_)));
        assert_eq!(crew.client.requests().len(), 2);
    }
}
