// file: src/crew/prompt.rs
// description: placeholder rendering and prompt assembly for crew tasks
// reference: Internal code standards

use crate::agents::AgentSpec;
use crate::crew::task::TaskSpec;
use crate::validator::{ChapterBounds, Rejection};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{([a-z_]+)\}").expect("PLACEHOLDER regex is valid");
}

const DEFAULT_IDEA: &str = "the most promising idea from the list you were given";

/// Values substituted into task descriptions and expected outputs.
#[derive(Debug, Clone, Default)]
pub struct PromptVars {
    values: BTreeMap<String, String>,
}

impl PromptVars {
    pub fn new(topic: &str, idea: Option<&str>, bounds: &ChapterBounds) -> Self {
        let mut vars = Self::default();
        vars.set("topic", topic);
        vars.set("idea", idea.unwrap_or(DEFAULT_IDEA));
        vars.set("min_chapters", &bounds.min_chapters.to_string());
        vars.set("max_chapters", &bounds.max_chapters.to_string());
        vars.set("min_words", &bounds.min_words.to_string());
        vars.set("max_words", &bounds.max_words.to_string());
        vars
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Replaces known `{key}` placeholders; unknown ones are left as written.
    pub fn render(&self, template: &str) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &regex::Captures| {
                self.values
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    pub fn unknown_placeholders(&self, template: &str) -> Vec<String> {
        PLACEHOLDER
            .captures_iter(template)
            .filter(|caps| !self.values.contains_key(&caps[1]))
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

pub struct TaskPrompt<'a> {
    pub task: &'a TaskSpec,
    pub agent: &'a AgentSpec,
    pub context: Vec<(&'a str, &'a str)>,
    pub search_results: Option<String>,
}

impl TaskPrompt<'_> {
    pub fn system(&self) -> String {
        self.agent.system_prompt()
    }

    pub fn render(&self, vars: &PromptVars) -> String {
        let mut prompt = String::new();

        prompt.push_str("Current Task: ");
        prompt.push_str(vars.render(&self.task.description).trim());
        prompt.push_str("\n\nThis is the expected criteria for your final answer: ");
        prompt.push_str(vars.render(&self.task.expected_output).trim());
        prompt.push_str(
            "\nYou MUST return the actual complete content as the final answer, not a summary.",
        );

        if !self.context.is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            for (key, output) in &self.context {
                prompt.push_str(&format!("\n### Output of {}\n{}\n", key, output.trim()));
            }
        }

        if let Some(results) = &self.search_results
            && !results.trim().is_empty()
        {
            prompt.push_str(&format!(
                "\n\nWeb search results for \"{}\":\n{}\n",
                vars.get("topic").unwrap_or_default(),
                results
            ));
        }

        prompt
    }
}

/// Prompt for another attempt after the previous answer was rejected.
pub fn retry_prompt(base: &str, previous: &str, rejection: &Rejection) -> String {
    format!(
        "{base}\n\nYour previous answer was rejected: {rejection}\n\n\
         Previous answer:\n{previous}\n\n\
         Rewrite the complete answer so that it meets every requirement above.",
        base = base.trim_end(),
        rejection = rejection,
        previous = previous.trim(),
    )
}
