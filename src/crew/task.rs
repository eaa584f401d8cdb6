// file: src/crew/task.rs
// description: task definitions and the built-in five stage book pipeline
// reference: sequential task graph with context links

use crate::agents::roster::{CHAPTER_WRITER, EDITOR, FORMATTER, IDEA_CURATOR, OUTLINE_ARCHITECT};
use crate::validator::ChapterBounds;
use serde::{Deserialize, Serialize};

pub const GENERATE_IDEAS: &str = "generate_ideas";
pub const CREATE_OUTLINE: &str = "create_outline";
pub const DRAFT_CHAPTERS: &str = "draft_chapters";
pub const POLISH_BOOK: &str = "polish_book";
pub const FORMAT_BOOK: &str = "format_book";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TaskSpec {
    pub key: String,
    /// May contain `{topic}`-style placeholders.
    pub description: String,
    pub expected_output: String,
    pub agent: String,
    /// Keys of earlier tasks whose output is handed to this one.
    pub context: Vec<String>,
    pub validator: Option<ChapterBounds>,
}

impl TaskSpec {
    pub fn new(key: &str, agent: &str, description: &str, expected_output: &str) -> Self {
        Self {
            key: key.to_string(),
            description: description.to_string(),
            expected_output: expected_output.to_string(),
            agent: agent.to_string(),
            context: Vec::new(),
            validator: None,
        }
    }

    pub fn with_context(mut self, task_key: &str) -> Self {
        self.context.push(task_key.to_string());
        self
    }

    pub fn with_validator(mut self, bounds: ChapterBounds) -> Self {
        self.validator = Some(bounds);
        self
    }
}

pub fn builtin_tasks(bounds: ChapterBounds) -> Vec<TaskSpec> {
    vec![
        TaskSpec::new(
            GENERATE_IDEAS,
            IDEA_CURATOR,
            "Generate 3 unique book ideas based on '{topic}'.",
            "A list of 3 unique and marketable book ideas.",
        ),
        TaskSpec::new(
            CREATE_OUTLINE,
            OUTLINE_ARCHITECT,
            "Expand the chosen idea into a structured book outline: '{idea}'. \
             The outline must include {min_chapters} to {max_chapters} chapters, \
             with clear chapter titles and a short summary for each.",
            "A detailed outline with {min_chapters}-{max_chapters} chapters.",
        )
        .with_context(GENERATE_IDEAS),
        TaskSpec::new(
            DRAFT_CHAPTERS,
            CHAPTER_WRITER,
            "Write detailed drafts for each chapter. \
             Each chapter must be between {min_words} and {max_words} words. \
             Do not skip any chapters. \
             Label each chapter clearly (e.g., 'Chapter 1: ...') and do not use \
             the word 'Chapter' anywhere else in the text.",
            "Draft text for each chapter of the book. \
             Each chapter is clearly labeled and contains {min_words}-{max_words} words.",
        )
        .with_context(CREATE_OUTLINE)
        .with_validator(bounds),
        TaskSpec::new(
            POLISH_BOOK,
            EDITOR,
            "Polish drafts for readability, grammar, and flow.",
            "A polished manuscript with consistent flow.",
        )
        .with_context(DRAFT_CHAPTERS),
        TaskSpec::new(
            FORMAT_BOOK,
            FORMATTER,
            "Take the polished manuscript and format it into a single Markdown document. \
             Do not output multiple HTML files or EPUB markup. \
             Instead, produce one `.md` file where each chapter starts with an H1 heading \
             (`# Chapter X: Title`). \
             Within each chapter, use H2/H3 headings if needed, and keep paragraphs as plain text. \
             The final output must be valid Markdown only.",
            "A single Markdown file containing the full book. \
             Each chapter is clearly separated using `# Chapter N: Title` headings.",
        )
        .with_context(POLISH_BOOK),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let keys: Vec<String> = builtin_tasks(ChapterBounds::default())
            .into_iter()
            .map(|t| t.key)
            .collect();
        assert_eq!(
            keys,
            vec![GENERATE_IDEAS, CREATE_OUTLINE, DRAFT_CHAPTERS, POLISH_BOOK, FORMAT_BOOK]
        );
    }

    #[test]
    fn test_only_drafting_is_validated() {
        let bounds = ChapterBounds::new(4, 5, 200, 250);
        let tasks = builtin_tasks(bounds);
        for task in &tasks {
            if task.key == DRAFT_CHAPTERS {
                assert_eq!(task.validator, Some(bounds));
            } else {
                assert!(task.validator.is_none());
            }
        }
    }

    #[test]
    fn test_each_task_uses_previous_output() {
        let tasks = builtin_tasks(ChapterBounds::default());
        assert!(tasks[0].context.is_empty());
        for pair in tasks.windows(2) {
            assert_eq!(pair[1].context, vec![pair[0].key.clone()]);
        }
    }
}
