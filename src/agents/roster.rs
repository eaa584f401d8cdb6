// file: src/agents/roster.rs
// description: built-in agents of the book writing crew
// reference: idea curator, outline architect, chapter writer, editor, formatter

use crate::agents::AgentSpec;
use crate::tools::Tool;

pub const IDEA_CURATOR: &str = "idea_curator";
pub const OUTLINE_ARCHITECT: &str = "outline_architect";
pub const CHAPTER_WRITER: &str = "chapter_writer";
pub const EDITOR: &str = "editor";
pub const FORMATTER: &str = "formatter";

pub fn builtin_agents() -> Vec<AgentSpec> {
    vec![
        AgentSpec::new(
            IDEA_CURATOR,
            "Idea Curator",
            "Propose unique book ideas based on user input",
            "You are a creative thinker who researches book niches, \
             identifies unique angles, and proposes marketable ideas.",
        )
        .with_tool(Tool::WebSearch),
        AgentSpec::new(
            OUTLINE_ARCHITECT,
            "Outline Architect",
            "Expand chosen idea into a structured book outline",
            "You are skilled at structuring content into logical chapters.",
        ),
        AgentSpec::new(
            CHAPTER_WRITER,
            "Chapter Writer",
            "Write detailed drafts for each chapter",
            "You are an articulate writer who adapts tone to fit the audience.",
        ),
        AgentSpec::new(
            EDITOR,
            "Editor/Polisher",
            "Refine the draft for clarity, grammar, and consistency",
            "You ensure flow and consistency across the manuscript.",
        ),
        AgentSpec::new(
            FORMATTER,
            "Formatter",
            "Prepare the final book as a single Markdown document",
            "You convert manuscripts into clean, publish-ready Markdown.",
        ),
    ]
}
