// file: src/agents/agent.rs
// description: role-specialized agent definition and persona prompt
// reference: role/goal/backstory agent model

use crate::tools::Tool;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AgentSpec {
    pub key: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub allow_delegation: bool,
    pub tools: Vec<Tool>,
}

impl AgentSpec {
    pub fn new(key: &str, role: &str, goal: &str, backstory: &str) -> Self {
        Self {
            key: key.to_string(),
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
            allow_delegation: false,
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        if !self.tools.contains(&tool) {
            self.tools.push(tool);
        }
        self
    }

    pub fn has_tool(&self, tool: Tool) -> bool {
        self.tools.contains(&tool)
    }

    /// System instruction sent with every request this agent makes.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {role}. {backstory}\nYour personal goal is: {goal}",
            role = self.role,
            backstory = self.backstory.trim(),
            goal = self.goal,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_mentions_persona() {
        let agent = AgentSpec::new(
            "editor",
            "Editor/Polisher",
            "Refine the draft",
            "You ensure flow.",
        );
        let prompt = agent.system_prompt();
        assert!(prompt.starts_with("You are Editor/Polisher."));
        assert!(prompt.contains("You ensure flow."));
        assert!(prompt.ends_with("Your personal goal is: Refine the draft"));
    }

    #[test]
    fn test_with_tool_deduplicates() {
        let agent = AgentSpec::new("a", "A", "g", "b")
            .with_tool(Tool::WebSearch)
            .with_tool(Tool::WebSearch);
        assert_eq!(agent.tools.len(), 1);
        assert!(agent.has_tool(Tool::WebSearch));
        assert!(!agent.allow_delegation);
    }
}
