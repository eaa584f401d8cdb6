// file: src/crew/definition.rs
// description: crew definition (agents + ordered tasks) with optional YAML overrides
// reference: https://docs.rs/yaml-rust

use crate::agents::{AgentSpec, builtin_agents};
use crate::crew::task::{TaskSpec, builtin_tasks};
use crate::error::{CrewError, Result};
use crate::tools::Tool;
use crate::validator::ChapterBounds;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;
use yaml_rust::{Yaml, YamlLoader};

#[derive(Debug, Clone, PartialEq)]
pub struct CrewDefinition {
    pub agents: Vec<AgentSpec>,
    pub tasks: Vec<TaskSpec>,
}

impl CrewDefinition {
    pub fn builtin(bounds: ChapterBounds) -> Self {
        Self {
            agents: builtin_agents(),
            tasks: builtin_tasks(bounds),
        }
    }

    pub fn load(path: &Path, bounds: ChapterBounds) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CrewError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded crew definition from {}", path.display());
        Self::from_yaml(&content, bounds)
    }

    /// `agents:` entries override built-in agents field by field; a `tasks:`
    /// list replaces the built-in task order, inheriting unset fields from the
    /// built-in task with the same key.
    pub fn from_yaml(content: &str, bounds: ChapterBounds) -> Result<Self> {
        let docs = YamlLoader::load_from_str(content)
            .map_err(|e| CrewError::CrewDefinition(format!("YAML parse error: {}", e)))?;

        let mut definition = Self::builtin(bounds);

        let Some(doc) = docs.into_iter().next() else {
            return Ok(definition);
        };

        if let Yaml::Hash(_) = &doc[AGENTS_KEY] {
            definition.merge_agents(&doc[AGENTS_KEY])?;
        }

        match &doc[TASKS_KEY] {
            Yaml::Array(entries) => definition.replace_tasks(entries, bounds)?,
            Yaml::BadValue | Yaml::Null => {}
            _ => {
                return Err(CrewError::CrewDefinition(
                    "'tasks' must be a list".to_string(),
                ));
            }
        }

        definition.validate()?;
        Ok(definition)
    }

    pub fn agent(&self, key: &str) -> Result<&AgentSpec> {
        self.agents
            .iter()
            .find(|agent| agent.key == key)
            .ok_or_else(|| CrewError::CrewDefinition(format!("unknown agent '{}'", key)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(CrewError::CrewDefinition(
                "crew must define at least one task".to_string(),
            ));
        }

        let mut agent_keys = HashSet::new();
        for agent in &self.agents {
            if !agent_keys.insert(agent.key.as_str()) {
                return Err(CrewError::CrewDefinition(format!(
                    "duplicate agent '{}'",
                    agent.key
                )));
            }
        }

        let mut seen_tasks: HashSet<&str> = HashSet::new();
        for task in &self.tasks {
            if !agent_keys.contains(task.agent.as_str()) {
                return Err(CrewError::CrewDefinition(format!(
                    "task '{}' references unknown agent '{}'",
                    task.key, task.agent
                )));
            }

            for dependency in &task.context {
                if !seen_tasks.contains(dependency.as_str()) {
                    return Err(CrewError::CrewDefinition(format!(
                        "task '{}' uses context '{}' which does not run before it",
                        task.key, dependency
                    )));
                }
            }

            if let Some(bounds) = &task.validator {
                bounds.check()?;
            }

            if !seen_tasks.insert(task.key.as_str()) {
                return Err(CrewError::CrewDefinition(format!(
                    "duplicate task '{}'",
                    task.key
                )));
            }
        }

        Ok(())
    }

    fn merge_agents(&mut self, agents: &Yaml) -> Result<()> {
        let Yaml::Hash(entries) = agents else {
            return Ok(());
        };

        for (key, fields) in entries {
            let key = key
                .as_str()
                .ok_or_else(|| CrewError::CrewDefinition("agent keys must be strings".to_string()))?;

            match self.agents.iter_mut().find(|agent| agent.key == key) {
                Some(existing) => apply_agent_fields(existing, fields)?,
                None => {
                    let mut agent = AgentSpec::new(
                        key,
                        required_str(fields, "role", key)?,
                        required_str(fields, "goal", key)?,
                        required_str(fields, "backstory", key)?,
                    );
                    apply_agent_fields(&mut agent, fields)?;
                    self.agents.push(agent);
                }
            }
        }

        Ok(())
    }

    fn replace_tasks(&mut self, entries: &[Yaml], bounds: ChapterBounds) -> Result<()> {
        let builtin = builtin_tasks(bounds);
        let mut tasks = Vec::with_capacity(entries.len());

        for entry in entries {
            let key = required_str(entry, "key", "task")?;

            let mut task = match builtin.iter().find(|task| task.key == key) {
                Some(base) => base.clone(),
                None => TaskSpec::new(
                    key,
                    required_str(entry, "agent", key)?,
                    required_str(entry, "description", key)?,
                    required_str(entry, "expected_output", key)?,
                ),
            };

            if let Some(description) = entry["description"].as_str() {
                task.description = description.to_string();
            }
            if let Some(expected) = entry["expected_output"].as_str() {
                task.expected_output = expected.to_string();
            }
            if let Some(agent) = entry["agent"].as_str() {
                task.agent = agent.to_string();
            }
            if let Some(context) = string_list(&entry["context"], key, "context")? {
                task.context = context;
            }
            if let Some(validate) = entry["validate_chapters"].as_bool() {
                task.validator = validate.then_some(bounds);
            }

            tasks.push(task);
        }

        self.tasks = tasks;
        Ok(())
    }
}

const AGENTS_KEY: &str = "agents";
const TASKS_KEY: &str = "tasks";

fn apply_agent_fields(agent: &mut AgentSpec, fields: &Yaml) -> Result<()> {
    if let Some(role) = fields["role"].as_str() {
        agent.role = role.to_string();
    }
    if let Some(goal) = fields["goal"].as_str() {
        agent.goal = goal.to_string();
    }
    if let Some(backstory) = fields["backstory"].as_str() {
        agent.backstory = backstory.to_string();
    }
    if let Some(allow) = fields["allow_delegation"].as_bool() {
        agent.allow_delegation = allow;
    }
    if let Some(tools) = string_list(&fields["tools"], &agent.key, "tools")? {
        agent.tools = tools
            .iter()
            .map(|name| name.parse::<Tool>())
            .collect::<Result<Vec<_>>>()?;
    }
    Ok(())
}

fn required_str<'a>(node: &'a Yaml, field: &str, owner: &str) -> Result<&'a str> {
    node[field].as_str().ok_or_else(|| {
        CrewError::CrewDefinition(format!("'{}' is missing required field '{}'", owner, field))
    })
}

fn string_list(node: &Yaml, owner: &str, field: &str) -> Result<Option<Vec<String>>> {
    match node {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    CrewError::CrewDefinition(format!(
                        "'{}' has a non-string entry in '{}'",
                        owner, field
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        _ => Err(CrewError::CrewDefinition(format!(
            "'{}' field '{}' must be a list",
            owner, field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::task::{CREATE_OUTLINE, DRAFT_CHAPTERS, GENERATE_IDEAS};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_is_valid() {
        let definition = CrewDefinition::builtin(ChapterBounds::default());
        assert!(definition.validate().is_ok());
        assert_eq!(definition.agents.len(), 5);
        assert_eq!(definition.tasks.len(), 5);
    }

    #[test]
    fn test_empty_yaml_keeps_builtin() {
        let bounds = ChapterBounds::default();
        let definition = CrewDefinition::from_yaml("", bounds).unwrap();
        assert_eq!(definition, CrewDefinition::builtin(bounds));
    }

    #[test]
    fn test_agent_override_merges_fields() {
        let yaml = "agents:\n  editor:\n    backstory: You are a strict copy editor.\n    tools: [web_search]\n";
        let definition = CrewDefinition::from_yaml(yaml, ChapterBounds::default()).unwrap();
        let editor = definition.agent("editor").unwrap();
        assert_eq!(editor.role, "Editor/Polisher");
        assert_eq!(editor.backstory, "You are a strict copy editor.");
        assert!(editor.has_tool(Tool::WebSearch));
    }

    #[test]
    fn test_task_list_replaces_order_and_inherits() {
        let yaml = r#"
agents:
  reviewer:
    role: Technical Reviewer
    goal: Check technical accuracy
    backstory: You are a senior frontend engineer.
tasks:
  - key: generate_ideas
  - key: create_outline
  - key: draft_chapters
  - key: review
    agent: reviewer
    description: Review the drafts for technical errors.
    expected_output: A list of corrections.
    context: [draft_chapters]
"#;
        let definition = CrewDefinition::from_yaml(yaml, ChapterBounds::default()).unwrap();
        let keys: Vec<&str> = definition.tasks.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec![GENERATE_IDEAS, CREATE_OUTLINE, DRAFT_CHAPTERS, "review"]);
        assert!(definition.tasks[2].validator.is_some());
        assert_eq!(definition.tasks[1].context, vec![GENERATE_IDEAS.to_string()]);
        assert_eq!(definition.agent("reviewer").unwrap().role, "Technical Reviewer");
    }

    #[test]
    fn test_validate_chapters_flag() {
        let yaml = "tasks:\n  - key: generate_ideas\n  - key: draft_chapters\n    context: [generate_ideas]\n    validate_chapters: false\n";
        let definition = CrewDefinition::from_yaml(yaml, ChapterBounds::default()).unwrap();
        assert!(definition.tasks[1].validator.is_none());
    }

    #[test]
    fn test_unknown_agent_rejected() {
        let yaml = "tasks:\n  - key: generate_ideas\n    agent: ghostwriter\n";
        let err = CrewDefinition::from_yaml(yaml, ChapterBounds::default()).unwrap_err();
        assert!(err.to_string().contains("ghostwriter"));
    }

    #[test]
    fn test_context_must_run_earlier() {
        let yaml = "tasks:\n  - key: create_outline\n  - key: generate_ideas\n";
        let err = CrewDefinition::from_yaml(yaml, ChapterBounds::default()).unwrap_err();
        assert!(err.to_string().contains("does not run before it"));
    }

    #[test]
    fn test_new_task_requires_fields() {
        let yaml = "tasks:\n  - key: appendix\n    agent: editor\n";
        assert!(CrewDefinition::from_yaml(yaml, ChapterBounds::default()).is_err());
    }

    #[test]
    fn test_empty_task_list_rejected() {
        assert!(CrewDefinition::from_yaml("tasks: []\n", ChapterBounds::default()).is_err());
    }

    #[test]
    fn test_unknown_tool_rejected() {
        let yaml = "agents:\n  editor:\n    tools: [calculator]\n";
        assert!(CrewDefinition::from_yaml(yaml, ChapterBounds::default()).is_err());
    }

    #[test]
    fn test_example_crew_file_resolves() {
        let yaml = include_str!("../../config/crew.example.yaml");
        let definition = CrewDefinition::from_yaml(yaml, ChapterBounds::default()).unwrap();
        assert_eq!(definition.tasks.len(), 6);
        assert_eq!(definition.tasks[4].context, vec!["review_drafts".to_string()]);
        assert_eq!(definition.agents.len(), 6);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "agents:\n  formatter:\n    goal: Produce a Markdown book").unwrap();
        let definition = CrewDefinition::load(file.path(), ChapterBounds::default()).unwrap();
        assert_eq!(
            definition.agent("formatter").unwrap().goal,
            "Produce a Markdown book"
        );
    }
}
