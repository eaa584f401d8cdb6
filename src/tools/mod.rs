// file: src/tools/mod.rs
// description: agent tool registry and exports
// reference: internal module structure

pub mod search;

pub use search::{SearchHit, SerperSearch, render_hits};

use crate::error::{CrewError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    WebSearch,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::WebSearch => "web_search",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = CrewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "web_search" | "search" | "serper" => Ok(Tool::WebSearch),
            other => Err(CrewError::CrewDefinition(format!("unknown tool '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_round_trip() {
        assert_eq!("web_search".parse::<Tool>().unwrap(), Tool::WebSearch);
        assert_eq!("serper".parse::<Tool>().unwrap(), Tool::WebSearch);
        assert_eq!(Tool::WebSearch.to_string(), "web_search");
        assert!("calculator".parse::<Tool>().is_err());
    }
}
