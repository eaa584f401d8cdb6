// file: src/utils/validation.rs
// description: input validation for topics, endpoints and file paths
// reference: input validation patterns

use crate::config::Config;
use crate::error::{CrewError, Result};
use std::path::Path;

const MAX_TOPIC_CHARS: usize = 300;

pub struct Validator;

impl Validator {
    pub fn validate_topic(topic: &str) -> Result<()> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(CrewError::Validation("Topic is empty".to_string()));
        }

        if topic.chars().count() > MAX_TOPIC_CHARS {
            return Err(CrewError::Validation(format!(
                "Topic too long (max {} characters)",
                MAX_TOPIC_CHARS
            )));
        }

        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CrewError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_markdown_extension(path: &Path) -> Result<()> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") => Ok(()),
            _ => Err(CrewError::Validation(format!(
                "Output is not a markdown file: {}",
                path.display()
            ))),
        }
    }

    pub fn validate_output_path(path: &Path) -> Result<()> {
        if path.is_dir() {
            return Err(CrewError::Validation(format!(
                "Output path is a directory: {}",
                path.display()
            )));
        }

        Self::validate_markdown_extension(path)
    }

    pub fn validate_input_file(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(CrewError::Validation(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(CrewError::Validation(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn validate_content_not_empty(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(CrewError::Validation("Content is empty".to_string()));
        }
        Ok(())
    }

    /// Checks run inputs that config validation does not cover.
    pub fn validate_run(config: &Config) -> Result<()> {
        Self::validate_topic(&config.pipeline.topic)?;
        Self::validate_output_path(&config.output.path)?;
        if let Some(base_url) = &config.model.base_url {
            Self::validate_url(base_url)?;
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_validate_topic() {
        assert!(Validator::validate_topic("Landing pages").is_ok());
        assert!(Validator::validate_topic("   ").is_err());
        assert!(Validator::validate_topic(&"x".repeat(301)).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://example.com").is_ok());
        assert!(Validator::validate_url("http://localhost:8080/v1").is_ok());
        assert!(Validator::validate_url("example.com").is_err());
    }

    #[test]
    fn test_validate_output_path() {
        let temp = TempDir::new().unwrap();
        assert!(Validator::validate_output_path(&temp.path().join("book.md")).is_ok());
        assert!(Validator::validate_output_path(&temp.path().join("book.txt")).is_err());
        assert!(Validator::validate_output_path(temp.path()).is_err());
    }

    #[test]
    fn test_validate_input_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("draft.txt");
        fs::write(&file, "Chapter 1").unwrap();

        assert!(Validator::validate_input_file(&file).is_ok());
        assert!(Validator::validate_input_file(temp.path()).is_err());
        assert!(Validator::validate_input_file(Path::new("/nonexistent/draft.txt")).is_err());
    }

    #[test]
    fn test_validate_run_checks_base_url() {
        let mut config = Config::default();
        assert!(Validator::validate_run(&config).is_ok());

        config.model.base_url = Some("localhost".to_string());
        assert!(Validator::validate_run(&config).is_err());

        config.model.base_url = None;
        config.output.path = PathBuf::from("book.html");
        assert!(Validator::validate_run(&config).is_err());
    }

    #[test]
    fn test_validate_content_not_empty() {
        assert!(Validator::validate_content_not_empty("Chapter 1\nText").is_ok());
        assert!(Validator::validate_content_not_empty("").is_err());
        assert!(Validator::validate_content_not_empty(" \n\t ").is_err());
    }

    #[test]
    fn test_truncate_text_respects_char_boundaries() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(Validator::truncate_text("héllo wörld", 5), "héllo...");
    }
}
