// file: src/manuscript/export.rs
// description: writes the manuscript and an optional json run summary to disk

use crate::crew::{CrewOutput, CrewStats};
use crate::error::{CrewError, Result};
use crate::manuscript::document::Manuscript;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct TaskSummary {
    pub task: String,
    pub agent_role: String,
    pub attempts: usize,
    pub words: usize,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub manuscript_path: PathBuf,
    pub manuscript: Manuscript,
    pub tasks: Vec<TaskSummary>,
    pub stats: CrewStats,
}

impl RunSummary {
    pub fn new(
        model: &str,
        started_at: DateTime<Utc>,
        manuscript_path: &Path,
        manuscript: Manuscript,
        output: &CrewOutput,
    ) -> Self {
        let tasks = output
            .outputs
            .iter()
            .map(|task| TaskSummary {
                task: task.task.clone(),
                agent_role: task.agent_role.clone(),
                attempts: task.attempts,
                words: task.raw.split_whitespace().count(),
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            model: model.to_string(),
            started_at,
            finished_at: Utc::now(),
            manuscript_path: manuscript_path.to_path_buf(),
            manuscript,
            tasks,
            stats: output.stats.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManuscriptWriter {
    path: PathBuf,
}

impl ManuscriptWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `book.md` -> `book.summary.json`
    pub fn summary_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("book");
        self.path.with_file_name(format!("{}.summary.json", stem))
    }

    pub fn write_manuscript(&self, manuscript: &Manuscript) -> Result<()> {
        create_parent(&self.path)?;
        fs::write(&self.path, &manuscript.content).map_err(|source| CrewError::FileOperation {
            path: self.path.clone(),
            source,
        })?;

        info!(
            "Wrote manuscript ({} chapters, {} words) to {}",
            manuscript.chapter_count(),
            manuscript.word_count,
            self.path.display()
        );
        Ok(())
    }

    pub fn write_summary(&self, summary: &RunSummary, pretty: bool) -> Result<PathBuf> {
        let path = self.summary_path();
        create_parent(&path)?;

        let json = if pretty {
            serde_json::to_string_pretty(summary)?
        } else {
            serde_json::to_string(summary)?
        };

        fs::write(&path, json).map_err(|source| CrewError::FileOperation {
            path: path.clone(),
            source,
        })?;

        info!("Wrote run summary to {}", path.display());
        Ok(path)
    }
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| CrewError::FileOperation {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
