// file: src/utils/telemetry.rs
// description: preflight health report and operation timing for crew runs
// reference: Production observability best practices

use crate::config::Config;
use crate::crew::CrewDefinition;
use crate::llm::ModelId;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn icon(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "✓",
            HealthStatus::Degraded => "⚠",
            HealthStatus::Unhealthy => "✗",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub component: String,
    pub status: HealthStatus,
    pub message: Option<String>,
}

impl HealthCheck {
    pub fn healthy(component: &str, message: impl Into<String>) -> Self {
        Self {
            component: component.to_string(),
            status: HealthStatus::Healthy,
            message: Some(message.into()),
        }
    }

    pub fn degraded(component: &str, message: impl Into<String>) -> Self {
        Self {
            component: component.to_string(),
            status: HealthStatus::Degraded,
            message: Some(message.into()),
        }
    }

    pub fn unhealthy(component: &str, message: impl Into<String>) -> Self {
        Self {
            component: component.to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub version: String,
}

impl HealthReport {
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        let overall_status = if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            overall_status,
            checks,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// What a `run` with this configuration would trip over, without any network calls.
    pub fn preflight(config: &Config) -> Self {
        let mut checks = Vec::new();

        match config.validate() {
            Ok(()) => checks.push(HealthCheck::healthy("config", "configuration is valid")),
            Err(e) => checks.push(HealthCheck::unhealthy("config", e.to_string())),
        }

        match ModelId::parse(&config.model.name) {
            Ok(id) if config.model.api_key.is_some() => checks.push(HealthCheck::healthy(
                "model",
                format!("{:?} model {}", id.provider, id.model),
            )),
            Ok(id) => checks.push(HealthCheck::unhealthy(
                "model",
                format!("no API key; set {}", id.provider.api_key_env()),
            )),
            Err(e) => checks.push(HealthCheck::unhealthy("model", e.to_string())),
        }

        if !config.search.enabled {
            checks.push(HealthCheck::healthy("search", "web search disabled"));
        } else if config.search.api_key.is_some() {
            checks.push(HealthCheck::healthy("search", "Serper key present"));
        } else {
            checks.push(HealthCheck::degraded(
                "search",
                "SERPER_API_KEY not set; ideas will be generated without web search",
            ));
        }

        let bounds = config.validation.bounds();
        let definition = match &config.pipeline.crew_file {
            Some(path) => CrewDefinition::load(path, bounds),
            None => Ok(CrewDefinition::builtin(bounds)),
        };
        match definition {
            Ok(definition) => checks.push(HealthCheck::healthy(
                "crew",
                format!(
                    "{} agents, {} tasks",
                    definition.agents.len(),
                    definition.tasks.len()
                ),
            )),
            Err(e) => checks.push(HealthCheck::unhealthy("crew", e.to_string())),
        }

        Self::new(checks)
    }

    pub fn is_healthy(&self) -> bool {
        self.overall_status != HealthStatus::Unhealthy
    }

    pub fn format(&self) -> String {
        let mut output = format!(
            "{} Crew Health: {:?}\nVersion: {}\n\n",
            self.overall_status.icon(),
            self.overall_status,
            self.version,
        );

        for check in &self.checks {
            output.push_str(&format!(
                "{} {} ({:?})",
                check.status.icon(),
                check.component,
                check.status
            ));

            if let Some(ref msg) = check.message {
                output.push_str(&format!("\n  {}", msg));
            }

            output.push('\n');
        }

        output
    }
}

pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting operation: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Completed operation: {} in {:.2}s",
            self.operation,
            elapsed.as_secs_f64()
        );
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        let mut config = Config::default();
        config.model.api_key = Some("test-key".to_string());
        config.search.api_key = Some("serper-key".to_string());
        config
    }

    #[test]
    fn test_overall_status_is_worst_check() {
        let report = HealthReport::new(vec![
            HealthCheck::healthy("config", "ok"),
            HealthCheck::degraded("search", "no key"),
        ]);
        assert_eq!(report.overall_status, HealthStatus::Degraded);
        assert!(report.is_healthy());
    }

    #[test]
    fn test_preflight_fully_configured() {
        let report = HealthReport::preflight(&configured());
        assert_eq!(report.overall_status, HealthStatus::Healthy);
        assert_eq!(report.checks.len(), 4);
        assert!(report.format().contains("5 agents, 5 tasks"));
    }

    #[test]
    fn test_preflight_without_model_key() {
        let mut config = configured();
        config.model.api_key = None;
        let report = HealthReport::preflight(&config);
        assert_eq!(report.overall_status, HealthStatus::Unhealthy);
        assert!(report.format().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_preflight_without_search_key_is_degraded() {
        let mut config = configured();
        config.search.api_key = None;
        let report = HealthReport::preflight(&config);
        assert_eq!(report.overall_status, HealthStatus::Degraded);
    }

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::new("test");
        std::thread::sleep(Duration::from_millis(10));
        let elapsed = timer.finish();
        assert!(elapsed >= Duration::from_millis(10));
    }
}
