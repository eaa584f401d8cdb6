// file: src/crew/progress.rs
// description: progress tracking and statistics reporting for crew execution
// reference: uses indicatif for progress bars and tracks run metrics

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrewStats {
    pub tasks_completed: usize,
    pub attempts: usize,
    pub validation_retries: usize,
    pub words_produced: usize,
    pub duration_secs: u64,
}

impl CrewStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn words_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.words_produced as f64 / self.duration_secs as f64
    }

    /// Share of LLM calls that were re-prompts after a rejected draft.
    pub fn retry_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        (self.validation_retries as f64 / self.attempts as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    tasks_completed: AtomicUsize,
    attempts: AtomicUsize,
    validation_retries: AtomicUsize,
    words_produced: AtomicUsize,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn with_color(total_tasks: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();
        Self::build(multi_progress, total_tasks, colored)
    }

    /// Tracker that keeps counts but draws nothing.
    pub fn hidden(total_tasks: usize) -> Self {
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        Self::build(multi_progress, total_tasks, false)
    }

    fn build(multi_progress: MultiProgress, total_tasks: usize, colored: bool) -> Self {
        let main_bar = create_progress_bar(&multi_progress, total_tasks as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            tasks_completed: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
            validation_retries: AtomicUsize::new(0),
            words_produced: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn start_task(&self, task_key: &str, role: &str) {
        self.main_bar.set_message(format!("{} ({})", task_key, role));
    }

    pub fn inc_attempts(&self) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn inc_validation_retries(&self) {
        self.validation_retries.fetch_add(1, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn complete_task(&self, words: usize) {
        self.tasks_completed.fetch_add(1, Ordering::SeqCst);
        self.words_produced.fetch_add(words, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.detail_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Crew finished");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> CrewStats {
        CrewStats {
            tasks_completed: self.tasks_completed.load(Ordering::SeqCst),
            attempts: self.attempts.load(Ordering::SeqCst),
            validation_retries: self.validation_retries.load(Ordering::SeqCst),
            words_produced: self.words_produced.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let calls = self.attempts.load(Ordering::SeqCst);
        let retries = self.validation_retries.load(Ordering::SeqCst);
        let words = self.words_produced.load(Ordering::SeqCst);

        self.detail_bar.set_message(format!(
            "LLM calls: {} | Retries: {} | Words: {}",
            calls, retries, words
        ));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}",
            "█▓▒░",
        )
    } else {
        ("{spinner} [{elapsed_precise}] [{bar:30}] {pos}/{len} {msg}", "=>-")
    };

    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        bar.set_style(style.progress_chars(chars));
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    if let Ok(style) = ProgressStyle::default_bar().template("{msg}") {
        bar.set_style(style);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crew_stats_calculations() {
        let stats = CrewStats {
            tasks_completed: 5,
            attempts: 8,
            validation_retries: 2,
            words_produced: 12_000,
            duration_secs: 60,
        };

        assert_eq!(stats.words_per_second(), 200.0);
        assert_eq!(stats.retry_rate(), 25.0);
    }

    #[test]
    fn test_crew_stats_zero_values() {
        let stats = CrewStats::new();
        assert_eq!(stats.words_per_second(), 0.0);
        assert_eq!(stats.retry_rate(), 0.0);
    }

    #[test]
    fn test_tracker_counts() {
        let tracker = ProgressTracker::hidden(5);

        tracker.inc_attempts();
        tracker.inc_attempts();
        tracker.inc_validation_retries();
        tracker.complete_task(350);

        let stats = tracker.get_stats();
        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.validation_retries, 1);
        assert_eq!(stats.words_produced, 350);
    }
}
