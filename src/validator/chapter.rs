// file: src/validator/chapter.rs
// description: chapter count and per-chapter word count checks for drafted text
// reference: chapter drafting guardrail

use crate::error::{CrewError, Result};
use crate::validator::patterns::{CHAPTER_HEADING, CHAPTER_TOKEN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive bounds a chapter draft has to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChapterBounds {
    pub min_chapters: usize,
    pub max_chapters: usize,
    pub min_words: usize,
    pub max_words: usize,
}

impl ChapterBounds {
    pub fn new(min_chapters: usize, max_chapters: usize, min_words: usize, max_words: usize) -> Self {
        Self {
            min_chapters,
            max_chapters,
            min_words,
            max_words,
        }
    }

    pub fn check(&self) -> Result<()> {
        if self.min_chapters > self.max_chapters {
            return Err(CrewError::Config(format!(
                "min_chapters ({}) must not exceed max_chapters ({})",
                self.min_chapters, self.max_chapters
            )));
        }

        if self.min_words > self.max_words {
            return Err(CrewError::Config(format!(
                "min_words ({}) must not exceed max_words ({})",
                self.min_words, self.max_words
            )));
        }

        Ok(())
    }

    fn chapters_in_range(&self, count: usize) -> bool {
        count >= self.min_chapters && count <= self.max_chapters
    }

    fn words_in_range(&self, count: usize) -> bool {
        count >= self.min_words && count <= self.max_words
    }
}

impl Default for ChapterBounds {
    fn default() -> Self {
        Self::new(8, 10, 300, 400)
    }
}

/// How a draft is cut into chapter fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Cut on every occurrence of `Chapter`, including mentions inside prose.
    #[default]
    Substring,
    /// Cut only where a line starts with `Chapter <N>`, optionally behind `#` marks.
    LineAnchored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    ChapterCount {
        found: usize,
        min: usize,
        max: usize,
    },
    WordCount {
        index: usize,
        words: usize,
        min: usize,
        max: usize,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ChapterCount { found, min, max } => write!(
                f,
                "Found {} chapters. Please rewrite with {}-{} chapters.",
                found, min, max
            ),
            Rejection::WordCount {
                index,
                words,
                min,
                max,
            } => write!(
                f,
                "Chapter {} has {} words. Please rewrite with {}-{} words.",
                index, words, min, max
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<'a> {
    Accepted(&'a str),
    Rejected(Rejection),
}

impl Verdict<'_> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }

    /// The accepted text unchanged, or the rejection message.
    pub fn into_message(self) -> String {
        match self {
            Verdict::Accepted(text) => text.to_string(),
            Verdict::Rejected(rejection) => rejection.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChapterValidator {
    bounds: ChapterBounds,
    mode: SplitMode,
}

impl ChapterValidator {
    pub fn new(bounds: ChapterBounds) -> Self {
        Self {
            bounds,
            mode: SplitMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn fragments<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self.mode {
            SplitMode::Substring => text
                .split(CHAPTER_TOKEN)
                .filter(|fragment| !fragment.trim().is_empty())
                .collect(),
            SplitMode::LineAnchored => split_line_anchored(text),
        }
    }

    /// Checks the chapter count first; word counts are only looked at when it
    /// passes, and the first offending chapter ends the check.
    pub fn validate<'a>(&self, text: &'a str) -> Verdict<'a> {
        let fragments = self.fragments(text);
        let bounds = &self.bounds;

        if !bounds.chapters_in_range(fragments.len()) {
            return Verdict::Rejected(Rejection::ChapterCount {
                found: fragments.len(),
                min: bounds.min_chapters,
                max: bounds.max_chapters,
            });
        }

        for (index, fragment) in fragments.iter().enumerate() {
            let words = fragment.split_whitespace().count();
            if !bounds.words_in_range(words) {
                return Verdict::Rejected(Rejection::WordCount {
                    index: index + 1,
                    words,
                    min: bounds.min_words,
                    max: bounds.max_words,
                });
            }
        }

        Verdict::Accepted(text)
    }
}

fn split_line_anchored(text: &str) -> Vec<&str> {
    let starts: Vec<(usize, usize)> = CHAPTER_HEADING
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let keyword = caps.get(1)?;
            Some((whole.start(), keyword.end()))
        })
        .collect();

    let mut fragments = Vec::with_capacity(starts.len() + 1);

    let preamble_end = starts.first().map(|(start, _)| *start).unwrap_or(text.len());
    fragments.push(&text[..preamble_end]);

    for (i, (_, body_start)) in starts.iter().enumerate() {
        let body_end = starts
            .get(i + 1)
            .map(|(next_start, _)| *next_start)
            .unwrap_or(text.len());
        fragments.push(&text[*body_start..body_end]);
    }

    fragments
        .into_iter()
        .filter(|fragment| !fragment.trim().is_empty())
        .collect()
}

/// Flat-string form of the check: returns `text` unchanged when it conforms,
/// otherwise the rejection message.
pub fn validate_chapters(
    text: &str,
    min_chapters: usize,
    max_chapters: usize,
    min_words: usize,
    max_words: usize,
) -> String {
    let bounds = ChapterBounds::new(min_chapters, max_chapters, min_words, max_words);
    ChapterValidator::new(bounds).validate(text).into_message()
}
