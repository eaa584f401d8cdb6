// file: src/manuscript/document.rs
// description: final manuscript model with content hash and chapter structure
// reference: internal data structures

use crate::manuscript::markdown::{ChapterHeading, ManuscriptParser};
use crate::manuscript::normalizer::ManuscriptNormalizer;
use crate::validator::patterns::MANUSCRIPT_CHAPTER;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize)]
pub struct Manuscript {
    pub topic: String,
    pub title: Option<String>,
    #[serde(skip)]
    pub content: String,
    pub content_hash: String,
    pub word_count: usize,
    pub chapters: Vec<ChapterHeading>,
    pub created_at: DateTime<Utc>,
}

impl Manuscript {
    /// Builds the manuscript from the formatter's raw answer.
    pub fn from_formatter_output(topic: &str, raw: &str) -> Self {
        let content = ManuscriptNormalizer::new().normalize(raw);
        let parsed = ManuscriptParser::new().parse(&content);

        // The book title is the first H1 that is not itself a chapter.
        let title = parsed
            .headings
            .iter()
            .find(|heading| heading.level == 1 && !MANUSCRIPT_CHAPTER.is_match(&heading.text))
            .map(|heading| heading.text.clone());

        Self {
            topic: topic.to_string(),
            title,
            content_hash: Self::compute_hash(&content),
            word_count: parsed.word_count,
            chapters: parsed.chapters,
            created_at: Utc::now(),
            content,
        }
    }

    fn compute_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manuscript_from_fenced_output() {
        let raw = "```markdown\n#Chapter 1: Intro\n\nHello there reader.\n\n# Chapter 2: Next\n\nMore words here.\n```";
        let manuscript = Manuscript::from_formatter_output("Landing Pages", raw);

        assert!(manuscript.content.starts_with("# Chapter 1: Intro"));
        assert_eq!(manuscript.chapter_count(), 2);
        assert_eq!(manuscript.word_count, 6);
        assert_eq!(manuscript.content_hash.len(), 64);
        assert_eq!(manuscript.title, None);
    }

    #[test]
    fn test_title_from_first_non_chapter_heading() {
        let raw = "# Mastering Landing Pages\n\nPreface.\n\n# Chapter 1: Hero\n\nBody text.\n";
        let manuscript = Manuscript::from_formatter_output("Landing Pages", raw);

        assert_eq!(manuscript.title.as_deref(), Some("Mastering Landing Pages"));
        assert_eq!(manuscript.chapter_count(), 1);
    }

    #[test]
    fn test_fenced_output_with_code_samples() {
        let raw = "```markdown\n# Chapter 1: Hero\n\nA hero section.\n\n```html\n<button>Go</button>\n```\n\n# Chapter 2: CTA\n\nCall to action.\n```";
        let manuscript = Manuscript::from_formatter_output("Landing Pages", raw);

        assert!(manuscript.content.starts_with("# Chapter 1: Hero"));
        assert!(manuscript.content.contains("```html\n<button>Go</button>\n```"));
        assert_eq!(manuscript.chapter_count(), 2);
        assert_eq!(manuscript.chapters[1].title, "CTA");
    }

    #[test]
    fn test_hash_consistency() {
        let hash1 = Manuscript::compute_hash("Test content");
        let hash2 = Manuscript::compute_hash("Test content");
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, Manuscript::compute_hash("Other content"));
    }
}
