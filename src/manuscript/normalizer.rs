// file: src/manuscript/normalizer.rs
// description: cleanup of formatter output into a publishable Markdown file
// reference: Markdown specification

use crate::validator::patterns::CHAPTER_TOKEN;

pub struct ManuscriptNormalizer;

impl ManuscriptNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, content: &str) -> String {
        let unwrapped = strip_code_fence(content);
        let headings = self.normalize_headings(unwrapped);
        let mut normalized = self.normalize_line_breaks(&headings);
        normalized.push('\n');
        normalized
    }

    fn normalize_headings(&self, content: &str) -> String {
        let mut in_code_block = false;

        content
            .lines()
            .map(|line| {
                let trimmed = line.trim();
                if trimmed.starts_with("```") {
                    in_code_block = !in_code_block;
                    return line.to_string();
                }

                if in_code_block || !trimmed.starts_with('#') {
                    return line.to_string();
                }

                let level = trimmed.chars().take_while(|&c| c == '#').count();
                let after = trimmed.trim_start_matches('#');
                let text = after.trim();

                // `#1 rule` is prose; only real headings and `#Chapter` are rewritten
                let is_heading = after.starts_with([' ', '\t']) || after.starts_with(CHAPTER_TOKEN);

                if is_heading && !text.is_empty() && level <= 6 {
                    format!("{} {}", "#".repeat(level), text)
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn normalize_line_breaks(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut blank_run = 0;

        for line in content.trim().lines() {
            let line = line.trim_end();
            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
            } else {
                blank_run = 0;
            }

            if !result.is_empty() {
                result.push('\n');
            }
            result.push_str(line);
        }

        result
    }
}

impl Default for ManuscriptNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes one fence wrapping the whole text (```` ```markdown ... ``` ````).
///
/// Code blocks inside the wrapper are kept as long as they are closed before
/// the wrapper's own closing fence.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();

    let Some((opening, rest)) = trimmed.split_once('\n') else {
        return content;
    };
    let Some(info) = opening.trim_end().strip_prefix("```") else {
        return content;
    };
    if info.contains('`') || info.trim().contains(' ') {
        return content;
    }

    let rest = rest.trim_end();
    let Some(body) = rest.strip_suffix("```") else {
        return content;
    };
    if !body.is_empty() && !body.ends_with('\n') {
        return content;
    }

    if inner_fences_balanced(body) {
        body
    } else {
        content
    }
}

/// An inner block opens on any fence line and closes on a bare one.
fn inner_fences_balanced(body: &str) -> bool {
    let mut open = false;

    for line in body.lines() {
        let Some(info) = line.trim().strip_prefix("```") else {
            continue;
        };
        if !open {
            open = true;
        } else if info.trim().is_empty() {
            open = false;
        }
    }

    !open
}
