// file: src/manuscript/markdown.rs
// description: chapter structure extraction from the formatted manuscript with pulldown-cmark
// reference: https://docs.rs/pulldown-cmark

use crate::validator::patterns::MANUSCRIPT_CHAPTER;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    pub level: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterHeading {
    pub number: u32,
    pub title: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedManuscript {
    pub headings: Vec<Heading>,
    pub chapters: Vec<ChapterHeading>,
    pub word_count: usize,
}

pub struct ManuscriptParser;

impl ManuscriptParser {
    pub fn new() -> Self {
        Self
    }

    /// Chapters are H1 headings of the form `Chapter N: Title`; every word of
    /// body text up to the next such heading counts toward that chapter.
    pub fn parse(&self, content: &str) -> ParsedManuscript {
        let mut parsed = ParsedManuscript::default();
        let mut current_heading: Option<(u32, String)> = None;
        let mut in_code_block = false;

        for event in Parser::new(content) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    current_heading = Some((heading_level(level), String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = current_heading.take() {
                        let text = text.trim().to_string();
                        if level == 1
                            && let Some(chapter) = parse_chapter_heading(&text)
                        {
                            parsed.chapters.push(chapter);
                        }
                        parsed.headings.push(Heading { level, text });
                    }
                }
                Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
                Event::End(TagEnd::CodeBlock) => in_code_block = false,
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, ref mut heading_text)) = current_heading {
                        heading_text.push_str(&text);
                        continue;
                    }

                    if in_code_block {
                        continue;
                    }

                    let words = text.split_whitespace().count();
                    parsed.word_count += words;
                    if let Some(chapter) = parsed.chapters.last_mut() {
                        chapter.word_count += words;
                    }
                }
                _ => {}
            }
        }

        parsed
    }
}

impl Default for ManuscriptParser {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_level(level: HeadingLevel) -> u32 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn parse_chapter_heading(text: &str) -> Option<ChapterHeading> {
    let caps = MANUSCRIPT_CHAPTER.captures(text)?;
    let number = caps.get(1)?.as_str().parse().ok()?;
    let title = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

    Some(ChapterHeading {
        number,
        title: title.to_string(),
        word_count: 0,
    })
}
