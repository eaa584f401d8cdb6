// file: src/validator/patterns.rs
// description: compiled regex patterns for chapter heading detection
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

/// The literal token the baseline splitter cuts on.
pub const CHAPTER_TOKEN: &str = "Chapter";

lazy_static! {
    // `Chapter 3`, `## Chapter 12: Title`, `Chapter IV` at the start of a line.
    // Group 1 covers the keyword so fragments begin right after it.
    pub static ref CHAPTER_HEADING: Regex = Regex::new(
        r"(?m)^[ \t]*(?:#{1,6}[ \t]*)?(Chapter)[ \t]+(?:\d+|[IVXLCDM]+\b)"
    ).expect("CHAPTER_HEADING regex is valid");

    // H1 headings in the formatted manuscript: `# Chapter 1: Title`
    pub static ref MANUSCRIPT_CHAPTER: Regex = Regex::new(
        r"^Chapter[ \t]+(\d+)[ \t]*[:.\-–—]?[ \t]*(.*)$"
    ).expect("MANUSCRIPT_CHAPTER regex is valid");
}
