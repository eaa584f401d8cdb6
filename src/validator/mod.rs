// file: src/validator/mod.rs
// description: chapter draft validation module exports
// reference: internal module structure

pub mod chapter;
pub mod patterns;

pub use chapter::{
    ChapterBounds, ChapterValidator, Rejection, SplitMode, Verdict, validate_chapters,
};
