// file: src/manuscript/mod.rs
// description: manuscript processing module exports
// reference: internal module structure

pub mod document;
pub mod export;
pub mod markdown;
pub mod normalizer;

pub use document::Manuscript;
pub use export::{ManuscriptWriter, RunSummary, TaskSummary};
pub use markdown::{ChapterHeading, Heading, ManuscriptParser, ParsedManuscript};
pub use normalizer::{ManuscriptNormalizer, strip_code_fence};
