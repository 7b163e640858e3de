//! Presentation: credential prompts and terminal rendering

pub mod prompt;
pub mod render;
