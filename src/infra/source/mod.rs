//! Command sources.

pub mod jsonl;
pub mod memory;
pub mod text;

pub use jsonl::JsonLinesSource;
pub use memory::VecCommandSource;
pub use text::TokenStreamSource;
