//! Infrastructure adapters for command streams and trace output.

pub mod sink;
pub mod source;
pub use sink::InMemorySink;
pub use sink::TraceWriter;
pub use source::JsonLinesSource;
pub use source::TokenStreamSource;
pub use source::VecCommandSource;
