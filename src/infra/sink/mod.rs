//! Output sinks.

pub mod memory;
pub mod writer;

pub use memory::InMemorySink;
pub use writer::TraceWriter;
