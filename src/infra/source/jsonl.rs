//! JSON-lines command stream.
//!
//! Each non-blank line holds one serialized [`Command`], for example
//! `{"op":"create","pid":"A","priority":1}`. Lines that fail to decode are
//! logged and skipped, the same way unknown words are skipped in text input.

use std::io::BufRead;

use crate::core::{Command, CommandSource};

/// Reads one JSON-encoded command per line.
pub struct JsonLinesSource<R> {
    reader: R,
    line_no: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    /// Wrap a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self { reader, line_no: 0 }
    }
}

impl<R: BufRead> CommandSource for JsonLinesSource<R> {
    fn next_command(&mut self) -> Option<Command> {
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("command stream read failed: {}", e);
                    return None;
                }
            }
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str(trimmed) {
                Ok(command) => return Some(command),
                Err(e) => tracing::warn!("line {}: skipping undecodable command: {}", self.line_no, e),
            }
        }
    }
}
