//! Trace writer producing the plain-text wire format.

use std::io::{self, Write};

use crate::config::SimulatorConfig;
use crate::core::{OutputSink, OutputToken};

/// Writes tokens to any [`Write`], each followed by the separator; a
/// boundary becomes a newline.
///
/// The first I/O failure is latched: later tokens are discarded and the
/// error is handed back by [`finish`](Self::finish).
pub struct TraceWriter<W: Write> {
    writer: W,
    separator: String,
    error_token: String,
    failure: Option<io::Error>,
}

impl<W: Write> TraceWriter<W> {
    /// Writer with the default `error` token and single-space separator.
    pub fn new(writer: W) -> Self {
        Self::from_config(writer, &SimulatorConfig::default())
    }

    /// Writer using the tokens from `config`.
    pub fn from_config(writer: W, config: &SimulatorConfig) -> Self {
        Self {
            writer,
            separator: config.separator.clone(),
            error_token: config.error_token.clone(),
            failure: None,
        }
    }

    /// Flush and return the inner writer, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.failure.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_token(&mut self, token: &OutputToken) -> io::Result<()> {
        match token {
            OutputToken::Process(id) => {
                self.writer.write_all(id.as_bytes())?;
                self.writer.write_all(self.separator.as_bytes())
            }
            OutputToken::Error => {
                self.writer.write_all(self.error_token.as_bytes())?;
                self.writer.write_all(self.separator.as_bytes())
            }
            OutputToken::Boundary => self.writer.write_all(b"\n"),
        }
    }
}

impl<W: Write> OutputSink for TraceWriter<W> {
    fn emit(&mut self, token: OutputToken) {
        if self.failure.is_some() {
            return;
        }
        if let Err(e) = self.write_token(&token) {
            tracing::error!("trace write failed: {}", e);
            self.failure = Some(e);
        }
    }
}
