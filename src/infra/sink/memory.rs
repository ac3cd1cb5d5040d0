//! In-memory sink for development/testing.

use crate::core::{OutputSink, OutputToken};

/// Collects every emitted token.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    tokens: Vec<OutputToken>,
}

impl InMemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens in emission order.
    #[must_use]
    pub fn tokens(&self) -> &[OutputToken] {
        &self.tokens
    }

    /// Number of `error` tokens seen.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, OutputToken::Error))
            .count()
    }

    /// Drop everything collected so far.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Render as text: tokens on a line joined by single spaces, a
    /// boundary starting a new line, no trailing separator.
    #[must_use]
    pub fn trace(&self) -> String {
        let mut lines: Vec<Vec<&str>> = vec![Vec::new()];
        for token in &self.tokens {
            let word = match token {
                OutputToken::Process(id) => id.as_str(),
                OutputToken::Error => "error",
                OutputToken::Boundary => {
                    lines.push(Vec::new());
                    continue;
                }
            };
            if let Some(line) = lines.last_mut() {
                line.push(word);
            }
        }
        lines
            .iter()
            .map(|line| line.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputSink for InMemorySink {
    fn emit(&mut self, token: OutputToken) {
        self.tokens.push(token);
    }
}
