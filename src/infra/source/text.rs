//! Whitespace-delimited command stream.

use std::collections::VecDeque;
use std::io::BufRead;

use crate::core::{Command, CommandSource};

/// Lazily tokenizes a text stream into commands.
///
/// Tokens are read one line at a time, so a large input is never held in
/// memory. Unknown words are skipped without output; a command cut short
/// by the end of the stream is dropped.
pub struct TokenStreamSource<R> {
    reader: R,
    pending: VecDeque<String>,
    exhausted: bool,
}

impl<R: BufRead> TokenStreamSource<R> {
    /// Wrap a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    fn next_token(&mut self) -> Option<String> {
        while self.pending.is_empty() {
            if self.exhausted {
                return None;
            }
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => self.exhausted = true,
                Ok(_) => self
                    .pending
                    .extend(line.split_whitespace().map(str::to_string)),
                Err(e) => {
                    tracing::error!("command stream read failed: {}", e);
                    self.exhausted = true;
                }
            }
        }
        self.pending.pop_front()
    }

    fn argument(&mut self, keyword: &str) -> Option<String> {
        let arg = self.next_token();
        if arg.is_none() {
            tracing::warn!("`{}` truncated by end of stream", keyword);
        }
        arg
    }

    fn numeric<T>(keyword: &str, what: &str, raw: &str) -> Result<T, Command>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        raw.parse().map_err(|e| Command::Malformed {
            command: keyword.to_string(),
            reason: format!("{what} `{raw}`: {e}"),
        })
    }
}

impl<R: BufRead> CommandSource for TokenStreamSource<R> {
    fn next_command(&mut self) -> Option<Command> {
        loop {
            let word = self.next_token()?;
            let command = match word.as_str() {
                "exit" => Command::Exit,
                "init" => Command::Init,
                "to" => Command::TimeOut,
                "cr" => {
                    let pid = self.argument(&word)?;
                    let raw = self.argument(&word)?;
                    Self::numeric(&word, "priority", &raw)
                        .map_or_else(|bad| bad, |priority| Command::Create { pid, priority })
                }
                "de" => Command::Destroy {
                    pid: self.argument(&word)?,
                },
                "req" | "rel" => {
                    let rid = self.argument(&word)?;
                    let raw = self.argument(&word)?;
                    match Self::numeric(&word, "amount", &raw) {
                        Ok(amount) if word == "req" => Command::Request { rid, amount },
                        Ok(amount) => Command::Release { rid, amount },
                        Err(bad) => bad,
                    }
                }
                other => {
                    tracing::trace!("skipping unknown token `{}`", other);
                    continue;
                }
            };
            return Some(command);
        }
    }
}
