// src/prompt.rs

//! Confirmation gate before destructive actions
//!
//! Reconciliation deletes and moves folders, so it only proceeds once the
//! user has typed a capital `Y`. Anything else, including an empty line or
//! a closed input stream, declines.

use crate::error::{Error, Result};
use std::io::{self, BufRead, Write};

/// The exact answer that grants confirmation
pub const CONFIRM_ANSWER: &str = "Y";

/// Asks the user to approve a destructive run
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Line-based prompt over any reader/writer pair
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on stdout, read the answer from stdin
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "{}", question).map_err(Error::Prompt)?;
        self.output.flush().map_err(Error::Prompt)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(Error::Prompt)?;
        if read == 0 {
            return Ok(false);
        }

        let answer = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(&line);
        Ok(answer == CONFIRM_ANSWER)
    }
}

/// Non-interactive approval (`--yes`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}
