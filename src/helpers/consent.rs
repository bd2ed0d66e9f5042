//! Consent gate for network fetches
//!
//! The gate owns the policy (ask until the operator answers `y` or `n`); the
//! [`Prompt`] supplies answers. Production reads the terminal, tests and
//! unattended runs use a [`ScriptedPrompt`].

use crate::core::error::{Error, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of operator answers.
pub trait Prompt {
    /// Ask `question`. `None` means no more input will ever arrive.
    fn ask(&mut self, question: &str) -> io::Result<Option<String>>;
}

/// Reads answers from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{} [Y/N]: ", question)?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Replays a fixed list of answers.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: usize,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: 0,
        }
    }

    /// How many times a question was asked.
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, _question: &str) -> io::Result<Option<String>> {
        self.asked += 1;
        Ok(self.answers.pop_front())
    }
}

/// Interpret a reply: its first non-blank character, case-insensitive.
pub fn parse_answer(reply: &str) -> Option<bool> {
    match reply.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('y') => Some(true),
        Some('n') => Some(false),
        _ => None,
    }
}

/// Ask for consent, then run `fetch` only if it was given.
///
/// Unrecognised replies ask again. A refusal, or the end of input, returns
/// `Ok(false)` without calling `fetch`.
pub fn request_and_fetch<F>(prompt: &mut dyn Prompt, question: &str, fetch: F) -> Result<bool>
where
    F: FnOnce() -> Result<bool>,
{
    loop {
        let reply = prompt
            .ask(question)
            .map_err(|e| Error::io("cannot read answer", e))?;
        let Some(reply) = reply else {
            return Ok(false);
        };
        match parse_answer(&reply) {
            Some(true) => return fetch(),
            Some(false) => return Ok(false),
            None => continue,
        }
    }
}
