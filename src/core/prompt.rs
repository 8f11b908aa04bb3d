use crate::domain::error::{HelperError, HelperResult};
use dialoguer::{Input, Password};
use std::collections::VecDeque;

/// Source of interactive answers
pub trait Prompter {
    /// Read a line of plain text, empty allowed.
    fn input(&mut self, label: &str) -> HelperResult<String>;
    /// Read a masked value.
    fn password(&mut self, label: &str) -> HelperResult<String>;
}

/// Prompts on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&mut self, label: &str) -> HelperResult<String> {
        let answer = Input::<String>::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn password(&mut self, label: &str) -> HelperResult<String> {
        let answer = Password::new()
            .with_prompt(label)
            .allow_empty_password(true)
            .interact()?;
        Ok(answer)
    }
}

/// Replays canned answers, for non-interactive callers and tests
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Labels of every prompt shown so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    fn next(&mut self, label: &str) -> HelperResult<String> {
        self.asked.push(label.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| HelperError::Prompt(format!("no answer for '{}'", label)))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, label: &str) -> HelperResult<String> {
        self.next(label)
    }

    fn password(&mut self, label: &str) -> HelperResult<String> {
        self.next(label)
    }
}

/// Ask for a secret twice; the two answers must match.
pub fn capture_secret(prompter: &mut dyn Prompter) -> HelperResult<String> {
    let secret = prompter.password("Password")?;
    let confirmation = prompter.password("Confirm password")?;
    if secret != confirmation {
        return Err(HelperError::SecretMismatch);
    }
    Ok(secret)
}
