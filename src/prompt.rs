//! Interactive input

use crate::receipt::RawRequest;
use console::Term;
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal};

/// Source of answers to interactive questions. `Ok(None)` means the input
/// ended before an answer was given.
pub trait PromptSource {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>>;
}

/// Asks on stdout. Answers come from the terminal when stdin is one, and are
/// read line by line from stdin otherwise, so piped input ends cleanly.
pub struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptSource for TerminalPrompt {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.term.write_str(question)?;
        self.term.flush()?;
        let stdin = io::stdin();
        if stdin.is_terminal() {
            self.term.read_line().map(Some)
        } else {
            read_answer(&mut stdin.lock())
        }
    }
}

/// Reads one line. `Ok(None)` at end of input; the line ending is dropped.
pub fn read_answer<B: BufRead>(input: &mut B) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let answer = line.strip_suffix('\n').unwrap_or(&line);
    let answer = answer.strip_suffix('\r').unwrap_or(answer);
    Ok(Some(answer.to_string()))
}

/// Canned answers, handed out in order. Records every question asked.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
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

    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl PromptSource for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.asked.push(question.to_string());
        Ok(self.answers.pop_front())
    }
}

/// Asks for the destination address and the amount. Answers are trimmed;
/// missing answers become empty strings and fail validation later.
pub fn collect_request(
    prompt: &mut dyn PromptSource,
    source: &str,
    symbol: &str,
) -> io::Result<RawRequest> {
    let destination = prompt.ask("Destination address: ")?.unwrap_or_default();
    let amount = prompt
        .ask(&format!("Amount ({}): ", symbol))?
        .unwrap_or_default();
    Ok(RawRequest::new(source, destination.trim(), amount.trim()))
}

/// `y` or `yes` in any case. Everything else declines.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
