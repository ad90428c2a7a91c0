//! Line-based terminal prompts
//!
//! Menus are printed as numbered lists on stderr and answered on stdin.
//! Typing `esc`, pressing Ctrl-C or closing stdin cancels the prompt.

use std::io::Write as IoWrite;

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;
use tracing::debug;

use crate::flows::prompt::{PromptAdapter, RawResponse};
use crate::flows::types::PromptOption;

/// Answer that cancels any prompt.
pub const CANCEL_INPUT: &str = "esc";

/// Prompt adapter reading answers line by line.
pub struct TerminalPrompts<R> {
    input: Mutex<R>,
}

impl TerminalPrompts<BufReader<Stdin>> {
    /// Prompts answered on the process's stdin.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> TerminalPrompts<R> {
    /// Prompts answered from `input`.
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }

    /// Next trimmed line, or `None` on end of input, an interrupt or the
    /// cancel word.
    async fn read_answer(&self) -> Result<Option<String>> {
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        let mut input = self.input.lock().await;
        let read = tokio::select! {
            biased;
            read = input.read_line(&mut line) => read.context("Failed to read from terminal")?,
            Ok(()) = tokio::signal::ctrl_c() => {
                eprintln!();
                debug!("interrupt at prompt");
                return Ok(None);
            }
        };
        if read == 0 {
            return Ok(None);
        }
        let answer = line.trim();
        if answer.eq_ignore_ascii_case(CANCEL_INPUT) {
            return Ok(None);
        }
        Ok(Some(answer.to_string()))
    }
}

/// Match an answer against the menu: a 1-based number or an exact value.
fn pick_option<'a>(options: &'a [PromptOption], answer: &str) -> Option<&'a PromptOption> {
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i));
    }
    options.iter().find(|o| o.value == answer)
}

fn parse_confirm(answer: &str, initial_value: Option<bool>) -> Option<bool> {
    match answer.to_ascii_lowercase().as_str() {
        "" => Some(initial_value.unwrap_or(false)),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> PromptAdapter for TerminalPrompts<R> {
    async fn select(&self, message: &str, options: &[PromptOption]) -> Result<RawResponse> {
        eprintln!("\n{}", message.bold());
        for (i, option) in options.iter().enumerate() {
            eprintln!("  {} {}", format!("{:>2})", i + 1).cyan(), option.label);
        }
        loop {
            eprint!("{} ", ">".cyan().bold());
            let Some(answer) = self.read_answer().await? else {
                return Ok(RawResponse::Cancelled);
            };
            if let Some(option) = pick_option(options, &answer) {
                return Ok(RawResponse::Text(option.value.clone()));
            }
            eprintln!(
                "  {}",
                format!("Pick 1-{} or type '{CANCEL_INPUT}' to go back", options.len()).dimmed()
            );
        }
    }

    async fn confirm(&self, message: &str, initial_value: Option<bool>) -> Result<RawResponse> {
        let hint = if initial_value == Some(true) { "[Y/n]" } else { "[y/N]" };
        loop {
            eprint!("\n{} {} ", message.bold(), hint.dimmed());
            let Some(answer) = self.read_answer().await? else {
                return Ok(RawResponse::Cancelled);
            };
            if let Some(value) = parse_confirm(&answer, initial_value) {
                return Ok(RawResponse::Bool(value));
            }
        }
    }

    async fn text(
        &self,
        message: &str,
        placeholder: Option<&str>,
        default_value: Option<&str>,
    ) -> Result<RawResponse> {
        match placeholder {
            Some(placeholder) => eprint!("\n{} {} ", message.bold(), placeholder.dimmed()),
            None => eprint!("\n{} ", message.bold()),
        }
        let Some(answer) = self.read_answer().await? else {
            return Ok(RawResponse::Cancelled);
        };
        if answer.is_empty() {
            return Ok(RawResponse::Text(default_value.unwrap_or_default().to_string()));
        }
        Ok(RawResponse::Text(answer))
    }
}
