//! Scripted `CommandRunner` for sequencing tests
//!
//! Responses are matched by argv prefix, first match wins. Every invocation is recorded
//! so tests can assert the exact order of git commands.

#![allow(dead_code)]

use async_trait::async_trait;
use git_deck::core::error::Result;
use git_deck::core::runner::{
    CommandResult, CommandRunner, Invocation, OutputListeners, Stream,
};
use git_deck::core::{GitBridge, MutationGate, Synchronizer};
use std::sync::Mutex;

struct Rule {
    prefix: Vec<String>,
    result: CommandResult,
    once: bool,
}

#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<Vec<String>>>,
}

pub fn output(stdout: &[&str], stderr: &[&str], exit: i32) -> CommandResult {
    let mut result = CommandResult::default();
    for line in stdout {
        result.push(Stream::Stdout, *line);
    }
    for line in stderr {
        result.push(Stream::Stderr, *line);
    }
    result.exit_code = Some(exit);
    result
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every invocation starting with `prefix`.
    pub fn respond(self, prefix: &[&str], result: CommandResult) -> Self {
        self.push_rule(prefix, result, false)
    }

    /// Answer only the next invocation starting with `prefix`.
    pub fn respond_once(self, prefix: &[&str], result: CommandResult) -> Self {
        self.push_rule(prefix, result, true)
    }

    fn push_rule(self, prefix: &[&str], result: CommandResult, once: bool) -> Self {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            result,
            once,
        });
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded invocations as space-joined argv strings.
    pub fn call_lines(&self) -> Vec<String> {
        self.calls().iter().map(|args| args.join(" ")).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        mut listeners: OutputListeners<'_>,
    ) -> Result<CommandResult> {
        self.calls.lock().unwrap().push(invocation.args.clone());

        let result = {
            let mut rules = self.rules.lock().unwrap();
            let position = rules
                .iter()
                .position(|rule| invocation.args.starts_with(&rule.prefix));
            match position {
                Some(idx) if rules[idx].once => rules.remove(idx).result,
                Some(idx) => rules[idx].result.clone(),
                None => output(&[], &[], 0),
            }
        };

        for line in &result.output {
            listeners.emit(line.stream, &line.text);
        }
        Ok(result)
    }
}

/// Synchronizer over a scripted runner with the mutation gate enabled.
pub fn scripted_synchronizer(runner: ScriptedRunner) -> Synchronizer<ScriptedRunner> {
    Synchronizer::new(GitBridge::with_runner(runner), MutationGate::new(true))
}
