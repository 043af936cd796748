//! Scripted `CommandRunner` for orchestration tests
//!
//! Simulates just enough repository state to follow a run: the checked-out
//! branch moves on `git checkout`, and refs disappear when the stacking tool
//! deletes a branch. Everything else answers from scripted rules, falling
//! back to a successful empty output.

#![allow(dead_code)]

use async_trait::async_trait;
use gt_stack::error::Result;
use gt_stack::exec::{lossy_command_line, CommandOutput, CommandRunner};
use std::collections::HashSet;
use std::ffi::OsString;
use std::sync::Mutex;

struct Rule {
    program: String,
    args: Vec<String>,
    output: CommandOutput,
}

/// Recording command runner
pub struct MockRunner {
    tool: String,
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<String>>,
    argvs: Mutex<Vec<Vec<String>>>,
    inherited: Mutex<Vec<String>>,
    head: Mutex<String>,
    missing_refs: Mutex<HashSet<String>>,
}

impl MockRunner {
    /// Runner with `head` checked out and `gt` as the stacking tool
    pub fn new(head: &str) -> Self {
        Self {
            tool: "gt".to_string(),
            rules: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            argvs: Mutex::new(Vec::new()),
            inherited: Mutex::new(Vec::new()),
            head: Mutex::new(head.to_string()),
            missing_refs: Mutex::new(HashSet::new()),
        }
    }

    /// Answer `program args...` (exact match) with `output`
    pub fn on(&self, program: &str, args: &[&str], output: CommandOutput) -> &Self {
        self.rules.lock().unwrap().push(Rule {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            output,
        });
        self
    }

    /// Make a fully-qualified ref absent
    pub fn remove_ref(&self, reference: &str) {
        self.missing_refs
            .lock()
            .unwrap()
            .insert(reference.to_string());
    }

    /// Make a branch unknown to the stacking tool
    pub fn untrack(&self, branch: &str) {
        self.remove_ref(&format!("refs/branch-metadata/{branch}"));
    }

    /// Branch currently checked out
    pub fn head(&self) -> String {
        self.head.lock().unwrap().clone()
    }

    /// Every captured call as a command line, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Every captured call as separate argv entries, program first
    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.argvs.lock().unwrap().clone()
    }

    /// Every inherited-stdio call as a command line
    pub fn inherited_calls(&self) -> Vec<String> {
        self.inherited.lock().unwrap().clone()
    }

    /// Number of captured calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Position of the first captured call starting with `prefix`
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.starts_with(prefix))
    }

    fn simulate(&self, program: &str, args: &[&str]) -> Option<CommandOutput> {
        match (program, args) {
            ("git", ["branch", "--show-current"]) => Some(CommandOutput::ok(self.head())),
            ("git", ["checkout", branch]) => {
                *self.head.lock().unwrap() = (*branch).to_string();
                Some(CommandOutput::ok(""))
            }
            ("git", ["show-ref", "--verify", "--quiet", reference]) => {
                if self.missing_refs.lock().unwrap().contains(*reference) {
                    Some(CommandOutput::failed(1, ""))
                } else {
                    Some(CommandOutput::ok(""))
                }
            }
            (tool, ["delete", branch, ..]) if tool == self.tool => {
                self.remove_ref(&format!("refs/heads/{branch}"));
                self.untrack(branch);
                None
            }
            _ => None,
        }
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line);
        self.argvs.lock().unwrap().push(
            std::iter::once(program)
                .chain(args.iter().copied())
                .map(ToString::to_string)
                .collect(),
        );

        let simulated = self.simulate(program, args);

        let rules = self.rules.lock().unwrap();
        if let Some(rule) = rules
            .iter()
            .find(|r| r.program == program && r.args == args)
        {
            return Ok(rule.output.clone());
        }
        Ok(simulated.unwrap_or_default())
    }

    async fn run_inherited(&self, program: &str, args: &[OsString]) -> Result<i32> {
        self.inherited
            .lock()
            .unwrap()
            .push(lossy_command_line(program, args));
        Ok(0)
    }
}
