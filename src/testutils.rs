#![cfg(any(test, feature = "testutils"))]

use std::sync::Mutex;

use crate::{remote::Executor, Error};

/// One call made against a [ScriptedExec], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecCall {
    Output(String),
    /// Command plus the stdin it was fed.
    Input(String, String),
}

/// An [Executor] for tests: records every call and answers `output` from a
/// scripted table of exact command / canned stdout pairs. Unscripted output
/// commands fail, stdin-feeding commands always succeed.
#[derive(Debug, Default)]
pub struct ScriptedExec {
    outputs: Vec<(String, Vec<u8>)>,
    calls: Mutex<Vec<ExecCall>>,
}

impl ScriptedExec {
    pub fn new() -> Self {
        ScriptedExec::default()
    }

    pub fn respond(mut self, command: impl Into<String>, stdout: impl Into<Vec<u8>>) -> Self {
        self.outputs.push((command.into(), stdout.into()));
        self
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().expect("calls mutex is never poisoned").clone()
    }
}

impl Executor for ScriptedExec {
    async fn output(&self, command: &str) -> Result<Vec<u8>, Error> {
        self.calls
            .lock()
            .expect("calls mutex is never poisoned")
            .push(ExecCall::Output(command.to_string()));

        self.outputs
            .iter()
            .find(|(scripted, _)| scripted == command)
            .map(|(_, stdout)| stdout.clone())
            .ok_or_else(|| Error::CommandFailed(format!("unscripted command `{command}`")))
    }

    async fn input(&self, command: &str, stdin: &[u8]) -> Result<(), Error> {
        self.calls
            .lock()
            .expect("calls mutex is never poisoned")
            .push(ExecCall::Input(
                command.to_string(),
                String::from_utf8_lossy(stdin).to_string(),
            ));

        Ok(())
    }
}
