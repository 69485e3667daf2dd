use anyhow::Context;
use sgaudit_domain::{PolicyEvaluator, ResourceDocument};
use sgaudit_types::{PolicyPath, Verdict};
use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Runs an external policy engine once per (resource, policy) pair.
///
/// Protocol: `<program> <args...> <policy path>`, the resource document as JSON on stdin,
/// a JSON array of verdicts on stdout. A non-zero exit status is an evaluation failure, and
/// so is running past the configured timeout (the child is killed).
#[derive(Clone, Debug)]
pub struct CommandEvaluator {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandEvaluator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Build from a `["program", "arg", ...]` command line.
    pub fn from_command(command: &[String]) -> anyhow::Result<Self> {
        let (program, args) = command
            .split_first()
            .context("evaluator command is empty")?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    /// Kill the evaluator and fail the pair when one call runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn wait(&self, child: &mut Child) -> anyhow::Result<ExitStatus> {
        let Some(limit) = self.timeout else {
            return child.wait().context("wait for evaluator");
        };
        match child.wait_timeout(limit).context("wait for evaluator")? {
            Some(status) => Ok(status),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                anyhow::bail!("evaluator {} timed out after {:?}", self.program, limit)
            }
        }
    }
}

impl PolicyEvaluator for CommandEvaluator {
    fn evaluate(
        &self,
        document: &ResourceDocument,
        policy: &PolicyPath,
    ) -> anyhow::Result<Vec<Verdict>> {
        let input = serde_json::to_vec(document).context("serialize resource document")?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(policy.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn evaluator: {}", self.program))?;

        // Pipes are pumped on their own threads so a chatty child cannot block on a full
        // pipe while we wait on it. On timeout they are left to finish on their own.
        let writer = child
            .stdin
            .take()
            .map(|stdin| thread::spawn(move || write_input(stdin, &input)));
        let stdout = child.stdout.take().map(|pipe| thread::spawn(move || read_all(pipe)));
        let stderr = child.stderr.take().map(|pipe| thread::spawn(move || read_all(pipe)));

        let status = self.wait(&mut child)?;
        let stdout = join_pipe(stdout)?;
        let stderr = join_pipe(stderr)?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            anyhow::bail!("evaluator exited with {}: {}", status, stderr.trim());
        }
        join_pipe(writer)?;

        serde_json::from_slice(&stdout).context("parse evaluator output as verdict list")
    }
}

/// An evaluator that never reads its input closes the pipe early; that is not an error.
fn write_input(mut stdin: ChildStdin, input: &[u8]) -> anyhow::Result<()> {
    match stdin.write_all(input) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err).context("write resource document to evaluator"),
    }
}

fn read_all(mut pipe: impl Read) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf).context("read evaluator output")?;
    Ok(buf)
}

fn join_pipe<T: Default>(handle: Option<JoinHandle<anyhow::Result<T>>>) -> anyhow::Result<T> {
    match handle {
        None => Ok(T::default()),
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(anyhow::anyhow!("evaluator pipe thread panicked"))),
    }
}
