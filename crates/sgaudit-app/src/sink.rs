use crate::ports::EvidenceSink;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use sgaudit_types::Submission;
use std::sync::Mutex;

/// Writes each submission to `<dir>/<stream-id>.json`.
///
/// Successive results for the same stream overwrite each other, so the directory always
/// holds the latest result per (resource, policy) pair.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: Utf8PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn path_for(&self, submission: &Submission) -> Utf8PathBuf {
        self.dir.join(format!("{}.json", submission.stream_id))
    }
}

impl EvidenceSink for DirectorySink {
    fn publish(&self, submission: &Submission) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create directory: {}", self.dir))?;
        let data = serde_json::to_vec_pretty(submission).context("serialize submission")?;
        let path = self.path_for(submission);
        std::fs::write(&path, data).with_context(|| format!("write submission: {path}"))?;
        Ok(())
    }
}

/// Keeps submissions in memory, in publish order.
#[derive(Debug, Default)]
pub struct MemorySink {
    submissions: Mutex<Vec<Submission>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl EvidenceSink for MemorySink {
    fn publish(&self, submission: &Submission) -> anyhow::Result<()> {
        self.submissions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(submission.clone());
        Ok(())
    }
}
