//! File cipher engine: key state, job start, and the chunk loop
//!
//! ```text
//! derive_key ─▶ start ─┬─ canonicalize source, resolve destination,
//!                      │  delete stale destination           (caller)
//!                      └─ spawn_blocking: for each chunk
//!                            read → transform → append → on_progress
//! ```
//!
//! One job runs at a time. The key is moved into the job, so every job needs
//! a fresh [`FileCipherEngine::derive_key`].

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sca_chunks::plan;
use sca_core::config::{CryptoFailurePolicy, EngineConfig};
use sca_core::types::{MSG_BAD_SELECTION, MSG_COMPLETED, MSG_NO_PASSWORD, MSG_OLD_FILE_DELETED};
use sca_core::{Direction, JobState, ScaError, ScaResult};
use sca_crypto::{resolve_output_path, transform_chunk, CipherKey};
use secrecy::SecretString;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::sink::ProgressSink;

/// Outcome of a finished job
#[derive(Debug, Clone)]
pub struct JobReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub direction: Direction,
    /// Source bytes read and handed to the cipher
    pub bytes_processed: u64,
    /// Source length at job start
    pub total_bytes: u64,
    pub chunks: u64,
    /// Chunks dropped under [`CryptoFailurePolicy::Skip`]
    pub skipped_chunks: u64,
}

/// Handle to a job running in the background
#[derive(Debug)]
pub struct JobHandle {
    destination: PathBuf,
    state: watch::Receiver<JobState>,
    task: JoinHandle<ScaResult<JobReport>>,
}

impl JobHandle {
    /// Where the output is being written
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn state(&self) -> JobState {
        *self.state.borrow()
    }

    /// Receiver that observes the job's state transitions
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the job to finish.
    pub async fn wait(self) -> ScaResult<JobReport> {
        self.task
            .await
            .map_err(|e| ScaError::Other(anyhow::anyhow!("job task failed: {e}")))?
    }
}

pub struct FileCipherEngine {
    config: EngineConfig,
    key: Option<CipherKey>,
    state: Arc<watch::Sender<JobState>>,
}

impl FileCipherEngine {
    pub fn new(config: EngineConfig) -> Self {
        let (state, _) = watch::channel(JobState::Idle);
        Self {
            config,
            key: None,
            state: Arc::new(state),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> JobState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    /// Derive the key for the next job from `password`.
    ///
    /// An absent or empty password clears any previous key, reports
    /// "Please type in a password." to `sink`, and returns
    /// [`ScaError::InvalidKeyInput`].
    pub fn derive_key(
        &mut self,
        password: Option<&SecretString>,
        sink: &dyn ProgressSink,
    ) -> ScaResult<()> {
        self.ensure_not_running()?;

        match sca_crypto::derive_key(password) {
            Some(key) => {
                self.key = Some(key);
                self.state.send_replace(JobState::KeyDerived);
                debug!("key derived");
                Ok(())
            }
            None => {
                self.key = None;
                self.state.send_replace(JobState::Idle);
                sink.on_message(MSG_NO_PASSWORD);
                Err(ScaError::InvalidKeyInput)
            }
        }
    }

    /// Start transforming `source` in `direction` on a blocking task.
    ///
    /// Source selection, output naming and stale output removal happen before
    /// this returns; failures there leave the derived key in place. Once the
    /// job is spawned the key belongs to it.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn start(
        &mut self,
        source: &Path,
        direction: Direction,
        sink: Arc<dyn ProgressSink>,
    ) -> ScaResult<JobHandle> {
        self.ensure_not_running()?;
        if self.key.is_none() {
            sink.on_message(MSG_NO_PASSWORD);
            return Err(ScaError::InvalidKeyInput);
        }

        let (source, total_bytes) = match select_source(source).await {
            Ok(selected) => selected,
            Err(e) => {
                warn!(path = %source.display(), error = %e, "file selection failed");
                sink.on_message(MSG_BAD_SELECTION);
                return Err(e);
            }
        };

        let destination = match resolve_output_path(&source, direction) {
            Ok(path) => path,
            Err(e) => {
                sink.on_message(&e.to_string());
                return Err(e);
            }
        };

        match tokio::fs::remove_file(&destination).await {
            Ok(()) => {
                info!(path = %destination.display(), "removed stale output");
                sink.on_message(MSG_OLD_FILE_DELETED);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                let e = ScaError::from(e);
                sink.on_message(&failure_message(&e));
                return Err(e);
            }
        }

        let key = self.key.take().ok_or(ScaError::InvalidKeyInput)?;
        let job = Job {
            source,
            destination: destination.clone(),
            direction,
            total_bytes,
            key,
            config: self.config.clone(),
        };

        info!(
            source = %job.source.display(),
            destination = %job.destination.display(),
            %direction,
            bytes = total_bytes,
            "job started"
        );

        self.state.send_replace(JobState::Running);
        let guard = StateGuard {
            state: Arc::clone(&self.state),
        };
        let task = tokio::task::spawn_blocking(move || {
            let result = job.run(sink.as_ref());
            guard.finish(if result.is_ok() {
                JobState::Completed
            } else {
                JobState::Failed
            });
            result
        });

        Ok(JobHandle {
            destination,
            state: self.state.subscribe(),
            task,
        })
    }

    /// Derive a key, run one job, and wait for it.
    pub async fn run(
        &mut self,
        password: Option<&SecretString>,
        source: &Path,
        direction: Direction,
        sink: Arc<dyn ProgressSink>,
    ) -> ScaResult<JobReport> {
        self.derive_key(password, sink.as_ref())?;
        self.start(source, direction, sink).await?.wait().await
    }

    fn ensure_not_running(&self) -> ScaResult<()> {
        if self.state() == JobState::Running {
            return Err(ScaError::Busy);
        }
        Ok(())
    }
}

/// Canonical path and length of a regular file.
async fn select_source(path: &Path) -> ScaResult<(PathBuf, u64)> {
    let canonical = tokio::fs::canonicalize(path)
        .await
        .map_err(|e| ScaError::FileSelection(format!("{}: {e}", path.display())))?;
    let metadata = tokio::fs::metadata(&canonical)
        .await
        .map_err(|e| ScaError::FileSelection(format!("{}: {e}", canonical.display())))?;
    if !metadata.is_file() {
        return Err(ScaError::FileSelection(format!(
            "{} is not a regular file",
            canonical.display()
        )));
    }
    Ok((canonical, metadata.len()))
}

fn failure_message(err: &ScaError) -> String {
    format!("Job failed: {err}")
}

/// Marks the job Failed if the task unwinds before reporting a result.
struct StateGuard {
    state: Arc<watch::Sender<JobState>>,
}

impl StateGuard {
    fn finish(self, state: JobState) {
        self.state.send_replace(state);
    }
}

impl Drop for StateGuard {
    fn drop(&mut self) {
        let running = *self.state.borrow() == JobState::Running;
        if running {
            self.state.send_replace(JobState::Failed);
        }
    }
}

/// Everything the chunk loop needs, owned by the blocking task
struct Job {
    source: PathBuf,
    destination: PathBuf,
    direction: Direction,
    total_bytes: u64,
    key: CipherKey,
    config: EngineConfig,
}

impl Job {
    /// Run the chunk loop on the current thread and send the terminal message.
    fn run(self, sink: &dyn ProgressSink) -> ScaResult<JobReport> {
        match self.process(sink) {
            Ok(report) => {
                info!(
                    destination = %report.destination.display(),
                    bytes = report.bytes_processed,
                    chunks = report.chunks,
                    skipped = report.skipped_chunks,
                    "job completed"
                );
                sink.on_message(MSG_COMPLETED);
                Ok(report)
            }
            Err(e) => {
                error!(
                    source = %self.source.display(),
                    destination = %self.destination.display(),
                    error = %e,
                    "job failed, partial output left in place"
                );
                sink.on_message(&failure_message(&e));
                Err(e)
            }
        }
    }

    fn process(&self, sink: &dyn ProgressSink) -> ScaResult<JobReport> {
        let mut input = File::open(&self.source)?;
        // Created even when there is nothing to write.
        let mut output = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.destination)?;

        let mut report = JobReport {
            source: self.source.clone(),
            destination: self.destination.clone(),
            direction: self.direction,
            bytes_processed: 0,
            total_bytes: self.total_bytes,
            chunks: 0,
            skipped_chunks: 0,
        };

        let mut buf = Vec::new();
        for chunk in plan(self.total_bytes, self.direction, self.config.max_plain_chunk) {
            let len = usize::try_from(chunk.length).map_err(|_| {
                ScaError::Config(format!(
                    "chunk of {} bytes does not fit in memory",
                    chunk.length
                ))
            })?;
            buf.resize(len, 0);
            input.read_exact(&mut buf)?;

            match transform_chunk(&self.key, self.direction, &buf) {
                Ok(out) => output.write_all(&out)?,
                Err(e) => match self.config.on_crypto_failure {
                    CryptoFailurePolicy::Abort => {
                        error!(chunk = chunk.index, offset = chunk.offset, error = %e, "chunk failed");
                        return Err(e);
                    }
                    CryptoFailurePolicy::Skip => {
                        warn!(chunk = chunk.index, offset = chunk.offset, error = %e, "chunk skipped");
                        report.skipped_chunks += 1;
                    }
                },
            }

            report.bytes_processed += chunk.length;
            report.chunks += 1;
            debug!(
                chunk = chunk.index,
                bytes = report.bytes_processed,
                total = self.total_bytes,
                "chunk done"
            );
            sink.on_progress(report.bytes_processed, self.total_bytes);
        }

        output.flush()?;
        Ok(report)
    }
}
