//! Ingestion progress tracker.
//!
//! Polls the status of one long-running knowledge-base processing task over
//! an unreliable channel. The tracker is a small state machine: it tolerates
//! a bounded number of not-found responses while the job is still being
//! persisted server-side, gives up after a bounded number of consecutive
//! transport failures, and always honors user cancellation locally even when
//! the remote cancel call fails.

use ragline_core::error::Result;
use ragline_core::task::{TaskProgress, TaskStatus, new_task_id};
use ragline_core::transport::KnowledgeTransport;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Fixed polling period.
const POLL_PERIOD: Duration = Duration::from_secs(1);

/// Consecutive not-found responses tolerated while the job starts up.
/// The next occurrence beyond this is terminal.
const NOT_FOUND_TOLERANCE: u32 = 3;

/// Consecutive transport failures tolerated before giving up.
const TRANSPORT_ERROR_BUDGET: u32 = 5;

/// Mutable tracker state shared with the polling loop.
struct TrackerState {
    /// Last recorded status and message
    progress: TaskProgress,
    /// Set once no further polls may be issued or applied. Checked at the
    /// top of every poll pass and again before a response is applied, so a
    /// late in-flight response after cancel/stop is discarded.
    done: bool,
    /// Consecutive not-found responses seen so far
    not_found_polls: u32,
    /// Consecutive transport failures seen so far. Independent from the
    /// not-found budget: neither counter resets the other.
    transport_errors: u32,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            progress: TaskProgress::initializing(),
            done: false,
            not_found_polls: 0,
            transport_errors: 0,
        }
    }
}

/// The target of the active polling loop.
#[derive(Clone)]
struct PollTarget {
    knowledge_base_id: String,
    task_id: String,
}

/// Tracks the progress of a single ingestion task.
///
/// `ProgressTracker` owns at most one polling loop at a time: `start`
/// replaces any previous loop before spawning a new one, so timers are never
/// stacked. Cancellation is cooperative - it never aborts an in-flight poll
/// request; the late response is discarded through the done flag instead.
pub struct ProgressTracker {
    transport: Arc<dyn KnowledgeTransport>,
    state: Arc<Mutex<TrackerState>>,
    /// Handle of the active polling loop, replaced-not-stacked on `start`
    poll_loop: Mutex<Option<JoinHandle<()>>>,
    target: Mutex<Option<PollTarget>>,
}

impl ProgressTracker {
    /// Creates a tracker over the given transport. No polling starts until
    /// [`ProgressTracker::start`] or [`ProgressTracker::begin_processing`].
    pub fn new(transport: Arc<dyn KnowledgeTransport>) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(TrackerState::default())),
            poll_loop: Mutex::new(None),
            target: Mutex::new(None),
        }
    }

    /// Requests processing of a knowledge base and starts tracking it.
    ///
    /// The task id is client-generated before the job exists server-side, so
    /// polling can begin immediately; the not-found tolerance absorbs the
    /// race with job creation.
    ///
    /// # Returns
    ///
    /// The generated task id, for display and later cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error if the processing request itself fails; the tracker
    /// then records a terminal `Error` status and stops polling.
    pub async fn begin_processing(&self, knowledge_base_id: &str, force: bool) -> Result<String> {
        let task_id = new_task_id();
        self.start(knowledge_base_id, &task_id).await;
        if let Err(err) = self
            .transport
            .request_processing(knowledge_base_id, force, &task_id)
            .await
        {
            tracing::warn!(error = %err, knowledge_base_id, "processing request failed");
            let mut state = self.state.lock().await;
            state.progress = TaskProgress::new(
                TaskStatus::Error,
                format!("Failed to start processing: {err}"),
            );
            state.done = true;
            return Err(err);
        }
        Ok(task_id)
    }

    /// Starts polling the given task at the fixed period.
    ///
    /// The first poll fires immediately rather than after the first period.
    /// Only one polling loop may be active per tracker: any previous loop is
    /// torn down before the new one is spawned, and the tracker state is
    /// reset to `Initializing`.
    pub async fn start(&self, knowledge_base_id: &str, task_id: &str) {
        let mut loop_guard = self.poll_loop.lock().await;
        if let Some(previous) = loop_guard.take() {
            previous.abort();
        }
        {
            let mut state = self.state.lock().await;
            *state = TrackerState::default();
        }
        *self.target.lock().await = Some(PollTarget {
            knowledge_base_id: knowledge_base_id.to_string(),
            task_id: task_id.to_string(),
        });
        tracing::debug!(knowledge_base_id, task_id, "starting progress polling");

        // The loop holds only a weak reference to the state, so dropping the
        // tracker ends the loop on its next wakeup.
        let handle = tokio::spawn(run_poll_loop(
            self.transport.clone(),
            Arc::downgrade(&self.state),
            knowledge_base_id.to_string(),
            task_id.to_string(),
        ));
        *loop_guard = Some(handle);
    }

    /// Cancels the tracked task.
    ///
    /// The remote cancel request is issued, but its outcome does not gate
    /// the local transition: the tracker records `Cancelled` and stops
    /// polling either way, because the user-facing intent must not be
    /// blocked by a flaky network call.
    pub async fn cancel(&self) {
        let target = self.target.lock().await.clone();
        if let Some(target) = target {
            if let Err(err) = self
                .transport
                .cancel_processing(&target.knowledge_base_id, &target.task_id)
                .await
            {
                tracing::warn!(error = %err, "remote cancel failed; cancelling locally anyway");
            }
        }
        let mut state = self.state.lock().await;
        state.progress = TaskProgress::new(TaskStatus::Cancelled, "Processing cancelled");
        state.done = true;
    }

    /// Halts polling without changing the recorded status.
    ///
    /// Used when the hosting view is hidden or dropped. An in-flight poll is
    /// not aborted; its response is discarded.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        state.done = true;
    }

    /// Returns the last recorded status and message.
    pub async fn snapshot(&self) -> TaskProgress {
        self.state.lock().await.progress.clone()
    }

    /// True once no further polls will be issued or applied.
    pub async fn is_finished(&self) -> bool {
        self.state.lock().await.done
    }
}

/// The polling loop body. Runs until a terminal status is recorded, the
/// done flag is raised, or the owning tracker is dropped.
async fn run_poll_loop(
    transport: Arc<dyn KnowledgeTransport>,
    state: Weak<Mutex<TrackerState>>,
    knowledge_base_id: String,
    task_id: String,
) {
    let mut ticker = tokio::time::interval(POLL_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;

        // Done flag is checked before issuing the poll, not only when it
        // was scheduled.
        let Some(shared) = state.upgrade() else { return };
        if shared.lock().await.done {
            return;
        }
        drop(shared);

        let response = transport.poll_progress(&knowledge_base_id, &task_id).await;

        let Some(shared) = state.upgrade() else { return };
        let mut state = shared.lock().await;
        if state.done {
            // Cancel or stop raced with this poll; discard the late response.
            return;
        }
        match response {
            Ok(progress) => {
                state.transport_errors = 0;
                match progress.status {
                    TaskStatus::Completed | TaskStatus::Error | TaskStatus::Cancelled => {
                        tracing::debug!(status = ?progress.status, "task reached terminal status");
                        state.progress = progress;
                        state.done = true;
                    }
                    TaskStatus::NotFound => {
                        state.not_found_polls += 1;
                        if state.not_found_polls > NOT_FOUND_TOLERANCE {
                            state.progress = TaskProgress::new(
                                TaskStatus::NotFound,
                                "The processing task could not be found",
                            );
                            state.done = true;
                        } else {
                            // The job may not be persisted server-side yet.
                            state.progress = TaskProgress::new(
                                TaskStatus::Initializing,
                                "Starting the processing task...",
                            );
                        }
                    }
                    TaskStatus::Initializing | TaskStatus::Running => {
                        state.not_found_polls = 0;
                        state.progress = progress;
                    }
                }
            }
            Err(err) => {
                state.transport_errors += 1;
                tracing::warn!(
                    error = %err,
                    consecutive = state.transport_errors,
                    "progress poll failed"
                );
                if state.transport_errors > TRANSPORT_ERROR_BUDGET {
                    state.progress =
                        TaskProgress::new(TaskStatus::Error, "Failed to fetch task progress");
                    state.done = true;
                }
            }
        }
        if state.done {
            return;
        }
    }
}
