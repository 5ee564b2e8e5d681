use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, error};

use loft_types::ContainerId;

use crate::{now, Store};

/// Work that runs after a wall-clock deadline. Delayed message delivery and
/// standup flushes are the two instances of this one mechanism.
#[derive(Debug, Clone)]
pub enum Task {
    /// Insert a message whose id was reserved at schedule time.
    DeliverMessage {
        message_id: u64,
        container: ContainerId,
        author: u64,
        body: String,
        time_sent: i64,
    },
    /// Flush the active standup buffer of a channel.
    FlushStandup { channel_id: u64 },
}

struct Entry {
    due: i64,
    seq: u64,
    task: Task,
}

// Min-heap on (due, seq): earliest deadline first, FIFO among equals.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

/// One timer queue for the whole store, drained by a single worker task.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    queue: Mutex<BinaryHeap<Entry>>,
    notify: Notify,
    seq: AtomicU64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                queue: Mutex::new(BinaryHeap::new()),
                notify: Notify::new(),
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// Enqueue a task to run at `due` (unix seconds). A deadline in the past
    /// runs on the worker's next wakeup.
    pub fn schedule(&self, due: i64, task: Task) {
        let seq = self.inner.seq.fetch_add(1, AtomicOrdering::Relaxed);
        self.queue().push(Entry { due, seq, task });
        self.inner.notify.notify_one();
    }

    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    /// Wait until the earliest deadline elapses and pop that task.
    pub async fn next_due(&self) -> Task {
        loop {
            let mut due_in = None;
            {
                let mut queue = self.queue();
                if let Some(head) = queue.peek() {
                    let delta = head.due - now();
                    if delta <= 0 {
                        if let Some(entry) = queue.pop() {
                            return entry.task;
                        }
                    }
                    due_in = Some(Duration::from_secs(delta.max(1) as u64));
                }
            }

            match due_in {
                Some(wait) => {
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = self.inner.notify.notified() => {}
                    }
                }
                None => self.inner.notify.notified().await,
            }
        }
    }

    fn queue(&self) -> MutexGuard<'_, BinaryHeap<Entry>> {
        // A panic while holding this lock cannot corrupt the heap.
        self.inner
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Run one scheduled task against the store.
    pub fn execute(&self, task: Task) {
        let outcome = match task {
            Task::DeliverMessage {
                message_id,
                container,
                author,
                body,
                time_sent,
            } => self.deliver_scheduled_message(message_id, container, author, body, time_sent),
            Task::FlushStandup { channel_id } => self.flush_standup(channel_id),
        };
        if let Err(e) = outcome {
            error!("scheduled task failed: {e}");
        }
    }
}

/// Worker loop: drain the store's scheduler forever. Spawned once by the
/// server binary (and by tests that exercise timers).
pub async fn run(store: Arc<Store>) {
    loop {
        let task = store.scheduler().next_due().await;
        debug!(?task, "running scheduled task");
        store.execute(task);
    }
}
