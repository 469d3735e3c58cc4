//! Request change events and subscriptions.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Buffered change batches per subscriber.
pub(crate) const CHANNEL_CAPACITY: usize = 64;

/// What happened to a request document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One change to one request document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub request_id: String,
}

impl ChangeEvent {
    pub fn added(request_id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Added,
            request_id: request_id.into(),
        }
    }

    pub fn modified(request_id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Modified,
            request_id: request_id.into(),
        }
    }

    pub fn removed(request_id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Removed,
            request_id: request_id.into(),
        }
    }
}

#[derive(Debug)]
enum Feed {
    /// Producers that can wait apply backpressure.
    Bounded(mpsc::Receiver<Vec<ChangeEvent>>),
    /// Producers that publish under a lock never block and never drop.
    Unbounded(mpsc::UnboundedReceiver<Vec<ChangeEvent>>),
}

/// A live feed of request change batches.
///
/// Dropping the subscription stops any background task feeding it.
#[derive(Debug)]
pub struct ChangeSubscription {
    feed: Feed,
    task: Option<JoinHandle<()>>,
}

impl ChangeSubscription {
    pub fn new(receiver: mpsc::Receiver<Vec<ChangeEvent>>) -> Self {
        Self {
            feed: Feed::Bounded(receiver),
            task: None,
        }
    }

    pub fn unbounded(receiver: mpsc::UnboundedReceiver<Vec<ChangeEvent>>) -> Self {
        Self {
            feed: Feed::Unbounded(receiver),
            task: None,
        }
    }

    pub(crate) fn with_task(
        receiver: mpsc::Receiver<Vec<ChangeEvent>>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            feed: Feed::Bounded(receiver),
            task: Some(task),
        }
    }

    /// Wait for the next batch; `None` once the feed has ended.
    pub async fn next_batch(&mut self) -> Option<Vec<ChangeEvent>> {
        match &mut self.feed {
            Feed::Bounded(receiver) => receiver.recv().await,
            Feed::Unbounded(receiver) => receiver.recv().await,
        }
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
