use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use framework::exception;
use framework::exception::Exception;
use framework::kafka::producer::Delivery;
use framework::kafka::producer::MessageSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::message::Message;

const DROP_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one publish call, produced exactly once per accepted line.
#[derive(Debug)]
pub struct Completion {
    pub message: Message,
    pub result: Result<Delivery, Exception>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishSummary {
    pub submitted: u64,
    pub delivered: u64,
    pub failed: u64,
}

#[derive(Default)]
struct PublishStats {
    submitted: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl PublishStats {
    fn summary(&self) -> PublishSummary {
        PublishSummary {
            submitted: self.submitted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Publishes parsed lines to a single topic.
///
/// Each `publish` hands the record to the sender and returns right away; the delivery
/// report is awaited on a tracked task which logs the outcome. `shutdown` closes the
/// publisher for good, flushes the sender once and waits for outstanding completions.
pub struct LinePublisher<S>
where
    S: MessageSender,
{
    sender: Arc<S>,
    topic: String,
    tasks: TaskTracker,
    stats: Arc<PublishStats>,
    closed: AtomicBool,
}

impl<S> LinePublisher<S>
where
    S: MessageSender,
{
    pub fn new(sender: S, topic: String) -> Self {
        Self {
            sender: Arc::new(sender),
            topic,
            tasks: TaskTracker::new(),
            stats: Arc::new(PublishStats::default()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn summary(&self) -> PublishSummary {
        self.stats.summary()
    }

    pub fn publish(&self, line: &str) -> Result<JoinHandle<Completion>, Exception> {
        if self.closed.load(Ordering::Acquire) {
            return Err(exception!(
                code = "PUBLISHER_CLOSED",
                message = format!("publisher is closed, topic={}", self.topic)
            ));
        }

        let message = Message::parse(line);
        let delivery = self.sender.send(&self.topic, message.key.as_deref(), &message.value);
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);

        let stats = Arc::clone(&self.stats);
        Ok(self.tasks.spawn(async move {
            let result = delivery.await;
            match result {
                Ok(ref delivery) => {
                    stats.delivered.fetch_add(1, Ordering::Relaxed);
                    info!(
                        key = message.key.as_deref(),
                        value = message.value.as_str(),
                        topic = delivery.topic.as_str(),
                        partition = delivery.partition,
                        offset = delivery.offset,
                        "message delivered"
                    );
                }
                Err(ref err) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    error!(
                        key = message.key.as_deref(),
                        value = message.value.as_str(),
                        "failed to deliver message, error={err}"
                    );
                }
            }
            Completion { message, result }
        }))
    }

    pub async fn shutdown(&self, timeout: Duration) -> PublishSummary {
        if self.closed.swap(true, Ordering::AcqRel) {
            warn!(topic = self.topic.as_str(), "publisher already closed");
            return self.stats.summary();
        }

        let deadline = Instant::now() + timeout;
        self.tasks.close();
        info!(topic = self.topic.as_str(), pending = self.tasks.len(), "closing publisher");

        let sender = Arc::clone(&self.sender);
        match tokio::task::spawn_blocking(move || sender.flush(timeout)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(topic = self.topic.as_str(), "failed to flush producer, error={err}"),
            Err(err) => error!(topic = self.topic.as_str(), "flush task failed, error={err}"),
        }

        if tokio::time::timeout_at(deadline, self.tasks.wait()).await.is_err() {
            warn!(
                topic = self.topic.as_str(),
                abandoned = self.tasks.len(),
                "close timeout elapsed, abandoning pending deliveries"
            );
        }

        let summary = self.stats.summary();
        info!(
            topic = self.topic.as_str(),
            submitted = summary.submitted,
            delivered = summary.delivered,
            failed = summary.failed,
            "publisher closed"
        );
        summary
    }
}

impl<S> Drop for LinePublisher<S>
where
    S: MessageSender,
{
    fn drop(&mut self) {
        if !*self.closed.get_mut() {
            warn!(topic = self.topic.as_str(), "publisher dropped without shutdown, flushing producer");
            if let Err(err) = self.sender.flush(DROP_FLUSH_TIMEOUT) {
                error!(topic = self.topic.as_str(), "failed to flush producer, error={err}");
            }
        }
    }
}
